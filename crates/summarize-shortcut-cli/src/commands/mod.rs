pub mod config;
pub mod models;
pub mod summarize;
pub mod verify;
