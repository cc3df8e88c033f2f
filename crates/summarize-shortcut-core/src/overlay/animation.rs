use thiserror::Error;

#[derive(Error, Debug)]
#[error("animation cleanup failed: {0}")]
pub struct AnimationError(pub String);

/// A running loading animation injected into the page by the host
/// (e.g. a vector animation player). Owned by the overlay controller.
pub trait AnimationHandle: Send {
    fn destroy(&mut self) -> Result<(), AnimationError>;
}

/// What currently shows the loading state
pub(crate) enum LoadingIndicator {
    /// CSS spinner element inside the overlay content
    Spinner { element_id: String },
    /// Host-provided animation
    Player(Box<dyn AnimationHandle>),
}
