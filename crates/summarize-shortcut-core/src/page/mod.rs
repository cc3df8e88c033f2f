//! The boundary between the background side and a browser tab: message
//! shapes, overlay calls and the host trait that carries them.

mod local;

pub use local::{LocalBrowser, PageContext};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::providers::ProviderKind;

pub type TabId = u32;

/// Bounding box of the selection in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub text: String,
    pub rect: Option<SelectionRect>,
}

impl Selection {
    /// Text is trimmed; an empty selection carries no rect.
    pub fn new(text: impl AsRef<str>, rect: Option<SelectionRect>) -> Self {
        let text = text.as_ref().trim().to_string();
        let rect = if text.is_empty() { None } else { rect };
        Self { text, rect }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Messages sent to the content script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageRequest {
    GetSelectedText,
    /// Reserved; acknowledged without effect
    DisplaySummary {
        #[serde(default)]
        summary: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageResponse {
    Selection(Selection),
    Ack { success: bool },
}

/// What the overlay shows once the summarize flow has finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OverlayUpdate {
    Summary {
        text: String,
        provider: Option<ProviderKind>,
    },
    Error {
        message: String,
    },
}

impl OverlayUpdate {
    /// Label of the provider that produced the summary, `AI` when unknown
    pub fn provider_label(&self) -> &'static str {
        match self {
            OverlayUpdate::Summary {
                provider: Some(kind),
                ..
            } => kind.label(),
            _ => "AI",
        }
    }
}

/// Functions run inside the page to drive the overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "function")]
pub enum OverlayCall {
    #[serde(rename = "showLoadingPopup", rename_all = "camelCase")]
    ShowLoading {
        selected_text: String,
        rect: Option<SelectionRect>,
        has_provider: bool,
    },
    #[serde(rename = "applyResult")]
    ApplyResult { update: OverlayUpdate },
}

/// The browser as seen from the background side.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// The tab in the focused window, if any
    async fn active_tab(&self) -> Option<TabId>;

    /// Round-trip a message to the tab's content script
    async fn send_message(
        &self,
        tab: TabId,
        request: PageRequest,
    ) -> Result<PageResponse, ChannelError>;

    /// Run an overlay function inside the tab
    async fn execute(&self, tab: TabId, call: OverlayCall) -> Result<(), ChannelError>;
}
