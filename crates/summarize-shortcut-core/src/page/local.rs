use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::{BrowserHost, OverlayCall, PageRequest, PageResponse, Selection, TabId};
use crate::error::ChannelError;
use crate::overlay::{Dom, MemoryDom, OverlayController, Placement};

/// One tab's page: the current selection, the content-script endpoint and
/// the overlay living in its DOM.
pub struct PageContext<D: Dom = MemoryDom> {
    selection: Selection,
    overlay: OverlayController<D>,
    content_script: bool,
}

impl<D: Dom> PageContext<D> {
    pub fn new(dom: D, placement: Placement) -> Self {
        Self {
            selection: Selection::default(),
            overlay: OverlayController::new(dom, placement),
            content_script: true,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Page where the content script never loaded
    pub fn without_content_script(mut self) -> Self {
        self.content_script = false;
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn overlay(&self) -> &OverlayController<D> {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayController<D> {
        &mut self.overlay
    }

    /// Content-script side of the messaging channel
    pub fn handle_message(&self, request: &PageRequest) -> PageResponse {
        match request {
            PageRequest::GetSelectedText => PageResponse::Selection(self.selection.clone()),
            PageRequest::DisplaySummary { .. } => PageResponse::Ack { success: true },
        }
    }

    /// Run an overlay function against this page's DOM
    pub fn execute(&mut self, call: OverlayCall) {
        match call {
            OverlayCall::ShowLoading {
                selected_text,
                rect,
                has_provider,
            } => {
                self.overlay
                    .show_loading(&selected_text, rect.as_ref(), has_provider);
            }
            OverlayCall::ApplyResult { update } => {
                self.overlay.apply_result(&update);
            }
        }
    }
}

/// A single-window browser held in process, with at most one tab.
pub struct LocalBrowser<D: Dom = MemoryDom> {
    tab: Option<TabId>,
    scriptable: bool,
    page: Mutex<PageContext<D>>,
}

impl<D: Dom> LocalBrowser<D> {
    pub const TAB_ID: TabId = 1;

    pub fn new(page: PageContext<D>) -> Self {
        Self {
            tab: Some(Self::TAB_ID),
            scriptable: true,
            page: Mutex::new(page),
        }
    }

    /// No tab is focused
    pub fn without_tab(page: PageContext<D>) -> Self {
        Self {
            tab: None,
            ..Self::new(page)
        }
    }

    /// A browser-internal page: messages and scripts are refused
    pub fn privileged(page: PageContext<D>) -> Self {
        Self {
            scriptable: false,
            ..Self::new(page)
        }
    }

    pub async fn page(&self) -> MutexGuard<'_, PageContext<D>> {
        self.page.lock().await
    }

    pub fn into_page(self) -> PageContext<D> {
        self.page.into_inner()
    }

    fn check_tab(&self, tab: TabId) -> Result<(), ChannelError> {
        if self.tab == Some(tab) && self.scriptable {
            Ok(())
        } else {
            Err(ChannelError::Unreachable(tab))
        }
    }
}

#[async_trait]
impl<D: Dom + 'static> BrowserHost for LocalBrowser<D> {
    async fn active_tab(&self) -> Option<TabId> {
        self.tab
    }

    async fn send_message(
        &self,
        tab: TabId,
        request: PageRequest,
    ) -> Result<PageResponse, ChannelError> {
        self.check_tab(tab)?;
        let page = self.page.lock().await;
        if !page.content_script {
            return Err(ChannelError::NoContentScript(tab));
        }

        debug!(tab, ?request, "Delivering page message");
        Ok(page.handle_message(&request))
    }

    async fn execute(&self, tab: TabId, call: OverlayCall) -> Result<(), ChannelError> {
        self.check_tab(tab)?;
        self.page.lock().await.execute(call);
        Ok(())
    }
}
