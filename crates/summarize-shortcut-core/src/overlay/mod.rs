//! The in-page overlay: one panel per page, driven through a small state
//! machine over an abstract [`Dom`].

mod animation;
pub mod dom;
pub mod markdown;
mod placement;
mod templates;

pub use animation::{AnimationError, AnimationHandle};
pub use dom::{Dom, EventKind, ListenerId, ListenerTarget, MemoryDom, Viewport};
pub use placement::Placement;

use animation::LoadingIndicator;
use tracing::{debug, warn};

use crate::page::{OverlayUpdate, SelectionRect};

pub const OVERLAY_ID: &str = "summarize-shortcut-popup";
pub const CONTENT_ID: &str = "summarize-shortcut-popup-content";
pub const CLOSE_ID: &str = "summarize-shortcut-popup-close";
pub const TITLE_ID: &str = "summarize-shortcut-popup-title";
pub const SPINNER_ID: &str = "summarize-shortcut-popup-spinner";

pub const MARKDOWN_STYLESHEET_ID: &str = "markdown-styles";
pub const MARKDOWN_STYLESHEET_HREF: &str = "markdown-styles.css";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Absent,
    LoadingNoProvider,
    LoadingNoSelection,
    Loading,
    ShowingResult,
    ShowingError,
}

impl OverlayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayState::Absent => "absent",
            OverlayState::LoadingNoProvider => "loading-no-provider",
            OverlayState::LoadingNoSelection => "loading-no-selection",
            OverlayState::Loading => "loading",
            OverlayState::ShowingResult => "showing-result",
            OverlayState::ShowingError => "showing-error",
        }
    }
}

impl std::fmt::Display for OverlayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page events the overlay listens for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// A click; `target` is the id of the clicked element, `None` for
    /// anything without one
    Click { target: Option<String> },
    KeyDown { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenerRole {
    CloseIcon,
    OutsideClick,
    Escape,
}

pub struct OverlayController<D: Dom> {
    dom: D,
    placement: Placement,
    state: OverlayState,
    subscriptions: Vec<(ListenerRole, ListenerId)>,
    indicator: Option<LoadingIndicator>,
}

impl<D: Dom> OverlayController<D> {
    pub fn new(dom: D, placement: Placement) -> Self {
        Self {
            dom,
            placement,
            state: OverlayState::Absent,
            subscriptions: Vec::new(),
            indicator: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn is_animating(&self) -> bool {
        self.indicator.is_some()
    }

    /// Replace whatever overlay is on the page with a fresh one in a
    /// loading (or guidance) state.
    pub fn show_loading(
        &mut self,
        selected_text: &str,
        rect: Option<&SelectionRect>,
        has_provider: bool,
    ) -> OverlayState {
        debug!(
            text_len = selected_text.chars().count(),
            has_provider, "Showing loading overlay"
        );

        self.teardown();
        self.build_frame(rect, !selected_text.is_empty());
        self.subscribe();

        self.state = if !has_provider {
            self.dom.set_inner_html(CONTENT_ID, templates::NO_PROVIDER_HTML);
            OverlayState::LoadingNoProvider
        } else if selected_text.is_empty() {
            self.dom.set_inner_html(CONTENT_ID, templates::NO_SELECTION_HTML);
            OverlayState::LoadingNoSelection
        } else {
            self.dom.set_inner_html(CONTENT_ID, templates::LOADING_HTML);
            if self.dom.create_element(SPINNER_ID, Some(CONTENT_ID)) {
                for (property, value) in templates::SPINNER_STYLE {
                    self.dom.set_style(SPINNER_ID, property, value);
                }
                self.indicator = Some(LoadingIndicator::Spinner {
                    element_id: SPINNER_ID.to_string(),
                });
            }
            OverlayState::Loading
        };

        self.state
    }

    /// Render the outcome into the overlay. Returns `false` when the overlay
    /// is no longer on the page, in which case nothing is drawn.
    pub fn apply_result(&mut self, update: &OverlayUpdate) -> bool {
        self.stop_animation();

        if !self.dom.has_element(OVERLAY_ID) || !self.dom.has_element(CONTENT_ID) {
            debug!("Overlay gone, dropping result");
            self.release_listeners();
            self.state = OverlayState::Absent;
            return false;
        }

        self.state = match update {
            OverlayUpdate::Error { message } => {
                self.dom
                    .set_inner_html(CONTENT_ID, &templates::error_html(message));
                OverlayState::ShowingError
            }
            OverlayUpdate::Summary { text, .. } if text.trim().is_empty() => {
                self.dom
                    .set_inner_html(CONTENT_ID, templates::GENERIC_ERROR_HTML);
                OverlayState::ShowingError
            }
            OverlayUpdate::Summary { text, .. } => {
                self.dom
                    .ensure_stylesheet(MARKDOWN_STYLESHEET_ID, MARKDOWN_STYLESHEET_HREF);
                let html = templates::result_html(&markdown::render(text), update.provider_label());
                self.dom.set_inner_html(CONTENT_ID, &html);
                for (property, value) in templates::RESULT_STYLE {
                    self.dom.set_style(OVERLAY_ID, property, value);
                }
                OverlayState::ShowingResult
            }
        };

        true
    }

    /// Route a page event. Returns `true` if it closed the overlay.
    pub fn dispatch(&mut self, event: &PageEvent) -> bool {
        if self.state == OverlayState::Absent {
            return false;
        }

        let close = match event {
            PageEvent::Click { target } => {
                let on_close = target.as_deref() == Some(CLOSE_ID);
                let outside = match target {
                    Some(id) => !self.dom.contains(OVERLAY_ID, id),
                    None => true,
                };
                (on_close && self.subscribed(ListenerRole::CloseIcon))
                    || (outside && self.subscribed(ListenerRole::OutsideClick))
            }
            PageEvent::KeyDown { key } => key == "Escape" && self.subscribed(ListenerRole::Escape),
        };

        if close {
            self.dismiss();
        }
        close
    }

    /// Remove the overlay and everything it attached to the page.
    pub fn dismiss(&mut self) {
        if self.state != OverlayState::Absent {
            debug!(state = %self.state, "Dismissing overlay");
        }
        self.teardown();
    }

    /// Take ownership of an animation the host started inside the overlay.
    /// It replaces the spinner; if nothing is loading it is stopped at once.
    pub fn attach_animation(&mut self, mut handle: Box<dyn AnimationHandle>) -> bool {
        if self.state != OverlayState::Loading {
            if let Err(e) = handle.destroy() {
                warn!("{}", e);
            }
            return false;
        }

        self.stop_animation();
        self.indicator = Some(LoadingIndicator::Player(handle));
        true
    }

    /// Stop the loading indicator. Safe to call repeatedly.
    pub fn stop_animation(&mut self) {
        match self.indicator.take() {
            Some(LoadingIndicator::Spinner { element_id }) => {
                self.dom.remove_element(&element_id);
            }
            Some(LoadingIndicator::Player(mut handle)) => {
                if let Err(e) = handle.destroy() {
                    warn!("{}", e);
                }
            }
            None => {}
        }
    }

    fn teardown(&mut self) {
        self.stop_animation();
        self.dom.remove_element(OVERLAY_ID);
        self.release_listeners();
        self.state = OverlayState::Absent;
    }

    fn build_frame(&mut self, rect: Option<&SelectionRect>, has_text: bool) {
        self.dom.create_element(OVERLAY_ID, None);
        for (property, value) in templates::CONTAINER_STYLE {
            self.dom.set_style(OVERLAY_ID, property, value);
        }
        let viewport = self.dom.viewport();
        for (property, value) in self.placement.position(rect, has_text, viewport) {
            self.dom.set_style(OVERLAY_ID, property, &value);
        }

        self.dom.create_element(CLOSE_ID, Some(OVERLAY_ID));
        self.dom.set_inner_html(CLOSE_ID, templates::CLOSE_GLYPH);
        for (property, value) in templates::CLOSE_STYLE {
            self.dom.set_style(CLOSE_ID, property, value);
        }

        self.dom.create_element(TITLE_ID, Some(OVERLAY_ID));
        self.dom.set_inner_html(TITLE_ID, templates::TITLE);
        for (property, value) in templates::TITLE_STYLE {
            self.dom.set_style(TITLE_ID, property, value);
        }

        self.dom.create_element(CONTENT_ID, Some(OVERLAY_ID));
    }

    fn subscribe(&mut self) {
        let close = self
            .dom
            .add_listener(ListenerTarget::Element(CLOSE_ID.to_string()), EventKind::Click);
        let outside = self.dom.add_listener(ListenerTarget::Document, EventKind::Click);
        let escape = self.dom.add_listener(ListenerTarget::Window, EventKind::KeyDown);

        self.subscriptions = vec![
            (ListenerRole::CloseIcon, close),
            (ListenerRole::OutsideClick, outside),
            (ListenerRole::Escape, escape),
        ];
    }

    fn subscribed(&self, role: ListenerRole) -> bool {
        self.subscriptions.iter().any(|(r, _)| *r == role)
    }

    fn release_listeners(&mut self) {
        for (_, id) in self.subscriptions.drain(..) {
            self.dom.remove_listener(id);
        }
    }
}
