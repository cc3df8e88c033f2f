use serde::{Deserialize, Serialize};

use super::dom::Viewport;
use crate::page::SelectionRect;

/// Assumed overlay footprint used to keep the anchored variant on screen
const ANCHORED_WIDTH: f64 = 350.0;
const ANCHORED_HEIGHT: f64 = 200.0;
const ANCHOR_GAP: f64 = 20.0;

/// Where the overlay goes on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Fixed to the bottom-right corner of the viewport
    #[default]
    BottomRight,
    /// To the right of the selection, clamped to the viewport
    #[serde(alias = "selection")]
    SelectionAnchored,
}

impl Placement {
    /// CSS position properties for the overlay container.
    ///
    /// The anchored variant only uses `rect` when text is selected; without
    /// one it falls back to the right side, a third of the way down.
    pub fn position(
        &self,
        rect: Option<&SelectionRect>,
        has_text: bool,
        viewport: Viewport,
    ) -> Vec<(&'static str, String)> {
        match self {
            Placement::BottomRight => vec![
                ("bottom", "20px".to_string()),
                ("right", "20px".to_string()),
                ("left", "auto".to_string()),
                ("top", "auto".to_string()),
            ],
            Placement::SelectionAnchored => {
                let (right, top) = match rect.filter(|_| has_text) {
                    Some(r) => (r.right, r.top),
                    None => (viewport.width - 400.0, viewport.height / 3.0),
                };

                let mut left = right + ANCHOR_GAP;
                let mut top = top;
                if left + ANCHORED_WIDTH > viewport.width {
                    left = viewport.width - (ANCHORED_WIDTH + ANCHOR_GAP);
                }
                if top + ANCHORED_HEIGHT > viewport.height {
                    top = viewport.height - (ANCHORED_HEIGHT + ANCHOR_GAP);
                }

                vec![
                    ("left", format!("{}px", left)),
                    ("top", format!("{}px", top)),
                    ("bottom", "auto".to_string()),
                    ("right", "auto".to_string()),
                ]
            }
        }
    }
}
