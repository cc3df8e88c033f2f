//! Markup and inline styles of the overlay panels.

use super::markdown::escape_html;

pub const CONTAINER_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("z-index", "2147483647"),
    ("padding", "16px"),
    ("background", "#ffffff"),
    ("border", "1px solid #e0e0e0"),
    ("border-radius", "8px"),
    ("box-shadow", "0 4px 20px rgba(0,0,0,0.2)"),
    ("max-width", "400px"),
    ("max-height", "70vh"),
    ("overflow-y", "auto"),
    (
        "font-family",
        "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, Helvetica, Arial, sans-serif",
    ),
    ("font-size", "14px"),
];

/// Applied when a summary arrives
pub const RESULT_STYLE: &[(&str, &str)] = &[
    ("max-width", "400px"),
    ("width", "380px"),
    ("max-height", "70vh"),
];

pub const CLOSE_STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("top", "0"),
    ("right", "0"),
    ("cursor", "pointer"),
    ("font-size", "18px"),
    ("line-height", "1"),
    ("padding", "4px 8px"),
];

pub const TITLE_STYLE: &[(&str, &str)] = &[("font-weight", "bold"), ("margin-bottom", "12px"), ("padding-right", "30px")];

pub const SPINNER_STYLE: &[(&str, &str)] = &[
    ("display", "inline-block"),
    ("width", "30px"),
    ("height", "30px"),
    ("border", "3px solid rgba(66, 133, 244, 0.2)"),
    ("border-radius", "50%"),
    ("border-top-color", "#4285f4"),
    ("animation", "spin 1s ease-in-out infinite"),
];

pub const CLOSE_GLYPH: &str = "✕";
pub const TITLE: &str = "SummarizeShortcut";

pub const LOADING_HTML: &str = r#"<div style="margin-top: 12px; color: #555; text-align: center;">Summarizing your text...</div><style>@keyframes spin { to { transform: rotate(360deg); } }</style>"#;

pub const NO_PROVIDER_HTML: &str = r#"<div style="color: #d32f2f;"><p><strong>LLM Provider Missing</strong></p><p>Please select and configure an LLM provider in the extension settings.</p><p style="margin-top: 12px; font-size: 13px;">Click on the extension icon in your toolbar to set up.</p></div>"#;

pub const NO_SELECTION_HTML: &str = r#"<div><p><strong>No text selected</strong></p><p>Please highlight text to summarize.</p><hr style="margin: 12px 0; border: none; border-top: 1px solid #eee;"><p><strong>How to use:</strong></p><ol style="padding-left: 20px; margin: 8px 0;"><li>Highlight text on the webpage</li><li>Press <strong>Ctrl+Shift+S</strong> <small>(Command+Shift+S on Mac)</small></li><li>A summary will appear next to your selection</li></ol></div>"#;

pub const GENERIC_ERROR_HTML: &str = r#"<div style="color: #d32f2f;"><p><strong>Error</strong></p><p>Failed to generate summary. Please try again.</p></div>"#;

pub fn error_html(message: &str) -> String {
    let message = if message.trim().is_empty() {
        "Unknown error"
    } else {
        message
    };

    format!(
        r#"<div style="color: #d32f2f;"><p><strong>Error</strong></p><p>Failed to generate summary:</p><p style="margin-top: 8px; padding: 8px; background: #fdeded; border-radius: 4px;">{}</p></div>"#,
        escape_html(message)
    )
}

pub fn result_html(rendered_markdown: &str, provider_label: &str) -> String {
    format!(
        r#"<div class="markdown-content" style="padding: 4px 0;">{}</div><div style="margin-top: 12px; font-size: 12px; color: #666; text-align: right; border-top: 1px solid #f0f0f0; padding-top: 8px;">Summarized with {}</div>"#,
        rendered_markdown,
        escape_html(provider_label)
    )
}
