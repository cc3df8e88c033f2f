//! Restricted markdown → HTML for summaries. A fixed sequence of regex
//! passes, not a parser: each pass rewrites the output of the previous one.

use std::sync::OnceLock;

use regex::Regex;

/// Block tags that make the outer `<p>` wrapper unnecessary
const BLOCK_PREFIXES: [&str; 5] = ["<h", "<p", "<ul", "<ol", "<blockquote"];

const PASSES: &[(&str, &str)] = &[
    // Headers
    (r"(?m)^# (.*)$", "<h1>${1}</h1>"),
    (r"(?m)^## (.*)$", "<h2>${1}</h2>"),
    (r"(?m)^### (.*)$", "<h3>${1}</h3>"),
    (r"(?m)^#### (.*)$", "<h4>${1}</h4>"),
    (r"(?m)^##### (.*)$", "<h5>${1}</h5>"),
    (r"(?m)^###### (.*)$", "<h6>${1}</h6>"),
    // Bold and italic
    (r"\*\*(.*?)\*\*", "<strong>${1}</strong>"),
    (r"__(.*?)__", "<strong>${1}</strong>"),
    (r"\*(.*?)\*", "<em>${1}</em>"),
    (r"_(.*?)_", "<em>${1}</em>"),
    // Fenced code, with and without a language
    (r"```([a-z]*)\n([\s\S]*?)```", "<pre><code class=\"language-${1}\">${2}</code></pre>"),
    (r"```([\s\S]*?)```", "<pre><code>${1}</code></pre>"),
    // Inline code
    (r"`([^`]+)`", "<code>${1}</code>"),
    // Blockquotes; `>` is already escaped at this point
    (r"(?m)^&gt; (.*)$", "<blockquote>${1}</blockquote>"),
    // Lists
    (r"(?m)^- (.*)$", "<ul><li>${1}</li></ul>"),
    (r"(?m)^\* (.*)$", "<ul><li>${1}</li></ul>"),
    (r"(?m)^\d+\. (.*)$", "<ol><li>${1}</li></ol>"),
    // Links; other schemes stay as plain text
    (
        r"\[([^\]]+)\]\(((?i:https?://|mailto:)[^)]+)\)",
        "<a href=\"${2}\" target=\"_blank\" rel=\"noopener noreferrer\">${1}</a>",
    ),
    // Line breaks
    (r"\n\n", "</p><p>"),
    (r"\n", "<br>"),
    // Adjacent list items collapse into one list
    (r"</ul>(?:<br>)?<ul>", ""),
    (r"</ol>(?:<br>)?<ol>", ""),
];

fn pipeline() -> &'static [(Regex, &'static str)] {
    static PIPELINE: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PIPELINE.get_or_init(|| {
        PASSES
            .iter()
            .map(|(pattern, replacement)| {
                (Regex::new(pattern).expect("invalid markdown pattern"), *replacement)
            })
            .collect()
    })
}

/// Escape text for use inside HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render summary markdown to HTML.
pub fn render(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut html = escape_html(&text.replace("\r\n", "\n"));
    for (regex, replacement) in pipeline() {
        html = regex.replace_all(&html, *replacement).into_owned();
    }

    if BLOCK_PREFIXES.iter().any(|prefix| html.starts_with(prefix)) {
        html
    } else {
        format!("<p>{}</p>", html)
    }
}
