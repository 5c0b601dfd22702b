//! Rendering of an environment snapshot into a CGI HTML response.

use std::collections::HashMap;
use std::fmt;

/// The CGI header line that precedes every rendered page.
pub const CONTENT_TYPE_HEADER: &str = "Content-type: text/html";

const PAGE_TITLE: &str = "Situation snapshot";

/// A mapping of environment variable names to values.
///
/// Iteration order of the map does not matter. Entries are always rendered
/// sorted by name.
pub type EnvironmentMap = HashMap<String, String>;

/// A complete CGI response: the header block, a blank line, and the HTML document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    text: String,
    body_start: usize,
}

impl RenderedPage {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The CGI header block, without the terminating blank line.
    pub fn header(&self) -> &str {
        // body_start always points just past "\n\n"
        &self.text[..self.body_start - 2]
    }

    /// The HTML document.
    pub fn body(&self) -> &str {
        &self.text[self.body_start..]
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.text.into_bytes()
    }
}

impl fmt::Display for RenderedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render the environment page.
///
/// Every key, every value, and the version string are HTML-escaped before they
/// are embedded. Entries are sorted by key in code-point order, so the same
/// input always yields byte-identical output.
pub fn render(env: &EnvironmentMap, version: &str) -> RenderedPage {
    let mut entries: Vec<(&str, &str)> = env
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut text = String::with_capacity(256 + entries.len() * 64);
    text.push_str(CONTENT_TYPE_HEADER);
    text.push_str("\n\n");
    let body_start = text.len();

    text.push_str(&format!(
        "<html><head><title>{}</title></head><body>\n",
        PAGE_TITLE
    ));
    text.push_str("<p>Running:\n");
    text.push_str(&format!("<b>{}</b></p>\n", escape_html(version)));
    text.push_str("<p>Environmental variables:</p>\n");
    text.push_str("<ul>\n");
    for (key, value) in entries {
        text.push_str(&format!(
            "<li><b>{}:</b>\t\t{}<br></li>\n",
            escape_html(key),
            escape_html(value)
        ));
    }
    text.push_str("</ul>\n");
    text.push_str("</body></html>\n");

    RenderedPage { text, body_start }
}

/// Escape a string for embedding in HTML text or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
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
