//! Escaping HTML builder for display units
//!
//! Data never reaches the markup through string formatting: attribute
//! values are HTML-escaped and JSON embedded in a script element has every
//! character that could close the element or break a JS parser escaped.

use serde::Serialize;

/// Escape text for use in element content or a quoted attribute value
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize a value to JSON that is safe inside a `<script>` element.
///
/// `<`, `>` and `&` only occur inside JSON strings, so replacing them with
/// `\u` escapes keeps the JSON equivalent.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    Ok(out)
}

/// A single HTML element with escaped attributes
#[derive(Debug, Clone)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    body: String,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            body: String::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Text content, HTML-escaped
    pub fn text(mut self, text: &str) -> Self {
        self.body = escape_html(text);
        self
    }

    /// Script content that is already safe for a `<script>` element,
    /// as produced by [`script_json`] or built from it
    pub(crate) fn script_body(mut self, script: String) -> Self {
        self.body = script;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        out.push('>');
        out.push_str(&self.body);
        out.push_str(&format!("</{}>", self.tag));
        out
    }
}
