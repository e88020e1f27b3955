#![forbid(unsafe_code)]

//! Inline style markup understood by the output sink.
//!
//! # Syntax
//!
//! - `<color=#rrggbb>text</color>` - colored text
//! - `<b>text</b>` - bold text
//! - `&lt;` `&gt;` `&amp;` - literal `<`, `>`, `&`
//!
//! Anything between `<` and `>` is a tag. [`strip`] removes tags and
//! decodes the three entities; it never fails, so malformed markup degrades
//! to its visible text.
//!
//! # Example
//! ```
//! use journal_core::Rgb;
//! use journal_view::markup::{bold, colored, strip};
//!
//! let markup = format!("{}: {}", bold(&colored("A<b>", Rgb::new(255, 0, 0))), "hi & bye");
//! assert_eq!(strip(&markup), "A<b>: hi & bye");
//! ```

use journal_core::Rgb;

/// Escape text so it renders literally.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// Wrap escaped `text` in a color tag.
#[must_use]
pub fn colored(text: &str, color: Rgb) -> String {
    format!("<color={}>{}</color>", color.to_hex(), escape(text))
}

/// Wrap already-formatted markup in a bold tag.
#[must_use]
pub fn bold(markup: &str) -> String {
    format!("<b>{markup}</b>")
}

/// Remove tags and decode entities.
#[must_use]
pub fn strip(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(pos) = rest.find(['<', '&']) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if rest.starts_with('<') {
            match rest.find('>') {
                Some(end) => rest = &rest[end + 1..],
                None => {
                    // Unterminated tag: keep as text.
                    out.push_str(rest);
                    rest = "";
                }
            }
            continue;
        }
        let (decoded, len) = if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else if rest.starts_with("&amp;") {
            ('&', 5)
        } else {
            ('&', 1)
        };
        out.push(decoded);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}
