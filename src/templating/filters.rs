//! Text safety filters applied to sermon-authored text.
//!
//! Titles, descriptions and entity names come from an admin form and may carry
//! leftover backslash escaping from the storage layer (`O\'Brien`). Every such
//! value goes through [`safe_text`] before it is emitted: backslash escaping is
//! removed first, then the result is HTML-escaped. Values placed in attributes
//! use [`safe_attr`].
//!
//! Markup authored directly in the template is never touched here.

use std::borrow::Cow;

/// Remove one level of backslash escaping.
///
/// `\x` becomes `x`, `\\` becomes `\`, and a trailing lone backslash is dropped.
#[must_use]
pub fn strip_slashes(input: &str) -> Cow<'_, str> {
    if !input.contains('\\') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Escape text for use between HTML tags, after stripping backslash escaping.
#[must_use]
pub fn safe_text(input: &str) -> String {
    html_escape::encode_text(&strip_slashes(input)).into_owned()
}

/// Escape a value for use inside a double-quoted HTML attribute.
#[must_use]
pub fn safe_attr(input: &str) -> String {
    html_escape::encode_double_quoted_attribute(&strip_slashes(input)).into_owned()
}

/// Escape a multi-line description, turning line breaks into `<br />`.
#[must_use]
pub fn safe_multiline(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n");
    normalized
        .trim()
        .split('\n')
        .map(safe_text)
        .collect::<Vec<_>>()
        .join("<br />\n")
}
