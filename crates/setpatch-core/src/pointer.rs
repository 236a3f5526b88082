// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON Pointer helpers.
//!
//! Pointers are built incrementally while walking a document: every object
//! member or array index appends one escaped reference token. Escaping
//! follows RFC 6901 section 3: `~` becomes `~0` and `/` becomes `~1`.
//!
//! [`to_pattern`] renders a concrete pointer in the coarser pattern notation
//! used by collection rules (`$`, `.name`, `[*]`).

use std::borrow::Cow;
use std::fmt::Write as _;

/// Escape a single reference token.
#[must_use]
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Decode a single reference token.
///
/// `~1` is decoded before `~0` so that `~01` yields `~1` rather than `/`.
#[must_use]
pub fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Append an object member name to `path`.
///
/// ```
/// use setpatch_core::pointer::extend;
///
/// assert_eq!(extend("", "a"), "/a");
/// assert_eq!(extend("/a", "b/c"), "/a/b~1c");
/// ```
#[must_use]
pub fn extend(path: &str, segment: &str) -> String {
    let escaped = escape_segment(segment);
    let mut out = String::with_capacity(path.len() + escaped.len() + 1);
    out.push_str(path);
    out.push('/');
    out.push_str(&escaped);
    out
}

/// Append an array index to `path`.
#[must_use]
pub fn extend_index(path: &str, index: usize) -> String {
    let mut out = String::with_capacity(path.len() + 4);
    out.push_str(path);
    // Writing to a String cannot fail.
    let _ = write!(out, "/{index}");
    out
}

/// Split a pointer into decoded reference tokens.
///
/// The empty pointer (the whole document) yields no tokens. A pointer that
/// does not start with `/` is treated as if it did.
pub fn segments(pointer: &str) -> impl Iterator<Item = Cow<'_, str>> {
    let root = pointer.is_empty();
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/')
        .filter(move |_| !root)
        .map(unescape_segment)
}

/// True if the token is a non-empty run of ASCII digits.
#[must_use]
pub fn is_index_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Render a pointer as a collections pattern.
///
/// Numeric tokens become `[*]`, everything else `.name`. Empty tokens are
/// skipped, so both `""` and `"/"` render as `$`.
///
/// ```
/// use setpatch_core::pointer::to_pattern;
///
/// assert_eq!(to_pattern(""), "$");
/// assert_eq!(to_pattern("/t/3/v"), "$.t[*].v");
/// ```
#[must_use]
pub fn to_pattern(pointer: &str) -> String {
    let mut out = String::with_capacity(pointer.len() + 1);
    out.push('$');
    for segment in segments(pointer) {
        if segment.is_empty() {
            continue;
        }
        if is_index_segment(&segment) {
            out.push_str("[*]");
        } else {
            out.push('.');
            out.push_str(&segment);
        }
    }
    out
}
