//! ASCII-only lexical helpers shared by the HTML and CSS lexers.
//!
//! Case folding here is strictly `A-Z → a-z` and locale-independent:
//! HTML and CSS name comparisons are defined over ASCII regardless of
//! the user's locale.

#[inline]
pub fn is_ascii_alpha(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z')
}

#[inline]
pub fn is_hex_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F')
}

/// HTML whitespace: space, TAB, LF, FF, CR. This is narrower than
/// Unicode whitespace and must stay that way (e.g. NBSP is not HTML
/// whitespace).
#[inline]
pub fn is_html_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\x0C' | b'\r')
}

#[inline]
pub fn to_ascii_lower(b: u8) -> u8 {
    if b.is_ascii_uppercase() {
        b | 0x20
    } else {
        b
    }
}

/// Lowercases `A-Z` only, leaving all other bytes (including non-ASCII
/// UTF-8 sequences) untouched.
pub fn ascii_lowercase(s: &str) -> String {
    // NOTE: byte-wise fold is safe since it only touches ASCII bytes,
    // which never occur inside multibyte UTF-8 sequences.
    let mut out = Vec::with_capacity(s.len());

    for &b in s.as_bytes() {
        out.push(to_ascii_lower(b));
    }

    unsafe { String::from_utf8_unchecked(out) }
}

pub fn eq_ignore_ascii_case(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.as_bytes()
            .iter()
            .zip(b.as_bytes())
            .all(|(&x, &y)| to_ascii_lower(x) == to_ascii_lower(y))
}

/// True iff the string consists entirely of HTML whitespace (or is empty).
pub fn is_all_html_ws(s: &str) -> bool {
    s.bytes().all(is_html_ws)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_is_ascii_only() {
        assert_eq!(ascii_lowercase("DIV"), "div");
        assert_eq!(ascii_lowercase("svg:FOO"), "svg:foo");
        // U+0130 LATIN CAPITAL LETTER I WITH DOT ABOVE must not fold.
        assert_eq!(ascii_lowercase("\u{130}X"), "\u{130}x");
    }

    #[test]
    fn html_ws() {
        assert!(is_all_html_ws(" \t\r\n\x0C"));
        assert!(!is_all_html_ws(" \u{A0}"));
        assert!(is_all_html_ws(""));
    }
}
