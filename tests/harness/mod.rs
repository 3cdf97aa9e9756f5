//! Shared helpers for the integration suites.

use scour::sanitize;

/// Asserts the fixed point property: sanitizing sanitized output changes
/// nothing.
pub fn assert_idempotent(input: &str) {
    let once = sanitize(input);
    let twice = sanitize(&once);

    assert_eq!(once, twice, "sanitize is not idempotent for {:?}", input);
}

/// A minimal well-formedness check over the sanitizer's own canonical
/// output syntax: every open tag matches its close, properly nested.
pub fn assert_balanced(output: &str) {
    let mut stack: Vec<String> = Vec::new();
    let bytes = output.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let close = i + 1 < bytes.len() && bytes[i + 1] == b'/';
        let name_at = if close { i + 2 } else { i + 1 };
        let mut j = name_at;

        while j < bytes.len() && bytes[j] != b'>' && bytes[j] != b' ' {
            j += 1;
        }

        let name = output[name_at..j].to_string();

        assert!(!name.is_empty(), "stray `<` in output {:?}", output);

        // Find the actual tag end (attribute values are always quoted in
        // canonical output, so a bare `>` ends the tag).
        let mut end = j;
        let mut in_quotes = false;

        while end < bytes.len() {
            match bytes[end] {
                b'"' => in_quotes = !in_quotes,
                b'>' if !in_quotes => break,
                _ => {}
            }

            end += 1;
        }

        assert!(end < bytes.len(), "unterminated tag in output {:?}", output);

        let self_closing = bytes[end - 1] == b'/';

        if close {
            let top = stack.pop();

            assert_eq!(
                top.as_deref(),
                Some(name.as_str()),
                "mis-nested close in output {:?}",
                output
            );
        } else if !self_closing {
            stack.push(name);
        }

        i = end + 1;
    }

    assert!(
        stack.is_empty(),
        "unclosed tags {:?} in output {:?}",
        stack,
        output
    );
}
