//! HTML entity decoding.
//!
//! Named entities are resolved through a compact trie with longest-match
//! semantics: both the `&amp;` and the legacy semicolon-less `&amp` form
//! are entries, so a single forward match handles either. Numeric
//! references decode with the HTML5 quirks: C1 control code points are
//! remapped through the Windows-1252 table, and NUL, surrogates, and
//! out-of-range values become U+FFFD.

use crate::base::Trie;
use lazy_static::lazy_static;
use std::borrow::Cow;
use std::char;

/// The named entity table: entity name (without `&` and `;`), replacement
/// text, and whether the legacy semicolon-less form also resolves.
#[rustfmt::skip]
static NAMED: &[(&str, &str, bool)] = &[
    // Markup-significant and internal.
    ("AMP", "&", true), ("amp", "&", true), ("APOS", "'", false), ("apos", "'", false),
    ("GT", ">", true), ("gt", ">", true), ("LT", "<", true), ("lt", "<", true),
    ("QUOT", "\"", true), ("quot", "\"", true),
    // Latin-1.
    ("nbsp", "\u{A0}", true), ("iexcl", "¡", true), ("cent", "¢", true), ("pound", "£", true),
    ("curren", "¤", true), ("yen", "¥", true), ("brvbar", "¦", true), ("sect", "§", true),
    ("uml", "¨", true), ("COPY", "©", true), ("copy", "©", true), ("ordf", "ª", true),
    ("laquo", "«", true), ("not", "¬", true), ("shy", "\u{AD}", true), ("REG", "®", true),
    ("reg", "®", true), ("macr", "¯", true), ("deg", "°", true), ("plusmn", "±", true),
    ("sup2", "²", true), ("sup3", "³", true), ("acute", "´", true), ("micro", "µ", true),
    ("para", "¶", true), ("middot", "·", true), ("cedil", "¸", true), ("sup1", "¹", true),
    ("ordm", "º", true), ("raquo", "»", true), ("frac14", "¼", true), ("frac12", "½", true),
    ("frac34", "¾", true), ("iquest", "¿", true),
    ("Agrave", "À", true), ("Aacute", "Á", true), ("Acirc", "Â", true), ("Atilde", "Ã", true),
    ("Auml", "Ä", true), ("Aring", "Å", true), ("AElig", "Æ", true), ("Ccedil", "Ç", true),
    ("Egrave", "È", true), ("Eacute", "É", true), ("Ecirc", "Ê", true), ("Euml", "Ë", true),
    ("Igrave", "Ì", true), ("Iacute", "Í", true), ("Icirc", "Î", true), ("Iuml", "Ï", true),
    ("ETH", "Ð", true), ("Ntilde", "Ñ", true), ("Ograve", "Ò", true), ("Oacute", "Ó", true),
    ("Ocirc", "Ô", true), ("Otilde", "Õ", true), ("Ouml", "Ö", true), ("times", "×", true),
    ("Oslash", "Ø", true), ("Ugrave", "Ù", true), ("Uacute", "Ú", true), ("Ucirc", "Û", true),
    ("Uuml", "Ü", true), ("Yacute", "Ý", true), ("THORN", "Þ", true), ("szlig", "ß", true),
    ("agrave", "à", true), ("aacute", "á", true), ("acirc", "â", true), ("atilde", "ã", true),
    ("auml", "ä", true), ("aring", "å", true), ("aelig", "æ", true), ("ccedil", "ç", true),
    ("egrave", "è", true), ("eacute", "é", true), ("ecirc", "ê", true), ("euml", "ë", true),
    ("igrave", "ì", true), ("iacute", "í", true), ("icirc", "î", true), ("iuml", "ï", true),
    ("eth", "ð", true), ("ntilde", "ñ", true), ("ograve", "ò", true), ("oacute", "ó", true),
    ("ocirc", "ô", true), ("otilde", "õ", true), ("ouml", "ö", true), ("divide", "÷", true),
    ("oslash", "ø", true), ("ugrave", "ù", true), ("uacute", "ú", true), ("ucirc", "û", true),
    ("uuml", "ü", true), ("yacute", "ý", true), ("thorn", "þ", true), ("yuml", "ÿ", true),
    // Latin Extended and punctuation.
    ("OElig", "Œ", false), ("oelig", "œ", false), ("Scaron", "Š", false), ("scaron", "š", false),
    ("Yuml", "Ÿ", false), ("fnof", "ƒ", false), ("circ", "ˆ", false), ("tilde", "˜", false),
    ("ensp", "\u{2002}", false), ("emsp", "\u{2003}", false), ("thinsp", "\u{2009}", false),
    ("zwnj", "\u{200C}", false), ("zwj", "\u{200D}", false), ("lrm", "\u{200E}", false),
    ("rlm", "\u{200F}", false), ("ndash", "–", false), ("mdash", "—", false),
    ("lsquo", "\u{2018}", false), ("rsquo", "\u{2019}", false), ("sbquo", "\u{201A}", false),
    ("ldquo", "\u{201C}", false), ("rdquo", "\u{201D}", false), ("bdquo", "\u{201E}", false),
    ("dagger", "†", false), ("Dagger", "‡", false), ("bull", "•", false), ("hellip", "…", false),
    ("permil", "‰", false), ("prime", "′", false), ("Prime", "″", false),
    ("lsaquo", "‹", false), ("rsaquo", "›", false), ("oline", "‾", false),
    ("frasl", "⁄", false), ("euro", "€", false),
    // Greek.
    ("Alpha", "Α", false), ("Beta", "Β", false), ("Gamma", "Γ", false), ("Delta", "Δ", false),
    ("Epsilon", "Ε", false), ("Zeta", "Ζ", false), ("Eta", "Η", false), ("Theta", "Θ", false),
    ("Iota", "Ι", false), ("Kappa", "Κ", false), ("Lambda", "Λ", false), ("Mu", "Μ", false),
    ("Nu", "Ν", false), ("Xi", "Ξ", false), ("Omicron", "Ο", false), ("Pi", "Π", false),
    ("Rho", "Ρ", false), ("Sigma", "Σ", false), ("Tau", "Τ", false), ("Upsilon", "Υ", false),
    ("Phi", "Φ", false), ("Chi", "Χ", false), ("Psi", "Ψ", false), ("Omega", "Ω", false),
    ("alpha", "α", false), ("beta", "β", false), ("gamma", "γ", false), ("delta", "δ", false),
    ("epsilon", "ε", false), ("zeta", "ζ", false), ("eta", "η", false), ("theta", "θ", false),
    ("iota", "ι", false), ("kappa", "κ", false), ("lambda", "λ", false), ("mu", "μ", false),
    ("nu", "ν", false), ("xi", "ξ", false), ("omicron", "ο", false), ("pi", "π", false),
    ("rho", "ρ", false), ("sigmaf", "ς", false), ("sigma", "σ", false), ("tau", "τ", false),
    ("upsilon", "υ", false), ("phi", "φ", false), ("chi", "χ", false), ("psi", "ψ", false),
    ("omega", "ω", false), ("thetasym", "ϑ", false), ("upsih", "ϒ", false), ("piv", "ϖ", false),
    // Letterlike symbols, arrows, math.
    ("weierp", "℘", false), ("image", "ℑ", false), ("real", "ℜ", false), ("trade", "™", false),
    ("alefsym", "ℵ", false), ("larr", "←", false), ("uarr", "↑", false), ("rarr", "→", false),
    ("darr", "↓", false), ("harr", "↔", false), ("crarr", "↵", false), ("lArr", "⇐", false),
    ("uArr", "⇑", false), ("rArr", "⇒", false), ("dArr", "⇓", false), ("hArr", "⇔", false),
    ("forall", "∀", false), ("part", "∂", false), ("exist", "∃", false), ("empty", "∅", false),
    ("nabla", "∇", false), ("isin", "∈", false), ("notin", "∉", false), ("ni", "∋", false),
    ("prod", "∏", false), ("sum", "∑", false), ("minus", "−", false), ("lowast", "∗", false),
    ("radic", "√", false), ("prop", "∝", false), ("infin", "∞", false), ("ang", "∠", false),
    ("and", "∧", false), ("or", "∨", false), ("cap", "∩", false), ("cup", "∪", false),
    ("int", "∫", false), ("there4", "∴", false), ("sim", "∼", false), ("cong", "≅", false),
    ("asymp", "≈", false), ("ne", "≠", false), ("equiv", "≡", false), ("le", "≤", false),
    ("ge", "≥", false), ("sub", "⊂", false), ("sup", "⊃", false), ("nsub", "⊄", false),
    ("sube", "⊆", false), ("supe", "⊇", false), ("oplus", "⊕", false), ("otimes", "⊗", false),
    ("perp", "⊥", false), ("sdot", "⋅", false), ("lceil", "⌈", false), ("rceil", "⌉", false),
    ("lfloor", "⌊", false), ("rfloor", "⌋", false), ("lang", "〈", false), ("rang", "〉", false),
    ("loz", "◊", false), ("spades", "♠", false), ("clubs", "♣", false), ("hearts", "♥", false),
    ("diams", "♦", false),
];

lazy_static! {
    static ref ENTITY_TRIE: Trie<&'static str> = {
        let mut trie = Trie::new();

        for &(name, text, legacy) in NAMED {
            let mut with_semi = String::with_capacity(name.len() + 1);

            with_semi.push_str(name);
            with_semi.push(';');

            trie.insert(with_semi.as_bytes(), text);

            if legacy {
                trie.insert(name.as_bytes(), text);
            }
        }

        trie
    };
}

/// Windows-1252 remapping for numeric references in the C1 range, per
/// the HTML5 "numeric character reference end state".
fn remap_c1(cp: u32) -> Option<char> {
    let ch = match cp {
        0x80 => '€', 0x82 => '‚', 0x83 => 'ƒ', 0x84 => '„',
        0x85 => '…', 0x86 => '†', 0x87 => '‡', 0x88 => 'ˆ',
        0x89 => '‰', 0x8A => 'Š', 0x8B => '‹', 0x8C => 'Œ',
        0x8E => 'Ž', 0x91 => '\u{2018}', 0x92 => '\u{2019}', 0x93 => '\u{201C}',
        0x94 => '\u{201D}', 0x95 => '•', 0x96 => '–', 0x97 => '—',
        0x98 => '˜', 0x99 => '™', 0x9A => 'š', 0x9B => '›',
        0x9C => 'œ', 0x9E => 'ž', 0x9F => 'Ÿ',
        _ => return None,
    };

    Some(ch)
}

fn numeric_to_char(cp: u32) -> char {
    if let Some(remapped) = remap_c1(cp) {
        return remapped;
    }

    match cp {
        0 | 0xD800..=0xDFFF => '\u{FFFD}',
        cp => char::from_u32(cp).unwrap_or('\u{FFFD}'),
    }
}

/// Attempts to decode one character reference at `input[..]`, which must
/// start right after a `&`. Returns the consumed byte count and the
/// replacement text.
///
/// `in_attribute` applies the HTML5 attribute-value restriction: a legacy
/// semicolon-less name followed by `=` or an alphanumeric is left alone
/// (so `&lt=1` inside a query string survives).
fn decode_one(input: &[u8], in_attribute: bool) -> Option<(usize, Cow<'static, str>)> {
    if input.first() == Some(&b'#') {
        let (digits_at, radix): (usize, u32) = match input.get(1) {
            Some(b'x') | Some(b'X') => (2, 16),
            _ => (1, 10),
        };

        let mut cp: u32 = 0;
        let mut pos = digits_at;
        let mut saw_digit = false;

        while let Some(&b) = input.get(pos) {
            let digit = (b as char).to_digit(radix);

            match digit {
                Some(d) => {
                    // NOTE: saturate instead of overflowing; anything
                    // past the code point range is U+FFFD regardless.
                    cp = cp.saturating_mul(radix).saturating_add(d);
                    saw_digit = true;
                    pos += 1;
                }
                None => break,
            }
        }

        if !saw_digit {
            return None;
        }

        if input.get(pos) == Some(&b';') {
            pos += 1;
        }

        return Some((pos, Cow::Owned(numeric_to_char(cp).to_string())));
    }

    let (len, &text) = ENTITY_TRIE.longest_match(input)?;

    if in_attribute && input.get(len - 1) != Some(&b';') {
        match input.get(len) {
            Some(&b) if b == b'=' || b.is_ascii_alphanumeric() => return None,
            _ => {}
        }
    }

    Some((len, Cow::Borrowed(text)))
}

fn decode_impl(text: &str, in_attribute: bool) -> Cow<'_, str> {
    let bytes = text.as_bytes();

    let first_amp = match memchr::memchr(b'&', bytes) {
        Some(pos) => pos,
        None => return Cow::Borrowed(text),
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..first_amp]);

    let mut pos = first_amp;

    while pos < bytes.len() {
        if bytes[pos] == b'&' {
            if let Some((len, decoded)) = decode_one(&bytes[pos + 1..], in_attribute) {
                out.push_str(&decoded);
                pos += 1 + len;
                continue;
            }
        }

        let next_amp = memchr::memchr(b'&', &bytes[pos + 1..])
            .map(|i| pos + 1 + i)
            .unwrap_or_else(|| bytes.len());

        out.push_str(&text[pos..next_amp]);
        pos = next_amp;
    }

    Cow::Owned(out)
}

/// Decodes entities in element text content.
pub fn decode(text: &str) -> Cow<'_, str> {
    decode_impl(text, false)
}

/// Decodes entities in an attribute value.
pub fn decode_attr(text: &str) -> Cow<'_, str> {
    decode_impl(text, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named() {
        assert_eq!(decode("a &amp; b"), "a & b");
        assert_eq!(decode("&lt;script&gt;"), "<script>");
        assert_eq!(decode("&copy;&trade;"), "©™");
    }

    #[test]
    fn legacy_without_semicolon() {
        assert_eq!(decode("&ampx"), "&x");
        assert_eq!(decode("&copy 2020"), "© 2020");
        // Non-legacy names need the semicolon.
        assert_eq!(decode("&tradex"), "&tradex");
    }

    #[test]
    fn attribute_mode_guard() {
        assert_eq!(decode_attr("?a=1&lt=2"), "?a=1&lt=2");
        assert_eq!(decode_attr("?a=1&lt;=2"), "?a=1<=2");
        assert_eq!(decode_attr("x &amp y"), "x & y");
    }

    #[test]
    fn numeric() {
        assert_eq!(decode("&#65;&#x42;"), "AB");
        assert_eq!(decode("&#x26;#x26;"), "&#x26;");
        // No digits: literal.
        assert_eq!(decode("&#;"), "&#;");
        assert_eq!(decode("&#x;"), "&#x;");
    }

    #[test]
    fn numeric_quirks() {
        // C1 remap.
        assert_eq!(decode("&#150;"), "–");
        assert_eq!(decode("&#x99;"), "™");
        // NUL, surrogates and out-of-range are replaced.
        assert_eq!(decode("&#0;"), "\u{FFFD}");
        assert_eq!(decode("&#xD800;"), "\u{FFFD}");
        assert_eq!(decode("&#x110000;"), "\u{FFFD}");
        assert_eq!(decode("&#99999999999999;"), "\u{FFFD}");
    }

    #[test]
    fn double_encoding_is_preserved() {
        // `&amp;#x26;` is an encoded `&#x26;`, not an encoded `&`.
        assert_eq!(decode("&amp;#x26;"), "&#x26;");
    }

    #[test]
    fn bare_ampersands() {
        assert_eq!(decode("a & b && c"), "a & b && c");
        assert_eq!(decode("&nosuchentity;"), "&nosuchentity;");
        assert_eq!(decode("&"), "&");
    }
}
