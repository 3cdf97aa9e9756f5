//! The normalizing CSS tokenizer.
//!
//! A one-shot lexer that rewrites CSS source into a canonical,
//! bypass-resistant form while recording token boundaries:
//!
//! - whitespace, comments, and the HTML `<!--`/`-->` sequences collapse
//!   to single spaces;
//! - strings are re-emitted single-quoted with markup-significant
//!   characters hex-escaped;
//! - `url(…)` bodies are percent-encoded and single-quoted;
//! - identifiers, units, and hex literals are ASCII-lowercased with
//!   escape sequences decoded;
//! - brackets come out balanced: unclosed opens get synthetic closes,
//!   orphan closes are dropped;
//! - a delimiter that could merge with the next token is followed by a
//!   space.
//!
//! The result is the normalized text, a sorted token-start array (with
//! an end sentinel), a parallel token-type array, and a bracket-partner
//! map resolvable in `O(log n)`.

use crate::base::strings::{is_hex_digit, to_ascii_lower};
use crate::base::Trie;
use lazy_static::lazy_static;
use std::char;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CssTokenType {
    Ident,
    DotIdent,
    Function,
    At,
    HashId,
    HashUnrestricted,
    String,
    Url,
    Delim,
    Number,
    Percentage,
    Dimension,
    BadDimension,
    UnicodeRange,
    Match,
    Column,
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    LeftSquare,
    RightSquare,
    LeftParen,
    RightParen,
    LeftCurly,
    RightCurly,
}

impl CssTokenType {
    #[inline]
    pub fn is_open_bracket(self) -> bool {
        matches!(
            self,
            CssTokenType::Function
                | CssTokenType::LeftParen
                | CssTokenType::LeftSquare
                | CssTokenType::LeftCurly
        )
    }
}

lazy_static! {
    /// Well-known unit suffixes: lengths, angles, time, frequency,
    /// resolution, and flex. Anything else attached to a number is a
    /// `BadDimension` that the property filter rejects.
    static ref KNOWN_UNITS: Trie<()> = Trie::from_entries(
        [
            "ch", "cm", "deg", "dpcm", "dpi", "dppx", "em", "ex", "fr", "grad", "hz", "in",
            "khz", "mm", "ms", "pc", "pt", "px", "q", "rad", "rem", "s", "turn", "vh", "vmax",
            "vmin", "vw",
        ]
        .iter()
        .map(|&unit| (unit,())),
    );
}

pub struct CssTokens {
    normalized: String,
    /// Token start offsets, sorted, with a sentinel at the end equal to
    /// `normalized.len()`.
    starts: Vec<usize>,
    types: Vec<CssTokenType>,
    /// `(token index, partner token index)` pairs sorted by token index.
    brackets: Vec<(usize, usize)>,
}

impl CssTokens {
    pub fn lex(css: &str) -> CssTokens {
        Lexer::new(css).run()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[inline]
    pub fn token_type(&self, i: usize) -> CssTokenType {
        self.types[i]
    }

    #[inline]
    pub fn token_text(&self, i: usize) -> &str {
        &self.normalized[self.starts[i]..self.starts[i + 1]]
    }

    /// The matching bracket of a bracket token.
    pub fn partner(&self, i: usize) -> Option<usize> {
        self.brackets
            .binary_search_by_key(&i, |&(token, _)| token)
            .ok()
            .map(|entry| self.brackets[entry].1)
    }

    #[inline]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

struct Lexer<'i> {
    css: &'i str,
    pos: usize,
    out: String,
    starts: Vec<usize>,
    types: Vec<CssTokenType>,
    brackets: Vec<(usize, isize)>,
    /// Unmatched open brackets: `(token index, expected closer)`.
    open_stack: Vec<(usize, u8)>,
    pending_space: bool,
}

impl<'i> Lexer<'i> {
    fn new(css: &'i str) -> Self {
        Lexer {
            css,
            pos: 0,
            out: String::with_capacity(css.len()),
            starts: Vec::new(),
            types: Vec::new(),
            brackets: Vec::new(),
            open_stack: Vec::new(),
            pending_space: false,
        }
    }

    #[inline]
    fn bytes(&self) -> &'i [u8] {
        self.css.as_bytes()
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes().get(pos).copied()
    }

    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.css[self.pos..].starts_with(prefix)
    }

    /// Opens a new token, materializing any pending separator space
    /// first. Also separates adjacent tokens that would otherwise merge
    /// when the normalized text is re-lexed.
    fn start_token(&mut self, token_type: CssTokenType) -> usize {
        let force_space = match (self.types.last().copied(), token_type) {
            (Some(CssTokenType::Number), t) => matches!(
                t,
                CssTokenType::Ident
                    | CssTokenType::Function
                    | CssTokenType::DotIdent
                    | CssTokenType::Number
                    | CssTokenType::Dimension
                    | CssTokenType::BadDimension
                    | CssTokenType::UnicodeRange
            ),
            _ => false,
        };

        if (self.pending_space || force_space) && !self.types.is_empty() {
            self.starts.push(self.out.len());
            self.types.push(CssTokenType::Whitespace);
            self.out.push(' ');
        }

        self.pending_space = false;

        let idx = self.types.len();

        self.starts.push(self.out.len());
        self.types.push(token_type);

        idx
    }

    fn emit(&mut self, token_type: CssTokenType, text: &str) -> usize {
        let idx = self.start_token(token_type);

        self.out.push_str(text);

        idx
    }

    fn run(mut self) -> CssTokens {
        while self.pos < self.css.len() {
            let b = self.bytes()[self.pos];

            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {
                    self.pos += 1;
                    self.pending_space = true;
                }
                b'/' if self.byte_at(self.pos + 1) == Some(b'*') => self.block_comment(),
                b'/' if self.byte_at(self.pos + 1) == Some(b'/') => self.line_comment(),
                b'<' if self.starts_with("<!--") => {
                    self.pos += 4;
                    self.pending_space = true;
                }
                b'-' if self.starts_with("-->") => {
                    self.pos += 3;
                    self.pending_space = true;
                }
                b'"' | b'\'' => self.string(b),
                b'0'..=b'9' => self.number(),
                b'.' => {
                    if self.byte_at(self.pos + 1).map_or(false, |n| n.is_ascii_digit()) {
                        self.number();
                    } else if self.is_ident_start_at(self.pos + 1) {
                        self.dot_ident();
                    } else {
                        self.delim(b'.');
                    }
                }
                b'+' => {
                    if self.is_number_start_at(self.pos + 1) {
                        self.number();
                    } else {
                        self.delim(b'+');
                    }
                }
                b'-' => {
                    if self.is_number_start_at(self.pos + 1) {
                        self.number();
                    } else if self.is_ident_start_at(self.pos) {
                        self.ident();
                    } else {
                        self.delim(b'-');
                    }
                }
                b'#' => self.hash(),
                b'@' => self.at_keyword(),
                b'u' | b'U' if self.is_unicode_range_start() => self.unicode_range(),
                b'~' | b'^' | b'$' | b'*' if self.byte_at(self.pos + 1) == Some(b'=') => {
                    let text = [b, b'='];

                    self.pos += 2;
                    self.emit(CssTokenType::Match, std::str::from_utf8(&text).unwrap());
                }
                b'|' => match self.byte_at(self.pos + 1) {
                    Some(b'=') => {
                        self.pos += 2;
                        self.emit(CssTokenType::Match, "|=");
                    }
                    Some(b'|') => {
                        self.pos += 2;
                        self.emit(CssTokenType::Column, "||");
                    }
                    _ => self.delim(b'|'),
                },
                b':' => {
                    self.pos += 1;
                    self.emit(CssTokenType::Colon, ":");
                }
                b';' => {
                    self.pos += 1;
                    self.emit(CssTokenType::Semicolon, ";");
                }
                b',' => {
                    self.pos += 1;
                    self.emit(CssTokenType::Comma, ",");
                }
                b'(' => self.open_bracket(CssTokenType::LeftParen, "(", b')'),
                b'[' => self.open_bracket(CssTokenType::LeftSquare, "[", b']'),
                b'{' => self.open_bracket(CssTokenType::LeftCurly, "{", b'}'),
                b')' => self.close_bracket(CssTokenType::RightParen, ")", b')'),
                b']' => self.close_bracket(CssTokenType::RightSquare, "]", b']'),
                b'}' => self.close_bracket(CssTokenType::RightCurly, "}", b'}'),
                b'\\' => self.ident(),
                _ if self.is_ident_start_at(self.pos) => self.ident(),
                _ if b < 0x20 || b == 0x7F => {
                    // Bare control characters do not survive.
                    self.pos += 1;
                }
                _ => self.delim(b),
            }
        }

        self.finalize()
    }

    fn finalize(mut self) -> CssTokens {
        // Synthetic closes for unclosed opens, innermost first.
        self.pending_space = false;

        while let Some((open_idx, closer)) = self.open_stack.pop() {
            let (token_type, text) = match closer {
                b')' => (CssTokenType::RightParen, ")"),
                b']' => (CssTokenType::RightSquare, "]"),
                _ => (CssTokenType::RightCurly, "}"),
            };

            let idx = self.emit(token_type, text);

            self.set_partner(open_idx, idx);
            self.brackets.push((idx, open_idx as isize));
        }

        self.starts.push(self.out.len());

        debug_assert!(self.brackets.iter().all(|&(_, partner)| partner >= 0));

        CssTokens {
            normalized: self.out,
            starts: self.starts,
            types: self.types,
            brackets: self
                .brackets
                .into_iter()
                .map(|(token, partner)| (token, partner as usize))
                .collect(),
        }
    }

    fn set_partner(&mut self, open_idx: usize, partner: usize) {
        if let Ok(entry) = self
            .brackets
            .binary_search_by_key(&open_idx, |&(token, _)| token)
        {
            self.brackets[entry].1 = partner as isize;
        }
    }

    fn open_bracket(&mut self, token_type: CssTokenType, text: &str, closer: u8) {
        self.pos += 1;

        let idx = self.emit(token_type, text);

        self.open_stack.push((idx, closer));
        self.brackets.push((idx, -1));
    }

    fn close_bracket(&mut self, token_type: CssTokenType, text: &str, closer: u8) {
        self.pos += 1;

        match self.open_stack.last() {
            Some(&(open_idx, expected)) if expected == closer => {
                self.open_stack.pop();

                let idx = self.emit(token_type, text);

                self.set_partner(open_idx, idx);
                self.brackets.push((idx, open_idx as isize));
            }
            // Orphan close: dropped.
            _ => {}
        }
    }

    fn block_comment(&mut self) {
        self.pos = match self.css[self.pos + 2..].find("*/") {
            Some(i) => self.pos + 2 + i + 2,
            None => self.css.len(),
        };

        self.pending_space = true;
    }

    fn line_comment(&mut self) {
        self.pos = match self.bytes()[self.pos + 2..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r' || b == b'\x0C')
        {
            Some(i) => self.pos + 2 + i,
            None => self.css.len(),
        };

        self.pending_space = true;
    }

    fn delim(&mut self, b: u8) {
        self.pos += 1;

        // A `>` must not land right after `--` or `]]` in the output, or
        // the normalized text would re-lex as an HTML close sequence.
        if b == b'>' && (self.out.ends_with("--") || self.out.ends_with("]]")) {
            self.pending_space = true;
        }

        let text = [b];

        self.emit(CssTokenType::Delim, std::str::from_utf8(&text).unwrap());

        // Make sure a delimiter cannot merge with what follows.
        self.pending_space = true;
    }

    #[inline]
    fn is_number_start_at(&self, pos: usize) -> bool {
        match self.byte_at(pos) {
            Some(b) if b.is_ascii_digit() => true,
            Some(b'.') => self.byte_at(pos + 1).map_or(false, |b| b.is_ascii_digit()),
            _ => false,
        }
    }

    /// Whether an identifier (possibly after a leading `-`) starts at
    /// `pos`.
    fn is_ident_start_at(&self, pos: usize) -> bool {
        match self.byte_at(pos) {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 => true,
            Some(b'\\') => self.byte_at(pos + 1).map_or(false, |b| b != b'\n'),
            Some(b'-') => match self.byte_at(pos + 1) {
                Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'-' || b >= 0x80 => true,
                Some(b'\\') => true,
                _ => false,
            },
            _ => false,
        }
    }

    fn is_unicode_range_start(&self) -> bool {
        self.byte_at(self.pos + 1) == Some(b'+')
            && self
                .byte_at(self.pos + 2)
                .map_or(false, |b| is_hex_digit(b) || b == b'?')
    }

    /// Decodes one escape sequence at `self.pos` (which points at the
    /// backslash). Returns `None` for an escaped newline.
    fn consume_escape(&mut self) -> Option<char> {
        self.pos += 1;

        let b = match self.byte_at(self.pos) {
            Some(b) => b,
            None => return Some('\u{FFFD}'),
        };

        if is_hex_digit(b) {
            let mut value: u32 = 0;
            let mut digits = 0;

            while digits < 6 {
                match self.byte_at(self.pos) {
                    Some(b) if is_hex_digit(b) => {
                        value = value * 16 + (b as char).to_digit(16).unwrap();
                        self.pos += 1;
                        digits += 1;
                    }
                    _ => break,
                }
            }

            // One whitespace after a hex escape belongs to the escape.
            match self.byte_at(self.pos) {
                Some(b'\r') => {
                    self.pos += 1;

                    if self.byte_at(self.pos) == Some(b'\n') {
                        self.pos += 1;
                    }
                }
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\x0C') => self.pos += 1,
                _ => {}
            }

            return Some(match value {
                0 | 0xD800..=0xDFFF => '\u{FFFD}',
                v => char::from_u32(v).unwrap_or('\u{FFFD}'),
            });
        }

        if b == b'\n' || b == b'\r' || b == b'\x0C' {
            // Escaped newline: only meaningful in strings, where it is a
            // line continuation.
            self.pos += 1;

            if b == b'\r' && self.byte_at(self.pos) == Some(b'\n') {
                self.pos += 1;
            }

            return None;
        }

        let ch = self.css[self.pos..].chars().next().unwrap_or('\u{FFFD}');

        self.pos += ch.len_utf8();

        Some(ch)
    }

    #[inline]
    fn is_name_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_' || (c as u32) >= 0x80
    }

    /// Consumes a name: raw name characters plus escapes, ASCII
    /// lowercased, escapes decoded. A decoded escape that is not a valid
    /// name character ends the name and is discarded.
    fn consume_name(&mut self) -> String {
        let mut name = String::new();

        loop {
            match self.byte_at(self.pos) {
                // Leave a `-->` for the main loop to collapse.
                Some(b'-') if self.css[self.pos..].starts_with("-->") => break,
                Some(b)
                    if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' =>
                {
                    name.push(to_ascii_lower(b) as char);
                    self.pos += 1;
                }
                Some(b) if b >= 0x80 => {
                    let ch = self.css[self.pos..].chars().next().unwrap();

                    name.push(ch);
                    self.pos += ch.len_utf8();
                }
                Some(b'\\') if self.byte_at(self.pos + 1).map_or(false, |n| n != b'\n') => {
                    match self.consume_escape() {
                        Some(ch) if Self::is_name_char(ch) => {
                            name.push(ch.to_ascii_lowercase());
                        }
                        _ => break,
                    }
                }
                _ => break,
            }
        }

        name
    }

    fn ident(&mut self) {
        let start = self.pos;
        let name = self.consume_name();

        if name.is_empty() || name.as_bytes()[0].is_ascii_digit() {
            // A decoded digit cannot start an identifier; back-track and
            // discard the offending lead byte.
            self.pos = start + 1;
            return;
        }

        if self.byte_at(self.pos) == Some(b'(') {
            if name == "url" {
                self.url();
            } else {
                self.pos += 1;

                let mut text = name;

                text.push('(');

                let idx = self.emit(CssTokenType::Function, &text);

                self.open_stack.push((idx, b')'));
                self.brackets.push((idx, -1));
            }
        } else {
            self.emit(CssTokenType::Ident, &name);
        }
    }

    fn dot_ident(&mut self) {
        self.pos += 1;

        let name = self.consume_name();

        if name.is_empty() || name.as_bytes()[0].is_ascii_digit() {
            self.delim(b'.');
            return;
        }

        let mut text = String::with_capacity(name.len() + 1);

        text.push('.');
        text.push_str(&name);

        self.emit(CssTokenType::DotIdent, &text);
    }

    fn hash(&mut self) {
        self.pos += 1;

        let name = self.consume_name();

        if name.is_empty() {
            self.delim(b'#');
            return;
        }

        let token_type = if name.bytes().all(is_hex_digit) {
            CssTokenType::HashUnrestricted
        } else {
            CssTokenType::HashId
        };

        let mut text = String::with_capacity(name.len() + 1);

        text.push('#');
        text.push_str(&name);

        self.emit(token_type, &text);
    }

    fn at_keyword(&mut self) {
        self.pos += 1;

        let name = self.consume_name();

        if name.is_empty() {
            self.delim(b'@');
            return;
        }

        let mut text = String::with_capacity(name.len() + 1);

        text.push('@');
        text.push_str(&name);

        self.emit(CssTokenType::At, &text);
    }

    fn unicode_range(&mut self) {
        let mut text = String::from("u+");

        self.pos += 2;

        let mut digits = 0;

        while digits < 6 {
            match self.byte_at(self.pos) {
                Some(b) if is_hex_digit(b) => {
                    text.push(to_ascii_lower(b) as char);
                    self.pos += 1;
                    digits += 1;
                }
                _ => break,
            }
        }

        let mut wildcards = 0;

        while digits + wildcards < 6 && self.byte_at(self.pos) == Some(b'?') {
            text.push('?');
            self.pos += 1;
            wildcards += 1;
        }

        if wildcards == 0
            && self.byte_at(self.pos) == Some(b'-')
            && self.byte_at(self.pos + 1).map_or(false, is_hex_digit)
        {
            text.push('-');
            self.pos += 1;

            let mut digits = 0;

            while digits < 6 {
                match self.byte_at(self.pos) {
                    Some(b) if is_hex_digit(b) => {
                        text.push(to_ascii_lower(b) as char);
                        self.pos += 1;
                        digits += 1;
                    }
                    _ => break,
                }
            }
        }

        self.emit(CssTokenType::UnicodeRange, &text);
    }

    fn number(&mut self) {
        let mut text = String::new();

        match self.byte_at(self.pos) {
            Some(b'+') => self.pos += 1,
            Some(b'-') => {
                text.push('-');
                self.pos += 1;
            }
            _ => {}
        }

        while let Some(b) = self.byte_at(self.pos) {
            if b.is_ascii_digit() {
                text.push(b as char);
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.byte_at(self.pos) == Some(b'.')
            && self.byte_at(self.pos + 1).map_or(false, |b| b.is_ascii_digit())
        {
            text.push('.');
            self.pos += 1;

            while let Some(b) = self.byte_at(self.pos) {
                if b.is_ascii_digit() {
                    text.push(b as char);
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }

        if let Some(b'e') | Some(b'E') = self.byte_at(self.pos) {
            let (sign_len, digit_at) = match self.byte_at(self.pos + 1) {
                Some(b'+') | Some(b'-') => (1, self.pos + 2),
                _ => (0, self.pos + 1),
            };

            if self.byte_at(digit_at).map_or(false, |b| b.is_ascii_digit()) {
                text.push('e');

                if sign_len == 1 && self.byte_at(self.pos + 1) == Some(b'-') {
                    text.push('-');
                }

                self.pos += 1 + sign_len;

                while let Some(b) = self.byte_at(self.pos) {
                    if b.is_ascii_digit() {
                        text.push(b as char);
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
            }
        }

        if self.byte_at(self.pos) == Some(b'%') {
            self.pos += 1;
            text.push('%');
            self.emit(CssTokenType::Percentage, &text);
            return;
        }

        // Unit suffix, tolerating intervening whitespace the way UAs do —
        // but only when the upcoming identifier really is a known unit
        // (`10 px` is a length, `0 auto` is not).
        let before_ws = self.pos;
        let mut after_ws = self.pos;

        while let Some(b) = self.byte_at(after_ws) {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'\x0C' {
                after_ws += 1;
            } else {
                break;
            }
        }

        if self.is_ident_start_at(after_ws) {
            let attached = after_ws == before_ws;

            self.pos = after_ws;

            let unit = self.consume_name();

            if !unit.is_empty() && KNOWN_UNITS.get(unit.as_bytes()).is_some() {
                text.push_str(&unit);
                self.emit(CssTokenType::Dimension, &text);
                return;
            }

            if attached && !unit.is_empty() {
                text.push_str(&unit);
                self.emit(CssTokenType::BadDimension, &text);
                return;
            }

            // Not a unit after all: rewind and emit the bare number.
            self.pos = before_ws;
        }

        self.emit(CssTokenType::Number, &text);
    }

    /// Consumes a quoted string and re-emits it single-quoted with the
    /// markup-significant characters hex-escaped.
    fn string(&mut self, quote: u8) {
        self.pos += 1;

        let mut content: Vec<char> = Vec::new();

        loop {
            let b = match self.byte_at(self.pos) {
                Some(b) => b,
                None => break,
            };

            if b == quote {
                self.pos += 1;
                break;
            }

            match b {
                b'\\' => {
                    if let Some(ch) = self.consume_escape() {
                        content.push(ch);
                    }
                }
                b'\n' | b'\r' | b'\x0C' => {
                    // Unescaped newline ends the string; it re-lexes as
                    // whitespace.
                    break;
                }
                _ => {
                    let ch = self.css[self.pos..].chars().next().unwrap();

                    content.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }

        self.start_token(CssTokenType::String);
        self.out.push('\'');

        for i in 0..content.len() {
            let next = content.get(i + 1).copied();

            Self::encode_string_char(&mut self.out, content[i], next);
        }

        self.out.push('\'');
    }

    fn encode_string_char(out: &mut String, c: char, next: Option<char>) {
        let hex = match c {
            '\0' => Some("0"),
            '\n' => Some("a"),
            '\x0C' => Some("c"),
            '\r' => Some("d"),
            '"' => Some("22"),
            '&' => Some("26"),
            '\'' => Some("27"),
            '<' => Some("3c"),
            '>' => Some("3e"),
            _ => None,
        };

        match hex {
            Some(digits) => {
                out.push('\\');
                out.push_str(digits);

                // A following character that could extend the escape
                // needs a separator space.
                if let Some(n) = next {
                    if n.is_ascii_hexdigit() || n == ' ' || n == '\t' {
                        out.push(' ');
                    }
                }
            }
            None if c == '\\' => out.push_str("\\\\"),
            None => out.push(c),
        }
    }

    /// Consumes `url(…)` (the `url` name is already consumed) and emits
    /// a single `Url` token with the body percent-encoded inside single
    /// quotes.
    fn url(&mut self) {
        self.pos += 1; // `(`

        self.skip_url_ws();

        let mut content: Vec<char> = Vec::new();

        match self.byte_at(self.pos) {
            Some(q) if q == b'"' || q == b'\'' => {
                self.pos += 1;

                loop {
                    let b = match self.byte_at(self.pos) {
                        Some(b) => b,
                        None => break,
                    };

                    if b == q {
                        self.pos += 1;
                        break;
                    }

                    match b {
                        b'\\' => {
                            if let Some(ch) = self.consume_escape() {
                                content.push(ch);
                            }
                        }
                        b'\n' | b'\r' | b'\x0C' => break,
                        _ => {
                            let ch = self.css[self.pos..].chars().next().unwrap();

                            content.push(ch);
                            self.pos += ch.len_utf8();
                        }
                    }
                }
            }
            _ => loop {
                let b = match self.byte_at(self.pos) {
                    Some(b) => b,
                    None => break,
                };

                match b {
                    b')' => break,
                    b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => break,
                    b'\\' => {
                        if let Some(ch) = self.consume_escape() {
                            content.push(ch);
                        }
                    }
                    _ => {
                        let ch = self.css[self.pos..].chars().next().unwrap();

                        content.push(ch);
                        self.pos += ch.len_utf8();
                    }
                }
            },
        }

        self.skip_url_ws();

        // Anything between the body and `)` is bad-url junk; drop it.
        while let Some(b) = self.byte_at(self.pos) {
            self.pos += 1;

            if b == b')' {
                break;
            }
        }

        self.start_token(CssTokenType::Url);
        self.out.push_str("url('");

        for c in content {
            Self::percent_encode(&mut self.out, c);
        }

        self.out.push_str("')");
    }

    fn skip_url_ws(&mut self) {
        while let Some(b) = self.byte_at(self.pos) {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' || b == b'\x0C' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// RFC 3986: unreserved, the sub-delims `!$&+,;=`, the gen-delims
    /// `:/?#[]@`, and `%` pass through; everything else is UTF-8
    /// percent-encoded.
    fn percent_encode(out: &mut String, c: char) {
        let raw = match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' => true,
            '-' | '.' | '_' | '~' => true,
            '!' | '$' | '&' | '+' | ',' | ';' | '=' => true,
            ':' | '/' | '?' | '#' | '[' | ']' | '@' => true,
            '%' => true,
            _ => false,
        };

        if raw {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];

            for &b in c.encode_utf8(&mut buf).as_bytes() {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_normalized(css: &str) -> String {
        CssTokens::lex(css).normalized().to_string()
    }

    fn lex_types(css: &str) -> Vec<CssTokenType> {
        let tokens = CssTokens::lex(css);

        (0..tokens.len()).map(|i| tokens.token_type(i)).collect()
    }

    #[test]
    fn whitespace_and_comments_collapse() {
        assert_eq!(lex_normalized("a  /* c */  b"), "a b");
        assert_eq!(lex_normalized("a // line\nb"), "a b");
        assert_eq!(lex_normalized("a <!-- b --> c"), "a b c");
    }

    #[test]
    fn idents_lowercase_and_decode() {
        assert_eq!(lex_normalized("RED"), "red");
        assert_eq!(lex_normalized("r\\45d"), "red");
        assert_eq!(lex_normalized("\\52 ed"), "red");
    }

    #[test]
    fn strings_normalize_to_single_quotes() {
        assert_eq!(lex_normalized("\"abc\""), "'abc'");
        assert_eq!(lex_normalized("'a\"b'"), "'a\\22 b'");
        assert_eq!(lex_normalized("\"a'b\""), "'a\\27 b'");
        assert_eq!(lex_normalized("'<img>'"), "'\\3c img\\3e'");
        assert_eq!(lex_normalized("'a&b'"), "'a\\26 b'");
        assert_eq!(lex_normalized("'a\\\\b'"), "'a\\\\b'");
    }

    #[test]
    fn escape_separator_space() {
        // A hex escape is separated from a following hex digit by a
        // space, but not from a non-extending character.
        assert_eq!(lex_normalized("'<a'"), "'\\3c a'");
        assert_eq!(lex_normalized("'<->'"), "'\\3c-\\3e'");
    }

    #[test]
    fn urls_percent_encode() {
        assert_eq!(
            lex_normalized("url(http://x.com/a b)"),
            "url('http://x.com/a')"
        );
        assert_eq!(
            lex_normalized("url('http://x.com/a b')"),
            "url('http://x.com/a%20b')"
        );
        assert_eq!(lex_normalized("url(\"a'b\")"), "url('a%27b')");
        assert_eq!(lex_normalized("url( x )"), "url('x')");
    }

    #[test]
    fn numbers_and_units() {
        assert_eq!(lex_types("10px"), vec![CssTokenType::Dimension]);
        assert_eq!(lex_types("10 px"), vec![CssTokenType::Dimension]);
        assert_eq!(lex_types("10foo"), vec![CssTokenType::BadDimension]);
        assert_eq!(
            lex_types("0 auto"),
            vec![
                CssTokenType::Number,
                CssTokenType::Whitespace,
                CssTokenType::Ident
            ]
        );
        assert_eq!(lex_types("50%"), vec![CssTokenType::Percentage]);
        assert_eq!(lex_normalized("10PX"), "10px");
        assert_eq!(lex_normalized("+5"), "5");
        assert_eq!(lex_normalized("-1.5E2"), "-1.5e2");
        assert_eq!(lex_normalized(".5"), ".5");
    }

    #[test]
    fn hashes() {
        assert_eq!(lex_types("#fff"), vec![CssTokenType::HashUnrestricted]);
        assert_eq!(lex_types("#AABBCC"), vec![CssTokenType::HashUnrestricted]);
        assert_eq!(lex_types("#main"), vec![CssTokenType::HashId]);
        assert_eq!(lex_normalized("#FFF"), "#fff");
    }

    #[test]
    fn unicode_ranges() {
        assert_eq!(lex_types("U+26"), vec![CssTokenType::UnicodeRange]);
        assert_eq!(lex_normalized("U+0-7F"), "u+0-7f");
        assert_eq!(lex_normalized("U+4??"), "u+4??");
    }

    #[test]
    fn functions_and_brackets_pair() {
        let tokens = CssTokens::lex("rgb(1,2,3)");

        assert_eq!(tokens.token_type(0), CssTokenType::Function);
        assert_eq!(tokens.token_text(0), "rgb(");

        let close = tokens.partner(0).unwrap();

        assert_eq!(tokens.token_type(close), CssTokenType::RightParen);
        assert_eq!(tokens.partner(close), Some(0));
    }

    #[test]
    fn unbalanced_brackets_repair() {
        assert_eq!(lex_normalized("(a"), "(a)");
        assert_eq!(lex_normalized("a)"), "a");
        assert_eq!(lex_normalized("[(a"), "[(a)]");

        let tokens = CssTokens::lex("[(a");

        assert_eq!(tokens.partner(0), Some(4));
        assert_eq!(tokens.partner(1), Some(3));
    }

    #[test]
    fn html_sequences_cannot_appear() {
        for input in &[
            "a<!--b",
            "a-->b",
            "x</style>y",
            "'</style>'",
            "url(</style>)",
            "<![CDATA[x]]>",
            "[[x]]>",
            "\\2d\\2d>",
            "a--\t>b",
        ] {
            let normalized = lex_normalized(input).to_lowercase();

            assert!(!normalized.contains("<!--"), "in {:?}: {:?}", input, normalized);
            assert!(!normalized.contains("-->"), "in {:?}: {:?}", input, normalized);
            assert!(!normalized.contains("<![cdata["), "in {:?}: {:?}", input, normalized);
            assert!(!normalized.contains("]]>"), "in {:?}: {:?}", input, normalized);
            assert!(!normalized.contains("</style"), "in {:?}: {:?}", input, normalized);
        }
    }

    #[test]
    fn match_and_column_tokens() {
        assert_eq!(
            lex_types("~= |= ^= $= *= ||"),
            vec![
                CssTokenType::Match,
                CssTokenType::Whitespace,
                CssTokenType::Match,
                CssTokenType::Whitespace,
                CssTokenType::Match,
                CssTokenType::Whitespace,
                CssTokenType::Match,
                CssTokenType::Whitespace,
                CssTokenType::Match,
                CssTokenType::Whitespace,
                CssTokenType::Column
            ]
        );
    }

    #[test]
    fn dot_idents() {
        assert_eq!(lex_types(".cls"), vec![CssTokenType::DotIdent]);
        assert_eq!(lex_types(".5"), vec![CssTokenType::Number]);
    }

    #[test]
    fn token_starts_tile_the_normalized_text() {
        let tokens = CssTokens::lex("color : red ; margin:0 10px");
        let total: usize = (0..tokens.len()).map(|i| tokens.token_text(i).len()).sum();

        assert_eq!(total, tokens.normalized().len());
        assert!(!tokens.normalized().ends_with(' '));
    }

    #[test]
    fn digit_start_escape_is_rejected() {
        // `\31 23` would decode to the identifier `123`.
        let types = lex_types("\\31 23");

        assert!(!types.contains(&CssTokenType::Ident));
    }
}
