//! The first lexing stage: raw characters to coarse tokens.
//!
//! The splitter runs a small state machine with two nested state
//! variables: whether the scan position is inside the angle brackets of a
//! tag, and whether it is inside an escape-exempt block (`<script>`,
//! `<style>`, `<textarea>`, …). Tokens are emitted in strict forward
//! order and tile the input without gap or overlap.

use crate::base::strings::{is_ascii_alpha, is_html_ws};
use crate::html::{canonical_name, EscapingMode};
use crate::parser::{Token, TokenType};
use memchr::memchr;

pub struct InputSplitter<'i> {
    input: &'i str,
    pos: usize,
    in_tag: bool,
    /// Set while scanning the content of an escape-exempt element:
    /// the canonical tag name whose close tag exits the block, plus the
    /// block's text-escaping mode.
    exempt: Option<(String, EscapingMode)>,
    /// Exempt context to activate once the current start tag ends.
    pending_exempt: Option<(String, EscapingMode)>,
    /// Inside a `<!-- … -->` escaping text span within an exempt block.
    in_escaping_span: bool,
}

impl<'i> InputSplitter<'i> {
    pub fn new(input: &'i str) -> Self {
        InputSplitter {
            input,
            pos: 0,
            in_tag: false,
            exempt: None,
            pending_exempt: None,
            in_escaping_span: false,
        }
    }

    #[inline]
    pub fn input(&self) -> &'i str {
        self.input
    }

    pub fn next_token(&mut self) -> Option<Token> {
        if self.pos >= self.input.len() {
            return None;
        }

        let token = if self.in_tag {
            self.next_in_tag()
        } else if self.exempt.is_some() {
            self.next_exempt()
        } else {
            self.next_data()
        };

        trace!(@tokens token);

        Some(token)
    }

    #[inline]
    fn bytes(&self) -> &'i [u8] {
        self.input.as_bytes()
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.bytes().get(pos).copied()
    }

    #[inline]
    fn starts_with_at(&self, pos: usize, prefix: &str) -> bool {
        self.input[pos.min(self.input.len())..].starts_with(prefix)
    }

    fn token(&mut self, token_type: TokenType, end: usize) -> Token {
        let token = Token::new(token_type, self.pos, end);

        self.pos = end;

        token
    }

    /// Scans the tag name identifier starting at `from`, stopping on
    /// whitespace, `>`, `/`, or another `<`.
    fn scan_identifier(&self, from: usize) -> usize {
        let bytes = self.bytes();
        let mut i = from;

        while i < bytes.len() {
            let b = bytes[i];

            if is_html_ws(b) || b == b'>' || b == b'/' || b == b'<' {
                break;
            }

            i += 1;
        }

        i
    }

    fn leave_tag(&mut self) {
        self.in_tag = false;

        if let Some(exempt) = self.pending_exempt.take() {
            self.exempt = Some(exempt);
            self.in_escaping_span = false;
        }
    }

    fn next_data(&mut self) -> Token {
        let bytes = self.bytes();
        let pos = self.pos;

        if bytes[pos] == b'<' {
            match self.byte_at(pos + 1) {
                Some(b) if is_ascii_alpha(b) => return self.tag_begin(pos + 1, false),
                Some(b'/') if self.byte_at(pos + 2).map_or(false, is_ascii_alpha) => {
                    return self.tag_begin(pos + 2, true);
                }
                Some(b'!') => {
                    if self.starts_with_at(pos, "<!--") {
                        return self.comment(pos);
                    }

                    let end = self.find_from(pos + 2, b'>').map_or(bytes.len(), |i| i + 1);
                    return self.token(TokenType::Directive, end);
                }
                Some(b'?') => {
                    let end = self.find_from(pos + 2, b'>').map_or(bytes.len(), |i| i + 1);
                    return self.token(TokenType::QMarkMeta, end);
                }
                Some(b'%') => return self.server_code(pos),
                _ => {}
            }
        }

        // Coalesce text through the next `<`. A `<` that did not start
        // any construct above is itself text.
        let from = if bytes[pos] == b'<' { pos + 1 } else { pos };
        let end = self.find_from(from, b'<').unwrap_or_else(|| bytes.len());

        self.token(TokenType::Text, end)
    }

    fn tag_begin(&mut self, name_at: usize, is_close: bool) -> Token {
        let end = self.scan_identifier(name_at);
        let token = self.token(TokenType::TagBegin, end);

        self.in_tag = true;
        self.pending_exempt = None;

        if !is_close {
            let name = canonical_name(&self.input[name_at..end]);

            if let Some(mode) = EscapingMode::of_exempt_tag(&name) {
                self.pending_exempt = Some((name, mode));
            }
        }

        token
    }

    fn comment(&mut self, pos: usize) -> Token {
        let end = match self.input[pos + 4..].find("-->") {
            Some(i) => pos + 4 + i + 3,
            None => self.input.len(),
        };

        self.token(TokenType::Comment, end)
    }

    fn server_code(&mut self, pos: usize) -> Token {
        let end = match self.input[pos + 2..].find("%>") {
            Some(i) => pos + 2 + i + 2,
            None => self.input.len(),
        };

        self.token(TokenType::ServerCode, end)
    }

    #[inline]
    fn find_from(&self, from: usize, needle: u8) -> Option<usize> {
        if from >= self.input.len() {
            return None;
        }

        memchr(needle, &self.bytes()[from..]).map(|i| from + i)
    }

    fn next_in_tag(&mut self) -> Token {
        let bytes = self.bytes();
        let pos = self.pos;
        let b = bytes[pos];

        match b {
            b'>' => {
                let token = self.token(TokenType::TagEnd, pos + 1);
                self.leave_tag();
                token
            }
            b'/' if self.byte_at(pos + 1) == Some(b'>') => {
                let token = self.token(TokenType::TagEnd, pos + 2);
                self.leave_tag();
                token
            }
            b'"' | b'\'' => {
                let end = self.find_from(pos + 1, b).map_or(bytes.len(), |i| i + 1);
                self.token(TokenType::QString, end)
            }
            b'=' => self.token(TokenType::Text, pos + 1),
            b if is_html_ws(b) => {
                let mut end = pos + 1;

                while end < bytes.len() && is_html_ws(bytes[end]) {
                    end += 1;
                }

                self.token(TokenType::Ignorable, end)
            }
            _ => self.unquoted(pos),
        }
    }

    fn unquoted(&mut self, pos: usize) -> Token {
        let bytes = self.bytes();
        let mut i = pos;

        while i < bytes.len() {
            let b = bytes[i];

            if is_html_ws(b) || b == b'>' || b == b'=' {
                break;
            }

            if b == b'/' && self.byte_at(i + 1) == Some(b'>') {
                break;
            }

            if b == b'"' || b == b'\'' {
                // NOTE: an embedded quote followed by whitespace, `>` or
                // `/` terminates the token and the quote stays part of it.
                match self.byte_at(i + 1) {
                    None | Some(b'>') | Some(b'/') => {
                        i += 1;
                        break;
                    }
                    Some(next) if is_html_ws(next) => {
                        i += 1;
                        break;
                    }
                    _ => {}
                }
            }

            i += 1;
        }

        self.token(TokenType::Text, i)
    }

    /// Whether `</name>` of the active exempt tag starts at `pos`.
    fn is_exempt_close_at(&self, pos: usize) -> bool {
        let exempt_name = match &self.exempt {
            Some((name, _)) => name,
            None => return false,
        };

        if self.byte_at(pos) != Some(b'<') || self.byte_at(pos + 1) != Some(b'/') {
            return false;
        }

        if !self.byte_at(pos + 2).map_or(false, is_ascii_alpha) {
            return false;
        }

        let end = self.scan_identifier(pos + 2);

        self.input[pos + 2..end].eq_ignore_ascii_case(exempt_name)
    }

    fn next_exempt(&mut self) -> Token {
        let mode = match &self.exempt {
            Some((_, mode)) => *mode,
            None => unreachable!("exempt context should be set"),
        };

        if mode == EscapingMode::PlainText {
            // `plaintext` has no close sequence: everything through the
            // end of input is raw text.
            return self.token(TokenType::Unescaped, self.input.len());
        }

        let bytes = self.bytes();
        let start = self.pos;
        let mut i = start;

        while i < bytes.len() {
            if bytes[i] == b'<' {
                if self.byte_at(i + 1) == Some(b'%') {
                    if i == start {
                        self.pos = i;
                        return self.server_code(i);
                    }

                    break;
                }

                if !self.in_escaping_span && self.is_exempt_close_at(i) {
                    if i == start {
                        return self.exempt_close(i);
                    }

                    break;
                }

                if !self.in_escaping_span
                    && mode.allows_escaping_text_span()
                    && self.starts_with_at(i, "<!--")
                {
                    self.in_escaping_span = true;
                    i += 4;
                    continue;
                }
            }

            if self.in_escaping_span && bytes[i] == b'-' && self.starts_with_at(i, "-->") {
                self.in_escaping_span = false;
                i += 3;
                continue;
            }

            i += 1;
        }

        let token_type = if mode.decodes_entities() {
            TokenType::Text
        } else {
            TokenType::Unescaped
        };

        self.token(token_type, i)
    }

    fn exempt_close(&mut self, pos: usize) -> Token {
        let end = self.scan_identifier(pos + 2);
        let token = self.token(TokenType::TagBegin, end);

        self.in_tag = true;
        self.exempt = None;
        self.pending_exempt = None;
        self.in_escaping_span = false;

        token
    }
}
