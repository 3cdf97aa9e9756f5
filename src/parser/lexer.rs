//! The second lexing stage: coarse tokens to a refined stream.
//!
//! Wraps the splitter with a small lookahead ring (one token of pushback,
//! four tokens of peek — the bound is tight and required by the unquoted
//! attribute value scan). In-tag `Text` is reclassified as `AttrName` or
//! `AttrValue`, in-tag whitespace is dropped, and adjacent same-type text
//! runs outside tags collapse into single tokens.

use crate::base::strings::eq_ignore_ascii_case;
use crate::parser::{InputSplitter, Token, TokenType};
use std::collections::VecDeque;

/// Boolean attributes that may legally appear without `=value`. Used to
/// bound the forward scan that absorbs spaces into unquoted values.
static VALUELESS_ATTRS: &[&str] = &[
    "checked", "compact", "declare", "defer", "disabled", "ismap", "multiple", "nohref",
    "noresize", "noshade", "nowrap", "readonly", "selected",
];

fn is_valueless_attr(word: &str) -> bool {
    VALUELESS_ATTRS
        .iter()
        .any(|attr| eq_ignore_ascii_case(attr, word))
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum AttrState {
    OutsideTag,
    InTag,
    SawName,
    SawEq,
}

pub struct HtmlLexer<'i> {
    splitter: InputSplitter<'i>,
    lookahead: VecDeque<Token>,
    state: AttrState,
}

impl<'i> HtmlLexer<'i> {
    pub fn new(input: &'i str) -> Self {
        HtmlLexer {
            splitter: InputSplitter::new(input),
            lookahead: VecDeque::with_capacity(4),
            state: AttrState::OutsideTag,
        }
    }

    #[inline]
    pub fn input(&self) -> &'i str {
        self.splitter.input()
    }

    fn take(&mut self) -> Option<Token> {
        match self.lookahead.pop_front() {
            Some(token) => Some(token),
            None => self.splitter.next_token(),
        }
    }

    fn peek(&mut self, k: usize) -> Option<Token> {
        debug_assert!(k < 4, "peek depth exceeds the lookahead bound");

        while self.lookahead.len() <= k {
            match self.splitter.next_token() {
                Some(token) => self.lookahead.push_back(token),
                None => return None,
            }
        }

        self.lookahead.get(k).copied()
    }

    #[inline]
    fn peek_type(&mut self, k: usize) -> Option<TokenType> {
        self.peek(k).map(|t| t.token_type)
    }

    pub fn next_token(&mut self) -> Option<Token> {
        use self::TokenType::*;

        loop {
            let token = self.take()?;

            match self.state {
                AttrState::OutsideTag => match token.token_type {
                    TagBegin => {
                        self.state = AttrState::InTag;
                        return Some(token);
                    }
                    Text | Unescaped => return Some(self.collapse_text(token)),
                    _ => return Some(token),
                },

                AttrState::InTag => match token.token_type {
                    TagEnd => {
                        self.state = AttrState::OutsideTag;
                        return Some(token);
                    }
                    Text => {
                        if token.text(self.input()) == "=" {
                            // A stray `=` with no attribute name before it.
                            continue;
                        }

                        self.state = AttrState::SawName;
                        return Some(token.reclassified(AttrName));
                    }
                    _ => continue,
                },

                AttrState::SawName => match token.token_type {
                    Text => {
                        if token.text(self.input()) == "=" {
                            self.state = AttrState::SawEq;
                            continue;
                        }

                        // The previous attribute had no value; this text
                        // is the next attribute's name.
                        return Some(token.reclassified(AttrName));
                    }
                    TagEnd => {
                        self.state = AttrState::OutsideTag;
                        return Some(token);
                    }
                    _ => continue,
                },

                AttrState::SawEq => match token.token_type {
                    Text => {
                        let value = self.absorb_unquoted(token);
                        self.state = AttrState::InTag;
                        return Some(value);
                    }
                    QString => {
                        self.state = AttrState::InTag;
                        return Some(token.reclassified(AttrValue));
                    }
                    TagEnd => {
                        // `checked=` directly before the tag end gets an
                        // explicit empty value, distinguishing it from the
                        // valueless form.
                        let empty = Token::new(AttrValue, token.range.start, token.range.start);

                        self.lookahead.push_front(token);
                        self.state = AttrState::InTag;

                        return Some(empty);
                    }
                    _ => continue,
                },
            }
        }
    }

    /// Collapses adjacent same-type text runs into one token.
    fn collapse_text(&mut self, first: Token) -> Token {
        let mut range = first.range;

        loop {
            match self.peek(0) {
                Some(next)
                    if next.token_type == first.token_type && next.range.start == range.end =>
                {
                    range.end = next.range.end;
                    self.lookahead.pop_front();
                }
                _ => break,
            }
        }

        Token {
            range,
            token_type: first.token_type,
        }
    }

    /// Extends an unquoted attribute value over whitespace-separated
    /// words, so `title=foo bar` yields the value `foo bar`. The scan
    /// stops before a word that is a known valueless attribute or that is
    /// itself followed by `=` (it is the next attribute), and at the tag
    /// end.
    fn absorb_unquoted(&mut self, first: Token) -> Token {
        use self::TokenType::*;

        let mut end = first.range.end;

        loop {
            let mut k = 0;

            if self.peek_type(k) == Some(Ignorable) {
                k += 1;
            }

            let word = match self.peek(k) {
                Some(t) if t.token_type == Text => t,
                _ => break,
            };

            if is_valueless_attr(word.text(self.input())) {
                break;
            }

            let mut j = k + 1;

            if self.peek_type(j) == Some(Ignorable) {
                j += 1;
            }

            if let Some(eq) = self.peek(j) {
                if eq.token_type == Text && eq.text(self.input()) == "=" {
                    break;
                }
            }

            for _ in 0..=k {
                self.lookahead.pop_front();
            }

            end = word.range.end;
        }

        Token::new(AttrValue, first.range.start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TokenType::*;

    fn tokens(input: &str) -> Vec<(TokenType, &str)> {
        let mut lexer = HtmlLexer::new(input);
        let mut out = Vec::new();

        while let Some(token) = lexer.next_token() {
            out.push((token.token_type, token.text(input)));
        }

        out
    }

    #[test]
    fn attr_reclassification() {
        assert_eq!(
            tokens("<a href=\"x\" title=y>"),
            vec![
                (TagBegin, "<a"),
                (AttrName, "href"),
                (AttrValue, "\"x\""),
                (AttrName, "title"),
                (AttrValue, "y"),
                (TagEnd, ">"),
            ]
        );
    }

    #[test]
    fn valueless_attrs() {
        assert_eq!(
            tokens("<input type=checkbox checked>"),
            vec![
                (TagBegin, "<input"),
                (AttrName, "type"),
                (AttrValue, "checkbox"),
                (AttrName, "checked"),
                (TagEnd, ">"),
            ]
        );
    }

    #[test]
    fn empty_value_before_tag_end() {
        assert_eq!(
            tokens("<input checked=>"),
            vec![
                (TagBegin, "<input"),
                (AttrName, "checked"),
                (AttrValue, ""),
                (TagEnd, ">"),
            ]
        );
    }

    #[test]
    fn unquoted_value_absorbs_spaces() {
        assert_eq!(
            tokens("<a title=foo bar>"),
            vec![
                (TagBegin, "<a"),
                (AttrName, "title"),
                (AttrValue, "foo bar"),
                (TagEnd, ">"),
            ]
        );
    }

    #[test]
    fn absorption_stops_at_next_attribute() {
        assert_eq!(
            tokens("<a title=foo bar href=x>"),
            vec![
                (TagBegin, "<a"),
                (AttrName, "title"),
                (AttrValue, "foo bar"),
                (AttrName, "href"),
                (AttrValue, "x"),
                (TagEnd, ">"),
            ]
        );
    }

    #[test]
    fn absorption_stops_at_valueless_attribute() {
        assert_eq!(
            tokens("<input value=a b checked>"),
            vec![
                (TagBegin, "<input"),
                (AttrName, "value"),
                (AttrValue, "a b"),
                (AttrName, "checked"),
                (TagEnd, ">"),
            ]
        );
    }

    #[test]
    fn text_runs_collapse() {
        assert_eq!(tokens("a < b<3"), vec![(Text, "a < b<3")]);
    }

    #[test]
    fn stray_equals_is_dropped() {
        assert_eq!(
            tokens("<a =foo>"),
            vec![(TagBegin, "<a"), (AttrName, "foo"), (TagEnd, ">")]
        );
    }
}
