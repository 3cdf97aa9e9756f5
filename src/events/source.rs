//! The event source: refined tokens to ordered stream events, with the
//! policy consulted at the tag boundary.

use crate::css::{filter_style, CssSchema};
use crate::events::{Attr, HtmlStreamReceiver};
use crate::html::{canonical_name, entities, ELEMENTS};
use crate::parser::{HtmlLexer, Token, TokenType};
use crate::policy::{AttributeDecision, AttributePolicy, ElementDecision, ElementPolicy};
use hashbrown::HashMap;

struct SkipContext {
    name: String,
    depth: usize,
}

pub struct StreamEventSource<'i, 'p, R: HtmlStreamReceiver> {
    lexer: HtmlLexer<'i>,
    element_policy: &'p dyn ElementPolicy,
    attribute_policy: &'p dyn AttributePolicy,
    css: &'p CssSchema,
    receiver: R,
    /// Active drop-with-content context: everything is suppressed until
    /// the matching close of the dropped element.
    skip: Option<SkipContext>,
    /// Per-name count of dropped opens whose matching closes must also be
    /// suppressed to keep the downstream stream consistent.
    suppressed_closes: HashMap<String, usize>,
}

impl<'i, 'p, R: HtmlStreamReceiver> StreamEventSource<'i, 'p, R> {
    pub fn new(
        input: &'i str,
        element_policy: &'p dyn ElementPolicy,
        attribute_policy: &'p dyn AttributePolicy,
        css: &'p CssSchema,
        receiver: R,
    ) -> Self {
        StreamEventSource {
            lexer: HtmlLexer::new(input),
            element_policy,
            attribute_policy,
            css,
            receiver,
            skip: None,
            suppressed_closes: HashMap::new(),
        }
    }

    /// Drives the whole pipeline and hands back the receiver.
    pub fn run(mut self) -> R {
        self.receiver.open_document();

        while let Some(token) = self.lexer.next_token() {
            match token.token_type {
                TokenType::TagBegin => self.handle_tag(token),
                TokenType::Text => self.handle_text(token, true),
                TokenType::Unescaped => self.handle_text(token, false),
                // Comments, directives, bogus comments and server code do
                // not survive sanitization.
                _ => {}
            }
        }

        self.receiver.close_document();
        self.receiver
    }

    #[inline]
    fn is_void(name: &str) -> bool {
        ELEMENTS
            .get(name)
            .map_or(false, |idx| ELEMENTS.descriptor(idx).is_void)
    }

    fn handle_text(&mut self, token: Token, decode: bool) {
        if self.skip.is_some() {
            return;
        }

        let raw = token.text(self.lexer.input());

        if decode {
            self.receiver.text(&entities::decode(raw));
        } else {
            self.receiver.text(raw);
        }
    }

    fn handle_tag(&mut self, begin: Token) {
        let input = self.lexer.input();
        let raw = begin.text(input);
        let is_close = raw.as_bytes().get(1) == Some(&b'/');
        let name_raw = if is_close { &raw[2..] } else { &raw[1..] };
        let name = canonical_name(name_raw);

        let mut attrs: Vec<Attr> = Vec::new();
        let mut saw_end = false;

        while let Some(token) = self.lexer.next_token() {
            match token.token_type {
                TokenType::AttrName => {
                    attrs.push(Attr::new(canonical_name(token.text(input)), None));
                }
                TokenType::AttrValue => {
                    if let Some(last) = attrs.last_mut() {
                        last.value = Some(unquote_and_decode(token.text(input)));
                    }
                }
                TokenType::TagEnd => {
                    saw_end = true;
                    break;
                }
                _ => {}
            }
        }

        // A tag the input ran out of is dropped whole; the output never
        // contains a partial tag.
        if !saw_end {
            return;
        }

        if is_close {
            self.handle_close(&name);
        } else {
            self.handle_open(name, dedup_attrs(attrs));
        }
    }

    fn handle_open(&mut self, name: String, mut attrs: Vec<Attr>) {
        let is_void = Self::is_void(&name);

        if let Some(skip) = &mut self.skip {
            if name == skip.name && !is_void {
                skip.depth += 1;
            }

            return;
        }

        trace!(@event "open <{}>", name);

        let name = match self.element_policy.apply(&name, &mut attrs) {
            ElementDecision::Allow => name,
            ElementDecision::Rename(renamed) => renamed,
            ElementDecision::Drop { keep_content } => {
                if !is_void {
                    if keep_content {
                        *self.suppressed_closes.entry(name).or_insert(0) += 1;
                    } else {
                        self.skip = Some(SkipContext { name, depth: 1 });
                    }
                }

                return;
            }
        };

        let mut kept = Vec::with_capacity(attrs.len());

        for attr in attrs {
            let decision = self
                .attribute_policy
                .apply(&name, &attr.name, attr.value.as_deref());

            let mut attr = match decision {
                AttributeDecision::Drop => continue,
                AttributeDecision::Keep => attr,
                AttributeDecision::Rewrite(value) => Attr::new(attr.name, Some(value)),
            };

            if attr.name == "style" {
                let filtered = attr
                    .value
                    .as_deref()
                    .map(|css| filter_style(self.css, css))
                    .unwrap_or_default();

                if filtered.is_empty() {
                    continue;
                }

                attr.value = Some(filtered);
            }

            kept.push(attr);
        }

        self.receiver.open_tag(&name, kept);
    }

    fn handle_close(&mut self, name: &str) {
        if let Some(skip) = &mut self.skip {
            if name == skip.name {
                skip.depth -= 1;

                if skip.depth == 0 {
                    self.skip = None;
                }
            }

            return;
        }

        if let Some(count) = self.suppressed_closes.get_mut(name) {
            if *count > 0 {
                *count -= 1;
                return;
            }
        }

        trace!(@event "close </{}>", name);

        self.receiver.close_tag(name);
    }
}

/// Strips the surrounding quotes of a quoted value (tolerating an
/// unterminated one) and decodes entities.
fn unquote_and_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();

    let inner = match bytes.first() {
        Some(&q) if q == b'"' || q == b'\'' => {
            if bytes.len() >= 2 && bytes[bytes.len() - 1] == q {
                &raw[1..raw.len() - 1]
            } else {
                &raw[1..]
            }
        }
        _ => raw,
    };

    entities::decode_attr(inner).into_owned()
}

/// A lexically sound attribute name. Anything else is discarded: a name
/// like `//onclick` would re-parse as an event handler in a browser that
/// treats the slashes as attribute separators.
fn is_valid_attr_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':' || b == b'.'
        })
}

/// Drops lexically invalid names; repeated attribute names keep the
/// first occurrence.
fn dedup_attrs(attrs: Vec<Attr>) -> Vec<Attr> {
    let mut out: Vec<Attr> = Vec::with_capacity(attrs.len());

    for attr in attrs {
        if is_valid_attr_name(&attr.name) && !out.iter().any(|seen| seen.name == attr.name) {
            out.push(attr);
        }
    }

    out
}
