//! Policy traits and the baseline policy.
//!
//! The element policy runs once per start tag and may rename or drop the
//! element; the attribute policy runs per attribute and may rewrite or
//! drop the value. Attribute policies compose with [`join`]: joins are
//! order-sensitive, short-circuit on drop, and are associative with
//! [`AcceptAttributes`] as the identity and [`RejectAttributes`] as the
//! absorbing element.

use crate::events::Attr;
use crate::html::ELEMENTS;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ElementDecision {
    Allow,
    Rename(String),
    Drop {
        /// Whether the element's children survive (rebalanced into the
        /// parent context) or are dropped with it.
        keep_content: bool,
    },
}

pub trait ElementPolicy {
    /// Decides the fate of an element. `name` is canonical; `attrs` may
    /// be mutated, reordered, or extended before attribute policies run.
    fn apply(&self, name: &str, attrs: &mut Vec<Attr>) -> ElementDecision;
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AttributeDecision {
    Keep,
    Rewrite(String),
    Drop,
}

pub trait AttributePolicy {
    /// Decides the fate of one attribute. `element` and `attr` are
    /// canonical names; `value` is entity-decoded (`None` = valueless).
    fn apply(&self, element: &str, attr: &str, value: Option<&str>) -> AttributeDecision;
}

/// Accepts everything; the identity for [`join`].
pub struct AcceptAttributes;

impl AttributePolicy for AcceptAttributes {
    #[inline]
    fn apply(&self, _element: &str, _attr: &str, _value: Option<&str>) -> AttributeDecision {
        AttributeDecision::Keep
    }
}

/// Rejects everything; absorbing for [`join`].
pub struct RejectAttributes;

impl AttributePolicy for RejectAttributes {
    #[inline]
    fn apply(&self, _element: &str, _attr: &str, _value: Option<&str>) -> AttributeDecision {
        AttributeDecision::Drop
    }
}

pub struct JoinedAttributePolicy<A, B> {
    first: A,
    second: B,
}

/// Joins two attribute policies. The first policy runs first; a drop
/// short-circuits, a rewrite feeds the rewritten value to the second.
pub fn join<A: AttributePolicy, B: AttributePolicy>(
    first: A,
    second: B,
) -> JoinedAttributePolicy<A, B> {
    JoinedAttributePolicy { first, second }
}

impl<A: AttributePolicy, B: AttributePolicy> AttributePolicy for JoinedAttributePolicy<A, B> {
    fn apply(&self, element: &str, attr: &str, value: Option<&str>) -> AttributeDecision {
        match self.first.apply(element, attr, value) {
            AttributeDecision::Drop => AttributeDecision::Drop,
            AttributeDecision::Keep => self.second.apply(element, attr, value),
            AttributeDecision::Rewrite(rewritten) => {
                match self.second.apply(element, attr, Some(&rewritten)) {
                    AttributeDecision::Keep => AttributeDecision::Rewrite(rewritten),
                    other => other,
                }
            }
        }
    }
}

/// Elements the baseline policy removes together with their content.
/// These either carry active content, reconfigure the page, or are raw
/// text sinks whose content must not leak as markup-adjacent text.
static DROP_WITH_CONTENT: &[&str] = &[
    "applet", "base", "basefont", "comment", "embed", "frame", "frameset", "head", "iframe",
    "link", "listing", "meta", "noembed", "noframes", "noscript", "object", "param", "plaintext",
    "script", "style", "title", "xmp",
];

/// Attributes whose values are URLs and therefore scheme-checked.
static URL_ATTRS: &[&str] = &[
    "action",
    "background",
    "cite",
    "formaction",
    "href",
    "longdesc",
    "poster",
    "src",
    "usemap",
];

/// True iff a URL is relative or carries an allowed scheme. Tab, LF and
/// CR are ignored while sniffing the scheme, the way browsers ignore
/// them (`java\tscript:` is still `javascript:`).
pub fn is_safe_url(url: &str) -> bool {
    let mut scheme = String::new();

    for c in url.chars() {
        match c {
            '\t' | '\n' | '\r' => continue,
            c if (c as u32) < 0x20 || c == '\u{7F}' => continue,
            '/' | '?' | '#' => return true,
            ':' => {
                let scheme = scheme.to_ascii_lowercase();
                return matches!(scheme.as_str(), "http" | "https" | "mailto");
            }
            c => scheme.push(c),
        }
    }

    true
}

/// The default element policy: known elements pass except the active /
/// raw-text set; unknown elements are dropped but keep their children.
pub struct BaselineElementPolicy;

impl ElementPolicy for BaselineElementPolicy {
    fn apply(&self, name: &str, _attrs: &mut Vec<Attr>) -> ElementDecision {
        if DROP_WITH_CONTENT.contains(&name) {
            return ElementDecision::Drop {
                keep_content: false,
            };
        }

        if ELEMENTS.get(name).is_none() {
            return ElementDecision::Drop { keep_content: true };
        }

        ElementDecision::Allow
    }
}

/// The default attribute policy: event handlers are dropped, URL
/// attributes are scheme-checked, everything else passes (the `style`
/// attribute is rewritten separately by the CSS filter).
pub struct BaselineAttributePolicy;

impl AttributePolicy for BaselineAttributePolicy {
    fn apply(&self, _element: &str, attr: &str, value: Option<&str>) -> AttributeDecision {
        if attr.starts_with("on") || attr == "srcset" {
            return AttributeDecision::Drop;
        }

        if URL_ATTRS.contains(&attr) {
            return match value {
                Some(url) if is_safe_url(url) => AttributeDecision::Keep,
                _ => AttributeDecision::Drop,
            };
        }

        AttributeDecision::Keep
    }
}
