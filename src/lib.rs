//! `scour` is a streaming HTML sanitizer: it accepts untrusted HTML text
//! and emits HTML that is safe to embed in a trusted page. The output
//! carries no scripts, cannot break out of its insertion context, and is
//! always a balanced, well-formed fragment under HTML5 parsing rules.
//!
//! The pipeline: a two-stage lexer splits raw characters into typed
//! tokens (with correct handling of `<script>`-style raw text regions),
//! an event source applies the configured policy per element and
//! attribute, a tag balancer repairs nesting against an HTML5 containment
//! table (including the adoption-agency resumption of formatting
//! elements), and a serializer re-emits canonical markup. `style`
//! attribute values pass through a normalizing CSS tokenizer and a
//! property whitelist.
//!
//! ```
//! assert_eq!(scour::sanitize("<p>1<p>2"), "<p>1</p><p>2</p>");
//! assert_eq!(scour::sanitize("<script>alert(1)</script>"), "");
//! assert_eq!(
//!     scour::sanitize("<b onclick=evil()>x</b>"),
//!     "<b>x</b>"
//! );
//! ```

#[macro_use]
mod debug_trace;

pub mod balancer;
pub mod base;
pub mod css;
pub mod events;
pub mod html;
pub mod parser;
pub mod policy;
pub mod sanitizer;

pub use self::balancer::{NestingLimitError, TagBalancer};
pub use self::css::{filter_style, CssSchema, CssTokenType, CssTokens, UnknownCssPropertyError};
pub use self::events::{Attr, HtmlStreamReceiver};
pub use self::policy::{
    join, AcceptAttributes, AttributeDecision, AttributePolicy, BaselineAttributePolicy,
    BaselineElementPolicy, ElementDecision, ElementPolicy, RejectAttributes,
};
pub use self::sanitizer::{sanitize, HtmlSerializer, Sanitizer, SanitizerBuilder};
