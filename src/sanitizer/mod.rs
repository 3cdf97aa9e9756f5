//! The public sanitizer surface: a builder that assembles the pipeline
//! and a `sanitize` call that runs it.

mod serializer;

pub use self::serializer::HtmlSerializer;

use crate::balancer::{NestingLimitError, TagBalancer};
use crate::css::CssSchema;
use crate::events::{HtmlStreamReceiver, StreamEventSource};
use crate::policy::{
    AttributePolicy, BaselineAttributePolicy, BaselineElementPolicy, ElementPolicy,
};

pub struct SanitizerBuilder {
    element_policy: Box<dyn ElementPolicy>,
    attribute_policy: Box<dyn AttributePolicy>,
    css: &'static CssSchema,
    nesting_limit: Option<usize>,
}

impl Default for SanitizerBuilder {
    fn default() -> Self {
        SanitizerBuilder {
            element_policy: Box::new(BaselineElementPolicy),
            attribute_policy: Box::new(BaselineAttributePolicy),
            css: CssSchema::default_whitelist(),
            nesting_limit: None,
        }
    }
}

impl SanitizerBuilder {
    pub fn element_policy(mut self, policy: impl ElementPolicy + 'static) -> Self {
        self.element_policy = Box::new(policy);
        self
    }

    pub fn attribute_policy(mut self, policy: impl AttributePolicy + 'static) -> Self {
        self.attribute_policy = Box::new(policy);
        self
    }

    pub fn css_schema(mut self, schema: &'static CssSchema) -> Self {
        self.css = schema;
        self
    }

    /// Bounds the depth of open elements in the output. Elements past
    /// the limit are dropped, matching closes included.
    pub fn nesting_limit(mut self, limit: usize) -> Self {
        self.nesting_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<Sanitizer, NestingLimitError> {
        if self.nesting_limit == Some(0) {
            return Err(NestingLimitError::Zero);
        }

        Ok(Sanitizer {
            element_policy: self.element_policy,
            attribute_policy: self.attribute_policy,
            css: self.css,
            nesting_limit: self.nesting_limit,
        })
    }
}

/// A configured sanitizer. Static tables are shared; the per-call
/// pipeline state is owned by the call, so one instance may be used from
/// multiple threads behind a shared reference only if its policies are
/// `Sync` — or simply build one instance per thread, they are cheap.
pub struct Sanitizer {
    element_policy: Box<dyn ElementPolicy>,
    attribute_policy: Box<dyn AttributePolicy>,
    css: &'static CssSchema,
    nesting_limit: Option<usize>,
}

impl Sanitizer {
    pub fn builder() -> SanitizerBuilder {
        SanitizerBuilder::default()
    }

    /// Sanitizes an HTML fragment. The output is always a balanced,
    /// well-formed fragment; on catastrophic input it may be empty, but
    /// it is never a partial tag or an unbalanced structure.
    pub fn sanitize(&self, html: &str) -> String {
        let mut balancer = TagBalancer::new(HtmlSerializer::new());

        if let Some(limit) = self.nesting_limit {
            // The builder validated the limit and the stack is empty.
            balancer
                .set_nesting_limit(limit)
                .expect("validated limit should apply to an empty stack");
        }

        let source = StreamEventSource::new(
            html,
            self.element_policy.as_ref(),
            self.attribute_policy.as_ref(),
            self.css,
            balancer,
        );

        source.run().into_inner().finish()
    }

    /// Runs the pipeline into a caller-supplied receiver instead of the
    /// string serializer. The receiver sees balanced events.
    pub fn sanitize_into<R: HtmlStreamReceiver>(&self, html: &str, receiver: R) -> R {
        let mut balancer = TagBalancer::new(receiver);

        if let Some(limit) = self.nesting_limit {
            balancer
                .set_nesting_limit(limit)
                .expect("validated limit should apply to an empty stack");
        }

        let source = StreamEventSource::new(
            html,
            self.element_policy.as_ref(),
            self.attribute_policy.as_ref(),
            self.css,
            balancer,
        );

        source.run().into_inner()
    }
}

/// Sanitizes with the baseline policy.
pub fn sanitize(html: &str) -> String {
    Sanitizer::builder()
        .build()
        .expect("default sanitizer configuration should be valid")
        .sanitize(html)
}
