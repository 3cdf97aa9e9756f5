mod source;

pub use self::source::StreamEventSource;

/// An attribute as seen by policies and receivers: canonical name plus an
/// entity-decoded value. `None` is the valueless boolean form
/// (`checked`), distinct from an explicit empty value (`checked=""`).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
}

impl Attr {
    #[inline]
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Attr {
            name: name.into(),
            value,
        }
    }
}

/// The stream receiver interface: the downstream boundary of both the
/// event source and the tag balancer.
///
/// Within one sanitization, events arrive in strict forward order of
/// their producing tokens; a balancer in the chain may interleave
/// synthetic opens and closes but never reorders real events.
pub trait HtmlStreamReceiver {
    fn open_document(&mut self) {}
    fn close_document(&mut self) {}
    fn open_tag(&mut self, name: &str, attrs: Vec<Attr>);
    fn close_tag(&mut self, name: &str);
    fn text(&mut self, chars: &str);
}
