//! The terminal stream receiver: serializes balanced events back into
//! HTML text with canonical quoting and encoding.

use crate::events::{Attr, HtmlStreamReceiver};
use crate::html::ELEMENTS;

#[derive(Default)]
pub struct HtmlSerializer {
    html: String,
}

impl HtmlSerializer {
    pub fn new() -> Self {
        HtmlSerializer::default()
    }

    pub fn finish(self) -> String {
        self.html
    }

    fn push_encoded_text(&mut self, chars: &str) {
        for c in chars.chars() {
            match c {
                '&' => self.html.push_str("&amp;"),
                '<' => self.html.push_str("&lt;"),
                '>' => self.html.push_str("&gt;"),
                _ => self.html.push(c),
            }
        }
    }

    fn push_encoded_attr(&mut self, value: &str) {
        for c in value.chars() {
            match c {
                '&' => self.html.push_str("&amp;"),
                '<' => self.html.push_str("&lt;"),
                '>' => self.html.push_str("&gt;"),
                '"' => self.html.push_str("&quot;"),
                '\'' => self.html.push_str("&#39;"),
                _ => self.html.push(c),
            }
        }
    }

    #[inline]
    fn is_void(name: &str) -> bool {
        ELEMENTS
            .get(name)
            .map_or(false, |idx| ELEMENTS.descriptor(idx).is_void)
    }
}

impl HtmlStreamReceiver for HtmlSerializer {
    fn open_tag(&mut self, name: &str, attrs: Vec<Attr>) {
        self.html.push('<');
        self.html.push_str(name);

        for attr in &attrs {
            self.html.push(' ');
            self.html.push_str(&attr.name);

            if let Some(value) = &attr.value {
                self.html.push_str("=\"");
                self.push_encoded_attr(value);
                self.html.push('"');
            }
        }

        if Self::is_void(name) {
            self.html.push_str(" />");
        } else {
            self.html.push('>');
        }
    }

    fn close_tag(&mut self, name: &str) {
        self.html.push_str("</");
        self.html.push_str(name);
        self.html.push('>');
    }

    fn text(&mut self, chars: &str) {
        self.push_encoded_text(chars);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_tag_syntax() {
        let mut serializer = HtmlSerializer::new();

        serializer.open_tag(
            "input",
            vec![
                Attr::new("type", Some("checkbox".into())),
                Attr::new("checked", None),
            ],
        );

        assert_eq!(serializer.finish(), "<input type=\"checkbox\" checked />");
    }

    #[test]
    fn empty_value_is_explicit() {
        let mut serializer = HtmlSerializer::new();

        serializer.open_tag("input", vec![Attr::new("checked", Some(String::new()))]);

        assert_eq!(serializer.finish(), "<input checked=\"\" />");
    }

    #[test]
    fn text_and_attr_encoding() {
        let mut serializer = HtmlSerializer::new();

        serializer.open_tag("a", vec![Attr::new("title", Some("a<b\"c".into()))]);
        serializer.text("x & <y>");
        serializer.close_tag("a");

        assert_eq!(
            serializer.finish(),
            "<a title=\"a&lt;b&quot;c\">x &amp; &lt;y&gt;</a>"
        );
    }
}
