use crate::harness::{assert_balanced, assert_idempotent};
use scour::{sanitize, Attr, ElementDecision, ElementPolicy, Sanitizer};

#[test]
fn sibling_paragraphs_get_closed() {
    assert_eq!(sanitize("<p>1<p>2"), "<p>1</p><p>2</p>");
}

#[test]
fn adoption_agency_resumes_italics() {
    assert_eq!(
        sanitize("<b>Foo<i>Bar</b>Baz</i>"),
        "<b>Foo<i>Bar</i></b><i>Baz</i>"
    );
}

#[test]
fn valueless_attribute_is_preserved() {
    assert_eq!(
        sanitize("<input type=checkbox checked>"),
        "<input type=\"checkbox\" checked />"
    );
}

#[test]
fn explicit_empty_value_stays_explicit() {
    assert_eq!(
        sanitize("<input type=checkbox checked=>"),
        "<input type=\"checkbox\" checked=\"\" />"
    );
}

#[test]
fn unquoted_value_absorbs_space() {
    assert_eq!(sanitize("<a title=foo bar>x</a>"), "<a title=\"foo bar\">x</a>");
}

#[test]
fn implied_list_item_wraps_paragraph() {
    assert_eq!(sanitize("<ul><p>x</p></ul>"), "<ul><li><p>x</p></li></ul>");
}

#[test]
fn script_is_fully_stripped() {
    assert_eq!(sanitize("<script>alert(1)</script>"), "");
    assert_eq!(sanitize("a<script>alert(1)</script>b"), "ab");
    assert_eq!(sanitize("<SCRIPT SRC=//evil.example>x</SCRIPT>"), "");
}

#[test]
fn event_handlers_are_stripped() {
    assert_eq!(sanitize("<b onclick=evil>x</b>"), "<b>x</b>");
    assert_eq!(sanitize("<b ONMOUSEOVER=\"evil()\">x</b>"), "<b>x</b>");
}

#[test]
fn style_attribute_is_filtered() {
    assert_eq!(
        sanitize("<p style=\"color: red; expression(evil)\">x</p>"),
        "<p style=\"color:red\">x</p>"
    );
}

#[test]
fn style_url_declaration_is_dropped() {
    assert_eq!(
        sanitize("<p style=\"background: url(javascript:foo)\">x</p>"),
        "<p>x</p>"
    );
}

#[test]
fn double_encoded_entity_survives_reencoding() {
    assert_eq!(sanitize("&amp;#x26;"), "&amp;#x26;");
}

#[test]
fn header_close_crosses_levels() {
    assert_eq!(sanitize("<h1>a</h2>"), "<h1>a</h1>");
}

#[test]
fn javascript_urls_are_dropped() {
    assert_eq!(sanitize("<a href=\"javascript:alert(1)\">x</a>"), "<a>x</a>");
    assert_eq!(sanitize("<a href=\"java\tscript:alert(1)\">x</a>"), "<a>x</a>");
    assert_eq!(
        sanitize("<a href=\"https://example.com/\">x</a>"),
        "<a href=\"https://example.com/\">x</a>"
    );
    assert_eq!(sanitize("<a href=\"/local\">x</a>"), "<a href=\"/local\">x</a>");
}

#[test]
fn entity_smuggled_urls_are_dropped() {
    // `&#106;` is `j`: the value decodes before the policy sees it.
    assert_eq!(
        sanitize("<a href=\"&#106;avascript:alert(1)\">x</a>"),
        "<a>x</a>"
    );
}

#[test]
fn style_element_content_does_not_leak() {
    assert_eq!(sanitize("<style>body { evil }</style>after"), "after");
}

#[test]
fn textarea_content_is_reencoded_text() {
    assert_eq!(
        sanitize("<textarea><b>not bold</textarea>"),
        "<textarea>&lt;b&gt;not bold</textarea>"
    );
}

#[test]
fn plaintext_is_refused() {
    assert_eq!(sanitize("<plaintext>anything<b>"), "");
}

#[test]
fn unknown_elements_drop_but_keep_children() {
    assert_eq!(sanitize("<blink>x</blink>"), "x");
    assert_eq!(sanitize("<custom-widget><b>y</b></custom-widget>"), "<b>y</b>");
}

#[test]
fn comments_and_directives_vanish() {
    assert_eq!(sanitize("a<!-- secret -->b"), "ab");
    assert_eq!(sanitize("<!doctype html><p>x</p>"), "<p>x</p>");
    assert_eq!(sanitize("a<?php die(); ?>b"), "ab");
    assert_eq!(sanitize("a<% die %>b"), "ab");
}

#[test]
fn unterminated_tags_never_leak() {
    assert_eq!(sanitize("<a href=\"x"), "");
    assert_eq!(sanitize("text<div"), "text");
    assert_eq!(sanitize("<"), "&lt;");
}

#[test]
fn slash_prefixed_attribute_names_are_dropped() {
    // A browser would re-parse `//onclick` as `onclick`.
    assert_eq!(sanitize("<a //onclick=evil>x</a>"), "<a>x</a>");
}

#[test]
fn duplicate_attributes_keep_first() {
    assert_eq!(
        sanitize("<a title=\"one\" title=\"two\">x</a>"),
        "<a title=\"one\">x</a>"
    );
}

#[test]
fn escaping_text_span_does_not_leak_script() {
    let out = sanitize("<script><!-- </script> evil --></script>x");

    assert!(!out.contains("evil"), "output was {:?}", out);
    assert!(out.ends_with('x'), "output was {:?}", out);
}

#[test]
fn custom_element_policy_can_rename() {
    struct Blessing;

    impl ElementPolicy for Blessing {
        fn apply(&self, name: &str, _attrs: &mut Vec<Attr>) -> ElementDecision {
            match name {
                "b" => ElementDecision::Rename("strong".to_string()),
                "script" => ElementDecision::Drop {
                    keep_content: false,
                },
                _ => ElementDecision::Allow,
            }
        }
    }

    let sanitizer = Sanitizer::builder().element_policy(Blessing).build().unwrap();

    assert_eq!(sanitizer.sanitize("<b>x</b>"), "<strong>x</strong>");
}

#[test]
fn nesting_limit_bounds_output_depth() {
    let sanitizer = Sanitizer::builder().nesting_limit(3).build().unwrap();

    let mut input = String::new();

    for _ in 0..10 {
        input.push_str("<div>");
    }

    input.push_str("deep");

    let out = sanitizer.sanitize(&input);

    assert_eq!(out, "<div><div><div>deep</div></div></div>");
}

#[test]
fn zero_nesting_limit_is_a_construction_error() {
    assert!(Sanitizer::builder().nesting_limit(0).build().is_err());
}

#[test]
fn outputs_are_idempotent_and_balanced() {
    let inputs = [
        "<p>1<p>2",
        "<b>Foo<i>Bar</b>Baz</i>",
        "<input type=checkbox checked>",
        "<a title=foo bar>x</a>",
        "<ul><p>x</p></ul>",
        "<ul>loose<li>item",
        "<table>x<tr><td>y",
        "<table><td>cell",
        "<h1>a</h2>",
        "<textarea><b>&amp;</textarea>",
        "a < b & c > d",
        "&amp;#x26;",
        "<a href=\"https://x\"><div><p>deep</div></a>end",
        "<dl><p>x</p></dl>",
        "<select>pick me</select>",
        "<b><em><i>x</b>y",
        "<form><form>inner</form></form>",
        "text<div",
        "<div style=\"margin:0 auto;color:#fff\">x</div>",
    ];

    for input in &inputs {
        let out = sanitize(input);

        assert_balanced(&out);
        assert_idempotent(input);
    }
}
