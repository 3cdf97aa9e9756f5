//! `style` attribute filtering through the whole sanitizer, plus the
//! output guarantees of the CSS normalizer.

use scour::{filter_style, sanitize, CssSchema};

fn filter(css: &str) -> String {
    filter_style(CssSchema::default_whitelist(), css)
}

#[test]
fn style_survives_when_clean() {
    assert_eq!(
        sanitize("<span style=\"color: red\">x</span>"),
        "<span style=\"color:red\">x</span>"
    );
}

#[test]
fn empty_filtered_style_drops_the_attribute() {
    assert_eq!(
        sanitize("<span style=\"behavior: url(#evil)\">x</span>"),
        "<span>x</span>"
    );
}

#[test]
fn expression_and_moz_binding_do_not_survive() {
    assert_eq!(filter("width: expression(document.cookie)"), "");
    assert_eq!(filter("-moz-binding: url(evil.xml)"), "");
}

#[test]
fn comment_hidden_payloads_are_neutralized() {
    assert_eq!(filter("col/* */or: red"), "");
    assert_eq!(filter("color/* */: red"), "color:red");
    assert_eq!(filter("color: r/* */ed"), "");
}

#[test]
fn escaped_property_names_still_match() {
    // `\63 olor` decodes to `color` in the lexer.
    assert_eq!(filter("\\63 olor: red"), "color:red");
    assert_eq!(filter("color: \\72 ed"), "color:red");
}

#[test]
fn markup_cannot_tunnel_through_style() {
    for evil in &[
        "color: '</style><script>alert(1)</script>'",
        "font-family: '</style>'",
        "color: red; font-family: 'a<!--b'",
        "background: url('</style>')",
    ] {
        let out = sanitize(&format!("<span style=\"{}\">x</span>", evil.replace('"', "&quot;")));
        let lower = out.to_lowercase();

        assert!(!lower.contains("</style"), "output was {:?}", out);
        assert!(!lower.contains("<script"), "output was {:?}", out);
        assert!(!lower.contains("<!--"), "output was {:?}", out);
    }
}

#[test]
fn multiple_declarations_join_with_semicolons() {
    assert_eq!(
        filter("color: red; margin: 0; bogus: 1; float: left"),
        "color:red;margin:0;float:left"
    );
}

#[test]
fn custom_schema_restricts_properties() {
    let schema = CssSchema::with_properties(&["color"]).unwrap();

    assert_eq!(filter_style(&schema, "color: red; margin: 0"), "color:red");
}

#[test]
fn unknown_property_in_custom_schema_fails_construction() {
    assert!(CssSchema::with_properties(&["colr"]).is_err());
}

#[test]
fn filtered_styles_are_stable() {
    for css in &[
        "color: red",
        "margin: 0 auto",
        "font: 12px/1.5 serif",
        "font-family: Arial Black, serif",
        "color: rgb(1,2,3)",
        "border: 1px solid #ccc",
        "text-shadow: 1px 1px 2px black",
    ] {
        let once = filter(css);
        let twice = filter(&once);

        assert_eq!(once, twice, "unstable for {:?}", css);
    }
}
