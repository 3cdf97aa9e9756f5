//! End-to-end nesting repair scenarios driven through the full pipeline.

use crate::harness::assert_balanced;
use scour::sanitize;

#[test]
fn table_structure_is_completed() {
    assert_eq!(
        sanitize("<table><td>x"),
        "<table><tr><td>x</td></tr></table>"
    );
    assert_eq!(
        sanitize("<table><tr><td>a<td>b"),
        "<table><tr><td>a</td><td>b</td></tr></table>"
    );
}

#[test]
fn table_scope_traps_outer_closes() {
    assert_eq!(
        sanitize("<div><table><tr><td>x</div>y"),
        "<div><table><tr><td>xy</td></tr></table></div>"
    );
}

#[test]
fn list_items_imply_and_close() {
    assert_eq!(sanitize("<ul><li>a<li>b"), "<ul><li>a</li><li>b</li></ul>");
    assert_eq!(sanitize("<ul>a"), "<ul><li>a</li></ul>");
    assert_eq!(sanitize("<ol><div>x"), "<ol><li><div>x</div></li></ol>");
}

#[test]
fn definition_lists() {
    assert_eq!(
        sanitize("<dl><dt>term<dd>def</dl>"),
        "<dl><dt>term</dt><dd>def</dd></dl>"
    );
}

#[test]
fn block_in_paragraph_splits() {
    assert_eq!(sanitize("<p>a<div>b</div>c"), "<p>a</p><div>b</div>c");
}

#[test]
fn formatting_elements_resume_with_attributes() {
    assert_eq!(
        sanitize("<b>1<i title=x>2</b>3</i>"),
        "<b>1<i title=\"x\">2</i></b><i title=\"x\">3</i>"
    );
}

#[test]
fn deeply_misnested_formatting() {
    let out = sanitize("<b><i><u>x</b>y</i>z</u>");

    assert_balanced(&out);
    assert_eq!(out, "<b><i><u>x</u></i></b><i><u>y</u></i><u>z</u>");
}

#[test]
fn header_closes_any_open_header() {
    assert_eq!(sanitize("<h2>a</h5>b"), "<h2>a</h2>b");
    assert_eq!(sanitize("<h6>a</h1>"), "<h6>a</h6>");
}

#[test]
fn void_elements_self_close_in_output() {
    assert_eq!(sanitize("<p>a<br>b<hr>c"), "<p>a<br />b</p><hr />c");
}

#[test]
fn stray_closes_vanish() {
    assert_eq!(sanitize("</div>x</p>"), "x");
    assert_eq!(sanitize("a</b>b"), "ab");
}

#[test]
fn anchor_does_not_contain_anchor() {
    assert_eq!(sanitize("<a>1<a>2"), "<a>1</a><a>2</a>");
}

#[test]
fn button_scope_blocks_paragraph_close() {
    // The `</p>` inside the button cannot reach the outer paragraph.
    assert_eq!(
        sanitize("<p>a<button>b</p>c</button>d"),
        "<p>a<button>bc</button>d</p>"
    );
}
