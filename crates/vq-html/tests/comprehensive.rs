//! Comprehensive tests for vq-html
//!
//! innerHTML reads and writes against live vq-dom documents.

use vq_dom::Document;
use vq_html::{inner_html, outer_html, parse, set_inner_html};

#[test]
fn test_set_then_get_inner_html() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "<p class=\"x\">Hi <b>there</b></p>").unwrap();

    assert_eq!(inner_html(&body), "<p class=\"x\">Hi <b>there</b></p>");
    assert_eq!(body.text_content().as_deref(), Some("Hi there"));
}

#[test]
fn test_inner_html_replaces_children() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    body.set_text_content("old");
    set_inner_html(&body, "<i>new</i>").unwrap();

    assert_eq!(inner_html(&body), "<i>new</i>");
}

#[test]
fn test_empty_markup_clears() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "<p>a</p><p>b</p>").unwrap();
    set_inner_html(&body, "").unwrap();

    assert_eq!(inner_html(&body), "");
    assert!(body.children().is_empty());
}

#[test]
fn test_parsed_elements_are_queryable() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "<ul><li id=\"one\">1</li><li>2</li></ul>").unwrap();

    assert!(doc.get_element_by_id("one").is_some());
    assert_eq!(doc.query_selector_all("ul > li").unwrap().len(), 2);
}

#[test]
fn test_text_is_escaped() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    body.set_text_content("<b>not bold</b> & more");

    assert_eq!(inner_html(&body), "&lt;b&gt;not bold&lt;/b&gt; &amp; more");
}

#[test]
fn test_entities_are_decoded() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "a &lt; b &amp;&amp; c").unwrap();

    assert_eq!(body.text_content().as_deref(), Some("a < b && c"));
}

#[test]
fn test_boolean_attribute_serialization() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "<input disabled>").unwrap();

    assert_eq!(inner_html(&body), "<input disabled=\"\">");
}

#[test]
fn test_style_attribute_after_style_change() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "<a href=\"#\">link</a>").unwrap();
    let a = doc.query_selector("a").unwrap().unwrap();
    a.style().unwrap().set("textDecoration", "none");

    assert_eq!(
        outer_html(&a),
        "<a href=\"#\" style=\"text-decoration: none;\">link</a>"
    );
}

#[test]
fn test_parse_full_document() {
    let doc = parse("<!DOCTYPE html><title>t</title><p id=\"x\">hello</p>");

    assert_eq!(doc.head().unwrap().text_content().as_deref(), Some("t"));
    assert_eq!(
        doc.get_element_by_id("x").unwrap().text_content().as_deref(),
        Some("hello")
    );
}

#[test]
fn test_comment_round_trip() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "<!-- note --><p></p>").unwrap();

    assert_eq!(inner_html(&body), "<!-- note --><p></p>");
}

#[test]
fn test_table_markup_keeps_rows() {
    let doc = parse("<table id=\"t\"></table>");
    let table = doc.get_element_by_id("t").unwrap();
    set_inner_html(&table, "<tr><td>1</td></tr>").unwrap();

    assert_eq!(inner_html(&table), "<tbody><tr><td>1</td></tr></tbody>");
    assert!(doc.query_selector("td").unwrap().is_some());
}

#[test]
fn test_svg_markup_stays_in_svg_namespace() {
    let doc = Document::html();
    let svg = doc.create_element_ns(Some(vq_dom::SVG_NAMESPACE), "svg").unwrap();
    set_inner_html(&svg, "<circle r=\"5\"></circle>").unwrap();

    let circle = &svg.children()[0];
    assert_eq!(circle.local_name(), "circle");
    assert_eq!(circle.namespace_uri().as_deref(), Some(vq_dom::SVG_NAMESPACE));
    assert_eq!(inner_html(&svg), "<circle r=\"5\"></circle>");
}

#[test]
fn test_select_markup_keeps_options() {
    let doc = Document::html();
    let select = doc.create_element("select", None).unwrap();
    set_inner_html(&select, "<option>a</option><option>b</option>").unwrap();

    assert_eq!(select.children().len(), 2);
    assert_eq!(select.children()[1].local_name(), "option");
}

#[test]
fn test_repeated_writes_reuse_arena_slots() {
    let doc = parse("<div id=\"d\"></div>");
    let div = doc.get_element_by_id("d").unwrap();
    set_inner_html(&div, "<p>1</p><p>2</p>").unwrap();
    let size = doc.with_tree(|tree| tree.len());

    for _ in 0..10 {
        set_inner_html(&div, "<p>1</p><p>2</p>").unwrap();
    }
    assert_eq!(doc.with_tree(|tree| tree.len()), size);
}

#[test]
fn test_replaced_children_stay_usable_while_held() {
    let doc = Document::html();
    let body = doc.body().unwrap();
    set_inner_html(&body, "<p>old</p>").unwrap();
    let old = body.children().into_iter().next().unwrap();

    set_inner_html(&body, "<i>new</i>").unwrap();
    assert_eq!(old.text_content().as_deref(), Some("old"));
    assert!(old.parent_node().is_none());

    body.append_child(&old).unwrap();
    assert_eq!(inner_html(&body), "<i>new</i><p>old</p>");
}
