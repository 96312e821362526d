//! Comprehensive tests for vega-query
//!
//! Wrapper behavior against the in-memory vq-dom host.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use vega_query::prelude::*;
use vega_query::vq_dom::{Element, Event, EventListener};

const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>page</title></head>
<body>
<h1>Title</h1>
<p id="first">one</p>
<p>two</p>
<a href="/x">x</a>
<a href="/y">y</a>
<textarea></textarea>
<button id="btnClickMe">Click</button>
</body></html>"#;

fn counter() -> (Rc<Cell<usize>>, EventListener) {
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    let listener = EventListener::new(move |_| seen.set(seen.get() + 1));
    (count, listener)
}

// ============================================================================
// Entry points
// ============================================================================

#[test]
fn test_select_first_match() {
    let q = Query::parse(PAGE);
    let p = q.select("p").unwrap().unwrap();
    assert_eq!(p.element().id(), "first");
}

#[test]
fn test_select_missing_is_none() {
    let q = Query::parse(PAGE);
    assert!(q.select("table").unwrap().is_none());
    assert!(q.by_id("nope").is_none());
}

#[test]
fn test_by_id() {
    let q = Query::parse(PAGE);
    let button = q.by_id("btnClickMe").unwrap();
    assert_eq!(button.element().local_name(), "button");
}

#[test]
fn test_select_all_document_order() {
    let q = Query::parse(PAGE);
    let found = q.select_all("h1, p, a").unwrap();
    let names: Vec<String> = found.iter().map(|e| e.element().local_name()).collect();
    assert_eq!(names, vec!["h1", "p", "p", "a", "a"]);
}

#[test]
fn test_scoped_selection() {
    let q = Query::parse("<ul id=\"a\"><li>1</li><li>2</li></ul><ul id=\"b\"><li>3</li></ul>");
    let b = q.by_id("b").unwrap();

    let items = q.select_all_in("li", b.element()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items.text(None).value().unwrap(), vec!["3".to_string()]);

    let scoped = q.clone().with_scope(b.element().clone());
    assert_eq!(scoped.select("li").unwrap().unwrap().text(None).value().unwrap(), "3");
    assert!(q.select_in("ul", b.element()).unwrap().is_none());
}

#[test]
fn test_invalid_selector_is_host_error() {
    let q = Query::parse(PAGE);
    assert!(q.select("p[").is_err());
    assert!(q.select_all("::before").is_err());
}

#[test]
fn test_create_detached_with_attributes() {
    let q = Query::in_memory();
    let a = q.create("a", Some(&json!({ "href": "#", "data-n": 3 })), None).unwrap();

    assert!(!a.element().is_connected());
    assert_eq!(a.element().get_attribute("href").as_deref(), Some("#"));
    assert_eq!(a.element().get_attribute("data-n").as_deref(), Some("3"));
}

#[test]
fn test_create_with_is_option() {
    let q = Query::in_memory();
    let button = q.create("button", None, Some(&ElementCreationOptions::is("fancy-button"))).unwrap();
    assert_eq!(button.element().is_value().as_deref(), Some("fancy-button"));
}

#[test]
fn test_create_svg() {
    let q = Query::in_memory();
    let svg = q.create_svg("svg", Some(&json!({ "width": 100, "height": 100 }))).unwrap();

    assert_eq!(svg.element().namespace_uri().as_deref(), Some(vega_query::SVG_NAMESPACE));
    assert_eq!(svg.element().get_attribute("width").as_deref(), Some("100"));
    assert_eq!(svg.element().get_attribute("height").as_deref(), Some("100"));
}

#[test]
fn test_style_entry_point() {
    let q = Query::parse(PAGE);
    let styled = q.style("a", &json!({ "color": "red" })).unwrap();

    assert_eq!(styled.len(), 2);
    for a in &styled {
        assert_eq!(a.element().style().unwrap().get("color"), "red");
    }
}

// ============================================================================
// Single-element wrapper
// ============================================================================

#[test]
fn test_text_set_returns_wrapper() {
    let q = Query::parse(PAGE);
    let h1 = q.select("h1").unwrap().unwrap();

    let chained = h1.text(Some("New")).chain().unwrap();
    assert!(std::ptr::eq(chained, &h1));
    assert_eq!(h1.text(None).value().unwrap(), "New");
}

#[test]
fn test_empty_text_reads() {
    let q = Query::parse(PAGE);
    let h1 = q.select("h1").unwrap().unwrap();
    h1.text(Some("A"));

    assert_eq!(h1.text(Some("")).value().unwrap(), "A");
    assert_eq!(h1.text(None).value().unwrap(), "A");
}

#[test]
fn test_html_get_and_set() {
    let q = Query::parse(PAGE);
    let p = q.by_id("first").unwrap();

    assert_eq!(p.html(None).unwrap().value().unwrap(), "one");
    assert!(p.html(Some("<b>bold</b>")).unwrap().is_chain());
    assert_eq!(p.html(None).unwrap().value().unwrap(), "<b>bold</b>");
    assert_eq!(p.text(None).value().unwrap(), "bold");
    assert_eq!(p.html(Some("")).unwrap().value().unwrap(), "<b>bold</b>");
}

#[test]
fn test_attr_is_chainable() {
    let q = Query::parse(PAGE);
    let a = q.select("a").unwrap().unwrap();
    a.attr(&json!({ "href": "#" })).unwrap().add_class(["link"]).unwrap();

    assert_eq!(a.element().get_attribute("href").as_deref(), Some("#"));
    assert!(a.has_class("link"));
}

#[test]
fn test_attr_style_matches_style() {
    let q = Query::parse("<a id=\"one\">1</a><a id=\"two\">2</a>");
    let one = q.by_id("one").unwrap();
    let two = q.by_id("two").unwrap();

    one.attr(&json!({ "style": { "color": "red" } })).unwrap();
    two.style(&json!({ "color": "red" })).unwrap();

    assert_eq!(
        one.element().get_attribute("style"),
        two.element().get_attribute("style")
    );
    assert_eq!(one.element().get_attribute("style").as_deref(), Some("color: red;"));
}

#[test]
fn test_attr_string_style_is_attribute() {
    let q = Query::in_memory();
    let div = q.create("div", Some(&json!({ "style": "color: blue" })), None).unwrap();

    assert_eq!(div.element().get_attribute("style").as_deref(), Some("color: blue"));
    assert_eq!(div.element().style().unwrap().get("color"), "blue");
}

#[test]
fn test_class_add_remove() {
    let q = Query::parse(PAGE);
    let h1 = q.select("h1").unwrap().unwrap();

    h1.add_class(["x", "y"]).unwrap().remove_class(["x"]).unwrap();
    assert!(!h1.has_class("x"));
    assert!(h1.has_class("y"));

    h1.remove_class(["x"]).unwrap();
    assert!(!h1.has_class("x"));
}

#[test]
fn test_toggle_sequences() {
    let q = Query::parse(PAGE);
    let h1 = q.select("h1").unwrap().unwrap();

    assert!(h1.toggle_class("x", None).unwrap());
    assert!(!h1.toggle_class("x", None).unwrap());

    assert!(h1.toggle_class("x", Some(true)).unwrap());
    assert!(h1.toggle_class("x", Some(true)).unwrap());
    assert!(!h1.toggle_class("x", Some(false)).unwrap());
}

#[test]
fn test_append_then_prepend_order() {
    let q = Query::in_memory();
    let parent = q.create("div", None, None).unwrap();
    let a = q.create("a", None, None).unwrap();
    let b = q.create("b", None, None).unwrap();
    let c = q.create("i", None, None).unwrap();

    parent.append([&a, &b]).unwrap().prepend([&c]).unwrap();

    let names: Vec<String> = parent.element().children().iter().map(|e| e.local_name()).collect();
    assert_eq!(names, vec!["i", "a", "b"]);
}

#[test]
fn test_append_text_and_nodes() {
    let q = Query::in_memory();
    let p = q.create("p", None, None).unwrap();
    let b = q.create("b", None, None).unwrap();
    b.text(Some("mid"));

    let parts: [Child<'_, Element>; 3] = [
        Child::from("start "),
        Child::from(&b),
        Child::from(String::from(" end")),
    ];
    p.append(parts).unwrap();
    assert_eq!(p.html(None).unwrap().value().unwrap(), "start <b>mid</b> end");
}

#[test]
fn test_append_moves_node() {
    let q = Query::parse("<div id=\"from\"><span>s</span></div><div id=\"to\"></div>");
    let span = q.select("span").unwrap().unwrap();
    let to = q.by_id("to").unwrap();

    to.append([span]).unwrap();
    assert_eq!(q.by_id("from").unwrap().html(None).unwrap().value().unwrap(), "");
    assert_eq!(to.html(None).unwrap().value().unwrap(), "<span>s</span>");
}

#[test]
fn test_on_off_multiple_names() {
    let q = Query::parse(PAGE);
    let a = q.select("a").unwrap().unwrap();
    let (count, listener) = counter();

    a.on("click keydown", &listener, false).unwrap();
    a.click().unwrap();
    assert_eq!(count.get(), 1);
    a.element().dispatch_event(&mut Event::new("keydown", true, true));
    assert_eq!(count.get(), 2);

    a.off("click keydown", &listener, false).unwrap();
    a.click().unwrap();
    a.element().dispatch_event(&mut Event::new("keydown", true, true));
    assert_eq!(count.get(), 2);
}

#[test]
fn test_on_once_option() {
    let q = Query::parse(PAGE);
    let button = q.by_id("btnClickMe").unwrap();
    let (count, listener) = counter();

    button.on("click", &listener, ListenerOptions::new().with_once(true)).unwrap();
    button.click().unwrap().click().unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_click_bubbles_to_document() {
    let q = Query::parse(PAGE);
    let (count, listener) = counter();
    let body = q.select("body").unwrap().unwrap();
    body.on("click", &listener, false).unwrap();

    q.by_id("btnClickMe").unwrap().click().unwrap();
    assert_eq!(count.get(), 1);
}

// ============================================================================
// Collection wrapper
// ============================================================================

#[test]
fn test_collection_text_set_returns_new_collection() {
    let q = Query::parse(PAGE);
    let paragraphs = q.select_all("p").unwrap();

    let updated = paragraphs.text(Some("same")).chain().unwrap();
    assert_eq!(updated, paragraphs);
    assert_eq!(
        paragraphs.text(None).value().unwrap(),
        vec!["same".to_string(), "same".to_string()]
    );
}

#[test]
fn test_collection_html_getter() {
    let q = Query::parse("<h1>a<i>b</i></h1><h1>c</h1>");
    let html = q.select_all("h1").unwrap().html(None).unwrap().value().unwrap();
    assert_eq!(html, vec!["a<i>b</i>".to_string(), "c".to_string()]);
}

#[test]
fn test_collection_toggle_is_conjunction() {
    let q = Query::parse("<p class=\"x\">1</p><p>2</p><p>3</p>");
    let paragraphs = q.select_all("p").unwrap();

    assert!(!paragraphs.toggle_class("x", None).unwrap());
    let states: Vec<bool> = paragraphs.iter().map(|p| p.has_class("x")).collect();
    assert_eq!(states, vec![false, true, true]);

    assert!(!paragraphs.has_class("x"));
    assert!(paragraphs.toggle_class("x", Some(true)).unwrap());
    assert!(paragraphs.has_class("x"));
}

#[test]
fn test_collection_broadcast_chain() {
    let q = Query::parse(PAGE);
    let links = q.select_all("a").unwrap();

    links
        .style(&json!({ "color": "red" }))
        .unwrap()
        .attr(&json!({ "style": { "textDecoration": "none" } }))
        .unwrap();

    for a in &links {
        assert_eq!(
            a.element().get_attribute("style").as_deref(),
            Some("color: red; text-decoration: none;")
        );
    }
}

#[test]
fn test_collection_prepend_append_text() {
    let q = Query::parse(PAGE);
    let links = q.select_all("a").unwrap();
    links.prepend(["> "]).unwrap().append([";"]).unwrap();

    assert_eq!(
        links.text(None).value().unwrap(),
        vec!["> x;".to_string(), "> y;".to_string()]
    );
}

#[test]
fn test_collection_listener_on_every_element() {
    let q = Query::parse(PAGE);
    let links = q.select_all("a").unwrap();
    let (count, listener) = counter();

    links.on("click", &listener, false).unwrap().click().unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn test_collection_conversions() {
    let q = Query::parse(PAGE);
    let links = q.select_all("a").unwrap();
    assert_eq!(links.get(1).unwrap().text(None).value().unwrap(), "y");
    assert!(links.get(2).is_none());

    let rebuilt: VqElements<_> = links.clone().into_iter().map(|w| w.into_element()).collect();
    assert_eq!(rebuilt, links);
    assert_eq!(VqElements::from_wrappers(links.elements().to_vec()), links);
}
