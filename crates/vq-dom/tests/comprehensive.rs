//! Comprehensive tests for vq-dom
//!
//! Document handles, queries, mutation and event dispatch working together.

use std::cell::RefCell;
use std::rc::Rc;

use vq_dom::{
    Document, DomError, ElementCreationOptions, Event, EventListener, EventPhase, ListenerOptions,
    NodeOrString, NodeType, SVG_NAMESPACE,
};

fn list_document() -> Document {
    let doc = Document::html();
    let body = doc.body().unwrap();
    let ul = doc.create_element("ul", None).unwrap();
    ul.set_id("items").unwrap();
    body.append([&ul]).unwrap();

    for (i, class) in ["odd", "even", "odd"].iter().enumerate() {
        let li = doc.create_element("li", None).unwrap();
        li.set_class_name(class).unwrap();
        li.set_text_content(&format!("item {}", i + 1));
        ul.append([&li]).unwrap();
    }
    doc
}

// ============================================================================
// QUERIES
// ============================================================================

#[test]
fn test_query_selector_first_in_document_order() {
    let doc = list_document();
    let li = doc.query_selector("li.odd").unwrap().unwrap();
    assert_eq!(li.text_content().as_deref(), Some("item 1"));
}

#[test]
fn test_query_selector_all_document_order() {
    let doc = list_document();
    let texts: Vec<String> = doc
        .query_selector_all("#items > li")
        .unwrap()
        .iter()
        .filter_map(|li| li.text_content())
        .collect();
    assert_eq!(texts, vec!["item 1", "item 2", "item 3"]);
}

#[test]
fn test_query_selector_no_match() {
    let doc = list_document();
    assert!(doc.query_selector("table").unwrap().is_none());
    assert!(doc.query_selector_all("table").unwrap().is_empty());
}

#[test]
fn test_query_selector_syntax_error() {
    let doc = list_document();
    assert!(matches!(doc.query_selector("li["), Err(DomError::Syntax(_))));
    assert!(matches!(doc.query_selector_all(">>"), Err(DomError::Syntax(_))));
}

#[test]
fn test_element_scoped_query() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    let found = ul.query_selector_all("li").unwrap();
    assert_eq!(found.len(), 3);

    // Scoped queries only return descendants, but match against the whole tree
    let found = ul.query_selector_all("body li").unwrap();
    assert_eq!(found.len(), 3);
    assert!(ul.query_selector("ul").unwrap().is_none());

    let direct = ul.query_selector_all(":scope > li").unwrap();
    assert_eq!(direct.len(), 3);
}

// ============================================================================
// CREATION AND MUTATION
// ============================================================================

#[test]
fn test_created_element_is_detached() {
    let doc = Document::html();
    let div = doc.create_element("div", None).unwrap();
    assert!(!div.is_connected());
    assert_eq!(div.node_type(), Some(NodeType::Element));

    doc.body().unwrap().append([&div]).unwrap();
    assert!(div.is_connected());
}

#[test]
fn test_create_element_with_is() {
    let doc = Document::html();
    let options = ElementCreationOptions {
        is: Some("my-button".to_string()),
    };
    let button = doc.create_element("button", Some(&options)).unwrap();
    assert_eq!(button.is_value().as_deref(), Some("my-button"));
}

#[test]
fn test_svg_element() {
    let doc = Document::html();
    let svg = doc.create_element_ns(Some(SVG_NAMESPACE), "svg").unwrap();
    svg.set_attribute_ns(None, "viewBox", "0 0 10 10").unwrap();

    assert_eq!(svg.namespace_uri().as_deref(), Some(SVG_NAMESPACE));
    assert_eq!(svg.tag_name(), "svg");
    assert_eq!(svg.get_attribute("viewBox").as_deref(), Some("0 0 10 10"));
    assert_eq!(svg.get_attribute("viewbox"), None);
}

#[test]
fn test_append_moves_existing_node() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    let first = ul.children()[0].clone();

    ul.append([&first]).unwrap();
    let texts: Vec<String> = ul
        .children()
        .iter()
        .filter_map(|li| li.text_content())
        .collect();
    assert_eq!(texts, vec!["item 2", "item 3", "item 1"]);
}

#[test]
fn test_prepend_text_and_nodes() {
    let doc = Document::html();
    let p = doc.create_element("p", None).unwrap();
    p.set_text_content("world");
    let b = doc.create_element("b", None).unwrap();
    b.set_text_content("hello");

    p.prepend(vec![NodeOrString::from(&b), NodeOrString::from(", ")])
        .unwrap();
    assert_eq!(p.text_content().as_deref(), Some("hello, world"));
}

#[test]
fn test_set_text_content_replaces_children() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    ul.set_text_content("gone");

    assert!(ul.children().is_empty());
    assert_eq!(ul.child_nodes().len(), 1);
    assert!(doc.query_selector("li").unwrap().is_none());
}

#[test]
fn test_remove_detaches() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    ul.remove();

    assert!(doc.get_element_by_id("items").is_none());
    assert_eq!(ul.children().len(), 3);
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_capture_target_bubble_order() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    let li = ul.children()[1].clone();
    let log = Rc::new(RefCell::new(Vec::new()));

    for (node, label, capture) in [
        (doc.root(), "document-capture", true),
        (ul.as_node().clone(), "ul-bubble", false),
        (li.as_node().clone(), "li-bubble", false),
        (li.as_node().clone(), "li-capture", true),
    ] {
        let log = log.clone();
        node.add_event_listener(
            "click",
            EventListener::new(move |e: &mut Event| log.borrow_mut().push((label, e.phase))),
            capture,
        );
    }

    li.click().unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            ("document-capture", EventPhase::Capturing),
            ("li-capture", EventPhase::AtTarget),
            ("li-bubble", EventPhase::AtTarget),
            ("ul-bubble", EventPhase::Bubbling),
        ]
    );
}

#[test]
fn test_stop_propagation() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    let li = ul.children()[0].clone();
    let reached = Rc::new(RefCell::new(false));

    li.add_event_listener("click", EventListener::new(|e| e.stop_propagation()), false);
    let flag = reached.clone();
    ul.add_event_listener(
        "click",
        EventListener::new(move |_| *flag.borrow_mut() = true),
        false,
    );

    li.click().unwrap();
    assert!(!*reached.borrow());
}

#[test]
fn test_remove_event_listener() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    let listener = EventListener::new(move |_| *counter.borrow_mut() += 1);

    ul.add_event_listener("click", listener.clone(), ListenerOptions::new());
    ul.click().unwrap();
    ul.remove_event_listener("click", &listener, false);
    ul.click().unwrap();

    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_listener_may_mutate_tree() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    let target = ul.clone();
    ul.add_event_listener(
        "click",
        EventListener::new(move |_| target.set_text_content("clicked")),
        false,
    );

    ul.click().unwrap();
    assert_eq!(ul.text_content().as_deref(), Some("clicked"));
}

#[test]
fn test_dispatch_custom_event_not_bubbling() {
    let doc = list_document();
    let ul = doc.get_element_by_id("items").unwrap();
    let li = ul.children()[0].clone();
    let seen = Rc::new(RefCell::new(0));
    let counter = seen.clone();
    ul.add_event_listener(
        "ping",
        EventListener::new(move |_| *counter.borrow_mut() += 1),
        false,
    );

    let mut event = Event::new("ping", false, false);
    assert!(li.dispatch_event(&mut event));
    assert_eq!(*seen.borrow(), 0);
}
