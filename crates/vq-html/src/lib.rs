//! vq-html - HTML parsing and serialization for vq-dom
//!
//! Gives `vq_dom` elements their `innerHTML` / `outerHTML` behavior on top
//! of html5ever.

mod parser;
mod serializer;

pub use parser::{FragmentContext, HtmlParser};
pub use serializer::HtmlSerializer;

use vq_dom::{Document, DomResult, Element};

/// Parse a complete HTML document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// `Element.innerHTML` getter
pub fn inner_html(element: &Element) -> String {
    element
        .document()
        .with_tree(|tree| HtmlSerializer::new().serialize_inner(tree, element.node_id()))
}

/// `Element.outerHTML` getter
pub fn outer_html(element: &Element) -> String {
    element
        .document()
        .with_tree(|tree| HtmlSerializer::new().serialize_outer(tree, element.node_id()))
}

/// `Element.innerHTML` setter: replace all children with the markup,
/// parsed in the context of `element`
pub fn set_inner_html(element: &Element, markup: &str) -> DomResult<()> {
    let document = element.document();
    let context = FragmentContext::of(element);
    let nodes = HtmlParser::new().parse_fragment(document, &context, markup);
    tracing::trace!(node = ?element.node_id(), parsed = nodes.len(), "set_inner_html");
    let replaced = document.with_tree_mut(|tree| tree.replace_children(element.node_id(), &nodes));
    document.reclaim_detached();
    replaced
}
