//! HTML Serialization (innerHTML/outerHTML)
//!
//! Follows the HTML fragment serialization algorithm: void elements get no
//! end tag, raw text element content is written verbatim, every attribute
//! is written as `name="value"`.

use vq_dom::{DomTree, Namespace, NodeData, NodeId};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are not escaped
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// HTML serializer
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the children of a node
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output);
        output
    }

    /// Serialize a node and its descendants
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.serialize_children(tree, node_id, output),
            NodeData::Element(elem) => {
                let html = elem.namespace == Namespace::Html;
                let tag = if html {
                    elem.local_name.clone()
                } else {
                    elem.qualified_name()
                };

                output.push('<');
                output.push_str(&tag);
                for attr in &elem.attrs {
                    output.push(' ');
                    output.push_str(&attr.name);
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }
                output.push('>');

                if html && VOID_ELEMENTS.contains(&elem.local_name.as_str()) {
                    return;
                }

                if html && RAW_TEXT_ELEMENTS.contains(&elem.local_name.as_str()) {
                    self.serialize_children_raw(tree, node_id, output);
                } else {
                    self.serialize_children(tree, node_id, output);
                }

                output.push_str("</");
                output.push_str(&tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(text, output),
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output);
        }
    }

    fn serialize_children_raw(&self, tree: &DomTree, parent_id: NodeId, output: &mut String) {
        for (child_id, child) in tree.children(parent_id) {
            match &child.data {
                NodeData::Text(text) => output.push_str(text),
                _ => self.serialize_node(tree, child_id, output),
            }
        }
    }
}

/// Escape text content
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}
