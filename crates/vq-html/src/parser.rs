//! HTML5 Parser
//!
//! Parses with html5ever into its RcDom, then copies the result into a
//! `vq_dom` arena.

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace as NsAtom, QualName, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use vq_dom::{Document, DomTree, Element, Namespace, NodeId};

/// Context element for fragment parsing (the `innerHTML` target)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContext {
    pub local_name: String,
    pub namespace: Namespace,
}

impl Default for FragmentContext {
    fn default() -> Self {
        Self::new(Namespace::Html, "body")
    }
}

impl FragmentContext {
    pub fn new(namespace: Namespace, local_name: &str) -> Self {
        Self {
            local_name: local_name.to_string(),
            namespace,
        }
    }

    /// Context taken from an existing element
    pub fn of(element: &Element) -> Self {
        let namespace = Namespace::from_uri(element.namespace_uri().as_deref());
        Self::new(namespace, &element.local_name())
    }

    fn qual_name(&self) -> QualName {
        QualName::new(
            None,
            NsAtom::from(self.namespace.uri().unwrap_or_default()),
            LocalName::from(self.local_name.as_str()),
        )
    }
}

/// HTML5 parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a complete document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse a complete document with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);
        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let document = Document::with_url(url);
        document.with_tree_mut(|tree| {
            for child in dom.document.children.borrow().iter() {
                if let Some(id) = convert_node(child, tree) {
                    attach(tree, NodeId::ROOT, id);
                }
            }
            tracing::debug!("Parsed {} nodes", tree.len());
        });
        document
    }

    /// Parse `markup` as the children of an element described by `context`.
    ///
    /// Returns the top-level nodes, created detached inside `document`.
    pub fn parse_fragment(&self, document: &Document, context: &FragmentContext, markup: &str) -> Vec<NodeId> {
        tracing::debug!(context = %context.local_name, "Parsing HTML fragment");
        let dom = parse_fragment(RcDom::default(), Default::default(), context.qual_name(), Vec::new(), false)
            .one(markup);

        // The tree builder puts the parsed nodes under a synthesized <html> root
        let Some(root) = find_child(&dom.document, "html") else {
            tracing::debug!("fragment produced no root");
            return Vec::new();
        };

        document.with_tree_mut(|tree| {
            root.children
                .borrow()
                .iter()
                .filter_map(|child| convert_node(child, tree))
                .collect()
        })
    }
}

/// Copy an RcDom node and its subtree into `tree`, detached
fn convert_node(handle: &Handle, tree: &mut DomTree) -> Option<NodeId> {
    let (id, children) = match &handle.data {
        RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return None,
        RcNodeData::Doctype {
            name,
            public_id,
            system_id,
        } => (tree.create_doctype(name, public_id, system_id), Vec::new()),
        RcNodeData::Text { contents } => (tree.create_text(&contents.borrow()), Vec::new()),
        RcNodeData::Comment { contents } => (tree.create_comment(contents), Vec::new()),
        RcNodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let namespace = Namespace::from_uri(Some(&*name.ns));
            let prefix = name.prefix.as_ref().map(|p| p.to_string());
            let id = tree.create_element(namespace, prefix, &name.local);

            for attr in attrs.borrow().iter() {
                let attr_name = match &attr.name.prefix {
                    Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                    None => attr.name.local.to_string(),
                };
                if let Err(err) = tree.set_attribute(id, &attr_name, &attr.value) {
                    tracing::debug!(%err, "dropping attribute");
                }
            }

            // Template content is kept inline as ordinary children
            let children: Vec<Handle> = match template_contents.borrow().as_ref() {
                Some(content) => content.children.borrow().clone(),
                None => handle.children.borrow().clone(),
            };
            (id, children)
        }
    };

    for child in &children {
        if let Some(child_id) = convert_node(child, tree) {
            attach(tree, id, child_id);
        }
    }
    Some(id)
}

fn attach(tree: &mut DomTree, parent: NodeId, child: NodeId) {
    if let Err(err) = tree.append_child(parent, child) {
        tracing::debug!(%err, "dropping parsed node");
    }
}

fn find_child(parent: &Handle, local_name: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|c| matches!(&c.data, RcNodeData::Element { name, .. } if &*name.local == local_name))
        .cloned()
}
