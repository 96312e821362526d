//! vq-dom - Document Object Model
//!
//! Arena-based DOM tree with shared handles, class lists, inline style,
//! selector queries and event dispatch. This is the in-memory host that
//! `vega-query` wrappers run against when no browser is around.

mod classlist;
mod document;
mod element;
mod error;
mod event;
mod node;
mod selector;
mod style;
mod tree;

pub use classlist::DomTokenList;
pub use document::{Document, ElementCreationOptions, WeakDocument};
pub use element::{ClassList, Element, NodeOrString, NodeRef, StyleDeclaration};
pub use error::{DomError, DomResult};
pub use event::{Event, EventListener, EventPhase, ListenerOptions};
pub use node::{
    Attr, ElementData, HTML_NAMESPACE, MATHML_NAMESPACE, Namespace, Node, NodeData, NodeType,
    SVG_NAMESPACE,
};
pub use selector::{NthExpression, SelectorList};
pub use style::{Declaration, parse_declarations, property_name, serialize_declarations};
pub use tree::{Children, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
