//! DOM Node - arena representation
//!
//! Nodes never hold pointers: tree links are `NodeId`s into the owning
//! `DomTree`, so a node can be detached, moved or re-parented by rewriting
//! five indices.

use crate::NodeId;
use crate::style::Declaration;

/// XHTML namespace URI
pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
/// SVG namespace URI
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// MathML namespace URI
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// Element namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    Svg,
    MathMl,
    /// Null namespace (`createElementNS(null, ..)`)
    Null,
    Other(String),
}

impl Namespace {
    /// Resolve a namespace URI
    pub fn from_uri(uri: Option<&str>) -> Self {
        match uri {
            None | Some("") => Self::Null,
            Some(HTML_NAMESPACE) => Self::Html,
            Some(SVG_NAMESPACE) => Self::Svg,
            Some(MATHML_NAMESPACE) => Self::MathMl,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Namespace URI, `None` for the null namespace
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Html => Some(HTML_NAMESPACE),
            Self::Svg => Some(SVG_NAMESPACE),
            Self::MathMl => Some(MATHML_NAMESPACE),
            Self::Null => None,
            Self::Other(uri) => Some(uri),
        }
    }

    /// Whether elements in this namespace expose an inline `style` declaration.
    ///
    /// Only HTML, SVG and MathML elements implement `ElementCSSInlineStyle`.
    pub fn has_inline_style(&self) -> bool {
        matches!(self, Self::Html | Self::Svg | Self::MathMl)
    }
}

/// `Node.nodeType` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
}

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    /// Create a detached node
    pub fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Node type
    pub fn node_type(&self) -> NodeType {
        match &self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Doctype { .. } => NodeType::DocumentType,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text node
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this node may have children
    pub(crate) fn is_parent_kind(&self) -> bool {
        matches!(self.data, NodeData::Document | NodeData::Element(_))
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    pub namespace: Namespace,
    pub prefix: Option<String>,
    pub local_name: String,
    /// Attributes in insertion order
    pub attrs: Vec<Attr>,
    /// Cached id attribute
    pub id: Option<String>,
    /// Cached class list, split from the `class` attribute
    pub classes: Vec<String>,
    /// Cached inline style, parsed from the `style` attribute
    pub style: Vec<Declaration>,
    /// `is` value from element creation options
    pub is_value: Option<String>,
}

impl ElementData {
    pub fn new(namespace: Namespace, prefix: Option<String>, local_name: &str) -> Self {
        Self {
            namespace,
            prefix,
            local_name: local_name.to_string(),
            attrs: Vec::new(),
            id: None,
            classes: Vec::new(),
            style: Vec::new(),
            is_value: None,
        }
    }

    /// Qualified name (`prefix:local` or `local`)
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// `Element.tagName`: upper-cased for HTML elements
    pub fn tag_name(&self) -> String {
        let name = self.qualified_name();
        if self.namespace == Namespace::Html {
            name.to_ascii_uppercase()
        } else {
            name
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists
    pub(crate) fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attrs.push(Attr {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Remove an attribute, returning its old value
    pub(crate) fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(index).value)
    }

    /// Check for a class token
    pub fn has_class(&self, token: &str) -> bool {
        self.classes.iter().any(|c| c == token)
    }
}

/// Attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_round_trip() {
        assert_eq!(Namespace::from_uri(Some(SVG_NAMESPACE)), Namespace::Svg);
        assert_eq!(Namespace::from_uri(None), Namespace::Null);
        assert_eq!(Namespace::Null.uri(), None);
        assert!(Namespace::Svg.has_inline_style());
        assert!(!Namespace::Other("urn:x".into()).has_inline_style());
    }

    #[test]
    fn test_tag_name_case() {
        let html = ElementData::new(Namespace::Html, None, "div");
        assert_eq!(html.tag_name(), "DIV");

        let svg = ElementData::new(Namespace::Svg, None, "foreignObject");
        assert_eq!(svg.tag_name(), "foreignObject");
    }

    #[test]
    fn test_set_attr_keeps_order() {
        let mut elem = ElementData::new(Namespace::Html, None, "a");
        elem.set_attr("href", "#");
        elem.set_attr("title", "x");
        elem.set_attr("href", "/home");

        assert_eq!(elem.attrs[0].name, "href");
        assert_eq!(elem.get_attr("href"), Some("/home"));
        assert_eq!(elem.remove_attr("title"), Some("x".to_string()));
        assert_eq!(elem.attrs.len(), 1);
    }
}
