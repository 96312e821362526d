//! Host DOM traits
//!
//! The wrappers never touch a concrete DOM. Everything they do goes
//! through these two traits, one call per wrapper operation, so the same
//! wrapper code drives the in-memory `vq_dom` document and (with the `web`
//! feature) the browser document.

use std::fmt::Debug;

use serde_json::Value;

pub use vq_dom::{ElementCreationOptions, ListenerOptions};

/// SVG namespace used by `create_svg`
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Error type of a host element
pub type HostError<E> = <E as HostElement>::Error;

/// One argument of `append` / `prepend`, resolved to the host's terms
#[derive(Debug, Clone, PartialEq)]
pub enum Insert<N> {
    Node(N),
    Text(String),
}

/// A host element handle.
///
/// Handles are cheap to clone and refer to the same underlying element.
pub trait HostElement: Clone + Debug {
    /// Node handle accepted by `append` / `prepend`
    type Node: Clone;
    /// Event listener handle, removable by identity
    type Listener;
    /// Fault raised by the host
    type Error: Debug;

    /// This element as a node
    fn as_node(&self) -> Self::Node;

    /// `textContent` (never null for elements)
    fn text_content(&self) -> String;

    fn set_text_content(&self, text: &str);

    /// `innerHTML`
    fn inner_html(&self) -> String;

    fn set_inner_html(&self, markup: &str) -> Result<(), Self::Error>;

    /// `setAttributeNS(namespace, name, value)`
    fn set_attribute_ns(&self, namespace: Option<&str>, name: &str, value: &str) -> Result<(), Self::Error>;

    /// Whether the element exposes an inline `style` object
    fn has_style(&self) -> bool;

    /// Property assignment on the inline style (`el.style[property] = value`)
    fn set_style(&self, property: &str, value: &Value) -> Result<(), Self::Error>;

    fn add_event_listener(&self, kind: &str, listener: &Self::Listener, options: ListenerOptions) -> Result<(), Self::Error>;

    fn remove_event_listener(&self, kind: &str, listener: &Self::Listener, options: ListenerOptions) -> Result<(), Self::Error>;

    /// `HTMLElement.click()`
    fn click(&self) -> Result<(), Self::Error>;

    /// `ParentNode.append(...nodes)`
    fn append(&self, nodes: Vec<Insert<Self::Node>>) -> Result<(), Self::Error>;

    /// `ParentNode.prepend(...nodes)`
    fn prepend(&self, nodes: Vec<Insert<Self::Node>>) -> Result<(), Self::Error>;

    /// `classList.add(...tokens)`
    fn add_class(&self, tokens: &[&str]) -> Result<(), Self::Error>;

    /// `classList.remove(...tokens)`
    fn remove_class(&self, tokens: &[&str]) -> Result<(), Self::Error>;

    /// `classList.toggle(token, force)`
    fn toggle_class(&self, token: &str, force: Option<bool>) -> Result<bool, Self::Error>;

    /// `classList.contains(token)`
    fn has_class(&self, token: &str) -> bool;
}

/// A host document handle
pub trait HostDocument: Clone {
    type Element: HostElement;

    /// `querySelector` on `scope`, or on the document when `None`
    fn query_selector(
        &self,
        scope: Option<&Self::Element>,
        selectors: &str,
    ) -> Result<Option<Self::Element>, HostError<Self::Element>>;

    /// `querySelectorAll` on `scope`, or on the document when `None`
    fn query_selector_all(
        &self,
        scope: Option<&Self::Element>,
        selectors: &str,
    ) -> Result<Vec<Self::Element>, HostError<Self::Element>>;

    /// `getElementById`
    fn get_element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// `createElement(tag, options)`
    fn create_element(
        &self,
        tag: &str,
        options: Option<&ElementCreationOptions>,
    ) -> Result<Self::Element, HostError<Self::Element>>;

    /// `createElementNS(namespace, qualifiedName)`
    fn create_element_ns(
        &self,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Result<Self::Element, HostError<Self::Element>>;
}
