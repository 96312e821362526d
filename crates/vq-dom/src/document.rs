//! Document handle
//!
//! A `Document` owns the node arena and the listener registry behind a
//! shared `Rc<RefCell<..>>`. Element and node handles keep a clone of it,
//! the way script-side wrappers keep their document alive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::element::{Element, NodeRef};
use crate::event::{self, Event, EventListener, EventTargetMap};
use crate::node::Namespace;
use crate::selector::SelectorList;
use crate::tree::{self, DomTree};
use crate::{DomError, DomResult, NodeId};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// `ElementCreationOptions` dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCreationOptions {
    /// Customized built-in element name
    pub is: Option<String>,
}

impl ElementCreationOptions {
    pub fn is(name: impl Into<String>) -> Self {
        Self {
            is: Some(name.into()),
        }
    }
}

pub(crate) struct DocumentInner {
    pub(crate) tree: DomTree,
    pub(crate) listeners: EventTargetMap,
    url: String,
}

/// Live handle counts per node
type Pins = RefCell<HashMap<NodeId, usize>>;

/// Shared document handle
#[derive(Clone)]
pub struct Document {
    pub(crate) inner: Rc<RefCell<DocumentInner>>,
    pins: Rc<Pins>,
}

/// Non-owning document handle.
///
/// Listeners are stored inside the document, so a listener that needs
/// the document holds one of these instead of a `Document` clone.
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<RefCell<DocumentInner>>,
    pins: Weak<Pins>,
}

impl WeakDocument {
    /// The document, if any strong handle is still alive
    pub fn upgrade(&self) -> Option<Document> {
        Some(Document {
            inner: self.inner.upgrade()?,
            pins: self.pins.upgrade()?,
        })
    }
}

impl fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDocument")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Document with no children
    pub fn new() -> Self {
        Self::with_url("about:blank")
    }

    /// Document with no children and the given URL
    pub fn with_url(url: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                tree: DomTree::new(),
                listeners: EventTargetMap::default(),
                url: url.to_string(),
            })),
            pins: Rc::default(),
        }
    }

    /// `<!DOCTYPE html><html><head></head><body></body></html>`
    pub fn html() -> Self {
        let doc = Self::new();
        let built = doc.with_tree_mut(|tree| -> DomResult<()> {
            let root = tree.root();
            let doctype = tree.create_doctype("html", "", "");
            let html = tree.create_html_element("html");
            let head = tree.create_html_element("head");
            let body = tree.create_html_element("body");
            tree.append_child(root, doctype)?;
            tree.append_child(root, html)?;
            tree.append_child(html, head)?;
            tree.append_child(html, body)?;
            Ok(())
        });
        if let Err(err) = built {
            tracing::warn!(%err, "failed to build html skeleton");
        }
        doc
    }

    pub fn url(&self) -> String {
        self.inner.borrow().url.clone()
    }

    /// Run `f` with shared access to the tree.
    ///
    /// `f` must not call back into this document's mutating methods.
    pub fn with_tree<R>(&self, f: impl FnOnce(&DomTree) -> R) -> R {
        f(&self.inner.borrow().tree)
    }

    /// Run `f` with exclusive access to the tree
    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut DomTree) -> R) -> R {
        f(&mut self.inner.borrow_mut().tree)
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
            pins: Rc::downgrade(&self.pins),
        }
    }

    pub(crate) fn pin(&self, node: NodeId) {
        *self.pins.borrow_mut().entry(node).or_default() += 1;
    }

    pub(crate) fn unpin(&self, node: NodeId) {
        let mut pins = self.pins.borrow_mut();
        if let Some(count) = pins.get_mut(&node) {
            *count -= 1;
            if *count == 0 {
                pins.remove(&node);
            }
        }
    }

    /// Number of live handles to `node`
    pub fn handle_count(&self, node: NodeId) -> usize {
        self.pins.borrow().get(&node).copied().unwrap_or(0)
    }

    /// Free detached subtrees that no handle points into, along with their
    /// listeners. Returns the number of freed nodes.
    ///
    /// Raw `NodeId`s into freed subtrees may be handed out again.
    pub fn reclaim_detached(&self) -> usize {
        let (count, listeners) = {
            let pins = self.pins.borrow();
            let mut inner = self.inner.borrow_mut();
            let inner = &mut *inner;
            let freed = inner.tree.reclaim_detached(|node| pins.contains_key(&node));
            let listeners: Vec<Vec<EventListener>> =
                freed.iter().map(|&node| inner.listeners.clear(node)).collect();
            (freed.len(), listeners)
        };
        // Closures can own handles, so they go only after the borrows end
        drop(listeners);

        if count > 0 {
            tracing::debug!(count, "reclaimed detached nodes");
        }
        count
    }

    /// Whether both handles share one document
    pub fn same(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Handle for any node of this document
    pub fn node(&self, id: NodeId) -> NodeRef {
        NodeRef::new(self.clone(), id)
    }

    /// Handle for `id` if it is an element of this document
    pub fn element(&self, id: NodeId) -> Option<Element> {
        let is_element = self.with_tree(|tree| tree.element(id).is_some());
        is_element.then(|| Element::new(self.clone(), id))
    }

    /// The document node itself
    pub fn root(&self) -> NodeRef {
        self.node(NodeId::ROOT)
    }

    /// `document.documentElement`
    pub fn document_element(&self) -> Option<Element> {
        let id = self.with_tree(|tree| tree.element_children(tree.root()).first().copied());
        id.and_then(|id| self.element(id))
    }

    /// `document.head`
    pub fn head(&self) -> Option<Element> {
        self.html_child("head")
    }

    /// `document.body`
    pub fn body(&self) -> Option<Element> {
        self.html_child("body")
    }

    fn html_child(&self, local_name: &str) -> Option<Element> {
        let html = self.document_element()?;
        let id = self.with_tree(|tree| {
            tree.element_children(html.node_id()).into_iter().find(|&c| {
                tree.element(c)
                    .is_some_and(|e| e.namespace == Namespace::Html && e.local_name == local_name)
            })
        });
        id.and_then(|id| self.element(id))
    }

    // =======================================================================
    // Factories
    // =======================================================================

    /// `document.createElement(localName, options)`
    pub fn create_element(&self, local_name: &str, options: Option<&ElementCreationOptions>) -> DomResult<Element> {
        tree::validate_element_name(local_name)?;
        let local_name = local_name.to_ascii_lowercase();
        let is_value = options.and_then(|o| o.is.clone());

        let id = self.with_tree_mut(|tree| {
            let id = tree.create_html_element(&local_name);
            if let Some(elem) = tree.element_mut(id) {
                elem.is_value = is_value;
            }
            id
        });
        Ok(Element::new(self.clone(), id))
    }

    /// `document.createElementNS(namespace, qualifiedName)`
    pub fn create_element_ns(&self, namespace: Option<&str>, qualified_name: &str) -> DomResult<Element> {
        let (prefix, local_name) = match qualified_name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, qualified_name),
        };
        if let Some(prefix) = prefix {
            tree::validate_element_name(prefix)?;
        }
        tree::validate_element_name(local_name)?;

        let namespace = namespace.filter(|ns| !ns.is_empty());
        let namespace_error = || DomError::Namespace(qualified_name.to_string());
        if prefix.is_some() && namespace.is_none() {
            return Err(namespace_error());
        }
        if prefix == Some("xml") && namespace != Some(XML_NAMESPACE) {
            return Err(namespace_error());
        }
        let xmlns_name = prefix == Some("xmlns") || qualified_name == "xmlns";
        if xmlns_name != (namespace == Some(XMLNS_NAMESPACE)) {
            return Err(namespace_error());
        }

        let id = self.with_tree_mut(|tree| {
            tree.create_element(
                Namespace::from_uri(namespace),
                prefix.map(str::to_string),
                local_name,
            )
        });
        Ok(Element::new(self.clone(), id))
    }

    /// `document.createTextNode(data)`
    pub fn create_text_node(&self, data: &str) -> NodeRef {
        let id = self.with_tree_mut(|tree| tree.create_text(data));
        self.node(id)
    }

    /// `document.createComment(data)`
    pub fn create_comment(&self, data: &str) -> NodeRef {
        let id = self.with_tree_mut(|tree| tree.create_comment(data));
        self.node(id)
    }

    // =======================================================================
    // Queries
    // =======================================================================

    /// `document.getElementById(id)`
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        let found = self.with_tree(|tree| tree.find_element_by_id(tree.root(), id));
        found.and_then(|id| self.element(id))
    }

    /// `document.querySelector(selectors)`
    pub fn query_selector(&self, selectors: &str) -> DomResult<Option<Element>> {
        self.query_first_in(NodeId::ROOT, selectors)
    }

    /// `document.querySelectorAll(selectors)`
    pub fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<Element>> {
        self.query_all_in(NodeId::ROOT, selectors)
    }

    pub(crate) fn query_first_in(&self, root: NodeId, selectors: &str) -> DomResult<Option<Element>> {
        let list = SelectorList::parse(selectors)?;
        let found = self.with_tree(|tree| list.query_first(tree, root));
        Ok(found.and_then(|id| self.element(id)))
    }

    pub(crate) fn query_all_in(&self, root: NodeId, selectors: &str) -> DomResult<Vec<Element>> {
        let list = SelectorList::parse(selectors)?;
        let found = self.with_tree(|tree| list.query_all(tree, root));
        tracing::trace!(selectors, matches = found.len(), "query_selector_all");
        Ok(found.into_iter().filter_map(|id| self.element(id)).collect())
    }

    // =======================================================================
    // Events
    // =======================================================================

    /// Dispatch `event` at `target`. Returns false if the default was prevented.
    pub fn dispatch_event(&self, target: NodeId, event: &mut Event) -> bool {
        event::dispatch(self, target, event)
    }

    /// Number of listeners registered on `node`
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner.borrow().listeners.count(node)
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Document")
            .field("url", &inner.url)
            .field("nodes", &inner.tree.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ListenerOptions;

    #[test]
    fn test_html_skeleton() {
        let doc = Document::html();
        assert_eq!(doc.document_element().unwrap().local_name(), "html");
        assert_eq!(doc.head().unwrap().local_name(), "head");
        assert_eq!(doc.body().unwrap().local_name(), "body");
    }

    #[test]
    fn test_weak_handle_does_not_keep_document_alive() {
        let doc = Document::html();
        let weak = doc.downgrade();
        assert!(weak.upgrade().unwrap().same(&doc));

        let body = doc.body().unwrap();
        let held = weak.clone();
        body.add_event_listener(
            "click",
            EventListener::new(move |_| {
                let _ = held.upgrade();
            }),
            ListenerOptions::default(),
        );

        drop(body);
        drop(doc);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_reclaim_spares_pinned_nodes() {
        let doc = Document::html();
        let body = doc.body().unwrap();
        let kept = doc.create_element("p", None).unwrap();
        body.append_child(&kept).unwrap();
        let size = doc.with_tree(|tree| tree.len());

        let dropped_id = {
            let div = doc.create_element("div", None).unwrap();
            div.set_text_content("gone");
            div.add_event_listener("click", EventListener::new(|_| {}), ListenerOptions::default());
            div.node_id()
        };
        kept.remove();
        assert_eq!(doc.handle_count(kept.node_id()), 1);
        assert_eq!(doc.handle_count(dropped_id), 0);

        assert_eq!(doc.reclaim_detached(), 2);
        assert_eq!(doc.listener_count(dropped_id), 0);
        assert_eq!(doc.with_tree(|tree| tree.len()), size);
        assert_eq!(kept.local_name(), "p");
        assert!(kept.parent_node().is_none());

        body.append_child(&kept).unwrap();
        assert_eq!(body.children().len(), 1);
    }

    #[test]
    fn test_create_element_lowercases() {
        let doc = Document::html();
        let el = doc.create_element("DIV", None).unwrap();
        assert_eq!(el.local_name(), "div");
        assert_eq!(el.tag_name(), "DIV");
        assert_eq!(el.namespace_uri().as_deref(), Some(crate::HTML_NAMESPACE));
    }

    #[test]
    fn test_create_element_is_option() {
        let doc = Document::html();
        let el = doc
            .create_element("button", Some(&ElementCreationOptions::is("fancy-button")))
            .unwrap();
        assert_eq!(el.is_value().as_deref(), Some("fancy-button"));
    }

    #[test]
    fn test_create_element_invalid_name() {
        let doc = Document::html();
        assert!(matches!(
            doc.create_element("", None),
            Err(DomError::InvalidCharacter(_))
        ));
        assert!(matches!(
            doc.create_element("1div", None),
            Err(DomError::InvalidCharacter(_))
        ));
        assert!(matches!(
            doc.create_element("a b", None),
            Err(DomError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_create_element_ns() {
        let doc = Document::html();
        let svg = doc
            .create_element_ns(Some(crate::SVG_NAMESPACE), "svg:foreignObject")
            .unwrap();
        assert_eq!(svg.local_name(), "foreignObject");
        assert_eq!(svg.tag_name(), "svg:foreignObject");

        assert!(matches!(
            doc.create_element_ns(None, "svg:rect"),
            Err(DomError::Namespace(_))
        ));
        assert!(matches!(
            doc.create_element_ns(Some(crate::SVG_NAMESPACE), "xmlns"),
            Err(DomError::Namespace(_))
        ));
    }

    #[test]
    fn test_get_element_by_id_first_in_tree_order() {
        let doc = Document::html();
        let body = doc.body().unwrap();
        let a = doc.create_element("p", None).unwrap();
        let b = doc.create_element("p", None).unwrap();
        a.set_attribute("id", "dup").unwrap();
        b.set_attribute("id", "dup").unwrap();
        body.append_child(&b).unwrap();
        body.insert_before(&a, Some(b.as_node())).unwrap();

        assert_eq!(doc.get_element_by_id("dup"), Some(a));
        assert_eq!(doc.get_element_by_id("missing"), None);
    }

    #[test]
    fn test_detached_elements_are_not_found() {
        let doc = Document::html();
        let el = doc.create_element("p", None).unwrap();
        el.set_attribute("id", "loose").unwrap();

        assert!(doc.get_element_by_id("loose").is_none());
        assert!(doc.query_selector("#loose").unwrap().is_none());
    }
}
