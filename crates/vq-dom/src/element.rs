//! Node and element handles
//!
//! Handles are cheap clones of `(Document, NodeId)`. Every accessor
//! borrows the document for the duration of the call only, so handles can
//! be held across event dispatch and tree mutation.

use std::fmt;
use std::ops::Deref;

use crate::classlist::DomTokenList;
use crate::document::Document;
use crate::event::{Event, EventListener, ListenerOptions};
use crate::node::{ElementData, Namespace, NodeData, NodeType};
use crate::selector::SelectorList;
use crate::style;
use crate::tree;
use crate::{DomError, DomResult, NodeId};

// ===========================================================================
// NodeRef
// ===========================================================================

/// Handle to any node.
///
/// A live handle pins its node: [`Document::reclaim_detached`] never
/// frees a subtree that some handle still points into.
pub struct NodeRef {
    document: Document,
    id: NodeId,
}

impl NodeRef {
    pub(crate) fn new(document: Document, id: NodeId) -> Self {
        document.pin(id);
        Self { document, id }
    }

    /// Owner document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Arena id of this node
    pub fn node_id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> Option<NodeType> {
        self.document.with_tree(|tree| tree.get(self.id).map(|n| n.node_type()))
    }

    /// `Node.nodeName`
    pub fn node_name(&self) -> String {
        self.document.with_tree(|tree| match tree.get(self.id).map(|n| &n.data) {
            Some(NodeData::Element(e)) => e.tag_name(),
            Some(NodeData::Text(_)) => "#text".to_string(),
            Some(NodeData::Comment(_)) => "#comment".to_string(),
            Some(NodeData::Document) => "#document".to_string(),
            Some(NodeData::Doctype { name, .. }) => name.clone(),
            None => String::new(),
        })
    }

    /// Element handle, if this node is an element
    pub fn as_element(&self) -> Option<Element> {
        self.document.element(self.id)
    }

    pub fn parent_node(&self) -> Option<NodeRef> {
        let parent = self.document.with_tree(|tree| tree.parent(self.id));
        parent.map(|p| self.document.node(p))
    }

    pub fn parent_element(&self) -> Option<Element> {
        let parent = self.document.with_tree(|tree| tree.parent_element(self.id));
        parent.and_then(|p| self.document.element(p))
    }

    pub fn child_nodes(&self) -> Vec<NodeRef> {
        let children: Vec<NodeId> = self
            .document
            .with_tree(|tree| tree.children(self.id).map(|(c, _)| c).collect());
        children.into_iter().map(|c| self.document.node(c)).collect()
    }

    /// Whether the node is attached to its document
    pub fn is_connected(&self) -> bool {
        self.id == NodeId::ROOT
            || self
                .document
                .with_tree(|tree| tree.ancestors(self.id).last() == Some(&NodeId::ROOT))
    }

    /// `Node.contains`: inclusive descendant check
    pub fn contains(&self, other: &NodeRef) -> bool {
        self.document.same(&other.document)
            && self
                .document
                .with_tree(|tree| tree.is_inclusive_ancestor(self.id, other.id))
    }

    /// `Node.textContent` getter
    pub fn text_content(&self) -> Option<String> {
        self.document.with_tree(|tree| tree.text_content(self.id))
    }

    /// `Node.textContent` setter
    pub fn set_text_content(&self, text: &str) {
        self.document
            .with_tree_mut(|tree| tree.set_text_content(self.id, text));
        self.document.reclaim_detached();
    }

    pub fn append_child(&self, child: &NodeRef) -> DomResult<NodeRef> {
        self.insert_before(child, None)
    }

    pub fn insert_before(&self, child: &NodeRef, reference: Option<&NodeRef>) -> DomResult<NodeRef> {
        self.ensure_same_document(child)?;
        if let Some(reference) = reference {
            self.ensure_same_document(reference)?;
        }
        self.document
            .with_tree_mut(|tree| tree.insert_before(self.id, child.id, reference.map(|r| r.id)))?;
        Ok(child.clone())
    }

    pub fn remove_child(&self, child: &NodeRef) -> DomResult<NodeRef> {
        self.ensure_same_document(child)?;
        self.document
            .with_tree_mut(|tree| tree.remove_child(self.id, child.id))?;
        Ok(child.clone())
    }

    /// `ChildNode.remove`
    pub fn remove(&self) {
        self.document.with_tree_mut(|tree| tree.detach(self.id));
    }

    /// `EventTarget.addEventListener`
    pub fn add_event_listener(&self, kind: &str, listener: EventListener, options: impl Into<ListenerOptions>) {
        let options = options.into();
        let added = self
            .document
            .inner
            .borrow_mut()
            .listeners
            .add(self.id, kind, listener, options);
        tracing::trace!(node = ?self.id, kind, ?options, added, "add_event_listener");
    }

    /// `EventTarget.removeEventListener`. Only `capture` is used for matching.
    pub fn remove_event_listener(&self, kind: &str, listener: &EventListener, options: impl Into<ListenerOptions>) {
        let capture = options.into().capture;
        let removed = self
            .document
            .inner
            .borrow_mut()
            .listeners
            .remove(self.id, kind, listener, capture);
        tracing::trace!(node = ?self.id, kind, capture, removed, "remove_event_listener");
    }

    /// `EventTarget.dispatchEvent`
    pub fn dispatch_event(&self, event: &mut Event) -> bool {
        self.document.dispatch_event(self.id, event)
    }

    fn ensure_same_document(&self, other: &NodeRef) -> DomResult<()> {
        if self.document.same(&other.document) {
            Ok(())
        } else {
            Err(DomError::WrongDocument)
        }
    }
}

impl Clone for NodeRef {
    fn clone(&self) -> Self {
        Self::new(self.document.clone(), self.id)
    }
}

impl Drop for NodeRef {
    fn drop(&mut self) {
        self.document.unpin(self.id);
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.document.same(&other.document)
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.id).finish()
    }
}

// ===========================================================================
// Element
// ===========================================================================

/// Handle to an element. Dereferences to its [`NodeRef`].
#[derive(Clone, PartialEq, Eq)]
pub struct Element {
    node: NodeRef,
}

impl Deref for Element {
    type Target = NodeRef;

    fn deref(&self) -> &NodeRef {
        &self.node
    }
}

/// Argument of `ParentNode.append` / `prepend`
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOrString {
    Node(NodeRef),
    Text(String),
}

impl From<NodeRef> for NodeOrString {
    fn from(node: NodeRef) -> Self {
        Self::Node(node)
    }
}

impl From<Element> for NodeOrString {
    fn from(element: Element) -> Self {
        Self::Node(element.node)
    }
}

impl From<&Element> for NodeOrString {
    fn from(element: &Element) -> Self {
        Self::Node(element.node.clone())
    }
}

impl From<&str> for NodeOrString {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for NodeOrString {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl Element {
    pub(crate) fn new(document: Document, id: NodeId) -> Self {
        Self {
            node: NodeRef::new(document, id),
        }
    }

    pub fn as_node(&self) -> &NodeRef {
        &self.node
    }

    pub fn into_node(self) -> NodeRef {
        self.node
    }

    fn read<R: Default>(&self, f: impl FnOnce(&ElementData) -> R) -> R {
        self.document()
            .with_tree(|tree| tree.element(self.node_id()).map(f).unwrap_or_default())
    }

    fn is_html(&self) -> bool {
        self.read(|e| e.namespace == Namespace::Html)
    }

    pub fn local_name(&self) -> String {
        self.read(|e| e.local_name.clone())
    }

    /// `Element.tagName`
    pub fn tag_name(&self) -> String {
        self.read(ElementData::tag_name)
    }

    pub fn namespace_uri(&self) -> Option<String> {
        self.read(|e| e.namespace.uri().map(str::to_string))
    }

    pub fn prefix(&self) -> Option<String> {
        self.read(|e| e.prefix.clone())
    }

    /// `is` value given at creation
    pub fn is_value(&self) -> Option<String> {
        self.read(|e| e.is_value.clone())
    }

    /// `Element.id`
    pub fn id(&self) -> String {
        self.read(|e| e.id.clone().unwrap_or_default())
    }

    pub fn set_id(&self, id: &str) -> DomResult<()> {
        self.set_attribute("id", id)
    }

    /// `Element.className`
    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    pub fn set_class_name(&self, value: &str) -> DomResult<()> {
        self.set_attribute("class", value)
    }

    // =======================================================================
    // Attributes
    // =======================================================================

    /// HTML elements match attribute names case-insensitively
    fn normalize_name(&self, name: &str) -> String {
        if self.is_html() {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let name = self.normalize_name(name);
        self.read(|e| e.get_attr(&name).map(str::to_string))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn get_attribute_names(&self) -> Vec<String> {
        self.read(|e| e.attrs.iter().map(|a| a.name.clone()).collect())
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> DomResult<()> {
        let name = self.normalize_name(name);
        self.document()
            .with_tree_mut(|tree| tree.set_attribute(self.node_id(), &name, value))
    }

    /// `Element.setAttributeNS`. The name is taken verbatim.
    pub fn set_attribute_ns(&self, namespace: Option<&str>, qualified_name: &str, value: &str) -> DomResult<()> {
        tree::validate_name(qualified_name)?;
        let namespace = namespace.filter(|ns| !ns.is_empty());
        if qualified_name.contains(':') && namespace.is_none() {
            return Err(DomError::Namespace(qualified_name.to_string()));
        }
        self.document()
            .with_tree_mut(|tree| tree.set_attribute(self.node_id(), qualified_name, value))
    }

    pub fn remove_attribute(&self, name: &str) {
        let name = self.normalize_name(name);
        self.document()
            .with_tree_mut(|tree| tree.remove_attribute(self.node_id(), &name));
    }

    /// `Element.classList`
    pub fn class_list(&self) -> ClassList {
        ClassList {
            element: self.clone(),
        }
    }

    /// `Element.style`. `None` for elements outside the HTML, SVG and
    /// MathML namespaces, which have no inline style object.
    pub fn style(&self) -> Option<StyleDeclaration> {
        self.read(|e| e.namespace.has_inline_style())
            .then(|| StyleDeclaration {
                element: self.clone(),
            })
    }

    // =======================================================================
    // Tree
    // =======================================================================

    /// Element children
    pub fn children(&self) -> Vec<Element> {
        let ids = self
            .document()
            .with_tree(|tree| tree.element_children(self.node_id()));
        ids.into_iter()
            .filter_map(|id| self.document().element(id))
            .collect()
    }

    /// `ParentNode.append`
    pub fn append<I>(&self, nodes: I) -> DomResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NodeOrString>,
    {
        self.insert_nodes(nodes, false)
    }

    /// `ParentNode.prepend`
    pub fn prepend<I>(&self, nodes: I) -> DomResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NodeOrString>,
    {
        self.insert_nodes(nodes, true)
    }

    fn insert_nodes<I>(&self, nodes: I, prepend: bool) -> DomResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NodeOrString>,
    {
        let document = self.document().clone();
        let parent = self.node_id();

        let mut ids = Vec::new();
        for node in nodes {
            match node.into() {
                NodeOrString::Node(node) => {
                    if !document.same(node.document()) {
                        return Err(DomError::WrongDocument);
                    }
                    ids.push(node.node_id());
                }
                NodeOrString::Text(text) => ids.push(document.create_text_node(&text).node_id()),
            }
        }

        document.with_tree_mut(|tree| {
            // Validate everything before moving anything
            for &id in &ids {
                tree.ensure_pre_insert_validity(parent, id, None)?;
            }
            for &id in &ids {
                tree.detach(id);
            }

            // Reference child is read after the new nodes left their old parents
            let reference = if prepend {
                tree.get(parent)
                    .map(|n| n.first_child)
                    .filter(|c| c.is_valid())
            } else {
                None
            };
            for &id in &ids {
                tree.insert_before(parent, id, reference)?;
            }
            Ok(())
        })
    }

    // =======================================================================
    // Selectors
    // =======================================================================

    /// First matching descendant
    pub fn query_selector(&self, selectors: &str) -> DomResult<Option<Element>> {
        self.document().query_first_in(self.node_id(), selectors)
    }

    /// All matching descendants in tree order
    pub fn query_selector_all(&self, selectors: &str) -> DomResult<Vec<Element>> {
        self.document().query_all_in(self.node_id(), selectors)
    }

    /// `Element.matches`
    pub fn matches(&self, selectors: &str) -> DomResult<bool> {
        let list = SelectorList::parse(selectors)?;
        Ok(self.document().with_tree(|tree| {
            list.matches_in_scope(tree, self.node_id(), Some(self.node_id()))
        }))
    }

    /// `Element.closest`
    pub fn closest(&self, selectors: &str) -> DomResult<Option<Element>> {
        let list = SelectorList::parse(selectors)?;
        let found = self.document().with_tree(|tree| {
            std::iter::once(self.node_id())
                .chain(tree.ancestors(self.node_id()))
                .find(|&n| list.matches_in_scope(tree, n, Some(self.node_id())))
        });
        Ok(found.and_then(|id| self.document().element(id)))
    }

    // =======================================================================
    // Activation
    // =======================================================================

    /// `HTMLElement.click`: fire a bubbling, cancelable `click`.
    ///
    /// Disabled form controls ignore the call.
    pub fn click(&self) -> DomResult<()> {
        if !self.is_html() {
            return Err(DomError::NotSupported("click() is only defined on HTML elements"));
        }
        let disabled = self.read(|e| {
            matches!(e.local_name.as_str(), "button" | "input" | "select" | "textarea")
                && e.get_attr("disabled").is_some()
        });
        if disabled {
            tracing::debug!(node = ?self.node_id(), "click on disabled control ignored");
            return Ok(());
        }

        let mut event = Event::new("click", true, true);
        self.dispatch_event(&mut event);
        Ok(())
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .document()
            .inner
            .try_borrow()
            .ok()
            .and_then(|inner| inner.tree.element(self.node_id()).map(|e| e.qualified_name()));
        f.debug_struct("Element")
            .field("id", &self.node_id())
            .field("name", &name)
            .finish()
    }
}

// ===========================================================================
// ClassList
// ===========================================================================

/// Live `Element.classList`
#[derive(Debug, Clone)]
pub struct ClassList {
    element: Element,
}

impl ClassList {
    fn snapshot(&self) -> DomTokenList {
        self.element
            .document()
            .with_tree(|tree| tree.class_list(self.element.node_id()))
    }

    fn update<R>(&self, f: impl FnOnce(&mut DomTokenList) -> DomResult<R>) -> DomResult<R> {
        let mut list = self.snapshot();
        let result = f(&mut list)?;
        self.element
            .document()
            .with_tree_mut(|tree| tree.set_class_list(self.element.node_id(), list));
        Ok(result)
    }

    pub fn length(&self) -> usize {
        self.snapshot().length()
    }

    pub fn item(&self, index: usize) -> Option<String> {
        self.snapshot().item(index).map(str::to_string)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.snapshot().contains(token)
    }

    pub fn value(&self) -> String {
        self.snapshot().value()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.snapshot().iter().map(str::to_string).collect()
    }

    pub fn add(&self, tokens: &[&str]) -> DomResult<()> {
        self.update(|list| list.add(tokens))
    }

    pub fn remove(&self, tokens: &[&str]) -> DomResult<()> {
        self.update(|list| list.remove(tokens))
    }

    /// Returns whether the token is present afterwards
    pub fn toggle(&self, token: &str, force: Option<bool>) -> DomResult<bool> {
        self.update(|list| list.toggle(token, force))
    }

    pub fn replace(&self, old_token: &str, new_token: &str) -> DomResult<bool> {
        self.update(|list| list.replace(old_token, new_token))
    }
}

// ===========================================================================
// StyleDeclaration
// ===========================================================================

/// Live `Element.style`
#[derive(Debug, Clone)]
pub struct StyleDeclaration {
    element: Element,
}

impl StyleDeclaration {
    /// `CSSStyleDeclaration.getPropertyValue` (CSS property name)
    pub fn get_property_value(&self, name: &str) -> String {
        let name = css_name(name);
        self.element.document().with_tree(|tree| {
            tree.style_declarations(self.element.node_id())
                .iter()
                .find(|d| d.name == name)
                .map(|d| d.value.clone())
                .unwrap_or_default()
        })
    }

    /// `"important"` or empty
    pub fn get_property_priority(&self, name: &str) -> String {
        let name = css_name(name);
        let important = self.element.document().with_tree(|tree| {
            tree.style_declarations(self.element.node_id())
                .iter()
                .any(|d| d.name == name && d.important)
        });
        if important { "important".to_string() } else { String::new() }
    }

    /// `CSSStyleDeclaration.setProperty`. An empty value removes the
    /// property. An unknown priority or a value that does not fit in one
    /// declaration leaves the declaration untouched.
    pub fn set_property(&self, name: &str, value: &str, priority: &str) {
        let important = match priority.to_ascii_lowercase().as_str() {
            "" => false,
            "important" => true,
            _ => return,
        };
        let name = css_name(name);
        if !style::is_valid_value(value) {
            tracing::debug!(property = %name, value, "rejected style value");
            return;
        }
        self.element.document().with_tree_mut(|tree| {
            tree.set_style_declaration(self.element.node_id(), &name, value, important)
        });
    }

    /// `CSSStyleDeclaration.removeProperty`, returning the old value
    pub fn remove_property(&self, name: &str) -> String {
        let name = css_name(name);
        self.element
            .document()
            .with_tree_mut(|tree| tree.remove_style_declaration(self.element.node_id(), &name))
            .unwrap_or_default()
    }

    /// Property assignment (`style.textDecoration = value`)
    pub fn set(&self, property: &str, value: &str) {
        self.set_property(&style::property_name(property), value, "");
    }

    /// Property read (`style.textDecoration`)
    pub fn get(&self, property: &str) -> String {
        self.get_property_value(&style::property_name(property))
    }

    /// `CSSStyleDeclaration.cssText`
    pub fn css_text(&self) -> String {
        self.element.document().with_tree(|tree| {
            style::serialize_declarations(tree.style_declarations(self.element.node_id()))
        })
    }

    pub fn set_css_text(&self, text: &str) -> DomResult<()> {
        self.element.set_attribute("style", text)
    }

    pub fn length(&self) -> usize {
        self.element
            .document()
            .with_tree(|tree| tree.style_declarations(self.element.node_id()).len())
    }

    pub fn item(&self, index: usize) -> Option<String> {
        self.element.document().with_tree(|tree| {
            tree.style_declarations(self.element.node_id())
                .get(index)
                .map(|d| d.name.clone())
        })
    }
}

/// CSS property names are ASCII case-insensitive, custom properties are not
fn css_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}
