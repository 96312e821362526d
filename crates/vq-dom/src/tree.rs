//! DOM Tree (arena-based allocation)
//!
//! Detaching only rewrites links. Detached subtrees stay addressable until
//! [`DomTree::reclaim_detached`] frees them, after which their slots are
//! reused by new nodes.

use crate::classlist::DomTokenList;
use crate::node::{ElementData, Namespace, Node, NodeData};
use crate::style::{self, Declaration};
use crate::{DomError, DomResult, NodeId};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    live: Vec<bool>,
    free: Vec<NodeId>,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            live: vec![true],
            free: Vec::new(),
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).filter(|_| self.is_live(id))
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !self.is_live(id) {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.live.get(id.index()).copied().unwrap_or(false)
    }

    /// Number of live nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Always false: the document node is allocated up front
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            self.live[id.index()] = true;
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        self.live.push(true);
        id
    }

    /// Free every detached subtree that contains no pinned node.
    ///
    /// Returns the freed ids. Their slots are handed out again by the
    /// `create_*` methods.
    pub fn reclaim_detached(&mut self, pinned: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
        let roots: Vec<NodeId> = (1..self.nodes.len())
            .map(|i| NodeId(i as u32))
            .filter(|&id| self.get(id).is_some_and(|n| !n.parent.is_valid()))
            .collect();

        let mut freed = Vec::new();
        for root in roots {
            let mut subtree = self.descendants(root);
            subtree.push(root);
            if subtree.iter().any(|&id| pinned(id)) {
                continue;
            }
            for id in subtree {
                self.nodes[id.index()] = Node::new(NodeData::Comment(String::new()));
                self.live[id.index()] = false;
                self.free.push(id);
                freed.push(id);
            }
        }
        freed
    }

    // =======================================================================
    // Node creation
    // =======================================================================

    /// Create a detached element
    pub fn create_element(&mut self, namespace: Namespace, prefix: Option<String>, local_name: &str) -> NodeId {
        let id = self.push(Node::new(NodeData::Element(ElementData::new(
            namespace, prefix, local_name,
        ))));
        tracing::trace!(?id, local_name, "created element");
        id
    }

    /// Create a detached HTML element
    pub fn create_html_element(&mut self, local_name: &str) -> NodeId {
        self.create_element(Namespace::Html, None, local_name)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.push(Node::new(NodeData::Text(data.to_string())))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.push(Node::new(NodeData::Comment(data.to_string())))
    }

    /// Create a detached DOCTYPE
    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(Node::new(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    // =======================================================================
    // Navigation
    // =======================================================================

    /// Element data of `id`, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    /// Parent node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Parent, if it is an element
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.element(p).is_some())
    }

    /// Iterate over the children of `id`
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Element children of `id`
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }

    /// Closest preceding element sibling
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.get(id)?.prev_sibling;
        while cur.is_valid() {
            let node = self.get(cur)?;
            if node.is_element() {
                return Some(cur);
            }
            cur = node.prev_sibling;
        }
        None
    }

    /// Closest following element sibling
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.get(id)?.next_sibling;
        while cur.is_valid() {
            let node = self.get(cur)?;
            if node.is_element() {
                return Some(cur);
            }
            cur = node.next_sibling;
        }
        None
    }

    /// Ancestors of `id`, parent first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    /// Descendants of `id` in tree order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        stack.reverse();
        while let Some(node) = stack.pop() {
            out.push(node);
            let before = stack.len();
            stack.extend(self.children(node).map(|(c, _)| c));
            stack[before..].reverse();
        }
        out
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).contains(&ancestor)
    }

    // =======================================================================
    // Mutation
    // =======================================================================

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<NodeId> {
        self.ensure_pre_insert_validity(parent, child, reference)?;

        // Inserting a node before itself means "before its next sibling"
        let mut reference = reference.unwrap_or(NodeId::NONE);
        if reference == child {
            reference = self.nodes[child.index()].next_sibling;
        }

        self.detach(child);
        self.link_before(parent, child, reference);
        tracing::trace!(?parent, ?child, "inserted node");
        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound("node to remove is not a child"));
        }
        self.detach(child);
        Ok(child)
    }

    /// Unlink `node` from its parent (no-op when already detached)
    pub fn detach(&mut self, node: NodeId) {
        let Some(n) = self.get(node) else {
            return;
        };
        let (parent, prev, next) = (n.parent, n.prev_sibling, n.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let n = &mut self.nodes[node.index()];
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
    }

    /// Replace all children of `parent` with `children`, in order
    pub fn replace_children(&mut self, parent: NodeId, children: &[NodeId]) -> DomResult<()> {
        for &child in children {
            self.ensure_pre_insert_validity(parent, child, None)?;
        }
        for child in self.children(parent).map(|(c, _)| c).collect::<Vec<_>>() {
            self.detach(child);
        }
        for &child in children {
            self.detach(child);
            self.link_before(parent, child, NodeId::NONE);
        }
        Ok(())
    }

    pub(crate) fn ensure_pre_insert_validity(&self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> DomResult<()> {
        let parent_node = self
            .get(parent)
            .ok_or(DomError::NotFound("parent node does not exist"))?;
        if !parent_node.is_parent_kind() {
            return Err(DomError::HierarchyRequest("parent cannot have children"));
        }

        let child_node = self
            .get(child)
            .ok_or(DomError::NotFound("node to insert does not exist"))?;
        match child_node.data {
            NodeData::Document => {
                return Err(DomError::HierarchyRequest("a document cannot be inserted"));
            }
            NodeData::Text(_) if matches!(parent_node.data, NodeData::Document) => {
                return Err(DomError::HierarchyRequest("text cannot be a child of the document"));
            }
            NodeData::Doctype { .. } if !matches!(parent_node.data, NodeData::Document) => {
                return Err(DomError::HierarchyRequest("doctype must be a child of the document"));
            }
            _ => {}
        }

        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest("the new child is an ancestor of the parent"));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotFound("reference node is not a child of the parent"));
            }
        }
        Ok(())
    }

    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let prev = if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling
        } else {
            self.nodes[parent.index()].last_child
        };

        {
            let n = &mut self.nodes[child.index()];
            n.parent = parent;
            n.prev_sibling = prev;
            n.next_sibling = reference;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if reference.is_valid() {
            self.nodes[reference.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }
    }

    // =======================================================================
    // Text
    // =======================================================================

    /// `Node.textContent`: `None` for documents and doctypes
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        match &self.get(id)?.data {
            NodeData::Document | NodeData::Doctype { .. } => None,
            NodeData::Text(data) | NodeData::Comment(data) => Some(data.clone()),
            NodeData::Element(_) => Some(
                self.descendants(id)
                    .into_iter()
                    .filter_map(|d| self.get(d).and_then(Node::as_text))
                    .collect(),
            ),
        }
    }

    /// Set `Node.textContent`: replaces all children of an element with a
    /// single text node (none when `text` is empty)
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        let is_element = match self.get_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text(data) | NodeData::Comment(data)) => {
                *data = text.to_string();
                false
            }
            Some(NodeData::Element(_)) => true,
            _ => false,
        };
        if !is_element {
            return;
        }

        for child in self.children(id).map(|(c, _)| c).collect::<Vec<_>>() {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.link_before(id, text_node, NodeId::NONE);
        }
    }

    // =======================================================================
    // Attributes
    // =======================================================================

    /// Attribute value by exact name
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(name)
    }

    /// Set an attribute by exact name, refreshing the id/class/style caches
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        validate_name(name)?;
        let elem = self
            .element_mut(id)
            .ok_or(DomError::NotSupported("attributes exist only on elements"))?;

        elem.set_attr(name, value);
        match name {
            "id" => elem.id = Some(value.to_string()),
            "class" => elem.classes = DomTokenList::from_string(value).into_tokens(),
            "style" => elem.style = style::parse_declarations(value),
            _ => {}
        }
        Ok(())
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let elem = self.element_mut(id)?;
        let old = elem.remove_attr(name)?;
        match name {
            "id" => elem.id = None,
            "class" => elem.classes.clear(),
            "style" => elem.style.clear(),
            _ => {}
        }
        Some(old)
    }

    /// Snapshot of an element's class list
    pub fn class_list(&self, id: NodeId) -> DomTokenList {
        self.element(id)
            .map(|e| DomTokenList::from_tokens(e.classes.clone()))
            .unwrap_or_default()
    }

    /// Store a class list and run the DOMTokenList update steps
    pub fn set_class_list(&mut self, id: NodeId, list: DomTokenList) {
        let Some(elem) = self.element_mut(id) else {
            return;
        };
        let value = list.value();
        if elem.get_attr("class").is_none() && value.is_empty() {
            return;
        }
        elem.set_attr("class", &value);
        elem.classes = list.into_tokens();
    }

    /// Inline style declarations of an element
    pub fn style_declarations(&self, id: NodeId) -> &[Declaration] {
        self.element(id).map_or(&[], |e| e.style.as_slice())
    }

    /// Set one inline declaration and re-serialize the `style` attribute
    pub fn set_style_declaration(&mut self, id: NodeId, name: &str, value: &str, important: bool) {
        let Some(elem) = self.element_mut(id) else {
            return;
        };
        style::set_declaration(&mut elem.style, name, value, important);
        let css_text = style::serialize_declarations(&elem.style);
        elem.set_attr("style", &css_text);
    }

    /// Remove one inline declaration, returning its old value
    pub fn remove_style_declaration(&mut self, id: NodeId, name: &str) -> Option<String> {
        let elem = self.element_mut(id)?;
        let old = style::remove_declaration(&mut elem.style, name)?;
        let css_text = style::serialize_declarations(&elem.style);
        elem.set_attr("style", &css_text);
        Some(old)
    }

    /// First element in tree order under `root` whose id is `id`
    pub fn find_element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        self.descendants(root)
            .into_iter()
            .find(|&d| self.element(d).and_then(|e| e.id.as_deref()) == Some(id))
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Reject names the HTML parser could never produce
pub(crate) fn validate_name(name: &str) -> DomResult<()> {
    let invalid = |c: char| c.is_ascii_whitespace() || matches!(c, '\0' | '/' | '>' | '<' | '=' | '"' | '\'');
    if name.is_empty() || name.chars().any(invalid) {
        return Err(DomError::InvalidCharacter(name.to_string()));
    }
    Ok(())
}

/// Element names must additionally start with a letter
pub(crate) fn validate_element_name(name: &str) -> DomResult<()> {
    validate_name(name)?;
    match name.chars().next() {
        Some(c) if c.is_alphabetic() => Ok(()),
        _ => Err(DomError::InvalidCharacter(name.to_string())),
    }
}
