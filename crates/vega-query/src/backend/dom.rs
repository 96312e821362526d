//! In-memory host: `vq_dom`

use serde_json::Value;
use vq_dom::{Document, DomError, Element, EventListener, NodeOrString, NodeRef};

use crate::apply::to_js_string;
use crate::host::{ElementCreationOptions, HostDocument, HostElement, Insert, ListenerOptions};

fn to_node_or_string(insert: Insert<NodeRef>) -> NodeOrString {
    match insert {
        Insert::Node(node) => NodeOrString::Node(node),
        Insert::Text(text) => NodeOrString::Text(text),
    }
}

// The trait shares method names with `Element` and `NodeRef`, so calls
// into vq_dom are spelled out in full.
impl HostElement for Element {
    type Node = NodeRef;
    type Listener = EventListener;
    type Error = DomError;

    fn as_node(&self) -> NodeRef {
        Element::as_node(self).clone()
    }

    fn text_content(&self) -> String {
        NodeRef::text_content(self).unwrap_or_default()
    }

    fn set_text_content(&self, text: &str) {
        NodeRef::set_text_content(self, text);
    }

    fn inner_html(&self) -> String {
        vq_html::inner_html(self)
    }

    fn set_inner_html(&self, markup: &str) -> Result<(), DomError> {
        vq_html::set_inner_html(self, markup)
    }

    fn set_attribute_ns(&self, namespace: Option<&str>, name: &str, value: &str) -> Result<(), DomError> {
        Element::set_attribute_ns(self, namespace, name, value)
    }

    fn has_style(&self) -> bool {
        Element::style(self).is_some()
    }

    fn set_style(&self, property: &str, value: &Value) -> Result<(), DomError> {
        let style = Element::style(self).ok_or(DomError::NotSupported("element has no inline style"))?;
        // Assigning null clears the property
        let value = match value {
            Value::Null => String::new(),
            other => to_js_string(other),
        };
        style.set(property, &value);
        Ok(())
    }

    fn add_event_listener(&self, kind: &str, listener: &EventListener, options: ListenerOptions) -> Result<(), DomError> {
        NodeRef::add_event_listener(self, kind, listener.clone(), options);
        Ok(())
    }

    fn remove_event_listener(
        &self,
        kind: &str,
        listener: &EventListener,
        options: ListenerOptions,
    ) -> Result<(), DomError> {
        NodeRef::remove_event_listener(self, kind, listener, options);
        Ok(())
    }

    fn click(&self) -> Result<(), DomError> {
        Element::click(self)
    }

    fn append(&self, nodes: Vec<Insert<NodeRef>>) -> Result<(), DomError> {
        Element::append(self, nodes.into_iter().map(to_node_or_string))
    }

    fn prepend(&self, nodes: Vec<Insert<NodeRef>>) -> Result<(), DomError> {
        Element::prepend(self, nodes.into_iter().map(to_node_or_string))
    }

    fn add_class(&self, tokens: &[&str]) -> Result<(), DomError> {
        self.class_list().add(tokens)
    }

    fn remove_class(&self, tokens: &[&str]) -> Result<(), DomError> {
        self.class_list().remove(tokens)
    }

    fn toggle_class(&self, token: &str, force: Option<bool>) -> Result<bool, DomError> {
        self.class_list().toggle(token, force)
    }

    fn has_class(&self, token: &str) -> bool {
        self.class_list().contains(token)
    }
}

impl HostDocument for Document {
    type Element = Element;

    fn query_selector(&self, scope: Option<&Element>, selectors: &str) -> Result<Option<Element>, DomError> {
        match scope {
            Some(scope) => scope.query_selector(selectors),
            None => Document::query_selector(self, selectors),
        }
    }

    fn query_selector_all(&self, scope: Option<&Element>, selectors: &str) -> Result<Vec<Element>, DomError> {
        match scope {
            Some(scope) => scope.query_selector_all(selectors),
            None => Document::query_selector_all(self, selectors),
        }
    }

    fn get_element_by_id(&self, id: &str) -> Option<Element> {
        Document::get_element_by_id(self, id)
    }

    fn create_element(&self, tag: &str, options: Option<&ElementCreationOptions>) -> Result<Element, DomError> {
        Document::create_element(self, tag, options)
    }

    fn create_element_ns(&self, namespace: Option<&str>, qualified_name: &str) -> Result<Element, DomError> {
        Document::create_element_ns(self, namespace, qualified_name)
    }
}
