//! Browser host: web-sys

use js_sys::{Array, Function, Reflect};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Document, Element, EventListenerOptions, EventTarget, HtmlElement, Node};

use crate::apply::to_js_string;
use crate::host::{ElementCreationOptions, HostDocument, HostElement, Insert, ListenerOptions};

/// JSON value as the script value a style assignment would receive
fn to_js_value(value: &Value) -> JsValue {
    match value {
        Value::Null => JsValue::NULL,
        Value::Bool(b) => JsValue::from_bool(*b),
        Value::Number(n) => n.as_f64().map_or_else(|| JsValue::from_str(&n.to_string()), JsValue::from_f64),
        Value::String(s) => JsValue::from_str(s),
        other => JsValue::from_str(&to_js_string(other)),
    }
}

fn to_array(nodes: Vec<Insert<Node>>) -> Array {
    nodes
        .into_iter()
        .map(|insert| match insert {
            Insert::Node(node) => JsValue::from(node),
            Insert::Text(text) => JsValue::from_str(&text),
        })
        .collect()
}

fn tokens_array(tokens: &[&str]) -> Array {
    tokens.iter().map(|t| JsValue::from_str(t)).collect()
}

impl HostElement for Element {
    type Node = Node;
    type Listener = Function;
    type Error = JsValue;

    fn as_node(&self) -> Node {
        Node::clone(self)
    }

    fn text_content(&self) -> String {
        Node::text_content(self).unwrap_or_default()
    }

    fn set_text_content(&self, text: &str) {
        Node::set_text_content(self, Some(text));
    }

    fn inner_html(&self) -> String {
        Element::inner_html(self)
    }

    fn set_inner_html(&self, markup: &str) -> Result<(), JsValue> {
        Element::set_inner_html(self, markup);
        Ok(())
    }

    fn set_attribute_ns(&self, namespace: Option<&str>, name: &str, value: &str) -> Result<(), JsValue> {
        Element::set_attribute_ns(self, namespace, name, value)
    }

    fn has_style(&self) -> bool {
        Reflect::has(self, &JsValue::from_str("style")).unwrap_or(false)
    }

    fn set_style(&self, property: &str, value: &Value) -> Result<(), JsValue> {
        let style = Reflect::get(self, &JsValue::from_str("style"))?;
        Reflect::set(&style, &JsValue::from_str(property), &to_js_value(value))?;
        Ok(())
    }

    fn add_event_listener(&self, kind: &str, listener: &Function, options: ListenerOptions) -> Result<(), JsValue> {
        let opts = AddEventListenerOptions::new();
        opts.set_capture(options.capture);
        opts.set_once(options.once);
        opts.set_passive(options.passive);
        EventTarget::add_event_listener_with_callback_and_add_event_listener_options(self, kind, listener, &opts)
    }

    fn remove_event_listener(&self, kind: &str, listener: &Function, options: ListenerOptions) -> Result<(), JsValue> {
        let opts = EventListenerOptions::new();
        opts.set_capture(options.capture);
        EventTarget::remove_event_listener_with_callback_and_event_listener_options(self, kind, listener, &opts)
    }

    fn click(&self) -> Result<(), JsValue> {
        match self.dyn_ref::<HtmlElement>() {
            Some(html) => {
                html.click();
                Ok(())
            }
            None => Err(js_sys::TypeError::new("click is not a function").into()),
        }
    }

    fn append(&self, nodes: Vec<Insert<Node>>) -> Result<(), JsValue> {
        Element::append_with_node(self, &to_array(nodes))
    }

    fn prepend(&self, nodes: Vec<Insert<Node>>) -> Result<(), JsValue> {
        Element::prepend_with_node(self, &to_array(nodes))
    }

    fn add_class(&self, tokens: &[&str]) -> Result<(), JsValue> {
        self.class_list().add(&tokens_array(tokens))
    }

    fn remove_class(&self, tokens: &[&str]) -> Result<(), JsValue> {
        self.class_list().remove(&tokens_array(tokens))
    }

    fn toggle_class(&self, token: &str, force: Option<bool>) -> Result<bool, JsValue> {
        match force {
            Some(force) => self.class_list().toggle_with_force(token, force),
            None => self.class_list().toggle(token),
        }
    }

    fn has_class(&self, token: &str) -> bool {
        self.class_list().contains(token)
    }
}

impl HostDocument for Document {
    type Element = Element;

    fn query_selector(&self, scope: Option<&Element>, selectors: &str) -> Result<Option<Element>, JsValue> {
        match scope {
            Some(scope) => scope.query_selector(selectors),
            None => Document::query_selector(self, selectors),
        }
    }

    fn query_selector_all(&self, scope: Option<&Element>, selectors: &str) -> Result<Vec<Element>, JsValue> {
        let list = match scope {
            Some(scope) => scope.query_selector_all(selectors)?,
            None => Document::query_selector_all(self, selectors)?,
        };
        Ok((0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn get_element_by_id(&self, id: &str) -> Option<Element> {
        Document::get_element_by_id(self, id)
    }

    fn create_element(&self, tag: &str, options: Option<&ElementCreationOptions>) -> Result<Element, JsValue> {
        match options.and_then(|o| o.is.as_deref()) {
            Some(is) => {
                let opts = web_sys::ElementCreationOptions::new();
                opts.set_is(is);
                self.create_element_with_element_creation_options(tag, &opts)
            }
            None => Document::create_element(self, tag),
        }
    }

    fn create_element_ns(&self, namespace: Option<&str>, qualified_name: &str) -> Result<Element, JsValue> {
        Document::create_element_ns(self, namespace, qualified_name)
    }
}
