//! DOM Events
//!
//! Listener registry and the capture / target / bubble dispatch walk.
//!
//! Dispatch never holds the document borrow while a callback runs, so
//! listeners are free to mutate the tree or (un)register listeners. A
//! registration removed mid-dispatch is skipped even if it was part of the
//! snapshot taken for the current node.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::NodeId;
use crate::document::Document;

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// A DOM event
#[derive(Debug, Clone)]
pub struct Event {
    /// Event type (`"click"`, `"input"`, ...)
    pub kind: String,
    pub target: Option<NodeId>,
    pub current_target: Option<NodeId>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    in_passive_listener: bool,
}

impl Event {
    pub fn new(kind: &str, bubbles: bool, cancelable: bool) -> Self {
        Self {
            kind: kind.to_string(),
            target: None,
            current_target: None,
            phase: EventPhase::None,
            bubbles,
            cancelable,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            in_passive_listener: false,
        }
    }

    /// Cancel the default action. Ignored for non-cancelable events and
    /// inside passive listeners.
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Finish listeners on the current node, then stop
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop before the next listener
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

/// Listener callback.
///
/// Identity is the callback allocation: clones of one `EventListener`
/// are the same listener, two `EventListener::new` calls never are.
#[derive(Clone)]
pub struct EventListener {
    callback: Rc<dyn Fn(&mut Event)>,
}

impl EventListener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&mut Event) + 'static,
    {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Invoke the callback
    pub fn invoke(&self, event: &mut Event) {
        (self.callback)(event);
    }

    /// Whether both handles refer to the same callback
    pub fn same(&self, other: &EventListener) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl PartialEq for EventListener {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("callback", &Rc::as_ptr(&self.callback))
            .finish()
    }
}

/// `addEventListener` / `removeEventListener` options.
///
/// Only `capture` takes part in listener identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub once: bool,
    pub passive: bool,
}

impl ListenerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn with_passive(mut self, passive: bool) -> Self {
        self.passive = passive;
        self
    }
}

/// A boolean third argument means `capture`
impl From<bool> for ListenerOptions {
    fn from(capture: bool) -> Self {
        Self {
            capture,
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub(crate) struct Registration {
    kind: String,
    listener: EventListener,
    options: ListenerOptions,
    removed: Rc<Cell<bool>>,
}

/// Listeners for every node that has at least one
#[derive(Default)]
pub(crate) struct EventTargetMap {
    listeners: HashMap<NodeId, Vec<Registration>>,
}

impl EventTargetMap {
    /// Register a listener. Returns false for a duplicate
    /// (same type, callback and capture flag).
    pub(crate) fn add(&mut self, node: NodeId, kind: &str, listener: EventListener, options: ListenerOptions) -> bool {
        let list = self.listeners.entry(node).or_default();
        let duplicate = list
            .iter()
            .any(|r| r.kind == kind && r.options.capture == options.capture && r.listener.same(&listener));
        if duplicate {
            return false;
        }
        list.push(Registration {
            kind: kind.to_string(),
            listener,
            options,
            removed: Rc::new(Cell::new(false)),
        });
        true
    }

    /// Remove the listener matching type, callback and capture flag
    pub(crate) fn remove(&mut self, node: NodeId, kind: &str, listener: &EventListener, capture: bool) -> bool {
        let Some(list) = self.listeners.get_mut(&node) else {
            return false;
        };
        let Some(index) = list
            .iter()
            .position(|r| r.kind == kind && r.options.capture == capture && r.listener.same(listener))
        else {
            return false;
        };

        let registration = list.remove(index);
        registration.removed.set(true);
        if list.is_empty() {
            self.listeners.remove(&node);
        }
        true
    }

    /// Number of listeners registered on `node`
    /// Take every listener registered on `node`
    pub(crate) fn clear(&mut self, node: NodeId) -> Vec<EventListener> {
        self.listeners
            .remove(&node)
            .into_iter()
            .flatten()
            .map(|r| r.listener)
            .collect()
    }

    pub(crate) fn count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).map_or(0, Vec::len)
    }

    fn matching(&self, node: NodeId, kind: &str) -> Vec<Registration> {
        self.listeners
            .get(&node)
            .map(|list| list.iter().filter(|r| r.kind == kind).cloned().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for EventTargetMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTargetMap")
            .field("targets", &self.listeners.len())
            .finish()
    }
}

/// Dispatch `event` at `target`. Returns false if the default was prevented.
pub(crate) fn dispatch(document: &Document, target: NodeId, event: &mut Event) -> bool {
    event.target = Some(target);

    // Propagation path is fixed before any listener runs
    let mut path = document.with_tree(|tree| tree.ancestors(target));
    path.reverse();
    path.push(target);
    let target_index = path.len() - 1;
    // Listeners may detach nodes on the path, which must not be reclaimed
    let _pinned: Vec<_> = path.iter().map(|&node| document.node(node)).collect();

    tracing::debug!(kind = %event.kind, ?target, depth = target_index, "dispatching event");

    // Capture: root to target, capture listeners only
    for (i, &node) in path.iter().enumerate() {
        if event.propagation_stopped {
            break;
        }
        event.phase = if i == target_index {
            EventPhase::AtTarget
        } else {
            EventPhase::Capturing
        };
        invoke(document, node, event, true);
    }

    // Bubble: target to root, non-capture listeners only
    for (i, &node) in path.iter().enumerate().rev() {
        if event.propagation_stopped {
            break;
        }
        if i == target_index {
            event.phase = EventPhase::AtTarget;
        } else if event.bubbles {
            event.phase = EventPhase::Bubbling;
        } else {
            break;
        }
        invoke(document, node, event, false);
    }

    event.phase = EventPhase::None;
    event.current_target = None;
    !event.default_prevented
}

fn invoke(document: &Document, node: NodeId, event: &mut Event, capture: bool) {
    let registrations = document.inner.borrow().listeners.matching(node, &event.kind);
    event.current_target = Some(node);

    for registration in registrations {
        if event.immediate_propagation_stopped {
            break;
        }
        if registration.options.capture != capture || registration.removed.get() {
            continue;
        }
        if registration.options.once {
            document.inner.borrow_mut().listeners.remove(
                node,
                &registration.kind,
                &registration.listener,
                capture,
            );
        }

        event.in_passive_listener = registration.options.passive;
        registration.listener.invoke(event);
        event.in_passive_listener = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut map = EventTargetMap::default();
        let listener = EventListener::new(|_| {});

        assert!(map.add(NodeId(1), "click", listener.clone(), false.into()));
        assert!(!map.add(NodeId(1), "click", listener.clone(), false.into()));
        assert!(map.add(NodeId(1), "click", listener.clone(), true.into()));
        assert_eq!(map.count(NodeId(1)), 2);
    }

    #[test]
    fn test_remove_matches_capture() {
        let mut map = EventTargetMap::default();
        let listener = EventListener::new(|_| {});
        map.add(NodeId(1), "click", listener.clone(), true.into());

        assert!(!map.remove(NodeId(1), "click", &listener, false));
        assert!(map.remove(NodeId(1), "click", &listener, true));
        assert_eq!(map.count(NodeId(1)), 0);
    }

    #[test]
    fn test_listener_identity() {
        let a = EventListener::new(|_| {});
        let b = EventListener::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_prevent_default() {
        let mut event = Event::new("click", true, true);
        event.prevent_default();
        assert!(event.default_prevented());

        let mut event = Event::new("load", false, false);
        event.prevent_default();
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_dispatch_order() {
        let doc = Document::new();
        let (outer, inner) = doc.with_tree_mut(|tree| {
            let outer = tree.create_html_element("div");
            let inner = tree.create_html_element("span");
            tree.append_child(tree.root(), outer).unwrap();
            tree.append_child(outer, inner).unwrap();
            (outer, inner)
        });

        let log = Rc::new(RefCell::new(Vec::new()));
        let record = |label: &'static str| {
            let log = log.clone();
            EventListener::new(move |e: &mut Event| log.borrow_mut().push((label, e.phase)))
        };

        {
            let mut inner_doc = doc.inner.borrow_mut();
            inner_doc.listeners.add(outer, "click", record("outer-bubble"), false.into());
            inner_doc.listeners.add(outer, "click", record("outer-capture"), true.into());
            inner_doc.listeners.add(inner, "click", record("inner"), false.into());
        }

        let mut event = Event::new("click", true, true);
        assert!(dispatch(&doc, inner, &mut event));
        assert_eq!(
            *log.borrow(),
            vec![
                ("outer-capture", EventPhase::Capturing),
                ("inner", EventPhase::AtTarget),
                ("outer-bubble", EventPhase::Bubbling),
            ]
        );
    }

    #[test]
    fn test_passive_listener_cannot_prevent_default() {
        let doc = Document::new();
        let div = doc.with_tree_mut(|tree| {
            let div = tree.create_html_element("div");
            tree.append_child(tree.root(), div).unwrap();
            div
        });

        let listener = EventListener::new(|e: &mut Event| e.prevent_default());
        doc.inner.borrow_mut().listeners.add(
            div,
            "wheel",
            listener,
            ListenerOptions::new().with_passive(true),
        );

        let mut event = Event::new("wheel", true, true);
        assert!(dispatch(&doc, div, &mut event));
    }
}
