//! Shared wrapper operations
//!
//! Both wrappers expose the same mutators. A single element is the
//! one-target case of a collection, so the operations are written once
//! over a target slice and fan out in collection order.

use std::borrow::Cow;

use serde_json::Value;

use crate::apply;
use crate::element::VqElement;
use crate::host::{HostElement, HostError, Insert, ListenerOptions};

// ============================================================================
// Child
// ============================================================================

/// An `append` / `prepend` argument
pub enum Child<'a, E: HostElement> {
    /// An element, inserted by identity (a wrapper unwraps to this)
    Element(E),
    /// Any host node
    Node(E::Node),
    /// Text, inserted as a new text node
    Text(Cow<'a, str>),
}

impl<E: HostElement> Child<'_, E> {
    fn into_insert(self) -> Insert<E::Node> {
        match self {
            Child::Element(element) => Insert::Node(element.as_node()),
            Child::Node(node) => Insert::Node(node),
            Child::Text(text) => Insert::Text(text.into_owned()),
        }
    }
}

impl<E: HostElement> From<VqElement<E>> for Child<'_, E> {
    fn from(wrapper: VqElement<E>) -> Self {
        Child::Element(wrapper.into_element())
    }
}

impl<E: HostElement> From<&VqElement<E>> for Child<'_, E> {
    fn from(wrapper: &VqElement<E>) -> Self {
        Child::Element(wrapper.element().clone())
    }
}

impl<'a, E: HostElement> From<&'a str> for Child<'a, E> {
    fn from(text: &'a str) -> Self {
        Child::Text(Cow::Borrowed(text))
    }
}

impl<E: HostElement> From<String> for Child<'_, E> {
    fn from(text: String) -> Self {
        Child::Text(Cow::Owned(text))
    }
}

fn collect_inserts<'a, E, I>(nodes: I) -> Vec<Insert<E::Node>>
where
    E: HostElement + 'a,
    I: IntoIterator,
    I::Item: Into<Child<'a, E>>,
{
    nodes.into_iter().map(|n| n.into().into_insert()).collect()
}

// ============================================================================
// Wrapper
// ============================================================================

/// Operations shared by [`VqElement`] and [`crate::VqElements`].
///
/// Mutators run against every target in order and hand back the wrapper
/// for chaining. The first host fault stops the fan-out and is returned;
/// targets already processed keep their changes.
pub trait Wrapper {
    type Element: HostElement;

    /// Wrapped elements, in order
    fn targets(&self) -> &[VqElement<Self::Element>];

    /// Apply an attribute mapping (see [`apply::set_attributes`])
    fn attr(&self, attributes: &Value) -> Result<&Self, HostError<Self::Element>> {
        for target in self.targets() {
            apply::set_attributes(target.element(), attributes)?;
        }
        Ok(self)
    }

    /// Assign inline style properties
    fn style(&self, styles: &Value) -> Result<&Self, HostError<Self::Element>> {
        for target in self.targets() {
            apply::set_styles(target.element(), styles)?;
        }
        Ok(self)
    }

    /// Register `listener` for each whitespace-separated event name
    fn on(
        &self,
        names: &str,
        listener: &<Self::Element as HostElement>::Listener,
        options: impl Into<ListenerOptions>,
    ) -> Result<&Self, HostError<Self::Element>> {
        let options = options.into();
        for target in self.targets() {
            for name in names.split_whitespace() {
                tracing::trace!(event = name, "on");
                target.element().add_event_listener(name, listener, options)?;
            }
        }
        Ok(self)
    }

    /// Unregister `listener` for each whitespace-separated event name
    fn off(
        &self,
        names: &str,
        listener: &<Self::Element as HostElement>::Listener,
        options: impl Into<ListenerOptions>,
    ) -> Result<&Self, HostError<Self::Element>> {
        let options = options.into();
        for target in self.targets() {
            for name in names.split_whitespace() {
                tracing::trace!(event = name, "off");
                target.element().remove_event_listener(name, listener, options)?;
            }
        }
        Ok(self)
    }

    /// Synthesize a click on each target
    fn click(&self) -> Result<&Self, HostError<Self::Element>> {
        for target in self.targets() {
            target.element().click()?;
        }
        Ok(self)
    }

    /// Insert `nodes` after the last child of each target.
    ///
    /// A node can only have one parent, so with several targets a node
    /// argument ends up under the last of them.
    fn append<'a, I>(&self, nodes: I) -> Result<&Self, HostError<Self::Element>>
    where
        Self::Element: 'a,
        I: IntoIterator,
        I::Item: Into<Child<'a, Self::Element>>,
    {
        let inserts = collect_inserts::<Self::Element, I>(nodes);
        for target in self.targets() {
            target.element().append(inserts.clone())?;
        }
        Ok(self)
    }

    /// Insert `nodes` before the first child of each target
    fn prepend<'a, I>(&self, nodes: I) -> Result<&Self, HostError<Self::Element>>
    where
        Self::Element: 'a,
        I: IntoIterator,
        I::Item: Into<Child<'a, Self::Element>>,
    {
        let inserts = collect_inserts::<Self::Element, I>(nodes);
        for target in self.targets() {
            target.element().prepend(inserts.clone())?;
        }
        Ok(self)
    }

    fn add_class<I>(&self, tokens: I) -> Result<&Self, HostError<Self::Element>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let tokens: Vec<I::Item> = tokens.into_iter().collect();
        let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        for target in self.targets() {
            target.element().add_class(&tokens)?;
        }
        Ok(self)
    }

    fn remove_class<I>(&self, tokens: I) -> Result<&Self, HostError<Self::Element>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let tokens: Vec<I::Item> = tokens.into_iter().collect();
        let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        for target in self.targets() {
            target.element().remove_class(&tokens)?;
        }
        Ok(self)
    }

    /// Toggle `token` on every target.
    ///
    /// Returns true only if the token is now present on all of them
    /// (vacuously true for no targets). Every target is toggled even once
    /// a false result is known.
    fn toggle_class(&self, token: &str, force: Option<bool>) -> Result<bool, HostError<Self::Element>> {
        let mut all_present = true;
        for target in self.targets() {
            all_present &= target.element().toggle_class(token, force)?;
        }
        Ok(all_present)
    }

    /// Whether every target carries `token`
    fn has_class(&self, token: &str) -> bool {
        self.targets().iter().all(|t| t.element().has_class(token))
    }
}
