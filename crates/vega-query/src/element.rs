//! Single-element wrapper

use std::slice;

use crate::host::{HostElement, HostError};
use crate::wrapper::Wrapper;

/// Result of a combined getter/setter.
///
/// Called with a value, the accessor sets it and hands back the wrapper
/// (`Chain`); called without one, it reads (`Value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<C, V> {
    Chain(C),
    Value(V),
}

impl<C, V> Access<C, V> {
    /// The read value, if this was a read
    pub fn value(self) -> Option<V> {
        match self {
            Access::Value(v) => Some(v),
            Access::Chain(_) => None,
        }
    }

    /// The wrapper, if this was a write
    pub fn chain(self) -> Option<C> {
        match self {
            Access::Chain(c) => Some(c),
            Access::Value(_) => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Access::Value(_))
    }

    pub fn is_chain(&self) -> bool {
        matches!(self, Access::Chain(_))
    }
}

/// Setter argument that counts as "a value was given".
///
/// An absent or empty string reads instead of writing.
pub(crate) fn given(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Wraps exactly one host element
#[derive(Debug, Clone, PartialEq)]
pub struct VqElement<E> {
    element: E,
}

impl<E: HostElement> VqElement<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }

    /// The wrapped host element
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn into_element(self) -> E {
        self.element
    }

    /// Text content.
    ///
    /// `Some` non-empty text replaces the element's children with one text
    /// node; `None` or `""` reads the current text.
    pub fn text(&self, text: Option<&str>) -> Access<&Self, String> {
        match given(text) {
            Some(text) => {
                self.element.set_text_content(text);
                Access::Chain(self)
            }
            None => Access::Value(self.element.text_content()),
        }
    }

    /// Inner markup, with the same read/write rule as [`Self::text`]
    pub fn html(&self, markup: Option<&str>) -> Result<Access<&Self, String>, HostError<E>> {
        match given(markup) {
            Some(markup) => {
                self.element.set_inner_html(markup)?;
                Ok(Access::Chain(self))
            }
            None => Ok(Access::Value(self.element.inner_html())),
        }
    }
}

impl<E: HostElement> From<E> for VqElement<E> {
    fn from(element: E) -> Self {
        Self::new(element)
    }
}

impl<E: HostElement> Wrapper for VqElement<E> {
    type Element = E;

    fn targets(&self) -> &[VqElement<E>] {
        slice::from_ref(self)
    }
}
