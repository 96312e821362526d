//! Collection wrapper

use crate::element::{Access, VqElement, given};
use crate::host::{HostElement, HostError};
use crate::wrapper::Wrapper;

/// Wraps an ordered sequence of host elements, possibly empty
#[derive(Debug, Clone, PartialEq)]
pub struct VqElements<E> {
    elements: Vec<VqElement<E>>,
}

impl<E: HostElement> VqElements<E> {
    pub fn new(elements: Vec<E>) -> Self {
        elements.into_iter().collect()
    }

    pub fn from_wrappers(elements: Vec<VqElement<E>>) -> Self {
        Self { elements }
    }

    /// Wrapped elements, in order
    pub fn elements(&self) -> &[VqElement<E>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VqElement<E>> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VqElement<E>> {
        self.elements.iter()
    }

    /// Text of every element, or set it on every element.
    ///
    /// A write returns a new collection over the same elements.
    pub fn text(&self, text: Option<&str>) -> Access<VqElements<E>, Vec<String>> {
        match given(text) {
            Some(text) => {
                for element in &self.elements {
                    element.text(Some(text));
                }
                Access::Chain(self.clone())
            }
            None => Access::Value(self.elements.iter().map(|e| e.element().text_content()).collect()),
        }
    }

    /// Inner markup of every element, or set it on every element
    pub fn html(&self, markup: Option<&str>) -> Result<Access<VqElements<E>, Vec<String>>, HostError<E>> {
        match given(markup) {
            Some(markup) => {
                for element in &self.elements {
                    element.html(Some(markup))?;
                }
                Ok(Access::Chain(self.clone()))
            }
            None => Ok(Access::Value(
                self.elements.iter().map(|e| e.element().inner_html()).collect(),
            )),
        }
    }
}

impl<E: HostElement> Wrapper for VqElements<E> {
    type Element = E;

    fn targets(&self) -> &[VqElement<E>] {
        &self.elements
    }
}

impl<E: HostElement> FromIterator<E> for VqElements<E> {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().map(VqElement::new).collect(),
        }
    }
}

impl<E> IntoIterator for VqElements<E> {
    type Item = VqElement<E>;
    type IntoIter = std::vec::IntoIter<VqElement<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a VqElements<E> {
    type Item = &'a VqElement<E>;
    type IntoIter = std::slice::Iter<'a, VqElement<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
