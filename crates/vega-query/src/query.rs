//! Entry points
//!
//! `Query` is the document context the script-side `$`-functions close
//! over: select one, select by id, select all, create (HTML or SVG), and
//! bulk style. A default scope narrows the selecting entry points the way
//! passing a parent node would.

use serde_json::Value;

use crate::apply;
use crate::element::VqElement;
use crate::elements::VqElements;
use crate::host::{ElementCreationOptions, HostDocument, HostError, SVG_NAMESPACE};
use crate::wrapper::Wrapper;

type QueryResult<D, T> = Result<T, HostError<<D as HostDocument>::Element>>;

/// Query context over a host document
#[derive(Debug, Clone)]
pub struct Query<D: HostDocument> {
    document: D,
    scope: Option<D::Element>,
}

impl<D: HostDocument> Query<D> {
    pub fn new(document: D) -> Self {
        Self { document, scope: None }
    }

    /// Search under `scope` instead of the whole document by default
    pub fn with_scope(mut self, scope: D::Element) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn scope(&self) -> Option<&D::Element> {
        self.scope.as_ref()
    }

    /// First match of `selectors` (`$`)
    pub fn select(&self, selectors: &str) -> QueryResult<D, Option<VqElement<D::Element>>> {
        self.select_from(self.scope.as_ref(), selectors)
    }

    /// First match of `selectors` among the descendants of `scope`
    pub fn select_in(&self, selectors: &str, scope: &D::Element) -> QueryResult<D, Option<VqElement<D::Element>>> {
        self.select_from(Some(scope), selectors)
    }

    fn select_from(
        &self,
        scope: Option<&D::Element>,
        selectors: &str,
    ) -> QueryResult<D, Option<VqElement<D::Element>>> {
        tracing::trace!(selectors, scoped = scope.is_some(), "select");
        Ok(self.document.query_selector(scope, selectors)?.map(VqElement::new))
    }

    /// Element with the given id (`$id`)
    pub fn by_id(&self, id: &str) -> Option<VqElement<D::Element>> {
        tracing::trace!(id, "select by id");
        self.document.get_element_by_id(id).map(VqElement::new)
    }

    /// Every match of `selectors`, in document order (`$$`)
    pub fn select_all(&self, selectors: &str) -> QueryResult<D, VqElements<D::Element>> {
        self.select_all_from(self.scope.as_ref(), selectors)
    }

    /// Every match of `selectors` among the descendants of `scope`
    pub fn select_all_in(&self, selectors: &str, scope: &D::Element) -> QueryResult<D, VqElements<D::Element>> {
        self.select_all_from(Some(scope), selectors)
    }

    fn select_all_from(&self, scope: Option<&D::Element>, selectors: &str) -> QueryResult<D, VqElements<D::Element>> {
        let found = self.document.query_selector_all(scope, selectors)?;
        tracing::trace!(selectors, matched = found.len(), "select all");
        Ok(VqElements::new(found))
    }

    /// Create a detached HTML element (`$new`)
    pub fn create(
        &self,
        tag: &str,
        attributes: Option<&Value>,
        options: Option<&ElementCreationOptions>,
    ) -> QueryResult<D, VqElement<D::Element>> {
        let element = self.document.create_element(tag, options)?;
        if let Some(attributes) = attributes {
            apply::set_attributes(&element, attributes)?;
        }
        Ok(VqElement::new(element))
    }

    /// Create a detached element in the SVG namespace (`$svg`)
    pub fn create_svg(&self, qualified_name: &str, attributes: Option<&Value>) -> QueryResult<D, VqElement<D::Element>> {
        let element = self.document.create_element_ns(Some(SVG_NAMESPACE), qualified_name)?;
        if let Some(attributes) = attributes {
            apply::set_attributes(&element, attributes)?;
        }
        Ok(VqElement::new(element))
    }

    /// Select all matches and assign `styles` to each (`$style`)
    pub fn style(&self, selectors: &str, styles: &Value) -> QueryResult<D, VqElements<D::Element>> {
        let found = self.select_all(selectors)?;
        found.style(styles)?;
        Ok(found)
    }
}

impl Query<vq_dom::Document> {
    /// Query context over a fresh in-memory HTML document
    pub fn in_memory() -> Self {
        Self::new(vq_dom::Document::html())
    }

    /// Query context over a parsed HTML document
    pub fn parse(html: &str) -> Self {
        Self::new(vq_html::parse(html))
    }
}

#[cfg(feature = "web")]
impl Query<web_sys::Document> {
    /// Query context over the page's document, if there is a window
    pub fn global() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }
}
