//! vega-query - Chainable DOM query and manipulation
//!
//! Thin wrappers over a host DOM:
//! - `Query` selects, creates and bulk-styles elements
//! - `VqElement` wraps one element, `VqElements` an ordered collection
//! - `Wrapper` holds the chainable mutators both share
//!
//! The host is abstracted by `HostDocument` / `HostElement`. The in-memory
//! `vq_dom` document is always available; the browser document is bound
//! with the `web` feature.
//!
//! ```
//! use vega_query::prelude::*;
//! use serde_json::json;
//!
//! let q = Query::parse("<p>one</p><p>two</p>");
//! q.select_all("p").unwrap().attr(&json!({ "class": "par" })).unwrap();
//! assert!(q.select_all("p").unwrap().has_class("par"));
//! ```

pub mod apply;
mod backend;
mod element;
mod elements;
pub mod host;
mod query;
mod wrapper;

pub use element::{Access, VqElement};
pub use elements::VqElements;
pub use host::{ElementCreationOptions, HostDocument, HostElement, HostError, Insert, ListenerOptions, SVG_NAMESPACE};
pub use query::Query;
pub use wrapper::{Child, Wrapper};

// Re-export the in-memory host
pub use vq_dom;
pub use vq_html;

/// Everything a script-style caller needs.
///
/// The host traits are left out: in scope, their methods would shadow the
/// inherent `vq_dom` methods reached through `Deref`.
pub mod prelude {
    pub use crate::{Access, Child, ElementCreationOptions, ListenerOptions, Query, VqElement, VqElements, Wrapper};
}
