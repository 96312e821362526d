//! Host bindings
//!
//! `dom` binds the in-memory `vq_dom` document; `web` binds the browser
//! document through web-sys.

mod dom;

#[cfg(feature = "web")]
mod web;
