//! HTTP client for the tracking collaborators and the debounced quantity
//! writer the editors use.

mod debounce;
mod http;

pub use debounce::QuantityDebouncer;
pub use http::{HttpCatalog, rejection};
