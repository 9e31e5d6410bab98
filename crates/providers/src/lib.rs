//! Suggestion backends for `typeahead-search`.
//!
//! - [`HttpProvider`]: `GET {base_url}{path}?{query_param}=<text>` against a REST API
//! - [`CatalogProvider`]: substring matches over an in-process company list
//! - [`FallbackProvider`]: a primary backend with a second one behind it

mod catalog;
mod error;
mod fallback;
mod http;

pub use catalog::{CatalogEntry, CatalogProvider};
pub use error::{ProviderError, Result};
pub use fallback::FallbackProvider;
pub use http::{decode_records, HttpProvider, HttpProviderConfig};
