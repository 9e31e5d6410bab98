//! # Typeahead Search
//!
//! Incremental company suggestions for a search box.
//!
//! ## Pipeline
//!
//! ```text
//! keystroke
//!     │
//!     ├──> QueryNormalizer (trim, lowercase, collapse; below threshold -> Idle)
//!     │
//!     ├──> Debouncer (one pending query, reset on every keystroke)
//!     │
//!     ├──> RequestCoordinator
//!     │      ├─> QueryCache hit: resolve now
//!     │      └─> miss: one provider lookup, older ones abandoned
//!     │
//!     ├──> CandidateRanker (dedupe by id, popularity order, cap)
//!     │
//!     └──> SearchSession (applies only the newest sequence)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use typeahead_search::{QueryCache, SuggestConfig, SuggestionProvider, TypeaheadHandle};
//!
//! async fn run(provider: Arc<dyn SuggestionProvider>) -> typeahead_search::Result<()> {
//!     let config = SuggestConfig::default();
//!     let session = TypeaheadHandle::spawn(provider, QueryCache::from_config(&config), &config)?;
//!
//!     session.text_changed("goog").await?;
//!     let snapshot = session.wait_for(|s| !s.candidates.is_empty()).await?;
//!     println!("{} candidates", snapshot.candidates.len());
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod coordinator;
mod debounce;
mod engine;
mod error;
mod handle;
mod normalize;
mod provider;
mod rank;
mod session;

#[cfg(test)]
mod test_support;

pub use cache::{CacheEntry, QueryCache};
pub use config::SuggestConfig;
pub use coordinator::{Dispatch, LookupResponse, RequestCoordinator, Resolution, ResponseSource};
pub use debounce::{Debouncer, PendingQuery};
pub use engine::TypeaheadEngine;
pub use error::{Result, SearchError};
pub use handle::TypeaheadHandle;
pub use normalize::{Normalized, Query, QueryNormalizer};
pub use provider::SuggestionProvider;
pub use rank::{domain_from_website, logo_url, CandidateRanker};
pub use session::{Applied, SearchSession};
pub use typeahead_protocol::{Candidate, ImageSource, Phase, RawRecord, SessionSnapshot};
