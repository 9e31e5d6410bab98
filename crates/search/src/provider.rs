use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use typeahead_protocol::RawRecord;

/// A backend that answers a normalized query with raw company records.
///
/// Implementations may fail or return nothing; they never see the session.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, query: &str) -> Result<Vec<RawRecord>>;
}

#[async_trait]
impl<P: SuggestionProvider + ?Sized> SuggestionProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn lookup(&self, query: &str) -> Result<Vec<RawRecord>> {
        (**self).lookup(query).await
    }
}

#[async_trait]
impl<P: SuggestionProvider + ?Sized> SuggestionProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn lookup(&self, query: &str) -> Result<Vec<RawRecord>> {
        (**self).lookup(query).await
    }
}
