use async_trait::async_trait;
use std::sync::Arc;
use typeahead_protocol::RawRecord;
use typeahead_search::{Result, SuggestionProvider};

/// Asks `primary` first and answers from `fallback` when the primary lookup fails.
///
/// Only lookup failures (transport or payload) trigger the fallback; an empty
/// result from the primary is a valid answer and is returned as is.
pub struct FallbackProvider {
    primary: Arc<dyn SuggestionProvider>,
    fallback: Arc<dyn SuggestionProvider>,
}

impl FallbackProvider {
    pub fn new(primary: Arc<dyn SuggestionProvider>, fallback: Arc<dyn SuggestionProvider>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SuggestionProvider for FallbackProvider {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn lookup(&self, query: &str) -> Result<Vec<RawRecord>> {
        match self.primary.lookup(query).await {
            Err(err) if err.is_lookup_failure() => {
                log::warn!(
                    "{} lookup failed ({err}), answering from {}",
                    self.primary.name(),
                    self.fallback.name()
                );
                self.fallback.lookup(query).await
            }
            other => other,
        }
    }
}
