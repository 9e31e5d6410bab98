use crate::error::{Result, SearchError};
use crate::provider::SuggestionProvider;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use typeahead_protocol::RawRecord;

enum Script {
    Records(Vec<RawRecord>),
    Failure(String),
    Malformed(String),
}

/// Provider with canned answers per normalized query, optional per-query
/// latency, and a log of every query it was asked.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_records(mut self, query: &str, records: Vec<RawRecord>) -> Self {
        self.scripts
            .insert(query.to_string(), Script::Records(records));
        self
    }

    pub(crate) fn with_failure(mut self, query: &str, message: &str) -> Self {
        self.scripts
            .insert(query.to_string(), Script::Failure(message.to_string()));
        self
    }

    pub(crate) fn with_malformed(mut self, query: &str, message: &str) -> Self {
        self.scripts
            .insert(query.to_string(), Script::Malformed(message.to_string()));
        self
    }

    pub(crate) fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn lookup(&self, query: &str) -> Result<Vec<RawRecord>> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        match self.scripts.get(query) {
            Some(Script::Records(records)) => Ok(records.clone()),
            Some(Script::Failure(message)) => Err(SearchError::provider(message.clone())),
            Some(Script::Malformed(message)) => Err(SearchError::malformed(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}
