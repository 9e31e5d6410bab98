use crate::cache::QueryCache;
use crate::error::Result;
use crate::normalize::Query;
use crate::provider::SuggestionProvider;
use crate::rank::CandidateRanker;
use crate::session::{Applied, SearchSession};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use typeahead_protocol::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Provider,
}

#[derive(Debug)]
pub struct LookupResponse {
    pub query: Query,
    pub source: ResponseSource,
    pub outcome: Result<Vec<Candidate>>,
}

/// What `submit` did with a query.
#[derive(Debug)]
pub enum Dispatch {
    /// Served from cache; resolve it right away
    Ready(LookupResponse),
    /// One provider call is running; its response arrives on the channel
    InFlight(Query),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Committed,
    Failed,
    /// Dropped silently: a newer query owns the session
    Superseded,
}

struct InFlight {
    sequence: u64,
    key: String,
    handle: JoinHandle<()>,
}

/// Owns the single "current" lookup of one session.
pub struct RequestCoordinator {
    provider: Arc<dyn SuggestionProvider>,
    cache: QueryCache,
    ranker: CandidateRanker,
    response_tx: mpsc::UnboundedSender<LookupResponse>,
    next_sequence: u64,
    current: Option<u64>,
    in_flight: Option<InFlight>,
    provider_calls: u64,
}

impl RequestCoordinator {
    pub fn new(
        provider: Arc<dyn SuggestionProvider>,
        cache: QueryCache,
        ranker: CandidateRanker,
    ) -> (Self, mpsc::UnboundedReceiver<LookupResponse>) {
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            provider,
            cache,
            ranker,
            response_tx,
            next_sequence: 0,
            current: None,
            in_flight: None,
            provider_calls: 0,
        };
        (coordinator, response_rx)
    }

    /// Sequence of the query whose result may still be applied, if any.
    pub const fn current_sequence(&self) -> Option<u64> {
        self.current
    }

    pub const fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Normalized key of the provider lookup still running, if any.
    pub fn in_flight_key(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|running| running.key.as_str())
    }

    /// Number of lookups actually sent to the provider.
    pub const fn provider_calls(&self) -> u64 {
        self.provider_calls
    }

    /// Must be called from within a tokio runtime: misses spawn the lookup.
    pub fn submit(&mut self, raw: impl Into<String>, normalized: impl Into<String>) -> Dispatch {
        self.next_sequence += 1;
        let query = Query {
            raw: raw.into(),
            normalized: normalized.into(),
            sequence: self.next_sequence,
        };
        self.current = Some(query.sequence);
        self.abort_in_flight();

        if let Some(candidates) = self.cache.get(&query.normalized) {
            log::debug!(
                "Cache hit for '{}' (seq {}): {} candidates",
                query.normalized,
                query.sequence,
                candidates.len()
            );
            return Dispatch::Ready(LookupResponse {
                query,
                source: ResponseSource::Cache,
                outcome: Ok(candidates),
            });
        }

        log::debug!(
            "Cache miss for '{}' (seq {}), asking {}",
            query.normalized,
            query.sequence,
            self.provider.name()
        );
        self.provider_calls += 1;

        let provider = Arc::clone(&self.provider);
        let ranker = self.ranker;
        let response_tx = self.response_tx.clone();
        let task_query = query.clone();
        let handle = tokio::spawn(async move {
            let outcome = provider
                .lookup(&task_query.normalized)
                .await
                .map(|records| ranker.rank(records));
            let _ = response_tx.send(LookupResponse {
                query: task_query,
                source: ResponseSource::Provider,
                outcome,
            });
        });
        self.in_flight = Some(InFlight {
            sequence: query.sequence,
            key: query.normalized.clone(),
            handle,
        });

        Dispatch::InFlight(query)
    }

    /// Forget the current query. Whatever is still running can finish, but
    /// its response will be dropped.
    pub fn abandon(&mut self) {
        if let Some(sequence) = self.current.take() {
            log::debug!("Abandoning lookup seq {sequence}");
        }
        self.abort_in_flight();
    }

    /// Apply a response to the session if it still belongs to the newest
    /// query and is newer than anything committed.
    pub fn resolve(&mut self, response: LookupResponse, session: &mut SearchSession) -> Resolution {
        let LookupResponse {
            query,
            source,
            outcome,
        } = response;

        if self
            .in_flight
            .as_ref()
            .is_some_and(|running| running.sequence == query.sequence)
        {
            self.in_flight = None;
        }

        if self.current != Some(query.sequence)
            || query.sequence <= session.last_committed_sequence()
        {
            log::debug!(
                "Dropping superseded response for '{}' (seq {}, current {:?}, committed {})",
                query.normalized,
                query.sequence,
                self.current,
                session.last_committed_sequence()
            );
            return Resolution::Superseded;
        }

        match outcome {
            Ok(candidates) => {
                if source == ResponseSource::Provider {
                    self.cache.insert(query.normalized.clone(), candidates.clone());
                }
                match session.commit_success(query.sequence, candidates) {
                    Applied::Committed => Resolution::Committed,
                    Applied::Superseded => Resolution::Superseded,
                }
            }
            Err(err) => {
                log::warn!("Lookup for '{}' failed: {err}", query.normalized);
                match session.commit_failure(query.sequence, &query.normalized) {
                    Applied::Committed => Resolution::Failed,
                    Applied::Superseded => Resolution::Superseded,
                }
            }
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(running) = self.in_flight.take() {
            running.handle.abort();
        }
    }
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use typeahead_protocol::{Phase, RawRecord};

    fn coordinator(
        provider: Arc<ScriptedProvider>,
    ) -> (RequestCoordinator, mpsc::UnboundedReceiver<LookupResponse>, QueryCache) {
        let cache = QueryCache::new(16, Duration::from_secs(60));
        let (coordinator, rx) =
            RequestCoordinator::new(provider, cache.clone(), CandidateRanker::new(8));
        (coordinator, rx, cache)
    }

    #[tokio::test]
    async fn cache_hit_resolves_without_provider() {
        let provider = Arc::new(
            ScriptedProvider::new().with_records("acme", vec![RawRecord::new("1", "Acme", 3)]),
        );
        let (mut coordinator, mut rx, _cache) = coordinator(provider.clone());
        let mut session = SearchSession::new();

        let Dispatch::InFlight(_) = coordinator.submit("Acme", "acme") else {
            panic!("first submit must miss");
        };
        let response = rx.recv().await.unwrap();
        assert_eq!(
            coordinator.resolve(response, &mut session),
            Resolution::Committed
        );

        let Dispatch::Ready(response) = coordinator.submit("ACME ", "acme") else {
            panic!("second submit must hit the cache");
        };
        assert_eq!(response.source, ResponseSource::Cache);
        assert_eq!(response.query.sequence, 2);
        assert_eq!(
            coordinator.resolve(response, &mut session),
            Resolution::Committed
        );
        assert_eq!(provider.calls(), vec!["acme".to_string()]);
        assert_eq!(coordinator.provider_calls(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let provider = Arc::new(
            ScriptedProvider::new().with_failure("acme", "connection reset"),
        );
        let (mut coordinator, mut rx, cache) = coordinator(provider.clone());
        let mut session = SearchSession::new();

        coordinator.submit("acme", "acme");
        let response = rx.recv().await.unwrap();
        assert_eq!(coordinator.resolve(response, &mut session), Resolution::Failed);
        assert_eq!(
            session.phase(),
            &Phase::Error {
                query: "acme".to_string()
            }
        );
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn abandoned_response_is_dropped() {
        let provider = Arc::new(
            ScriptedProvider::new().with_records("acme", vec![RawRecord::new("1", "Acme", 3)]),
        );
        let (mut coordinator, _rx, cache) = coordinator(provider);
        let mut session = SearchSession::new();

        let Dispatch::InFlight(query) = coordinator.submit("acme", "acme") else {
            panic!("expected miss");
        };
        coordinator.abandon();
        assert!(!coordinator.has_in_flight());

        let late = LookupResponse {
            query,
            source: ResponseSource::Provider,
            outcome: Ok(vec![Candidate::new("1", "Acme", 3)]),
        };
        assert_eq!(coordinator.resolve(late, &mut session), Resolution::Superseded);
        assert!(session.candidates().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn in_flight_key_tracks_the_running_lookup() {
        let provider = Arc::new(
            ScriptedProvider::new().with_records("acme", vec![RawRecord::new("1", "Acme", 3)]),
        );
        let (mut coordinator, mut rx, _cache) = coordinator(provider);
        let mut session = SearchSession::new();
        assert_eq!(coordinator.in_flight_key(), None);

        coordinator.submit("Acme ", "acme");
        assert_eq!(coordinator.in_flight_key(), Some("acme"));

        let response = rx.recv().await.unwrap();
        coordinator.resolve(response, &mut session);
        assert_eq!(coordinator.in_flight_key(), None);

        coordinator.submit("acme co", "acme co");
        coordinator.abandon();
        assert_eq!(coordinator.in_flight_key(), None);
    }

    #[tokio::test]
    async fn sequences_increase_per_submit() {
        let provider = Arc::new(ScriptedProvider::new());
        let (mut coordinator, _rx, _cache) = coordinator(provider);
        let first = coordinator.submit("ab", "ab");
        let second = coordinator.submit("abc", "abc");
        let seq = |dispatch: &Dispatch| match dispatch {
            Dispatch::Ready(response) => response.query.sequence,
            Dispatch::InFlight(query) => query.sequence,
        };
        assert!(seq(&second) > seq(&first));
        assert_eq!(coordinator.current_sequence(), Some(seq(&second)));
    }
}
