use crate::cache::QueryCache;
use crate::config::SuggestConfig;
use crate::coordinator::{Dispatch, LookupResponse, RequestCoordinator, Resolution};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::normalize::{Normalized, QueryNormalizer};
use crate::provider::SuggestionProvider;
use crate::rank::CandidateRanker;
use crate::session::SearchSession;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use typeahead_protocol::{Candidate, Phase, SessionSnapshot};

/// One search box: normalizer, debouncer, coordinator and session wired
/// together. Every method is one discrete step; nothing here runs
/// concurrently with anything else for the same engine.
pub struct TypeaheadEngine {
    normalizer: QueryNormalizer,
    debouncer: Debouncer,
    coordinator: RequestCoordinator,
    session: SearchSession,
    response_rx: mpsc::UnboundedReceiver<LookupResponse>,
}

impl TypeaheadEngine {
    pub fn new(
        provider: Arc<dyn SuggestionProvider>,
        cache: QueryCache,
        config: &SuggestConfig,
    ) -> Self {
        let (coordinator, response_rx) =
            RequestCoordinator::new(provider, cache, CandidateRanker::new(config.max_results));
        Self {
            normalizer: QueryNormalizer::new(config.min_query_chars),
            debouncer: Debouncer::new(config.debounce()),
            coordinator,
            session: SearchSession::new(),
            response_rx,
        }
    }

    pub const fn session(&self) -> &SearchSession {
        &self.session
    }

    pub const fn phase(&self) -> &Phase {
        self.session.phase()
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.session.candidates()
    }

    pub const fn selected(&self) -> Option<&Candidate> {
        self.session.selected()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub const fn provider_calls(&self) -> u64 {
        self.coordinator.provider_calls()
    }

    /// When the pending keystroke becomes due, if one is pending.
    pub const fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub const fn has_in_flight(&self) -> bool {
        self.coordinator.has_in_flight()
    }

    pub fn on_text_changed(&mut self, raw: &str) {
        if *self.session.phase() == Phase::Selected && raw == self.session.text() {
            // Echo of the picked name written back into the box.
            return;
        }

        match self.normalizer.normalize(raw) {
            Normalized::BelowThreshold => {
                self.debouncer.cancel();
                self.coordinator.abandon();
                self.session.reset_idle(raw);
            }
            Normalized::Key(key) if self.coordinator.in_flight_key() == Some(key.as_str()) => {
                // Same key is already being looked up; its answer still applies.
                self.session.retext(raw);
            }
            Normalized::Key(key) => {
                self.coordinator.abandon();
                self.session.start_typing(raw);
                self.debouncer.schedule(raw, key, Instant::now());
            }
        }
    }

    pub fn on_candidate_chosen(&mut self, id: &str) -> Result<Candidate> {
        let picked = self.session.choose(id);
        if let Err(err) = &picked {
            log::warn!("Ignoring pick of '{id}': {err}");
        }
        picked
    }

    /// Issue the pending lookup if its quiet interval has elapsed.
    pub fn fire_due(&mut self) -> bool {
        let Some(pending) = self.debouncer.take_due(Instant::now()) else {
            return false;
        };
        self.session.begin_loading();
        match self.coordinator.submit(pending.raw, pending.key) {
            Dispatch::Ready(response) => {
                self.coordinator.resolve(response, &mut self.session);
            }
            Dispatch::InFlight(_) => {}
        }
        true
    }

    /// Skip the rest of the quiet interval and issue the pending lookup now.
    pub fn flush(&mut self) -> bool {
        self.debouncer.force(Instant::now()) && self.fire_due()
    }

    /// Next provider response. Cancel-safe; pends forever while idle.
    pub async fn next_response(&mut self) -> Option<LookupResponse> {
        self.response_rx.recv().await
    }

    pub fn handle_response(&mut self, response: LookupResponse) -> Resolution {
        self.coordinator.resolve(response, &mut self.session)
    }

    /// Wait for the in-flight lookup, if any, and apply it.
    pub async fn settle(&mut self) -> Option<Resolution> {
        while self.coordinator.has_in_flight() {
            let response = self.response_rx.recv().await?;
            let resolution = self.handle_response(response);
            if resolution != Resolution::Superseded {
                return Some(resolution);
            }
        }
        None
    }

    /// Destroy the session's pending work: no timer fires and no lookup
    /// commits after this.
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.coordinator.abandon();
    }
}
