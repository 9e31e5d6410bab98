use crate::error::{Result, SearchError};
use typeahead_protocol::{Candidate, Phase, SessionSnapshot, SNAPSHOT_SCHEMA_VERSION};

/// Outcome of offering a lookup result to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Committed,
    /// An equal or newer sequence was already committed
    Superseded,
}

/// The visible state of one search box. Only the engine mutates it.
#[derive(Debug, Clone)]
pub struct SearchSession {
    text: String,
    phase: Phase,
    last_committed_sequence: u64,
    candidates: Vec<Candidate>,
    selected: Option<Candidate>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            phase: Phase::Idle,
            last_committed_sequence: 0,
            candidates: Vec::new(),
            selected: None,
        }
    }

    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub const fn selected(&self) -> Option<&Candidate> {
        self.selected.as_ref()
    }

    pub const fn last_committed_sequence(&self) -> u64 {
        self.last_committed_sequence
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            text: self.text.clone(),
            phase: self.phase.clone(),
            candidates: self.candidates.clone(),
            selected: self.selected.clone(),
            last_committed_sequence: self.last_committed_sequence,
        }
    }

    /// Any state -> Idle: input cleared or below threshold.
    pub(crate) fn reset_idle(&mut self, text: &str) {
        self.text = text.to_string();
        self.candidates.clear();
        self.selected = None;
        self.transition(Phase::Idle);
    }

    /// Keystroke at or above threshold. Drops a frozen selection; keeps
    /// already committed candidates on screen until something newer lands.
    pub(crate) fn start_typing(&mut self, text: &str) {
        self.text = text.to_string();
        self.selected = None;
        self.transition(Phase::Typing);
    }

    /// Edit that leaves the normalized key unchanged; the phase stays as is.
    pub(crate) fn retext(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub(crate) fn begin_loading(&mut self) {
        self.transition(Phase::Loading);
    }

    pub(crate) fn commit_success(&mut self, sequence: u64, candidates: Vec<Candidate>) -> Applied {
        if sequence <= self.last_committed_sequence {
            return Applied::Superseded;
        }
        self.last_committed_sequence = sequence;
        self.candidates = candidates;
        self.transition(Phase::Resolved);
        Applied::Committed
    }

    pub(crate) fn commit_failure(&mut self, sequence: u64, query: &str) -> Applied {
        if sequence <= self.last_committed_sequence {
            return Applied::Superseded;
        }
        self.last_committed_sequence = sequence;
        self.candidates.clear();
        self.transition(Phase::Error {
            query: query.to_string(),
        });
        Applied::Committed
    }

    /// Resolved -> Selected. Clears the list and freezes the pick.
    pub(crate) fn choose(&mut self, id: &str) -> Result<Candidate> {
        if self.phase != Phase::Resolved {
            return Err(SearchError::SelectionUnavailable(self.phase.name()));
        }
        let picked = self
            .candidates
            .iter()
            .find(|candidate| candidate.id == id)
            .cloned()
            .ok_or_else(|| SearchError::UnknownCandidate(id.to_string()))?;

        self.text = picked.display_name.clone();
        self.candidates.clear();
        self.selected = Some(picked.clone());
        self.transition(Phase::Selected);
        Ok(picked)
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            log::debug!("Session: {} -> {}", self.phase.name(), next.name());
        }
        self.phase = next;
    }
}
