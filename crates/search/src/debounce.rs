use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub raw: String,
    pub key: String,
}

/// Holds at most one pending query and the instant it becomes due.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<PendingQuery>,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            deadline: None,
        }
    }

    pub const fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replace whatever was pending and restart the quiet interval.
    pub fn schedule(&mut self, raw: impl Into<String>, key: impl Into<String>, now: Instant) {
        self.pending = Some(PendingQuery {
            raw: raw.into(),
            key: key.into(),
        });
        self.deadline = Some(now + self.quiet);
    }

    /// Make the pending query due immediately (e.g. the user pressed enter).
    pub fn force(&mut self, now: Instant) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.deadline = Some(now);
        true
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline = None;
        self.pending.take().is_some()
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take_due(&mut self, now: Instant) -> Option<PendingQuery> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }
}
