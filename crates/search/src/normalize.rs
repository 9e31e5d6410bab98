/// A query as submitted to the coordinator.
///
/// `sequence` is the only ordering authority between queries: responses may
/// arrive in any order, and only the integer comparison decides which one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    pub normalized: String,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Key(String),
    /// Too short to search; the session falls back to idle
    BelowThreshold,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryNormalizer {
    min_chars: usize,
}

impl QueryNormalizer {
    pub const fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// Trim, lowercase, collapse internal whitespace runs to one space.
    pub fn normalize(&self, raw: &str) -> Normalized {
        let key = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");

        if key.chars().count() < self.min_chars {
            Normalized::BelowThreshold
        } else {
            Normalized::Key(key)
        }
    }
}
