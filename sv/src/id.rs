//! Snippet identifier generation
//!
//! Ids are derived from the creation time in Unix milliseconds. Two creates
//! inside the same millisecond (or a clock that steps backwards) would
//! collide, so every id is also forced past the largest one seen so far.

use chrono::{DateTime, Utc};

use crate::snippet::SnippetId;

#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: SnippetId,
}

impl IdGenerator {
    /// Start after the largest id in `existing`
    pub fn after<'a>(existing: impl IntoIterator<Item = &'a SnippetId>) -> Self {
        let mut ids = Self::default();
        for id in existing {
            ids.observe(*id);
        }
        ids
    }

    /// Record an id that is already in use
    pub fn observe(&mut self, id: SnippetId) {
        self.last = self.last.max(id);
    }

    /// Next identifier for a record created at `now`
    pub fn next_id(&mut self, now: DateTime<Utc>) -> SnippetId {
        let from_clock = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = from_clock.max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}
