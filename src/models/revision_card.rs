//! Wrapper for a due memorization that tracks the outcome within a revision session.
use super::MemorizationRecord;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug)]
pub struct RevisionCard {
    pub record: MemorizationRecord,
    pub is_recalled: bool,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl RevisionCard {
    pub fn new(record: MemorizationRecord) -> Self {
        Self {
            record,
            is_recalled: false,
            last_reviewed_at: None,
        }
    }

    pub fn mark_as_recalled(&mut self, at: DateTime<Utc>) {
        self.is_recalled = true;
        self.last_reviewed_at = Some(at);
    }
}
