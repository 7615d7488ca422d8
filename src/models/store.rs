use super::MemorizationRecord;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Persistence used by revision sessions, backed by the local database or the remote API.
pub trait MemorizationStore {
    /// Memorizations whose next revision is due at `now`.
    fn due_for_revision(&self, now: DateTime<Utc>) -> Result<Vec<MemorizationRecord>>;

    /// Persists the progress and next revision date of a revised memorization.
    fn save_revision(&self, record: &MemorizationRecord) -> Result<()>;
}
