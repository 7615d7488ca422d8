//! Memorization endpoints of the REST API.
use super::client::{ApiClient, ApiError};
use crate::models::{
    MemorizationRecord, MemorizationStore, MemorizationUpdate, NewMemorization,
};
use anyhow::Result;
use chrono::{DateTime, Utc};

pub struct MemorizationApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MemorizationApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// All verses the user is memorizing.
    pub fn list(&self, user_id: &str) -> Result<Vec<MemorizationRecord>, ApiError> {
        self.client.get(&format!("/users/{}/memorizations", user_id))
    }

    /// Verses the server considers due for revision.
    pub fn revisions(&self, user_id: &str) -> Result<Vec<MemorizationRecord>, ApiError> {
        self.client
            .get(&format!("/users/{}/memorizations/revisions", user_id))
    }

    pub fn get(&self, user_id: &str, id: &str) -> Result<MemorizationRecord, ApiError> {
        self.client
            .get(&format!("/users/{}/memorizations/{}", user_id, id))
    }

    /// Starts memorizing a new verse.
    pub fn create(
        &self,
        user_id: &str,
        verse: &NewMemorization,
    ) -> Result<MemorizationRecord, ApiError> {
        self.client
            .post(&format!("/users/{}/memorizations", user_id), verse)
    }

    pub fn update(
        &self,
        user_id: &str,
        id: &str,
        update: &MemorizationUpdate,
    ) -> Result<MemorizationRecord, ApiError> {
        self.client
            .put(&format!("/users/{}/memorizations/{}", user_id, id), update)
    }

    pub fn delete(&self, user_id: &str, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/users/{}/memorizations/{}", user_id, id))
    }
}

/// Revision session store backed by the remote API for one user.
pub struct RemoteStore<'a> {
    api: MemorizationApi<'a>,
    user_id: String,
}

impl<'a> RemoteStore<'a> {
    pub fn new(client: &'a ApiClient, user_id: impl Into<String>) -> Self {
        Self {
            api: MemorizationApi::new(client),
            user_id: user_id.into(),
        }
    }
}

impl MemorizationStore for RemoteStore<'_> {
    /// The server decides what is due; records it returns with a future date are dropped.
    fn due_for_revision(&self, now: DateTime<Utc>) -> Result<Vec<MemorizationRecord>> {
        let mut due = self.api.revisions(&self.user_id)?;
        due.retain(|record| record.is_due(now));
        Ok(due)
    }

    fn save_revision(&self, record: &MemorizationRecord) -> Result<()> {
        self.api.update(
            &self.user_id,
            &record.id,
            &MemorizationUpdate::from_record(record),
        )?;
        Ok(())
    }
}
