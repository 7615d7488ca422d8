//! Reading position endpoints.
use super::client::{ApiClient, ApiError};
use crate::models::ReadingPosition;
use serde::Serialize;

#[derive(Serialize)]
struct SavePosition {
    #[serde(rename = "sourateNumero")]
    surah_number: u32,
    #[serde(rename = "versetNumero")]
    verse_number: u32,
}

pub struct ProgressApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProgressApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Last reading position, or None when the user never saved one.
    pub fn reading_position(&self, user_id: &str) -> Result<Option<ReadingPosition>, ApiError> {
        match self.client.get(&format!("/users/{}/save", user_id)) {
            Ok(position) => Ok(Some(position)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save_reading_position(
        &self,
        user_id: &str,
        surah_number: u32,
        verse_number: u32,
    ) -> Result<ReadingPosition, ApiError> {
        self.client.put(
            &format!("/users/{}/save", user_id),
            &SavePosition {
                surah_number,
                verse_number,
            },
        )
    }
}
