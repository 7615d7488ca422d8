//! Read-only Quran text endpoints.
use super::client::{ApiClient, ApiError};
use crate::models::{Surah, Verse};

pub struct QuranApi<'a> {
    client: &'a ApiClient,
}

impl<'a> QuranApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub fn surahs(&self) -> Result<Vec<Surah>, ApiError> {
        self.client.get("/sourates")
    }

    pub fn surah(&self, number: u32) -> Result<Surah, ApiError> {
        self.client.get(&format!("/sourates/{}", number))
    }

    pub fn verses(&self, surah_number: u32) -> Result<Vec<Verse>, ApiError> {
        self.client
            .get(&format!("/versets/sourate/{}", surah_number))
    }

    pub fn verse(&self, surah_number: u32, verse_number: u32) -> Result<Verse, ApiError> {
        self.client.get(&format!(
            "/versets/sourate/{}/verset/{}",
            surah_number, verse_number
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::MockServer;

    #[test]
    fn test_verse_path() {
        let verse = r#"{
  "id": "v",
  "sourateNumero": 112,
  "versetNumero": 1,
  "texteArabe": "قُلْ هُوَ اللَّهُ أَحَدٌ",
  "translitteration": "Qul huwa Allahu ahad",
  "traduction": null,
  "audioUrl": null
}"#;
        let server = MockServer::start(vec![(200, verse), (200, "[]")]);
        let client = ApiClient::new(&server.base_url).unwrap();
        let api = QuranApi::new(&client);

        let verse = api.verse(112, 1).unwrap();
        assert_eq!(verse.transliteration.as_deref(), Some("Qul huwa Allahu ahad"));
        assert!(api.surahs().unwrap().is_empty());

        let requests = server.requests();
        assert_eq!(requests[0].url, "/versets/sourate/112/verset/1");
        assert_eq!(requests[1].url, "/sourates");
    }
}
