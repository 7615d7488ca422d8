//! Quran text as served by the API: surahs, their verses and the learner's reading position.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surah {
    pub id: String,
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "nomArabe")]
    pub arabic_name: String,
    #[serde(rename = "nomTranslitteration")]
    pub transliterated_name: String,
    #[serde(rename = "nomTraduction")]
    pub translated_name: String,
    #[serde(rename = "nombreVersets")]
    pub verse_count: u32,
    pub revelation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: String,
    #[serde(rename = "sourateNumero")]
    pub surah_number: u32,
    #[serde(rename = "versetNumero")]
    pub verse_number: u32,
    #[serde(rename = "texteArabe")]
    pub arabic_text: String,
    #[serde(rename = "translitteration", default)]
    pub transliteration: Option<String>,
    #[serde(rename = "traduction", default)]
    pub translation: Option<String>,
    #[serde(rename = "audioUrl", default)]
    pub audio_url: Option<String>,
}

/// Last verse the learner read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReadingPosition {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "sourateNumero")]
    pub surah_number: u32,
    #[serde(rename = "versetNumero")]
    pub verse_number: u32,
    #[serde(rename = "lastReadAt")]
    pub last_read_at: DateTime<Utc>,
}
