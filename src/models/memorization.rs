//! Memorization progress of a single verse, as stored by the API and the local database.
use super::scheduler::{HIGH_MASTERY, next_revision_date_from};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemorizationStatus {
    #[serde(rename = "en_cours")]
    InProgress,
    #[serde(rename = "memorise")]
    Memorized,
    #[serde(rename = "a_reviser")]
    NeedsRevision,
}

impl MemorizationStatus {
    /// Name used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "en_cours",
            Self::Memorized => "memorise",
            Self::NeedsRevision => "a_reviser",
        }
    }
}

impl fmt::Display for MemorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MemorizationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_cours" => Ok(Self::InProgress),
            "memorise" => Ok(Self::Memorized),
            "a_reviser" => Ok(Self::NeedsRevision),
            other => Err(format!("unknown memorization status '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorizationRecord {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "versetId")]
    pub verse_id: String,
    #[serde(rename = "sourateNumero")]
    pub surah_number: u32,
    #[serde(rename = "versetNumero")]
    pub verse_number: u32,
    #[serde(rename = "statut")]
    pub status: MemorizationStatus,
    #[serde(rename = "niveauMaitrise")]
    pub mastery_level: i32,
    #[serde(rename = "exercicesTotal")]
    pub exercises_total: u32,
    #[serde(rename = "exercicesReussis")]
    pub exercises_succeeded: u32,
    #[serde(rename = "serieReussites", default)]
    pub consecutive_success_count: i32,
    #[serde(rename = "derniereRevision", default)]
    pub last_revision: Option<DateTime<Utc>>,
    #[serde(rename = "prochaineRevision", default)]
    pub next_revision: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemorizationRecord {
    /// Fresh record for a verse the learner just started memorizing.
    pub fn new(id: String, user_id: String, verse: &NewMemorization, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            verse_id: verse.verse_id.clone(),
            surah_number: verse.surah_number,
            verse_number: verse.verse_number,
            status: MemorizationStatus::InProgress,
            mastery_level: 0,
            exercises_total: 0,
            exercises_succeeded: 0,
            consecutive_success_count: 0,
            last_revision: None,
            next_revision: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A verse with no scheduled revision is always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_revision.is_none_or(|next| next <= now)
    }

    /// Applies a correct exercise and schedules the next revision in local time.
    pub fn record_success(&mut self, now: DateTime<Utc>) {
        self.record_success_in(now.with_timezone(&Local));
    }

    /// Same as [`record_success`](Self::record_success), with calendar days
    /// counted in the time zone of `now`.
    pub fn record_success_in<Tz: TimeZone>(&mut self, now: DateTime<Tz>) {
        self.exercises_total = self.exercises_total.saturating_add(1);
        self.exercises_succeeded = self.exercises_succeeded.saturating_add(1);
        self.consecutive_success_count = self.consecutive_success_count.max(0).saturating_add(1);
        self.mastery_level = mastery_from_exercises(self.exercises_succeeded, self.exercises_total);

        self.status = if self.mastery_level >= HIGH_MASTERY {
            MemorizationStatus::Memorized
        } else {
            MemorizationStatus::InProgress
        };

        let next = next_revision_date_from(
            now.clone(),
            self.mastery_level,
            self.consecutive_success_count,
        );
        let now = now.with_timezone(&Utc);
        self.last_revision = Some(now);
        self.next_revision = Some(next.with_timezone(&Utc));
        self.updated_at = now;
    }

    /// Applies a failed exercise. The streak restarts and the verse stays due.
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.exercises_total = self.exercises_total.saturating_add(1);
        self.consecutive_success_count = 0;
        self.mastery_level = mastery_from_exercises(self.exercises_succeeded, self.exercises_total);

        if self.status == MemorizationStatus::Memorized {
            self.status = MemorizationStatus::NeedsRevision;
        }

        self.last_revision = Some(now);
        self.next_revision = Some(now);
        self.updated_at = now;
    }

    /// Formats "surah:verse", e.g. "2:255".
    pub fn reference(&self) -> String {
        format!("{}:{}", self.surah_number, self.verse_number)
    }
}

/// Percentage of successful exercises, rounded down.
/// Inconsistent counts (more successes than exercises) go above 100.
pub fn mastery_from_exercises(succeeded: u32, total: u32) -> i32 {
    if total == 0 {
        return 0;
    }
    i32::try_from(u64::from(succeeded) * 100 / u64::from(total)).unwrap_or(i32::MAX)
}

/// Body of a "start memorizing" request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewMemorization {
    #[serde(rename = "versetId")]
    pub verse_id: String,
    #[serde(rename = "sourateNumero")]
    pub surah_number: u32,
    #[serde(rename = "versetNumero")]
    pub verse_number: u32,
}

/// Partial update of a memorization. Absent fields are left untouched by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorizationUpdate {
    #[serde(rename = "statut", skip_serializing_if = "Option::is_none")]
    pub status: Option<MemorizationStatus>,
    #[serde(rename = "niveauMaitrise", skip_serializing_if = "Option::is_none")]
    pub mastery_level: Option<i32>,
    #[serde(rename = "exercicesTotal", skip_serializing_if = "Option::is_none")]
    pub exercises_total: Option<u32>,
    #[serde(rename = "exercicesReussis", skip_serializing_if = "Option::is_none")]
    pub exercises_succeeded: Option<u32>,
    #[serde(rename = "serieReussites", skip_serializing_if = "Option::is_none")]
    pub consecutive_success_count: Option<i32>,
    #[serde(rename = "prochaineRevision", skip_serializing_if = "Option::is_none")]
    pub next_revision: Option<DateTime<Utc>>,
}

impl MemorizationUpdate {
    /// Update carrying every field a revision can change.
    pub fn from_record(record: &MemorizationRecord) -> Self {
        Self {
            status: Some(record.status),
            mastery_level: Some(record.mastery_level),
            exercises_total: Some(record.exercises_total),
            exercises_succeeded: Some(record.exercises_succeeded),
            consecutive_success_count: Some(record.consecutive_success_count),
            next_revision: record.next_revision,
        }
    }
}

/// Dashboard figures over all memorizations of a learner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorizationSummary {
    pub total: usize,
    pub memorized: usize,
    pub in_progress: usize,
    pub needs_revision: usize,
    pub average_mastery: i32,
    pub exercises_total: u64,
    pub exercises_succeeded: u64,
}

impl MemorizationSummary {
    pub fn from_records(records: &[MemorizationRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Default::default()
        };
        let mut mastery_sum: i64 = 0;

        for record in records {
            match record.status {
                MemorizationStatus::Memorized => summary.memorized += 1,
                MemorizationStatus::InProgress => summary.in_progress += 1,
                MemorizationStatus::NeedsRevision => summary.needs_revision += 1,
            }
            mastery_sum += i64::from(record.mastery_level);
            summary.exercises_total += u64::from(record.exercises_total);
            summary.exercises_succeeded += u64::from(record.exercises_succeeded);
        }

        if !records.is_empty() {
            summary.average_mastery = mastery_sum.div_euclid(records.len() as i64) as i32;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use chrono_tz::Europe::Paris;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn create_test_record() -> MemorizationRecord {
        MemorizationRecord::new(
            "m1".to_string(),
            "u1".to_string(),
            &NewMemorization {
                verse_id: "v-1-2".to_string(),
                surah_number: 1,
                verse_number: 2,
            },
            now(),
        )
    }

    #[test]
    fn test_new_record_is_due() {
        let record = create_test_record();
        assert_eq!(record.status, MemorizationStatus::InProgress);
        assert_eq!(record.mastery_level, 0);
        assert!(record.is_due(now()));
        assert_eq!(record.reference(), "1:2");
    }

    #[test]
    fn test_first_success() {
        let mut record = create_test_record();
        record.record_success_in(now());

        assert_eq!(record.exercises_total, 1);
        assert_eq!(record.exercises_succeeded, 1);
        assert_eq!(record.consecutive_success_count, 1);
        assert_eq!(record.mastery_level, 100);
        assert_eq!(record.status, MemorizationStatus::Memorized);
        // streak 1 at mastery 100: 1 day doubled
        assert_eq!(record.next_revision, Some(now() + Duration::days(2)));
        assert!(!record.is_due(now()));
        assert!(record.is_due(now() + Duration::days(2)));
    }

    #[test]
    fn test_failure_resets_streak() {
        let mut record = create_test_record();
        record.record_success_in(now());
        record.record_success_in(now());
        record.record_failure(now());

        assert_eq!(record.consecutive_success_count, 0);
        assert_eq!(record.exercises_total, 3);
        assert_eq!(record.exercises_succeeded, 2);
        assert_eq!(record.mastery_level, 66);
        assert_eq!(record.status, MemorizationStatus::NeedsRevision);
        assert_eq!(record.next_revision, Some(now()));
        assert!(record.is_due(now()));
    }

    #[test]
    fn test_success_after_failure_uses_mid_mastery() {
        let mut record = create_test_record();
        record.record_failure(now());
        record.record_success_in(now());
        record.record_success_in(now());

        // 2 of 3 exercises: mastery 66, streak 2 -> 3 days unchanged
        assert_eq!(record.mastery_level, 66);
        assert_eq!(record.status, MemorizationStatus::InProgress);
        assert_eq!(record.next_revision, Some(now() + Duration::days(3)));
    }

    #[test]
    fn test_mastery_from_exercises() {
        assert_eq!(mastery_from_exercises(0, 0), 0);
        assert_eq!(mastery_from_exercises(1, 3), 33);
        assert_eq!(mastery_from_exercises(4, 5), 80);
        assert_eq!(mastery_from_exercises(7, 7), 100);
    }

    #[test]
    fn test_mastery_with_more_successes_than_exercises() {
        assert_eq!(mastery_from_exercises(u32::MAX, 1), i32::MAX);
        assert_eq!(mastery_from_exercises(3, 2), 150);
    }

    #[test]
    fn test_success_keeps_wall_clock_across_dst() {
        // Paris switches to summer time on 2024-03-31
        let now = Paris.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();
        let mut record = create_test_record();
        record.record_success_in(now);

        // streak 1 at mastery 100: 2 calendar days, 47 hours
        let expected = Paris.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        assert_eq!(record.next_revision, Some(expected.with_timezone(&Utc)));
        assert_eq!(record.last_revision, Some(now.with_timezone(&Utc)));
        assert_eq!(
            record.next_revision.unwrap() - now.with_timezone(&Utc),
            Duration::hours(47)
        );
    }

    #[test]
    fn test_success_uses_local_calendar() {
        let mut local = create_test_record();
        local.record_success(now());
        let mut explicit = create_test_record();
        explicit.record_success_in(now().with_timezone(&Local));

        assert_eq!(local, explicit);
    }

    #[test]
    fn test_counters_saturate() {
        let json = r#"{
  "id": "abc",
  "userId": "u1",
  "versetId": "v9",
  "sourateNumero": 112,
  "versetNumero": 3,
  "statut": "memorise",
  "niveauMaitrise": 100,
  "exercicesTotal": 4294967295,
  "exercicesReussis": 4294967295,
  "serieReussites": 2147483647,
  "createdAt": "2024-04-01T10:00:00Z",
  "updatedAt": "2024-05-01T08:00:00Z"
}"#;
        let mut record: MemorizationRecord = serde_json::from_str(json).unwrap();
        record.record_success_in(now());

        assert_eq!(record.consecutive_success_count, i32::MAX);
        assert_eq!(record.exercises_total, u32::MAX);
        assert_eq!(record.exercises_succeeded, u32::MAX);
        assert_eq!(record.mastery_level, 100);
        // streak >= 5 at mastery 100: 60 days
        assert_eq!(record.next_revision, Some(now() + Duration::days(60)));

        record.record_failure(now());
        assert_eq!(record.exercises_total, u32::MAX);
        assert_eq!(record.consecutive_success_count, 0);
    }

    #[test]
    fn test_wire_names() {
        let json = r#"{
  "id": "abc",
  "userId": "u1",
  "versetId": "v9",
  "sourateNumero": 112,
  "versetNumero": 3,
  "statut": "a_reviser",
  "niveauMaitrise": 45,
  "exercicesTotal": 9,
  "exercicesReussis": 4,
  "derniereRevision": null,
  "prochaineRevision": "2024-05-03T08:00:00Z",
  "createdAt": "2024-04-01T10:00:00Z",
  "updatedAt": "2024-05-01T08:00:00Z"
}"#;

        let record: MemorizationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.surah_number, 112);
        assert_eq!(record.status, MemorizationStatus::NeedsRevision);
        assert_eq!(record.consecutive_success_count, 0);
        assert_eq!(record.last_revision, None);
        assert_eq!(
            record.next_revision,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_update_skips_missing_fields() {
        let update = MemorizationUpdate {
            mastery_level: Some(70),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({ "niveauMaitrise": 70 }));
    }

    #[test]
    fn test_update_from_record() {
        let mut record = create_test_record();
        record.record_success_in(now());
        let value = serde_json::to_value(MemorizationUpdate::from_record(&record)).unwrap();

        assert_eq!(value["statut"], "memorise");
        assert_eq!(value["serieReussites"], 1);
        assert_eq!(value["prochaineRevision"], "2024-05-03T08:00:00Z");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "en_cours".parse::<MemorizationStatus>(),
            Ok(MemorizationStatus::InProgress)
        );
        assert!("done".parse::<MemorizationStatus>().is_err());
        assert_eq!(MemorizationStatus::Memorized.to_string(), "memorise");
    }

    #[test]
    fn test_summary() {
        let mut a = create_test_record();
        a.record_success(now());
        let mut b = create_test_record();
        b.record_success(now());
        b.record_failure(now());
        let c = create_test_record();

        let summary = MemorizationSummary::from_records(&[a, b, c]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.memorized, 1);
        assert_eq!(summary.needs_revision, 1);
        assert_eq!(summary.in_progress, 1);
        // (100 + 50 + 0) / 3
        assert_eq!(summary.average_mastery, 50);
        assert_eq!(summary.exercises_total, 3);
        assert_eq!(summary.exercises_succeeded, 2);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(
            MemorizationSummary::from_records(&[]),
            MemorizationSummary::default()
        );
    }
}
