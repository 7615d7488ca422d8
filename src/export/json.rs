//! JSON backup of memorization records.
//! Saves and restores the local memorization progress to/from JSON files.

use crate::models::MemorizationRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Backup format version written by this build.
pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported backup version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub memorizations: Vec<MemorizationRecord>,
}

/// Exports records to a JSON file at the specified path.
pub fn export_json_to_path(records: &[MemorizationRecord], path: &Path) -> Result<(), ExportError> {
    let backup = Backup {
        version: BACKUP_VERSION,
        exported_at: Utc::now(),
        memorizations: records.to_vec(),
    };

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &backup)?;
    writer.flush()?;

    log::info!("Exported {} memorizations to {}", records.len(), path.display());
    Ok(())
}

/// Imports records from a JSON backup file.
/// Returns an error if the file doesn't exist, contains invalid JSON or comes from a newer version.
pub fn import_json(path: &Path) -> Result<Vec<MemorizationRecord>, ExportError> {
    let reader = BufReader::new(File::open(path)?);
    let backup: Backup = serde_json::from_reader(reader)?;

    if backup.version > BACKUP_VERSION {
        return Err(ExportError::UnsupportedVersion(backup.version));
    }

    log::info!(
        "Imported {} memorizations from {}",
        backup.memorizations.len(),
        path.display()
    );
    Ok(backup.memorizations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemorizationStatus, NewMemorization};
    use chrono::TimeZone;
    use std::fs;

    fn create_test_records() -> Vec<MemorizationRecord> {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut memorized = MemorizationRecord::new(
            "m1".to_string(),
            "u1".to_string(),
            &NewMemorization {
                verse_id: "v1".to_string(),
                surah_number: 112,
                verse_number: 1,
            },
            now,
        );
        memorized.record_success(now);

        let fresh = MemorizationRecord::new(
            "m2".to_string(),
            "u1".to_string(),
            &NewMemorization {
                verse_id: "v2".to_string(),
                surah_number: 112,
                verse_number: 2,
            },
            now,
        );
        vec![memorized, fresh]
    }

    #[test]
    fn test_export_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        let records = create_test_records();

        export_json_to_path(&records, &path).unwrap();
        let imported = import_json(&path).unwrap();

        assert_eq!(imported, records);
        assert_eq!(imported[0].status, MemorizationStatus::Memorized);
    }

    #[test]
    fn test_import_nonexistent_file() {
        let result = import_json(Path::new("nonexistent_file_xyz123.json"));
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        assert!(matches!(import_json(&path), Err(ExportError::Json(_))));
    }

    #[test]
    fn test_import_newer_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        fs::write(
            &path,
            r#"{ "version": 7, "exportedAt": "2030-01-01T00:00:00Z", "memorizations": [] }"#,
        )
        .unwrap();

        assert!(matches!(
            import_json(&path),
            Err(ExportError::UnsupportedVersion(7))
        ));
    }
}
