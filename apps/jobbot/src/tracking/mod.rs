//! Persisted tracking: applications (with stats and rate-limit counters) plus
//! journals of viewed, selected and rejected listings.
//!
//! Every file is read once when opened and rewritten whole after each change.

pub mod journal;
pub mod store;

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use journal::{JournalKind, JobJournal};
pub use store::ApplicationStore;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not valid tracking JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize tracking data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// All tracking files under one data directory.
pub struct Tracker {
    pub applications: ApplicationStore,
    pub viewed: JobJournal,
    pub selected: JobJournal,
    pub rejected: JobJournal,
}

impl Tracker {
    pub fn open(data_dir: &Path) -> Result<Self, TrackingError> {
        Ok(Self {
            applications: ApplicationStore::open(data_dir.join("applied_jobs_v2.json"))?,
            viewed: JobJournal::open(JournalKind::Viewed, data_dir)?,
            selected: JobJournal::open(JournalKind::Selected, data_dir)?,
            rejected: JobJournal::open(JournalKind::Rejected, data_dir)?,
        })
    }
}

/// Reads `path` as JSON; `Ok(None)` when the file does not exist yet.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, TrackingError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(TrackingError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| TrackingError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes pretty JSON through a temp file in the same directory, then renames
/// it over `path`. Readers see either the old or the new content, never a mix.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), TrackingError> {
    let body = serde_json::to_string_pretty(value)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |source: std::io::Error| TrackingError::Write {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(&dir).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    std::io::Write::write_all(&mut tmp, body.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        n: u32,
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Sample> = read_json(&dir.path().join("nope.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sample.json");
        write_json_atomic(&path, &Sample { n: 7 }).unwrap();
        let value: Option<Sample> = read_json(&path).unwrap();
        assert_eq!(value, Some(Sample { n: 7 }));
    }

    #[test]
    fn test_corrupt_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_json::<Sample>(&path).unwrap_err();
        assert!(matches!(err, TrackingError::Parse { .. }));
    }

    #[test]
    fn test_tracker_opens_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = Tracker::open(dir.path()).unwrap();
        assert_eq!(tracker.applications.records().len(), 0);
        assert_eq!(tracker.viewed.len(), 0);
    }
}
