use crate::domain::dataset::Dataset;
use crate::domain::stock::StockRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no snapshot at {path}")]
    NotFound { path: PathBuf },

    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot at {path} is not a valid dataset: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// On-disk dataset snapshot: a JSON envelope with provenance metadata and
/// the full record list. The metadata identifies the run that produced
/// the file and takes no part in dataset equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFile {
    pub snapshot_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub stocks: Vec<StockRecord>,
}

impl SnapshotFile {
    pub fn into_dataset(self) -> Dataset {
        Dataset::from_records(self.stocks)
    }
}

/// Write `dataset` to `path`, replacing any previous snapshot.
///
/// The JSON is written to a temporary file in the destination directory
/// and renamed over `path`, so a concurrent reader sees either the old
/// snapshot or the new one, never a torn file.
pub fn save(dataset: &Dataset, path: &Path) -> Result<(), SnapshotError> {
    let file = SnapshotFile {
        snapshot_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        stocks: dataset.records().cloned().collect(),
    };
    let json = serde_json::to_vec_pretty(&file).map_err(SnapshotError::Encode)?;

    let dir = parent_dir(path);
    std::fs::create_dir_all(dir).map_err(|source| SnapshotError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.write_all(&json).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.persist(path).map_err(|err| SnapshotError::Io {
        path: path.to_path_buf(),
        source: err.error,
    })?;

    Ok(())
}

/// Read a snapshot back as a dataset.
pub fn load(path: &Path) -> Result<Dataset, SnapshotError> {
    Ok(load_file(path)?.into_dataset())
}

/// Read a snapshot including its envelope metadata.
pub fn load_file(path: &Path) -> Result<SnapshotFile, SnapshotError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(SnapshotError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&raw).map_err(|source| SnapshotError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
