//! Point-in-time JSON snapshot of a destination.
//!
//! When backup is enabled, the binder writes the destination's state to
//! `<dir>/backup-<unix seconds>.json` before any handler can run. The file is
//! written once and never read back.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::ConstructionError;

/// Permissions used when creating the backup directory.
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Returns the snapshot path for a given instant.
pub fn backup_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    dir.join(format!("backup-{}.json", at.timestamp()))
}

/// Writes `value` as pretty JSON under `dir`, creating the directory if needed.
///
/// A snapshot taken in the same second as an earlier one replaces it.
pub fn write_backup<T: Serialize>(
    dir: &Path,
    value: &T,
    at: DateTime<Utc>,
) -> Result<PathBuf, ConstructionError> {
    create_dir(dir)?;

    let path = backup_path(dir, at);
    let mut json =
        serde_json::to_string_pretty(value).map_err(|source| ConstructionError::Serialize {
            path: path.clone(),
            source,
        })?;
    json.push('\n');

    fs::write(&path, json).map_err(|source| ConstructionError::CreateFile {
        path: path.clone(),
        source,
    })?;

    info!("wrote backup to {}", path.display());
    Ok(path)
}

fn create_dir(dir: &Path) -> Result<(), ConstructionError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder
        .create(dir)
        .map_err(|source| ConstructionError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}
