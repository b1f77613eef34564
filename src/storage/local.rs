//! Local filesystem storage for organization records.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{CLEAN_HEADERS, OrganizationRecord, RAW_HEADERS};

/// Timestamped output files under one directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    root_dir: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// `{root}/{prefix}_{YYYYmmdd_HHMMSS}.{extension}`
    pub fn timestamped_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.root_dir.join(format!("{prefix}_{stamp}.{extension}"))
    }

    /// Newest CSV whose name starts with `{prefix}_`.
    ///
    /// File names embed a sortable timestamp, so the greatest name wins.
    pub fn latest_csv(&self, prefix: &str) -> Result<Option<PathBuf>> {
        let entries = match fs::read_dir(&self.root_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Io(e)),
        };

        let marker = format!("{prefix}_");
        let mut newest: Option<(String, PathBuf)> = None;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&marker) || !name.ends_with(".csv") {
                continue;
            }
            if newest.as_ref().is_none_or(|(best, _)| name > *best) {
                newest = Some((name, entry.path()));
            }
        }
        Ok(newest.map(|(_, path)| path))
    }
}

/// Write records with the raw header, source URL included.
pub fn write_raw_csv(path: &Path, records: &[OrganizationRecord]) -> Result<()> {
    write_atomic(path, |tmp| {
        let mut writer = csv::Writer::from_path(tmp)?;
        writer.write_record(RAW_HEADERS)?;
        for record in records {
            writer.write_record(record.raw_row())?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Write records with the cleaned header, source URL dropped.
pub fn write_clean_csv(path: &Path, records: &[OrganizationRecord]) -> Result<()> {
    write_atomic(path, |tmp| {
        let mut writer = csv::Writer::from_path(tmp)?;
        writer.write_record(CLEAN_HEADERS)?;
        for record in records {
            writer.write_record(record.clean_row())?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_atomic(path, |tmp| Ok(fs::write(tmp, &bytes)?))
}

/// Read a raw or cleaned CSV back into records.
///
/// Columns are matched by header name; a missing `url_source` column leaves
/// `source_url` empty.
pub fn read_records(path: &Path) -> Result<Vec<OrganizationRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<OrganizationRecord>()
        .map(|row| row.map_err(AppError::from))
        .collect()
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    write(&tmp)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
