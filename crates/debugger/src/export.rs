//! Snapshot export.
//!
//! Serializes the full history into a downloadable JSON file named
//! `<prefix>-YYYY-MM-DD.json`, and reads such files back.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use tag_events::CapturedEvent;

/// Errors that can occur while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The environment refused to save the file
    #[error("export denied: {0}")]
    Denied(String),
}

/// A serialized snapshot ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name including the `.json` extension
    pub file_name: String,
    /// Indented JSON array of records, newest first
    pub contents: String,
}

impl ExportFile {
    /// Serializes `events` into an export file dated `date`.
    pub fn from_events(
        prefix: &str,
        date: NaiveDate,
        events: &[&CapturedEvent],
    ) -> Result<Self, ExportError> {
        Ok(Self {
            file_name: export_file_name(prefix, date),
            contents: serde_json::to_string_pretty(events)?,
        })
    }
}

/// Builds the export file name, e.g. `ga4-events-2024-05-01.json`.
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.json", prefix, date.format("%Y-%m-%d"))
}

/// Where export files end up.
pub trait ExportTarget: Send {
    /// Saves the file, returning where it was written.
    fn save(&mut self, file: &ExportFile) -> Result<PathBuf, ExportError>;
}

/// Writes exports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    directory: PathBuf,
}

impl DirectoryTarget {
    /// Creates a target for the given directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Returns the target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ExportTarget for DirectoryTarget {
    fn save(&mut self, file: &ExportFile) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(&file.file_name);
        fs::write(&path, &file.contents)?;
        Ok(path)
    }
}

/// Reads an export file back into records, newest first.
pub fn read_export(path: &Path) -> Result<Vec<CapturedEvent>, ExportError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
