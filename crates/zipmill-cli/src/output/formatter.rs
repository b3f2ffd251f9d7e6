//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use std::time::UNIX_EPOCH;
use zipmill_core::{ArchiveProperties, EntrySummary};

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the per-entry result list of an operation
    fn format_entries(&self, operation: &str, entries: &[EntrySummary]) -> Result<()>;

    /// Format archive-level properties
    fn format_properties(&self, properties: &ArchiveProperties) -> Result<()>;

    /// Format a one-line success message
    fn format_success(&self, message: &str) -> Result<()>;
}

/// One entry as reported to the caller, in serializable form.
#[derive(Debug, Serialize)]
pub struct EntryRow {
    pub index: usize,
    pub filename: String,
    pub stored_filename: String,
    pub size: u64,
    pub compressed_size: u64,
    pub mtime: u64,
    pub is_folder: bool,
    pub status: &'static str,
    pub crc32: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl EntryRow {
    pub fn from_summary(summary: &EntrySummary) -> Self {
        let mtime = summary
            .mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            index: summary.index,
            filename: summary.filename.clone(),
            stored_filename: summary.stored_filename.clone(),
            size: summary.size,
            compressed_size: summary.compressed_size,
            mtime,
            is_folder: summary.is_folder,
            status: summary.status.as_str(),
            crc32: format!("{:08x}", summary.crc32),
            comment: summary.comment.clone(),
        }
    }
}
