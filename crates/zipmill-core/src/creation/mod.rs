//! Building archive content: expansion, naming, and the write path.

pub mod expand;
pub mod stored_name;
pub mod writer;

pub use expand::{ExpandedEntry, ExpandedKind};
pub use stored_name::NameTransform;

use std::io::Write;
use std::time::SystemTime;

use crate::entry::{EntryDescriptor, EntryStatus, EntrySummary, MAX_STORED_NAME_LEN};
use crate::error::{Result, ZipError};
use crate::format::CentralFileHeader;
use crate::options::{AddOptions, CallbackAction};
use crate::path::reduce_path;

/// Result of writing a batch of new entries.
pub struct WrittenBatch {
    /// Central-directory records for the entries actually written.
    pub centrals: Vec<CentralFileHeader>,
    /// One summary per expanded entry, including filtered and skipped
    /// ones.
    pub summaries: Vec<EntrySummary>,
    /// Total local-header-plus-payload bytes appended.
    pub bytes_written: u64,
}

/// Expands `descriptors` and writes their local headers and payloads to
/// `target`, starting at absolute offset `base_offset`.
///
/// `start_index` numbers the summaries after any pre-existing entries.
pub fn write_batch<W: Write>(
    target: &mut W,
    base_offset: u64,
    start_index: usize,
    descriptors: &[EntryDescriptor],
    options: &mut AddOptions,
) -> Result<WrittenBatch> {
    let transform = NameTransform::from_add(options);
    let expanded = expand::expand(descriptors)?;

    let mut centrals = Vec::new();
    let mut summaries = Vec::new();
    let mut offset = base_offset;

    for entry in &expanded {
        let index = start_index + centrals.len();
        let is_folder = entry.is_folder();

        let Some(mut stored) = transform.apply(&entry.raw_name, is_folder) else {
            summaries.push(unwritten_summary(entry, index, EntryStatus::Filtered));
            continue;
        };

        if let Some(hook) = options.pre_hook.as_mut() {
            match hook(&entry.source, &mut stored) {
                CallbackAction::Continue => stored = reduce_path(&stored),
                CallbackAction::Skip => {
                    summaries.push(unwritten_summary(entry, index, EntryStatus::Skipped));
                    continue;
                }
                CallbackAction::Abort => {
                    return Err(ZipError::UserAborted { name: stored });
                }
            }
        }

        if stored.len() > MAX_STORED_NAME_LEN {
            summaries.push(unwritten_summary(entry, index, EntryStatus::FilenameTooLong));
            continue;
        }

        let Some(written) = writer::write_entry(target, offset, entry, &stored, options)? else {
            summaries.push(unwritten_summary(entry, index, EntryStatus::ReadError));
            continue;
        };

        offset += written.bytes_written;
        let summary = EntrySummary {
            filename: entry.raw_name.clone(),
            stored_filename: String::from_utf8_lossy(&written.central.name).into_owned(),
            size: u64::from(written.central.uncompressed_size),
            compressed_size: u64::from(written.central.compressed_size),
            mtime: crate::format::dostime::from_dos(
                written.central.mod_time,
                written.central.mod_date,
            ),
            comment: entry.comment.clone().unwrap_or_default(),
            is_folder,
            index,
            status: EntryStatus::Ok,
            crc32: written.central.crc32,
            content: None,
        };
        if let Some(hook) = options.post_hook.as_mut() {
            hook(&summary);
        }
        centrals.push(written.central);
        summaries.push(summary);
    }

    Ok(WrittenBatch {
        centrals,
        summaries,
        bytes_written: offset - base_offset,
    })
}

fn unwritten_summary(entry: &ExpandedEntry, index: usize, status: EntryStatus) -> EntrySummary {
    EntrySummary {
        filename: entry.raw_name.clone(),
        stored_filename: entry.raw_name.clone(),
        size: 0,
        compressed_size: 0,
        mtime: entry.mtime.unwrap_or_else(SystemTime::now),
        comment: entry.comment.clone().unwrap_or_default(),
        is_folder: entry.is_folder(),
        index,
        status,
        crc32: 0,
        content: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_batch_writes_and_numbers_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("one.txt"), b"first").unwrap();
        fs::write(dir.path().join("two.txt"), b"second").unwrap();

        let descriptors = vec![
            EntryDescriptor::from_path(dir.path().join("one.txt")),
            EntryDescriptor::from_path(dir.path().join("two.txt")),
        ];
        let mut options = AddOptions::new().with_remove_all_path(true);
        let mut buf = Vec::new();
        let batch = write_batch(&mut buf, 0, 5, &descriptors, &mut options).unwrap();

        assert_eq!(batch.centrals.len(), 2);
        assert_eq!(batch.summaries[0].stored_filename, "one.txt");
        assert_eq!(batch.summaries[0].index, 5);
        assert_eq!(batch.summaries[1].index, 6);
        assert_eq!(batch.bytes_written, buf.len() as u64);
    }

    #[test]
    fn test_pre_hook_can_rename_and_skip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("keep.txt"), b"k").unwrap();
        fs::write(dir.path().join("drop.txt"), b"d").unwrap();

        let descriptors = vec![
            EntryDescriptor::from_path(dir.path().join("keep.txt")),
            EntryDescriptor::from_path(dir.path().join("drop.txt")),
        ];
        let mut options = AddOptions::new()
            .with_remove_all_path(true)
            .with_pre_hook(Box::new(|_, name| {
                if name.contains("drop") {
                    CallbackAction::Skip
                } else {
                    *name = format!("renamed/./{name}");
                    CallbackAction::Continue
                }
            }));

        let mut buf = Vec::new();
        let batch = write_batch(&mut buf, 0, 0, &descriptors, &mut options).unwrap();
        assert_eq!(batch.summaries[0].stored_filename, "renamed/keep.txt");
        assert_eq!(batch.summaries[0].status, EntryStatus::Ok);
        assert_eq!(batch.summaries[1].status, EntryStatus::Skipped);
        assert_eq!(batch.centrals.len(), 1);
    }

    #[test]
    fn test_abort_stops_the_batch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let descriptors = vec![EntryDescriptor::from_path(dir.path().join("a.txt"))];
        let mut options =
            AddOptions::new().with_pre_hook(Box::new(|_, _| CallbackAction::Abort));
        let mut buf = Vec::new();
        let err = write_batch(&mut buf, 0, 0, &descriptors, &mut options);
        assert!(matches!(err, Err(ZipError::UserAborted { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_over_long_name_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let long = "d/".repeat(200);
        let descriptors = vec![
            EntryDescriptor::from_path(dir.path().join("a.txt")).with_full_name(format!("{long}a"))
        ];
        let mut buf = Vec::new();
        let batch =
            write_batch(&mut buf, 0, 0, &descriptors, &mut AddOptions::new()).unwrap();
        assert_eq!(batch.summaries[0].status, EntryStatus::FilenameTooLong);
        assert!(batch.centrals.is_empty());
    }
}
