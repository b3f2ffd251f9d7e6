//! The extract pipeline.
//!
//! Entries are visited in central-directory order, matched against the
//! selection rule, cross-checked against their local header, and
//! delivered to disk, to memory, or to a caller-supplied writer.
//! Per-entry conditions become statuses; only structural archive damage
//! and destination-restriction violations abort the batch.

pub mod payload;

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::creation::NameTransform;
use crate::entry::{EntryHeader, EntryStatus, EntrySummary};
use crate::error::{Result, ZipError};
use crate::format::LocalFileHeader;
use crate::options::{CallbackAction, ExtractOptions, ExtractTarget};
use crate::path::{path_inclusion, reduce_path, translate_to_posix, Inclusion};
use crate::select::{SelectionRule, Selector};

/// Extracts the entries of `entries` matching the configured rule.
///
/// Only matching entries appear in the returned list. A callback abort
/// stops further entries and returns the partial list; output already
/// written stays in place.
pub fn extract_batch(
    archive_file: &mut File,
    archive: &Path,
    entries: &[EntryHeader],
    target: &mut ExtractTarget<'_>,
    options: &mut ExtractOptions,
) -> Result<Vec<EntrySummary>> {
    let rule = options.rule.clone().unwrap_or(SelectionRule::All);
    let transform = NameTransform::from_extract(options);
    let mut selector = Selector::new(&rule);
    let mut summaries = Vec::new();

    for header in entries {
        if !selector.matches(&header.stored_filename, header.index, header.is_folder()) {
            continue;
        }
        let (summary, aborted) =
            extract_one(archive_file, archive, header, &transform, target, options)?;
        if let Some(summary) = summary {
            if let Some(hook) = options.post_hook.as_mut() {
                hook(&summary);
            }
            summaries.push(summary);
        }
        if aborted {
            break;
        }
    }
    Ok(summaries)
}

/// Extracts one entry; the boolean is true when a callback aborted.
fn extract_one(
    archive_file: &mut File,
    archive: &Path,
    header: &EntryHeader,
    transform: &NameTransform,
    target: &mut ExtractTarget<'_>,
    options: &mut ExtractOptions,
) -> Result<(Option<EntrySummary>, bool)> {
    let mut summary = EntrySummary::from_header(header);

    if header.is_encrypted() {
        summary.status = EntryStatus::UnsupportedEncryption;
        return finish(summary, header, options).map(|s| (Some(s), false));
    }
    if header.method().is_none() {
        summary.status = EntryStatus::UnsupportedCompression;
        return finish(summary, header, options).map(|s| (Some(s), false));
    }

    let is_folder = header.is_folder();
    let Some(mut dest_name) = transform.apply(&header.stored_filename, is_folder) else {
        summary.status = EntryStatus::Filtered;
        return Ok((Some(summary), false));
    };

    if let Some(hook) = options.pre_hook.as_mut() {
        match hook(header, &mut dest_name) {
            CallbackAction::Continue => dest_name = reduce_path(&dest_name),
            CallbackAction::Skip => {
                summary.status = EntryStatus::Skipped;
                return Ok((Some(summary), false));
            }
            CallbackAction::Abort => {
                summary.status = EntryStatus::Skipped;
                return Ok((Some(summary), true));
            }
        }
    }
    summary.filename.clone_from(&dest_name);

    if !check_local_header(archive_file, archive, header)? {
        summary.status = EntryStatus::InvalidHeader;
        return finish(summary, header, options).map(|s| (Some(s), false));
    }

    match target {
        ExtractTarget::Disk(dest_dir) => {
            let dest = destination_path(dest_dir, &dest_name);
            summary.filename = dest.to_string_lossy().into_owned();
            enforce_restriction(&dest, options)?;
            if is_folder {
                if std::fs::create_dir_all(&dest).is_err() {
                    summary.status = EntryStatus::PathCreationFail;
                }
            } else if let Some(status) = write_to_disk(archive_file, archive, header, &dest, options)? {
                summary.status = status;
            }
        }
        ExtractTarget::Bytes => {
            if !is_folder {
                let mut content = Vec::new();
                deliver(archive_file, archive, header, options, &mut content, &mut summary)?;
                if summary.status.is_ok() {
                    summary.content = Some(content);
                }
            }
        }
        ExtractTarget::Writer(out) => {
            if !is_folder {
                deliver(archive_file, archive, header, options, &mut **out, &mut summary)?;
            }
        }
    }

    finish(summary, header, options).map(|s| (Some(s), false))
}

/// Streams the payload to `out` and applies the size check.
fn deliver(
    archive_file: &mut File,
    archive: &Path,
    header: &EntryHeader,
    options: &ExtractOptions,
    out: &mut dyn std::io::Write,
    summary: &mut EntrySummary,
) -> Result<()> {
    match payload::unpack(archive_file, header, archive, &options.temp_file, out)? {
        Ok(written) => {
            let expected = u64::from(header.central.uncompressed_size);
            if written != expected {
                return Err(ZipError::BadExtractedFile {
                    name: header.stored_filename.clone(),
                    expected,
                    actual: written,
                });
            }
            Ok(())
        }
        Err(_) => {
            summary.status = EntryStatus::WriteError;
            Ok(())
        }
    }
}

/// Applies stop-on-error promotion to a failed summary.
fn finish(
    summary: EntrySummary,
    header: &EntryHeader,
    options: &ExtractOptions,
) -> Result<EntrySummary> {
    let status = summary.status;
    let failed = !matches!(
        status,
        EntryStatus::Ok | EntryStatus::Filtered | EntryStatus::Skipped
    );
    if failed && options.stop_on_error {
        return Err(match status {
            EntryStatus::UnsupportedEncryption => ZipError::UnsupportedEncryption {
                name: header.stored_filename.clone(),
            },
            EntryStatus::UnsupportedCompression => ZipError::UnsupportedCompression {
                name: header.stored_filename.clone(),
                method: header.central.compression,
            },
            EntryStatus::PathCreationFail => ZipError::DirectoryCreateFailed {
                path: PathBuf::from(&summary.filename),
            },
            _ => ZipError::EntryFailed {
                name: header.stored_filename.clone(),
                status,
            },
        });
    }
    Ok(summary)
}

/// Seeks to the entry's local header and cross-checks it.
///
/// Mismatched sizes and CRC are tolerated; when the data-descriptor flag
/// is set, the central values already in `header` are authoritative.
/// Returns false only when the stored names disagree. On success the file
/// is positioned at the start of the payload.
fn check_local_header(
    archive_file: &mut File,
    archive: &Path,
    header: &EntryHeader,
) -> Result<bool> {
    let offset = u64::from(header.central.local_header_offset);
    let file_size = archive_file.seek(SeekFrom::End(0))?;
    if offset >= file_size {
        return Err(ZipError::InvalidArchiveSize {
            path: archive.to_path_buf(),
            offset,
        });
    }
    archive_file.seek(SeekFrom::Start(offset))?;
    let local = LocalFileHeader::read_from(archive_file, archive)?;
    Ok(local.name == header.central.name)
}

fn destination_path(dest_dir: &Path, name: &str) -> PathBuf {
    let dir = dest_dir.to_string_lossy();
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{dir}/{name}"))
    }
}

/// Fatal when the computed destination escapes the restriction directory.
fn enforce_restriction(dest: &Path, options: &ExtractOptions) -> Result<()> {
    if let Some(restriction) = &options.dir_restriction {
        let restriction_posix = translate_to_posix(&restriction.to_string_lossy(), false);
        let dest_posix = reduce_path(&translate_to_posix(&dest.to_string_lossy(), false));
        if path_inclusion(&restriction_posix, &dest_posix) == Inclusion::NotIncluded {
            return Err(ZipError::DirectoryRestriction {
                path: dest.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Writes one file entry to disk; returns a failure status when the
/// destination rejects it.
fn write_to_disk(
    archive_file: &mut File,
    archive: &Path,
    header: &EntryHeader,
    dest: &Path,
    options: &ExtractOptions,
) -> Result<Option<EntryStatus>> {
    if let Ok(existing) = std::fs::metadata(dest) {
        if existing.is_dir() {
            return Ok(Some(EntryStatus::AlreadyADirectory));
        }
        if existing.permissions().readonly() {
            return Ok(Some(EntryStatus::WriteProtected));
        }
        if !options.replace_newer {
            if let Ok(disk_mtime) = existing.modified() {
                if disk_mtime > header.mtime() {
                    return Ok(Some(EntryStatus::NewerExist));
                }
            }
        }
    }

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() && std::fs::create_dir_all(parent).is_err() {
            return Ok(Some(EntryStatus::PathCreationFail));
        }
    }

    let Ok(mut out) = File::create(dest) else {
        return Ok(Some(EntryStatus::WriteError));
    };
    match payload::unpack(archive_file, header, archive, &options.temp_file, &mut out)? {
        Ok(written) => {
            let expected = u64::from(header.central.uncompressed_size);
            if written != expected {
                return Err(ZipError::BadExtractedFile {
                    name: header.stored_filename.clone(),
                    expected,
                    actual: written,
                });
            }
        }
        Err(_) => return Ok(Some(EntryStatus::WriteError)),
    }

    // Restore the archive's recorded mtime on the output.
    let _ = out.set_modified(header.mtime());
    drop(out);

    #[cfg(unix)]
    if let Some(mode) = options.set_chmod {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dest, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = options.set_chmod;

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_path_joins_with_slash() {
        assert_eq!(
            destination_path(Path::new("/out/"), "a/b.txt"),
            PathBuf::from("/out/a/b.txt")
        );
        assert_eq!(destination_path(Path::new(""), "b.txt"), PathBuf::from("b.txt"));
    }

    #[test]
    fn test_restriction_rejects_escapes() {
        let options = ExtractOptions::new().with_dir_restriction("/safe");
        assert!(enforce_restriction(Path::new("/safe/sub/f.txt"), &options).is_ok());
        assert!(matches!(
            enforce_restriction(Path::new("/elsewhere/f.txt"), &options),
            Err(ZipError::DirectoryRestriction { .. })
        ));
    }

    #[test]
    fn test_restriction_normalizes_dotdot() {
        let options = ExtractOptions::new().with_dir_restriction("/safe");
        assert!(matches!(
            enforce_restriction(Path::new("/safe/sub/../../etc/passwd"), &options),
            Err(ZipError::DirectoryRestriction { .. })
        ));
    }
}
