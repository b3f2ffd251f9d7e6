//! Descriptor expansion.
//!
//! Folder descriptors fan out into one entry per file and subfolder
//! before any archive byte is written. Renames on a folder propagate to
//! everything under it, so adding `a` renamed to `x` stores `x/b/c.txt`
//! for `a/b/c.txt`. Symlinks are skipped silently, never followed.

use std::path::Path;
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::entry::{EntryDescriptor, EntryKind};
use crate::error::{Result, ZipError};
use crate::path::translate_to_posix;

/// What one expanded entry contributes to the archive.
#[derive(Debug, Clone)]
pub enum ExpandedKind {
    /// Regular file read from `source`.
    File,
    /// Folder entry, no payload.
    Folder,
    /// Inline content.
    Virtual(Vec<u8>),
}

/// One flat entry ready for stored-name resolution and writing.
#[derive(Debug, Clone)]
pub struct ExpandedEntry {
    /// On-disk source; for virtual files, the path being stored.
    pub source: std::path::PathBuf,
    /// Name after renames, before prefix transforms.
    pub raw_name: String,
    /// Modification time override.
    pub mtime: Option<SystemTime>,
    /// Per-entry comment.
    pub comment: Option<String>,
    /// File, folder, or inline content.
    pub kind: ExpandedKind,
}

impl ExpandedEntry {
    /// Whether this entry is a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, ExpandedKind::Folder)
    }
}

/// Expands descriptors into a flat entry list.
///
/// A descriptor naming a missing path fails the whole operation; batch
/// tolerance only starts once expansion has succeeded.
pub fn expand(descriptors: &[EntryDescriptor]) -> Result<Vec<ExpandedEntry>> {
    let mut entries = Vec::new();
    for descriptor in descriptors {
        expand_one(descriptor, &mut entries)?;
    }
    Ok(entries)
}

fn expand_one(descriptor: &EntryDescriptor, entries: &mut Vec<ExpandedEntry>) -> Result<()> {
    let raw_name = effective_name(descriptor)?;

    if let EntryKind::VirtualFile(content) = &descriptor.kind {
        entries.push(ExpandedEntry {
            source: descriptor.source.clone(),
            raw_name,
            mtime: descriptor.mtime,
            comment: descriptor.comment.clone(),
            kind: ExpandedKind::Virtual(content.clone()),
        });
        return Ok(());
    }

    let meta = std::fs::symlink_metadata(&descriptor.source).map_err(|_| ZipError::MissingFile {
        path: descriptor.source.clone(),
    })?;
    if meta.file_type().is_symlink() {
        return Ok(());
    }

    if meta.is_file() {
        entries.push(ExpandedEntry {
            source: descriptor.source.clone(),
            raw_name,
            mtime: descriptor.mtime,
            comment: descriptor.comment.clone(),
            kind: ExpandedKind::File,
        });
        return Ok(());
    }

    entries.push(ExpandedEntry {
        source: descriptor.source.clone(),
        raw_name: raw_name.clone(),
        mtime: descriptor.mtime,
        comment: descriptor.comment.clone(),
        kind: ExpandedKind::Folder,
    });

    for child in WalkDir::new(&descriptor.source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let child = child.map_err(|e| ZipError::Io(e.into()))?;
        if child.file_type().is_symlink() {
            continue;
        }
        let rel = child
            .path()
            .strip_prefix(&descriptor.source)
            .unwrap_or_else(|_| child.path());
        let child_name = format!("{raw_name}/{}", path_to_posix(rel));
        entries.push(ExpandedEntry {
            source: child.path().to_path_buf(),
            raw_name: child_name,
            mtime: None,
            comment: None,
            kind: if child.file_type().is_dir() {
                ExpandedKind::Folder
            } else {
                ExpandedKind::File
            },
        });
    }
    Ok(())
}

/// The name a descriptor stores under, after its renames and before the
/// operation-wide prefix transforms.
///
/// An empty rename override is rejected outright rather than silently
/// erasing the stored name.
fn effective_name(descriptor: &EntryDescriptor) -> Result<String> {
    let base = path_to_posix(&descriptor.source);
    if let Some(full) = &descriptor.rename_full {
        if full.is_empty() {
            return Err(ZipError::InvalidAttributeValue(
                "empty full name override".into(),
            ));
        }
        return Ok(translate_to_posix(full, true).trim_end_matches('/').to_string());
    }
    if let Some(short) = &descriptor.rename_short {
        if short.is_empty() {
            return Err(ZipError::InvalidAttributeValue(
                "empty short name override".into(),
            ));
        }
        return Ok(match base.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{short}"),
            None => short.clone(),
        });
    }
    Ok(base)
}

fn path_to_posix(path: &Path) -> String {
    translate_to_posix(&path.to_string_lossy(), true)
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[ExpandedEntry]) -> Vec<String> {
        entries.iter().map(|e| e.raw_name.clone()).collect()
    }

    #[test]
    fn test_missing_source_fails() {
        let err = expand(&[EntryDescriptor::from_path("/no/such/file")]);
        assert!(matches!(err, Err(ZipError::MissingFile { .. })));
    }

    #[test]
    fn test_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"content").unwrap();

        let entries = expand(&[EntryDescriptor::from_path(&file)]).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0].kind, ExpandedKind::File));
        assert!(entries[0].raw_name.ends_with("a.txt"));
    }

    #[test]
    fn test_folder_recursion() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.txt"), b"x").unwrap();
        fs::write(dir.path().join("top.txt"), b"y").unwrap();

        let entries = expand(&[EntryDescriptor::from_path(dir.path())]).unwrap();
        let names = names(&entries);
        assert_eq!(entries.len(), 4);
        assert!(names[0].ends_with(&dir.path().file_name().unwrap().to_string_lossy().to_string()));
        assert!(names.iter().any(|n| n.ends_with("sub/inner.txt")));
        assert!(names.iter().any(|n| n.ends_with("top.txt")));
    }

    #[test]
    fn test_nested_rename_propagates() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("a");
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b/c.txt"), b"z").unwrap();

        let descriptor = EntryDescriptor::from_path(&root).with_full_name("x");
        let entries = expand(&[descriptor]).unwrap();
        let names = names(&entries);
        assert_eq!(names, vec!["x", "x/b", "x/b/c.txt"]);
    }

    #[test]
    fn test_short_rename_keeps_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("report.csv");
        fs::write(&file, b"1,2").unwrap();

        let descriptor = EntryDescriptor::from_path(&file).with_short_name("renamed.csv");
        let entries = expand(&[descriptor]).unwrap();
        assert!(entries[0].raw_name.ends_with("/renamed.csv"));
        assert!(!entries[0].raw_name.contains("report.csv"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("real.txt"), b"r").unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("real.txt"),
            dir.path().join("link.txt"),
        )
        .unwrap();

        let entries = expand(&[EntryDescriptor::from_path(dir.path())]).unwrap();
        let names = names(&entries);
        assert!(names.iter().any(|n| n.ends_with("real.txt")));
        assert!(!names.iter().any(|n| n.contains("link")));
    }

    #[test]
    fn test_empty_rename_override_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"x").unwrap();

        let full = EntryDescriptor::from_path(&file).with_full_name("");
        assert!(matches!(
            expand(&[full]),
            Err(ZipError::InvalidAttributeValue(_))
        ));

        let short = EntryDescriptor::from_path(&file).with_short_name("");
        assert!(matches!(
            expand(&[short]),
            Err(ZipError::InvalidAttributeValue(_))
        ));
    }

    #[test]
    fn test_virtual_file() {
        let descriptor = EntryDescriptor::virtual_file("notes/inline.txt", b"hello".to_vec());
        let entries = expand(&[descriptor]).unwrap();
        assert_eq!(entries[0].raw_name, "notes/inline.txt");
        assert!(matches!(entries[0].kind, ExpandedKind::Virtual(_)));
    }
}
