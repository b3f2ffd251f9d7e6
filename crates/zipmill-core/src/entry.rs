//! In-flight entry representations and per-entry statuses.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::compress::CompressionMethod;
use crate::format::{dostime, CentralFileHeader};

/// Longest stored name the engine will write, in bytes.
pub const MAX_STORED_NAME_LEN: usize = 255;

/// Folder bit in the external attribute field.
pub const FOLDER_ATTR: u32 = 0x10;

/// Flag bit 0: the payload is encrypted.
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// Flag bit 3: sizes and CRC live in a trailing data descriptor, so the
/// local header copies are not authoritative.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Outcome of processing one entry within a batch operation.
///
/// Statuses are set by the engine only; there is no caller-extensible
/// registry. Per-entry failure statuses do not abort the batch unless the
/// caller asked for stop-on-error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Processed successfully.
    Ok,
    /// Excluded by a stored-name transform, not an error.
    Filtered,
    /// Skipped by a caller-supplied callback.
    Skipped,
    /// Destination exists as a directory where a file was expected.
    AlreadyADirectory,
    /// Destination exists and is not writable.
    WriteProtected,
    /// Destination exists with a newer modification time.
    NewerExist,
    /// A parent directory for the destination could not be created.
    PathCreationFail,
    /// Writing the extracted content failed.
    WriteError,
    /// Reading the source file failed.
    ReadError,
    /// Local and central header disagree beyond tolerated fields.
    InvalidHeader,
    /// Compression method other than store or deflate.
    UnsupportedCompression,
    /// Entry is encrypted.
    UnsupportedEncryption,
    /// Computed stored name exceeds the length cap.
    FilenameTooLong,
}

impl EntryStatus {
    /// Stable lowercase name, used in reports and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Filtered => "filtered",
            Self::Skipped => "skipped",
            Self::AlreadyADirectory => "already_a_directory",
            Self::WriteProtected => "write_protected",
            Self::NewerExist => "newer_exist",
            Self::PathCreationFail => "path_creation_fail",
            Self::WriteError => "write_error",
            Self::ReadError => "read_error",
            Self::InvalidHeader => "invalid_header",
            Self::UnsupportedCompression => "unsupported_compression",
            Self::UnsupportedEncryption => "unsupported_encryption",
            Self::FilenameTooLong => "filename_too_long",
        }
    }

    /// Whether the entry completed without being dropped or failing.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One central-directory entry as the engine works with it.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    /// Zero-based position in the central directory.
    pub index: usize,
    /// Stored name decoded from the raw bytes (lossy on invalid UTF-8).
    pub stored_filename: String,
    /// The raw central-directory record the name came from.
    pub central: CentralFileHeader,
    /// Current processing status.
    pub status: EntryStatus,
}

impl EntryHeader {
    /// Wraps a decoded central-directory record.
    #[must_use]
    pub fn from_central(central: CentralFileHeader, index: usize) -> Self {
        let stored_filename = String::from_utf8_lossy(&central.name).into_owned();
        Self {
            index,
            stored_filename,
            central,
            status: EntryStatus::Ok,
        }
    }

    /// Folder entries carry the folder attribute bit and no payload.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.central.external_attrs & FOLDER_ATTR != 0 || self.stored_filename.ends_with('/')
    }

    /// Encrypted entries are rejected, never decrypted.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.central.flags & FLAG_ENCRYPTED != 0
    }

    /// When set, the central header's sizes and CRC win over the local
    /// header's.
    #[must_use]
    pub fn has_data_descriptor(&self) -> bool {
        self.central.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// The entry's compression method, when supported.
    #[must_use]
    pub fn method(&self) -> Option<CompressionMethod> {
        CompressionMethod::from_code(self.central.compression)
    }

    /// Modification time decoded from the DOS fields.
    #[must_use]
    pub fn mtime(&self) -> SystemTime {
        dostime::from_dos(self.central.mod_time, self.central.mod_date)
    }
}

/// Canonical per-entry result record returned by list/add/extract/delete.
#[derive(Debug, Clone)]
pub struct EntrySummary {
    /// Destination name after extraction transforms, or the stored name
    /// for operations that do not transform.
    pub filename: String,
    /// Name as recorded in the archive.
    pub stored_filename: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed payload size in bytes.
    pub compressed_size: u64,
    /// Modification time.
    pub mtime: SystemTime,
    /// Per-entry comment.
    pub comment: String,
    /// Whether the entry is a folder.
    pub is_folder: bool,
    /// Zero-based central-directory index.
    pub index: usize,
    /// Processing outcome.
    pub status: EntryStatus,
    /// CRC-32 of the uncompressed content.
    pub crc32: u32,
    /// Decompressed content, populated only by extract-as-bytes.
    pub content: Option<Vec<u8>>,
}

impl EntrySummary {
    /// Builds the report row for a central-directory entry.
    #[must_use]
    pub fn from_header(header: &EntryHeader) -> Self {
        Self {
            filename: header.stored_filename.clone(),
            stored_filename: header.stored_filename.clone(),
            size: u64::from(header.central.uncompressed_size),
            compressed_size: u64::from(header.central.compressed_size),
            mtime: header.mtime(),
            comment: String::from_utf8_lossy(&header.central.comment).into_owned(),
            is_folder: header.is_folder(),
            index: header.index,
            status: header.status,
            crc32: header.central.crc32,
            content: None,
        }
    }
}

/// What a descriptor adds to the archive.
#[derive(Debug, Clone)]
pub enum EntryKind {
    /// A regular file read from disk.
    File,
    /// A directory; expanded recursively before the write path runs.
    Folder,
    /// Inline content with no on-disk source.
    VirtualFile(Vec<u8>),
}

/// Input to create/add, before expansion and stored-name resolution.
#[derive(Debug, Clone)]
pub struct EntryDescriptor {
    /// Source path on disk; for virtual files, the name to store.
    pub source: PathBuf,
    /// Replaces the source's base name while keeping its directory part.
    pub rename_short: Option<String>,
    /// Replaces the whole stored name.
    pub rename_full: Option<String>,
    /// Overrides the source file's modification time.
    pub mtime: Option<SystemTime>,
    /// Per-entry comment.
    pub comment: Option<String>,
    /// File, folder, or inline content.
    pub kind: EntryKind,
}

impl EntryDescriptor {
    /// Descriptor for an on-disk path; the kind is resolved during
    /// expansion.
    #[must_use]
    pub fn from_path(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            rename_short: None,
            rename_full: None,
            mtime: None,
            comment: None,
            kind: EntryKind::File,
        }
    }

    /// Descriptor for inline content stored under `name`.
    #[must_use]
    pub fn virtual_file(name: impl Into<PathBuf>, content: Vec<u8>) -> Self {
        Self {
            source: name.into(),
            rename_short: None,
            rename_full: None,
            mtime: None,
            comment: None,
            kind: EntryKind::VirtualFile(content),
        }
    }

    /// Sets a full-name override.
    #[must_use]
    pub fn with_full_name(mut self, name: impl Into<String>) -> Self {
        self.rename_full = Some(name.into());
        self
    }

    /// Sets a base-name override.
    #[must_use]
    pub fn with_short_name(mut self, name: impl Into<String>) -> Self {
        self.rename_short = Some(name.into());
        self
    }

    /// Sets a fixed modification time.
    #[must_use]
    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Sets the per-entry comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}
