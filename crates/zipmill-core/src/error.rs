//! Error types for archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ZipError`.
pub type Result<T> = std::result::Result<T, ZipError>;

/// Errors that can occur while creating, reading, or rewriting an archive.
#[derive(Error, Debug)]
pub enum ZipError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied parameter or option combination is invalid.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A source file listed for addition does not exist.
    #[error("file does not exist: {path}")]
    MissingFile {
        /// The missing source path.
        path: PathBuf,
    },

    /// The archive structure is corrupt: bad signature, truncated record,
    /// or missing end-of-central-directory record.
    #[error("invalid archive format in {path}: {reason}")]
    InvalidArchiveFormat {
        /// Path of the archive being read.
        path: PathBuf,
        /// What was wrong with the structure.
        reason: String,
    },

    /// Decompressed content does not match the size recorded in the header.
    #[error("bad extracted file size for '{name}': expected {expected}, got {actual}")]
    BadExtractedFile {
        /// Stored name of the entry.
        name: String,
        /// Uncompressed size from the header.
        expected: u64,
        /// Actual decompressed length.
        actual: u64,
    },

    /// A destination directory could not be created.
    #[error("unable to create directory: {path}")]
    DirectoryCreateFailed {
        /// The directory that could not be created.
        path: PathBuf,
    },

    /// A seek derived from the central directory landed outside the file.
    #[error("invalid archive size for {path}: offset {offset} is out of range")]
    InvalidArchiveSize {
        /// Path of the archive.
        path: PathBuf,
        /// The offset that could not be reached.
        offset: u64,
    },

    /// A leftover file could not be deleted during an archive rewrite.
    #[error("unable to delete file: {path}")]
    DeleteFileFailed {
        /// The file that could not be deleted.
        path: PathBuf,
    },

    /// The rewritten archive could not replace the original.
    #[error("unable to rename '{from}' to '{to}'")]
    RenameFileFailed {
        /// Source of the rename.
        from: PathBuf,
        /// Destination of the rename.
        to: PathBuf,
    },

    /// An entry uses a compression method other than store or deflate.
    #[error("entry '{name}' uses unsupported compression method {method}")]
    UnsupportedCompression {
        /// Stored name of the entry.
        name: String,
        /// The raw compression method code.
        method: u16,
    },

    /// An entry is encrypted (general-purpose flag bit 0 set).
    #[error("entry '{name}' is encrypted; encrypted archives are not supported")]
    UnsupportedEncryption {
        /// Stored name of the entry.
        name: String,
    },

    /// A descriptor attribute carries a value of the wrong shape.
    #[error("invalid attribute value: {0}")]
    InvalidAttributeValue(String),

    /// A computed extraction path falls outside the restriction directory.
    #[error("filename '{path}' is outside the extraction restriction directory")]
    DirectoryRestriction {
        /// The offending destination path.
        path: PathBuf,
    },

    /// A caller-supplied callback requested that the batch be aborted.
    #[error("operation aborted by caller callback at entry '{name}'")]
    UserAborted {
        /// Stored name of the entry being processed when the abort arrived.
        name: String,
    },

    /// A per-entry condition promoted to an operation error by
    /// stop-on-error.
    #[error("entry '{name}' failed with status {status}")]
    EntryFailed {
        /// Stored name of the failed entry.
        name: String,
        /// The status that would otherwise have been recorded.
        status: crate::entry::EntryStatus,
    },
}

impl ZipError {
    /// Returns `true` if this error describes a structurally unusable
    /// archive (as opposed to a per-entry or environmental failure).
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidArchiveFormat { .. } | Self::InvalidArchiveSize { .. }
        )
    }

    /// Returns `true` if the error was produced by input validation rather
    /// than by acting on an archive.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter(_) | Self::InvalidAttributeValue(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZipError::UnsupportedEncryption {
            name: "secret.txt".into(),
        };
        assert!(err.to_string().contains("secret.txt"));
        assert!(err.to_string().contains("encrypted"));
    }

    #[test]
    fn test_format_error_carries_path_and_reason() {
        let err = ZipError::InvalidArchiveFormat {
            path: PathBuf::from("broken.zip"),
            reason: "bad end of central directory signature".into(),
        };
        let display = err.to_string();
        assert!(display.contains("broken.zip"));
        assert!(display.contains("signature"));
        assert!(err.is_structural());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ZipError = io_err.into();
        assert!(matches!(err, ZipError::Io(_)));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_is_usage() {
        assert!(ZipError::InvalidParameter("bad range".into()).is_usage());
        assert!(ZipError::InvalidAttributeValue("empty name".into()).is_usage());
        assert!(!ZipError::UserAborted { name: "a".into() }.is_usage());
    }

    #[test]
    fn test_delete_file_failed_display() {
        let err = ZipError::DeleteFileFailed {
            path: PathBuf::from("stale.tmp"),
        };
        assert!(err.to_string().contains("stale.tmp"));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_bad_extracted_file_sizes() {
        let err = ZipError::BadExtractedFile {
            name: "data.bin".into(),
            expected: 100,
            actual: 42,
        };
        let display = err.to_string();
        assert!(display.contains("100"));
        assert!(display.contains("42"));
    }
}
