//! ZIP archive engine operating directly on the container format.
//!
//! `zipmill-core` creates, lists, extracts, rewrites, merges, and
//! duplicates ZIP archives by reading and writing local file headers,
//! the central directory, and the end-of-central-directory trailer
//! itself; only the raw DEFLATE codec is delegated to `flate2`.
//! Compression methods are limited to store and deflate, encrypted
//! entries are detected and rejected, and ZIP64 is out of scope.
//!
//! # Examples
//!
//! ```no_run
//! use zipmill_core::{AddOptions, Archive, EntryDescriptor, ExtractOptions, ExtractTarget};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = Archive::new("backup.zip");
//! archive.create(
//!     &[EntryDescriptor::from_path("data")],
//!     AddOptions::new().with_remove_path("data"),
//! )?;
//! let report = archive.extract(
//!     ExtractTarget::Disk("restored".into()),
//!     ExtractOptions::new(),
//! )?;
//! println!("extracted {} entries", report.len());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod compress;
pub mod creation;
pub mod entry;
pub mod error;
pub mod extraction;
pub mod format;
pub mod options;
pub mod path;
pub mod select;

pub use archive::Archive;
pub use archive::ArchiveProperties;
pub use archive::ArchiveState;
pub use entry::EntryDescriptor;
pub use entry::EntryStatus;
pub use entry::EntrySummary;
pub use error::Result;
pub use error::ZipError;
pub use options::AddOptions;
pub use options::CallbackAction;
pub use options::DeleteOptions;
pub use options::ExtractOptions;
pub use options::ExtractTarget;
pub use options::TempFilePolicy;
pub use select::SelectionRule;
