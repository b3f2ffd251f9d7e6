//! Caller-facing configuration for add, extract, and delete.
//!
//! Options are plain structs with builder-style setters; [`validate`]
//! rejects contradictory combinations before any file is touched.
//!
//! [`validate`]: AddOptions::validate

use std::path::{Path, PathBuf};

use crate::entry::{EntryHeader, EntrySummary};
use crate::error::{Result, ZipError};
use crate::select::SelectionRule;

/// Fraction of the working-memory budget above which payloads stream
/// through a temporary file instead of memory.
pub const TEMP_FILE_RATIO: f64 = 0.47;

/// Fixed working-memory budget the threshold is derived from.
const WORKING_MEMORY_BUDGET: u64 = 64 * 1024 * 1024;

/// Value returned by a pre-entry callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Drop this entry, mark it skipped, continue the batch.
    Skip,
    /// Process the entry normally.
    Continue,
    /// Stop the operation.
    Abort,
}

/// Called before an entry is added; may rewrite the stored name.
pub type PreAddHook = Box<dyn FnMut(&Path, &mut String) -> CallbackAction>;
/// Called after an entry is added.
pub type PostAddHook = Box<dyn FnMut(&EntrySummary)>;
/// Called before an entry is extracted; may rewrite the destination.
pub type PreExtractHook = Box<dyn FnMut(&EntryHeader, &mut String) -> CallbackAction>;
/// Called after an entry is extracted.
pub type PostExtractHook = Box<dyn FnMut(&EntrySummary)>;

/// When large payloads go through a temporary file instead of memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct TempFilePolicy {
    /// Always use a temporary file.
    pub force_on: bool,
    /// Never use a temporary file.
    pub force_off: bool,
    /// Custom threshold in MiB; overrides the derived default.
    pub threshold_mb: Option<u64>,
}

impl TempFilePolicy {
    fn validate(&self) -> Result<()> {
        if self.force_on && self.force_off {
            return Err(ZipError::InvalidParameter(
                "temp_file_on and temp_file_off are mutually exclusive".into(),
            ));
        }
        if self.threshold_mb.is_some() && (self.force_on || self.force_off) {
            return Err(ZipError::InvalidParameter(
                "temp_file_threshold_mb cannot be combined with temp_file_on/off".into(),
            ));
        }
        Ok(())
    }

    /// Whether a payload of `size` bytes should stream through a temp
    /// file.
    #[must_use]
    pub fn use_temp_file(&self, size: u64) -> bool {
        if self.force_on {
            return true;
        }
        if self.force_off {
            return false;
        }
        let threshold = self.threshold_mb.map_or_else(
            || (WORKING_MEMORY_BUDGET as f64 * TEMP_FILE_RATIO) as u64,
            |mb| mb * 1024 * 1024,
        );
        size >= threshold
    }
}

/// Configuration for create and add.
#[derive(Default)]
pub struct AddOptions {
    /// Prefix prepended to stored names.
    pub add_path: Option<String>,
    /// Prefix stripped from stored names when it matches.
    pub remove_path: Option<String>,
    /// Strip every directory component from stored names.
    pub remove_all_path: bool,
    /// Store entries instead of deflating them.
    pub no_compression: bool,
    /// Replaces the archive comment.
    pub comment: Option<String>,
    /// Appended to the archive comment.
    pub add_comment: Option<String>,
    /// Prepended to the archive comment.
    pub prepend_comment: Option<String>,
    /// Temporary-file streaming policy.
    pub temp_file: TempFilePolicy,
    /// Pre-add callback.
    pub pre_hook: Option<PreAddHook>,
    /// Post-add callback.
    pub post_hook: Option<PostAddHook>,
}

impl AddOptions {
    /// Empty options: deflate everything, keep paths as given.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `path` to every stored name.
    #[must_use]
    pub fn with_add_path(mut self, path: impl Into<String>) -> Self {
        self.add_path = Some(path.into());
        self
    }

    /// Strips the prefix `path` from stored names.
    #[must_use]
    pub fn with_remove_path(mut self, path: impl Into<String>) -> Self {
        self.remove_path = Some(path.into());
        self
    }

    /// Strips all directory components from stored names.
    #[must_use]
    pub fn with_remove_all_path(mut self, on: bool) -> Self {
        self.remove_all_path = on;
        self
    }

    /// Forces store instead of deflate.
    #[must_use]
    pub fn with_no_compression(mut self, on: bool) -> Self {
        self.no_compression = on;
        self
    }

    /// Replaces the archive comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Appends to the archive comment.
    #[must_use]
    pub fn with_add_comment(mut self, comment: impl Into<String>) -> Self {
        self.add_comment = Some(comment.into());
        self
    }

    /// Prepends to the archive comment.
    #[must_use]
    pub fn with_prepend_comment(mut self, comment: impl Into<String>) -> Self {
        self.prepend_comment = Some(comment.into());
        self
    }

    /// Sets the temporary-file streaming policy.
    #[must_use]
    pub fn with_temp_file(mut self, policy: TempFilePolicy) -> Self {
        self.temp_file = policy;
        self
    }

    /// Installs a pre-add callback.
    #[must_use]
    pub fn with_pre_hook(mut self, hook: PreAddHook) -> Self {
        self.pre_hook = Some(hook);
        self
    }

    /// Installs a post-add callback.
    #[must_use]
    pub fn with_post_hook(mut self, hook: PostAddHook) -> Self {
        self.post_hook = Some(hook);
        self
    }

    /// Rejects contradictory combinations.
    pub fn validate(&self) -> Result<()> {
        if self.remove_all_path && self.remove_path.is_some() {
            return Err(ZipError::InvalidParameter(
                "remove_all_path and remove_path are mutually exclusive".into(),
            ));
        }
        self.temp_file.validate()
    }

    /// The archive comment after applying replace, append, and prepend,
    /// in that order, to `existing`.
    #[must_use]
    pub fn resolve_comment(&self, existing: &str) -> String {
        let mut comment = self
            .comment
            .clone()
            .unwrap_or_else(|| existing.to_string());
        if let Some(suffix) = &self.add_comment {
            comment.push_str(suffix);
        }
        if let Some(prefix) = &self.prepend_comment {
            comment = format!("{prefix}{comment}");
        }
        comment
    }
}

/// Where extracted content goes.
pub enum ExtractTarget<'a> {
    /// Write files under a destination directory.
    Disk(PathBuf),
    /// Return decompressed bytes in each entry's summary.
    Bytes,
    /// Stream decompressed bytes to one writer, in entry order.
    Writer(&'a mut dyn std::io::Write),
}

/// Configuration for extract.
#[derive(Default)]
pub struct ExtractOptions {
    /// Which entries to extract.
    pub rule: Option<SelectionRule>,
    /// Prefix prepended to destination names.
    pub add_path: Option<String>,
    /// Prefix stripped from destination names when it matches.
    pub remove_path: Option<String>,
    /// Drop all directory components from destination names.
    pub remove_all_path: bool,
    /// Overwrite destination files that are newer than the entry.
    pub replace_newer: bool,
    /// Escalate recoverable per-entry conditions into operation errors.
    pub stop_on_error: bool,
    /// Reject destinations outside this directory tree.
    pub dir_restriction: Option<PathBuf>,
    /// POSIX permission mask applied to extracted files.
    pub set_chmod: Option<u32>,
    /// Temporary-file streaming policy.
    pub temp_file: TempFilePolicy,
    /// Pre-extract callback.
    pub pre_hook: Option<PreExtractHook>,
    /// Post-extract callback.
    pub post_hook: Option<PostExtractHook>,
}

impl ExtractOptions {
    /// Empty options: extract everything, keep stored names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits extraction to entries matching `rule`.
    #[must_use]
    pub fn with_rule(mut self, rule: SelectionRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// Prepends `path` to destination names.
    #[must_use]
    pub fn with_add_path(mut self, path: impl Into<String>) -> Self {
        self.add_path = Some(path.into());
        self
    }

    /// Strips the prefix `path` from destination names.
    #[must_use]
    pub fn with_remove_path(mut self, path: impl Into<String>) -> Self {
        self.remove_path = Some(path.into());
        self
    }

    /// Drops all directory components from destination names.
    #[must_use]
    pub fn with_remove_all_path(mut self, on: bool) -> Self {
        self.remove_all_path = on;
        self
    }

    /// Permits overwriting newer destination files.
    #[must_use]
    pub fn with_replace_newer(mut self, on: bool) -> Self {
        self.replace_newer = on;
        self
    }

    /// Escalates per-entry failures into operation errors.
    #[must_use]
    pub fn with_stop_on_error(mut self, on: bool) -> Self {
        self.stop_on_error = on;
        self
    }

    /// Rejects destinations outside `dir`.
    #[must_use]
    pub fn with_dir_restriction(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir_restriction = Some(dir.into());
        self
    }

    /// Applies a permission mask to extracted files.
    #[must_use]
    pub fn with_set_chmod(mut self, mode: u32) -> Self {
        self.set_chmod = Some(mode);
        self
    }

    /// Sets the temporary-file streaming policy.
    #[must_use]
    pub fn with_temp_file(mut self, policy: TempFilePolicy) -> Self {
        self.temp_file = policy;
        self
    }

    /// Installs a pre-extract callback.
    #[must_use]
    pub fn with_pre_hook(mut self, hook: PreExtractHook) -> Self {
        self.pre_hook = Some(hook);
        self
    }

    /// Installs a post-extract callback.
    #[must_use]
    pub fn with_post_hook(mut self, hook: PostExtractHook) -> Self {
        self.post_hook = Some(hook);
        self
    }

    /// Rejects contradictory combinations.
    pub fn validate(&self) -> Result<()> {
        if self.remove_all_path && self.remove_path.is_some() {
            return Err(ZipError::InvalidParameter(
                "remove_all_path and remove_path are mutually exclusive".into(),
            ));
        }
        self.temp_file.validate()
    }
}

/// Configuration for delete.
#[derive(Debug, Default)]
pub struct DeleteOptions {
    /// Which entries to delete; `None` deletes everything.
    pub rule: Option<SelectionRule>,
}

impl DeleteOptions {
    /// Delete-everything options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits deletion to entries matching `rule`.
    #[must_use]
    pub fn with_rule(mut self, rule: SelectionRule) -> Self {
        self.rule = Some(rule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_all_path_excludes_remove_path() {
        let options = AddOptions::new()
            .with_remove_all_path(true)
            .with_remove_path("a/b");
        assert!(matches!(
            options.validate(),
            Err(ZipError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_temp_file_policy_conflicts() {
        let both = TempFilePolicy {
            force_on: true,
            force_off: true,
            threshold_mb: None,
        };
        assert!(AddOptions::new().with_temp_file(both).validate().is_err());

        let mixed = TempFilePolicy {
            force_on: true,
            force_off: false,
            threshold_mb: Some(4),
        };
        assert!(ExtractOptions::new().with_temp_file(mixed).validate().is_err());
    }

    #[test]
    fn test_temp_file_threshold() {
        let policy = TempFilePolicy::default();
        assert!(!policy.use_temp_file(1024));
        assert!(policy.use_temp_file(64 * 1024 * 1024));

        let custom = TempFilePolicy {
            threshold_mb: Some(1),
            ..Default::default()
        };
        assert!(custom.use_temp_file(2 * 1024 * 1024));
        assert!(!custom.use_temp_file(512 * 1024));

        let off = TempFilePolicy {
            force_off: true,
            ..Default::default()
        };
        assert!(!off.use_temp_file(u64::MAX));
    }

    #[test]
    fn test_comment_composition() {
        let options = AddOptions::new()
            .with_add_comment(" tail")
            .with_prepend_comment("head ");
        assert_eq!(options.resolve_comment("middle"), "head middle tail");

        let replaced = AddOptions::new()
            .with_comment("fresh")
            .with_add_comment("!");
        assert_eq!(replaced.resolve_comment("old"), "fresh!");
    }

    #[test]
    fn test_defaults_validate() {
        assert!(AddOptions::new().validate().is_ok());
        assert!(ExtractOptions::new().validate().is_ok());
    }
}
