//! Stored-name computation.
//!
//! The transform order is fixed: remove-all-path or remove-prefix, then
//! add-prefix, then normalization. The same order applies symmetrically
//! on the extract side for destination names.

use crate::options::{AddOptions, ExtractOptions};
use crate::path::{path_inclusion, reduce_path, translate_to_posix, Inclusion};

/// Prefix add/remove rules applied to a raw name.
#[derive(Debug, Clone, Default)]
pub struct NameTransform {
    remove_all_path: bool,
    remove_path: Option<String>,
    add_path: Option<String>,
}

impl NameTransform {
    /// The transform an add operation configures.
    #[must_use]
    pub fn from_add(options: &AddOptions) -> Self {
        Self::new(
            options.remove_all_path,
            options.remove_path.as_deref(),
            options.add_path.as_deref(),
        )
    }

    /// The transform an extract operation configures.
    #[must_use]
    pub fn from_extract(options: &ExtractOptions) -> Self {
        Self::new(
            options.remove_all_path,
            options.remove_path.as_deref(),
            options.add_path.as_deref(),
        )
    }

    fn new(remove_all_path: bool, remove_path: Option<&str>, add_path: Option<&str>) -> Self {
        Self {
            remove_all_path,
            remove_path: remove_path.map(|p| {
                let p = translate_to_posix(p, true);
                if p.ends_with('/') { p } else { format!("{p}/") }
            }),
            add_path: add_path.map(|p| translate_to_posix(p, true).trim_end_matches('/').to_string()),
        }
    }

    /// Whether folder entries are dropped outright.
    #[must_use]
    pub fn drops_folders(&self) -> bool {
        self.remove_all_path
    }

    /// Computes the stored (or destination) name for `raw`.
    ///
    /// Returns `None` when the entry is filtered out: a folder under
    /// remove-all-path, or a name the transforms reduce to nothing.
    #[must_use]
    pub fn apply(&self, raw: &str, is_folder: bool) -> Option<String> {
        let mut name = translate_to_posix(raw, true)
            .trim_end_matches('/')
            .to_string();

        if self.remove_all_path {
            if is_folder {
                return None;
            }
            name = name.rsplit('/').next().unwrap_or(&name).to_string();
        } else if let Some(remove) = &self.remove_path {
            match path_inclusion(remove, &name) {
                Inclusion::Included => name = strip_segments(&name, remove),
                Inclusion::ExactMatch => name.clear(),
                Inclusion::NotIncluded => {}
            }
        }

        if let Some(add) = &self.add_path {
            name = if name.is_empty() {
                add.clone()
            } else {
                format!("{add}/{name}")
            };
        }

        let name = reduce_path(&name);
        if name.is_empty() { None } else { Some(name) }
    }
}

/// Drops as many leading real segments from `name` as `prefix` has.
fn strip_segments(name: &str, prefix: &str) -> String {
    let prefix_count = prefix.split('/').filter(|s| !s.is_empty()).count();
    let mut dropped = 0;
    let kept: Vec<&str> = name
        .split('/')
        .filter(|segment| {
            if segment.is_empty() {
                return false;
            }
            if dropped < prefix_count {
                dropped += 1;
                return false;
            }
            true
        })
        .collect();
    kept.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(remove_all: bool, remove: Option<&str>, add: Option<&str>) -> NameTransform {
        NameTransform::new(remove_all, remove, add)
    }

    #[test]
    fn test_identity() {
        let t = transform(false, None, None);
        assert_eq!(t.apply("dir/file.txt", false).as_deref(), Some("dir/file.txt"));
    }

    #[test]
    fn test_remove_all_path_keeps_basename() {
        let t = transform(true, None, None);
        assert_eq!(t.apply("a/b/c.txt", false).as_deref(), Some("c.txt"));
    }

    #[test]
    fn test_remove_all_path_drops_folders() {
        let t = transform(true, None, None);
        assert_eq!(t.apply("a/b", true), None);
    }

    #[test]
    fn test_remove_prefix() {
        let t = transform(false, Some("src"), None);
        assert_eq!(t.apply("src/lib/mod.rs", false).as_deref(), Some("lib/mod.rs"));
        // Prefix not present: name is untouched.
        assert_eq!(t.apply("other/mod.rs", false).as_deref(), Some("other/mod.rs"));
    }

    #[test]
    fn test_remove_prefix_exact_match_filters() {
        let t = transform(false, Some("src"), None);
        assert_eq!(t.apply("src", false), None);
    }

    #[test]
    fn test_add_prefix() {
        let t = transform(false, None, Some("backup/"));
        assert_eq!(t.apply("file.txt", false).as_deref(), Some("backup/file.txt"));
    }

    #[test]
    fn test_remove_then_add() {
        let t = transform(false, Some("build/out"), Some("release"));
        assert_eq!(
            t.apply("build/out/bin/tool", false).as_deref(),
            Some("release/bin/tool")
        );
    }

    #[test]
    fn test_normalizes_result() {
        let t = transform(false, None, Some("top/./"));
        assert_eq!(t.apply("a/../b.txt", false).as_deref(), Some("top/b.txt"));
    }

    #[test]
    fn test_windows_raw_name() {
        let t = transform(false, None, None);
        assert_eq!(t.apply("C:\\data\\f.txt", false).as_deref(), Some("/data/f.txt"));
    }
}
