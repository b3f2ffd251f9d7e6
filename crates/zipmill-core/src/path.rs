//! Archive-internal path utilities.
//!
//! Stored names and extraction destinations are plain `/`-separated
//! strings, not `std::path::Path` values: the archive format records raw
//! bytes and the transforms here must behave identically on every
//! platform. All functions are pure.

/// Relationship between a directory and a candidate path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// The path is not under the directory.
    NotIncluded,
    /// The path is strictly inside the directory tree.
    Included,
    /// The path and the directory are the same.
    ExactMatch,
}

/// Collapses `.` segments and resolves `..` against the nearest preceding
/// real segment.
///
/// A leading `/` is kept as the absolute-root marker, a trailing `/` is
/// kept as the directory marker, and interior duplicate slashes collapse.
///
/// If more `..` segments remain than real segments can absorb, the input
/// is returned unmodified. That fallback is a documented quirk of the
/// engine's lineage and is relied upon by callers; do not "fix" it.
#[must_use]
pub fn reduce_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len() - 1;
    let mut kept: Vec<&str> = Vec::with_capacity(segments.len());
    let mut skip = 0usize;

    // Walk from the last segment to the first so that `..` can cancel the
    // nearest real segment as soon as it is seen.
    for (i, segment) in segments.iter().enumerate().rev() {
        if *segment == "." {
            continue;
        }
        if *segment == ".." {
            skip += 1;
            continue;
        }
        if segment.is_empty() {
            if i == 0 {
                if skip > 0 {
                    return path.to_string();
                }
                kept.push("");
            } else if i == last {
                kept.push("");
            }
            continue;
        }
        if skip > 0 {
            skip -= 1;
        } else {
            kept.push(segment);
        }
    }

    if skip > 0 {
        return path.to_string();
    }

    kept.reverse();
    kept.join("/")
}

/// Reports whether `path` lies under the directory `dir`.
///
/// Comparison is segment-wise and ignores empty segments produced by
/// duplicate slashes. `.`/`..` segments are not resolved (callers
/// normalize with [`reduce_path`] first), except that a bare `.` or a
/// leading `./` on either argument is expanded against the current
/// working directory before comparing.
#[must_use]
pub fn path_inclusion(dir: &str, path: &str) -> Inclusion {
    let dir = expand_leading_dot(dir);
    let path = expand_leading_dot(path);

    let dir_segments: Vec<&str> = dir.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();

    let mut i = 0;
    let mut j = 0;
    while i < dir_segments.len() && j < path_segments.len() {
        if dir_segments[i].is_empty() {
            i += 1;
            continue;
        }
        if path_segments[j].is_empty() {
            j += 1;
            continue;
        }
        if dir_segments[i] != path_segments[j] {
            return Inclusion::NotIncluded;
        }
        i += 1;
        j += 1;
    }

    while j < path_segments.len() && path_segments[j].is_empty() {
        j += 1;
    }
    while i < dir_segments.len() && dir_segments[i].is_empty() {
        i += 1;
    }

    if i >= dir_segments.len() && j >= path_segments.len() {
        Inclusion::ExactMatch
    } else if i < dir_segments.len() {
        // The path ran out before the directory did.
        Inclusion::NotIncluded
    } else {
        Inclusion::Included
    }
}

/// Rewrites a Windows-style path into POSIX form.
///
/// Strips a single leading `X:` drive prefix when `remove_drive_letter`
/// is set and rewrites backslashes to forward slashes. Inputs that are
/// already POSIX-style pass through untouched.
#[must_use]
pub fn translate_to_posix(path: &str, remove_drive_letter: bool) -> String {
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';

    if !path.contains('\\') && !has_drive {
        return path.to_string();
    }

    let stripped = if remove_drive_letter && has_drive {
        &path[2..]
    } else {
        path
    };
    stripped.replace('\\', "/")
}

fn expand_leading_dot(path: &str) -> String {
    if path == "." || path.starts_with("./") {
        let cwd = std::env::current_dir()
            .map(|p| translate_to_posix(&p.to_string_lossy(), false))
            .unwrap_or_default();
        format!("{cwd}/{}", &path[1..])
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_path_parent_segment() {
        assert_eq!(reduce_path("a/b/../c"), "a/c");
    }

    #[test]
    fn test_reduce_path_current_segment() {
        assert_eq!(reduce_path("./a"), "a");
        assert_eq!(reduce_path("a/./b"), "a/b");
    }

    #[test]
    fn test_reduce_path_too_many_parents_returns_input() {
        // Documented quirk: underflow falls back to the raw input.
        assert_eq!(reduce_path("a/../../b"), "a/../../b");
        assert_eq!(reduce_path("/a/../../b"), "/a/../../b");
    }

    #[test]
    fn test_reduce_path_preserves_significant_slashes() {
        assert_eq!(reduce_path("/a/b"), "/a/b");
        assert_eq!(reduce_path("a/b/"), "a/b/");
        assert_eq!(reduce_path("a//b"), "a/b");
    }

    #[test]
    fn test_reduce_path_empty() {
        assert_eq!(reduce_path(""), "");
    }

    #[test]
    fn test_path_inclusion_inside() {
        assert_eq!(path_inclusion("a/b", "a/b/c"), Inclusion::Included);
    }

    #[test]
    fn test_path_inclusion_exact() {
        assert_eq!(path_inclusion("a/b", "a/b"), Inclusion::ExactMatch);
        assert_eq!(path_inclusion("a//b", "a/b/"), Inclusion::ExactMatch);
    }

    #[test]
    fn test_path_inclusion_outside() {
        assert_eq!(path_inclusion("a/b", "a/x"), Inclusion::NotIncluded);
        assert_eq!(path_inclusion("a/b/c", "a/b"), Inclusion::NotIncluded);
    }

    #[test]
    fn test_path_inclusion_ignores_duplicate_slashes() {
        assert_eq!(path_inclusion("a//b", "a/b//c"), Inclusion::Included);
    }

    #[test]
    fn test_path_inclusion_expands_leading_dot() {
        let cwd = std::env::current_dir()
            .map(|p| translate_to_posix(&p.to_string_lossy(), false))
            .unwrap_or_default();
        let inside = format!("{cwd}/somewhere");
        assert_eq!(path_inclusion(".", &inside), Inclusion::Included);
    }

    #[test]
    fn test_translate_to_posix_windows_path() {
        assert_eq!(translate_to_posix("C:\\tmp\\file", true), "/tmp/file");
        assert_eq!(translate_to_posix("C:\\tmp\\file", false), "C:/tmp/file");
    }

    #[test]
    fn test_translate_to_posix_noop_on_posix() {
        assert_eq!(translate_to_posix("a/b/c", true), "a/b/c");
        assert_eq!(translate_to_posix("", true), "");
    }

    #[test]
    fn test_translate_to_posix_drive_without_backslash() {
        assert_eq!(translate_to_posix("d:data/file", true), "data/file");
    }
}
