//! Entry selection rules.
//!
//! Extract and delete operations narrow the central directory down to the
//! entries a caller asked for. Exactly one rule kind is active per
//! operation; [`SelectionRule::All`] is the default when none is given.

use crate::error::{Result, ZipError};
use regex::Regex;

/// An inclusive `[start, end]` pair of zero-based entry indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    /// First matching index.
    pub start: usize,
    /// Last matching index, inclusive.
    pub end: usize,
}

/// Which entries an operation applies to.
#[derive(Debug, Clone)]
pub enum SelectionRule {
    /// Every entry.
    All,
    /// Literal stored names; a name ending in `/` matches the whole
    /// directory subtree under it.
    ByName(Vec<String>),
    /// Regex searched anywhere in the stored name, not anchored.
    ByPattern(Regex),
    /// Ascending, non-overlapping index ranges.
    ByIndex(Vec<IndexRange>),
}

impl SelectionRule {
    /// Builds a pattern rule, rejecting invalid regex syntax up front.
    pub fn by_pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| ZipError::InvalidParameter(format!("invalid pattern {pattern:?}: {e}")))?;
        Ok(Self::ByPattern(regex))
    }

    /// Parses an index specification like `0,3-5,8` into a rule.
    ///
    /// Ranges must be sorted ascending by start and must not overlap or
    /// touch out of order; a malformed spec is an input error, never
    /// silently reordered.
    pub fn by_index_spec(spec: &str) -> Result<Self> {
        let mut ranges = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            let range = match part.split_once('-') {
                Some((start, end)) => IndexRange {
                    start: parse_index(start, spec)?,
                    end: parse_index(end, spec)?,
                },
                None => {
                    let index = parse_index(part, spec)?;
                    IndexRange { start: index, end: index }
                }
            };
            if range.end < range.start {
                return Err(ZipError::InvalidParameter(format!(
                    "index range {}-{} is reversed in {spec:?}",
                    range.start, range.end
                )));
            }
            if let Some(previous) = ranges.last() {
                let previous: &IndexRange = previous;
                if range.start <= previous.end {
                    return Err(ZipError::InvalidParameter(format!(
                        "index ranges in {spec:?} must be ascending and non-overlapping"
                    )));
                }
            }
            ranges.push(range);
        }
        if ranges.is_empty() {
            return Err(ZipError::InvalidParameter(format!("empty index spec {spec:?}")));
        }
        Ok(Self::ByIndex(ranges))
    }
}

fn parse_index(text: &str, spec: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| ZipError::InvalidParameter(format!("bad index {text:?} in spec {spec:?}")))
}

/// Evaluates a [`SelectionRule`] over entries visited in central-directory
/// order.
///
/// The selector is stateful so that index ranges can be scanned with a
/// single monotonic cursor; build one per operation and feed it entries
/// in ascending index order.
pub struct Selector<'a> {
    rule: &'a SelectionRule,
    range_cursor: usize,
}

impl<'a> Selector<'a> {
    /// Creates a selector for one pass over the central directory.
    #[must_use]
    pub fn new(rule: &'a SelectionRule) -> Self {
        Self { rule, range_cursor: 0 }
    }

    /// Reports whether the entry at `index` with the given stored name is
    /// selected. `is_folder` widens by-name matching: a listed name
    /// `dir/` also matches a folder entry stored without the trailing
    /// slash.
    pub fn matches(&mut self, stored_name: &str, index: usize, is_folder: bool) -> bool {
        match self.rule {
            SelectionRule::All => true,
            SelectionRule::ByName(names) => names.iter().any(|name| {
                if name == stored_name {
                    return true;
                }
                if let Some(prefix) = name.strip_suffix('/') {
                    return stored_name.starts_with(name.as_str())
                        || (is_folder && stored_name == prefix);
                }
                false
            }),
            SelectionRule::ByPattern(regex) => regex.is_match(stored_name),
            SelectionRule::ByIndex(ranges) => {
                while self.range_cursor < ranges.len() && ranges[self.range_cursor].end < index {
                    self.range_cursor += 1;
                }
                self.range_cursor < ranges.len()
                    && index >= ranges[self.range_cursor].start
                    && index <= ranges[self.range_cursor].end
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select_all(rule: &SelectionRule, names: &[&str]) -> Vec<usize> {
        let mut selector = Selector::new(rule);
        names
            .iter()
            .enumerate()
            .filter(|(i, name)| selector.matches(name, *i, false))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_all_matches_everything() {
        assert_eq!(select_all(&SelectionRule::All, &["a", "b/c"]), vec![0, 1]);
    }

    #[test]
    fn test_by_name_exact() {
        let rule = SelectionRule::ByName(vec!["b/c.txt".into()]);
        assert_eq!(select_all(&rule, &["a.txt", "b/c.txt", "b/c.txt.bak"]), vec![1]);
    }

    #[test]
    fn test_by_name_directory_prefix() {
        let rule = SelectionRule::ByName(vec!["docs/".into()]);
        assert_eq!(
            select_all(&rule, &["docs/a.md", "docs/sub/b.md", "src/a.rs", "docs"]),
            vec![0, 1]
        );
    }

    #[test]
    fn test_by_name_matches_bare_folder_entry() {
        let rule = SelectionRule::ByName(vec!["docs/".into()]);
        let mut selector = Selector::new(&rule);
        // A folder stored without its trailing slash still matches.
        assert!(selector.matches("docs", 0, true));
        assert!(!selector.matches("docs", 1, false));
    }

    #[test]
    fn test_by_pattern_searches_anywhere() {
        let rule = SelectionRule::by_pattern(r"\.txt$").unwrap();
        assert_eq!(select_all(&rule, &["a.txt", "b.rs", "dir/c.txt"]), vec![0, 2]);

        let unanchored = SelectionRule::by_pattern("core").unwrap();
        assert_eq!(select_all(&unanchored, &["zipmill-core/lib.rs", "cli.rs"]), vec![0]);
    }

    #[test]
    fn test_by_pattern_rejects_bad_regex() {
        assert!(matches!(
            SelectionRule::by_pattern("(["),
            Err(ZipError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_by_index_single_and_ranges() {
        let rule = SelectionRule::by_index_spec("0,2-4,7").unwrap();
        let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
        assert_eq!(select_all(&rule, &names), vec![0, 2, 3, 4, 7]);
    }

    #[test]
    fn test_by_index_rejects_unsorted_or_overlapping() {
        assert!(SelectionRule::by_index_spec("3,1").is_err());
        assert!(SelectionRule::by_index_spec("1-4,3-6").is_err());
        assert!(SelectionRule::by_index_spec("5-2").is_err());
        assert!(SelectionRule::by_index_spec("").is_err());
        assert!(SelectionRule::by_index_spec("x").is_err());
    }

    #[test]
    fn test_by_index_cursor_is_monotonic() {
        let rule = SelectionRule::by_index_spec("1-2,5").unwrap();
        let mut selector = Selector::new(&rule);
        assert!(!selector.matches("a", 0, false));
        assert!(selector.matches("b", 1, false));
        assert!(selector.matches("c", 2, false));
        assert!(!selector.matches("d", 3, false));
        assert!(!selector.matches("e", 4, false));
        assert!(selector.matches("f", 5, false));
        assert!(!selector.matches("g", 6, false));
    }
}
