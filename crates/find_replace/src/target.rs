//! The searchable, editable buffer the controller drives
//!
//! A target is owned by the editor that displays it. The controller only
//! keeps a weak reference and calls into the target for every primitive:
//! locating and selecting a match, replacing the selection, scoping and
//! multi-selection. Offsets are byte offsets into the target's text.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// A half-open range `[offset, offset + length)` in the target's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Match {
    pub offset: usize,
    pub length: usize,
}

impl Match {
    /// Create a new range
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// An empty range at `offset`
    pub fn collapsed(offset: usize) -> Self {
        Self { offset, length: 0 }
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether `other` lies entirely inside this range
    pub fn contains(&self, other: &Match) -> bool {
        other.offset >= self.offset && other.end() <= self.end()
    }
}

/// Where a directional search begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStart {
    /// Start at this offset. A forward search finds the first match starting
    /// at or after it, a backward search the last match starting at or before it.
    At(usize),
    /// Start at the document (or scope) boundary the search direction leads
    /// away from: the beginning for forward searches, the end for backward ones.
    Boundary,
}

/// The find string together with the options that apply to one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindQuery<'a> {
    pub text: &'a str,
    pub forward: bool,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub regex: bool,
}

/// Optional features a target may support. Queried once when the target is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetCapabilities {
    /// Regular expression search and replace
    pub regex: bool,
    /// Several disjoint selections at once (used by select-all)
    pub multi_selection: bool,
    /// Restricting the search to a sub-region
    pub scoping: bool,
}

impl TargetCapabilities {
    /// Every capability enabled
    pub fn all() -> Self {
        Self {
            regex: true,
            multi_selection: true,
            scoping: true,
        }
    }
}

/// The buffer side of find/replace.
///
/// Only the selection, find and replace primitives are mandatory. The
/// optional hooks default to no-ops and are only invoked when the matching
/// [`TargetCapabilities`] flag is set.
pub trait FindReplaceTarget {
    /// The current selection
    fn selection(&self) -> Match;

    /// The text covered by the current selection
    fn selection_text(&self) -> String;

    /// Select `length` bytes starting at `offset`
    fn set_selection(&mut self, offset: usize, length: usize);

    /// Search for `query` from `start` and select the match.
    ///
    /// Returns `Ok(None)` and leaves the selection untouched when nothing
    /// matches. A malformed pattern is reported as
    /// [`FindReplaceError::InvalidPattern`](crate::FindReplaceError::InvalidPattern)
    /// without modifying anything.
    fn find_and_select(&mut self, start: SearchStart, query: &FindQuery<'_>) -> Result<Option<Match>>;

    /// Replace the selection with `text` and select the inserted text.
    ///
    /// With `regex_replace`, `text` is a replacement template expanded against
    /// the last regex match.
    fn replace_selection(&mut self, text: &str, regex_replace: bool) -> Result<Match>;

    /// Whether the buffer can currently be modified
    fn is_editable(&self) -> bool;

    fn capabilities(&self) -> TargetCapabilities {
        TargetCapabilities::default()
    }

    /// Last-minute veto before a mutation, e.g. after checking the file on disk
    fn validate_state(&mut self) -> bool {
        true
    }

    /// The current selection widened to whole lines
    fn line_selection(&self) -> Match {
        self.selection()
    }

    fn scope(&self) -> Option<Match> {
        None
    }

    fn set_scope(&mut self, _scope: Option<Match>) {}

    fn set_multi_selection(&mut self, _ranges: &[Match]) {}

    /// Called when a find/replace session starts on this target
    fn begin_session(&mut self) {}

    /// Called when the session on this target ends
    fn end_session(&mut self) {}

    /// Hint that many replacements follow; intermediate notifications may be skipped
    fn set_bulk_mode(&mut self, _bulk: bool) {}
}

/// A target shared between its owner and the controller
pub type SharedTarget = Rc<RefCell<dyn FindReplaceTarget>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_bounds() {
        let m = Match::new(3, 4);
        assert_eq!(m.end(), 7);
        assert!(!m.is_empty());
        assert!(Match::collapsed(5).is_empty());
    }

    #[test]
    fn test_match_contains() {
        let scope = Match::new(10, 20);
        assert!(scope.contains(&Match::new(10, 20)));
        assert!(scope.contains(&Match::new(15, 0)));
        assert!(!scope.contains(&Match::new(25, 6)));
        assert!(!scope.contains(&Match::new(9, 2)));
    }
}
