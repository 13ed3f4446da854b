//! Search contributions
//!
//! A contribution is a toggle a view offers next to its filter field. It
//! names itself, hands out a matcher and decides whether it takes part given
//! the other active contributions.

use crate::matcher::{CaseSensitiveMatcher, GroupedSearch, StringMatcher, WholeWordMatcher};

/// A pluggable match criterion
pub trait SearchContribution {
    /// Label shown on the toggle
    fn label(&self) -> &str;

    fn tooltip(&self) -> Option<&str> {
        None
    }

    /// A matcher implementing this criterion
    fn matcher(&self) -> Box<dyn StringMatcher>;

    /// Whether this contribution takes part alongside `active`.
    ///
    /// Mutually exclusive contributions veto themselves here.
    fn is_active(&self, _active: &[&dyn SearchContribution]) -> bool {
        true
    }
}

/// Case-sensitive containment
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseSensitiveContribution;

impl SearchContribution for CaseSensitiveContribution {
    fn label(&self) -> &str {
        "Case"
    }

    fn tooltip(&self) -> Option<&str> {
        Some("Perform a Case-Sensitive Search")
    }

    fn matcher(&self) -> Box<dyn StringMatcher> {
        Box::new(CaseSensitiveMatcher::new())
    }
}

/// Whole-word matching
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeWordContribution;

impl SearchContribution for WholeWordContribution {
    fn label(&self) -> &str {
        "whole word"
    }

    fn tooltip(&self) -> Option<&str> {
        Some("Only search for whole words")
    }

    fn matcher(&self) -> Box<dyn StringMatcher> {
        Box::new(WholeWordMatcher::new())
    }
}

/// Collapses runs of identical candidates.
///
/// Every call to [`matcher`](SearchContribution::matcher) returns a fresh
/// [`GroupedSearch`], so two chains never share duplicate-tracking state.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupedContribution;

impl SearchContribution for GroupedContribution {
    fn label(&self) -> &str {
        "grouped"
    }

    fn matcher(&self) -> Box<dyn StringMatcher> {
        Box::new(GroupedSearch::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(CaseSensitiveContribution.label(), "Case");
        assert_eq!(WholeWordContribution.label(), "whole word");
        assert_eq!(GroupedContribution.label(), "grouped");
        assert_eq!(GroupedContribution.tooltip(), None);
        assert_eq!(
            WholeWordContribution.tooltip(),
            Some("Only search for whole words")
        );
    }

    #[test]
    fn test_standard_contributions_are_always_active() {
        let active: [&dyn SearchContribution; 2] = [&CaseSensitiveContribution, &GroupedContribution];
        assert!(CaseSensitiveContribution.is_active(&active));
        assert!(WholeWordContribution.is_active(&active));
        assert!(GroupedContribution.is_active(&[]));
    }

    #[test]
    fn test_grouped_matchers_are_independent() {
        let mut first = GroupedContribution.matcher();
        let mut second = GroupedContribution.matcher();

        assert!(first.matches("row", ""));
        assert!(second.matches("row", ""));
        assert!(!first.matches("row", ""));
    }
}
