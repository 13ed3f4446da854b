//! Matcher chains built from active contributions

use crate::contribution::SearchContribution;
use crate::matcher::{MatchAll, StringMatcher};

/// A chain of matchers a candidate must satisfy together
pub struct MatcherChain {
    root: Box<dyn StringMatcher>,
}

impl MatcherChain {
    /// A chain that accepts every candidate
    pub fn new() -> Self {
        Self {
            root: Box::new(MatchAll::new()),
        }
    }

    /// Wrap an already built matcher
    pub fn from_matcher(matcher: Box<dyn StringMatcher>) -> Self {
        Self { root: matcher }
    }

    /// Chain the matchers of every contribution in `active` that does not veto itself.
    ///
    /// Matchers are linked in the order the contributions are given and hang
    /// off a [`MatchAll`] root, so an empty selection accepts everything.
    pub fn from_contributions(active: &[&dyn SearchContribution]) -> Self {
        let eligible: Vec<_> = active
            .iter()
            .filter(|contribution| contribution.is_active(active))
            .collect();

        let mut rest: Option<Box<dyn StringMatcher>> = None;
        for contribution in eligible.iter().rev() {
            let matcher = contribution.matcher();
            rest = Some(match rest {
                Some(next) => matcher.chain(next),
                None => matcher,
            });
        }

        tracing::debug!(
            active = active.len(),
            eligible = eligible.len(),
            "matcher chain built"
        );

        let root = MatchAll::new();
        match rest {
            Some(rest) => Self::from_matcher(root.chain(rest)),
            None => Self::new(),
        }
    }

    pub fn matches(&mut self, source: &str, search: &str) -> bool {
        self.root.matches(source, search)
    }

    /// Keep the candidates that match `search`, in order
    pub fn filter<'a, I>(&mut self, candidates: I, search: &str) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .filter(|candidate| self.root.matches(candidate, search))
            .collect()
    }
}

impl Default for MatcherChain {
    fn default() -> Self {
        Self::new()
    }
}
