//! Matcher variants
//!
//! Each matcher owns an optional delegate. `chain(next)` builds a fresh node
//! of the receiver's kind that delegates to `next`; the receiver is left
//! untouched and its own delegate is not carried over.

/// A predicate over a candidate string and a search string
pub trait StringMatcher {
    /// Whether `source` matches `search` for this matcher and its delegates
    fn matches(&mut self, source: &str, search: &str) -> bool;

    /// A new matcher of the same kind that also requires `next` to match
    fn chain(&self, next: Box<dyn StringMatcher>) -> Box<dyn StringMatcher>;
}

type Delegate = Option<Box<dyn StringMatcher>>;

fn delegate_matches(delegate: &mut Delegate, source: &str, search: &str) -> bool {
    match delegate {
        Some(delegate) => delegate.matches(source, search),
        None => true,
    }
}

/// Only the first line of a candidate takes part in matching
fn first_line(source: &str) -> &str {
    source.lines().next().unwrap_or("")
}

/// Matches when the first line contains the search string verbatim
#[derive(Default)]
pub struct CaseSensitiveMatcher {
    delegate: Delegate,
}

impl CaseSensitiveMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringMatcher for CaseSensitiveMatcher {
    fn matches(&mut self, source: &str, search: &str) -> bool {
        let delegate = delegate_matches(&mut self.delegate, source, search);
        first_line(source).contains(search) && delegate
    }

    fn chain(&self, next: Box<dyn StringMatcher>) -> Box<dyn StringMatcher> {
        Box::new(Self {
            delegate: Some(next),
        })
    }
}

/// Case-insensitive containment on the first line
#[derive(Default)]
pub struct NormalMatcher {
    delegate: Delegate,
}

impl NormalMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringMatcher for NormalMatcher {
    fn matches(&mut self, source: &str, search: &str) -> bool {
        let delegate = delegate_matches(&mut self.delegate, source, search);
        let source = source.to_lowercase();
        first_line(&source).contains(&search.to_lowercase()) && delegate
    }

    fn chain(&self, next: Box<dyn StringMatcher>) -> Box<dyn StringMatcher> {
        Box::new(Self {
            delegate: Some(next),
        })
    }
}

/// Matches when the search string is one of the space-separated words of the first line
#[derive(Default)]
pub struct WholeWordMatcher {
    delegate: Delegate,
}

impl WholeWordMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringMatcher for WholeWordMatcher {
    fn matches(&mut self, source: &str, search: &str) -> bool {
        let delegate = delegate_matches(&mut self.delegate, source, search);
        first_line(source).split(' ').any(|word| word == search) && delegate
    }

    fn chain(&self, next: Box<dyn StringMatcher>) -> Box<dyn StringMatcher> {
        Box::new(Self {
            delegate: Some(next),
        })
    }
}

/// Suppresses consecutive duplicates.
///
/// Remembers the last candidate its delegate accepted and rejects that same
/// candidate when it is presented again. The memory belongs to this instance;
/// chaining starts over with a fresh one.
#[derive(Default)]
pub struct GroupedSearch {
    delegate: Delegate,
    last_match: Option<String>,
}

impl GroupedSearch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringMatcher for GroupedSearch {
    fn matches(&mut self, source: &str, search: &str) -> bool {
        let matched = delegate_matches(&mut self.delegate, source, search);
        if self.last_match.as_deref() == Some(source) {
            tracing::trace!(source, "duplicate candidate suppressed");
            return false;
        }
        if matched {
            self.last_match = Some(source.to_string());
        }
        matched
    }

    fn chain(&self, next: Box<dyn StringMatcher>) -> Box<dyn StringMatcher> {
        Box::new(Self {
            delegate: Some(next),
            last_match: None,
        })
    }
}

/// Accepts everything its delegate accepts; the root of a chain
#[derive(Default)]
pub struct MatchAll {
    delegate: Delegate,
}

impl MatchAll {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StringMatcher for MatchAll {
    fn matches(&mut self, source: &str, search: &str) -> bool {
        delegate_matches(&mut self.delegate, source, search)
    }

    fn chain(&self, next: Box<dyn StringMatcher>) -> Box<dyn StringMatcher> {
        Box::new(Self {
            delegate: Some(next),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_sensitive_uses_first_line() {
        let mut matcher = CaseSensitiveMatcher::new();
        assert!(matcher.matches("Error in line", "Error"));
        assert!(!matcher.matches("error in line", "Error"));
        assert!(!matcher.matches("warning\nError", "Error"));
        assert!(matcher.matches("Error\r\nsecond", "Error"));
    }

    #[test]
    fn test_normal_ignores_case() {
        let mut matcher = NormalMatcher::new();
        assert!(matcher.matches("Unused Import", "unused import"));
        assert!(matcher.matches("UNUSED", "Unu"));
        assert!(!matcher.matches("first\nunused", "unused"));
    }

    #[test]
    fn test_whole_word_tokens() {
        let mut matcher = WholeWordMatcher::new();
        assert!(matcher.matches("two Two words", "Two"));
        assert!(!matcher.matches("twofold words", "two"));
        assert!(!matcher.matches("two, three", "two"));
        assert!(!matcher.matches("Two", "two"));
    }

    #[test]
    fn test_match_all_without_delegate() {
        let mut matcher = MatchAll::new();
        assert!(matcher.matches("", "anything"));
        assert!(matcher.matches("text", ""));
    }

    #[test]
    fn test_chain_requires_both() {
        let mut chained = WholeWordMatcher::new().chain(Box::new(CaseSensitiveMatcher::new()));
        assert!(chained.matches("two Two words", "Two"));
        assert!(!chained.matches("two words", "Two"));
        assert!(!chained.matches("Twofold", "Two"));
    }

    #[test]
    fn test_chain_leaves_receiver_untouched() {
        let mut receiver = MatchAll::new();
        let mut chained = receiver.chain(Box::new(CaseSensitiveMatcher::new()));

        assert!(receiver.matches("abc", "X"));
        assert!(!chained.matches("abc", "X"));
    }

    #[test]
    fn test_chain_drops_receiver_delegate() {
        let with_delegate = MatchAll::new().chain(Box::new(CaseSensitiveMatcher::new()));
        let mut rechained = with_delegate.chain(Box::new(MatchAll::new()));
        assert!(rechained.matches("abc", "X"));
    }

    #[test]
    fn test_grouped_accepts_empty_first_candidate() {
        let mut grouped = GroupedSearch::new();
        assert!(grouped.matches("", ""));
        assert!(!grouped.matches("", ""));

        let mut chained = GroupedSearch::new().chain(Box::new(MatchAll::new()));
        assert!(chained.matches("", "anything"));
    }

    #[test]
    fn test_grouped_suppresses_consecutive_duplicates() {
        let mut grouped = GroupedSearch::new();
        assert!(grouped.matches("a", ""));
        assert!(!grouped.matches("a", ""));
        assert!(grouped.matches("b", ""));
        assert!(grouped.matches("a", ""));
    }

    #[test]
    fn test_grouped_only_remembers_accepted_candidates() {
        let mut grouped = GroupedSearch::new().chain(Box::new(CaseSensitiveMatcher::new()));
        assert!(grouped.matches("Foo", "Foo"));
        assert!(!grouped.matches("bar", "Foo"));
        // "bar" was rejected, so "Foo" is still the last accepted candidate
        assert!(!grouped.matches("Foo", "Foo"));
    }

    #[test]
    fn test_grouped_state_is_per_instance() {
        let mut first = GroupedSearch::new();
        assert!(first.matches("a", ""));

        let mut fresh = first.chain(Box::new(MatchAll::new()));
        assert!(fresh.matches("a", ""));
        assert!(!first.matches("a", ""));
    }
}
