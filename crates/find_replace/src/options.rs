//! Search options
//!
//! The option set is a group of independent toggles. Their *effective* value
//! depends on each other and on the attached target (see
//! [`SearchController::is_effective`](crate::SearchController::is_effective)):
//! regex subsumes whole-word, whole-word only applies to single words and
//! incremental search is suppressed while regex is engaged.

use serde::{Deserialize, Serialize};

/// A single search option toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchOption {
    /// Search towards the end of the document
    Forward,
    /// Search the whole document instead of a selected range
    GlobalScope,
    /// Respect case when matching
    CaseSensitive,
    /// Only match whole words
    WholeWord,
    /// Interpret the find string as a regular expression
    Regex,
    /// Restart from the opposite boundary when a search fails
    Wrap,
    /// Search as you type
    Incremental,
}

impl SearchOption {
    /// All options, in declaration order
    pub const ALL: [SearchOption; 7] = [
        SearchOption::Forward,
        SearchOption::GlobalScope,
        SearchOption::CaseSensitive,
        SearchOption::WholeWord,
        SearchOption::Regex,
        SearchOption::Wrap,
        SearchOption::Incremental,
    ];
}

/// The raw toggle values, as set by the user.
///
/// Serialized field names match the keys the find/replace dialog has always
/// persisted, so stored settings keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub forward: bool,
    #[serde(rename = "global")]
    pub global_scope: bool,
    #[serde(rename = "casesensitive")]
    pub case_sensitive: bool,
    #[serde(rename = "wholeword")]
    pub whole_word: bool,
    #[serde(rename = "isRegEx")]
    pub regex: bool,
    pub wrap: bool,
    pub incremental: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            forward: true,
            global_scope: true,
            case_sensitive: false,
            whole_word: false,
            regex: false,
            wrap: true,
            incremental: false,
        }
    }
}

impl SearchOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set search direction
    pub fn forward(mut self, value: bool) -> Self {
        self.forward = value;
        self
    }

    /// Set case sensitivity
    pub fn case_sensitive(mut self, value: bool) -> Self {
        self.case_sensitive = value;
        self
    }

    /// Set whole word matching
    pub fn whole_word(mut self, value: bool) -> Self {
        self.whole_word = value;
        self
    }

    /// Enable regex mode
    pub fn regex(mut self, value: bool) -> Self {
        self.regex = value;
        self
    }

    /// Enable wrap around
    pub fn wrap(mut self, value: bool) -> Self {
        self.wrap = value;
        self
    }

    /// Enable search-as-you-type
    pub fn incremental(mut self, value: bool) -> Self {
        self.incremental = value;
        self
    }

    /// Read the raw toggle value of `option`
    pub fn is_set(&self, option: SearchOption) -> bool {
        match option {
            SearchOption::Forward => self.forward,
            SearchOption::GlobalScope => self.global_scope,
            SearchOption::CaseSensitive => self.case_sensitive,
            SearchOption::WholeWord => self.whole_word,
            SearchOption::Regex => self.regex,
            SearchOption::Wrap => self.wrap,
            SearchOption::Incremental => self.incremental,
        }
    }

    /// Write the raw toggle value of `option`
    pub fn set(&mut self, option: SearchOption, value: bool) {
        let slot = match option {
            SearchOption::Forward => &mut self.forward,
            SearchOption::GlobalScope => &mut self.global_scope,
            SearchOption::CaseSensitive => &mut self.case_sensitive,
            SearchOption::WholeWord => &mut self.whole_word,
            SearchOption::Regex => &mut self.regex,
            SearchOption::Wrap => &mut self.wrap,
            SearchOption::Incremental => &mut self.incremental,
        };
        *slot = value;
    }
}

/// Whether `text` is a single word, i.e. made of identifier characters only.
///
/// Whole-word matching is only meaningful for such strings.
pub fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_word_char)
}

/// Characters a word is made of
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
