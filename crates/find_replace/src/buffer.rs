//! In-memory find/replace target
//!
//! [`TextBuffer`] implements every [`FindReplaceTarget`] primitive over a
//! plain `String`:
//! - literal search (escaped, optionally case-insensitive and whole-word)
//! - regex search in multi-line mode
//! - regex replacement templates with group references
//! - search scope, line selection and multi-selection

use crate::options::is_word_char;
use crate::target::{FindQuery, FindReplaceTarget, Match, SearchStart, TargetCapabilities};
use crate::{FindReplaceError, Result};
use regex_lite::{Captures, Regex};

/// A text buffer with a selection, usable as a find/replace target
#[derive(Debug, Clone)]
pub struct TextBuffer {
    text: String,
    selection: Match,
    scope: Option<Match>,
    multi_selection: Vec<Match>,
    editable: bool,
    capabilities: TargetCapabilities,
    bulk_mode: bool,
    session_active: bool,
    /// Compiled form of the last query, keyed by its pattern source
    compiled: Option<(String, Regex)>,
    /// Regex that produced the current selection, for replacement templates
    last_match_regex: Option<Regex>,
}

impl TextBuffer {
    /// Create an editable buffer with every capability enabled
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: Match::default(),
            scope: None,
            multi_selection: Vec::new(),
            editable: true,
            capabilities: TargetCapabilities::all(),
            bulk_mode: false,
            session_active: false,
            compiled: None,
            last_match_regex: None,
        }
    }

    /// Restrict the advertised capabilities
    pub fn with_capabilities(mut self, capabilities: TargetCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Get the buffer contents
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole contents. Selection, scope and multi-selection are reset.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.selection = Match::default();
        self.scope = None;
        self.multi_selection.clear();
        self.last_match_regex = None;
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Ranges pushed by the last select-all
    pub fn multi_selection(&self) -> &[Match] {
        &self.multi_selection
    }

    pub fn is_bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    /// Whether a find/replace session is currently running on this buffer
    pub fn is_session_active(&self) -> bool {
        self.session_active
    }

    fn ceil_boundary(&self, mut index: usize) -> usize {
        while index < self.text.len() && !self.text.is_char_boundary(index) {
            index += 1;
        }
        index.min(self.text.len())
    }

    fn floor_boundary(&self, index: usize) -> usize {
        let mut index = index.min(self.text.len());
        while index > 0 && !self.text.is_char_boundary(index) {
            index -= 1;
        }
        index
    }

    fn clamp(&self, range: Match) -> Match {
        let start = self.floor_boundary(range.offset);
        let end = self.ceil_boundary(range.offset.saturating_add(range.length)).max(start);
        Match::new(start, end - start)
    }

    /// Bounds matches must fall into: the scope if set, else the whole text
    fn search_bounds(&self) -> (usize, usize) {
        match self.scope {
            Some(scope) => {
                let scope = self.clamp(scope);
                (scope.offset, scope.end())
            }
            None => (0, self.text.len()),
        }
    }

    fn compile(&mut self, query: &FindQuery<'_>) -> Result<Regex> {
        let mut pattern = String::new();
        if !query.case_sensitive {
            pattern.push_str("(?i)");
        }
        if query.regex {
            pattern.push_str("(?m)");
            pattern.push_str(query.text);
        } else {
            pattern.push_str(&regex_lite::escape(query.text));
        }

        if let Some((source, regex)) = &self.compiled {
            if *source == pattern {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(&pattern)?;
        self.compiled = Some((pattern, regex.clone()));
        Ok(regex)
    }

    /// Whether `found` is neither preceded nor followed by a word character
    fn is_whole_word(&self, found: Match) -> bool {
        let before = self.text[..found.offset].chars().next_back();
        let after = self.text[found.end()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }

    /// First match starting at or after `from`
    fn find_forward(&self, regex: &Regex, from: usize, whole_word: bool) -> Option<Match> {
        let (low, high) = self.search_bounds();
        // Nothing starts past the end of the search bounds
        if from > high {
            return None;
        }
        let haystack = &self.text[..high];
        let mut at = self.ceil_boundary(from.max(low));

        while at <= high {
            let m = regex.find_at(haystack, at)?;
            let found = Match::new(m.start(), m.len());
            if !whole_word || self.is_whole_word(found) {
                return Some(found);
            }
            if m.start() >= high {
                break;
            }
            at = self.ceil_boundary(m.start() + 1);
        }
        None
    }

    /// Last match starting at or before `limit`. Overlapping candidates are considered.
    fn find_backward(&self, regex: &Regex, limit: usize, whole_word: bool) -> Option<Match> {
        let (low, high) = self.search_bounds();
        let haystack = &self.text[..high];
        let limit = limit.min(high);
        let mut at = low;
        let mut best = None;

        while at <= high {
            let Some(m) = regex.find_at(haystack, at) else {
                break;
            };
            if m.start() > limit {
                break;
            }
            let found = Match::new(m.start(), m.len());
            if !whole_word || self.is_whole_word(found) {
                best = Some(found);
            }
            if m.start() >= high {
                break;
            }
            at = self.ceil_boundary(m.start() + 1);
        }
        best
    }

    fn expand_replacement(&self, template: &str, selection: Match) -> Result<String> {
        let selected = &self.text[selection.offset..selection.end()];
        let regex = self.last_match_regex.as_ref();
        let captures = regex
            .and_then(|regex| regex.captures_at(&self.text[..selection.end()], selection.offset))
            .filter(|caps| {
                caps.get(0)
                    .is_some_and(|m| m.start() == selection.offset && m.end() == selection.end())
            });

        expand_template(
            template,
            &Groups {
                regex,
                captures: captures.as_ref(),
                selected,
            },
        )
    }
}

impl FindReplaceTarget for TextBuffer {
    fn selection(&self) -> Match {
        self.clamp(self.selection)
    }

    fn selection_text(&self) -> String {
        let selection = self.selection();
        self.text[selection.offset..selection.end()].to_string()
    }

    fn set_selection(&mut self, offset: usize, length: usize) {
        self.selection = self.clamp(Match::new(offset, length));
        self.last_match_regex = None;
    }

    fn find_and_select(&mut self, start: SearchStart, query: &FindQuery<'_>) -> Result<Option<Match>> {
        if query.text.is_empty() {
            return Ok(None);
        }

        let regex = self.compile(query)?;
        let whole_word = query.whole_word && !query.regex;
        let found = match (start, query.forward) {
            (SearchStart::At(offset), true) => self.find_forward(&regex, offset, whole_word),
            (SearchStart::Boundary, true) => self.find_forward(&regex, 0, whole_word),
            (SearchStart::At(offset), false) => self.find_backward(&regex, offset, whole_word),
            (SearchStart::Boundary, false) => self.find_backward(&regex, usize::MAX, whole_word),
        };

        if let Some(found) = found {
            self.selection = found;
            self.last_match_regex = Some(regex);
        }
        Ok(found)
    }

    fn replace_selection(&mut self, text: &str, regex_replace: bool) -> Result<Match> {
        if !self.editable {
            return Err(FindReplaceError::ReadOnlyTarget);
        }

        let selection = self.selection();
        let replacement = if regex_replace {
            self.expand_replacement(text, selection)?
        } else {
            text.to_string()
        };

        self.text
            .replace_range(selection.offset..selection.end(), &replacement);

        if let Some(scope) = self.scope.as_mut() {
            if scope.contains(&selection) {
                scope.length = scope.length - selection.length + replacement.len();
            } else if selection.end() <= scope.offset {
                scope.offset = scope.offset - selection.length + replacement.len();
            }
        }

        tracing::trace!(
            offset = selection.offset,
            removed = selection.length,
            inserted = replacement.len(),
            "replaced selection"
        );

        self.selection = Match::new(selection.offset, replacement.len());
        self.last_match_regex = None;
        self.multi_selection.clear();
        Ok(self.selection)
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn capabilities(&self) -> TargetCapabilities {
        self.capabilities
    }

    fn line_selection(&self) -> Match {
        let selection = self.selection();
        let start = self.text[..selection.offset]
            .rfind('\n')
            .map_or(0, |i| i + 1);
        let end = if selection.length > 0 && self.text[..selection.end()].ends_with('\n') {
            selection.end()
        } else {
            match self.text[selection.end()..].find('\n') {
                Some(i) => selection.end() + i + 1,
                None => self.text.len(),
            }
        };
        Match::new(start, end - start)
    }

    fn scope(&self) -> Option<Match> {
        self.scope
    }

    fn set_scope(&mut self, scope: Option<Match>) {
        self.scope = scope.map(|scope| self.clamp(scope));
    }

    fn set_multi_selection(&mut self, ranges: &[Match]) {
        self.multi_selection = ranges.iter().map(|range| self.clamp(*range)).collect();
        if let Some(first) = self.multi_selection.first() {
            self.selection = *first;
        }
    }

    fn begin_session(&mut self) {
        self.session_active = true;
    }

    fn end_session(&mut self) {
        self.session_active = false;
    }

    fn set_bulk_mode(&mut self, bulk: bool) {
        self.bulk_mode = bulk;
    }
}

/// Capture groups available to a replacement template
struct Groups<'a> {
    regex: Option<&'a Regex>,
    captures: Option<&'a Captures<'a>>,
    /// The selected text, used as group 0 when the selection was not produced by a regex
    selected: &'a str,
}

impl Groups<'_> {
    fn count(&self) -> usize {
        self.captures.map_or(1, |caps| caps.len())
    }

    fn by_index(&self, index: usize) -> Result<&str> {
        if index == 0 {
            return Ok(self.captures.and_then(|caps| caps.get(0)).map_or(self.selected, |m| m.as_str()));
        }
        match self.captures {
            Some(caps) if index < caps.len() => Ok(caps.get(index).map_or("", |m| m.as_str())),
            _ => Err(FindReplaceError::InvalidPattern(format!("No group {}", index))),
        }
    }

    fn by_name(&self, name: &str) -> Result<&str> {
        let known = self
            .regex
            .is_some_and(|regex| regex.capture_names().flatten().any(|n| n == name));
        match self.captures {
            Some(caps) if known => Ok(caps.name(name).map_or("", |m| m.as_str())),
            _ => Err(FindReplaceError::InvalidPattern(format!(
                "No group with name {{{}}}",
                name
            ))),
        }
    }
}

fn expand_template(template: &str, groups: &Groups<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') | Some('R') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => {
                    return Err(FindReplaceError::InvalidPattern(
                        "character to be escaped is missing".to_string(),
                    ))
                }
            },
            '$' => match chars.peek().copied() {
                Some('{') => {
                    chars.next();
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(FindReplaceError::InvalidPattern(
                                    "named capturing group is missing trailing '}'".to_string(),
                                ))
                            }
                        }
                    }
                    match name.parse::<usize>() {
                        Ok(index) => out.push_str(groups.by_index(index)?),
                        Err(_) => out.push_str(groups.by_name(&name)?),
                    }
                }
                Some(digit) if digit.is_ascii_digit() => {
                    chars.next();
                    let mut index = digit as usize - '0' as usize;
                    // Take further digits only while they still name an existing group
                    while let Some(next) = chars.peek().and_then(|ch| ch.to_digit(10)) {
                        let candidate = index * 10 + next as usize;
                        if candidate >= groups.count() {
                            break;
                        }
                        index = candidate;
                        chars.next();
                    }
                    out.push_str(groups.by_index(index)?);
                }
                _ => {
                    return Err(FindReplaceError::InvalidPattern(
                        "Illegal group reference".to_string(),
                    ))
                }
            },
            other => out.push(other),
        }
    }

    Ok(out)
}
