//! Find/replace controller
//!
//! [`SearchController`] owns the option set and the per-target session and
//! turns one user action into calls on the attached target:
//! - directional search with wraparound
//! - search-as-you-type from a stable anchor
//! - select-all and replace-all
//! - replace-then-find chaining
//! - scope (search in selected lines) lifecycle
//!
//! Every outcome is reported through [`Status`]; no operation returns an error.

use crate::cancel::CancelToken;
use crate::options::{is_word, SearchOption, SearchOptions};
use crate::session::SearchSession;
use crate::settings::FindReplaceSettings;
use crate::status::{self, Status};
use crate::target::{FindQuery, FindReplaceTarget, Match, SearchStart, SharedTarget};
use crate::{FindReplaceError, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// What a bulk loop achieved
#[derive(Debug, Clone, Copy)]
struct BulkOutcome {
    count: usize,
    cancelled: bool,
}

/// Drives find/replace on an attached target
#[derive(Debug, Default)]
pub struct SearchController {
    options: SearchOptions,
    status: Status,
    session: Option<SearchSession>,
}

impl SearchController {
    /// Create a controller with default options and no target
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller starting with the given option toggles
    pub fn with_options(options: SearchOptions) -> Self {
        Self {
            options,
            status: Status::default(),
            session: None,
        }
    }

    /// Create a controller from stored settings
    pub fn from_settings(settings: &FindReplaceSettings) -> Self {
        Self::with_options(settings.options)
    }

    /// The raw option toggles
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// The session of the attached target, if any
    pub fn session(&self) -> Option<&SearchSession> {
        self.session.as_ref()
    }

    /// Status of the operations since the last [`reset_status`](Self::reset_status)
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Clear the status. Call before each logical operation.
    pub fn reset_status(&mut self) {
        self.status = Status::default();
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    /// Whether the toggle for `option` is on
    pub fn is_active(&self, option: SearchOption) -> bool {
        self.options.is_set(option)
    }

    /// Whether `option` can take effect for `find` on the attached target
    pub fn is_available(&self, option: SearchOption, find: &str) -> bool {
        match option {
            SearchOption::Regex => self.target_supports_regex(),
            SearchOption::WholeWord => !self.regex_engaged() && is_word(find),
            SearchOption::Incremental => !self.regex_engaged(),
            _ => true,
        }
    }

    /// Whether `option` is both toggled on and available
    pub fn is_effective(&self, option: SearchOption, find: &str) -> bool {
        self.is_active(option) && self.is_available(option, find)
    }

    pub fn activate(&mut self, option: SearchOption) {
        self.set_option(option, true);
    }

    pub fn deactivate(&mut self, option: SearchOption) {
        self.set_option(option, false);
    }

    fn set_option(&mut self, option: SearchOption, value: bool) {
        if self.options.is_set(option) == value {
            return;
        }
        tracing::debug!(?option, value, "search option toggled");

        match option {
            // Leaving the global scope means searching in the selected lines
            SearchOption::GlobalScope => self.set_scope(!value),
            _ => {
                self.options.set(option, value);
                self.init_incremental_anchor();
            }
        }
    }

    /// Whether the attached target can search with regular expressions
    pub fn target_supports_regex(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.capabilities.regex)
    }

    fn regex_engaged(&self) -> bool {
        self.options.regex && self.target_supports_regex()
    }

    fn incremental_engaged(&self) -> bool {
        self.options.incremental && !self.regex_engaged()
    }

    fn whole_word_engaged(&self, find: &str) -> bool {
        self.options.whole_word && !self.regex_engaged() && is_word(find)
    }

    fn query<'a>(&self, find: &'a str, forward: bool) -> FindQuery<'a> {
        FindQuery {
            text: find,
            forward,
            case_sensitive: self.options.case_sensitive,
            whole_word: self.whole_word_engaged(find),
            regex: self.regex_engaged(),
        }
    }

    // ------------------------------------------------------------------
    // Target lifecycle
    // ------------------------------------------------------------------

    fn target(&self) -> Option<SharedTarget> {
        self.session.as_ref().and_then(SearchSession::target)
    }

    /// Whether a target is attached and still alive
    pub fn is_target_available(&self) -> bool {
        self.target().is_some()
    }

    pub fn supports_multi_selection(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.capabilities.multi_selection)
    }

    /// Whether the next replace has to locate the find string first
    pub fn needs_initial_find_before_replace(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.needs_initial_find)
    }

    /// Where incremental search is currently anchored
    pub fn incremental_anchor(&self) -> Option<Match> {
        self.session.as_ref().map(|session| session.incremental_anchor)
    }

    /// Text of the target's selection, if a target is attached
    pub fn current_selection(&self) -> Option<String> {
        let target = self.target()?;
        let text = target.borrow().selection_text();
        Some(text)
    }

    /// Whether both the owner and the target allow editing
    pub fn is_editable(&self) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let Some(target) = session.target() else {
            return false;
        };
        let editable = target.borrow().is_editable();
        session.editable && editable
    }

    /// Attach `target`, ending the session on the previous one.
    ///
    /// Re-attaching the current target only updates `editable` and marks the
    /// selection as needing an initial find.
    pub fn attach_target<T: FindReplaceTarget + 'static>(&mut self, target: &Rc<RefCell<T>>, editable: bool) {
        let shared: SharedTarget = target.clone();
        self.attach_shared(shared, editable);
    }

    /// [`attach_target`](Self::attach_target) for an already type-erased target
    pub fn attach_shared(&mut self, target: SharedTarget, editable: bool) {
        if self.session.as_ref().is_some_and(|session| session.is_for(&target)) {
            if let Some(session) = self.session.as_mut() {
                session.editable = editable;
                session.needs_initial_find = true;
            }
        } else {
            self.end_session();

            let capabilities = target.borrow().capabilities();
            target.borrow_mut().begin_session();
            if capabilities.scoping {
                self.options.global_scope = true;
            }
            self.session = Some(SearchSession::new(&target, capabilities, editable));
            tracing::debug!(?capabilities, editable, "find/replace target attached");
        }

        self.init_incremental_anchor();
    }

    /// Detach the target, clearing its scope and letting it tear down its session
    pub fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            if let Some(target) = session.target() {
                let mut target = target.borrow_mut();
                if session.capabilities.scoping {
                    target.set_scope(None);
                }
                target.end_session();
            }
            tracing::debug!("find/replace session ended");
        }
    }

    /// Anchor incremental search at the live selection.
    ///
    /// Without incremental mode (or with regex engaged) the anchor is reset to
    /// the document start.
    pub fn init_incremental_anchor(&mut self) {
        let engaged = self.incremental_engaged();
        if let Some(session) = self.session.as_mut() {
            session.incremental_anchor = match session.target() {
                Some(target) if engaged => {
                    let selection = target.borrow().selection();
                    selection
                }
                _ => Match::default(),
            };
        }
    }

    /// Switch between searching the selected lines (`use_range`) and the whole document.
    ///
    /// Entering range mode scopes the search to the lines of the selection, or
    /// to the scope saved when range mode was last left, and moves the caret
    /// to the scope boundary the search direction starts from.
    pub fn set_scope(&mut self, use_range: bool) {
        self.options.global_scope = !use_range;
        let forward = self.options.forward;

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.capabilities.scoping {
            return;
        }
        let Some(target) = session.target() else {
            return;
        };

        {
            let mut target = target.borrow_mut();
            if use_range {
                let scope = match session.saved_scope.take() {
                    Some(saved) => saved,
                    None => target.line_selection(),
                };
                let offset = if forward { scope.offset } else { scope.end() };
                target.set_selection(offset, 0);
                target.set_scope(Some(scope));
                tracing::debug!(offset = scope.offset, length = scope.length, "search scoped to selection");
            } else {
                session.saved_scope = target.scope();
                target.set_scope(None);
                tracing::debug!("search scope cleared");
            }
        }
        session.needs_initial_find = true;
        session.last_found = None;

        self.init_incremental_anchor();
    }

    /// Drop any scope on the target and forget the saved one
    pub fn deactivate_scope(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.capabilities.scoping {
                if let Some(target) = session.target() {
                    target.borrow_mut().set_scope(None);
                }
            }
            session.saved_scope = None;
        }
    }

    // ------------------------------------------------------------------
    // Single-step search
    // ------------------------------------------------------------------

    /// Find the next occurrence of `find` in the configured direction.
    ///
    /// In incremental mode this re-anchors at the live selection first, so it
    /// advances like "find next".
    pub fn perform_search(&mut self, find: &str) -> bool {
        let reinit = self.incremental_engaged();
        self.perform_search_from(reinit, find)
    }

    /// Search-as-you-type step for the current contents of the find field.
    ///
    /// Searches from the stored anchor without moving it, so the same text
    /// always selects the same match. An empty `find` collapses the selection
    /// at the anchor. Does nothing unless incremental mode is engaged.
    pub fn perform_incremental_search(&mut self, find: &str) -> bool {
        if !self.incremental_engaged() {
            return false;
        }

        if find.is_empty() {
            let forward = self.options.forward;
            if let Some(session) = self.session.as_mut() {
                if let Some(target) = session.target() {
                    let anchor = session.incremental_anchor;
                    let mut offset = anchor.offset;
                    if forward != session.needs_initial_find {
                        offset += anchor.length;
                    }
                    session.needs_initial_find = false;
                    session.last_found = None;
                    target.borrow_mut().set_selection(offset, 0);
                }
            }
            return false;
        }

        self.perform_search_from(false, find)
    }

    fn perform_search_from(&mut self, init_anchor: bool, find: &str) -> bool {
        if init_anchor {
            self.init_incremental_anchor();
        }
        if find.is_empty() {
            return false;
        }

        match self.find_next(find) {
            Ok(found) => found,
            Err(err) => {
                self.report_error(&err);
                false
            }
        }
    }

    fn find_next(&mut self, find: &str) -> Result<bool> {
        let forward = self.options.forward;
        let use_anchor = self.incremental_engaged();

        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        let Some(target) = session.target() else {
            return Ok(false);
        };

        let base = if use_anchor {
            session.incremental_anchor
        } else {
            target.borrow().selection()
        };
        // Skip over the selection unless it still has to be matched itself
        let mut position = base.offset;
        if forward != session.needs_initial_find {
            position += base.length;
        }
        session.needs_initial_find = false;

        match self.find_index(&target, find, position)? {
            None => {
                tracing::debug!(find, position, "string not found");
                self.status.warn(status::not_found(find));
                Ok(false)
            }
            Some(found) => {
                if let Some(session) = self.session.as_mut() {
                    session.last_found = Some(found);
                }
                if (forward && found.offset >= position) || (!forward && found.offset <= position) {
                    self.status.set_message("");
                }
                tracing::debug!(find, offset = found.offset, length = found.length, "string found");
                Ok(true)
            }
        }
    }

    /// Search once from `start`, then from the opposite boundary if wrapping is on
    fn find_index(&mut self, target: &SharedTarget, find: &str, start: usize) -> Result<Option<Match>> {
        let query = self.query(find, self.options.forward);

        let first = if query.forward {
            target.borrow_mut().find_and_select(SearchStart::At(start), &query)?
        } else if start == 0 {
            None
        } else {
            target.borrow_mut().find_and_select(SearchStart::At(start - 1), &query)?
        };
        if first.is_some() {
            return Ok(first);
        }

        self.status.raise_warning();
        if !self.options.wrap {
            return Ok(None);
        }

        self.status.set_message(status::WRAPPED);
        tracing::debug!(find, "search wrapped");
        let wrapped = target
            .borrow_mut()
            .find_and_select(SearchStart::Boundary, &query)?;
        Ok(wrapped)
    }

    // ------------------------------------------------------------------
    // Bulk operations
    // ------------------------------------------------------------------

    /// Select every occurrence of `find`. Returns the number of matches.
    pub fn perform_select_all(&mut self, find: &str) -> usize {
        self.perform_select_all_with(find, &CancelToken::new())
    }

    /// [`perform_select_all`](Self::perform_select_all) that stops when `cancel` fires
    pub fn perform_select_all_with(&mut self, find: &str, cancel: &CancelToken) -> usize {
        if find.is_empty() {
            return 0;
        }

        match self.select_all(find, cancel) {
            Ok(outcome) => {
                self.report_bulk(find, outcome, status::selected);
                outcome.count
            }
            Err(err) => {
                self.report_error(&err);
                0
            }
        }
    }

    /// Replace every occurrence of `find` with `replace`. Returns the number of replacements.
    pub fn perform_replace_all(&mut self, find: &str, replace: &str) -> usize {
        self.perform_replace_all_with(find, replace, &CancelToken::new())
    }

    /// [`perform_replace_all`](Self::perform_replace_all) that stops when `cancel` fires
    pub fn perform_replace_all_with(&mut self, find: &str, replace: &str, cancel: &CancelToken) -> usize {
        if find.is_empty() {
            return 0;
        }

        match self.replace_all(find, replace, cancel) {
            Ok(outcome) => {
                self.report_bulk(find, outcome, status::replaced);
                outcome.count
            }
            Err(err) => {
                self.report_error(&err);
                0
            }
        }
    }

    // Bulk operations always scan forward from the document start, whatever
    // the direction toggle says.
    fn select_all(&mut self, find: &str, cancel: &CancelToken) -> Result<BulkOutcome> {
        let target = self.target().ok_or(FindReplaceError::NoTarget)?;
        let query = self.query(find, true);

        let mut ranges = Vec::new();
        let mut position = 0;
        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let found = target
                .borrow_mut()
                .find_and_select(SearchStart::At(position), &query)?;
            let Some(found) = found else {
                break;
            };
            tracing::trace!(offset = found.offset, length = found.length, "match selected");
            ranges.push(found);
            position = next_position(found, found);
        }

        if self.supports_multi_selection() && !ranges.is_empty() {
            target.borrow_mut().set_multi_selection(&ranges);
        }
        if let Some(session) = self.session.as_mut() {
            session.last_found = None;
        }

        tracing::debug!(find, count = ranges.len(), cancelled, "select all finished");
        Ok(BulkOutcome {
            count: ranges.len(),
            cancelled,
        })
    }

    fn replace_all(&mut self, find: &str, replace: &str, cancel: &CancelToken) -> Result<BulkOutcome> {
        let target = self.editable_target()?;
        let query = self.query(find, true);
        let regex_replace = self.regex_engaged();

        target.borrow_mut().set_bulk_mode(true);
        let outcome = replace_matches(&target, &query, replace, regex_replace, cancel);
        target.borrow_mut().set_bulk_mode(false);

        if let Some(session) = self.session.as_mut() {
            session.last_found = None;
        }

        let outcome = outcome?;
        tracing::debug!(find, count = outcome.count, cancelled = outcome.cancelled, "replace all finished");
        Ok(outcome)
    }

    fn report_bulk(&mut self, find: &str, outcome: BulkOutcome, describe: fn(usize) -> String) {
        if outcome.cancelled {
            self.status.warn(format!("Cancelled after {}", describe(outcome.count)));
        } else if outcome.count == 0 {
            self.status.warn(status::not_found(find));
        } else {
            self.status.set_message(describe(outcome.count));
        }
    }

    // ------------------------------------------------------------------
    // Replace
    // ------------------------------------------------------------------

    /// The target, if the owner and the target both allow editing
    fn editable_target(&mut self) -> Result<SharedTarget> {
        let session = self.session.as_ref().ok_or(FindReplaceError::NoTarget)?;
        let target = session.target().ok_or(FindReplaceError::NoTarget)?;

        let valid = target.borrow_mut().validate_state();
        let editable = target.borrow().is_editable();
        if !valid || !editable || !session.editable {
            tracing::warn!("find/replace target rejected modification");
            return Err(FindReplaceError::ReadOnlyTarget);
        }
        Ok(target)
    }

    /// Check that the target may be modified, reporting an error status if not
    pub fn validate_target_state(&mut self) -> bool {
        match self.editable_target() {
            Ok(_) => true,
            Err(err) => {
                self.report_error(&err);
                false
            }
        }
    }

    /// Replace the target's selection with `replace`
    pub fn perform_replace_selection(&mut self, replace: &str) -> bool {
        let regex_replace = self.regex_engaged();
        let result = self.editable_target().and_then(|target| {
            let inserted = target.borrow_mut().replace_selection(replace, regex_replace);
            inserted
        });

        match result {
            Ok(inserted) => {
                if let Some(session) = self.session.as_mut() {
                    session.last_found = None;
                }
                tracing::debug!(offset = inserted.offset, length = inserted.length, "selection replaced");
                true
            }
            Err(err) => {
                self.report_error(&err);
                false
            }
        }
    }

    /// Replace the current occurrence of `find` and select the next one.
    ///
    /// The occurrence is located first unless the selection already is one.
    /// Returns `false` without replacing when there is no occurrence to replace.
    pub fn perform_replace_and_find(&mut self, find: &str, replace: &str) -> bool {
        if !self.is_find_string_selected(find) && !self.perform_search(find) {
            return false;
        }
        if self.perform_replace_selection(replace) {
            self.perform_search(find);
            true
        } else {
            false
        }
    }

    /// Replace the current occurrence of `find`, locating it first when the
    /// selection may not be one (fresh target, changed scope, or a selection
    /// that is not the find string).
    pub fn perform_select_and_replace(&mut self, find: &str, replace: &str) -> bool {
        let must_find = self.needs_initial_find_before_replace() || !self.is_find_string_selected(find);
        if must_find && !self.perform_search(find) {
            return false;
        }
        self.perform_replace_selection(replace)
    }

    /// Whether the selection is an occurrence of `find`: either the match the
    /// last search selected, or (without regex) the find string itself.
    fn is_find_string_selected(&self, find: &str) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false;
        };
        let Some(target) = session.target() else {
            return false;
        };
        let target = target.borrow();

        let selection = target.selection();
        if selection.is_empty() {
            return false;
        }
        if session.last_found == Some(selection) {
            return true;
        }
        if self.regex_engaged() {
            return false;
        }

        let selected = target.selection_text();
        if self.options.case_sensitive {
            selected == find
        } else {
            selected.to_lowercase() == find.to_lowercase()
        }
    }

    fn report_error(&mut self, err: &FindReplaceError) {
        tracing::warn!("find/replace operation failed: {}", err);
        self.status.fail(err.to_string());
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.end_session();
    }
}

/// Where a bulk loop continues after a match, guaranteeing progress past empty matches
fn next_position(found: Match, inserted: Match) -> usize {
    if found.is_empty() {
        inserted.end() + 1
    } else {
        inserted.end()
    }
}

fn replace_matches(
    target: &SharedTarget,
    query: &FindQuery<'_>,
    replace: &str,
    regex_replace: bool,
    cancel: &CancelToken,
) -> Result<BulkOutcome> {
    let mut target = target.borrow_mut();
    let mut count = 0;
    let mut position = 0;

    loop {
        if cancel.is_cancelled() {
            return Ok(BulkOutcome {
                count,
                cancelled: true,
            });
        }
        let Some(found) = target.find_and_select(SearchStart::At(position), query)? else {
            break;
        };
        let inserted = target.replace_selection(replace, regex_replace)?;
        tracing::trace!(offset = found.offset, inserted = inserted.length, "match replaced");
        count += 1;
        position = next_position(found, inserted);
    }

    Ok(BulkOutcome {
        count,
        cancelled: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use crate::target::TargetCapabilities;

    /// Delegates to a [`TextBuffer`] and records the lifecycle hooks
    struct RecordingTarget {
        buffer: TextBuffer,
        events: Vec<&'static str>,
        valid: bool,
    }

    impl RecordingTarget {
        fn new(text: &str) -> Self {
            Self {
                buffer: TextBuffer::new(text),
                events: Vec::new(),
                valid: true,
            }
        }
    }

    impl FindReplaceTarget for RecordingTarget {
        fn selection(&self) -> Match {
            self.buffer.selection()
        }

        fn selection_text(&self) -> String {
            self.buffer.selection_text()
        }

        fn set_selection(&mut self, offset: usize, length: usize) {
            self.buffer.set_selection(offset, length);
        }

        fn find_and_select(&mut self, start: SearchStart, query: &FindQuery<'_>) -> Result<Option<Match>> {
            self.buffer.find_and_select(start, query)
        }

        fn replace_selection(&mut self, text: &str, regex_replace: bool) -> Result<Match> {
            self.events.push("replace");
            self.buffer.replace_selection(text, regex_replace)
        }

        fn is_editable(&self) -> bool {
            self.buffer.is_editable()
        }

        fn validate_state(&mut self) -> bool {
            self.events.push("validate");
            self.valid
        }

        fn begin_session(&mut self) {
            self.events.push("begin");
        }

        fn end_session(&mut self) {
            self.events.push("end");
        }

        fn set_bulk_mode(&mut self, bulk: bool) {
            self.events.push(if bulk { "bulk on" } else { "bulk off" });
        }
    }

    fn shared(text: &str) -> Rc<RefCell<TextBuffer>> {
        Rc::new(RefCell::new(TextBuffer::new(text)))
    }

    #[test]
    fn test_attach_switches_sessions() {
        let first = shared("one");
        let second = shared("two");
        let mut controller = SearchController::new();

        controller.attach_target(&first, true);
        assert!(first.borrow().is_session_active());

        controller.attach_target(&second, true);
        assert!(!first.borrow().is_session_active());
        assert!(second.borrow().is_session_active());

        controller.end_session();
        assert!(!second.borrow().is_session_active());
        assert!(!controller.is_target_available());
    }

    #[test]
    fn test_reattach_same_target_keeps_session() {
        let target = Rc::new(RefCell::new(RecordingTarget::new("abc abc")));
        let mut controller = SearchController::new();

        controller.attach_target(&target, true);
        assert!(controller.perform_search("abc"));
        assert!(!controller.needs_initial_find_before_replace());

        controller.attach_target(&target, false);
        assert!(controller.needs_initial_find_before_replace());
        assert!(!controller.is_editable());
        assert_eq!(target.borrow().events, vec!["begin"]);
    }

    #[test]
    fn test_dropped_target_is_unavailable() {
        let target = shared("hello");
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);
        assert!(controller.is_target_available());

        drop(target);
        assert!(!controller.is_target_available());
        assert!(!controller.perform_search("hello"));
        assert_eq!(controller.perform_replace_all("hello", "x"), 0);
        assert!(controller.status().is_error());
    }

    #[test]
    fn test_availability_depends_on_target() {
        let plain = Rc::new(RefCell::new(
            TextBuffer::new("word").with_capabilities(TargetCapabilities::default()),
        ));
        let mut controller = SearchController::with_options(SearchOptions::new().regex(true));
        controller.attach_target(&plain, true);

        assert!(!controller.is_available(SearchOption::Regex, "word"));
        assert!(!controller.is_effective(SearchOption::Regex, "word"));
        assert!(controller.is_available(SearchOption::WholeWord, "word"));
        assert!(!controller.is_available(SearchOption::WholeWord, "two words"));
        assert!(controller.is_available(SearchOption::Incremental, "word"));

        let capable = shared("word");
        controller.attach_target(&capable, true);
        assert!(controller.is_effective(SearchOption::Regex, "word"));
        assert!(!controller.is_available(SearchOption::WholeWord, "word"));
        assert!(!controller.is_available(SearchOption::Incremental, "word"));
    }

    #[test]
    fn test_replace_all_runs_in_bulk_mode() {
        let target = Rc::new(RefCell::new(RecordingTarget::new("a a")));
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);

        assert_eq!(controller.perform_replace_all("a", "b"), 2);
        assert_eq!(
            target.borrow().events,
            vec!["begin", "validate", "bulk on", "replace", "replace", "bulk off"]
        );
        assert_eq!(target.borrow().buffer.text(), "b b");
    }

    #[test]
    fn test_read_only_owner_rejects_replace() {
        let target = shared("abc");
        let mut controller = SearchController::new();
        controller.attach_target(&target, false);

        assert_eq!(controller.perform_replace_all("abc", "x"), 0);
        assert!(controller.status().is_error());
        assert_eq!(controller.status().message(), "The target is read-only");
        assert_eq!(target.borrow().text(), "abc");
    }

    #[test]
    fn test_validate_state_veto() {
        let target = Rc::new(RefCell::new(RecordingTarget::new("abc")));
        target.borrow_mut().valid = false;
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);

        assert!(!controller.validate_target_state());
        assert!(controller.perform_search("abc"));
        assert!(!controller.perform_replace_selection("x"));
        assert!(controller.status().is_error());
        assert_eq!(target.borrow().buffer.text(), "abc");
    }

    #[test]
    fn test_global_scope_toggle_restores_saved_scope() {
        let target = shared("one\ntwo\nthree\n");
        target.borrow_mut().set_selection(5, 1);
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);

        controller.deactivate(SearchOption::GlobalScope);
        assert!(!controller.is_active(SearchOption::GlobalScope));
        assert_eq!(target.borrow().scope(), Some(Match::new(4, 4)));
        assert_eq!(target.borrow().selection(), Match::collapsed(4));
        assert!(controller.needs_initial_find_before_replace());
        assert_eq!(controller.perform_select_all("t"), 1);

        controller.activate(SearchOption::GlobalScope);
        assert_eq!(target.borrow().scope(), None);
        assert_eq!(controller.perform_select_all("t"), 2);

        target.borrow_mut().set_selection(0, 0);
        controller.deactivate(SearchOption::GlobalScope);
        assert_eq!(target.borrow().scope(), Some(Match::new(4, 4)));

        controller.deactivate_scope();
        assert_eq!(target.borrow().scope(), None);
    }

    #[test]
    fn test_backward_scope_moves_caret_to_scope_end() {
        let target = shared("one\ntwo\nthree\n");
        target.borrow_mut().set_selection(5, 0);
        let mut controller = SearchController::with_options(SearchOptions::new().forward(false));
        controller.attach_target(&target, true);

        controller.set_scope(true);
        assert_eq!(target.borrow().selection(), Match::collapsed(8));
    }

    #[test]
    fn test_select_all_pushes_multi_selection() {
        let target = shared("xa xa xa");
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);

        assert_eq!(controller.perform_select_all("xa"), 3);
        assert_eq!(
            target.borrow().multi_selection(),
            &[Match::new(0, 2), Match::new(3, 2), Match::new(6, 2)]
        );
        assert_eq!(controller.status().message(), "3 matches selected");
    }

    #[test]
    fn test_empty_matches_make_progress() {
        let target = shared("ab");
        let mut controller = SearchController::with_options(SearchOptions::new().regex(true));
        controller.attach_target(&target, true);

        assert_eq!(controller.perform_select_all("x*"), 3);
        assert_eq!(controller.perform_replace_all("x*", "-"), 3);
        assert_eq!(target.borrow().text(), "-a-b-");
    }

    #[test]
    fn test_cancelled_replace_all_keeps_text() {
        let target = shared("aaa");
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);

        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(controller.perform_replace_all_with("a", "b", &cancel), 0);
        assert!(controller.status().is_warning());
        assert_eq!(controller.status().message(), "Cancelled after 0 matches replaced");
        assert_eq!(target.borrow().text(), "aaa");
    }

    #[test]
    fn test_anchor_follows_incremental_toggle() {
        let target = shared("find me here");
        target.borrow_mut().set_selection(5, 2);
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);
        assert_eq!(controller.incremental_anchor(), Some(Match::default()));

        controller.activate(SearchOption::Incremental);
        assert_eq!(controller.incremental_anchor(), Some(Match::new(5, 2)));

        controller.activate(SearchOption::Regex);
        assert_eq!(controller.incremental_anchor(), Some(Match::default()));
    }

    #[test]
    fn test_invalid_regex_reports_error() {
        let target = shared("a[b");
        let mut controller = SearchController::with_options(SearchOptions::new().regex(true));
        controller.attach_target(&target, true);

        assert!(!controller.perform_search("["));
        assert!(controller.status().is_error());
        assert_eq!(target.borrow().selection(), Match::default());
    }

    #[test]
    fn test_end_session_clears_scope() {
        let target = shared("one\ntwo\n");
        let mut controller = SearchController::new();
        controller.attach_target(&target, true);
        controller.set_scope(true);
        assert!(target.borrow().scope().is_some());

        controller.end_session();
        assert_eq!(target.borrow().scope(), None);
    }

    #[test]
    fn test_drop_ends_session() {
        let target = shared("text");
        {
            let mut controller = SearchController::new();
            controller.attach_target(&target, true);
            assert!(target.borrow().is_session_active());
        }
        assert!(!target.borrow().is_session_active());
    }
}
