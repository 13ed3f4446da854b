//! Per-target session state

use crate::target::{FindReplaceTarget, Match, SharedTarget, TargetCapabilities};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// State tied to one attached target.
///
/// Created by [`SearchController::attach_target`](crate::SearchController::attach_target)
/// and dropped when the session ends, so nothing here outlives the target it
/// was computed for.
pub struct SearchSession {
    target: Weak<RefCell<dyn FindReplaceTarget>>,
    /// Capabilities reported by the target at attach time
    pub capabilities: TargetCapabilities,
    /// Whether the owner allows editing through find/replace
    pub editable: bool,
    /// Start offset and length incremental search is anchored to
    pub incremental_anchor: Match,
    /// Set when the selection may no longer be a match (fresh target, scope change)
    pub needs_initial_find: bool,
    /// Scope remembered when switching back to a global search
    pub saved_scope: Option<Match>,
    /// The last match this session selected through a search
    pub last_found: Option<Match>,
}

impl SearchSession {
    pub(crate) fn new(target: &SharedTarget, capabilities: TargetCapabilities, editable: bool) -> Self {
        Self {
            target: Rc::downgrade(target),
            capabilities,
            editable,
            incremental_anchor: Match::default(),
            needs_initial_find: true,
            saved_scope: None,
            last_found: None,
        }
    }

    /// The target, if its owner still holds it
    pub fn target(&self) -> Option<SharedTarget> {
        self.target.upgrade()
    }

    /// Whether `target` is the target of this session
    pub fn is_for(&self, target: &SharedTarget) -> bool {
        self.target
            .upgrade()
            .is_some_and(|current| std::ptr::addr_eq(Rc::as_ptr(&current), Rc::as_ptr(target)))
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("attached", &(self.target.strong_count() > 0))
            .field("capabilities", &self.capabilities)
            .field("editable", &self.editable)
            .field("incremental_anchor", &self.incremental_anchor)
            .field("needs_initial_find", &self.needs_initial_find)
            .field("saved_scope", &self.saved_scope)
            .field("last_found", &self.last_found)
            .finish()
    }
}
