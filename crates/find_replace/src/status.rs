//! Operation status reported to the UI
//!
//! A [`Status`] is produced by every controller operation. It is **not**
//! cleared automatically: callers reset it before each logical operation
//! with [`SearchController::reset_status`](crate::SearchController::reset_status),
//! otherwise an earlier warning or message carries over.

use serde::Serialize;

pub(crate) const WRAPPED: &str = "Wrapped search";

/// Severity of a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Ok,
    /// The operation succeeded with a caveat, or found nothing
    Warning,
    /// The operation failed
    Error,
}

/// Outcome of one find/replace operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Status {
    message: String,
    severity: Severity,
}

impl Status {
    /// Create a status with the given message and severity
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    /// The user-facing message, possibly empty
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Whether neither an error nor a warning was raised
    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    /// Replace the message. Clears a pending error but keeps a warning.
    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        if self.severity == Severity::Error {
            self.severity = Severity::Ok;
        }
    }

    /// Raise a warning unless an error is already recorded
    pub(crate) fn raise_warning(&mut self) {
        if self.severity != Severity::Error {
            self.severity = Severity::Warning;
        }
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.raise_warning();
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.severity = Severity::Error;
    }
}

pub(crate) fn not_found(find: &str) -> String {
    format!("String '{}' not found", find)
}

pub(crate) fn replaced(count: usize) -> String {
    if count == 1 {
        "1 match replaced".to_string()
    } else {
        format!("{} matches replaced", count)
    }
}

pub(crate) fn selected(count: usize) -> String {
    if count == 1 {
        "1 match selected".to_string()
    } else {
        format!("{} matches selected", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_ok_and_empty() {
        let status = Status::default();
        assert!(status.is_ok());
        assert!(!status.is_warning());
        assert!(!status.is_error());
        assert_eq!(status.message(), "");
    }

    #[test]
    fn test_error_wins_over_warning() {
        let mut status = Status::default();
        status.fail("bad pattern");
        status.raise_warning();
        assert!(status.is_error());
        assert_eq!(status.message(), "bad pattern");
    }

    #[test]
    fn test_message_keeps_warning() {
        let mut status = Status::default();
        status.raise_warning();
        status.set_message(WRAPPED);
        assert!(status.is_warning());
        assert_eq!(status.message(), "Wrapped search");
    }

    #[test]
    fn test_count_messages() {
        assert_eq!(replaced(1), "1 match replaced");
        assert_eq!(replaced(4), "4 matches replaced");
        assert_eq!(selected(1), "1 match selected");
        assert_eq!(selected(0), "0 matches selected");
        assert_eq!(not_found("abc"), "String 'abc' not found");
    }
}
