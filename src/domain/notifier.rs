//! Non-blocking notification surface.
//!
//! Screens report outcomes through a [`Notifier`]; how the notice reaches a
//! person (log line, toast, banner) is up to the implementation. Every call
//! is fire-and-forget.

use std::fmt;
use std::sync::Arc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Handle of a pending notice, settled once its operation resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(pub u64);

pub trait Notifier: Send + Sync + 'static {
    // ---
    /// Show a one-shot notice.
    fn notify(&self, level: NoticeLevel, message: &str);

    /// Show a notice for an operation that has not resolved yet.
    fn pending(&self, message: &str) -> NoticeId;

    /// Turn a pending notice into its final success or error form.
    fn settle(&self, id: NoticeId, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.notify(NoticeLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Type alias for any backend that implements Notifier.
pub type NotifierPtr = Arc<dyn Notifier>;

/// Messages shown while a mutation is pending and once it resolves.
#[derive(Debug, Clone)]
pub struct Narration {
    pub pending: String,
    pub success: String,
    pub failure: String,
    pub unauthorized: String,
}

/// Default text when the backend rejects the credential mid-operation.
pub const SIGN_IN_REQUIRED: &str = "You must sign in to do that.";

impl Narration {
    pub fn new(
        pending: impl Into<String>,
        success: impl Into<String>,
        failure: impl Into<String>,
    ) -> Self {
        // ---
        Self {
            pending: pending.into(),
            success: success.into(),
            failure: failure.into(),
            unauthorized: SIGN_IN_REQUIRED.to_string(),
        }
    }

    pub fn with_unauthorized(mut self, message: impl Into<String>) -> Self {
        self.unauthorized = message.into();
        self
    }

    /// The single failure message for `err`.
    pub fn failure_for(&self, err: &crate::ApiError) -> &str {
        if err.is_unauthorized() {
            &self.unauthorized
        } else {
            &self.failure
        }
    }
}
