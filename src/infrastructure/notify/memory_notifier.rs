//! Notifier that keeps every notice in memory.
//!
//! Useful to drive a UI from polled state, and in tests to assert exactly
//! which notices an operation produced.

use crate::domain::{NoticeId, NoticeLevel, Notifier};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// A recorded notice. `level` is `None` while the notice is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub level: Option<NoticeLevel>,
    pub message: String,
}

#[derive(Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
    // Never reset, so a handle from before `clear` cannot settle a newer notice.
    next_id: AtomicU64,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices in the order they were first shown.
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    /// Number of notices whose current level is `level`.
    pub fn count(&self, level: NoticeLevel) -> usize {
        self.lock()
            .iter()
            .filter(|n| n.level == Some(level))
            .count()
    }

    /// Messages of notices whose current level is `level`.
    pub fn messages(&self, level: NoticeLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|n| n.level == Some(level))
            .map(|n| n.message.clone())
            .collect()
    }

    /// Number of notices still pending.
    pub fn pending_count(&self) -> usize {
        self.lock().iter().filter(|n| n.level.is_none()).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn next_id(&self) -> NoticeId {
        NoticeId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for MemoryNotifier {
    // ---
    fn notify(&self, level: NoticeLevel, message: &str) {
        let id = self.next_id();
        self.lock().push(Notice {
            id,
            level: Some(level),
            message: message.to_string(),
        });
    }

    fn pending(&self, message: &str) -> NoticeId {
        let id = self.next_id();
        self.lock().push(Notice {
            id,
            level: None,
            message: message.to_string(),
        });
        id
    }

    fn settle(&self, id: NoticeId, level: NoticeLevel, message: &str) {
        let mut notices = self.lock();
        match notices.iter_mut().find(|n| n.id == id) {
            Some(notice) => {
                notice.level = Some(level);
                notice.message = message.to_string();
            }
            None => tracing::debug!(notice = id.0, "settle for unknown notice"),
        }
    }
}
