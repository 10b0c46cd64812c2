use crate::domain::{NoticeId, NoticeLevel, Notifier};
use std::sync::atomic::{AtomicU64, Ordering};

/// Notifier for headless use: notices become log lines.
#[derive(Default)]
pub struct TracingNotifier {
    next_id: AtomicU64,
}

impl TracingNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for TracingNotifier {
    // ---
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!(%level, "{message}"),
            NoticeLevel::Warning => tracing::warn!(%level, "{message}"),
            NoticeLevel::Error => tracing::error!(%level, "{message}"),
        }
    }

    fn pending(&self, message: &str) -> NoticeId {
        let id = NoticeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(notice = id.0, "{message}");
        id
    }

    fn settle(&self, id: NoticeId, level: NoticeLevel, message: &str) {
        tracing::debug!(notice = id.0, "settled");
        self.notify(level, message);
    }
}
