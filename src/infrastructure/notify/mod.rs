mod memory_notifier;
mod tracing_notifier;

pub use memory_notifier::{MemoryNotifier, Notice};
pub use tracing_notifier::TracingNotifier;
use std::sync::Arc;

/// Creates a notifier that writes every notice to the tracing log.
pub fn create() -> crate::domain::NotifierPtr {
    Arc::new(TracingNotifier::new())
}
