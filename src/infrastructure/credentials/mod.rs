mod file_store;
mod memory_store;

pub use file_store::FileCredentialStore;
pub use memory_store::MemoryCredentialStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Creates a credential store that survives process restarts.
///
/// The token lives in a single file at `path`; its parent directory is
/// created on first save.
pub fn create(path: PathBuf) -> crate::domain::CredentialStorePtr {
    tracing::debug!(path = %path.display(), "Using file credential store");
    Arc::new(FileCredentialStore::new(path))
}

/// Creates a credential store that lives as long as the process.
pub fn create_in_memory() -> crate::domain::CredentialStorePtr {
    Arc::new(MemoryCredentialStore::new())
}
