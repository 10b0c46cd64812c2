use crate::domain::CredentialStore;
use std::sync::{Mutex, PoisonError};

/// Process-lifetime credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`, as if a previous run had logged in.
    pub fn with_token(token: impl Into<String>) -> Self {
        MemoryCredentialStore {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    // ---
    fn save(&self, token: &str) -> anyhow::Result<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn read(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|t| !t.trim().is_empty())
    }

    fn clear(&self) {
        self.token.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}
