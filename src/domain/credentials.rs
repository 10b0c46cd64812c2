use std::sync::Arc;

/// Durable home of the bearer credential.
///
/// Exactly one token is stored at a time. Writers are limited to the
/// login/registration flow, logout, and the gateway's 401 handling;
/// every write is an unconditional overwrite or removal.
pub trait CredentialStore: Send + Sync + 'static {
    // ---
    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error only when the underlying storage cannot be written.
    fn save(&self, token: &str) -> anyhow::Result<()>;

    /// The stored token, or `None`. Never touches the network.
    fn read(&self) -> Option<String>;

    /// Remove the stored token. Calling it when nothing is stored is a no-op.
    fn clear(&self);

    /// Convenience for `read().is_some()`.
    fn is_present(&self) -> bool {
        self.read().is_some()
    }
}

/// Type alias for any backend that implements CredentialStore.
pub type CredentialStorePtr = Arc<dyn CredentialStore>;
