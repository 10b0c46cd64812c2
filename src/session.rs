//! Session context for the signed-in user.
//!
//! Holds the current identity and a readiness flag for the lifetime of the
//! process. There is one writer (this context) and any number of observers
//! subscribed through a watch channel, so the identity is fetched once no
//! matter how many consumers look at it.
//!
//! States over `(ready, identity)`:
//!
//! | state       | ready | identity | reached by                               |
//! |-------------|-------|----------|------------------------------------------|
//! | Initial     | false | none     | construction                             |
//! | HasUser     | true  | some     | successful startup fetch, `login`        |
//! | NoUser      | true  | none     | no token, failed startup fetch, `logout` |
//!
//! `ready` never goes back to false.

use crate::domain::{CredentialStorePtr, Identity};
use crate::ApiError;
use std::sync::{Arc, Weak};
use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;

// ---

/// Where the startup identity comes from.
#[async_trait::async_trait]
pub trait IdentitySource: Send + Sync + 'static {
    async fn fetch_identity(&self) -> Result<Identity, ApiError>;
}

/// Snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub identity: Option<Identity>,
    pub ready: bool,
}

/// The three cases a consumer has to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Identity not resolved yet. Neither "signed in" nor "signed out".
    Initial,
    HasUser,
    NoUser,
}

impl Session {
    pub fn phase(&self) -> SessionPhase {
        match (self.ready, &self.identity) {
            (false, _) => SessionPhase::Initial,
            (true, Some(_)) => SessionPhase::HasUser,
            (true, None) => SessionPhase::NoUser,
        }
    }

    /// `None` while not ready: the answer is unknown, not "no".
    pub fn is_admin(&self) -> Option<bool> {
        self.ready
            .then(|| self.identity.as_ref().is_some_and(Identity::is_admin))
    }
}

/// What a guarded view requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    SignedIn,
    Admin,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Session not ready; render a neutral placeholder.
    Pending,
    Granted,
    RedirectToLogin,
    RedirectHome,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("the session has not been resolved yet")]
    NotReady,
}

// ---

/// Process-wide owner of the [`Session`].
pub struct SessionContext {
    credentials: CredentialStorePtr,
    source: Arc<dyn IdentitySource>,
    state: watch::Sender<Session>,
    // Completed once the startup fetch has been applied. A caller dropped
    // mid-fetch leaves it unset and the next caller runs the fetch.
    resolution: Arc<OnceCell<()>>,
}

impl SessionContext {
    // ---
    pub fn new(credentials: CredentialStorePtr, source: Arc<dyn IdentitySource>) -> Self {
        // ---
        let (state, _) = watch::channel(Session::default());
        Self {
            credentials,
            source,
            state,
            resolution: Arc::new(OnceCell::new()),
        }
    }

    /// Resolve the startup identity.
    ///
    /// The first call fetches `users/me` if and only if a credential is
    /// stored. Any later or concurrent call waits for that outcome instead
    /// of fetching again. If the fetching call is cancelled, a waiting
    /// caller takes the fetch over.
    pub async fn resolve(&self) -> Session {
        // ---
        self.resolution
            .get_or_init(|| async {
                if self.is_ready() {
                    return;
                }
                let outcome = startup_identity(&self.credentials, self.source.as_ref()).await;
                self.finish_resolution(outcome);
            })
            .await;
        self.current()
    }

    /// Resolve on the runtime in the background.
    ///
    /// The task only holds a weak reference while the fetch is in flight;
    /// if the context is dropped first the outcome is discarded.
    pub fn spawn_resolve(self: &Arc<Self>) -> JoinHandle<()> {
        // ---
        let weak: Weak<Self> = Arc::downgrade(self);
        let resolution = self.resolution.clone();
        let credentials = self.credentials.clone();
        let source = self.source.clone();

        tokio::spawn(async move {
            resolution
                .get_or_init(|| async {
                    if weak.upgrade().map_or(true, |ctx| ctx.is_ready()) {
                        return;
                    }
                    let outcome = startup_identity(&credentials, source.as_ref()).await;
                    match weak.upgrade() {
                        Some(ctx) => ctx.finish_resolution(outcome),
                        None => tracing::debug!("Session context dropped mid-resolution"),
                    }
                })
                .await;
        })
    }

    /// Enter HasUser with an identity obtained by a login/registration flow.
    ///
    /// The caller has already stored the credential. No request is made.
    pub fn login(&self, identity: Identity) {
        // ---
        tracing::info!("Session started for {}", identity.id);
        self.state.send_replace(Session {
            identity: Some(identity),
            ready: true,
        });
    }

    /// Clear the credential and enter NoUser.
    ///
    /// # Errors
    /// [`SessionError::NotReady`] before the session has been resolved.
    pub fn logout(&self) -> Result<(), SessionError> {
        // ---
        if !self.state.borrow().ready {
            return Err(SessionError::NotReady);
        }
        self.credentials.clear();
        self.enter_no_user();
        tracing::info!("Session ended");
        Ok(())
    }

    /// Current session.
    ///
    /// If an identity is held but the credential has since been cleared
    /// (the gateway does that on any 401), the session drops to NoUser
    /// first.
    pub fn current(&self) -> Session {
        // ---
        let stale = {
            let session = self.state.borrow();
            session.identity.is_some() && !self.credentials.is_present()
        };
        if stale {
            tracing::info!("Credential gone; dropping session identity");
            self.enter_no_user();
        }
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.current().phase()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current().identity
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    /// `None` while not ready.
    pub fn is_admin(&self) -> Option<bool> {
        self.current().is_admin()
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Decide whether a guarded view may render.
    pub fn gate(&self, access: Access) -> Gate {
        // ---
        let session = self.current();
        match (session.phase(), access) {
            (SessionPhase::Initial, _) => Gate::Pending,
            (SessionPhase::HasUser, Access::SignedIn) => Gate::Granted,
            (SessionPhase::NoUser, Access::SignedIn) => Gate::RedirectToLogin,
            (_, Access::Admin) if session.is_admin() == Some(true) => Gate::Granted,
            (_, Access::Admin) => Gate::RedirectHome,
        }
    }

    // ---

    fn finish_resolution(&self, outcome: Option<Identity>) {
        // ---
        // A login that landed while the fetch was in flight wins.
        self.state.send_if_modified(|session| {
            if session.ready {
                return false;
            }
            session.identity = outcome;
            session.ready = true;
            true
        });
        tracing::info!("Session resolved: {:?}", self.state.borrow().phase());
    }

    fn enter_no_user(&self) {
        self.state.send_if_modified(|session| {
            let changed = session.identity.is_some() || !session.ready;
            session.identity = None;
            session.ready = true;
            changed
        });
    }
}

/// The startup fetch: skipped without a token, clears the token on failure.
async fn startup_identity(
    credentials: &CredentialStorePtr,
    source: &dyn IdentitySource,
) -> Option<Identity> {
    // ---
    if !credentials.is_present() {
        tracing::debug!("No stored credential; skipping identity fetch");
        return None;
    }

    match source.fetch_identity().await {
        Ok(identity) => Some(identity),
        Err(err) => {
            tracing::warn!("Startup identity fetch failed: {}", err);
            credentials.clear();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{CredentialStore, Role};
    use crate::infrastructure::credentials::MemoryCredentialStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeSource {
        calls: AtomicUsize,
        result: Result<Identity, ApiError>,
        delay: Duration,
    }

    impl FakeSource {
        fn ok(identity: Identity) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Ok(identity),
                delay: Duration::ZERO,
            })
        }

        fn failing(err: ApiError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Err(err),
                delay: Duration::ZERO,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl IdentitySource for FakeSource {
        async fn fetch_identity(&self) -> Result<Identity, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    fn context(store: &Arc<MemoryCredentialStore>, source: &Arc<FakeSource>) -> SessionContext {
        SessionContext::new(store.clone(), source.clone())
    }

    #[tokio::test]
    async fn empty_store_resolves_without_fetching() {
        // ---
        let store = Arc::new(MemoryCredentialStore::new());
        let source = FakeSource::ok(Identity::new("u1", Role::User));
        let ctx = context(&store, &source);

        assert_eq!(ctx.phase(), SessionPhase::Initial);
        let session = ctx.resolve().await;

        assert_eq!(session.phase(), SessionPhase::NoUser);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn stored_token_resolves_identity_once() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = FakeSource::ok(Identity::new("u1", Role::Admin));
        let ctx = context(&store, &source);

        let (a, b) = tokio::join!(ctx.resolve(), ctx.resolve());
        assert_eq!(a, b);
        assert_eq!(a.phase(), SessionPhase::HasUser);
        assert_eq!(ctx.is_admin(), Some(true));
        assert_eq!(source.calls(), 1);

        ctx.resolve().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_clears_credential() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("expired"));
        let source = FakeSource::failing(ApiError::Transport("connection refused".into()));
        let ctx = context(&store, &source);

        let session = ctx.resolve().await;
        assert_eq!(session.phase(), SessionPhase::NoUser);
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn login_then_logout_ends_signed_out() {
        // ---
        let store = Arc::new(MemoryCredentialStore::new());
        let source = FakeSource::ok(Identity::new("u1", Role::User));
        let ctx = context(&store, &source);

        store.save("tok123").unwrap();
        ctx.login(Identity::new("u1", Role::User));
        assert_eq!(ctx.phase(), SessionPhase::HasUser);

        ctx.logout().unwrap();
        assert_eq!(ctx.phase(), SessionPhase::NoUser);
        assert!(ctx.is_ready());
        assert_eq!(store.read(), None);

        ctx.logout().unwrap();
        assert_eq!(ctx.phase(), SessionPhase::NoUser);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn logout_before_ready_is_refused() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = FakeSource::ok(Identity::new("u1", Role::User));
        let ctx = context(&store, &source);

        assert_eq!(ctx.logout(), Err(SessionError::NotReady));
        assert!(store.is_present());
    }

    #[tokio::test]
    async fn cleared_credential_drops_identity_on_next_check() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = FakeSource::ok(Identity::new("u1", Role::User));
        let ctx = context(&store, &source);
        ctx.resolve().await;
        assert_eq!(ctx.phase(), SessionPhase::HasUser);

        store.clear();
        assert_eq!(ctx.phase(), SessionPhase::NoUser);
        assert_eq!(ctx.gate(Access::SignedIn), Gate::RedirectToLogin);
    }

    #[tokio::test]
    async fn gates_wait_for_readiness() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = FakeSource::ok(Identity::new("u1", Role::User));
        let ctx = context(&store, &source);

        assert_eq!(ctx.gate(Access::SignedIn), Gate::Pending);
        assert_eq!(ctx.gate(Access::Admin), Gate::Pending);
        assert_eq!(ctx.is_admin(), None);

        ctx.resolve().await;
        assert_eq!(ctx.gate(Access::SignedIn), Gate::Granted);
        assert_eq!(ctx.gate(Access::Admin), Gate::RedirectHome);

        ctx.login(Identity::new("a1", Role::Admin));
        assert_eq!(ctx.gate(Access::Admin), Gate::Granted);
    }

    #[tokio::test]
    async fn spawned_resolution_is_discarded_after_drop() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = Arc::new(FakeSource {
            calls: AtomicUsize::new(0),
            result: Ok(Identity::new("u1", Role::User)),
            delay: Duration::from_millis(50),
        });
        let ctx = Arc::new(context(&store, &source));
        let mut rx = ctx.subscribe();

        let handle = ctx.spawn_resolve();
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(ctx);
        handle.await.unwrap();

        assert_eq!(source.calls(), 1);
        assert!(!rx.borrow_and_update().ready);
    }

    #[tokio::test]
    async fn spawned_resolution_notifies_subscribers() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = FakeSource::ok(Identity::new("u1", Role::User));
        let ctx = Arc::new(context(&store, &source));
        let mut rx = ctx.subscribe();

        ctx.spawn_resolve().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().phase(), SessionPhase::HasUser);
    }

    #[tokio::test]
    async fn cancelled_resolution_is_taken_over() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = Arc::new(FakeSource {
            calls: AtomicUsize::new(0),
            result: Ok(Identity::new("u1", Role::User)),
            delay: Duration::from_millis(200),
        });
        let ctx = context(&store, &source);

        let first = tokio::time::timeout(Duration::from_millis(20), ctx.resolve()).await;
        assert!(first.is_err());
        assert!(!ctx.is_ready());

        let session = tokio::time::timeout(Duration::from_secs(2), ctx.resolve())
            .await
            .unwrap();
        assert_eq!(session.phase(), SessionPhase::HasUser);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn resolve_after_login_makes_no_request() {
        // ---
        let store = Arc::new(MemoryCredentialStore::with_token("tok"));
        let source = FakeSource::ok(Identity::new("u1", Role::User));
        let ctx = context(&store, &source);

        ctx.login(Identity::new("a1", Role::Admin));
        let session = ctx.resolve().await;

        assert_eq!(session.identity, Some(Identity::new("a1", Role::Admin)));
        assert_eq!(source.calls(), 0);
    }
}
