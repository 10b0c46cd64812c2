//! Client wiring.
//!
//! [`EcoRgClient`] is the dependency container of the crate: it is built
//! once, holds every shared resource behind an `Arc`, and hands out screens
//! and resource clients that all share the same gateway, credential store,
//! notifier and metrics backend.

use crate::api::{AuthApi, PointsApi, ReportsApi, ScheduleApi, UsersApi};
use crate::config::ApiConfig;
use crate::domain::{
    CredentialStorePtr, Identity, MetricsPtr, Narration, NotifierPtr, Registration,
};
use crate::gateway::Gateway;
use crate::screens::{PointsScreen, ReportsScreen, UsersScreen};
use crate::session::{Session, SessionContext, SessionError};
use crate::{validation, ApiError};
use std::sync::Arc;

#[derive(Clone)]
pub struct EcoRgClient {
    gateway: Arc<Gateway>,
    session: Arc<SessionContext>,
    notifier: NotifierPtr,
    metrics: MetricsPtr,
    auth: AuthApi,
    users: UsersApi,
    reports: ReportsApi,
    points: PointsApi,
    schedule: ScheduleApi,
}

impl EcoRgClient {
    // ---

    /// Wires a client around `config` and the given backends.
    ///
    /// The session starts in its initial state; call [`resolve`](Self::resolve)
    /// (or `session().spawn_resolve()`) to find out who is signed in.
    pub fn new(
        config: &ApiConfig,
        credentials: CredentialStorePtr,
        notifier: NotifierPtr,
        metrics: MetricsPtr,
    ) -> Result<Self, ApiError> {
        // ---
        let gateway = Arc::new(Gateway::new(config, credentials.clone(), metrics.clone())?);
        let auth = AuthApi::new(gateway.clone());
        let session = Arc::new(SessionContext::new(credentials, Arc::new(auth.clone())));

        Ok(Self {
            users: UsersApi::new(gateway.clone()),
            reports: ReportsApi::new(gateway.clone()),
            points: PointsApi::new(gateway.clone()),
            schedule: ScheduleApi::new(gateway.clone()),
            auth,
            session,
            gateway,
            notifier,
            metrics,
        })
    }

    // --- session flows

    /// Resolve the startup identity. Only the first call does any work.
    pub async fn resolve(&self) -> Session {
        self.session.resolve().await
    }

    /// Log in with email and password and make the result the session.
    #[tracing::instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        // ---
        crate::screens::checked(&self.notifier, validation::login(email, password))?;

        let result = async {
            let response = self.auth.login(email, password).await?;
            self.identity_after_auth(response.user).await
        }
        .await;

        let narration = Narration::new("", "Signed in.", "Could not sign in.")
            .with_unauthorized("Invalid email or password.");
        self.finish_auth(result, &narration)
    }

    /// Register a new account and sign it in.
    #[tracing::instrument(skip_all, fields(email = %registration.email))]
    pub async fn sign_up(&self, registration: &Registration) -> Result<Identity, ApiError> {
        // ---
        crate::screens::checked(&self.notifier, validation::registration(registration))?;

        let result = async {
            let response = self.auth.register(registration).await?;
            self.identity_after_auth(response.user).await
        }
        .await;

        let narration = Narration::new("", "Account created.", "Could not create the account.");
        self.finish_auth(result, &narration)
    }

    /// Forget the credential and end the session.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        // ---
        self.session.logout()?;
        self.notifier.info("Signed out.");
        Ok(())
    }

    // --- screens

    pub fn reports_screen(&self) -> ReportsScreen {
        ReportsScreen::new(
            self.reports.clone(),
            self.gateway.credentials().clone(),
            self.notifier.clone(),
            self.metrics.clone(),
        )
    }

    pub fn users_screen(&self) -> UsersScreen {
        UsersScreen::new(self.users.clone(), self.notifier.clone(), self.metrics.clone())
    }

    pub fn points_screen(&self) -> PointsScreen {
        PointsScreen::new(self.points.clone(), self.notifier.clone(), self.metrics.clone())
    }

    // --- accessors

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn credentials(&self) -> &CredentialStorePtr {
        self.gateway.credentials()
    }

    pub fn notifier(&self) -> &NotifierPtr {
        &self.notifier
    }

    pub fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn users(&self) -> &UsersApi {
        &self.users
    }

    pub fn reports(&self) -> &ReportsApi {
        &self.reports
    }

    pub fn points(&self) -> &PointsApi {
        &self.points
    }

    pub fn schedule(&self) -> &ScheduleApi {
        &self.schedule
    }

    // ---

    /// The user from the auth answer, or `users/me` when it carried a token
    /// only. A failed fetch drops the token just saved.
    async fn identity_after_auth(&self, user: Option<Identity>) -> Result<Identity, ApiError> {
        // ---
        if let Some(identity) = user {
            return Ok(identity);
        }
        self.auth.me().await.inspect_err(|_| self.auth.logout())
    }

    fn finish_auth(
        &self,
        result: Result<Identity, ApiError>,
        narration: &Narration,
    ) -> Result<Identity, ApiError> {
        // ---
        match result {
            Ok(identity) => {
                self.session.login(identity.clone());
                self.notifier.success(&narration.success);
                Ok(identity)
            }
            Err(err) => {
                tracing::warn!("Authentication flow failed: {}", err);
                match &err {
                    ApiError::Rejected { message, .. } => self.notifier.error(message),
                    other => self.notifier.error(narration.failure_for(other)),
                }
                Err(err)
            }
        }
    }
}
