//! Authentication endpoints.
//!
//! Login and registration persist the returned token through the gateway's
//! credential store before handing the response back, so the next request
//! is already authenticated.

use crate::domain::{AuthResponse, Identity, LoginRequest, Registration};
use crate::gateway::Gateway;
use crate::session::IdentitySource;
use crate::ApiError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthApi {
    gateway: Arc<Gateway>,
}

impl AuthApi {
    // ---
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// `POST auth/login`. Saves the token on success.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        // ---
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.gateway.post(&["auth", "login"], &body).await?;
        self.persist(&response.token)?;
        Ok(response)
    }

    /// `POST auth/register`. Saves the token on success.
    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        // ---
        let response: AuthResponse = self.gateway.post(&["auth", "register"], registration).await?;
        self.persist(&response.token)?;
        Ok(response)
    }

    /// `GET users/me` with the stored credential.
    pub async fn me(&self) -> Result<Identity, ApiError> {
        self.gateway.get(&["users", "me"]).await
    }

    /// Forget the stored credential. No request is sent.
    pub fn logout(&self) {
        self.gateway.credentials().clear();
    }

    fn persist(&self, token: &str) -> Result<(), ApiError> {
        // ---
        if token.trim().is_empty() {
            return Err(ApiError::Decode("backend returned an empty token".into()));
        }
        self.gateway.credentials().save(token).map_err(|err| {
            tracing::error!("Failed to persist credential: {:#}", err);
            ApiError::InvalidRequest(format!("could not store credential: {err}"))
        })
    }
}

#[async_trait::async_trait]
impl IdentitySource for AuthApi {
    async fn fetch_identity(&self) -> Result<Identity, ApiError> {
        self.me().await
    }
}
