use crate::domain::{Avatar, Identity, NewUser, ProfileUpdate, Role, UserPatch, UserQuery};
use crate::gateway::Gateway;
use crate::ApiError;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleChange<'a> {
    user_id: &'a str,
    role: Role,
}

/// `users` resource: the signed-in profile and admin management.
#[derive(Clone)]
pub struct UsersApi {
    gateway: Arc<Gateway>,
}

impl UsersApi {
    // ---
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn get_me(&self) -> Result<Identity, ApiError> {
        self.gateway.get(&["users", "me"]).await
    }

    /// `PUT users/me`, as multipart when an avatar is attached, JSON otherwise.
    #[tracing::instrument(skip_all, fields(with_avatar = avatar.is_some()))]
    pub async fn update_me(
        &self,
        profile: &ProfileUpdate,
        avatar: Option<Avatar>,
    ) -> Result<Identity, ApiError> {
        // ---
        match avatar {
            None => self.gateway.put(&["users", "me"], profile).await,
            Some(avatar) => {
                let form = profile_form(profile, avatar)?;
                self.gateway.put_multipart(&["users", "me"], form).await
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_role(&self, id: &str, role: Role) -> Result<Identity, ApiError> {
        let body = RoleChange { user_id: id, role };
        self.gateway.put(&["users", id, "role"], &body).await
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Vec<Identity>, ApiError> {
        self.gateway.get_list(&["users"], query).await
    }

    pub async fn get(&self, id: &str) -> Result<Identity, ApiError> {
        self.gateway.get(&["users", id]).await
    }

    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create(&self, user: &NewUser) -> Result<Identity, ApiError> {
        self.gateway.post(&["users"], user).await
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: &UserPatch) -> Result<Identity, ApiError> {
        self.gateway.put(&["users", id], patch).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.delete(&["users", id]).await
    }
}

/// Text fields of `profile` plus the avatar file. Unset fields are omitted.
fn profile_form(profile: &ProfileUpdate, avatar: Avatar) -> Result<Form, ApiError> {
    // ---
    let fields = serde_json::to_value(profile)
        .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;

    let mut form = Form::new();
    if let serde_json::Value::Object(map) = fields {
        for (key, value) in map {
            match value {
                serde_json::Value::Null => {}
                serde_json::Value::String(text) => form = form.text(key, text),
                other => form = form.text(key, other.to_string()),
            }
        }
    }

    let part = Part::bytes(avatar.bytes)
        .file_name(avatar.file_name)
        .mime_str(&avatar.mime_type)
        .map_err(|err| ApiError::InvalidRequest(format!("bad avatar mime type: {err}")))?;

    Ok(form.part("avatar", part))
}
