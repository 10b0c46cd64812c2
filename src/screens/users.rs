//! Admin users table.

use super::checked;
use crate::api::UsersApi;
use crate::domain::{
    Identity, MetricsPtr, Narration, NewUser, NotifierPtr, Role, UserPatch, UserQuery,
};
use crate::filters::UserFilter;
use crate::optimistic::OptimisticList;
use crate::{validation, ApiError};
use tokio::sync::watch;

pub struct UsersScreen {
    api: UsersApi,
    list: OptimisticList<Identity>,
    notifier: NotifierPtr,
}

impl UsersScreen {
    // ---
    pub fn new(api: UsersApi, notifier: NotifierPtr, metrics: MetricsPtr) -> Self {
        Self {
            api,
            list: OptimisticList::new(notifier.clone(), metrics),
            notifier,
        }
    }

    pub async fn load(&self, query: &UserQuery) -> Result<usize, ApiError> {
        self.list
            .load(self.api.list(query), "Could not load users.")
            .await
    }

    pub fn items(&self) -> Vec<Identity> {
        self.list.items()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Identity>> {
        self.list.subscribe()
    }

    pub fn rows(&self, filter: &UserFilter) -> Vec<Identity> {
        self.list
            .items()
            .into_iter()
            .filter(|user| filter.matches(user))
            .collect()
    }

    #[tracing::instrument(skip_all, fields(email = %user.email))]
    pub async fn create(&self, user: NewUser) -> Result<Identity, ApiError> {
        // ---
        checked(&self.notifier, validation::new_user(&user))?;
        let narration =
            Narration::new("Creating user…", "User created.", "Could not create the user.");
        self.list
            .create(user.placeholder(), self.api.create(&user), &narration)
            .await
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<Identity, ApiError> {
        // ---
        checked(&self.notifier, validation::user_patch(&patch))?;
        let narration = Narration::new("Saving user…", "User saved.", "Could not save the user.");
        self.list
            .update(
                id,
                |user| patch.apply(user),
                self.api.update(id, &patch),
                &narration,
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_role(&self, id: &str, role: Role) -> Result<Identity, ApiError> {
        // ---
        let narration =
            Narration::new("Changing role…", "Role updated.", "Could not change the role.");
        self.list
            .update(id, |user| user.role = role, self.api.set_role(id, role), &narration)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let narration =
            Narration::new("Deleting user…", "User deleted.", "Could not delete the user.");
        self.list.remove(id, self.api.remove(id), &narration).await
    }
}
