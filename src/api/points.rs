use crate::domain::{Point, PointDraft, PointPatch, PointQuery};
use crate::gateway::Gateway;
use crate::ApiError;
use std::sync::Arc;

/// `points` resource: recycling drop-off points.
#[derive(Clone)]
pub struct PointsApi {
    gateway: Arc<Gateway>,
}

impl PointsApi {
    // ---
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &PointQuery) -> Result<Vec<Point>, ApiError> {
        self.gateway.get_list(&["points"], query).await
    }

    pub async fn get(&self, id: &str) -> Result<Point, ApiError> {
        self.gateway.get(&["points", id]).await
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.nombre))]
    pub async fn create(&self, draft: &PointDraft) -> Result<Point, ApiError> {
        self.gateway.post(&["points"], draft).await
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: &PointPatch) -> Result<Point, ApiError> {
        self.gateway.put(&["points", id], patch).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.delete(&["points", id]).await
    }
}
