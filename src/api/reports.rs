use crate::domain::{ModerationStatus, NewReport, OperationalState, Report, ReportQuery};
use crate::gateway::Gateway;
use crate::ApiError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct StatusChange {
    status: ModerationStatus,
}

#[derive(Serialize)]
struct OperationalChange {
    estado: OperationalState,
}

/// `reports` resource: incident reports and their moderation.
#[derive(Clone)]
pub struct ReportsApi {
    gateway: Arc<Gateway>,
}

impl ReportsApi {
    // ---
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, query: &ReportQuery) -> Result<Vec<Report>, ApiError> {
        self.gateway.get_list(&["reports"], query).await
    }

    pub async fn get(&self, id: &str) -> Result<Report, ApiError> {
        self.gateway.get(&["reports", id]).await
    }

    #[tracing::instrument(skip(self, report), fields(title = %report.titulo))]
    pub async fn create(&self, report: &NewReport) -> Result<Report, ApiError> {
        self.gateway.post(&["reports"], report).await
    }

    #[tracing::instrument(skip(self, report))]
    pub async fn update(&self, id: &str, report: &NewReport) -> Result<Report, ApiError> {
        self.gateway.put(&["reports", id], report).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        self.gateway.delete(&["reports", id]).await
    }

    /// `PUT reports/:id/moderation`.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(&self, id: &str, status: ModerationStatus) -> Result<Report, ApiError> {
        self.gateway
            .put(&["reports", id, "moderation"], &StatusChange { status })
            .await
    }

    /// `PUT reports/:id/estado`.
    #[tracing::instrument(skip(self))]
    pub async fn set_operational_state(
        &self,
        id: &str,
        estado: OperationalState,
    ) -> Result<Report, ApiError> {
        self.gateway
            .put(&["reports", id, "estado"], &OperationalChange { estado })
            .await
    }
}
