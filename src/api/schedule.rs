use crate::domain::ScheduleEntry;
use crate::gateway::Gateway;
use crate::ApiError;
use std::sync::Arc;

/// `recycling-schedule` resource. Read-only.
#[derive(Clone)]
pub struct ScheduleApi {
    gateway: Arc<Gateway>,
}

impl ScheduleApi {
    // ---
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list_all(&self) -> Result<Vec<ScheduleEntry>, ApiError> {
        self.gateway.get_list(&["recycling-schedule"], &()).await
    }

    pub async fn by_neighbourhood(&self, barrio: &str) -> Result<Vec<ScheduleEntry>, ApiError> {
        self.gateway
            .get_list(&["recycling-schedule"], &[("barrio", barrio)])
            .await
    }
}
