//! Report moderation table and the citizen report form.

use super::checked;
use crate::api::ReportsApi;
use crate::domain::{
    CredentialStorePtr, MetricsPtr, ModerationStatus, Narration, NewReport, NoticeLevel,
    NotifierPtr, OperationalState, Report, ReportAction, ReportQuery, SIGN_IN_REQUIRED,
};
use crate::filters::{self, ReportFilter};
use crate::optimistic::OptimisticList;
use crate::{validation, ApiError};
use tokio::sync::watch;

pub const ACTION_NOT_AVAILABLE: &str = "That action is not available for this report.";
pub const UNKNOWN_REPORT: &str = "That report is no longer in the list.";

pub struct ReportsScreen {
    api: ReportsApi,
    list: OptimisticList<Report>,
    credentials: CredentialStorePtr,
    notifier: NotifierPtr,
}

impl ReportsScreen {
    // ---
    pub fn new(
        api: ReportsApi,
        credentials: CredentialStorePtr,
        notifier: NotifierPtr,
        metrics: MetricsPtr,
    ) -> Self {
        // ---
        Self {
            api,
            list: OptimisticList::new(notifier.clone(), metrics),
            credentials,
            notifier,
        }
    }

    pub async fn load(&self, query: &ReportQuery) -> Result<usize, ApiError> {
        self.list
            .load(self.api.list(query), "Could not load reports.")
            .await
    }

    pub fn items(&self) -> Vec<Report> {
        self.list.items()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Report>> {
        self.list.subscribe()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.list.is_pending(id)
    }

    /// Reports matching `filter`, in list order.
    pub fn rows(&self, filter: &ReportFilter) -> Vec<Report> {
        self.list
            .items()
            .into_iter()
            .filter(|report| filter.matches(report))
            .collect()
    }

    pub fn neighbourhoods(&self) -> Vec<String> {
        filters::neighbourhoods(&self.list.items())
    }

    // --- moderation

    pub async fn approve(&self, id: &str) -> Result<Report, ApiError> {
        self.moderate(id, ReportAction::Approve, ModerationStatus::Approved)
            .await
    }

    pub async fn reject(&self, id: &str) -> Result<Report, ApiError> {
        self.moderate(id, ReportAction::Reject, ModerationStatus::Rejected)
            .await
    }

    pub async fn mark_in_progress(&self, id: &str) -> Result<Report, ApiError> {
        self.advance(id, ReportAction::MarkInProgress, OperationalState::InProgress)
            .await
    }

    pub async fn mark_resolved(&self, id: &str) -> Result<Report, ApiError> {
        self.advance(id, ReportAction::MarkResolved, OperationalState::Resolved)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        // ---
        self.offered(id, ReportAction::Delete)?;
        let narration = Narration::new(
            "Deleting report…",
            "Report deleted.",
            "Could not delete the report.",
        );
        self.list.remove(id, self.api.remove(id), &narration).await
    }

    // --- creation

    /// Admin creation: the new report is shown at the top of the table.
    pub async fn create(&self, draft: NewReport) -> Result<Report, ApiError> {
        // ---
        checked(&self.notifier, validation::report_draft(&draft))?;
        let narration = Narration::new(
            "Creating report…",
            "Report created.",
            "Could not create the report.",
        );
        self.list
            .create(draft.placeholder(), self.api.create(&draft), &narration)
            .await
    }

    /// Citizen submission. Needs a stored credential; the report waits for
    /// moderation and is not added to the visible list.
    #[tracing::instrument(skip_all, fields(title = %draft.titulo))]
    pub async fn file_report(&self, draft: NewReport) -> Result<Report, ApiError> {
        // ---
        checked(&self.notifier, validation::report_draft(&draft))?;
        if self.credentials.read().is_none() {
            self.notifier.error(SIGN_IN_REQUIRED);
            return Err(ApiError::Unauthorized);
        }

        let notice = self.notifier.pending("Sending report…");
        match self.api.create(&draft).await {
            Ok(report) => {
                self.notifier.settle(
                    notice,
                    NoticeLevel::Success,
                    "Report sent. It will be published once reviewed.",
                );
                Ok(report)
            }
            Err(err) => {
                let narration = Narration::new("", "", "Could not send the report.");
                self.notifier
                    .settle(notice, NoticeLevel::Error, narration.failure_for(&err));
                Err(err)
            }
        }
    }

    // ---

    async fn moderate(
        &self,
        id: &str,
        action: ReportAction,
        status: ModerationStatus,
    ) -> Result<Report, ApiError> {
        // ---
        self.offered(id, action)?;
        let narration = match status {
            ModerationStatus::Approved => Narration::new(
                "Approving report…",
                "Report approved.",
                "Could not approve the report.",
            ),
            _ => Narration::new(
                "Rejecting report…",
                "Report rejected.",
                "Could not reject the report.",
            ),
        };
        self.list
            .update(
                id,
                |report| report.status = status,
                self.api.set_status(id, status),
                &narration,
            )
            .await
    }

    async fn advance(
        &self,
        id: &str,
        action: ReportAction,
        state: OperationalState,
    ) -> Result<Report, ApiError> {
        // ---
        self.offered(id, action)?;
        let narration = Narration::new(
            "Updating report state…",
            "Report state updated.",
            "Could not update the report state.",
        );
        self.list
            .update(
                id,
                |report| report.operational = Some(state),
                self.api.set_operational_state(id, state),
                &narration,
            )
            .await
    }

    /// Refuses actions the table would not offer for the report's state.
    fn offered(&self, id: &str, action: ReportAction) -> Result<(), ApiError> {
        // ---
        let Some(report) = self.list.get(id) else {
            self.notifier.warning(UNKNOWN_REPORT);
            return Err(ApiError::InvalidRequest(format!("unknown report {id}")));
        };
        if !report.available_actions().contains(&action) {
            tracing::debug!("{:?} not offered for report {}", action, id);
            self.notifier.warning(ACTION_NOT_AVAILABLE);
            return Err(ApiError::InvalidRequest(format!(
                "{action:?} not available for report {id}"
            )));
        }
        Ok(())
    }
}
