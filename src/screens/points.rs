//! Admin recycling points table.

use super::checked;
use crate::api::PointsApi;
use crate::domain::{MetricsPtr, Narration, NotifierPtr, Point, PointDraft, PointPatch, PointQuery};
use crate::filters::{self, PointFilter};
use crate::optimistic::OptimisticList;
use crate::{validation, ApiError};
use tokio::sync::watch;

pub struct PointsScreen {
    api: PointsApi,
    list: OptimisticList<Point>,
    notifier: NotifierPtr,
}

impl PointsScreen {
    // ---
    pub fn new(api: PointsApi, notifier: NotifierPtr, metrics: MetricsPtr) -> Self {
        Self {
            api,
            list: OptimisticList::new(notifier.clone(), metrics),
            notifier,
        }
    }

    pub async fn load(&self, query: &PointQuery) -> Result<usize, ApiError> {
        self.list
            .load(self.api.list(query), "Could not load recycling points.")
            .await
    }

    pub fn items(&self) -> Vec<Point> {
        self.list.items()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Point>> {
        self.list.subscribe()
    }

    pub fn rows(&self, filter: &PointFilter) -> Vec<Point> {
        self.list
            .items()
            .into_iter()
            .filter(|point| filter.matches(point))
            .collect()
    }

    pub fn neighbourhoods(&self) -> Vec<String> {
        filters::neighbourhoods(&self.list.items())
    }

    #[tracing::instrument(skip_all, fields(name = %draft.nombre))]
    pub async fn create(&self, draft: PointDraft) -> Result<Point, ApiError> {
        // ---
        checked(&self.notifier, validation::point_draft(&draft))?;
        let narration =
            Narration::new("Creating point…", "Point created.", "Could not create the point.");
        self.list
            .create(draft.placeholder(), self.api.create(&draft), &narration)
            .await
    }

    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: PointPatch) -> Result<Point, ApiError> {
        // ---
        let narration =
            Narration::new("Saving point…", "Point saved.", "Could not save the point.");
        self.list
            .update(
                id,
                |point| patch.apply(point),
                self.api.update(id, &patch),
                &narration,
            )
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let narration =
            Narration::new("Deleting point…", "Point deleted.", "Could not delete the point.");
        self.list.remove(id, self.api.remove(id), &narration).await
    }
}
