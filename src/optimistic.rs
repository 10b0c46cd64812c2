//! Optimistic mutations over an entity list.
//!
//! Every mutation follows the same protocol:
//!
//! 1. snapshot the visible list,
//! 2. publish the intended post-mutation list,
//! 3. await the backend call,
//! 4. on success, replace the touched entry with the server record,
//! 5. on failure, publish the snapshot again and emit one error notice.
//!
//! Futures are lazy, so the call passed in is not dispatched before step 2
//! has been published to subscribers.
//!
//! Mutations on the same id are serialised: while one is waiting for the
//! backend, another on that id is refused with [`ApiError::Busy`].
//! Mutations on different ids run independently. A rollback restores the
//! snapshot taken by the failing mutation, which also undoes any unrelated
//! change that completed in between.

use crate::domain::{Entity, MetricsPtr, Narration, NoticeLevel, NotifierPtr};
use crate::ApiError;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

const PLACEHOLDER_PREFIX: &str = "tmp-";

/// Message shown when a second change to the same record is attempted.
pub const BUSY_MESSAGE: &str = "A change to this record is still being saved.";

/// True for ids minted for records the backend has not confirmed yet.
pub fn is_placeholder_id(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

/// Ordered list of records with optimistic create/update/delete.
pub struct OptimisticList<T: Entity> {
    items: watch::Sender<Vec<T>>,
    in_flight: Mutex<HashSet<String>>,
    notifier: NotifierPtr,
    metrics: MetricsPtr,
}

/// Removes an id from the in-flight set when the mutation ends, however it ends.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl<T: Entity> OptimisticList<T> {
    // ---
    pub fn new(notifier: NotifierPtr, metrics: MetricsPtr) -> Self {
        Self::with_items(Vec::new(), notifier, metrics)
    }

    pub fn with_items(items: Vec<T>, notifier: NotifierPtr, metrics: MetricsPtr) -> Self {
        // ---
        let (items, _) = watch::channel(items);
        Self {
            items,
            in_flight: Mutex::new(HashSet::new()),
            notifier,
            metrics,
        }
    }

    /// Copy of the visible list.
    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.items.borrow().iter().find(|item| item.id() == id).cloned()
    }

    /// Observe every published list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.items.subscribe()
    }

    /// Whether a mutation on `id` is waiting for the backend.
    pub fn is_pending(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    pub fn replace_all(&self, items: Vec<T>) {
        self.items.send_replace(items);
    }

    /// Replace the list with a fresh fetch.
    ///
    /// On failure the list is left as it was and one error notice is shown.
    pub async fn load<F>(&self, fetch: F, failure: &str) -> Result<usize, ApiError>
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
    {
        // ---
        match fetch.await {
            Ok(items) => {
                let count = items.len();
                self.replace_all(items);
                Ok(count)
            }
            Err(err) => {
                tracing::warn!("Loading {} list failed: {}", T::KIND, err);
                self.notifier.error(failure);
                Err(err)
            }
        }
    }

    /// Prepend `placeholder` under a temporary id, then swap in the server record.
    pub async fn create<F>(
        &self,
        mut placeholder: T,
        call: F,
        narration: &Narration,
    ) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        // ---
        let temp_id = format!("{PLACEHOLDER_PREFIX}{}", uuid::Uuid::new_v4());
        placeholder.set_id(temp_id.clone());

        self.run(
            &temp_id,
            move |items| items.insert(0, placeholder),
            call,
            |items, created: &T| match items.iter().position(|item| item.id() == temp_id) {
                Some(idx) => items[idx] = created.clone(),
                None => items.insert(0, created.clone()),
            },
            narration,
        )
        .await
    }

    /// Patch the record locally, then replace it with the server record.
    pub async fn update<P, F>(
        &self,
        id: &str,
        patch: P,
        call: F,
        narration: &Narration,
    ) -> Result<T, ApiError>
    where
        P: FnOnce(&mut T),
        F: Future<Output = Result<T, ApiError>>,
    {
        // ---
        let owned_id = id.to_string();
        self.run(
            id,
            move |items| {
                if let Some(item) = items.iter_mut().find(|item| item.id() == owned_id) {
                    patch(item);
                }
            },
            call,
            |items, saved: &T| replace_by_id(items, id, saved),
            narration,
        )
        .await
    }

    /// Remove the record locally; keep it removed once the backend confirms.
    pub async fn remove<F, R>(
        &self,
        id: &str,
        call: F,
        narration: &Narration,
    ) -> Result<R, ApiError>
    where
        F: Future<Output = Result<R, ApiError>>,
    {
        // ---
        let owned_id = id.to_string();
        self.run(
            id,
            move |items| items.retain(|item| item.id() != owned_id),
            call,
            |_, _| {},
            narration,
        )
        .await
    }

    // ---

    async fn run<R, A, F, S>(
        &self,
        id: &str,
        apply: A,
        call: F,
        on_success: S,
        narration: &Narration,
    ) -> Result<R, ApiError>
    where
        A: FnOnce(&mut Vec<T>),
        F: Future<Output = Result<R, ApiError>>,
        S: FnOnce(&mut Vec<T>, &R),
    {
        // ---
        let Some(_guard) = self.claim(id) else {
            tracing::debug!("{} {} busy; refusing concurrent change", T::KIND, id);
            self.notifier.warning(BUSY_MESSAGE);
            return Err(ApiError::Busy(id.to_string()));
        };

        let snapshot = self.items();
        self.items.send_modify(apply);

        let notice = self.notifier.pending(&narration.pending);
        match call.await {
            Ok(value) => {
                self.items.send_modify(|items| on_success(items, &value));
                self.notifier
                    .settle(notice, NoticeLevel::Success, &narration.success);
                Ok(value)
            }
            Err(err) => {
                tracing::warn!("Rolling back {} {}: {}", T::KIND, id, err);
                self.items.send_replace(snapshot);
                self.metrics.record_rollback(T::KIND);
                self.notifier
                    .settle(notice, NoticeLevel::Error, narration.failure_for(&err));
                Err(err)
            }
        }
    }

    fn claim(&self, id: &str) -> Option<InFlight<'_>> {
        // ---
        let mut set = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        set.insert(id.to_string()).then(|| InFlight {
            set: &self.in_flight,
            id: id.to_string(),
        })
    }
}

fn replace_by_id<T: Entity>(items: &mut [T], id: &str, record: &T) {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(slot) => *slot = record.clone(),
        None => tracing::debug!("{} {} vanished before reconciliation", T::KIND, id),
    }
}
