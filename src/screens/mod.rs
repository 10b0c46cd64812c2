//! Screen controllers.
//!
//! Each screen owns one [`OptimisticList`](crate::optimistic::OptimisticList)
//! and the resource client it mutates through. Client-side checks run
//! before anything is published or sent.

mod points;
mod reports;
mod users;

pub use points::PointsScreen;
pub use reports::ReportsScreen;
pub use users::UsersScreen;

use crate::domain::NotifierPtr;
use crate::ApiError;

/// Surfaces a failed client-side check as one warning and passes it on.
pub(crate) fn checked(notifier: &NotifierPtr, check: Result<(), ApiError>) -> Result<(), ApiError> {
    if let Err(ApiError::Validation(message)) = &check {
        tracing::debug!("Validation failed: {}", message);
        notifier.warning(message);
    }
    check
}
