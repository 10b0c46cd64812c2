// Resource clients - one per backend resource, all sharing one Gateway.
// Modules are private, only exported symbols are public

mod auth;
mod points;
mod reports;
mod schedule;
mod users;

pub use auth::AuthApi;
pub use points::PointsApi;
pub use reports::ReportsApi;
pub use schedule::ScheduleApi;
pub use users::UsersApi;
