mod credentials;
mod entity;
mod metrics;
mod models;
mod notifier;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the storage and notification seams
pub use credentials::{CredentialStore, CredentialStorePtr};
pub use notifier::{Narration, NoticeId, NoticeLevel, Notifier, NotifierPtr, SIGN_IN_REQUIRED};

// Records exchanged with the backend
pub use entity::Entity;
pub use models::{
    AuthResponse, Avatar, Identity, LoginRequest, ModerationStatus, NewReport, NewUser,
    OperationalState, Point, PointDraft, PointPatch, PointQuery, PointStatus, ProfileUpdate,
    Registration, Report, ReportAction, ReportQuery, Role, ScheduleEntry, Severity, UserPatch,
    UserQuery,
};
