use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity::Entity;

// ============================================================================
// Identity
// ============================================================================

/// Role assigned to an account by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Profile of an account, as returned by `users/me` and the users list.
///
/// Fields the client has no typed use for are kept verbatim in `profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    // ---
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default, rename = "nombre", alias = "name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub role: Role,

    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Identity {
    // ---
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        // ---
        Self {
            id: id.into(),
            name: None,
            email: None,
            role,
            profile: Map::new(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn phone(&self) -> Option<&str> {
        self.profile_str("telefono")
    }

    pub fn address(&self) -> Option<&str> {
        self.profile_str("direccion")
    }

    pub fn neighbourhood(&self) -> Option<&str> {
        self.profile_str("barrio")
    }

    fn profile_str(&self, key: &str) -> Option<&str> {
        self.profile.get(key).and_then(Value::as_str)
    }
}

impl Entity for Identity {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

// ============================================================================
// Auth payloads
// ============================================================================

/// Body of `auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `auth/register`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub nombre: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
}

/// `{ token, user }` answer of login and registration.
///
/// Registration may answer with the token alone.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<Identity>,
}

// ============================================================================
// Users (admin)
// ============================================================================

/// Body of `POST users`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewUser {
    pub nombre: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

impl NewUser {
    /// Local stand-in shown while the create request is in flight.
    pub(crate) fn placeholder(&self) -> Identity {
        // ---
        Identity {
            id: String::new(),
            name: Some(self.nombre.clone()),
            email: Some(self.email.clone()),
            role: self.role,
            profile: Map::new(),
        }
    }
}

/// Partial update for `PUT users/:id`. A password resets it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserPatch {
    pub(crate) fn apply(&self, user: &mut Identity) {
        // ---
        if let Some(nombre) = &self.nombre {
            user.name = Some(nombre.clone());
        }
        if let Some(email) = &self.email {
            user.email = Some(email.clone());
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

/// Self-service profile update for `PUT users/me`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
}

/// Image uploaded alongside a profile update.
#[derive(Debug, Clone)]
pub struct Avatar {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Query string for the users list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

// ============================================================================
// Reports
// ============================================================================

/// Moderation outcome of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Any value this client does not know; the row still loads.
    #[serde(other)]
    Unknown,
}

/// Operational progress of an approved report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalState {
    #[serde(rename = "abierto")]
    Open,
    #[serde(rename = "en_progreso")]
    InProgress,
    #[serde(rename = "resuelto")]
    Resolved,
    #[serde(rename = "desconocido", other)]
    Unknown,
}

/// How bad the reported incident is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    #[serde(rename = "baja")]
    Low,
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
    #[serde(rename = "desconocida", other)]
    Unknown,
}

/// An environmental incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    // ---
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, rename = "titulo", alias = "title")]
    pub title: String,

    #[serde(default, rename = "descripcion")]
    pub description: String,

    #[serde(default, rename = "direccion")]
    pub address: String,

    #[serde(default, rename = "barrio")]
    pub neighbourhood: String,

    #[serde(default, rename = "severidad", skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    #[serde(default)]
    pub status: ModerationStatus,

    #[serde(default, rename = "estado", skip_serializing_if = "Option::is_none")]
    pub operational: Option<OperationalState>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,

    #[serde(
        default,
        rename = "createdAt",
        alias = "fecha",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Action the moderation table offers for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Approve,
    Reject,
    MarkInProgress,
    MarkResolved,
    Delete,
}

impl Report {
    /// Actions available for this report in its current state.
    ///
    /// Pending reports can only be moderated. Approved reports that are
    /// not resolved can move forward operationally. Anything already
    /// moderated can be deleted.
    pub fn available_actions(&self) -> Vec<ReportAction> {
        // ---
        if self.status == ModerationStatus::Pending {
            return vec![ReportAction::Approve, ReportAction::Reject];
        }

        let mut actions = Vec::new();
        if self.status == ModerationStatus::Approved
            && self.operational != Some(OperationalState::Resolved)
        {
            if self.operational != Some(OperationalState::InProgress) {
                actions.push(ReportAction::MarkInProgress);
            }
            actions.push(ReportAction::MarkResolved);
        }
        actions.push(ReportAction::Delete);
        actions
    }

    /// Last six characters of the id, as shown in tables.
    pub fn short_id(&self) -> &str {
        let start = self
            .id
            .char_indices()
            .rev()
            .nth(5)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &self.id[start..]
    }
}

impl Entity for Report {
    const KIND: &'static str = "report";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Body of `POST reports`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewReport {
    pub titulo: String,
    pub direccion: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub barrio: String,
    pub severidad: Severity,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub descripcion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl NewReport {
    pub(crate) fn placeholder(&self) -> Report {
        // ---
        Report {
            id: String::new(),
            code: None,
            title: self.titulo.clone(),
            description: self.descripcion.clone(),
            address: self.direccion.clone(),
            neighbourhood: self.barrio.clone(),
            severity: Some(self.severidad),
            status: ModerationStatus::Pending,
            operational: None,
            lat: self.lat,
            lng: self.lng,
            created_at: Some(Utc::now()),
            extra: Map::new(),
        }
    }
}

/// Query string for the reports list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ModerationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
}

impl ReportQuery {
    /// What the public board shows: approved reports only.
    pub fn approved() -> Self {
        Self {
            status: Some(ModerationStatus::Approved),
            barrio: None,
        }
    }
}

// ============================================================================
// Recycling points
// ============================================================================

/// Whether a recycling point is in service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointStatus {
    #[default]
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "inactivo")]
    Inactive,
    #[serde(rename = "desconocido", other)]
    Unknown,
}

/// A recycling drop-off point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    // ---
    #[serde(rename = "_id", alias = "id")]
    pub id: String,

    #[serde(default, rename = "nombre")]
    pub name: String,

    #[serde(default, rename = "direccion")]
    pub address: String,

    #[serde(default, rename = "barrio")]
    pub neighbourhood: String,

    #[serde(default, rename = "materiales")]
    pub materials: Vec<String>,

    #[serde(default, rename = "estado")]
    pub status: PointStatus,

    #[serde(default, rename = "horario", skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Point {
    const KIND: &'static str = "point";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Body of `POST points`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PointDraft {
    pub nombre: String,
    pub direccion: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub barrio: String,
    pub materiales: Vec<String>,
    pub estado: PointStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl PointDraft {
    pub(crate) fn placeholder(&self) -> Point {
        // ---
        Point {
            id: String::new(),
            name: self.nombre.clone(),
            address: self.direccion.clone(),
            neighbourhood: self.barrio.clone(),
            materials: self.materiales.clone(),
            status: self.estado,
            opening_hours: self.horario.clone(),
            lat: self.lat,
            lng: self.lng,
            extra: Map::new(),
        }
    }
}

/// Partial update for `PUT points/:id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PointPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materiales: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<PointStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horario: Option<String>,
}

impl PointPatch {
    pub(crate) fn apply(&self, point: &mut Point) {
        // ---
        if let Some(nombre) = &self.nombre {
            point.name = nombre.clone();
        }
        if let Some(direccion) = &self.direccion {
            point.address = direccion.clone();
        }
        if let Some(barrio) = &self.barrio {
            point.neighbourhood = barrio.clone();
        }
        if let Some(materiales) = &self.materiales {
            point.materials = materiales.clone();
        }
        if let Some(estado) = self.estado {
            point.status = estado;
        }
        if let Some(horario) = &self.horario {
            point.opening_hours = Some(horario.clone());
        }
    }
}

/// Query string for the points list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PointQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<PointStatus>,
}

// ============================================================================
// Collection schedule
// ============================================================================

/// Collection days and time windows for one neighbourhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "barrio")]
    pub neighbourhood: String,

    #[serde(default, rename = "dias")]
    pub days: Vec<String>,

    #[serde(default, rename = "horario1", skip_serializing_if = "Option::is_none")]
    pub first_window: Option<String>,

    #[serde(default, rename = "horario2", skip_serializing_if = "Option::is_none")]
    pub second_window: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
