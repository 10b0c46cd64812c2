// Test helpers are intentionally partially used
#![allow(dead_code)]

use axum::{
    extract::{Path, Query, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use ecorg_client::domain::CredentialStorePtr;
use ecorg_client::{
    create_noop_metrics, ApiConfig, EcoRgClient, MemoryCredentialStore, MemoryNotifier,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const USER_TOKEN: &str = "tok123";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const REGISTER_TOKEN: &str = "tok-new";

// ============================================================================
// Mock backend
// ============================================================================

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Logged {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
}

/// Shared state of the mock backend. Toggles change behaviour mid-test.
#[derive(Default)]
pub struct MockState {
    pub log: Mutex<Vec<Logged>>,
    pub reports: Mutex<Vec<Value>>,
    pub points: Mutex<Vec<Value>>,
    pub users: Mutex<Vec<Value>>,
    /// Every non-GET request outside `auth/` answers 500.
    pub fail_mutations: AtomicBool,
    /// Every request carrying a bearer token answers 401.
    pub reject_tokens: AtomicBool,
    /// List endpoints answer `{ items: [...] }` instead of a bare array.
    pub wrap_lists: AtomicBool,
    /// Registration answers with the token only.
    pub register_without_user: AtomicBool,
    /// `users/me` answers 500.
    pub profile_unavailable: AtomicBool,
    /// Report deletion answers `200 OK` as plain text, like `res.sendStatus(200)`.
    pub plain_text_deletes: AtomicBool,
    /// Artificial latency before every handler, in milliseconds.
    pub delay_ms: AtomicU64,
}

pub struct MockBackend {
    pub addr: std::net::SocketAddr,
    pub state: Arc<MockState>,
}

impl MockBackend {
    // ---
    pub async fn start() -> Self {
        // ---
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/users/me", get(me))
            .route("/api/users", get(list_users).post(create_user))
            .route("/api/users/{id}", put(update_user).delete(delete_user))
            .route("/api/users/{id}/role", put(set_role))
            .route("/api/reports", get(list_reports).post(create_report))
            .route("/api/reports/{id}", get(get_report).delete(delete_report))
            .route("/api/reports/{id}/moderation", put(moderate_report))
            .route("/api/reports/{id}/estado", put(advance_report))
            .route("/api/points", get(list_points).post(create_point))
            .route("/api/points/{id}", put(update_point).delete(delete_point))
            .route("/api/recycling-schedule", get(schedule))
            .layer(middleware::from_fn_with_state(state.clone(), observe))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Logged> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.log.lock().unwrap().len()
    }

    pub fn seed_reports(&self, reports: Vec<Value>) {
        *self.state.reports.lock().unwrap() = reports;
    }

    pub fn seed_users(&self, users: Vec<Value>) {
        *self.state.users.lock().unwrap() = users;
    }

    pub fn seed_points(&self, points: Vec<Value>) {
        *self.state.points.lock().unwrap() = points;
    }

    pub fn set(&self, toggle: impl Fn(&MockState) -> &AtomicBool, value: bool) {
        toggle(&self.state).store(value, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

// ============================================================================
// Client helpers
// ============================================================================

pub struct TestClient {
    pub client: EcoRgClient,
    pub credentials: CredentialStorePtr,
    pub notifier: Arc<MemoryNotifier>,
}

/// Client against `backend`, optionally with a token left by a previous run.
pub fn client_for(backend: &MockBackend, token: Option<&str>) -> TestClient {
    client_with_config(ApiConfig::new(backend.base_url()), token)
}

pub fn client_with_config(config: ApiConfig, token: Option<&str>) -> TestClient {
    // ---
    let credentials: CredentialStorePtr = match token {
        Some(token) => Arc::new(MemoryCredentialStore::with_token(token)),
        None => Arc::new(MemoryCredentialStore::new()),
    };
    let notifier = Arc::new(MemoryNotifier::new());
    let client = EcoRgClient::new(
        &config,
        credentials.clone(),
        notifier.clone(),
        create_noop_metrics().unwrap(),
    )
    .unwrap();

    TestClient {
        client,
        credentials,
        notifier,
    }
}

pub fn report(id: &str, titulo: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "titulo": titulo,
        "direccion": "Main St 10",
        "barrio": "Centro",
        "severidad": "media",
        "status": status,
    })
}

// ============================================================================
// Handlers
// ============================================================================

type Shared = State<Arc<MockState>>;

async fn observe(State(state): Shared, req: Request, next: Next) -> Response {
    // ---
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.log.lock().unwrap().push(Logged {
        method: req.method().clone(),
        path: req.uri().path().to_string(),
        authorization: authorization.clone(),
    });

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if authorization.is_some() && state.reject_tokens.load(Ordering::SeqCst) {
        return unauthorized();
    }

    let is_auth_route = req.uri().path().starts_with("/api/auth/");
    let is_mutation = req.method() != Method::GET && !is_auth_route;
    if is_mutation && state.fail_mutations.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database unavailable" })),
        )
            .into_response();
    }

    next.run(req).await
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Token inválido" }))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "No encontrado" }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn identity_for(token: &str) -> Option<Value> {
    match token {
        USER_TOKEN => Some(json!({ "id": "u1", "role": "user" })),
        ADMIN_TOKEN => Some(json!({
            "_id": "a1",
            "nombre": "Admin",
            "email": "admin@ecorg.org",
            "role": "admin",
        })),
        REGISTER_TOKEN => Some(json!({
            "_id": "u2",
            "nombre": "Ana",
            "email": "ana@example.org",
            "role": "user",
        })),
        _ => None,
    }
}

fn list(state: &MockState, items: Vec<Value>) -> Json<Value> {
    if state.wrap_lists.load(Ordering::SeqCst) {
        let total = items.len();
        Json(json!({ "items": items, "total": total }))
    } else {
        Json(Value::Array(items))
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    // ---
    if body["email"] == "x@y.com" && body["password"] == "secret" {
        let user = identity_for(USER_TOKEN);
        return Json(json!({ "token": USER_TOKEN, "user": user })).into_response();
    }
    unauthorized()
}

async fn register(State(state): Shared, Json(body): Json<Value>) -> Response {
    // ---
    if body["email"] == "taken@example.org" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Email ya registrado" })),
        )
            .into_response();
    }
    if state.register_without_user.load(Ordering::SeqCst) {
        return Json(json!({ "token": REGISTER_TOKEN })).into_response();
    }
    Json(json!({ "token": REGISTER_TOKEN, "user": identity_for(REGISTER_TOKEN) })).into_response()
}

async fn me(State(state): Shared, headers: HeaderMap) -> Response {
    // ---
    if state.profile_unavailable.load(Ordering::SeqCst) {
        let error = Json(json!({ "error": "perfil no disponible" }));
        return (StatusCode::INTERNAL_SERVER_ERROR, error).into_response();
    }
    match bearer(&headers).and_then(identity_for) {
        Some(user) => Json(user).into_response(),
        None => unauthorized(),
    }
}

async fn list_users(State(state): Shared) -> Json<Value> {
    let users = state.users.lock().unwrap().clone();
    list(&state, users)
}

async fn create_user(State(state): Shared, Json(body): Json<Value>) -> Json<Value> {
    // ---
    let user = json!({
        "_id": "u-new",
        "nombre": body["nombre"],
        "email": body["email"],
        "role": body["role"],
    });
    state.users.lock().unwrap().insert(0, user.clone());
    Json(user)
}

async fn update_user(
    State(state): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    // ---
    let mut users = state.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u["_id"] == id.as_str()) else {
        return not_found();
    };
    for key in ["nombre", "email", "role"] {
        if let Some(value) = body.get(key) {
            user[key] = value.clone();
        }
    }
    Json(user.clone()).into_response()
}

async fn set_role(
    State(state): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    // ---
    if body["userId"] != id.as_str() {
        let error = Json(json!({ "error": "userId mismatch" }));
        return (StatusCode::BAD_REQUEST, error).into_response();
    }
    let mut users = state.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u["_id"] == id.as_str()) else {
        return not_found();
    };
    user["role"] = body["role"].clone();
    Json(user.clone()).into_response()
}

async fn delete_user(State(state): Shared, Path(id): Path<String>) -> StatusCode {
    state.users.lock().unwrap().retain(|u| u["_id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn list_reports(
    State(state): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    // ---
    let reports: Vec<Value> = state
        .reports
        .lock()
        .unwrap()
        .iter()
        .filter(|r| params.get("status").map_or(true, |s| r["status"] == s.as_str()))
        .filter(|r| params.get("barrio").map_or(true, |b| r["barrio"] == b.as_str()))
        .cloned()
        .collect();
    list(&state, reports)
}

async fn get_report(State(state): Shared, Path(id): Path<String>) -> Response {
    let reports = state.reports.lock().unwrap();
    match reports.iter().find(|r| r["_id"] == id.as_str()) {
        Some(report) => Json(report.clone()).into_response(),
        None => not_found(),
    }
}

async fn create_report(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    // ---
    if bearer(&headers).and_then(identity_for).is_none() {
        return unauthorized();
    }
    let mut created = body.clone();
    created["_id"] = json!("r-new");
    created["status"] = json!("pending");
    created["code"] = json!("RG-0001");
    state.reports.lock().unwrap().insert(0, created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn moderate_report(
    State(state): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    // ---
    let mut reports = state.reports.lock().unwrap();
    let Some(report) = reports.iter_mut().find(|r| r["_id"] == id.as_str()) else {
        return not_found();
    };
    report["status"] = body["status"].clone();
    // Approval opens the report operationally, which the client cannot guess.
    if body["status"] == "approved" {
        report["estado"] = json!("abierto");
    }
    Json(report.clone()).into_response()
}

async fn advance_report(
    State(state): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    // ---
    let mut reports = state.reports.lock().unwrap();
    let Some(report) = reports.iter_mut().find(|r| r["_id"] == id.as_str()) else {
        return not_found();
    };
    report["estado"] = body["estado"].clone();
    Json(report.clone()).into_response()
}

async fn delete_report(State(state): Shared, Path(id): Path<String>) -> Response {
    // ---
    state.reports.lock().unwrap().retain(|r| r["_id"] != id.as_str());
    if state.plain_text_deletes.load(Ordering::SeqCst) {
        return (StatusCode::OK, "OK").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_points(
    State(state): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    // ---
    let points: Vec<Value> = state
        .points
        .lock()
        .unwrap()
        .iter()
        .filter(|p| params.get("barrio").map_or(true, |b| p["barrio"] == b.as_str()))
        .cloned()
        .collect();
    list(&state, points)
}

async fn create_point(State(state): Shared, Json(body): Json<Value>) -> Json<Value> {
    // ---
    let mut created = body.clone();
    created["_id"] = json!("p-new");
    state.points.lock().unwrap().insert(0, created.clone());
    Json(created)
}

async fn update_point(
    State(state): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    // ---
    let mut points = state.points.lock().unwrap();
    let Some(point) = points.iter_mut().find(|p| p["_id"] == id.as_str()) else {
        return not_found();
    };
    if let Value::Object(fields) = body {
        for (key, value) in fields {
            point[key.as_str()] = value;
        }
    }
    Json(point.clone()).into_response()
}

async fn delete_point(State(state): Shared, Path(id): Path<String>) -> StatusCode {
    state.points.lock().unwrap().retain(|p| p["_id"] != id.as_str());
    StatusCode::NO_CONTENT
}

async fn schedule(
    State(state): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    // ---
    let all = vec![
        json!({ "barrio": "Centro", "dias": ["lunes", "jueves"], "horario1": "08:00-10:00" }),
        json!({
            "barrio": "Norte",
            "dias": ["martes"],
            "horario1": "09:00-11:00",
            "horario2": "18:00-20:00",
        }),
    ];
    let entries = all
        .into_iter()
        .filter(|e| params.get("barrio").map_or(true, |b| e["barrio"] == b.as_str()))
        .collect();
    list(&state, entries)
}
