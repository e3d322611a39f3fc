#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};

use crud_admin::api::ApiClient;
use crud_admin::auth::Session;
use crud_admin::config::{AppConfig, ResourceRegistry};
use crud_admin::crud::{MemoryNotifier, ViewContext};
use crud_admin::routing::HistoryNavigator;
use crud_admin::server::AppState;

pub const ADMIN_EMAIL: &str = "admin@maodoce.com";
pub const ADMIN_PASSWORD: &str = "secret";
pub const VALID_TOKEN: &str = "test-token";
/// Saving a record with this name makes the backend answer 500
pub const FAILING_NAME: &str = "explode";

/// One request as the backend saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct BackendData {
    records: HashMap<String, BTreeMap<i64, Map<String, Value>>>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<BackendData>>;

/// In-process stand-in for the REST backend, on its own port
pub struct MockBackend {
    pub port: u16,
    pub base_url: String,
    data: Shared,
}

impl MockBackend {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}/api", port);

        let data: Shared = Arc::new(Mutex::new(BackendData { next_id: 1, ..Default::default() }));
        let app = Router::new()
            .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
            .route("/api/auth/login", post(login))
            .route("/api/:resource", get(list).post(store))
            .route("/api/:resource/:id", get(show).put(update).delete(destroy))
            .with_state(data.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind mock backend on {port}"))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let backend = Self { port, base_url, data };
        backend.wait_ready(Duration::from_secs(5)).await?;
        backend.seed_categories();
        Ok(backend)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("http://127.0.0.1:{}/health", self.port);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("mock backend did not become ready on {} within {:?}", self.base_url, timeout)
    }

    fn seed_categories(&self) {
        self.insert("product-category", json!({"name": "Doces", "description": "Bolos e tortas", "updated_at": "2024-05-02"}));
        self.insert("product-category", json!({"name": "Salgados", "description": "Coxinhas", "updated_at": "2024-05-01"}));
        self.clear_requests();
    }

    /// Adds a record directly, returning its id
    pub fn insert(&self, resource: &str, fields: Value) -> i64 {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id;
        data.next_id += 1;
        let mut record = fields.as_object().cloned().unwrap_or_default();
        record.insert("id".into(), json!(id));
        data.records.entry(resource.to_string()).or_default().insert(id, record);
        id
    }

    pub fn seed_many(&self, resource: &str, count: usize) {
        for n in 0..count {
            self.insert(resource, json!({"name": format!("Item {n:03}"), "description": "gerado", "updated_at": format!("2024-01-{:02}", n % 28 + 1)}));
        }
        self.clear_requests();
    }

    pub fn record(&self, resource: &str, id: i64) -> Option<Map<String, Value>> {
        self.data.lock().unwrap().records.get(resource).and_then(|r| r.get(&id).cloned())
    }

    pub fn count(&self, resource: &str) -> usize {
        self.data.lock().unwrap().records.get(resource).map(|r| r.len()).unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.data.lock().unwrap().requests.clone()
    }

    /// Requests other than the login exchange
    pub fn resource_requests(&self) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| r.path != "/api/auth/login").collect()
    }

    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| r.method == method).collect()
    }

    pub fn clear_requests(&self) {
        self.data.lock().unwrap().requests.clear();
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::development();
        config.api.base_url = self.base_url.clone();
        config.api.request_timeout_secs = Some(5);
        config
    }

    pub fn api(&self, session: Session) -> ApiClient {
        ApiClient::new(&self.base_url, session).expect("valid base url")
    }

    pub fn authed_api(&self) -> ApiClient {
        self.api(Session::new(VALID_TOKEN))
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.config(), ResourceRegistry::builtin()).expect("valid config")
    }
}

/// View collaborators whose effects the test can read back
pub struct Harness {
    pub notifier: Arc<MemoryNotifier>,
    pub navigator: Arc<HistoryNavigator>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            notifier: Arc::new(MemoryNotifier::new()),
            navigator: Arc::new(HistoryNavigator::new()),
        }
    }

    pub fn ctx(&self) -> ViewContext {
        ViewContext::new(self.notifier.clone(), self.navigator.clone())
    }
}

/// Base URL of a port nothing listens on
pub fn unreachable_base_url() -> String {
    let port = portpicker::pick_unused_port().expect("free port");
    format!("http://127.0.0.1:{}/api", port)
}

fn record_request(data: &Shared, method: &Method, uri: &Uri, headers: &HeaderMap) {
    let query = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    data.lock().unwrap().requests.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        authorization,
    });
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {VALID_TOKEN}"))
        .unwrap_or(false)
}

fn unauthenticated() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthenticated."}))).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "Registro não encontrado"}))).into_response()
}

fn failing_name(fields: &Map<String, Value>) -> Option<Response> {
    (fields.get("name").and_then(Value::as_str) == Some(FAILING_NAME)).then(|| {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"message": "Server Error"}))).into_response()
    })
}

fn invalid_name(fields: &Map<String, Value>) -> Option<Response> {
    let blank = fields
        .get("name")
        .and_then(Value::as_str)
        .map(|s| s.trim().is_empty())
        .unwrap_or(true);
    blank.then(|| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "The given data was invalid.",
                "errors": {"name": ["required"]}
            })),
        )
            .into_response()
    })
}

async fn login(State(data): State<Shared>, method: Method, uri: Uri, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record_request(&data, &method, &uri, &headers);
    if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
        Json(json!({"access_token": VALID_TOKEN, "token_type": "bearer"})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Credenciais inválidas"}))).into_response()
    }
}

async fn list(
    State(data): State<Shared>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record_request(&data, &method, &uri, &headers);
    if !authorized(&headers) {
        return unauthenticated();
    }

    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1).max(1);
    let limit: usize = params.get("limit").and_then(|p| p.parse().ok()).unwrap_or(30).max(1);
    let filter = params.get("filter").map(|f| f.to_lowercase()).unwrap_or_default();
    let order_by = params.get("orderBy").cloned().unwrap_or_else(|| "id".into());
    let descending = params.get("orderWay").map(|w| w == "desc").unwrap_or(false);

    let guard = data.lock().unwrap();
    let mut rows: Vec<Map<String, Value>> = guard
        .records
        .get(&resource)
        .map(|r| r.values().cloned().collect())
        .unwrap_or_default();
    drop(guard);

    if !filter.is_empty() {
        rows.retain(|r| {
            r.get("name")
                .and_then(Value::as_str)
                .map(|n| n.to_lowercase().contains(&filter))
                .unwrap_or(false)
        });
    }
    rows.sort_by(|a, b| {
        let key = |r: &Map<String, Value>| match r.get(&order_by) {
            Some(Value::Number(n)) => format!("{:020}", n.as_i64().unwrap_or(0)),
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        key(a).cmp(&key(b))
    });
    if descending {
        rows.reverse();
    }

    let total = rows.len();
    let last_page = total.div_ceil(limit).max(1);
    let data: Vec<_> = rows.into_iter().skip((page - 1) * limit).take(limit).collect();

    Json(json!({
        "data": data,
        "current_page": page,
        "last_page": last_page,
        "total": total,
    }))
    .into_response()
}

async fn show(
    State(data): State<Shared>,
    Path((resource, id)): Path<(String, i64)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record_request(&data, &method, &uri, &headers);
    if !authorized(&headers) {
        return unauthenticated();
    }
    let record = data.lock().unwrap().records.get(&resource).and_then(|r| r.get(&id).cloned());
    match record {
        Some(record) => Json(json!({ "data": record })).into_response(),
        None => not_found(),
    }
}

async fn store(
    State(data): State<Shared>,
    Path(resource): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(fields): Json<Map<String, Value>>,
) -> Response {
    record_request(&data, &method, &uri, &headers);
    if !authorized(&headers) {
        return unauthenticated();
    }
    if let Some(rejection) = invalid_name(&fields).or_else(|| failing_name(&fields)) {
        return rejection;
    }

    let mut guard = data.lock().unwrap();
    let id = guard.next_id;
    guard.next_id += 1;
    let mut record = fields;
    record.insert("id".into(), json!(id));
    guard.records.entry(resource).or_default().insert(id, record.clone());
    (StatusCode::CREATED, Json(json!({ "data": record }))).into_response()
}

async fn update(
    State(data): State<Shared>,
    Path((resource, id)): Path<(String, i64)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(fields): Json<Map<String, Value>>,
) -> Response {
    record_request(&data, &method, &uri, &headers);
    if !authorized(&headers) {
        return unauthenticated();
    }
    if let Some(rejection) = invalid_name(&fields).or_else(|| failing_name(&fields)) {
        return rejection;
    }

    let mut guard = data.lock().unwrap();
    let Some(record) = guard.records.get_mut(&resource).and_then(|r| r.get_mut(&id)) else {
        return not_found();
    };
    for (key, value) in fields {
        if key != "id" {
            record.insert(key, value);
        }
    }
    Json(json!({ "data": record.clone() })).into_response()
}

async fn destroy(
    State(data): State<Shared>,
    Path((resource, id)): Path<(String, i64)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    record_request(&data, &method, &uri, &headers);
    if !authorized(&headers) {
        return unauthenticated();
    }
    let removed = data.lock().unwrap().records.get_mut(&resource).and_then(|r| r.remove(&id));
    match removed {
        Some(_) => Json(json!({"message": "Registro removido"})).into_response(),
        None => not_found(),
    }
}
