//! Integration tests for the Bazaar client.
//!
//! [`FakeBackend`] serves a small slice of the marketplace REST API (plus an
//! ImgBB-style upload endpoint) on a random local port, records the
//! `Authorization` header of every request, and counts catalog reads so
//! tests can observe caching.
//!
//! # Accounts
//!
//! | login                 | password | role        | token          |
//! |-----------------------|----------|-------------|----------------|
//! | `shopper@example.com` | `secret` | CUSTOMER    | `tok-customer` |
//! | `maker`               | `secret` | SELLER      | `tok-seller`   |
//! | `root@example.com`    | `secret` | SUPER_ADMIN | `tok-root`     |
//!
//! Run with: `cargo test -p bazaar-integration-tests`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bazaar_client::ApiClient;
use bazaar_client::config::ApiConfig;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Password accepted for every fake account.
pub const PASSWORD: &str = "secret";

/// API key the fake upload host accepts.
pub const IMGBB_KEY: &str = "imgbb-test-key";

/// Seconds sent in `Retry-After` by the rate-limited route.
pub const RETRY_AFTER_SECS: u64 = 7;

struct Account {
    login: &'static str,
    token: &'static str,
    user: fn() -> Value,
}

fn customer() -> Value {
    json!({
        "_id": "u-cust",
        "name": "Sam Shopper",
        "email": "shopper@example.com",
        "role": "CUSTOMER"
    })
}

fn seller() -> Value {
    json!({
        "_id": "u-seller",
        "name": "Mia Maker",
        "username": "maker",
        "role": "SELLER",
        "sellerStatus": "APPROVED"
    })
}

fn super_admin() -> Value {
    json!({"_id": "u-root", "email": "root@example.com", "role": "SUPER_ADMIN"})
}

static ACCOUNTS: [Account; 3] = [
    Account {
        login: "shopper@example.com",
        token: "tok-customer",
        user: customer,
    },
    Account {
        login: "maker",
        token: "tok-seller",
        user: seller,
    },
    Account {
        login: "root@example.com",
        token: "tok-root",
        user: super_admin,
    },
];

fn account_for_token(headers: &HeaderMap) -> Option<&'static Account> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    ACCOUNTS.iter().find(|account| account.token == token)
}

fn product(id: &str) -> Option<Value> {
    match id {
        "p-lamp" => Some(json!({
            "_id": "p-lamp",
            "title": "Desk Lamp",
            "price": 19.5,
            "category": "electrical",
            "status": "APPROVED",
            "images": ["https://img.example/lamp.png"],
            "warehouse": "north"
        })),
        "p-mug" => Some(json!({
            "_id": "p-mug",
            "title": "Mug",
            "price": "4.25",
            "category": "electrical",
            "status": "APPROVED"
        })),
        _ => None,
    }
}

/// What the fake backend has seen.
#[derive(Debug, Default)]
pub struct Recorded {
    authorization: Mutex<Vec<Option<String>>>,
    catalog_reads: AtomicUsize,
    uploads: AtomicUsize,
    settings: Mutex<Value>,
}

impl Recorded {
    /// `Authorization` header of every request so far, oldest first.
    #[must_use]
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.authorization
            .lock()
            .map(|headers| headers.clone())
            .unwrap_or_default()
    }

    /// Header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.authorization_headers().pop().flatten()
    }

    /// Requests served by the catalog routes.
    #[must_use]
    pub fn catalog_reads(&self) -> usize {
        self.catalog_reads.load(Ordering::SeqCst)
    }

    /// Images accepted by the upload host.
    #[must_use]
    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

type Shared = Arc<Recorded>;

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn record_authorization(
    State(state): State<Shared>,
    request: Request,
    next: Next,
) -> Response {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    if let Ok(mut headers) = state.authorization.lock() {
        headers.push(value);
    }
    next.run(request).await
}

// ===== Auth =====

async fn login(Json(body): Json<Value>) -> Response {
    let login = body
        .get("email")
        .or_else(|| body.get("username"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str);

    match ACCOUNTS.iter().find(|account| account.login == login) {
        Some(account) if password == Some(PASSWORD) => {
            Json(json!({ "token": account.token, "user": (account.user)() })).into_response()
        }
        _ => message(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn me(headers: HeaderMap) -> Response {
    match account_for_token(&headers) {
        Some(account) => Json(json!({ "user": (account.user)() })).into_response(),
        None => message(StatusCode::UNAUTHORIZED, "Token expired"),
    }
}

// ===== Catalog =====

async fn products(State(state): State<Shared>) -> Json<Value> {
    state.catalog_reads.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "items": [product("p-lamp"), product("p-mug")] }))
}

async fn product_by_id(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    state.catalog_reads.fetch_add(1, Ordering::SeqCst);
    match product(&id) {
        Some(item) => Json(json!({ "item": item })).into_response(),
        None => message(StatusCode::NOT_FOUND, "Product not found"),
    }
}

// ===== Orders =====

async fn recent_orders() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, RETRY_AFTER_SECS.to_string())],
        "slow down",
    )
        .into_response()
}

async fn customer_orders(headers: HeaderMap) -> Response {
    match account_for_token(&headers) {
        Some(account) if account.token == "tok-customer" => Json(json!({
            "items": [{
                "_id": "6600aa00bb11cc22dd33ee44",
                "status": "PAID",
                "grandTotal": 23.75,
                "createdAt": "2026-03-01T10:00:00.000Z"
            }]
        }))
        .into_response(),
        Some(_) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "message": "Customers only" } })),
        )
            .into_response(),
        None => message(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

// ===== Super admin =====

fn is_root(headers: &HeaderMap) -> bool {
    account_for_token(headers).is_some_and(|account| account.token == "tok-root")
}

async fn settings(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !is_root(&headers) {
        return message(StatusCode::FORBIDDEN, "Forbidden");
    }
    let item = state
        .settings
        .lock()
        .map(|settings| settings.clone())
        .unwrap_or_default();
    Json(json!({ "item": item })).into_response()
}

async fn update_settings(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    if !is_root(&headers) {
        return message(StatusCode::FORBIDDEN, "Forbidden");
    }
    let Ok(mut settings) = state.settings.lock() else {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "lock poisoned");
    };
    if let (Some(current), Some(changes)) = (settings.as_object_mut(), patch.as_object()) {
        for (key, value) in changes {
            current.insert(key.clone(), value.clone());
        }
    }
    Json(json!({ "item": settings.clone() })).into_response()
}

async fn report(Path(kind): Path<String>) -> Response {
    if kind == "orders" {
        ([(header::CONTENT_TYPE, "text/csv")], "id,total\no1,23.75\n").into_response()
    } else {
        message(StatusCode::NOT_FOUND, "Unknown report")
    }
}

// ===== Uploads =====

async fn imgbb_upload(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut key = None;
    let mut image = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let Ok(bytes) = field.bytes().await else {
            return message(StatusCode::BAD_REQUEST, "unreadable field");
        };
        match name.as_str() {
            "key" => key = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "image" if !bytes.is_empty() => image = file_name,
            _ => {}
        }
    }

    if key.as_deref() != Some(IMGBB_KEY) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Invalid API v1 key." } })),
        )
            .into_response();
    }
    let Some(file_name) = image else {
        return message(StatusCode::BAD_REQUEST, "Empty upload source.");
    };

    let n = state.uploads.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "data": { "url": format!("https://i.ibb.co/{n}/{file_name}") } })).into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/me", get(me))
        .route("/api/products", get(products))
        .route("/api/products/{id}", get(product_by_id))
        .route("/api/orders", get(recent_orders))
        .route("/api/customer/orders", get(customer_orders))
        .route(
            "/api/superadmin/settings",
            get(settings).patch(update_settings),
        )
        .route("/api/reports/{kind}", get(report))
        .route("/imgbb/1/upload", post(imgbb_upload))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            record_authorization,
        ))
        .with_state(state)
}

/// A running fake backend. The server stops when this is dropped.
#[derive(Debug)]
pub struct FakeBackend {
    pub base_url: String,
    pub recorded: Arc<Recorded>,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to a random local port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let recorded = Arc::new(Recorded {
            settings: Mutex::new(json!({
                "commissionPct": 10,
                "maintenanceEnabled": false,
                "maintenanceMessage": ""
            })),
            ..Recorded::default()
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let app = router(recorded.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            recorded,
            server,
        })
    }

    /// API settings pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is rejected.
    pub fn api_config(&self) -> Result<ApiConfig, bazaar_client::ConfigError> {
        ApiConfig::with_base_url(&self.base_url)
    }

    /// A fresh client for this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn client(&self) -> Result<ApiClient, Box<dyn std::error::Error>> {
        Ok(ApiClient::new(&self.api_config()?)?)
    }

    /// URL of the ImgBB-style upload endpoint.
    #[must_use]
    pub fn imgbb_endpoint(&self) -> String {
        format!("{}/imgbb/1/upload", self.base_url)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

