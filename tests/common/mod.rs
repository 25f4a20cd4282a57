// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the ExecutiveAI backend, served on an ephemeral port.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use executive_session::config::Config;
use executive_session::error::AppError;
use executive_session::models::CredentialFlags;
use executive_session::services::{ApiClient, SessionManager};
use executive_session::storage::{KeyValueStore, MemoryStore};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Backend account accepted by the mock login route.
pub const BACKEND_EMAIL: &str = "owner@acme.test";
pub const BACKEND_PASSWORD: &str = "s3cret";
pub const BACKEND_TOKEN: &str = "backend-token-1";

/// A recorded `PUT /credentials/{type}` call.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CredentialPut {
    pub integration: String,
    pub body: serde_json::Value,
    pub bearer: Option<String>,
}

/// Observable state of the mock backend.
#[derive(Default)]
pub struct BackendState {
    pub flags: Mutex<CredentialFlags>,
    pub puts: Mutex<Vec<CredentialPut>>,
    pub login_calls: AtomicUsize,
    pub credential_gets: AtomicUsize,
    /// Number of upcoming `GET /credentials` calls that answer 503.
    pub failing_gets: AtomicUsize,
    /// Delay before `GET /credentials` answers.
    pub get_delay_ms: AtomicU64,
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<BackendState>,
}

impl MockBackend {
    /// Start the mock backend on 127.0.0.1 with an OS-assigned port.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/credentials", get(get_credentials))
            .route("/api/credentials/{integration}", put(put_credentials))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Config pointing at this backend, with instant retries.
    #[allow(dead_code)]
    pub fn config(&self) -> Config {
        Config {
            api_base_url: self.base_url.clone(),
            ..Config::test_default()
        }
    }

    #[allow(dead_code)]
    pub fn puts(&self) -> Vec<CredentialPut> {
        self.state.puts.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn set_flags(&self, flags: CredentialFlags) {
        *self.state.flags.lock().unwrap() = flags;
    }

    #[allow(dead_code)]
    pub fn delay_credential_reads(&self, delay: Duration) {
        self.state
            .get_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

/// Memory store whose writes can be switched to fail.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage("disk full".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.check()?;
        self.inner.remove(key)
    }
}

/// Session manager over `store`, talking to the backend described by `config`.
#[allow(dead_code)]
pub fn session_manager(config: &Config, store: &MemoryStore) -> SessionManager {
    SessionManager::new(config, Arc::new(store.clone()), ApiClient::new(config))
}

/// Session manager over a store whose writes can fail.
#[allow(dead_code)]
pub fn failing_session_manager(config: &Config, store: &FailingStore) -> SessionManager {
    SessionManager::new(config, Arc::new(store.clone()), ApiClient::new(config))
}

/// Session manager with no reachable backend.
#[allow(dead_code)]
pub fn offline_session_manager(store: &MemoryStore) -> SessionManager {
    session_manager(&Config::test_default(), store)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<LoginBody>) -> Response {
    state.login_calls.fetch_add(1, Ordering::SeqCst);

    if body.email != BACKEND_EMAIL || body.password != BACKEND_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    Json(json!({
        "success": true,
        "token": BACKEND_TOKEN,
        "user": { "id": "42", "email": BACKEND_EMAIL, "name": "Acme Owner", "role": "admin" },
        "client": { "id": "acme", "name": "Acme Ltda", "email": "billing@acme.test", "plan_type": "pro" },
        "credentials": { "google_calendar": true, "whatsapp": true }
    }))
    .into_response()
}

async fn get_credentials(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.credential_gets.fetch_add(1, Ordering::SeqCst);

    let delay = state.get_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Token required");
    }

    let failing = state
        .failing_gets
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    if failing.is_ok() {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }

    let flags = *state.flags.lock().unwrap();
    Json(flags).into_response()
}

async fn put_credentials(
    State(state): State<Arc<BackendState>>,
    Path(integration): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.puts.lock().unwrap().push(CredentialPut {
        integration: integration.clone(),
        body: body.clone(),
        bearer: bearer(&headers),
    });

    if bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Token required");
    }

    let mut flags = state.flags.lock().unwrap();
    match integration.as_str() {
        "google_calendar" => flags.google_calendar = true,
        "google_meet" => flags.google_meet = true,
        "whatsapp" => flags.whatsapp = true,
        "evolution_api" => flags.evolution_api = true,
        "n8n" => flags.n8n_configured = true,
        "supabase" => {
            return error(StatusCode::UNPROCESSABLE_ENTITY, "Supabase project unreachable");
        }
        _ => return error(StatusCode::BAD_REQUEST, "Unknown integration"),
    }

    StatusCode::NO_CONTENT.into_response()
}
