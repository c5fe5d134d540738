// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the gym backend for integration tests.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{delete, get, post},
    Json, Router,
};
use futures_util::stream::{self, StreamExt};
use gymsmart_client::models::Credential;
use gymsmart_client::services::{ApiClient, CredentialStore};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const EMAIL: &str = "admin@gym.test";
pub const PASSWORD: &str = "secret";

/// Mutable backend state shared with the handlers.
pub struct MockState {
    tokens: Mutex<Credential>,
    issued: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub resource_calls: AtomicUsize,
    pub reject_refresh: AtomicBool,
    pub always_unauthorized: AtomicBool,
    pub refresh_delay: Duration,
    pub event_frames: Vec<String>,
    /// Text fields and uploaded file names of each registration
    pub registrations: Mutex<Vec<HashMap<String, String>>>,
    /// Query string of the last event stream request
    pub event_query: Mutex<Option<HashMap<String, String>>>,
}

impl MockState {
    /// Access token the backend currently accepts.
    #[allow(dead_code)]
    pub fn valid_access(&self) -> String {
        self.tokens.lock().unwrap().access_token.clone()
    }

    #[allow(dead_code)]
    pub fn valid_credential(&self) -> Credential {
        self.tokens.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if self.always_unauthorized.load(Ordering::SeqCst) {
            return false;
        }
        let expected = format!("Bearer {}", self.valid_access());
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|h| h == expected)
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    #[allow(dead_code)]
    pub async fn start() -> Self {
        Self::start_with(Duration::from_millis(100), Vec::new()).await
    }

    /// Start with a refresh latency and the frames served on the event stream.
    #[allow(dead_code)]
    pub async fn start_with(refresh_delay: Duration, event_frames: Vec<String>) -> Self {
        let state = Arc::new(MockState {
            tokens: Mutex::new(Credential::new("access-0", "refresh-0")),
            issued: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
            reject_refresh: AtomicBool::new(false),
            always_unauthorized: AtomicBool::new(false),
            refresh_delay,
            event_frames,
            registrations: Mutex::new(Vec::new()),
            event_query: Mutex::new(None),
        });

        let app = Router::new()
            .route("/api/Auth/login", post(login))
            .route("/api/Auth/refresh", post(refresh))
            .route("/api/Auth/register", post(register))
            .route("/api/Gimnacios", get(list_gyms).post(create_gym))
            .route("/api/Gimnacios/{id}", delete(delete_gym))
            .route("/api/broken", get(broken))
            .route("/api/hikvision/events", get(events))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    #[allow(dead_code)]
    pub fn events_url(&self) -> String {
        format!("{}/hikvision/events", self.base_url)
    }

    /// Request client whose store holds `credential`.
    #[allow(dead_code)]
    pub fn client_with(&self, credential: Option<Credential>) -> ApiClient {
        let store = match credential {
            Some(c) => CredentialStore::with_credential(c),
            None => CredentialStore::new(),
        };
        let config = gymsmart_client::config::Config {
            api_url: self.base_url.clone(),
            events_url: self.events_url(),
            ..Default::default()
        };
        ApiClient::from_config(&config, store)
    }
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    }
    let tokens = state.valid_credential();
    Json(json!({
        "token": tokens.access_token,
        "refreshToken": tokens.refresh_token,
        "role": "SuperAdmin",
        "userId": 1,
        "userProfile": { "firstName": "Ada", "lastName": "Admin" }
    }))
    .into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.refresh_delay).await;

    let current = state.valid_credential();
    if state.reject_refresh.load(Ordering::SeqCst) || body["refreshToken"] != current.refresh_token.as_str() {
        return (StatusCode::UNAUTHORIZED, "invalid refresh token").into_response();
    }

    let n = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let renewed = Credential::new(format!("access-{n}"), format!("refresh-{n}"));
    *state.tokens.lock().unwrap() = renewed.clone();

    Json(json!({ "token": renewed.access_token, "refreshToken": renewed.refresh_token }))
        .into_response()
}

async fn list_gyms(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([{ "id": 1, "nombre": "Centro" }, { "id": 2, "nombre": "Norte" }])).into_response()
}

/// Echo the posted gym with an id and the bearer that was accepted.
async fn create_gym(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .trim_start_matches("Bearer ")
        .to_string();
    (
        StatusCode::CREATED,
        Json(json!({ "id": 3, "gym": body, "acceptedToken": bearer })),
    )
        .into_response()
}

async fn register(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> StatusCode {
    let mut fields = HashMap::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let value = match file_name {
            Some(file_name) => file_name,
            None => field.text().await.unwrap(),
        };
        fields.insert(name, value);
    }

    let missing_email = !fields.get("Email").is_some_and(|e| !e.is_empty());
    state.registrations.lock().unwrap().push(fields);
    if missing_email {
        return StatusCode::BAD_REQUEST;
    }
    StatusCode::OK
}

async fn delete_gym(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<u64>,
    headers: HeaderMap,
) -> StatusCode {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    StatusCode::NO_CONTENT
}

async fn broken(State(state): State<Arc<MockState>>) -> StatusCode {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Serve the configured frames, then hold the stream open.
async fn events(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    *state.event_query.lock().unwrap() = Some(query);
    let frames = state.event_frames.clone();
    let stream = stream::iter(frames)
        .map(|frame| Ok::<_, Infallible>(Event::default().data(frame)))
        .chain(stream::pending());
    Sse::new(stream)
}
