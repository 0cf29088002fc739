// Fake appointment backend for end-to-end tests over real HTTP.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use appointment_client::ClientConfig;
use appointment_client::ClientState;
use appointment_client::interface_adapters::clients::ReqwestTransport;
use appointment_client::interface_adapters::navigation::TerminalNavigator;
use appointment_client::interface_adapters::session_store::InMemorySessionStore;
use appointment_client::interface_adapters::state::SystemClock;
use appointment_client::use_cases::UnauthorizedPolicy;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

pub const USERNAME: &str = "a";
pub const PASSWORD: &str = "b";

type Reply = (StatusCode, Json<Value>);

#[derive(Default)]
struct BackendState {
    valid_access: HashSet<String>,
    refresh_token: Option<String>,
    // Seconds added to "now" for every issued expiresAt; negative issues
    // tokens the client already considers expired.
    access_ttl_secs: i64,
    refresh_calls: usize,
    events: Vec<Value>,
}

#[derive(Clone)]
pub struct Backend {
    pub base_url: String,
    state: Arc<Mutex<BackendState>>,
}

impl Backend {
    pub fn refresh_calls(&self) -> usize {
        self.lock().refresh_calls
    }

    pub fn set_access_ttl(&self, seconds: i64) {
        self.lock().access_ttl_secs = seconds;
    }

    // Server-side revocation: the client still believes its tokens are good.
    pub fn revoke_access_tokens(&self) {
        self.lock().valid_access.clear();
    }

    pub fn revoke_refresh_token(&self) {
        self.lock().refresh_token = None;
    }

    pub fn seed_event(&self, event: Value) {
        self.lock().events.push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state poisoned")
    }
}

// Bind an ephemeral port and serve on the current test runtime.
pub async fn spawn_backend() -> Backend {
    let state = Arc::new(Mutex::new(BackendState {
        access_ttl_secs: 900,
        ..Default::default()
    }));

    let app = Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/refresh", post(refresh))
        .route("/event-list", get(list_events))
        .route("/events", post(create_event).put(update_event))
        .route("/event/{id}", delete(delete_event))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake backend failed");
    });

    Backend {
        base_url: format!("http://{addr}"),
        state,
    }
}

// Client wired exactly like production, minus the file-backed store.
pub fn client(backend: &Backend, policy: UnauthorizedPolicy) -> (ClientState, Arc<TerminalNavigator>) {
    let config = ClientConfig {
        base_url: backend.base_url.clone(),
        unauthorized_policy: policy,
        ..ClientConfig::default()
    };
    let transport = ReqwestTransport::new(config.base_url.clone(), Duration::from_secs(2))
        .expect("expected client to build");
    let navigator = Arc::new(TerminalNavigator::new());
    let state = ClientState::assemble(
        &config,
        Arc::new(transport),
        Arc::new(SystemClock),
        Arc::new(InMemorySessionStore::new()),
        navigator.clone(),
    );
    (state, navigator)
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn message(status: StatusCode, text: &str) -> Reply {
    (status, Json(json!({ "message": text })))
}

fn issue_tokens(state: &mut BackendState) -> Value {
    let access = uuid::Uuid::new_v4().to_string();
    let refresh = uuid::Uuid::new_v4().to_string();
    state.valid_access.insert(access.clone());
    state.refresh_token = Some(refresh.clone());
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "expiresAt": (now() + state.access_ttl_secs).max(0),
        "userId": "user-1",
    })
}

fn authorized(state: &BackendState, headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| state.valid_access.contains(token))
}

async fn login(State(state): State<Arc<Mutex<BackendState>>>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().expect("backend state poisoned");
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        return (StatusCode::OK, Json(issue_tokens(&mut state)));
    }
    message(StatusCode::UNAUTHORIZED, "Invalid username or password")
}

async fn signup(Json(body): Json<Value>) -> Reply {
    if body["username"] == USERNAME {
        return message(StatusCode::CONFLICT, "Username already taken");
    }
    (StatusCode::OK, Json(json!({ "status": true, "message": "User registered" })))
}

async fn refresh(State(state): State<Arc<Mutex<BackendState>>>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().expect("backend state poisoned");
    state.refresh_calls += 1;
    let presented = body["refreshToken"].as_str();
    if presented.is_none() || presented != state.refresh_token.as_deref() {
        return message(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }
    (StatusCode::OK, Json(issue_tokens(&mut state)))
}

async fn list_events(State(state): State<Arc<Mutex<BackendState>>>, headers: HeaderMap) -> Reply {
    let state = state.lock().expect("backend state poisoned");
    if !authorized(&state, &headers) {
        return message(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    (StatusCode::OK, Json(Value::Array(state.events.clone())))
}

async fn create_event(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().expect("backend state poisoned");
    if !authorized(&state, &headers) {
        return message(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    state.events.push(body.clone());
    (StatusCode::CREATED, Json(body))
}

async fn update_event(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().expect("backend state poisoned");
    if !authorized(&state, &headers) {
        return message(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    let Some(existing) = state.events.iter_mut().find(|event| event["id"] == body["appId"]) else {
        return message(StatusCode::NOT_FOUND, "Appointment not found");
    };
    *existing = body.clone();
    (StatusCode::OK, Json(body))
}

async fn delete_event(
    State(state): State<Arc<Mutex<BackendState>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    let mut state = state.lock().expect("backend state poisoned");
    if !authorized(&state, &headers) {
        return message(StatusCode::UNAUTHORIZED, "jwt expired");
    }
    let Some(index) = state.events.iter().position(|event| event["id"] == id.as_str()) else {
        return message(StatusCode::NOT_FOUND, "Appointment not found");
    };
    (StatusCode::OK, Json(state.events.remove(index)))
}
