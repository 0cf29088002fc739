use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::entities::{AccessToken, Session};
use crate::domain::errors::TransportError;
use crate::domain::ports::{
    ApiRequest, ApiResponse, Clock, HttpMethod, HttpTransport, Navigator, SessionStore,
};
use crate::interface_adapters::session_store::InMemorySessionStore;

pub(crate) const NOW: u64 = 1_700_000_000;

// Shared fixed time source for deterministic use-case tests.
pub(crate) struct FixedClock(pub(crate) u64);

impl Clock for FixedClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0
    }
}

// Clock the test can move forward to expire a session.
#[derive(Clone)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn new(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub(crate) fn advance(&self, seconds: u64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_seconds(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

type Scripted = Result<ApiResponse, TransportError>;

// Fake transport: per-route response queues plus a log of every request.
// The last queued response for a route is sticky so repeated calls keep
// getting it.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    routes: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    delay: Option<Duration>,
}

fn route_key(method: HttpMethod, path: &str) -> String {
    format!("{} {}", method.as_str(), path)
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn respond(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.push(method, path, Ok(ApiResponse::new(status, body)));
    }

    pub(crate) fn respond_with(&self, method: HttpMethod, path: &str, response: ApiResponse) {
        self.push(method, path, Ok(response));
    }

    pub(crate) fn fail(&self, method: HttpMethod, path: &str, err: TransportError) {
        self.push(method, path, Err(err));
    }

    fn push(&self, method: HttpMethod, path: &str, scripted: Scripted) {
        let mut guard = self.routes.lock().expect("routes mutex poisoned");
        guard
            .entry(route_key(method, path))
            .or_default()
            .push_back(scripted);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }

    pub(crate) fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }

    pub(crate) fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = route_key(request.method, &request.path);
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut guard = self.routes.lock().expect("routes mutex poisoned");
        let queue = guard
            .get_mut(&key)
            .ok_or_else(|| TransportError::Other(format!("no scripted response for {key}")))?;
        if queue.len() > 1 {
            return queue
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Other(key)));
        }
        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Other(format!("empty script for {key}"))))
    }
}

// Navigator that remembers every redirect.
#[derive(Clone, Default)]
pub(crate) struct RecordingNavigator {
    routes: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn visited(&self) -> Vec<String> {
        self.routes.lock().expect("routes mutex poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .expect("routes mutex poisoned")
            .push(route.to_string());
    }
}

pub(crate) fn token_body(access: &str, refresh: &str, expires_at: u64) -> String {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "expiresAt": expires_at,
        "userId": "user-1",
    })
    .to_string()
}

pub(crate) fn seeded_store(access: &str, refresh: Option<&str>, expires_at: u64) -> Arc<InMemorySessionStore> {
    let store = Arc::new(InMemorySessionStore::new());
    store.set(Session::new(
        Some(AccessToken {
            token: access.to_string(),
            expires_at,
        }),
        refresh.map(str::to_string),
    ));
    store
}
