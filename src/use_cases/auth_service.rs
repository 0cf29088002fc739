use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::domain::entities::{AuthTokens, Credentials, Registration, Session, SignupStatus};
use crate::domain::errors::{AuthError, TransportError};
use crate::domain::ports::{ApiRequest, ApiResponse, Clock, HttpTransport, SessionStore};
use crate::interface_adapters::protocol::{LOGIN_PATH, REFRESH_PATH, RefreshRequest, SIGNUP_PATH};

// Result of one refresh attempt. Every caller that joined the attempt gets
// the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    // New access/refresh/expiry triple stored.
    Refreshed,
    // Server refused the refresh token; the session was cleared.
    Rejected,
    // Nothing to refresh with.
    NoRefreshToken,
    // No usable answer (transport failure, 5xx, bad body, or the session was
    // replaced mid-flight); the session was left alone.
    Unavailable,
}

impl RefreshOutcome {
    pub fn is_refreshed(self) -> bool {
        matches!(self, RefreshOutcome::Refreshed)
    }
}

type PendingRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

struct AuthCore {
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn SessionStore>,
    // Bumped by every login/logout so a refresh that started against an older
    // session cannot overwrite a newer one. Held while writing the store.
    generation: Mutex<u64>,
    in_flight: Mutex<Option<PendingRefresh>>,
}

// Owns the session: login, signup, logout, refresh and login-state queries.
#[derive(Clone)]
pub struct AuthService {
    core: Arc<AuthCore>,
}

impl AuthService {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            core: Arc::new(AuthCore {
                transport,
                clock,
                store,
                generation: Mutex::new(0),
                in_flight: Mutex::new(None),
            }),
        }
    }

    #[tracing::instrument(name = "login", skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: Credentials) -> Result<AuthTokens, AuthError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .with_json(&credentials)
            .map_err(|err| TransportError::InvalidRequest(err.to_string()))?;

        let response = self.core.transport.send(request).await.map_err(|err| {
            tracing::warn!(error = %err, "login request failed.");
            AuthError::Transport(err)
        })?;

        // Keep upstream status/message so the UI can show the server's reason.
        if !response.is_success() {
            let err = AuthError::from_response(&response);
            tracing::info!(status = response.status, "login rejected.");
            return Err(err);
        }

        let tokens = decode_tokens(&response)?;
        self.core.replace_session(Session::from_tokens(&tokens));
        tracing::info!("login succeeded.");
        Ok(tokens)
    }

    // Registers an account. The user still has to log in afterwards.
    #[tracing::instrument(name = "signup", skip_all, fields(username = %registration.username))]
    pub async fn signup(&self, registration: Registration) -> Result<SignupStatus, AuthError> {
        let request = ApiRequest::post(SIGNUP_PATH)
            .with_json(&registration)
            .map_err(|err| TransportError::InvalidRequest(err.to_string()))?;

        let response = self.core.transport.send(request).await.map_err(|err| {
            tracing::warn!(error = %err, "signup request failed.");
            AuthError::Transport(err)
        })?;

        if !response.is_success() {
            tracing::info!(status = response.status, "signup rejected.");
            return Err(AuthError::from_response(&response));
        }

        if response.body.trim().is_empty() {
            return Ok(SignupStatus::default());
        }
        response
            .json::<SignupStatus>()
            .map_err(|err| AuthError::Decode(err.to_string()))
    }

    pub fn is_logged_in(&self) -> bool {
        self.core
            .store
            .get()
            .is_active_at(self.core.clock.now_epoch_seconds())
    }

    pub fn access_token(&self) -> Option<String> {
        self.core.store.get().access_token().map(str::to_string)
    }

    pub fn session(&self) -> Session {
        self.core.store.get()
    }

    pub fn logout(&self) {
        self.core.clear_session();
        tracing::info!("logged out.");
    }

    // Attempts one refresh and reports whether a fresh session is stored.
    pub async fn refreshing_token(&self) -> bool {
        self.refresh_session().await.is_refreshed()
    }

    // Joins the in-flight refresh if there is one, otherwise starts it.
    // The refresh runs on its own task, so a caller giving up does not
    // cancel it.
    pub async fn refresh_session(&self) -> RefreshOutcome {
        let pending = {
            let mut slot = self
                .core
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("joining in-flight token refresh.");
                    pending.clone()
                }
                None => {
                    let pending = self.core.start_refresh();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }
}

impl AuthCore {
    fn start_refresh(self: &Arc<Self>) -> PendingRefresh {
        let core = Arc::clone(self);
        let task = tokio::spawn(async move {
            // Frees the slot even if the refresh panics.
            let _slot = InFlightSlot(Arc::clone(&core));
            core.refresh_once().await
        });

        async move {
            task.await.unwrap_or_else(|err| {
                tracing::error!(error = %err, "token refresh task failed.");
                RefreshOutcome::Unavailable
            })
        }
        .boxed()
        .shared()
    }

    async fn refresh_once(&self) -> RefreshOutcome {
        let (generation, session) = self.snapshot();
        let Some(refresh_token) = session.refresh_token().map(str::to_string) else {
            tracing::debug!("no refresh token stored; cannot refresh.");
            return RefreshOutcome::NoRefreshToken;
        };

        let request = match ApiRequest::post(REFRESH_PATH).with_json(&RefreshRequest {
            refresh_token: &refresh_token,
        }) {
            Ok(request) => request,
            Err(err) => {
                tracing::error!(error = %err, "failed to encode refresh request.");
                return RefreshOutcome::Unavailable;
            }
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh request failed.");
                return RefreshOutcome::Unavailable;
            }
        };

        if response.is_success() {
            return match decode_tokens(&response) {
                Ok(tokens) if self.commit(generation, Some(Session::from_tokens(&tokens))) => {
                    tracing::debug!("access token refreshed.");
                    RefreshOutcome::Refreshed
                }
                Ok(_) => RefreshOutcome::Unavailable,
                Err(err) => {
                    tracing::warn!(error = %err, "token refresh returned an unusable body.");
                    RefreshOutcome::Unavailable
                }
            };
        }

        if (400..500).contains(&response.status) {
            tracing::info!(status = response.status, "refresh token rejected; clearing session.");
            return if self.commit(generation, None) {
                RefreshOutcome::Rejected
            } else {
                RefreshOutcome::Unavailable
            };
        }

        tracing::warn!(status = response.status, "token refresh failed upstream.");
        RefreshOutcome::Unavailable
    }

    fn snapshot(&self) -> (u64, Session) {
        let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        (*generation, self.store.get())
    }

    // Writes the refresh result if no login/logout happened meanwhile;
    // `None` clears the session.
    fn commit(&self, started_at: u64, session: Option<Session>) -> bool {
        let generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *generation != started_at {
            tracing::debug!("session changed during refresh; discarding result.");
            return false;
        }

        match session {
            Some(session) => self.store.set(session),
            None => self.store.clear(),
        }
        true
    }

    fn replace_session(&self, session: Session) {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.store.set(session);
    }

    fn clear_session(&self) {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.store.clear();
    }
}

struct InFlightSlot(Arc<AuthCore>);

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        *self.0.in_flight.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn decode_tokens(response: &ApiResponse) -> Result<AuthTokens, AuthError> {
    let tokens = response
        .json::<AuthTokens>()
        .map_err(|err| AuthError::Decode(err.to_string()))?;
    if tokens.access_token.is_empty() {
        return Err(AuthError::Decode("empty access token".to_string()));
    }
    Ok(tokens)
}
