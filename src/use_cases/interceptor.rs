use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::TransportError;
use crate::domain::ports::{ApiRequest, ApiResponse, HttpTransport};
use crate::use_cases::auth_service::AuthService;

// What the interceptor does when the backend answers 401.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthorizedPolicy {
    // Hand the 401 back untouched; only the route guard refreshes.
    PassThrough,
    // Refresh once and replay the request with the new token.
    #[default]
    RefreshAndRetryOnce,
}

// Attaches the current bearer token to every outgoing request.
#[derive(Clone)]
pub struct AuthInterceptor {
    auth: AuthService,
    inner: Arc<dyn HttpTransport>,
    policy: UnauthorizedPolicy,
}

impl AuthInterceptor {
    pub fn new(auth: AuthService, inner: Arc<dyn HttpTransport>, policy: UnauthorizedPolicy) -> Self {
        Self {
            auth,
            inner,
            policy,
        }
    }

    pub fn policy(&self) -> UnauthorizedPolicy {
        self.policy
    }

    // Token is read at send time so a refresh is picked up immediately.
    fn authorize(&self, request: ApiRequest) -> ApiRequest {
        match self.auth.access_token() {
            Some(token) => request.with_bearer(&token),
            None => request,
        }
    }
}

#[async_trait]
impl HttpTransport for AuthInterceptor {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let authorized = self.authorize(request.clone());
        let sent_with = authorized.bearer_token().map(str::to_string);
        let response = self.inner.send(authorized).await?;
        if !response.is_unauthorized() || self.policy == UnauthorizedPolicy::PassThrough {
            return Ok(response);
        }

        // Another caller already rotated the token; use it instead of
        // spending the new refresh token on a second refresh.
        let current = self.auth.access_token();
        if current.is_some() && current != sent_with {
            tracing::debug!(path = %request.path, "token changed while request was in flight; replaying.");
            return self.inner.send(self.authorize(request)).await;
        }

        tracing::debug!(path = %request.path, "request unauthorized; attempting token refresh.");
        if !self.auth.refreshing_token().await {
            // Let the caller see the original 401 and send the user to login.
            return Ok(response);
        }

        // Single replay; a second 401 goes back to the caller as-is.
        self.inner.send(self.authorize(request)).await
    }
}
