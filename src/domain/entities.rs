use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// Access token paired with its expiry (epoch seconds). Keeping them in one
// value means a session can never carry an expiry without a token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: u64,
}

// Current client session. Only the auth service writes it, and always as a
// whole value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access: Option<AccessToken>,
    refresh_token: Option<String>,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(access: Option<AccessToken>, refresh_token: Option<String>) -> Self {
        Self {
            access,
            refresh_token,
        }
    }

    pub fn from_tokens(tokens: &AuthTokens) -> Self {
        Self {
            access: Some(AccessToken {
                token: tokens.access_token.clone(),
                expires_at: tokens.expires_at,
            }),
            refresh_token: tokens.refresh_token.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh_token.is_none()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access.as_ref().map(|access| access.token.as_str())
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.access.as_ref().map(|access| access.expires_at)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    // Strictly in the future; a token expiring this second is already stale.
    pub fn is_active_at(&self, now_epoch_seconds: u64) -> bool {
        match &self.access {
            Some(access) => !access.token.is_empty() && access.expires_at > now_epoch_seconds,
            None => false,
        }
    }
}

// Login form payload. Lives only for the request that sends it.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// Signup form payload.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// Token triple returned by /login and /refresh.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthTokens {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresAt")]
    pub expires_at: u64,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

// Status object returned by /signup.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SignupStatus {
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}
