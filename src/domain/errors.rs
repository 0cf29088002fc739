use serde::Deserialize;
use thiserror::Error;

use crate::domain::ports::ApiResponse;

// Failure to get any HTTP response at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Other(String),
}

// Domain-level errors for login, signup and refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // 4xx from the auth endpoints; message is shown to the user as-is.
    #[error("{message}")]
    InvalidCredentials { status: u16, message: String },
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{}", NO_RESPONSE_MESSAGE)]
    Transport(#[source] TransportError),
    #[error("malformed auth response: {0}")]
    Decode(String),
}

impl AuthError {
    // Classifies a non-2xx response from /login, /signup or /refresh.
    pub fn from_response(response: &ApiResponse) -> Self {
        let message = user_message(response.status, response.reason.as_deref(), &response.body);
        if (400..500).contains(&response.status) {
            AuthError::InvalidCredentials {
                status: response.status,
                message,
            }
        } else {
            AuthError::Server {
                status: response.status,
                message,
            }
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        AuthError::Transport(err)
    }
}

// Errors surfaced by the appointment gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{}", NO_RESPONSE_MESSAGE)]
    Transport(#[source] TransportError),
    #[error("malformed appointment response: {0}")]
    Decode(String),
    #[error("could not encode appointment request: {0}")]
    Encode(String),
}

impl GatewayError {
    pub fn from_response(response: &ApiResponse) -> Self {
        GatewayError::Rejected {
            status: response.status,
            message: user_message(response.status, response.reason.as_deref(), &response.body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        GatewayError::Transport(err)
    }
}

// No response means no status; the UI shows status 0 like a browser would.
const NO_RESPONSE_MESSAGE: &str = "Error with status: 0";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

// Builds the text shown to the user for a failed response: the `message`
// field of a JSON error body when present, otherwise a status line.
pub fn user_message(status: u16, reason: Option<&str>, body: &str) -> String {
    if body.trim().is_empty() {
        return format!("Error with status: {status}");
    }

    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(payload) => payload.message,
        Err(_) => format!("Error with status: {status} - {}", reason.unwrap_or("")),
    }
}
