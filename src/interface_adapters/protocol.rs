use serde::Serialize;
use url::Url;

// Backend routes consumed by the client.
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
pub const REFRESH_PATH: &str = "/refresh";
pub const EVENT_LIST_PATH: &str = "/event-list";
pub const EVENTS_PATH: &str = "/events";
pub const EVENT_PATH: &str = "/event";

// Request payload for exchanging a refresh token.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    pub refresh_token: &'a str,
}

// DELETE /event/{id}, with the id percent-encoded as one path segment.
// Ids that cannot name a single segment (empty, `.`, `..`) give `None`.
pub fn event_path(id: &str) -> Option<String> {
    if matches!(id, "" | "." | "..") {
        return None;
    }

    let mut url = Url::parse("http://backend.invalid/").ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(EVENT_PATH.trim_start_matches('/'))
        .push(id);
    Some(url.path().to_string())
}
