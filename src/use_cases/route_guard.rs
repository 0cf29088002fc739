use std::sync::Arc;

use crate::domain::ports::Navigator;
use crate::use_cases::auth_service::AuthService;

pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

// Guard progress for a single navigation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Allowed,
    Refreshing,
    Denied,
}

// Gates protected views. Every navigation re-checks; nothing is cached.
#[derive(Clone)]
pub struct RouteGuard {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl RouteGuard {
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
        }
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    #[tracing::instrument(name = "route_guard", skip(self))]
    pub async fn check(&self, route: &str) -> GuardState {
        let mut state = if self.auth.is_logged_in() {
            GuardState::Allowed
        } else {
            GuardState::Refreshing
        };

        if state == GuardState::Refreshing {
            tracing::debug!("session expired; refreshing before navigation.");
            state = if self.auth.refreshing_token().await {
                GuardState::Allowed
            } else {
                GuardState::Denied
            };
        }

        if state == GuardState::Denied {
            tracing::info!(login_route = %self.login_route, "navigation denied; redirecting.");
            self.navigator.navigate(&self.login_route);
        }

        state
    }

    pub async fn can_activate(&self, route: &str) -> bool {
        self.check(route).await == GuardState::Allowed
    }
}
