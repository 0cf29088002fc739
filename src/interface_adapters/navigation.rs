use std::sync::{Mutex, PoisonError};

use crate::domain::ports::Navigator;

// Navigator for a terminal front end: there is no view to swap, so the
// redirect is logged and remembered for the command to report.
#[derive(Debug, Default)]
pub struct TerminalNavigator {
    last_redirect: Mutex<Option<String>>,
}

impl TerminalNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.last_redirect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(%route, "redirecting.");
        *self.last_redirect.lock().unwrap_or_else(PoisonError::into_inner) = Some(route.to_string());
    }
}
