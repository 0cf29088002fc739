// Use cases layer: session lifecycle, request authorization and appointment
// workflows.

pub mod appointments;
pub mod auth_service;
pub mod dashboard;
pub mod interceptor;
pub mod route_guard;

#[cfg(test)]
pub(crate) mod test_support;

pub use appointments::AppointmentGateway;
pub use auth_service::{AuthService, RefreshOutcome};
pub use dashboard::{CalendarEvent, CalendarState, CalendarView, Dashboard, DashboardNotice, SubmitMode};
pub use interceptor::{AuthInterceptor, UnauthorizedPolicy};
pub use route_guard::{GuardState, RouteGuard};
