// Domain layer: session data, appointment records, errors and ports.

pub mod appointment;
pub mod entities;
pub mod errors;
pub mod ports;

pub use appointment::{Appointment, AppointmentRequest};
pub use entities::{AccessToken, AuthTokens, Credentials, Registration, Session, SignupStatus};
pub use errors::{AuthError, GatewayError, TransportError, user_message};
pub use ports::{ApiRequest, ApiResponse, Clock, HttpMethod, HttpTransport, Navigator, SessionStore};
