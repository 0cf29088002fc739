use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::appointment::{Appointment, AppointmentRequest};
use crate::domain::errors::GatewayError;
use crate::domain::ports::{ApiRequest, HttpTransport};
use crate::interface_adapters::protocol::{EVENT_LIST_PATH, EVENTS_PATH, event_path};

// Typed appointment CRUD. Expects an authorizing transport (the interceptor)
// so every call carries the session's bearer token.
#[derive(Clone)]
pub struct AppointmentGateway {
    http: Arc<dyn HttpTransport>,
}

impl AppointmentGateway {
    pub fn new(http: Arc<dyn HttpTransport>) -> Self {
        Self { http }
    }

    #[tracing::instrument(name = "list_appointments", skip_all)]
    pub async fn list(&self) -> Result<Vec<Appointment>, GatewayError> {
        self.exchange(ApiRequest::get(EVENT_LIST_PATH)).await
    }

    #[tracing::instrument(name = "create_appointment", skip_all, fields(id = %request.id))]
    pub async fn create(&self, request: &AppointmentRequest) -> Result<Appointment, GatewayError> {
        let request = ApiRequest::post(EVENTS_PATH)
            .with_json(request)
            .map_err(|err| GatewayError::Encode(err.to_string()))?;
        self.exchange(request).await
    }

    #[tracing::instrument(name = "update_appointment", skip_all, fields(id = %request.id))]
    pub async fn update(&self, request: &AppointmentRequest) -> Result<Appointment, GatewayError> {
        let request = ApiRequest::put(EVENTS_PATH)
            .with_json(&request.clone().for_update())
            .map_err(|err| GatewayError::Encode(err.to_string()))?;
        self.exchange(request).await
    }

    #[tracing::instrument(name = "delete_appointment", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Appointment, GatewayError> {
        let path = event_path(id)
            .ok_or_else(|| GatewayError::Encode(format!("invalid appointment id {id:?}")))?;
        self.exchange(ApiRequest::delete(path)).await
    }

    async fn exchange<T: DeserializeOwned + Default>(&self, request: ApiRequest) -> Result<T, GatewayError> {
        let response = self.http.send(request).await.map_err(|err| {
            tracing::warn!(error = %err, "appointment request failed.");
            GatewayError::from(err)
        })?;

        if !response.is_success() {
            tracing::info!(status = response.status, "appointment request rejected.");
            return Err(GatewayError::from_response(&response));
        }

        // 204 and other bodiless successes carry no record.
        if response.body.trim().is_empty() {
            return Ok(T::default());
        }

        response.json::<T>().map_err(|err| {
            tracing::warn!(error = %err, "appointment response did not decode.");
            GatewayError::Decode(err.to_string())
        })
    }
}
