use serde::{Deserialize, Serialize};

// Payload sent to POST /events and PUT /events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub title: String,
    pub id: String,
    pub created_date: String,
    pub start: String,
    pub end: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub status: String,
    #[serde(rename = "allDay")]
    pub all_day: bool,
    // Update aliases expected by the backend on PUT.
    #[serde(rename = "appId", skip_serializing_if = "Option::is_none", default)]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_time: Option<String>,
}

impl AppointmentRequest {
    // Copy the primary fields into the aliases the update endpoint reads.
    pub fn for_update(mut self) -> Self {
        self.app_id = Some(self.id.clone());
        self.date = Some(self.created_date.clone());
        self.start_time = Some(self.start.clone());
        self.end_time = Some(self.end.clone());
        self
    }
}

// Appointment record as returned by the backend. Every field is optional on
// the wire, so decoding stays lenient.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appointment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub id: String,
    pub title: String,
    pub created_date: String,
    pub start: String,
    pub end: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub status: String,
    #[serde(rename = "allDay")]
    pub all_day: bool,
}
