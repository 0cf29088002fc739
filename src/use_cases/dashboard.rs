use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::domain::appointment::{Appointment, AppointmentRequest};
use crate::domain::errors::GatewayError;
use crate::use_cases::appointments::AppointmentGateway;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventAction {
    Edit,
    Delete,
}

// Appointment as laid out on the calendar.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub record_id: Option<String>,
    pub title: String,
    pub status: String,
    pub user_id: String,
    pub all_day: bool,
    pub created_date: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub actions: Vec<EventAction>,
}

impl CalendarEvent {
    // The calendar draws one day early and one day late around the record.
    pub fn from_appointment(record: &Appointment) -> Option<Self> {
        let start = parse_timestamp(&record.start)?;
        let end = parse_timestamp(&record.end)?;
        let start = start
            .date()
            .and_time(NaiveTime::MIN)
            .checked_sub_days(Days::new(1))?;
        let end = end.checked_add_days(Days::new(1))?;

        Some(Self {
            id: record.id.clone(),
            record_id: record.record_id.clone(),
            title: record.title.clone(),
            status: record.status.clone(),
            user_id: record.user_id.clone(),
            all_day: record.all_day,
            created_date: record.created_date.clone(),
            start,
            end,
            actions: vec![EventAction::Edit, EventAction::Delete],
        })
    }

    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        self.start.date() <= day && day <= self.end.date()
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
}

// View state of the calendar widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarState {
    pub view: CalendarView,
    pub view_date: NaiveDate,
    pub active_day_is_open: bool,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            view: CalendarView::default(),
            view_date: today,
            active_day_is_open: true,
        }
    }

    // Clicks outside the displayed month are ignored.
    pub fn day_clicked(&mut self, date: NaiveDate, events_on_day: usize) {
        let same_month = date.year() == self.view_date.year() && date.month() == self.view_date.month();
        if !same_month {
            return;
        }

        let reclicked_open_day = date == self.view_date && self.active_day_is_open;
        self.active_day_is_open = !(reclicked_open_day || events_on_day == 0);
        self.view_date = date;
    }

    pub fn set_view(&mut self, view: CalendarView) {
        self.view = view;
    }

    pub fn close_open_month_view_day(&mut self) {
        self.active_day_is_open = false;
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be formatted yyyy-mm-dd, got {value:?}")]
    BadDate { field: &'static str, value: String },
}

pub fn validate_draft(draft: &AppointmentRequest) -> Result<(), DraftError> {
    let required = [
        ("title", &draft.title),
        ("id", &draft.id),
        ("userId", &draft.user_id),
        ("status", &draft.status),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(DraftError::Missing(field));
        }
    }

    let dates = [
        ("created_date", &draft.created_date),
        ("start", &draft.start),
        ("end", &draft.end),
    ];
    for (field, value) in dates {
        if value.is_empty() {
            return Err(DraftError::Missing(field));
        }
        // Length check keeps unpadded months and days out.
        if value.len() != 10 || NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
            return Err(DraftError::BadDate {
                field,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update,
}

// The only thing the dashboard ever shows the user after an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DashboardNotice {
    Success(String),
    Failure(String),
}

impl DashboardNotice {
    pub fn text(&self) -> &str {
        match self {
            DashboardNotice::Success(text) | DashboardNotice::Failure(text) => text,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DashboardNotice::Success(_))
    }

    fn from_result(result: Result<Appointment, GatewayError>) -> Self {
        match result {
            Ok(record) => DashboardNotice::Success(record.user_id),
            Err(err) => DashboardNotice::Failure(err.user_message()),
        }
    }
}

#[derive(Clone)]
pub struct Dashboard {
    gateway: AppointmentGateway,
}

impl Dashboard {
    pub fn new(gateway: AppointmentGateway) -> Self {
        Self { gateway }
    }

    #[tracing::instrument(name = "dashboard_load", skip_all)]
    pub async fn load_events(&self) -> Result<Vec<CalendarEvent>, DashboardNotice> {
        let records = self
            .gateway
            .list()
            .await
            .map_err(|err| DashboardNotice::Failure(err.user_message()))?;

        let events = records
            .iter()
            .filter_map(|record| {
                let event = CalendarEvent::from_appointment(record);
                if event.is_none() {
                    tracing::warn!(id = %record.id, start = %record.start, end = %record.end, "skipping appointment with unreadable dates.");
                }
                event
            })
            .collect::<Vec<_>>();

        tracing::debug!(records = records.len(), events = events.len(), "calendar loaded.");
        Ok(events)
    }

    #[tracing::instrument(name = "dashboard_submit", skip(self, draft), fields(id = %draft.id))]
    pub async fn submit(&self, mode: SubmitMode, draft: AppointmentRequest) -> DashboardNotice {
        if let Err(err) = validate_draft(&draft) {
            tracing::info!(error = %err, "draft rejected before sending.");
            return DashboardNotice::Failure(err.to_string());
        }

        let result = match mode {
            SubmitMode::Create => self.gateway.create(&draft).await,
            SubmitMode::Update => self.gateway.update(&draft).await,
        };
        DashboardNotice::from_result(result)
    }

    #[tracing::instrument(name = "dashboard_delete", skip(self))]
    pub async fn delete(&self, id: &str) -> Option<DashboardNotice> {
        if id.is_empty() {
            return None;
        }
        Some(DashboardNotice::from_result(self.gateway.delete(id).await))
    }
}
