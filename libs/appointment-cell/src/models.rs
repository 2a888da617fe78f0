// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use crate::services::store::StoreError;

// ==============================================================================
// CORE MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub appointment_date: NaiveDate,
    pub worker_id: Uuid,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload; the backend assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub appointment_date: NaiveDate,
    pub worker_id: Uuid,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,
    Worker,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Client => write!(f, "client"),
            UserRole::Worker => write!(f, "worker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A bookable service offered on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Uuid,
    pub name: String,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Reads any JSON value as text. Non-string values keep their JSON form so
/// they fail the same checks as a malformed string; `null` counts as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub appointment_date: Option<String>,
    /// Email of the worker being booked.
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    /// Portfolio (service) name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(rename = "AppointmentDate", default, deserialize_with = "lenient_text")]
    pub appointment_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookedAppointment {
    pub appointment: Appointment,
    pub user: UserProfile,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Restart Login, invalid token provided")]
    UserNotFound,

    #[error("Remember you must insert a date, and the date format should be YYYY-MM-DD, try again")]
    InvalidDateFormat,

    #[error("This day is prior to the current day, try again.")]
    DateInPast,

    #[error("Invalid or too long email")]
    InvalidEmail,

    #[error("Worker not found")]
    WorkerNotFound,

    #[error("Service not found in Portfolio")]
    ServiceNotFound,

    #[error("Appointment is not available")]
    SlotNotAvailable,

    #[error("Appointment not found")]
    NotFound,

    #[error("All fields must be provided")]
    MissingField,

    #[error("Only workers can list their agenda")]
    NotAWorker,

    #[error("Store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotTaken => AppointmentError::SlotNotAvailable,
            other => AppointmentError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_request_reads_pascal_case_field() {
        let request: UpdateAppointmentRequest =
            serde_json::from_value(json!({ "AppointmentDate": "2999-01-01" })).unwrap();
        assert_eq!(request.appointment_date.as_deref(), Some("2999-01-01"));

        let empty: UpdateAppointmentRequest = serde_json::from_value(json!({})).unwrap();
        assert!(empty.appointment_date.is_none());
    }

    #[test]
    fn test_non_string_fields_are_kept_as_text() {
        let request: CreateAppointmentRequest = serde_json::from_value(json!({
            "appointment_date": 20990101,
            "email": 42,
            "name": null
        }))
        .unwrap();

        assert_eq!(request.appointment_date.as_deref(), Some("20990101"));
        assert_eq!(request.email.as_deref(), Some("42"));
        assert!(request.name.is_none());

        let update: UpdateAppointmentRequest =
            serde_json::from_value(json!({ "AppointmentDate": ["2999-01-01"] })).unwrap();
        assert_eq!(update.appointment_date.as_deref(), Some(r#"["2999-01-01"]"#));
    }

    #[test]
    fn test_user_profile_tolerates_missing_optional_columns() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "6f1c1f4e-7d0a-4b7e-9a39-2a4a1b1e2c3d",
            "email": "worker@example.com",
            "role": "worker"
        }))
        .unwrap();

        assert_eq!(profile.role, UserRole::Worker);
        assert!(profile.name.is_none());
    }

    #[test]
    fn test_slot_taken_becomes_slot_not_available() {
        let err: AppointmentError = StoreError::SlotTaken.into();
        assert!(matches!(err, AppointmentError::SlotNotAvailable));
        assert_eq!(err.to_string(), "Appointment is not available");
    }
}
