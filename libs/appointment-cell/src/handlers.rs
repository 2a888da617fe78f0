// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AppointmentError, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::services::booking::AppointmentBookingService;

const CREATE_FAILED: &str = "Failed to create appointment";
const UPDATE_FAILED: &str = "Failed to update appointment";
const DELETE_FAILED: &str = "Failed to delete appointment";
const RETRIEVE_FAILED: &str = "Failed to retrieve appointments";

#[derive(Clone)]
pub struct AppointmentState {
    pub booking: Arc<AppointmentBookingService>,
}

/// Maps a domain failure to its HTTP form. Store faults are logged with
/// their cause and answered with the operation's generic message only.
fn to_app_error(err: AppointmentError, failure: &'static str) -> AppError {
    match err {
        AppointmentError::UserNotFound
        | AppointmentError::WorkerNotFound
        | AppointmentError::ServiceNotFound
        | AppointmentError::NotFound => AppError::NotFound(err.to_string()),
        AppointmentError::InvalidDateFormat
        | AppointmentError::DateInPast
        | AppointmentError::InvalidEmail
        | AppointmentError::MissingField
        | AppointmentError::SlotNotAvailable => AppError::BadRequest(err.to_string()),
        AppointmentError::NotAWorker => AppError::Forbidden(err.to_string()),
        AppointmentError::Store(cause) => {
            error!("{}: {}", failure, cause);
            AppError::Internal(failure.to_string())
        }
    }
}

/// The token subject must be a user id; anything else cannot match a user row.
fn requester_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::NotFound(AppointmentError::UserNotFound.to_string()))
}

/// An id that is not a UUID cannot name any appointment.
fn parse_appointment_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::NotFound(AppointmentError::NotFound.to_string()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let requester = requester_id(&user)?;
    let request = json_body(payload)?;

    let booked = state.booking.create_appointment(requester, request).await
        .map_err(|e| to_app_error(e, CREATE_FAILED))?;

    Ok((StatusCode::CREATED, Json(json!({
        "message": "Appointment has been created",
        "appointment": booked.appointment,
        "user": booked.user
    }))))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let requester = requester_id(&user)?;
    let appointment_id = parse_appointment_id(&raw_id)?;
    let request = json_body(payload)?;

    let appointment = state.booking.update_appointment(requester, appointment_id, request).await
        .map_err(|e| to_app_error(e, UPDATE_FAILED))?;

    Ok((StatusCode::ACCEPTED, Json(json!({
        "message": "Appointment updated successfully",
        "appointment": appointment
    }))))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let requester = requester_id(&user)?;
    let appointment_id = parse_appointment_id(&raw_id)?;

    state.booking.delete_appointment(requester, appointment_id).await
        .map_err(|e| to_app_error(e, DELETE_FAILED))?;

    Ok(Json(json!({
        "message": "Appointment deleted successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_client_appointments(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let requester = requester_id(&user)?;

    let appointments = state.booking.list_client_appointments(requester).await
        .map_err(|e| to_app_error(e, RETRIEVE_FAILED))?;

    Ok(Json(json!({
        "total": appointments.len(),
        "appointments": appointments
    })))
}

#[axum::debug_handler]
pub async fn get_worker_appointments(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let requester = requester_id(&user)?;

    let appointments = state.booking.list_worker_appointments(requester).await
        .map_err(|e| to_app_error(e, RETRIEVE_FAILED))?;

    Ok(Json(json!({
        "total": appointments.len(),
        "appointments": appointments
    })))
}
