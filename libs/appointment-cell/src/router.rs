// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, AppointmentState};
use crate::services::booking::AppointmentBookingService;

pub fn appointment_routes(config: Arc<AppConfig>) -> Router {
    let booking = Arc::new(AppointmentBookingService::new(&config));
    appointment_routes_with_service(config, booking)
}

/// Same routes over a caller-supplied service (custom store or clock).
pub fn appointment_routes_with_service(
    config: Arc<AppConfig>,
    booking: Arc<AppointmentBookingService>,
) -> Router {
    // All appointment operations require authentication
    Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/client", get(handlers::get_client_appointments))
        .route("/worker", get(handlers::get_worker_appointments))
        .route(
            "/{appointment_id}",
            put(handlers::update_appointment).delete(handlers::delete_appointment),
        )
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(AppointmentState { booking })
}
