// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use mockable::{Clock, DefaultClock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentError, BookedAppointment, CreateAppointmentRequest,
    NewAppointment, UpdateAppointmentRequest, UserProfile, UserRole,
};
use crate::services::store::AppointmentStore;
use crate::services::supabase_store::SupabaseAppointmentStore;
use crate::services::validation::{ensure_bookable, parse_appointment_date, validate_worker_email};

pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_dependencies(
            Arc::new(SupabaseAppointmentStore::new(config)),
            Arc::new(DefaultClock),
        )
    }

    pub fn with_dependencies(
        store: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self { store, clock }
    }

    /// Today's date in the server's local calendar.
    fn today(&self) -> NaiveDate {
        self.clock.local().date_naive()
    }

    async fn require_user(&self, user_id: Uuid) -> Result<UserProfile, AppointmentError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(AppointmentError::UserNotFound)
    }

    async fn require_owned_appointment(
        &self,
        appointment_id: Uuid,
        client_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        self.store
            .find_client_appointment(appointment_id, client_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Books a worker for one day on behalf of the requesting client.
    ///
    /// Checks run in a fixed order and the first failure wins: caller,
    /// date format, date not before tomorrow, worker email, worker,
    /// service, free slot. The slot pre-check is only a fast path; the
    /// store's unique (worker, date) index is what finally rejects a
    /// double booking.
    pub async fn create_appointment(
        &self,
        requester_id: Uuid,
        request: CreateAppointmentRequest,
    ) -> Result<BookedAppointment, AppointmentError> {
        debug!("Booking request from user {}: {:?}", requester_id, request);

        let user = self.require_user(requester_id).await?;

        let appointment_date = parse_appointment_date(request.appointment_date.as_deref())?;
        ensure_bookable(appointment_date, self.today())?;

        let worker_email = validate_worker_email(request.email.as_deref())?;

        let worker = self.store
            .find_user_by_email(worker_email, UserRole::Worker)
            .await?
            .ok_or(AppointmentError::WorkerNotFound)?;

        let portfolio = match request.name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => self.store.find_portfolio_by_name(name).await?,
            None => None,
        }
        .ok_or(AppointmentError::ServiceNotFound)?;

        if let Some(existing) = self.store.find_slot(worker.id, appointment_date).await? {
            warn!("Worker {} already booked on {} (appointment {})",
                  worker.id, appointment_date, existing.id);
            return Err(AppointmentError::SlotNotAvailable);
        }

        let new_appointment = NewAppointment {
            appointment_date,
            worker_id: worker.id,
            client_id: user.id,
            created_at: self.clock.utc(),
        };

        let appointment = self.store
            .create_with_portfolio(new_appointment, portfolio.id)
            .await?;

        info!("Appointment {} booked: client {} with worker {} on {} for '{}'",
              appointment.id, user.id, worker.id, appointment_date, portfolio.name);

        Ok(BookedAppointment { appointment, user })
    }

    /// Moves one of the requester's appointments to another day.
    ///
    /// The worker's other bookings are not consulted here; only the
    /// store's unique index can refuse the new date.
    pub async fn update_appointment(
        &self,
        requester_id: Uuid,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {} for user {}", appointment_id, requester_id);

        self.require_user(requester_id).await?;
        self.require_owned_appointment(appointment_id, requester_id).await?;

        let raw_date = request.appointment_date
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .ok_or(AppointmentError::MissingField)?;

        let new_date = parse_appointment_date(Some(raw_date))?;
        ensure_bookable(new_date, self.today())?;

        let updated = self.store
            .update_date(appointment_id, new_date, self.clock.utc())
            .await?
            .ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} moved to {}", appointment_id, new_date);
        Ok(updated)
    }

    pub async fn delete_appointment(
        &self,
        requester_id: Uuid,
        appointment_id: Uuid,
    ) -> Result<(), AppointmentError> {
        debug!("Deleting appointment {} for user {}", appointment_id, requester_id);

        self.require_user(requester_id).await?;
        self.require_owned_appointment(appointment_id, requester_id).await?;

        if !self.store.delete(appointment_id).await? {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} deleted by client {}", appointment_id, requester_id);
        Ok(())
    }

    pub async fn list_client_appointments(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let user = self.require_user(requester_id).await?;
        Ok(self.store.list_by_client(user.id).await?)
    }

    pub async fn list_worker_appointments(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let user = self.require_user(requester_id).await?;
        if user.role != UserRole::Worker {
            return Err(AppointmentError::NotAWorker);
        }
        Ok(self.store.list_by_worker(user.id).await?)
    }
}
