// libs/appointment-cell/src/services/store.rs
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Appointment, NewAppointment, Portfolio, UserProfile, UserRole};

#[derive(Error, Debug)]
pub enum StoreError {
    /// The (worker, date) unique index rejected the write.
    #[error("slot already booked for this worker")]
    SlotTaken,

    #[error("{0:#}")]
    Backend(#[from] anyhow::Error),
}

/// Persistence port for appointments and the records they reference.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError>;

    async fn find_user_by_email(&self, email: &str, role: UserRole) -> Result<Option<UserProfile>, StoreError>;

    async fn find_portfolio_by_name(&self, name: &str) -> Result<Option<Portfolio>, StoreError>;

    async fn find_slot(&self, worker_id: Uuid, date: NaiveDate) -> Result<Option<Appointment>, StoreError>;

    /// Writes the appointment and its portfolio link as one unit: both rows
    /// commit or neither does.
    async fn create_with_portfolio(
        &self,
        appointment: NewAppointment,
        portfolio_id: Uuid,
    ) -> Result<Appointment, StoreError>;

    async fn find_client_appointment(&self, id: Uuid, client_id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Returns `None` when the row no longer exists.
    async fn update_date(
        &self,
        id: Uuid,
        date: NaiveDate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, StoreError>;

    async fn list_by_worker(&self, worker_id: Uuid) -> Result<Vec<Appointment>, StoreError>;
}
