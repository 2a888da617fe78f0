// libs/appointment-cell/src/services/supabase_store.rs
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DatabaseError, SupabaseClient};

use crate::models::{Appointment, NewAppointment, Portfolio, UserProfile, UserRole};
use crate::services::store::{AppointmentStore, StoreError};

const USER_COLUMNS: &str = "id,email,role,name,created_at,updated_at";
const UNIQUE_VIOLATION: &str = "23505";

/// `AppointmentStore` over the Supabase PostgREST API.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, StoreError> {
        self.supabase
            .request(Method::GET, path, None)
            .await
            .map_err(to_store_error)
    }

    async fn fetch_first<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, StoreError> {
        Ok(self.fetch_all(path).await?.into_iter().next())
    }
}

fn to_store_error(err: DatabaseError) -> StoreError {
    match err {
        DatabaseError::Conflict(body) if body.contains(UNIQUE_VIOLATION) => {
            warn!("Unique constraint rejected appointment write: {}", body);
            StoreError::SlotTaken
        }
        other => StoreError::Backend(anyhow::Error::new(other)),
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        debug!("Looking up user {}", id);
        let path = format!("/rest/v1/users?id=eq.{}&select={}&limit=1", id, USER_COLUMNS);
        self.fetch_first(&path).await
    }

    async fn find_user_by_email(&self, email: &str, role: UserRole) -> Result<Option<UserProfile>, StoreError> {
        debug!("Looking up {} by email {}", role, email);
        let path = format!(
            "/rest/v1/users?email=eq.{}&role=eq.{}&select={}&limit=1",
            urlencoding::encode(email),
            role,
            USER_COLUMNS,
        );
        self.fetch_first(&path).await
    }

    async fn find_portfolio_by_name(&self, name: &str) -> Result<Option<Portfolio>, StoreError> {
        debug!("Looking up portfolio service '{}'", name);
        let path = format!(
            "/rest/v1/portfolios?name=eq.{}&select=id,name&limit=1",
            urlencoding::encode(name),
        );
        self.fetch_first(&path).await
    }

    async fn find_slot(&self, worker_id: Uuid, date: NaiveDate) -> Result<Option<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?worker_id=eq.{}&appointment_date=eq.{}&limit=1",
            worker_id,
            date.format("%Y-%m-%d"),
        );
        self.fetch_first(&path).await
    }

    async fn create_with_portfolio(
        &self,
        appointment: NewAppointment,
        portfolio_id: Uuid,
    ) -> Result<Appointment, StoreError> {
        // book_appointment inserts both rows inside one function call, so
        // PostgREST runs them in a single transaction.
        let body = json!({
            "p_appointment_date": appointment.appointment_date.format("%Y-%m-%d").to_string(),
            "p_worker_id": appointment.worker_id,
            "p_client_id": appointment.client_id,
            "p_portfolio_id": portfolio_id,
            "p_created_at": appointment.created_at.to_rfc3339(),
        });

        let rows: Vec<Appointment> = self.supabase
            .request(Method::POST, "/rest/v1/rpc/book_appointment", Some(body))
            .await
            .map_err(to_store_error)?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend(anyhow!("book_appointment returned no rows")))
    }

    async fn find_client_appointment(&self, id: Uuid, client_id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&client_id=eq.{}&limit=1",
            id, client_id,
        );
        self.fetch_first(&path).await
    }

    async fn update_date(
        &self,
        id: Uuid,
        date: NaiveDate,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Appointment>, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let body = json!({
            "appointment_date": date.format("%Y-%m-%d").to_string(),
            "updated_at": updated_at.to_rfc3339(),
        });

        let rows: Vec<Appointment> = self.supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(to_store_error)?;

        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let rows: Vec<Appointment> = self.supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(to_store_error)?;

        Ok(!rows.is_empty())
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?client_id=eq.{}&order=appointment_date.asc",
            client_id,
        );
        self.fetch_all(&path).await
    }

    async fn list_by_worker(&self, worker_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/appointments?worker_id=eq.{}&order=appointment_date.asc",
            worker_id,
        );
        self.fetch_all(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_only_unique_violations_count_as_taken_slots() {
        let unique = DatabaseError::Conflict(r#"{"code":"23505"}"#.to_string());
        assert_matches!(to_store_error(unique), StoreError::SlotTaken);

        let foreign_key = DatabaseError::Conflict(r#"{"code":"23503"}"#.to_string());
        assert_matches!(to_store_error(foreign_key), StoreError::Backend(_));

        let outage = DatabaseError::Api { status: 503, body: "down".to_string() };
        assert_matches!(to_store_error(outage), StoreError::Backend(err) if err.to_string().contains("503"));
    }
}
