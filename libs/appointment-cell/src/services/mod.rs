pub mod booking;
pub mod store;
pub mod supabase_store;
pub mod validation;

pub use booking::AppointmentBookingService;
pub use store::{AppointmentStore, StoreError};
pub use supabase_store::SupabaseAppointmentStore;
