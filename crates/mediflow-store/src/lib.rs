//! Mediflow store crate - CSV-backed provider, schedule, and appointment stores.
//!
//! The provider and schedule tables are flat delimited files loaded wholesale
//! at startup and held in memory. Bookings mutate the in-memory schedule and
//! are optionally persisted by rewriting the schedule table wholesale.

mod appointments;
mod error;
mod providers;
mod schedules;

pub use appointments::AppointmentStore;
pub use error::StoreError;
pub use providers::ProviderStore;
pub use schedules::ScheduleStore;

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use mediflow_core::config::DataConfig;
use mediflow_core::types::{Appointment, AppointmentRequest};

/// Owned bundle of all three stores, passed to the orchestration loop and
/// the API by handle.
#[derive(Clone)]
pub struct Stores {
    pub providers: Arc<ProviderStore>,
    pub schedules: Arc<ScheduleStore>,
    pub appointments: Arc<AppointmentStore>,
}

impl Stores {
    /// Load the provider and schedule tables from the configured paths.
    pub fn load(data: &DataConfig) -> Result<Self, StoreError> {
        let providers = ProviderStore::load(Path::new(&data.providers_path))?;
        let schedules =
            ScheduleStore::load(Path::new(&data.schedules_path), data.persist_bookings)?;
        info!(
            providers = providers.all().len(),
            "Stores initialized from CSV tables"
        );
        Ok(Self {
            providers: Arc::new(providers),
            schedules: Arc::new(schedules),
            appointments: Arc::new(AppointmentStore::new()),
        })
    }

    /// Book a slot and record the resulting appointment.
    ///
    /// Fails without side effects when the provider is unknown or the slot
    /// is not free. The slot removal and the appointment record are the only
    /// mutations; neither is ever undone.
    pub fn book_appointment(
        &self,
        request: AppointmentRequest,
    ) -> Result<Appointment, StoreError> {
        let provider = self
            .providers
            .get(&request.provider_id)
            .ok_or_else(|| StoreError::ProviderNotFound(request.provider_id.clone()))?;

        self.schedules
            .book(&request.provider_id, request.date, &request.time)?;

        let appointment = self.appointments.create(request, &provider);
        info!(
            appointment_id = %appointment.id,
            provider = %appointment.provider_name,
            date = %appointment.date,
            time = %appointment.time,
            "Appointment booked"
        );
        Ok(appointment)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_stores() -> (tempfile::TempDir, Stores) {
        let (dir, providers, schedules) = test_fixtures::write_tables();
        let data = DataConfig {
            providers_path: providers.to_string_lossy().to_string(),
            schedules_path: schedules.to_string_lossy().to_string(),
            persist_bookings: false,
        };
        let stores = Stores::load(&data).unwrap();
        (dir, stores)
    }

    fn request(provider_id: &str, date: &str, time: &str) -> AppointmentRequest {
        AppointmentRequest {
            patient_name: "Jane Doe".to_string(),
            provider_id: provider_id.to_string(),
            date: date.parse().unwrap(),
            time: time.to_string(),
            reason: Some("checkup".to_string()),
        }
    }

    #[test]
    fn test_book_appointment_removes_slot() {
        let (_dir, stores) = make_stores();
        let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

        let appt = stores
            .book_appointment(request("p001", "2026-01-06", "09:00"))
            .unwrap();
        assert_eq!(appt.provider_name, "Dr. Sarah Chen");
        assert_eq!(appt.location, "Downtown Medical Center");

        let slots = stores.schedules.available_slots("p001", date);
        assert!(!slots.contains(&"09:00".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
    }

    #[test]
    fn test_double_booking_fails_and_leaves_set_unchanged() {
        let (_dir, stores) = make_stores();
        let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

        stores
            .book_appointment(request("p001", "2026-01-06", "09:00"))
            .unwrap();
        let before = stores.schedules.available_slots("p001", date);

        let second = stores.book_appointment(request("p001", "2026-01-06", "09:00"));
        assert!(matches!(second, Err(StoreError::SlotUnavailable { .. })));
        assert_eq!(stores.schedules.available_slots("p001", date), before);
    }

    #[test]
    fn test_unknown_provider_fails_without_side_effects() {
        let (_dir, stores) = make_stores();
        let result = stores.book_appointment(request("p999", "2026-01-06", "09:00"));
        assert!(matches!(result, Err(StoreError::ProviderNotFound(_))));
        assert!(stores.appointments.all().is_empty());
    }

    #[test]
    fn test_booked_appointment_is_retrievable() {
        let (_dir, stores) = make_stores();
        let appt = stores
            .book_appointment(request("p002", "2026-01-06", "13:00"))
            .unwrap();
        let fetched = stores.appointments.get(appt.id).unwrap();
        assert_eq!(fetched, appt);
    }
}
