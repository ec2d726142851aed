//! Append-only in-memory appointment store.

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use mediflow_core::types::{Appointment, AppointmentRequest, Provider};

/// In-memory appointment registry. Appointments are created once and never
/// mutated or deleted; presence in the list is their entire lifecycle, so
/// the store is an append-only list in creation order.
#[derive(Default)]
pub struct AppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
}

impl AppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new appointment for the given request and provider.
    pub fn create(&self, request: AppointmentRequest, provider: &Provider) -> Appointment {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_name: request.patient_name,
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            date: request.date,
            time: request.time,
            location: provider.location.clone(),
            reason: request.reason,
            created_at: Utc::now(),
        };
        if let Ok(mut appointments) = self.appointments.lock() {
            appointments.push(appointment.clone());
        }
        appointment
    }

    /// Look up an appointment by id.
    pub fn get(&self, id: Uuid) -> Option<Appointment> {
        self.appointments
            .lock()
            .ok()
            .and_then(|a| a.iter().find(|appt| appt.id == id).cloned())
    }

    /// All appointments in creation order.
    pub fn all(&self) -> Vec<Appointment> {
        match self.appointments.lock() {
            Ok(a) => a.clone(),
            Err(_) => Vec::new(),
        }
    }
}
