//! Shared domain types for the appointment scheduling system.
//!
//! These types flow across crate boundaries: stores load them from CSV,
//! the agent reasons over them, and the API serializes them to JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MediflowError;

// =============================================================================
// Specialty
// =============================================================================

/// Medical specialties recognized by the provider matcher.
///
/// Serialized with the human-readable names used in the provider table
/// (e.g. "General Practitioner", "ENT Specialist").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    #[serde(rename = "General Practitioner")]
    GeneralPractitioner,
    #[serde(rename = "Dermatologist")]
    Dermatologist,
    #[serde(rename = "Cardiologist")]
    Cardiologist,
    #[serde(rename = "Neurologist")]
    Neurologist,
    #[serde(rename = "Orthopedist")]
    Orthopedist,
    #[serde(rename = "Pediatrician")]
    Pediatrician,
    #[serde(rename = "Psychiatrist")]
    Psychiatrist,
    #[serde(rename = "Ophthalmologist")]
    Ophthalmologist,
    #[serde(rename = "ENT Specialist")]
    EntSpecialist,
}

impl Specialty {
    /// Human-readable name, matching the provider table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::GeneralPractitioner => "General Practitioner",
            Specialty::Dermatologist => "Dermatologist",
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Neurologist => "Neurologist",
            Specialty::Orthopedist => "Orthopedist",
            Specialty::Pediatrician => "Pediatrician",
            Specialty::Psychiatrist => "Psychiatrist",
            Specialty::Ophthalmologist => "Ophthalmologist",
            Specialty::EntSpecialist => "ENT Specialist",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = MediflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "General Practitioner" => Ok(Specialty::GeneralPractitioner),
            "Dermatologist" => Ok(Specialty::Dermatologist),
            "Cardiologist" => Ok(Specialty::Cardiologist),
            "Neurologist" => Ok(Specialty::Neurologist),
            "Orthopedist" => Ok(Specialty::Orthopedist),
            "Pediatrician" => Ok(Specialty::Pediatrician),
            "Psychiatrist" => Ok(Specialty::Psychiatrist),
            "Ophthalmologist" => Ok(Specialty::Ophthalmologist),
            "ENT Specialist" => Ok(Specialty::EntSpecialist),
            other => Err(MediflowError::Store(format!(
                "unknown specialty: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Provider
// =============================================================================

/// A healthcare provider. Immutable after load from the provider table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub specialty: Specialty,
    pub experience_years: u32,
    /// Patient rating from 0.0 to 5.0.
    pub rating: f32,
    pub location: String,
}

// =============================================================================
// Schedule
// =============================================================================

/// Free time slots for one provider on one date.
///
/// The slot list is ordered chronologically and only ever shrinks: booking
/// removes a slot, and nothing re-adds one short of a full reload from the
/// source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub provider_id: String,
    pub date: NaiveDate,
    /// Free time-of-day slots in "HH:MM" 24-hour format.
    pub slots: Vec<String>,
    pub available: bool,
}

// =============================================================================
// Appointment
// =============================================================================

/// A booked appointment. Created once, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_name: String,
    pub provider_id: String,
    pub provider_name: String,
    pub date: NaiveDate,
    /// "HH:MM" 24-hour format.
    pub time: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub patient_name: String,
    pub provider_id: String,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub reason: Option<String>,
}

// =============================================================================
// Conversation state
// =============================================================================

/// Linear conversation state for the scheduling flow.
///
/// States advance strictly forward:
/// Initial -> IssueIdentified -> ProviderMatched -> AvailabilityChecked
/// -> AppointmentConfirmed. A state may skip ahead (a single tool call can
/// take Initial straight to ProviderMatched) but never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Initial,
    IssueIdentified,
    ProviderMatched,
    AvailabilityChecked,
    AppointmentConfirmed,
}

impl ConversationState {
    /// Wire representation, matching the serialized snake_case form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Initial => "initial",
            ConversationState::IssueIdentified => "issue_identified",
            ConversationState::ProviderMatched => "provider_matched",
            ConversationState::AvailabilityChecked => "availability_checked",
            ConversationState::AppointmentConfirmed => "appointment_confirmed",
        }
    }

    /// Position in the linear flow.
    fn rank(&self) -> u8 {
        match self {
            ConversationState::Initial => 0,
            ConversationState::IssueIdentified => 1,
            ConversationState::ProviderMatched => 2,
            ConversationState::AvailabilityChecked => 3,
            ConversationState::AppointmentConfirmed => 4,
        }
    }

    /// Whether moving to `next` is a forward transition.
    pub fn can_advance_to(&self, next: ConversationState) -> bool {
        next.rank() > self.rank()
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Specialty ----

    #[test]
    fn test_specialty_roundtrip_str() {
        let all = [
            Specialty::GeneralPractitioner,
            Specialty::Dermatologist,
            Specialty::Cardiologist,
            Specialty::Neurologist,
            Specialty::Orthopedist,
            Specialty::Pediatrician,
            Specialty::Psychiatrist,
            Specialty::Ophthalmologist,
            Specialty::EntSpecialist,
        ];
        for s in all {
            assert_eq!(s.as_str().parse::<Specialty>().unwrap(), s);
        }
    }

    #[test]
    fn test_specialty_unknown_is_error() {
        assert!("Podiatrist".parse::<Specialty>().is_err());
    }

    #[test]
    fn test_specialty_serde_uses_display_name() {
        let json = serde_json::to_string(&Specialty::EntSpecialist).unwrap();
        assert_eq!(json, "\"ENT Specialist\"");
        let parsed: Specialty = serde_json::from_str("\"Dermatologist\"").unwrap();
        assert_eq!(parsed, Specialty::Dermatologist);
    }

    // ---- Conversation state ----

    #[test]
    fn test_state_advances_forward() {
        assert!(ConversationState::Initial.can_advance_to(ConversationState::ProviderMatched));
        assert!(ConversationState::ProviderMatched
            .can_advance_to(ConversationState::AvailabilityChecked));
        assert!(ConversationState::AvailabilityChecked
            .can_advance_to(ConversationState::AppointmentConfirmed));
    }

    #[test]
    fn test_state_never_regresses() {
        assert!(!ConversationState::ProviderMatched.can_advance_to(ConversationState::Initial));
        assert!(!ConversationState::AppointmentConfirmed
            .can_advance_to(ConversationState::AvailabilityChecked));
    }

    #[test]
    fn test_state_self_transition_rejected() {
        assert!(!ConversationState::Initial.can_advance_to(ConversationState::Initial));
        assert!(!ConversationState::AppointmentConfirmed
            .can_advance_to(ConversationState::AppointmentConfirmed));
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&ConversationState::ProviderMatched).unwrap();
        assert_eq!(json, "\"provider_matched\"");
        assert_eq!(ConversationState::AvailabilityChecked.as_str(), "availability_checked");
    }

    // ---- Appointment ----

    #[test]
    fn test_appointment_serializes_without_empty_reason() {
        let appt = Appointment {
            id: Uuid::new_v4(),
            patient_name: "Jane Doe".to_string(),
            provider_id: "p001".to_string(),
            provider_name: "Dr. Sarah Chen".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            time: "09:00".to_string(),
            location: "Downtown Clinic".to_string(),
            reason: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&appt).unwrap();
        assert!(!json.contains("\"reason\""));
        assert!(json.contains("2026-01-06"));
    }
}
