use chrono::NaiveDate;
use thiserror::Error;

use mediflow_core::error::MediflowError;

/// Errors from the CSV-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("slot not available: provider {provider_id} on {date} at {time}")]
    SlotUnavailable {
        provider_id: String,
        date: NaiveDate,
        time: String,
    },

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<StoreError> for MediflowError {
    fn from(err: StoreError) -> Self {
        MediflowError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_unavailable_display_names_the_slot() {
        let err = StoreError::SlotUnavailable {
            provider_id: "p001".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            time: "09:00".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("p001"));
        assert!(msg.contains("2026-01-06"));
        assert!(msg.contains("09:00"));
    }

    #[test]
    fn test_converts_to_mediflow_error() {
        let err: MediflowError = StoreError::ProviderNotFound("p404".to_string()).into();
        assert!(err.to_string().contains("p404"));
    }
}
