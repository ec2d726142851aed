//! In-memory schedule table with CSV load/save.
//!
//! Each row is (provider, date) with a comma-joined list of free "HH:MM"
//! slots. Booking removes a slot; nothing re-adds one except a full reload.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mediflow_core::types::Schedule;

use crate::error::StoreError;

/// One row of the schedule table as it appears on disk.
#[derive(Debug, Deserialize, Serialize)]
struct ScheduleRow {
    provider_id: String,
    date: String,
    time_slots: String,
    is_available: String,
}

/// In-memory schedule store keyed by provider id.
///
/// Interior mutability via `Mutex`: booking is the sole mutation and the
/// system assumes one active conversation, but handlers still share the
/// store across tasks.
pub struct ScheduleStore {
    schedules: Mutex<HashMap<String, Vec<Schedule>>>,
    source: PathBuf,
    persist_bookings: bool,
}

impl ScheduleStore {
    /// Load the schedule table from a CSV file.
    pub fn load(path: &Path, persist_bookings: bool) -> Result<Self, StoreError> {
        let schedules = read_table(path)?;
        let total: usize = schedules.values().map(|v| v.len()).sum();
        info!(
            entries = total,
            providers = schedules.len(),
            path = %path.display(),
            "Schedules loaded"
        );
        Ok(Self {
            schedules: Mutex::new(schedules),
            source: path.to_path_buf(),
            persist_bookings,
        })
    }

    /// Free slots for a provider on a date; empty when none are recorded.
    pub fn available_slots(&self, provider_id: &str, date: NaiveDate) -> Vec<String> {
        let schedules = match self.schedules.lock() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        schedules
            .get(provider_id)
            .and_then(|entries| entries.iter().find(|s| s.date == date))
            .map(|s| s.slots.clone())
            .unwrap_or_default()
    }

    /// Upcoming availability for a provider: date -> free slots, dates with
    /// no free slots omitted, at most `num_days` entries.
    pub fn availability_summary(
        &self,
        provider_id: &str,
        num_days: usize,
    ) -> BTreeMap<NaiveDate, Vec<String>> {
        let schedules = match self.schedules.lock() {
            Ok(s) => s,
            Err(_) => return BTreeMap::new(),
        };
        let mut summary = BTreeMap::new();
        if let Some(entries) = schedules.get(provider_id) {
            for entry in entries {
                if summary.len() >= num_days {
                    break;
                }
                if !entry.slots.is_empty() {
                    summary.insert(entry.date, entry.slots.clone());
                }
            }
        }
        summary
    }

    /// Book a slot by removing it from the free set.
    ///
    /// Fails when the provider, date, or slot is absent; the set is left
    /// untouched on failure.
    pub fn book(
        &self,
        provider_id: &str,
        date: NaiveDate,
        time: &str,
    ) -> Result<(), StoreError> {
        let mut schedules = self.schedules.lock().map_err(|_| StoreError::LockPoisoned)?;

        let slot_missing = || StoreError::SlotUnavailable {
            provider_id: provider_id.to_string(),
            date,
            time: time.to_string(),
        };

        let entries = schedules.get_mut(provider_id).ok_or_else(slot_missing)?;
        let entry = entries
            .iter_mut()
            .find(|s| s.date == date)
            .ok_or_else(slot_missing)?;
        let pos = entry
            .slots
            .iter()
            .position(|s| s == time)
            .ok_or_else(slot_missing)?;
        entry.slots.remove(pos);
        info!(provider_id, date = %date, time, "Slot booked");

        if self.persist_bookings {
            // Best effort: a failed rewrite keeps the in-memory booking.
            if let Err(e) = write_table(&self.source, &schedules) {
                warn!(error = %e, "Failed to persist booking to schedule table");
            }
        }
        Ok(())
    }

    /// Re-read the source table, discarding in-memory bookings that were not
    /// persisted.
    pub fn reload(&self) -> Result<(), StoreError> {
        let fresh = read_table(&self.source)?;
        let mut schedules = self.schedules.lock().map_err(|_| StoreError::LockPoisoned)?;
        *schedules = fresh;
        info!(path = %self.source.display(), "Schedules reloaded from source table");
        Ok(())
    }

    /// Rewrite the source table from the in-memory state.
    pub fn save(&self) -> Result<(), StoreError> {
        let schedules = self.schedules.lock().map_err(|_| StoreError::LockPoisoned)?;
        write_table(&self.source, &schedules)
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, Vec<Schedule>>, StoreError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut schedules: HashMap<String, Vec<Schedule>> = HashMap::new();

    for row in reader.deserialize::<ScheduleRow>() {
        let row = row?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .map_err(|e| StoreError::Parse(format!("bad date {}: {}", row.date, e)))?;
        let slots: Vec<String> = row
            .time_slots
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let available = row.is_available == "1" || row.is_available.eq_ignore_ascii_case("true");
        debug!(provider_id = %row.provider_id, date = %date, slots = slots.len(), "Schedule row");
        schedules.entry(row.provider_id.clone()).or_default().push(Schedule {
            provider_id: row.provider_id,
            date,
            slots,
            available,
        });
    }

    // Keep each provider's entries in date order for summary queries.
    for entries in schedules.values_mut() {
        entries.sort_by_key(|s| s.date);
    }
    Ok(schedules)
}

fn write_table(
    path: &Path,
    schedules: &HashMap<String, Vec<Schedule>>,
) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut provider_ids: Vec<&String> = schedules.keys().collect();
    provider_ids.sort();
    for provider_id in provider_ids {
        let mut entries: Vec<&Schedule> = schedules[provider_id].iter().collect();
        entries.sort_by_key(|s| s.date);
        for entry in entries {
            writer.serialize(ScheduleRow {
                provider_id: entry.provider_id.clone(),
                date: entry.date.format("%Y-%m-%d").to_string(),
                time_slots: entry.slots.join(","),
                is_available: if entry.available { "1" } else { "0" }.to_string(),
            })?;
        }
    }
    writer.flush().map_err(StoreError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;

    fn load_fixture(persist: bool) -> (tempfile::TempDir, ScheduleStore) {
        let (dir, _, schedules_path) = test_fixtures::write_tables();
        let store = ScheduleStore::load(&schedules_path, persist).unwrap();
        (dir, store)
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_available_slots_for_known_date() {
        let (_dir, store) = load_fixture(false);
        let slots = store.available_slots("p001", date("2026-01-06"));
        assert_eq!(slots, vec!["09:00", "09:30", "10:00", "14:00"]);
    }

    #[test]
    fn test_available_slots_empty_when_unrecorded() {
        let (_dir, store) = load_fixture(false);
        assert!(store.available_slots("p001", date("2026-02-01")).is_empty());
        assert!(store.available_slots("p999", date("2026-01-06")).is_empty());
    }

    #[test]
    fn test_book_removes_exactly_one_slot() {
        let (_dir, store) = load_fixture(false);
        store.book("p001", date("2026-01-06"), "09:00").unwrap();
        let slots = store.available_slots("p001", date("2026-01-06"));
        assert_eq!(slots, vec!["09:30", "10:00", "14:00"]);
    }

    #[test]
    fn test_book_missing_slot_fails_unchanged() {
        let (_dir, store) = load_fixture(false);
        let before = store.available_slots("p001", date("2026-01-06"));
        let result = store.book("p001", date("2026-01-06"), "08:00");
        assert!(matches!(result, Err(StoreError::SlotUnavailable { .. })));
        assert_eq!(store.available_slots("p001", date("2026-01-06")), before);
    }

    #[test]
    fn test_book_twice_second_fails() {
        let (_dir, store) = load_fixture(false);
        store.book("p001", date("2026-01-06"), "09:00").unwrap();
        let before = store.available_slots("p001", date("2026-01-06"));
        assert!(store.book("p001", date("2026-01-06"), "09:00").is_err());
        assert_eq!(store.available_slots("p001", date("2026-01-06")), before);
    }

    #[test]
    fn test_book_unknown_provider_fails() {
        let (_dir, store) = load_fixture(false);
        assert!(store.book("p999", date("2026-01-06"), "09:00").is_err());
    }

    #[test]
    fn test_availability_summary_skips_empty_dates() {
        let (_dir, store) = load_fixture(false);
        store.book("p002", date("2026-01-06"), "13:00").unwrap();
        store.book("p002", date("2026-01-06"), "13:30").unwrap();
        let summary = store.availability_summary("p002", 7);
        assert!(summary.is_empty());
    }

    #[test]
    fn test_availability_summary_in_date_order() {
        let (_dir, store) = load_fixture(false);
        let summary = store.availability_summary("p001", 7);
        let dates: Vec<NaiveDate> = summary.keys().cloned().collect();
        assert_eq!(dates, vec![date("2026-01-06"), date("2026-01-07")]);
    }

    #[test]
    fn test_availability_summary_caps_days() {
        let (_dir, store) = load_fixture(false);
        let summary = store.availability_summary("p001", 1);
        assert_eq!(summary.len(), 1);
        assert!(summary.contains_key(&date("2026-01-06")));
    }

    #[test]
    fn test_availability_summary_zero_days_is_empty() {
        let (_dir, store) = load_fixture(false);
        assert!(store.availability_summary("p001", 0).is_empty());
    }

    #[test]
    fn test_reload_restores_booked_slots() {
        let (_dir, store) = load_fixture(false);
        store.book("p001", date("2026-01-06"), "09:00").unwrap();
        store.reload().unwrap();
        let slots = store.available_slots("p001", date("2026-01-06"));
        assert!(slots.contains(&"09:00".to_string()));
    }

    #[test]
    fn test_persisted_booking_survives_reload() {
        let (_dir, store) = load_fixture(true);
        store.book("p001", date("2026-01-06"), "09:00").unwrap();
        store.reload().unwrap();
        let slots = store.available_slots("p001", date("2026-01-06"));
        assert!(!slots.contains(&"09:00".to_string()));
        assert!(slots.contains(&"09:30".to_string()));
    }

    #[test]
    fn test_save_roundtrips_quoted_slot_lists() {
        let (_dir, store) = load_fixture(false);
        store.save().unwrap();
        store.reload().unwrap();
        let slots = store.available_slots("p001", date("2026-01-06"));
        assert_eq!(slots, vec!["09:00", "09:30", "10:00", "14:00"]);
    }

    #[test]
    fn test_bad_date_rejects_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.csv");
        std::fs::write(
            &path,
            "provider_id,date,time_slots,is_available\np001,06/01/2026,09:00,1\n",
        )
        .unwrap();
        assert!(matches!(
            ScheduleStore::load(&path, false),
            Err(StoreError::Parse(_))
        ));
    }
}
