//! Read-only provider table.
//!
//! Loaded wholesale from CSV at startup; lookups by id and specialty.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use mediflow_core::types::{Provider, Specialty};

use crate::error::StoreError;

/// One row of the provider table as it appears on disk.
#[derive(Debug, Deserialize)]
struct ProviderRow {
    id: String,
    name: String,
    specialty: String,
    experience_years: u32,
    rating: f32,
    location: String,
}

/// In-memory provider table. Immutable after load.
pub struct ProviderStore {
    providers: Vec<Provider>,
}

impl ProviderStore {
    /// Load the provider table from a CSV file.
    ///
    /// Rows with an unknown specialty or an out-of-range rating are
    /// rejected; the table is all-or-nothing.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut providers = Vec::new();

        for row in reader.deserialize::<ProviderRow>() {
            let row = row?;
            let specialty: Specialty = row
                .specialty
                .parse()
                .map_err(|_| StoreError::Parse(format!("unknown specialty: {}", row.specialty)))?;
            if !(0.0..=5.0).contains(&row.rating) {
                return Err(StoreError::Parse(format!(
                    "rating out of range for provider {}: {}",
                    row.id, row.rating
                )));
            }
            providers.push(Provider {
                id: row.id,
                name: row.name,
                specialty,
                experience_years: row.experience_years,
                rating: row.rating,
                location: row.location,
            });
        }

        info!(count = providers.len(), path = %path.display(), "Providers loaded");
        Ok(Self { providers })
    }

    /// Construct directly from a provider list (tests, fixtures).
    pub fn from_providers(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// All providers in table order.
    pub fn all(&self) -> &[Provider] {
        &self.providers
    }

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Option<Provider> {
        let found = self.providers.iter().find(|p| p.id == id).cloned();
        if found.is_none() {
            warn!(provider_id = id, "Provider not found");
        }
        found
    }

    /// All providers with the given specialty, in table order.
    pub fn by_specialty(&self, specialty: Specialty) -> Vec<Provider> {
        let matches: Vec<Provider> = self
            .providers
            .iter()
            .filter(|p| p.specialty == specialty)
            .cloned()
            .collect();
        debug!(specialty = %specialty, count = matches.len(), "Specialty lookup");
        matches
    }

    /// Best-rated provider for a specialty.
    ///
    /// Ordered by (rating, experience_years); the first encountered wins
    /// ties. Returns `None` when no provider carries the specialty.
    pub fn best_for_specialty(&self, specialty: Specialty) -> Option<Provider> {
        let mut best: Option<&Provider> = None;
        for p in self.providers.iter().filter(|p| p.specialty == specialty) {
            match best {
                None => best = Some(p),
                Some(b) => {
                    if (p.rating, p.experience_years) > (b.rating, b.experience_years) {
                        best = Some(p);
                    }
                }
            }
        }
        best.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures;

    fn load_fixture() -> (tempfile::TempDir, ProviderStore) {
        let (dir, providers_path, _) = test_fixtures::write_tables();
        let store = ProviderStore::load(&providers_path).unwrap();
        (dir, store)
    }

    #[test]
    fn test_load_all_rows() {
        let (_dir, store) = load_fixture();
        assert_eq!(store.all().len(), 4);
    }

    #[test]
    fn test_get_by_id() {
        let (_dir, store) = load_fixture();
        let p = store.get("p003").unwrap();
        assert_eq!(p.name, "Dr. Priya Nair");
        assert_eq!(p.specialty, Specialty::Cardiologist);
        assert_eq!(p.experience_years, 15);
    }

    #[test]
    fn test_get_unknown_id() {
        let (_dir, store) = load_fixture();
        assert!(store.get("p999").is_none());
    }

    #[test]
    fn test_by_specialty() {
        let (_dir, store) = load_fixture();
        let derms = store.by_specialty(Specialty::Dermatologist);
        assert_eq!(derms.len(), 2);
        assert!(derms.iter().all(|p| p.specialty == Specialty::Dermatologist));
    }

    #[test]
    fn test_best_for_specialty_picks_highest_rating() {
        let (_dir, store) = load_fixture();
        let best = store.best_for_specialty(Specialty::Dermatologist).unwrap();
        assert_eq!(best.id, "p001");
        assert_eq!(best.rating, 4.8);
    }

    #[test]
    fn test_best_for_specialty_none_when_absent() {
        let (_dir, store) = load_fixture();
        assert!(store.best_for_specialty(Specialty::Pediatrician).is_none());
    }

    #[test]
    fn test_rating_tie_breaks_on_experience_then_first() {
        let mk = |id: &str, rating: f32, years: u32| Provider {
            id: id.to_string(),
            name: format!("Dr. {}", id),
            specialty: Specialty::Neurologist,
            experience_years: years,
            rating,
            location: "Clinic".to_string(),
        };
        let store = ProviderStore::from_providers(vec![
            mk("a", 4.5, 5),
            mk("b", 4.5, 9),
            mk("c", 4.5, 9),
        ]);
        // b beats a on experience; c ties b exactly, so b (first encountered) wins.
        assert_eq!(store.best_for_specialty(Specialty::Neurologist).unwrap().id, "b");
    }

    #[test]
    fn test_unknown_specialty_rejects_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("providers.csv");
        std::fs::write(
            &path,
            "id,name,specialty,experience_years,rating,location\n\
             p001,Dr. X,Podiatrist,5,4.0,Clinic\n",
        )
        .unwrap();
        assert!(matches!(
            ProviderStore::load(&path),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn test_out_of_range_rating_rejects_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("providers.csv");
        std::fs::write(
            &path,
            "id,name,specialty,experience_years,rating,location\n\
             p001,Dr. X,Cardiologist,5,5.5,Clinic\n",
        )
        .unwrap();
        assert!(matches!(
            ProviderStore::load(&path),
            Err(StoreError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(ProviderStore::load(Path::new("/nonexistent/providers.csv")).is_err());
    }
}
