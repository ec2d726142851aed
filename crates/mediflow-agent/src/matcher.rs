//! Keyword-based provider matcher.
//!
//! Resolves free-text health issues to a specialty via a fixed keyword
//! table, then picks the best-rated provider for that specialty. A default
//! specialty always applies, so unmatched text is never an error.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use mediflow_core::types::Specialty;
use mediflow_store::ProviderStore;

/// Keyword to specialty table, scanned in order; first hit wins.
const ISSUE_TO_SPECIALTY: &[(&str, Specialty)] = &[
    // Skin issues
    ("rash", Specialty::Dermatologist),
    ("acne", Specialty::Dermatologist),
    ("eczema", Specialty::Dermatologist),
    ("psoriasis", Specialty::Dermatologist),
    ("skin", Specialty::Dermatologist),
    ("mole", Specialty::Dermatologist),
    // Heart issues
    ("chest pain", Specialty::Cardiologist),
    ("heart", Specialty::Cardiologist),
    ("palpitations", Specialty::Cardiologist),
    ("blood pressure", Specialty::Cardiologist),
    // Neurological issues
    ("headache", Specialty::Neurologist),
    ("migraine", Specialty::Neurologist),
    ("seizure", Specialty::Neurologist),
    ("dizziness", Specialty::Neurologist),
    ("numbness", Specialty::Neurologist),
    // Bone/joint issues
    ("back pain", Specialty::Orthopedist),
    ("back", Specialty::Orthopedist),
    ("joint pain", Specialty::Orthopedist),
    ("joint", Specialty::Orthopedist),
    ("fracture", Specialty::Orthopedist),
    ("arthritis", Specialty::Orthopedist),
    ("sprain", Specialty::Orthopedist),
    ("knee", Specialty::Orthopedist),
    ("shoulder", Specialty::Orthopedist),
    // Children's issues
    ("child", Specialty::Pediatrician),
    ("baby", Specialty::Pediatrician),
    ("infant", Specialty::Pediatrician),
    // Mental health
    ("depression", Specialty::Psychiatrist),
    ("anxiety", Specialty::Psychiatrist),
    ("panic", Specialty::Psychiatrist),
    ("stress", Specialty::Psychiatrist),
    // Eye issues
    ("vision", Specialty::Ophthalmologist),
    ("eye", Specialty::Ophthalmologist),
    ("blurry", Specialty::Ophthalmologist),
    // ENT issues
    ("ear", Specialty::EntSpecialist),
    ("throat", Specialty::EntSpecialist),
    ("nose", Specialty::EntSpecialist),
    ("sinus", Specialty::EntSpecialist),
    ("hearing", Specialty::EntSpecialist),
];

/// Result of matching a health issue to a provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderMatch {
    pub provider_id: String,
    pub provider_name: String,
    pub specialty: Specialty,
    pub match_reason: String,
    /// 0.0 to 1.0; keyword hits score higher than the default fallback.
    pub confidence: f32,
}

/// Matches health issues to providers over a provider store.
pub struct ProviderMatcher {
    providers: Arc<ProviderStore>,
}

impl ProviderMatcher {
    pub fn new(providers: Arc<ProviderStore>) -> Self {
        Self { providers }
    }

    /// Resolve a health issue to a specialty.
    ///
    /// Returns the specialty and the keyword that matched, or the default
    /// specialty and `None` when nothing in the table applies.
    pub fn resolve_specialty(health_issue: &str) -> (Specialty, Option<&'static str>) {
        let lowered = health_issue.to_lowercase();
        for (keyword, specialty) in ISSUE_TO_SPECIALTY {
            if lowered.contains(keyword) {
                return (*specialty, Some(keyword));
            }
        }
        (Specialty::GeneralPractitioner, None)
    }

    /// Match the best provider for a health issue.
    ///
    /// Pure lookup with no side effects. Returns `None` only when the
    /// resolved specialty has no providers in the table.
    pub fn match_for_issue(&self, health_issue: &str) -> Option<ProviderMatch> {
        let (specialty, keyword) = Self::resolve_specialty(health_issue);

        let (match_reason, confidence) = match keyword {
            Some(kw) => (
                format!("Identified '{}' in health issue, recommending {}", kw, specialty),
                0.9,
            ),
            None => (
                "No specific specialty identified, recommending general practitioner for initial evaluation"
                    .to_string(),
                0.6,
            ),
        };

        let provider = self.providers.best_for_specialty(specialty)?;
        debug!(
            specialty = %specialty,
            provider = %provider.name,
            confidence,
            "Provider matched"
        );

        Some(ProviderMatch {
            provider_id: provider.id,
            provider_name: provider.name,
            specialty: provider.specialty,
            match_reason,
            confidence,
        })
    }
}
