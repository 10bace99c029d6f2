use serde::{Deserialize, Serialize};

use crate::error::{AdvisoryError, Result};

const SEED_JSON: &str = include_str!("../data/providers.json");

/// A curated AR/MR solution provider. Seed data, read-only at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub specialties: Vec<String>,
    pub technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

/// Filter criteria for the provider directory.
///
/// Empty facet selections match everything; selected facets use any-of
/// semantics against the record's tag set.
#[derive(Debug, Clone, Default)]
pub struct ProviderFilter {
    pub search_term: String,
    pub specialties: Vec<String>,
    pub technologies: Vec<String>,
}

/// The static provider directory, loaded once from embedded seed data.
#[derive(Debug, Clone)]
pub struct ProviderDirectory {
    providers: Vec<ProviderRecord>,
}

impl ProviderDirectory {
    /// Load the embedded seed data.
    pub fn load() -> Result<Self> {
        let providers: Vec<ProviderRecord> = serde_json::from_str(SEED_JSON)
            .map_err(|e| AdvisoryError::DirectorySeed(e.to_string()))?;
        Ok(Self { providers })
    }

    pub fn from_records(providers: Vec<ProviderRecord>) -> Self {
        Self { providers }
    }

    pub fn all(&self) -> &[ProviderRecord] {
        &self.providers
    }

    /// Apply the filter: case-insensitive contains on name or description,
    /// combined with any-of facet matches. Deterministic and pure.
    pub fn filter(&self, filter: &ProviderFilter) -> Vec<&ProviderRecord> {
        let needle = filter.search_term.trim().to_lowercase();

        self.providers
            .iter()
            .filter(|provider| {
                let matches_search = needle.is_empty()
                    || provider.name.to_lowercase().contains(&needle)
                    || provider.description.to_lowercase().contains(&needle);

                let matches_specialty = filter.specialties.is_empty()
                    || provider
                        .specialties
                        .iter()
                        .any(|s| filter.specialties.iter().any(|sel| sel == s));

                let matches_technology = filter.technologies.is_empty()
                    || provider
                        .technologies
                        .iter()
                        .any(|t| filter.technologies.iter().any(|sel| sel == t));

                matches_search && matches_specialty && matches_technology
            })
            .collect()
    }

    /// All distinct specialties across the directory, sorted.
    pub fn all_specialties(&self) -> Vec<String> {
        let mut values: Vec<String> = self
            .providers
            .iter()
            .flat_map(|p| p.specialties.iter().cloned())
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// All distinct technologies across the directory, sorted.
    pub fn all_technologies(&self) -> Vec<String> {
        let mut values: Vec<String> = self
            .providers
            .iter()
            .flat_map(|p| p.technologies.iter().cloned())
            .collect();
        values.sort();
        values.dedup();
        values
    }
}
