use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse taxonomy: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Taxonomy version for compatibility checking
pub const TAXONOMY_VERSION: &str = "1.0.0";

/// A semantic goal category with its lowercase trigger phrases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub triggers: Vec<String>,
}

/// Serializable taxonomy format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyData {
    pub version: String,
    pub categories: Vec<KeywordCategory>,
}

/// The fixed taxonomy of goal categories used for category scoring.
///
/// Each category maps to a set of lowercase trigger phrases. A biography
/// "hits" a category when any trigger appears in it as a substring after
/// lowercasing, so multi-word triggers like "mental health" work too.
#[derive(Debug, Clone)]
pub struct KeywordTaxonomy {
    categories: Vec<KeywordCategory>,
}

impl KeywordTaxonomy {
    /// Load the embedded default taxonomy
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded JSON fails to parse.
    pub fn load_embedded() -> Result<Self, TaxonomyError> {
        // Embedded at compile time; validated by build.rs
        const EMBEDDED_TAXONOMY: &str = include_str!("../../taxonomies/goal_keywords.json");
        Self::from_json(EMBEDDED_TAXONOMY)
    }

    /// Parse a taxonomy from JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let data: TaxonomyData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != TAXONOMY_VERSION {
            tracing::warn!(
                "Taxonomy version mismatch (expected {}, found {})",
                TAXONOMY_VERSION,
                data.version
            );
        }

        Ok(Self {
            categories: data.categories,
        })
    }

    /// All category definitions
    #[must_use]
    pub fn categories(&self) -> &[KeywordCategory] {
        &self.categories
    }

    /// Names of categories triggered by the given biography.
    ///
    /// The bio is lowercased once; a category counts when at least one of
    /// its triggers is present as a substring.
    #[must_use]
    pub fn categories_in(&self, bio: &str) -> HashSet<&str> {
        let bio_lower = bio.to_lowercase();
        self.categories
            .iter()
            .filter(|category| {
                category
                    .triggers
                    .iter()
                    .any(|trigger| bio_lower.contains(trigger.as_str()))
            })
            .map(|category| category.name.as_str())
            .collect()
    }

    /// Number of categories in the taxonomy
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Check if the taxonomy is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
