use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::matching::taxonomy::KeywordTaxonomy;

/// Safely convert usize to f64 for percentage calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Tokens with fewer characters than this carry little signal ("the",
/// "and", "for", ...) and are dropped before word-overlap scoring.
pub const MIN_TOKEN_LENGTH: usize = 4;

/// Tuning constants for compatibility scoring.
///
/// The neutral band and jitter magnitude are inherited tuning values with no
/// documented rationale behind the exact numbers, so they are configuration
/// rather than hard-coded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight for the category (topical) score
    pub category_weight: f64,
    /// Weight for the word-overlap (lexical) score
    pub overlap_weight: f64,
    /// Inclusive bounds of the score band returned when either bio is empty
    pub neutral_band: (u8, u8),
    /// Half-width of the uniform jitter applied to the combined score
    pub jitter: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            category_weight: 0.6, // topical alignment dominates
            overlap_weight: 0.4,  // coincidental word reuse matters less
            neutral_band: (35, 65),
            jitter: 2.5,
        }
    }
}

/// Compatibility between two biographies.
///
/// `value` is the final jittered, clamped, rounded score in [0,100];
/// the component scores are the pre-jitter sub-scores in [0,100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityScore {
    /// Jaccard similarity of triggered category sets, scaled to [0,100]
    pub category_score: f64,

    /// Jaccard similarity of word sets, scaled to [0,100]
    pub word_overlap_score: f64,

    /// True when either bio was empty and the value was drawn from the
    /// neutral band instead of computed
    pub neutral: bool,

    /// Final integer score in [0,100]
    pub value: u8,
}

/// Score two biographies with the default config and thread-local RNG.
#[must_use]
pub fn score_bios(taxonomy: &KeywordTaxonomy, bio_a: &str, bio_b: &str) -> CompatibilityScore {
    score_bios_with(
        &mut rand::thread_rng(),
        taxonomy,
        &ScoringConfig::default(),
        bio_a,
        bio_b,
    )
}

/// Score two biographies with an explicit RNG and config.
///
/// The RNG only supplies the neutral-band draw and the tie-breaking jitter;
/// pass a seeded generator for reproducible results in tests. This must be
/// an ordinary pseudo-random source, not the crate's invitation-token
/// generator.
pub fn score_bios_with(
    rng: &mut impl Rng,
    taxonomy: &KeywordTaxonomy,
    config: &ScoringConfig,
    bio_a: &str,
    bio_b: &str,
) -> CompatibilityScore {
    // An empty bio gives us nothing to compare: return a moderate random
    // score that signals "insufficient data" without pinning every such
    // candidate to the same value.
    if bio_a.trim().is_empty() || bio_b.trim().is_empty() {
        let (low, high) = config.neutral_band;
        return CompatibilityScore {
            category_score: 0.0,
            word_overlap_score: 0.0,
            neutral: true,
            value: rng.gen_range(low..=high),
        };
    }

    let category_score = category_score(taxonomy, bio_a, bio_b);
    let word_overlap_score = word_overlap_score(bio_a, bio_b);

    let combined =
        config.category_weight * category_score + config.overlap_weight * word_overlap_score;

    // Small symmetric jitter so near-identical candidates still sort into a
    // strict order
    let jitter = (rng.gen::<f64>() - 0.5) * (2.0 * config.jitter);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let value = (combined + jitter).clamp(0.0, 100.0).round() as u8;

    CompatibilityScore {
        category_score,
        word_overlap_score,
        neutral: false,
        value,
    }
}

/// Jaccard similarity of the category sets triggered by each bio, in [0,100].
/// 0 when neither bio triggers any category.
fn category_score(taxonomy: &KeywordTaxonomy, bio_a: &str, bio_b: &str) -> f64 {
    let categories_a = taxonomy.categories_in(bio_a);
    let categories_b = taxonomy.categories_in(bio_b);
    jaccard_scaled(&categories_a, &categories_b)
}

/// Jaccard similarity of the deduplicated word sets, in [0,100].
///
/// Bios are lowercased and whitespace-tokenized; tokens shorter than
/// [`MIN_TOKEN_LENGTH`] are discarded.
fn word_overlap_score(bio_a: &str, bio_b: &str) -> f64 {
    let words_a = significant_words(bio_a);
    let words_b = significant_words(bio_b);
    jaccard_scaled(&words_a, &words_b)
}

fn significant_words(bio: &str) -> HashSet<String> {
    bio.to_lowercase()
        .split_whitespace()
        // Length in characters, so multibyte tokens are measured the same
        // as ASCII ones
        .filter(|word| word.chars().count() >= MIN_TOKEN_LENGTH)
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity |A ∩ B| / |A ∪ B| scaled to [0,100]; 0 when the union
/// is empty.
fn jaccard_scaled<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        count_to_f64(intersection) / count_to_f64(union) * 100.0
    }
}
