use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::UserId;
use crate::matching::scoring::{score_bios_with, CompatibilityScore, ScoringConfig};
use crate::matching::taxonomy::KeywordTaxonomy;

/// Default number of suggestions returned to a requester
pub const DEFAULT_TOP_N: usize = 3;

/// A potential partner drawn from the candidate pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: UserId,
    pub name: String,
    pub bio: Option<String>,
    /// Set when the candidate is already in a partnership; such candidates
    /// are never suggested
    pub has_partner: bool,
    pub member_since: chrono::DateTime<chrono::Utc>,
}

/// A candidate together with its computed compatibility score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub candidate: Candidate,
    pub score: CompatibilityScore,
}

/// Ranks candidates against a requester's biography.
pub struct MatchFinder<'a> {
    taxonomy: &'a KeywordTaxonomy,
    config: ScoringConfig,
}

impl<'a> MatchFinder<'a> {
    /// Create a finder with the default scoring configuration
    pub fn new(taxonomy: &'a KeywordTaxonomy) -> Self {
        Self {
            taxonomy,
            config: ScoringConfig::default(),
        }
    }

    /// Create a finder with a custom scoring configuration
    pub fn with_config(taxonomy: &'a KeywordTaxonomy, config: ScoringConfig) -> Self {
        Self { taxonomy, config }
    }

    /// Find the best partner suggestions for a requester.
    ///
    /// Filters out the requester and anyone who already has a partner,
    /// scores the rest, and returns up to `top_n` entries sorted by score
    /// descending. An empty eligible pool yields an empty vec, not an
    /// error; the API boundary decides how to present that.
    pub fn find_top_matches(
        &self,
        requester_id: &UserId,
        requester_bio: Option<&str>,
        candidates: &[Candidate],
        top_n: usize,
    ) -> Vec<ScoredMatch> {
        self.find_top_matches_with(
            &mut rand::thread_rng(),
            requester_id,
            requester_bio,
            candidates,
            top_n,
        )
    }

    /// Same as [`find_top_matches`](Self::find_top_matches) but with an
    /// explicit RNG for reproducible tests.
    pub fn find_top_matches_with(
        &self,
        rng: &mut impl Rng,
        requester_id: &UserId,
        requester_bio: Option<&str>,
        candidates: &[Candidate],
        top_n: usize,
    ) -> Vec<ScoredMatch> {
        let requester_bio = requester_bio.unwrap_or_default();

        let mut results: Vec<ScoredMatch> = candidates
            .iter()
            .filter(|candidate| &candidate.id != requester_id && !candidate.has_partner)
            .map(|candidate| {
                let candidate_bio = candidate.bio.as_deref().unwrap_or_default();
                let score = score_bios_with(
                    rng,
                    self.taxonomy,
                    &self.config,
                    requester_bio,
                    candidate_bio,
                );
                ScoredMatch {
                    candidate: candidate.clone(),
                    score,
                }
            })
            .collect();

        // Stable sort: exact ties keep their input order, so a fixed input
        // always produces the same ranking
        results.sort_by(|a, b| b.score.value.cmp(&a.score.value));

        results.truncate(top_n);
        results
    }
}
