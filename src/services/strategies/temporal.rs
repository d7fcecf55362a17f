use std::collections::HashMap;

use crate::{
    error::AppResult,
    services::{profile::UserProfile, store::MovieStore},
};

use super::{annotate_with_directors, popularity, rank, MovieCandidate, ScoredCandidate, Strategy};

pub const REQUESTED: usize = 50;
const SAMPLE_SIZE: usize = 300;

/// Temporal-discovery score for one candidate
///
/// `seen_in_decade` is the number of candidates of the same decade scored
/// before this one in the batch. Decades the user already favors are
/// penalized and unexplored ones rewarded.
pub fn score(candidate: &MovieCandidate, profile: &UserProfile, seen_in_decade: u32) -> f64 {
    let mut score = 0.0;

    if let Some(decade) = candidate.decade() {
        score += if profile.is_favorite_decade(decade) {
            -10.0
        } else {
            15.0
        };
        score -= f64::from(seen_in_decade) * 2.0;
    }

    score += popularity(candidate, 2.0) * 3.0;
    score += candidate.shared_top_genres(profile) as f64;
    score
}

/// Scores a batch in order, applying the decade clustering penalty
pub fn score_batch(candidates: Vec<MovieCandidate>, profile: &UserProfile) -> Vec<ScoredCandidate> {
    let mut decade_seen: HashMap<i32, u32> = HashMap::new();

    candidates
        .into_iter()
        .map(|candidate| {
            let seen = match candidate.decade() {
                Some(decade) => {
                    let count = decade_seen.entry(decade).or_insert(0);
                    let seen = *count;
                    *count += 1;
                    seen
                }
                None => 0,
            };
            let score = score(&candidate, profile, seen);
            ScoredCandidate::new(candidate, score, Strategy::Temporal)
        })
        .collect()
}

/// Unseen movies from decades the user has not explored
pub async fn generate(
    store: &dyn MovieStore,
    profile: &UserProfile,
) -> AppResult<Vec<ScoredCandidate>> {
    let records = store
        .random_sample_movies(&profile.voted_movie_ids, SAMPLE_SIZE)
        .await?;
    let candidates = annotate_with_directors(store, records, profile).await?;
    let scored = score_batch(candidates, profile);

    tracing::debug!(
        strategy = %Strategy::Temporal,
        scored = scored.len(),
        "Scored temporal candidates"
    );

    Ok(rank(scored, REQUESTED))
}
