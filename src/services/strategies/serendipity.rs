use crate::{
    error::AppResult,
    services::{profile::UserProfile, store::MovieStore},
};

use super::{annotate_with_directors, popularity, rank, MovieCandidate, ScoredCandidate, Strategy};

pub const REQUESTED: usize = 50;
const SAMPLE_SIZE: usize = 200;
const MAX_SHARED_GENRES: usize = 1;

/// A movie is serendipitous when it barely overlaps the user's known taste
pub fn is_serendipitous(candidate: &MovieCandidate, profile: &UserProfile) -> bool {
    candidate.shared_top_genres(profile) <= MAX_SHARED_GENRES
        && !profile.is_top_director(candidate.director.as_deref())
}

pub fn score(candidate: &MovieCandidate) -> f64 {
    popularity(candidate, 2.0) * 10.0
}

/// Popular movies outside the user's usual genres and directors
pub async fn generate(
    store: &dyn MovieStore,
    profile: &UserProfile,
) -> AppResult<Vec<ScoredCandidate>> {
    let records = store
        .random_sample_movies(&profile.voted_movie_ids, SAMPLE_SIZE)
        .await?;
    let candidates = annotate_with_directors(store, records, profile).await?;
    let sampled = candidates.len();

    let scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .filter(|candidate| is_serendipitous(candidate, profile))
        .map(|candidate| {
            let score = score(&candidate);
            ScoredCandidate::new(candidate, score, Strategy::Serendipity)
        })
        .collect();

    tracing::debug!(
        strategy = %Strategy::Serendipity,
        sampled,
        scored = scored.len(),
        "Scored serendipity candidates"
    );

    Ok(rank(scored, REQUESTED))
}
