use crate::{
    error::AppResult,
    services::{profile::UserProfile, store::MovieStore},
};

use super::{annotate_with_directors, popularity, rank, MovieCandidate, ScoredCandidate, Strategy};

pub const REQUESTED: usize = 100;
const SAMPLE_SIZE: usize = 300;
/// Number of top genres the catalog query matches on
const MATCHED_GENRES: usize = 3;

/// Any-of pattern over the user's leading genres, or `None` without genre data
pub fn genre_pattern(profile: &UserProfile) -> Option<String> {
    if profile.top_genres.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = profile
        .top_genres
        .iter()
        .take(MATCHED_GENRES)
        .map(|genre| regex::escape(genre))
        .collect();
    Some(alternatives.join("|"))
}

/// Genre-affinity score
///
/// Each of the movie's genres adds three times the number of up-voted movies
/// sharing it; a known director adds 5 and a favorite decade adds 3.
pub fn score(candidate: &MovieCandidate, profile: &UserProfile) -> f64 {
    let genre_affinity: f64 = candidate
        .genres
        .iter()
        .map(|genre| f64::from(profile.genre_count(genre)) * 3.0)
        .sum();

    let mut score = genre_affinity + popularity(candidate, 2.0) * 2.0;

    if profile.is_top_director(candidate.director.as_deref()) {
        score += 5.0;
    }

    if candidate
        .decade()
        .is_some_and(|decade| profile.is_favorite_decade(decade))
    {
        score += 3.0;
    }

    score
}

/// Unseen movies in the user's favorite genres
pub async fn generate(
    store: &dyn MovieStore,
    profile: &UserProfile,
) -> AppResult<Vec<ScoredCandidate>> {
    let Some(pattern) = genre_pattern(profile) else {
        return Ok(Vec::new());
    };

    let records = store
        .find_movies_by_genre_regex(&pattern, &profile.voted_movie_ids, SAMPLE_SIZE)
        .await?;
    let candidates = annotate_with_directors(store, records, profile).await?;

    let scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let score = score(&candidate, profile);
            ScoredCandidate::new(candidate, score, Strategy::Genre)
        })
        .collect();

    tracing::debug!(
        strategy = %Strategy::Genre,
        pattern = %pattern,
        scored = scored.len(),
        "Scored genre candidates"
    );

    Ok(rank(scored, REQUESTED))
}
