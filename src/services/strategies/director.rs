use std::collections::{HashMap, HashSet};

use crate::{
    error::AppResult,
    models::MovieId,
    services::{profile::UserProfile, store::MovieStore},
};

use super::{parse_link_id, popularity, rank, MovieCandidate, ScoredCandidate, Strategy};

/// Candidates kept after ranking
pub const REQUESTED: usize = 50;
/// Director links fetched from the catalog
const LINK_LIMIT: usize = 100;

/// Director-affinity score: how often the user liked this director, plus popularity
pub fn score(candidate: &MovieCandidate, profile: &UserProfile) -> f64 {
    let affinity = candidate
        .director
        .as_deref()
        .map(|director| f64::from(profile.director_count(director)))
        .unwrap_or(0.0);
    affinity * 10.0 + popularity(candidate, 1.0) * 2.0
}

/// Unseen movies by the user's favorite directors
pub async fn generate(
    store: &dyn MovieStore,
    profile: &UserProfile,
) -> AppResult<Vec<ScoredCandidate>> {
    if profile.top_directors.is_empty() {
        return Ok(Vec::new());
    }

    let links = store
        .find_movies_by_directors(&profile.top_directors, &profile.voted_movie_ids, LINK_LIMIT)
        .await?;

    if links.is_empty() {
        return Ok(Vec::new());
    }

    let mut directors: HashMap<MovieId, String> = HashMap::new();
    let mut seen: HashSet<MovieId> = HashSet::new();
    let mut ids: Vec<MovieId> = Vec::new();
    for link in &links {
        let Some(id) = parse_link_id(link) else {
            continue;
        };
        if profile.voted_movie_ids.contains(&id) {
            continue;
        }
        if seen.insert(id) {
            ids.push(id);
        }
        if let Some(name) = link.director_name() {
            directors.insert(id, name.to_string());
        }
    }

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let records = store.find_movies_by_ids(&ids).await?;

    let mut without_director = 0usize;
    let scored: Vec<ScoredCandidate> = records
        .into_iter()
        .filter_map(|record| {
            let Some(director) = directors.get(&record.id).cloned() else {
                without_director += 1;
                return None;
            };
            let candidate = MovieCandidate::new(record, Some(director));
            let score = score(&candidate, profile);
            Some(ScoredCandidate::new(candidate, score, Strategy::Director))
        })
        .collect();

    tracing::debug!(
        strategy = %Strategy::Director,
        links = links.len(),
        scored = scored.len(),
        without_director,
        "Scored director candidates"
    );

    Ok(rank(scored, REQUESTED))
}
