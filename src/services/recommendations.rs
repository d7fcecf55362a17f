use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, MovieSummary},
    services::{
        parsing::{decade_of, extract_year},
        profile::build_profile,
        quota::select_with_quotas,
        store::MovieStore,
        strategies::{director_map, generate_candidates},
    },
};

/// Size of the unpersonalized batch served to users without up-votes
pub const FALLBACK_BATCH: usize = 25;

/// Generates personalized movie recommendations
///
/// Builds the user's taste profile from their up-votes, runs the four candidate
/// strategies against the catalog, blends them under fixed quotas and returns
/// the picks in random order. Users without up-votes get a random sample of the
/// catalog instead.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn MovieStore>,
    shuffle_seed: Option<u64>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self {
            store,
            shuffle_seed: None,
        }
    }

    /// Seeds the result shuffle so that repeated runs return the same order
    pub fn with_shuffle_seed(mut self, seed: Option<u64>) -> Self {
        self.shuffle_seed = seed;
        self
    }

    #[instrument(skip(self), fields(store = self.store.name()))]
    pub async fn recommend(&self, user_id: &str) -> AppResult<Vec<MovieSummary>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::InvalidInput(
                "User id cannot be empty".to_string(),
            ));
        }

        let store = self.store.as_ref();
        let profile = build_profile(store, user_id).await?;

        if profile.is_empty() {
            return self.unpersonalized().await;
        }

        let lists = generate_candidates(store, &profile).await?;
        let selection = select_with_quotas(&lists);
        let report = selection.report;

        tracing::info!(
            candidates = lists.total(),
            director = report.from_director,
            temporal = report.from_temporal,
            serendipity = report.from_serendipity,
            genre = report.from_genre,
            genre_cap = report.genre_cap,
            top_up = report.from_top_up,
            "Selected recommendations"
        );

        let mut picks: Vec<MovieSummary> = selection
            .picks
            .into_iter()
            .map(|pick| pick.candidate.into_summary())
            .collect();

        log_summary(&picks);
        picks.shuffle(&mut self.rng());

        Ok(picks)
    }

    /// Random catalog sample annotated with directors
    async fn unpersonalized(&self) -> AppResult<Vec<MovieSummary>> {
        let store = self.store.as_ref();
        let records = store
            .random_sample_movies(&HashSet::new(), FALLBACK_BATCH)
            .await?;

        let mut seen: HashSet<MovieId> = HashSet::new();
        let records: Vec<_> = records
            .into_iter()
            .filter(|record| seen.insert(record.id))
            .take(FALLBACK_BATCH)
            .collect();

        let ids: Vec<MovieId> = records.iter().map(|record| record.id).collect();
        let directors = if ids.is_empty() {
            Default::default()
        } else {
            director_map(&store.find_directors_by_movie_ids(&ids).await?)
        };

        let mut picks: Vec<MovieSummary> = records
            .into_iter()
            .map(|record| {
                let director = directors.get(&record.id).cloned();
                MovieSummary::from_record(record, director)
            })
            .collect();

        tracing::info!(count = picks.len(), "Serving unpersonalized recommendations");

        picks.shuffle(&mut self.rng());
        Ok(picks)
    }

    /// Request-local generator for the final shuffle
    fn rng(&self) -> StdRng {
        match self.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Logs the decade spread of the picks and how many have a known director
fn log_summary(picks: &[MovieSummary]) {
    if picks.is_empty() {
        return;
    }

    let mut by_decade: BTreeMap<i32, usize> = BTreeMap::new();
    for pick in picks {
        if let Some(year) = extract_year(pick.release_date.as_ref()) {
            *by_decade.entry(decade_of(year)).or_insert(0) += 1;
        }
    }

    let with_known_director = picks
        .iter()
        .filter(|pick| pick.director.as_deref().is_some_and(|d| !d.is_empty()))
        .count();

    tracing::debug!(
        by_decade = ?by_decade,
        with_known_director,
        total = picks.len(),
        "Recommendation summary"
    );
}
