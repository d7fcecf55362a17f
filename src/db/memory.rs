use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{DirectorLink, GenreField, MovieId, MovieRecord, MovieVote, VoteType},
    services::store::MovieStore,
};

/// Catalog contents as stored in a JSON snapshot file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub movies: Vec<MovieRecord>,
    #[serde(default)]
    pub votes: Vec<MovieVote>,
    #[serde(default)]
    pub directors: Vec<DirectorLink>,
}

impl CatalogSnapshot {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!("Invalid catalog snapshot: {}", e))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read catalog {}: {}", path.display(), e))?;
        Self::from_json(&json)
    }

    pub fn with_movie(mut self, movie: MovieRecord) -> Self {
        self.movies.push(movie);
        self
    }

    pub fn with_vote(mut self, vote: MovieVote) -> Self {
        self.votes.push(vote);
        self
    }

    pub fn with_director(mut self, movie_id: impl Into<String>, director: impl Into<String>) -> Self {
        self.directors.push(DirectorLink::new(movie_id, director));
        self
    }
}

/// Movie catalog held in memory
///
/// Sampling draws from its own generator, so a seeded store samples the same
/// way on every run.
pub struct InMemoryMovieStore {
    catalog: CatalogSnapshot,
    rng: Mutex<StdRng>,
}

impl InMemoryMovieStore {
    pub fn new(catalog: CatalogSnapshot) -> Self {
        Self {
            catalog,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(catalog: CatalogSnapshot, seed: u64) -> Self {
        Self {
            catalog,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Loads a catalog snapshot from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let catalog = CatalogSnapshot::load(path)?;
        tracing::info!(
            movies = catalog.movies.len(),
            votes = catalog.votes.len(),
            directors = catalog.directors.len(),
            "Loaded in-memory catalog"
        );
        Ok(Self::new(catalog))
    }

    fn sample<'a>(
        &self,
        pool: impl Iterator<Item = &'a MovieRecord>,
        sample_size: usize,
    ) -> AppResult<Vec<MovieRecord>> {
        let pool: Vec<&MovieRecord> = pool.collect();
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("Catalog sampler lock poisoned".to_string()))?;

        Ok(pool
            .choose_multiple(&mut *rng, sample_size)
            .map(|movie| (*movie).clone())
            .collect())
    }
}

fn genre_text(field: Option<&GenreField>) -> String {
    field.map(GenreField::display).unwrap_or_default()
}

#[async_trait::async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn find_upvoted_movie_ids(&self, user_id: &str) -> AppResult<HashSet<MovieId>> {
        Ok(self
            .catalog
            .votes
            .iter()
            .filter(|vote| vote.user_id == user_id && vote.vote_type == VoteType::Up)
            .map(|vote| vote.movie_id)
            .collect())
    }

    async fn find_movies_by_ids(&self, ids: &[MovieId]) -> AppResult<Vec<MovieRecord>> {
        let wanted: HashSet<&MovieId> = ids.iter().collect();
        Ok(self
            .catalog
            .movies
            .iter()
            .filter(|movie| wanted.contains(&movie.id))
            .cloned()
            .collect())
    }

    async fn find_movies_by_genre_regex(
        &self,
        pattern: &str,
        exclude_ids: &HashSet<MovieId>,
        sample_size: usize,
    ) -> AppResult<Vec<MovieRecord>> {
        let matcher = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::Catalog(format!("Invalid genre pattern {}: {}", pattern, e)))?;

        let pool = self.catalog.movies.iter().filter(|movie| {
            !exclude_ids.contains(&movie.id) && matcher.is_match(&genre_text(movie.genres.as_ref()))
        });
        self.sample(pool, sample_size)
    }

    async fn random_sample_movies(
        &self,
        exclude_ids: &HashSet<MovieId>,
        sample_size: usize,
    ) -> AppResult<Vec<MovieRecord>> {
        let pool = self
            .catalog
            .movies
            .iter()
            .filter(|movie| !exclude_ids.contains(&movie.id));
        self.sample(pool, sample_size)
    }

    async fn find_directors_by_movie_ids(&self, ids: &[MovieId]) -> AppResult<Vec<DirectorLink>> {
        let wanted: HashSet<String> = ids.iter().map(MovieId::to_string).collect();
        Ok(self
            .catalog
            .directors
            .iter()
            .filter(|link| wanted.contains(&link.movie_id))
            .cloned()
            .collect())
    }

    async fn find_movies_by_directors(
        &self,
        directors: &[String],
        exclude_ids: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<DirectorLink>> {
        let excluded: HashSet<String> = exclude_ids.iter().map(MovieId::to_string).collect();
        Ok(self
            .catalog
            .directors
            .iter()
            .filter(|link| {
                link.director
                    .as_deref()
                    .map(str::trim)
                    .is_some_and(|name| directors.iter().any(|wanted| wanted == name))
                    && !excluded.contains(&link.movie_id)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
