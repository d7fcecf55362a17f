/// Movie catalog abstraction
///
/// The recommendation engine only reads from the catalog, through the queries
/// below. The PostgreSQL store backs production; the in-memory store backs tests
/// and database-less runs.
use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{DirectorLink, MovieId, MovieRecord},
};

/// Read-side queries the recommendation engine needs from the catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    /// Ids of every movie the user has up-voted
    async fn find_upvoted_movie_ids(&self, user_id: &str) -> AppResult<HashSet<MovieId>>;

    /// Catalog entries for the given ids; unknown ids are ignored
    async fn find_movies_by_ids(&self, ids: &[MovieId]) -> AppResult<Vec<MovieRecord>>;

    /// Random sample of movies whose genre field matches `pattern` case-insensitively
    async fn find_movies_by_genre_regex(
        &self,
        pattern: &str,
        exclude_ids: &HashSet<MovieId>,
        sample_size: usize,
    ) -> AppResult<Vec<MovieRecord>>;

    /// Random sample of movies not in `exclude_ids`
    async fn random_sample_movies(
        &self,
        exclude_ids: &HashSet<MovieId>,
        sample_size: usize,
    ) -> AppResult<Vec<MovieRecord>>;

    /// Director links for the given movies
    async fn find_directors_by_movie_ids(&self, ids: &[MovieId]) -> AppResult<Vec<DirectorLink>>;

    /// Up to `limit` director links for movies by any of `directors`
    async fn find_movies_by_directors(
        &self,
        directors: &[String],
        exclude_ids: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<DirectorLink>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
