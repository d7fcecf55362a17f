use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::collections::HashSet;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{DirectorLink, GenreField, MovieId, MovieRecord, ReleaseDate},
    services::store::MovieStore,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const MOVIE_COLUMNS: &str = "id, title, overview, genres, release_date, poster_path, runtime, \
     original_language, up_votes, down_votes";

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    overview: Option<String>,
    genres: Option<Json<GenreField>>,
    release_date: Option<NaiveDate>,
    poster_path: Option<String>,
    runtime: Option<i32>,
    original_language: Option<String>,
    up_votes: Option<i32>,
    down_votes: Option<i32>,
}

impl From<MovieRow> for MovieRecord {
    fn from(row: MovieRow) -> Self {
        MovieRecord {
            id: MovieId(row.id),
            title: row.title,
            overview: row.overview,
            genres: row.genres.map(|Json(field)| field),
            release_date: row.release_date.map(ReleaseDate::Date),
            poster_path: row.poster_path,
            runtime: row.runtime,
            original_language: row.original_language,
            up_votes: row.up_votes.unwrap_or(0),
            down_votes: row.down_votes.unwrap_or(0),
        }
    }
}

fn uuids(ids: &[MovieId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.0).collect()
}

fn excluded(ids: &HashSet<MovieId>) -> Vec<Uuid> {
    ids.iter().map(|id| id.0).collect()
}

fn sample_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Movie catalog backed by PostgreSQL
///
/// Reads the `movies`, `movie_votes` and `directors` tables. Random samples use
/// `ORDER BY random()`, so every call returns a fresh sample.
#[derive(Clone)]
pub struct PgMovieStore {
    pool: PgPool,
}

impl PgMovieStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MovieStore for PgMovieStore {
    #[instrument(skip(self))]
    async fn find_upvoted_movie_ids(&self, user_id: &str) -> AppResult<HashSet<MovieId>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT movie_id FROM movie_votes WHERE user_id = $1 AND vote_type = 'UP'",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(MovieId).collect())
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    async fn find_movies_by_ids(&self, ids: &[MovieId]) -> AppResult<Vec<MovieRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies WHERE id = ANY($1)",
            MOVIE_COLUMNS
        ))
        .bind(uuids(ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MovieRecord::from).collect())
    }

    #[instrument(skip(self, exclude_ids))]
    async fn find_movies_by_genre_regex(
        &self,
        pattern: &str,
        exclude_ids: &HashSet<MovieId>,
        sample_size: usize,
    ) -> AppResult<Vec<MovieRecord>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies \
             WHERE genres::text ~* $1 AND NOT (id = ANY($2)) \
             ORDER BY random() LIMIT $3",
            MOVIE_COLUMNS
        ))
        .bind(pattern)
        .bind(excluded(exclude_ids))
        .bind(sample_limit(sample_size))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MovieRecord::from).collect())
    }

    #[instrument(skip(self, exclude_ids))]
    async fn random_sample_movies(
        &self,
        exclude_ids: &HashSet<MovieId>,
        sample_size: usize,
    ) -> AppResult<Vec<MovieRecord>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies WHERE NOT (id = ANY($1)) ORDER BY random() LIMIT $2",
            MOVIE_COLUMNS
        ))
        .bind(excluded(exclude_ids))
        .bind(sample_limit(sample_size))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MovieRecord::from).collect())
    }

    #[instrument(skip_all, fields(count = ids.len()))]
    async fn find_directors_by_movie_ids(&self, ids: &[MovieId]) -> AppResult<Vec<DirectorLink>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let movie_ids: Vec<String> = ids.iter().map(MovieId::to_string).collect();
        let links: Vec<DirectorLink> =
            sqlx::query_as("SELECT movie_id, director FROM directors WHERE movie_id = ANY($1)")
                .bind(movie_ids)
                .fetch_all(&self.pool)
                .await?;

        Ok(links)
    }

    #[instrument(skip(self, exclude_ids))]
    async fn find_movies_by_directors(
        &self,
        directors: &[String],
        exclude_ids: &HashSet<MovieId>,
        limit: usize,
    ) -> AppResult<Vec<DirectorLink>> {
        if directors.is_empty() {
            return Ok(Vec::new());
        }

        let excluded_ids: Vec<String> = exclude_ids.iter().map(MovieId::to_string).collect();
        let links: Vec<DirectorLink> = sqlx::query_as(
            "SELECT movie_id, director FROM directors \
             WHERE btrim(director) = ANY($1) AND NOT (movie_id = ANY($2)) \
             LIMIT $3",
        )
        .bind(directors.to_vec())
        .bind(excluded_ids)
        .bind(sample_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
