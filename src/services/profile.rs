use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::instrument;

use crate::{
    error::AppResult,
    models::{DirectorLink, MovieId, MovieRecord},
    services::{
        parsing::{decade_of, extract_year, parse_genres},
        store::MovieStore,
    },
};

const TOP_GENRES: usize = 5;
const TOP_DIRECTORS: usize = 10;
const FAVORITE_YEARS: usize = 10;
const FAVORITE_DECADES: usize = 3;

/// Taste profile derived from a user's up-votes
///
/// Built per request and dropped once the recommendations are returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    /// Every up-voted movie; never recommended back
    pub voted_movie_ids: HashSet<MovieId>,
    pub top_genres: Vec<String>,
    pub top_directors: Vec<String>,
    pub favorite_years: Vec<i32>,
    pub favorite_decades: Vec<i32>,
    pub genre_counts: HashMap<String, u32>,
    pub director_counts: HashMap<String, u32>,
}

impl UserProfile {
    /// A user without up-votes gets unpersonalized recommendations
    pub fn is_empty(&self) -> bool {
        self.voted_movie_ids.is_empty()
    }

    pub fn genre_count(&self, genre: &str) -> u32 {
        self.genre_counts.get(genre).copied().unwrap_or(0)
    }

    pub fn director_count(&self, director: &str) -> u32 {
        self.director_counts.get(director).copied().unwrap_or(0)
    }

    pub fn is_top_genre(&self, genre: &str) -> bool {
        self.top_genres.iter().any(|g| g == genre)
    }

    pub fn is_top_director(&self, director: Option<&str>) -> bool {
        director.is_some_and(|d| self.top_directors.iter().any(|known| known == d))
    }

    pub fn is_favorite_decade(&self, decade: i32) -> bool {
        self.favorite_decades.contains(&decade)
    }

    /// Assembles a profile from the user's voted movies and their director links
    pub fn from_history(
        voted_movie_ids: HashSet<MovieId>,
        voted_movies: &[MovieRecord],
        director_links: &[DirectorLink],
    ) -> Self {
        let mut genre_counts: HashMap<String, u32> = HashMap::new();
        let mut year_counts: HashMap<i32, u32> = HashMap::new();
        let mut decade_counts: HashMap<i32, u32> = HashMap::new();

        for movie in voted_movies {
            for genre in parse_genres(movie.genres.as_ref()) {
                *genre_counts.entry(genre).or_insert(0) += 1;
            }

            if let Some(year) = extract_year(movie.release_date.as_ref()) {
                *year_counts.entry(year).or_insert(0) += 1;
                *decade_counts.entry(decade_of(year)).or_insert(0) += 1;
            }
        }

        let mut director_counts: HashMap<String, u32> = HashMap::new();
        for link in director_links {
            if let Some(director) = link.director_name() {
                *director_counts.entry(director.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            voted_movie_ids,
            top_genres: top_keys(&genre_counts, TOP_GENRES),
            top_directors: top_keys(&director_counts, TOP_DIRECTORS),
            favorite_years: top_keys(&year_counts, FAVORITE_YEARS),
            favorite_decades: top_keys(&decade_counts, FAVORITE_DECADES),
            genre_counts,
            director_counts,
        }
    }
}

/// Most frequent keys first; equal counts fall back to ascending key order
pub fn top_keys<K>(counts: &HashMap<K, u32>, limit: usize) -> Vec<K>
where
    K: Clone + Ord + Eq + Hash,
{
    let mut entries: Vec<(&K, &u32)> = counts.iter().collect();
    entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    entries
        .into_iter()
        .take(limit)
        .map(|(key, _)| key.clone())
        .collect()
}

/// Builds the taste profile of a user from their up-votes
#[instrument(skip(store), fields(store = store.name()))]
pub async fn build_profile(store: &dyn MovieStore, user_id: &str) -> AppResult<UserProfile> {
    let voted_movie_ids = store.find_upvoted_movie_ids(user_id).await?;

    if voted_movie_ids.is_empty() {
        tracing::debug!("User has no up-votes");
        return Ok(UserProfile::default());
    }

    let mut ids: Vec<MovieId> = voted_movie_ids.iter().copied().collect();
    ids.sort();

    let voted_movies = store.find_movies_by_ids(&ids).await?;
    let director_links = store.find_directors_by_movie_ids(&ids).await?;

    let profile = UserProfile::from_history(voted_movie_ids, &voted_movies, &director_links);

    tracing::debug!(
        voted = profile.voted_movie_ids.len(),
        top_genres = ?profile.top_genres,
        top_directors = ?profile.top_directors,
        favorite_decades = ?profile.favorite_decades,
        "Built user profile"
    );

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GenreField, ReleaseDate};
    use crate::services::store::MockMovieStore;

    fn movie(n: u128, genres: &str, date: Option<&str>) -> MovieRecord {
        MovieRecord {
            id: MovieId::from_u128(n),
            title: format!("Movie {}", n),
            overview: None,
            genres: Some(GenreField::Text(genres.to_string())),
            release_date: date.map(|d| ReleaseDate::Text(d.to_string())),
            poster_path: None,
            runtime: None,
            original_language: None,
            up_votes: 0,
            down_votes: 0,
        }
    }

    #[test]
    fn test_top_keys_orders_by_frequency() {
        let counts = HashMap::from([
            ("Drama".to_string(), 5),
            ("Action".to_string(), 1),
            ("Comedy".to_string(), 3),
        ]);
        assert_eq!(top_keys(&counts, 2), vec!["Drama", "Comedy"]);
    }

    #[test]
    fn test_top_keys_breaks_ties_by_key() {
        let counts = HashMap::from([(1990, 2), (1970, 2), (2000, 2), (1980, 1)]);
        assert_eq!(top_keys(&counts, 3), vec![1970, 1990, 2000]);
    }

    #[test]
    fn test_profile_counts_genres_years_and_directors() {
        let voted = HashSet::from([MovieId::from_u128(1), MovieId::from_u128(2)]);
        let movies = vec![
            movie(1, "[{'name': 'Drama'}, {'name': 'War'}]", Some("1979-08-15")),
            movie(2, "[{'name': 'Drama'}]", Some("not a date")),
        ];
        let links = vec![
            DirectorLink::new(MovieId::from_u128(1).to_string(), "Francis Ford Coppola"),
            DirectorLink::new(MovieId::from_u128(2).to_string(), ""),
        ];

        let profile = UserProfile::from_history(voted, &movies, &links);

        assert_eq!(profile.genre_count("Drama"), 2);
        assert_eq!(profile.genre_count("War"), 1);
        assert_eq!(profile.top_genres, vec!["Drama", "War"]);
        assert_eq!(profile.favorite_years, vec![1979]);
        assert_eq!(profile.favorite_decades, vec![1970]);
        assert_eq!(profile.top_directors, vec!["Francis Ford Coppola"]);
        assert_eq!(profile.director_count("Francis Ford Coppola"), 1);
        assert!(profile.is_top_director(Some("Francis Ford Coppola")));
        assert!(!profile.is_top_director(None));
    }

    #[test]
    fn test_profile_limits_top_lists() {
        let genres: Vec<String> = (0..8).map(|i| format!("{{'name': 'G{}'}}", i)).collect();
        let raw = format!("[{}]", genres.join(", "));
        let voted = HashSet::from([MovieId::from_u128(1)]);
        let profile = UserProfile::from_history(voted, &[movie(1, &raw, None)], &[]);

        assert_eq!(profile.top_genres.len(), TOP_GENRES);
        assert_eq!(profile.genre_counts.len(), 8);
        assert!(profile.favorite_decades.is_empty());
    }

    #[tokio::test]
    async fn test_build_profile_without_votes_skips_catalog_queries() {
        let mut store = MockMovieStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_find_upvoted_movie_ids()
            .times(1)
            .returning(|_| Ok(HashSet::new()));
        store.expect_find_movies_by_ids().never();
        store.expect_find_directors_by_movie_ids().never();

        let profile = build_profile(&store, "user-1").await.unwrap();
        assert!(profile.is_empty());
    }

    #[tokio::test]
    async fn test_build_profile_queries_voted_movies() {
        let mut store = MockMovieStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_find_upvoted_movie_ids()
            .withf(|user_id| user_id.to_string() == "user-1")
            .returning(|_| Ok(HashSet::from([MovieId::from_u128(7)])));
        store
            .expect_find_movies_by_ids()
            .withf(|ids| ids.to_vec() == vec![MovieId::from_u128(7)])
            .returning(|_| Ok(vec![movie(7, "[{'name': 'Western'}]", Some("1966-12-23"))]));
        store
            .expect_find_directors_by_movie_ids()
            .returning(|_| {
                Ok(vec![DirectorLink::new(
                    MovieId::from_u128(7).to_string(),
                    "Sergio Leone",
                )])
            });

        let profile = build_profile(&store, "user-1").await.unwrap();
        assert_eq!(profile.top_genres, vec!["Western"]);
        assert_eq!(profile.top_directors, vec!["Sergio Leone"]);
        assert_eq!(profile.favorite_decades, vec![1960]);
    }

    #[tokio::test]
    async fn test_build_profile_propagates_store_failures() {
        let mut store = MockMovieStore::new();
        store.expect_name().return_const("mock");
        store
            .expect_find_upvoted_movie_ids()
            .returning(|_| Err(crate::error::AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = build_profile(&store, "user-1").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
