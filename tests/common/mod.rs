#![allow(dead_code)]

use cineclub_recs::{
    db::{CatalogSnapshot, InMemoryMovieStore},
    models::{GenreField, MovieId, MovieRecord, MovieVote, ReleaseDate},
};

pub const GENRES: [&str; 6] = ["Drama", "Comedy", "Action", "Horror", "Romance", "Documentary"];

pub fn movie(n: u128, genres: &[&str], year: i32, up_votes: i32) -> MovieRecord {
    let listed: Vec<String> = genres
        .iter()
        .map(|g| format!("{{'id': 1, 'name': '{}'}}", g))
        .collect();
    MovieRecord {
        id: MovieId::from_u128(n),
        title: format!("Movie {}", n),
        overview: Some(format!("Overview of movie {}", n)),
        genres: Some(GenreField::Text(format!("[{}]", listed.join(", ")))),
        release_date: Some(ReleaseDate::Text(format!("{}-03-15", year))),
        poster_path: None,
        runtime: Some(100),
        original_language: Some("en".to_string()),
        up_votes,
        down_votes: 0,
    }
}

/// Catalog of `count` movies with ids starting at `first`, spread over genres,
/// decades and directors
pub fn filler(catalog: CatalogSnapshot, first: u128, count: u128) -> CatalogSnapshot {
    (first..first + count).fold(catalog, |catalog, n| {
        let genre = GENRES[(n % GENRES.len() as u128) as usize];
        let year = 1950 + (n % 70) as i32;
        catalog
            .with_movie(movie(n, &[genre], year, (n % 17) as i32))
            .with_director(MovieId::from_u128(n).to_string(), format!("Director {}", n % 9))
    })
}

/// Five up-voted "Director X" dramas, five more unseen ones and 60 other movies
pub fn director_x_catalog() -> CatalogSnapshot {
    let mut catalog = CatalogSnapshot::default();
    for n in 1..=5 {
        catalog = catalog
            .with_movie(movie(n, &["Drama"], 1994, 3))
            .with_director(MovieId::from_u128(n).to_string(), "Director X")
            .with_vote(MovieVote::up("cinephile", MovieId::from_u128(n)));
    }
    for (n, up_votes) in (11..=15).zip([10, 8, 6, 4, 2]) {
        catalog = catalog
            .with_movie(movie(n, &["Drama"], 2003, up_votes))
            .with_director(MovieId::from_u128(n).to_string(), "Director X");
    }
    filler(catalog, 100, 60)
}

pub fn voted_ids() -> Vec<MovieId> {
    (1..=5).map(MovieId::from_u128).collect()
}

pub fn store(catalog: CatalogSnapshot, seed: u64) -> InMemoryMovieStore {
    InMemoryMovieStore::seeded(catalog, seed)
}
