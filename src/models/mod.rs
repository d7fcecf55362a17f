use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

pub mod vote;

pub use vote::{MovieVote, VoteType};

/// Identifier of a movie in the catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MovieId(pub Uuid);

impl MovieId {
    pub fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MovieId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(MovieId)
    }
}

/// Release date as stored in the catalog
///
/// Older imports carry the date as free text, newer ones as a native date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseDate {
    Date(NaiveDate),
    Text(String),
}

/// Raw genre field of a catalog entry
///
/// Either a list (of names or `{"name": ..}` objects) or a semi-structured
/// string such as `[{'id': 18, 'name': 'Drama'}]`. Any other shape is kept
/// as-is and carries no genres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenreField {
    List(Vec<GenreEntry>),
    Text(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenreEntry {
    Name(String),
    Object {
        #[serde(default)]
        name: Option<String>,
    },
    Other(serde_json::Value),
}

impl GenreField {
    /// Human readable form returned to clients
    pub fn display(&self) -> String {
        match self {
            GenreField::Text(raw) => raw.clone(),
            GenreField::Other(_) => String::new(),
            GenreField::List(entries) => entries
                .iter()
                .filter_map(|entry| match entry {
                    GenreEntry::Name(name) => Some(name.as_str()),
                    GenreEntry::Object { name } => name.as_deref(),
                    GenreEntry::Other(_) => None,
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// A catalog entry as returned by the movie store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Option<GenreField>,
    #[serde(default)]
    pub release_date: Option<ReleaseDate>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub up_votes: i32,
    #[serde(default)]
    pub down_votes: i32,
}

/// Link between a movie and its director
///
/// The movie id is kept raw: the directors collection was imported separately
/// and not every entry holds a valid catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DirectorLink {
    pub movie_id: String,
    #[serde(default)]
    pub director: Option<String>,
}

impl DirectorLink {
    pub fn new(movie_id: impl Into<String>, director: impl Into<String>) -> Self {
        Self {
            movie_id: movie_id.into(),
            director: Some(director.into()),
        }
    }

    /// Director name, if present and not blank
    pub fn director_name(&self) -> Option<&str> {
        self.director
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Recommended movie returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    pub overview: Option<String>,
    pub genres: Option<String>,
    pub release_date: Option<ReleaseDate>,
    pub poster_path: Option<String>,
    pub runtime: Option<i32>,
    pub original_language: Option<String>,
    pub director: Option<String>,
    pub up_votes: i32,
    pub down_votes: i32,
}

impl MovieSummary {
    pub fn from_record(record: MovieRecord, director: Option<String>) -> Self {
        Self {
            id: record.id,
            title: record.title,
            overview: record.overview,
            genres: record.genres.as_ref().map(GenreField::display),
            release_date: record.release_date,
            poster_path: record.poster_path,
            runtime: record.runtime,
            original_language: record.original_language,
            director,
            up_votes: record.up_votes,
            down_votes: record.down_votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_parse_and_display() {
        let id: MovieId = "6f1c2d1e-0b9a-4a39-8c6e-2f0b7d3a9e11".parse().unwrap();
        assert_eq!(format!("{}", id), "6f1c2d1e-0b9a-4a39-8c6e-2f0b7d3a9e11");
    }

    #[test]
    fn test_movie_id_rejects_object_id() {
        let result = "64b7f0c2a1e4d3b2c1a09f8e".parse::<MovieId>();
        assert!(result.is_err());
    }

    #[test]
    fn test_genre_field_deserializes_plain_list() {
        let field: GenreField = serde_json::from_str(r#"["Drama", "Comedy"]"#).unwrap();
        assert_eq!(field.display(), "Drama, Comedy");
    }

    #[test]
    fn test_genre_field_deserializes_object_list() {
        let field: GenreField =
            serde_json::from_str(r#"[{"id": 18, "name": "Drama"}, {"id": 99}, 7]"#).unwrap();
        assert_eq!(field.display(), "Drama");
    }

    #[test]
    fn test_genre_field_keeps_raw_text() {
        let raw = "[{'id': 18, 'name': 'Drama'}]";
        let field: GenreField = serde_json::from_value(serde_json::json!(raw)).unwrap();
        assert_eq!(field, GenreField::Text(raw.to_string()));
        assert_eq!(field.display(), raw);
    }

    #[test]
    fn test_genre_field_accepts_unexpected_shapes() {
        for raw in [r#"{"id": 18, "name": "Drama"}"#, "42", "true"] {
            let field: GenreField = serde_json::from_str(raw).unwrap();
            assert!(matches!(field, GenreField::Other(_)), "{}", raw);
            assert_eq!(field.display(), "");
        }
    }

    #[test]
    fn test_release_date_prefers_native_date() {
        let date: ReleaseDate = serde_json::from_str(r#""2010-07-16""#).unwrap();
        assert_eq!(
            date,
            ReleaseDate::Date(NaiveDate::from_ymd_opt(2010, 7, 16).unwrap())
        );

        let text: ReleaseDate = serde_json::from_str(r#""summer 1999""#).unwrap();
        assert_eq!(text, ReleaseDate::Text("summer 1999".to_string()));
    }

    #[test]
    fn test_director_link_ignores_blank_names() {
        let blank = DirectorLink::new("a", "   ");
        assert_eq!(blank.director_name(), None);

        let named = DirectorLink::new("a", " Agnès Varda ");
        assert_eq!(named.director_name(), Some("Agnès Varda"));
    }

    #[test]
    fn test_summary_from_record_renders_genres() {
        let record = MovieRecord {
            id: MovieId::from_u128(1),
            title: "Cléo from 5 to 7".to_string(),
            overview: None,
            genres: Some(GenreField::List(vec![GenreEntry::Name("Drama".to_string())])),
            release_date: None,
            poster_path: None,
            runtime: Some(90),
            original_language: Some("fr".to_string()),
            up_votes: 3,
            down_votes: 1,
        };

        let summary = MovieSummary::from_record(record, Some("Agnès Varda".to_string()));
        assert_eq!(summary.genres.as_deref(), Some("Drama"));
        assert_eq!(summary.director.as_deref(), Some("Agnès Varda"));
        assert_eq!(summary.up_votes, 3);
    }
}
