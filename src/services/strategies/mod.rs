/// Candidate generation strategies
///
/// Each strategy reads the catalog independently, scores what it finds against
/// the user's profile and returns its own ranked list. Scores only order a
/// strategy's own list; they are not comparable across strategies.
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use tracing::instrument;

use crate::{
    error::AppResult,
    models::{DirectorLink, MovieId, MovieRecord, MovieSummary},
    services::{
        parsing::{decade_of, extract_year, parse_genres},
        profile::UserProfile,
        store::MovieStore,
    },
};

pub mod director;
pub mod genre;
pub mod serendipity;
pub mod temporal;

/// Strategy that produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Director,
    Genre,
    Temporal,
    Serendipity,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Director => write!(f, "director"),
            Strategy::Genre => write!(f, "genre"),
            Strategy::Temporal => write!(f, "temporal"),
            Strategy::Serendipity => write!(f, "serendipity"),
        }
    }
}

/// A catalog entry with its parsed genres, year and director
#[derive(Debug, Clone, PartialEq)]
pub struct MovieCandidate {
    pub record: MovieRecord,
    pub genres: BTreeSet<String>,
    pub year: Option<i32>,
    pub director: Option<String>,
}

impl MovieCandidate {
    pub fn new(record: MovieRecord, director: Option<String>) -> Self {
        let genres = parse_genres(record.genres.as_ref());
        let year = extract_year(record.release_date.as_ref());
        Self {
            record,
            genres,
            year,
            director,
        }
    }

    pub fn id(&self) -> MovieId {
        self.record.id
    }

    pub fn decade(&self) -> Option<i32> {
        self.year.map(decade_of)
    }

    pub fn up_votes(&self) -> f64 {
        f64::from(self.record.up_votes.max(0))
    }

    /// Number of this movie's genres among the user's top genres
    pub fn shared_top_genres(&self, profile: &UserProfile) -> usize {
        self.genres
            .iter()
            .filter(|genre| profile.is_top_genre(genre))
            .count()
    }

    pub fn into_summary(self) -> MovieSummary {
        MovieSummary::from_record(self.record, self.director)
    }
}

/// A candidate with its strategy-local score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: MovieCandidate,
    pub score: f64,
    pub strategy: Strategy,
}

impl ScoredCandidate {
    pub fn new(candidate: MovieCandidate, score: f64, strategy: Strategy) -> Self {
        Self {
            candidate,
            score,
            strategy,
        }
    }

    pub fn id(&self) -> MovieId {
        self.candidate.id()
    }
}

/// Ranked output of every strategy for one request
#[derive(Debug, Clone, Default)]
pub struct CandidateLists {
    pub director: Vec<ScoredCandidate>,
    pub genre: Vec<ScoredCandidate>,
    pub temporal: Vec<ScoredCandidate>,
    pub serendipity: Vec<ScoredCandidate>,
}

impl CandidateLists {
    pub fn total(&self) -> usize {
        self.director.len() + self.genre.len() + self.temporal.len() + self.serendipity.len()
    }

    /// All lists in top-up order: director, genre, temporal, serendipity
    pub fn iter_all(&self) -> impl Iterator<Item = &ScoredCandidate> {
        self.director
            .iter()
            .chain(self.genre.iter())
            .chain(self.temporal.iter())
            .chain(self.serendipity.iter())
    }
}

/// Runs the four strategies concurrently against the same catalog
#[instrument(skip_all, fields(voted = profile.voted_movie_ids.len()))]
pub async fn generate_candidates(
    store: &dyn MovieStore,
    profile: &UserProfile,
) -> AppResult<CandidateLists> {
    let (director, genre, temporal, serendipity) = tokio::try_join!(
        director::generate(store, profile),
        genre::generate(store, profile),
        temporal::generate(store, profile),
        serendipity::generate(store, profile),
    )?;

    tracing::debug!(
        director = director.len(),
        genre = genre.len(),
        temporal = temporal.len(),
        serendipity = serendipity.len(),
        "Generated candidates"
    );

    Ok(CandidateLists {
        director,
        genre,
        temporal,
        serendipity,
    })
}

/// Sorts by descending score, keeping catalog order among equal scores, and
/// keeps the best `limit`
pub(crate) fn rank(mut scored: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Parses the movie id of a director link, logging ids that are not catalog ids
pub(crate) fn parse_link_id(link: &DirectorLink) -> Option<MovieId> {
    match link.movie_id.parse::<MovieId>() {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!(movie_id = %link.movie_id, error = %e, "Skipping director link with invalid movie id");
            None
        }
    }
}

/// Maps movie ids to director names from a set of links; a later link wins
pub(crate) fn director_map(links: &[DirectorLink]) -> HashMap<MovieId, String> {
    let mut directors = HashMap::new();
    for link in links {
        let (Some(id), Some(name)) = (parse_link_id(link), link.director_name()) else {
            continue;
        };
        directors.insert(id, name.to_string());
    }
    directors
}

/// Pairs sampled records with their directors, dropping anything the user voted for
pub(crate) async fn annotate_with_directors(
    store: &dyn MovieStore,
    records: Vec<MovieRecord>,
    profile: &UserProfile,
) -> AppResult<Vec<MovieCandidate>> {
    let records: Vec<MovieRecord> = records
        .into_iter()
        .filter(|record| !profile.voted_movie_ids.contains(&record.id))
        .collect();

    if records.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<MovieId> = records.iter().map(|record| record.id).collect();
    let directors = director_map(&store.find_directors_by_movie_ids(&ids).await?);

    Ok(records
        .into_iter()
        .map(|record| {
            let director = directors.get(&record.id).cloned();
            MovieCandidate::new(record, director)
        })
        .collect())
}

/// `ln(base + up_votes)`, the popularity term shared by the scorers
pub(crate) fn popularity(candidate: &MovieCandidate, base: f64) -> f64 {
    (base + candidate.up_votes()).ln()
}
