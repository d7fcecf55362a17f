use std::collections::HashSet;

use crate::{
    models::MovieId,
    services::strategies::{CandidateLists, ScoredCandidate},
};

/// Size of a personalized recommendation list
pub const TOTAL_RECOMMENDATIONS: usize = 20;
pub const QUOTA_DIRECTOR: usize = 5;
pub const QUOTA_GENRE: usize = 10;
pub const QUOTA_TEMPORAL: usize = 5;
pub const QUOTA_SERENDIPITY: usize = 5;

/// How many picks each pass contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionReport {
    pub from_director: usize,
    pub from_temporal: usize,
    pub from_serendipity: usize,
    /// Genre quota after absorbing the other strategies' deficit
    pub genre_cap: usize,
    pub from_genre: usize,
    pub from_top_up: usize,
}

impl SelectionReport {
    /// Unmet quota of the director, temporal and serendipity passes
    pub fn deficit(&self) -> usize {
        (QUOTA_DIRECTOR - self.from_director)
            + (QUOTA_TEMPORAL - self.from_temporal)
            + (QUOTA_SERENDIPITY - self.from_serendipity)
    }

    pub fn total(&self) -> usize {
        self.from_director
            + self.from_temporal
            + self.from_serendipity
            + self.from_genre
            + self.from_top_up
    }
}

/// Final picks in fill order, before shuffling
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub picks: Vec<ScoredCandidate>,
    pub report: SelectionReport,
}

/// Blends the strategy lists under per-strategy quotas
///
/// Passes run director, temporal, serendipity, then genre with the leftover
/// quota of the first three. A movie already picked is skipped without counting
/// against any quota. If the list is still short, it is topped up from every
/// list in director, genre, temporal, serendipity order. The list never grows
/// past `TOTAL_RECOMMENDATIONS`.
pub fn select_with_quotas(lists: &CandidateLists) -> Selection {
    let mut picks: Vec<ScoredCandidate> = Vec::with_capacity(TOTAL_RECOMMENDATIONS);
    let mut selected: HashSet<MovieId> = HashSet::new();
    let mut report = SelectionReport::default();

    report.from_director = take_from(
        lists.director.iter(),
        QUOTA_DIRECTOR,
        &mut picks,
        &mut selected,
    );
    report.from_temporal = take_from(
        lists.temporal.iter(),
        QUOTA_TEMPORAL,
        &mut picks,
        &mut selected,
    );
    report.from_serendipity = take_from(
        lists.serendipity.iter(),
        QUOTA_SERENDIPITY,
        &mut picks,
        &mut selected,
    );

    report.genre_cap = QUOTA_GENRE + report.deficit();
    let room = TOTAL_RECOMMENDATIONS - picks.len();
    report.from_genre = take_from(
        lists.genre.iter(),
        report.genre_cap.min(room),
        &mut picks,
        &mut selected,
    );

    if picks.len() < TOTAL_RECOMMENDATIONS {
        let remaining = TOTAL_RECOMMENDATIONS - picks.len();
        report.from_top_up = take_from(lists.iter_all(), remaining, &mut picks, &mut selected);
    }

    Selection { picks, report }
}

fn take_from<'a>(
    candidates: impl Iterator<Item = &'a ScoredCandidate>,
    quota: usize,
    picks: &mut Vec<ScoredCandidate>,
    selected: &mut HashSet<MovieId>,
) -> usize {
    let mut added = 0;
    for candidate in candidates {
        if added >= quota {
            break;
        }
        if selected.insert(candidate.id()) {
            picks.push(candidate.clone());
            added += 1;
        }
    }
    added
}
