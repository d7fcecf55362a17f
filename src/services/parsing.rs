//! Extraction of genres and release years from loosely-typed catalog fields.
//!
//! Neither function fails: data that cannot be read yields an empty genre set
//! or no year, and the movie simply contributes nothing to the related signals.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::models::{GenreEntry, GenreField, ReleaseDate};

fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid regex literal {pattern}: {err}"))
}

static SINGLE_QUOTED_NAME: Lazy<Regex> = Lazy::new(|| compile_regex(r"'name':\s*'([^']+)'"));
static DOUBLE_QUOTED_NAME: Lazy<Regex> = Lazy::new(|| compile_regex(r#""name":\s*"([^"]+)""#));

/// Returns the set of genre names held by a raw genre field
pub fn parse_genres(field: Option<&GenreField>) -> BTreeSet<String> {
    match field {
        None | Some(GenreField::Other(_)) => BTreeSet::new(),
        Some(GenreField::List(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                GenreEntry::Name(name) => Some(name.as_str()),
                GenreEntry::Object { name } => name.as_deref(),
                GenreEntry::Other(_) => None,
            })
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .collect(),
        Some(GenreField::Text(raw)) => {
            let found = capture_names(&SINGLE_QUOTED_NAME, raw);
            if found.is_empty() {
                capture_names(&DOUBLE_QUOTED_NAME, raw)
            } else {
                found
            }
        }
    }
}

fn capture_names(pattern: &Regex, raw: &str) -> BTreeSet<String> {
    pattern
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Returns the release year, or `None` when the date cannot be read
pub fn extract_year(date: Option<&ReleaseDate>) -> Option<i32> {
    match date? {
        ReleaseDate::Date(date) => Some(date.year()),
        ReleaseDate::Text(raw) => NaiveDate::parse_and_remainder(raw.trim(), "%Y-%m-%d")
            .ok()
            .map(|(date, _)| date.year()),
    }
}

/// Decade a year belongs to, e.g. 1994 -> 1990
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}
