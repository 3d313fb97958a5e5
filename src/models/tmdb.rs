//! TMDB v3 wire types and their translation into catalog records.

use serde::Deserialize;

use super::MovieRecord;
use crate::error::{AppError, AppResult};

pub const GENRE_HORROR: u32 = 27;
pub const GENRE_THRILLER: u32 = 53;
pub const GENRE_MYSTERY: u32 = 9648;
pub const GENRE_SCIENCE_FICTION: u32 = 878;

/// TMDB movie genre ids and their display names
const GENRES: [(u32, &str); 19] = [
    (27, "Horror"),
    (53, "Thriller"),
    (9648, "Mystery"),
    (18, "Drama"),
    (35, "Comedy"),
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (80, "Crime"),
    (99, "Documentary"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (10402, "Music"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (10752, "War"),
    (37, "Western"),
];

pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
}

/// Paged list envelope used by search, discover, recommendations and similar
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage<T> {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Movie summary as returned in TMDB result lists
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbMovie {
    /// Four-digit release year, if the release date carries one
    pub fn release_year(&self) -> Option<String> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.bytes().all(|b| b.is_ascii_digit()))
            .map(str::to_string)
    }

    pub fn genre_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.genre_ids.len());
        for name in self.genre_ids.iter().filter_map(|id| genre_name(*id)) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

impl TryFrom<TmdbMovie> for MovieRecord {
    type Error = AppError;

    fn try_from(movie: TmdbMovie) -> AppResult<Self> {
        let genres = movie.genre_names();
        let year = movie.release_year();
        let record = MovieRecord {
            title: movie.title,
            year,
            user_rating: None,
            genres,
            horror_category: None,
            intensity_level: None,
            overview: movie.overview.filter(|o| !o.trim().is_empty()),
            vote_average: movie.vote_average.max(0.0),
            poster_path: movie.poster_path,
            external_id: Some(movie.id),
            updated_at: None,
        };
        record.validate()?;
        Ok(record)
    }
}
