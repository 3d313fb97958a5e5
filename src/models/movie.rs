use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 10.0;

/// Horror sub-genre a movie is filed under; doubles as the roulette mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorrorCategory {
    Gory,
    Creepy,
    Mysterious,
    Jumpscare,
    BodyHorror,
    Paranoid,
}

impl HorrorCategory {
    pub const ALL: [HorrorCategory; 6] = [
        HorrorCategory::Gory,
        HorrorCategory::Creepy,
        HorrorCategory::Mysterious,
        HorrorCategory::Jumpscare,
        HorrorCategory::BodyHorror,
        HorrorCategory::Paranoid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HorrorCategory::Gory => "gory",
            HorrorCategory::Creepy => "creepy",
            HorrorCategory::Mysterious => "mysterious",
            HorrorCategory::Jumpscare => "jumpscare",
            HorrorCategory::BodyHorror => "body-horror",
            HorrorCategory::Paranoid => "paranoid",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HorrorCategory::Gory => "Blood, violence, and brutal visuals",
            HorrorCategory::Creepy => "Psychologically unsettling and disturbing",
            HorrorCategory::Mysterious => "Puzzles, investigations, and hidden secrets",
            HorrorCategory::Jumpscare => "Sudden scares and paranormal frights",
            HorrorCategory::BodyHorror => "Transformation, mutation, and the grotesque",
            HorrorCategory::Paranoid => "Conspiracy, surveillance, and creeping madness",
        }
    }
}

impl Display for HorrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HorrorCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        HorrorCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| {
                let valid: Vec<&str> = HorrorCategory::ALL.iter().map(|c| c.as_str()).collect();
                AppError::InvalidArgument(format!(
                    "Invalid category '{}'. Must be one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// One catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    /// `None` means the user has not rated the movie yet
    #[serde(default)]
    pub user_rating: Option<f64>,
    pub genres: Vec<String>,
    #[serde(default)]
    pub horror_category: Option<HorrorCategory>,
    #[serde(default)]
    pub intensity_level: Option<u8>,
    #[serde(default)]
    pub overview: Option<String>,
    /// Aggregate rating reported by the metadata provider
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Provider-specific id (TMDB movie id)
    #[serde(default)]
    pub external_id: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MovieRecord {
    /// Creates an unrated record with only the required fields set
    pub fn new(title: impl Into<String>, genres: Vec<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            user_rating: None,
            genres,
            horror_category: None,
            intensity_level: None,
            overview: None,
            vote_average: 0.0,
            poster_path: None,
            external_id: None,
            updated_at: None,
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.user_rating = Some(rating);
        self
    }

    pub fn with_vote_average(mut self, vote_average: f64) -> Self {
        self.vote_average = vote_average;
        self
    }

    pub fn with_category(mut self, category: HorrorCategory) -> Self {
        self.horror_category = Some(category);
        self
    }

    pub fn is_rated(&self) -> bool {
        self.user_rating.is_some()
    }

    /// True when both records name the same catalog entry
    pub fn same_entry(&self, other: &MovieRecord) -> bool {
        self.has_title(&other.title) && self.year == other.year
    }

    /// Case-insensitive title comparison using Unicode lowercase, the same
    /// folding the `user_movies.title_key` column applies
    pub fn has_title(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.trim().to_lowercase()
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Checks the record-level invariants
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Movie title cannot be empty".to_string(),
            ));
        }

        if let Some(year) = &self.year {
            if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AppError::InvalidArgument(format!(
                    "Year of '{}' must be 4 digits, got '{}'",
                    self.title, year
                )));
            }
        }

        if self.genres.is_empty() {
            return Err(AppError::InvalidArgument(format!(
                "'{}' has no genres",
                self.title
            )));
        }

        let mut seen = HashSet::with_capacity(self.genres.len());
        for genre in &self.genres {
            if genre.trim().is_empty() {
                return Err(AppError::InvalidArgument(format!(
                    "'{}' has a blank genre label",
                    self.title
                )));
            }
            if !seen.insert(genre.as_str()) {
                return Err(AppError::InvalidArgument(format!(
                    "'{}' lists genre '{}' twice",
                    self.title, genre
                )));
            }
        }

        if let Some(rating) = self.user_rating {
            validate_rating(rating)?;
        }

        if let Some(level) = self.intensity_level {
            if !(1..=5).contains(&level) {
                return Err(AppError::InvalidArgument(format!(
                    "Intensity level of '{}' must lie in [1, 5], got {}",
                    self.title, level
                )));
            }
        }

        if !self.vote_average.is_finite() || self.vote_average < 0.0 {
            return Err(AppError::InvalidArgument(format!(
                "Vote average of '{}' must be a non-negative number",
                self.title
            )));
        }

        Ok(())
    }
}

/// Rejects ratings outside [1.0, 10.0]
pub fn validate_rating(rating: f64) -> AppResult<()> {
    if rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::InvalidArgument(format!(
            "Rating must lie in [{}, {}], got {}",
            MIN_RATING, MAX_RATING, rating
        )))
    }
}
