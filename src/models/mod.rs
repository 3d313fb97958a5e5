use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod movie;
pub mod tmdb;

pub use movie::{validate_rating, HorrorCategory, MovieRecord, MAX_RATING, MIN_RATING};
pub use tmdb::{TmdbMovie, TmdbPage};

/// A ranked recommendation for an unrated catalog movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub movie: MovieRecord,
    /// Genre affinity with the liked set, in [0, 1]
    pub similarity_score: f64,
    pub reason: String,
}

/// An estimated rating for an unrated catalog movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingPrediction {
    pub movie: MovieRecord,
    pub predicted_rating: f64,
    pub confidence: f64,
    /// Contributing neighbor titles, strongest first
    pub basis: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryPreference {
    pub category: HorrorCategory,
    pub count: usize,
    pub avg_rating: f64,
}

/// Aggregate figures over one catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub total_movies: usize,
    pub rated_movies: usize,
    pub unrated_movies: usize,
    /// `None` when nothing has been rated
    pub average_rating: Option<f64>,
    pub top_genres: Vec<GenreCount>,
    pub category_preferences: Vec<CategoryPreference>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// A horror category with the number of catalog movies filed under it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub name: HorrorCategory,
    pub count: usize,
    pub description: String,
}

/// A mood roulette pick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodPick {
    pub mood: HorrorCategory,
    pub movie: MovieRecord,
    /// Number of mood keywords found in the overview
    pub mood_score: usize,
}

/// Rounds to one decimal place, the precision ratings are shown with
pub fn round_rating(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(8.333), 8.3);
        assert_eq!(round_rating(8.36), 8.4);
        assert_eq!(round_rating(9.0), 9.0);
    }

    #[test]
    fn test_user_stats_serializes_null_average() {
        let stats = UserStats {
            total_movies: 0,
            rated_movies: 0,
            unrated_movies: 0,
            average_rating: None,
            top_genres: vec![],
            category_preferences: vec![],
            last_activity: None,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["average_rating"].is_null());
    }

    #[test]
    fn test_recommendation_serialization_shape() {
        let result = RecommendationResult {
            movie: MovieRecord::new("Cobweb", vec!["Horror".to_string()]),
            similarity_score: 0.5,
            reason: "Matches your taste for Horror".to_string(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["movie"]["title"], "Cobweb");
        assert_eq!(json["similarity_score"], 0.5);
    }
}
