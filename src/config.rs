use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Rating at or above which a movie counts as liked
pub const DEFAULT_LIKED_THRESHOLD: f64 = 7.0;

/// Number of recommendations returned when the client does not ask for a limit
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

/// Neighbor count at which prediction confidence stops growing
pub const DEFAULT_CONFIDENCE_SATURATION: usize = 5;

/// Predicted rating used when the catalog has no rated movies at all
pub const DEFAULT_FALLBACK_NEUTRAL_RATING: f64 = 5.0;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; ratings stay in memory when unset
    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// TMDB API key; gateway-backed endpoints are disabled when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Per-request timeout for TMDB calls, in seconds
    #[serde(default = "default_tmdb_timeout_secs")]
    pub tmdb_timeout_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_liked_threshold")]
    pub liked_threshold: f64,

    #[serde(default = "default_recommendation_limit")]
    pub default_recommendation_limit: usize,

    #[serde(default = "default_confidence_saturation")]
    pub confidence_saturation: usize,

    #[serde(default = "default_fallback_neutral_rating")]
    pub fallback_neutral_rating: f64,
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_liked_threshold() -> f64 {
    DEFAULT_LIKED_THRESHOLD
}

fn default_recommendation_limit() -> usize {
    DEFAULT_RECOMMENDATION_LIMIT
}

fn default_confidence_saturation() -> usize {
    DEFAULT_CONFIDENCE_SATURATION
}

fn default_fallback_neutral_rating() -> f64 {
    DEFAULT_FALLBACK_NEUTRAL_RATING
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Scoring constants shared by the recommendation, prediction and stats code
    pub fn scoring(&self) -> anyhow::Result<ScoringConfig> {
        let scoring = ScoringConfig {
            liked_threshold: self.liked_threshold,
            default_recommendation_limit: self.default_recommendation_limit,
            confidence_saturation: self.confidence_saturation,
            fallback_neutral_rating: self.fallback_neutral_rating,
        };
        scoring
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid scoring configuration: {}", e))?;
        Ok(scoring)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fixed scoring constants, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub liked_threshold: f64,
    pub default_recommendation_limit: usize,
    pub confidence_saturation: usize,
    pub fallback_neutral_rating: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            liked_threshold: DEFAULT_LIKED_THRESHOLD,
            default_recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
            confidence_saturation: DEFAULT_CONFIDENCE_SATURATION,
            fallback_neutral_rating: DEFAULT_FALLBACK_NEUTRAL_RATING,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> AppResult<()> {
        if !(1.0..=10.0).contains(&self.liked_threshold) {
            return Err(AppError::InvalidArgument(format!(
                "liked_threshold must lie in [1, 10], got {}",
                self.liked_threshold
            )));
        }
        if !(1.0..=10.0).contains(&self.fallback_neutral_rating) {
            return Err(AppError::InvalidArgument(format!(
                "fallback_neutral_rating must lie in [1, 10], got {}",
                self.fallback_neutral_rating
            )));
        }
        if self.default_recommendation_limit == 0 {
            return Err(AppError::InvalidArgument(
                "default_recommendation_limit must be positive".to_string(),
            ));
        }
        if self.confidence_saturation == 0 {
            return Err(AppError::InvalidArgument(
                "confidence_saturation must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
