/// Movie metadata provider abstraction
///
/// Catalog assembly talks to the outside world only through this trait, so
/// the provider can be swapped or mocked. Scoring code never calls it.
use crate::{error::AppResult, models::MovieRecord};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Sort orders understood by the discover endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    PopularityDesc,
    VoteAverageDesc,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PopularityDesc => "popularity.desc",
            SortBy::VoteAverageDesc => "vote_average.desc",
        }
    }
}

/// Filters for one page of provider discovery
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    /// Provider genre ids; a movie matches when it has any of them
    pub genre_ids: Vec<u32>,
    pub page: u32,
    pub sort_by: SortBy,
    pub min_vote_average: f64,
    pub min_vote_count: u32,
}

/// Trait for read-only movie metadata providers
///
/// Failures are reported to the caller as-is; providers never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search movies by title
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieRecord>>;

    /// Movies the provider considers related to the given one
    ///
    /// Combines the provider's recommendation and similarity lists, each
    /// capped at `limit` entries.
    async fn related_movies(&self, external_id: u64, limit: usize) -> AppResult<Vec<MovieRecord>>;

    /// One page of discovery results
    async fn discover_movies(&self, query: DiscoverQuery) -> AppResult<Vec<MovieRecord>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
