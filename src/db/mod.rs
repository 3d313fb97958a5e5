//! Per-user catalog storage.
//!
//! The HTTP layer loads a user's catalog through [`MovieRepository`], runs
//! the pure scoring code on the snapshot, and writes rating changes back.

use crate::{catalog::Catalog, error::AppResult, models::MovieRecord};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::{create_pool, run_migrations, PgMovieRepository};

/// Storage for user catalogs
///
/// A user seen for the first time starts with the bundled sample catalog.
#[async_trait::async_trait]
pub trait MovieRepository: Send + Sync {
    /// Snapshot of the user's catalog
    async fn catalog(&self, user_id: &str) -> AppResult<Catalog>;

    /// Adds a movie, or replaces the entry with the same title and year
    async fn upsert(&self, user_id: &str, record: MovieRecord) -> AppResult<MovieRecord>;

    /// Sets the user rating of a movie, or clears it when `rating` is `None`
    async fn set_rating(
        &self,
        user_id: &str,
        title: &str,
        year: Option<&str>,
        rating: Option<f64>,
    ) -> AppResult<MovieRecord>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
