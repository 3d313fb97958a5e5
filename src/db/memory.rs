use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    catalog::Catalog,
    db::MovieRepository,
    error::AppResult,
    models::MovieRecord,
};

/// Process-local repository; catalogs are lost on restart
pub struct InMemoryRepository {
    catalogs: RwLock<HashMap<String, Catalog>>,
    seed: Catalog,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Repository whose new users start from the bundled sample catalog
    pub fn new() -> Self {
        Self::with_seed(Catalog::seed())
    }

    /// Repository whose new users start from `seed`
    pub fn with_seed(seed: Catalog) -> Self {
        Self {
            catalogs: RwLock::new(HashMap::new()),
            seed,
        }
    }
}

#[async_trait::async_trait]
impl MovieRepository for InMemoryRepository {
    async fn catalog(&self, user_id: &str) -> AppResult<Catalog> {
        if let Some(catalog) = self.catalogs.read().await.get(user_id) {
            return Ok(catalog.clone());
        }

        let mut catalogs = self.catalogs.write().await;
        let catalog = catalogs
            .entry(user_id.to_string())
            .or_insert_with(|| self.seed.clone());
        Ok(catalog.clone())
    }

    async fn upsert(&self, user_id: &str, record: MovieRecord) -> AppResult<MovieRecord> {
        let mut catalogs = self.catalogs.write().await;
        let catalog = catalogs
            .entry(user_id.to_string())
            .or_insert_with(|| self.seed.clone());
        catalog.upsert(record).cloned()
    }

    async fn set_rating(
        &self,
        user_id: &str,
        title: &str,
        year: Option<&str>,
        rating: Option<f64>,
    ) -> AppResult<MovieRecord> {
        let mut catalogs = self.catalogs.write().await;
        let catalog = catalogs
            .entry(user_id.to_string())
            .or_insert_with(|| self.seed.clone());
        catalog.set_rating(title, year, rating).cloned()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_new_user_gets_seed_catalog() {
        let repo = InMemoryRepository::new();
        let catalog = repo.catalog("alice").await.unwrap();
        assert_eq!(catalog, Catalog::seed());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let repo = InMemoryRepository::new();
        repo.set_rating("alice", "Cobweb", None, Some(6.5))
            .await
            .unwrap();

        let alice = repo.catalog("alice").await.unwrap();
        let bob = repo.catalog("bob").await.unwrap();
        assert_eq!(alice.find("Cobweb", None).unwrap().user_rating, Some(6.5));
        assert_eq!(bob.find("Cobweb", None).unwrap().user_rating, None);
    }

    #[tokio::test]
    async fn test_clear_rating() {
        let repo = InMemoryRepository::new();
        let movie = repo
            .set_rating("alice", "Smile", Some("2022"), None)
            .await
            .unwrap();
        assert!(movie.user_rating.is_none());
        assert!(movie.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_rating_unknown_title() {
        let repo = InMemoryRepository::with_seed(Catalog::new());
        let result = repo.set_rating("alice", "Nope", None, Some(5.0)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upsert_adds_unrated_movie() {
        let repo = InMemoryRepository::with_seed(Catalog::new());
        let record = MovieRecord::new("Midsommar", vec!["Horror".to_string()]).with_year("2019");
        repo.upsert("alice", record).await.unwrap();

        let catalog = repo.catalog("alice").await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.find("midsommar", Some("2019")).unwrap().is_rated());
    }
}
