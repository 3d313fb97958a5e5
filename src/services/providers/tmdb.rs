/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Search: /search/movie → TMDB ids + summary metadata
/// 2. Related: /movie/{id}/recommendations and /movie/{id}/similar
/// 3. Discover: /discover/movie filtered by genre and vote thresholds
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{MovieRecord, TmdbMovie, TmdbPage},
    services::providers::{DiscoverQuery, MetadataProvider},
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a TMDB provider whose requests time out after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches one page of movie results from a TMDB list endpoint
    async fn fetch_page(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<TmdbPage<TmdbMovie>> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                "Failed to deserialize TMDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    /// Converts TMDB results, dropping entries that are not valid catalog records
    fn to_records(movies: Vec<TmdbMovie>) -> Vec<MovieRecord> {
        movies
            .into_iter()
            .filter_map(|movie| {
                let id = movie.id;
                match MovieRecord::try_from(movie) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::debug!(tmdb_id = id, error = %e, "Skipping TMDB result");
                        None
                    }
                }
            })
            .collect()
    }

    fn discover_params(query: &DiscoverQuery) -> Vec<(&'static str, String)> {
        let genres: Vec<String> = query.genre_ids.iter().map(|id| id.to_string()).collect();
        vec![
            ("with_genres", genres.join("|")),
            ("page", query.page.to_string()),
            ("sort_by", query.sort_by.as_str().to_string()),
            ("vote_average.gte", query.min_vote_average.to_string()),
            ("vote_count.gte", query.min_vote_count.to_string()),
            ("include_adult", "false".to_string()),
        ]
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieRecord>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page = self
            .fetch_page("/search/movie", &[("query", query.to_string())])
            .await?;
        let movies = Self::to_records(page.results);

        tracing::info!(
            query = %query,
            results = movies.len(),
            provider = self.name(),
            "Movie search completed"
        );

        Ok(movies)
    }

    async fn related_movies(&self, external_id: u64, limit: usize) -> AppResult<Vec<MovieRecord>> {
        let params = [("page", "1".to_string())];

        let mut recommendations = self
            .fetch_page(&format!("/movie/{}/recommendations", external_id), &params)
            .await?
            .results;
        recommendations.truncate(limit);

        let mut similar = self
            .fetch_page(&format!("/movie/{}/similar", external_id), &params)
            .await?
            .results;
        similar.truncate(limit);

        recommendations.extend(similar);
        let movies = Self::to_records(recommendations);

        tracing::info!(
            tmdb_id = external_id,
            results = movies.len(),
            provider = self.name(),
            "Related movies fetched"
        );

        Ok(movies)
    }

    async fn discover_movies(&self, query: DiscoverQuery) -> AppResult<Vec<MovieRecord>> {
        let page = self
            .fetch_page("/discover/movie", &Self::discover_params(&query))
            .await?;
        let movies = Self::to_records(page.results);

        tracing::info!(
            page = query.page,
            results = movies.len(),
            provider = self.name(),
            "Discover page fetched"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::SortBy;

    fn create_test_provider() -> TmdbProvider {
        TmdbProvider::new(
            "test_key".to_string(),
            "http://test.local/3/".to_string(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    fn tmdb_movie(id: u64, title: &str, genre_ids: Vec<u32>) -> TmdbMovie {
        TmdbMovie {
            id,
            title: title.to_string(),
            release_date: Some("2019-07-03".to_string()),
            overview: None,
            genre_ids,
            vote_average: 7.1,
            vote_count: 5000,
            popularity: 40.0,
            poster_path: None,
        }
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = create_test_provider();
        assert_eq!(provider.api_url, "http://test.local/3");
        assert_eq!(provider.name(), "tmdb");
    }

    #[test]
    fn test_to_records_drops_invalid_results() {
        let movies = vec![
            tmdb_movie(530385, "Midsommar", vec![27, 18, 9648]),
            tmdb_movie(1, "Genreless", vec![]),
        ];
        let records = TmdbProvider::to_records(movies);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Midsommar");
        assert_eq!(records[0].year.as_deref(), Some("2019"));
        assert_eq!(records[0].external_id, Some(530385));
    }

    #[test]
    fn test_discover_params() {
        let query = DiscoverQuery {
            genre_ids: vec![27, 9648],
            page: 2,
            sort_by: SortBy::VoteAverageDesc,
            min_vote_average: 5.5,
            min_vote_count: 100,
        };
        let params = TmdbProvider::discover_params(&query);
        assert!(params.contains(&("with_genres", "27|9648".to_string())));
        assert!(params.contains(&("page", "2".to_string())));
        assert!(params.contains(&("sort_by", "vote_average.desc".to_string())));
        assert!(params.contains(&("vote_average.gte", "5.5".to_string())));
        assert!(params.contains(&("vote_count.gte", "100".to_string())));
    }

    #[tokio::test]
    async fn test_empty_search_query_rejected() {
        let provider = create_test_provider();
        let result = provider.search_movies("   ").await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }
}
