use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::UserId,
    models::{
        CategorySummary, HorrorCategory, MoodPick, MovieRecord, RatingPrediction,
        RecommendationResult, UserStats,
    },
    routes::AppState,
    services::{self, discovery},
};

/// Raw `?limit=` value; a malformed number becomes `InvalidArgument`
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    /// The requested limit, or `default` when absent. Range checks are left
    /// to the service that consumes it.
    pub fn limit_or(&self, default: usize) -> AppResult<i64> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(i64::try_from(default).unwrap_or(i64::MAX)),
            Some(raw) => raw.parse().map_err(|_| {
                AppError::InvalidArgument(format!(
                    "limit must be a positive integer, got '{}'",
                    raw
                ))
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    /// `null` clears the rating
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategorySummary>,
}

/// The user's whole catalog
pub async fn watched(State(state): State<AppState>, user: UserId) -> AppResult<Json<Vec<MovieRecord>>> {
    let catalog = state.repository.catalog(user.as_str()).await?;
    Ok(Json(catalog.into_movies()))
}

pub async fn recommendations(
    State(state): State<AppState>,
    user: UserId,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<RecommendationResult>>> {
    let limit = params.limit_or(state.scoring.default_recommendation_limit)?;
    let catalog = state.repository.catalog(user.as_str()).await?;
    let results = services::recommend(catalog.movies(), limit, &state.scoring)?;

    tracing::info!(user_id = %user, returned = results.len(), "Recommendations served");
    Ok(Json(results))
}

pub async fn predictions(
    State(state): State<AppState>,
    user: UserId,
) -> AppResult<Json<Vec<RatingPrediction>>> {
    let catalog = state.repository.catalog(user.as_str()).await?;
    let predictions = services::predict(catalog.movies(), &state.scoring)?;

    tracing::info!(user_id = %user, returned = predictions.len(), "Predictions served");
    Ok(Json(predictions))
}

pub async fn stats(State(state): State<AppState>, user: UserId) -> AppResult<Json<UserStats>> {
    let catalog = state.repository.catalog(user.as_str()).await?;
    Ok(Json(services::stats(catalog.movies())))
}

pub async fn categories(
    State(state): State<AppState>,
    user: UserId,
) -> AppResult<Json<CategoriesResponse>> {
    let catalog = state.repository.catalog(user.as_str()).await?;
    Ok(Json(CategoriesResponse {
        categories: catalog.category_counts(),
    }))
}

pub async fn by_category(
    State(state): State<AppState>,
    user: UserId,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let category: HorrorCategory = category.parse()?;
    let catalog = state.repository.catalog(user.as_str()).await?;
    let movies = catalog.by_category(category).into_iter().cloned().collect();
    Ok(Json(movies))
}

/// Sets or clears the rating of a catalog movie
pub async fn rate(
    State(state): State<AppState>,
    user: UserId,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<MovieRecord>> {
    let movie = state
        .repository
        .set_rating(
            user.as_str(),
            &request.title,
            request.year.as_deref(),
            request.rating,
        )
        .await?;

    tracing::info!(
        user_id = %user,
        title = %movie.title,
        rating = ?movie.user_rating,
        "Rating updated"
    );
    Ok(Json(movie))
}

/// Looks a movie up at the metadata provider and adds it unrated
pub async fn import(
    State(state): State<AppState>,
    user: UserId,
    Json(request): Json<ImportRequest>,
) -> AppResult<Json<MovieRecord>> {
    let provider = state.metadata()?;
    let mut movie =
        discovery::resolve_movie(provider, &request.title, request.year.as_deref()).await?;
    movie.user_rating = None;
    movie.updated_at = None;

    let stored = state.repository.upsert(user.as_str(), movie).await?;

    tracing::info!(user_id = %user, title = %stored.title, "Movie imported");
    Ok(Json(stored))
}

pub async fn related(
    State(state): State<AppState>,
    user: UserId,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let provider = state.metadata()?;
    let limit = params.limit_or(state.scoring.default_recommendation_limit)?;
    let catalog = state.repository.catalog(user.as_str()).await?;
    let movies = discovery::related_movies(provider, catalog.movies(), limit, &state.scoring).await?;

    tracing::info!(user_id = %user, returned = movies.len(), "Related movies served");
    Ok(Json(movies))
}

/// Random popular horror movies missing from the catalog
pub async fn discover(
    State(state): State<AppState>,
    user: UserId,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let provider = state.metadata()?;
    let limit =
        services::positive_limit(params.limit_or(state.scoring.default_recommendation_limit)?)?;
    let catalog = state.repository.catalog(user.as_str()).await?;
    let candidates = discovery::discover_candidates(provider, catalog.movies(), limit).await?;

    let movies = discovery::pick_random(candidates, limit, &mut rand::rng());

    tracing::info!(user_id = %user, returned = movies.len(), "Discover served");
    Ok(Json(movies))
}

/// One random movie matching a horror mood
pub async fn roulette(
    State(state): State<AppState>,
    user: UserId,
    Path(mood): Path<String>,
) -> AppResult<Json<MoodPick>> {
    let mood: HorrorCategory = mood.parse()?;
    let provider = state.metadata()?;
    let catalog = state.repository.catalog(user.as_str()).await?;
    let candidates = discovery::mood_candidates(provider, mood, catalog.movies()).await?;

    let pick = discovery::pick_mood_movie(&candidates, &mut rand::rng()).ok_or_else(|| {
        AppError::NotFound(format!("No {} movies found for roulette", mood))
    })?;

    tracing::info!(
        user_id = %user,
        mood = %mood,
        candidates = candidates.len(),
        title = %pick.movie.title,
        "Roulette pick served"
    );
    Ok(Json(pick))
}
