use std::collections::HashMap;

use crate::{
    config::ScoringConfig,
    error::AppResult,
    models::{MovieRecord, RecommendationResult},
    services::{positive_limit, validate_catalog},
};

const NO_FAVORITES_REASON: &str = "Rate a few movies to get personalized picks";
const NO_OVERLAP_REASON: &str = "No genre overlap with movies you liked";

/// Ranks the unrated movies of a catalog by genre affinity with the liked ones.
///
/// Each genre of the liked set is weighted by the share of liked movies that
/// carry it. A candidate scores the sum of the weights of its genres divided
/// by its own genre count, so the score stays in [0, 1]. Ties fall back to
/// the provider vote average (descending), then the title.
///
/// With no liked movies every candidate scores 0 and the first `limit`
/// unrated movies come back in catalog order.
pub fn recommend(
    catalog: &[MovieRecord],
    limit: i64,
    config: &ScoringConfig,
) -> AppResult<Vec<RecommendationResult>> {
    let limit = positive_limit(limit)?;
    validate_catalog(catalog)?;

    let liked: Vec<&MovieRecord> = catalog
        .iter()
        .filter(|m| m.user_rating.is_some_and(|r| r >= config.liked_threshold))
        .collect();
    let candidates = catalog.iter().filter(|m| !m.is_rated());

    if liked.is_empty() {
        return Ok(candidates
            .take(limit)
            .map(|movie| RecommendationResult {
                movie: movie.clone(),
                similarity_score: 0.0,
                reason: NO_FAVORITES_REASON.to_string(),
            })
            .collect());
    }

    let weights = genre_weights(&liked);
    let mut results: Vec<RecommendationResult> =
        candidates.map(|movie| score_candidate(movie, &weights)).collect();

    results.sort_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then_with(|| b.movie.vote_average.total_cmp(&a.movie.vote_average))
            .then_with(|| a.movie.title.cmp(&b.movie.title))
    });
    results.truncate(limit);

    tracing::debug!(
        liked = liked.len(),
        returned = results.len(),
        "Recommendations scored"
    );

    Ok(results)
}

/// Fraction of liked movies carrying each genre
fn genre_weights<'a>(liked: &[&'a MovieRecord]) -> HashMap<&'a str, f64> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for movie in liked.iter().copied() {
        for genre in &movie.genres {
            *counts.entry(genre.as_str()).or_default() += 1;
        }
    }

    let total = liked.len() as f64;
    counts
        .into_iter()
        .map(|(genre, count)| (genre, count as f64 / total))
        .collect()
}

fn score_candidate(movie: &MovieRecord, weights: &HashMap<&str, f64>) -> RecommendationResult {
    let mut shared: Vec<(&str, f64)> = movie
        .genres
        .iter()
        .filter_map(|genre| weights.get(genre.as_str()).map(|w| (genre.as_str(), *w)))
        .collect();

    let similarity_score = if movie.genres.is_empty() {
        0.0
    } else {
        shared.iter().map(|(_, w)| w).sum::<f64>() / movie.genres.len() as f64
    };

    shared.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let reason = match shared.as_slice() {
        [] => NO_OVERLAP_REASON.to_string(),
        [(only, _)] => format!("Shares {} with movies you liked", only),
        [(first, _), (second, _), ..] => {
            format!("Shares {} and {} with movies you liked", first, second)
        }
    };

    RecommendationResult {
        movie: movie.clone(),
        similarity_score,
        reason,
    }
}
