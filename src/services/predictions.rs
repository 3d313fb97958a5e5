use crate::{
    config::ScoringConfig,
    error::AppResult,
    models::{round_rating, MovieRecord, RatingPrediction, MAX_RATING, MIN_RATING},
    services::validate_catalog,
};

/// Most neighbor titles reported as the basis of a prediction
pub const MAX_BASIS_TITLES: usize = 5;

struct Neighbor<'a> {
    title: &'a str,
    rating: f64,
    weight: f64,
}

/// Estimates a rating for every unrated movie of the catalog.
///
/// Neighbors are rated movies sharing at least one genre with the target,
/// weighted by the Jaccard overlap of the two genre sets. Without neighbors
/// the prediction is the catalog-wide mean rating (or
/// `fallback_neutral_rating` when nothing is rated) with zero confidence.
///
/// Results are ordered by descending confidence; equal confidences keep
/// catalog order.
pub fn predict(catalog: &[MovieRecord], config: &ScoringConfig) -> AppResult<Vec<RatingPrediction>> {
    validate_catalog(catalog)?;

    let rated: Vec<(&MovieRecord, f64)> = catalog
        .iter()
        .filter_map(|m| m.user_rating.map(|r| (m, r)))
        .collect();

    // The neutral rating is served exactly as configured; only the mean is rounded
    let fallback = if rated.is_empty() {
        config.fallback_neutral_rating
    } else {
        round_rating(rated.iter().map(|(_, r)| r).sum::<f64>() / rated.len() as f64)
    };

    let mut predictions: Vec<RatingPrediction> = catalog
        .iter()
        .filter(|m| !m.is_rated())
        .map(|movie| predict_movie(movie, &rated, fallback, config))
        .collect();

    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    tracing::debug!(
        rated = rated.len(),
        predicted = predictions.len(),
        "Ratings predicted"
    );

    Ok(predictions)
}

fn predict_movie(
    movie: &MovieRecord,
    rated: &[(&MovieRecord, f64)],
    fallback: f64,
    config: &ScoringConfig,
) -> RatingPrediction {
    let mut neighbors: Vec<Neighbor> = rated
        .iter()
        .filter_map(|(neighbor, rating)| {
            let weight = genre_overlap(movie, neighbor);
            (weight > 0.0).then_some(Neighbor {
                title: neighbor.title.as_str(),
                rating: *rating,
                weight,
            })
        })
        .collect();

    if neighbors.is_empty() {
        return RatingPrediction {
            movie: movie.clone(),
            predicted_rating: fallback.clamp(MIN_RATING, MAX_RATING),
            confidence: 0.0,
            basis: Vec::new(),
        };
    }

    let total_weight: f64 = neighbors.iter().map(|n| n.weight).sum();
    let weighted_sum: f64 = neighbors.iter().map(|n| n.weight * n.rating).sum();
    let predicted = weighted_sum / total_weight;

    let count = neighbors.len() as f64;
    let coverage = (count / config.confidence_saturation as f64).min(1.0);
    let confidence = (coverage * (total_weight / count)).clamp(0.0, 1.0);

    neighbors.sort_by(|a, b| b.weight.total_cmp(&a.weight).then_with(|| a.title.cmp(b.title)));
    let basis = neighbors
        .iter()
        .take(MAX_BASIS_TITLES)
        .map(|n| n.title.to_string())
        .collect();

    RatingPrediction {
        movie: movie.clone(),
        predicted_rating: round_rating(predicted).clamp(MIN_RATING, MAX_RATING),
        confidence,
        basis,
    }
}

/// |shared genres| / |union of genres|
fn genre_overlap(a: &MovieRecord, b: &MovieRecord) -> f64 {
    let shared = a.genres.iter().filter(|g| b.has_genre(g)).count();
    if shared == 0 {
        return 0.0;
    }
    let union = a.genres.len() + b.genres.len() - shared;
    shared as f64 / union as f64
}
