use std::collections::{BTreeMap, HashMap};

use crate::models::{
    round_rating, CategoryPreference, GenreCount, HorrorCategory, MovieRecord, UserStats,
};

/// Most horror categories reported in `category_preferences`
pub const MAX_CATEGORY_PREFERENCES: usize = 4;

/// Counts and averages over a catalog snapshot
pub fn stats(catalog: &[MovieRecord]) -> UserStats {
    let ratings: Vec<f64> = catalog.iter().filter_map(|m| m.user_rating).collect();
    let rated_movies = ratings.len();

    let average_rating = (rated_movies > 0)
        .then(|| round_rating(ratings.iter().sum::<f64>() / rated_movies as f64));

    UserStats {
        total_movies: catalog.len(),
        rated_movies,
        unrated_movies: catalog.len() - rated_movies,
        average_rating,
        top_genres: top_genres(catalog),
        category_preferences: category_preferences(catalog),
        last_activity: catalog.iter().filter_map(|m| m.updated_at).max(),
    }
}

fn top_genres(catalog: &[MovieRecord]) -> Vec<GenreCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for genre in catalog.iter().flat_map(|m| m.genres.iter()) {
        *counts.entry(genre.as_str()).or_default() += 1;
    }

    let mut top: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
    top
}

/// Average rating per horror category over rated movies, best first
fn category_preferences(catalog: &[MovieRecord]) -> Vec<CategoryPreference> {
    let mut ratings: BTreeMap<HorrorCategory, Vec<f64>> = BTreeMap::new();
    for movie in catalog {
        if let (Some(category), Some(rating)) = (movie.horror_category, movie.user_rating) {
            ratings.entry(category).or_default().push(rating);
        }
    }

    let mut preferences: Vec<CategoryPreference> = ratings
        .into_iter()
        .map(|(category, values)| CategoryPreference {
            category,
            count: values.len(),
            avg_rating: round_rating(values.iter().sum::<f64>() / values.len() as f64),
        })
        .collect();

    preferences.sort_by(|a, b| {
        b.avg_rating
            .total_cmp(&a.avg_rating)
            .then_with(|| a.category.as_str().cmp(b.category.as_str()))
    });
    preferences.truncate(MAX_CATEGORY_PREFERENCES);
    preferences
}
