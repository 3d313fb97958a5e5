//! In-memory movie catalog.
//!
//! The catalog owns its records and enforces the `(title, year)` uniqueness
//! invariant. Scoring code only ever sees `&[MovieRecord]` snapshots taken
//! from it.

use chrono::Utc;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{validate_rating, CategorySummary, HorrorCategory, MovieRecord},
};

mod seed;

pub use seed::sample_movies;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    movies: Vec<MovieRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog, rejecting invalid records and duplicate entries
    pub fn from_records(records: Vec<MovieRecord>) -> AppResult<Self> {
        let mut catalog = Self::new();
        for record in records {
            record.validate()?;
            if catalog.movies.iter().any(|m| m.same_entry(&record)) {
                return Err(AppError::InvalidArgument(format!(
                    "Duplicate catalog entry '{}' ({})",
                    record.title,
                    record.year.as_deref().unwrap_or("no year")
                )));
            }
            catalog.movies.push(record);
        }
        Ok(catalog)
    }

    /// The bundled sample catalog
    pub fn seed() -> Self {
        Self {
            movies: sample_movies(),
        }
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn into_movies(self) -> Vec<MovieRecord> {
        self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.movies.iter().map(|m| m.title.as_str()).collect()
    }

    pub fn contains_title(&self, title: &str) -> bool {
        self.movies.iter().any(|m| m.has_title(title))
    }

    pub fn find(&self, title: &str, year: Option<&str>) -> AppResult<&MovieRecord> {
        let index = self.position(title, year)?;
        Ok(&self.movies[index])
    }

    /// Appends a record, or replaces the entry with the same title and year.
    ///
    /// A replacement without a user rating keeps the rating already stored.
    pub fn upsert(&mut self, mut record: MovieRecord) -> AppResult<&MovieRecord> {
        record.validate()?;

        match self.movies.iter().position(|m| m.same_entry(&record)) {
            Some(index) => {
                let existing = &self.movies[index];
                if record.user_rating.is_none() {
                    record.user_rating = existing.user_rating;
                    record.updated_at = existing.updated_at;
                }
                self.movies[index] = record;
                Ok(&self.movies[index])
            }
            None => {
                self.movies.push(record);
                Ok(&self.movies[self.movies.len() - 1])
            }
        }
    }

    pub fn rate(&mut self, title: &str, year: Option<&str>, rating: f64) -> AppResult<&MovieRecord> {
        self.set_rating(title, year, Some(rating))
    }

    pub fn clear_rating(&mut self, title: &str, year: Option<&str>) -> AppResult<&MovieRecord> {
        self.set_rating(title, year, None)
    }

    /// Sets or clears the user rating and stamps `updated_at`
    pub fn set_rating(
        &mut self,
        title: &str,
        year: Option<&str>,
        rating: Option<f64>,
    ) -> AppResult<&MovieRecord> {
        if let Some(rating) = rating {
            validate_rating(rating)?;
        }

        let index = self.position(title, year)?;
        let movie = &mut self.movies[index];
        movie.user_rating = rating;
        movie.updated_at = Some(Utc::now());
        Ok(movie)
    }

    pub fn by_category(&self, category: HorrorCategory) -> Vec<&MovieRecord> {
        self.movies
            .iter()
            .filter(|m| m.horror_category == Some(category))
            .collect()
    }

    /// Categories that have at least one movie, in declaration order
    pub fn category_counts(&self) -> Vec<CategorySummary> {
        HorrorCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let count = self
                    .movies
                    .iter()
                    .filter(|m| m.horror_category == Some(category))
                    .count();
                (count > 0).then(|| CategorySummary {
                    name: category,
                    count,
                    description: category.description().to_string(),
                })
            })
            .collect()
    }

    /// Index of the entry named by `title` and `year`.
    ///
    /// Without a year, an entry that has no year itself is an exact match;
    /// otherwise any year matches and several hits are a `Conflict`.
    fn position(&self, title: &str, year: Option<&str>) -> AppResult<usize> {
        let title = title.trim();
        if year.is_none() {
            let exact = self
                .movies
                .iter()
                .position(|m| m.has_title(title) && m.year.is_none());
            if let Some(index) = exact {
                return Ok(index);
            }
        }

        let matches: Vec<usize> = self
            .movies
            .iter()
            .enumerate()
            .filter(|(_, m)| {
                m.has_title(title)
                    && year.map_or(true, |y| m.year.as_deref() == Some(y))
            })
            .map(|(index, _)| index)
            .collect();

        match matches.as_slice() {
            [] => Err(AppError::NotFound(format!(
                "Movie '{}' is not in the catalog",
                title
            ))),
            [index] => Ok(*index),
            _ => Err(AppError::Conflict(format!(
                "Several movies are titled '{}'; specify a year",
                title
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|g| g.to_string()).collect()
    }

    #[test]
    fn test_seed_catalog_is_valid() {
        let catalog = Catalog::seed();
        let rebuilt = Catalog::from_records(catalog.clone().into_movies()).unwrap();
        assert_eq!(rebuilt, catalog);
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.movies().iter().filter(|m| m.is_rated()).count(), 6);
    }

    #[test]
    fn test_from_records_rejects_duplicates() {
        let records = vec![
            MovieRecord::new("IT", genres(&["Horror"])).with_year("2017"),
            MovieRecord::new("it", genres(&["Horror"])).with_year("2017"),
        ];
        assert!(matches!(
            Catalog::from_records(records),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_same_title_different_year_allowed() {
        let records = vec![
            MovieRecord::new("IT", genres(&["Horror"])).with_year("2017"),
            MovieRecord::new("IT", genres(&["Horror"])).with_year("1990"),
        ];
        let catalog = Catalog::from_records(records).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_rate_stamps_updated_at() {
        let mut catalog = Catalog::seed();
        let movie = catalog.rate("cobweb", None, 6.5).unwrap();
        assert_eq!(movie.title, "Cobweb");
        assert_eq!(movie.user_rating, Some(6.5));
        assert!(movie.updated_at.is_some());
    }

    #[test]
    fn test_rate_rejects_out_of_range() {
        let mut catalog = Catalog::seed();
        assert!(matches!(
            catalog.rate("Cobweb", None, 11.0),
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(catalog.find("Cobweb", None).unwrap().user_rating, None);
    }

    #[test]
    fn test_rate_unknown_title() {
        let mut catalog = Catalog::seed();
        assert!(matches!(
            catalog.rate("Nope", None, 5.0),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_rate_ambiguous_title_needs_year() {
        let mut catalog = Catalog::from_records(vec![
            MovieRecord::new("IT", genres(&["Horror"])).with_year("2017"),
            MovieRecord::new("IT", genres(&["Horror"])).with_year("1990"),
        ])
        .unwrap();

        assert!(matches!(
            catalog.rate("IT", None, 7.0),
            Err(AppError::Conflict(_))
        ));
        let movie = catalog.rate("IT", Some("1990"), 7.0).unwrap();
        assert_eq!(movie.year.as_deref(), Some("1990"));
    }

    #[test]
    fn test_yearless_entry_beside_dated_one() {
        let mut catalog = Catalog::from_records(vec![
            MovieRecord::new("Nosferatu", genres(&["Horror"])),
            MovieRecord::new("Nosferatu", genres(&["Horror"])).with_year("1922"),
        ])
        .unwrap();

        let movie = catalog.rate("nosferatu", None, 8.0).unwrap();
        assert_eq!(movie.year, None);
        assert_eq!(movie.user_rating, Some(8.0));

        let movie = catalog.rate("Nosferatu", Some("1922"), 9.0).unwrap();
        assert_eq!(movie.year.as_deref(), Some("1922"));
        assert_eq!(catalog.find("Nosferatu", None).unwrap().user_rating, Some(8.0));

        let movie = catalog.clear_rating("Nosferatu", None).unwrap();
        assert_eq!(movie.year, None);
        assert_eq!(movie.user_rating, None);
    }

    #[test]
    fn test_titles_fold_non_ascii_case() {
        let mut catalog = Catalog::from_records(vec![MovieRecord::new(
            "Été Maudit",
            genres(&["Horror"]),
        )
        .with_year("2001")])
        .unwrap();

        assert!(catalog.contains_title("ÉTÉ MAUDIT"));
        catalog
            .upsert(MovieRecord::new("été maudit", genres(&["Horror", "Drama"])).with_year("2001"))
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.rate("ÉTÉ maudit", None, 6.0).is_ok());
    }

    #[test]
    fn test_clear_rating() {
        let mut catalog = Catalog::seed();
        let movie = catalog.clear_rating("Seven", Some("1995")).unwrap();
        assert_eq!(movie.user_rating, None);
    }

    #[test]
    fn test_upsert_appends_new_movie() {
        let mut catalog = Catalog::seed();
        catalog
            .upsert(MovieRecord::new("Talk to Me", genres(&["Horror"])).with_year("2023"))
            .unwrap();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.movies().last().unwrap().title, "Talk to Me");
    }

    #[test]
    fn test_upsert_keeps_existing_rating() {
        let mut catalog = Catalog::seed();
        let refreshed = MovieRecord::new("Seven", genres(&["Crime", "Mystery", "Thriller"]))
            .with_year("1995")
            .with_vote_average(8.4);
        let movie = catalog.upsert(refreshed).unwrap();
        assert_eq!(movie.user_rating, Some(9.0));
        assert_eq!(movie.vote_average, 8.4);
        assert_eq!(catalog.len(), 9);
    }

    #[test]
    fn test_upsert_rejects_invalid_record() {
        let mut catalog = Catalog::new();
        assert!(catalog.upsert(MovieRecord::new("Empty", vec![])).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_category_counts() {
        let catalog = Catalog::seed();
        let counts = catalog.category_counts();
        let creepy = counts
            .iter()
            .find(|c| c.name == HorrorCategory::Creepy)
            .unwrap();
        assert_eq!(creepy.count, 2);
        assert_eq!(creepy.description, "Psychologically unsettling and disturbing");
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 9);
    }

    #[test]
    fn test_by_category() {
        let catalog = Catalog::seed();
        let mysterious: Vec<&str> = catalog
            .by_category(HorrorCategory::Mysterious)
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(mysterious, vec!["The Wailing", "Cobweb"]);
    }
}
