pub mod discovery;
pub mod predictions;
pub mod providers;
pub mod recommendations;
pub mod stats;

pub use predictions::predict;
pub use providers::{MetadataProvider, TmdbProvider};
pub use recommendations::recommend;
pub use stats::stats;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

/// Converts a caller-supplied result limit, rejecting zero and negatives
pub fn positive_limit(limit: i64) -> AppResult<usize> {
    if limit <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "limit must be a positive integer, got {}",
            limit
        )));
    }
    Ok(usize::try_from(limit).unwrap_or(usize::MAX))
}

/// Checks every record of a catalog snapshot before scoring
pub fn validate_catalog(catalog: &[MovieRecord]) -> AppResult<()> {
    catalog.iter().try_for_each(MovieRecord::validate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_limit() {
        assert_eq!(positive_limit(1).unwrap(), 1);
        assert_eq!(positive_limit(25).unwrap(), 25);
        assert!(matches!(positive_limit(0), Err(AppError::InvalidArgument(_))));
        assert!(matches!(positive_limit(-1), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_catalog_rejects_bad_rating() {
        let mut movie = MovieRecord::new("Broken", vec!["Horror".to_string()]);
        movie.user_rating = Some(11.0);
        assert!(validate_catalog(&[movie]).is_err());
        assert!(validate_catalog(&[]).is_ok());
    }
}
