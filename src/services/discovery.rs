//! Catalog-assembly features backed by the metadata provider.
//!
//! Everything here performs I/O through [`MetadataProvider`]; the pure
//! scoring modules never depend on it. Per-title provider failures inside a
//! batch are logged and skipped, and a batch only fails when nothing at all
//! could be fetched.

use std::collections::HashSet;

use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng,
};

use crate::{
    config::ScoringConfig,
    error::{AppError, AppResult},
    models::{
        tmdb::{GENRE_HORROR, GENRE_MYSTERY, GENRE_SCIENCE_FICTION, GENRE_THRILLER},
        HorrorCategory, MoodPick, MovieRecord,
    },
    services::{
        positive_limit,
        providers::{DiscoverQuery, MetadataProvider, SortBy},
    },
};

/// Liked movies used as seeds for provider-side related titles
pub const RELATED_SEED_COUNT: usize = 3;

/// Entries taken from each provider list per seed
pub const RELATED_PER_LIST: usize = 8;

const RELATED_GENRES: [&str; 3] = ["Horror", "Thriller", "Mystery"];

const ROULETTE_PAGES: u32 = 3;
const ROULETTE_MIN_CANDIDATES: usize = 5;

/// Search and scoring parameters for one roulette mood
#[derive(Debug, Clone, Copy)]
pub struct MoodProfile {
    pub keywords: &'static [&'static str],
    pub genre_ids: &'static [u32],
    pub sort_by: SortBy,
}

pub fn mood_profile(mood: HorrorCategory) -> MoodProfile {
    match mood {
        HorrorCategory::Gory => MoodProfile {
            keywords: &["blood", "gore", "violent", "brutal", "slasher", "torture"],
            genre_ids: &[GENRE_HORROR, GENRE_THRILLER],
            sort_by: SortBy::PopularityDesc,
        },
        HorrorCategory::Creepy => MoodProfile {
            keywords: &["psychological", "disturbing", "unsettling", "paranormal", "haunted"],
            genre_ids: &[GENRE_HORROR, GENRE_MYSTERY, GENRE_THRILLER],
            sort_by: SortBy::VoteAverageDesc,
        },
        HorrorCategory::Mysterious => MoodProfile {
            keywords: &["mystery", "puzzle", "investigation", "detective", "supernatural"],
            genre_ids: &[GENRE_MYSTERY, GENRE_HORROR, GENRE_THRILLER],
            sort_by: SortBy::VoteAverageDesc,
        },
        HorrorCategory::Jumpscare => MoodProfile {
            keywords: &["jump scare", "sudden", "startling", "scary", "frightening"],
            genre_ids: &[GENRE_HORROR, GENRE_THRILLER],
            sort_by: SortBy::PopularityDesc,
        },
        HorrorCategory::BodyHorror => MoodProfile {
            keywords: &[
                "body horror",
                "transformation",
                "mutation",
                "grotesque",
                "flesh",
                "visceral",
                "anatomical",
            ],
            genre_ids: &[GENRE_HORROR, GENRE_SCIENCE_FICTION, GENRE_THRILLER],
            sort_by: SortBy::VoteAverageDesc,
        },
        HorrorCategory::Paranoid => MoodProfile {
            keywords: &[
                "paranoid",
                "conspiracy",
                "surveillance",
                "persecution",
                "madness",
                "delusion",
                "reality",
            ],
            genre_ids: &[GENRE_HORROR, GENRE_THRILLER, GENRE_MYSTERY],
            sort_by: SortBy::VoteAverageDesc,
        },
    }
}

/// Search spellings to try for a title, most literal first
pub fn title_variants(title: &str) -> Vec<String> {
    let candidates = [
        title.to_string(),
        title.replace("Seven", "Se7en"),
        title.replace("IT", "It"),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Finds a movie at the provider, preferring a result from the given year
pub async fn resolve_movie(
    provider: &dyn MetadataProvider,
    title: &str,
    year: Option<&str>,
) -> AppResult<MovieRecord> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidArgument(
            "Movie title cannot be empty".to_string(),
        ));
    }

    for variant in title_variants(title) {
        let mut results = provider.search_movies(&variant).await?;
        if results.is_empty() {
            continue;
        }

        let index = year
            .and_then(|y| results.iter().position(|m| m.year.as_deref() == Some(y)))
            .unwrap_or(0);
        return Ok(results.swap_remove(index));
    }

    Err(AppError::NotFound(format!(
        "No {} match for '{}'",
        provider.name(),
        title
    )))
}

/// Provider-side related titles for the user's favorite movies.
///
/// Seeds are the top liked movies by rating, or every rated movie when none
/// reaches the liked threshold. Results keep horror-adjacent genres only and
/// skip anything already in the catalog.
pub async fn related_movies(
    provider: &dyn MetadataProvider,
    catalog: &[MovieRecord],
    limit: i64,
    config: &ScoringConfig,
) -> AppResult<Vec<MovieRecord>> {
    let limit = positive_limit(limit)?;
    let seeds = related_seeds(catalog, config);
    if seeds.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen: HashSet<String> = catalog.iter().map(|m| m.title.to_lowercase()).collect();
    let mut related = Vec::new();
    let mut failures = 0;

    for seed in &seeds {
        let external_id = match seed.external_id {
            Some(id) => id,
            None => match resolve_movie(provider, &seed.title, seed.year.as_deref()).await {
                Ok(resolved) => match resolved.external_id {
                    Some(id) => id,
                    None => continue,
                },
                Err(e) => {
                    tracing::warn!(title = %seed.title, error = %e, "Could not resolve seed movie");
                    failures += 1;
                    continue;
                }
            },
        };

        let movies = match provider.related_movies(external_id, RELATED_PER_LIST).await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(title = %seed.title, error = %e, "Related lookup failed");
                failures += 1;
                continue;
            }
        };

        for movie in movies {
            let horror_adjacent = movie.genres.iter().any(|g| RELATED_GENRES.contains(&g.as_str()));
            if horror_adjacent && seen.insert(movie.title.to_lowercase()) {
                related.push(movie);
            }
        }

        if related.len() >= limit {
            break;
        }
    }

    if related.is_empty() && failures == seeds.len() {
        return Err(AppError::ExternalApi(
            "Failed to fetch any related movies".to_string(),
        ));
    }

    related.truncate(limit);
    Ok(related)
}

fn related_seeds<'a>(catalog: &'a [MovieRecord], config: &ScoringConfig) -> Vec<&'a MovieRecord> {
    let mut seeds: Vec<&MovieRecord> = catalog
        .iter()
        .filter(|m| m.user_rating.is_some_and(|r| r >= config.liked_threshold))
        .collect();
    if seeds.is_empty() {
        seeds = catalog.iter().filter(|m| m.is_rated()).collect();
    }

    seeds.sort_by(|a, b| {
        b.user_rating
            .unwrap_or_default()
            .total_cmp(&a.user_rating.unwrap_or_default())
    });
    seeds.truncate(RELATED_SEED_COUNT);
    seeds
}

/// Popular horror movies that are not in the catalog yet
pub async fn discover_candidates(
    provider: &dyn MetadataProvider,
    catalog: &[MovieRecord],
    limit: usize,
) -> AppResult<Vec<MovieRecord>> {
    let pages = (limit / 10).clamp(2, 5) as u32;
    let queries = (1..=pages).map(|page| DiscoverQuery {
        genre_ids: vec![GENRE_HORROR],
        page,
        sort_by: SortBy::PopularityDesc,
        min_vote_average: 5.0,
        min_vote_count: 50,
    });

    fetch_unwatched(provider, catalog, queries).await
}

/// Shuffles the candidates and keeps `limit` of them
pub fn pick_random<R: Rng + ?Sized>(
    mut movies: Vec<MovieRecord>,
    limit: usize,
    rng: &mut R,
) -> Vec<MovieRecord> {
    movies.shuffle(rng);
    movies.truncate(limit);
    movies
}

/// Roulette candidates for a mood, best matches first
pub async fn mood_candidates(
    provider: &dyn MetadataProvider,
    mood: HorrorCategory,
    catalog: &[MovieRecord],
) -> AppResult<Vec<MoodPick>> {
    let profile = mood_profile(mood);
    let queries = (1..=ROULETTE_PAGES).map(|page| DiscoverQuery {
        genre_ids: profile.genre_ids.to_vec(),
        page,
        sort_by: profile.sort_by,
        min_vote_average: 5.5,
        min_vote_count: 100,
    });

    let movies = fetch_unwatched(provider, catalog, queries).await?;

    let mut picks: Vec<MoodPick> = movies
        .into_iter()
        .filter_map(|movie| {
            let overview = movie.overview.as_deref().unwrap_or_default().to_lowercase();
            let mood_score = profile
                .keywords
                .iter()
                .filter(|keyword| overview.contains(*keyword))
                .count();
            (mood_score > 0 || movie.vote_average >= 7.0).then_some(MoodPick {
                mood,
                movie,
                mood_score,
            })
        })
        .collect();

    picks.sort_by(|a, b| {
        b.mood_score
            .cmp(&a.mood_score)
            .then_with(|| b.movie.vote_average.total_cmp(&a.movie.vote_average))
    });

    Ok(picks)
}

/// Picks uniformly among the top fifth of the candidates (at least five)
pub fn pick_mood_movie<R: Rng + ?Sized>(picks: &[MoodPick], rng: &mut R) -> Option<MoodPick> {
    let top = (picks.len() / 5).max(ROULETTE_MIN_CANDIDATES).min(picks.len());
    picks[..top].choose(rng).cloned()
}

/// Runs discover queries and keeps unique results missing from the catalog
async fn fetch_unwatched(
    provider: &dyn MetadataProvider,
    catalog: &[MovieRecord],
    queries: impl Iterator<Item = DiscoverQuery>,
) -> AppResult<Vec<MovieRecord>> {
    let mut seen: HashSet<String> = catalog.iter().map(|m| m.title.to_lowercase()).collect();
    let mut movies = Vec::new();
    let mut successes = 0;
    let mut last_error = None;

    for query in queries {
        let page = query.page;
        match provider.discover_movies(query).await {
            Ok(results) => {
                successes += 1;
                movies.extend(
                    results
                        .into_iter()
                        .filter(|m| seen.insert(m.title.to_lowercase())),
                );
            }
            Err(e) => {
                tracing::warn!(page, error = %e, provider = provider.name(), "Discover page failed");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if successes == 0 => Err(e),
        _ => Ok(movies),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockMetadataProvider;
    use rand::{rngs::StdRng, SeedableRng};

    fn record(title: &str, year: &str, genres: &[&str], external_id: u64) -> MovieRecord {
        let mut movie =
            MovieRecord::new(title, genres.iter().map(|g| g.to_string()).collect()).with_year(year);
        movie.external_id = Some(external_id);
        movie
    }

    fn mock_provider() -> MockMetadataProvider {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const("mock");
        mock
    }

    #[test]
    fn test_title_variants() {
        assert_eq!(title_variants("Seven"), vec!["Seven", "Se7en"]);
        assert_eq!(title_variants("IT"), vec!["IT", "It"]);
        assert_eq!(title_variants("Cobweb"), vec!["Cobweb"]);
    }

    #[tokio::test]
    async fn test_resolve_prefers_matching_year() {
        let mut mock = mock_provider();
        mock.expect_search_movies().returning(|_| {
            Ok(vec![
                record("It", "1990", &["Horror"], 1),
                record("It", "2017", &["Horror"], 2),
            ])
        });

        let movie = resolve_movie(&mock, "It", Some("2017")).await.unwrap();
        assert_eq!(movie.external_id, Some(2));

        let movie = resolve_movie(&mock, "It", Some("1958")).await.unwrap();
        assert_eq!(movie.external_id, Some(1));
    }

    #[tokio::test]
    async fn test_resolve_tries_spelling_variants() {
        let mut mock = mock_provider();
        mock.expect_search_movies().returning(|query| {
            if query == "Se7en" {
                Ok(vec![record("Se7en", "1995", &["Crime", "Thriller"], 807)])
            } else {
                Ok(vec![])
            }
        });

        let movie = resolve_movie(&mock, "Seven", Some("1995")).await.unwrap();
        assert_eq!(movie.title, "Se7en");
        assert_eq!(movie.external_id, Some(807));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut mock = mock_provider();
        mock.expect_search_movies().returning(|_| Ok(vec![]));

        let result = resolve_movie(&mock, "Nothing Like It", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_related_filters_and_dedupes() {
        let catalog = vec![
            record("Seven", "1995", &["Horror", "Thriller"], 807).with_rating(9.0),
            record("Smile", "2022", &["Horror"], 882598).with_rating(7.2),
        ];

        let mut mock = mock_provider();
        mock.expect_related_movies().returning(|id, _| {
            if id == 807 {
                Ok(vec![
                    record("Zodiac", "2007", &["Crime", "Mystery"], 1949),
                    record("Smile", "2022", &["Horror"], 882598),
                    record("Paddington", "2014", &["Comedy", "Family"], 116149),
                ])
            } else {
                Ok(vec![record("Zodiac", "2007", &["Crime", "Mystery"], 1949)])
            }
        });

        let related = related_movies(&mock, &catalog, 10, &ScoringConfig::default())
            .await
            .unwrap();
        let titles: Vec<&str> = related.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Zodiac"]);
    }

    #[tokio::test]
    async fn test_related_without_ratings_is_empty() {
        let catalog = vec![record("Cobweb", "2023", &["Horror"], 1)];
        let mock = mock_provider();

        let related = related_movies(&mock, &catalog, 5, &ScoringConfig::default())
            .await
            .unwrap();
        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn test_related_all_seeds_failing_is_error() {
        let catalog = vec![record("Seven", "1995", &["Horror"], 807).with_rating(9.0)];
        let mut mock = mock_provider();
        mock.expect_related_movies()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));

        let result = related_movies(&mock, &catalog, 5, &ScoringConfig::default()).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_related_rejects_bad_limit() {
        let mock = mock_provider();
        let result = related_movies(&mock, &[], 0, &ScoringConfig::default()).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_discover_skips_catalog_titles_and_failed_pages() {
        let catalog = vec![record("Hereditary", "2018", &["Horror"], 493922)];
        let mut mock = mock_provider();
        mock.expect_discover_movies().returning(|query| match query.page {
            1 => Ok(vec![
                record("Hereditary", "2018", &["Horror"], 493922),
                record("Midsommar", "2019", &["Horror"], 530385),
            ]),
            _ => Err(AppError::ExternalApi("rate limited".to_string())),
        });

        let movies = discover_candidates(&mock, &catalog, 10).await.unwrap();
        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Midsommar"]);
    }

    #[tokio::test]
    async fn test_discover_all_pages_failing_is_error() {
        let mut mock = mock_provider();
        mock.expect_discover_movies()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));

        let result = discover_candidates(&mock, &[], 10).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[test]
    fn test_pick_random_truncates() {
        let movies: Vec<MovieRecord> = (0..10)
            .map(|i| record(&format!("Movie {}", i), "2020", &["Horror"], i))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let picked = pick_random(movies, 3, &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[tokio::test]
    async fn test_mood_candidates_scored_by_keywords() {
        let mut mock = mock_provider();
        mock.expect_discover_movies().returning(|query| {
            if query.page != 1 {
                return Ok(vec![]);
            }
            let mut slasher = record("Terrifier", "2016", &["Horror"], 1).with_vote_average(5.9);
            slasher.overview = Some("A brutal slasher leaves a trail of blood.".to_string());
            let mut classic = record("Alien", "1979", &["Horror", "Science Fiction"], 2)
                .with_vote_average(8.1);
            classic.overview = Some("A crew meets a creature.".to_string());
            let mut dull = record("Dull", "2020", &["Horror"], 3).with_vote_average(5.6);
            dull.overview = Some("Nothing happens.".to_string());
            Ok(vec![dull, classic, slasher])
        });

        let picks = mood_candidates(&mock, HorrorCategory::Gory, &[]).await.unwrap();
        let titles: Vec<&str> = picks.iter().map(|p| p.movie.title.as_str()).collect();
        assert_eq!(titles, vec!["Terrifier", "Alien"]);
        assert_eq!(picks[0].mood_score, 3);
        assert_eq!(picks[0].mood, HorrorCategory::Gory);
    }

    #[test]
    fn test_pick_mood_movie_from_top_candidates() {
        let picks: Vec<MoodPick> = (0..30)
            .map(|i| MoodPick {
                mood: HorrorCategory::Creepy,
                movie: record(&format!("Movie {}", i), "2020", &["Horror"], i),
                mood_score: 30 - i as usize,
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let pick = pick_mood_movie(&picks, &mut rng).unwrap();
            // top max(5, 30 / 5) = 6 candidates
            assert!(pick.mood_score > 24);
        }
        assert!(pick_mood_movie(&[], &mut rng).is_none());
    }

    #[test]
    fn test_every_mood_has_profile() {
        for mood in HorrorCategory::ALL {
            let profile = mood_profile(mood);
            assert!(!profile.keywords.is_empty());
            assert!(profile.genre_ids.contains(&GENRE_HORROR));
        }
    }
}
