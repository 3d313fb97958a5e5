use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool};

use crate::{
    catalog::Catalog,
    db::MovieRepository,
    error::{AppError, AppResult},
    models::{HorrorCategory, MovieRecord},
};

/// Creates a PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const SELECT_MOVIES: &str = r#"
    SELECT title, year, user_rating, genres, horror_category, intensity_level,
           overview, vote_average, poster_path, external_id, updated_at
    FROM user_movies
    WHERE user_id = $1
    ORDER BY id
    FOR UPDATE
"#;

const UPSERT_MOVIE: &str = r#"
    INSERT INTO user_movies (
        user_id, title, year, user_rating, genres, horror_category, intensity_level,
        overview, vote_average, poster_path, external_id, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (user_id, title_key, year_key) DO UPDATE
    SET title = EXCLUDED.title,
        user_rating = EXCLUDED.user_rating,
        genres = EXCLUDED.genres,
        horror_category = EXCLUDED.horror_category,
        intensity_level = EXCLUDED.intensity_level,
        overview = EXCLUDED.overview,
        vote_average = EXCLUDED.vote_average,
        poster_path = EXCLUDED.poster_path,
        external_id = EXCLUDED.external_id,
        updated_at = EXCLUDED.updated_at
"#;

const INSERT_SEED_MOVIE: &str = r#"
    INSERT INTO user_movies (
        user_id, title, year, user_rating, genres, horror_category, intensity_level,
        overview, vote_average, poster_path, external_id, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (user_id, title_key, year_key) DO NOTHING
"#;

/// One `user_movies` row
#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    title: String,
    year: Option<String>,
    user_rating: Option<f64>,
    genres: Vec<String>,
    horror_category: Option<String>,
    intensity_level: Option<i16>,
    overview: Option<String>,
    vote_average: f64,
    poster_path: Option<String>,
    external_id: Option<i64>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<MovieRow> for MovieRecord {
    type Error = AppError;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        let horror_category = row
            .horror_category
            .as_deref()
            .map(str::parse::<HorrorCategory>)
            .transpose()?;
        let intensity_level = row
            .intensity_level
            .map(u8::try_from)
            .transpose()
            .map_err(|_| AppError::Internal(format!("Stored intensity of '{}' is out of range", row.title)))?;
        let external_id = row
            .external_id
            .map(u64::try_from)
            .transpose()
            .map_err(|_| AppError::Internal(format!("Stored external id of '{}' is negative", row.title)))?;

        Ok(MovieRecord {
            title: row.title,
            year: row.year,
            user_rating: row.user_rating,
            genres: row.genres,
            horror_category,
            intensity_level,
            overview: row.overview,
            vote_average: row.vote_average,
            poster_path: row.poster_path,
            external_id,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed repository
///
/// Every operation runs in one transaction that locks the user's rows, so
/// concurrent writes for the same user are serialized.
pub struct PgMovieRepository {
    pool: PgPool,
    seed: Catalog,
}

impl PgMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            seed: Catalog::seed(),
        }
    }

    async fn load_or_seed(&self, conn: &mut PgConnection, user_id: &str) -> AppResult<Catalog> {
        let mut rows = Self::fetch_rows(conn, user_id).await?;

        if rows.is_empty() {
            for movie in self.seed.movies() {
                write_movie(conn, INSERT_SEED_MOVIE, user_id, movie).await?;
            }
            tracing::info!(user_id = %user_id, movies = self.seed.len(), "Seeded catalog for new user");
            rows = Self::fetch_rows(conn, user_id).await?;
        }

        let records = rows
            .into_iter()
            .map(MovieRecord::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Catalog::from_records(records)
    }

    async fn fetch_rows(conn: &mut PgConnection, user_id: &str) -> AppResult<Vec<MovieRow>> {
        let rows = sqlx::query_as::<_, MovieRow>(SELECT_MOVIES)
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }
}

async fn write_movie(
    conn: &mut PgConnection,
    sql: &str,
    user_id: &str,
    movie: &MovieRecord,
) -> AppResult<()> {
    let external_id = movie
        .external_id
        .map(i64::try_from)
        .transpose()
        .map_err(|_| AppError::InvalidArgument(format!("External id of '{}' is too large", movie.title)))?;

    sqlx::query(sql)
        .bind(user_id)
        .bind(&movie.title)
        .bind(movie.year.as_deref())
        .bind(movie.user_rating)
        .bind(&movie.genres[..])
        .bind(movie.horror_category.map(|c| c.as_str()))
        .bind(movie.intensity_level.map(i16::from))
        .bind(movie.overview.as_deref())
        .bind(movie.vote_average)
        .bind(movie.poster_path.as_deref())
        .bind(external_id)
        .bind(movie.updated_at)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[async_trait::async_trait]
impl MovieRepository for PgMovieRepository {
    async fn catalog(&self, user_id: &str) -> AppResult<Catalog> {
        let mut tx = self.pool.begin().await?;
        let catalog = self.load_or_seed(&mut tx, user_id).await?;
        tx.commit().await?;
        Ok(catalog)
    }

    async fn upsert(&self, user_id: &str, record: MovieRecord) -> AppResult<MovieRecord> {
        let mut tx = self.pool.begin().await?;
        let mut catalog = self.load_or_seed(&mut tx, user_id).await?;
        let stored = catalog.upsert(record)?.clone();
        write_movie(&mut tx, UPSERT_MOVIE, user_id, &stored).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn set_rating(
        &self,
        user_id: &str,
        title: &str,
        year: Option<&str>,
        rating: Option<f64>,
    ) -> AppResult<MovieRecord> {
        let mut tx = self.pool.begin().await?;
        let mut catalog = self.load_or_seed(&mut tx, user_id).await?;
        let stored = catalog.set_rating(title, year, rating)?.clone();
        write_movie(&mut tx, UPSERT_MOVIE, user_id, &stored).await?;
        tx.commit().await?;
        Ok(stored)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
