use crate::models::{HorrorCategory, MovieRecord};

struct SeedMovie {
    title: &'static str,
    year: &'static str,
    rating: Option<f64>,
    genres: &'static [&'static str],
    category: HorrorCategory,
    intensity: u8,
    overview: &'static str,
    vote_average: f64,
}

const SEED_MOVIES: &[SeedMovie] = &[
    SeedMovie {
        title: "Copycat",
        year: "1995",
        rating: Some(8.0),
        genres: &["Horror", "Thriller", "Crime"],
        category: HorrorCategory::Creepy,
        intensity: 3,
        overview: "A psychological thriller about a serial killer copycat.",
        vote_average: 6.6,
    },
    SeedMovie {
        title: "Seven",
        year: "1995",
        rating: Some(9.0),
        genres: &["Horror", "Thriller", "Crime"],
        category: HorrorCategory::Gory,
        intensity: 4,
        overview: "Two detectives hunt a serial killer who uses the seven deadly sins.",
        vote_average: 8.6,
    },
    SeedMovie {
        title: "The Wailing",
        year: "2016",
        rating: Some(9.0),
        genres: &["Horror", "Mystery", "Thriller"],
        category: HorrorCategory::Mysterious,
        intensity: 4,
        overview: "A mysterious illness spreads in a remote Korean village.",
        vote_average: 7.5,
    },
    SeedMovie {
        title: "IT",
        year: "2017",
        rating: Some(8.0),
        genres: &["Horror", "Thriller"],
        category: HorrorCategory::Jumpscare,
        intensity: 3,
        overview: "A group of kids face their fears against the evil clown Pennywise.",
        vote_average: 7.3,
    },
    SeedMovie {
        title: "Hereditary",
        year: "2018",
        rating: Some(8.0),
        genres: &["Horror", "Drama", "Mystery"],
        category: HorrorCategory::Creepy,
        intensity: 5,
        overview: "A family haunted by tragedy is haunted by something far worse.",
        vote_average: 7.3,
    },
    SeedMovie {
        title: "Smile",
        year: "2022",
        rating: Some(7.2),
        genres: &["Horror", "Mystery", "Thriller"],
        category: HorrorCategory::Jumpscare,
        intensity: 4,
        overview: "After witnessing a bizarre, traumatic incident, Dr. Rose Cotter starts experiencing frightening occurrences.",
        vote_average: 6.5,
    },
    SeedMovie {
        title: "Together",
        year: "2021",
        rating: None,
        genres: &["Horror", "Drama"],
        category: HorrorCategory::Paranoid,
        intensity: 2,
        overview: "A pandemic horror story.",
        vote_average: 6.2,
    },
    SeedMovie {
        title: "The Platform 2",
        year: "2024",
        rating: None,
        genres: &["Horror", "Sci-Fi", "Thriller"],
        category: HorrorCategory::BodyHorror,
        intensity: 4,
        overview: "Sequel to the dystopian thriller.",
        vote_average: 5.8,
    },
    SeedMovie {
        title: "Cobweb",
        year: "2023",
        rating: None,
        genres: &["Horror", "Mystery"],
        category: HorrorCategory::Mysterious,
        intensity: 3,
        overview: "A young boy hears mysterious sounds from within the walls.",
        vote_average: 6.1,
    },
];

/// Sample horror catalog every new user starts from
pub fn sample_movies() -> Vec<MovieRecord> {
    SEED_MOVIES
        .iter()
        .map(|seed| MovieRecord {
            title: seed.title.to_string(),
            year: Some(seed.year.to_string()),
            user_rating: seed.rating,
            genres: seed.genres.iter().map(|g| g.to_string()).collect(),
            horror_category: Some(seed.category),
            intensity_level: Some(seed.intensity),
            overview: Some(seed.overview.to_string()),
            vote_average: seed.vote_average,
            poster_path: None,
            external_id: None,
            updated_at: None,
        })
        .collect()
}
