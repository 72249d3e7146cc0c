// ============================================================
// TABLE DOMAIN LAYER
// ============================================================
// Core tabular types shared by the loader, normalizer and engines
// No I/O

mod records;
mod value;

pub use records::Table;
pub use value::{is_missing_token, ColumnKind, Value};

/// Canonical column names looked up by convention
pub mod columns {
    pub const ARTIST_NAME: &str = "artist_name";
    pub const ARTISTS: &str = "artists";
    pub const TRACK_NAME: &str = "track_name";
    pub const RELEASE_DATE: &str = "release_date";
    pub const YEAR: &str = "year";
    pub const DURATION_MS: &str = "duration_ms";
    pub const DURATION_MIN: &str = "duration_min";
    pub const POPULARITY: &str = "popularity";

    /// Numeric columns considered for the feature correlation matrix
    pub const FEATURE_CANDIDATES: &[&str] = &[
        "danceability",
        "energy",
        "loudness",
        "speechiness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "valence",
        "tempo",
        POPULARITY,
    ];
}
