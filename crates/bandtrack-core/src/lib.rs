pub mod app_config;
pub mod config;
pub mod event;
pub mod geodesic;
pub mod species;
pub mod summary;
pub mod trajectory;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use event::{parse_event_date, CaptureEvent, GeoPoint, RawCaptureRecord};
pub use geodesic::{distance_km, duration_days};
pub use species::{load_species, SpeciesFile, SpeciesPalette};
pub use summary::{summarize, LegSummary, TrajectorySummary};
pub use trajectory::{
    build_all, build_trajectory, classify, dedup_points, group_by_tag, BatchOutcome, Leg, LegKind,
    TagFailure, TagGroup, Trajectory,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read species file {path}: {source}")]
    SpeciesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse species file: {0}")]
    SpeciesFileParse(#[from] serde_yaml::Error),

    #[error("species config validation failed: {0}")]
    Validation(String),
}

/// Errors raised while reconstructing a single tag's trajectory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrajectoryError {
    /// A tag reached the builder with no events. Grouping never produces this.
    #[error("no capture events for tag {tag_id}")]
    EmptyEventSet { tag_id: String },

    #[error("event for tag {found} passed to builder for tag {expected}")]
    TagMismatch { expected: String, found: String },
}
