use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// CSV of banding and encounter records.
    pub data_path: PathBuf,
    /// YAML file with per-species marker colours.
    pub species_path: PathBuf,
    /// Species used when the CLI is not given one explicitly.
    pub default_species: Option<String>,
    /// Whether tags with a single encounter are emitted alongside multi-encounter paths.
    pub include_single: bool,
}
