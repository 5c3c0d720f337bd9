use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Marker colours for one species on the rendered map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesPalette {
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub banding_color: String,
    pub encounter_color: String,
}

impl SpeciesPalette {
    /// Built-in colours used when a species has no configured entry.
    ///
    /// Rufous hummingbirds get yellow/magenta, everything else cyan/lightblue.
    #[must_use]
    pub fn fallback(scientific_name: &str) -> Self {
        let (banding, encounter) = if scientific_name.to_lowercase().contains("rufus") {
            ("yellow", "magenta")
        } else {
            ("cyan", "lightblue")
        };
        Self {
            scientific_name: scientific_name.to_string(),
            common_name: None,
            banding_color: banding.to_string(),
            encounter_color: encounter.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SpeciesFile {
    pub species: Vec<SpeciesPalette>,
}

impl SpeciesFile {
    /// Configured palette for `scientific_name` (case-insensitive), or the fallback.
    #[must_use]
    pub fn palette_for(&self, scientific_name: &str) -> SpeciesPalette {
        let wanted = scientific_name.trim();
        self.species
            .iter()
            .find(|s| s.scientific_name.eq_ignore_ascii_case(wanted))
            .cloned()
            .unwrap_or_else(|| SpeciesPalette::fallback(scientific_name))
    }
}

/// Load and validate the species palette from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_species(path: &Path) -> Result<SpeciesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SpeciesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let species_file: SpeciesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SpeciesFileParse)?;

    validate_species(&species_file)?;

    Ok(species_file)
}

fn validate_species(species_file: &SpeciesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for species in &species_file.species {
        if species.scientific_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "species scientific_name must be non-empty".to_string(),
            ));
        }

        if species.banding_color.trim().is_empty() || species.encounter_color.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "species '{}' must set both banding_color and encounter_color",
                species.scientific_name
            )));
        }

        if !seen_names.insert(species.scientific_name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate species: '{}'",
                species.scientific_name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "species_test.rs"]
mod tests;
