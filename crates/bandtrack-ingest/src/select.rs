//! Species partitioning and the coordinate-completeness filter applied before
//! trajectory building.

use std::collections::BTreeMap;

use bandtrack_core::{CaptureEvent, RawCaptureRecord};

/// Coordinate-complete events for one species.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub species: String,
    pub events: Vec<CaptureEvent>,
    /// Rows of this species dropped for a blank tag or missing/invalid coordinates.
    pub skipped_incomplete: usize,
}

/// Keep the records of `species` that have a tag and both coordinate pairs.
///
/// Species names match exactly after trimming whitespace.
#[must_use]
pub fn select_species(records: Vec<RawCaptureRecord>, species: &str) -> IngestReport {
    let wanted = species.trim();
    let mut report = IngestReport {
        species: wanted.to_string(),
        ..IngestReport::default()
    };

    for record in records
        .into_iter()
        .filter(|r| r.species.as_deref().map(str::trim) == Some(wanted))
    {
        match record.into_event() {
            Some(event) => report.events.push(event),
            None => report.skipped_incomplete += 1,
        }
    }

    if report.skipped_incomplete > 0 {
        tracing::debug!(
            species = wanted,
            skipped = report.skipped_incomplete,
            "dropped records without complete coordinates"
        );
    }
    report
}

/// Number of records per species, in name order. Records without a species are not counted.
#[must_use]
pub fn species_counts(records: &[RawCaptureRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for species in records
        .iter()
        .filter_map(|r| r.species.as_deref().map(str::trim))
        .filter(|s| !s.is_empty())
    {
        *counts.entry(species.to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str, species: &str, recapture_lat: Option<f64>) -> RawCaptureRecord {
        RawCaptureRecord {
            tag_id: Some(tag.to_string()),
            species: Some(species.to_string()),
            banding_lat: Some(40.0),
            banding_lon: Some(-75.0),
            recapture_lat,
            recapture_lon: Some(-74.0),
            ..RawCaptureRecord::default()
        }
    }

    #[test]
    fn select_species_filters_species_and_incomplete_rows() {
        let records = vec![
            record("A", "Selasphorus rufus", Some(41.0)),
            record("B", "Selasphorus rufus", None),
            record("C", "Archilochus colubris", Some(41.0)),
        ];
        let report = select_species(records, " Selasphorus rufus ");
        assert_eq!(report.species, "Selasphorus rufus");
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].tag_id, "A");
        assert_eq!(report.skipped_incomplete, 1);
    }

    #[test]
    fn select_species_with_no_matches_is_empty() {
        let records = vec![record("A", "Selasphorus rufus", Some(41.0))];
        let report = select_species(records, "Calypte anna");
        assert!(report.events.is_empty());
        assert_eq!(report.skipped_incomplete, 0);
    }

    #[test]
    fn species_counts_groups_by_name() {
        let mut unnamed = record("D", "", Some(41.0));
        unnamed.species = None;
        let records = vec![
            record("A", "Selasphorus rufus", Some(41.0)),
            record("B", "Selasphorus rufus", None),
            record("C", "Archilochus colubris", Some(41.0)),
            unnamed,
        ];
        let counts = species_counts(&records);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["Selasphorus rufus"], 2);
        assert_eq!(counts["Archilochus colubris"], 1);
    }
}
