//! Command handlers. Each run reads the records file, builds what it needs,
//! and writes to stdout; nothing is cached between runs.

use std::io::Write;
use std::path::{Path, PathBuf};

use bandtrack_core::{
    build_all, load_species, summarize, AppConfig, BatchOutcome, SpeciesFile, SpeciesPalette,
    TagFailure, Trajectory, TrajectorySummary,
};
use bandtrack_ingest::{load_records, select_species, species_counts, CsvLoad};
use serde::Serialize;

#[derive(Debug, Clone)]
pub(crate) struct TrajectoryOptions {
    pub csv_path: PathBuf,
    pub species: String,
    pub tag: Option<String>,
    pub include_single: bool,
    pub json: bool,
}

/// Print each species in the records file with its row count.
///
/// # Errors
///
/// Returns an error if the CSV cannot be read or writing to stdout fails.
pub(crate) fn run_species(csv_path: &Path) -> anyhow::Result<()> {
    let load = load_records(csv_path)?;
    let counts = species_counts(&load.records);

    let mut out = std::io::stdout().lock();
    if counts.is_empty() {
        writeln!(out, "no species found in {}", csv_path.display())?;
    }
    for (species, count) in &counts {
        writeln!(out, "{species}\t{count}")?;
    }
    Ok(())
}

/// Build and print trajectories for one species.
///
/// Tags that fail to build are reported but never abort the run.
///
/// # Errors
///
/// Returns an error if the CSV or species palette cannot be read, or if
/// writing to stdout fails.
pub(crate) fn run_trajectories(
    config: &AppConfig,
    options: &TrajectoryOptions,
) -> anyhow::Result<()> {
    let run = build_species_run(load_records(&options.csv_path)?, &options.species);
    let selected = select_trajectories(
        &run.outcome,
        options.tag.as_deref(),
        options.include_single,
    );

    if let Some(tag) = options.tag.as_deref() {
        if selected.is_empty() {
            anyhow::bail!(
                "tag '{tag}' has no complete records for {}",
                options.species
            );
        }
    }

    let mut out = std::io::stdout().lock();
    if options.json {
        let species_file = load_palette_file(&config.species_path)?;
        let palette = species_file.palette_for(&run.species);
        let document = render_document(&run, selected, palette);
        serde_json::to_writer_pretty(&mut out, &document)?;
        writeln!(out)?;
    } else {
        write_text(&mut out, &selected, &run.outcome.failures)?;
    }
    Ok(())
}

/// Species selection and trajectory building over one records file.
#[derive(Debug)]
pub(crate) struct SpeciesRun {
    pub species: String,
    pub outcome: BatchOutcome,
    /// Rows of this species without a tag or complete coordinates.
    pub skipped_records: usize,
    /// Undecodable rows anywhere in the file. Their species is unknown, so
    /// this is a file-wide count.
    pub malformed_rows: usize,
}

pub(crate) fn build_species_run(load: CsvLoad, species: &str) -> SpeciesRun {
    let report = select_species(load.records, species);
    tracing::info!(
        species = %report.species,
        events = report.events.len(),
        skipped = report.skipped_incomplete,
        malformed = load.malformed_rows,
        "loaded capture events"
    );

    SpeciesRun {
        species: report.species,
        outcome: build_all(report.events),
        skipped_records: report.skipped_incomplete,
        malformed_rows: load.malformed_rows,
    }
}

/// Trajectories to report, in tag order.
pub(crate) fn select_trajectories<'a>(
    outcome: &'a BatchOutcome,
    tag: Option<&str>,
    include_single: bool,
) -> Vec<&'a Trajectory> {
    outcome
        .trajectories
        .iter()
        .filter(|t| tag.is_none_or(|wanted| t.tag_id == wanted))
        .filter(|t| include_single || t.is_multi_encounter())
        .collect()
}

pub(crate) fn write_text<W: Write>(
    out: &mut W,
    trajectories: &[&Trajectory],
    failures: &[TagFailure],
) -> std::io::Result<()> {
    for trajectory in trajectories {
        writeln!(
            out,
            "{} ({} encounter{})",
            trajectory.tag_id,
            trajectory.encounter_count,
            if trajectory.encounter_count == 1 { "" } else { "s" }
        )?;
        for line in summarize(trajectory).lines() {
            writeln!(out, "  {line}")?;
        }
    }
    for failure in failures {
        writeln!(out, "{}: skipped ({})", failure.tag_id, failure.reason)?;
    }
    Ok(())
}

/// The palette file is optional; without it every species gets the fallback colours.
fn load_palette_file(path: &Path) -> anyhow::Result<SpeciesFile> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "species palette file not found; using fallback colours"
        );
        return Ok(SpeciesFile::default());
    }
    Ok(load_species(path)?)
}

pub(crate) fn render_document<'a>(
    run: &'a SpeciesRun,
    selected: Vec<&'a Trajectory>,
    palette: SpeciesPalette,
) -> RenderDocument<'a> {
    RenderDocument {
        species: &run.species,
        palette,
        skipped_records: run.skipped_records,
        malformed_rows: run.malformed_rows,
        trajectories: selected
            .into_iter()
            .map(|trajectory| RenderedTrajectory {
                summary: summarize(trajectory),
                trajectory,
            })
            .collect(),
        failures: &run.outcome.failures,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RenderDocument<'a> {
    pub species: &'a str,
    pub palette: SpeciesPalette,
    /// Rows of this species dropped for a blank tag or incomplete coordinates.
    pub skipped_records: usize,
    /// Undecodable rows in the whole file, across all species.
    pub malformed_rows: usize,
    pub trajectories: Vec<RenderedTrajectory<'a>>,
    pub failures: &'a [TagFailure],
}

#[derive(Debug, Serialize)]
pub(crate) struct RenderedTrajectory<'a> {
    pub trajectory: &'a Trajectory,
    pub summary: TrajectorySummary,
}
