use bandtrack_core::{build_all, parse_event_date, CaptureEvent, GeoPoint, SpeciesPalette};
use bandtrack_ingest::read_records;

use super::*;
use crate::report::{build_species_run, render_document, select_trajectories, write_text};

fn event(tag: &str, banding: (f64, f64, &str), recapture: (f64, f64, &str)) -> CaptureEvent {
    CaptureEvent {
        tag_id: tag.to_string(),
        species: "Selasphorus rufus".to_string(),
        banding_point: GeoPoint::new(banding.0, banding.1).unwrap(),
        banding_date: parse_event_date(banding.2),
        banding_label: None,
        recapture_point: GeoPoint::new(recapture.0, recapture.1).unwrap(),
        recapture_date: parse_event_date(recapture.2),
        recapture_label: None,
    }
}

fn sample_outcome() -> bandtrack_core::BatchOutcome {
    build_all(vec![
        event(
            "AB123",
            (40.0, -75.0, "2020-01-01"),
            (41.0, -74.0, "2020-01-10"),
        ),
        event(
            "AB123",
            (41.0, -74.0, "2020-06-01"),
            (42.0, -73.0, "2020-06-15"),
        ),
        event("ZZ001", (33.0, -117.0, "2019-04-02"), (49.0, -123.0, "")),
    ])
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["bandtrack"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_species_command() {
    let cli = Cli::try_parse_from(["bandtrack", "species"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Species { csv: None })));
}

#[test]
fn parses_species_command_with_csv() {
    let cli = Cli::try_parse_from(["bandtrack", "species", "--csv", "data/x.csv"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Species { csv: Some(ref p) }) if p == std::path::Path::new("data/x.csv")
    ));
}

#[test]
fn parses_trajectories_defaults() {
    let cli = Cli::try_parse_from(["bandtrack", "trajectories"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Trajectories {
            species: None,
            csv: None,
            tag: None,
            multi_only: false,
            json: false,
        })
    ));
}

#[test]
fn parses_trajectories_with_all_flags() {
    let cli = Cli::try_parse_from([
        "bandtrack",
        "trajectories",
        "--species",
        "Selasphorus rufus",
        "--tag",
        "AB123",
        "--multi-only",
        "--json",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Trajectories {
            species: Some(ref s),
            tag: Some(ref t),
            multi_only: true,
            json: true,
            ..
        }) if s == "Selasphorus rufus" && t == "AB123"
    ));
}

#[test]
fn rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["bandtrack", "render"]).is_err());
}

#[test]
fn select_trajectories_filters_single_encounters() {
    let outcome = sample_outcome();
    assert_eq!(select_trajectories(&outcome, None, true).len(), 2);
    let multi = select_trajectories(&outcome, None, false);
    assert_eq!(multi.len(), 1);
    assert_eq!(multi[0].tag_id, "AB123");
}

#[test]
fn select_trajectories_filters_by_tag() {
    let outcome = sample_outcome();
    let selected = select_trajectories(&outcome, Some("ZZ001"), true);
    assert_eq!(selected.len(), 1);
    assert!(select_trajectories(&outcome, Some("ZZ001"), false).is_empty());
    assert!(select_trajectories(&outcome, Some("nope"), true).is_empty());
}

#[test]
fn write_text_lists_legs_and_trailers() {
    let outcome = sample_outcome();
    let selected = select_trajectories(&outcome, None, true);
    let mut buf = Vec::new();
    write_text(&mut buf, &selected, &outcome.failures).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("AB123 (2 encounters)\n"));
    assert!(text.contains("  Total duration: 166 days\n"));
    assert!(text.contains("ZZ001 (1 encounter)\n"));
    assert!(text.contains(", NA\n"));
    assert_eq!(text.lines().count(), 1 + 5 + 1 + 3);
}

#[test]
fn write_text_reports_failures() {
    let failures = vec![bandtrack_core::TagFailure {
        tag_id: "BAD".to_string(),
        reason: "no capture events for tag BAD".to_string(),
    }];
    let mut buf = Vec::new();
    write_text(&mut buf, &[], &failures).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "BAD: skipped (no capture events for tag BAD)\n"
    );
}

#[test]
fn species_run_keeps_incomplete_and_malformed_counts_apart() {
    let mut csv = Vec::from(
        "original_band,species_scientific_name_banding,lat_dd_banding,lon_dd_banding,lat_dd_recap_enc,lon_dd_recap_enc\n",
    );
    csv.extend_from_slice(b"A1,Selasphorus rufus,40.0,-75.0,41.0,-74.0\n");
    csv.extend_from_slice(b"A2,Selasphorus rufus,40.0,-75.0,,-74.0\n");
    csv.extend_from_slice(b"B1,Archilochus colubris,30.0,-90.0,,\n");
    csv.extend_from_slice(b"C1,S\xff,30.0,-90.0,31.0,-91.0\n");
    let load = read_records(csv.as_slice()).unwrap();

    let run = build_species_run(load, "Selasphorus rufus");
    // A2 is incomplete; B1 is incomplete too but belongs to another species.
    assert_eq!(run.skipped_records, 1);
    assert_eq!(run.malformed_rows, 1);
    assert_eq!(run.outcome.trajectories.len(), 1);

    let selected = select_trajectories(&run.outcome, None, true);
    let palette = SpeciesPalette::fallback(&run.species);
    let document = render_document(&run, selected, palette);
    let json = serde_json::to_value(&document).unwrap();
    assert_eq!(json["skipped_records"], 1);
    assert_eq!(json["malformed_rows"], 1);
    assert_eq!(json["trajectories"].as_array().unwrap().len(), 1);
    assert_eq!(json["palette"]["banding_color"], "yellow");
}
