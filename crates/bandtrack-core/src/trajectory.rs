//! Per-tag trajectory reconstruction.
//!
//! Events are grouped by tag, ordered by recapture date, and walked into a
//! sequence of legs: one encounter leg per event (banding to recapture) and
//! one gap leg between consecutive events (previous recapture to next
//! banding). Each tag is built independently so a bad tag never affects
//! another.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::event::{CaptureEvent, GeoPoint};
use crate::geodesic::{distance_km, duration_days};
use crate::TrajectoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    /// Banding to recapture within one event.
    Encounter,
    /// Recapture of one event to the banding of the next.
    Gap,
}

impl std::fmt::Display for LegKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegKind::Encounter => write!(f, "encounter"),
            LegKind::Gap => write!(f, "gap"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub kind: LegKind,
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub from_label: Option<String>,
    pub to_label: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub distance_km: f64,
    /// `None` when either endpoint date is unknown.
    pub duration_days: Option<i64>,
}

/// One end of a leg.
struct Stop<'a> {
    point: GeoPoint,
    date: Option<NaiveDate>,
    label: Option<&'a String>,
}

impl<'a> Stop<'a> {
    fn banding(event: &'a CaptureEvent) -> Self {
        Self {
            point: event.banding_point,
            date: event.banding_date,
            label: event.banding_label.as_ref(),
        }
    }

    fn recapture(event: &'a CaptureEvent) -> Self {
        Self {
            point: event.recapture_point,
            date: event.recapture_date,
            label: event.recapture_label.as_ref(),
        }
    }
}

impl Leg {
    fn between(kind: LegKind, from: &Stop<'_>, to: &Stop<'_>) -> Self {
        Self {
            kind,
            from: from.point,
            to: to.point,
            from_label: from.label.cloned(),
            to_label: to.label.cloned(),
            from_date: from.date,
            to_date: to.date,
            distance_km: distance_km(from.point, to.point),
            duration_days: duration_days(from.date, to.date),
        }
    }

    /// The banding-to-recapture leg of a single event.
    #[must_use]
    pub fn encounter(event: &CaptureEvent) -> Self {
        Self::between(
            LegKind::Encounter,
            &Stop::banding(event),
            &Stop::recapture(event),
        )
    }

    /// The leg joining one event's recapture to the next event's banding.
    #[must_use]
    pub fn gap(previous: &CaptureEvent, next: &CaptureEvent) -> Self {
        Self::between(
            LegKind::Gap,
            &Stop::recapture(previous),
            &Stop::banding(next),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub tag_id: String,
    pub species: String,
    pub encounter_count: usize,
    /// Path vertices with exact repeats removed, first occurrence kept.
    ///
    /// A return to an earlier location collapses into that earlier vertex,
    /// so the polyline does not show revisits.
    pub ordered_points: Vec<GeoPoint>,
    pub legs: Vec<Leg>,
    pub total_distance_km: f64,
    /// Sum of the legs with a known duration. Under-counts when
    /// `unknown_duration_legs > 0`.
    pub total_duration_days: i64,
    pub unknown_duration_legs: usize,
}

impl Trajectory {
    #[must_use]
    pub fn is_multi_encounter(&self) -> bool {
        self.encounter_count > 1
    }

    /// Legs whose end date is earlier than their start date.
    pub fn reversed_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs
            .iter()
            .filter(|leg| leg.duration_days.is_some_and(|d| d < 0))
    }
}

/// Build the trajectory for one tag from all of its events.
///
/// Events are stably sorted by recapture date, oldest first; events with no
/// recapture date go last in their input order. A single event yields one
/// encounter leg. Gap legs always contribute distance, but their duration is
/// only known when both the previous recapture date and the next banding date
/// are present. Negative durations are kept as-is and logged.
///
/// # Errors
///
/// Returns [`TrajectoryError::EmptyEventSet`] for an empty slice and
/// [`TrajectoryError::TagMismatch`] if an event belongs to another tag.
pub fn build_trajectory(
    tag_id: &str,
    events: &[CaptureEvent],
) -> Result<Trajectory, TrajectoryError> {
    if events.is_empty() {
        return Err(TrajectoryError::EmptyEventSet {
            tag_id: tag_id.to_string(),
        });
    }
    if let Some(stray) = events.iter().find(|e| e.tag_id != tag_id) {
        return Err(TrajectoryError::TagMismatch {
            expected: tag_id.to_string(),
            found: stray.tag_id.clone(),
        });
    }

    let mut sorted: Vec<&CaptureEvent> = events.iter().collect();
    sorted.sort_by_key(|e| (e.recapture_date.is_none(), e.recapture_date));

    let mut raw_points = Vec::with_capacity(sorted.len() * 2);
    let mut legs = Vec::with_capacity(sorted.len() * 2 - 1);
    let mut previous: Option<&CaptureEvent> = None;

    for event in sorted {
        raw_points.push(event.banding_point);
        raw_points.push(event.recapture_point);
        if let Some(prev) = previous {
            legs.push(Leg::gap(prev, event));
        }
        legs.push(Leg::encounter(event));
        previous = Some(event);
    }

    let total_distance_km: f64 = legs.iter().map(|l| l.distance_km).sum();
    // Unknown durations are skipped here and only here; legs keep `None`.
    let (total_duration_days, unknown_duration_legs) = legs.iter().fold(
        (0_i64, 0_usize),
        |(days, unknown), leg| match leg.duration_days {
            Some(d) => (days + d, unknown),
            None => (days, unknown + 1),
        },
    );

    let trajectory = Trajectory {
        tag_id: tag_id.to_string(),
        species: events[0].species.clone(),
        encounter_count: events.len(),
        ordered_points: dedup_points(&raw_points),
        legs,
        total_distance_km,
        total_duration_days,
        unknown_duration_legs,
    };
    for leg in trajectory.reversed_legs() {
        tracing::warn!(
            tag_id,
            kind = %leg.kind,
            duration_days = leg.duration_days,
            "leg ends before it starts; keeping negative duration"
        );
    }
    Ok(trajectory)
}

/// Drop exact coordinate repeats, keeping first-occurrence order.
///
/// No tolerance is applied: only identical `f64` pairs collapse.
#[must_use]
pub fn dedup_points(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut unique: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for point in points {
        if !unique.contains(point) {
            unique.push(*point);
        }
    }
    unique
}

/// Partition events by tag. Tags iterate in sorted order; events keep input
/// order within a tag.
#[must_use]
pub fn group_by_tag(events: Vec<CaptureEvent>) -> BTreeMap<String, Vec<CaptureEvent>> {
    let mut grouped: BTreeMap<String, Vec<CaptureEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.tag_id.clone()).or_default().push(event);
    }
    grouped
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagGroup {
    Single { tag_id: String, event: CaptureEvent },
    Multiple {
        tag_id: String,
        events: Vec<CaptureEvent>,
    },
}

impl TagGroup {
    #[must_use]
    pub fn tag_id(&self) -> &str {
        match self {
            TagGroup::Single { tag_id, .. } | TagGroup::Multiple { tag_id, .. } => tag_id,
        }
    }

    #[must_use]
    pub fn events(&self) -> &[CaptureEvent] {
        match self {
            TagGroup::Single { event, .. } => std::slice::from_ref(event),
            TagGroup::Multiple { events, .. } => events,
        }
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        matches!(self, TagGroup::Multiple { .. })
    }
}

/// Split grouped events into single- and multi-encounter tags. Nothing is dropped.
#[must_use]
pub fn classify(grouped: BTreeMap<String, Vec<CaptureEvent>>) -> Vec<TagGroup> {
    grouped
        .into_iter()
        .map(|(tag_id, mut events)| {
            if events.len() == 1 {
                let event = events.remove(0);
                TagGroup::Single { tag_id, event }
            } else {
                TagGroup::Multiple { tag_id, events }
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagFailure {
    pub tag_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// Trajectories in tag order.
    pub trajectories: Vec<Trajectory>,
    pub failures: Vec<TagFailure>,
}

/// Build a trajectory for every tag in `events`.
///
/// A tag that fails to build is logged and recorded in
/// [`BatchOutcome::failures`]; the remaining tags are still built.
#[must_use]
pub fn build_all(events: Vec<CaptureEvent>) -> BatchOutcome {
    let groups = classify(group_by_tag(events));
    let multi = groups.iter().filter(|g| g.is_multiple()).count();
    tracing::debug!(
        tags = groups.len(),
        multi_encounter = multi,
        "building trajectories"
    );

    groups
        .iter()
        .fold(BatchOutcome::default(), |mut outcome, group| {
            match build_trajectory(group.tag_id(), group.events()) {
                Ok(trajectory) => outcome.trajectories.push(trajectory),
                Err(e) => {
                    tracing::warn!(tag_id = group.tag_id(), error = %e, "skipping tag");
                    outcome.failures.push(TagFailure {
                        tag_id: group.tag_id().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
            outcome
        })
}

#[cfg(test)]
#[path = "trajectory_test.rs"]
mod tests;
