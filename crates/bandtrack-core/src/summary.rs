//! Plain-text summaries of a trajectory for map popups and terminal output.

use serde::Serialize;

use crate::event::GeoPoint;
use crate::trajectory::{Leg, LegKind, Trajectory};

const NA: &str = "NA";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegSummary {
    pub kind: LegKind,
    /// `"{from} to {to}"`; an unknown side is left blank.
    pub date_range: String,
    pub from_label: String,
    pub to_label: String,
    pub distance_km: f64,
    pub duration_days: Option<i64>,
}

impl LegSummary {
    fn from_leg(leg: &Leg) -> Self {
        Self {
            kind: leg.kind,
            date_range: date_range(leg),
            from_label: location_label(leg.from_label.as_deref(), leg.from),
            to_label: location_label(leg.to_label.as_deref(), leg.to),
            distance_km: leg.distance_km,
            duration_days: leg.duration_days,
        }
    }
}

impl std::fmt::Display for LegSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} -> {}, {:.1} km, ",
            self.date_range, self.from_label, self.to_label, self.distance_km
        )?;
        match self.duration_days {
            Some(days) => write!(f, "{days} days"),
            None => f.write_str(NA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub tag_id: String,
    pub legs: Vec<LegSummary>,
    pub total_distance_km: f64,
    pub total_duration_days: i64,
}

impl TrajectorySummary {
    /// One line per leg followed by the distance and duration trailers.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.legs.iter().map(ToString::to_string).collect();
        lines.push(format!(
            "Total distance: {:.1} km",
            self.total_distance_km
        ));
        lines.push(format!(
            "Total duration: {} days",
            self.total_duration_days
        ));
        lines
    }
}

#[must_use]
pub fn summarize(trajectory: &Trajectory) -> TrajectorySummary {
    TrajectorySummary {
        tag_id: trajectory.tag_id.clone(),
        legs: trajectory.legs.iter().map(LegSummary::from_leg).collect(),
        total_distance_km: trajectory.total_distance_km,
        total_duration_days: trajectory.total_duration_days,
    }
}

fn date_range(leg: &Leg) -> String {
    match (leg.from_date, leg.to_date) {
        (None, None) => String::new(),
        (from, to) => {
            let side = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
            format!("{} to {}", side(from), side(to))
        }
    }
}

fn location_label(label: Option<&str>, point: GeoPoint) -> String {
    label.map_or_else(|| point.to_string(), ToString::to_string)
}
