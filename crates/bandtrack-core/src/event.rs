//! Capture events: one banding and one later encounter of a tagged bird.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Returns `None` for non-finite or out-of-range coordinates.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

/// A coordinate-complete capture record, ready for trajectory reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureEvent {
    pub tag_id: String,
    pub species: String,
    pub banding_point: GeoPoint,
    pub banding_date: Option<NaiveDate>,
    /// Location label such as an ISO subdivision code (`US-PA`).
    pub banding_label: Option<String>,
    pub recapture_point: GeoPoint,
    pub recapture_date: Option<NaiveDate>,
    pub recapture_label: Option<String>,
}

/// A capture record as it arrives from ingestion: any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCaptureRecord {
    pub tag_id: Option<String>,
    pub species: Option<String>,
    pub banding_lat: Option<f64>,
    pub banding_lon: Option<f64>,
    pub banding_date: Option<String>,
    pub banding_label: Option<String>,
    pub recapture_lat: Option<f64>,
    pub recapture_lon: Option<f64>,
    pub recapture_date: Option<String>,
    pub recapture_label: Option<String>,
}

impl RawCaptureRecord {
    /// Convert into a [`CaptureEvent`].
    ///
    /// Returns `None` when the tag is blank or either coordinate pair is
    /// missing or out of range. Unparseable dates are kept as `None` rather
    /// than rejecting the record.
    #[must_use]
    pub fn into_event(self) -> Option<CaptureEvent> {
        let tag_id = non_blank(self.tag_id)?;
        let banding_point = GeoPoint::new(self.banding_lat?, self.banding_lon?)?;
        let recapture_point = GeoPoint::new(self.recapture_lat?, self.recapture_lon?)?;

        Some(CaptureEvent {
            tag_id,
            species: non_blank(self.species).unwrap_or_default(),
            banding_point,
            banding_date: self.banding_date.as_deref().and_then(parse_event_date),
            banding_label: non_blank(self.banding_label),
            recapture_point,
            recapture_date: self.recapture_date.as_deref().and_then(parse_event_date),
            recapture_label: non_blank(self.recapture_label),
        })
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a banding or encounter date.
///
/// Accepts ISO dates, US-style `MM/DD/YYYY`, `YYYY/MM/DD`, and ISO
/// datetimes (the time part is dropped). Returns `None` for anything else.
#[must_use]
pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_record() -> RawCaptureRecord {
        RawCaptureRecord {
            tag_id: Some("2100-12345".to_string()),
            species: Some("Selasphorus rufus".to_string()),
            banding_lat: Some(40.0),
            banding_lon: Some(-75.0),
            banding_date: Some("2020-01-01".to_string()),
            banding_label: Some("US-PA".to_string()),
            recapture_lat: Some(41.0),
            recapture_lon: Some(-74.0),
            recapture_date: Some("2020-01-10".to_string()),
            recapture_label: Some("US-NY".to_string()),
        }
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(90.5, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -180.5).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
        assert!(GeoPoint::new(-90.0, 180.0).is_some());
    }

    #[test]
    fn geo_point_display_uses_four_decimals() {
        let p = GeoPoint::new(40.0, -75.123_456).unwrap();
        assert_eq!(p.to_string(), "(40.0000, -75.1235)");
    }

    #[test]
    fn parse_event_date_iso() {
        assert_eq!(
            parse_event_date("2020-06-15"),
            NaiveDate::from_ymd_opt(2020, 6, 15)
        );
    }

    #[test]
    fn parse_event_date_us_style() {
        assert_eq!(
            parse_event_date("06/15/2020"),
            NaiveDate::from_ymd_opt(2020, 6, 15)
        );
    }

    #[test]
    fn parse_event_date_keeps_date_of_datetime() {
        assert_eq!(
            parse_event_date("2020-06-15 23:59:00"),
            NaiveDate::from_ymd_opt(2020, 6, 15)
        );
        assert_eq!(
            parse_event_date("2020-06-15T01:00:00"),
            NaiveDate::from_ymd_opt(2020, 6, 15)
        );
    }

    #[test]
    fn parse_event_date_malformed_is_none() {
        assert_eq!(parse_event_date("2020-13-45"), None);
        assert_eq!(parse_event_date("last spring"), None);
        assert_eq!(parse_event_date("  "), None);
    }

    #[test]
    fn into_event_complete_record() {
        let event = complete_record().into_event().expect("record is complete");
        assert_eq!(event.tag_id, "2100-12345");
        assert_eq!(Some(event.banding_point), GeoPoint::new(40.0, -75.0));
        assert_eq!(event.recapture_date, NaiveDate::from_ymd_opt(2020, 1, 10));
        assert_eq!(event.recapture_label.as_deref(), Some("US-NY"));
    }

    #[test]
    fn into_event_missing_coordinate_is_filtered() {
        let mut record = complete_record();
        record.recapture_lon = None;
        assert!(record.into_event().is_none());

        let mut record = complete_record();
        record.banding_lat = None;
        assert!(record.into_event().is_none());
    }

    #[test]
    fn into_event_blank_tag_is_filtered() {
        let mut record = complete_record();
        record.tag_id = Some("   ".to_string());
        assert!(record.into_event().is_none());
    }

    #[test]
    fn into_event_malformed_date_becomes_none() {
        let mut record = complete_record();
        record.banding_date = Some("not a date".to_string());
        let event = record.into_event().expect("dates never reject a record");
        assert!(event.banding_date.is_none());
        assert!(event.recapture_date.is_some());
    }
}
