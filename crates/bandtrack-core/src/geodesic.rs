//! Distance and duration primitives shared by every leg computation.

use chrono::NaiveDate;
use geo::{Distance, Geodesic, Point};

use crate::event::GeoPoint;

const METERS_PER_KM: f64 = 1000.0;

/// Geodesic distance on the WGS-84 ellipsoid, in kilometres.
///
/// The pair is put in a canonical order before solving so the result is
/// bit-for-bit symmetric.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    if a == b {
        return 0.0;
    }
    let (first, second) = if (a.lat, a.lon) <= (b.lat, b.lon) {
        (a, b)
    } else {
        (b, a)
    };
    let origin = Point::new(first.lon, first.lat);
    let destination = Point::new(second.lon, second.lat);
    Geodesic::distance(origin, destination) / METERS_PER_KM
}

/// Whole calendar days from `from` to `to`, or `None` if either date is unknown.
///
/// The result is signed: a `to` earlier than `from` gives a negative count.
#[must_use]
pub fn duration_days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<i64> {
    Some((to? - from?).num_days())
}
