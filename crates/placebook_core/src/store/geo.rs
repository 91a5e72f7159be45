//! Great-circle distance and calendar week helpers.

use crate::model::GeoPoint;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates in kilometres.
pub fn distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = ((d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2))
        .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Returns midnight (in `now`'s own timezone) of the most recent `first_day`,
/// which is today when `now` already falls on `first_day`.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>, first_day: Weekday) -> DateTime<Utc> {
    let today = now.date_naive();
    let days_back = (7 + today.weekday().num_days_from_monday()
        - first_day.num_days_from_monday())
        % 7;
    let start_date = today - Duration::days(i64::from(days_back));

    let Some(midnight) = start_date.and_hms_opt(0, 0, 0) else {
        return now.with_timezone(&Utc);
    };
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump; fall back to the naive instant.
        None => Utc.from_utc_datetime(&midnight),
    }
}
