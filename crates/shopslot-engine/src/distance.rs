//! Great-circle distance between coordinates.

use shopslot_core::{Candidate, GeoPoint};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometres, rounded to one decimal place.
///
/// Symmetric, and zero for identical points. Inputs must not be NaN.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Float error can push h a hair above 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round_to_tenth(EARTH_RADIUS_KM * c)
}

/// Distance from `reference` to the candidate, if both positions are known.
#[must_use]
pub fn candidate_distance(candidate: &Candidate, reference: Option<GeoPoint>) -> Option<f64> {
    Some(distance_km(reference?, candidate.position()?))
}

/// Stamp `distance_km` on every candidate relative to `reference`.
#[must_use]
pub fn annotate_distances(
    candidates: Vec<Candidate>,
    reference: Option<GeoPoint>,
) -> Vec<Candidate> {
    candidates
        .into_iter()
        .map(|mut c| {
            c.distance_km = candidate_distance(&c, reference);
            c
        })
        .collect()
}

fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}
