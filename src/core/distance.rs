//! Great-circle distance on a spherical Earth.

use crate::domain::model::GeoPoint;

/// Mean Earth radius in statute miles. Both the distance and the bounding box
/// calculations use this single constant.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Haversine distance between `a` and `b`, in miles.
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    EARTH_RADIUS_MILES * central_angle(a, b)
}

/// Angle subtended at the Earth's center by `a` and `b`, in radians.
pub fn central_angle(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push h a hair outside [0, 1] near the poles and antipodes
    let h = h.clamp(0.0, 1.0);

    2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}
