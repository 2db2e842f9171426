//! Radius-to-rectangle conversion used to pre-filter candidates with a cheap range scan.

use crate::core::distance::EARTH_RADIUS_MILES;
use crate::domain::model::{BoundingBox, GeoPoint};
use crate::utils::validation::{MAX_LONGITUDE, MIN_LONGITUDE};
use std::f64::consts::FRAC_PI_2;

/// Latitude/longitude rectangle covering every point within `radius_miles` of `center`.
///
/// The box is a superset of the circle: corners lie outside the radius, and the
/// longitude span widens away from the equator. Where the longitude formula leaves
/// the domain of `asin` (near a pole, or for a radius spanning a quarter of the
/// globe) the ratio saturates at 1 and the box takes the full longitude range instead.
/// Latitude bounds are not clipped to the poles.
pub fn bounding_box(center: GeoPoint, radius_miles: f64) -> BoundingBox {
    let angular_radius = radius_miles / EARTH_RADIUS_MILES;

    // offsetting in degrees keeps a zero radius exactly on the center
    let delta_lat = angular_radius.to_degrees();
    let min_lat = center.latitude - delta_lat;
    let max_lat = center.latitude + delta_lat;

    let (min_lon, max_lon) = match longitude_delta(center.latitude.to_radians(), angular_radius) {
        Some(delta_lon) => (center.longitude - delta_lon, center.longitude + delta_lon),
        None => {
            tracing::debug!(
                latitude = center.latitude,
                radius_miles,
                "longitude span saturated, using the full longitude range"
            );
            (MIN_LONGITUDE, MAX_LONGITUDE)
        }
    };

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Half-width of the box in degrees of longitude, or `None` when it covers every meridian.
fn longitude_delta(lat: f64, angular_radius: f64) -> Option<f64> {
    if angular_radius >= FRAC_PI_2 {
        return None;
    }

    let ratio = angular_radius.sin() / lat.cos();
    if !ratio.is_finite() || ratio.abs() >= 1.0 {
        return None;
    }

    Some(ratio.asin().to_degrees())
}
