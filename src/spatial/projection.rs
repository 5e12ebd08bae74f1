//! Spherical Web Mercator (EPSG:3857) forward and inverse projection.
//!
//! Distances are measured in projected meters. Web Mercator stretches lengths
//! by `1 / cos(lat)`, so absolute values overstate ground distance away from
//! the equator; thresholds are expressed in the same projected meters.

use geo::Point;

/// Sphere radius used by EPSG:3857.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude at which the projected square ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Half-width of the projected square in meters.
pub const MAX_EXTENT_M: f64 = EARTH_RADIUS_M * std::f64::consts::PI;

/// Project WGS84 lon/lat degrees to Web Mercator meters.
pub fn project(lon: f64, lat: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS_M * lon.to_radians();
    let y = EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Point::new(x, y)
}

/// Inverse of [`project`]: Web Mercator meters to WGS84 lon/lat degrees.
pub fn unproject(x: f64, y: f64) -> Point<f64> {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    Point::new(lon, lat)
}
