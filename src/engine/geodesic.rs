//! Great-circle math on a spherical earth.

use crate::engine::models::Coordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Result of the inverse problem: distance and initial bearing from one
/// point to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverse {
    pub distance_m: f64,
    pub azimuth_deg: f64,
}

/// Great-circle distance and initial bearing between two coordinates.
pub fn inverse(from: &Coordinate, to: &Coordinate) -> Inverse {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    Inverse {
        distance_m: EARTH_RADIUS_M * c,
        azimuth_deg: y.atan2(x).to_degrees(),
    }
}

/// Solves the direct problem: the coordinate reached when traveling from
/// `from` along `azimuth_deg` for `distance_m` meters.
pub fn direct(from: &Coordinate, azimuth_deg: f64, distance_m: f64) -> Coordinate {
    let angular_dist = distance_m / EARTH_RADIUS_M;
    let bearing = azimuth_deg.to_radians();

    let lat1 = from.lat.to_radians();
    let lon1 = from.lon.to_radians();

    let lat2 =
        (lat1.sin() * angular_dist.cos() + lat1.cos() * angular_dist.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular_dist.sin() * lat1.cos())
            .atan2(angular_dist.cos() - lat1.sin() * lat2.sin());

    Coordinate {
        lat: lat2.to_degrees(),
        lon: lon2.to_degrees(),
    }
}

/// Normalizes an angle to [-180, 180).
pub fn wrap180(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a < -180.0 {
        a += 360.0;
    } else if a >= 180.0 {
        a -= 360.0;
    }
    a
}

/// Normalizes an angle to [0, 360).
pub fn wrap360(deg: f64) -> f64 {
    let mut a = deg % 360.0;
    if a < 0.0 {
        a += 360.0;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_equator_eastward() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 1.0);
        let gc = inverse(&a, &b);
        // one degree of longitude on the equator
        let expected = EARTH_RADIUS_M * 1.0_f64.to_radians();
        assert!((gc.distance_m - expected).abs() < 1.0);
        assert!((gc.azimuth_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_northward() {
        let a = Coordinate::new(45.0, -1.0);
        let b = Coordinate::new(46.0, -1.0);
        let gc = inverse(&a, &b);
        assert!((gc.azimuth_deg - 0.0).abs() < 1e-9);
        assert!((gc.distance_m - EARTH_RADIUS_M * 1.0_f64.to_radians()).abs() < 1.0);
    }

    #[test]
    fn test_direct_inverse_roundtrip() {
        let start = Coordinate::new(48.66, -2.03);
        let moved = direct(&start, 230.0, 250_000.0);
        let back = inverse(&start, &moved);
        assert!((back.distance_m - 250_000.0).abs() < 1.0);
        assert!(wrap180(back.azimuth_deg - 230.0).abs() < 1e-6);
    }

    #[test]
    fn test_direct_zero_distance() {
        let start = Coordinate::new(10.0, 20.0);
        let moved = direct(&start, 123.0, 0.0);
        assert!((moved.lat - start.lat).abs() < 1e-12);
        assert!((moved.lon - start.lon).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_angles() {
        assert_eq!(wrap180(190.0), -170.0);
        assert_eq!(wrap180(-190.0), 170.0);
        assert_eq!(wrap360(-10.0), 350.0);
        assert_eq!(wrap360(370.0), 10.0);
    }
}
