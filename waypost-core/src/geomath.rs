//! Great-circle distance and bearing on WGS84 coordinates

use geo::Point;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points in meters
///
/// Symmetric, zero for identical points. Non-finite input is the
/// caller's responsibility.
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let d_lat = (b.y() - a.y()).to_radians();
    let d_lng = (b.x() - a.x()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.y().to_radians().cos() * b.y().to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial bearing from `from` towards `to` in degrees, [0, 360)
pub fn bearing(from: Point<f64>, to: Point<f64>) -> f64 {
    let d_lng = (to.x() - from.x()).to_radians();
    let lat1 = from.y().to_radians();
    let lat2 = to.y().to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric() {
        let a = Point::new(-0.1278, 51.5074);
        let b = Point::new(-1.2577, 51.7520);
        assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = Point::new(13.4050, 52.5200);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 1.0);
        let d = haversine_distance(a, b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn bearing_follows_cardinal_directions() {
        let origin = Point::new(0.0, 0.0);
        assert!((bearing(origin, Point::new(0.0, 1.0)) - 0.0).abs() < 1e-9);
        assert!((bearing(origin, Point::new(1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(origin, Point::new(0.0, -1.0)) - 180.0).abs() < 1e-9);
        assert!((bearing(origin, Point::new(-1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_stays_in_range() {
        let origin = Point::new(10.0, 45.0);
        for (x, y) in [(9.0, 44.0), (11.0, 46.0), (9.5, 45.5), (10.5, 44.5)] {
            let b = bearing(origin, Point::new(x, y));
            assert!((0.0..360.0).contains(&b), "bearing {b} out of range");
        }
    }
}
