//! Geographic points and great-circle distance.

/// Mean earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Radius used by proximity search when the caller gives none.
pub const DEFAULT_RADIUS_M: f64 = 5000.0;

/// A WGS84 point.
///
/// Stores keep points in (x, y) = (longitude, latitude) order, so the only
/// constructor takes arguments in that order, the same as `ST_MakePoint`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self {
            longitude: x,
            latitude: y,
        }
    }

    pub fn x(&self) -> f64 {
        self.longitude
    }

    pub fn y(&self) -> f64 {
        self.latitude
    }

    /// Haversine distance in meters on a sphere of radius [`EARTH_RADIUS_M`].
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.latitude.to_radians();
        let phi2 = other.latitude.to_radians();
        let d_phi = (other.latitude - self.latitude).to_radians();
        let d_lambda = (other.longitude - self.longitude).to_radians();

        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meters_per_degree() -> f64 {
        2.0 * std::f64::consts::PI * EARTH_RADIUS_M / 360.0
    }

    #[test]
    fn constructor_takes_longitude_first() {
        let p = GeoPoint::from_xy(36.8219, -1.2921);
        assert_eq!(p.longitude, 36.8219);
        assert_eq!(p.latitude, -1.2921);
        assert_eq!(p.x(), 36.8219);
        assert_eq!(p.y(), -1.2921);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::from_xy(36.8219, -1.2921);
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn one_degree_along_a_meridian() {
        let a = GeoPoint::from_xy(36.0, 0.0);
        let b = GeoPoint::from_xy(36.0, 1.0);
        assert!((a.distance_to(&b) - meters_per_degree()).abs() < 1e-6);
    }

    #[test]
    fn distance_is_symmetric() {
        let nairobi = GeoPoint::from_xy(36.8219, -1.2921);
        let mombasa = GeoPoint::from_xy(39.6682, -4.0435);
        let there = nairobi.distance_to(&mombasa);
        let back = mombasa.distance_to(&nairobi);
        assert!((there - back).abs() < 1e-6);
        // Roughly 440 km apart.
        assert!(there > 430_000.0 && there < 450_000.0, "got {}", there);
    }

    #[test]
    fn antipodes_do_not_overflow() {
        let a = GeoPoint::from_xy(0.0, 0.0);
        let b = GeoPoint::from_xy(180.0, 0.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((a.distance_to(&b) - half_circumference).abs() < 1e-3);
    }
}
