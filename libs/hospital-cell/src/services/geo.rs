use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the great-circle distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Haversine distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = GeoPoint::new(38.4237, 27.1428);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_known_distance_istanbul_ankara() {
        let istanbul = GeoPoint::new(41.0082, 28.9784);
        let ankara = GeoPoint::new(39.9334, 32.8597);

        let d = haversine_km(istanbul, ankara);
        assert!((d - 350.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_symmetric() {
        let izmir = GeoPoint::new(38.4237, 27.1428);
        let antalya = GeoPoint::new(36.8969, 30.7133);
        assert!((haversine_km(izmir, antalya) - haversine_km(antalya, izmir)).abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_point_validation() {
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -181.0).is_valid());
    }
}
