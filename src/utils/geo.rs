const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two WGS84 points, in meters.
pub fn distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert_eq!(distance_m(25.0339, 121.5645, 25.0339, 121.5645), 0.0);
    }

    #[test]
    fn short_distance_is_accurate() {
        // ~111m per 0.001 degree of latitude
        let d = distance_m(25.0339, 121.5645, 25.0349, 121.5645);
        assert!((d - 111.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn known_city_pair() {
        // Taipei 101 to Taipei Main Station, roughly 5.2km
        let d = distance_m(25.0339, 121.5645, 25.0478, 121.5170);
        assert!((4_800.0..5_600.0).contains(&d), "got {d}");
    }
}
