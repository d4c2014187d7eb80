//! Great-circle distance between coordinate pairs.

use talent_map_location_models::Coordinates;

/// Mean Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Haversine distance between two points, in miles.
///
/// Good to well under a mile at city scale, which is all the radius
/// search needs.
#[must_use]
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAN_FRANCISCO: Coordinates = Coordinates {
        lat: 37.7749,
        lon: -122.4194,
    };
    const OAKLAND: Coordinates = Coordinates {
        lat: 37.8044,
        lon: -122.2712,
    };

    #[test]
    fn san_francisco_to_oakland_is_about_eight_miles() {
        let miles = haversine_miles(SAN_FRANCISCO, OAKLAND);
        assert!((8.0..9.0).contains(&miles), "got {miles}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert!(haversine_miles(OAKLAND, OAKLAND).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_miles(SAN_FRANCISCO, OAKLAND);
        let back = haversine_miles(OAKLAND, SAN_FRANCISCO);
        assert!((there - back).abs() < 1e-9);
    }
}
