use serde::{Deserialize, Serialize};

use crate::config::EARTH_RADIUS_KM;

/// A waypoint in degrees. Persisted as a `[lat, long]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Coordinate::new(latitude, longitude)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(coordinate: Coordinate) -> Self {
        [coordinate.latitude, coordinate.longitude]
    }
}

/// Great-circle distance in kilometers between two waypoints, rounded to
/// two decimals (spherical law of cosines).
pub fn distance_between(p1: &Coordinate, p2: &Coordinate) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let long1 = p1.longitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let long2 = p2.longitude.to_radians();

    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (long1 - long2).cos();

    // Rounding can push the cosine of a zero angle past 1.0.
    let angle = cos_angle.clamp(-1.0, 1.0).acos();

    round_to_hundredths(angle * EARTH_RADIUS_KM)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE_KM: f64 = 0.011;

    #[test]
    fn identical_points_are_zero_apart() {
        for point in [
            Coordinate::new(33.55, 33.0),
            Coordinate::new(0.0, 0.0),
            Coordinate::new(-89.9, 179.9),
            Coordinate::new(51.4775, -0.4614),
        ] {
            let distance = distance_between(&point, &point);
            assert_eq!(distance, 0.0, "{:?}", point);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(60.0, 53.0);
        let b = Coordinate::new(67.0, 28.0);

        assert_eq!(distance_between(&a, &b), distance_between(&b, &a));
    }

    #[test]
    fn known_leg_distances() {
        let cases = [
            ((33.55, 33.0), (37.0, 24.0), 902.31),
            ((37.0, 24.0), (43.0, 45.0), 1903.39),
            ((33.0, 33.0), (37.0, 24.0), 932.32),
            ((60.0, 53.0), (67.0, 28.0), 1449.57),
        ];

        for ((lat1, long1), (lat2, long2), expected) in cases {
            let distance =
                distance_between(&Coordinate::new(lat1, long1), &Coordinate::new(lat2, long2));
            assert!(
                (distance - expected).abs() < TOLERANCE_KM,
                "expected {} got {}",
                expected,
                distance
            );
        }
    }

    #[test]
    fn antipodal_points_are_half_a_circumference_apart() {
        let distance = distance_between(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 180.0));

        assert!((distance - 20020.73).abs() < TOLERANCE_KM);
    }

    #[test]
    fn distance_is_rounded_to_two_decimals() {
        let distance = distance_between(&Coordinate::new(10.0, 10.0), &Coordinate::new(10.5, 10.3));

        assert_eq!(distance, (distance * 100.0).round() / 100.0);
    }

    #[test]
    fn coordinate_is_a_json_pair() {
        let coordinate: Coordinate = serde_json::from_str("[33.55, 33]").unwrap();

        assert_eq!(coordinate, Coordinate::new(33.55, 33.0));
        assert_eq!(serde_json::to_string(&coordinate).unwrap(), "[33.55,33.0]");
    }

    #[test]
    fn coordinate_with_wrong_arity_is_rejected() {
        assert!(serde_json::from_str::<Coordinate>("[1.0]").is_err());
        assert!(serde_json::from_str::<Coordinate>("[1.0, 2.0, 3.0]").is_err());
    }

    #[test]
    fn coordinate_ranges() {
        assert!(Coordinate::new(90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.1, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
