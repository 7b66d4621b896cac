use crate::models::candidate::{Candidate, Coordinate};

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Multiplier from straight-line distance to an estimated road distance.
pub const ROAD_DISTANCE_FACTOR: f64 = 1.3;

pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    // Rounding can push this a hair past 1.0 for antipodal points.
    let haversine = (sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng).min(1.0);
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

pub fn road_distance_estimate(straight_line_km: f64) -> f64 {
    straight_line_km * ROAD_DISTANCE_FACTOR
}

#[derive(Debug, Clone)]
pub struct NearbyCandidate<'a> {
    pub candidate: &'a Candidate,
    pub distance_km: f64,
}

/// Active candidates within `radius_km` of `origin`, in input order.
///
/// Every matching path filters through this, so the eligible set is the same
/// for scoring, the naive comparison and [`nearby_candidates`].
pub fn eligible_candidates<'a>(
    origin: Coordinate,
    candidates: &'a [Candidate],
    radius_km: f64,
) -> impl Iterator<Item = NearbyCandidate<'a>> {
    candidates
        .iter()
        .filter(|candidate| candidate.active)
        .map(move |candidate| NearbyCandidate {
            candidate,
            distance_km: haversine_km(&origin, &candidate.location),
        })
        .filter(move |entry| entry.distance_km <= radius_km)
}

/// Same set as [`eligible_candidates`], closest first.
///
/// The sort is stable, so candidates at the same distance keep input order.
pub fn nearby_candidates<'a>(
    origin: &Coordinate,
    candidates: &'a [Candidate],
    radius_km: f64,
) -> Vec<NearbyCandidate<'a>> {
    let mut nearby: Vec<NearbyCandidate<'a>> =
        eligible_candidates(*origin, candidates, radius_km).collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::{eligible_candidates, haversine_km, nearby_candidates, road_distance_estimate};
    use crate::models::candidate::{Candidate, Coordinate};

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate::new(28.6139, 77.2090);
        assert_eq!(haversine_km(&p, &p), 0.0);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);
        let distance = haversine_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let distance = haversine_km(&a, &b);
        assert!(distance.is_finite());
        assert!((distance - 20_015.0).abs() < 1.0);
    }

    #[test]
    fn road_estimate_applies_fixed_factor() {
        assert_eq!(road_distance_estimate(0.0), 0.0);
        assert_eq!(road_distance_estimate(10.0), 10.0 * 1.3);
    }

    #[test]
    fn nearby_candidates_are_sorted_and_filtered() {
        let origin = Coordinate::new(28.6139, 77.2090);
        let far = Candidate::new(Uuid::from_u128(1), "far", Coordinate::new(28.70, 77.30), 100);
        let near = Candidate::new(Uuid::from_u128(2), "near", Coordinate::new(28.62, 77.21), 100);
        let off = Candidate::new(Uuid::from_u128(3), "off", Coordinate::new(28.614, 77.209), 100)
            .inactive();
        let outside = Candidate::new(Uuid::from_u128(4), "outside", Coordinate::new(30.0, 79.0), 100);
        let candidates = vec![far, near, off, outside];

        let nearby = nearby_candidates(&origin, &candidates, 20.0);
        let names: Vec<&str> = nearby.iter().map(|n| n.candidate.name.as_str()).collect();

        assert_eq!(names, vec!["near", "far"]);
        assert!(nearby[0].distance_km <= nearby[1].distance_km);
    }

    #[test]
    fn eligible_candidates_keep_input_order_and_radius_is_inclusive() {
        let origin = Coordinate::new(0.0, 0.0);
        let edge = Coordinate::new(0.0, 0.1);
        let radius = haversine_km(&origin, &edge);
        let candidates = vec![
            Candidate::new(Uuid::from_u128(1), "edge", edge, 100),
            Candidate::new(Uuid::from_u128(2), "closed", Coordinate::new(0.0, 0.01), 100).inactive(),
            Candidate::new(Uuid::from_u128(3), "close", Coordinate::new(0.0, 0.02), 100),
            Candidate::new(Uuid::from_u128(4), "beyond", Coordinate::new(0.0, 0.2), 100),
        ];

        let names: Vec<&str> = eligible_candidates(origin, &candidates, radius)
            .map(|n| n.candidate.name.as_str())
            .collect();

        assert_eq!(names, vec!["edge", "close"]);
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
    }

    proptest! {
        #[test]
        fn haversine_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_km(&a, &b);
            let ba = haversine_km(&b, &a);
            prop_assert!((ab - ba).abs() <= 1e-9 * ab.max(1.0));
        }

        #[test]
        fn haversine_is_zero_on_identity(a in coordinate()) {
            prop_assert_eq!(haversine_km(&a, &a), 0.0);
        }

        #[test]
        fn road_estimate_is_exact_multiple(d in 0.0f64..20_000.0) {
            prop_assert_eq!(road_distance_estimate(d), 1.3 * d);
        }
    }
}
