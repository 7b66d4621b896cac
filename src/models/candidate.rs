use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssignError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Rejects non-finite values and anything outside lat [-90, 90], lng [-180, 180].
    pub fn validate(&self) -> Result<(), AssignError> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);

        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(AssignError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

/// An assignable resource. Owned by the caller; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub location: Coordinate,
    pub workload: u32,
    pub capacity: u32,
    pub active: bool,
}

impl Candidate {
    pub fn new(id: Uuid, name: impl Into<String>, location: Coordinate, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            workload: 0,
            capacity,
            active: true,
        }
    }

    pub fn with_workload(mut self, workload: u32) -> Self {
        self.workload = workload;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn validate(&self) -> Result<(), AssignError> {
        self.location.validate()?;

        if self.capacity == 0 {
            return Err(AssignError::InvalidCapacity {
                resource_id: self.id,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use uuid::Uuid;

    use super::{Candidate, Coordinate};
    use crate::error::AssignError;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(90.0, 180.0)]
    #[case(-90.0, -180.0)]
    #[case(28.6139, 77.2090)]
    fn accepts_in_range_coordinates(#[case] lat: f64, #[case] lng: f64) {
        assert!(Coordinate::new(lat, lng).validate().is_ok());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 180.1)]
    #[case(f64::NAN, 0.0)]
    #[case(0.0, f64::INFINITY)]
    fn rejects_out_of_range_or_non_numeric_coordinates(#[case] lat: f64, #[case] lng: f64) {
        assert!(matches!(
            Coordinate::new(lat, lng).validate(),
            Err(AssignError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let candidate = Candidate::new(Uuid::new_v4(), "empty", Coordinate::new(1.0, 1.0), 0);
        assert!(matches!(
            candidate.validate(),
            Err(AssignError::InvalidCapacity { .. })
        ));
    }
}
