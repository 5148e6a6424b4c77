use serde::{Deserialize, Serialize};

use crate::events::CoordinatesUpdated;

pub const DEFAULT_TARGET_LAT: f64 = 23.2057;
pub const DEFAULT_TARGET_LONG: f64 = 87.0286;
pub const DEFAULT_PRECISION: u32 = 4;
const MAX_PRECISION: u32 = 9;

/// Collection point the vehicle leaves from and returns to. Coordinates are
/// compared after rounding both sides to `precision` decimal places.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Geofence {
    pub lat: f64,
    pub long: f64,
    pub precision: u32,
}

impl Default for Geofence {
    fn default() -> Self {
        Geofence {
            lat: DEFAULT_TARGET_LAT,
            long: DEFAULT_TARGET_LONG,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl Geofence {
    pub fn contains(&self, lat: f64, long: f64) -> bool {
        if !lat.is_finite() || !long.is_finite() {
            return false;
        }
        self.scaled(lat) == self.scaled(self.lat) && self.scaled(long) == self.scaled(self.long)
    }

    fn scaled(&self, value: f64) -> i64 {
        let factor = 10f64.powi(self.precision.min(MAX_PRECISION) as i32);
        (value * factor).round() as i64
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Departure,
    Arrival,
}

impl Milestone {
    pub fn title(&self) -> &'static str {
        match self {
            Milestone::Departure => "Garbage Vehicle Out of Collection Point",
            Milestone::Arrival => "Garbage Vehicle Successfully Reached Endpoint",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Milestone::Departure => {
                "The garbage vehicle has left the collection point to start collecting garbage."
            }
            Milestone::Arrival => "The garbage vehicle has successfully reached the endpoint.",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Milestone::Departure => "Departure",
            Milestone::Arrival => "Arrival",
        }
    }
}

/// Turns the stream of coordinates into at most one departure and one arrival.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeofenceTracker {
    geofence: Geofence,
    departed: bool,
    arrived: bool,
}

impl GeofenceTracker {
    pub fn new(geofence: Geofence) -> Self {
        GeofenceTracker {
            geofence,
            departed: false,
            arrived: false,
        }
    }

    pub fn geofence(&self) -> Geofence {
        self.geofence
    }

    pub fn departed(&self) -> bool {
        self.departed
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    /// Records a coordinate. The first match inside the geofence is the
    /// departure, the second is the arrival, and later matches are ignored.
    pub fn observe(&mut self, update: &CoordinatesUpdated) -> Option<Milestone> {
        if !self.geofence.contains(update.latitude, update.longitude) {
            return None;
        }

        if !self.departed {
            self.departed = true;
            Some(Milestone::Departure)
        } else if !self.arrived {
            self.arrived = true;
            Some(Milestone::Arrival)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, long: f64) -> CoordinatesUpdated {
        CoordinatesUpdated {
            vehicle_id: "WB-01".to_string(),
            latitude: lat,
            longitude: long,
        }
    }

    #[test]
    fn test_rounding_to_four_places() {
        let fence = Geofence::default();
        assert!(fence.contains(23.2057, 87.0286));
        assert!(fence.contains(23.20574, 87.02864));
        assert!(!fence.contains(23.20576, 87.0286));
        assert!(!fence.contains(23.2058, 87.0286));
        assert!(!fence.contains(23.2057, 87.0287));
    }

    #[test]
    fn test_non_finite_coordinates_never_match() {
        let fence = Geofence {
            lat: 0.0,
            long: 0.0,
            precision: 4,
        };
        assert!(fence.contains(0.0, 0.0));
        assert!(!fence.contains(f64::NAN, f64::NAN));
        assert!(!fence.contains(0.0, f64::INFINITY));

        let mut tracker = GeofenceTracker::new(fence);
        assert_eq!(tracker.observe(&at(f64::NAN, 0.0)), None);
        assert!(!tracker.departed());
    }

    #[test]
    fn test_custom_precision_widens_the_fence() {
        let fence = Geofence {
            lat: 12.97,
            long: 77.59,
            precision: 2,
        };
        assert!(fence.contains(12.9712, 77.5949));
        assert!(!fence.contains(12.9812, 77.5949));
    }

    #[test]
    fn test_first_match_is_departure() {
        let mut tracker = GeofenceTracker::default();
        assert_eq!(tracker.observe(&at(22.0, 88.0)), None);
        assert!(!tracker.departed());

        assert_eq!(tracker.observe(&at(23.2057, 87.0286)), Some(Milestone::Departure));
        assert!(tracker.departed());
        assert!(!tracker.arrived());
    }

    #[test]
    fn test_second_match_is_arrival_and_later_matches_are_ignored() {
        let mut tracker = GeofenceTracker::default();
        tracker.observe(&at(23.2057, 87.0286));
        assert_eq!(tracker.observe(&at(23.1, 87.1)), None);
        assert_eq!(tracker.observe(&at(23.2057, 87.0286)), Some(Milestone::Arrival));
        assert!(tracker.arrived());

        assert_eq!(tracker.observe(&at(23.2057, 87.0286)), None);
        assert!(tracker.departed() && tracker.arrived());
    }

    #[test]
    fn test_milestone_copy_matches_backend_titles() {
        assert_eq!(
            Milestone::Departure.title(),
            "Garbage Vehicle Out of Collection Point"
        );
        assert_eq!(
            Milestone::Arrival.message(),
            "The garbage vehicle has successfully reached the endpoint."
        );
    }
}
