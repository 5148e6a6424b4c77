use serde::{Deserialize, Serialize};

use crate::geofence::Geofence;

pub const DEFAULT_SOCKET_URL: &str = "https://production-backend-3olq.onrender.com";

/// Settings the browser needs to follow a vehicle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrackingConfig {
    pub socket_url: String,
    pub geofence: Geofence,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        TrackingConfig {
            socket_url: DEFAULT_SOCKET_URL.to_string(),
            geofence: Geofence::default(),
        }
    }
}
