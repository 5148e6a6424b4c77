use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::events::DustbinVisited;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct LatLong {
    pub lat: f64,
    pub long: f64,
}

/// GeoJSON point as stored by the backend, `[longitude, latitude]`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn lat(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn long(&self) -> f64 {
        self.coordinates[0]
    }
}

impl From<GeoPoint> for LatLong {
    fn from(point: GeoPoint) -> Self {
        LatLong {
            lat: point.lat(),
            long: point.long(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dustbin {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub is_visited: bool,
    #[serde(default)]
    pub visited_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Area {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dustbins: Vec<Dustbin>,
}

impl Area {
    /// Folds a visit event into the matching dustbin.
    /// Returns `false` when no dustbin carries the event's id.
    pub fn apply_visit(&mut self, visit: &DustbinVisited) -> bool {
        match self.dustbins.iter_mut().find(|d| d.id == visit.id) {
            Some(dustbin) => {
                dustbin.is_visited = visit.is_visited;
                dustbin.visited_timestamp = visit.visited_timestamp;
                true
            }
            None => false,
        }
    }

    pub fn visited_count(&self) -> usize {
        self.dustbins.iter().filter(|d| d.is_visited).count()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
}

impl Driver {
    pub fn phone_display(&self) -> String {
        self.phone_numbers.join(", ")
    }
}

/// Area and driver snapshot produced by one successful load.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrackingData {
    pub area: Area,
    pub driver: Driver,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

// Older driver records store a single phone string instead of a list
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(phone)) => vec![phone],
        Some(OneOrMany::Many(phones)) => phones,
    })
}
