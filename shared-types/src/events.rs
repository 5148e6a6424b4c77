use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ChannelError;

pub const COORDINATES_UPDATED: &str = "coordinatesUpdated";
pub const DUSTBIN_VISITED: &str = "dustbinVisited";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoordinatesUpdated {
    #[serde(deserialize_with = "string_or_number")]
    pub vehicle_id: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

impl CoordinatesUpdated {
    /// Whether this update moves the marker of the tracked vehicle. With no
    /// vehicle selected every update is shown. Geofence checks ignore this.
    pub fn is_for(&self, vehicle_id: Option<&str>) -> bool {
        vehicle_id.map_or(true, |id| id == self.vehicle_id)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DustbinVisited {
    pub id: String,
    #[serde(default)]
    pub is_visited: bool,
    #[serde(default)]
    pub visited_timestamp: Option<DateTime<Utc>>,
}

/// Events the tracking page understands on the real-time channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    CoordinatesUpdated(CoordinatesUpdated),
    DustbinVisited(DustbinVisited),
}

impl ChannelEvent {
    /// Decodes a named event with its arguments. Events the page does not
    /// listen for yield `Ok(None)`.
    pub fn from_event(name: &str, args: &[Value]) -> Result<Option<Self>, ChannelError> {
        let payload = || {
            args.first().cloned().ok_or_else(|| ChannelError::InvalidEvent {
                event: name.to_string(),
                reason: "missing payload".to_string(),
            })
        };
        let invalid = |err: serde_json::Error| ChannelError::InvalidEvent {
            event: name.to_string(),
            reason: err.to_string(),
        };

        match name {
            COORDINATES_UPDATED => serde_json::from_value(payload()?)
                .map(|e| Some(ChannelEvent::CoordinatesUpdated(e)))
                .map_err(invalid),
            DUSTBIN_VISITED => serde_json::from_value(payload()?)
                .map(|e| Some(ChannelEvent::DustbinVisited(e)))
                .map_err(invalid),
            _ => Ok(None),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

// GPS feeds post coordinates either as numbers or as numeric strings
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => value,
        NumberOrText::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(serde::de::Error::custom)?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "coordinate {value} is not finite"
        )));
    }
    Ok(value)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
