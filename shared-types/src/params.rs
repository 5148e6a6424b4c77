use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

pub const AREA_ID: &str = "areaId";
pub const DRIVER_ID: &str = "driverId";
pub const VEHICLE_ID: &str = "vehicleId";

// Links are produced by browsers' btoa, but hand-edited links often lose the padding
const PARAM_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes one base64 query value. Empty, malformed or non UTF-8 input yields `None`.
pub fn decode_param(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let bytes = PARAM_ENGINE.decode(value).ok()?;
    String::from_utf8(bytes).ok().filter(|decoded| !decoded.is_empty())
}

pub fn encode_param(value: &str) -> String {
    PARAM_ENGINE.encode(value.as_bytes())
}

/// Identifiers carried in the tracking page link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingParams {
    pub area_id: Option<String>,
    pub driver_id: Option<String>,
    pub vehicle_id: Option<String>,
}

impl TrackingParams {
    /// Builds the params from already percent-decoded query values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).as_deref().and_then(decode_param);
        TrackingParams {
            area_id: read(AREA_ID),
            driver_id: read(DRIVER_ID),
            vehicle_id: read(VEHICLE_ID),
        }
    }

    /// Parses a raw query string such as `?areaId=...&driverId=...`.
    /// The first occurrence of a repeated key wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<(String, String)> = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (form_decode(key), form_decode(value))
            })
            .collect();

        Self::from_lookup(|name| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        })
    }

    pub fn has_target(&self) -> bool {
        self.area_id.is_some() || self.driver_id.is_some()
    }

    /// Checks that a load may be attempted at all. A link without any
    /// identifier is rejected before the token is looked at. Nothing here
    /// touches the network.
    pub fn authorize(&self, token: Option<String>) -> Result<LoadRequest, LoadError> {
        if !self.has_target() {
            return Err(LoadError::InvalidIdentifier);
        }
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(LoadError::MissingCredential)?;

        Ok(LoadRequest {
            area_id: self.area_id.clone(),
            driver_id: self.driver_id.clone(),
            token,
        })
    }
}

/// A load that passed the credential and identifier checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadRequest {
    pub area_id: Option<String>,
    pub driver_id: Option<String>,
    pub token: String,
}

impl LoadRequest {
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.area_id.is_none() && self.driver_id.is_none() {
            return Err(LoadError::InvalidIdentifier);
        }
        if self.token.trim().is_empty() {
            return Err(LoadError::MissingCredential);
        }
        Ok(())
    }
}

fn form_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
