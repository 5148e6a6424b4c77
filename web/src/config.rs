use std::time::Duration;

use shared_types::{config::DEFAULT_SOCKET_URL, Geofence, TrackingConfig};

#[cfg(feature = "ssr")]
use std::sync::OnceLock;

pub const DEFAULT_API_URL: &str = "https://garbage-tracking-backend.onrender.com";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub tracking: TrackingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tracking: TrackingConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Geofence::default();
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        ServerConfig {
            api_url: text("TRACKING_API_URL", DEFAULT_API_URL),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "TRACKING_HTTP_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            tracking: TrackingConfig {
                socket_url: text("TRACKING_SOCKET_URL", DEFAULT_SOCKET_URL),
                geofence: Geofence {
                    lat: parse_or(&lookup, "GEOFENCE_LAT", defaults.lat),
                    long: parse_or(&lookup, "GEOFENCE_LNG", defaults.long),
                    precision: parse_or(&lookup, "GEOFENCE_PRECISION", defaults.precision),
                },
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            #[cfg(feature = "ssr")]
            tracing::warn!("{key}={raw:?} is not valid, using {default}");
            default
        }
    }
}

#[cfg(feature = "ssr")]
static SERVER_CONFIG: OnceLock<ServerConfig> = OnceLock::new();

#[cfg(feature = "ssr")]
pub fn init_config() -> &'static ServerConfig {
    SERVER_CONFIG.get_or_init(ServerConfig::from_env)
}

#[cfg(feature = "ssr")]
pub fn get_config() -> &'static ServerConfig {
    init_config()
}
