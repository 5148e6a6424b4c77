//! Text frames of the Socket.IO v5 protocol carried over the Engine.IO v4
//! WebSocket transport. Binary attachments are not used by the tracking
//! server and are rejected.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ChannelError;

pub const DEFAULT_NAMESPACE: &str = "/";
const SOCKET_PATH: &str = "/socket.io/";
const SOCKET_QUERY: &str = "EIO=4&transport=websocket";
const RECONNECT_BASE_MS: u64 = 1_000;
const RECONNECT_MAX_MS: u64 = 30_000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

impl Handshake {
    /// Longest the server may stay silent before the connection counts as
    /// dead: one ping interval plus the ping timeout.
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(frame: &str) -> Result<Self, ChannelError> {
        let kind = frame.chars().next().ok_or(ChannelError::EmptyFrame)?;
        let payload = &frame[kind.len_utf8()..];

        Ok(match kind {
            '0' => EnginePacket::Open(serde_json::from_str(payload)?),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping(payload.to_string()),
            '3' => EnginePacket::Pong(payload.to_string()),
            '4' => EnginePacket::Message(payload.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            'b' => return Err(ChannelError::BinaryUnsupported),
            other => return Err(ChannelError::UnknownPacketType(other)),
        })
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(handshake) => format!(
                "0{}",
                serde_json::to_string(handshake).unwrap_or_default()
            ),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(payload) => format!("2{payload}"),
            EnginePacket::Pong(payload) => format!("3{payload}"),
            EnginePacket::Message(payload) => format!("4{payload}"),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        ack_id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        ack_id: Option<u64>,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    pub fn connect(namespace: &str) -> Self {
        SocketPacket::Connect {
            namespace: namespace.to_string(),
            data: None,
        }
    }

    pub fn decode(payload: &str) -> Result<Self, ChannelError> {
        let kind = payload.chars().next().ok_or(ChannelError::EmptyFrame)?;
        let rest = &payload[kind.len_utf8()..];
        if kind == '5' || kind == '6' {
            return Err(ChannelError::BinaryUnsupported);
        }

        let (namespace, rest) = if rest.starts_with('/') {
            match rest.find(',') {
                Some(idx) => (&rest[..idx], &rest[idx + 1..]),
                None => (rest, ""),
            }
        } else {
            (DEFAULT_NAMESPACE, rest)
        };
        let namespace = namespace.to_string();

        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let ack_id = if digits > 0 {
            rest[..digits].parse::<u64>().ok()
        } else {
            None
        };
        let body = &rest[digits..];
        let data: Option<Value> = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str(body)?)
        };

        Ok(match kind {
            '0' => SocketPacket::Connect { namespace, data },
            '1' => SocketPacket::Disconnect { namespace },
            '2' => {
                let mut items = match data {
                    Some(Value::Array(items)) if !items.is_empty() => items,
                    _ => {
                        return Err(ChannelError::MalformedPayload(
                            "event packet without a name".to_string(),
                        ))
                    }
                };
                let name = match items.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(ChannelError::MalformedPayload(format!(
                            "event name must be a string, got {other}"
                        )))
                    }
                };
                SocketPacket::Event {
                    namespace,
                    ack_id,
                    name,
                    args: items,
                }
            }
            '3' => SocketPacket::Ack {
                namespace,
                ack_id,
                args: match data {
                    Some(Value::Array(items)) => items,
                    Some(other) => vec![other],
                    None => Vec::new(),
                },
            },
            '4' => SocketPacket::ConnectError { namespace, data },
            other => return Err(ChannelError::UnknownPacketType(other)),
        })
    }

    pub fn encode(&self) -> String {
        fn prefix(kind: char, namespace: &str) -> String {
            if namespace == DEFAULT_NAMESPACE {
                kind.to_string()
            } else {
                format!("{kind}{namespace},")
            }
        }
        fn ack(ack_id: &Option<u64>) -> String {
            ack_id.map(|id| id.to_string()).unwrap_or_default()
        }

        match self {
            SocketPacket::Connect { namespace, data } | SocketPacket::ConnectError { namespace, data } => {
                let kind = if matches!(self, SocketPacket::Connect { .. }) { '0' } else { '4' };
                let body = data.as_ref().map(Value::to_string).unwrap_or_default();
                format!("{}{}", prefix(kind, namespace), body)
            }
            SocketPacket::Disconnect { namespace } => prefix('1', namespace),
            SocketPacket::Event {
                namespace,
                ack_id,
                name,
                args,
            } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                format!(
                    "{}{}{}",
                    prefix('2', namespace),
                    ack(ack_id),
                    Value::Array(items)
                )
            }
            SocketPacket::Ack {
                namespace,
                ack_id,
                args,
            } => format!(
                "{}{}{}",
                prefix('3', namespace),
                ack(ack_id),
                Value::Array(args.clone())
            ),
        }
    }
}

/// Frame that joins the default namespace once the transport is open.
pub fn connect_frame() -> String {
    EnginePacket::Message(SocketPacket::connect(DEFAULT_NAMESPACE).encode()).encode()
}

/// WebSocket endpoint for a Socket.IO server given its public http(s) origin.
pub fn socket_url(base: &str) -> Result<String, ChannelError> {
    let mut url = Url::parse(base).map_err(|err| ChannelError::InvalidUrl(format!("{base}: {err}")))?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(ChannelError::InvalidUrl(format!(
                "unsupported scheme {other}"
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| ChannelError::InvalidUrl(base.to_string()))?;
    url.set_path(SOCKET_PATH);
    url.set_query(Some(SOCKET_QUERY));
    Ok(url.to_string())
}

/// Exponential backoff between reconnect attempts, capped at 30 seconds.
pub fn reconnect_delay(attempt: u32) -> Duration {
    let factor = 1u64 << attempt.min(16);
    Duration::from_millis(RECONNECT_BASE_MS.saturating_mul(factor).min(RECONNECT_MAX_MS))
}
