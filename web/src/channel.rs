//! Live channel to the tracking server. A channel is opened by the page that
//! needs it and closed when that page goes away; closing also stops any
//! pending reconnect.

use std::time::Duration;

use shared_types::{
    socket_io::{connect_frame, socket_url, EnginePacket, SocketPacket},
    ChannelError, ChannelEvent,
};

#[cfg(feature = "hydrate")]
use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

#[cfg(feature = "hydrate")]
use leptos::leptos_dom::helpers::{set_timeout, set_timeout_with_handle, TimeoutHandle};
#[cfg(feature = "hydrate")]
use leptos::logging::{error, log, warn};
#[cfg(feature = "hydrate")]
use shared_types::socket_io::reconnect_delay;
#[cfg(feature = "hydrate")]
use wasm_bindgen::{closure::Closure, JsCast};
#[cfg(feature = "hydrate")]
use web_sys::{CloseEvent, MessageEvent, WebSocket};

/// What a decoded text frame asks the channel to do.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAction {
    /// Transport is open: send `reply` and expect a ping within `heartbeat`.
    Handshake { reply: String, heartbeat: Duration },
    /// Server ping: send the pong and restart the heartbeat wait.
    Heartbeat(String),
    Deliver(ChannelEvent),
    Connected,
    Rejected(String),
    Ignore,
}

/// Interprets one text frame from the server.
pub fn handle_frame(frame: &str) -> Result<FrameAction, ChannelError> {
    match EnginePacket::decode(frame)? {
        EnginePacket::Open(handshake) => Ok(FrameAction::Handshake {
            reply: connect_frame(),
            heartbeat: handshake.heartbeat_timeout(),
        }),
        EnginePacket::Ping(payload) => Ok(FrameAction::Heartbeat(EnginePacket::Pong(payload).encode())),
        EnginePacket::Message(payload) => match SocketPacket::decode(&payload)? {
            SocketPacket::Connect { .. } => Ok(FrameAction::Connected),
            SocketPacket::ConnectError { data, .. } => Ok(FrameAction::Rejected(
                data.map(|d| d.to_string()).unwrap_or_default(),
            )),
            SocketPacket::Event { name, args, .. } => Ok(ChannelEvent::from_event(&name, &args)?
                .map(FrameAction::Deliver)
                .unwrap_or(FrameAction::Ignore)),
            SocketPacket::Disconnect { .. } | SocketPacket::Ack { .. } => Ok(FrameAction::Ignore),
        },
        EnginePacket::Close | EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {
            Ok(FrameAction::Ignore)
        }
    }
}

pub struct TrackingChannel {
    #[cfg(feature = "hydrate")]
    inner: Rc<ChannelInner>,
}

impl TrackingChannel {
    /// Connects to the Socket.IO server at `base_url` and hands every
    /// understood event to `on_event`.
    pub fn open<F>(base_url: &str, on_event: F) -> Result<Self, ChannelError>
    where
        F: Fn(ChannelEvent) + 'static,
    {
        let url = socket_url(base_url)?;

        #[cfg(feature = "hydrate")]
        {
            let inner = Rc::new(ChannelInner {
                url,
                on_event: Box::new(on_event),
                socket: RefCell::new(None),
                handlers: RefCell::new(None),
                watchdog: RefCell::new(None),
                heartbeat: Cell::new(None),
                closed: Cell::new(false),
                attempts: Cell::new(0),
            });
            connect(&inner);
            Ok(TrackingChannel { inner })
        }

        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (url, on_event);
            Ok(TrackingChannel {})
        }
    }

    pub fn close(&self) {
        #[cfg(feature = "hydrate")]
        self.inner.close();
    }
}

impl Drop for TrackingChannel {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(feature = "hydrate")]
struct Handlers {
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

#[cfg(feature = "hydrate")]
struct ChannelInner {
    url: String,
    on_event: Box<dyn Fn(ChannelEvent)>,
    socket: RefCell<Option<WebSocket>>,
    // Replaced on the next connect, never dropped from inside a callback
    handlers: RefCell<Option<Handlers>>,
    watchdog: RefCell<Option<TimeoutHandle>>,
    heartbeat: Cell<Option<Duration>>,
    closed: Cell<bool>,
    attempts: Cell<u32>,
}

#[cfg(feature = "hydrate")]
impl ChannelInner {
    fn send(&self, frame: &str) {
        if let Some(socket) = self.socket.borrow().as_ref() {
            if let Err(e) = socket.send_with_str(frame) {
                warn!("Failed to send frame on tracking channel: {:?}", e);
            }
        }
    }

    fn clear_watchdog(&self) {
        if let Some(handle) = self.watchdog.borrow_mut().take() {
            handle.clear();
        }
    }

    /// Detaches and closes the current socket without reconnecting.
    fn drop_socket(&self) {
        self.clear_watchdog();
        self.heartbeat.set(None);
        if let Some(socket) = self.socket.borrow_mut().take() {
            socket.set_onmessage(None);
            socket.set_onclose(None);
            let _ = socket.close();
        }
    }

    fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        self.drop_socket();
        self.handlers.borrow_mut().take();
        log!("Tracking channel closed");
    }
}

#[cfg(feature = "hydrate")]
fn on_frame(inner: &Rc<ChannelInner>, frame: &str) {
    match handle_frame(frame) {
        Ok(FrameAction::Handshake { reply, heartbeat }) => {
            inner.heartbeat.set(Some(heartbeat));
            inner.send(&reply);
            arm_watchdog(inner);
        }
        Ok(FrameAction::Heartbeat(reply)) => {
            inner.send(&reply);
            arm_watchdog(inner);
        }
        Ok(FrameAction::Deliver(event)) => (inner.on_event)(event),
        Ok(FrameAction::Connected) => {
            inner.attempts.set(0);
            log!("Tracking channel connected");
        }
        Ok(FrameAction::Rejected(reason)) => {
            error!("Tracking channel refused connection: {}", reason);
            restart(inner);
        }
        Ok(FrameAction::Ignore) => {}
        Err(e) => warn!("Dropping tracking frame: {}", e),
    }
}

/// Reconnects if no ping arrives within the handshake's heartbeat window.
#[cfg(feature = "hydrate")]
fn arm_watchdog(inner: &Rc<ChannelInner>) {
    let Some(timeout) = inner.heartbeat.get() else {
        return;
    };
    inner.clear_watchdog();

    let weak = Rc::downgrade(inner);
    let armed = set_timeout_with_handle(
        move || {
            if let Some(inner) = weak.upgrade() {
                warn!("No ping from tracking server within {:?}, reconnecting", timeout);
                restart(&inner);
            }
        },
        timeout,
    );
    match armed {
        Ok(handle) => *inner.watchdog.borrow_mut() = Some(handle),
        Err(e) => warn!("Could not arm tracking heartbeat: {:?}", e),
    }
}

#[cfg(feature = "hydrate")]
fn restart(inner: &Rc<ChannelInner>) {
    if inner.closed.get() {
        return;
    }
    inner.drop_socket();
    schedule_reconnect(inner);
}

#[cfg(feature = "hydrate")]
fn connect(inner: &Rc<ChannelInner>) {
    if inner.closed.get() {
        return;
    }

    let socket = match WebSocket::new(&inner.url) {
        Ok(socket) => socket,
        Err(e) => {
            error!("Failed to open tracking channel: {:?}", e);
            schedule_reconnect(inner);
            return;
        }
    };

    let weak = Rc::downgrade(inner);
    let on_message = Closure::<dyn FnMut(MessageEvent)>::new({
        let weak = weak.clone();
        move |event: MessageEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Some(frame) = event.data().as_string() {
                on_frame(&inner, &frame);
            }
        }
    });
    let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if !inner.closed.get() {
            warn!(
                "Tracking channel dropped (code {}), reconnecting",
                event.code()
            );
            inner.clear_watchdog();
            inner.socket.borrow_mut().take();
            schedule_reconnect(&inner);
        }
    });

    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    *inner.socket.borrow_mut() = Some(socket);
    *inner.handlers.borrow_mut() = Some(Handlers {
        _on_message: on_message,
        _on_close: on_close,
    });
}

#[cfg(feature = "hydrate")]
fn schedule_reconnect(inner: &Rc<ChannelInner>) {
    let attempt = inner.attempts.get();
    inner.attempts.set(attempt.saturating_add(1));
    let delay = reconnect_delay(attempt);

    let weak: Weak<ChannelInner> = Rc::downgrade(inner);
    set_timeout(
        move || {
            if let Some(inner) = weak.upgrade() {
                connect(&inner);
            }
        },
        delay,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::CoordinatesUpdated;

    #[test]
    fn test_open_packet_joins_namespace() {
        let action = handle_frame(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            FrameAction::Handshake {
                reply: "40".to_string(),
                heartbeat: Duration::from_secs(45),
            }
        );
    }

    #[test]
    fn test_ping_gets_pong() {
        assert_eq!(handle_frame("2").unwrap(), FrameAction::Heartbeat("3".to_string()));
    }

    #[test]
    fn test_event_frames_are_delivered() {
        let action = handle_frame(
            r#"42["coordinatesUpdated",{"vehicleId":"WB-01","latitude":23.2057,"longitude":87.0286}]"#,
        )
        .unwrap();
        assert_eq!(
            action,
            FrameAction::Deliver(ChannelEvent::CoordinatesUpdated(CoordinatesUpdated {
                vehicle_id: "WB-01".to_string(),
                latitude: 23.2057,
                longitude: 87.0286,
            }))
        );
    }

    #[test]
    fn test_namespace_ack_and_unknown_events() {
        assert_eq!(handle_frame(r#"40{"sid":"x"}"#).unwrap(), FrameAction::Connected);
        assert_eq!(
            handle_frame(r#"44{"message":"unauthorized"}"#).unwrap(),
            FrameAction::Rejected(r#"{"message":"unauthorized"}"#.to_string())
        );
        assert_eq!(
            handle_frame(r#"42["routeAssigned",{}]"#).unwrap(),
            FrameAction::Ignore
        );
        assert_eq!(handle_frame("6").unwrap(), FrameAction::Ignore);
    }

    #[test]
    fn test_bad_frames_are_errors() {
        assert!(handle_frame("").is_err());
        assert!(handle_frame(r#"42["dustbinVisited"]"#).is_err());
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(TrackingChannel::open("not a url", |_| {}).is_err());
    }
}
