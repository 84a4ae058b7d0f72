//! Contract between the control panel and the live-reload host server.
//!
//! The host owns the connection registry, the option store and the socket
//! transport. The control panel only sees the narrow [`Host`] trait, handed
//! in at construction time.

use axum::Router;
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::{OutboundEvent, PeerGroup, RawEvent};

/// Middleware serving the host's socket client script.
pub const SOCKET_JS_MIDDLEWARE: &str = "socket-js";
/// Middleware serving the script that connects the UI to the host socket.
pub const CONNECTOR_MIDDLEWARE: &str = "connector";
/// Option holding the host's local base URL (e.g. `http://localhost:3000`).
pub const LOCAL_URL_OPTION: &str = "urls.local";

/// Request handler provided by the host, mounted as a nested service.
///
/// The handler sees request paths relative to its mount point.
pub type Middleware = Router;

/// A newly established real-time connection.
#[derive(Debug)]
pub struct Connection {
    /// Transport-assigned identifier.
    pub id: Uuid,
    /// Inbound events in arrival order. Closed when the peer disconnects.
    pub events: mpsc::UnboundedReceiver<RawEvent>,
}

impl Connection {
    /// Create a connection and the sender the transport feeds it with.
    #[must_use]
    pub fn channel() -> (mpsc::UnboundedSender<RawEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = Self {
            id: Uuid::new_v4(),
            events: rx,
        };
        (tx, connection)
    }
}

/// Capabilities the control panel needs from the host server.
pub trait Host: Send + Sync + 'static {
    /// Read a host option.
    fn option(&self, key: &str) -> Option<Value>;

    /// Change a host option. Validation is up to the host.
    fn set_option(&self, key: &str, value: Value);

    /// Look up a middleware by symbolic name.
    fn middleware(&self, name: &str) -> Option<Middleware>;

    /// Emit an event to every member of a peer group.
    fn broadcast(&self, group: PeerGroup, event: &OutboundEvent);

    /// Stream of new real-time connections.
    ///
    /// Called once, when the event router attaches.
    fn connections(&self) -> mpsc::UnboundedReceiver<Connection>;
}
