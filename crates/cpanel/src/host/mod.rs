//! Standalone development host.
//!
//! A minimal live-reload host for running the control panel without an
//! embedding server: an in-memory option store, one broadcast channel per
//! peer group and a WebSocket transport feeding the control panel's event
//! router.

mod scripts;
mod ws;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use axum::Router;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use cpanel_config::HostConfig;
use cpanel_server::{
    CONNECTOR_MIDDLEWARE, CONNECTOR_PATH, Connection, Host, LOCAL_URL_OPTION, Middleware,
    OutboundEvent, PeerGroup, SOCKET_JS_MIDDLEWARE, SOCKET_JS_PATH,
};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

/// Path the control panel's injectable script is served at.
const CLIENT_SCRIPT_PATH: &str = "/cpanel/client.js";

/// Capacity of each peer group's broadcast channel.
const BROADCAST_CAPACITY: usize = 100;

/// Page served for every path, so browsers can wander around.
const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>cpanel development host</title></head>
<body>
    <h1>Development host</h1>
    <nav><a href="/">Home</a> | <a href="/about">About</a> | <a href="/contact">Contact</a></nav>
    <script src="/js/vendor/socket.js"></script>
    <script src="/js/connector"></script>
    <script src="/cpanel/client.js"></script>
</body>
</html>
"#;

/// In-process host implementing the control panel's [`Host`] contract.
pub(crate) struct DevHost {
    options: RwLock<HashMap<String, Value>>,
    control_ui: broadcast::Sender<OutboundEvent>,
    browsers: broadcast::Sender<OutboundEvent>,
    incoming: mpsc::UnboundedSender<Connection>,
    connections: Mutex<Option<mpsc::UnboundedReceiver<Connection>>>,
    ws_url: String,
}

impl DevHost {
    /// Create a host for the configured address.
    #[must_use]
    pub(crate) fn new(config: &HostConfig) -> Self {
        let (control_ui, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (browsers, _) = broadcast::channel(BROADCAST_CAPACITY);
        let (incoming, connections) = mpsc::unbounded_channel();

        let mut options = HashMap::new();
        options.insert(LOCAL_URL_OPTION.to_owned(), Value::from(config.local_url()));

        Self {
            options: RwLock::new(options),
            control_ui,
            browsers,
            incoming,
            connections: Mutex::new(Some(connections)),
            ws_url: format!("ws://{}:{}/ws", config.host, config.port),
        }
    }

    fn sender(&self, group: PeerGroup) -> &broadcast::Sender<OutboundEvent> {
        match group {
            PeerGroup::ControlUi => &self.control_ui,
            PeerGroup::Browsers => &self.browsers,
        }
    }

    /// Receive everything broadcast to `group` from now on.
    pub(crate) fn subscribe(&self, group: PeerGroup) -> broadcast::Receiver<OutboundEvent> {
        self.sender(group).subscribe()
    }

    /// Hand a new connection to the control panel.
    pub(crate) fn open(&self, connection: Connection) {
        if self.incoming.send(connection).is_err() {
            tracing::debug!("Control panel not attached, connection events are dropped");
        }
    }

    /// Stop handing connections to a control panel that will never attach.
    ///
    /// Connections opened afterwards are dropped instead of queued.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub(crate) fn detach_panel(&self) {
        if self.connections.lock().unwrap().take().is_some() {
            tracing::debug!("Control panel detached");
        }
    }

    fn connector(&self, group: &str, browser: bool) -> Middleware {
        scripts::connector_router(&format!("{}?group={group}", self.ws_url), browser)
    }
}

impl Host for DevHost {
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn option(&self, key: &str) -> Option<Value> {
        self.options.read().unwrap().get(key).cloned()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn set_option(&self, key: &str, value: Value) {
        tracing::info!(key, value = %value, "Option changed");
        self.options.write().unwrap().insert(key.to_owned(), value);
    }

    fn middleware(&self, name: &str) -> Option<Middleware> {
        match name {
            SOCKET_JS_MIDDLEWARE => Some(scripts::socket_js_router()),
            CONNECTOR_MIDDLEWARE => Some(self.connector("panel", false)),
            _ => None,
        }
    }

    fn broadcast(&self, group: PeerGroup, event: &OutboundEvent) {
        // No subscribers just means nobody is connected yet.
        let receivers = self.sender(group).send(event.clone()).unwrap_or(0);
        tracing::debug!(event = event.name(), ?group, receivers, "Broadcast");
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    fn connections(&self) -> mpsc::UnboundedReceiver<Connection> {
        self.connections
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| mpsc::unbounded_channel().1)
    }
}

/// Create the development host application.
pub(crate) fn create_router(host: Arc<DevHost>) -> Router {
    let hooks = cpanel_server::hooks();
    let client_js = hooks.client_js;

    let router = Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest_service(SOCKET_JS_PATH, scripts::socket_js_router())
        .nest_service(CONNECTOR_PATH, host.connector("browser", true))
        .route(
            CLIENT_SCRIPT_PATH,
            get(move || async move {
                (
                    [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
                    client_js,
                )
            }),
        )
        .fallback(page)
        .with_state(host);

    (hooks.server_middleware)(router)
}

async fn page() -> impl IntoResponse {
    Html(PAGE)
}
