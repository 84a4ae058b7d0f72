//! Control panel for a live-reload development server.
//!
//! The control panel runs next to a host server (the live-reload server
//! that browsers are connected to). It serves a small browser UI on a port
//! of its own and relays events between that UI and the host:
//!
//! - force every browser to reload
//! - send every browser to a URL (only if the URL answers)
//! - change host options
//! - track which paths browsers have visited and keep every UI instance in sync
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use cpanel_server::{PanelOptions, plugin};
//!
//! # async fn run(host: Arc<dyn cpanel_server::Host>) {
//! let panel = plugin(PanelOptions::default(), host);
//! let mut status = panel.status();
//! status.changed().await.ok();
//! println!("{:?}", *status.borrow());
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ControlPanel::new ──spawn──► Bootstrap
//!                                │ 1. PortFinder::find_ports(1)
//!                                │ 2. bind axum app
//!                                │      ├─► /js/vendor/socket.js  (host "socket-js")
//!                                │      ├─► /js/connector         (host "connector")
//!                                │      └─► everything else       (UI assets)
//!                                │ 3. EventRouter::attach(host.connections())
//!                                ▼
//!                          EventRouter ──► Host::set_option / Host::broadcast
//!                                │
//!                                └─► Session (PathTracker)
//! ```

mod app;
mod bootstrap;
mod error;
mod events;
mod host;
mod middleware;
mod panel;
mod paths;
mod ports;
mod router;
mod static_files;
#[cfg(test)]
mod testing;
mod verify;

use std::ops::RangeInclusive;
use std::time::Duration;

pub use app::{CONNECTOR_PATH, SOCKET_JS_PATH};
pub use bootstrap::{Bootstrap, ServerHandle};
pub use error::{BootstrapError, EventError, PortError, VerifyError};
pub use events::{
    BROWSER_RELOAD, BROWSER_URL, CLIENT_CONNECTED, InboundEvent, Location, NavigateRequest,
    OPTION_SET, OptionChange, OutboundEvent, PeerGroup, RawEvent,
};
pub use host::{
    CONNECTOR_MIDDLEWARE, Connection, Host, LOCAL_URL_OPTION, Middleware, SOCKET_JS_MIDDLEWARE,
};
pub use middleware::pass_through;
pub use panel::{ControlPanel, Hooks, PLUGIN_NAME, PanelStatus, hooks, plugin};
pub use paths::{PathRecord, PathTracker, Session};
pub use ports::{PortFinder, ScanningPortFinder};
pub use router::EventRouter;
pub use verify::{HttpVerifier, UrlVerifier, create_url};

/// Control panel options.
#[derive(Clone, Debug)]
pub struct PanelOptions {
    /// Address the control panel server binds to.
    pub bind_host: String,
    /// Ports considered by port discovery.
    pub port_range: RangeInclusive<u16>,
    /// Timeout for URL reachability checks.
    pub verify_timeout: Duration,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_owned(),
            port_range: 3001..=3100,
            verify_timeout: Duration::from_secs(5),
        }
    }
}

/// Create control panel options from the configuration file.
#[must_use]
pub fn panel_options_from_config(config: &cpanel_config::Config) -> PanelOptions {
    PanelOptions {
        bind_host: config.panel.bind_host.clone(),
        port_range: config.panel.port_start..=config.panel.port_end,
        verify_timeout: Duration::from_secs(config.panel.verify_timeout_secs),
    }
}
