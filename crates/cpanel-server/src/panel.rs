//! The control panel as seen by the host.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::Router;
use tokio::sync::watch;

use crate::PanelOptions;
use crate::bootstrap::{Bootstrap, ServerHandle};
use crate::error::BootstrapError;
use crate::host::Host;
use crate::middleware;
use crate::paths::{PathRecord, Session};
use crate::ports::{PortFinder, ScanningPortFinder};
use crate::router::EventRouter;
use crate::verify::{HttpVerifier, UrlVerifier};

/// Display name of the plugin.
pub const PLUGIN_NAME: &str = "Control Panel";

/// Lifecycle state of a control panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelStatus {
    /// Bootstrap is still running.
    Starting,
    /// Server bound and event router attached.
    Running(SocketAddr),
    /// Bootstrap failed; the panel stays unavailable for the process lifetime.
    Failed(String),
}

/// A running (or starting) control panel.
///
/// Construction returns immediately. Startup runs on a background task and
/// never fails the caller: errors are logged and reflected in
/// [`status`](Self::status).
pub struct ControlPanel {
    session: Arc<Session>,
    status: watch::Receiver<PanelStatus>,
    server: Arc<OnceLock<ServerHandle>>,
}

impl ControlPanel {
    /// Start a control panel with the default port finder and URL verifier.
    ///
    /// Outside a Tokio runtime the panel is reported as failed.
    #[must_use]
    pub fn new(options: PanelOptions, host: Arc<dyn Host>) -> Self {
        let ports = Arc::new(ScanningPortFinder::new(
            options.bind_host.clone(),
            options.port_range.clone(),
        ));
        let verifier = Arc::new(HttpVerifier::new(options.verify_timeout));
        Self::with_collaborators(options, host, ports, verifier)
    }

    /// Start a control panel with explicit collaborators.
    ///
    /// Outside a Tokio runtime the panel is reported as failed.
    #[must_use]
    pub fn with_collaborators(
        options: PanelOptions,
        host: Arc<dyn Host>,
        ports: Arc<dyn PortFinder>,
        verifier: Arc<dyn UrlVerifier>,
    ) -> Self {
        let session = Arc::new(Session::new());
        let router = EventRouter::new(Arc::clone(&host), verifier, Arc::clone(&session));
        let bootstrap = Bootstrap::new(host, ports, router, options.bind_host);

        let (status_tx, status) = watch::channel(PanelStatus::Starting);
        let server = Arc::new(OnceLock::new());
        let slot = Arc::clone(&server);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            let error = BootstrapError::NoRuntime;
            report_failure(&error);
            status_tx.send_replace(PanelStatus::Failed(error.to_string()));
            return Self {
                session,
                status,
                server,
            };
        };

        runtime.spawn(async move {
            match bootstrap.start().await {
                Ok(handle) => {
                    let addr = handle.local_addr();
                    let _ = slot.set(handle);
                    status_tx.send_replace(PanelStatus::Running(addr));
                }
                Err(e) => {
                    report_failure(&e);
                    status_tx.send_replace(PanelStatus::Failed(e.to_string()));
                }
            }
        });

        Self {
            session,
            status,
            server,
        }
    }

    /// Watch the lifecycle state.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<PanelStatus> {
        self.status.clone()
    }

    /// Address of the control panel server, once running.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.get().map(ServerHandle::local_addr)
    }

    /// Paths visited so far.
    #[must_use]
    pub fn paths(&self) -> Vec<PathRecord> {
        self.session.snapshot()
    }
}

/// Terminal handler for startup failures.
fn report_failure(error: &BootstrapError) {
    tracing::error!(plugin = PLUGIN_NAME, error = %error, "Failed to start");
}

/// Create a control panel for `host`.
#[must_use]
pub fn plugin(options: PanelOptions, host: Arc<dyn Host>) -> ControlPanel {
    ControlPanel::new(options, host)
}

/// Integration points the host installs into its own pipeline.
pub struct Hooks {
    /// Script the host injects into every page it serves.
    pub client_js: &'static [u8],
    /// Wraps the host's router with the control panel's request middleware.
    pub server_middleware: fn(Router) -> Router,
}

/// Hooks exposed to the host.
#[must_use]
pub fn hooks() -> Hooks {
    Hooks {
        client_js: cpanel_assets::CLIENT_SCRIPT,
        server_middleware: with_pass_through,
    }
}

fn with_pass_through(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(middleware::pass_through))
}
