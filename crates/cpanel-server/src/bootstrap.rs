//! Startup sequencing.
//!
//! Bootstrap runs three steps strictly in order, each only after the
//! previous one succeeded:
//!
//! 1. acquire one free port
//! 2. build the HTTP application and bind it to that port
//! 3. attach the event router to the host's connection stream
//!
//! Any failure aborts the sequence. The [`ServerHandle`] is only returned
//! once all three steps are done, so a caller cannot tell a partial start
//! from a failed one.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::app;
use crate::error::BootstrapError;
use crate::host::{CONNECTOR_MIDDLEWARE, Host, Middleware, SOCKET_JS_MIDDLEWARE};
use crate::ports::PortFinder;
use crate::router::EventRouter;

/// Bound, listening control panel server.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server listens on.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Check if the server task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// One-shot startup pipeline for a control panel.
pub struct Bootstrap {
    host: Arc<dyn Host>,
    ports: Arc<dyn PortFinder>,
    router: EventRouter,
    bind_host: String,
}

impl Bootstrap {
    /// Create the pipeline.
    ///
    /// # Arguments
    ///
    /// * `host` - Host server providing middleware and connections
    /// * `ports` - Port discovery
    /// * `router` - Event router to attach once the server is up
    /// * `bind_host` - Address the server binds to
    #[must_use]
    pub fn new(
        host: Arc<dyn Host>,
        ports: Arc<dyn PortFinder>,
        router: EventRouter,
        bind_host: impl Into<String>,
    ) -> Self {
        Self {
            host,
            ports,
            router,
            bind_host: bind_host.into(),
        }
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step. Later steps never run.
    pub async fn start(self) -> Result<ServerHandle, BootstrapError> {
        let ports = self.ports.find_ports(1).await?;
        let port = *ports.first().ok_or(BootstrapError::NoPorts)?;

        let server = self.start_server(port).await?;

        let connections = self.host.connections();
        self.router.attach(connections);

        Ok(server)
    }

    async fn start_server(&self, port: u16) -> Result<ServerHandle, BootstrapError> {
        tracing::info!(port, "Using port");

        let socket_js = self.require_middleware(SOCKET_JS_MIDDLEWARE)?;
        let connector = self.require_middleware(CONNECTOR_MIDDLEWARE)?;
        let app = app::create_router(socket_js, connector);

        let bind_error = |source: std::io::Error| BootstrapError::Bind { port, source };
        let listener = TcpListener::bind((self.bind_host.as_str(), port))
            .await
            .map_err(bind_error)?;
        let addr = listener.local_addr().map_err(bind_error)?;

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Control panel server stopped");
            }
        });

        tracing::info!(url = %format!("http://localhost:{}", addr.port()), "Running");

        Ok(ServerHandle { addr, task })
    }

    fn require_middleware(&self, name: &'static str) -> Result<Middleware, BootstrapError> {
        self.host
            .middleware(name)
            .ok_or(BootstrapError::MissingMiddleware(name))
    }
}
