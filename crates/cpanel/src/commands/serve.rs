//! `cpanel serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use cpanel_config::{CliSettings, Config};
use cpanel_server::{ControlPanel, Host, PLUGIN_NAME, PanelStatus, panel_options_from_config};
use tokio::sync::watch;

use crate::error::CliError;
use crate::host::{self, DevHost};
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover cpanel.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind the development host to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the development host to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the development host fails to start.
    /// Control panel startup failures are reported but never fail the command.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let dev_host = Arc::new(DevHost::new(&config.host));
        let listener =
            tokio::net::TcpListener::bind((config.host.host.as_str(), config.host.port)).await?;

        output.url("Serving on", &config.host.local_url());

        let panel = cpanel_server::plugin(
            panel_options_from_config(&config),
            Arc::clone(&dev_host) as Arc<dyn Host>,
        );
        tokio::spawn(report_status(panel.status(), Arc::clone(&dev_host)));

        let app = host::create_router(dev_host);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        report_paths(&panel);
        Ok(())
    }
}

/// Print the control panel URL once it is running, or why it is not.
///
/// A failed panel never attaches, so the host stops queueing connections for it.
async fn report_status(mut status: watch::Receiver<PanelStatus>, dev_host: Arc<DevHost>) {
    let output = Output::new();
    let settled = match status
        .wait_for(|s| *s != PanelStatus::Starting)
        .await
    {
        Ok(settled) => settled.clone(),
        Err(_) => return,
    };

    match settled {
        PanelStatus::Running(addr) => {
            output.url(PLUGIN_NAME, &format!("http://localhost:{}", addr.port()));
        }
        PanelStatus::Failed(reason) => {
            output.error(&format!("{PLUGIN_NAME} unavailable: {reason}"));
            dev_host.detach_panel();
        }
        PanelStatus::Starting => {}
    }
}

fn report_paths(panel: &ControlPanel) {
    let paths = panel.paths();
    tracing::info!(count = paths.len(), "Visited paths");
    for record in paths {
        tracing::debug!(path = %record.path, "Visited");
    }
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
