//! Error types for the control panel.

/// Errors raised while discovering a free port.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Fewer free ports than requested in the scanned range.
    #[error("no free port in {start}..={end} (wanted {count}, found {found})")]
    Exhausted {
        /// First scanned port.
        start: u16,
        /// Last scanned port.
        end: u16,
        /// Requested number of ports.
        count: usize,
        /// Number of free ports found.
        found: usize,
    },
    /// The bind address could not be parsed.
    #[error("invalid bind host {0:?}")]
    InvalidHost(String),
}

/// Errors raised by URL reachability checks.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The URL answered with a non-200 status.
    #[error("{url} responded with status {status}")]
    Status {
        /// Checked URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The request could not be completed.
    #[error("{url} is unreachable: {message}")]
    Unreachable {
        /// Checked URL.
        url: String,
        /// Transport error message.
        message: String,
    },
    /// The URL could not be built from the host's local URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors raised while validating an inbound event.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Event name is not handled by the control panel.
    #[error("unknown event {0:?}")]
    Unknown(String),
    /// Payload does not match the event.
    #[error("invalid payload for {event}: {source}")]
    Payload {
        /// Event name.
        event: String,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort the bootstrap sequence.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The panel was created outside a Tokio runtime.
    #[error("no Tokio runtime to run on")]
    NoRuntime,
    /// Port discovery failed.
    #[error("port discovery failed: {0}")]
    Ports(#[from] PortError),
    /// Port discovery resolved without any port.
    #[error("port discovery returned no ports")]
    NoPorts,
    /// The host does not provide a middleware the server mounts.
    #[error("host middleware {0:?} is not available")]
    MissingMiddleware(&'static str),
    /// The server could not bind the acquired port.
    #[error("failed to bind port {port}: {source}")]
    Bind {
        /// Acquired port.
        port: u16,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
