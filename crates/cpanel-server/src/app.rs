//! Router construction.
//!
//! Mounts the host's script middleware ahead of the static UI assets.

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::host::Middleware;
use crate::middleware;
use crate::static_files;

/// Mount point of the host's socket client script.
pub const SOCKET_JS_PATH: &str = "/js/vendor/socket.js";
/// Mount point of the host's connector script.
pub const CONNECTOR_PATH: &str = "/js/connector";

/// Create the control panel application.
///
/// # Arguments
///
/// * `socket_js` - Host middleware serving the socket client script
/// * `connector` - Host middleware serving the connector script
pub(crate) fn create_router(socket_js: Middleware, connector: Middleware) -> Router {
    Router::new()
        .nest_service(SOCKET_JS_PATH, socket_js)
        .nest_service(CONNECTOR_PATH, connector)
        .merge(static_files::static_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::content_type_options_layer()),
        )
}
