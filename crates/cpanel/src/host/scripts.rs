//! Browser scripts served by the development host.
//!
//! `socket.js` defines a tiny JSON-over-WebSocket client; the connector
//! opens a connection for one peer group and exposes it as
//! `window.cpanelSocket`.

use axum::Router;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;

const JS_CONTENT_TYPE: &str = "text/javascript; charset=utf-8";

/// Socket client: frames are `{"event": ..., "data": ...}`.
const SOCKET_JS: &str = r#"(function (window) {
    "use strict";

    window.CpanelSocket = {
        connect: function (url) {
            var ws = new WebSocket(url);
            var queue = [];
            var handlers = {};

            ws.addEventListener("open", function () {
                queue.splice(0).forEach(function (frame) {
                    ws.send(frame);
                });
            });

            ws.addEventListener("message", function (message) {
                var frame = JSON.parse(message.data);
                (handlers[frame.event] || []).forEach(function (handler) {
                    handler(frame.data);
                });
            });

            return {
                emit: function (event, data) {
                    var frame = JSON.stringify({event: event, data: data});
                    if (ws.readyState === WebSocket.OPEN) {
                        ws.send(frame);
                    } else {
                        queue.push(frame);
                    }
                },
                on: function (event, handler) {
                    (handlers[event] = handlers[event] || []).push(handler);
                }
            };
        }
    };
})(window);
"#;

/// Browser-side handlers for the signals the control panel sends.
const BROWSER_HANDLERS: &str = r#"
window.cpanelSocket.on("browser:reload", function () {
    window.location.reload();
});
window.cpanelSocket.on("browser:location", function (data) {
    window.location.href = data.url;
});
"#;

/// Router serving the socket client script.
pub(crate) fn socket_js_router() -> Router {
    Router::new().route("/", get(socket_js))
}

async fn socket_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, JS_CONTENT_TYPE)], SOCKET_JS)
}

/// Router serving a connector script for the given WebSocket URL.
///
/// Browser connectors also install the reload and navigation handlers.
pub(crate) fn connector_router(ws_url: &str, browser: bool) -> Router {
    let script = connector_script(ws_url, browser);
    Router::new().route(
        "/",
        get(move || async move { ([(header::CONTENT_TYPE, JS_CONTENT_TYPE)], script) }),
    )
}

fn connector_script(ws_url: &str, browser: bool) -> String {
    let mut script = format!(
        "window.cpanelSocket = window.CpanelSocket.connect({});\n",
        serde_json::Value::from(ws_url)
    );
    if browser {
        script.push_str(BROWSER_HANDLERS);
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_script_quotes_url() {
        let script = connector_script("ws://127.0.0.1:3000/ws?group=panel", false);
        assert_eq!(
            script,
            "window.cpanelSocket = window.CpanelSocket.connect(\"ws://127.0.0.1:3000/ws?group=panel\");\n"
        );
    }

    #[test]
    fn test_browser_connector_handles_signals() {
        let script = connector_script("ws://127.0.0.1:3000/ws?group=browser", true);
        assert!(script.contains("browser:reload"));
        assert!(script.contains("browser:location"));
    }

    #[test]
    fn test_socket_js_uses_event_frames() {
        assert!(SOCKET_JS.contains("frame.event"));
        assert!(SOCKET_JS.contains("frame.data"));
    }
}
