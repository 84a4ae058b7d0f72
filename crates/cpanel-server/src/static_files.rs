//! Static file serving for the control UI.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Create router serving UI assets for every unmatched path.
pub(crate) fn static_router() -> Router {
    Router::new().fallback(serve_asset)
}

/// Serve a UI asset, mapping `/` to `index.html`.
async fn serve_asset(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match cpanel_assets::get(file_path) {
        Some(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, cpanel_assets::mime_for(file_path))],
            Body::from(content.into_owned()),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let response = static_router()
            .oneshot(
                Request::builder()
                    .uri("/nonexistent_file_that_does_not_exist.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
