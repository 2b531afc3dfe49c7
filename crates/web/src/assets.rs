//! Offline support: PWA manifest and the cache-first service worker.
//!
//! Both are embedded into the binary and only served when
//! `features.offline_assets` is enabled.

use {
    axum::{
        extract::State,
        http::{StatusCode, header},
        response::{IntoResponse, Response},
    },
    chatlabs_gateway::server::AppState,
};

static ASSETS: include_dir::Dir = include_dir::include_dir!("$CARGO_MANIFEST_DIR/src/assets");

fn mime_for_path(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/manifest+json",
        _ => "application/octet-stream",
    }
}

fn serve_asset(state: &AppState, path: &str) -> Response {
    if !state.gateway.config.features.offline_assets {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    match ASSETS.get_file(path) {
        Some(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime_for_path(path)),
                (header::CACHE_CONTROL, "no-cache"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            file.contents(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// PWA manifest: `/manifest.json`.
pub async fn manifest_handler(State(state): State<AppState>) -> Response {
    serve_asset(&state, "manifest.json")
}

/// Service worker: `/sw.js`, no-cache so updates are picked up.
pub async fn service_worker_handler(State(state): State<AppState>) -> Response {
    serve_asset(&state, "sw.js")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_assets_are_present() {
        assert!(ASSETS.get_file("manifest.json").is_some());
        let sw = ASSETS.get_file("sw.js").and_then(|f| f.contents_utf8()).unwrap();
        assert!(sw.contains("/storage/"));
    }
}
