//! Browser-facing pages: public share pages with their remix downloads,
//! workspace dashboard pages and offline assets.
//!
//! This crate depends on `chatlabs-gateway` for [`AppState`]. It provides
//! [`web_routes()`] which the CLI (or a test) hands to the gateway router.

pub mod assets;
pub mod pages;
pub mod share;

use {
    axum::{Router, routing::get},
    chatlabs_gateway::server::AppState,
};

/// Build the page router. Session checks happen inside the page handlers so
/// unauthenticated visitors are redirected rather than refused.
pub fn web_routes() -> Router<AppState> {
    Router::new()
        .route("/share/{share_id}", get(share::share_page_handler))
        .route("/remix/{share_id}", get(share::remix_handler))
        .route("/manifest.json", get(assets::manifest_handler))
        .route("/sw.js", get(assets::service_worker_handler))
        .route(
            "/{locale}/{workspace_id}",
            get(pages::workspace_page_handler),
        )
        .route(
            "/{locale}/{workspace_id}/{*rest}",
            get(pages::workspace_subpage_handler),
        )
}
