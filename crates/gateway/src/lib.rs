//! HTTP gateway: shared state, session authentication, the JSON API and
//! object storage reads.
//!
//! Browser pages live in `chatlabs-web`, which builds on [`server::AppState`]
//! and hands its router to [`server::build_gateway_app`].

pub mod api;
pub mod auth_middleware;
pub mod error;
pub mod server;
pub mod state;
pub mod storage_routes;
pub mod tools_routes;
