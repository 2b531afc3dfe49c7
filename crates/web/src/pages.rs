//! Workspace dashboard pages. Every page requires a live session.

use {
    askama::Template,
    axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        response::{Html, IntoResponse, Redirect, Response},
    },
    chatlabs_gateway::{auth_middleware::authenticate, server::AppState},
    chatlabs_workspace::{ContentType, SIDEBAR_WIDTH},
    serde::Deserialize,
    tracing::{debug, warn},
};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
}

struct TabLink {
    name: &'static str,
    active: bool,
}

#[derive(Template)]
#[template(path = "workspace.html", escape = "html")]
struct WorkspaceTemplate<'a> {
    brand_name: &'a str,
    locale: &'a str,
    workspace_id: &'a str,
    tab: &'static str,
    tabs: Vec<TabLink>,
    sidebar_width: u32,
    bootstrap_url: String,
    offline_assets: bool,
}

/// Redirect to the login route unless the request carries a live session.
async fn require_session(state: &AppState, headers: &HeaderMap) -> Option<Response> {
    match authenticate(&state.gateway, headers).await {
        Ok(Some(_)) => None,
        Ok(None) => {
            debug!("no session, redirecting to login");
            Some(Redirect::to(&state.gateway.config.auth.login_path).into_response())
        },
        Err(e) => {
            warn!(error = %e, "session lookup failed");
            Some((StatusCode::INTERNAL_SERVER_ERROR, "session lookup failed").into_response())
        },
    }
}

fn render_workspace(
    state: &AppState,
    locale: &str,
    workspace_id: &str,
    query: &DashboardQuery,
) -> Response {
    let config = &state.gateway.config;
    let active = ContentType::from_tab(query.tab.as_deref());
    let template = WorkspaceTemplate {
        brand_name: &config.share.brand_name,
        locale,
        workspace_id,
        tab: active.as_str(),
        tabs: ContentType::ALL
            .into_iter()
            .map(|c| TabLink {
                name: c.as_str(),
                active: c == active,
            })
            .collect(),
        sidebar_width: SIDEBAR_WIDTH,
        bootstrap_url: format!(
            "/api/workspaces/{}/bootstrap?tab={}",
            urlencoding::encode(workspace_id),
            active.as_str()
        ),
        offline_assets: config.features.offline_assets,
    };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!(workspace_id, error = %e, "failed to render workspace page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        },
    }
}

/// `GET /{locale}/{workspace_id}`
pub async fn workspace_page_handler(
    State(state): State<AppState>,
    Path((locale, workspace_id)): Path<(String, String)>,
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
) -> Response {
    if let Some(response) = require_session(&state, &headers).await {
        return response;
    }
    render_workspace(&state, &locale, &workspace_id, &query)
}

/// `GET /{locale}/{workspace_id}/{*rest}`: nested workspace views share the
/// same dashboard shell.
pub async fn workspace_subpage_handler(
    State(state): State<AppState>,
    Path((locale, workspace_id, _rest)): Path<(String, String, String)>,
    Query(query): Query<DashboardQuery>,
    headers: HeaderMap,
) -> Response {
    if let Some(response) = require_session(&state, &headers).await {
        return response;
    }
    render_workspace(&state, &locale, &workspace_id, &query)
}
