//! Public share page `/share/{hash_id}` and its remix download
//! `/remix/{hash_id}`.

use {
    axum::{
        extract::{Path, Query, State},
        http::{StatusCode, header},
        response::{Html, IntoResponse, Response},
    },
    chatlabs_gateway::server::AppState,
    chatlabs_share::{parse_show_banner, remix_source, render_share, render_share_page},
    serde::Deserialize,
    tracing::warn,
};

#[derive(Debug, Default, Deserialize)]
pub struct ShareQuery {
    #[serde(rename = "__show_banner")]
    pub show_banner: Option<String>,
}

fn not_found_share_response() -> Response {
    (StatusCode::NOT_FOUND, "share not found").into_response()
}

pub async fn share_page_handler(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
    Query(query): Query<ShareQuery>,
) -> Response {
    let gw = &state.gateway;
    let show_banner = parse_show_banner(query.show_banner.as_deref());

    let view = match render_share(
        gw.stores.documents.as_ref(),
        &gw.branding,
        &share_id,
        show_banner,
    )
    .await
    {
        Ok(Some(view)) => view,
        Ok(None) => return not_found_share_response(),
        Err(e) => {
            warn!(share_id, error = %e, "failed to load shared document");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load share").into_response();
        },
    };

    match render_share_page(&view) {
        Ok(html) => (
            [
                (header::CACHE_CONTROL, "no-store"),
                (header::REFERRER_POLICY, "no-referrer"),
            ],
            Html(html),
        )
            .into_response(),
        Err(e) => {
            warn!(share_id, error = %e, "failed to render share page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render share").into_response()
        },
    }
}

/// `GET /remix/{share_id}`: the document's markup as a download so it can be
/// reworked in a new chat.
pub async fn remix_handler(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> Response {
    let source = match remix_source(state.gateway.stores.documents.as_ref(), &share_id).await {
        Ok(Some(source)) => source,
        Ok(None) => return not_found_share_response(),
        Err(e) => {
            warn!(share_id, error = %e, "failed to load shared document for remix");
            return (StatusCode::INTERNAL_SERVER_ERROR, "failed to load share").into_response();
        },
    };

    (
        [
            (
                header::CONTENT_TYPE,
                "text/html; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", source.file_name),
            ),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        source.html,
    )
        .into_response()
}
