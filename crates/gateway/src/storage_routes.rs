//! Public object storage reads.

use {
    axum::{
        extract::{Path, State},
        http::{StatusCode, header},
        response::{IntoResponse, Response},
    },
    tracing::debug,
};

use crate::{error::ApiError, server::AppState};

fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// `GET /storage/{bucket}/{*key}`
pub async fn object_handler(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    match state.gateway.stores.objects.get(&bucket, &key).await {
        Ok(Some(bytes)) => (
            [
                (header::CONTENT_TYPE, content_type_for(&key)),
                (header::CACHE_CONTROL, "public, max-age=3600"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "object not found").into_response(),
        Err(chatlabs_store::Error::InvalidObjectKey { key }) => {
            debug!(bucket, key, "rejected object key");
            (StatusCode::NOT_FOUND, "object not found").into_response()
        },
        Err(e) => ApiError::from(e).into_response(),
    }
}
