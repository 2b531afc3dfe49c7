//! Platform tool listing and invocation.

use {
    axum::{
        Json,
        extract::{Path, State},
        response::IntoResponse,
    },
    chatlabs_tools::ToolInvocation,
    tracing::info,
};

use crate::{error::ApiError, server::AppState};

/// `GET /api/tools`
pub async fn list_tools_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.gateway.tools.descriptors())
}

/// `POST /api/tools/{tool_name}/{function_id}`
///
/// Body: `{"params": {...}, "settings": {...}}`. Both fields are optional.
pub async fn invoke_tool_handler(
    State(state): State<AppState>,
    Path((tool_name, function_id)): Path<(String, String)>,
    Json(invocation): Json<ToolInvocation>,
) -> Result<impl IntoResponse, ApiError> {
    let output = state
        .gateway
        .tools
        .invoke(&tool_name, &function_id, invocation)
        .await?;
    info!(tool_name, function_id, "platform tool invoked");
    Ok(Json(output))
}
