//! Session-scoped JSON API: chat gating, message counter, workspace bootstrap.

use {
    axum::{
        Extension, Json,
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
    },
    chatlabs_accounts::load_server_profile,
    chatlabs_subscription::{message_counter, start_of_day, validate_model_and_message_count},
    chatlabs_workspace::{ContentType, WorkspaceState, bootstrap},
    chrono::Utc,
    serde::Deserialize,
    tracing::{debug, warn},
};

use crate::{auth_middleware::AuthUser, error::ApiError, server::AppState};

#[derive(Debug, Deserialize)]
pub struct ValidateChatRequest {
    pub model: String,
}

/// `POST /api/chat/validate`
///
/// 204 when the caller may send a message with `model` right now.
pub async fn validate_chat_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ValidateChatRequest>,
) -> Result<StatusCode, ApiError> {
    let gw = &state.gateway;
    let profile = validate_model_and_message_count(
        &gw.gate,
        gw.gate_context(),
        Some(&user.token),
        &body.model,
        start_of_day(Utc::now()),
    )
    .await?;
    debug!(user_id = %profile.user_id, model = %body.model, "chat request allowed");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/messages/counter`
///
/// `{"counter": null}` for paid plans.
pub async fn message_counter_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let gw = &state.gateway;
    let profile = load_server_profile(
        gw.stores.sessions.as_ref(),
        gw.stores.profiles.as_ref(),
        &gw.fallbacks,
        Some(&user.token),
    )
    .await?;

    let count = if profile.plan.is_free() {
        match gw
            .stores
            .messages
            .count_messages_since(&profile.user_id, start_of_day(Utc::now()))
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!(user_id = %profile.user_id, error = %e, "message count unavailable");
                None
            },
        }
    } else {
        None
    };

    let counter = message_counter(&profile, count, gw.gate.free_daily_messages());
    Ok(Json(serde_json::json!({ "counter": counter })))
}

#[derive(Debug, Default, Deserialize)]
pub struct BootstrapQuery {
    pub tab: Option<String>,
}

/// `GET /api/workspaces/{workspace_id}/bootstrap`
pub async fn workspace_bootstrap_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(workspace_id): Path<String>,
    Query(query): Query<BootstrapQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let gw = &state.gateway;

    // Someone else's workspace looks exactly like a missing one, and nothing
    // else about it is loaded.
    let owned = gw
        .stores
        .workspaces
        .get_workspace(&workspace_id)
        .await?
        .is_some_and(|w| w.user_id == user.user_id);
    if !owned {
        debug!(workspace_id, user_id = %user.user_id, "workspace missing or owned by another user");
        return Err(ApiError::NotFound(format!(
            "workspace not found: {workspace_id}"
        )));
    }

    let boot = bootstrap(
        gw.stores.workspaces.as_ref(),
        gw.stores.objects.as_ref(),
        &workspace_id,
        gw.config.limits.assistant_image_concurrency,
    )
    .await?;

    let mut workspace_state = WorkspaceState::new();
    workspace_state.set_content_type(ContentType::from_tab(query.tab.as_deref()));
    workspace_state.hydrate(boot);
    Ok(Json(workspace_state))
}
