use std::{path::PathBuf, sync::Arc};

use {
    axum::{
        Router,
        extract::State,
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    chatlabs_accounts::KeyFallbacks,
    chatlabs_config::ChatLabsConfig,
    chatlabs_store::{FsObjectStore, ObjectStore, SqliteStore},
    chatlabs_tools::StabilityClient,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::info,
};

use crate::{
    api, auth_middleware,
    state::{GatewayState, GatewayStores, default_tools},
    storage_routes, tools_routes,
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
///
/// `pages` carries the browser-facing routes (share pages, workspace pages,
/// offline assets) and is merged after the API routes.
pub fn build_gateway_app(state: Arc<GatewayState>, pages: Router<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app_state = AppState { gateway: state };
    let analyze = app_state.gateway.config.features.analyze;

    let protected = Router::new()
        .route("/api/chat/validate", post(api::validate_chat_handler))
        .route("/api/messages/counter", get(api::message_counter_handler))
        .route(
            "/api/workspaces/{workspace_id}/bootstrap",
            get(api::workspace_bootstrap_handler),
        )
        .route("/api/tools", get(tools_routes::list_tools_handler))
        .route(
            "/api/tools/{tool_name}/{function_id}",
            post(tools_routes::invoke_tool_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware::require_auth,
        ));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/storage/{bucket}/{*key}", get(storage_routes::object_handler))
        .merge(protected)
        .merge(pages)
        .layer(cors);

    if analyze {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(app_state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.gateway.version,
    }))
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Open the SQLite store and object storage described by `config` and wire
/// up the gateway state. Provider fallback keys come from the environment.
pub async fn open_state(
    config: ChatLabsConfig,
    data_dir: PathBuf,
) -> anyhow::Result<Arc<GatewayState>> {
    std::fs::create_dir_all(&data_dir)?;

    let db_url = config.database.url.clone().unwrap_or_else(|| {
        format!("sqlite:{}?mode=rwc", data_dir.join("chatlabs.db").display())
    });
    let store = Arc::new(SqliteStore::new(&db_url).await?);

    let storage_root = config
        .storage
        .root
        .as_ref()
        .map_or_else(|| data_dir.join("storage"), PathBuf::from);
    let objects: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(
        storage_root,
        config.storage.public_base_url.clone(),
    ));

    let stability = StabilityClient::from_env(config.image_generation.api_base_url.clone());
    if !stability.is_configured() {
        info!("STABILITY_API_KEY not set, image generation will be rejected");
    }
    let tools = default_tools(&config, stability, Arc::clone(&objects));
    let stores = GatewayStores::from_store(store, objects);

    Ok(GatewayState::new(
        config,
        stores,
        KeyFallbacks::from_env(),
        tools,
    ))
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_gateway(
    state: Arc<GatewayState>,
    pages: Router<AppState>,
) -> anyhow::Result<()> {
    let bind = state.config.server.bind.clone();
    let port = state.config.server.port;
    let analyze = state.config.features.analyze;
    let offline_assets = state.config.features.offline_assets;

    let app = build_gateway_app(state, pages);
    let listener = tokio::net::TcpListener::bind((bind.as_str(), port)).await?;

    let lines = [
        format!("chatlabs gateway v{}", env!("CARGO_PKG_VERSION")),
        format!("listening on http://{}", listener.local_addr()?),
        format!("analyze: {analyze}, offline assets: {offline_assets}"),
    ];
    for line in &lines {
        info!("{line}");
    }

    axum::serve(listener, app).await?;
    Ok(())
}
