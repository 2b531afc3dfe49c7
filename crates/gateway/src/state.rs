use std::sync::Arc;

use {
    chatlabs_accounts::KeyFallbacks,
    chatlabs_config::ChatLabsConfig,
    chatlabs_share::Branding,
    chatlabs_store::{
        DocumentStore, MessageStore, ObjectStore, ProfileStore, SessionStore, WorkspaceStore,
    },
    chatlabs_subscription::{GateContext, ModelCatalog, PlanGate},
    chatlabs_tools::{StabilityClient, StableDiffusion3Tool, ToolRegistry},
};

/// Persistence collaborators shared by every handler.
#[derive(Clone)]
pub struct GatewayStores {
    pub sessions: Arc<dyn SessionStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub messages: Arc<dyn MessageStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub workspaces: Arc<dyn WorkspaceStore>,
    pub objects: Arc<dyn ObjectStore>,
}

impl GatewayStores {
    /// Use one backend for every record store.
    pub fn from_store<S>(store: Arc<S>, objects: Arc<dyn ObjectStore>) -> Self
    where
        S: SessionStore + ProfileStore + MessageStore + DocumentStore + WorkspaceStore + 'static,
    {
        Self {
            sessions: store.clone(),
            profiles: store.clone(),
            messages: store.clone(),
            documents: store.clone(),
            workspaces: store,
            objects,
        }
    }
}

pub struct GatewayState {
    pub version: String,
    pub config: ChatLabsConfig,
    pub stores: GatewayStores,
    pub gate: PlanGate,
    pub fallbacks: KeyFallbacks,
    pub tools: ToolRegistry,
    pub branding: Branding,
}

impl GatewayState {
    pub fn new(
        config: ChatLabsConfig,
        stores: GatewayStores,
        fallbacks: KeyFallbacks,
        tools: ToolRegistry,
    ) -> Arc<Self> {
        let gate = PlanGate::new(ModelCatalog::default(), config.limits.free_daily_messages);
        let branding = Branding {
            name: config.share.brand_name.clone(),
            url: config.share.brand_url.clone(),
        };
        Arc::new(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            stores,
            gate,
            fallbacks,
            tools,
            branding,
        })
    }

    pub fn gate_context(&self) -> GateContext<'_> {
        GateContext {
            sessions: self.stores.sessions.as_ref(),
            profiles: self.stores.profiles.as_ref(),
            messages: self.stores.messages.as_ref(),
            fallbacks: &self.fallbacks,
        }
    }
}

/// Built-in platform tools, wired to the configured image provider and
/// object store.
pub fn default_tools(
    config: &ChatLabsConfig,
    stability: StabilityClient,
    objects: Arc<dyn ObjectStore>,
) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(StableDiffusion3Tool::new(
        stability,
        objects,
        config.image_generation.bucket.clone(),
    )));
    tools
}
