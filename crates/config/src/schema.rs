//! Config schema types.

use serde::{Deserialize, Serialize};

/// Default free-tier daily message allowance.
pub const DEFAULT_FREE_DAILY_MESSAGES: u32 = 30;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatLabsConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub share: ShareConfig,
    pub auth: AuthConfig,
    pub features: FeaturesConfig,
    pub image_generation: ImageGenerationConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    pub port: u16,
    /// Externally visible origin, e.g. `https://labs.example.com`. Used for
    /// absolute links; relative links are emitted when unset.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
            public_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL. Defaults to `<data_dir>/chatlabs.db`.
    pub url: Option<String>,
}

/// Object storage for assistant images and generated images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory. Defaults to `<data_dir>/storage`.
    pub root: Option<String>,
    /// Prefix used when building public object URLs.
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            public_base_url: "/storage".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Messages a free-plan tenant may send per day before the gate refuses.
    pub free_daily_messages: u32,
    /// Upper bound on concurrent assistant image loads during workspace
    /// bootstrap.
    pub assistant_image_concurrency: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            free_daily_messages: DEFAULT_FREE_DAILY_MESSAGES,
            assistant_image_concurrency: 8,
        }
    }
}

/// Branding for public share pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub brand_name: String,
    pub brand_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            brand_name: "ChatLabs".into(),
            brand_url: "https://labs.writingmate.ai/".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Where page routes redirect when no session is present.
    pub login_path: String,
    pub session_cookie: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".into(),
            session_cookie: "chatlabs_session".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Per-request trace logging with latency.
    pub analyze: bool,
    /// Serve the web manifest and the caching service worker.
    pub offline_assets: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageGenerationConfig {
    pub api_base_url: String,
    /// Object storage bucket receiving generated images.
    pub bucket: String,
}

impl Default for ImageGenerationConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.stability.ai".into(),
            bucket: "generated_images".into(),
        }
    }
}
