use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::ChatLabsConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "chatlabs.toml",
    "chatlabs.yaml",
    "chatlabs.yml",
    "chatlabs.json",
];

static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);
static DATA_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Override the user-global config directory (e.g. from `--config-dir`).
pub fn set_config_dir(dir: PathBuf) {
    *CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner()) = Some(dir);
}

/// Override the data directory (e.g. from `--data-dir`).
pub fn set_data_dir(dir: PathBuf) {
    *DATA_DIR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner()) = Some(dir);
}

/// Returns the user-global config directory (`~/.config/chatlabs/`).
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return Some(dir);
    }
    directories::ProjectDirs::from("", "", "chatlabs").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory holding the database and object storage.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = DATA_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return dir;
    }
    directories::ProjectDirs::from("", "", "chatlabs")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".chatlabs"))
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<ChatLabsConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply
/// environment overrides.
///
/// Search order:
/// 1. `./chatlabs.{toml,yaml,yml,json}` (project-local)
/// 2. `<config_dir>/chatlabs.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `ChatLabsConfig::default()` when nothing is found or the
/// file fails to parse.
pub fn discover_and_load() -> ChatLabsConfig {
    let mut config = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                ChatLabsConfig::default()
            },
        }
    } else {
        debug!("no config file found, using defaults");
        ChatLabsConfig::default()
    };
    apply_env_overrides(&mut config);
    config
}

fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatlabs.toml")
}

/// Apply process environment overrides on top of file values.
pub fn apply_env_overrides(config: &mut ChatLabsConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(
    config: &mut ChatLabsConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(bind) = get("CHATLABS_BIND") {
        config.server.bind = bind;
    }
    if let Some(port) = get("CHATLABS_PORT") {
        match port.trim().parse() {
            Ok(port) => config.server.port = port,
            Err(e) => warn!(value = %port, error = %e, "ignoring invalid CHATLABS_PORT"),
        }
    }
    if let Some(url) = get("CHATLABS_DATABASE_URL") {
        config.database.url = Some(url);
    }

    let limit_var = ["FREE_MESSAGE_DAILY_LIMIT", "NEXT_PUBLIC_FREE_MESSAGE_DAILY_LIMIT"]
        .into_iter()
        .find_map(|name| get(name).map(|value| (name, value)));
    if let Some((name, value)) = limit_var {
        match value.trim().parse::<u32>() {
            Ok(limit) if limit > 0 => config.limits.free_daily_messages = limit,
            Ok(_) => warn!(var = name, "ignoring zero message limit"),
            Err(e) => warn!(var = name, value = %value, error = %e, "ignoring invalid message limit"),
        }
    }

    if get("ANALYZE").is_some_and(|v| v == "true") {
        config.features.analyze = true;
    }
    if let Some(value) = get("CHATLABS_OFFLINE_ASSETS") {
        config.features.offline_assets = matches!(value.trim(), "1" | "true" | "yes");
    } else if ["CHATLABS_ENV", "NODE_ENV"]
        .into_iter()
        .any(|name| get(name).is_some_and(|v| v == "production"))
    {
        config.features.offline_assets = true;
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<ChatLabsConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
