mod config_commands;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "chatlabs", about = "ChatLabs gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Custom config directory.
    #[arg(long, global = true, env = "CHATLABS_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
    /// Custom data directory (database and object storage).
    #[arg(long, global = true, env = "CHATLABS_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server (default when no subcommand is provided).
    Gateway,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
    /// List the model catalog and which models need a paid plan.
    Models,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn apply_dir_overrides(cli: &Cli) {
    if let Some(ref dir) = cli.config_dir {
        chatlabs_config::set_config_dir(dir.clone());
    }
    if let Some(ref dir) = cli.data_dir {
        chatlabs_config::set_data_dir(dir.clone());
    }
}

async fn run_gateway(cli: Cli) -> anyhow::Result<()> {
    let mut config = chatlabs_config::discover_and_load();

    // CLI args override config values
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    for d in chatlabs_config::validate(&config) {
        match d.severity {
            chatlabs_config::Severity::Error => {
                anyhow::bail!("invalid config at {}: {}", d.path, d.message)
            },
            chatlabs_config::Severity::Warning => {
                tracing::warn!(path = d.path, "{}", d.message)
            },
        }
    }

    let state = chatlabs_gateway::server::open_state(config, chatlabs_config::data_dir()).await?;
    chatlabs_gateway::server::start_gateway(state, chatlabs_web::web_routes()).await
}

fn list_models() {
    let catalog = chatlabs_subscription::ModelCatalog::default();
    for model in catalog.iter() {
        let tier = if model.paid { "pro" } else { "free" };
        println!("  {:<40} {:<12} {tier}", model.model_id, model.provider.as_str());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let mut cli = Cli::parse();

    init_telemetry(&cli);
    apply_dir_overrides(&cli);

    match cli.command.take() {
        // Default: start gateway when no subcommand is provided
        None | Some(Commands::Gateway) => {
            info!(version = env!("CARGO_PKG_VERSION"), "chatlabs starting");
            run_gateway(cli).await
        },
        Some(Commands::Config { action }) => config_commands::handle_config(action),
        Some(Commands::Models) => {
            list_models();
            Ok(())
        },
    }
}
