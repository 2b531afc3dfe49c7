use {anyhow::Result, clap::Subcommand};

use chatlabs_config::{Severity, validate};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (file plus environment overrides).
    Show,
    /// Validate the configuration and report errors/warnings.
    Validate,
}

pub fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show(),
        ConfigAction::Validate => check(),
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn show() -> Result<()> {
    let path = chatlabs_config::find_or_default_config_path();
    let config = chatlabs_config::discover_and_load();
    eprintln!("# {}", path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn check() -> Result<()> {
    let path = chatlabs_config::find_or_default_config_path();
    if path.exists() {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let config = chatlabs_config::discover_and_load();
    let diagnostics = validate(&config);

    for d in &diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;

    if !diagnostics.is_empty() {
        eprintln!();
    }

    if diagnostics.is_empty() {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}
