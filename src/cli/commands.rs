use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    models::{BackendFactory, PROVIDERS},
    utils::log_error,
};

use super::Commands;

/// Handle CLI subcommands
pub async fn handle_command(command: &Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing MediCore configuration...");
            let path = init_config()?;
            println!("Configuration initialized at {}", path.display().to_string().green());
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("MediCore v{}", env!("CARGO_PKG_VERSION"));
    println!("   Hospital orchestration chat for records, billing, clinical and education agents");
}

/// Show configuration and backend status
async fn show_status(config: &Config) -> Result<()> {
    println!("MediCore Status:");
    println!();

    // Configuration file
    let config_path = get_config_dir()?.join("config.toml");
    if config_path.exists() {
        println!("  {} Configuration: {}", "[OK]".green(), config_path.display());
    } else {
        println!(
            "  {} Configuration: Not found (using defaults, run `medicore init`)",
            "[WARNING]".yellow()
        );
    }

    println!(
        "  {} Model: {} via {} (known providers: {})",
        "[INFO]".cyan(),
        config.model.name,
        config.model.provider,
        PROVIDERS.join(", ")
    );

    // API keys
    for (label, endpoint) in [("Gemini", &config.gemini), ("OpenAI-compatible", &config.openai)] {
        if endpoint.api_key().is_some() {
            println!("  {} {}: {} set", "[OK]".green(), label, endpoint.api_key_env);
        } else {
            println!("  {} {}: {} not set", "[WARNING]".yellow(), label, endpoint.api_key_env);
        }
    }

    // Backend reachability
    match BackendFactory::create(config) {
        Ok(backend) => match backend.validate_connection().await {
            Ok(true) => println!("  {} Backend: {} reachable", "[OK]".green(), backend.name()),
            Ok(false) => println!(
                "  {} Backend: {} answered but is not ready",
                "[WARNING]".yellow(),
                backend.name()
            ),
            Err(e) => {
                log_error("❌", format!("Health check failed: {}", e));
                println!("  {} Backend: {}", "[ERROR]".red(), e);
            }
        },
        Err(e) => println!("  {} Backend: {}", "[ERROR]".red(), e),
    }

    println!();
    Ok(())
}
