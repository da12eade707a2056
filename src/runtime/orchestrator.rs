use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    app::{get_log_file, load_config, load_config_file, Config, PacingConfig},
    cli::{handle_command, Cli},
    models::BackendFactory,
    tui::{run_ui, App},
    utils::{init_logger, log_info, log_warn, LogSink},
};

/// Load configuration and fold in command-line overrides
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        load_config_file(config_path)?
    } else {
        match load_config() {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("⚠️  Failed to load config: {:#}. Using defaults.", e);
                Config::default()
            }
        }
    };

    if let Some(provider) = &cli.provider {
        config.model.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if cli.no_pacing {
        config.pacing = PacingConfig::disabled();
    }

    Ok(config)
}

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let config = resolve_config(&cli)?;
        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(()); // Command handled, exit
            }
            // Continue to chat for Commands::Chat
        }

        // Logs go to a file so the alternate screen stays intact
        if self.cli.verbose || std::env::var_os("RUST_LOG").is_some() {
            let log_file = get_log_file()?;
            init_logger(LogSink::File(&log_file))
                .with_context(|| format!("Failed to open log file {}", log_file.display()))?;
            println!("📝 Logging to {}", log_file.display());
        }

        let backend = match BackendFactory::create(&self.config) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("❌ Failed to initialize backend: {}", e);
                eprintln!("   Run `medicore status` to check your configuration.");
                std::process::exit(1);
            }
        };

        if !backend.validate_connection().await.unwrap_or(false) {
            log_warn("⚠️", format!("{} did not answer the health check", backend.name()));
        }

        println!(
            "🏥 Starting MediCore with {} ({})",
            self.config.model.name.green(),
            self.config.model.provider
        );
        log_info("🏥", format!("Interactive session on {}", backend.name()));

        let app = App::new(backend, self.config);
        run_ui(app).await
    }
}
