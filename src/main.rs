use anyhow::Result;
use clap::Parser;

use medicore::{
    cli::Cli,
    models::BackendFactory,
    runtime::{resolve_config, succeeded, NonInteractiveRunner, Orchestrator},
    utils::{init_logger, LogSink},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Check if running in non-interactive mode
    if let Some(prompt) = cli.prompt.clone() {
        run_non_interactive(cli, prompt).await
    } else {
        // Create and run the orchestrator for interactive mode
        let orchestrator = Orchestrator::new(cli)?;
        orchestrator.run().await
    }
}

/// Run in non-interactive mode
async fn run_non_interactive(cli: Cli, prompt: String) -> Result<()> {
    // Set up logging if verbose
    if cli.verbose || std::env::var_os("RUST_LOG").is_some() {
        init_logger(LogSink::Stderr)?;
    }

    let config = resolve_config(&cli)?;
    let backend = BackendFactory::create(&config)?;

    let runner = NonInteractiveRunner::new(backend, config.pacing.clone(), config.input.max_image_bytes);

    // Execute the prompt
    let result = runner.execute(prompt, cli.image.as_deref()).await?;

    // Format and output the result
    let formatted = runner.format_result(&result, cli.output_format);
    println!("{}", formatted);

    // Exit with appropriate code
    if !succeeded(&result) {
        std::process::exit(1);
    }

    Ok(())
}
