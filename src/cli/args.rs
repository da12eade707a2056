use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "medicore")]
#[command(version = "0.1.0")]
#[command(about = "Hospital orchestration chat: routes requests to specialist AI agents", long_about = None)]
pub struct Cli {
    /// Model to use (e.g., gemini-2.5-flash, gemini/gemini-2.5-flash for a LiteLLM proxy)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Backend provider (gemini or openai)
    #[arg(long)]
    pub provider: Option<String>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip the routing and handoff pauses
    #[arg(long)]
    pub no_pacing: bool,

    /// Non-interactive prompt to execute
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Image to attach to the non-interactive prompt
    #[arg(long, requires = "prompt")]
    pub image: Option<PathBuf>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Start a chat session (default)
    Chat,
    /// Show version information
    Version,
    /// Check configuration and backend reachability
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}
