/// Runtime orchestrator module - Gateway

mod exchange;
mod non_interactive;
mod orchestrator;

pub use exchange::{run_exchange, spawn_exchange, ExchangeEvent};
pub use non_interactive::{
    succeeded, visualization_lines, ExecutionMetadata, NonInteractiveResult,
    NonInteractiveRunner,
};
pub use orchestrator::{resolve_config, Orchestrator};
