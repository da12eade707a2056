pub mod agents;
pub mod app;
pub mod cli;
pub mod constants;
pub mod input;
pub mod models;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;
pub mod visualization;

pub use agents::{AgentCategory, AgentResponse, Payload};
pub use app::{load_config, Config};
pub use models::{AgentBackend, BackendFactory};
pub use session::Session;
pub use tui::run_ui;
pub use utils::MedicoreError;
