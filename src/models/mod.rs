// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod factory;
mod gemini;
mod openai;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod testing;

// Public re-exports - the ONLY way to access model functionality
pub use factory::{BackendFactory, PROVIDERS};
pub use gemini::GeminiBackend;
pub use openai::OpenAiCompatibleBackend;
pub use traits::AgentBackend;
pub use types::GenerationConfig;
