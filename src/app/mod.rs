// Gateway module for app - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod config;

// Public re-exports - the ONLY way to access app functionality
pub use config::{
    get_config_dir, get_log_file, init_config, load_config, load_config_file, save_config,
    Config, EndpointConfig, InputConfig, ModelSettings, PacingConfig, UIConfig,
};
