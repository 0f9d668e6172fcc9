mod structs;

pub use structs::{
    AnalyticsConfig, ApiConfig, CleanupConfig, DatabaseConfig, LoggingConfig, ResolverConfig,
    ServerConfig, StaticConfig,
};

use std::sync::OnceLock;

static CONFIG: OnceLock<StaticConfig> = OnceLock::new();

/// Load the configuration exactly once (TOML file + environment overrides).
pub fn init_config() -> &'static StaticConfig {
    CONFIG.get_or_init(StaticConfig::load)
}

/// Access the global configuration, loading it on first use.
pub fn get_config() -> &'static StaticConfig {
    CONFIG.get_or_init(StaticConfig::load)
}
