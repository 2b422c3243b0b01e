use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Get the global configuration if it has been initialized
pub fn try_get_config() -> Option<Arc<StaticConfig>> {
    CONFIG.get().map(|c| c.load_full())
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (default "config.toml").
/// If the file doesn't exist, uses in-memory defaults.
///
/// # Examples
/// ```no_run
/// use sitepulse::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Replace the global configuration (used by tests and `config` reloads)
pub fn set_config(config: StaticConfig) {
    match CONFIG.get() {
        Some(current) => current.store(Arc::new(config)),
        None => {
            CONFIG.get_or_init(|| ArcSwap::from_pointee(config));
        }
    }
}
