/// Configuration utilities - loading, saving, and access helpers
///
/// - Loading configuration from disk
/// - Thread-safe access helpers
/// - Persisting validated pool entries
use super::schemas::Config;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

/// Global configuration instance
///
/// Access it using the helper functions below.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Read and parse a configuration file without touching the global
///
/// A missing file yields the defaults.
pub fn read_config_file(path: &str) -> Result<Config, String> {
    if !std::path::Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

    toml::from_str::<Config>(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))
}

/// Load configuration from the default path and initialize the global CONFIG
pub fn load_config() -> Result<(), String> {
    load_config_from_path(CONFIG_FILE_PATH)
}

/// Load configuration from a specific file path
///
/// # Returns
/// - `Ok(())` - Configuration loaded successfully
/// - `Err(String)` - Error message if loading failed
pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let config = read_config_file(path)?;

    logger::debug(
        LogTag::Config,
        &format!("Loaded {} pool entries from '{}'", config.pools.len(), path),
    );

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| "Config already initialized".to_string())
}

/// Execute a function with read access to the configuration
///
/// Falls back to the defaults when the config was never loaded.
///
/// # Example
/// ```
/// use poolstats::config::with_config;
///
/// let interval = with_config(|cfg| cfg.monitor.poll_interval_secs);
/// assert!(interval > 0);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(config_lock) => f(&config_lock.read()),
        None => f(&Config::default()),
    }
}

/// Get a clone of the entire configuration
///
/// Useful when config values must be held across await points.
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

/// Replace the in-memory configuration
pub fn update_config<F: FnOnce(&mut Config)>(f: F) -> Result<(), String> {
    let config_lock = CONFIG
        .get()
        .ok_or_else(|| "Config not initialized. Call load_config() first.".to_string())?;
    f(&mut config_lock.write());
    Ok(())
}

/// Save the current configuration to disk
///
/// # Arguments
/// * `path` - Path where to save the configuration (default: CONFIG_FILE_PATH)
pub fn save_config(path: Option<&str>) -> Result<(), String> {
    let path = path.unwrap_or(CONFIG_FILE_PATH);

    let config_str = with_config(|cfg| {
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))
    })?;

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
    }

    std::fs::write(path, config_str)
        .map_err(|e| format!("Failed to write config file '{}': {}", path, e))
}
