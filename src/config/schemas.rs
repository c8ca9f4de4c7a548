/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro which provides:
/// - Single-source definition (no repetition)
/// - Embedded defaults
/// - Serde support
use crate::config_struct;
use crate::pools::PoolConfig;

// ============================================================================
// MONITOR CONFIGURATION
// ============================================================================

config_struct! {
    /// Polling behaviour of the host process
    pub struct MonitorConfig {
        /// Per-request timeout handed to the HTTP client
        request_timeout_secs: u64 = 30,

        /// Delay between polls when running continuously
        poll_interval_secs: u64 = 60,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration file layout
    ///
    /// ```toml
    /// [monitor]
    /// request_timeout_secs = 30
    /// poll_interval_secs = 60
    ///
    /// [[pools]]
    /// pool_key = "ck_pool"
    /// address = "bc1q..."
    /// ```
    pub struct Config {
        monitor: MonitorConfig = MonitorConfig::default(),
        pools: Vec<PoolConfig> = Vec::new(),
    }
}
