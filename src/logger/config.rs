/// Logger configuration parsed from command-line flags
///
/// Recognized flags:
/// - `--debug-<tag>`: show debug logs for one tag (`--debug-all` for every tag)
/// - `--verbose`: show everything, `--verbose-<tag>` for one tag
/// - `--quiet`: errors only
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub debug_tags: HashSet<String>,
    pub verbose_tags: HashSet<String>,
    pub debug_all: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            debug_all: false,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build a config from an argument list
pub fn config_from_args<I, S>(args: I) -> LoggerConfig
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut config = LoggerConfig::default();

    for arg in args {
        let arg = arg.as_ref();
        if arg == "--quiet" {
            config.min_level = LogLevel::Error;
        } else if arg == "--verbose" {
            config.min_level = LogLevel::Verbose;
        } else if arg == "--debug-all" {
            config.debug_all = true;
            config.min_level = config.min_level.max(LogLevel::Debug);
        } else if let Some(tag) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(tag.to_lowercase());
            config.min_level = config.min_level.max(LogLevel::Debug);
        } else if let Some(tag) = arg.strip_prefix("--verbose-") {
            config.verbose_tags.insert(tag.to_lowercase());
            config.debug_tags.insert(tag.to_lowercase());
            config.min_level = config.min_level.max(LogLevel::Debug);
        }
    }

    config
}

/// Scan the process arguments and install the resulting config
pub fn init_from_args() {
    set_logger_config(config_from_args(std::env::args().skip(1)));
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.debug_all
        || config.min_level == LogLevel::Verbose
        || config.debug_tags.contains(&tag.to_debug_key())
}

pub fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().verbose_tags.contains(&tag.to_debug_key())
}
