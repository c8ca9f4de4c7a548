//! Structured logging for poolstats
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via --debug-<tag> flags
//! - Colored console output
//!
//! ## Usage
//!
//! ```rust
//! use poolstats::logger::{self, LogTag};
//!
//! logger::error(LogTag::Pool, "Lookup failed");
//! logger::warning(LogTag::Pool, "No workers found for address bc1q...");
//! logger::info(LogTag::System, "Polling 3 pools");
//! logger::debug(LogTag::Api, "Fetching workers from https://..."); // Only if --debug-api
//! ```
//!
//! ## Initialization
//!
//! Call once at startup:
//! ```rust
//! poolstats::logger::init();
//! ```

mod config;
mod core;
mod format;
mod levels;
mod special;
mod tags;

pub use config::{
    config_from_args, get_logger_config, init_from_args, set_logger_config, LoggerConfig,
};
pub use levels::LogLevel;
pub use special::log_poll_summary;
pub use tags::LogTag;

/// Initialize the logger system from command-line arguments
pub fn init() {
    config::init_from_args();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown unless --quiet)
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when --debug-<tag> (or --debug-all) is provided.
///
/// # Example
/// ```rust
/// use poolstats::logger::{self, LogTag};
/// // Only shown with --debug-api flag
/// logger::debug(LogTag::Api, "Response status: 200");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (raw payloads, only with --verbose)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}
