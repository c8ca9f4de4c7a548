pub mod config;
pub mod errors;
pub mod hashrate;
pub mod logger;
pub mod pools;
pub mod setup;
