/// Configuration for the poolstats host process
///
/// Schemas are declared with `config_struct!`, loaded from TOML and kept in a
/// process-wide `CONFIG` cell.
pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{Config, MonitorConfig};
pub use utils::{
    get_config_clone, load_config, load_config_from_path, read_config_file, save_config,
    update_config, with_config, CONFIG_FILE_PATH,
};
