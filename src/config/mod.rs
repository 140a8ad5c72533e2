mod error;
mod lists;
mod settings;

pub use error::ConfigError;
pub use lists::{load_address_pool, load_target_set, parse_lines};
pub use settings::{CloudflareConfig, DaemonConfig, Overrides, Settings, TargetsConfig};
