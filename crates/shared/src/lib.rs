// mapview - Shared Library
// Ambient pieces used by every mapview crate: binary reading, config, logging

pub mod config;
pub mod log;
pub mod util;

pub use util::byte_buffer::ByteBuffer;

/// Environment variable prefix checked before the config file
pub const CONFIG_ENV_PREFIX: &str = "Mapview_";

/// Default config file name
pub const DEFAULT_CONFIG: &str = "mapview.conf";
