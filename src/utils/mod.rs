pub mod config;
pub mod logger;
pub mod manifest;
pub(crate) mod orgstat_toml;

pub use config::*;
pub use logger::setup_logging;
pub use manifest::load_manifest;
