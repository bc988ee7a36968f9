//! Configuration loading and merging (`spec.md` §4 C9, §6).

pub mod config;
pub mod loader;
pub mod mode;

pub use config::{Config, RawConfig, TracebackFormat};
pub use loader::{load_config, load_pyproject, load_toml, load_yaml};
pub use mode::ExtendedMode;
