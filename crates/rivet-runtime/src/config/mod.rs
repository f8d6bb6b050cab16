//! Configuration module for the Rivet runtime.
//!
//! Provides the serde schema, a figment-based layered loader, and
//! validation for bot, router and logging settings.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    BotConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, RivetConfig, RouterConfig,
};
