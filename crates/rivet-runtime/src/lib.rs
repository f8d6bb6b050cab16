//! # Rivet Runtime
//!
//! Runtime orchestration for the Rivet bot framework: layered
//! configuration loading, logging setup, and a signal-driven run loop for
//! a [`Router`](rivet_core::Router).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivet_runtime::Runtime;
//!
//! // Auto-loads rivet.toml from the current directory
//! let runtime = Runtime::new();
//!
//! // Custom configuration
//! let runtime = Runtime::builder()
//!     .config_file("config/rivet.toml")
//!     .profile("production")
//!     .build()?;
//! ```
//!
//! ## Features
//!
//! - `toml-config` — TOML configuration files (`rivet.toml`, `config.toml`)
//! - `yaml-config` — YAML configuration files
//! - `json-log` — JSON log output format

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    BotConfig, ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel, LogOutput,
    LoggingConfig, RivetConfig, RouterConfig, load_config, load_config_from_file,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{Runtime, RuntimeBuilder};
