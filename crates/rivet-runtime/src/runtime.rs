//! Runtime orchestration: configuration, logging and the run loop.
//!
//! The runtime owns nothing of the routing machinery itself — the caller
//! wires a [`Router`] over its transport and service, and the runtime runs
//! it until a shutdown signal arrives:
//!
//! ```rust,ignore
//! use rivet_runtime::Runtime;
//!
//! let runtime = Runtime::new();
//! let service = Arc::new(BotService::with_capacity(
//!     transport,
//!     runtime.config().router.bus_capacity,
//! ));
//! let mut router = Router::new(Arc::clone(&service));
//! router.register_command("ping", ping_handler);
//! runtime.run(router).await?;
//! ```

use tokio::signal;
use tracing::info;

use rivet_core::Router;

use crate::config::{ConfigLoader, ConfigResult, RivetConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// The Rivet runtime: configuration plus a signal-driven run loop.
pub struct Runtime {
    config: RivetConfig,
}

impl Runtime {
    /// Creates a runtime with automatic configuration loading.
    ///
    /// Searches the default locations for a config file; if loading fails
    /// the defaults are used. Logging is initialized from the resulting
    /// configuration.
    pub fn new() -> Self {
        let config = ConfigLoader::new().with_current_dir().load().unwrap_or_else(|e| {
            eprintln!("warning: failed to load config ({e}), using defaults");
            RivetConfig::default()
        });

        Self::from_config(&config)
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already-loaded configuration.
    ///
    /// Initializes logging from the configuration (a no-op if a subscriber
    /// is already installed).
    pub fn from_config(config: &RivetConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            bus_capacity = config.router.bus_capacity,
            "runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &RivetConfig {
        &self.config
    }

    /// Runs the router until a shutdown signal is received.
    ///
    /// Starts routing, waits for Ctrl+C (or SIGTERM on unix), then stops
    /// the router and drains its tasks.
    pub async fn run(&self, router: Router) -> RuntimeResult<()> {
        let handle = router.start_routing();

        info!("rivet runtime is now running, press Ctrl+C to stop");
        Self::wait_for_shutdown().await;

        handle.stop();
        handle.join().await;

        info!("runtime stopped");
        Ok(())
    }

    /// Runs the router until the given future completes.
    pub async fn run_until<F>(&self, router: Router, shutdown: F) -> RuntimeResult<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let handle = router.start_routing();

        shutdown.await;

        handle.stop();
        handle.join().await;
        Ok(())
    }

    /// Waits for shutdown signals (Ctrl+C or SIGTERM).
    async fn wait_for_shutdown() {
        #[cfg(unix)]
        {
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");

            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("received Ctrl+C, shutting down");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("failed to listen for Ctrl+C");
            info!("received Ctrl+C, shutting down");
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`Runtime`] with custom configuration sources.
///
/// # Example
///
/// ```rust,ignore
/// let runtime = Runtime::builder()
///     .config_file("config/production.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: RivetConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<Runtime> {
        let config = self.config_loader.load()?;
        Ok(Runtime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_core::{BotService, ChatEvent, Outcome, RawUpdate, Router, SenderProfile, Transport};
    use std::sync::Arc;
    use std::time::Duration;

    struct NullTransport;

    #[async_trait::async_trait]
    impl Transport for NullTransport {
        fn name(&self) -> &str {
            "null"
        }

        async fn send_text(&self, _chat_id: i64, _text: &str) -> rivet_core::TransportResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_until_stops_the_router() {
        let runtime = Runtime::builder().without_env().build().unwrap();
        let service = Arc::new(BotService::new(Arc::new(NullTransport)));
        let mut router = Router::new(Arc::clone(&service));

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        router.register_command("stop", move |_event: ChatEvent| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(());
                Ok(Outcome::Done)
            }
        });

        // Publish once routing is up; run_until only subscribes when awaited.
        let publisher = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                service.handle_update(RawUpdate::text(1, SenderProfile::new(2, "Ada"), "/stop"));
            })
        };

        let run = runtime.run_until(router, async {
            let _ = rx.recv().await;
        });

        tokio::time::timeout(Duration::from_secs(2), run)
            .await
            .expect("runtime did not shut down")
            .unwrap();
        publisher.await.unwrap();
    }
}
