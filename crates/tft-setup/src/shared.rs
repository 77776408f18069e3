//! Shared handle to the active configuration.
//!
//! Consumers hold an `Arc<ResolvedConfig>` snapshot. Reconfiguration
//! resolves a new description first and swaps the pointer only on success,
//! so a reader sees either the old configuration or the new one.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::raw::RawDescription;
use crate::resolve::{resolve, ResolvedConfig};

struct Active {
    generation: u64,
    config: Arc<ResolvedConfig>,
}

/// Atomically replaceable configuration shared by transport and rendering.
pub struct SharedConfig {
    active: RwLock<Active>,
}

impl SharedConfig {
    /// Creates a handle holding an initial configuration (generation 0).
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            active: RwLock::new(Active {
                generation: 0,
                config: Arc::new(config),
            }),
        }
    }

    /// Returns a snapshot of the current configuration.
    pub fn current(&self) -> Arc<ResolvedConfig> {
        // The lock only guards a pointer swap, so a poisoned lock still holds
        // a complete configuration.
        let active = self.active.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&active.config)
    }

    /// Number of successful replacements so far.
    pub fn generation(&self) -> u64 {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Installs a new configuration and returns the previous one.
    pub fn replace(&self, config: ResolvedConfig) -> Arc<ResolvedConfig> {
        let config = Arc::new(config);
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        active.generation += 1;
        info!(
            "Installed configuration generation {} ({})",
            active.generation,
            config.driver()
        );
        std::mem::replace(&mut active.config, config)
    }

    /// Resolves `raw` and installs it. On failure the current configuration stays active.
    pub fn reload(&self, raw: RawDescription) -> Result<Arc<ResolvedConfig>, ConfigError> {
        let config = match resolve(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Keeping current configuration: {}", e);
                return Err(e);
            }
        };

        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if *active.config == config {
            return Ok(Arc::clone(&active.config));
        }
        let config = Arc::new(config);
        active.generation += 1;
        active.config = Arc::clone(&config);
        info!(
            "Installed configuration generation {} ({})",
            active.generation,
            config.driver()
        );
        Ok(config)
    }
}
