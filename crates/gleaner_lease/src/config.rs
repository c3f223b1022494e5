//! Configuration structures for credential leasing.
//!
//! This module provides TOML-based configuration for the leasing engine and
//! retry orchestrator. The configuration system supports:
//! - Bundled defaults (include_str! from gleaner.toml)
//! - User overrides (./gleaner.toml or ~/.config/gleaner/gleaner.toml)
//! - Automatic merging with user values taking precedence

use config::{Config, File, FileFormat};
use gleaner_core::{OperationCategory, SelectionOrder};
use gleaner_error::{ConfigError, GleanerError, GleanerResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

fn default_ttl_seconds() -> u64 {
    86_400
}

fn default_transient_backoff_ms() -> u64 {
    2_000
}

fn default_max_jitter_ms() -> u64 {
    1_000
}

/// Tunables for the leasing engine and retry orchestrator.
///
/// # Example
///
/// ```toml
/// [lease]
/// ttl_seconds = 86_400
/// order = "sequential"
/// max_retries = 3
/// transient_backoff_ms = 2_000
/// max_jitter_ms = 1_000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LeaseConfig {
    /// How long a claimed entry stays leased without a check-in.
    ///
    /// Deliberately long (a day by default) so slow call sequences never
    /// lose their lease mid-operation; the cost is that a crashed worker
    /// leaks the entry for up to the full TTL.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Ordering among available entries when claiming
    #[serde(default)]
    pub order: SelectionOrder,

    /// Retry budget per call, beyond the initial attempt.
    ///
    /// Defaults to the number of distinct credentials configured for the
    /// category, so a rate-limited call gets one chance on each other
    /// credential (and, with a single credential, one chance after its
    /// cooldown).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Fixed pause before retrying a transient upstream failure
    #[serde(default = "default_transient_backoff_ms")]
    pub transient_backoff_ms: u64,

    /// Upper bound on the random jitter added when waiting for a foreign
    /// lease to expire, to keep workers from waking in lockstep
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            order: SelectionOrder::default(),
            max_retries: None,
            transient_backoff_ms: default_transient_backoff_ms(),
            max_jitter_ms: default_max_jitter_ms(),
        }
    }
}

impl LeaseConfig {
    /// Lease TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Transient backoff as a [`Duration`].
    pub fn transient_backoff(&self) -> Duration {
        Duration::from_millis(self.transient_backoff_ms)
    }

    /// Jitter cap as a [`Duration`].
    pub fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }
}

/// Top-level Gleaner configuration.
///
/// Loads leasing tunables and the operation-to-category map from TOML files
/// with a precedence system:
/// 1. Bundled defaults (include_str! from gleaner.toml)
/// 2. User override (./gleaner.toml or ~/.config/gleaner/gleaner.toml)
///
/// # Example
///
/// ```no_run
/// use gleaner_lease::GleanerConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GleanerConfig::load()?;
/// let category = config.category_for("users/show");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct GleanerConfig {
    /// Leasing and retry tunables
    #[serde(default)]
    pub lease: LeaseConfig,

    /// Map from operation identifier to its rate-limit category.
    ///
    /// Resolved once at configuration time; callers pass the resolved
    /// category into the orchestrator, never a raw operation name.
    #[serde(default)]
    pub categories: HashMap<String, String>,
}

impl GleanerConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> GleanerResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                GleanerError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GleanerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override
    /// earlier):
    /// 1. Bundled defaults (gleaner.toml shipped with the library)
    /// 2. User config in home directory (~/.config/gleaner/gleaner.toml)
    /// 3. User config in current directory (./gleaner.toml)
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> GleanerResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../gleaner.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/gleaner/gleaner.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("gleaner").required(false));

        builder
            .build()
            .map_err(|e| {
                GleanerError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                GleanerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Resolve an operation identifier to its rate-limit category.
    ///
    /// Returns `None` when the operation is not mapped; callers should treat
    /// that as a configuration mistake rather than guessing a category.
    #[instrument(skip(self))]
    pub fn category_for(&self, operation: &str) -> Option<OperationCategory> {
        let category = self.categories.get(operation)?;

        debug!(operation, category, "Resolved operation category");

        Some(OperationCategory::new(category.clone()))
    }
}
