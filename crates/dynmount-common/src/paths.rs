//! Standard filesystem paths for dynmount.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

/// Environment variable overriding the mount configuration file.
pub const CONFIG_ENV: &str = "DYNMOUNT_CONFIG";

/// Mount configuration file used when nothing else is specified.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/dynmount/mounts.json";

/// Name of the runtime configuration file inside an OCI bundle.
pub const BUNDLE_CONFIG_FILE: &str = "config.json";

/// Default mount configuration path, honouring `DYNMOUNT_CONFIG`.
pub static DYNMOUNT_CONFIG: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
});

/// Paths consulted by the hook.
#[derive(Debug, Clone)]
pub struct DynmountPaths {
    /// Mount configuration file.
    pub config: PathBuf,
}

impl DynmountPaths {
    /// Create paths with default locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create paths with a custom configuration file.
    #[must_use]
    pub fn with_config(config: impl Into<PathBuf>) -> Self {
        Self {
            config: config.into(),
        }
    }

    /// Runtime configuration of an OCI bundle.
    #[must_use]
    pub fn bundle_config(bundle: &Path) -> PathBuf {
        bundle.join(BUNDLE_CONFIG_FILE)
    }
}

impl Default for DynmountPaths {
    fn default() -> Self {
        Self {
            config: DYNMOUNT_CONFIG.clone(),
        }
    }
}
