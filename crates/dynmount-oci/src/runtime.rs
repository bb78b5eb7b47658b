//! OCI Runtime Specification types.
//!
//! Only the fields a mount hook needs are modelled; everything else in
//! `config.json` is ignored on decode.
//! <https://github.com/opencontainers/runtime-spec/blob/main/config.md>

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dynmount_common::{DynmountError, DynmountPaths, DynmountResult};
use serde::{Deserialize, Serialize};

/// OCI Runtime Specification (config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    /// OCI version.
    #[serde(default = "default_oci_version")]
    pub oci_version: String,

    /// Container's root filesystem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Root>,

    /// Annotations (key-value pairs).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
}

fn default_oci_version() -> String {
    "1.2.0".to_string()
}

impl Default for Spec {
    fn default() -> Self {
        Self {
            oci_version: default_oci_version(),
            root: None,
            annotations: HashMap::new(),
        }
    }
}

/// Root filesystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Root {
    /// Path to the root filesystem.
    pub path: PathBuf,

    /// Whether the root filesystem is read-only.
    #[serde(default)]
    pub readonly: bool,
}

impl Spec {
    /// Load `config.json` from a bundle directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a runtime spec.
    pub fn load(bundle: &Path) -> DynmountResult<Self> {
        let path = DynmountPaths::bundle_config(bundle);
        let raw = std::fs::read_to_string(&path).map_err(|e| DynmountError::Bundle {
            path: bundle.to_path_buf(),
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        serde_json::from_str(&raw).map_err(|e| DynmountError::Bundle {
            path: bundle.to_path_buf(),
            message: format!("cannot parse {}: {e}", path.display()),
        })
    }

    /// Host path of the container rootfs.
    ///
    /// A relative `root.path` is resolved against the bundle directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec has no `root` section.
    pub fn rootfs(&self, bundle: &Path) -> DynmountResult<PathBuf> {
        let root = self.root.as_ref().ok_or_else(|| DynmountError::Bundle {
            path: bundle.to_path_buf(),
            message: "config.json has no root".to_string(),
        })?;

        if root.path.is_absolute() {
            Ok(root.path.clone())
        } else {
            Ok(bundle.join(&root.path))
        }
    }
}
