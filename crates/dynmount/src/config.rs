//! Dynamic mount configuration.
//!
//! ```json
//! {
//!   "dynamic": [
//!     {
//!       "source": "/opt/shared/app.sock",
//!       "destination": "/run/app.sock",
//!       "options": ["nosuid", "nodev"],
//!       "owner": "app:app"
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use dynmount_common::{DynmountError, DynmountResult, MountError, MountResult};
use serde::{Deserialize, Serialize};

use crate::descriptor::MountProperties;
use crate::identity::parse_owner;
use crate::options::parse_mount_options;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynmountConfig {
    /// Mounts to create, in order.
    #[serde(default)]
    pub dynamic: Vec<DynamicMountEntry>,
}

/// One configured mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicMountEntry {
    /// Host path to mount.
    pub source: PathBuf,
    /// Path inside the container rootfs.
    pub destination: PathBuf,
    /// Mount option tokens (`ro`, `nosuid`, `mode=0755`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Optional `user:group` for the host source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl DynamicMountEntry {
    /// Convert to executor properties, splitting flags from data options.
    #[must_use]
    pub fn to_properties(&self) -> MountProperties {
        let parsed = parse_mount_options(self.options.as_slice());
        MountProperties {
            source: self.source.clone(),
            destination: self.destination.clone(),
            mount_flags: parsed.flags,
            mount_options: parsed.data,
            owner: self.owner.clone(),
        }
    }

    fn check(&self) -> MountResult<()> {
        if self.source.as_os_str().is_empty() {
            return Err(MountError::InvalidDescriptor {
                reason: "source is empty".to_string(),
            });
        }
        if self.destination.as_os_str().is_empty() {
            return Err(MountError::InvalidDescriptor {
                reason: "destination is empty".to_string(),
            });
        }
        if let Some(owner) = &self.owner {
            parse_owner(owner)?;
        }
        Ok(())
    }
}

impl DynmountConfig {
    /// Load the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> DynmountResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| DynmountError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_json(&raw).map_err(|e| DynmountError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            path = %path.display(),
            mounts = config.dynamic.len(),
            "Loaded dynamic mount config"
        );
        Ok(config)
    }

    /// Parse the configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed JSON or unknown fields.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Check every entry without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`DynmountError::InvalidEntry`] for the first bad entry.
    pub fn validate(&self) -> DynmountResult<()> {
        for (index, entry) in self.dynamic.iter().enumerate() {
            entry
                .check()
                .map_err(|error| DynmountError::InvalidEntry { index, error })?;

            if !entry.destination.has_root() {
                tracing::warn!(
                    index,
                    destination = %entry.destination.display(),
                    "Destination has no leading '/', it is appended to the rootfs as-is"
                );
            }
        }
        Ok(())
    }

    /// Executor properties for every entry, in order.
    #[must_use]
    pub fn mount_properties(&self) -> Vec<MountProperties> {
        self.dynamic
            .iter()
            .map(DynamicMountEntry::to_properties)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::mount::MsFlags;

    const SAMPLE: &str = r#"{
        "dynamic": [
            {
                "source": "/opt/shared/app.sock",
                "destination": "/run/app.sock",
                "options": ["ro", "nosuid", "mode=0755"],
                "owner": "app:app"
            },
            {
                "source": "/etc/localtime",
                "destination": "/etc/localtime"
            }
        ]
    }"#;

    #[test]
    fn parse_sample() {
        let config = DynmountConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.dynamic.len(), 2);
        assert_eq!(config.dynamic[0].owner.as_deref(), Some("app:app"));
        assert!(config.dynamic[1].options.is_empty());
        assert!(config.dynamic[1].owner.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn properties_split_flags_from_data() {
        let config = DynmountConfig::from_json(SAMPLE).unwrap();
        let properties = config.mount_properties();

        assert_eq!(
            properties[0].mount_flags,
            MsFlags::MS_RDONLY | MsFlags::MS_NOSUID
        );
        assert_eq!(properties[0].mount_options, vec!["mode=0755"]);
        assert_eq!(properties[1].mount_flags, MsFlags::empty());
        assert_eq!(properties[1].destination, PathBuf::from("/etc/localtime"));
    }

    #[test]
    fn missing_dynamic_is_empty() {
        let config = DynmountConfig::from_json("{}").unwrap();
        assert!(config.dynamic.is_empty());
        assert!(config.mount_properties().is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{"dynamic":[{"source":"/a","destination":"/b","mountOnStandby":true}]}"#;
        assert!(DynmountConfig::from_json(raw).is_err());
    }

    #[test]
    fn validate_reports_bad_owner_by_index() {
        let raw = r#"{"dynamic":[
            {"source":"/a","destination":"/a"},
            {"source":"/b","destination":"/b","owner":"alice"}
        ]}"#;
        let err = DynmountConfig::from_json(raw)
            .unwrap()
            .validate()
            .unwrap_err();

        match err {
            DynmountError::InvalidEntry { index, error } => {
                assert_eq!(index, 1);
                assert!(matches!(error, MountError::OwnerFormatInvalid { ref owner } if owner == "alice"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_empty_destination() {
        let raw = r#"{"dynamic":[{"source":"/a","destination":""}]}"#;
        let err = DynmountConfig::from_json(raw)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            DynmountError::InvalidEntry {
                index: 0,
                error: MountError::InvalidDescriptor { ref reason },
            } if reason == "destination is empty"
        ));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mounts.json");

        let err = DynmountConfig::load(&path).unwrap_err();
        assert!(matches!(err, DynmountError::ConfigRead { .. }));

        std::fs::write(&path, "{ not json").unwrap();
        let err = DynmountConfig::load(&path).unwrap_err();
        assert!(matches!(err, DynmountError::ConfigParse { .. }));
        assert!(err.to_string().contains("mounts.json"));
    }
}
