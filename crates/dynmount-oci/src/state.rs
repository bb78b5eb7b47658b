//! Container state as handed to hooks.
//!
//! Based on the OCI Runtime Specification state format:
//! <https://github.com/opencontainers/runtime-spec/blob/main/runtime.md#state>

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use dynmount_common::{DynmountError, DynmountResult};
use serde::{Deserialize, Serialize};

/// Container runtime state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    /// OCI version.
    pub oci_version: String,
    /// Container ID.
    pub id: String,
    /// Container status.
    pub status: ContainerStatus,
    /// Process ID of the container init process.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    /// Path to the OCI bundle.
    pub bundle: PathBuf,
    /// Annotations.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,
}

/// Container status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    /// Container is being created.
    Creating,
    /// Container has been created but not started.
    Created,
    /// Container is running.
    Running,
    /// Container has exited.
    Stopped,
    /// Container is paused.
    Paused,
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Creating => write!(f, "creating"),
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

impl ContainerState {
    /// Decode the state document a runtime writes to a hook's stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or the JSON is not an OCI state.
    pub fn from_reader(mut reader: impl Read) -> DynmountResult<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        let state: Self = serde_json::from_str(&raw).map_err(DynmountError::State)?;

        tracing::debug!(
            id = %state.id,
            status = %state.status,
            bundle = %state.bundle.display(),
            "Decoded container state"
        );
        Ok(state)
    }
}
