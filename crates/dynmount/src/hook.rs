//! The `createContainer` hook.
//!
//! The runtime invokes the hook once per container with the OCI state on
//! stdin. [`DynamicMounts`] binds the configured mounts to that container's
//! rootfs and applies them in configuration order, aborting on the first
//! failure so the runtime fails container creation.

use std::path::{Path, PathBuf};

use dynmount_common::{DynmountError, DynmountResult};
use dynmount_oci::{ContainerState, Spec};

use crate::config::DynmountConfig;
use crate::descriptor::{MountDescriptor, MountProperties};
use crate::executor::MountExecutor;
use crate::host::MountHost;
use crate::identity::IdentityResolver;

/// The configured mounts of one container.
#[derive(Debug, Clone)]
pub struct DynamicMounts {
    rootfs: PathBuf,
    properties: Vec<MountProperties>,
}

impl DynamicMounts {
    /// Bind `properties` to a known rootfs.
    #[must_use]
    pub fn new(rootfs: impl Into<PathBuf>, properties: Vec<MountProperties>) -> Self {
        Self {
            rootfs: rootfs.into(),
            properties,
        }
    }

    /// Locate the rootfs through the bundle's `config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle config is missing, malformed or has no root.
    pub fn from_bundle(bundle: &Path, config: &DynmountConfig) -> DynmountResult<Self> {
        let rootfs = Spec::load(bundle)?.rootfs(bundle)?;
        Ok(Self::new(rootfs, config.mount_properties()))
    }

    /// Locate the rootfs of the container described by `state`.
    ///
    /// # Errors
    ///
    /// See [`DynamicMounts::from_bundle`].
    pub fn from_state(state: &ContainerState, config: &DynmountConfig) -> DynmountResult<Self> {
        tracing::debug!(id = %state.id, status = %state.status, "Preparing dynamic mounts");
        Self::from_bundle(&state.bundle, config)
    }

    /// Host path of the container rootfs.
    #[must_use]
    pub fn rootfs(&self) -> &Path {
        &self.rootfs
    }

    /// Number of configured mounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether there is nothing to mount.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Build a descriptor for every mount.
    ///
    /// # Errors
    ///
    /// Returns [`DynmountError::Mount`] for the first invalid descriptor.
    pub fn descriptors(&self) -> DynmountResult<Vec<MountDescriptor>> {
        self.properties
            .iter()
            .enumerate()
            .map(|(index, properties)| {
                MountDescriptor::new(&self.rootfs, properties.clone()).map_err(|error| {
                    DynmountError::Mount {
                        index,
                        source_path: properties.source.clone(),
                        error,
                    }
                })
            })
            .collect()
    }

    /// Apply every mount, stopping at the first failure.
    ///
    /// Mounts applied before a failure stay in place. Returns the number of
    /// mounts applied.
    ///
    /// # Errors
    ///
    /// Returns [`DynmountError::Mount`] naming the mount that failed.
    pub fn create_container<H, R>(&self, executor: &MountExecutor<H, R>) -> DynmountResult<usize>
    where
        H: MountHost,
        R: IdentityResolver,
    {
        let descriptors = self.descriptors()?;

        for (index, descriptor) in descriptors.iter().enumerate() {
            if let Err(error) = executor.apply(descriptor) {
                tracing::error!(
                    index,
                    source = %descriptor.source().display(),
                    error = %error,
                    os_error = ?error.os_error(),
                    "Failed to add dynamic mount"
                );
                return Err(DynmountError::Mount {
                    index,
                    source_path: descriptor.source().to_path_buf(),
                    error,
                });
            }
        }

        tracing::info!(
            rootfs = %self.rootfs.display(),
            mounts = descriptors.len(),
            "Dynamic mounts created"
        );
        Ok(descriptors.len())
    }
}
