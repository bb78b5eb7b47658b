//! Applying a dynamic mount.
//!
//! [`MountExecutor::apply`] is an ordered pipeline that stops at the first
//! failure:
//!
//! 1. stat the host source
//! 2. join the mount options
//! 3. create the anchor at `rootfs + destination`
//! 4. bind mount the source onto the anchor
//! 5. if an owner is set, resolve it and chown the host source
//!
//! Nothing is rolled back. When step 5 fails the bind mount stays in place
//! and the caller decides what to do about it. The source can disappear
//! between steps 1 and 4; that window is not closed here.

use std::path::Path;

use dynmount_common::{MountError, MountResult};
use nix::mount::MsFlags;

use crate::descriptor::MountDescriptor;
use crate::host::{LinuxHost, MountHost};
use crate::identity::{HostIdentityResolver, IdentityResolver};

/// Applies [`MountDescriptor`]s through a host and an identity resolver.
#[derive(Debug, Default, Clone)]
pub struct MountExecutor<H = LinuxHost, R = HostIdentityResolver> {
    host: H,
    resolver: R,
}

impl MountExecutor {
    /// Executor over the real host and identity databases.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            host: LinuxHost,
            resolver: HostIdentityResolver,
        }
    }
}

impl<H: MountHost, R: IdentityResolver> MountExecutor<H, R> {
    /// Executor over custom host and resolver implementations.
    pub const fn with_parts(host: H, resolver: R) -> Self {
        Self { host, resolver }
    }

    /// The host implementation.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// The identity resolver.
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Create the bind mount described by `descriptor`.
    ///
    /// Ownership, when requested, is changed on the host source path. The
    /// change is visible outside the container.
    ///
    /// # Errors
    ///
    /// Returns the [`MountError`] of the first step that failed.
    pub fn apply(&self, descriptor: &MountDescriptor) -> MountResult<()> {
        let source = descriptor.source();

        self.host
            .stat_source(source)
            .map_err(|e| MountError::SourceNotFound {
                path: source.to_path_buf(),
                source: e,
            })?;

        let data = descriptor.mount_data();
        let flags = descriptor.mount_flags() | MsFlags::MS_BIND;
        let target = descriptor.target_path();

        self.host
            .create_anchor(&target)
            .map_err(|e| MountError::TargetPrepFailed {
                path: target.clone(),
                source: e,
            })?;

        tracing::debug!(
            source = %source.display(),
            target = %target.display(),
            flags = ?flags,
            data = %data,
            "Creating bind mount"
        );

        self.host
            .bind_mount(source, &target, flags, &data)
            .map_err(|e| MountError::MountFailed {
                source_path: source.to_path_buf(),
                target: target.clone(),
                source: e,
            })?;

        if let Some(owner) = descriptor.owner() {
            self.change_ownership(source, owner)?;
        }

        tracing::info!(
            source = %source.display(),
            destination = %descriptor.destination().display(),
            "Dynamic mount added"
        );
        Ok(())
    }

    fn change_ownership(&self, path: &Path, owner: &str) -> MountResult<()> {
        let ownership = self.resolver.resolve_owner(owner)?;

        tracing::debug!(
            path = %path.display(),
            uid = ownership.uid,
            gid = ownership.gid,
            "Changing ownership of host source"
        );

        self.host
            .chown(path, ownership)
            .map_err(|e| MountError::ChownFailed {
                path: path.to_path_buf(),
                source: e,
            })
    }
}
