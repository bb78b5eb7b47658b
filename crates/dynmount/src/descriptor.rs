//! Mount descriptors.
//!
//! A [`MountDescriptor`] is built fresh for every configured mount and is
//! read-only afterwards. It carries no "mounted" state; applying the same
//! descriptor twice performs two mounts.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use dynmount_common::{MountError, MountResult};
use nix::mount::MsFlags;

/// Separator used when joining filesystem-specific mount options.
pub const OPTION_SEPARATOR: &str = ",";

/// Declarative properties of one dynamic mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountProperties {
    /// Host path that must exist when the mount is applied.
    pub source: PathBuf,
    /// Path inside the container rootfs.
    pub destination: PathBuf,
    /// Kernel mount flags. `MS_BIND` is always added on top.
    pub mount_flags: MsFlags,
    /// Filesystem-specific options, in order.
    pub mount_options: Vec<String>,
    /// Optional `user:group` to apply to the host source.
    pub owner: Option<String>,
}

impl MountProperties {
    /// Create properties with no flags, options or owner.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mount_flags: MsFlags::empty(),
            mount_options: Vec::new(),
            owner: None,
        }
    }

    /// Set the kernel mount flags.
    #[must_use]
    pub fn with_flags(mut self, flags: MsFlags) -> Self {
        self.mount_flags = flags;
        self
    }

    /// Set the filesystem-specific options.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mount_options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Request an ownership change to `user:group`.
    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// One mount, bound to the rootfs of the container being created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountDescriptor {
    rootfs_path: PathBuf,
    properties: MountProperties,
}

impl MountDescriptor {
    /// Create a descriptor.
    ///
    /// The owner string is not checked here; a malformed owner surfaces when
    /// the mount is applied.
    ///
    /// # Errors
    ///
    /// Returns [`MountError::InvalidDescriptor`] if the rootfs path or the
    /// destination is empty.
    pub fn new(rootfs_path: impl Into<PathBuf>, properties: MountProperties) -> MountResult<Self> {
        let rootfs_path = rootfs_path.into();

        if rootfs_path.as_os_str().is_empty() {
            return Err(MountError::InvalidDescriptor {
                reason: "rootfs path is empty".to_string(),
            });
        }
        if properties.destination.as_os_str().is_empty() {
            return Err(MountError::InvalidDescriptor {
                reason: format!(
                    "destination is empty for source '{}'",
                    properties.source.display()
                ),
            });
        }

        Ok(Self {
            rootfs_path,
            properties,
        })
    }

    /// Host path of the container rootfs.
    #[must_use]
    pub fn rootfs_path(&self) -> &Path {
        &self.rootfs_path
    }

    /// Host source path.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.properties.source
    }

    /// Destination relative to the container root.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.properties.destination
    }

    /// Caller-supplied mount flags, without `MS_BIND`.
    #[must_use]
    pub const fn mount_flags(&self) -> MsFlags {
        self.properties.mount_flags
    }

    /// Filesystem-specific options in configuration order.
    #[must_use]
    pub fn mount_options(&self) -> &[String] {
        &self.properties.mount_options
    }

    /// Requested `user:group`, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.properties.owner.as_deref()
    }

    /// The underlying properties.
    #[must_use]
    pub const fn properties(&self) -> &MountProperties {
        &self.properties
    }

    /// Where the mount lands on the host: `rootfs_path` followed directly by
    /// `destination`.
    ///
    /// This is plain concatenation. No separator is inserted and nothing is
    /// normalized, so an absolute destination stays under the rootfs.
    #[must_use]
    pub fn target_path(&self) -> PathBuf {
        let mut target = OsString::from(self.rootfs_path.as_os_str());
        target.push(self.properties.destination.as_os_str());
        PathBuf::from(target)
    }

    /// Mount options joined into the data string handed to `mount(2)`.
    #[must_use]
    pub fn mount_data(&self) -> String {
        self.properties.mount_options.join(OPTION_SEPARATOR)
    }
}
