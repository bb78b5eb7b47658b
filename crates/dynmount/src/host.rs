//! Host operations used by the executor.
//!
//! Every call blocks until the kernel answers. [`LinuxHost`] is the real
//! implementation; tests substitute their own [`MountHost`].

use std::io;
use std::path::Path;

use nix::mount::MsFlags;

use crate::identity::Ownership;

/// The filesystem and mount syscalls a dynamic mount needs.
pub trait MountHost {
    /// Query metadata of `path`, following symlinks.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the path is missing or inaccessible.
    fn stat_source(&self, path: &Path) -> io::Result<()>;

    /// Make sure a node exists at `path` to mount over.
    ///
    /// Creates an empty regular file when nothing is there. An existing node
    /// of any kind is left untouched. Parent directories are never created.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the node cannot be created.
    fn create_anchor(&self, path: &Path) -> io::Result<()>;

    /// Mount `source` onto `target` with `flags` and `data`, no filesystem type.
    ///
    /// `flags` is passed through unchanged and must already carry `MS_BIND`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the kernel rejects the mount.
    fn bind_mount(&self, source: &Path, target: &Path, flags: MsFlags, data: &str)
    -> io::Result<()>;

    /// Change the owner of `path` without following a final symlink.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the kernel rejects the change, or
    /// `EINVAL` if either id is the reserved value `-1`.
    fn chown(&self, path: &Path, ownership: Ownership) -> io::Result<()>;
}

/// Host implementation over Linux syscalls.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxHost;

impl MountHost for LinuxHost {
    fn stat_source(&self, path: &Path) -> io::Result<()> {
        rustix::fs::stat(path)?;
        Ok(())
    }

    fn create_anchor(&self, path: &Path) -> io::Result<()> {
        use rustix::fs::{Mode, OFlags, open};
        use rustix::io::Errno;

        let flags = OFlags::WRONLY | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC;
        let mode = Mode::RUSR | Mode::WUSR | Mode::RGRP | Mode::ROTH;

        match open(path, flags, mode) {
            Ok(_fd) => {
                tracing::trace!(path = %path.display(), "Created mount anchor");
                Ok(())
            }
            Err(Errno::EXIST) => {
                tracing::trace!(path = %path.display(), "Mount anchor already present");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn bind_mount(
        &self,
        source: &Path,
        target: &Path,
        flags: MsFlags,
        data: &str,
    ) -> io::Result<()> {
        nix::mount::mount(
            Some(source),
            target,
            None::<&str>,
            flags,
            Some(data),
        )
        .map_err(io::Error::from)
    }

    fn chown(&self, path: &Path, ownership: Ownership) -> io::Result<()> {
        use rustix::fs::{AtFlags, CWD, chownat};
        use rustix::io::Errno;
        use rustix::process::{Gid, Uid};

        // -1 means "leave unchanged" to chown(2).
        if ownership.uid == u32::MAX || ownership.gid == u32::MAX {
            return Err(Errno::INVAL.into());
        }
        let uid = Uid::from_raw(ownership.uid);
        let gid = Gid::from_raw(ownership.gid);

        chownat(CWD, path, Some(uid), Some(gid), AtFlags::SYMLINK_NOFOLLOW)?;
        Ok(())
    }
}
