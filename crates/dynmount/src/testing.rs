//! In-memory host and resolver for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use dynmount_common::{MountError, MountResult};
use nix::errno::Errno;
use nix::mount::MsFlags;

use crate::host::MountHost;
use crate::identity::{IdentityResolver, Ownership};

/// One recorded host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Stat(PathBuf),
    Anchor(PathBuf),
    Mount {
        source: PathBuf,
        target: PathBuf,
        flags: MsFlags,
        data: String,
    },
    Chown {
        path: PathBuf,
        ownership: Ownership,
    },
}

/// Host that records calls instead of touching the system.
#[derive(Debug, Default)]
pub struct RecordingHost {
    sources: HashSet<PathBuf>,
    anchor_errno: Option<Errno>,
    mount_errno: Option<Errno>,
    chown_errno: Option<Errno>,
    calls: RefCell<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(path.into());
        self
    }

    pub fn failing_anchor(mut self, errno: Errno) -> Self {
        self.anchor_errno = Some(errno);
        self
    }

    pub fn failing_mount(mut self, errno: Errno) -> Self {
        self.mount_errno = Some(errno);
        self
    }

    pub fn failing_chown(mut self, errno: Errno) -> Self {
        self.chown_errno = Some(errno);
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn mounts(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::Mount { .. }))
            .collect()
    }

    pub fn chowns(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::Chown { .. }))
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

fn outcome(errno: Option<Errno>) -> io::Result<()> {
    errno.map_or(Ok(()), |e| Err(e.into()))
}

impl MountHost for RecordingHost {
    fn stat_source(&self, path: &Path) -> io::Result<()> {
        self.record(HostCall::Stat(path.to_path_buf()));
        if self.sources.contains(path) {
            Ok(())
        } else {
            Err(Errno::ENOENT.into())
        }
    }

    fn create_anchor(&self, path: &Path) -> io::Result<()> {
        self.record(HostCall::Anchor(path.to_path_buf()));
        outcome(self.anchor_errno)
    }

    fn bind_mount(
        &self,
        source: &Path,
        target: &Path,
        flags: MsFlags,
        data: &str,
    ) -> io::Result<()> {
        self.record(HostCall::Mount {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            flags,
            data: data.to_string(),
        });
        outcome(self.mount_errno)
    }

    fn chown(&self, path: &Path, ownership: Ownership) -> io::Result<()> {
        self.record(HostCall::Chown {
            path: path.to_path_buf(),
            ownership,
        });
        outcome(self.chown_errno)
    }
}

/// Resolver over fixed name tables.
#[derive(Debug, Default)]
pub struct StaticResolver {
    users: HashMap<String, u32>,
    groups: HashMap<String, u32>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: &str, uid: u32) -> Self {
        self.users.insert(name.to_string(), uid);
        self
    }

    pub fn with_group(mut self, name: &str, gid: u32) -> Self {
        self.groups.insert(name.to_string(), gid);
        self
    }
}

impl IdentityResolver for StaticResolver {
    fn resolve(&self, user: &str, group: &str) -> MountResult<Ownership> {
        let uid = *self
            .users
            .get(user)
            .ok_or_else(|| MountError::UnknownUser {
                name: user.to_string(),
            })?;
        let gid = *self
            .groups
            .get(group)
            .ok_or_else(|| MountError::UnknownGroup {
                name: group.to_string(),
            })?;
        Ok(Ownership { uid, gid })
    }
}
