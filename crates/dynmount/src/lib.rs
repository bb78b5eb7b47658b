//! # dynmount
//!
//! An OCI `createContainer` hook that bind mounts host paths into a
//! container's root filesystem and optionally re-owns them.
//!
//! ## Flow
//!
//! 1. [`config::DynmountConfig`] lists the dynamic mounts.
//! 2. [`hook::DynamicMounts`] pairs them with the container rootfs.
//! 3. [`executor::MountExecutor`] applies each [`descriptor::MountDescriptor`]:
//!    stat the source, create the anchor, bind mount, change ownership.
//!
//! ## Usage
//!
//! ```no_run
//! use dynmount::descriptor::{MountDescriptor, MountProperties};
//! use dynmount::executor::MountExecutor;
//! use nix::mount::MsFlags;
//!
//! # fn example() -> dynmount_common::MountResult<()> {
//! let properties = MountProperties::new("/opt/shared/app.sock", "/run/app.sock")
//!     .with_flags(MsFlags::MS_NOSUID | MsFlags::MS_NODEV)
//!     .with_owner("app:app");
//! let descriptor = MountDescriptor::new("/run/bundles/web/rootfs", properties)?;
//!
//! MountExecutor::new().apply(&descriptor)?;
//! # Ok(())
//! # }
//! ```
//!
//! Ownership is changed on the host source path, not on the mount target.
//! The change is therefore visible outside the container as well.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod executor;
pub mod hook;
pub mod host;
pub mod identity;
pub mod options;

#[cfg(test)]
pub(crate) mod testing;

pub use descriptor::{MountDescriptor, MountProperties};
pub use executor::MountExecutor;
pub use hook::DynamicMounts;
