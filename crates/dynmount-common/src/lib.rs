//! # dynmount-common
//!
//! Shared types for the dynmount workspace:
//! - The mount error taxonomy returned by the executor
//! - Hook-level errors for configuration and bundle handling
//! - Default filesystem locations

#![warn(missing_docs)]

pub mod error;
pub mod paths;

pub use error::{DynmountError, DynmountResult, MountError, MountResult};
pub use paths::DynmountPaths;
