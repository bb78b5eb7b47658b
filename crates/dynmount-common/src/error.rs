//! Error types for the dynmount workspace.
//!
//! [`MountError`] is the taxonomy of a single mount application. Every stage of
//! the executor maps to exactly one variant so callers can tell which step
//! failed. [`DynmountError`] covers everything around it: configuration,
//! bundle discovery and the aggregation of several mounts.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias using [`MountError`].
pub type MountResult<T> = Result<T, MountError>;

/// Result type alias using [`DynmountError`].
pub type DynmountResult<T> = Result<T, DynmountError>;

/// Failure of one mount application. All variants are terminal for the call.
#[derive(Error, Diagnostic, Debug)]
pub enum MountError {
    /// Descriptor is missing a rootfs path or destination.
    #[error("Invalid mount descriptor: {reason}")]
    #[diagnostic(code(dynmount::mount::invalid_descriptor))]
    InvalidDescriptor {
        /// What is wrong with the descriptor.
        reason: String,
    },

    /// Host source does not exist or cannot be queried.
    #[error("failed to stat host file for dynamic mount '{}'", .path.display())]
    #[diagnostic(
        code(dynmount::mount::source_not_found),
        help("The host source must exist before the container is created")
    )]
    SourceNotFound {
        /// The host source path.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Anchor node inside the rootfs could not be created.
    #[error("failed to create mount target '{}'", .path.display())]
    #[diagnostic(
        code(dynmount::mount::target_prep_failed),
        help("Parent directories of the destination must already exist in the rootfs")
    )]
    TargetPrepFailed {
        /// The target path inside the rootfs.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The kernel rejected the bind mount.
    #[error("failed to add dynamic mount '{}' at '{}'", .source_path.display(), .target.display())]
    #[diagnostic(
        code(dynmount::mount::mount_failed),
        help("Bind mounts require CAP_SYS_ADMIN in the mount namespace")
    )]
    MountFailed {
        /// The host source path.
        source_path: PathBuf,
        /// The target path inside the rootfs.
        target: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// Owner string lacks the `user:group` separator.
    #[error("failed to find colon delimiter in owner '{owner}'")]
    #[diagnostic(
        code(dynmount::mount::owner_format_invalid),
        help("Owners are written as 'user:group'")
    )]
    OwnerFormatInvalid {
        /// The offending owner string.
        owner: String,
    },

    /// User name not present in the passwd database.
    #[error("Unknown user: {name}")]
    #[diagnostic(code(dynmount::mount::unknown_user))]
    UnknownUser {
        /// The user name that was looked up.
        name: String,
    },

    /// Group name not present in the group database.
    #[error("Unknown group: {name}")]
    #[diagnostic(code(dynmount::mount::unknown_group))]
    UnknownGroup {
        /// The group name that was looked up.
        name: String,
    },

    /// The identity database itself could not be read.
    #[error("failed to look up '{name}' in the host identity database")]
    #[diagnostic(code(dynmount::mount::identity_lookup))]
    IdentityLookup {
        /// The name that was looked up.
        name: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The kernel rejected the ownership change.
    #[error("failed to change ownership for '{}'", .path.display())]
    #[diagnostic(code(dynmount::mount::chown_failed))]
    ChownFailed {
        /// The host path whose ownership was being changed.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

/// Errors raised around mount application: config, bundle and aggregation.
#[derive(Error, Diagnostic, Debug)]
pub enum DynmountError {
    /// Configuration file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    #[diagnostic(code(dynmount::config::read))]
    ConfigRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the expected shape.
    #[error("Failed to parse config {}: {source}", .path.display())]
    #[diagnostic(
        code(dynmount::config::parse),
        help("Expected {{\"dynamic\": [{{\"source\": ..., \"destination\": ...}}]}}")
    )]
    ConfigParse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A mount entry in the configuration is invalid.
    #[error("Invalid mount entry #{index}")]
    #[diagnostic(code(dynmount::config::invalid_entry))]
    InvalidEntry {
        /// Zero-based position in the `dynamic` list.
        index: usize,
        /// What is wrong with the entry.
        #[source]
        #[diagnostic_source]
        error: MountError,
    },

    /// OCI bundle could not be used to locate the rootfs.
    #[error("Invalid bundle {}: {message}", .path.display())]
    #[diagnostic(code(dynmount::bundle))]
    Bundle {
        /// Path of the bundle directory.
        path: PathBuf,
        /// The error message.
        message: String,
    },

    /// Container state on stdin could not be decoded.
    #[error("Failed to parse container state: {0}")]
    #[diagnostic(
        code(dynmount::state),
        help("The runtime passes the OCI state JSON on stdin")
    )]
    State(#[source] serde_json::Error),

    /// A configured mount failed.
    #[error("Dynamic mount #{index} ({}) failed", .source_path.display())]
    #[diagnostic(code(dynmount::mount))]
    Mount {
        /// Zero-based position in the `dynamic` list.
        index: usize,
        /// Host source path of the failed mount.
        source_path: PathBuf,
        /// The underlying mount failure.
        #[source]
        #[diagnostic_source]
        error: MountError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    #[diagnostic(code(dynmount::io))]
    Io(#[from] std::io::Error),
}

impl MountError {
    /// The raw OS error code behind this failure, if there is one.
    #[must_use]
    pub fn os_error(&self) -> Option<i32> {
        match self {
            Self::SourceNotFound { source, .. }
            | Self::TargetPrepFailed { source, .. }
            | Self::MountFailed { source, .. }
            | Self::IdentityLookup { source, .. }
            | Self::ChownFailed { source, .. } => source.raw_os_error(),
            Self::InvalidDescriptor { .. }
            | Self::OwnerFormatInvalid { .. }
            | Self::UnknownUser { .. }
            | Self::UnknownGroup { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_error_display() {
        let err = MountError::SourceNotFound {
            path: PathBuf::from("/opt/data/file"),
            source: std::io::Error::from_raw_os_error(2),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"failed to stat host file for dynamic mount '/opt/data/file'"
        );

        let err = MountError::OwnerFormatInvalid {
            owner: "alice".to_string(),
        };
        insta::assert_snapshot!(err.to_string(), @"failed to find colon delimiter in owner 'alice'");
    }

    #[test]
    fn os_error_is_exposed() {
        let err = MountError::MountFailed {
            source_path: PathBuf::from("/src"),
            target: PathBuf::from("/rootfs/dst"),
            source: std::io::Error::from_raw_os_error(1),
        };
        assert_eq!(err.os_error(), Some(1));

        let err = MountError::UnknownUser {
            name: "ghost".to_string(),
        };
        assert_eq!(err.os_error(), None);
    }

    #[test]
    fn mount_wraps_source() {
        use std::error::Error;

        let err = DynmountError::Mount {
            index: 2,
            source_path: PathBuf::from("/src"),
            error: MountError::UnknownGroup {
                name: "staff".to_string(),
            },
        };
        assert_eq!(err.to_string(), "Dynamic mount #2 (/src) failed");
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Unknown group: staff"));
    }

    #[test]
    fn invalid_entry_keeps_diagnostic() {
        use miette::Diagnostic;

        let err = DynmountError::InvalidEntry {
            index: 0,
            error: MountError::OwnerFormatInvalid {
                owner: "alice".to_string(),
            },
        };
        insta::assert_snapshot!(err.to_string(), @"Invalid mount entry #0");

        let inner = err.diagnostic_source().and_then(|d| d.code()).map(|c| c.to_string());
        assert_eq!(inner.as_deref(), Some("dynmount::mount::owner_format_invalid"));
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DynmountError = io_err.into();
        assert!(matches!(err, DynmountError::Io(_)));
    }
}
