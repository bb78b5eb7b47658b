//! # dynmount-oci
//!
//! The slice of the OCI runtime specification a lifecycle hook consumes:
//! - Container state, delivered by the runtime on the hook's stdin
//! - The bundle `config.json`, read to locate the container root filesystem

#![warn(missing_docs)]

pub mod runtime;
pub mod state;

pub use runtime::{Root, Spec};
pub use state::{ContainerState, ContainerStatus};
