//! External project build machinery.
//!
//! - [`toolchain`] resolves generator and compiler settings
//! - [`staleness`] decides whether a project must be configured again
//! - [`cmake`] runs the configure and build steps
//! - [`apply`] feeds the resulting build info into consumer configuration

pub mod apply;
pub mod cmake;
pub mod staleness;
pub mod toolchain;

pub use apply::{apply, ConfigSink, ExternalDependency, ModuleConfig};
pub use cmake::{BuildOutcome, CMakeBuilder};
pub use toolchain::{resolve, ToolchainProfile, ToolchainRequest};
