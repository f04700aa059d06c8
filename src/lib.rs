//! cmake-bridge - drive external CMake projects from a consuming build
//!
//! This crate configures and builds external CMake projects on behalf of a
//! consumer, then feeds the build info those projects declare (C++
//! standard, include paths, library paths, libraries, dependencies) back
//! into the consumer's configuration.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for cmake-bridge unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a scripted process runner and external project fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{apply, CMakeBuilder, ConfigSink, ModuleConfig, ToolchainProfile};
pub use core::{BuildTarget, CppStandard, Manifest};
pub use ops::{add_external_project, ExternalProjectOptions};
pub use util::{ExternalBuildError, ProcessRunner, ShellRunner};
