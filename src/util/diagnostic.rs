//! Fatal error types for external project builds.
//!
//! Every failure that aborts an external build carries the command line and
//! the full captured output of the process, so a failed build can be
//! diagnosed without running it again.

use std::path::PathBuf;
use std::time::Duration;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// A fatal failure while driving an external CMake project.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ExternalBuildError {
    #[error("CMake configure failed with code {code}\n{output}")]
    #[diagnostic(
        code(cmake_bridge::configure_failed),
        help("Check the CMake output above; the next build will configure again")
    )]
    ConfigureFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("CMake build failed with code {code}\n{output}")]
    #[diagnostic(
        code(cmake_bridge::build_failed),
        help("Run `cmake-bridge build --verbose` for more details")
    )]
    BuildFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("build info file `{}` does not exist\n{output}", path.display())]
    #[diagnostic(
        code(cmake_bridge::manifest_missing),
        help("The CMake project must write buildinfo_<config>.output into its build directory")
    )]
    ManifestMissing { path: PathBuf, output: String },

    #[error("`{command}` timed out after {}s\n{output}", timeout.as_secs())]
    #[diagnostic(code(cmake_bridge::process_timeout))]
    Timeout {
        command: String,
        timeout: Duration,
        output: String,
    },

    #[error("`{command}` was cancelled\n{output}")]
    #[diagnostic(code(cmake_bridge::process_cancelled))]
    Cancelled { command: String, output: String },
}

impl ExternalBuildError {
    /// The suggestion line printed under the error by the CLI.
    pub fn suggestion(&self) -> Option<String> {
        MietteDiagnostic::help(self).map(|help| format!("help: {}", help))
    }
}
