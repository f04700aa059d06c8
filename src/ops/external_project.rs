//! Adding an external CMake project to a consumer build.
//!
//! Resolves the toolchain, configures and builds the project, then reads
//! its build info manifest and applies it to the consumer configuration.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::apply::{apply, ConfigSink};
use crate::builder::cmake::{BuildOutcome, CMakeBuilder};
use crate::builder::toolchain::{resolve, ToolchainProfile, ToolchainRequest};
use crate::core::manifest::Manifest;
use crate::core::platform::Platform;
use crate::core::target::BuildTarget;
use crate::util::config::DEFAULT_INTERMEDIATE_DIR;
use crate::util::diagnostic::ExternalBuildError;
use crate::util::process::{find_cmake, ProcessRunner};

/// Options for adding an external project.
#[derive(Debug, Clone)]
pub struct ExternalProjectOptions {
    /// Project name, unique per consumer
    pub name: String,

    /// Directory containing the project's root CMakeLists.txt
    pub source_dir: PathBuf,

    /// Consumer project directory; external commands run here
    pub consumer_dir: PathBuf,

    /// Intermediate directory, relative to the consumer directory
    pub intermediate_root: PathBuf,

    /// Toolchain inputs
    pub request: ToolchainRequest,

    /// Explicit cmake executable (None = search PATH)
    pub cmake: Option<PathBuf>,

    /// Extra configure arguments
    pub cmake_args: Vec<String>,
}

impl ExternalProjectOptions {
    pub fn new(
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        consumer_dir: impl Into<PathBuf>,
        request: ToolchainRequest,
    ) -> Self {
        ExternalProjectOptions {
            name: name.into(),
            source_dir: source_dir.into(),
            consumer_dir: consumer_dir.into(),
            intermediate_root: PathBuf::from(DEFAULT_INTERMEDIATE_DIR),
            request,
            cmake: None,
            cmake_args: Vec::new(),
        }
    }
}

/// Result of adding an external project.
#[derive(Debug)]
pub struct ExternalProjectResult {
    pub target: BuildTarget,
    pub profile: ToolchainProfile,
    pub outcome: BuildOutcome,
    pub manifest: Manifest,
}

/// Pick the cmake executable: explicit path, then PATH, then the bare name.
pub fn cmake_program(explicit: Option<&Path>, host: Platform) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(find_cmake)
        .unwrap_or_else(|| PathBuf::from(host.cmake_executable()))
}

/// Build an external project and apply its build info to `sink`.
///
/// The sink is only written once the manifest has been read in full. On
/// error nothing has been applied, but the caller must still treat its
/// configuration as unusable.
pub fn add_external_project<R: ProcessRunner>(
    opts: &ExternalProjectOptions,
    runner: R,
    sink: &mut dyn ConfigSink,
) -> Result<ExternalProjectResult> {
    let profile = resolve(&opts.request);
    let target = BuildTarget::new(
        &opts.name,
        &opts.consumer_dir,
        &opts.intermediate_root,
        &opts.source_dir,
        profile.build_type,
    )?;

    let cmake = cmake_program(opts.cmake.as_deref(), opts.request.host);
    let outcome = CMakeBuilder::new(&target, &profile, runner)
        .cmake_program(cmake)
        .args(opts.cmake_args.iter().cloned())
        .build()?;

    let manifest_path = target.manifest_path();
    if !manifest_path.is_file() {
        return Err(ExternalBuildError::ManifestMissing {
            path: manifest_path,
            output: outcome.output,
        }
        .into());
    }

    let manifest = Manifest::load(&manifest_path)?;
    apply(&manifest, sink);

    tracing::info!(
        "Applied {} build info entries from `{}`",
        manifest.len(),
        target.name()
    );

    Ok(ExternalProjectResult {
        target,
        profile,
        outcome,
        manifest,
    })
}
