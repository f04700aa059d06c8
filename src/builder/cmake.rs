//! CMake driver for external projects.
//!
//! Configures an external project when its root `CMakeLists.txt` changed
//! since the last successful build, then always runs the build step.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::staleness::{needs_configure, record_success};
use crate::builder::toolchain::ToolchainProfile;
use crate::core::target::BuildTarget;
use crate::util::diagnostic::ExternalBuildError;
use crate::util::fs::ensure_dir;
use crate::util::process::{quote_arg, ProcessRunner};

/// What a successful [`CMakeBuilder::build`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Whether the configure step ran in this invocation.
    pub configured: bool,
    /// Captured output of the build step.
    pub output: String,
}

/// CMake build driver for one [`BuildTarget`].
pub struct CMakeBuilder<'a, R: ProcessRunner> {
    target: &'a BuildTarget,
    profile: &'a ToolchainProfile,
    runner: R,
    cmake: PathBuf,
    cmake_args: Vec<String>,
}

impl<'a, R: ProcessRunner> CMakeBuilder<'a, R> {
    /// Create a new CMake builder running `cmake` from PATH.
    pub fn new(target: &'a BuildTarget, profile: &'a ToolchainProfile, runner: R) -> Self {
        CMakeBuilder {
            target,
            profile,
            runner,
            cmake: PathBuf::from("cmake"),
            cmake_args: Vec::new(),
        }
    }

    /// Set the cmake executable.
    pub fn cmake_program(mut self, cmake: impl Into<PathBuf>) -> Self {
        self.cmake = cmake.into();
        self
    }

    /// Add extra configure arguments, each quoted as one shell word.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.cmake_args.extend(args.into_iter().map(|arg| {
            let arg: String = arg.into();
            quote_arg(&arg)
        }));
        self
    }

    /// The configure command line.
    pub fn configure_command(&self) -> String {
        let target = self.target;
        let source = target.source_dir().to_string_lossy();
        let mut parts = vec![quote_arg(&self.cmake.to_string_lossy())];

        if let Some(ref generator) = self.profile.generator {
            parts.push(format!("-G {}", quote_arg(generator)));
        }
        parts.push(format!("-S {}", quote_arg(&source)));
        parts.push(format!(
            "-B {}",
            quote_arg(&target.build_dir().to_string_lossy())
        ));
        parts.push(format!("-DCMAKE_BUILD_TYPE={}", target.build_type()));
        parts.push(format!("-DCMAKE_INSTALL_PREFIX={}", quote_arg(&source)));

        if let Some(ref cc) = self.profile.c_compiler {
            parts.push(format!(
                "-DCMAKE_C_COMPILER={}",
                quote_arg(&cc.to_string_lossy())
            ));
        }
        if let Some(ref cxx) = self.profile.cxx_compiler {
            parts.push(format!(
                "-DCMAKE_CXX_COMPILER={}",
                quote_arg(&cxx.to_string_lossy())
            ));
        }

        parts.extend(self.profile.platform_args.iter().cloned());
        parts.extend(self.cmake_args.iter().cloned());

        parts.join(" ")
    }

    /// The build command line.
    pub fn build_command(&self) -> String {
        format!(
            "{} --build {} --config {}",
            quote_arg(&self.cmake.to_string_lossy()),
            quote_arg(&self.target.build_dir().to_string_lossy()),
            self.target.build_type()
        )
    }

    /// Configure if needed, then build.
    ///
    /// The staleness marker is only written when both steps succeed and a
    /// configure ran, so any failure forces a fresh configure next time.
    pub fn build(&self) -> Result<BuildOutcome> {
        let marker = self.target.marker_path();
        let descriptor = self.target.descriptor_path();

        let configured = needs_configure(&marker, &descriptor)?;
        if configured {
            self.configure()?;
        } else {
            tracing::info!("`{}` is up to date; skipping configure", self.target.name());
        }

        let output = self.compile()?;

        if configured {
            record_success(&marker, &descriptor)?;
        }

        Ok(BuildOutcome { configured, output })
    }

    /// Run CMake configuration.
    fn configure(&self) -> Result<()> {
        tracing::info!("Configuring `{}`", self.target.name());

        ensure_dir(self.target.build_dir())?;

        let command = self.configure_command();
        let out = self.runner.run(self.target.consumer_dir(), &command)?;

        if !out.success() {
            return Err(ExternalBuildError::ConfigureFailed {
                command,
                code: out.exit_code,
                output: out.output,
            }
            .into());
        }

        Ok(())
    }

    /// Run CMake build, returning its output.
    fn compile(&self) -> Result<String> {
        tracing::info!(
            "Building `{}` ({})",
            self.target.name(),
            self.target.build_type()
        );

        let command = self.build_command();
        let out = self.runner.run(self.target.consumer_dir(), &command)?;

        if !out.success() {
            return Err(ExternalBuildError::BuildFailed {
                command,
                code: out.exit_code,
                output: out.output,
            }
            .into());
        }

        Ok(out.output)
    }
}
