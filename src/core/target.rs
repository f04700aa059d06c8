//! External project build targets.
//!
//! A [`BuildTarget`] pins down every path one external CMake project build
//! touches for one consumer and one build type.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::platform::BuildType;
use crate::util::fs::to_forward_slashes;

/// Name of the root project descriptor inside an external project.
pub const ROOT_DESCRIPTOR: &str = "CMakeLists.txt";

/// Check that a project name is usable as a single directory name.
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("invalid external project name `{}`", name);
    }
    Ok(())
}

/// One external CMake project, built for one consumer and build type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    name: String,
    consumer_dir: PathBuf,
    source_dir: PathBuf,
    intermediate_dir: PathBuf,
    build_dir: PathBuf,
    build_type: BuildType,
}

impl BuildTarget {
    /// Create a build target.
    ///
    /// `intermediate_root` is resolved against `consumer_dir` when relative;
    /// the project's own intermediate directory is `<intermediate_root>/<name>`.
    pub fn new(
        name: impl Into<String>,
        consumer_dir: impl Into<PathBuf>,
        intermediate_root: &Path,
        source_dir: impl Into<PathBuf>,
        build_type: BuildType,
    ) -> Result<Self> {
        let name = name.into();
        let consumer_dir = consumer_dir.into();
        let source_dir = source_dir.into();

        validate_project_name(&name)?;

        let descriptor = source_dir.join(ROOT_DESCRIPTOR);
        if !descriptor.is_file() {
            bail!(
                "no {} found in `{}`\n\
                 \n\
                 The source directory of an external project must contain its root {}.",
                ROOT_DESCRIPTOR,
                source_dir.display(),
                ROOT_DESCRIPTOR
            );
        }

        let intermediate_dir = consumer_dir.join(intermediate_root).join(&name);
        let build_dir = intermediate_dir.join("build");

        Ok(BuildTarget {
            name,
            consumer_dir,
            source_dir,
            intermediate_dir,
            build_dir,
            build_type,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory external commands run in.
    pub fn consumer_dir(&self) -> &Path {
        &self.consumer_dir
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn intermediate_dir(&self) -> &Path {
        &self.intermediate_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    /// The root `CMakeLists.txt` whose timestamp drives reconfiguration.
    pub fn descriptor_path(&self) -> PathBuf {
        self.source_dir.join(ROOT_DESCRIPTOR)
    }

    /// Staleness marker for this build type (`<intermediate>/<type>.built`).
    pub fn marker_path(&self) -> PathBuf {
        self.intermediate_dir
            .join(format!("{}.built", self.build_type.as_str()))
    }

    /// Build info file the project writes (`<build>/buildinfo_<type>.output`).
    pub fn manifest_path(&self) -> PathBuf {
        to_forward_slashes(
            &self
                .build_dir
                .join(format!("buildinfo_{}.output", self.build_type.as_str())),
        )
    }
}
