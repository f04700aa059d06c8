//! Translation of a build info manifest into consumer configuration.
//!
//! The consumer's build configuration is modelled as a [`ConfigSink`]: an
//! append-only capability this crate writes derived settings into. It is
//! never read back or reset. On a failed external build the consumer must
//! discard its configuration as a whole.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::language::CppStandard;
use crate::core::manifest::{keys, Manifest};

/// An external file or token the consumer's build depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExternalDependency {
    /// Opaque identifier, passed through as written
    Token(String),
    /// File under the external project's source tree
    Path(PathBuf),
}

/// Receives the settings derived from a manifest.
pub trait ConfigSink {
    fn set_cpp_standard(&mut self, standard: CppStandard);
    fn add_external_dependency(&mut self, dependency: ExternalDependency);
    fn add_include_path(&mut self, path: &str);
    fn add_runtime_library_path(&mut self, path: &str);
    fn add_library(&mut self, library: &str);
}

/// Plain in-memory consumer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleConfig {
    pub cpp_standard: Option<CppStandard>,
    pub external_dependencies: Vec<ExternalDependency>,
    pub include_paths: Vec<String>,
    pub runtime_library_paths: Vec<String>,
    pub libraries: Vec<String>,
}

impl ConfigSink for ModuleConfig {
    fn set_cpp_standard(&mut self, standard: CppStandard) {
        self.cpp_standard = Some(standard);
    }

    fn add_external_dependency(&mut self, dependency: ExternalDependency) {
        self.external_dependencies.push(dependency);
    }

    fn add_include_path(&mut self, path: &str) {
        self.include_paths.push(path.to_string());
    }

    fn add_runtime_library_path(&mut self, path: &str) {
        self.runtime_library_paths.push(path.to_string());
    }

    fn add_library(&mut self, library: &str) {
        self.libraries.push(library.to_string());
    }
}

/// Push every recognized manifest setting into `sink`.
///
/// Absent keys leave the sink untouched; unrecognized keys are ignored.
pub fn apply(manifest: &Manifest, sink: &mut dyn ConfigSink) {
    if let Some(standard) = manifest
        .scalar(keys::CPP_STANDARD)
        .and_then(CppStandard::from_manifest_value)
    {
        tracing::debug!("C++ standard: {}", standard);
        sink.set_cpp_standard(standard);
    }

    for dependency in manifest.list(keys::DEPENDENCIES) {
        sink.add_external_dependency(ExternalDependency::Token(dependency.clone()));
    }

    let source_path = Path::new(manifest.scalar(keys::SOURCE_PATH).unwrap_or(""));
    for dependency in manifest.list(keys::SOURCE_DEPENDENCIES) {
        sink.add_external_dependency(ExternalDependency::Path(source_path.join(dependency)));
    }

    for include in manifest.list(keys::INCLUDES) {
        sink.add_include_path(include);
    }

    for dir in manifest.list(keys::BINARY_DIRECTORIES) {
        tracing::debug!("Add library path: {}", dir);
        sink.add_runtime_library_path(dir);
    }

    for library in manifest.list(keys::LIBRARIES) {
        sink.add_library(library);
    }
}
