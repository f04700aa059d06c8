//! Core data types: build targets, platforms, manifests and C++ standards.

pub mod language;
pub mod manifest;
pub mod platform;
pub mod target;

pub use language::CppStandard;
pub use manifest::{Manifest, ManifestValue};
pub use platform::{Arch, BuildType, Compiler, Configuration, Platform};
pub use target::BuildTarget;
