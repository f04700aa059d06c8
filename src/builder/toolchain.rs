//! Toolchain resolution for external CMake projects.
//!
//! Maps the consumer's platform, compiler and configuration onto the CMake
//! generator, generator flags and compiler paths used to configure an
//! external project. Resolution is pure: it never touches the filesystem.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::platform::{Arch, BuildType, Compiler, Configuration, Platform};

/// Generator used for Makefile-style builds on Windows.
pub const NMAKE_GENERATOR: &str = "NMake Makefiles";

/// Generator used on Linux and macOS.
pub const UNIX_GENERATOR: &str = "Unix Makefiles";

/// Toolset flag appended to every Windows profile.
const WINDOWS_HOST_TOOLSET: [&str; 2] = ["-T", "host=x64"];

/// Inputs to toolchain resolution.
#[derive(Debug, Clone)]
pub struct ToolchainRequest {
    /// Platform the tool runs on
    pub host: Platform,
    /// Platform the consumer is building for
    pub target: Platform,
    pub arch: Arch,
    pub compiler: Compiler,
    pub configuration: Configuration,
    /// Internal toolchain root for the target platform, if one is installed
    pub toolchain_root: Option<PathBuf>,
}

impl ToolchainRequest {
    /// A request for building on and for the host platform.
    pub fn for_host(configuration: Configuration) -> Self {
        ToolchainRequest {
            host: Platform::host(),
            target: Platform::host(),
            arch: Arch::host(),
            compiler: Compiler::Default,
            configuration,
            toolchain_root: None,
        }
    }
}

/// Resolved generator and compiler settings.
///
/// Empty fields are omitted from the configure command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainProfile {
    /// CMake generator name (`-G`)
    pub generator: Option<String>,
    /// Platform-specific generator arguments (`-A`, `-T`)
    pub platform_args: Vec<String>,
    pub c_compiler: Option<PathBuf>,
    pub cxx_compiler: Option<PathBuf>,
    pub linker: Option<PathBuf>,
    pub build_type: BuildType,
}

impl ToolchainProfile {
    fn empty(build_type: BuildType) -> Self {
        ToolchainProfile {
            generator: None,
            platform_args: Vec::new(),
            c_compiler: None,
            cxx_compiler: None,
            linker: None,
            build_type,
        }
    }
}

/// Resolve a toolchain profile.
///
/// The generator is chosen by the target platform: Windows picks one from
/// the compiler family, Linux and macOS always use Makefiles. Platforms
/// without a mapping get an empty profile and CMake picks its defaults.
pub fn resolve(request: &ToolchainRequest) -> ToolchainProfile {
    let mut profile = ToolchainProfile::empty(BuildType::from(request.configuration));

    match request.target {
        Platform::Windows => {
            resolve_windows(request, &mut profile);
            profile
                .platform_args
                .extend(WINDOWS_HOST_TOOLSET.iter().map(|s| s.to_string()));
        }
        Platform::Linux | Platform::MacOs => {
            profile.generator = Some(UNIX_GENERATOR.to_string());
            if let Some(ref root) = request.toolchain_root {
                set_internal_toolchain(root, &mut profile);
            }
        }
        Platform::Other => {
            tracing::debug!("no toolchain mapping for target platform; using CMake defaults");
        }
    }

    profile
}

fn resolve_windows(request: &ToolchainRequest, profile: &mut ToolchainProfile) {
    match request.compiler {
        Compiler::Clang | Compiler::Intel => {
            profile.generator = Some(NMAKE_GENERATOR.to_string());
        }
        Compiler::VisualStudio2019 => {
            profile.generator = Some("Visual Studio 16 2019".to_string());
        }
        Compiler::VisualStudio2022 => {
            profile.generator = Some("Visual Studio 17 2022".to_string());
            let platform = match request.arch {
                Arch::X64 => "x64",
                Arch::Arm64 => "ARM64",
            };
            profile.platform_args.extend(["-A".to_string(), platform.to_string()]);
        }
        Compiler::Default => {}
    }
}

fn set_internal_toolchain(root: &Path, profile: &mut ToolchainProfile) {
    let bin = root.join("bin");
    profile.c_compiler = Some(bin.join("clang"));
    profile.cxx_compiler = Some(bin.join("clang++"));
    profile.linker = Some(bin.join("lld"));
}
