//! Platform, architecture, compiler and configuration identifiers.
//!
//! These are the inputs of toolchain resolution. The host platform is
//! detected from the compilation target of this binary; everything else
//! is supplied by the consumer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    /// Anything else; resolves to an empty toolchain profile.
    Other,
}

impl Platform {
    /// The platform this binary runs on.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    /// Linux and macOS share the Makefile generator and toolchain layout.
    pub fn is_unix(&self) -> bool {
        matches!(self, Platform::Linux | Platform::MacOs)
    }

    /// Name of the cmake executable on this platform.
    pub fn cmake_executable(&self) -> &'static str {
        match self {
            Platform::Windows => "cmake.exe",
            _ => "cmake",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Other => "other",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win64" | "win" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" | "mac" | "darwin" => Ok(Platform::MacOs),
            "other" => Ok(Platform::Other),
            _ => Err(format!(
                "invalid platform '{}'; expected 'windows', 'linux', 'macos' or 'other'",
                s
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[default]
    X64,
    Arm64,
}

impl Arch {
    /// The architecture this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(target_arch = "aarch64") {
            Arch::Arm64
        } else {
            Arch::X64
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
        }
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            _ => Err(format!("invalid architecture '{}'; expected 'x64' or 'arm64'", s)),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler family used by the consumer on Windows targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    /// Let the platform decide.
    #[default]
    Default,
    Clang,
    Intel,
    #[serde(rename = "vs2019")]
    VisualStudio2019,
    #[serde(rename = "vs2022")]
    VisualStudio2022,
}

impl Compiler {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compiler::Default => "default",
            Compiler::Clang => "clang",
            Compiler::Intel => "intel",
            Compiler::VisualStudio2019 => "vs2019",
            Compiler::VisualStudio2022 => "vs2022",
        }
    }
}

impl FromStr for Compiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Compiler::Default),
            "clang" => Ok(Compiler::Clang),
            "intel" => Ok(Compiler::Intel),
            "vs2019" | "visualstudio2019" => Ok(Compiler::VisualStudio2019),
            "vs2022" | "visualstudio2022" => Ok(Compiler::VisualStudio2022),
            _ => Err(format!(
                "invalid compiler '{}'; expected 'default', 'clang', 'intel', 'vs2019' or 'vs2022'",
                s
            )),
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build configuration of the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Configuration {
    Debug,
    DebugGame,
    #[default]
    Development,
    Test,
    Shipping,
    Release,
}

impl Configuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Configuration::Debug => "debug",
            Configuration::DebugGame => "debuggame",
            Configuration::Development => "development",
            Configuration::Test => "test",
            Configuration::Shipping => "shipping",
            Configuration::Release => "release",
        }
    }
}

impl FromStr for Configuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Configuration::Debug),
            "debuggame" => Ok(Configuration::DebugGame),
            "development" => Ok(Configuration::Development),
            "test" => Ok(Configuration::Test),
            "shipping" => Ok(Configuration::Shipping),
            "release" => Ok(Configuration::Release),
            _ => Err(format!(
                "invalid configuration '{}'; expected 'debug', 'debuggame', 'development', 'test', 'shipping' or 'release'",
                s
            )),
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CMake build type. Only `Debug` configurations build as `Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }
}

impl From<Configuration> for BuildType {
    fn from(configuration: Configuration) -> Self {
        match configuration {
            Configuration::Debug => BuildType::Debug,
            _ => BuildType::Release,
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
