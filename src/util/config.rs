//! Configuration file support for cmake-bridge.
//!
//! Two configuration file locations are read:
//! - Global: `~/.cmake-bridge/config.toml` - User-wide defaults
//! - Project: `.cmake-bridge/config.toml` - Consumer-project overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default intermediate directory, relative to the consumer project.
pub const DEFAULT_INTERMEDIATE_DIR: &str = "Intermediate/CMakeTarget";

/// cmake-bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CMake invocation settings
    pub cmake: CMakeConfig,

    /// Toolchain settings
    pub toolchain: ToolchainSettings,

    /// Directory layout settings
    pub layout: LayoutConfig,
}

/// CMake invocation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CMakeConfig {
    /// Path to the cmake executable
    pub program: Option<PathBuf>,

    /// Kill configure/build steps that run longer than this
    pub timeout_secs: Option<u64>,

    /// Extra arguments appended to every configure command
    pub args: Vec<String>,
}

/// Toolchain selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Internal toolchain root (contains bin/clang, bin/clang++, bin/lld)
    pub root: Option<PathBuf>,

    /// Compiler family (clang, intel, vs2019, vs2022)
    pub compiler: Option<String>,

    /// Target architecture (x64, arm64)
    pub arch: Option<String>,
}

/// Directory layout settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Intermediate directory, relative to the consumer project
    pub intermediate_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.cmake.program.is_some() {
            self.cmake.program = other.cmake.program;
        }
        if other.cmake.timeout_secs.is_some() {
            self.cmake.timeout_secs = other.cmake.timeout_secs;
        }
        if !other.cmake.args.is_empty() {
            self.cmake.args = other.cmake.args;
        }

        if other.toolchain.root.is_some() {
            self.toolchain.root = other.toolchain.root;
        }
        if other.toolchain.compiler.is_some() {
            self.toolchain.compiler = other.toolchain.compiler;
        }
        if other.toolchain.arch.is_some() {
            self.toolchain.arch = other.toolchain.arch;
        }

        if other.layout.intermediate_dir.is_some() {
            self.layout.intermediate_dir = other.layout.intermediate_dir;
        }
    }

    /// The configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.cmake.timeout_secs.map(Duration::from_secs)
    }

    /// Intermediate directory relative to the consumer project.
    pub fn intermediate_dir(&self) -> PathBuf {
        self.layout
            .intermediate_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERMEDIATE_DIR))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cmake-bridge/config.toml)
/// 2. Global config (~/.cmake-bridge/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.cmake-bridge).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".cmake-bridge"))
}

/// Get the global config path (~/.cmake-bridge/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.cmake-bridge/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".cmake-bridge").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
            [cmake]
            program = "/opt/cmake/bin/cmake"
            timeout_secs = 600
            args = ["-DFOO=ON"]

            [toolchain]
            root = "/opt/sdk"
            compiler = "clang"
            "#,
        )
        .unwrap();

        assert_eq!(config.cmake.program, Some(PathBuf::from("/opt/cmake/bin/cmake")));
        assert_eq!(config.timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.cmake.args, vec!["-DFOO=ON"]);
        assert_eq!(config.toolchain.root, Some(PathBuf::from("/opt/sdk")));
        assert_eq!(config.intermediate_dir(), PathBuf::from(DEFAULT_INTERMEDIATE_DIR));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(
            &global,
            "[cmake]\ntimeout_secs = 10\nprogram = \"cmake3\"\n[toolchain]\narch = \"arm64\"\n",
        )
        .unwrap();
        std::fs::write(&project, "[cmake]\ntimeout_secs = 20\n").unwrap();

        let config = load_config(Some(&global), &project);

        assert_eq!(config.cmake.timeout_secs, Some(20));
        assert_eq!(config.cmake.program, Some(PathBuf::from("cmake3")));
        assert_eq!(config.toolchain.arch.as_deref(), Some("arm64"));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        let config = Config::load_or_default(&path);

        assert!(config.cmake.program.is_none());
    }
}
