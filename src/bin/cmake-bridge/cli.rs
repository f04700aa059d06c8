//! CLI definitions using clap.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use cmake_bridge::builder::ToolchainRequest;
use cmake_bridge::core::{Arch, Compiler, Configuration, Platform};
use cmake_bridge::util::Config;

/// cmake-bridge - build external CMake projects and link against their output
#[derive(Parser)]
#[command(name = "cmake-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (shows CMake output as it runs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure and build an external project, then apply its build info
    Build(BuildArgs),

    /// Show what a build info file would apply, without building
    Manifest(ManifestArgs),

    /// Show the resolved toolchain profile
    Toolchain(ToolchainArgs),

    /// Remove an external project's intermediate directory
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Toolchain selection flags shared by several commands.
#[derive(Args, Debug, Clone)]
pub struct ToolchainOpts {
    /// Build configuration (debug, development, shipping, release, ...)
    #[arg(long, default_value = "development")]
    pub config: String,

    /// Target platform (windows, linux, macos); defaults to the host
    #[arg(long)]
    pub target_os: Option<String>,

    /// Target architecture (x64, arm64); defaults to the host
    #[arg(long)]
    pub arch: Option<String>,

    /// Compiler family (clang, intel, vs2019, vs2022)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Internal toolchain root containing bin/clang, bin/clang++ and bin/lld
    #[arg(long, env = "CMAKE_BRIDGE_TOOLCHAIN_ROOT")]
    pub toolchain_root: Option<PathBuf>,
}

impl ToolchainOpts {
    /// Build a toolchain request; flags override config, config overrides host defaults.
    pub fn to_request(&self, config: &Config) -> Result<ToolchainRequest> {
        let configuration: Configuration = self.config.parse().map_err(|e| anyhow!("{}", e))?;

        let mut request = ToolchainRequest::for_host(configuration);

        if let Some(ref os) = self.target_os {
            request.target = os.parse::<Platform>().map_err(|e| anyhow!("{}", e))?;
        }

        if let Some(arch) = self.arch.as_ref().or(config.toolchain.arch.as_ref()) {
            request.arch = arch.parse::<Arch>().map_err(|e| anyhow!("{}", e))?;
        }

        if let Some(compiler) = self.compiler.as_ref().or(config.toolchain.compiler.as_ref()) {
            request.compiler = compiler.parse::<Compiler>().map_err(|e| anyhow!("{}", e))?;
        }

        request.toolchain_root = self
            .toolchain_root
            .clone()
            .or_else(|| config.toolchain.root.clone());

        Ok(request)
    }
}

#[derive(Args)]
pub struct BuildArgs {
    /// External project name (unique per consumer project)
    pub name: String,

    /// Directory containing the external project's CMakeLists.txt
    #[arg(long, short)]
    pub source: PathBuf,

    /// Consumer project directory (defaults to current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    #[command(flatten)]
    pub toolchain: ToolchainOpts,

    /// Path to the cmake executable
    #[arg(long)]
    pub cmake: Option<PathBuf>,

    /// Kill configure/build steps after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the applied configuration as JSON
    #[arg(long)]
    pub json: bool,

    /// Extra arguments passed to the configure step
    #[arg(last = true)]
    pub cmake_args: Vec<String>,
}

#[derive(Args)]
pub struct ManifestArgs {
    /// Path to a buildinfo_<config>.output file
    pub path: PathBuf,

    /// Print the applied configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(flatten)]
    pub toolchain: ToolchainOpts,

    /// Consumer project directory for config lookup (defaults to current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// External project name
    pub name: String,

    /// Consumer project directory (defaults to current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
