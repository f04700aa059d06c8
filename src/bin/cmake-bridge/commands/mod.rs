//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod manifest;
pub mod toolchain;

use std::path::PathBuf;

use anyhow::{Context, Result};

use cmake_bridge::builder::{ExternalDependency, ModuleConfig};
use cmake_bridge::util::config::{global_config_path, load_config, project_config_path};
use cmake_bridge::util::Config;

/// Resolve `--project-dir`, defaulting to the current directory.
pub fn project_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => std::path::absolute(&dir)
            .with_context(|| format!("invalid project directory: {}", dir.display())),
        None => std::env::current_dir().context("failed to read current directory"),
    }
}

/// Load global and project configuration for a consumer project.
pub fn config_for(project_dir: &std::path::Path) -> Config {
    load_config(
        global_config_path().as_deref(),
        &project_config_path(project_dir),
    )
}

/// Print applied configuration, human-readable or as JSON.
pub fn print_module_config(config: &ModuleConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    if let Some(standard) = config.cpp_standard {
        println!("C++ standard:       {}", standard);
    }
    print_list("Include paths:", &config.include_paths);
    print_list("Library paths:", &config.runtime_library_paths);
    print_list("Libraries:", &config.libraries);

    let dependencies: Vec<String> = config
        .external_dependencies
        .iter()
        .map(|dep| match dep {
            ExternalDependency::Token(token) => token.clone(),
            ExternalDependency::Path(path) => path.display().to_string(),
        })
        .collect();
    print_list("Dependencies:", &dependencies);

    Ok(())
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}", label);
    for item in items {
        println!("  {}", item);
    }
}
