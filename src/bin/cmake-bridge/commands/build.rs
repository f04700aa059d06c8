//! `cmake-bridge build` command

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::BuildArgs;
use crate::commands::{config_for, print_module_config, project_dir};
use cmake_bridge::builder::ModuleConfig;
use cmake_bridge::ops::{add_external_project, ExternalProjectOptions};
use cmake_bridge::util::ShellRunner;

pub fn execute(args: BuildArgs, cancel: Arc<AtomicBool>) -> Result<()> {
    let consumer_dir = project_dir(args.project_dir)?;
    let config = config_for(&consumer_dir);

    let request = args.toolchain.to_request(&config)?;

    let source_dir = std::path::absolute(&args.source)
        .with_context(|| format!("invalid source directory: {}", args.source.display()))?;

    let mut opts = ExternalProjectOptions::new(args.name, source_dir, consumer_dir, request);
    opts.intermediate_root = config.intermediate_dir();
    // CLI overrides config
    opts.cmake = args.cmake.or_else(|| config.cmake.program.clone());
    opts.cmake_args = config.cmake.args.clone();
    opts.cmake_args.extend(args.cmake_args);

    let timeout = args.timeout.map(Duration::from_secs).or(config.timeout());
    let runner = ShellRunner::new()
        .with_timeout(timeout)
        .with_cancel_flag(cancel);

    let mut module = ModuleConfig::default();
    let result = add_external_project(&opts, &runner, &mut module)?;

    eprintln!(
        "    Finished `{}` ({}{})",
        result.target.name(),
        result.target.build_type(),
        if result.outcome.configured {
            ", configured"
        } else {
            ""
        }
    );

    print_module_config(&module, args.json)
}
