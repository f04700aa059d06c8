//! `cmake-bridge toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use crate::commands::{config_for, project_dir};
use cmake_bridge::builder::resolve;
use cmake_bridge::ops::cmake_program;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let dir = project_dir(args.project_dir)?;
    let config = config_for(&dir);
    let request = args.toolchain.to_request(&config)?;
    let profile = resolve(&request);

    let cmake = cmake_program(config.cmake.program.as_deref(), request.host);

    println!("Toolchain:");
    println!();
    println!("  Host:       {}", request.host);
    println!("  Target:     {} ({})", request.target, request.arch);
    println!("  Compiler:   {}", request.compiler);
    println!("  CMake:      {}", cmake.display());
    println!(
        "  Generator:  {}",
        profile.generator.as_deref().unwrap_or("(cmake default)")
    );
    if !profile.platform_args.is_empty() {
        println!("  Platform:   {}", profile.platform_args.join(" "));
    }
    println!("  Build type: {}", profile.build_type);

    for (label, path) in [
        ("CC", &profile.c_compiler),
        ("CXX", &profile.cxx_compiler),
        ("LD", &profile.linker),
    ] {
        match path {
            Some(path) => println!("  {:<11} {}", format!("{}:", label), path.display()),
            None => println!("  {:<11} (system default)", format!("{}:", label)),
        }
    }

    Ok(())
}
