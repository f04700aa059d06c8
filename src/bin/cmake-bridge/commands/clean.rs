//! `cmake-bridge clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::{config_for, project_dir};
use cmake_bridge::core::target::validate_project_name;
use cmake_bridge::util::fs::remove_dir_all_if_exists;

pub fn execute(args: CleanArgs) -> Result<()> {
    validate_project_name(&args.name)?;

    let dir = project_dir(args.project_dir)?;
    let config = config_for(&dir);

    let intermediate = dir.join(config.intermediate_dir()).join(&args.name);
    remove_dir_all_if_exists(&intermediate)?;
    eprintln!("     Removed {}", intermediate.display());

    Ok(())
}
