//! `cmake-bridge manifest` command

use anyhow::Result;

use crate::cli::ManifestArgs;
use crate::commands::print_module_config;
use cmake_bridge::builder::{apply, ModuleConfig};
use cmake_bridge::core::Manifest;

pub fn execute(args: ManifestArgs) -> Result<()> {
    let manifest = Manifest::load(&args.path)?;

    let mut module = ModuleConfig::default();
    apply(&manifest, &mut module);

    print_module_config(&module, args.json)
}
