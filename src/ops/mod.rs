//! High-level operations.

pub mod external_project;

pub use external_project::{
    add_external_project, cmake_program, ExternalProjectOptions, ExternalProjectResult,
};
