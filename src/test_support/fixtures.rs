//! Fixtures for external project tests.

use std::path::{Path, PathBuf};

use crate::core::target::{BuildTarget, ROOT_DESCRIPTOR};

/// A minimal root `CMakeLists.txt`.
pub const CMAKE_LISTS: &str = "cmake_minimum_required(VERSION 3.16)\nproject(ext CXX)\n";

/// A manifest exercising every recognized key.
pub const FULL_MANIFEST: &str = "\
cppStandard=17
dependencies=ext.version
sourcePath=/ext/src
sourceDependencies=include/ext.h
includes=/ext/include,/ext/generated,
binaryDirectories=/ext/lib
libraries=ext,ext_util
";

/// Create an external CMake project at `root/name` and return its directory.
pub fn cmake_project(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(ROOT_DESCRIPTOR), CMAKE_LISTS).unwrap();
    dir
}

/// Write the manifest a successful build of `target` would produce.
pub fn write_manifest(target: &BuildTarget, contents: &str) {
    let path = target.manifest_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}
