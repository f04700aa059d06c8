//! Build info manifest written by external projects.
//!
//! The manifest is a line-oriented `key=value` file that an external CMake
//! project writes into its build directory to describe what a consumer
//! needs to compile and link against it:
//!
//! ```text
//! cppStandard=17
//! includes=/opt/ext/include,/opt/ext/generated
//! binaryDirectories=/opt/ext/lib
//! libraries=ext,ext_util
//! ```
//!
//! Lines that do not split into exactly one key and one value are skipped.
//! List-valued keys are split on `,` at parse time, dropping empty entries.

use std::fmt;
use std::path::Path;

use crate::util::diagnostic::ExternalBuildError;
use crate::util::fs::read_to_string;

/// Manifest keys whose values are comma-separated lists.
pub const LIST_KEYS: &[&str] = &[
    keys::DEPENDENCIES,
    keys::SOURCE_DEPENDENCIES,
    keys::INCLUDES,
    keys::BINARY_DIRECTORIES,
    keys::LIBRARIES,
];

/// Recognized manifest keys.
pub mod keys {
    pub const CPP_STANDARD: &str = "cppStandard";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const SOURCE_DEPENDENCIES: &str = "sourceDependencies";
    pub const SOURCE_PATH: &str = "sourcePath";
    pub const INCLUDES: &str = "includes";
    pub const BINARY_DIRECTORIES: &str = "binaryDirectories";
    pub const LIBRARIES: &str = "libraries";
}

/// A manifest value, typed once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValue {
    Scalar(String),
    List(Vec<String>),
}

impl ManifestValue {
    fn parse(key: &str, raw: &str) -> Self {
        if LIST_KEYS.contains(&key) {
            ManifestValue::List(
                raw.split(',')
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            ManifestValue::Scalar(raw.to_string())
        }
    }

    /// The scalar value, or `None` for lists.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            ManifestValue::Scalar(s) => Some(s),
            ManifestValue::List(_) => None,
        }
    }

    /// The list entries; a scalar reads as a one-element list.
    pub fn as_list(&self) -> &[String] {
        match self {
            ManifestValue::List(items) => items,
            ManifestValue::Scalar(s) => std::slice::from_ref(s),
        }
    }
}

impl fmt::Display for ManifestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestValue::Scalar(s) => f.write_str(s),
            ManifestValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Parsed build info manifest, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, ManifestValue)>,
}

impl Manifest {
    /// Read and parse a manifest file.
    ///
    /// A missing file means the external build did not honor its output
    /// contract and fails with [`ExternalBuildError::ManifestMissing`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::info!("Loading build info file: {}", path.display());

        if !path.is_file() {
            return Err(ExternalBuildError::ManifestMissing {
                path: path.to_path_buf(),
                output: String::new(),
            }
            .into());
        }

        Ok(Manifest::parse(&read_to_string(path)?))
    }

    /// Parse manifest text.
    ///
    /// A key that appears twice keeps its first position but takes the
    /// later value.
    pub fn parse(contents: &str) -> Self {
        let mut manifest = Manifest::default();

        for (lineno, line) in contents.lines().enumerate() {
            let mut parts = line.split('=');
            let (Some(key), Some(raw), None) = (parts.next(), parts.next(), parts.next()) else {
                if !line.trim().is_empty() {
                    tracing::debug!("ignoring malformed manifest line {}: {}", lineno + 1, line);
                }
                continue;
            };
            if key.is_empty() {
                tracing::debug!("ignoring manifest line {} without a key", lineno + 1);
                continue;
            }

            manifest.insert(key, ManifestValue::parse(key, raw), lineno + 1);
        }

        manifest
    }

    fn insert(&mut self, key: &str, value: ManifestValue, lineno: usize) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => {
                tracing::warn!(
                    "duplicate manifest key `{}` on line {}; using the later value",
                    key,
                    lineno
                );
                entry.1 = value;
            }
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&ManifestValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a scalar value by key.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ManifestValue::as_scalar)
    }

    /// Look up a list value by key; absent keys yield an empty list.
    pub fn list(&self, key: &str) -> &[String] {
        self.get(key).map(ManifestValue::as_list).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_lists_and_scalars() {
        let manifest = Manifest::parse("cppStandard=17\nincludes=/a,/b,\nlibraries=foo\n");

        assert_eq!(manifest.scalar(keys::CPP_STANDARD), Some("17"));
        assert_eq!(manifest.list(keys::INCLUDES), ["/a", "/b"]);
        assert_eq!(manifest.list(keys::LIBRARIES), ["foo"]);
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let manifest = Manifest::parse(
            "malformed line without equals\n\
             a=b=c\n\
             =nokey\n\
             \n\
             libraries=z\n",
        );

        assert_eq!(manifest.len(), 1);
        assert!(!manifest.contains_key("a"));
        assert_eq!(manifest.list(keys::LIBRARIES), ["z"]);
    }

    #[test]
    fn test_only_malformed_line_yields_empty_manifest() {
        let manifest = Manifest::parse("malformed line without equals");
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_empty_list_entries_dropped() {
        let manifest = Manifest::parse("dependencies=,,a,,b,\nincludes=\n");

        assert_eq!(manifest.list(keys::DEPENDENCIES), ["a", "b"]);
        assert!(manifest.list(keys::INCLUDES).is_empty());
        assert!(manifest.contains_key(keys::INCLUDES));
    }

    #[test]
    fn test_duplicate_key_takes_later_value_in_first_position() {
        let manifest = Manifest::parse("libraries=a\ncppStandard=14\nlibraries=b,c\n");

        assert_eq!(manifest.list(keys::LIBRARIES), ["b", "c"]);
        let order: Vec<&str> = manifest.iter().map(|(k, _)| k).collect();
        assert_eq!(order, ["libraries", "cppStandard"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let manifest = Manifest::parse("cppStandard=20\r\nlibraries=foo\r\n");

        assert_eq!(manifest.scalar(keys::CPP_STANDARD), Some("20"));
        assert_eq!(manifest.list(keys::LIBRARIES), ["foo"]);
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("buildinfo_Debug.output");

        let err = Manifest::load(&path).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ExternalBuildError>(),
            Some(ExternalBuildError::ManifestMissing { .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("buildinfo_Release.output");
        std::fs::write(&path, "sourcePath=/src\nsourceDependencies=a.h,b.h\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();

        assert_eq!(manifest.scalar(keys::SOURCE_PATH), Some("/src"));
        assert_eq!(manifest.list(keys::SOURCE_DEPENDENCIES), ["a.h", "b.h"]);
    }
}
