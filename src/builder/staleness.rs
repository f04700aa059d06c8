//! Staleness tracking for external project configuration.
//!
//! After a successful configure and build, the modification time of the
//! project's root `CMakeLists.txt` is written to a marker file. The project
//! is configured again whenever the marker is missing, unreadable, or
//! disagrees with the descriptor's current modification time.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};

use crate::util::fs::{modified_time, write_string};

/// Descriptor modification time as of the last successful configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessMarker {
    timestamp: DateTime<Utc>,
}

impl StalenessMarker {
    /// Marker for the descriptor's current modification time.
    pub fn for_descriptor(descriptor: &Path) -> Result<Self> {
        Ok(StalenessMarker {
            timestamp: DateTime::<Utc>::from(modified_time(descriptor)?),
        })
    }

    /// Read a marker file.
    ///
    /// Returns `None` if the file does not exist or does not hold a timestamp.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read marker: {}", path.display()))?;
        let contents = String::from_utf8_lossy(&bytes);
        match DateTime::parse_from_rfc3339(contents.trim()) {
            Ok(timestamp) => Ok(Some(StalenessMarker {
                timestamp: timestamp.with_timezone(&Utc),
            })),
            Err(e) => {
                tracing::warn!(
                    "ignoring unreadable marker {}: {}",
                    path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Write the marker, replacing any previous content.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_string(path, &self.timestamp.to_rfc3339())
    }

    /// Compare at whole-second granularity.
    pub fn matches(&self, other: &StalenessMarker) -> bool {
        self.timestamp.trunc_subsecs(0) == other.timestamp.trunc_subsecs(0)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Check whether the project must be configured before building.
pub fn needs_configure(marker: &Path, descriptor: &Path) -> Result<bool> {
    let Some(recorded) = StalenessMarker::read(marker)? else {
        tracing::debug!("no marker at {}; configure required", marker.display());
        return Ok(true);
    };

    let current = StalenessMarker::for_descriptor(descriptor)?;
    if recorded.matches(&current) {
        Ok(false)
    } else {
        tracing::debug!(
            "{} changed ({} -> {}); configure required",
            descriptor.display(),
            recorded.timestamp(),
            current.timestamp()
        );
        Ok(true)
    }
}

/// Record the descriptor's current modification time in the marker.
///
/// Only call this after a configure step that exited with code zero.
pub fn record_success(marker: &Path, descriptor: &Path) -> Result<()> {
    StalenessMarker::for_descriptor(descriptor)?.write(marker)
}
