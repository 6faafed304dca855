//! Driven port for obtaining device data, plus its adapters.
//!
//! The application asks a [`DeviceSource`] for data exactly once at startup.
//! The JSON file adapter reads through a capability-scoped directory handle;
//! the fixture adapter serves an in-memory store for tests and demos.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};

use crate::error::DeviceDataError;
use crate::geometry::CoordinatePolicy;
use crate::store::DeviceStore;

/// Port for loading the device store.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceSource {
    /// Loads every device record.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDataError`] when the data is unavailable.
    fn load(&self) -> Result<DeviceStore, DeviceDataError>;
}

/// Reads device data from a JSON file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileDeviceSource {
    path: Utf8PathBuf,
    policy: CoordinatePolicy,
}

impl JsonFileDeviceSource {
    /// Creates a source for the given file and ingestion policy.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, policy: CoordinatePolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    /// Returns the configured file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn open_parent(&self) -> Result<(Dir, &Utf8Path), DeviceDataError> {
        let parent = self
            .path
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let file_name = self
            .path
            .file_name()
            .map(Utf8Path::new)
            .ok_or_else(|| DeviceDataError::Io {
                path: self.path.clone(),
                message: "device data path must name a file".to_owned(),
            })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
            DeviceDataError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;
        Ok((dir, file_name))
    }
}

impl DeviceSource for JsonFileDeviceSource {
    fn load(&self) -> Result<DeviceStore, DeviceDataError> {
        let (dir, file_name) = self.open_parent()?;
        DeviceStore::from_file(&dir, file_name, self.policy).map_err(|err| match err {
            DeviceDataError::Io { message, .. } => DeviceDataError::Io {
                path: self.path.clone(),
                message,
            },
            other => other,
        })
    }
}

/// Serves a fixed store, or a fixed failure, from memory.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureDeviceSource {
    outcome: Result<DeviceStore, DeviceDataError>,
}

impl FixtureDeviceSource {
    /// Creates a source that always yields `store`.
    #[must_use]
    pub const fn new(store: DeviceStore) -> Self {
        Self { outcome: Ok(store) }
    }

    /// Creates a source that always fails with `error`.
    #[must_use]
    pub const fn failing(error: DeviceDataError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl DeviceSource for FixtureDeviceSource {
    fn load(&self) -> Result<DeviceStore, DeviceDataError> {
        self.outcome.clone()
    }
}
