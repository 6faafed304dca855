//! Map configuration loaded via OrthoConfig.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::device::DeviceId;
use crate::filter::{ChildFilterMode, ParseChildFilterModeError};
use crate::geometry::{Coordinate, CoordinateError, CoordinatePolicy, ParseCoordinatePolicyError};
use crate::view::{DEFAULT_CENTER, DEFAULT_ZOOM, ViewDefaults, ZoomLevel};

const DEFAULT_DRAGGABLE_DEVICE_ID: &str = "d006";

fn default_devices_path() -> Utf8PathBuf {
    Utf8PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/devices.json"))
}

/// Errors raised while resolving [`MapSettings`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// The configured coordinate policy is unknown.
    #[error(transparent)]
    CoordinatePolicy(#[from] ParseCoordinatePolicyError),
    /// The configured child filter mode is unknown.
    #[error(transparent)]
    ChildFilter(#[from] ParseChildFilterModeError),
    /// The configured map center is not a valid coordinate.
    #[error("invalid map center: {0}")]
    Center(#[from] CoordinateError),
    /// The device data path is not valid UTF-8.
    #[error("device data path is not valid UTF-8: {}", path.display())]
    NonUtf8Path {
        /// The rejected path.
        path: PathBuf,
    },
}

/// Configuration values controlling the device map.
///
/// Optional fields fall back to the built-in defaults in their accessors.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEVICE_MAP")]
pub struct MapSettings {
    /// Show the legend when the map opens.
    #[ortho_config(default = false)]
    pub legend_visible: bool,
    /// Device data file.
    pub devices_path: Option<PathBuf>,
    /// Latitude of the initial and reset center.
    pub center_lat: Option<f64>,
    /// Longitude of the initial and reset center.
    pub center_lng: Option<f64>,
    /// Initial and reset zoom level.
    pub zoom: Option<i32>,
    /// Identifier of the draggable device. A blank value disables dragging.
    pub draggable_device_id: Option<String>,
    /// Ingestion policy: `pass-through`, `reject` or `clamp`.
    pub coordinate_policy: Option<String>,
    /// Child filtering: `inherit` or `independent`.
    pub child_filter: Option<String>,
}

/// Fully resolved map configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Device data file.
    pub devices_path: Utf8PathBuf,
    /// View reset anchor.
    pub view: ViewDefaults,
    /// The single draggable device, if any.
    pub draggable: Option<DeviceId>,
    /// Ingestion policy for device coordinates.
    pub coordinate_policy: CoordinatePolicy,
    /// How child markers respond to the filter.
    pub child_filter: ChildFilterMode,
    /// Initial legend visibility.
    pub legend_visible: bool,
}

impl MapSettings {
    /// Return the configured device data path, falling back to the bundled
    /// fixture.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NonUtf8Path`] for non-UTF-8 paths.
    pub fn devices_path(&self) -> Result<Utf8PathBuf, SettingsError> {
        self.devices_path
            .clone()
            .map_or_else(
                || Ok(default_devices_path()),
                |path| {
                    Utf8PathBuf::from_path_buf(path)
                        .map_err(|rejected| SettingsError::NonUtf8Path { path: rejected })
                },
            )
    }

    /// Return the view reset anchor.
    ///
    /// Each axis falls back independently to the default center.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Center`] when the center is out of range.
    pub fn view_defaults(&self) -> Result<ViewDefaults, SettingsError> {
        let center = Coordinate::validated(
            self.center_lat.unwrap_or_else(|| DEFAULT_CENTER.lat()),
            self.center_lng.unwrap_or_else(|| DEFAULT_CENTER.lng()),
        )?;
        let zoom = self.zoom.map_or(DEFAULT_ZOOM, ZoomLevel::new);
        Ok(ViewDefaults { center, zoom })
    }

    /// Return the draggable device identifier, falling back to `d006`.
    #[must_use]
    pub fn draggable_device_id(&self) -> Option<DeviceId> {
        let raw = self
            .draggable_device_id
            .as_deref()
            .unwrap_or(DEFAULT_DRAGGABLE_DEVICE_ID);
        DeviceId::new(raw).ok()
    }

    /// Return the ingestion policy, falling back to `reject`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::CoordinatePolicy`] for unknown values.
    pub fn coordinate_policy(&self) -> Result<CoordinatePolicy, SettingsError> {
        self.coordinate_policy
            .as_deref()
            .map_or_else(|| Ok(CoordinatePolicy::default()), str::parse)
            .map_err(SettingsError::from)
    }

    /// Return the child filter mode, falling back to `inherit`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ChildFilter`] for unknown values.
    pub fn child_filter(&self) -> Result<ChildFilterMode, SettingsError> {
        self.child_filter
            .as_deref()
            .map_or_else(|| Ok(ChildFilterMode::default()), str::parse)
            .map_err(SettingsError::from)
    }

    /// Resolve every setting.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] encountered.
    pub fn resolve(&self) -> Result<MapConfig, SettingsError> {
        Ok(MapConfig {
            devices_path: self.devices_path()?,
            view: self.view_defaults()?,
            draggable: self.draggable_device_id(),
            coordinate_policy: self.coordinate_policy()?,
            child_filter: self.child_filter()?,
            legend_visible: self.legend_visible,
        })
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            devices_path: default_devices_path(),
            view: ViewDefaults::default(),
            draggable: DeviceId::new(DEFAULT_DRAGGABLE_DEVICE_ID).ok(),
            coordinate_policy: CoordinatePolicy::default(),
            child_filter: ChildFilterMode::default(),
            legend_visible: false,
        }
    }
}
