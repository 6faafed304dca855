//! Core of an interactive device map.
//!
//! This crate loads a fleet of geolocated devices, filters them by model and
//! status, coordinates the map view, and composes hierarchical marker
//! descriptions for a rendering layer. It owns no widget: the map is reached
//! through the [`ViewportSink`] port and driven by [`MapEvent`] values.
//!
//! # Overview
//!
//! The crate supports:
//!
//! - Loading devices from JSON with a configurable coordinate policy
//! - Filtering by model and status, with optional independent child filtering
//! - View-state coordination (reset, zoom, double-click recentering, fit)
//! - Position reporting for one draggable device
//! - Marker, popup and legend composition
//!
//! # Example
//!
//! ```
//! use device_map::{
//!     CoordinatePolicy, DeviceMapSession, DeviceStatus, DeviceStore, MapConfig, MapEvent,
//!     RecordingViewport,
//! };
//!
//! let json = r#"[
//!     {"id": "d001", "name": "Gateway", "lat": 51.505, "lon": -0.09,
//!      "model": "basic", "status": "on"},
//!     {"id": "d006", "name": "Tracker", "lat": 51.51, "lon": -0.1,
//!      "model": "advanced", "status": "off"}
//! ]"#;
//!
//! let store = DeviceStore::from_json(json, CoordinatePolicy::Reject).expect("valid data");
//! let mut session =
//!     DeviceMapSession::new(store, &MapConfig::default(), RecordingViewport::default());
//!
//! session.dispatch(MapEvent::ToggleStatus(DeviceStatus::Off));
//!
//! let snapshot = session.snapshot();
//! assert_eq!(snapshot.markers.len(), 1);
//! ```

mod app;
mod config;
mod device;
mod drag;
mod error;
mod filter;
mod geometry;
mod legend;
mod marker;
mod popup;
pub mod script;
mod source;
mod store;
mod view;

pub use app::{AppState, DeviceMapSession, DispatchOutcome, MapEvent, MapSnapshot};
pub use config::{MapConfig, MapSettings, SettingsError};
pub use device::{
    BlankDeviceIdError, ChildDevice, Device, DeviceId, DeviceModel, DeviceStatus, ModelKind,
    ParseDeviceModelError, ParseDeviceStatusError, StatusKind,
};
pub use drag::{DragOutcome, DragReporter};
pub use error::{DEVICE_DATA_UNAVAILABLE, DeviceDataError};
pub use filter::{
    ChildFilterMode, FilterGroup, FilterPanelState, FilterRow, FilterSelection,
    ParseChildFilterModeError, VisibleDevice, filter_devices,
};
pub use geometry::{
    Bounds, Coordinate, CoordinateError, CoordinatePolicy, LATITUDE_RANGE, LONGITUDE_RANGE,
    ParseCoordinatePolicyError,
};
pub use legend::{Legend, LegendIndicator, LegendModel, LegendStatus, legend};
pub use marker::{IconVariant, MarkerDescription, MarkerSize, VisualState, compose_markers};
pub use popup::{PopupChildRow, PopupContent};
pub use script::{CommandError, MapCommand, ScriptError, ScriptReport, parse_command, run_script};
pub use source::{DeviceSource, FixtureDeviceSource, JsonFileDeviceSource};
pub use store::{DeviceStore, LoadState};
pub use view::{
    DEFAULT_CENTER, DEFAULT_ZOOM, RecordingViewport, ViewDefaults, ViewState, ViewStateController,
    ViewportCommand, ViewportSink, ZoomLevel,
};
