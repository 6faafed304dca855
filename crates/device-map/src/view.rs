//! Map view-state coordination.
//!
//! [`ViewStateController`] owns the declarative view intent (center and zoom)
//! and pushes it into a [`ViewportSink`] after every change; the widget never
//! pulls. Gestures performed directly on the widget (drag-panning, pinch
//! zoom) do not flow back on their own, so the stored intent may go stale
//! until the next explicit command overwrites the widget viewport. Callers
//! that want the controller to stay authoritative route native viewport
//! changes through [`ViewStateController::resync`].

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::geometry::{Bounds, Coordinate};

/// Default map origin used when no center is configured.
pub const DEFAULT_CENTER: Coordinate = Coordinate::new(51.505, -0.09);

/// Default zoom level used when no zoom is configured.
pub const DEFAULT_ZOOM: ZoomLevel = ZoomLevel::new(13);

/// Integer zoom level.
///
/// No bounds are enforced here; the rendering widget applies its own limits.
/// Stepping saturates at the integer range rather than wrapping.
///
/// # Examples
///
/// ```
/// use device_map::ZoomLevel;
///
/// let zoom = ZoomLevel::new(13);
/// assert_eq!(zoom.zoomed_in().get(), 14);
/// assert_eq!(zoom.zoomed_in().zoomed_out(), zoom);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ZoomLevel(i32);

impl ZoomLevel {
    /// Wraps a raw zoom level.
    #[must_use]
    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    /// Rounds a fractional level reported by the widget to the nearest step.
    ///
    /// Returns `None` for non-finite levels and levels outside the `i32`
    /// range.
    ///
    /// ```
    /// use device_map::ZoomLevel;
    ///
    /// assert_eq!(ZoomLevel::from_fractional(13.5), Some(ZoomLevel::new(14)));
    /// assert_eq!(ZoomLevel::from_fractional(f64::NAN), None);
    /// ```
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the rounded level is range-checked before the cast"
    )]
    pub fn from_fractional(level: f64) -> Option<Self> {
        let rounded = level.round();
        let in_range = (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&rounded);
        in_range.then(|| Self(rounded as i32))
    }

    /// Returns the raw level.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Returns the level one step closer.
    #[must_use]
    pub const fn zoomed_in(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the level one step further out.
    #[must_use]
    pub const fn zoomed_out(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The reset anchor supplied at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefaults {
    /// Initial and reset center.
    pub center: Coordinate,
    /// Initial and reset zoom.
    pub zoom: ZoomLevel,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Current view intent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Requested map center.
    pub center: Coordinate,
    /// Requested zoom level.
    pub zoom: ZoomLevel,
    /// Active fit-to-bounds override, if the last command was a fit.
    pub fit_bounds: Option<Bounds>,
}

impl From<ViewDefaults> for ViewState {
    fn from(defaults: ViewDefaults) -> Self {
        Self {
            center: defaults.center,
            zoom: defaults.zoom,
            fit_bounds: None,
        }
    }
}

/// Imperative viewport API of the map widget.
#[cfg_attr(test, mockall::automock)]
pub trait ViewportSink {
    /// Moves the widget to `center` at `zoom`.
    fn set_view(&mut self, center: Coordinate, zoom: ZoomLevel);

    /// Fits the widget viewport around `bounds`.
    fn fit_bounds(&mut self, bounds: Bounds);
}

/// One command received by a [`RecordingViewport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "command")]
pub enum ViewportCommand {
    /// A `set_view` call.
    SetView {
        /// Requested center.
        center: Coordinate,
        /// Requested zoom.
        zoom: ZoomLevel,
    },
    /// A `fit_bounds` call.
    FitBounds {
        /// Requested bounds.
        bounds: Bounds,
    },
}

/// In-memory widget stand-in that records every pushed command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingViewport {
    commands: Vec<ViewportCommand>,
}

impl RecordingViewport {
    /// Returns every command in arrival order.
    #[must_use]
    pub fn commands(&self) -> &[ViewportCommand] {
        &self.commands
    }

    /// Returns the most recent command.
    #[must_use]
    pub fn last(&self) -> Option<&ViewportCommand> {
        self.commands.last()
    }
}

impl ViewportSink for RecordingViewport {
    fn set_view(&mut self, center: Coordinate, zoom: ZoomLevel) {
        self.commands.push(ViewportCommand::SetView { center, zoom });
    }

    fn fit_bounds(&mut self, bounds: Bounds) {
        self.commands.push(ViewportCommand::FitBounds { bounds });
    }
}

/// Owner of the map view intent.
///
/// # Examples
///
/// ```
/// use device_map::{Coordinate, RecordingViewport, ViewDefaults, ViewStateController, ZoomLevel};
///
/// let mut view = ViewStateController::new(ViewDefaults::default(), RecordingViewport::default());
/// view.recenter(40.0, -74.0);
///
/// assert_eq!(view.state().center, Coordinate::new(40.0, -74.0));
/// assert_eq!(view.state().zoom, ZoomLevel::new(14));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewStateController<S> {
    defaults: ViewDefaults,
    state: ViewState,
    sink: S,
}

impl<S: ViewportSink> ViewStateController<S> {
    /// Creates a controller and pushes the initial view to `sink`.
    pub fn new(defaults: ViewDefaults, sink: S) -> Self {
        let mut controller = Self {
            defaults,
            state: ViewState::from(defaults),
            sink,
        };
        controller.push();
        controller
    }

    /// Restores the construction-time center and zoom.
    pub fn reset(&mut self) {
        self.state = ViewState::from(self.defaults);
        debug!(zoom = %self.state.zoom, "view reset");
        self.push();
    }

    /// Increments the zoom level by one.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.state.zoom.zoomed_in());
    }

    /// Decrements the zoom level by one.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.state.zoom.zoomed_out());
    }

    /// Centers on the double-clicked coordinate and zooms in one level.
    pub fn recenter(&mut self, lat: f64, lng: f64) {
        self.state.center = Coordinate::new(lat, lng);
        self.state.zoom = self.state.zoom.zoomed_in();
        self.state.fit_bounds = None;
        debug!(lat, lng, zoom = %self.state.zoom, "view recentered");
        self.push();
    }

    /// Asks the widget to fit `bounds`.
    ///
    /// The stored center and zoom are left untouched: the widget computes the
    /// fitted viewport, so the intent is stale until the next explicit
    /// command or a [`resync`](Self::resync).
    pub fn fit_bounds(&mut self, bounds: Bounds) {
        self.state.fit_bounds = Some(bounds);
        debug!(
            south_west = %bounds.south_west(),
            north_east = %bounds.north_east(),
            "view fitted to bounds"
        );
        self.push();
    }

    /// Adopts the widget's own viewport after a native gesture.
    ///
    /// Nothing is pushed back: the widget already shows this view.
    pub fn resync(&mut self, center: Coordinate, zoom: ZoomLevel) {
        self.state = ViewState {
            center,
            zoom,
            fit_bounds: None,
        };
        debug!(center = %center, zoom = %zoom, "view resynced from widget");
    }

    /// Returns `true` when the stored intent matches the widget viewport.
    #[must_use]
    pub fn is_in_sync_with(&self, center: Coordinate, zoom: ZoomLevel) -> bool {
        self.state.fit_bounds.is_none() && self.state.center == center && self.state.zoom == zoom
    }

    /// Returns the current view intent.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// Returns the reset anchor.
    #[must_use]
    pub const fn defaults(&self) -> &ViewDefaults {
        &self.defaults
    }

    /// Returns the viewport sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    fn set_zoom(&mut self, zoom: ZoomLevel) {
        self.state.zoom = zoom;
        self.state.fit_bounds = None;
        debug!(zoom = %zoom, "view zoom changed");
        self.push();
    }

    fn push(&mut self) {
        let Some(bounds) = self.state.fit_bounds else {
            self.sink.set_view(self.state.center, self.state.zoom);
            return;
        };
        self.sink.fit_bounds(bounds);
    }
}
