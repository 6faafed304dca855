//! Application state and the event dispatcher.
//!
//! All mutable UI state lives in one explicit [`AppState`] value. Events are
//! applied one at a time through [`DeviceMapSession::dispatch`]; a rendering
//! layer reads the result back through [`DeviceMapSession::snapshot`].

use serde::Serialize;
use tracing::debug;

use crate::config::MapConfig;
use crate::device::{DeviceId, DeviceModel, DeviceStatus};
use crate::drag::{DragOutcome, DragReporter};
use crate::filter::{FilterPanelState, FilterRow, FilterSelection};
use crate::geometry::{Bounds, Coordinate};
use crate::legend::{Legend, legend};
use crate::marker::{MarkerDescription, compose_markers};
use crate::store::DeviceStore;
use crate::view::{ViewState, ViewStateController, ViewportSink, ZoomLevel};

/// A user or widget interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Zoom-in control pressed.
    ZoomIn,
    /// Zoom-out control pressed.
    ZoomOut,
    /// Reset control pressed.
    Reset,
    /// Map double-clicked.
    DoubleClick {
        /// Clicked location.
        at: Coordinate,
    },
    /// A marker drag finished.
    DragEnd {
        /// Dragged device.
        device_id: DeviceId,
        /// Final marker position.
        position: Coordinate,
    },
    /// A model checkbox toggled.
    ToggleModel(DeviceModel),
    /// A status checkbox toggled.
    ToggleStatus(DeviceStatus),
    /// Filter panel button pressed.
    ToggleFilterPanel,
    /// Legend button pressed.
    ToggleLegend,
    /// Fit the view around every visible marker.
    FitAll,
    /// The widget reports its own viewport after a native gesture.
    NativeViewport {
        /// Widget center.
        center: Coordinate,
        /// Widget zoom.
        zoom: ZoomLevel,
    },
}

/// Whether an event changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchOutcome {
    /// The event was applied.
    Applied,
    /// The event had no effect.
    Ignored,
}

impl From<DragOutcome> for DispatchOutcome {
    fn from(outcome: DragOutcome) -> Self {
        match outcome {
            DragOutcome::Recorded => Self::Applied,
            DragOutcome::Ignored => Self::Ignored,
        }
    }
}

/// Every piece of mutable UI state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState<S> {
    /// Active filter criteria.
    pub filter: FilterSelection,
    /// Filter panel visibility.
    pub panel: FilterPanelState,
    /// View intent.
    pub view: ViewStateController<S>,
    /// Draggable device position.
    pub drag: DragReporter,
    /// Legend visibility.
    pub legend_visible: bool,
}

impl<S: ViewportSink> AppState<S> {
    /// Builds the initial state from resolved configuration.
    pub fn new(config: &MapConfig, sink: S) -> Self {
        Self {
            filter: FilterSelection::default().with_child_mode(config.child_filter),
            panel: FilterPanelState::default(),
            view: ViewStateController::new(config.view, sink),
            drag: DragReporter::new(config.draggable.clone()),
            legend_visible: config.legend_visible,
        }
    }
}

/// Serialisable view of everything a renderer draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    /// Visible markers with nested children.
    pub markers: Vec<MarkerDescription>,
    /// Current view intent.
    pub view: ViewState,
    /// Last drag-end position of the draggable device.
    pub drag_position: Option<Coordinate>,
    /// Position panel text.
    pub drag_readout: Option<String>,
    /// Filter checkboxes.
    pub filters: Vec<FilterRow>,
    /// Whether the filter panel is shown.
    pub filter_panel_open: bool,
    /// Legend, when shown.
    pub legend: Option<Legend>,
}

/// A loaded device store paired with its UI state.
///
/// # Examples
///
/// ```
/// use device_map::{
///     CoordinatePolicy, DeviceMapSession, DeviceModel, DeviceStore, MapConfig, MapEvent,
///     RecordingViewport,
/// };
///
/// let json = r#"[
///     {"id": "d001", "name": "Gateway", "lat": 51.5, "lon": -0.1, "model": "basic", "status": "on"},
///     {"id": "d002", "name": "Relay", "lat": 51.6, "lon": -0.2, "model": "special", "status": "off"}
/// ]"#;
/// let store = DeviceStore::from_json(json, CoordinatePolicy::Reject).expect("valid data");
/// let mut session = DeviceMapSession::new(store, &MapConfig::default(), RecordingViewport::default());
///
/// session.dispatch(MapEvent::ToggleModel(DeviceModel::Basic));
///
/// let snapshot = session.snapshot();
/// assert_eq!(snapshot.markers.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMapSession<S> {
    store: DeviceStore,
    state: AppState<S>,
}

impl<S: ViewportSink> DeviceMapSession<S> {
    /// Pairs a loaded store with fresh UI state.
    pub fn new(store: DeviceStore, config: &MapConfig, sink: S) -> Self {
        Self {
            store,
            state: AppState::new(config, sink),
        }
    }

    /// Applies one event.
    pub fn dispatch(&mut self, event: MapEvent) -> DispatchOutcome {
        debug!(?event, "dispatching map event");
        let state = &mut self.state;
        match event {
            MapEvent::ZoomIn => state.view.zoom_in(),
            MapEvent::ZoomOut => state.view.zoom_out(),
            MapEvent::Reset => state.view.reset(),
            MapEvent::DoubleClick { at } => state.view.recenter(at.lat(), at.lng()),
            MapEvent::DragEnd {
                device_id,
                position,
            } => return state.drag.on_drag_end(&device_id, position).into(),
            MapEvent::ToggleModel(model) => {
                state.filter.toggle_model(model);
            }
            MapEvent::ToggleStatus(status) => {
                state.filter.toggle_status(status);
            }
            MapEvent::ToggleFilterPanel => {
                state.panel.toggle();
            }
            MapEvent::ToggleLegend => state.legend_visible = !state.legend_visible,
            MapEvent::FitAll => return self.fit_all(),
            MapEvent::NativeViewport { center, zoom } => state.view.resync(center, zoom),
        }
        DispatchOutcome::Applied
    }

    fn fit_all(&mut self) -> DispatchOutcome {
        let visible = self.state.filter.apply(self.store.devices());
        let bounds = Bounds::around(visible.iter().flat_map(|entry| {
            std::iter::once(entry.device().position())
                .chain(entry.children().map(|child| child.position()))
        }));
        let Some(extent) = bounds else {
            debug!("nothing visible to fit");
            return DispatchOutcome::Ignored;
        };
        self.state.view.fit_bounds(extent);
        DispatchOutcome::Applied
    }

    /// Renders the current state.
    #[must_use]
    pub fn snapshot(&self) -> MapSnapshot {
        let state = &self.state;
        let visible = state.filter.apply(self.store.devices());
        MapSnapshot {
            markers: compose_markers(&visible, state.drag.draggable()),
            view: *state.view.state(),
            drag_position: state.drag.position(),
            drag_readout: state.drag.readout(),
            filters: state.filter.rows(),
            filter_panel_open: state.panel.is_open(),
            legend: state.legend_visible.then(legend),
        }
    }

    /// Returns the device store.
    #[must_use]
    pub const fn store(&self) -> &DeviceStore {
        &self.store
    }

    /// Returns the UI state.
    #[must_use]
    pub const fn state(&self) -> &AppState<S> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    //! Event routing and snapshot assembly.

    use rstest::{fixture, rstest};

    use super::*;
    use crate::geometry::CoordinatePolicy;
    use crate::view::{RecordingViewport, ViewportCommand};

    const FLEET: &str = r#"[
        {"id": "d001", "name": "Gateway", "lat": 51.505, "lon": -0.09, "model": "basic", "status": "on",
         "children": [{"id": "d001-a", "name": "Probe", "lat": 51.506, "lon": -0.091, "model": "special", "status": "off"}]},
        {"id": "d002", "name": "Relay", "lat": 51.51, "lon": -0.1, "model": "advanced", "status": "off"},
        {"id": "d006", "name": "Tracker", "lat": 51.5, "lon": -0.08, "model": "advanced", "status": "on"}
    ]"#;

    type Session = DeviceMapSession<RecordingViewport>;

    #[fixture]
    fn session() -> Session {
        let store = DeviceStore::from_json(FLEET, CoordinatePolicy::Reject).expect("valid fleet");
        DeviceMapSession::new(store, &MapConfig::default(), RecordingViewport::default())
    }

    fn marker_ids(session: &Session) -> Vec<String> {
        session
            .snapshot()
            .markers
            .iter()
            .map(|m| m.device_id.to_string())
            .collect()
    }

    #[rstest]
    fn initial_snapshot_shows_everything(session: Session) {
        let snapshot = session.snapshot();

        assert_eq!(snapshot.markers.len(), 3);
        assert_eq!(snapshot.view.zoom, ZoomLevel::new(13));
        assert!(snapshot.filters.iter().all(|row| row.checked));
        assert!(!snapshot.filter_panel_open);
        assert_eq!(snapshot.legend, None);
        assert_eq!(snapshot.drag_position, None);
    }

    #[rstest]
    fn status_toggle_hides_offline_devices(mut session: Session) {
        session.dispatch(MapEvent::ToggleStatus(DeviceStatus::Off));

        assert_eq!(marker_ids(&session), vec!["d001", "d006"]);
    }

    #[rstest]
    fn model_toggle_round_trips(mut session: Session) {
        session.dispatch(MapEvent::ToggleModel(DeviceModel::Advanced));
        assert_eq!(marker_ids(&session), vec!["d001"]);

        session.dispatch(MapEvent::ToggleModel(DeviceModel::Advanced));
        assert_eq!(marker_ids(&session), vec!["d001", "d002", "d006"]);
    }

    #[rstest]
    fn double_click_recenters(mut session: Session) {
        session.dispatch(MapEvent::DoubleClick {
            at: Coordinate::new(40.0, -74.0),
        });

        let view = session.snapshot().view;
        assert_eq!(view.center, Coordinate::new(40.0, -74.0));
        assert_eq!(view.zoom, ZoomLevel::new(14));
    }

    #[rstest]
    fn drag_of_designated_device_is_reported(mut session: Session) {
        let outcome = session.dispatch(MapEvent::DragEnd {
            device_id: DeviceId::new("d006").expect("valid id"),
            position: Coordinate::new(51.52, -0.07),
        });

        assert_eq!(outcome, DispatchOutcome::Applied);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.drag_position, Some(Coordinate::new(51.52, -0.07)));
        assert_eq!(
            snapshot.drag_readout.as_deref(),
            Some("Lat: 51.520000\nLng: -0.070000")
        );
        let tracker = session
            .store()
            .find(&DeviceId::new("d006").expect("valid id"))
            .expect("tracker");
        assert_eq!(tracker.position(), Coordinate::new(51.5, -0.08));
    }

    #[rstest]
    fn drag_of_other_device_is_ignored(mut session: Session) {
        let outcome = session.dispatch(MapEvent::DragEnd {
            device_id: DeviceId::new("d001").expect("valid id"),
            position: Coordinate::new(0.0, 0.0),
        });

        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert_eq!(session.snapshot().drag_position, None);
    }

    #[rstest]
    fn only_d006_marker_is_draggable(session: Session) {
        let draggable: Vec<_> = session
            .snapshot()
            .markers
            .iter()
            .filter(|m| m.draggable)
            .map(|m| m.device_id.to_string())
            .collect();

        assert_eq!(draggable, vec!["d006"]);
    }

    #[rstest]
    fn panel_and_legend_toggle(mut session: Session) {
        session.dispatch(MapEvent::ToggleFilterPanel);
        session.dispatch(MapEvent::ToggleLegend);

        let snapshot = session.snapshot();
        assert!(snapshot.filter_panel_open);
        assert_eq!(snapshot.legend, Some(legend()));
    }

    #[rstest]
    fn configured_legend_starts_visible() {
        let store = DeviceStore::from_json(FLEET, CoordinatePolicy::Reject).expect("valid fleet");
        let config = MapConfig {
            legend_visible: true,
            ..MapConfig::default()
        };
        let mut session = DeviceMapSession::new(store, &config, RecordingViewport::default());

        assert_eq!(session.snapshot().legend, Some(legend()));

        session.dispatch(MapEvent::ToggleLegend);
        assert_eq!(session.snapshot().legend, None);
    }

    #[rstest]
    fn fit_all_covers_visible_markers_and_children(mut session: Session) {
        session.dispatch(MapEvent::ToggleModel(DeviceModel::Advanced));

        let outcome = session.dispatch(MapEvent::FitAll);

        assert_eq!(outcome, DispatchOutcome::Applied);
        let expected = Bounds::around([
            Coordinate::new(51.505, -0.09),
            Coordinate::new(51.506, -0.091),
        ])
        .expect("bounds");
        assert_eq!(
            session.state().view.sink().last(),
            Some(&ViewportCommand::FitBounds { bounds: expected })
        );
    }

    #[rstest]
    fn fit_all_with_nothing_visible_is_ignored(mut session: Session) {
        session.dispatch(MapEvent::ToggleStatus(DeviceStatus::On));
        session.dispatch(MapEvent::ToggleStatus(DeviceStatus::Off));

        assert_eq!(session.dispatch(MapEvent::FitAll), DispatchOutcome::Ignored);
    }

    #[rstest]
    fn native_viewport_is_adopted_without_a_push(mut session: Session) {
        let pushed = session.state().view.sink().commands().len();

        session.dispatch(MapEvent::NativeViewport {
            center: Coordinate::new(51.0, 0.0),
            zoom: ZoomLevel::new(9),
        });

        assert_eq!(session.snapshot().view.zoom, ZoomLevel::new(9));
        assert_eq!(session.state().view.sink().commands().len(), pushed);
    }

    #[rstest]
    fn snapshot_serialises_to_camel_case_json(session: Session) {
        let json = serde_json::to_value(session.snapshot()).expect("serialisable");

        assert_eq!(json["filterPanelOpen"], serde_json::json!(false));
        assert_eq!(json["markers"][0]["deviceId"], serde_json::json!("d001"));
        assert_eq!(json["view"]["zoom"], serde_json::json!(13));
    }
}
