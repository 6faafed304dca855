//! Integration tests for the command script driver.
//!
//! These tests load the bundled fixture from disk and replay scripts through a
//! full session, checking the JSON snapshots a renderer would receive.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use camino::Utf8PathBuf;
use device_map::{
    CoordinatePolicy, DeviceMapSession, DeviceSource, JsonFileDeviceSource, MapConfig,
    RecordingViewport, ScriptError, run_script,
};
use rstest::{fixture, rstest};
use serde_json::Value;

#[fixture]
fn session() -> DeviceMapSession<RecordingViewport> {
    let path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("devices.json");
    let store = JsonFileDeviceSource::new(path, CoordinatePolicy::Reject)
        .load()
        .expect("bundled fixture loads");
    DeviceMapSession::new(store, &MapConfig::default(), RecordingViewport::default())
}

fn run(session: &mut DeviceMapSession<RecordingViewport>, script: &str) -> Vec<Value> {
    let mut out = Vec::new();
    run_script(session, script.as_bytes(), &mut out).expect("script runs");
    String::from_utf8(out)
        .expect("utf8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json snapshot"))
        .collect()
}

fn marker_ids(snapshot: &Value) -> Vec<String> {
    snapshot["markers"]
        .as_array()
        .expect("markers array")
        .iter()
        .map(|marker| marker["deviceId"].as_str().expect("device id").to_owned())
        .collect()
}

#[rstest]
fn bundled_fleet_renders_every_device(mut session: DeviceMapSession<RecordingViewport>) {
    let snapshots = run(&mut session, "show\n");
    let snapshot = snapshots.first().expect("one snapshot");

    assert_eq!(
        marker_ids(snapshot),
        vec!["d001", "d002", "d003", "d004", "d005", "d006"]
    );
    assert_eq!(snapshot["markers"][0]["children"].as_array().map(Vec::len), Some(2));
}

#[rstest]
fn offline_filter_keeps_children_of_visible_parents(
    mut session: DeviceMapSession<RecordingViewport>,
) {
    let snapshots = run(&mut session, "toggle-status off\nshow\n");
    let snapshot = snapshots.first().expect("one snapshot");

    assert_eq!(marker_ids(snapshot), vec!["d001", "d002", "d003", "d006"]);
    let gateway_children: Vec<_> = snapshot["markers"][0]["children"]
        .as_array()
        .expect("children array")
        .iter()
        .map(|child| child["deviceId"].clone())
        .collect();
    assert_eq!(gateway_children, vec!["d001-a", "d001-b"]);
}

#[rstest]
fn drag_and_view_commands_show_up_in_the_snapshot(
    mut session: DeviceMapSession<RecordingViewport>,
) {
    let script = "\
        # move the tracker, then look around\n\
        drag d006 51.5100 -0.1300\n\
        dblclick 51.5 -0.12\n\
        zoom-out\n\
        filters\n\
        legend\n\
        show\n";

    let snapshots = run(&mut session, script);
    let snapshot = snapshots.first().expect("one snapshot");

    assert_eq!(
        snapshot["dragReadout"],
        Value::from("Lat: 51.510000\nLng: -0.130000")
    );
    assert_eq!(snapshot["view"]["zoom"], Value::from(13));
    assert_eq!(snapshot["view"]["center"]["lat"], Value::from(51.5));
    assert_eq!(snapshot["filterPanelOpen"], Value::Bool(true));
    assert!(snapshot["legend"].is_object());
}

#[rstest]
fn only_the_tracker_is_draggable(mut session: DeviceMapSession<RecordingViewport>) {
    let snapshots = run(&mut session, "show\n");
    let snapshot = snapshots.first().expect("one snapshot");

    let draggable: Vec<_> = snapshot["markers"]
        .as_array()
        .expect("markers array")
        .iter()
        .filter(|marker| marker["draggable"] == Value::Bool(true))
        .map(|marker| marker["deviceId"].clone())
        .collect();
    assert_eq!(draggable, vec!["d006"]);
}

#[rstest]
fn malformed_lines_report_their_line_number(mut session: DeviceMapSession<RecordingViewport>) {
    let mut out = Vec::new();

    let err = run_script(&mut session, "show\ntoggle-model premium\n".as_bytes(), &mut out)
        .expect_err("unknown model");

    assert!(matches!(err, ScriptError::Command { line: 2, .. }));
    assert_eq!(err.to_string(), "line 2: unknown device model: premium");
}
