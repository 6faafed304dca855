//! Read-only device store and its one-time load lifecycle.
//!
//! The store is built once from JSON and never mutated afterwards. Ingestion
//! converts the flat wire records into the structural parent/child model,
//! applies the configured [`CoordinatePolicy`], and rejects duplicate
//! identifiers anywhere in the tree.

use std::collections::HashSet;

use camino::Utf8Path;
use cap_std::fs::Dir;
use tracing::{error, info, warn};

use crate::device::{ChildDevice, Device, DeviceId, ModelKind, RawDeviceRecord, StatusKind};
use crate::error::DeviceDataError;
use crate::geometry::{Coordinate, CoordinatePolicy};
use crate::source::DeviceSource;

/// Immutable collection of top-level devices.
///
/// # Example
///
/// ```
/// use device_map::{CoordinatePolicy, DeviceStore};
///
/// let json = r#"[
///     {"id": "d001", "name": "Gateway", "lat": 51.505, "lon": -0.09,
///      "model": "basic", "status": "on",
///      "children": [{"id": "d001-a", "name": "Probe", "lat": 51.5051,
///                    "lon": -0.0901, "model": "basic", "status": "off"}]}
/// ]"#;
///
/// let store = DeviceStore::from_json(json, CoordinatePolicy::Reject).expect("valid data");
/// assert_eq!(store.len(), 1);
/// assert_eq!(store.child_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceStore {
    devices: Vec<Device>,
}

impl DeviceStore {
    /// Builds a store from already-constructed devices.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDataError::DuplicateId`] when two records share an id.
    pub fn from_devices(devices: Vec<Device>) -> Result<Self, DeviceDataError> {
        let mut seen = HashSet::new();
        for device in &devices {
            claim_id(&mut seen, device.id())?;
            for child in device.children() {
                claim_id(&mut seen, child.id())?;
            }
        }
        Ok(Self { devices })
    }

    /// Parses device data from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDataError`] if:
    /// - The JSON is malformed or a required field is missing
    /// - A record has a blank id
    /// - A coordinate is refused by `policy`
    /// - Two records share an identifier
    pub fn from_json(json: &str, policy: CoordinatePolicy) -> Result<Self, DeviceDataError> {
        let raw: Vec<RawDeviceRecord> =
            serde_json::from_str(json).map_err(|e| DeviceDataError::Parse {
                message: e.to_string(),
            })?;

        Self::from_raw(raw, policy)
    }

    /// Loads device data from a JSON file inside a capability directory.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceDataError`] if the file cannot be read or parsed.
    pub fn from_file(
        dir: &Dir,
        path: &Utf8Path,
        policy: CoordinatePolicy,
    ) -> Result<Self, DeviceDataError> {
        let contents = dir
            .read_to_string(path)
            .map_err(|e| DeviceDataError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Self::from_json(&contents, policy)
    }

    fn from_raw(
        raw: Vec<RawDeviceRecord>,
        policy: CoordinatePolicy,
    ) -> Result<Self, DeviceDataError> {
        let devices = raw
            .into_iter()
            .enumerate()
            .map(|(index, record)| convert_top_level(record, index, policy))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_devices(devices)
    }

    /// Returns the top-level devices in document order.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Finds a top-level device by identifier.
    #[must_use]
    pub fn find(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|device| device.id() == id)
    }

    /// Returns the number of top-level devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` when the store holds no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns the number of child devices across every parent.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.devices.iter().map(|device| device.children().len()).sum()
    }

    /// Yields every position in the store, parents before their children.
    pub fn positions(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.devices.iter().flat_map(Device::positions)
    }
}

fn claim_id(seen: &mut HashSet<DeviceId>, id: &DeviceId) -> Result<(), DeviceDataError> {
    if seen.insert(id.clone()) {
        Ok(())
    } else {
        Err(DeviceDataError::DuplicateId {
            device_id: id.to_string(),
        })
    }
}

/// Fields shared by parent and child records after validation.
struct ValidatedFields {
    id: DeviceId,
    name: String,
    position: Coordinate,
    model: ModelKind,
    status: StatusKind,
}

fn convert_top_level(
    mut record: RawDeviceRecord,
    index: usize,
    policy: CoordinatePolicy,
) -> Result<Device, DeviceDataError> {
    let location = format!("devices[{index}]");
    let raw_children = std::mem::take(&mut record.children);
    let fields = validate_fields(record, &location, policy)?;
    let mut children = Vec::new();
    flatten_children(raw_children, &location, policy, &mut children)?;

    Ok(Device::new(
        fields.id,
        fields.name,
        fields.position,
        fields.model,
        fields.status,
        children,
    ))
}

/// Collects descendants in document order, lifting grandchildren to the
/// top-level ancestor.
fn flatten_children(
    records: Vec<RawDeviceRecord>,
    parent_location: &str,
    policy: CoordinatePolicy,
    out: &mut Vec<ChildDevice>,
) -> Result<(), DeviceDataError> {
    for (index, mut record) in records.into_iter().enumerate() {
        let location = format!("{parent_location}.children[{index}]");
        let grandchildren = std::mem::take(&mut record.children);
        let fields = validate_fields(record, &location, policy)?;
        out.push(ChildDevice::new(
            fields.id,
            fields.name,
            fields.position,
            fields.model,
            fields.status,
        ));
        flatten_children(grandchildren, &location, policy, out)?;
    }
    Ok(())
}

fn validate_fields(
    record: RawDeviceRecord,
    location: &str,
    policy: CoordinatePolicy,
) -> Result<ValidatedFields, DeviceDataError> {
    let id = DeviceId::new(&record.id).map_err(|e| DeviceDataError::InvalidRecord {
        location: location.to_owned(),
        reason: e.to_string(),
    })?;

    let position = policy.apply(record.lat, record.lon).map_err(|source| {
        DeviceDataError::InvalidCoordinate {
            device_id: id.to_string(),
            source,
        }
    })?;
    if policy == CoordinatePolicy::Clamp && position != Coordinate::new(record.lat, record.lon) {
        warn!(
            device_id = %id,
            lat = record.lat,
            lon = record.lon,
            "device coordinate clamped into range"
        );
    }

    let model = ModelKind::from(record.model.as_str());
    if let ModelKind::Unrecognised(raw) = &model {
        warn!(device_id = %id, model = %raw, "unrecognised device model; using fallback icon");
    }

    let status = StatusKind::from(record.status.as_str());
    if let StatusKind::Unrecognised(raw) = &status {
        warn!(device_id = %id, status = %raw, "unrecognised device status; rendering as offline");
    }

    Ok(ValidatedFields {
        id,
        name: record.name,
        position,
        model,
        status,
    })
}

/// One-time load lifecycle of the device store.
///
/// `Failed` is terminal: there is no retry operation, matching the
/// "restart to retry" contract of the surrounding application.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    /// Data has not been requested yet.
    #[default]
    Loading,
    /// Data loaded successfully.
    Ready(DeviceStore),
    /// Data could not be loaded.
    Failed(DeviceDataError),
}

impl LoadState {
    /// Loads from `source` and records the outcome.
    pub fn resolve<S>(source: &S) -> Self
    where
        S: DeviceSource + ?Sized,
    {
        Self::load(source).map_or_else(Self::Failed, Self::Ready)
    }

    /// Loads from `source`, logging the outcome, for callers that only need
    /// the settled result.
    ///
    /// # Errors
    ///
    /// Returns the source's [`DeviceDataError`].
    pub fn load<S>(source: &S) -> Result<DeviceStore, DeviceDataError>
    where
        S: DeviceSource + ?Sized,
    {
        source
            .load()
            .inspect(|store| {
                info!(
                    device_count = store.len(),
                    child_count = store.child_count(),
                    "device data loaded"
                );
            })
            .inspect_err(|err| error!(error = %err, "device data unavailable"))
    }

    /// Returns the store when loading succeeded.
    #[must_use]
    pub const fn store(&self) -> Option<&DeviceStore> {
        match self {
            Self::Ready(store) => Some(store),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    /// Returns the failure when loading failed.
    #[must_use]
    pub const fn error(&self) -> Option<&DeviceDataError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Loading | Self::Ready(_) => None,
        }
    }

    /// Returns `true` once loading has finished, successfully or not.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}
