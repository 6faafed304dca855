//! Device records and their closed categorical fields.
//!
//! A [`Device`] is a top-level record owning an ordered list of
//! [`ChildDevice`] records. The hierarchy is structural: nothing in this crate
//! inspects identifier text to decide whether a record is a child.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Coordinate;

/// Closed set of device models driving icon selection.
///
/// # Examples
///
/// ```
/// use device_map::DeviceModel;
///
/// assert_eq!("special".parse::<DeviceModel>(), Ok(DeviceModel::Special));
/// assert_eq!(DeviceModel::Advanced.label(), "Advanced");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceModel {
    /// Entry-level device.
    Basic,
    /// Advanced device.
    Advanced,
    /// Special-purpose device.
    Special,
}

impl DeviceModel {
    /// Every model, in display order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Advanced, Self::Special];

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Special => "special",
        }
    }

    /// Returns the capitalised label shown in filter panels and popups.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Advanced => "Advanced",
            Self::Special => "Special",
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`DeviceModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device model: {input}")]
pub struct ParseDeviceModelError {
    /// The unrecognised input value.
    pub input: String,
}

impl FromStr for DeviceModel {
    type Err = ParseDeviceModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "basic" => Ok(Self::Basic),
            "advanced" => Ok(Self::Advanced),
            "special" => Ok(Self::Special),
            _ => Err(ParseDeviceModelError {
                input: value.to_owned(),
            }),
        }
    }
}

/// Power status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// The device is online.
    On,
    /// The device is offline.
    Off,
}

impl DeviceStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 2] = [Self::On, Self::Off];

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Returns the human-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::On => "Online",
            Self::Off => "Offline",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`DeviceStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown device status: {input}")]
pub struct ParseDeviceStatusError {
    /// The unrecognised input value.
    pub input: String,
}

impl FromStr for DeviceStatus {
    type Err = ParseDeviceStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            _ => Err(ParseDeviceStatusError {
                input: value.to_owned(),
            }),
        }
    }
}

/// A status value as found in device data.
///
/// Records carrying a status outside the closed set still load and render
/// dimmed; such devices never pass a status filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// One of the recognised statuses.
    Known(DeviceStatus),
    /// A status string outside the closed set.
    Unrecognised(String),
}

impl StatusKind {
    /// Returns the recognised status, if any.
    #[must_use]
    pub const fn known(&self) -> Option<DeviceStatus> {
        match self {
            Self::Known(status) => Some(*status),
            Self::Unrecognised(_) => None,
        }
    }

    /// Returns `true` only for [`DeviceStatus::On`].
    #[must_use]
    pub const fn is_online(&self) -> bool {
        matches!(self, Self::Known(DeviceStatus::On))
    }

    /// Returns "Online" for online devices and "Offline" otherwise.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        if self.is_online() {
            DeviceStatus::On.label()
        } else {
            DeviceStatus::Off.label()
        }
    }

    /// Returns the raw status string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(status) => status.as_str(),
            Self::Unrecognised(raw) => raw,
        }
    }
}

impl From<DeviceStatus> for StatusKind {
    fn from(status: DeviceStatus) -> Self {
        Self::Known(status)
    }
}

impl From<&str> for StatusKind {
    fn from(raw: &str) -> Self {
        raw.parse::<DeviceStatus>()
            .map_or_else(|_| Self::Unrecognised(raw.to_owned()), Self::Known)
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StatusKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A model value as found in device data.
///
/// Records carrying a model outside the closed set still load so the marker
/// layer can fall back to its generic icon; such devices never pass a model
/// filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// One of the recognised models.
    Known(DeviceModel),
    /// A model string outside the closed set.
    Unrecognised(String),
}

impl ModelKind {
    /// Returns the recognised model, if any.
    #[must_use]
    pub const fn known(&self) -> Option<DeviceModel> {
        match self {
            Self::Known(model) => Some(*model),
            Self::Unrecognised(_) => None,
        }
    }

    /// Returns the raw model string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(model) => model.as_str(),
            Self::Unrecognised(raw) => raw,
        }
    }
}

impl From<DeviceModel> for ModelKind {
    fn from(model: DeviceModel) -> Self {
        Self::Known(model)
    }
}

impl From<&str> for ModelKind {
    fn from(raw: &str) -> Self {
        raw.parse::<DeviceModel>()
            .map_or_else(|_| Self::Unrecognised(raw.to_owned()), Self::Known)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ModelKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Error returned when a device identifier is blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("device identifier must not be blank")]
pub struct BlankDeviceIdError;

/// Opaque, non-blank device identifier.
///
/// # Examples
///
/// ```
/// use device_map::DeviceId;
///
/// let id = DeviceId::new("  d006 ").expect("non-blank");
/// assert_eq!(id.as_str(), "d006");
/// assert!(DeviceId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates an identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`BlankDeviceIdError`] when nothing remains after trimming.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BlankDeviceIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(BlankDeviceIdError);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = BlankDeviceIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// A sub-device co-located with its parent.
///
/// Children have no independent visibility: they are shown exactly when their
/// parent is shown (unless independent child filtering is switched on).
#[derive(Debug, Clone, PartialEq)]
pub struct ChildDevice {
    id: DeviceId,
    name: String,
    position: Coordinate,
    model: ModelKind,
    status: StatusKind,
}

impl ChildDevice {
    /// Creates a child record.
    #[must_use]
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        position: Coordinate,
        model: impl Into<ModelKind>,
        status: impl Into<StatusKind>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            model: model.into(),
            status: status.into(),
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the position.
    #[must_use]
    pub const fn position(&self) -> Coordinate {
        self.position
    }

    /// Returns the model.
    #[must_use]
    pub const fn model(&self) -> &ModelKind {
        &self.model
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> &StatusKind {
        &self.status
    }
}

/// A top-level device with its owned children.
///
/// # Examples
///
/// ```
/// use device_map::{ChildDevice, Coordinate, Device, DeviceId, DeviceModel, DeviceStatus};
///
/// let child = ChildDevice::new(
///     DeviceId::new("d001-a").expect("id"),
///     "Sensor A",
///     Coordinate::new(51.5051, -0.0901),
///     DeviceModel::Basic,
///     DeviceStatus::On,
/// );
/// let device = Device::new(
///     DeviceId::new("d001").expect("id"),
///     "Gateway",
///     Coordinate::new(51.505, -0.09),
///     DeviceModel::Advanced,
///     DeviceStatus::On,
///     vec![child],
/// );
///
/// assert_eq!(device.children().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    id: DeviceId,
    name: String,
    position: Coordinate,
    model: ModelKind,
    status: StatusKind,
    children: Vec<ChildDevice>,
}

impl Device {
    /// Creates a top-level record.
    #[must_use]
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        position: Coordinate,
        model: impl Into<ModelKind>,
        status: impl Into<StatusKind>,
        children: Vec<ChildDevice>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            model: model.into(),
            status: status.into(),
            children,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the position.
    #[must_use]
    pub const fn position(&self) -> Coordinate {
        self.position
    }

    /// Returns the model.
    #[must_use]
    pub const fn model(&self) -> &ModelKind {
        &self.model
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> &StatusKind {
        &self.status
    }

    /// Returns the children in document order.
    #[must_use]
    pub fn children(&self) -> &[ChildDevice] {
        &self.children
    }

    /// Yields the device's own position followed by each child's.
    pub fn positions(&self) -> impl Iterator<Item = Coordinate> + '_ {
        std::iter::once(self.position).chain(self.children.iter().map(ChildDevice::position))
    }
}

/// Raw JSON shape of a device record.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawDeviceRecord {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    pub(crate) model: String,
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) children: Vec<RawDeviceRecord>,
}
