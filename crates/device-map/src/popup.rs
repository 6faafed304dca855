//! Popup content shown when a marker is clicked.

use serde::Serialize;

use crate::device::{ChildDevice, Device, DeviceModel, ModelKind, StatusKind};
use crate::geometry::Coordinate;

/// One row of the "child devices" list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupChildRow {
    /// Child display name.
    pub name: String,
    /// Child status, rendered as an indicator.
    pub status: StatusKind,
}

/// Detail panel for a single device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupContent {
    /// Device display name.
    pub title: String,
    /// Device identifier.
    pub id: String,
    /// Capitalised model name.
    pub model: String,
    /// Raw status, driving the indicator colour.
    pub status: StatusKind,
    /// "Online" or "Offline".
    pub status_label: &'static str,
    /// `lat, lng` with six decimal places.
    pub location: String,
    /// Children of the device; empty for child popups.
    pub children: Vec<PopupChildRow>,
}

impl PopupContent {
    /// Builds the popup for a top-level device.
    ///
    /// Every structural child is listed regardless of the active filter.
    #[must_use]
    pub fn for_device(device: &Device) -> Self {
        Self {
            children: device
                .children()
                .iter()
                .map(|child| PopupChildRow {
                    name: child.name().to_owned(),
                    status: child.status().clone(),
                })
                .collect(),
            ..Self::base(
                device.name(),
                device.id().as_str(),
                device.model(),
                device.status(),
                device.position(),
            )
        }
    }

    /// Builds the popup for a child device.
    #[must_use]
    pub fn for_child(child: &ChildDevice) -> Self {
        Self::base(
            child.name(),
            child.id().as_str(),
            child.model(),
            child.status(),
            child.position(),
        )
    }

    fn base(
        name: &str,
        id: &str,
        model: &ModelKind,
        status: &StatusKind,
        position: Coordinate,
    ) -> Self {
        Self {
            title: name.to_owned(),
            id: id.to_owned(),
            model: model_label(model),
            status: status.clone(),
            status_label: status.label(),
            location: position.to_string(),
            children: Vec::new(),
        }
    }
}

fn model_label(model: &ModelKind) -> String {
    model.known().map_or_else(
        || capitalise(model.as_str()),
        |known: DeviceModel| known.label().to_owned(),
    )
}

fn capitalise(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
