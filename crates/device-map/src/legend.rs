//! Static reference key for the map symbols.

use serde::Serialize;

use crate::device::{DeviceModel, DeviceStatus};
use crate::marker::{IconVariant, MarkerSize};

/// A model entry in the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendModel {
    /// Glyph drawn for the model.
    pub icon: IconVariant,
    /// Model name.
    pub label: &'static str,
}

/// A status entry in the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendStatus {
    /// Status value, driving the indicator colour.
    pub status: DeviceStatus,
    /// Status name.
    pub label: &'static str,
}

/// A marker-style entry in the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendIndicator {
    /// Sample glyph.
    pub icon: IconVariant,
    /// Footprint of the sample glyph.
    pub size: MarkerSize,
    /// Marker style name.
    pub label: &'static str,
}

/// The full legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// One entry per recognised model.
    pub models: Vec<LegendModel>,
    /// One entry per status.
    pub statuses: Vec<LegendStatus>,
    /// The draggable and child marker styles.
    pub indicators: [LegendIndicator; 2],
    /// Usage hints.
    pub hints: [&'static str; 2],
}

/// Builds the legend.
///
/// # Examples
///
/// ```
/// let legend = device_map::legend();
/// assert_eq!(legend.models.len(), 3);
/// assert_eq!(legend.hints[0], "Double-click on map to zoom in at that location");
/// ```
#[must_use]
pub fn legend() -> Legend {
    Legend {
        models: DeviceModel::ALL
            .into_iter()
            .map(|model| LegendModel {
                icon: IconVariant::for_model(&model.into()),
                label: model.label(),
            })
            .collect(),
        statuses: DeviceStatus::ALL
            .into_iter()
            .map(|status| LegendStatus {
                status,
                label: status.label(),
            })
            .collect(),
        indicators: [
            LegendIndicator {
                icon: IconVariant::Antenna,
                size: MarkerSize::Standard,
                label: "Draggable Device",
            },
            LegendIndicator {
                icon: IconVariant::Wifi,
                size: MarkerSize::Child,
                label: "Child Device",
            },
        ],
        hints: [
            "Double-click on map to zoom in at that location",
            "Click on any marker to see device details",
        ],
    }
}
