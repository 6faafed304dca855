//! Position reporting for the single draggable device.
//!
//! Only one device is draggable. Its drag-end position is kept for display
//! and never written back to the device store.

use serde::Serialize;
use tracing::{debug, info};

use crate::device::DeviceId;
use crate::geometry::Coordinate;

/// Result of a drag-end notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DragOutcome {
    /// The designated device moved; its position was stored.
    Recorded,
    /// The event named another device and was dropped.
    Ignored,
}

/// Tracks the last reported position of the draggable device.
///
/// # Examples
///
/// ```
/// use device_map::{Coordinate, DeviceId, DragOutcome, DragReporter};
///
/// let id = DeviceId::new("d006").expect("non-blank id");
/// let mut reporter = DragReporter::new(Some(id.clone()));
///
/// let outcome = reporter.on_drag_end(&id, Coordinate::new(51.5, -0.1));
///
/// assert_eq!(outcome, DragOutcome::Recorded);
/// assert_eq!(
///     reporter.readout().as_deref(),
///     Some("Lat: 51.500000\nLng: -0.100000")
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragReporter {
    draggable: Option<DeviceId>,
    position: Option<Coordinate>,
}

impl DragReporter {
    /// Creates a reporter for the given draggable device, if any.
    #[must_use]
    pub const fn new(draggable: Option<DeviceId>) -> Self {
        Self {
            draggable,
            position: None,
        }
    }

    /// Records the drag-end position when `id` is the draggable device.
    ///
    /// Later events overwrite earlier ones.
    pub fn on_drag_end(&mut self, id: &DeviceId, position: Coordinate) -> DragOutcome {
        if !self.is_draggable(id) {
            debug!(device_id = %id, "drag end ignored for non-draggable device");
            return DragOutcome::Ignored;
        }
        info!(
            device_id = %id,
            lat = position.lat(),
            lng = position.lng(),
            "device moved"
        );
        self.position = Some(position);
        DragOutcome::Recorded
    }

    /// Returns `true` when `id` names the draggable device.
    #[must_use]
    pub fn is_draggable(&self, id: &DeviceId) -> bool {
        self.draggable.as_ref() == Some(id)
    }

    /// Returns the draggable device identifier.
    #[must_use]
    pub const fn draggable(&self) -> Option<&DeviceId> {
        self.draggable.as_ref()
    }

    /// Returns the last recorded position.
    #[must_use]
    pub const fn position(&self) -> Option<Coordinate> {
        self.position
    }

    /// Formats the position panel text with six decimal places.
    #[must_use]
    pub fn readout(&self) -> Option<String> {
        self.position
            .map(|p| format!("Lat: {:.6}\nLng: {:.6}", p.lat(), p.lng()))
    }
}
