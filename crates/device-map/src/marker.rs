//! Marker composition.
//!
//! Turns the filtered device list into renderable marker descriptions. The
//! mapping from model to icon is total: anything outside the closed model set
//! gets the generic laptop glyph.

use serde::Serialize;

use crate::device::{ChildDevice, DeviceId, DeviceModel, DeviceStatus, ModelKind, StatusKind};
use crate::filter::VisibleDevice;
use crate::geometry::Coordinate;
use crate::popup::PopupContent;

/// Glyph drawn inside a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconVariant {
    /// Basic devices.
    Wifi,
    /// Advanced devices.
    Antenna,
    /// Special devices.
    Cpu,
    /// Fallback for unrecognised models.
    Laptop,
}

impl IconVariant {
    /// Selects the glyph for a model value.
    ///
    /// # Examples
    ///
    /// ```
    /// use device_map::{DeviceModel, IconVariant, ModelKind};
    ///
    /// assert_eq!(IconVariant::for_model(&DeviceModel::Basic.into()), IconVariant::Wifi);
    /// assert_eq!(IconVariant::for_model(&ModelKind::from("prototype")), IconVariant::Laptop);
    /// ```
    #[must_use]
    pub const fn for_model(model: &ModelKind) -> Self {
        match model.known() {
            Some(DeviceModel::Basic) => Self::Wifi,
            Some(DeviceModel::Advanced) => Self::Antenna,
            Some(DeviceModel::Special) => Self::Cpu,
            None => Self::Laptop,
        }
    }
}

/// Active or dimmed glyph rendering, driven by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    /// Online device.
    Active,
    /// Offline device, or one with an unrecognised status.
    Dimmed,
}

impl From<&StatusKind> for VisualState {
    fn from(status: &StatusKind) -> Self {
        if status.is_online() {
            Self::Active
        } else {
            Self::Dimmed
        }
    }
}

/// Marker footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSize {
    /// Top-level markers.
    Standard,
    /// Child markers.
    Child,
}

impl MarkerSize {
    /// Square icon edge in pixels.
    #[must_use]
    pub const fn icon_px(self) -> u32 {
        match self {
            Self::Standard => 30,
            Self::Child => 20,
        }
    }

    /// Anchor offset in pixels; the icon is centred on its coordinate.
    #[must_use]
    pub const fn anchor_px(self) -> u32 {
        match self {
            Self::Standard => 15,
            Self::Child => 10,
        }
    }

    /// Glyph edge in pixels.
    #[must_use]
    pub const fn glyph_px(self) -> u32 {
        match self {
            Self::Standard => 18,
            Self::Child => 14,
        }
    }
}

/// Everything the renderer needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescription {
    /// Device the marker represents.
    pub device_id: DeviceId,
    /// Marker position.
    pub position: Coordinate,
    /// Glyph variant.
    pub icon: IconVariant,
    /// Glyph rendering.
    pub visual: VisualState,
    /// Icon footprint.
    pub size: MarkerSize,
    /// Whether the marker can be dragged.
    pub draggable: bool,
    /// Style classes applied to the marker element.
    pub css_classes: Vec<String>,
    /// Content shown when the marker is clicked.
    pub popup: PopupContent,
    /// Child markers drawn alongside this one.
    pub children: Vec<MarkerDescription>,
}

/// Composes one marker per visible device, each followed by its children.
///
/// Child markers are never draggable, whatever `draggable` names.
#[must_use]
pub fn compose_markers(
    visible: &[VisibleDevice<'_>],
    draggable: Option<&DeviceId>,
) -> Vec<MarkerDescription> {
    visible
        .iter()
        .map(|entry| {
            let device = entry.device();
            let is_draggable = draggable == Some(device.id());
            let size = MarkerSize::Standard;
            MarkerDescription {
                device_id: device.id().clone(),
                position: device.position(),
                icon: IconVariant::for_model(device.model()),
                visual: device.status().into(),
                size,
                draggable: is_draggable,
                css_classes: css_classes(device.model(), device.status(), size, is_draggable),
                popup: PopupContent::for_device(device),
                children: entry.children().map(child_marker).collect(),
            }
        })
        .collect()
}

fn child_marker(child: &ChildDevice) -> MarkerDescription {
    let size = MarkerSize::Child;
    MarkerDescription {
        device_id: child.id().clone(),
        position: child.position(),
        icon: IconVariant::for_model(child.model()),
        visual: child.status().into(),
        size,
        draggable: false,
        css_classes: css_classes(child.model(), child.status(), size, false),
        popup: PopupContent::for_child(child),
        children: Vec::new(),
    }
}

fn css_classes(
    model: &ModelKind,
    status: &StatusKind,
    size: MarkerSize,
    draggable: bool,
) -> Vec<String> {
    let mut classes = vec![
        "device-marker".to_owned(),
        format!("device-marker--{}", model.as_str()),
    ];
    if size == MarkerSize::Child {
        classes.push("child-marker".to_owned());
    }
    if draggable {
        classes.push("draggable-marker".to_owned());
    }
    if status.known() == Some(DeviceStatus::Off) {
        classes.push("device-marker--off".to_owned());
    }
    classes
}

#[cfg(test)]
mod tests {
    //! Icon, size, and draggability rules for composed markers.

    use rstest::{fixture, rstest};

    use super::*;
    use crate::device::Device;
    use crate::filter::FilterSelection;

    fn id(raw: &str) -> DeviceId {
        DeviceId::new(raw).expect("valid id")
    }

    #[fixture]
    fn fleet() -> Vec<Device> {
        vec![
            Device::new(
                id("d001"),
                "Gateway",
                Coordinate::new(51.505, -0.09),
                DeviceModel::Basic,
                DeviceStatus::On,
                vec![ChildDevice::new(
                    id("d001-a"),
                    "Probe",
                    Coordinate::new(51.5051, -0.0901),
                    DeviceModel::Special,
                    DeviceStatus::Off,
                )],
            ),
            Device::new(
                id("d006"),
                "Tracker",
                Coordinate::new(51.51, -0.1),
                DeviceModel::Advanced,
                DeviceStatus::On,
                Vec::new(),
            ),
        ]
    }

    #[rstest]
    #[case(ModelKind::Known(DeviceModel::Basic), IconVariant::Wifi)]
    #[case(ModelKind::Known(DeviceModel::Advanced), IconVariant::Antenna)]
    #[case(ModelKind::Known(DeviceModel::Special), IconVariant::Cpu)]
    #[case(ModelKind::Unrecognised("gizmo".to_owned()), IconVariant::Laptop)]
    fn icon_mapping_is_total(#[case] model: ModelKind, #[case] expected: IconVariant) {
        assert_eq!(IconVariant::for_model(&model), expected);
    }

    #[rstest]
    #[case(MarkerSize::Standard, 30, 15, 18)]
    #[case(MarkerSize::Child, 20, 10, 14)]
    fn sizes_match_marker_kind(
        #[case] size: MarkerSize,
        #[case] icon: u32,
        #[case] anchor: u32,
        #[case] glyph: u32,
    ) {
        assert_eq!(
            (size.icon_px(), size.anchor_px(), size.glyph_px()),
            (icon, anchor, glyph)
        );
    }

    #[rstest]
    fn one_marker_per_visible_device_with_nested_children(fleet: Vec<Device>) {
        let selection = FilterSelection::default();
        let markers = compose_markers(&selection.apply(&fleet), None);

        assert_eq!(markers.len(), 2);
        let first = markers.first().expect("first marker");
        assert_eq!(first.children.len(), 1);
        let child = first.children.first().expect("child marker");
        assert_eq!(child.device_id.as_str(), "d001-a");
        assert_eq!(child.size, MarkerSize::Child);
        assert_eq!(child.visual, VisualState::Dimmed);
        assert_eq!(child.icon, IconVariant::Cpu);
    }

    #[rstest]
    fn only_the_designated_top_level_marker_is_draggable(fleet: Vec<Device>) {
        let selection = FilterSelection::default();
        let draggable = id("d006");

        let markers = compose_markers(&selection.apply(&fleet), Some(&draggable));

        let flags: Vec<_> = markers
            .iter()
            .map(|m| (m.device_id.as_str(), m.draggable))
            .collect();
        assert_eq!(flags, vec![("d001", false), ("d006", true)]);
    }

    #[rstest]
    fn children_are_never_draggable(fleet: Vec<Device>) {
        let selection = FilterSelection::default();
        let child_id = id("d001-a");

        let markers = compose_markers(&selection.apply(&fleet), Some(&child_id));

        assert!(
            markers
                .iter()
                .flat_map(|m| m.children.iter())
                .all(|child| !child.draggable)
        );
    }

    #[test]
    fn css_classes_reflect_marker_kind() {
        let model = ModelKind::Known(DeviceModel::Advanced);

        assert_eq!(
            css_classes(&model, &DeviceStatus::Off.into(), MarkerSize::Standard, true),
            vec![
                "device-marker",
                "device-marker--advanced",
                "draggable-marker",
                "device-marker--off"
            ]
        );
        assert_eq!(
            css_classes(&model, &DeviceStatus::On.into(), MarkerSize::Child, false),
            vec!["device-marker", "device-marker--advanced", "child-marker"]
        );
    }

    #[test]
    fn unrecognised_status_is_dimmed_without_the_off_modifier() {
        let status = StatusKind::from("standby");
        let model = ModelKind::Known(DeviceModel::Basic);

        assert_eq!(VisualState::from(&status), VisualState::Dimmed);
        assert_eq!(
            css_classes(&model, &status, MarkerSize::Standard, false),
            vec!["device-marker", "device-marker--basic"]
        );
    }
}
