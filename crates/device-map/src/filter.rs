//! Device filtering by model and status.
//!
//! Filtering is a pure, order-preserving selection over top-level devices:
//! a device passes when its model is any allowed model AND its status is any
//! allowed status. Children are carried along with their parent.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::device::{ChildDevice, Device, DeviceModel, DeviceStatus, ModelKind, StatusKind};

/// Selects the subsequence of `devices` allowed by both criteria.
///
/// An empty criterion set allows nothing. Children are never evaluated.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
///
/// use device_map::{DeviceModel, DeviceStatus, filter_devices};
///
/// let visible = filter_devices(
///     &[],
///     &BTreeSet::from([DeviceModel::Basic]),
///     &BTreeSet::from([DeviceStatus::On]),
/// );
/// assert!(visible.is_empty());
/// ```
#[must_use]
pub fn filter_devices<'a>(
    devices: &'a [Device],
    allowed_models: &BTreeSet<DeviceModel>,
    allowed_statuses: &BTreeSet<DeviceStatus>,
) -> Vec<&'a Device> {
    devices
        .iter()
        .filter(|device| {
            passes(device.model(), device.status(), allowed_models, allowed_statuses)
        })
        .collect()
}

fn passes(
    model: &ModelKind,
    status: &StatusKind,
    allowed_models: &BTreeSet<DeviceModel>,
    allowed_statuses: &BTreeSet<DeviceStatus>,
) -> bool {
    model
        .known()
        .is_some_and(|known| allowed_models.contains(&known))
        && status
            .known()
            .is_some_and(|known| allowed_statuses.contains(&known))
}

/// How children of a visible parent are treated by the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildFilterMode {
    /// Every child of a visible parent is shown.
    #[default]
    Inherit,
    /// Children of a visible parent must also pass the filter themselves.
    Independent,
}

impl ChildFilterMode {
    /// Returns the configuration string for the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inherit => "inherit",
            Self::Independent => "independent",
        }
    }
}

impl fmt::Display for ChildFilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`ChildFilterMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown child filter mode: {input}")]
pub struct ParseChildFilterModeError {
    /// The unrecognised input value.
    pub input: String,
}

impl FromStr for ChildFilterMode {
    type Err = ParseChildFilterModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "inherit" => Ok(Self::Inherit),
            "independent" => Ok(Self::Independent),
            _ => Err(ParseChildFilterModeError {
                input: value.to_owned(),
            }),
        }
    }
}

/// A visible top-level device together with the children rendered under it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleDevice<'a> {
    device: &'a Device,
    children: ChildSelection<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ChildSelection<'a> {
    All,
    Matching {
        models: &'a BTreeSet<DeviceModel>,
        statuses: &'a BTreeSet<DeviceStatus>,
    },
}

impl<'a> VisibleDevice<'a> {
    /// Returns the top-level device.
    #[must_use]
    pub const fn device(&self) -> &'a Device {
        self.device
    }

    /// Yields the children shown under this device.
    pub fn children(&self) -> impl Iterator<Item = &'a ChildDevice> + 'a {
        let selection = self.children;
        self.device
            .children()
            .iter()
            .filter(move |child| match selection {
                ChildSelection::All => true,
                ChildSelection::Matching { models, statuses } => {
                    passes(child.model(), child.status(), models, statuses)
                }
            })
    }
}

/// The two independent filter criteria.
///
/// Both sets default to "everything allowed". Toggling adds an absent value
/// or removes a present one.
///
/// # Examples
///
/// ```
/// use device_map::{DeviceModel, FilterSelection};
///
/// let mut selection = FilterSelection::default();
/// assert!(!selection.toggle_model(DeviceModel::Basic));
/// assert!(!selection.allows_model(DeviceModel::Basic));
/// assert!(selection.toggle_model(DeviceModel::Basic));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    models: BTreeSet<DeviceModel>,
    statuses: BTreeSet<DeviceStatus>,
    child_mode: ChildFilterMode,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            models: DeviceModel::ALL.into_iter().collect(),
            statuses: DeviceStatus::ALL.into_iter().collect(),
            child_mode: ChildFilterMode::default(),
        }
    }
}

impl FilterSelection {
    /// Creates a selection from explicit criteria.
    #[must_use]
    pub const fn new(models: BTreeSet<DeviceModel>, statuses: BTreeSet<DeviceStatus>) -> Self {
        Self {
            models,
            statuses,
            child_mode: ChildFilterMode::Inherit,
        }
    }

    /// Sets how children of visible parents are treated.
    #[must_use]
    pub fn with_child_mode(mut self, child_mode: ChildFilterMode) -> Self {
        self.child_mode = child_mode;
        self
    }

    /// Adds or removes `model`; returns whether it is now allowed.
    pub fn toggle_model(&mut self, model: DeviceModel) -> bool {
        let allowed = toggle(&mut self.models, model);
        debug!(model = %model, allowed, "model filter toggled");
        allowed
    }

    /// Adds or removes `status`; returns whether it is now allowed.
    pub fn toggle_status(&mut self, status: DeviceStatus) -> bool {
        let allowed = toggle(&mut self.statuses, status);
        debug!(status = %status, allowed, "status filter toggled");
        allowed
    }

    /// Returns `true` when `model` is allowed.
    #[must_use]
    pub fn allows_model(&self, model: DeviceModel) -> bool {
        self.models.contains(&model)
    }

    /// Returns `true` when `status` is allowed.
    #[must_use]
    pub fn allows_status(&self, status: DeviceStatus) -> bool {
        self.statuses.contains(&status)
    }

    /// Returns the allowed models.
    #[must_use]
    pub const fn models(&self) -> &BTreeSet<DeviceModel> {
        &self.models
    }

    /// Returns the allowed statuses.
    #[must_use]
    pub const fn statuses(&self) -> &BTreeSet<DeviceStatus> {
        &self.statuses
    }

    /// Returns the child filtering mode.
    #[must_use]
    pub const fn child_mode(&self) -> ChildFilterMode {
        self.child_mode
    }

    /// Applies the selection to `devices`, preserving order.
    #[must_use]
    pub fn apply<'a>(&'a self, devices: &'a [Device]) -> Vec<VisibleDevice<'a>> {
        let children = match self.child_mode {
            ChildFilterMode::Inherit => ChildSelection::All,
            ChildFilterMode::Independent => ChildSelection::Matching {
                models: &self.models,
                statuses: &self.statuses,
            },
        };
        filter_devices(devices, &self.models, &self.statuses)
            .into_iter()
            .map(|device| VisibleDevice { device, children })
            .collect()
    }

    /// Lists every filter checkbox with its checked state.
    #[must_use]
    pub fn rows(&self) -> Vec<FilterRow> {
        let model_rows = DeviceModel::ALL.into_iter().map(|model| FilterRow {
            group: FilterGroup::Model,
            value: model.as_str(),
            label: model.label(),
            checked: self.allows_model(model),
        });
        let status_rows = DeviceStatus::ALL.into_iter().map(|status| FilterRow {
            group: FilterGroup::Status,
            value: status.as_str(),
            label: status.label(),
            checked: self.allows_status(status),
        });
        model_rows.chain(status_rows).collect()
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Which criterion a [`FilterRow`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterGroup {
    /// Device model checkboxes.
    Model,
    /// Device status checkboxes.
    Status,
}

/// One checkbox in the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRow {
    /// Criterion the checkbox controls.
    pub group: FilterGroup,
    /// Wire value of the option.
    pub value: &'static str,
    /// Human-facing label.
    pub label: &'static str,
    /// Whether the option is currently allowed.
    pub checked: bool,
}

/// Open/closed state of the filter panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPanelState {
    open: bool,
}

impl FilterPanelState {
    /// Flips the panel; returns whether it is now open.
    pub const fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Returns `true` when the panel is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    //! Filter semantics: conjunction across criteria, disjunction within,
    //! order preservation, and parent-driven child visibility.

    use rstest::{fixture, rstest};

    use super::*;
    use crate::device::DeviceId;
    use crate::geometry::Coordinate;

    fn device(id: &str, model: DeviceModel, status: DeviceStatus) -> Device {
        Device::new(
            DeviceId::new(id).expect("id"),
            id,
            Coordinate::new(0.0, 0.0),
            model,
            status,
            Vec::new(),
        )
    }

    fn child(id: &str, model: DeviceModel, status: DeviceStatus) -> ChildDevice {
        ChildDevice::new(
            DeviceId::new(id).expect("id"),
            id,
            Coordinate::new(0.0, 0.0),
            model,
            status,
        )
    }

    fn ids(devices: &[&Device]) -> Vec<String> {
        devices.iter().map(|d| d.id().to_string()).collect()
    }

    #[fixture]
    fn fleet() -> Vec<Device> {
        vec![
            device("d1", DeviceModel::Basic, DeviceStatus::On),
            device("d2", DeviceModel::Special, DeviceStatus::Off),
            device("d3", DeviceModel::Advanced, DeviceStatus::On),
            device("d4", DeviceModel::Basic, DeviceStatus::Off),
            device("d5", DeviceModel::Special, DeviceStatus::On),
        ]
    }

    #[rstest]
    fn all_allowed_is_identity(fleet: Vec<Device>) {
        let selection = FilterSelection::default();
        let visible = filter_devices(&fleet, selection.models(), selection.statuses());
        assert_eq!(ids(&visible), vec!["d1", "d2", "d3", "d4", "d5"]);
    }

    #[test]
    fn unrecognised_status_never_passes() {
        let fleet = vec![
            device("d1", DeviceModel::Basic, DeviceStatus::On),
            Device::new(
                DeviceId::new("d2").expect("id"),
                "d2",
                Coordinate::new(0.0, 0.0),
                DeviceModel::Basic,
                "standby",
                Vec::new(),
            ),
        ];
        let selection = FilterSelection::default();

        let visible = filter_devices(&fleet, selection.models(), selection.statuses());

        assert_eq!(ids(&visible), vec!["d1"]);
    }

    #[rstest]
    fn empty_model_set_allows_nothing(fleet: Vec<Device>) {
        let visible = filter_devices(
            &fleet,
            &BTreeSet::new(),
            &DeviceStatus::ALL.into_iter().collect(),
        );
        assert!(visible.is_empty());
    }

    #[rstest]
    fn empty_status_set_allows_nothing(fleet: Vec<Device>) {
        let visible = filter_devices(
            &fleet,
            &DeviceModel::ALL.into_iter().collect(),
            &BTreeSet::new(),
        );
        assert!(visible.is_empty());
    }

    #[rstest]
    #[case::single_model_single_status(
        &[DeviceModel::Basic], &[DeviceStatus::On], &["d1"]
    )]
    #[case::any_of_two_models(
        &[DeviceModel::Basic, DeviceModel::Special], &[DeviceStatus::On], &["d1", "d5"]
    )]
    #[case::any_status(
        &[DeviceModel::Basic], &[DeviceStatus::On, DeviceStatus::Off], &["d1", "d4"]
    )]
    #[case::offline_only(
        &[DeviceModel::Basic, DeviceModel::Advanced, DeviceModel::Special],
        &[DeviceStatus::Off],
        &["d2", "d4"]
    )]
    fn conjunction_across_criteria_preserves_order(
        fleet: Vec<Device>,
        #[case] models: &[DeviceModel],
        #[case] statuses: &[DeviceStatus],
        #[case] expected: &[&str],
    ) {
        let visible = filter_devices(
            &fleet,
            &models.iter().copied().collect(),
            &statuses.iter().copied().collect(),
        );
        assert_eq!(ids(&visible), expected);
    }

    #[test]
    fn two_device_scenario_shows_only_matching_device() {
        let devices = vec![
            device("d1", DeviceModel::Basic, DeviceStatus::On),
            device("d2", DeviceModel::Special, DeviceStatus::Off),
        ];
        let visible = filter_devices(
            &devices,
            &BTreeSet::from([DeviceModel::Basic]),
            &BTreeSet::from([DeviceStatus::On]),
        );
        assert_eq!(ids(&visible), vec!["d1"]);
    }

    #[test]
    fn unrecognised_models_never_pass() {
        let devices = vec![Device::new(
            DeviceId::new("x").expect("id"),
            "x",
            Coordinate::new(0.0, 0.0),
            "prototype",
            DeviceStatus::On,
            Vec::new(),
        )];
        let selection = FilterSelection::default();
        assert!(selection.apply(&devices).is_empty());
    }

    #[test]
    fn hidden_parent_hides_matching_child() {
        let parent = Device::new(
            DeviceId::new("p").expect("id"),
            "p",
            Coordinate::new(0.0, 0.0),
            DeviceModel::Special,
            DeviceStatus::Off,
            vec![child("p-c", DeviceModel::Basic, DeviceStatus::On)],
        );
        let devices = vec![parent];
        let selection = FilterSelection::new(
            BTreeSet::from([DeviceModel::Basic]),
            BTreeSet::from([DeviceStatus::On]),
        );

        assert!(selection.apply(&devices).is_empty());
    }

    fn mixed_family() -> Vec<Device> {
        vec![Device::new(
            DeviceId::new("p").expect("id"),
            "p",
            Coordinate::new(0.0, 0.0),
            DeviceModel::Basic,
            DeviceStatus::On,
            vec![
                child("p-a", DeviceModel::Basic, DeviceStatus::On),
                child("p-b", DeviceModel::Special, DeviceStatus::Off),
            ],
        )]
    }

    #[test]
    fn inherit_mode_shows_every_child_of_a_visible_parent() {
        let devices = mixed_family();
        let selection = FilterSelection::new(
            BTreeSet::from([DeviceModel::Basic]),
            BTreeSet::from([DeviceStatus::On]),
        );

        let visible = selection.apply(&devices);
        let parent = visible.first().expect("parent visible");
        let child_ids: Vec<_> = parent.children().map(|c| c.id().as_str()).collect();
        assert_eq!(child_ids, vec!["p-a", "p-b"]);
    }

    #[test]
    fn independent_mode_hides_non_matching_children() {
        let devices = mixed_family();
        let selection = FilterSelection::new(
            BTreeSet::from([DeviceModel::Basic]),
            BTreeSet::from([DeviceStatus::On]),
        )
        .with_child_mode(ChildFilterMode::Independent);

        let visible = selection.apply(&devices);
        let parent = visible.first().expect("parent visible");
        let child_ids: Vec<_> = parent.children().map(|c| c.id().as_str()).collect();
        assert_eq!(child_ids, vec!["p-a"]);
    }

    #[test]
    fn toggling_twice_restores_membership() {
        let mut selection = FilterSelection::default();
        assert!(!selection.toggle_status(DeviceStatus::Off));
        assert!(!selection.allows_status(DeviceStatus::Off));
        assert!(selection.toggle_status(DeviceStatus::Off));
        assert_eq!(selection, FilterSelection::default());
    }

    #[test]
    fn rows_reflect_checked_state() {
        let mut selection = FilterSelection::default();
        selection.toggle_model(DeviceModel::Advanced);

        let rows = selection.rows();

        assert_eq!(rows.len(), 5);
        let unchecked: Vec<_> = rows.iter().filter(|r| !r.checked).map(|r| r.value).collect();
        assert_eq!(unchecked, vec!["advanced"]);
        let labels: Vec<_> = rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec!["Basic", "Advanced", "Special", "Online", "Offline"]
        );
    }

    #[rstest]
    #[case("inherit", ChildFilterMode::Inherit)]
    #[case("independent", ChildFilterMode::Independent)]
    fn child_mode_parses(#[case] raw: &str, #[case] mode: ChildFilterMode) {
        assert_eq!(raw.parse::<ChildFilterMode>(), Ok(mode));
    }

    #[test]
    fn panel_toggles_open_and_closed() {
        let mut panel = FilterPanelState::default();
        assert!(!panel.is_open());
        assert!(panel.toggle());
        assert!(!panel.toggle());
    }
}
