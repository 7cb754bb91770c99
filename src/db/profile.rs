//! Saved calibration for one controller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::axis::{Axis, AxisCalibration};

/// Per-axis calibration of a controller plus the file it came from.
///
/// Axes are kept in event-code order; the order carries no meaning beyond
/// making saved files stable and readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    axes: BTreeMap<Axis, AxisCalibration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
}

impl Profile {
    /// Creates an empty profile that has never been persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the calibration for `axis`, replacing any previous value.
    pub fn set_axis(&mut self, axis: Axis, calibration: AxisCalibration) {
        self.axes.insert(axis, calibration);
    }

    /// Builder form of [`Profile::set_axis`].
    pub fn with_axis(mut self, axis: Axis, calibration: AxisCalibration) -> Self {
        self.set_axis(axis, calibration);
        self
    }

    pub fn axis(&self, axis: Axis) -> Option<&AxisCalibration> {
        self.axes.get(&axis)
    }

    pub fn axes(&self) -> impl Iterator<Item = (Axis, &AxisCalibration)> {
        self.axes.iter().map(|(&axis, cal)| (axis, cal))
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// The backing file, once loaded or saved.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// Returns the same calibration with a different source path.
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// True when both profiles hold the same axes, ignoring the source path.
    pub fn same_calibration(&self, other: &Self) -> bool {
        self.axes == other.axes
    }
}

impl FromIterator<(Axis, AxisCalibration)> for Profile {
    fn from_iter<I: IntoIterator<Item = (Axis, AxisCalibration)>>(iter: I) -> Self {
        Self {
            axes: iter.into_iter().collect(),
            path: None,
        }
    }
}
