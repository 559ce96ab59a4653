use crate::error::ConfigError;
use crate::math::{Polygon2d, Pose2d};
use serde::{Deserialize, Serialize};

/// The physical extents of the ego vehicle, measured from its reference point
/// (the centre of the rear axle).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleInfo {
    /// Distance from the reference point to the front bumper in m.
    pub base_to_front: f64,
    /// Distance from the reference point to the rear bumper in m.
    pub base_to_rear: f64,
    /// The vehicle width in m.
    pub width: f64,
}

impl Default for VehicleInfo {
    fn default() -> Self {
        Self {
            base_to_front: 3.8,
            base_to_rear: 1.1,
            width: 1.9,
        }
    }
}

impl VehicleInfo {
    /// The vehicle length in m.
    pub fn length(&self) -> f64 {
        self.base_to_front + self.base_to_rear
    }

    /// The vehicle's footprint when its reference point is at `pose`.
    pub fn footprint(&self, pose: &Pose2d) -> Polygon2d {
        footprint(pose, self.base_to_front, self.base_to_rear, self.width)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_non_negative("vehicle_info.base_to_front", self.base_to_front)?;
        ConfigError::check_non_negative("vehicle_info.base_to_rear", self.base_to_rear)?;
        ConfigError::check_non_negative("vehicle_info.width", self.width)
    }
}

/// Builds the rectangle spanning `base_to_front` ahead of `pose` to
/// `base_to_rear` behind it, `width` wide and centred on the heading.
pub fn footprint(pose: &Pose2d, base_to_front: f64, base_to_rear: f64, width: f64) -> Polygon2d {
    let half_wid = 0.5 * width;
    Polygon2d::new([
        pose.offset(base_to_front, half_wid),
        pose.offset(base_to_front, -half_wid),
        pose.offset(-base_to_rear, -half_wid),
        pose.offset(-base_to_rear, half_wid),
    ])
}
