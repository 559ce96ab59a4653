//! Time-stamped kinematic samples along a predicted trajectory.

use crate::math::{Polygon2d, Pose2d};
use serde::{Deserialize, Serialize};

/// A pose and velocity at a time relative to the start of the planning cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseWithVelocityStamped {
    /// The time in s, relative to now.
    pub time: f64,
    pub pose: Pose2d,
    /// The forward velocity in m/s.
    pub velocity: f64,
}

impl PoseWithVelocityStamped {
    pub fn new(time: f64, pose: Pose2d, velocity: f64) -> Self {
        Self {
            time,
            pose,
            velocity,
        }
    }
}

/// A [PoseWithVelocityStamped] together with the footprint occupied at that instant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseWithVelocityAndPolygonStamped {
    /// The time in s, relative to now.
    pub time: f64,
    pub pose: Pose2d,
    /// The forward velocity in m/s.
    pub velocity: f64,
    /// The footprint at `pose`.
    pub poly: Polygon2d,
}

impl PoseWithVelocityAndPolygonStamped {
    /// Attaches a footprint to a sample.
    pub fn new(sample: PoseWithVelocityStamped, poly: Polygon2d) -> Self {
        Self {
            time: sample.time,
            pose: sample.pose,
            velocity: sample.velocity,
            poly,
        }
    }

    /// The sample without its footprint.
    pub fn sample(&self) -> PoseWithVelocityStamped {
        PoseWithVelocityStamped::new(self.time, self.pose, self.velocity)
    }
}
