use super::{normalize_angle, project_local, rot90, Point2d, Vector2d};
use cgmath::prelude::*;
use serde::{Deserialize, Serialize};

/// A position and heading in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose2d {
    /// The world space position in m.
    pub position: Point2d,
    /// The heading in radians, counter-clockwise from the x-axis.
    pub yaw: f64,
}

impl Pose2d {
    /// Creates a new pose.
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            position: Point2d::new(x, y),
            yaw,
        }
    }

    /// A unit vector in world space aligned with the heading.
    pub fn direction(&self) -> Vector2d {
        Vector2d::new(self.yaw.cos(), self.yaw.sin())
    }

    /// The world space point at the given offset in the pose's own frame.
    ///
    /// # Parameters
    /// * `lon` - The offset along the heading, in m
    /// * `lat` - The offset perpendicular to the heading, positive to the left, in m
    pub fn offset(&self, lon: f64, lat: f64) -> Point2d {
        let dir = self.direction();
        self.position + lon * dir + lat * rot90(dir)
    }

    /// Expresses a world space point in the pose's own frame,
    /// where x points along the heading and y points to the left.
    pub fn to_local(&self, point: Point2d) -> Point2d {
        let dir = self.direction();
        project_local(point, self.position, dir, rot90(dir))
    }

    /// The signed distance of `point` ahead of this pose, along the heading.
    pub fn longitudinal_deviation(&self, point: Point2d) -> f64 {
        (point - self.position).dot(self.direction())
    }

    /// The heading of `other` relative to this pose, in (-π, π].
    pub fn yaw_deviation(&self, other: &Pose2d) -> f64 {
        normalize_angle(other.yaw - self.yaw)
    }

    /// Interpolates between two poses. The position is interpolated linearly
    /// and the heading along the shorter arc. A `ratio` of 0 or 1 returns
    /// the corresponding end pose exactly.
    pub fn lerp(&self, other: &Pose2d, ratio: f64) -> Pose2d {
        if ratio <= 0.0 {
            return *self;
        }
        if ratio >= 1.0 {
            return *other;
        }
        let position = self.position.to_vec().lerp(other.position.to_vec(), ratio);
        let position = Point2d::from_vec(position);
        let yaw = normalize_angle(self.yaw + ratio * self.yaw_deviation(other));
        Pose2d { position, yaw }
    }
}

impl Default for Pose2d {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}
