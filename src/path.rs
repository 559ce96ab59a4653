//! The ego vehicle's planned path.

use crate::math::{Point2d, Pose2d};
use cgmath::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single point on a planned path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// The pose of the vehicle's reference point.
    pub pose: Pose2d,
    /// The planned longitudinal velocity in m/s.
    pub longitudinal_velocity_mps: f64,
}

/// A path point, tagged with the lanes it belongs to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathPointWithLaneId {
    pub point: PathPoint,
    pub lane_ids: SmallVec<[i64; 2]>,
}

/// A planned path made of lane-tagged points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathWithLaneId {
    pub points: Vec<PathPointWithLaneId>,
}

impl PathWithLaneId {
    /// Creates a path from a sequence of path points with no lane association.
    pub fn from_points(points: impl IntoIterator<Item = PathPoint>) -> Self {
        Self {
            points: points
                .into_iter()
                .map(|point| PathPointWithLaneId {
                    point,
                    lane_ids: SmallVec::new(),
                })
                .collect(),
        }
    }

    /// The number of points on the path.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The world space position of the point with the given index.
    fn position(&self, idx: usize) -> Point2d {
        self.points[idx].point.pose.position
    }

    /// The signed distance of `point` past the start of segment `seg_idx`,
    /// measured along that segment.
    fn offset_along_segment(&self, seg_idx: usize, point: Point2d) -> f64 {
        let start = self.position(seg_idx);
        let seg = self.position(seg_idx + 1) - start;
        let len = seg.magnitude();
        if len < 1e-6 {
            return 0.0;
        }
        (point - start).dot(seg) / len
    }

    /// Finds the index of the path segment closest to `point`.
    /// Segment `i` runs from point `i` to point `i + 1`.
    ///
    /// Returns `None` if the path has fewer than two points.
    pub fn nearest_segment_index(&self, point: Point2d) -> Option<usize> {
        if self.points.len() < 2 {
            return None;
        }
        let nearest = (0..self.points.len())
            .map(|idx| (idx, self.position(idx).distance2(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)?;

        let last_seg = self.points.len() - 2;
        if nearest == 0 {
            return Some(0);
        }
        if nearest > last_seg {
            return Some(last_seg);
        }
        if self.offset_along_segment(nearest, point) < 0.0 {
            Some(nearest - 1)
        } else {
            Some(nearest)
        }
    }

    /// The distance along the path from the start to point `idx`.
    fn arc_length_to(&self, idx: usize) -> f64 {
        self.points[..=idx]
            .windows(2)
            .map(|pair| pair[0].point.pose.position.distance(pair[1].point.pose.position))
            .sum()
    }

    /// Computes the arc length along the path from the projection of `src`
    /// to the projection of `dst`. The result is negative if `dst` is behind `src`.
    ///
    /// Returns `None` if the path has fewer than two points.
    pub fn signed_arc_length(&self, src: Point2d, dst: Point2d) -> Option<f64> {
        let src_seg = self.nearest_segment_index(src)?;
        let dst_seg = self.nearest_segment_index(dst)?;
        let src_pos = self.arc_length_to(src_seg) + self.offset_along_segment(src_seg, src);
        let dst_pos = self.arc_length_to(dst_seg) + self.offset_along_segment(dst_seg, dst);
        Some(dst_pos - src_pos)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// An L-shaped path: east along y = 0 for 10 m, then north for 10 m.
    fn corner_path() -> PathWithLaneId {
        let east = (0..=10).map(|i| Pose2d::new(i as f64, 0.0, 0.0));
        let north = (1..=10).map(|i| Pose2d::new(10.0, i as f64, std::f64::consts::FRAC_PI_2));
        PathWithLaneId::from_points(east.chain(north).map(|pose| PathPoint {
            pose,
            longitudinal_velocity_mps: 5.0,
        }))
    }

    #[test]
    fn arc_length_follows_the_corner() {
        let path = corner_path();
        let src = Point2d::new(8.0, 0.0);
        let dst = Point2d::new(10.0, 3.0);
        assert_approx_eq!(path.signed_arc_length(src, dst).unwrap(), 5.0);
        assert_approx_eq!(path.signed_arc_length(dst, src).unwrap(), -5.0);
    }

    #[test]
    fn points_off_the_ends_extrapolate() {
        let path = corner_path();
        let behind = Point2d::new(-2.0, 0.5);
        assert_approx_eq!(path.signed_arc_length(Point2d::new(0.0, 0.0), behind).unwrap(), -2.0);
        assert_eq!(path.nearest_segment_index(Point2d::new(10.0, 30.0)), Some(19));
    }

    #[test]
    fn short_paths_have_no_arc_length() {
        let path = PathWithLaneId::from_points([PathPoint::default()]);
        assert_eq!(path.signed_arc_length(Point2d::new(0.0, 0.0), Point2d::new(1.0, 0.0)), None);
        assert!(PathWithLaneId::default().is_empty());
    }
}
