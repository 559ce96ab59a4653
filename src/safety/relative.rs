use crate::math::{Polygon2d, Pose2d};
use crate::path::PathWithLaneId;
use crate::vehicle::VehicleInfo;
use std::f64::consts::FRAC_PI_2;

/// Objects heading further than this from the ego heading are oncoming, in radians.
const ONCOMING_YAW_THRESHOLD: f64 = FRAC_PI_2;

/// Returns true if the object is travelling against the ego vehicle.
pub fn is_target_object_oncoming(vehicle_pose: &Pose2d, object_pose: &Pose2d) -> bool {
    vehicle_pose.yaw_deviation(object_pose).abs() > ONCOMING_YAW_THRESHOLD
}

/// Returns true if any part of the object is ahead of the ego vehicle's
/// front bumper, measured along the ego heading.
pub fn is_target_object_front(
    ego_pose: &Pose2d,
    obj_polygon: &Polygon2d,
    vehicle_info: &VehicleInfo,
) -> bool {
    let front = Pose2d {
        position: ego_pose.offset(vehicle_info.base_to_front, 0.0),
        ..*ego_pose
    };
    obj_polygon
        .vertices()
        .iter()
        .any(|p| front.longitudinal_deviation(*p) > 0.0)
}

/// Returns true if any part of the object is ahead of the ego vehicle's
/// front bumper, measured along the planned path.
///
/// Falls back to [is_target_object_front] when the path is too short to
/// measure along.
pub fn is_target_object_front_along_path(
    path: &PathWithLaneId,
    ego_pose: &Pose2d,
    vehicle_info: &VehicleInfo,
    obj_polygon: &Polygon2d,
) -> bool {
    if path.len() < 2 {
        return is_target_object_front(ego_pose, obj_polygon, vehicle_info);
    }
    let ego_front = ego_pose.offset(vehicle_info.base_to_front, 0.0);
    obj_polygon
        .vertices()
        .iter()
        .filter_map(|p| path.signed_arc_length(ego_front, *p))
        .any(|dist| dist > 0.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::object::ObjectShape;
    use crate::path::PathPoint;
    use std::f64::consts::PI;

    fn info() -> VehicleInfo {
        VehicleInfo {
            base_to_front: 4.0,
            base_to_rear: 1.0,
            width: 2.0,
        }
    }

    fn car_at(pose: Pose2d) -> Polygon2d {
        ObjectShape::BoundingBox {
            length: 4.0,
            width: 2.0,
        }
        .to_polygon(&pose)
    }

    #[test]
    fn oncoming_by_heading() {
        let ego = Pose2d::new(0.0, 0.0, 0.1);
        assert!(!is_target_object_oncoming(&ego, &Pose2d::new(5.0, 0.0, 0.1)));
        assert!(!is_target_object_oncoming(&ego, &Pose2d::new(5.0, 0.0, 1.6)));
        assert!(is_target_object_oncoming(&ego, &Pose2d::new(5.0, 0.0, 0.1 + PI)));
        assert!(is_target_object_oncoming(&ego, &Pose2d::new(5.0, 0.0, -2.0)));
    }

    #[test]
    fn front_by_pose() {
        let ego = Pose2d::new(0.0, 0.0, 0.0);
        assert!(is_target_object_front(&ego, &car_at(Pose2d::new(10.0, 0.0, 0.0)), &info()));
        assert!(!is_target_object_front(&ego, &car_at(Pose2d::new(-10.0, 0.0, 0.0)), &info()));
        // Alongside, but reaching past the front bumper
        assert!(is_target_object_front(&ego, &car_at(Pose2d::new(3.0, 3.0, 0.0)), &info()));
        assert!(!is_target_object_front(&ego, &car_at(Pose2d::new(1.0, 3.0, 0.0)), &info()));
    }

    #[test]
    fn front_along_curved_path() {
        // A quarter circle of radius 20 turning left
        let path = PathWithLaneId::from_points((0..=20).map(|i| {
            let angle = i as f64 * FRAC_PI_2 / 20.0;
            PathPoint {
                pose: Pose2d::new(20.0 * angle.sin(), 20.0 - 20.0 * angle.cos(), angle),
                longitudinal_velocity_mps: 5.0,
            }
        }));
        let ego = Pose2d::new(0.0, 0.0, 0.0);
        let around_the_bend = car_at(Pose2d::new(20.0, 20.0, FRAC_PI_2));
        assert!(is_target_object_front_along_path(&path, &ego, &info(), &around_the_bend));

        let ego = path.points[15].point.pose;
        let passed = car_at(path.points[5].point.pose);
        assert!(!is_target_object_front_along_path(&path, &ego, &info(), &passed));
    }

    #[test]
    fn short_path_falls_back_to_pose() {
        let ego = Pose2d::new(0.0, 0.0, 0.0);
        let path = PathWithLaneId::default();
        let ahead = car_at(Pose2d::new(10.0, 0.0, 0.0));
        assert!(is_target_object_front_along_path(&path, &ego, &info(), &ahead));
        let behind = car_at(Pose2d::new(-10.0, 0.0, 0.0));
        assert!(!is_target_object_front_along_path(&path, &ego, &info(), &behind));
    }
}
