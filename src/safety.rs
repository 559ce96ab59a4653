//! Safety checks between the ego vehicle and the objects around it.
//!
//! The main entry point is [check_collision], which walks the ego vehicle's
//! predicted path and an object's predicted path in lock-step, and requires
//! the rear body to keep a responsibility-sensitive safety (RSS) distance
//! behind the front body at every step. [check_collision_with_extra_stopping_margin]
//! is a cheaper single-frame check against objects at their current positions.

pub use collision::{
    check_collision, check_object_safety, get_collided_polygons, CollidedPolygon,
    CollisionCheckDebug, CollisionCheckStep, CollisionReport, ExtendedCheck, SafetyVerdict,
    StepOutcome, UnsafeReason,
};
pub use footprint::{
    create_extended_obj_polygon, create_extended_polygon, ExtendedPolygon, ExtensionOffsets,
};
pub use interpolate::{
    calc_interpolated_pose_with_velocity, convert_to_predicted_path,
    get_interpolated_object_pose_with_velocity_and_polygon_stamped,
    get_interpolated_pose_with_velocity_and_polygon_stamped, MAX_RESAMPLED_POINTS,
};
pub use relative::{
    is_target_object_front, is_target_object_front_along_path, is_target_object_oncoming,
};
pub use rss::{calc_minimum_longitudinal_length, calc_rss_distance};
pub use stopping::{
    check_collision_with_extra_stopping_margin, find_collision_with_extra_stopping_margin,
};

mod collision;
mod footprint;
mod interpolate;
mod relative;
mod rss;
mod stopping;
