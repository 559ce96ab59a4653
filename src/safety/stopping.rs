use crate::config::StoppingMarginParams;
use crate::path::PathWithLaneId;
use crate::vehicle::{footprint, VehicleInfo};
use crate::{ObjectId, ObjectSet};

/// The distance beyond the front bumper needed to brake from `velocity`,
/// capped at the configured maximum. A stationary vehicle needs none.
fn extra_stopping_margin(velocity: f64, params: &StoppingMarginParams) -> f64 {
    if velocity == 0.0 {
        return 0.0;
    }
    if params.maximum_deceleration <= 0.0 {
        return params.max_extra_stopping_margin;
    }
    f64::min(
        0.5 * velocity.powi(2) / params.maximum_deceleration,
        params.max_extra_stopping_margin,
    )
}

/// Finds the first point on the planned path where the ego vehicle,
/// extended by its stopping distance, comes within the collision margin of
/// an object at its current position.
///
/// Returns the object and the index of the path point.
pub fn find_collision_with_extra_stopping_margin(
    ego_path: &PathWithLaneId,
    dynamic_objects: &ObjectSet,
    vehicle_info: &VehicleInfo,
    params: &StoppingMarginParams,
) -> Option<(ObjectId, usize)> {
    let obstacles = dynamic_objects
        .iter()
        .map(|(id, obj)| (id, obj.current_polygon()))
        .collect::<Vec<_>>();

    ego_path.points.iter().enumerate().find_map(|(idx, p)| {
        let extra = extra_stopping_margin(p.point.longitudinal_velocity_mps, params);
        let ego_polygon = footprint(
            &p.point.pose,
            vehicle_info.base_to_front + extra,
            vehicle_info.base_to_rear,
            vehicle_info.width,
        );
        obstacles
            .iter()
            .find(|(_, obj_polygon)| {
                ego_polygon.distance(obj_polygon) < params.collision_check_margin
            })
            .map(|(id, _)| {
                log::debug!("stopping footprint at path point {} hits object {:?}", idx, id);
                (*id, idx)
            })
    })
}

/// Returns true if the ego vehicle could not stop clear of some object at
/// any point on the planned path.
pub fn check_collision_with_extra_stopping_margin(
    ego_path: &PathWithLaneId,
    dynamic_objects: &ObjectSet,
    vehicle_info: &VehicleInfo,
    params: &StoppingMarginParams,
) -> bool {
    find_collision_with_extra_stopping_margin(ego_path, dynamic_objects, vehicle_info, params)
        .is_some()
}
