use crate::math::{Polygon2d, Pose2d};
use crate::object::ObjectShape;
use crate::util::Interval;
use crate::vehicle::{footprint, VehicleInfo};
use serde::{Deserialize, Serialize};

/// How far an extended footprint reaches, in the frame of the body it was built for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionOffsets {
    /// The forward edge, measured ahead of the body's pose.
    pub forward_lon_offset: f64,
    /// The rear edge, measured ahead of the body's pose (usually negative).
    pub backward_lon_offset: f64,
    /// Half the width of the extended footprint.
    pub lat_offset: f64,
}

/// A footprint inflated by a safety margin.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedPolygon {
    pub polygon: Polygon2d,
    pub offsets: ExtensionOffsets,
}

/// Extends the ego vehicle's footprint forward by `lon_length`, and on both
/// sides by `lat_margin`. The rear edge stays at the rear bumper.
pub fn create_extended_polygon(
    base_link_pose: &Pose2d,
    vehicle_info: &VehicleInfo,
    lon_length: f64,
    lat_margin: f64,
) -> ExtendedPolygon {
    let forward_lon_offset = f64::max(
        lon_length + vehicle_info.base_to_front,
        vehicle_info.base_to_front,
    );
    let lat_offset = 0.5 * vehicle_info.width + lat_margin;
    ExtendedPolygon {
        polygon: footprint(
            base_link_pose,
            forward_lon_offset,
            vehicle_info.base_to_rear,
            2.0 * lat_offset,
        ),
        offsets: ExtensionOffsets {
            forward_lon_offset,
            backward_lon_offset: -vehicle_info.base_to_rear,
            lat_offset,
        },
    }
}

/// Extends an object's footprint in the same way as [create_extended_polygon],
/// starting from the bounding rectangle of its shape in its own frame.
///
/// An object without a footprint gives an empty polygon.
pub fn create_extended_obj_polygon(
    obj_pose: &Pose2d,
    shape: &ObjectShape,
    lon_length: f64,
    lat_margin: f64,
) -> ExtendedPolygon {
    let obj_polygon = shape.to_polygon(obj_pose);
    if obj_polygon.is_empty() {
        return ExtendedPolygon::default();
    }

    let local = obj_polygon.vertices().iter().map(|p| obj_pose.to_local(*p));
    let lon: Interval<f64> = local.clone().map(|p| p.x).collect();
    let lat: Interval<f64> = local.map(|p| p.y).collect();

    let front = f64::max(lon.max + lon_length, lon.max);
    let left = lat.max + lat_margin;
    let right = lat.min - lat_margin;
    ExtendedPolygon {
        polygon: Polygon2d::new([
            obj_pose.offset(front, left),
            obj_pose.offset(front, right),
            obj_pose.offset(lon.min, right),
            obj_pose.offset(lon.min, left),
        ]),
        offsets: ExtensionOffsets {
            forward_lon_offset: front,
            backward_lon_offset: lon.min,
            lat_offset: 0.5 * (left - right),
        },
    }
}
