use crate::math::Pose2d;
use crate::object::ObjectShape;
use crate::trajectory::{PoseWithVelocityAndPolygonStamped, PoseWithVelocityStamped};
use crate::util::Interval;
use crate::vehicle::VehicleInfo;

/// Grid points closer than this to the end of a path, in s, are snapped onto it.
const TIME_TOLERANCE: f64 = 1e-9;

/// The most samples a resampled path may have.
pub const MAX_RESAMPLED_POINTS: usize = 100_000;

/// Interpolates the pose and velocity along a time-stamped path.
///
/// Returns `None` if the path is empty or does not cover `relative_time`.
/// Querying the exact time of a sample returns that sample unchanged.
pub fn calc_interpolated_pose_with_velocity(
    path: &[PoseWithVelocityStamped],
    relative_time: f64,
) -> Option<PoseWithVelocityStamped> {
    interpolate_by(path, relative_time, |s| *s)
}

/// Interpolates the ego vehicle's predicted path, and computes the
/// vehicle footprint at the interpolated pose.
pub fn get_interpolated_pose_with_velocity_and_polygon_stamped(
    pred_path: &[PoseWithVelocityStamped],
    current_time: f64,
    ego_info: &VehicleInfo,
) -> Option<PoseWithVelocityAndPolygonStamped> {
    let sample = calc_interpolated_pose_with_velocity(pred_path, current_time)?;
    Some(PoseWithVelocityAndPolygonStamped::new(
        sample,
        ego_info.footprint(&sample.pose),
    ))
}

/// Interpolates an object's predicted path, and computes the object's
/// footprint at the interpolated pose.
pub fn get_interpolated_object_pose_with_velocity_and_polygon_stamped(
    pred_path: &[PoseWithVelocityAndPolygonStamped],
    current_time: f64,
    shape: &ObjectShape,
) -> Option<PoseWithVelocityAndPolygonStamped> {
    let sample = interpolate_by(pred_path, current_time, |p| p.sample())?;
    Some(PoseWithVelocityAndPolygonStamped::new(
        sample,
        shape.to_polygon(&sample.pose),
    ))
}

/// Resamples a time-stamped path onto a uniform grid of `time_resolution`
/// seconds, starting at its first sample.
///
/// An empty path stays empty. A path is returned as it is if the
/// resolution is not positive, or would need more than
/// [MAX_RESAMPLED_POINTS] samples.
pub fn convert_to_predicted_path(
    path: &[PoseWithVelocityStamped],
    time_resolution: f64,
) -> Vec<PoseWithVelocityStamped> {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return vec![];
    };
    if time_resolution.is_nan() || time_resolution <= 0.0 {
        return path.to_vec();
    }
    let steps = ((last.time - first.time) / time_resolution + TIME_TOLERANCE).floor();
    if !steps.is_finite() || steps < 0.0 || steps >= MAX_RESAMPLED_POINTS as f64 {
        log::debug!(
            "not resampling a {:.2} s path at {} s resolution",
            last.time - first.time,
            time_resolution
        );
        return path.to_vec();
    }
    (0..=steps as usize)
        .map(|i| f64::min(first.time + i as f64 * time_resolution, last.time))
        .filter_map(|t| calc_interpolated_pose_with_velocity(path, t))
        .collect()
}

fn interpolate_by<T>(
    path: &[T],
    time: f64,
    sample: impl Fn(&T) -> PoseWithVelocityStamped,
) -> Option<PoseWithVelocityStamped> {
    let first = sample(path.first()?);
    let last = sample(path.last()?);
    if !Interval::new(first.time, last.time).contains(time) {
        return None;
    }
    if path.len() == 1 {
        return Some(first);
    }
    path.windows(2)
        .map(|pair| (sample(&pair[0]), sample(&pair[1])))
        .find(|(_, next)| time <= next.time)
        .map(|(prev, next)| lerp_samples(&prev, &next, time))
}

/// Linearly interpolates between two samples. Times at either end
/// return the end sample exactly.
fn lerp_samples(
    prev: &PoseWithVelocityStamped,
    next: &PoseWithVelocityStamped,
    time: f64,
) -> PoseWithVelocityStamped {
    let times = Interval::new(prev.time, next.time);
    let ratio = if times.length() > f64::EPSILON {
        times.inv_lerp(time)
    } else {
        1.0
    };
    if ratio <= 0.0 {
        return *prev;
    }
    if ratio >= 1.0 {
        return *next;
    }
    PoseWithVelocityStamped {
        time,
        pose: Pose2d::lerp(&prev.pose, &next.pose, ratio),
        velocity: Interval::new(prev.velocity, next.velocity).lerp(ratio),
    }
}
