use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use cgmath::Rad;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Wraps an angle in radians into the range (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    Rad(angle).normalize_signed().0
}

/// Computes the distance between a point and the line segment `a`-`b`.
pub fn point_segment_distance(point: Point2d, a: Point2d, b: Point2d) -> f64 {
    let ab = b - a;
    let len2 = ab.magnitude2();
    if len2 < 1e-12 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len2).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
