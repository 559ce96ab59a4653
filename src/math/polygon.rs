use super::{point_segment_distance, rot90, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Polygons with less area than this, in m², are treated as having none.
const MIN_AREA: f64 = 1e-9;

/// A simple polygon in world space.
///
/// Vertices are stored counter-clockwise and the ring is implicitly closed,
/// the last vertex connecting back to the first. Every polygon the checker
/// builds is convex, which the overlap test relies on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon2d {
    vertices: SmallVec<[Point2d; 8]>,
}

impl Polygon2d {
    /// Creates a polygon from a ring of points, in either winding.
    /// A trailing copy of the first point is dropped.
    pub fn new(points: impl IntoIterator<Item = Point2d>) -> Self {
        let mut vertices: SmallVec<[Point2d; 8]> = points.into_iter().collect();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        let mut polygon = Self { vertices };
        if polygon.signed_area() < 0.0 {
            polygon.vertices.reverse();
        }
        polygon
    }

    /// Computes the convex hull of a set of points.
    pub fn convex_hull(points: impl IntoIterator<Item = Point2d>) -> Self {
        let mut points = points.into_iter().collect::<Vec<_>>();
        points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        points.dedup();
        if points.len() < 3 {
            return Self::new(points);
        }

        // Andrew's monotone chain
        let turns_left = |hull: &[Point2d], p: Point2d| {
            let [a, b] = [hull[hull.len() - 2], hull[hull.len() - 1]];
            (b - a).perp_dot(p - a) > 0.0
        };
        let mut hull: Vec<Point2d> = Vec::with_capacity(2 * points.len());
        for &p in points.iter() {
            while hull.len() >= 2 && !turns_left(&hull, p) {
                hull.pop();
            }
            hull.push(p);
        }
        let lower_len = hull.len() + 1;
        for &p in points.iter().rev().skip(1) {
            while hull.len() >= lower_len && !turns_left(&hull, p) {
                hull.pop();
            }
            hull.push(p);
        }
        hull.pop();

        Self::new(hull)
    }

    /// The vertices, counter-clockwise, without the closing vertex.
    pub fn vertices(&self) -> &[Point2d] {
        &self.vertices
    }

    /// The explicitly closed ring, with the first vertex repeated at the end.
    pub fn exterior(&self) -> Vec<Point2d> {
        self.vertices
            .iter()
            .chain(self.vertices.first())
            .copied()
            .collect()
    }

    /// Whether the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over the edges of the polygon as pairs of end points.
    pub fn edges(&self) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
        self.vertices
            .iter()
            .copied()
            .circular_tuple_windows::<(_, _)>()
    }

    /// The area enclosed by the ring, positive when counter-clockwise.
    fn signed_area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        0.5 * self
            .edges()
            .map(|(a, b)| a.to_vec().perp_dot(b.to_vec()))
            .sum::<f64>()
    }

    /// The area of the polygon in m².
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Projects the polygon onto an axis.
    fn project(&self, axis: Vector2d) -> Interval<f64> {
        self.vertices.iter().map(|p| p.to_vec().dot(axis)).collect()
    }

    /// Whether a point lies inside the polygon or on its boundary.
    pub fn contains_point(&self, point: Point2d) -> bool {
        self.area() >= MIN_AREA && self.edges().all(|(a, b)| (b - a).perp_dot(point - a) >= 0.0)
    }

    /// Whether the interiors of two convex polygons intersect.
    ///
    /// Polygons which only touch along an edge or at a vertex do not overlap,
    /// and neither does a polygon with zero area.
    pub fn overlaps(&self, other: &Polygon2d) -> bool {
        if self.area() < MIN_AREA || other.area() < MIN_AREA {
            return false;
        }
        self.edges()
            .chain(other.edges())
            .map(|(a, b)| rot90(b - a))
            .filter(|axis| axis.magnitude2() > 1e-12)
            .all(|axis| self.project(axis).overlaps(&other.project(axis)))
    }

    /// The minimum distance between the two polygons, or zero if they
    /// overlap, touch, or one lies inside the other.
    pub fn distance(&self, other: &Polygon2d) -> f64 {
        if self.is_empty() || other.is_empty() {
            return f64::INFINITY;
        }
        if self.overlaps(other)
            || self.vertices.iter().any(|p| other.contains_point(*p))
            || other.vertices.iter().any(|p| self.contains_point(*p))
        {
            return 0.0;
        }
        let one_way = |from: &Polygon2d, to: &Polygon2d| {
            from.vertices
                .iter()
                .flat_map(|p| to.edges().map(move |(a, b)| point_segment_distance(*p, a, b)))
                .fold(f64::INFINITY, f64::min)
        };
        f64::min(one_way(self, other), one_way(other, self))
    }
}
