//! Dynamic objects reported by perception, with their predicted paths.

use crate::math::{Point2d, Polygon2d, Pose2d};
use crate::trajectory::{PoseWithVelocityAndPolygonStamped, PoseWithVelocityStamped};
use crate::vehicle::footprint;
use crate::{ObjectId, ObjectSet};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// The number of sides of the polygon approximating a cylinder.
const CYLINDER_SIDES: usize = 8;

/// The shape of an object, in the object's own frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ObjectShape {
    /// A rectangle centred on the object's pose.
    BoundingBox { length: f64, width: f64 },
    /// A circle centred on the object's pose.
    Cylinder { diameter: f64 },
    /// An arbitrary outline, in the object's frame.
    Polygon { footprint: Vec<Point2d> },
}

impl ObjectShape {
    /// The footprint of the object when it is at `pose`.
    ///
    /// Cylinders are approximated by a circumscribed regular polygon and
    /// outlines by their convex hull, so the result always covers the shape.
    pub fn to_polygon(&self, pose: &Pose2d) -> Polygon2d {
        match self {
            ObjectShape::BoundingBox { length, width } => {
                footprint(pose, 0.5 * length, 0.5 * length, *width)
            }
            ObjectShape::Cylinder { diameter } => {
                let step = 2.0 * PI / CYLINDER_SIDES as f64;
                let radius = 0.5 * diameter / (0.5 * step).cos();
                Polygon2d::new((0..CYLINDER_SIDES).map(|i| {
                    let angle = (i as f64 + 0.5) * step;
                    pose.offset(radius * angle.cos(), radius * angle.sin())
                }))
            }
            ObjectShape::Polygon { footprint } => {
                Polygon2d::convex_hull(footprint.iter().map(|p| pose.offset(p.x, p.y)))
            }
        }
    }
}

/// The kind of object, as classified by perception.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectLabel {
    #[default]
    Unknown,
    Car,
    Truck,
    Bus,
    Trailer,
    Motorcycle,
    Bicycle,
    Pedestrian,
}

impl ObjectLabel {
    /// Whether the object is a motor vehicle.
    pub fn is_vehicle(&self) -> bool {
        use ObjectLabel::*;
        matches!(self, Car | Truck | Bus | Trailer | Motorcycle)
    }
}

/// A classification label and its probability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectClassification {
    pub label: ObjectLabel,
    pub probability: f64,
}

/// One of an object's possible future paths.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictedPathWithPolygon {
    /// The confidence that the object follows this path, between 0 and 1.
    pub confidence: f64,
    /// The samples along the path, in increasing time order.
    pub path: Vec<PoseWithVelocityAndPolygonStamped>,
}

impl PredictedPathWithPolygon {
    /// Creates a predicted path, computing the footprint of the given
    /// shape at each sample.
    pub fn new(confidence: f64, samples: &[PoseWithVelocityStamped], shape: &ObjectShape) -> Self {
        Self {
            confidence,
            path: samples
                .iter()
                .map(|s| PoseWithVelocityAndPolygonStamped::new(*s, shape.to_polygon(&s.pose)))
                .collect(),
        }
    }

    /// The samples along the path, without footprints.
    pub fn samples(&self) -> Vec<PoseWithVelocityStamped> {
        self.path.iter().map(|p| p.sample()).collect()
    }
}

/// The attributes of a tracked object.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectAttributes {
    pub classification: ObjectClassification,
    pub shape: ObjectShape,
    /// The current pose.
    pub pose: Pose2d,
    /// The current forward velocity in m/s.
    pub velocity: f64,
}

/// An object tracked by perception during one planning cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    /// The object's ID
    id: ObjectId,
    pub classification: ObjectClassification,
    pub shape: ObjectShape,
    /// The pose when the object was observed.
    pub initial_pose: Pose2d,
    /// The forward velocity when the object was observed, in m/s.
    pub initial_velocity: f64,
    /// The possible future paths of the object.
    pub predicted_paths: Vec<PredictedPathWithPolygon>,
}

impl TrackedObject {
    /// Creates a new object with no predicted paths.
    pub fn new(id: ObjectId, attributes: &ObjectAttributes) -> Self {
        Self {
            id,
            classification: attributes.classification,
            shape: attributes.shape.clone(),
            initial_pose: attributes.pose,
            initial_velocity: attributes.velocity,
            predicted_paths: vec![],
        }
    }

    /// Adds an object to the set.
    pub fn insert(objects: &mut ObjectSet, attributes: &ObjectAttributes) -> ObjectId {
        objects.insert_with_key(|id| Self::new(id, attributes))
    }

    /// Gets the object's ID.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The object's footprint at its observed pose.
    pub fn current_polygon(&self) -> Polygon2d {
        self.shape.to_polygon(&self.initial_pose)
    }

    /// Adds a predicted path made of the given samples.
    pub fn add_predicted_path(&mut self, confidence: f64, samples: &[PoseWithVelocityStamped]) {
        let path = PredictedPathWithPolygon::new(confidence, samples, &self.shape);
        self.predicted_paths.push(path);
    }

    /// The predicted paths to check for collisions: all of them, or only
    /// the one with the highest confidence.
    pub fn paths_to_check(
        &self,
        use_all: bool,
    ) -> impl Iterator<Item = &PredictedPathWithPolygon> + '_ {
        let most_confident = self
            .predicted_paths
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.confidence.total_cmp(&b.1.confidence))
            .map(|(idx, _)| idx);
        self.predicted_paths
            .iter()
            .enumerate()
            .filter(move |(idx, _)| use_all || Some(*idx) == most_confident)
            .map(|(_, path)| path)
    }
}
