pub use cgmath;
pub use config::{BehaviorParams, RssParams, SafetyCheckConfig, StoppingMarginParams};
pub use error::ConfigError;
pub use object::{
    ObjectAttributes, ObjectClassification, ObjectLabel, ObjectShape, PredictedPathWithPolygon,
    TrackedObject,
};
pub use path::{PathPoint, PathPointWithLaneId, PathWithLaneId};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use trajectory::{PoseWithVelocityAndPolygonStamped, PoseWithVelocityStamped};
pub use util::Interval;
pub use vehicle::VehicleInfo;

mod config;
mod error;
pub mod math;
mod object;
mod path;
pub mod safety;
mod trajectory;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [TrackedObject].
    pub struct ObjectId;
}

/// The objects tracked in a planning cycle.
pub type ObjectSet = SlotMap<ObjectId, TrackedObject>;
