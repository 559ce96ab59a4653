use super::footprint::{create_extended_obj_polygon, create_extended_polygon, ExtensionOffsets};
use super::interpolate::get_interpolated_object_pose_with_velocity_and_polygon_stamped;
use super::relative::is_target_object_front_along_path;
use super::rss::{calc_minimum_longitudinal_length, calc_rss_distance};
use crate::config::{BehaviorParams, RssParams};
use crate::math::{Polygon2d, Pose2d};
use crate::object::{ObjectShape, PredictedPathWithPolygon, TrackedObject};
use crate::path::PathWithLaneId;
use crate::trajectory::PoseWithVelocityStamped;
use crate::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::ControlFlow;

/// Why a time step was judged unsafe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnsafeReason {
    /// The plain footprints overlap.
    OverlapPolygon,
    /// Only the footprints extended by the safety margins overlap.
    OverlapExtendedPolygon,
}

impl Display for UnsafeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnsafeReason::OverlapPolygon => write!(f, "overlap_polygon"),
            UnsafeReason::OverlapExtendedPolygon => write!(f, "overlap_extended_polygon"),
        }
    }
}

/// The outcome of a single time step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Clear,
    Collided(UnsafeReason),
}

/// The margins and extended footprints tested in a time step whose
/// plain footprints are clear of each other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtendedCheck {
    /// Whether the object was ahead of the ego vehicle.
    pub is_object_front: bool,
    pub rss_distance: f64,
    /// The larger of the RSS distance and the configured minimum gap.
    pub min_lon_length: f64,
    /// The longitudinal extension after applying the hysteresis factor.
    pub lon_offset: f64,
    /// The lateral margin after applying the hysteresis factor.
    pub lat_margin: f64,
    pub extended_ego_polygon: Polygon2d,
    pub extended_obj_polygon: Polygon2d,
    /// The offsets of whichever footprint was extended.
    pub offsets: ExtensionOffsets,
}

/// Everything evaluated at one time step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionCheckStep {
    pub time: f64,
    pub ego_pose: Pose2d,
    pub ego_velocity: f64,
    pub obj_pose: Pose2d,
    pub obj_velocity: f64,
    pub ego_polygon: Polygon2d,
    pub obj_polygon: Polygon2d,
    /// `None` if the plain footprints already overlapped.
    pub extended: Option<ExtendedCheck>,
    pub outcome: StepOutcome,
}

impl CollisionCheckStep {
    /// The reason the step is unsafe, if it is.
    pub fn unsafe_reason(&self) -> Option<UnsafeReason> {
        match self.outcome {
            StepOutcome::Clear => None,
            StepOutcome::Collided(reason) => Some(reason),
        }
    }
}

/// A trace of a collision check, for visualization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionCheckDebug {
    pub object_id: ObjectId,
    /// The first sample of the ego vehicle's predicted path.
    pub current_ego: Option<PoseWithVelocityStamped>,
    pub current_obj_pose: Pose2d,
    pub current_obj_velocity: f64,
    pub obj_shape: ObjectShape,
    /// Every evaluated time step, in order.
    pub steps: Vec<CollisionCheckStep>,
    pub is_safe: bool,
    pub unsafe_reason: Option<UnsafeReason>,
    /// The time of the first unsafe step.
    pub failed_at: Option<f64>,
}

impl CollisionCheckDebug {
    fn new(target_object: &TrackedObject, predicted_ego_path: &[PoseWithVelocityStamped]) -> Self {
        Self {
            object_id: target_object.id(),
            current_ego: predicted_ego_path.first().copied(),
            current_obj_pose: target_object.initial_pose,
            current_obj_velocity: target_object.initial_velocity,
            obj_shape: target_object.shape.clone(),
            steps: vec![],
            is_safe: true,
            unsafe_reason: None,
            failed_at: None,
        }
    }

    fn record(&mut self, step: CollisionCheckStep) {
        if let Some(reason) = step.unsafe_reason() {
            if self.is_safe {
                self.is_safe = false;
                self.unsafe_reason = Some(reason);
                self.failed_at = Some(step.time);
            }
        }
        self.steps.push(step);
    }

    /// Serializes the trace to JSON.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// The verdict of a collision check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    /// Whether a collision was found. `false` means safe.
    pub has_collision: bool,
    pub debug: CollisionCheckDebug,
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        !self.has_collision
    }
}

/// A pair of footprints found to collide.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollidedPolygon {
    pub time: f64,
    /// The ego footprint tested, extended if the overlap was only found after extension.
    pub ego_polygon: Polygon2d,
    /// The object footprint tested, extended if the overlap was only found after extension.
    pub obj_polygon: Polygon2d,
    pub reason: UnsafeReason,
}

impl CollidedPolygon {
    fn from_step(step: &CollisionCheckStep) -> Option<Self> {
        let reason = step.unsafe_reason()?;
        let (ego_polygon, obj_polygon) = match &step.extended {
            Some(ext) => (&ext.extended_ego_polygon, &ext.extended_obj_polygon),
            None => (&step.ego_polygon, &step.obj_polygon),
        };
        Some(Self {
            time: step.time,
            ego_polygon: ego_polygon.clone(),
            obj_polygon: obj_polygon.clone(),
            reason,
        })
    }
}

/// Every collision found over the horizon, with the full trace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionReport {
    pub collided_polygons: Vec<CollidedPolygon>,
    pub debug: CollisionCheckDebug,
}

/// The inputs of a single collision check between the ego vehicle and one object path.
struct CollisionCheck<'a> {
    planned_path: &'a PathWithLaneId,
    predicted_ego_path: &'a [PoseWithVelocityStamped],
    target_object: &'a TrackedObject,
    target_object_path: &'a PredictedPathWithPolygon,
    behavior: &'a BehaviorParams,
    rss: &'a RssParams,
    hysteresis_factor: f64,
}

impl CollisionCheck<'_> {
    /// Walks the ego vehicle's predicted path, calling `on_collision` for
    /// each unsafe step until it breaks.
    fn run(
        &self,
        mut on_collision: impl FnMut(&CollisionCheckStep) -> ControlFlow<()>,
    ) -> CollisionCheckDebug {
        let mut debug = CollisionCheckDebug::new(self.target_object, self.predicted_ego_path);
        let mut skipped = 0;
        for ego in self.predicted_ego_path {
            let step = match self.check_step(ego) {
                Some(step) => step,
                None => {
                    skipped += 1;
                    continue;
                }
            };
            log::trace!(
                "object {:?} at t={:.2}: {:?}",
                self.target_object.id(),
                step.time,
                step.outcome
            );
            let flow = match step.unsafe_reason() {
                Some(reason) => {
                    log::debug!(
                        "collision with object {:?} at t={:.2} ({})",
                        self.target_object.id(),
                        step.time,
                        reason
                    );
                    on_collision(&step)
                }
                None => ControlFlow::Continue(()),
            };
            debug.record(step);
            if flow.is_break() {
                break;
            }
        }
        if skipped > 0 {
            log::debug!(
                "skipped {} steps not covered by the path of object {:?}",
                skipped,
                self.target_object.id()
            );
        }
        debug
    }

    /// Evaluates one ego sample against the object at the same time.
    /// Returns `None` if the object path does not cover that time.
    fn check_step(&self, ego: &PoseWithVelocityStamped) -> Option<CollisionCheckStep> {
        let obj = get_interpolated_object_pose_with_velocity_and_polygon_stamped(
            &self.target_object_path.path,
            ego.time,
            &self.target_object.shape,
        )?;
        let vehicle_info = &self.behavior.vehicle_info;
        let mut step = CollisionCheckStep {
            time: ego.time,
            ego_pose: ego.pose,
            ego_velocity: ego.velocity,
            obj_pose: obj.pose,
            obj_velocity: obj.velocity,
            ego_polygon: vehicle_info.footprint(&ego.pose),
            obj_polygon: obj.poly,
            extended: None,
            outcome: StepOutcome::Clear,
        };
        if step.ego_polygon.overlaps(&step.obj_polygon) {
            step.outcome = StepOutcome::Collided(UnsafeReason::OverlapPolygon);
            return Some(step);
        }

        let is_object_front = is_target_object_front_along_path(
            self.planned_path,
            &ego.pose,
            vehicle_info,
            &step.obj_polygon,
        );
        let (front_vel, rear_vel) = if is_object_front {
            (obj.velocity, ego.velocity)
        } else {
            (ego.velocity, obj.velocity)
        };
        let rss_distance = calc_rss_distance(front_vel, rear_vel, self.rss);
        let min_lon_length =
            calc_minimum_longitudinal_length(front_vel, rear_vel, self.behavior, self.rss);
        let lon_offset = min_lon_length * self.hysteresis_factor;
        let lat_margin = self.rss.lateral_distance_max_threshold * self.hysteresis_factor;

        // The rear body is the one that has to keep its distance
        let (extended_ego_polygon, extended_obj_polygon, offsets) = if is_object_front {
            let ext = create_extended_polygon(&ego.pose, vehicle_info, lon_offset, lat_margin);
            (ext.polygon, step.obj_polygon.clone(), ext.offsets)
        } else {
            let ext = create_extended_obj_polygon(
                &obj.pose,
                &self.target_object.shape,
                lon_offset,
                lat_margin,
            );
            (step.ego_polygon.clone(), ext.polygon, ext.offsets)
        };
        if extended_ego_polygon.overlaps(&extended_obj_polygon) {
            step.outcome = StepOutcome::Collided(UnsafeReason::OverlapExtendedPolygon);
        }
        step.extended = Some(ExtendedCheck {
            is_object_front,
            rss_distance,
            min_lon_length,
            lon_offset,
            lat_margin,
            extended_ego_polygon,
            extended_obj_polygon,
            offsets,
        });
        Some(step)
    }
}

/// A hysteresis factor below 1 would relax the margins, so it is raised to 1.
fn sanitize_hysteresis(factor: f64) -> f64 {
    if factor.is_finite() {
        f64::max(factor, 1.0)
    } else {
        1.0
    }
}

/// Checks the ego vehicle's predicted path against one predicted path of an
/// object, stopping at the first time step found to be unsafe.
///
/// The object path is sampled at the times of the ego samples; times it
/// does not cover are skipped, so an empty object path is safe.
///
/// # Arguments
/// * `hysteresis_factor` - Scales the safety margins. Pass a value above 1
///   after an unsafe verdict, see [RssParams::hysteresis_factor].
pub fn check_collision(
    planned_path: &PathWithLaneId,
    predicted_ego_path: &[PoseWithVelocityStamped],
    target_object: &TrackedObject,
    target_object_path: &PredictedPathWithPolygon,
    common_parameters: &BehaviorParams,
    rss_parameters: &RssParams,
    hysteresis_factor: f64,
) -> SafetyVerdict {
    let check = CollisionCheck {
        planned_path,
        predicted_ego_path,
        target_object,
        target_object_path,
        behavior: common_parameters,
        rss: rss_parameters,
        hysteresis_factor: sanitize_hysteresis(hysteresis_factor),
    };
    let debug = check.run(|_| ControlFlow::Break(()));
    SafetyVerdict {
        has_collision: !debug.is_safe,
        debug,
    }
}

/// Like [check_collision], but evaluates the whole horizon and returns every
/// colliding pair of footprints.
pub fn get_collided_polygons(
    planned_path: &PathWithLaneId,
    predicted_ego_path: &[PoseWithVelocityStamped],
    target_object: &TrackedObject,
    target_object_path: &PredictedPathWithPolygon,
    common_parameters: &BehaviorParams,
    rss_parameters: &RssParams,
    hysteresis_factor: f64,
) -> CollisionReport {
    let check = CollisionCheck {
        planned_path,
        predicted_ego_path,
        target_object,
        target_object_path,
        behavior: common_parameters,
        rss: rss_parameters,
        hysteresis_factor: sanitize_hysteresis(hysteresis_factor),
    };
    let mut collided_polygons = vec![];
    let debug = check.run(|step| {
        collided_polygons.extend(CollidedPolygon::from_step(step));
        ControlFlow::Continue(())
    });
    CollisionReport {
        collided_polygons,
        debug,
    }
}

/// Checks the ego vehicle against the predicted paths of an object: all of
/// them, or only the most confident one.
///
/// Returns the verdict of the first unsafe path, or of the last path if all
/// are safe. An object with no predicted paths is safe.
pub fn check_object_safety(
    planned_path: &PathWithLaneId,
    predicted_ego_path: &[PoseWithVelocityStamped],
    target_object: &TrackedObject,
    common_parameters: &BehaviorParams,
    rss_parameters: &RssParams,
    hysteresis_factor: f64,
    use_all_predicted_paths: bool,
) -> SafetyVerdict {
    let mut verdict = SafetyVerdict {
        has_collision: false,
        debug: CollisionCheckDebug::new(target_object, predicted_ego_path),
    };
    for path in target_object.paths_to_check(use_all_predicted_paths) {
        verdict = check_collision(
            planned_path,
            predicted_ego_path,
            target_object,
            path,
            common_parameters,
            rss_parameters,
            hysteresis_factor,
        );
        if verdict.has_collision {
            break;
        }
    }
    verdict
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::object::{ObjectAttributes, ObjectClassification};
    use crate::vehicle::VehicleInfo;
    use crate::ObjectSet;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    fn behavior() -> BehaviorParams {
        BehaviorParams {
            vehicle_info: VehicleInfo {
                base_to_front: 4.0,
                base_to_rear: 1.0,
                width: 2.0,
            },
            longitudinal_distance_min_threshold: 3.0,
            longitudinal_velocity_delta_time: 0.8,
        }
    }

    fn rss() -> RssParams {
        RssParams {
            front_vehicle_deceleration: -1.0,
            rear_vehicle_deceleration: -1.0,
            rear_vehicle_reaction_time: 1.0,
            rear_vehicle_safety_time_margin: 1.0,
            lateral_distance_max_threshold: 0.0,
            hysteresis_factor_expand_rate: 1.0,
        }
    }

    /// Samples along the x-axis at 0.5 s intervals for 5 s.
    fn straight(start: f64, velocity: f64) -> Vec<PoseWithVelocityStamped> {
        (0..=10)
            .map(|i| 0.5 * i as f64)
            .map(|t| {
                let pose = Pose2d::new(start + velocity * t, 0.0, 0.0);
                PoseWithVelocityStamped::new(t, pose, velocity)
            })
            .collect()
    }

    fn object_on(objects: &mut ObjectSet, samples: &[PoseWithVelocityStamped]) -> ObjectId {
        let id = TrackedObject::insert(
            objects,
            &ObjectAttributes {
                classification: ObjectClassification::default(),
                shape: ObjectShape::BoundingBox {
                    length: 4.0,
                    width: 2.0,
                },
                pose: samples.first().map(|s| s.pose).unwrap_or_default(),
                velocity: samples.first().map_or(0.0, |s| s.velocity),
            },
        );
        objects[id].add_predicted_path(1.0, samples);
        id
    }

    #[test]
    fn overlapping_footprints_collide_immediately() {
        let mut objects = ObjectSet::with_key();
        let ego_path = straight(0.0, 10.0);
        let id = object_on(&mut objects, &straight(2.0, 0.0));
        let object = &objects[id];
        let path = &object.predicted_paths[0];

        let verdict = check_collision(
            &PathWithLaneId::default(),
            &ego_path,
            object,
            path,
            &behavior(),
            &rss(),
            1.0,
        );
        assert!(verdict.has_collision);
        assert_eq!(verdict.debug.failed_at, Some(0.0));
        assert_eq!(verdict.debug.unsafe_reason, Some(UnsafeReason::OverlapPolygon));
        assert_eq!(verdict.debug.steps.len(), 1);

        let report = get_collided_polygons(
            &PathWithLaneId::default(),
            &ego_path,
            object,
            path,
            &behavior(),
            &rss(),
            1.0,
        );
        assert!(!report.collided_polygons.is_empty());
        assert_eq!(report.collided_polygons[0].time, 0.0);
        assert_eq!(report.debug.steps.len(), ego_path.len());
    }

    #[test]
    fn distant_object_is_safe() {
        let mut objects = ObjectSet::with_key();
        let ego_path = straight(0.0, 10.0);
        let id = object_on(&mut objects, &straight(200.0, 0.0));
        let verdict = check_collision(
            &PathWithLaneId::default(),
            &ego_path,
            &objects[id],
            &objects[id].predicted_paths[0],
            &behavior(),
            &rss(),
            1.0,
        );
        assert!(verdict.is_safe());
        assert_eq!(verdict.debug.steps.len(), ego_path.len());
        assert!(verdict.debug.steps.iter().all(|s| s.outcome == StepOutcome::Clear));
        let first = verdict.debug.steps[0].extended.as_ref().unwrap();
        assert!(first.is_object_front);
        assert_approx_eq!(first.rss_distance, 70.0);
        assert_approx_eq!(first.offsets.forward_lon_offset, 74.0);
    }

    #[test]
    fn object_inside_the_rss_gap_is_unsafe() {
        let mut objects = ObjectSet::with_key();
        let ego_path = straight(0.0, 10.0);
        // Moving at the same speed 25 m ahead: clear footprints, but inside the 20 m gap
        let id = object_on(&mut objects, &straight(25.0, 10.0));
        let verdict = check_collision(
            &PathWithLaneId::default(),
            &ego_path,
            &objects[id],
            &objects[id].predicted_paths[0],
            &behavior(),
            &rss(),
            1.0,
        );
        assert!(verdict.has_collision);
        assert_eq!(verdict.debug.unsafe_reason, Some(UnsafeReason::OverlapExtendedPolygon));
        assert_eq!(verdict.debug.failed_at, Some(0.0));
    }

    #[test]
    fn rear_object_is_extended() {
        let mut objects = ObjectSet::with_key();
        let ego_path = straight(20.0, 5.0);
        // A faster object closing in from behind
        let id = object_on(&mut objects, &straight(0.0, 10.0));
        let verdict = check_collision(
            &PathWithLaneId::default(),
            &ego_path,
            &objects[id],
            &objects[id].predicted_paths[0],
            &behavior(),
            &rss(),
            1.0,
        );
        assert!(verdict.has_collision);
        let step = &verdict.debug.steps[0];
        let ext = step.extended.as_ref().unwrap();
        assert!(!ext.is_object_front);
        assert_eq!(ext.extended_ego_polygon, step.ego_polygon);
        assert_ne!(ext.extended_obj_polygon, step.obj_polygon);
    }

    #[test]
    fn uncovered_times_are_skipped() {
        let mut objects = ObjectSet::with_key();
        let ego_path = straight(0.0, 10.0);
        let id = object_on(&mut objects, &straight(200.0, 0.0)[..3]);
        let verdict = check_collision(
            &PathWithLaneId::default(),
            &ego_path,
            &objects[id],
            &objects[id].predicted_paths[0],
            &behavior(),
            &rss(),
            1.0,
        );
        assert!(verdict.is_safe());
        assert_eq!(verdict.debug.steps.len(), 3);

        let empty = PredictedPathWithPolygon::default();
        let verdict = check_collision(
            &PathWithLaneId::default(),
            &ego_path,
            &objects[id],
            &empty,
            &behavior(),
            &rss(),
            1.0,
        );
        assert!(verdict.is_safe());
        assert!(verdict.debug.steps.is_empty());
    }

    #[test]
    fn hysteresis_never_turns_unsafe_into_safe() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Hysteresis keeps the verdict....");
        let planned = PathWithLaneId::default();
        for _ in 0..200 {
            let mut objects = ObjectSet::with_key();
            let ego_path = straight(0.0, rng.gen_range(0.0..15.0));
            let id = object_on(
                &mut objects,
                &straight(rng.gen_range(-60.0..120.0), rng.gen_range(0.0..15.0)),
            );
            let object = &objects[id];
            let check = |factor| {
                check_collision(
                    &planned,
                    &ego_path,
                    object,
                    &object.predicted_paths[0],
                    &behavior(),
                    &rss(),
                    factor,
                )
                .has_collision
            };
            if check(1.0) {
                assert!(check(rng.gen_range(1.0..3.0)));
            }
        }
    }

    #[test]
    fn object_safety_checks_selected_paths() {
        let mut objects = ObjectSet::with_key();
        let ego_path = straight(0.0, 10.0);
        let id = object_on(&mut objects, &straight(200.0, 0.0));
        objects[id].add_predicted_path(0.1, &straight(2.0, 0.0));
        let object = &objects[id];

        let check = |use_all| {
            check_object_safety(
                &PathWithLaneId::default(),
                &ego_path,
                object,
                &behavior(),
                &rss(),
                1.0,
                use_all,
            )
        };
        assert!(check(false).is_safe());
        assert!(check(true).has_collision);
        assert!(check(true).debug.to_json().is_ok());
    }
}
