use crate::config::{BehaviorParams, RssParams};

/// Decelerations weaker than this are not trusted, in m/s².
const MIN_DECELERATION: f64 = -1e-3;

/// The deceleration assumed in place of an untrusted one, in m/s².
const FALLBACK_DECELERATION: f64 = -1.0;

/// The distance needed to stop from `vel` at a constant `decel`.
fn stopping_distance(vel: f64, decel: f64) -> f64 {
    let decel = if decel < MIN_DECELERATION {
        decel
    } else {
        FALLBACK_DECELERATION
    };
    -vel.powi(2) / (2.0 * decel)
}

/// Calculates the longitudinal gap the rear body needs to stop behind the
/// front body, assuming both brake as hard as the parameters allow and the
/// rear body only starts braking after its reaction time.
///
/// # Arguments
/// * `front_object_velocity` - The velocity of the front body (m/s).
/// * `rear_object_velocity` - The velocity of the rear body (m/s).
pub fn calc_rss_distance(
    front_object_velocity: f64,
    rear_object_velocity: f64,
    rss_params: &RssParams,
) -> f64 {
    let front_stop =
        stopping_distance(front_object_velocity, rss_params.front_vehicle_deceleration);
    let rear_stop = rear_object_velocity * rss_params.reaction_time()
        + stopping_distance(rear_object_velocity, rss_params.rear_vehicle_deceleration);
    f64::max(rear_stop - front_stop, 0.0)
}

/// The longitudinal gap to require between two bodies: the RSS distance,
/// but never less than the configured minimum gap.
pub fn calc_minimum_longitudinal_length(
    front_object_velocity: f64,
    rear_object_velocity: f64,
    behavior_params: &BehaviorParams,
    rss_params: &RssParams,
) -> f64 {
    f64::max(
        calc_rss_distance(front_object_velocity, rear_object_velocity, rss_params),
        behavior_params.min_longitudinal_gap(front_object_velocity, rear_object_velocity),
    )
}
