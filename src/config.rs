//! Parameters of the safety checks.
//!
//! Each struct can be deserialized on its own, and [SafetyCheckConfig]
//! bundles them for loading from a single JSON document. Missing fields
//! take their default values.

use crate::error::ConfigError;
use crate::vehicle::VehicleInfo;
use serde::{Deserialize, Serialize};

/// Planner-wide parameters shared by all safety checks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorParams {
    /// The ego vehicle's extents.
    pub vehicle_info: VehicleInfo,
    /// The longitudinal gap always required between two bodies, in m.
    pub longitudinal_distance_min_threshold: f64,
    /// Additional gap per m/s of the faster body, in s.
    pub longitudinal_velocity_delta_time: f64,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            vehicle_info: VehicleInfo::default(),
            longitudinal_distance_min_threshold: 3.0,
            longitudinal_velocity_delta_time: 0.8,
        }
    }
}

impl BehaviorParams {
    /// The configured minimum longitudinal gap for bodies moving at the given velocities.
    pub fn min_longitudinal_gap(&self, front_velocity: f64, rear_velocity: f64) -> f64 {
        let max_vel = f64::max(front_velocity.abs(), rear_velocity.abs());
        self.longitudinal_distance_min_threshold + self.longitudinal_velocity_delta_time * max_vel
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.vehicle_info.validate()?;
        ConfigError::check_non_negative(
            "longitudinal_distance_min_threshold",
            self.longitudinal_distance_min_threshold,
        )?;
        ConfigError::check_non_negative(
            "longitudinal_velocity_delta_time",
            self.longitudinal_velocity_delta_time,
        )
    }
}

/// The assumptions of the responsibility-sensitive safety model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RssParams {
    /// The deceleration of the front body, a negative number in m/s².
    pub front_vehicle_deceleration: f64,
    /// The deceleration of the rear body, a negative number in m/s².
    pub rear_vehicle_deceleration: f64,
    /// The time before the rear body starts braking, in s.
    pub rear_vehicle_reaction_time: f64,
    /// Extra time added to the reaction time, in s.
    pub rear_vehicle_safety_time_margin: f64,
    /// The lateral margin added to the extended footprint, in m.
    pub lateral_distance_max_threshold: f64,
    /// The hysteresis factor applied after an unsafe verdict.
    pub hysteresis_factor_expand_rate: f64,
}

impl Default for RssParams {
    fn default() -> Self {
        Self {
            front_vehicle_deceleration: -1.0,
            rear_vehicle_deceleration: -1.0,
            rear_vehicle_reaction_time: 2.0,
            rear_vehicle_safety_time_margin: 1.0,
            lateral_distance_max_threshold: 2.0,
            hysteresis_factor_expand_rate: 1.0,
        }
    }
}

impl RssParams {
    /// The total time the rear body travels at constant velocity before braking.
    pub fn reaction_time(&self) -> f64 {
        self.rear_vehicle_reaction_time + self.rear_vehicle_safety_time_margin
    }

    /// The hysteresis factor to use in the next planning cycle.
    ///
    /// Once a check has failed, the margins stay inflated by the expand rate
    /// until a check passes again, so that a marginal improvement does not
    /// flip the verdict back and forth.
    pub fn hysteresis_factor(&self, was_safe: bool) -> f64 {
        if was_safe {
            1.0
        } else {
            self.hysteresis_factor_expand_rate
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("front_vehicle_deceleration", self.front_vehicle_deceleration)?;
        ConfigError::check_finite("rear_vehicle_deceleration", self.rear_vehicle_deceleration)?;
        ConfigError::check_non_negative(
            "rear_vehicle_reaction_time",
            self.rear_vehicle_reaction_time,
        )?;
        ConfigError::check_non_negative(
            "rear_vehicle_safety_time_margin",
            self.rear_vehicle_safety_time_margin,
        )?;
        ConfigError::check_non_negative(
            "lateral_distance_max_threshold",
            self.lateral_distance_max_threshold,
        )?;
        ConfigError::check_at_least(
            "hysteresis_factor_expand_rate",
            self.hysteresis_factor_expand_rate,
            1.0,
        )
    }
}

/// Parameters of the single-frame stopping margin check.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoppingMarginParams {
    /// The assumed braking deceleration, a positive number in m/s².
    pub maximum_deceleration: f64,
    /// Obstacles closer than this to the stopping footprint collide, in m.
    pub collision_check_margin: f64,
    /// The cap on the extension for the stopping distance, in m.
    pub max_extra_stopping_margin: f64,
}

impl Default for StoppingMarginParams {
    fn default() -> Self {
        Self {
            maximum_deceleration: 1.0,
            collision_check_margin: 1.0,
            max_extra_stopping_margin: 1.0,
        }
    }
}

impl StoppingMarginParams {
    fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_finite("maximum_deceleration", self.maximum_deceleration)?;
        ConfigError::check_non_negative("collision_check_margin", self.collision_check_margin)?;
        ConfigError::check_non_negative("max_extra_stopping_margin", self.max_extra_stopping_margin)
    }
}

/// All parameters of the safety checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyCheckConfig {
    pub behavior: BehaviorParams,
    pub rss: RssParams,
    pub stopping_margin: StoppingMarginParams,
}

impl SafetyCheckConfig {
    /// Loads and validates a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every parameter is within its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.behavior.validate()?;
        self.rss.validate()?;
        self.stopping_margin.validate()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn missing_fields_take_defaults() {
        let config = SafetyCheckConfig::from_json(
            r#"{
                "rss": { "rear_vehicle_reaction_time": 1.5 },
                "behavior": { "vehicle_info": { "width": 2.5 } }
            }"#,
        )
        .unwrap();
        assert_approx_eq!(config.rss.rear_vehicle_reaction_time, 1.5);
        assert_approx_eq!(config.rss.reaction_time(), 2.5);
        assert_approx_eq!(config.behavior.vehicle_info.width, 2.5);
        assert_eq!(config.stopping_margin, StoppingMarginParams::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let json = r#"{ "rss": { "hysteresis_factor_expand_rate": 0.5 } }"#;
        let err = SafetyCheckConfig::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "hysteresis_factor_expand_rate",
                ..
            }
        ));

        let json = r#"{ "behavior": { "vehicle_info": { "width": -1.0 } } }"#;
        let err = SafetyCheckConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "vehicle_info.width", .. }));

        let err = SafetyCheckConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn minimum_gap_grows_with_the_faster_body() {
        let params = BehaviorParams::default();
        assert_approx_eq!(params.min_longitudinal_gap(0.0, 0.0), 3.0);
        assert_approx_eq!(params.min_longitudinal_gap(5.0, -10.0), 3.0 + 0.8 * 10.0);
    }

    #[test]
    fn hysteresis_only_after_unsafe_verdict() {
        let params = RssParams {
            hysteresis_factor_expand_rate: 1.5,
            ..Default::default()
        };
        assert_approx_eq!(params.hysteresis_factor(true), 1.0);
        assert_approx_eq!(params.hysteresis_factor(false), 1.5);
    }
}
