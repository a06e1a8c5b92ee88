use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::comfort::ComfortSettings;
use crate::error::ConfigError;
use crate::input_context::Handedness;

/// Tuning for the whole locomotion core. Every field has a default, so a
/// TOML file only needs to name what it changes:
///
/// ```toml
/// [teleport]
/// max_distance = 20.0
///
/// [comfort]
/// locomotion_mode = "teleport"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub input: InputConfig,
    pub smooth: SmoothConfig,
    pub teleport: TeleportConfig,
    pub snap_turn: SnapTurnConfig,
    pub hands: HandAssignment,
    /// Comfort settings the profile starts with
    pub comfort: ComfortSettings,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub deadzone: f32,
    /// Weight of the newest turn sample in the low-pass filter
    pub turn_smoothing: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            deadzone: 0.15,
            turn_smoothing: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothConfig {
    /// Units per second at full stick deflection
    pub base_speed: f32,
    pub boost_factor: f32,
    /// Radians per second at full (smoothed) deflection
    pub turn_speed: f32,
    /// Largest frame time applied to a smooth turn
    pub max_turn_delta: f32,
    /// Units per second of vertical flight
    pub vertical_speed: f32,
    /// Exponential approach rates, per second
    pub speed_ramp_rate: f32,
    pub boost_ramp_rate: f32,
}

impl Default for SmoothConfig {
    fn default() -> Self {
        SmoothConfig {
            base_speed: 2.0,
            boost_factor: 3.0,
            turn_speed: 2.5,
            max_turn_delta: 1.0 / 30.0,
            vertical_speed: 1.5,
            speed_ramp_rate: 10.0,
            boost_ramp_rate: 6.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    pub press_threshold: f32,
    pub release_threshold: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub gravity: f32,
    /// Exponent of the stick magnitude to distance curve
    pub distance_curve_exponent: f32,
    /// Seconds of flight between arc samples
    pub simulation_step: f32,
    pub max_simulation_steps: usize,
    /// Samples after the apex before a floor hit counts
    pub apex_grace_steps: usize,
    /// Lower bound on the sine of the launch angle
    pub min_upward: f32,
    /// Upper bound on the sine of the launch angle
    pub max_elevation: f32,
    pub max_launch_speed: f32,
    /// Floor offset change per second at full deflection
    pub floor_adjust_rate: f32,
    pub floor_adjust_deadzone: f32,
    /// Floor offset stays within +/- this value
    pub floor_offset_limit: f32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        TeleportConfig {
            press_threshold: 0.7,
            release_threshold: 0.3,
            min_distance: 3.0,
            max_distance: 30.0,
            gravity: 9.8,
            distance_curve_exponent: 2.0,
            simulation_step: 0.02,
            max_simulation_steps: 256,
            apex_grace_steps: 2,
            min_upward: 0.26,
            max_elevation: 0.87,
            max_launch_speed: 40.0,
            floor_adjust_rate: 1.5,
            floor_adjust_deadzone: 0.1,
            floor_offset_limit: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapTurnConfig {
    pub threshold: f32,
    /// Seconds between snaps
    pub cooldown: f32,
}

impl Default for SnapTurnConfig {
    fn default() -> Self {
        SnapTurnConfig {
            threshold: 0.7,
            cooldown: 0.5,
        }
    }
}

/// Which stick does what. The movement hand also aims teleports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandAssignment {
    pub movement: Handedness,
    pub turning: Handedness,
}

impl Default for HandAssignment {
    fn default() -> Self {
        HandAssignment {
            movement: Handedness::Left,
            turning: Handedness::Right,
        }
    }
}

impl LocomotionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LocomotionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let input = &self.input;
        ensure(
            (0.0..1.0).contains(&input.deadzone),
            "input.deadzone",
            "must be in [0, 1)",
        )?;
        ensure(
            input.turn_smoothing > 0.0 && input.turn_smoothing <= 1.0,
            "input.turn_smoothing",
            "must be in (0, 1]",
        )?;

        let smooth = &self.smooth;
        ensure_positive(smooth.base_speed, "smooth.base_speed")?;
        ensure(smooth.boost_factor >= 1.0, "smooth.boost_factor", "must be at least 1")?;
        ensure_positive(smooth.turn_speed, "smooth.turn_speed")?;
        ensure_positive(smooth.max_turn_delta, "smooth.max_turn_delta")?;
        ensure_positive(smooth.vertical_speed, "smooth.vertical_speed")?;
        ensure_positive(smooth.speed_ramp_rate, "smooth.speed_ramp_rate")?;
        ensure_positive(smooth.boost_ramp_rate, "smooth.boost_ramp_rate")?;

        let teleport = &self.teleport;
        ensure(
            teleport.release_threshold > 0.0,
            "teleport.release_threshold",
            "must be positive",
        )?;
        ensure(
            teleport.press_threshold > teleport.release_threshold,
            "teleport.press_threshold",
            format!(
                "must be greater than release_threshold ({})",
                teleport.release_threshold
            ),
        )?;
        ensure(
            teleport.press_threshold < 1.0,
            "teleport.press_threshold",
            "must be below full deflection",
        )?;
        ensure(
            teleport.min_distance >= 0.0 && teleport.min_distance < teleport.max_distance,
            "teleport.min_distance",
            "must be non-negative and below max_distance",
        )?;
        ensure_positive(teleport.gravity, "teleport.gravity")?;
        ensure_positive(teleport.distance_curve_exponent, "teleport.distance_curve_exponent")?;
        ensure_positive(teleport.simulation_step, "teleport.simulation_step")?;
        ensure(
            teleport.max_simulation_steps >= 2,
            "teleport.max_simulation_steps",
            "must be at least 2",
        )?;
        ensure(
            teleport.min_upward > 0.0 && teleport.min_upward < teleport.max_elevation,
            "teleport.min_upward",
            "must be positive and below max_elevation",
        )?;
        ensure(
            teleport.max_elevation < 1.0,
            "teleport.max_elevation",
            "must be below 1 (straight up)",
        )?;
        ensure_positive(teleport.max_launch_speed, "teleport.max_launch_speed")?;
        ensure_positive(teleport.floor_adjust_rate, "teleport.floor_adjust_rate")?;
        ensure(
            (0.0..1.0).contains(&teleport.floor_adjust_deadzone),
            "teleport.floor_adjust_deadzone",
            "must be in [0, 1)",
        )?;
        ensure_positive(teleport.floor_offset_limit, "teleport.floor_offset_limit")?;

        ensure(
            self.snap_turn.threshold > 0.0 && self.snap_turn.threshold <= 1.0,
            "snap_turn.threshold",
            "must be in (0, 1]",
        )?;
        ensure(
            self.snap_turn.cooldown >= 0.0,
            "snap_turn.cooldown",
            "must not be negative",
        )?;

        ensure(
            self.hands.movement != self.hands.turning,
            "hands",
            "movement and turning must use different hands",
        )?;

        self.comfort
            .validate()
            .map_err(|err| ConfigError::invalid("comfort", err.to_string()))
    }
}

fn ensure(condition: bool, field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, reason))
    }
}

fn ensure_positive(value: f32, field: &'static str) -> Result<(), ConfigError> {
    ensure(value.is_finite() && value > 0.0, field, "must be a positive number")
}
