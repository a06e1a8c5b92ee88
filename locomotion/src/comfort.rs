//! Comfort settings: which locomotion and turning strategies are active and
//! how strongly they move the player.
//!
//! Settings are a plain `Copy` value. Every update is a merge: each field is
//! validated on its own, valid fields are applied, invalid ones are reported
//! back in [`SettingsChange::rejected`] and logged. Consumers that hold
//! gesture state (teleport aim, snap cooldown) look at the
//! `*_mode_changed` flags to reset themselves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::comfort_log;
use crate::error::ComfortError;

pub const SNAP_TURN_ANGLE_RANGE: (f32, f32) = (0.0, 90.0);
pub const COMFORT_SPEED_RANGE: (f32, f32) = (0.0, 2.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocomotionMode {
    #[default]
    Smooth,
    Teleport,
}

impl FromStr for LocomotionMode {
    type Err = ComfortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smooth" => Ok(LocomotionMode::Smooth),
            "teleport" => Ok(LocomotionMode::Teleport),
            _ => Err(ComfortError::UnknownVariant {
                field: "locomotion_mode",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurningMode {
    #[default]
    Smooth,
    Snap,
}

impl FromStr for TurningMode {
    type Err = ComfortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smooth" => Ok(TurningMode::Smooth),
            "snap" => Ok(TurningMode::Snap),
            _ => Err(ComfortError::UnknownVariant {
                field: "turning_mode",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComfortSettings {
    pub locomotion_mode: LocomotionMode,
    pub turning_mode: TurningMode,
    /// Degrees per snap, (0, 90]
    pub snap_turn_angle: f32,
    /// Disables speed boost and softens acceleration
    pub reduced_motion: bool,
    /// Multiplier on smooth movement speed, (0, 2]
    pub comfort_speed: f32,
    pub show_teleport_arc: bool,
}

impl Default for ComfortSettings {
    fn default() -> Self {
        ComfortSettings {
            locomotion_mode: LocomotionMode::Smooth,
            turning_mode: TurningMode::Smooth,
            snap_turn_angle: 30.0,
            reduced_motion: false,
            comfort_speed: 1.0,
            show_teleport_arc: true,
        }
    }
}

impl ComfortSettings {
    /// Check every field, returning the first problem found
    pub fn validate(&self) -> Result<(), ComfortError> {
        validate_range("snap_turn_angle", self.snap_turn_angle, SNAP_TURN_ANGLE_RANGE)?;
        validate_range("comfort_speed", self.comfort_speed, COMFORT_SPEED_RANGE)?;
        Ok(())
    }
}

/// Partial update. `None` leaves the field untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComfortSettingsPatch {
    pub locomotion_mode: Option<LocomotionMode>,
    pub turning_mode: Option<TurningMode>,
    pub snap_turn_angle: Option<f32>,
    pub reduced_motion: Option<bool>,
    pub comfort_speed: Option<f32>,
    pub show_teleport_arc: Option<bool>,
}

impl ComfortSettingsPatch {
    pub fn locomotion_mode(mode: LocomotionMode) -> Self {
        ComfortSettingsPatch {
            locomotion_mode: Some(mode),
            ..Default::default()
        }
    }

    pub fn turning_mode(mode: TurningMode) -> Self {
        ComfortSettingsPatch {
            turning_mode: Some(mode),
            ..Default::default()
        }
    }
}

impl From<ComfortSettings> for ComfortSettingsPatch {
    fn from(settings: ComfortSettings) -> Self {
        ComfortSettingsPatch {
            locomotion_mode: Some(settings.locomotion_mode),
            turning_mode: Some(settings.turning_mode),
            snap_turn_angle: Some(settings.snap_turn_angle),
            reduced_motion: Some(settings.reduced_motion),
            comfort_speed: Some(settings.comfort_speed),
            show_teleport_arc: Some(settings.show_teleport_arc),
        }
    }
}

/// Outcome of a settings merge
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsChange {
    pub changed: bool,
    pub locomotion_mode_changed: bool,
    pub turning_mode_changed: bool,
    pub rejected: Vec<ComfortError>,
}

impl SettingsChange {
    pub fn mode_changed(&self) -> bool {
        self.locomotion_mode_changed || self.turning_mode_changed
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComfortPreset {
    MaximumComfort,
    Balanced,
    Performance,
}

impl ComfortPreset {
    pub const ALL: [ComfortPreset; 3] = [
        ComfortPreset::MaximumComfort,
        ComfortPreset::Balanced,
        ComfortPreset::Performance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ComfortPreset::MaximumComfort => "maximum_comfort",
            ComfortPreset::Balanced => "balanced",
            ComfortPreset::Performance => "performance",
        }
    }

    pub fn settings(self) -> ComfortSettings {
        match self {
            ComfortPreset::MaximumComfort => ComfortSettings {
                locomotion_mode: LocomotionMode::Teleport,
                turning_mode: TurningMode::Snap,
                snap_turn_angle: 45.0,
                reduced_motion: true,
                comfort_speed: 0.5,
                show_teleport_arc: true,
            },
            ComfortPreset::Balanced => ComfortSettings {
                locomotion_mode: LocomotionMode::Smooth,
                turning_mode: TurningMode::Snap,
                snap_turn_angle: 30.0,
                reduced_motion: false,
                comfort_speed: 0.75,
                show_teleport_arc: true,
            },
            ComfortPreset::Performance => ComfortSettings {
                locomotion_mode: LocomotionMode::Smooth,
                turning_mode: TurningMode::Smooth,
                snap_turn_angle: 30.0,
                reduced_motion: false,
                comfort_speed: 1.0,
                show_teleport_arc: true,
            },
        }
    }
}

impl fmt::Display for ComfortPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComfortPreset {
    type Err = ComfortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "maximum_comfort" | "max_comfort" | "comfort" => Ok(ComfortPreset::MaximumComfort),
            "balanced" | "default" => Ok(ComfortPreset::Balanced),
            "performance" => Ok(ComfortPreset::Performance),
            _ => Err(ComfortError::UnknownPreset(s.to_string())),
        }
    }
}

/// Owner of the active [`ComfortSettings`]
#[derive(Clone, Debug, Default)]
pub struct ComfortProfile {
    settings: ComfortSettings,
}

impl ComfortProfile {
    /// Start from `initial`, falling back to defaults field by field when a
    /// value is out of range
    pub fn new(initial: ComfortSettings) -> Self {
        let mut profile = ComfortProfile::default();
        profile.set_settings(&initial.into());
        profile
    }

    pub fn settings(&self) -> &ComfortSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, patch: &ComfortSettingsPatch) -> SettingsChange {
        let mut next = self.settings;
        let mut rejected = Vec::new();

        if let Some(mode) = patch.locomotion_mode {
            next.locomotion_mode = mode;
        }
        if let Some(mode) = patch.turning_mode {
            next.turning_mode = mode;
        }
        if let Some(angle) = patch.snap_turn_angle {
            match validate_range("snap_turn_angle", angle, SNAP_TURN_ANGLE_RANGE) {
                Ok(()) => next.snap_turn_angle = angle,
                Err(err) => rejected.push(err),
            }
        }
        if let Some(reduced_motion) = patch.reduced_motion {
            next.reduced_motion = reduced_motion;
        }
        if let Some(speed) = patch.comfort_speed {
            match validate_range("comfort_speed", speed, COMFORT_SPEED_RANGE) {
                Ok(()) => next.comfort_speed = speed,
                Err(err) => rejected.push(err),
            }
        }
        if let Some(show) = patch.show_teleport_arc {
            next.show_teleport_arc = show;
        }

        for err in &rejected {
            comfort_log!(WARN, "Ignoring comfort setting: {}", err);
        }

        self.replace(next, rejected)
    }

    /// Dynamic merge for UI collaborators that speak JSON. Accepts snake_case
    /// or camelCase keys; unknown keys and wrong types are rejected per field.
    pub fn set_settings_json(&mut self, value: &Value) -> SettingsChange {
        let Some(fields) = value.as_object() else {
            let err = ComfortError::WrongType {
                field: "settings".to_string(),
                expected: "object",
                found: json_type_name(value).to_string(),
            };
            comfort_log!(WARN, "Ignoring comfort update: {}", err);
            return SettingsChange {
                rejected: vec![err],
                ..Default::default()
            };
        };

        let mut patch = ComfortSettingsPatch::default();
        let mut rejected = Vec::new();

        for (key, value) in fields {
            let result = match key.as_str() {
                "locomotion_mode" | "locomotionMode" => expect_str(key, value)
                    .and_then(str::parse::<LocomotionMode>)
                    .map(|mode| patch.locomotion_mode = Some(mode)),
                "turning_mode" | "turningMode" => expect_str(key, value)
                    .and_then(str::parse::<TurningMode>)
                    .map(|mode| patch.turning_mode = Some(mode)),
                "snap_turn_angle" | "snapTurnAngle" => {
                    expect_number(key, value).map(|angle| patch.snap_turn_angle = Some(angle))
                }
                "reduced_motion" | "reducedMotion" => {
                    expect_bool(key, value).map(|flag| patch.reduced_motion = Some(flag))
                }
                "comfort_speed" | "comfortSpeed" => {
                    expect_number(key, value).map(|speed| patch.comfort_speed = Some(speed))
                }
                "show_teleport_arc" | "showTeleportArc" => {
                    expect_bool(key, value).map(|flag| patch.show_teleport_arc = Some(flag))
                }
                _ => Err(ComfortError::UnknownField(key.clone())),
            };

            if let Err(err) = result {
                comfort_log!(WARN, "Ignoring comfort setting: {}", err);
                rejected.push(err);
            }
        }

        let mut change = self.set_settings(&patch);
        rejected.append(&mut change.rejected);
        change.rejected = rejected;
        change
    }

    pub fn set_preset(&mut self, name: &str) -> Result<SettingsChange, ComfortError> {
        let preset = name.parse::<ComfortPreset>().inspect_err(|err| {
            comfort_log!(WARN, "{}", err);
        })?;
        comfort_log!(INFO, "Applying comfort preset {}", preset);
        Ok(self.apply_preset(preset))
    }

    pub fn apply_preset(&mut self, preset: ComfortPreset) -> SettingsChange {
        self.replace(preset.settings(), Vec::new())
    }

    fn replace(&mut self, next: ComfortSettings, rejected: Vec<ComfortError>) -> SettingsChange {
        let previous = self.settings;
        self.settings = next;

        let change = SettingsChange {
            changed: previous != next,
            locomotion_mode_changed: previous.locomotion_mode != next.locomotion_mode,
            turning_mode_changed: previous.turning_mode != next.turning_mode,
            rejected,
        };

        if change.changed {
            comfort_log!(DEBUG, "Comfort settings now {:?}", next);
        }

        change
    }
}

fn validate_range(field: &'static str, value: f32, (min, max): (f32, f32)) -> Result<(), ComfortError> {
    if !value.is_finite() {
        return Err(ComfortError::NotFinite { field });
    }
    if value <= min || value > max {
        return Err(ComfortError::OutOfRange {
            field,
            value: value as f64,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(key: &str, expected: &'static str, value: &Value) -> ComfortError {
    ComfortError::WrongType {
        field: key.to_string(),
        expected,
        found: json_type_name(value).to_string(),
    }
}

fn expect_str<'a>(key: &str, value: &'a Value) -> Result<&'a str, ComfortError> {
    value.as_str().ok_or_else(|| wrong_type(key, "string", value))
}

fn expect_bool(key: &str, value: &Value) -> Result<bool, ComfortError> {
    value.as_bool().ok_or_else(|| wrong_type(key, "boolean", value))
}

fn expect_number(key: &str, value: &Value) -> Result<f32, ComfortError> {
    value
        .as_f64()
        .map(|n| n as f32)
        .ok_or_else(|| wrong_type(key, "number", value))
}
