use std::path::Path;

use anyhow::{Context, Result};
use cgmath::{Quaternion, Rad, Rotation3, Vector3, vec3};
use locomotion::{
    CameraRig, ControllerPoses, Handedness, LocomotionCoordinator, LocomotionEvent,
    RawControllerState, SessionState,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

pub const DEFAULT_FRAME_TIME: f32 = 1.0 / 72.0;

/// A scripted run: a starting rig plus a list of held inputs
#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_frame_time")]
    pub dt: f32,
    #[serde(default)]
    pub rig: RigStart,
    /// Comfort preset applied before the first frame
    #[serde(default)]
    pub preset: Option<String>,
    /// Comfort settings patch applied before the first frame
    #[serde(default)]
    pub settings: Option<Value>,
    pub frames: Vec<FrameInput>,
}

fn default_frame_time() -> f32 {
    DEFAULT_FRAME_TIME
}

#[derive(Debug, Default, Deserialize)]
pub struct RigStart {
    #[serde(default)]
    pub position: [f32; 3],
    /// Degrees
    #[serde(default)]
    pub yaw: f32,
}

impl RigStart {
    pub fn build(&self) -> CameraRig {
        CameraRig::new(Vector3::from(self.position), self.yaw.to_radians())
    }
}

/// Input held for `repeat` frames. Settings changes apply once, before the
/// first of those frames.
#[derive(Debug, Deserialize)]
pub struct FrameInput {
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default)]
    pub dt: Option<f32>,
    #[serde(default)]
    pub left: Option<HandInput>,
    #[serde(default)]
    pub right: Option<HandInput>,
    /// Head pitch and yaw relative to the rig, degrees
    #[serde(default)]
    pub head: [f32; 2],
    #[serde(default)]
    pub session: Option<SessionState>,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub settings: Option<Value>,
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Default, Deserialize)]
pub struct HandInput {
    #[serde(default)]
    pub stick: [f32; 2],
    #[serde(default)]
    pub grip: bool,
    /// Controller position relative to the rig; a hip-height default otherwise
    #[serde(default)]
    pub offset: Option<[f32; 3]>,
    /// Controller pitch, degrees (positive aims up)
    #[serde(default)]
    pub pitch: f32,
}

impl HandInput {
    fn raw_state(&self, handedness: Handedness, rig: &CameraRig) -> RawControllerState {
        let offset = self.offset.map(Vector3::from).unwrap_or_else(|| match handedness {
            Handedness::Left => vec3(-0.2, 1.2, -0.25),
            Handedness::Right => vec3(0.2, 1.2, -0.25),
        });
        let orientation = rig.rotation() * Quaternion::from_angle_x(Rad(self.pitch.to_radians()));

        RawControllerState::new(handedness)
            .with_thumbstick(self.stick[0], self.stick[1])
            .with_grip(self.grip)
            .with_pose(rig.position + rig.rotation() * offset, orientation)
    }
}

impl FrameInput {
    /// Controller snapshot for this frame, posed relative to where the rig is now
    pub fn poses(&self, rig: &CameraRig) -> ControllerPoses {
        let mut poses = ControllerPoses::new(
            self.left
                .as_ref()
                .map(|hand| hand.raw_state(Handedness::Left, rig)),
            self.right
                .as_ref()
                .map(|hand| hand.raw_state(Handedness::Right, rig)),
        );
        poses.head_rotation = Quaternion::from_angle_y(Rad(self.head[1].to_radians()))
            * Quaternion::from_angle_x(Rad(self.head[0].to_radians()));
        if let Some(session) = self.session {
            poses.session = session;
        }
        poses
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
    }

    pub fn total_frames(&self) -> u64 {
        self.frames.iter().map(|frame| u64::from(frame.repeat)).sum()
    }

    /// Built-in demo by name
    pub fn builtin(name: &str) -> Option<Scenario> {
        let scenario = match name {
            "smooth" => json!({
                "name": "smooth",
                "frames": [
                    { "repeat": 72, "left": { "stick": [0.0, -1.0] } },
                    { "repeat": 36, "left": { "stick": [0.0, -1.0], "grip": true } },
                    { "repeat": 36, "right": { "stick": [0.8, 0.0] } },
                    { "repeat": 4 }
                ]
            }),
            "teleport" => json!({
                "name": "teleport",
                "settings": { "locomotionMode": "teleport" },
                "frames": [
                    { "repeat": 20, "left": { "stick": [0.0, -0.8], "pitch": 20.0 } },
                    { "repeat": 20, "left": { "stick": [0.0, -0.8], "pitch": 20.0 }, "right": { "stick": [0.0, -1.0] } },
                    { "repeat": 2, "left": {} }
                ]
            }),
            "mode-switch" => json!({
                "name": "mode-switch",
                "settings": { "locomotionMode": "teleport" },
                "frames": [
                    { "repeat": 10, "left": { "stick": [0.0, -0.9], "pitch": 20.0 } },
                    { "repeat": 10, "left": { "stick": [0.0, -0.9], "pitch": 20.0 },
                      "settings": { "locomotionMode": "smooth" } },
                    { "repeat": 3, "left": {} }
                ]
            }),
            _ => return None,
        };

        serde_json::from_value(scenario).ok()
    }
}

pub const BUILTIN_DEMOS: [&str; 3] = ["smooth", "teleport", "mode-switch"];

/// Where a scenario left the rig
pub struct Playback {
    pub frames: u64,
    pub rig: CameraRig,
}

impl Scenario {
    /// Drive `coordinator` through every frame, handing each returned event
    /// to `on_event` with its frame index and elapsed time
    pub fn play<F>(&self, coordinator: &mut LocomotionCoordinator, mut on_event: F) -> Result<Playback>
    where
        F: FnMut(u64, f32, &LocomotionEvent) -> Result<()>,
    {
        let mut rig = self.rig.build();
        apply_settings(coordinator, self.preset.as_deref(), self.settings.as_ref())?;

        let mut frame_index: u64 = 0;
        let mut elapsed = 0.0f32;

        for frame in &self.frames {
            apply_settings(coordinator, frame.preset.as_deref(), frame.settings.as_ref())?;
            let dt = frame.dt.unwrap_or(self.dt);

            for _ in 0..frame.repeat {
                let poses = frame.poses(&rig);
                for event in coordinator.update(&mut rig, dt, &poses) {
                    on_event(frame_index, elapsed, &event)?;
                }
                frame_index += 1;
                elapsed += dt;
            }
        }

        Ok(Playback {
            frames: frame_index,
            rig,
        })
    }
}

fn apply_settings(
    coordinator: &mut LocomotionCoordinator,
    preset: Option<&str>,
    settings: Option<&Value>,
) -> Result<()> {
    if let Some(preset) = preset {
        coordinator
            .set_comfort_preset(preset)
            .with_context(|| format!("Failed to apply preset '{}'", preset))?;
    }
    if let Some(settings) = settings {
        let change = coordinator.set_comfort_settings_json(settings);
        for rejected in &change.rejected {
            warn!("Scenario setting rejected: {}", rejected);
        }
    }
    Ok(())
}
