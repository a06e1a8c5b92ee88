use cgmath::{Quaternion, Vector3};

use crate::comfort::{ComfortSettings, TurningMode};
use crate::config::SmoothConfig;
use crate::movement_state::MovementRampState;
use crate::rig::{CameraRig, FORWARD, UP, horizontal_direction};
use crate::teleport::SnapTurn;

/// Ramp-up runs at this fraction of its normal rate with reduced motion on
const REDUCED_MOTION_RAMP_SCALE: f32 = 0.5;

/// Continuous stick locomotion: camera-relative walking on one stick,
/// turning and vertical flight on the other.
#[derive(Clone, Debug)]
pub struct SmoothLocomotion {
    config: SmoothConfig,
    ramp: MovementRampState,
}

impl SmoothLocomotion {
    pub fn new(config: SmoothConfig) -> Self {
        SmoothLocomotion {
            config,
            ramp: MovementRampState::default(),
        }
    }

    pub fn config(&self) -> &SmoothConfig {
        &self.config
    }

    pub fn ramp(&self) -> &MovementRampState {
        &self.ramp
    }

    /// Ease speed and boost toward this frame's targets. Call once per frame
    /// before moving the rig.
    pub fn update_ramp(
        &mut self,
        translating: bool,
        boost_held: bool,
        settings: &ComfortSettings,
        delta_time: f32,
    ) {
        let (speed_rate, boosted) = if settings.reduced_motion {
            (self.config.speed_ramp_rate * REDUCED_MOTION_RAMP_SCALE, false)
        } else {
            (self.config.speed_ramp_rate, boost_held)
        };

        self.ramp.step(
            translating,
            boosted,
            speed_rate,
            self.config.boost_ramp_rate,
            delta_time,
        );
    }

    pub fn boost_multiplier(&self) -> f32 {
        1.0 + (self.config.boost_factor - 1.0) * self.ramp.current_boost
    }

    /// Full-ramp speed in world units per second under the current boost
    pub fn speed_scale(&self, settings: &ComfortSettings) -> f32 {
        self.config.base_speed * self.boost_multiplier() * settings.comfort_speed
    }

    /// Horizontal forward and right vectors for the current view. Looking
    /// straight up or down falls back to the rig's own heading.
    pub fn movement_basis(rig: &CameraRig, head_rotation: Quaternion<f32>) -> (Vector3<f32>, Vector3<f32>) {
        let view_forward = (rig.rotation() * head_rotation) * FORWARD;
        let forward = horizontal_direction(view_forward).unwrap_or_else(|| rig.forward());
        let right = forward.cross(UP);
        (forward, right)
    }

    /// Walk the rig along the view's horizontal plane. Returns the applied offset.
    pub fn translate(
        &self,
        rig: &mut CameraRig,
        head_rotation: Quaternion<f32>,
        axis_x: f32,
        axis_y: f32,
        settings: &ComfortSettings,
        delta_time: f32,
    ) -> Vector3<f32> {
        let (forward, right) = Self::movement_basis(rig, head_rotation);
        let speed = self.speed_scale(settings) * self.ramp.current_speed * delta_time;
        let offset = forward * (-axis_y * speed) + right * (axis_x * speed);
        rig.position += offset;
        offset
    }

    /// Turn the rig. Smooth turning uses the low-pass filtered axis and a
    /// clamped frame time; snap turning hands the raw axis to `snap`.
    /// Returns the applied yaw change.
    pub fn turn(
        &self,
        rig: &mut CameraRig,
        smoothed_x: f32,
        raw_x: f32,
        settings: &ComfortSettings,
        delta_time: f32,
        snap: &mut SnapTurn,
    ) -> f32 {
        match settings.turning_mode {
            TurningMode::Smooth => {
                let delta = -smoothed_x * self.config.turn_speed * delta_time.min(self.config.max_turn_delta);
                if delta != 0.0 {
                    rig.rotate_yaw(delta);
                }
                delta
            }
            TurningMode::Snap => snap
                .update(rig, raw_x, settings.snap_turn_angle, delta_time)
                .unwrap_or(0.0),
        }
    }

    /// Vertical flight; pushing the stick forward rises. Unbounded.
    pub fn fly(&self, rig: &mut CameraRig, axis_y: f32, delta_time: f32) -> f32 {
        let delta = -axis_y * self.config.vertical_speed * self.boost_multiplier() * delta_time;
        rig.position.y += delta;
        delta
    }

    pub fn reset(&mut self) {
        self.ramp.reset();
    }
}

impl Default for SmoothLocomotion {
    fn default() -> Self {
        SmoothLocomotion::new(SmoothConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, One, Rad, Rotation3, Zero, vec3};
    use std::f32::consts::PI;

    const FRAME: f32 = 1.0 / 72.0;

    fn full_ramp(locomotion: &mut SmoothLocomotion, boost: bool, settings: &ComfortSettings) {
        for _ in 0..720 {
            locomotion.update_ramp(true, boost, settings, FRAME);
        }
    }

    #[test]
    fn test_basis_ignores_pitch() {
        let rig = CameraRig::default();
        let head = Quaternion::from_angle_x(Rad(-1.2));
        let (forward, right) = SmoothLocomotion::movement_basis(&rig, head);
        assert!((forward - vec3(0.0, 0.0, -1.0)).magnitude() < 1e-5);
        assert!((right - vec3(1.0, 0.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_basis_follows_rig_and_head_yaw() {
        let rig = CameraRig::new(Vector3::zero(), PI / 4.0);
        let head = Quaternion::from_angle_y(Rad(PI / 4.0));
        let (forward, right) = SmoothLocomotion::movement_basis(&rig, head);
        assert!((forward - vec3(-1.0, 0.0, 0.0)).magnitude() < 1e-5);
        assert!((right - vec3(0.0, 0.0, -1.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_basis_straight_up_falls_back_to_rig() {
        let rig = CameraRig::new(Vector3::zero(), PI / 2.0);
        let head = Quaternion::from_angle_x(Rad(PI / 2.0));
        let (forward, _) = SmoothLocomotion::movement_basis(&rig, head);
        assert!((forward - vec3(-1.0, 0.0, 0.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_translate_speed() {
        let settings = ComfortSettings::default();
        let mut locomotion = SmoothLocomotion::default();
        full_ramp(&mut locomotion, false, &settings);

        let mut rig = CameraRig::default();
        let offset = locomotion.translate(&mut rig, Quaternion::one(), 0.0, -1.0, &settings, 0.5);
        assert!((offset - vec3(0.0, 0.0, -1.0)).magnitude() < 1e-4);
        assert_eq!(rig.position, offset);

        let offset = locomotion.translate(&mut rig, Quaternion::one(), 1.0, 0.0, &settings, 0.5);
        assert!((offset - vec3(1.0, 0.0, 0.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_boost_and_comfort_speed() {
        let settings = ComfortSettings {
            comfort_speed: 0.5,
            ..Default::default()
        };
        let mut locomotion = SmoothLocomotion::default();
        full_ramp(&mut locomotion, true, &settings);

        assert!((locomotion.boost_multiplier() - 3.0).abs() < 1e-3);
        // 2.0 base * 3.0 boost * 0.5 comfort
        assert!((locomotion.speed_scale(&settings) - 3.0).abs() < 1e-2);
    }

    #[test]
    fn test_reduced_motion_disables_boost() {
        let settings = ComfortSettings {
            reduced_motion: true,
            ..Default::default()
        };
        let mut locomotion = SmoothLocomotion::default();
        locomotion.update_ramp(true, true, &settings, FRAME);
        let reduced_speed = locomotion.ramp().current_speed;

        full_ramp(&mut locomotion, true, &settings);
        assert_eq!(locomotion.boost_multiplier(), 1.0);
        assert!(!locomotion.ramp().is_boosted());

        let mut normal = SmoothLocomotion::default();
        normal.update_ramp(true, false, &ComfortSettings::default(), FRAME);
        assert!(reduced_speed < normal.ramp().current_speed);
    }

    #[test]
    fn test_smooth_turn_clamps_frame_time() {
        let settings = ComfortSettings::default();
        let locomotion = SmoothLocomotion::default();
        let mut snap = SnapTurn::default();
        let mut rig = CameraRig::default();

        let delta = locomotion.turn(&mut rig, 1.0, 1.0, &settings, 0.5, &mut snap);
        let expected = -locomotion.config().turn_speed / 30.0;
        assert!((delta - expected).abs() < 1e-6);
        assert!((rig.yaw() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_snap_mode_delegates() {
        let settings = ComfortSettings {
            turning_mode: TurningMode::Snap,
            snap_turn_angle: 90.0,
            ..Default::default()
        };
        let locomotion = SmoothLocomotion::default();
        let mut snap = SnapTurn::default();
        let mut rig = CameraRig::default();

        // Smoothed value is ignored in snap mode
        assert_eq!(locomotion.turn(&mut rig, 0.9, 0.5, &settings, FRAME, &mut snap), 0.0);
        let delta = locomotion.turn(&mut rig, 0.0, -0.9, &settings, FRAME, &mut snap);
        assert!((delta - PI / 2.0).abs() < 1e-6);
        assert!(snap.is_cooling_down());
    }

    #[test]
    fn test_fly() {
        let locomotion = SmoothLocomotion::default();
        let mut rig = CameraRig::default();
        locomotion.fly(&mut rig, -1.0, 1.0);
        assert!((rig.position.y - 1.5).abs() < 1e-6);
        locomotion.fly(&mut rig, 1.0, 2.0);
        assert!((rig.position.y + 1.5).abs() < 1e-6);
    }
}
