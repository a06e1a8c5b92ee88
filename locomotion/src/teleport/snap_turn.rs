use crate::config::SnapTurnConfig;
use crate::rig::CameraRig;
use crate::teleport_log;

/// Discrete fixed-angle turning with a cooldown between snaps. Shared by
/// smooth locomotion and teleport mode.
#[derive(Clone, Debug)]
pub struct SnapTurn {
    config: SnapTurnConfig,
    cooldown_remaining: f32,
}

impl SnapTurn {
    pub fn new(config: SnapTurnConfig) -> Self {
        SnapTurn {
            config,
            cooldown_remaining: 0.0,
        }
    }

    /// Advance the cooldown by `delta_time` and snap when `axis_x` is past
    /// the threshold. Pushing right turns right. Returns the applied yaw
    /// change in radians.
    pub fn update(
        &mut self,
        rig: &mut CameraRig,
        axis_x: f32,
        angle_degrees: f32,
        delta_time: f32,
    ) -> Option<f32> {
        self.cooldown_remaining = (self.cooldown_remaining - delta_time.max(0.0)).max(0.0);

        if !axis_x.is_finite() || axis_x.abs() < self.config.threshold || self.cooldown_remaining > 0.0 {
            return None;
        }

        let step = -axis_x.signum() * angle_degrees.to_radians();
        rig.rotate_yaw(step);
        self.cooldown_remaining = self.config.cooldown;

        teleport_log!(DEBUG, "Snap turn {:.1} deg, yaw now {:.3}", step.to_degrees(), rig.yaw());
        Some(step)
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown_remaining > 0.0
    }

    pub fn reset(&mut self) {
        self.cooldown_remaining = 0.0;
    }
}

impl Default for SnapTurn {
    fn default() -> Self {
        SnapTurn::new(SnapTurnConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const FRAME: f32 = 1.0 / 72.0;

    #[test]
    fn test_ignores_weak_input() {
        let mut snap = SnapTurn::default();
        let mut rig = CameraRig::default();
        assert_eq!(snap.update(&mut rig, 0.69, 30.0, FRAME), None);
        assert_eq!(snap.update(&mut rig, -0.5, 30.0, FRAME), None);
        assert_eq!(rig.yaw(), 0.0);
    }

    #[test]
    fn test_direction_and_angle() {
        let mut snap = SnapTurn::default();
        let mut rig = CameraRig::default();

        let step = snap.update(&mut rig, 0.9, 45.0, FRAME).unwrap();
        assert!((step + PI / 4.0).abs() < 1e-6);
        assert!((rig.yaw() + PI / 4.0).abs() < 1e-6);

        snap.reset();
        snap.update(&mut rig, -1.0, 90.0, FRAME).unwrap();
        assert!((rig.yaw() - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_cooldown_between_snaps() {
        let mut snap = SnapTurn::default();
        let mut rig = CameraRig::default();

        assert!(snap.update(&mut rig, 1.0, 30.0, FRAME).is_some());

        // Held for just under the cooldown: no second snap
        let mut snaps = 0;
        for _ in 0..35 {
            if snap.update(&mut rig, 1.0, 30.0, FRAME).is_some() {
                snaps += 1;
            }
        }
        assert_eq!(snaps, 0);
        assert!(snap.is_cooling_down());

        let mut frames = 0;
        while snap.update(&mut rig, 1.0, 30.0, FRAME).is_none() {
            frames += 1;
            assert!(frames < 10);
        }
    }

    #[test]
    fn test_yaw_stays_wrapped() {
        let mut snap = SnapTurn::default();
        let mut rig = CameraRig::default();
        for _ in 0..50 {
            snap.update(&mut rig, 1.0, 90.0, 1.0);
            assert!(rig.yaw() > -PI && rig.yaw() <= PI);
        }
    }
}
