use cgmath::Vector3;

use crate::config::TeleportConfig;
use crate::input_context::Handedness;
use crate::input_normalizer::ControllerSample;
use crate::rig::{CameraRig, FORWARD};
use crate::teleport_log;

use super::trajectory::{ArcGeometry, ArcHit, ArcHitKind, ArcLaunch, target_distance};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TeleportPhase {
    Idle,
    Aiming {
        controller: Handedness,
        /// Strongest deflection seen during this aim; sets the distance
        max_magnitude: f32,
    },
}

/// Gesture state for the arc teleport. The aiming controller only exists
/// while the gesture is pressed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleportGestureState {
    phase: TeleportPhase,
    /// Landing floor relative to the rig, adjusted while aiming
    floor_height_offset: f32,
}

impl TeleportGestureState {
    pub fn phase(&self) -> TeleportPhase {
        self.phase
    }

    /// Always within the configured floor offset limit
    pub fn floor_height_offset(&self) -> f32 {
        self.floor_height_offset
    }

    pub fn pressed(&self) -> bool {
        matches!(self.phase, TeleportPhase::Aiming { .. })
    }

    pub fn active_controller(&self) -> Option<Handedness> {
        match self.phase {
            TeleportPhase::Aiming { controller, .. } => Some(controller),
            TeleportPhase::Idle => None,
        }
    }

    pub fn max_magnitude(&self) -> f32 {
        match self.phase {
            TeleportPhase::Aiming { max_magnitude, .. } => max_magnitude,
            TeleportPhase::Idle => 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = TeleportGestureState::default();
    }
}

impl Default for TeleportGestureState {
    fn default() -> Self {
        TeleportGestureState {
            phase: TeleportPhase::Idle,
            floor_height_offset: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// Released without a landing spot inside the allowed distance band
    NoValidTarget,
    /// The aiming controller stopped reporting usable input
    Disconnected,
    /// Locomotion mode changed mid-aim
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TeleportTransition {
    Started,
    Committed { destination: Vector3<f32> },
    Aborted(AbortReason),
}

/// Stick-driven arc teleport: push the aim stick past the press threshold
/// to start aiming, let it fall back below the release threshold to jump.
pub struct ArcTeleport {
    config: TeleportConfig,
    gesture: TeleportGestureState,
    arc: Option<ArcGeometry>,
    target_valid: bool,
}

impl ArcTeleport {
    pub fn new(config: TeleportConfig) -> Self {
        ArcTeleport {
            config,
            gesture: TeleportGestureState::default(),
            arc: None,
            target_valid: false,
        }
    }

    pub fn config(&self) -> &TeleportConfig {
        &self.config
    }

    pub fn gesture(&self) -> &TeleportGestureState {
        &self.gesture
    }

    pub fn is_aiming(&self) -> bool {
        self.gesture.pressed()
    }

    /// Current arc, only while aiming
    pub fn arc(&self) -> Option<&ArcGeometry> {
        self.arc.as_ref()
    }

    /// End of the drawn arc, which is not necessarily somewhere to land
    pub fn target(&self) -> Option<&ArcHit> {
        self.arc.as_ref().and_then(|arc| arc.hit.as_ref())
    }

    fn landing(&self, rig: &CameraRig) -> Option<Vector3<f32>> {
        self.target()
            .filter(|hit| hit.kind == ArcHitKind::FloorIntersection)
            .map(|hit| hit.position)
            .filter(|position| self.within_band(rig, *position))
    }

    /// Whether releasing now would teleport
    pub fn has_valid_target(&self) -> bool {
        self.target_valid
    }

    pub fn floor_height(&self, rig: &CameraRig) -> f32 {
        rig.position.y + self.gesture.floor_height_offset
    }

    /// Run one frame of the gesture.
    ///
    /// `aim` is this frame's sample from `aim_hand` (or `None` if it was
    /// missing or malformed); `floor_axis` is the vertical axis of the other
    /// hand, used to raise or lower the landing floor while aiming.
    pub fn update(
        &mut self,
        rig: &mut CameraRig,
        aim_hand: Handedness,
        aim: Option<&ControllerSample>,
        floor_axis: f32,
        delta_time: f32,
    ) -> Option<TeleportTransition> {
        match self.gesture.phase {
            TeleportPhase::Idle => {
                let sample = aim?;
                let magnitude = sample.magnitude();
                if magnitude < self.config.press_threshold {
                    return None;
                }

                self.gesture.phase = TeleportPhase::Aiming {
                    controller: aim_hand,
                    max_magnitude: magnitude,
                };
                self.refresh_arc(rig, sample);
                teleport_log!(DEBUG, "Aiming with {:?} hand at magnitude {:.2}", aim_hand, magnitude);
                Some(TeleportTransition::Started)
            }
            TeleportPhase::Aiming {
                controller,
                max_magnitude,
            } => {
                let Some(sample) = aim.filter(|sample| sample.handedness == controller) else {
                    teleport_log!(INFO, "{:?} controller lost while aiming, cancelling", controller);
                    self.reset();
                    return Some(TeleportTransition::Aborted(AbortReason::Disconnected));
                };

                let magnitude = sample.magnitude();
                if magnitude < self.config.release_threshold {
                    return Some(self.commit(rig));
                }

                self.gesture.phase = TeleportPhase::Aiming {
                    controller,
                    max_magnitude: max_magnitude.max(magnitude),
                };
                self.adjust_floor(floor_axis, delta_time);
                self.refresh_arc(rig, sample);
                None
            }
        }
    }

    /// Abort an in-progress aim without moving. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        let was_aiming = self.is_aiming();
        if was_aiming {
            teleport_log!(DEBUG, "Teleport aim cancelled");
        }
        self.reset();
        was_aiming
    }

    fn commit(&mut self, rig: &mut CameraRig) -> TeleportTransition {
        let transition = match self.landing(rig) {
            Some(position) => {
                // Only the horizontal position jumps; eye height is kept
                rig.position.x = position.x;
                rig.position.z = position.z;
                teleport_log!(INFO, "Teleported to {:?}", rig.position);
                TeleportTransition::Committed {
                    destination: rig.position,
                }
            }
            None => {
                teleport_log!(DEBUG, "Released without a valid target");
                TeleportTransition::Aborted(AbortReason::NoValidTarget)
            }
        };

        self.reset();
        transition
    }

    fn adjust_floor(&mut self, axis: f32, delta_time: f32) {
        if !axis.is_finite() || axis.abs() <= self.config.floor_adjust_deadzone {
            return;
        }

        let limit = self.config.floor_offset_limit;
        // Stick forward (negative y) raises the floor
        self.gesture.floor_height_offset = (self.gesture.floor_height_offset
            - axis * self.config.floor_adjust_rate * delta_time.max(0.0))
        .clamp(-limit, limit);
    }

    fn refresh_arc(&mut self, rig: &CameraRig, sample: &ControllerSample) {
        let launch = ArcLaunch {
            origin: sample.pose.position,
            direction: sample.pose.orientation * FORWARD,
            fallback_heading: rig.forward(),
        };
        let distance = target_distance(self.gesture.max_magnitude(), &self.config);
        let arc = ArcGeometry::simulate(
            &launch,
            rig.position,
            self.floor_height(rig),
            distance,
            &self.config,
        );

        self.arc = Some(arc);
        self.target_valid = self.landing(rig).is_some();
    }

    fn within_band(&self, rig: &CameraRig, position: Vector3<f32>) -> bool {
        let distance = rig.horizontal_distance_to(position);
        distance >= self.config.min_distance && distance <= self.config.max_distance
    }

    fn reset(&mut self) {
        self.gesture.reset();
        self.arc = None;
        self.target_valid = false;
    }
}

impl Default for ArcTeleport {
    fn default() -> Self {
        ArcTeleport::new(TeleportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_context::Pose;
    use cgmath::{Quaternion, Rad, Rotation3, vec3};

    const FRAME: f32 = 1.0 / 72.0;

    fn aim(magnitude: f32, pitch: f32) -> ControllerSample {
        ControllerSample {
            handedness: Handedness::Left,
            axis_x: 0.0,
            axis_y: -magnitude,
            grip_pressed: false,
            pose: Pose {
                position: vec3(-0.2, 1.2, -0.3),
                orientation: Quaternion::from_angle_x(Rad(pitch)),
            },
        }
    }

    fn step(
        teleport: &mut ArcTeleport,
        rig: &mut CameraRig,
        sample: ControllerSample,
    ) -> Option<TeleportTransition> {
        teleport.update(rig, Handedness::Left, Some(&sample), 0.0, FRAME)
    }

    #[test]
    fn test_press_release_hysteresis() {
        let config = TeleportConfig::default();
        assert!(config.press_threshold > config.release_threshold);

        let mut teleport = ArcTeleport::default();
        let mut rig = CameraRig::default();

        assert_eq!(step(&mut teleport, &mut rig, aim(0.69, 0.3)), None);
        assert!(!teleport.gesture().pressed());

        assert_eq!(
            step(&mut teleport, &mut rig, aim(0.7, 0.3)),
            Some(TeleportTransition::Started)
        );

        for magnitude in [0.65, 0.5, 0.4, 0.31, 0.3] {
            assert_eq!(step(&mut teleport, &mut rig, aim(magnitude, 0.3)), None);
            assert!(teleport.gesture().pressed(), "released at {magnitude}");
            assert_eq!(teleport.gesture().active_controller(), Some(Handedness::Left));
        }

        assert!(step(&mut teleport, &mut rig, aim(0.29, 0.3)).is_some());
        assert!(!teleport.gesture().pressed());
        assert_eq!(teleport.gesture().active_controller(), None);
    }

    #[test]
    fn test_max_magnitude_sets_distance() {
        let mut teleport = ArcTeleport::default();
        let mut rig = CameraRig::default();

        step(&mut teleport, &mut rig, aim(1.0, 0.3));
        let far = teleport.target().unwrap().position;

        // Easing off the stick does not pull the arc back in
        step(&mut teleport, &mut rig, aim(0.75, 0.3));
        assert_eq!(teleport.gesture().max_magnitude(), 1.0);
        let still_far = teleport.target().unwrap().position;
        assert!((rig.horizontal_distance_to(far) - rig.horizontal_distance_to(still_far)).abs() < 1e-3);
        assert!(rig.horizontal_distance_to(still_far) > 25.0);
    }

    #[test]
    fn test_commit_moves_horizontally_only() {
        let mut teleport = ArcTeleport::default();
        let mut rig = CameraRig::new(vec3(2.0, 1.75, -1.0), 0.0);
        let sample = |magnitude| ControllerSample {
            pose: Pose {
                position: rig_relative(vec3(2.0, 1.75, -1.0), vec3(0.2, 1.1, -0.2)),
                orientation: Quaternion::from_angle_x(Rad(0.4)),
            },
            ..aim(magnitude, 0.4)
        };

        step(&mut teleport, &mut rig, sample(0.9));
        let target = teleport.target().unwrap().position;
        assert!(teleport.has_valid_target());

        let transition = step(&mut teleport, &mut rig, sample(0.0));
        let expected = vec3(target.x, 1.75, target.z);
        assert_eq!(
            transition,
            Some(TeleportTransition::Committed {
                destination: expected
            })
        );
        assert_eq!(rig.position, expected);
        assert!(teleport.arc().is_none());
    }

    fn rig_relative(rig: Vector3<f32>, local: Vector3<f32>) -> Vector3<f32> {
        rig + local
    }

    #[test]
    fn test_floor_adjustment_clamped_and_reset() {
        let mut teleport = ArcTeleport::default();
        let mut rig = CameraRig::default();

        step(&mut teleport, &mut rig, aim(0.8, 0.3));
        for _ in 0..2000 {
            teleport.update(&mut rig, Handedness::Left, Some(&aim(0.8, 0.3)), 1.0, FRAME);
        }
        assert_eq!(teleport.gesture().floor_height_offset(), -10.0);
        assert_eq!(teleport.floor_height(&rig), -10.0);

        // Small input inside the adjustment deadzone is ignored
        teleport.update(&mut rig, Handedness::Left, Some(&aim(0.8, 0.3)), -0.05, FRAME);
        assert_eq!(teleport.gesture().floor_height_offset(), -10.0);

        for _ in 0..2000 {
            teleport.update(&mut rig, Handedness::Left, Some(&aim(0.8, 0.3)), -1.0, FRAME);
        }
        assert_eq!(teleport.gesture().floor_height_offset(), 10.0);

        teleport.cancel();
        assert_eq!(teleport.gesture().floor_height_offset(), 0.0);
    }

    #[test]
    fn test_floor_offset_moves_landing_height() {
        let mut teleport = ArcTeleport::default();
        let mut rig = CameraRig::default();

        step(&mut teleport, &mut rig, aim(0.8, 0.3));
        for _ in 0..72 {
            teleport.update(&mut rig, Handedness::Left, Some(&aim(0.8, 0.3)), 1.0, FRAME);
        }
        let offset = teleport.gesture().floor_height_offset();
        assert!((offset + 1.5).abs() < 1e-3);
        assert!((teleport.target().unwrap().position.y - offset).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_band_release_aborts() {
        let mut config = TeleportConfig::default();
        config.min_distance = 8.0;
        let mut teleport = ArcTeleport::new(config);
        let mut rig = CameraRig::default();

        // Barely past the press threshold lands at min distance measured from
        // the controller, which sits behind the rig's origin here
        let mut sample = aim(0.7, 0.3);
        sample.pose.position = vec3(0.0, 1.2, 0.5);
        step(&mut teleport, &mut rig, sample);
        assert!(!teleport.has_valid_target());

        let mut release = sample;
        release.axis_y = 0.0;
        assert_eq!(
            step(&mut teleport, &mut rig, release),
            Some(TeleportTransition::Aborted(AbortReason::NoValidTarget))
        );
        assert_eq!(rig.position, CameraRig::default().position);
    }

    #[test]
    fn test_unreachable_floor_aborts_without_moving() {
        let mut teleport = ArcTeleport::default();
        let mut rig = CameraRig::default();

        step(&mut teleport, &mut rig, aim(0.7, 0.3));
        for _ in 0..1000 {
            teleport.update(&mut rig, Handedness::Left, Some(&aim(0.7, 0.3)), -1.0, FRAME);
        }
        assert_eq!(teleport.gesture().floor_height_offset(), 10.0);

        // The arc is still drawn, but its end is only a distance cut
        let end = teleport.target().unwrap();
        assert_eq!(end.kind, ArcHitKind::DistanceLimit);
        assert!(!teleport.has_valid_target());

        assert_eq!(
            step(&mut teleport, &mut rig, aim(0.0, 0.3)),
            Some(TeleportTransition::Aborted(AbortReason::NoValidTarget))
        );
        assert_eq!(rig.position, CameraRig::default().position);
    }

    #[test]
    fn test_disconnect_and_cancel() {
        let mut teleport = ArcTeleport::default();
        let mut rig = CameraRig::default();

        step(&mut teleport, &mut rig, aim(0.9, 0.3));
        assert_eq!(
            teleport.update(&mut rig, Handedness::Left, None, 0.0, FRAME),
            Some(TeleportTransition::Aborted(AbortReason::Disconnected))
        );
        assert!(!teleport.is_aiming());

        step(&mut teleport, &mut rig, aim(0.9, 0.3));
        assert!(teleport.cancel());
        assert!(!teleport.cancel());
        assert!(teleport.arc().is_none());
        assert_eq!(rig.position, CameraRig::default().position);
    }
}
