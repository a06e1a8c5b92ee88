use crate::config::InputConfig;
use crate::input_context::{ControllerPoses, Handedness, Pose, RawControllerState};
use crate::input_log;

/// Smoothed turn values this close to zero snap to zero
const TURN_REST_EPSILON: f32 = 1e-3;
const GRIP_BUTTON: usize = 1;

/// Clean per-hand input for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControllerSample {
    pub handedness: Handedness,
    pub axis_x: f32,
    pub axis_y: f32,
    pub grip_pressed: bool,
    pub pose: Pose,
}

impl ControllerSample {
    pub fn magnitude(&self) -> f32 {
        (self.axis_x * self.axis_x + self.axis_y * self.axis_y).sqrt()
    }

    pub fn is_neutral(&self) -> bool {
        self.axis_x == 0.0 && self.axis_y == 0.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizedInput {
    pub left: Option<ControllerSample>,
    pub right: Option<ControllerSample>,
}

impl NormalizedInput {
    pub fn hand(&self, handedness: Handedness) -> Option<&ControllerSample> {
        match handedness {
            Handedness::Left => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }
}

/// Zero `value` when its magnitude is below `deadzone`; the boundary itself
/// passes through unchanged
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone { 0.0 } else { value }
}

/// Deadzone filtering for every stick plus low-pass smoothing of turn input
#[derive(Clone, Debug)]
pub struct InputNormalizer {
    config: InputConfig,
    /// Last smoothed turn output, indexed by hand
    smoothed_turn: [f32; 2],
}

impl InputNormalizer {
    pub fn new(config: InputConfig) -> Self {
        InputNormalizer {
            config,
            smoothed_turn: [0.0; 2],
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn sample_frame(&mut self, poses: &ControllerPoses) -> NormalizedInput {
        let left = poses
            .left
            .as_ref()
            .and_then(|raw| self.sample_slot(Handedness::Left, raw));
        let right = poses
            .right
            .as_ref()
            .and_then(|raw| self.sample_slot(Handedness::Right, raw));

        NormalizedInput { left, right }
    }

    fn sample_slot(&self, slot: Handedness, raw: &RawControllerState) -> Option<ControllerSample> {
        if raw.handedness != slot {
            input_log!(
                WARN,
                "Controller reporting {:?} arrived in the {:?} slot, skipping",
                raw.handedness,
                slot
            );
            return None;
        }
        self.sample(raw)
    }

    /// Deadzoned sample for one controller, or `None` when its axes are
    /// missing or garbage. Malformed input never propagates as an error.
    pub fn sample(&self, raw: &RawControllerState) -> Option<ControllerSample> {
        let (x, y) = match raw.axes.as_slice() {
            [_, _, x, y, ..] => (*x, *y),
            [x, y] => (*x, *y),
            axes => {
                input_log!(
                    DEBUG,
                    "{:?} controller has {} axes, skipping frame",
                    raw.handedness,
                    axes.len()
                );
                return None;
            }
        };

        if !x.is_finite() || !y.is_finite() {
            input_log!(WARN, "{:?} controller reported non-finite axes", raw.handedness);
            return None;
        }

        let grip_pressed = raw
            .buttons
            .get(GRIP_BUTTON)
            .is_some_and(|button| button.pressed);

        Some(ControllerSample {
            handedness: raw.handedness,
            axis_x: apply_deadzone(x, self.config.deadzone),
            axis_y: apply_deadzone(y, self.config.deadzone),
            grip_pressed,
            pose: raw.pose,
        })
    }

    /// Low-pass filtered turn axis for `hand`. Pass `None` when the hand had
    /// no usable input this frame; the stored value then decays toward zero.
    pub fn smoothed_turn(&mut self, hand: Handedness, axis_x: Option<f32>) -> f32 {
        let alpha = self.config.turn_smoothing;
        let previous = self.smoothed_turn[hand.index()];

        let next = match axis_x {
            Some(x) if x != 0.0 => previous * (1.0 - alpha) + x * alpha,
            _ => {
                let decayed = previous * (1.0 - alpha);
                if decayed.abs() < TURN_REST_EPSILON { 0.0 } else { decayed }
            }
        };

        self.smoothed_turn[hand.index()] = next;
        next
    }

    pub fn reset(&mut self) {
        self.smoothed_turn = [0.0; 2];
    }
}

impl Default for InputNormalizer {
    fn default() -> Self {
        InputNormalizer::new(InputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stick(x: f32, y: f32) -> RawControllerState {
        RawControllerState::new(Handedness::Left).with_thumbstick(x, y)
    }

    #[test]
    fn test_deadzone_zeroes_small_values() {
        for value in [0.0, 0.05, -0.1, 0.1499, -0.1499] {
            assert_eq!(apply_deadzone(value, 0.15), 0.0);
        }
    }

    #[test]
    fn test_deadzone_passes_boundary_and_above() {
        for value in [0.15, -0.15, 0.5, -0.99, 1.0] {
            assert_eq!(apply_deadzone(value, 0.15), value);
        }
    }

    #[test]
    fn test_sample_reads_standard_layout() {
        let normalizer = InputNormalizer::default();
        let sample = normalizer.sample(&stick(0.5, -0.1).with_grip(true)).unwrap();
        assert_eq!(sample.axis_x, 0.5);
        assert_eq!(sample.axis_y, 0.0);
        assert!(sample.grip_pressed);
    }

    #[test]
    fn test_sample_reads_two_axis_pad() {
        let normalizer = InputNormalizer::default();
        let mut raw = RawControllerState::new(Handedness::Right);
        raw.axes = vec![-0.6, 0.8];
        raw.buttons.clear();

        let sample = normalizer.sample(&raw).unwrap();
        assert_eq!((sample.axis_x, sample.axis_y), (-0.6, 0.8));
        assert!(!sample.grip_pressed);
    }

    #[test]
    fn test_malformed_axes_are_skipped() {
        let normalizer = InputNormalizer::default();

        let mut short = RawControllerState::new(Handedness::Left);
        short.axes = vec![0.9];
        assert!(normalizer.sample(&short).is_none());

        let mut three = RawControllerState::new(Handedness::Left);
        three.axes = vec![0.9, 0.9, 0.9];
        assert!(normalizer.sample(&three).is_none());

        assert!(normalizer.sample(&stick(f32::NAN, 0.0)).is_none());
    }

    #[test]
    fn test_mismatched_slot_is_skipped() {
        let mut normalizer = InputNormalizer::default();
        let poses = ControllerPoses::new(
            Some(RawControllerState::new(Handedness::Right).with_thumbstick(1.0, 0.0)),
            None,
        );
        let input = normalizer.sample_frame(&poses);
        assert!(input.left.is_none());
        assert!(input.right.is_none());
    }

    #[test]
    fn test_turn_smoothing_blends() {
        let mut normalizer = InputNormalizer::default();
        let first = normalizer.smoothed_turn(Handedness::Right, Some(1.0));
        assert!((first - 0.1).abs() < 1e-6);
        let second = normalizer.smoothed_turn(Handedness::Right, Some(1.0));
        assert!((second - 0.19).abs() < 1e-6);

        // Hands are tracked separately
        assert_eq!(normalizer.smoothed_turn(Handedness::Left, None), 0.0);
    }

    #[test]
    fn test_turn_smoothing_decays_to_zero() {
        let mut normalizer = InputNormalizer::default();
        for _ in 0..60 {
            normalizer.smoothed_turn(Handedness::Right, Some(1.0));
        }

        let released = normalizer.smoothed_turn(Handedness::Right, Some(0.0));
        assert!(released > 0.5, "should decay, not snap: {released}");

        let mut value = released;
        for _ in 0..200 {
            let next = normalizer.smoothed_turn(Handedness::Right, None);
            assert!(next <= value);
            value = next;
        }
        assert_eq!(value, 0.0);
    }
}
