use serde::{Deserialize, Serialize};

use crate::events::MovementUpdate;

/// Neutral frames required before movement is reported as stopped
const STOP_AFTER_NEUTRAL_FRAMES: u32 = 2;

/// Speed and boost levels eased toward their targets every frame.
/// Both stay in [0, 1]; callers scale them into world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementRampState {
    pub current_speed: f32,
    pub target_speed: f32,
    pub current_boost: f32,
    pub target_boost: f32,
}

impl MovementRampState {
    pub fn step(&mut self, moving: bool, boosted: bool, speed_rate: f32, boost_rate: f32, delta_time: f32) {
        self.target_speed = if moving { 1.0 } else { 0.0 };
        self.target_boost = if boosted { 1.0 } else { 0.0 };

        self.current_speed = approach(self.current_speed, self.target_speed, speed_rate, delta_time);
        self.current_boost = approach(self.current_boost, self.target_boost, boost_rate, delta_time)
            .clamp(0.0, 1.0);
    }

    pub fn is_boosted(&self) -> bool {
        self.target_boost > 0.0
    }

    pub fn reset(&mut self) {
        *self = MovementRampState::default();
    }
}

/// Exponential approach of `current` toward `target` at `rate` per second.
/// Never overshoots and never goes negative for non-negative inputs.
pub fn approach(current: f32, target: f32, rate: f32, delta_time: f32) -> f32 {
    let t = 1.0 - (-rate * delta_time.max(0.0)).exp();
    let next = current + (target - current) * t;
    if (next - target).abs() < 1e-4 { target } else { next.max(0.0) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementTransition {
    Started,
    Stopped,
}

/// Edge detector for "is the player moving". Any input path (sticks today,
/// hand gestures if a host adds them) feeds it one activity flag per frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct MovementTracker {
    is_moving: bool,
    neutral_frames: u32,
}

impl MovementTracker {
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Starts immediately on activity; stops on the second consecutive
    /// neutral frame. Each transition is reported exactly once.
    pub fn observe(&mut self, active: bool) -> Option<MovementTransition> {
        if active {
            self.neutral_frames = 0;
            if !self.is_moving {
                self.is_moving = true;
                return Some(MovementTransition::Started);
            }
            return None;
        }

        if !self.is_moving {
            return None;
        }

        self.neutral_frames += 1;
        if self.neutral_frames >= STOP_AFTER_NEUTRAL_FRAMES {
            self.is_moving = false;
            self.neutral_frames = 0;
            return Some(MovementTransition::Stopped);
        }
        None
    }

    pub fn update_payload(&self, ramp: &MovementRampState, speed_scale: f32) -> MovementUpdate {
        MovementUpdate {
            is_moving: self.is_moving,
            current_speed: ramp.current_speed * speed_scale,
            is_boosted: ramp.is_boosted(),
            current_boost_level: ramp.current_boost,
        }
    }

    pub fn reset(&mut self) {
        *self = MovementTracker::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_approaches_targets() {
        let mut ramp = MovementRampState::default();
        let mut previous = 0.0;
        for _ in 0..30 {
            ramp.step(true, true, 10.0, 6.0, 1.0 / 60.0);
            assert!(ramp.current_speed > previous);
            assert!(ramp.current_speed <= 1.0);
            assert!((0.0..=1.0).contains(&ramp.current_boost));
            previous = ramp.current_speed;
        }
        assert!(ramp.current_speed > 0.9);
        assert!(ramp.is_boosted());

        for _ in 0..600 {
            ramp.step(false, false, 10.0, 6.0, 1.0 / 60.0);
            assert!(ramp.current_speed >= 0.0);
            assert!(ramp.current_boost >= 0.0);
        }
        assert_eq!(ramp.current_speed, 0.0);
        assert_eq!(ramp.current_boost, 0.0);
        assert!(!ramp.is_boosted());
    }

    #[test]
    fn test_approach_ignores_negative_delta() {
        assert_eq!(approach(0.5, 1.0, 10.0, -1.0), 0.5);
    }

    #[test]
    fn test_tracker_edges() {
        let mut tracker = MovementTracker::default();

        assert_eq!(tracker.observe(false), None);
        assert_eq!(tracker.observe(true), Some(MovementTransition::Started));
        assert_eq!(tracker.observe(true), None);

        // First neutral frame keeps moving
        assert_eq!(tracker.observe(false), None);
        assert!(tracker.is_moving());

        // Activity resumes before stop: no new start
        assert_eq!(tracker.observe(true), None);

        assert_eq!(tracker.observe(false), None);
        assert_eq!(tracker.observe(false), Some(MovementTransition::Stopped));
        assert!(!tracker.is_moving());
        assert_eq!(tracker.observe(false), None);
    }
}
