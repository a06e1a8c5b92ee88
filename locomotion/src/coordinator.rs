use serde_json::Value;

use crate::comfort::{
    ComfortProfile, ComfortSettings, ComfortSettingsPatch, LocomotionMode, SettingsChange,
};
use crate::config::LocomotionConfig;
use crate::error::ComfortError;
use crate::events::{EventDispatcher, LocomotionEvent, LocomotionListener};
use crate::input_context::ControllerPoses;
use crate::input_normalizer::InputNormalizer;
use crate::locomotion_log;
use crate::movement_state::{MovementRampState, MovementTracker, MovementTransition};
use crate::rig::CameraRig;
use crate::smooth_locomotion::SmoothLocomotion;
use crate::teleport::{
    ArcTeleport, SnapTurn, TeleportGestureState, TeleportTransition, TeleportUI,
    TeleportVisualStyle, TeleportVisuals,
};

/// Per-frame entry point. Owns every locomotion strategy and routes
/// normalized controller input to whichever one the comfort settings select.
pub struct LocomotionCoordinator {
    config: LocomotionConfig,
    normalizer: InputNormalizer,
    comfort: ComfortProfile,
    smooth: SmoothLocomotion,
    teleport: ArcTeleport,
    snap_turn: SnapTurn,
    movement: MovementTracker,
    dispatcher: EventDispatcher,
    /// Raised between frames; already dispatched, returned by the next update
    pending: Vec<LocomotionEvent>,
    visual_style: TeleportVisualStyle,
}

impl LocomotionCoordinator {
    pub fn new(config: LocomotionConfig) -> Self {
        LocomotionCoordinator {
            normalizer: InputNormalizer::new(config.input),
            comfort: ComfortProfile::new(config.comfort),
            smooth: SmoothLocomotion::new(config.smooth),
            teleport: ArcTeleport::new(config.teleport),
            snap_turn: SnapTurn::new(config.snap_turn),
            movement: MovementTracker::default(),
            dispatcher: EventDispatcher::default(),
            pending: Vec::new(),
            visual_style: TeleportVisualStyle::default(),
            config,
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Advance one frame: read input, pick a strategy, move `rig`, then emit
    /// events. Events go to every subscribed listener and are also returned.
    /// Events raised by a settings change since the last frame reached the
    /// listeners at that time and lead the returned list.
    pub fn update(
        &mut self,
        rig: &mut CameraRig,
        delta_time: f32,
        poses: &ControllerPoses,
    ) -> Vec<LocomotionEvent> {
        let mut returned = std::mem::take(&mut self.pending);
        if !poses.session.accepts_locomotion() {
            locomotion_log!(TRACE, "Session not presenting ({:?}), skipping", poses.session);
            return returned;
        }
        if !delta_time.is_finite() || delta_time < 0.0 {
            locomotion_log!(WARN, "Ignoring frame with delta time {}", delta_time);
            return returned;
        }

        let hands = self.config.hands;
        let input = self.normalizer.sample_frame(poses);
        let movement_hand = input.hand(hands.movement).copied();
        let turning_hand = input.hand(hands.turning).copied();
        let smoothed_turn = self
            .normalizer
            .smoothed_turn(hands.turning, turning_hand.map(|sample| sample.axis_x));

        let settings = *self.comfort.settings();
        let boost_held = movement_hand.is_some_and(|sample| sample.grip_pressed)
            || turning_hand.is_some_and(|sample| sample.grip_pressed);
        let turn_axis = turning_hand.map_or(0.0, |sample| sample.axis_x);
        let vertical_axis = turning_hand.map_or(0.0, |sample| sample.axis_y);

        let mut events = Vec::new();

        // While an aim is showing, the turning hand's vertical axis drives the
        // landing floor instead of flight
        let floor_override = settings.locomotion_mode == LocomotionMode::Teleport
            && self.teleport.is_aiming()
            && settings.show_teleport_arc;

        let translating = match settings.locomotion_mode {
            LocomotionMode::Smooth => {
                let (x, y) = movement_hand.map_or((0.0, 0.0), |sample| (sample.axis_x, sample.axis_y));
                let translating = x != 0.0 || y != 0.0;
                self.smooth
                    .update_ramp(translating, boost_held, &settings, delta_time);
                if translating {
                    self.smooth
                        .translate(rig, poses.head_rotation, x, y, &settings, delta_time);
                }
                translating
            }
            LocomotionMode::Teleport => {
                self.smooth.update_ramp(false, boost_held, &settings, delta_time);
                let floor_axis = if floor_override { vertical_axis } else { 0.0 };
                let transition = self.teleport.update(
                    rig,
                    hands.movement,
                    movement_hand.as_ref(),
                    floor_axis,
                    delta_time,
                );
                events.extend(Self::teleport_events(transition));
                false
            }
        };

        let turned = self.smooth.turn(
            rig,
            smoothed_turn,
            turn_axis,
            &settings,
            delta_time,
            &mut self.snap_turn,
        );

        let flying = !floor_override && vertical_axis != 0.0;
        if flying {
            self.smooth.fly(rig, vertical_axis, delta_time);
        }

        // A smoothed turn still easing out keeps the rig moving
        let active = translating || turn_axis != 0.0 || turned != 0.0 || flying;
        let transition = self.movement.observe(active);
        match transition {
            Some(MovementTransition::Started) => {
                locomotion_log!(DEBUG, "Movement started");
                events.push(LocomotionEvent::MovementStart);
            }
            Some(MovementTransition::Stopped) => {
                locomotion_log!(DEBUG, "Movement stopped");
                events.push(LocomotionEvent::MovementStop);
            }
            None => {}
        }
        // Updates stream while moving, plus one final update on the stop frame
        if self.movement.is_moving() || transition == Some(MovementTransition::Stopped) {
            let payload = self
                .movement
                .update_payload(self.smooth.ramp(), self.smooth.speed_scale(&settings));
            events.push(LocomotionEvent::MovementUpdate(payload));
        }

        self.dispatcher.dispatch(&events);
        returned.extend(events);
        returned
    }

    fn teleport_events(transition: Option<TeleportTransition>) -> Vec<LocomotionEvent> {
        match transition {
            Some(TeleportTransition::Started) => vec![LocomotionEvent::TeleportStart],
            Some(TeleportTransition::Committed { destination }) => vec![
                LocomotionEvent::Teleport { destination },
                LocomotionEvent::TeleportEnd,
            ],
            Some(TeleportTransition::Aborted(_)) => vec![LocomotionEvent::TeleportEnd],
            None => Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn LocomotionListener>) {
        self.dispatcher.subscribe(listener);
    }

    pub fn comfort_settings(&self) -> &ComfortSettings {
        self.comfort.settings()
    }

    pub fn set_comfort_settings(&mut self, patch: &ComfortSettingsPatch) -> SettingsChange {
        let change = self.comfort.set_settings(patch);
        self.apply_mode_change(&change);
        change
    }

    pub fn set_comfort_settings_json(&mut self, value: &Value) -> SettingsChange {
        let change = self.comfort.set_settings_json(value);
        self.apply_mode_change(&change);
        change
    }

    pub fn set_comfort_preset(&mut self, name: &str) -> Result<SettingsChange, ComfortError> {
        let change = self.comfort.set_preset(name)?;
        self.apply_mode_change(&change);
        Ok(change)
    }

    /// Drop gesture state that must not survive a mode switch
    fn apply_mode_change(&mut self, change: &SettingsChange) {
        if change.locomotion_mode_changed {
            self.smooth.reset();
            if self.teleport.cancel() {
                self.dispatcher.dispatch(&[LocomotionEvent::TeleportEnd]);
                self.pending.push(LocomotionEvent::TeleportEnd);
            }
        }
        if change.turning_mode_changed {
            self.snap_turn.reset();
            self.normalizer.reset();
        }
    }

    pub fn teleport_visuals(&self, rig: &CameraRig) -> TeleportVisuals<'_> {
        TeleportUI::build_visuals(
            &self.teleport,
            rig,
            self.comfort.settings().show_teleport_arc,
            &self.visual_style,
        )
    }

    pub fn set_visual_style(&mut self, style: TeleportVisualStyle) {
        self.visual_style = style;
    }

    pub fn gesture_state(&self) -> &TeleportGestureState {
        self.teleport.gesture()
    }

    pub fn teleport(&self) -> &ArcTeleport {
        &self.teleport
    }

    pub fn is_moving(&self) -> bool {
        self.movement.is_moving()
    }

    pub fn ramp(&self) -> &MovementRampState {
        self.smooth.ramp()
    }
}

impl Default for LocomotionCoordinator {
    fn default() -> Self {
        LocomotionCoordinator::new(LocomotionConfig::default())
    }
}
