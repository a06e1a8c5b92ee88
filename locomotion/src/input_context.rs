// Per-frame snapshot of everything the locomotion core reads from the device layer.
// The host builds one of these every frame and hands it to the coordinator, so the
// core never holds on to live session or controller objects.

use cgmath::{One, Quaternion, Vector3, Zero};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn opposite(self) -> Handedness {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Handedness::Left => 0,
            Handedness::Right => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionVisibility {
    #[default]
    Visible,
    VisibleBlurred,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub immersive_active: bool,
    #[serde(default)]
    pub visibility: SessionVisibility,
}

impl SessionState {
    pub fn active() -> SessionState {
        SessionState {
            immersive_active: true,
            visibility: SessionVisibility::Visible,
        }
    }

    pub fn inactive() -> SessionState {
        SessionState {
            immersive_active: false,
            visibility: SessionVisibility::Hidden,
        }
    }

    /// Only a visible immersive session can show feedback for rig changes
    pub fn accepts_locomotion(&self) -> bool {
        self.immersive_active && self.visibility == SessionVisibility::Visible
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::active()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            position: Vector3::zero(),
            orientation: Quaternion::one(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawButton {
    pub pressed: bool,
    #[serde(default)]
    pub value: f32,
}

/// Raw gamepad state for one tracked controller, in the XR "standard" layout:
/// thumbstick on axes 2/3 (0/1 for two-axis pads), squeeze on button 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawControllerState {
    pub handedness: Handedness,
    #[serde(default)]
    pub pose: Pose,
    #[serde(default)]
    pub axes: Vec<f32>,
    #[serde(default)]
    pub buttons: Vec<RawButton>,
}

impl RawControllerState {
    pub fn new(handedness: Handedness) -> Self {
        RawControllerState {
            handedness,
            pose: Pose::default(),
            axes: vec![0.0; 4],
            buttons: vec![RawButton::default(); 6],
        }
    }

    pub fn with_thumbstick(mut self, x: f32, y: f32) -> Self {
        if self.axes.len() < 4 {
            self.axes.resize(4, 0.0);
        }
        self.axes[2] = x;
        self.axes[3] = y;
        self
    }

    pub fn with_grip(mut self, pressed: bool) -> Self {
        if self.buttons.len() < 2 {
            self.buttons.resize(2, RawButton::default());
        }
        self.buttons[1] = RawButton {
            pressed,
            value: if pressed { 1.0 } else { 0.0 },
        };
        self
    }

    pub fn with_pose(mut self, position: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        self.pose = Pose {
            position,
            orientation,
        };
        self
    }
}

/// Everything the host hands to `LocomotionCoordinator::update` for one frame
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerPoses {
    #[serde(default)]
    pub session: SessionState,
    /// Headset orientation relative to the rig
    #[serde(default = "identity_rotation")]
    pub head_rotation: Quaternion<f32>,
    #[serde(default)]
    pub left: Option<RawControllerState>,
    #[serde(default)]
    pub right: Option<RawControllerState>,
}

impl ControllerPoses {
    pub fn new(left: Option<RawControllerState>, right: Option<RawControllerState>) -> Self {
        ControllerPoses {
            session: SessionState::active(),
            head_rotation: Quaternion::one(),
            left,
            right,
        }
    }

    pub fn hand(&self, handedness: Handedness) -> Option<&RawControllerState> {
        match handedness {
            Handedness::Left => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }
}

fn identity_rotation() -> Quaternion<f32> {
    Quaternion::one()
}

impl Default for ControllerPoses {
    fn default() -> Self {
        ControllerPoses::new(None, None)
    }
}
