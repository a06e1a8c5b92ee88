pub mod comfort;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod input_context;
pub mod input_normalizer;
pub mod logging;
pub mod movement_state;
pub mod rig;
pub mod smooth_locomotion;
pub mod teleport;

pub use comfort::{
    ComfortPreset, ComfortProfile, ComfortSettings, ComfortSettingsPatch, LocomotionMode,
    SettingsChange, TurningMode,
};
pub use config::{HandAssignment, LocomotionConfig};
pub use coordinator::LocomotionCoordinator;
pub use error::{ComfortError, ConfigError};
pub use events::{LocomotionEvent, LocomotionListener, MovementUpdate};
pub use input_context::{
    ControllerPoses, Handedness, Pose, RawButton, RawControllerState, SessionState,
    SessionVisibility,
};
pub use input_normalizer::{ControllerSample, InputNormalizer};
pub use rig::CameraRig;
pub use smooth_locomotion::SmoothLocomotion;
pub use teleport::{ArcTeleport, TeleportGestureState, TeleportVisuals};
