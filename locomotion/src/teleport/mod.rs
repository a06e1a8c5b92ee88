// Arc teleport locomotion.
//
// Pushing the aim stick past the press threshold starts an aim: a ballistic arc is
// simulated from the controller every frame and the landing spot is shown on an
// adjustable floor plane. Letting the stick fall back past the (lower) release
// threshold jumps the rig there. Snap turning lives here too since both
// locomotion modes share it.

pub mod snap_turn;
pub mod teleport_system;
pub mod teleport_ui;
pub mod trajectory;

pub use snap_turn::SnapTurn;
pub use teleport_system::{
    AbortReason, ArcTeleport, TeleportGestureState, TeleportPhase, TeleportTransition,
};
pub use teleport_ui::{TeleportUI, TeleportVisualStyle, TeleportVisuals};
pub use trajectory::{ArcGeometry, ArcHit, ArcHitKind, ArcLaunch, target_distance};
