use cgmath::{Matrix4, Vector3, vec3};

use crate::rig::CameraRig;

use super::ArcTeleport;

/// Offsets smaller than this count as a level floor for marker colouring
const LEVEL_FLOOR_EPSILON: f32 = 0.01;

#[derive(Clone, Copy, Debug)]
pub struct TeleportVisualStyle {
    pub valid_arc_color: Vector3<f32>,
    pub invalid_arc_color: Vector3<f32>,
    pub level_target_color: Vector3<f32>,
    pub raised_target_color: Vector3<f32>,
    pub lowered_target_color: Vector3<f32>,
    pub invalid_target_color: Vector3<f32>,
    pub landing_scale: Vector3<f32>,
    pub landing_height_offset: f32,
    /// Side length of the floor preview plane
    pub floor_plane_size: f32,
}

impl Default for TeleportVisualStyle {
    fn default() -> Self {
        Self {
            valid_arc_color: vec3(0.0, 0.8, 1.0),
            invalid_arc_color: vec3(1.0, 0.35, 0.1),
            level_target_color: vec3(0.1, 0.9, 1.0),
            raised_target_color: vec3(0.3, 1.0, 0.4),
            lowered_target_color: vec3(0.7, 0.4, 1.0),
            invalid_target_color: vec3(1.0, 0.4, 0.15),
            landing_scale: vec3(1.2, 0.02, 1.2),
            landing_height_offset: 0.02,
            floor_plane_size: 4.0,
        }
    }
}

/// Everything the renderer needs to draw the teleport aim this frame
#[derive(Clone, Debug, PartialEq)]
pub struct TeleportVisuals<'a> {
    pub arc_visible: bool,
    pub arc_points: &'a [Vector3<f32>],
    pub arc_color: Vector3<f32>,
    pub marker_visible: bool,
    pub marker_transform: Matrix4<f32>,
    pub marker_color: Vector3<f32>,
    pub floor_visible: bool,
    pub floor_transform: Matrix4<f32>,
}

impl TeleportVisuals<'_> {
    pub fn hidden() -> Self {
        TeleportVisuals {
            arc_visible: false,
            arc_points: &[],
            arc_color: Vector3::new(0.0, 0.0, 0.0),
            marker_visible: false,
            marker_transform: Matrix4::from_scale(1.0),
            marker_color: Vector3::new(0.0, 0.0, 0.0),
            floor_visible: false,
            floor_transform: Matrix4::from_scale(1.0),
        }
    }
}

pub struct TeleportUI;

impl TeleportUI {
    pub fn build_visuals<'a>(
        teleport: &'a ArcTeleport,
        rig: &CameraRig,
        show_arc: bool,
        style: &TeleportVisualStyle,
    ) -> TeleportVisuals<'a> {
        let Some(arc) = teleport.arc().filter(|_| teleport.is_aiming()) else {
            return TeleportVisuals::hidden();
        };

        let valid = teleport.has_valid_target();
        let offset = teleport.gesture().floor_height_offset();
        let floor_height = teleport.floor_height(rig);

        let marker_color = if !valid {
            style.invalid_target_color
        } else if offset > LEVEL_FLOOR_EPSILON {
            style.raised_target_color
        } else if offset < -LEVEL_FLOOR_EPSILON {
            style.lowered_target_color
        } else {
            style.level_target_color
        };

        let marker_transform = teleport
            .target()
            .map(|hit| Self::marker_transform(hit.position, style))
            .unwrap_or_else(|| Matrix4::from_scale(1.0));

        let floor_transform = Matrix4::from_translation(vec3(rig.position.x, floor_height, rig.position.z))
            * Matrix4::from_nonuniform_scale(style.floor_plane_size, 1.0, style.floor_plane_size);

        TeleportVisuals {
            arc_visible: show_arc,
            arc_points: &arc.points,
            arc_color: if valid {
                style.valid_arc_color
            } else {
                style.invalid_arc_color
            },
            marker_visible: teleport.target().is_some(),
            marker_transform,
            marker_color,
            floor_visible: show_arc,
            floor_transform,
        }
    }

    fn marker_transform(position: Vector3<f32>, style: &TeleportVisualStyle) -> Matrix4<f32> {
        let translation =
            Matrix4::from_translation(position + vec3(0.0, style.landing_height_offset, 0.0));
        let scale = Matrix4::from_nonuniform_scale(
            style.landing_scale.x,
            style.landing_scale.y,
            style.landing_scale.z,
        );
        translation * scale
    }
}
