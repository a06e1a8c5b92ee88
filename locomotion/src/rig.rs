use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Quaternion, Rad, Rotation3, Vector3, Zero, vec3};
use serde::{Deserialize, Serialize};

/// Local forward axis for the rig, head and controllers
pub const FORWARD: Vector3<f32> = vec3(0.0, 0.0, -1.0);
pub const UP: Vector3<f32> = vec3(0.0, 1.0, 0.0);

/// The movable root of the tracked viewpoint. The host owns it; locomotion
/// mutates it in place once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    pub position: Vector3<f32>,
    /// Heading about +Y in radians, kept in (-PI, PI]
    yaw: f32,
    pub pitch: f32,
}

impl CameraRig {
    pub fn new(position: Vector3<f32>, yaw: f32) -> Self {
        CameraRig {
            position,
            yaw: normalize_yaw(yaw),
            pitch: 0.0,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = normalize_yaw(yaw);
    }

    /// Rotate by `delta` radians (positive turns left) and re-wrap
    pub fn rotate_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(Rad(self.yaw))
    }

    /// Horizontal forward direction of the rig itself
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation() * FORWARD
    }

    pub fn horizontal_distance_to(&self, point: Vector3<f32>) -> f32 {
        horizontal(point - self.position).magnitude()
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        CameraRig::new(Vector3::zero(), 0.0)
    }
}

/// Wrap an angle into (-PI, PI]. Non-finite input collapses to zero.
pub fn normalize_yaw(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }

    let wrapped = angle % TAU;
    if wrapped <= -PI {
        wrapped + TAU
    } else if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Drop the vertical component
pub fn horizontal(v: Vector3<f32>) -> Vector3<f32> {
    vec3(v.x, 0.0, v.z)
}

/// Normalized horizontal projection of `v`, or `None` when it points
/// (nearly) straight up or down
pub fn horizontal_direction(v: Vector3<f32>) -> Option<Vector3<f32>> {
    let flat = horizontal(v);
    let length = flat.magnitude();
    if length > 1e-4 && length.is_finite() {
        Some(flat / length)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_range(angle: f32) -> bool {
        angle > -PI && angle <= PI
    }

    #[test]
    fn test_normalize_yaw_boundaries() {
        assert_eq!(normalize_yaw(PI), PI);
        assert_eq!(normalize_yaw(-PI), PI);
        assert_eq!(normalize_yaw(0.0), 0.0);
        assert!((normalize_yaw(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((normalize_yaw(-PI / 2.0 - TAU) + PI / 2.0).abs() < 1e-5);
        assert_eq!(normalize_yaw(f32::NAN), 0.0);
    }

    #[test]
    fn test_yaw_wraps_after_repeated_full_rotations() {
        let mut rig = CameraRig::default();
        for i in 0..2000 {
            rig.rotate_yaw(0.37 * if i % 3 == 0 { -1.0 } else { 1.0 });
            assert!(in_range(rig.yaw()), "yaw {} out of range", rig.yaw());
        }

        for _ in 0..100 {
            rig.rotate_yaw(TAU);
            assert!(in_range(rig.yaw()));
        }
    }

    #[test]
    fn test_forward_follows_yaw() {
        let rig = CameraRig::new(Vector3::zero(), PI / 2.0);
        let forward = rig.forward();
        // Quarter turn left from -Z faces -X
        assert!((forward.x + 1.0).abs() < 1e-5);
        assert!(forward.z.abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let rig = CameraRig::new(vec3(1.0, 5.0, 1.0), 0.0);
        assert!((rig.horizontal_distance_to(vec3(4.0, -20.0, 5.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_direction_degenerate() {
        assert!(horizontal_direction(UP).is_none());
        let dir = horizontal_direction(vec3(0.0, 0.5, -2.0)).unwrap();
        assert!((dir.z + 1.0).abs() < 1e-6);
    }
}
