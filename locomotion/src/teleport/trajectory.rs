use cgmath::{InnerSpace, Vector3};

use crate::config::TeleportConfig;
use crate::rig::{UP, horizontal, horizontal_direction};

/// Slowest launch the solver will pick, keeps a zero-length target from
/// producing a degenerate arc
const MIN_LAUNCH_SPEED: f32 = 0.5;

/// Floor hits this far past `max_distance` still count, pulled back onto it
const DISTANCE_TOLERANCE: f32 = 1e-3;

/// Where and how the arc leaves the controller
#[derive(Clone, Copy, Debug)]
pub struct ArcLaunch {
    pub origin: Vector3<f32>,
    pub direction: Vector3<f32>,
    /// Heading used when `direction` is (nearly) vertical
    pub fallback_heading: Vector3<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcHitKind {
    /// The arc came down through the floor plane
    FloorIntersection,
    /// The arc ran past the maximum distance first and was cut there
    DistanceLimit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcHit {
    pub position: Vector3<f32>,
    /// Index of the hit in `ArcGeometry::points` (always the last point)
    pub point_index: usize,
    pub kind: ArcHitKind,
}

/// Sampled ballistic path from the aiming controller down to the floor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArcGeometry {
    pub points: Vec<Vector3<f32>>,
    /// Last sample before the path stops rising
    pub apex_index: Option<usize>,
    pub hit: Option<ArcHit>,
}

/// Map the strongest stick deflection of an aim onto a landing distance.
/// Deflection at the press threshold lands at `min_distance`, full
/// deflection (or more) at exactly `max_distance`, with a power curve in
/// between so small deflections stay fine-grained.
pub fn target_distance(max_magnitude: f32, config: &TeleportConfig) -> f32 {
    let span = 1.0 - config.press_threshold;
    let t = if max_magnitude.is_finite() && span > 0.0 {
        ((max_magnitude - config.press_threshold) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let range = config.max_distance - config.min_distance;
    (config.min_distance + range * t.powf(config.distance_curve_exponent)).min(config.max_distance)
}

/// Initial velocity that lands `target_distance` away (horizontally) on a
/// floor at `floor_height`. The launch angle is clamped to at least
/// `min_upward` so the path always has an apex.
pub fn launch_velocity(
    launch: &ArcLaunch,
    floor_height: f32,
    target_distance: f32,
    config: &TeleportConfig,
) -> Vector3<f32> {
    let heading = horizontal_direction(launch.direction)
        .or_else(|| horizontal_direction(launch.fallback_heading))
        .unwrap_or(crate::rig::FORWARD);

    let direction_y = if launch.direction.magnitude2() > 0.0 {
        launch.direction.normalize().y
    } else {
        0.0
    };
    let sin = direction_y.clamp(config.min_upward, config.max_elevation);
    let cos = (1.0 - sin * sin).sqrt();

    // Solve h + D*tan(a) - g*D^2 / (2 v^2 cos^2(a)) = 0 for v. A floor the
    // arc cannot reach at this angle is solved as level with the controller,
    // so the throw still covers the requested distance.
    let reach = |drop: f32| 2.0 * cos * cos * (drop + target_distance * sin / cos);
    let drop = launch.origin.y - floor_height;
    let denominator = if reach(drop) > 1e-4 { reach(drop) } else { reach(0.0) };
    let speed = if denominator > 1e-4 {
        (config.gravity * target_distance * target_distance / denominator).sqrt()
    } else {
        MIN_LAUNCH_SPEED
    };
    let speed = speed.clamp(MIN_LAUNCH_SPEED, config.max_launch_speed);

    heading * (cos * speed) + UP * (sin * speed)
}

impl ArcGeometry {
    /// Step the trajectory at fixed time intervals until it comes down
    /// through the floor after its apex, or until it travels further than
    /// `max_distance` from `distance_origin` (horizontally). Only a
    /// `FloorIntersection` hit is a landing spot; a `DistanceLimit` hit just
    /// ends the drawn arc.
    pub fn simulate(
        launch: &ArcLaunch,
        distance_origin: Vector3<f32>,
        floor_height: f32,
        target_distance: f32,
        config: &TeleportConfig,
    ) -> ArcGeometry {
        let mut geometry = ArcGeometry::default();
        if !is_finite(launch.origin) || !is_finite(launch.direction) || !floor_height.is_finite() {
            return geometry;
        }

        let velocity = launch_velocity(launch, floor_height, target_distance, config);
        let horizontal_distance = |p: Vector3<f32>| horizontal(p - distance_origin).magnitude();

        geometry.points.push(launch.origin);
        // Newest sample at or above the floor
        let mut last_above = (launch.origin.y >= floor_height).then_some(0);

        for step in 1..=config.max_simulation_steps {
            let t = step as f32 * config.simulation_step;
            let point = launch.origin + velocity * t - UP * (0.5 * config.gravity * t * t);
            let previous_index = step - 1;
            let previous = geometry.points[previous_index];

            if geometry.apex_index.is_none() && point.y <= previous.y {
                geometry.apex_index = Some(previous_index);
            }

            let past_grace = geometry
                .apex_index
                .is_some_and(|apex| previous_index >= apex + config.apex_grace_steps);

            // The crossing may have happened inside the grace window, so
            // interpolate from the last sample that was still above
            if let Some(above) = last_above.filter(|_| past_grace && point.y < floor_height) {
                let from = geometry.points[above];
                let to = geometry.points.get(above + 1).copied().unwrap_or(point);
                let fraction = (from.y - floor_height) / (from.y - to.y);
                let mut hit = from + (to - from) * fraction;
                hit.y = floor_height;

                if horizontal_distance(hit) <= config.max_distance + DISTANCE_TOLERANCE {
                    geometry.points.truncate(above + 1);
                    geometry.finish(
                        clamp_distance(hit, distance_origin, config.max_distance),
                        ArcHitKind::FloorIntersection,
                    );
                    return geometry;
                }
            }

            let previous_distance = horizontal_distance(previous);
            let distance = horizontal_distance(point);
            if distance > config.max_distance {
                let fraction = if distance > previous_distance {
                    ((config.max_distance - previous_distance) / (distance - previous_distance))
                        .clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let end = previous + (point - previous) * fraction;

                geometry.finish(
                    clamp_distance(end, distance_origin, config.max_distance),
                    ArcHitKind::DistanceLimit,
                );
                return geometry;
            }

            if point.y >= floor_height {
                last_above = Some(step);
            }
            geometry.points.push(point);
        }

        geometry
    }

    fn finish(&mut self, position: Vector3<f32>, kind: ArcHitKind) {
        self.points.push(position);
        self.hit = Some(ArcHit {
            position,
            point_index: self.points.len() - 1,
            kind,
        });
    }

    /// Total length along the sampled curve
    pub fn arc_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).magnitude())
            .sum()
    }

    /// Point at normalized position `t` in [0, 1] along the samples
    pub fn point_at(&self, t: f32) -> Option<Vector3<f32>> {
        let last = self.points.len().checked_sub(1)?;
        if last == 0 {
            return self.points.first().copied();
        }

        let scaled = t.clamp(0.0, 1.0) * last as f32;
        let index = (scaled as usize).min(last);
        if index == last {
            return Some(self.points[last]);
        }

        let local = scaled - index as f32;
        let from = self.points[index];
        let to = self.points[index + 1];
        Some(from + (to - from) * local)
    }
}

/// Linear interpolation of distance can land a hair outside the limit
fn clamp_distance(point: Vector3<f32>, origin: Vector3<f32>, max_distance: f32) -> Vector3<f32> {
    let offset = horizontal(point - origin);
    let length = offset.magnitude();
    if length <= max_distance {
        return point;
    }

    let clamped = offset * (max_distance / length);
    Vector3::new(origin.x + clamped.x, point.y, origin.z + clamped.z)
}

fn is_finite(v: Vector3<f32>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
