// Ray queries against registered bodies

use glam::Vec2;

use super::body::{BodyHandle, Shape};
use super::registry::BodyRegistry;
use crate::core::math::Aabb;

/// A single ray intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub body: BodyHandle,
    /// World-space point where the ray enters the body
    pub point: Vec2,
    /// Outward surface normal at `point`
    pub normal: Vec2,
    /// Distance from the ray origin along the (normalized) direction
    pub distance: f32,
}

/// Cast a ray through every enabled body whose layer intersects `layer_mask`.
///
/// Only rectangles are tested; circles are skipped. Hits come back sorted by
/// distance, nearest first. A zero direction yields no hits.
pub fn raycast(
    registry: &BodyRegistry,
    origin: Vec2,
    direction: Vec2,
    max_distance: f32,
    layer_mask: u32,
) -> Vec<RaycastHit> {
    let direction = direction.normalize_or_zero();
    if direction == Vec2::ZERO {
        return Vec::new();
    }

    let mut hits: Vec<RaycastHit> = registry
        .iter()
        .filter(|(_, body)| body.is_enabled() && body.collision_layer() & layer_mask != 0)
        .filter_map(|(handle, body)| match body.shape() {
            Shape::Rect { .. } => {
                let aabb = body.aabb();
                let distance = ray_aabb(origin, direction, &aabb)?;
                if distance > max_distance {
                    return None;
                }
                let point = origin + direction * distance;
                Some(RaycastHit {
                    body: handle,
                    point,
                    normal: face_normal(&aabb, point),
                    distance,
                })
            }
            Shape::Circle { .. } => None,
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Slab test. Returns the entry distance when the ray enters the box at or
/// after its origin; a ray starting inside the box does not hit it.
pub fn ray_aabb(origin: Vec2, direction: Vec2, aabb: &Aabb) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..2 {
        let (o, d, min, max) = (origin[axis], direction[axis], aabb.min[axis], aabb.max[axis]);
        if d == 0.0 {
            // Parallel to this slab: must already be inside it
            if o < min || o > max {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let t1 = (min - o) * inv;
        let t2 = (max - o) * inv;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    if t_enter <= t_exit && t_enter >= 0.0 {
        Some(t_enter)
    } else {
        None
    }
}

/// Pick the face whose axis dominates the offset from the box center
fn face_normal(aabb: &Aabb, point: Vec2) -> Vec2 {
    let half = aabb.half_extents().max(Vec2::splat(f32::EPSILON));
    let offset = (point - aabb.center()) / half;
    if offset.x.abs() >= offset.y.abs() {
        Vec2::new(offset.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, offset.y.signum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::body::BodyDesc;
    use crate::engine::physics::collision::layers;
    use approx::assert_relative_eq;

    fn add_rect(registry: &mut BodyRegistry, x: f32, y: f32, w: f32, h: f32) -> BodyHandle {
        registry
            .create(&BodyDesc::new_static(Shape::Rect { width: w, height: h }).position(x, y))
            .unwrap()
    }

    #[test]
    fn test_single_hit_distance_and_normal() {
        let mut registry = BodyRegistry::new();
        let target = add_rect(&mut registry, 105.0, 0.0, 10.0, 10.0);

        let hits = raycast(&registry, Vec2::ZERO, Vec2::X, 1000.0, layers::ALL);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].body, target);
        assert_relative_eq!(hits[0].distance, 100.0);
        assert_eq!(hits[0].normal, Vec2::new(-1.0, 0.0));
        assert_relative_eq!(hits[0].point.x, 100.0);
    }

    #[test]
    fn test_hits_sorted_by_distance() {
        let mut registry = BodyRegistry::new();
        let far = add_rect(&mut registry, 300.0, 0.0, 10.0, 10.0);
        let near = add_rect(&mut registry, 50.0, 0.0, 10.0, 10.0);
        let _off_axis = add_rect(&mut registry, 150.0, 100.0, 10.0, 10.0);

        let hits = raycast(&registry, Vec2::ZERO, Vec2::X, 1000.0, layers::ALL);
        let order: Vec<_> = hits.iter().map(|hit| hit.body).collect();
        assert_eq!(order, vec![near, far]);
    }

    #[test]
    fn test_max_distance_and_mask_filter() {
        let mut registry = BodyRegistry::new();
        add_rect(&mut registry, 105.0, 0.0, 10.0, 10.0);

        assert!(raycast(&registry, Vec2::ZERO, Vec2::X, 50.0, layers::ALL).is_empty());
        assert!(raycast(&registry, Vec2::ZERO, Vec2::X, 1000.0, layers::PLAYER).is_empty());
        assert_eq!(raycast(&registry, Vec2::ZERO, Vec2::X, 1000.0, layers::DEFAULT).len(), 1);
    }

    #[test]
    fn test_circles_and_disabled_bodies_skipped() {
        let mut registry = BodyRegistry::new();
        registry
            .create(&BodyDesc::new_static(Shape::Circle { radius: 20.0 }).position(100.0, 0.0))
            .unwrap();
        let disabled = add_rect(&mut registry, 200.0, 0.0, 10.0, 10.0);
        registry.get_mut(disabled).unwrap().set_enabled(false);

        assert!(raycast(&registry, Vec2::ZERO, Vec2::X, 1000.0, layers::ALL).is_empty());
    }

    #[test]
    fn test_ray_behind_or_inside_misses() {
        let aabb = Aabb::new(Vec2::new(100.0, -5.0), Vec2::new(110.0, 5.0));
        assert!(ray_aabb(Vec2::ZERO, -Vec2::X, &aabb).is_none());
        assert!(ray_aabb(Vec2::new(105.0, 0.0), Vec2::X, &aabb).is_none());
        assert!(ray_aabb(Vec2::new(0.0, 20.0), Vec2::X, &aabb).is_none());
    }

    #[test]
    fn test_direction_is_normalized() {
        let mut registry = BodyRegistry::new();
        add_rect(&mut registry, 0.0, 55.0, 20.0, 10.0);

        let hits = raycast(&registry, Vec2::ZERO, Vec2::new(0.0, 25.0), 1000.0, layers::ALL);
        assert_relative_eq!(hits[0].distance, 50.0);
        assert_eq!(hits[0].normal, Vec2::new(0.0, -1.0));
        assert!(raycast(&registry, Vec2::ZERO, Vec2::ZERO, 1000.0, layers::ALL).is_empty());
    }
}
