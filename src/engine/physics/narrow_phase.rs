// Narrow phase: exact shape tests producing contact manifolds

use glam::Vec2;

use super::body::{Body, BodyHandle, Shape};
use super::collision::{filter_allows, ContactInfo, Manifold};
use crate::core::math::Aabb;

/// Distance below which two circle centers are treated as coincident
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Type and layer eligibility, checked before any geometry
pub fn can_collide(a: &Body, b: &Body) -> bool {
    if a.is_static() && b.is_static() {
        return false;
    }
    filter_allows(
        a.collision_layer(),
        a.collision_mask(),
        b.collision_layer(),
        b.collision_mask(),
    )
}

/// Test two bodies and build a manifold with the normal pointing from A to B
pub fn detect(handle_a: BodyHandle, a: &Body, handle_b: BodyHandle, b: &Body) -> Option<Manifold> {
    if !can_collide(a, b) {
        return None;
    }
    test_shapes(&a.shape(), a.position(), &b.shape(), b.position())
        .map(|info| Manifold::new(handle_a, handle_b, info))
}

/// Dispatch on the shape pair
pub fn test_shapes(
    shape_a: &Shape,
    position_a: Vec2,
    shape_b: &Shape,
    position_b: Vec2,
) -> Option<ContactInfo> {
    match (shape_a, shape_b) {
        (Shape::Circle { radius: radius_a }, Shape::Circle { radius: radius_b }) => {
            circle_circle(position_a, *radius_a, position_b, *radius_b)
        }
        (Shape::Rect { .. }, Shape::Rect { .. }) => {
            rect_rect(&shape_a.aabb(position_a), &shape_b.aabb(position_b))
        }
        (Shape::Rect { .. }, Shape::Circle { radius }) => {
            rect_circle(&shape_a.aabb(position_a), position_b, *radius)
        }
        (Shape::Circle { radius }, Shape::Rect { .. }) => {
            rect_circle(&shape_b.aabb(position_b), position_a, *radius).map(ContactInfo::flipped)
        }
    }
}

/// Circles overlap when the center distance is below the sum of radii
pub fn circle_circle(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> Option<ContactInfo> {
    let offset = center_b - center_a;
    let distance = offset.length();
    let radii = radius_a + radius_b;

    if distance >= radii {
        return None;
    }

    let normal = if distance > COINCIDENT_EPSILON {
        offset / distance
    } else {
        Vec2::X
    };

    Some(ContactInfo {
        normal,
        penetration: radii - distance,
        point: center_a + normal * radius_a,
    })
}

/// Box overlap resolved along the axis of least penetration
pub fn rect_rect(a: &Aabb, b: &Aabb) -> Option<ContactInfo> {
    let overlap_x = a.max.x.min(b.max.x) - a.min.x.max(b.min.x);
    let overlap_y = a.max.y.min(b.max.y) - a.min.y.max(b.min.y);

    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return None;
    }

    let delta = b.center() - a.center();
    let (normal, penetration) = if overlap_x < overlap_y {
        let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
        (Vec2::new(sign, 0.0), overlap_x)
    } else {
        let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
        (Vec2::new(0.0, sign), overlap_y)
    };

    let region = a.intersection(b)?;
    Some(ContactInfo {
        normal,
        penetration,
        point: region.center(),
    })
}

/// Box (A) against circle (B).
///
/// The circle center is clamped into the box; the normal runs from that
/// closest point to the center. A center inside the box gives a zero normal.
pub fn rect_circle(rect: &Aabb, center: Vec2, radius: f32) -> Option<ContactInfo> {
    let closest = rect.clamp_point(center);
    let offset = center - closest;
    let distance = offset.length();

    if distance >= radius {
        return None;
    }

    Some(ContactInfo {
        normal: offset.normalize_or_zero(),
        penetration: radius - distance,
        point: closest,
    })
}
