//! Single-pass contact resolution.
//!
//! Each manifold is handled on its own, in detection order:
//!
//! 1. Positional correction (partial, mass-weighted push along the normal)
//! 2. Normal impulse with restitution (skipped for separating bodies)
//! 3. Coulomb friction along the tangent, bounded by the normal impulse

use glam::Vec2;

use super::body::Body;
use super::collision::Manifold;
use crate::core::math::geometric_mean;

/// Share of the penetration removed per contact. Below 1.0 to avoid jitter.
pub const DEFAULT_CORRECTION_PERCENT: f32 = 0.8;

/// Tangential speeds below this produce no friction impulse
const TANGENT_EPSILON: f32 = 1e-6;

/// Impulses applied while resolving a single contact
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactImpulse {
    pub normal: f32,
    pub friction: f32,
}

/// Resolve one contact between `a` and `b` (the bodies named by `manifold`)
pub fn resolve_contact(
    a: &mut Body,
    b: &mut Body,
    manifold: &Manifold,
    correction_percent: f32,
) -> ContactImpulse {
    correct_positions(a, b, manifold.normal, manifold.penetration, correction_percent);

    let Some(normal_impulse) = resolve_velocity(a, b, manifold.normal) else {
        return ContactImpulse::default();
    };
    let friction = apply_friction(a, b, manifold.normal, normal_impulse);

    ContactImpulse {
        normal: normal_impulse,
        friction,
    }
}

/// Push the bodies apart along the normal, proportionally to inverse mass
pub fn correct_positions(a: &mut Body, b: &mut Body, normal: Vec2, penetration: f32, percent: f32) {
    let inv_mass_sum = a.inverse_mass() + b.inverse_mass();
    if inv_mass_sum <= 0.0 {
        return;
    }

    let correction = normal * (penetration / inv_mass_sum * percent);
    if a.inverse_mass() > 0.0 {
        a.translate(-correction * a.inverse_mass());
    }
    if b.inverse_mass() > 0.0 {
        b.translate(correction * b.inverse_mass());
    }
}

/// Apply the restitution impulse. Returns `None` when nothing was applied
/// (bodies already separating, or both immovable).
pub fn resolve_velocity(a: &mut Body, b: &mut Body, normal: Vec2) -> Option<f32> {
    let inv_mass_sum = a.inverse_mass() + b.inverse_mass();
    if inv_mass_sum <= 0.0 {
        return None;
    }

    let velocity_along_normal = (b.velocity() - a.velocity()).dot(normal);
    if velocity_along_normal > 0.0 {
        return None;
    }

    let restitution = a.material().restitution.min(b.material().restitution);
    let j = -(1.0 + restitution) * velocity_along_normal / inv_mass_sum;

    let impulse = normal * j;
    a.apply_impulse(-impulse);
    b.apply_impulse(impulse);
    Some(j)
}

/// Friction impulse opposing tangential sliding, clamped to the friction cone
pub fn apply_friction(a: &mut Body, b: &mut Body, normal: Vec2, normal_impulse: f32) -> f32 {
    let inv_mass_sum = a.inverse_mass() + b.inverse_mass();
    if inv_mass_sum <= 0.0 {
        return 0.0;
    }

    let relative_velocity = b.velocity() - a.velocity();
    let tangent_velocity = relative_velocity - normal * relative_velocity.dot(normal);
    let tangent_speed = tangent_velocity.length();
    if tangent_speed <= TANGENT_EPSILON {
        return 0.0;
    }
    let tangent = tangent_velocity / tangent_speed;

    let mu = geometric_mean(a.material().friction, b.material().friction);
    let max_friction = normal_impulse.abs() * mu;
    let jt = (-relative_velocity.dot(tangent) / inv_mass_sum).clamp(-max_friction, max_friction);

    let impulse = tangent * jt;
    a.apply_impulse(-impulse);
    b.apply_impulse(impulse);
    jt
}
