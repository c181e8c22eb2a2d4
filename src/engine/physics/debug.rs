use glam::Vec2;
use log::warn;

use super::body::{Body, BodyType, Shape};
use super::world::PhysicsWorld;

const CIRCLE_SEGMENTS: usize = 16;

/// Length of the drawn contact normals, in world units
const NORMAL_LENGTH: f32 = 12.0;

const DYNAMIC_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 0.8]; // Green for dynamic
const STATIC_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.8]; // Gray for static
const KINEMATIC_COLOR: [f32; 4] = [0.0, 0.5, 1.0, 0.8]; // Blue for kinematic
const CONTACT_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Line-list geometry describing the physics world.
/// Outlines colliders by body type and optionally the contacts of the last tick.
/// The renderer uploads `vertices()` and `indices()` as-is.
#[derive(Debug, Default)]
pub struct DebugGeometry {
    vertices: Vec<DebugVertex>,
    indices: Vec<u16>,
    enabled: bool,
    draw_contacts: bool,
}

impl DebugGeometry {
    pub fn new() -> Self {
        Self::default() // Disabled by default
    }

    /// Enable or disable debug geometry
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.vertices.clear();
            self.indices.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Also draw contact normals from the last tick
    pub fn set_draw_contacts(&mut self, draw_contacts: bool) {
        self.draw_contacts = draw_contacts;
    }

    /// Rebuild the geometry from the current world state
    pub fn prepare(&mut self, world: &PhysicsWorld) {
        if !self.enabled {
            return;
        }

        self.vertices.clear();
        self.indices.clear();

        for (_handle, body) in world.registry().iter() {
            if body.is_enabled() {
                self.draw_body(body);
            }
        }

        if self.draw_contacts {
            for manifold in world.manifolds() {
                self.draw_cross(manifold.contact_point, 3.0, CONTACT_COLOR);
                self.draw_line(
                    manifold.contact_point,
                    manifold.contact_point + manifold.normal * NORMAL_LENGTH,
                    CONTACT_COLOR,
                );
            }
        }
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    fn draw_body(&mut self, body: &Body) {
        let color = match body.body_type() {
            BodyType::Dynamic => DYNAMIC_COLOR,
            BodyType::Static => STATIC_COLOR,
            BodyType::Kinematic => KINEMATIC_COLOR,
        };

        match body.shape() {
            Shape::Circle { radius } => {
                self.draw_circle(body.position(), radius, color);
                // Spoke so the rotation is visible
                let spoke = Vec2::from_angle(body.rotation()) * radius;
                self.draw_line(body.position(), body.position() + spoke, color);
            }
            Shape::Rect { .. } => {
                let aabb = body.aabb();
                self.draw_box(aabb.min, aabb.max, color);
            }
        }
    }

    /// Reserve `count` vertices, returning the first index. `None` once the
    /// 16-bit index space is exhausted.
    fn reserve(&self, count: usize) -> Option<u16> {
        let start = self.vertices.len();
        if start + count > u16::MAX as usize + 1 {
            warn!("Debug geometry vertex limit reached, skipping shapes");
            return None;
        }
        Some(start as u16)
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let Some(start_idx) = self.reserve(CIRCLE_SEGMENTS) else {
            return;
        };

        for i in 0..CIRCLE_SEGMENTS {
            let angle = (i as f32 / CIRCLE_SEGMENTS as f32) * std::f32::consts::TAU;
            let point = center + Vec2::from_angle(angle) * radius;
            self.vertices.push(DebugVertex {
                position: point.to_array(),
                color,
            });

            let next = (i + 1) % CIRCLE_SEGMENTS;
            self.indices.push(start_idx + i as u16);
            self.indices.push(start_idx + next as u16);
        }
    }

    fn draw_box(&mut self, min: Vec2, max: Vec2, color: [f32; 4]) {
        let Some(start_idx) = self.reserve(4) else {
            return;
        };

        let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
        for corner in corners {
            self.vertices.push(DebugVertex {
                position: corner.to_array(),
                color,
            });
        }

        for i in 0..4 {
            self.indices.push(start_idx + i);
            self.indices.push(start_idx + (i + 1) % 4);
        }
    }

    fn draw_cross(&mut self, center: Vec2, size: f32, color: [f32; 4]) {
        self.draw_line(center - Vec2::X * size, center + Vec2::X * size, color);
        self.draw_line(center - Vec2::Y * size, center + Vec2::Y * size, color);
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]) {
        let Some(start_idx) = self.reserve(2) else {
            return;
        };

        for point in [from, to] {
            self.vertices.push(DebugVertex {
                position: point.to_array(),
                color,
            });
        }
        self.indices.push(start_idx);
        self.indices.push(start_idx + 1);
    }
}
