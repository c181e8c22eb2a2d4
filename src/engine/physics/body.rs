use glam::Vec2;
use log::warn;
use slotmap::new_key_type;

use super::collision::{layers, CollisionGroups};
use super::PhysicsError;
use crate::core::math::Aabb;

new_key_type! {
    /// Handle to a body owned by the physics world.
    ///
    /// Generation-checked: once the body is removed, lookups with this handle
    /// return `None` even if the slot is reused.
    pub struct BodyHandle;
}

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Never moves, never receives impulses (infinite mass)
    Static,
    /// Integrated every tick and pushed around by contacts
    Dynamic,
    /// Integrated like a dynamic body; no special motion handling
    Kinematic,
}

/// Collision shape, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

impl Shape {
    /// Bounding box of the shape centered at `position`
    pub fn aabb(&self, position: Vec2) -> Aabb {
        match *self {
            Shape::Circle { radius } => Aabb::from_center_half_extents(position, Vec2::splat(radius)),
            Shape::Rect { width, height } => {
                Aabb::from_center_half_extents(position, Vec2::new(width, height) * 0.5)
            }
        }
    }

    fn validate(&self) -> Result<(), PhysicsError> {
        match *self {
            Shape::Circle { radius } if !(radius.is_finite() && radius > 0.0) => Err(
                PhysicsError::InvalidShape(format!("circle radius must be positive, got {radius}")),
            ),
            Shape::Rect { width, height }
                if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) =>
            {
                Err(PhysicsError::InvalidShape(format!(
                    "rect extents must be positive, got {width}x{height}"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Surface properties, copied into every body that uses them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Friction coefficient (0.0 = ice)
    pub friction: f32,
    /// Bounciness in [0, 1]
    pub restitution: f32,
    /// Informational only; mass is set explicitly
    pub density: f32,
}

impl Material {
    pub const DEFAULT: Material = Material {
        friction: 0.3,
        restitution: 0.2,
        density: 1.0,
    };

    pub fn new(friction: f32, restitution: f32, density: f32) -> Self {
        Self {
            friction,
            restitution,
            density,
        }
    }

    fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.friction.is_finite() && self.friction >= 0.0) {
            return Err(PhysicsError::InvalidMaterial(format!(
                "friction must be non-negative, got {}",
                self.friction
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::InvalidMaterial(format!(
                "restitution must be within [0, 1], got {}",
                self.restitution
            )));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What kind of game object owns a body, used to categorize collision events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyTag {
    Player,
    Enemy,
    Bullet,
    Powerup,
    Platform,
    Other,
}

/// Back-reference to the game object owning a body.
///
/// The physics core never dereferences `owner`; it only reads `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserData {
    pub owner: u64,
    pub tag: BodyTag,
}

impl UserData {
    pub fn new(owner: u64, tag: BodyTag) -> Self {
        Self { owner, tag }
    }
}

/// Builder describing a body to create
#[derive(Debug, Clone)]
pub struct BodyDesc {
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    angular_velocity: f32,
    mass: f32,
    body_type: BodyType,
    use_gravity: bool,
    enabled: bool,
    linear_damping: f32,
    angular_damping: f32,
    max_velocity: f32,
    shape: Shape,
    material: Material,
    collision_layer: u32,
    collision_mask: u32,
    is_trigger: bool,
    user_data: Option<UserData>,
}

impl BodyDesc {
    /// Create a new dynamic body description (affected by gravity and collisions)
    pub fn new_dynamic(shape: Shape) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            mass: 1.0,
            body_type: BodyType::Dynamic,
            use_gravity: true,
            enabled: true,
            linear_damping: 0.0,
            angular_damping: 0.0,
            max_velocity: 0.0,
            shape,
            material: Material::DEFAULT,
            collision_layer: layers::DEFAULT,
            collision_mask: layers::ALL,
            is_trigger: false,
            user_data: None,
        }
    }

    /// Create a new static body description (completely immovable)
    pub fn new_static(shape: Shape) -> Self {
        Self {
            body_type: BodyType::Static,
            ..Self::new_dynamic(shape)
        }
    }

    /// Create a new kinematic body description
    pub fn new_kinematic(shape: Shape) -> Self {
        Self {
            body_type: BodyType::Kinematic,
            ..Self::new_dynamic(shape)
        }
    }

    /// Set the initial position of the body
    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Vec2::new(x, y);
        self
    }

    /// Set the initial linear velocity
    pub fn velocity(mut self, x: f32, y: f32) -> Self {
        self.velocity = Vec2::new(x, y);
        self
    }

    /// Set the initial rotation (radians)
    pub fn rotation(mut self, angle: f32) -> Self {
        self.rotation = angle;
        self
    }

    /// Set the initial angular velocity (radians per second)
    pub fn angular_velocity(mut self, angvel: f32) -> Self {
        self.angular_velocity = angvel;
        self
    }

    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        self
    }

    pub fn use_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }

    /// Cap the speed of the body (0.0 = unlimited)
    pub fn max_velocity(mut self, max_velocity: f32) -> Self {
        self.max_velocity = max_velocity;
        self
    }

    pub fn material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Set friction coefficient (0.0 = no friction, 1.0 = high friction)
    pub fn friction(mut self, friction: f32) -> Self {
        self.material.friction = friction;
        self
    }

    /// Set restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub fn restitution(mut self, restitution: f32) -> Self {
        self.material.restitution = restitution;
        self
    }

    /// Set raw layer and mask bits
    pub fn collision_filter(mut self, layer: u32, mask: u32) -> Self {
        self.collision_layer = layer;
        self.collision_mask = mask;
        self
    }

    /// Set layer and mask from a predefined group
    pub fn collision_groups(mut self, groups: CollisionGroups) -> Self {
        self.collision_layer = groups.layer();
        self.collision_mask = groups.mask();
        self
    }

    /// Mark as a trigger (overlap is reported to gameplay)
    pub fn trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    pub fn user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        self.shape.validate()?;
        self.material.validate()?;
        self.validate_motion()
    }

    fn validate_motion(&self) -> Result<(), PhysicsError> {
        if !(self.position.is_finite() && self.rotation.is_finite()) {
            return Err(PhysicsError::InvalidMotion(format!(
                "position {:?} and rotation {} must be finite",
                self.position, self.rotation
            )));
        }
        if !(self.velocity.is_finite() && self.angular_velocity.is_finite()) {
            return Err(PhysicsError::InvalidMotion(format!(
                "velocity {:?} and angular velocity {} must be finite",
                self.velocity, self.angular_velocity
            )));
        }
        if !is_non_negative(self.linear_damping) || !is_non_negative(self.angular_damping) {
            return Err(PhysicsError::InvalidMotion(format!(
                "damping must be non-negative, got linear {} angular {}",
                self.linear_damping, self.angular_damping
            )));
        }
        if !is_non_negative(self.max_velocity) {
            return Err(PhysicsError::InvalidMotion(format!(
                "max velocity must be non-negative, got {}",
                self.max_velocity
            )));
        }
        Ok(())
    }

    pub(crate) fn body_type_value(&self) -> BodyType {
        self.body_type
    }
}

fn is_non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn inverse_mass_for(body_type: BodyType, mass: f32) -> f32 {
    match body_type {
        BodyType::Static => 0.0,
        BodyType::Dynamic | BodyType::Kinematic => 1.0 / mass,
    }
}

/// A rigid body record.
///
/// Fields are private so that every position change goes through a setter
/// that keeps the cached bounding box in sync.
#[derive(Debug, Clone)]
pub struct Body {
    position: Vec2,
    velocity: Vec2,
    rotation: f32,
    angular_velocity: f32,
    mass: f32,
    inv_mass: f32,
    body_type: BodyType,
    use_gravity: bool,
    enabled: bool,
    linear_damping: f32,
    angular_damping: f32,
    max_velocity: f32,
    shape: Shape,
    material: Material,
    collision_layer: u32,
    collision_mask: u32,
    is_trigger: bool,
    user_data: Option<UserData>,
    aabb: Aabb,
}

impl Body {
    /// Build a body from a description that has already been validated
    pub(crate) fn from_desc(desc: &BodyDesc) -> Self {
        Self {
            position: desc.position,
            velocity: desc.velocity,
            rotation: desc.rotation,
            angular_velocity: desc.angular_velocity,
            mass: desc.mass,
            inv_mass: inverse_mass_for(desc.body_type, desc.mass),
            body_type: desc.body_type,
            use_gravity: desc.use_gravity,
            enabled: desc.enabled,
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
            max_velocity: desc.max_velocity,
            shape: desc.shape,
            material: desc.material,
            collision_layer: desc.collision_layer,
            collision_mask: desc.collision_mask,
            is_trigger: desc.is_trigger,
            user_data: desc.user_data,
            aabb: desc.shape.aabb(desc.position),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass; always 0.0 for static bodies
    pub fn inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn uses_gravity(&self) -> bool {
        self.use_gravity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn linear_damping(&self) -> f32 {
        self.linear_damping
    }

    pub fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    pub fn max_velocity(&self) -> f32 {
        self.max_velocity
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn collision_layer(&self) -> u32 {
        self.collision_layer
    }

    pub fn collision_mask(&self) -> u32 {
        self.collision_mask
    }

    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    pub fn user_data(&self) -> Option<UserData> {
        self.user_data
    }

    /// Cached bounding box (always matches the current position)
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Teleport the body
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.refresh_aabb();
    }

    /// Move the body by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
        self.refresh_aabb();
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.refresh_aabb();
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn set_angular_velocity(&mut self, angvel: f32) {
        self.angular_velocity = angvel;
    }

    /// Change velocity by `impulse / mass`. Static bodies ignore impulses.
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse * self.inv_mass;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_use_gravity(&mut self, use_gravity: bool) {
        self.use_gravity = use_gravity;
    }

    /// Ignored (with a warning) unless both values are finite and non-negative
    pub fn set_damping(&mut self, linear: f32, angular: f32) {
        if !is_non_negative(linear) || !is_non_negative(angular) {
            warn!("Ignoring invalid damping {linear}/{angular}");
            return;
        }
        self.linear_damping = linear;
        self.angular_damping = angular;
    }

    /// Ignored (with a warning) unless finite and non-negative
    pub fn set_max_velocity(&mut self, max_velocity: f32) {
        if !is_non_negative(max_velocity) {
            warn!("Ignoring invalid max velocity {max_velocity}");
            return;
        }
        self.max_velocity = max_velocity;
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn set_collision_filter(&mut self, layer: u32, mask: u32) {
        self.collision_layer = layer;
        self.collision_mask = mask;
    }

    pub fn set_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
    }

    pub fn set_user_data(&mut self, user_data: Option<UserData>) {
        self.user_data = user_data;
    }

    /// Change the body type and re-derive the inverse mass.
    /// Only the registry calls this, since it also moves the handle between sets.
    pub(crate) fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
        self.inv_mass = inverse_mass_for(body_type, self.mass);
        if body_type == BodyType::Static {
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
        }
    }

    pub(crate) fn refresh_aabb(&mut self) {
        self.aabb = self.shape.aabb(self.position);
    }

    /// Semi-implicit Euler step: forces, damping and clamp first, then position.
    pub(crate) fn integrate(&mut self, gravity: Vec2, dt: f32) {
        if self.use_gravity {
            self.velocity += gravity * dt;
        }

        self.velocity *= 1.0 / (1.0 + dt * self.linear_damping);
        self.angular_velocity *= 1.0 / (1.0 + dt * self.angular_damping);

        if self.max_velocity > 0.0 {
            self.velocity = self.velocity.clamp_length_max(self.max_velocity);
        }

        self.position += self.velocity * dt;
        self.rotation += self.angular_velocity * dt;
        self.refresh_aabb();
    }
}

/// Common body configurations for game objects
pub mod presets {
    use super::*;

    /// Player character: dynamic box, no bounce, capped speed
    pub fn player(owner: u64, x: f32, y: f32) -> BodyDesc {
        BodyDesc::new_dynamic(Shape::Rect {
            width: 32.0,
            height: 48.0,
        })
        .position(x, y)
        .mass(70.0)
        .restitution(0.0)
        .max_velocity(900.0)
        .collision_groups(CollisionGroups::Player)
        .user_data(UserData::new(owner, BodyTag::Player))
    }

    /// Enemy: dynamic box slightly heavier than a player
    pub fn enemy(owner: u64, x: f32, y: f32) -> BodyDesc {
        BodyDesc::new_dynamic(Shape::Rect {
            width: 32.0,
            height: 40.0,
        })
        .position(x, y)
        .mass(90.0)
        .restitution(0.1)
        .max_velocity(600.0)
        .collision_groups(CollisionGroups::Enemy)
        .user_data(UserData::new(owner, BodyTag::Enemy))
    }

    /// Bullet: small light circle ignoring gravity
    pub fn bullet(owner: u64, x: f32, y: f32, vel_x: f32, vel_y: f32) -> BodyDesc {
        BodyDesc::new_dynamic(Shape::Circle { radius: 4.0 })
            .position(x, y)
            .velocity(vel_x, vel_y)
            .mass(0.1)
            .use_gravity(false)
            .material(Material::new(0.0, 0.8, 0.1))
            .collision_groups(CollisionGroups::Bullet)
            .user_data(UserData::new(owner, BodyTag::Bullet))
    }

    /// Power-up: floating trigger circle
    pub fn powerup(owner: u64, x: f32, y: f32) -> BodyDesc {
        BodyDesc::new_dynamic(Shape::Circle { radius: 12.0 })
            .position(x, y)
            .use_gravity(false)
            .trigger(true)
            .collision_groups(CollisionGroups::Powerup)
            .user_data(UserData::new(owner, BodyTag::Powerup))
    }

    /// Platform: static box
    pub fn platform(x: f32, y: f32, width: f32, height: f32) -> BodyDesc {
        BodyDesc::new_static(Shape::Rect { width, height })
            .position(x, y)
            .friction(0.6)
            .restitution(0.0)
            .collision_groups(CollisionGroups::Platform)
    }
}
