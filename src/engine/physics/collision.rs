use glam::Vec2;

use super::body::BodyHandle;

/// Raw layer bits. A body's layer says what it *is*, its mask what it *collides with*.
pub mod layers {
    pub const DEFAULT: u32 = 0b0000_0001;
    pub const PLAYER: u32 = 0b0000_0010;
    pub const ENEMY: u32 = 0b0000_0100;
    pub const BULLET: u32 = 0b0000_1000;
    pub const POWERUP: u32 = 0b0001_0000;
    pub const PLATFORM: u32 = 0b0010_0000;
    pub const HAZARD: u32 = 0b0100_0000;
    pub const SENSOR: u32 = 0b1000_0000;

    /// Every bit set
    pub const ALL: u32 = u32::MAX;
}

/// Collision groups for filtering what objects can collide with each other
///
/// Each group maps to one layer bit plus a default mask. Bodies built from
/// presets use these; hand-built bodies can set raw bits instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionGroups {
    /// Default group - interacts with everything
    Default,

    /// Player characters
    Player,

    /// Enemy characters
    Enemy,

    /// Projectiles fired by players
    Bullet,

    /// Pickups (health, power-ups, etc.)
    Powerup,

    /// Static platforms and walls
    Platform,

    /// Arena hazards (spikes, lava, etc.)
    Hazard,

    /// Trigger zones
    Sensor,
}

impl CollisionGroups {
    /// The layer bit identifying members of this group
    pub fn layer(self) -> u32 {
        match self {
            CollisionGroups::Default => layers::DEFAULT,
            CollisionGroups::Player => layers::PLAYER,
            CollisionGroups::Enemy => layers::ENEMY,
            CollisionGroups::Bullet => layers::BULLET,
            CollisionGroups::Powerup => layers::POWERUP,
            CollisionGroups::Platform => layers::PLATFORM,
            CollisionGroups::Hazard => layers::HAZARD,
            CollisionGroups::Sensor => layers::SENSOR,
        }
    }

    /// The layers this group wants to collide with
    pub fn mask(self) -> u32 {
        match self {
            // Players never collide with each other or with their own bullets
            CollisionGroups::Player => {
                layers::PLATFORM | layers::ENEMY | layers::POWERUP | layers::HAZARD | layers::SENSOR
            }

            CollisionGroups::Enemy => {
                layers::PLATFORM | layers::PLAYER | layers::BULLET | layers::ENEMY
            }

            CollisionGroups::Bullet => layers::ENEMY | layers::PLATFORM,

            CollisionGroups::Powerup => layers::PLAYER | layers::PLATFORM,

            CollisionGroups::Platform => {
                layers::PLAYER | layers::ENEMY | layers::BULLET | layers::POWERUP
            }

            CollisionGroups::Hazard => layers::PLAYER,

            CollisionGroups::Sensor | CollisionGroups::Default => layers::ALL,
        }
    }
}

/// Layer/mask filter test.
///
/// Passes when either body's mask accepts the other's layer. This is
/// intentionally looser than requiring both directions to agree.
pub fn filter_allows(layer_a: u32, mask_a: u32, layer_b: u32, mask_b: u32) -> bool {
    (mask_a & layer_b) != 0 || (mask_b & layer_a) != 0
}

/// Result of an exact shape test, before it is tied to body handles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactInfo {
    /// Unit normal pointing from shape A toward shape B
    pub normal: Vec2,
    /// Penetration depth (never negative)
    pub penetration: f32,
    /// Contact point in world space
    pub point: Vec2,
}

impl ContactInfo {
    /// The same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A single contact between two bodies, valid for the tick that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Unit normal pointing from A toward B
    pub normal: Vec2,
    pub penetration: f32,
    pub contact_point: Vec2,
}

impl Manifold {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, info: ContactInfo) -> Self {
        Self {
            body_a,
            body_b,
            normal: info.normal,
            penetration: info.penetration,
            contact_point: info.point,
        }
    }

    /// Swap the two bodies, keeping the normal pointing from the new A to the new B
    pub fn swapped(&self) -> Self {
        Self {
            body_a: self.body_b,
            body_b: self.body_a,
            normal: -self.normal,
            ..*self
        }
    }
}
