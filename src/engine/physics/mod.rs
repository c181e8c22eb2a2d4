// Physics system: hand-written 2D rigid bodies with spatial hash broad phase

pub mod body;
pub mod collision;
mod debug;
pub mod events;
pub mod narrow_phase;
pub mod raycast;
pub mod registry;
pub mod resolver;
pub mod spatial_hash;
mod world;

pub use body::{presets, Body, BodyDesc, BodyHandle, BodyTag, BodyType, Material, Shape, UserData};
pub use collision::{layers, CollisionGroups, ContactInfo, Manifold};
pub use debug::{DebugGeometry, DebugVertex};
pub use events::{CollisionPair, EventQueue, EventSink, NullSink, PhysicsEvent};
pub use raycast::RaycastHit;
pub use registry::BodyRegistry;
pub use spatial_hash::SpatialHash;
pub use world::{BodyTransform, PhysicsStats, PhysicsWorld, WorldConfig};

use thiserror::Error;

/// Physics errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("Invalid mass {0}: must be finite and greater than zero")]
    InvalidMass(f32),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Invalid motion state: {0}")]
    InvalidMotion(String),

    #[error("Invalid world config: {0}")]
    InvalidConfig(String),
}
