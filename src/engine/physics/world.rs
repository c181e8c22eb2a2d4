use glam::Vec2;
use log::{debug, trace, warn};

use super::body::{Body, BodyDesc, BodyHandle, BodyType};
use super::collision::Manifold;
use super::events::{categorize, EventSink, NullSink, PhysicsEvent};
use super::narrow_phase;
use super::raycast::{self, RaycastHit};
use super::registry::BodyRegistry;
use super::resolver::{self, DEFAULT_CORRECTION_PERCENT};
use super::spatial_hash::{SpatialHash, DEFAULT_CELL_SIZE};
use super::PhysicsError;

/// Tunables for a physics world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Gravity acceleration (default: 980 units/s² pointing down the screen)
    pub gravity: Vec2,
    /// Step length the scheduler is expected to use. `update` accepts any
    /// delta; sub-stepping is the caller's job.
    pub fixed_timestep: f32,
    /// Not read by `update`, which resolves each contact once
    pub velocity_iterations: u32,
    /// Not read by `update`, which resolves each contact once
    pub position_iterations: u32,
    /// Broad phase grid cell size in world units
    pub cell_size: f32,
    /// Share of penetration removed per contact, in (0, 1]
    pub correction_percent: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 980.0),
            fixed_timestep: 1.0 / 60.0,
            velocity_iterations: 8,
            position_iterations: 3,
            cell_size: DEFAULT_CELL_SIZE,
            correction_percent: DEFAULT_CORRECTION_PERCENT,
        }
    }
}

impl WorldConfig {
    fn validate(&self) -> Result<(), PhysicsError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "fixed timestep must be positive, got {}",
                self.fixed_timestep
            )));
        }
        if !(self.correction_percent > 0.0 && self.correction_percent <= 1.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "correction percent must be within (0, 1], got {}",
                self.correction_percent
            )));
        }
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig("gravity must be finite".to_string()));
        }
        Ok(())
    }
}

/// Counters for the most recent tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsStats {
    pub body_count: usize,
    pub dynamic_count: usize,
    pub static_count: usize,
    /// Broad phase candidate pairs examined
    pub collision_checks: usize,
    /// Manifolds produced by the narrow phase
    pub collisions_detected: usize,
}

/// Per-body transform handed to the renderer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyTransform {
    pub position: [f32; 2],
    pub rotation: f32,
    _padding: f32,
}

impl BodyTransform {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position: position.to_array(),
            rotation,
            _padding: 0.0,
        }
    }
}

/// Physics world that owns every body and runs the simulation
pub struct PhysicsWorld {
    config: WorldConfig,

    /// All bodies, partitioned into static and dynamic sets
    registry: BodyRegistry,

    /// Broad phase grid, rebuilt every tick
    broad_phase: SpatialHash,

    /// Where collision and step notifications go
    sink: Box<dyn EventSink>,

    /// Contacts found during the last tick
    manifolds: Vec<Manifold>,

    stats: PhysicsStats,
}

impl PhysicsWorld {
    /// Create a new physics world with default settings
    pub fn new() -> Self {
        let config = WorldConfig::default();
        Self {
            broad_phase: SpatialHash::new(config.cell_size),
            config,
            registry: BodyRegistry::new(),
            sink: Box::new(NullSink),
            manifolds: Vec::new(),
            stats: PhysicsStats::default(),
        }
    }

    /// Create a new physics world with custom settings
    pub fn with_config(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self {
            broad_phase: SpatialHash::new(config.cell_size),
            config,
            ..Self::new()
        })
    }

    /// Route notifications to `sink` instead of discarding them
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn set_event_sink(&mut self, sink: impl EventSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Add a body to the world
    pub fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        self.registry.create(desc)
    }

    /// Remove a body. Returns false (and does nothing) for unknown handles.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.registry.remove(handle).is_some()
    }

    /// Get a reference to a body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.registry.get(handle)
    }

    /// Get a mutable reference to a body. Position setters on [`Body`] keep
    /// its bounds in sync.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.registry.get_mut(handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.registry.contains(handle)
    }

    /// Change a body's type, moving it between the static and dynamic sets
    pub fn set_body_type(&mut self, handle: BodyHandle, body_type: BodyType) -> bool {
        self.registry.set_body_type(handle, body_type)
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    /// Advance the simulation by `delta_time` seconds.
    ///
    /// Integrate → rebuild broad phase → narrow phase → resolve → notify.
    pub fn update(&mut self, delta_time: f32) {
        if !delta_time.is_finite() {
            warn!("Skipping physics tick with non-finite delta time {delta_time}");
            return;
        }

        if delta_time > 0.0 {
            self.integrate(delta_time);
        }

        self.rebuild_broad_phase();
        let pairs = self.broad_phase.potential_collisions();

        self.manifolds.clear();
        for &(handle_a, handle_b) in &pairs {
            let (Some(a), Some(b)) = (self.registry.get(handle_a), self.registry.get(handle_b))
            else {
                continue;
            };
            if let Some(manifold) = narrow_phase::detect(handle_a, a, handle_b, b) {
                trace!(
                    "Contact {:?} -> {:?}: normal {:?}, depth {}",
                    handle_a,
                    handle_b,
                    manifold.normal,
                    manifold.penetration
                );
                self.manifolds.push(manifold);
            }
        }

        for manifold in &self.manifolds {
            if let Some((a, b)) = self.registry.pair_mut(manifold.body_a, manifold.body_b) {
                resolver::resolve_contact(a, b, manifold, self.config.correction_percent);
            }
        }

        self.stats = PhysicsStats {
            body_count: self.registry.len(),
            dynamic_count: self.registry.dynamic_count(),
            static_count: self.registry.static_count(),
            collision_checks: pairs.len(),
            collisions_detected: self.manifolds.len(),
        };
        debug!("Physics tick: {:?}", self.stats);

        self.publish_events(delta_time);
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        self.registry.for_each_dynamic_mut(|_, body| {
            if body.is_enabled() {
                body.integrate(gravity, dt);
            }
        });
    }

    fn rebuild_broad_phase(&mut self) {
        self.broad_phase.clear();
        for (handle, body) in self.registry.iter() {
            if body.is_enabled() {
                self.broad_phase.insert(handle, &body.aabb());
            }
        }
    }

    fn publish_events(&self, delta_time: f32) {
        for manifold in &self.manifolds {
            let user_a = self.registry.get(manifold.body_a).and_then(Body::user_data);
            let user_b = self.registry.get(manifold.body_b).and_then(Body::user_data);
            if let Some(event) = categorize(manifold, user_a, user_b) {
                self.sink.publish(event);
            }
        }

        self.sink.publish(PhysicsEvent::Stepped {
            delta_time,
            body_count: self.stats.body_count,
        });
    }

    /// Cast a ray and return every hit, nearest first
    pub fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        layer_mask: u32,
    ) -> Vec<RaycastHit> {
        raycast::raycast(&self.registry, origin, direction, max_distance, layer_mask)
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, x: f32, y: f32) {
        self.config.gravity = Vec2::new(x, y);
    }

    /// Get current gravity
    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Counters from the most recent tick
    pub fn stats(&self) -> PhysicsStats {
        self.stats
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Get the step length the scheduler should feed to `update`
    pub fn fixed_timestep(&self) -> f32 {
        self.config.fixed_timestep
    }

    /// Contacts detected during the last tick
    pub fn manifolds(&self) -> &[Manifold] {
        &self.manifolds
    }

    /// Position and rotation of every body, for the renderer
    pub fn transforms(&self) -> Vec<(BodyHandle, BodyTransform)> {
        self.registry
            .iter()
            .map(|(handle, body)| (handle, BodyTransform::new(body.position(), body.rotation())))
            .collect()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::body::{presets, Shape};
    use crate::engine::physics::events::EventQueue;
    use approx::assert_relative_eq;

    fn circle(radius: f32) -> Shape {
        Shape::Circle { radius }
    }

    #[test]
    fn test_world_config_default() {
        let config = WorldConfig::default();
        assert_eq!(config.gravity, Vec2::new(0.0, 980.0));
        assert!((config.fixed_timestep - 1.0 / 60.0).abs() < 1e-7);
        assert_eq!(config.velocity_iterations, 8);
        assert_eq!(config.position_iterations, 3);
        assert_eq!(config.cell_size, 64.0);
    }

    #[test]
    fn test_with_config_rejects_bad_cell_size() {
        let config = WorldConfig {
            cell_size: 0.0,
            ..WorldConfig::default()
        };
        assert!(matches!(
            PhysicsWorld::with_config(config),
            Err(PhysicsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_free_fall_single_tick() {
        let mut world = PhysicsWorld::new();
        let handle = world.create_body(&BodyDesc::new_dynamic(circle(1.0))).unwrap();

        world.update(1.0 / 60.0);

        let body = world.body(handle).unwrap();
        assert_relative_eq!(body.velocity().y, 980.0 / 60.0, epsilon = 1e-4);
        assert_relative_eq!(body.position().y, body.velocity().y / 60.0, epsilon = 1e-6);
    }

    #[test]
    fn test_static_and_disabled_bodies_do_not_move() {
        let mut world = PhysicsWorld::new();
        let fixed = world.create_body(&BodyDesc::new_static(circle(1.0))).unwrap();
        let disabled = world
            .create_body(&BodyDesc::new_dynamic(circle(1.0)).position(500.0, 0.0).enabled(false))
            .unwrap();

        world.update(0.5);

        assert_eq!(world.body(fixed).unwrap().position(), Vec2::ZERO);
        assert_eq!(world.body(disabled).unwrap().position(), Vec2::new(500.0, 0.0));
    }

    #[test]
    fn test_body_falls_onto_platform() {
        let mut world = PhysicsWorld::new();
        world.create_body(&presets::platform(0.0, 100.0, 400.0, 20.0)).unwrap();
        let player = world.create_body(&presets::player(1, 0.0, 50.0)).unwrap();

        for _ in 0..180 {
            world.update(1.0 / 60.0);
        }

        // Platform top is at y = 90, player half height is 24
        let body = world.body(player).unwrap();
        assert!(
            body.position().y < 90.0 && body.position().y > 50.0,
            "Player should rest on the platform: y = {}",
            body.position().y
        );
        assert!(
            body.velocity().y.abs() < 50.0,
            "Player should have mostly settled: vy = {}",
            body.velocity().y
        );
    }

    #[test]
    fn test_stats_and_stepped_event() {
        let queue = EventQueue::new();
        let mut world = PhysicsWorld::new().with_event_sink(queue.clone());
        world.set_gravity(0.0, 0.0);
        world
            .create_body(&BodyDesc::new_dynamic(circle(10.0)).position(0.0, 0.0))
            .unwrap();
        world
            .create_body(&BodyDesc::new_dynamic(circle(10.0)).position(15.0, 0.0))
            .unwrap();
        world
            .create_body(&BodyDesc::new_dynamic(circle(10.0)).position(1000.0, 0.0))
            .unwrap();

        world.update(1.0 / 60.0);

        let stats = world.stats();
        assert_eq!(stats.body_count, 3);
        assert_eq!(stats.dynamic_count, 3);
        assert_eq!(stats.collision_checks, 1);
        assert_eq!(stats.collisions_detected, 1);
        assert_eq!(world.manifolds().len(), 1);
        assert_eq!(
            queue.drain(),
            vec![PhysicsEvent::Stepped {
                delta_time: 1.0 / 60.0,
                body_count: 3
            }]
        );
    }

    #[test]
    fn test_categorized_event_published() {
        let queue = EventQueue::new();
        let mut world = PhysicsWorld::new().with_event_sink(queue.clone());
        world.set_gravity(0.0, 0.0);
        let enemy = world.create_body(&presets::enemy(2, 0.0, 0.0)).unwrap();
        let player = world.create_body(&presets::player(1, 20.0, 0.0)).unwrap();

        world.update(1.0 / 60.0);

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        match events[0] {
            PhysicsEvent::PlayerEnemy(pair) => {
                assert_eq!(pair.a, player);
                assert_eq!(pair.b, enemy);
                assert_eq!(pair.manifold.normal, Vec2::new(-1.0, 0.0));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(events[1], PhysicsEvent::Stepped { .. }));
    }

    #[test]
    fn test_non_finite_delta_skips_tick() {
        let queue = EventQueue::new();
        let mut world = PhysicsWorld::new().with_event_sink(queue.clone());
        let handle = world.create_body(&BodyDesc::new_dynamic(circle(1.0))).unwrap();

        world.update(f32::NAN);

        assert_eq!(world.body(handle).unwrap().position(), Vec2::ZERO);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_delta_still_separates_overlaps() {
        let mut world = PhysicsWorld::new();
        let a = world.create_body(&BodyDesc::new_dynamic(circle(10.0))).unwrap();
        let b = world
            .create_body(&BodyDesc::new_dynamic(circle(10.0)).position(15.0, 0.0))
            .unwrap();

        world.update(0.0);

        let gap = world.body(b).unwrap().position().x - world.body(a).unwrap().position().x;
        assert_relative_eq!(gap, 19.0, epsilon = 1e-4);
    }

    #[test]
    fn test_transforms_follow_bodies() {
        let mut world = PhysicsWorld::new();
        let handle = world
            .create_body(&BodyDesc::new_static(circle(1.0)).position(3.0, 4.0).rotation(0.5))
            .unwrap();

        let transforms = world.transforms();
        assert_eq!(transforms.len(), 1);
        assert_eq!(transforms[0].0, handle);
        assert_eq!(transforms[0].1, BodyTransform::new(Vec2::new(3.0, 4.0), 0.5));
        assert_eq!(bytemuck::cast_slice::<BodyTransform, f32>(&[transforms[0].1]).len(), 4);
    }

    #[test]
    fn test_disabled_body_never_collides() {
        let queue = EventQueue::new();
        let mut world = PhysicsWorld::new().with_event_sink(queue.clone());
        world.set_gravity(0.0, 0.0);
        let player = world.create_body(&presets::player(1, 0.0, 0.0)).unwrap();
        let enemy = world
            .create_body(&presets::enemy(2, 10.0, 0.0).enabled(false))
            .unwrap();

        world.update(1.0 / 60.0);

        assert!(world.manifolds().is_empty());
        assert_eq!(world.stats().collision_checks, 0);
        assert_eq!(world.body(player).unwrap().position(), Vec2::ZERO);
        assert_eq!(world.body(enemy).unwrap().position(), Vec2::new(10.0, 0.0));
        let events = queue.drain();
        assert_eq!(events.len(), 1, "Only the step notification expected");
        assert!(matches!(events[0], PhysicsEvent::Stepped { .. }));
    }

    #[test]
    fn test_trigger_pair_resolved_and_reported() {
        let queue = EventQueue::new();
        let mut world = PhysicsWorld::new().with_event_sink(queue.clone());
        world.set_gravity(0.0, 0.0);
        let player = world.create_body(&presets::player(1, 0.0, 0.0)).unwrap();
        let powerup = world.create_body(&presets::powerup(5, 20.0, 0.0)).unwrap();
        assert!(world.body(powerup).unwrap().is_trigger());

        world.update(1.0 / 60.0);

        assert!(
            world.body(powerup).unwrap().position().x > 20.0,
            "Trigger bodies are still pushed apart"
        );
        assert!(world.body(player).unwrap().position().x < 0.0);
        assert!(queue.drain().iter().any(|event| matches!(
            event,
            PhysicsEvent::PlayerPowerup(pair) if pair.a == player && pair.b == powerup
        )));
    }

    #[test]
    fn test_kinematic_body_integrates_and_has_mass() {
        let mut world = PhysicsWorld::new();
        let falling = world.create_body(&BodyDesc::new_kinematic(circle(1.0))).unwrap();
        world.update(1.0 / 60.0);
        assert_relative_eq!(world.body(falling).unwrap().velocity().y, 980.0 / 60.0, epsilon = 1e-4);

        world.set_gravity(0.0, 0.0);
        let mover = world
            .create_body(
                &BodyDesc::new_kinematic(circle(10.0))
                    .position(0.0, 500.0)
                    .velocity(60.0, 0.0),
            )
            .unwrap();
        let pusher = world
            .create_body(&BodyDesc::new_dynamic(circle(10.0)).position(16.0, 500.0))
            .unwrap();

        world.update(1.0 / 60.0);

        // Moved 1 unit by its own velocity, then took half of the correction
        // and the impulse like any non-static body of equal mass
        let mover = world.body(mover).unwrap();
        assert_eq!(mover.body_type(), BodyType::Kinematic);
        assert_relative_eq!(mover.position().x, -1.0, epsilon = 1e-4);
        assert_relative_eq!(mover.velocity().x, 24.0, epsilon = 1e-3);
        assert_relative_eq!(world.body(pusher).unwrap().position().x, 18.0, epsilon = 1e-4);
    }

    #[test]
    fn test_circle_first_contact_with_rect_separates() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(0.0, 0.0);
        let ball = world.create_body(&BodyDesc::new_dynamic(circle(10.0))).unwrap();
        let wall = world
            .create_body(
                &BodyDesc::new_static(Shape::Rect {
                    width: 10.0,
                    height: 40.0,
                })
                .position(14.0, 0.0),
            )
            .unwrap();

        world.update(1.0 / 60.0);

        let manifold = world.manifolds()[0];
        assert_eq!((manifold.body_a, manifold.body_b), (ball, wall));
        assert_eq!(manifold.normal, Vec2::X, "Normal must point from the circle to the rect");
        assert_relative_eq!(manifold.penetration, 1.0, epsilon = 1e-5);
        assert_relative_eq!(world.body(ball).unwrap().position().x, -0.8, epsilon = 1e-5);
        assert_eq!(world.body(wall).unwrap().position(), Vec2::new(14.0, 0.0));
    }

    #[test]
    fn test_invalid_motion_rejected_and_world_stays_finite() {
        let mut world = PhysicsWorld::new();
        let result = world.create_body(
            &BodyDesc::new_dynamic(circle(1.0))
                .velocity(1.0, 0.0)
                .linear_damping(-60.0),
        );
        assert!(matches!(result, Err(PhysicsError::InvalidMotion(_))));
        assert!(world.registry().is_empty());

        let handle = world.create_body(&BodyDesc::new_dynamic(circle(1.0))).unwrap();
        world.body_mut(handle).unwrap().set_damping(-60.0, 0.0);
        world.update(1.0 / 60.0);
        world.update(1.0 / 60.0);

        let body = world.body(handle).unwrap();
        assert!(body.position().is_finite() && body.velocity().is_finite());
    }

    #[test]
    fn test_huge_body_does_not_stall_update() {
        let mut world = PhysicsWorld::new();
        world.set_gravity(0.0, 0.0);
        world
            .create_body(&BodyDesc::new_static(Shape::Rect {
                width: 1.0e12,
                height: 1.0e12,
            }))
            .unwrap();
        world
            .create_body(&BodyDesc::new_dynamic(circle(1.0)).position(3.0e11, 0.0))
            .unwrap();

        world.update(1.0 / 60.0);

        assert_eq!(world.stats().collision_checks, 1);
        assert_eq!(world.stats().body_count, 2);
    }
}
