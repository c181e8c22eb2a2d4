use std::sync::{Arc, Mutex};

use super::body::{BodyHandle, BodyTag, UserData};
use super::collision::Manifold;

/// Two tagged bodies in contact, ordered so `a` is the "actor" side
/// (player, or bullet) and the normal points from `a` to `b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    pub a: BodyHandle,
    pub b: BodyHandle,
    pub user_a: UserData,
    pub user_b: UserData,
    pub manifold: Manifold,
}

/// Notifications published by the physics world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    /// One tick of `update` finished
    Stepped { delta_time: f32, body_count: usize },

    /// A player touched an enemy
    PlayerEnemy(CollisionPair),

    /// A bullet hit an enemy
    BulletEnemy(CollisionPair),

    /// A player touched a power-up
    PlayerPowerup(CollisionPair),
}

/// Receiver for physics notifications, injected into the world.
///
/// `publish` only gets `&self` and the world is mid-update while it runs, so
/// implementations should record events rather than act on the world.
pub trait EventSink {
    fn publish(&self, event: PhysicsEvent);
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: PhysicsEvent) {}
}

/// Shared queue of physics events.
///
/// Clones share the same storage: hand one clone to the world and poll the
/// other from gameplay code.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: Arc<Mutex<Vec<PhysicsEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::with_capacity(32))), // Pre-allocate for common case
        }
    }

    /// Clear all queued events
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Copy of the queued events
    pub fn events(&self) -> Vec<PhysicsEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&self) -> Vec<PhysicsEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventQueue {
    fn publish(&self, event: PhysicsEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Map a manifold between two tagged bodies to a gameplay event, if the tag
/// pair is one gameplay cares about. Order of the two bodies does not matter.
pub fn categorize(
    manifold: &Manifold,
    user_a: Option<UserData>,
    user_b: Option<UserData>,
) -> Option<PhysicsEvent> {
    let (user_a, user_b) = (user_a?, user_b?);

    let forward = CollisionPair {
        a: manifold.body_a,
        b: manifold.body_b,
        user_a,
        user_b,
        manifold: *manifold,
    };
    let reversed = CollisionPair {
        a: manifold.body_b,
        b: manifold.body_a,
        user_a: user_b,
        user_b: user_a,
        manifold: manifold.swapped(),
    };

    match (user_a.tag, user_b.tag) {
        (BodyTag::Player, BodyTag::Enemy) => Some(PhysicsEvent::PlayerEnemy(forward)),
        (BodyTag::Enemy, BodyTag::Player) => Some(PhysicsEvent::PlayerEnemy(reversed)),
        (BodyTag::Bullet, BodyTag::Enemy) => Some(PhysicsEvent::BulletEnemy(forward)),
        (BodyTag::Enemy, BodyTag::Bullet) => Some(PhysicsEvent::BulletEnemy(reversed)),
        (BodyTag::Player, BodyTag::Powerup) => Some(PhysicsEvent::PlayerPowerup(forward)),
        (BodyTag::Powerup, BodyTag::Player) => Some(PhysicsEvent::PlayerPowerup(reversed)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::collision::ContactInfo;
    use glam::Vec2;
    use slotmap::SlotMap;

    fn manifold() -> Manifold {
        let mut keys = SlotMap::<BodyHandle, ()>::with_key();
        Manifold::new(
            keys.insert(()),
            keys.insert(()),
            ContactInfo {
                normal: Vec2::X,
                penetration: 1.0,
                point: Vec2::ZERO,
            },
        )
    }

    #[test]
    fn test_queue_shared_between_clones() {
        let queue = EventQueue::new();
        let sink = queue.clone();
        sink.publish(PhysicsEvent::Stepped {
            delta_time: 0.5,
            body_count: 3,
        });

        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.events(),
            vec![PhysicsEvent::Stepped {
                delta_time: 0.5,
                body_count: 3
            }]
        );

        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_empties_queue() {
        let queue = EventQueue::default();
        queue.publish(PhysicsEvent::Stepped {
            delta_time: 0.1,
            body_count: 0,
        });
        queue.clear();
        assert!(queue.events().is_empty());
    }

    #[test]
    fn test_categorize_orders_player_first() {
        let m = manifold();
        let player = UserData::new(1, BodyTag::Player);
        let enemy = UserData::new(2, BodyTag::Enemy);

        let Some(PhysicsEvent::PlayerEnemy(pair)) = categorize(&m, Some(enemy), Some(player)) else {
            panic!("expected a player/enemy event");
        };
        assert_eq!(pair.a, m.body_b);
        assert_eq!(pair.user_a, player);
        assert_eq!(pair.manifold.normal, -Vec2::X, "Normal must point from player to enemy");

        let Some(PhysicsEvent::PlayerEnemy(pair)) = categorize(&m, Some(player), Some(enemy)) else {
            panic!("expected a player/enemy event");
        };
        assert_eq!(pair.a, m.body_a);
        assert_eq!(pair.manifold.normal, Vec2::X);
    }

    #[test]
    fn test_categorize_other_pairs() {
        let m = manifold();
        let bullet = UserData::new(3, BodyTag::Bullet);
        let enemy = UserData::new(4, BodyTag::Enemy);
        let powerup = UserData::new(5, BodyTag::Powerup);
        let player = UserData::new(6, BodyTag::Player);
        let platform = UserData::new(7, BodyTag::Platform);

        assert!(matches!(
            categorize(&m, Some(enemy), Some(bullet)),
            Some(PhysicsEvent::BulletEnemy(pair)) if pair.user_a == bullet
        ));
        assert!(matches!(
            categorize(&m, Some(powerup), Some(player)),
            Some(PhysicsEvent::PlayerPowerup(pair)) if pair.user_b == powerup
        ));
        assert!(categorize(&m, Some(player), Some(platform)).is_none());
        assert!(categorize(&m, Some(player), None).is_none());
        assert!(categorize(&m, Some(player), Some(player)).is_none());
    }
}
