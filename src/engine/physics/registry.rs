// Body storage: generational arena plus static/dynamic partitions

use std::collections::BTreeSet;

use log::{debug, warn};
use slotmap::SlotMap;

use super::body::{Body, BodyDesc, BodyHandle, BodyType};
use super::PhysicsError;

/// Owns every body in the world.
///
/// Handles are generation-checked, so a removed handle can never reach a body
/// that later reuses its slot. The static and dynamic sets are ordered by
/// handle, which keeps iteration stable within (and across) ticks.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    bodies: SlotMap<BodyHandle, Body>,
    static_set: BTreeSet<BodyHandle>,
    dynamic_set: BTreeSet<BodyHandle>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `desc` and register a new body
    pub fn create(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        if let Err(err) = desc.validate() {
            warn!("Rejected body description: {err}");
            return Err(err);
        }

        let handle = self.bodies.insert(Body::from_desc(desc));
        self.partition_for(desc.body_type_value()).insert(handle);
        debug!("Created {:?} body {:?}", desc.body_type_value(), handle);
        Ok(handle)
    }

    /// Remove a body. Unknown or stale handles are ignored.
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let body = self.bodies.remove(handle)?;
        self.static_set.remove(&handle);
        self.dynamic_set.remove(&handle);
        debug!("Removed body {:?}", handle);
        Some(body)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Borrow two distinct bodies mutably at once
    pub fn pair_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut Body, &mut Body)> {
        let [body_a, body_b] = self.bodies.get_disjoint_mut([a, b])?;
        Some((body_a, body_b))
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Move a body between static and non-static sets and re-derive its inverse mass
    pub fn set_body_type(&mut self, handle: BodyHandle, body_type: BodyType) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            return false;
        };
        body.set_body_type(body_type);

        self.static_set.remove(&handle);
        self.dynamic_set.remove(&handle);
        self.partition_for(body_type).insert(handle);
        true
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn static_count(&self) -> usize {
        self.static_set.len()
    }

    pub fn dynamic_count(&self) -> usize {
        self.dynamic_set.len()
    }

    /// Handles of static bodies, in handle order
    pub fn static_handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.static_set.iter().copied()
    }

    /// Handles of dynamic and kinematic bodies, in handle order
    pub fn dynamic_handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.dynamic_set.iter().copied()
    }

    /// Every registered body
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.bodies.iter()
    }

    /// Visit each non-static body mutably
    pub(crate) fn for_each_dynamic_mut(&mut self, mut f: impl FnMut(BodyHandle, &mut Body)) {
        for &handle in &self.dynamic_set {
            if let Some(body) = self.bodies.get_mut(handle) {
                f(handle, body);
            }
        }
    }

    fn partition_for(&mut self, body_type: BodyType) -> &mut BTreeSet<BodyHandle> {
        match body_type {
            BodyType::Static => &mut self.static_set,
            BodyType::Dynamic | BodyType::Kinematic => &mut self.dynamic_set,
        }
    }
}
