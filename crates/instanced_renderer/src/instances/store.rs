use instanced_core::Aabb;

use super::factory::InstanceFactory;
use super::record::{GpuInstance, Instance};

/// Hard ceiling on simultaneously active instances.  Every per-instance GPU
/// buffer is sized for exactly this many slots.
pub const MAX_INSTANCES: usize = 100;

/// Fixed-capacity instance array plus the parallel world-bounds array.
///
/// Slots are never destroyed; the active range `0..active` grows and shrinks.
/// A slot is filled by the factory the first time it becomes active and keeps
/// its state afterwards, so shrinking and regrowing restores the same scene.
pub struct InstanceStore {
    instances: Vec<Instance>,
    bounds: Vec<Aabb>,
    initialized: Vec<bool>,
    active: usize,
    local_bounds: Aabb,
    factory: InstanceFactory,
}

impl InstanceStore {
    /// Store for a mesh whose object-space box is `local_bounds`, with the
    /// first `count` slots active.
    pub fn new(factory: InstanceFactory, local_bounds: Aabb, count: usize) -> Self {
        let mut store = Self {
            instances: vec![Instance::default(); MAX_INSTANCES],
            bounds: vec![Aabb::EMPTY; MAX_INSTANCES],
            initialized: vec![false; MAX_INSTANCES],
            active: 0,
            local_bounds,
            factory,
        };
        store.set_active_count(count);
        store
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        MAX_INSTANCES
    }

    /// Active instances, in slot order.
    #[inline]
    pub fn instances(&self) -> &[Instance] {
        &self.instances[..self.active]
    }

    /// World bounds of the active instances, parallel to [`Self::instances`].
    #[inline]
    pub fn bounds(&self) -> &[Aabb] {
        &self.bounds[..self.active]
    }

    pub fn get(&self, slot: usize) -> Option<&Instance> {
        self.instances().get(slot)
    }

    pub fn local_bounds(&self) -> &Aabb {
        &self.local_bounds
    }

    /// Sets the active count, clamped to `MAX_INSTANCES`.  Returns the count
    /// actually applied.
    pub fn set_active_count(&mut self, count: usize) -> usize {
        let count = count.min(MAX_INSTANCES);
        for slot in self.active..count {
            if !self.initialized[slot] {
                self.instances[slot] = self.factory.make(slot);
                self.initialized[slot] = true;
                self.refresh_bounds(slot);
            }
        }
        self.active = count;
        count
    }

    /// Activates one more slot; `false` when already at capacity.
    pub fn grow(&mut self) -> bool {
        if self.active >= MAX_INSTANCES {
            return false;
        }
        self.set_active_count(self.active + 1);
        true
    }

    /// Deactivates the last slot; `false` when already empty.
    pub fn shrink(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        true
    }

    /// Applies `f` to the active instance at `slot` and refreshes its bounds.
    pub fn modify(&mut self, slot: usize, f: impl FnOnce(&mut Instance)) -> bool {
        if slot >= self.active {
            return false;
        }
        f(&mut self.instances[slot]);
        self.refresh_bounds(slot);
        true
    }

    /// Advances every active instance by `dt`.  Returns how many moved.
    pub fn animate(&mut self, dt: f32) -> usize {
        let mut moved = 0;
        for slot in 0..self.active {
            if self.instances[slot].advance(dt) {
                self.refresh_bounds(slot);
                moved += 1;
            }
        }
        moved
    }

    /// GPU images of the active instances.
    pub fn gpu_instances(&self) -> Vec<GpuInstance> {
        self.instances().iter().map(Instance::to_gpu).collect()
    }

    fn refresh_bounds(&mut self, slot: usize) {
        self.bounds[slot] = self.instances[slot].world_bounds(&self.local_bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::f32::consts::{FRAC_PI_2, TAU};

    fn unit_cube() -> Aabb {
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))
    }

    fn default_scene() -> InstanceStore {
        InstanceStore::new(InstanceFactory::new(1234), unit_cube(), 10)
    }

    #[test]
    fn scripted_plus_random_scene() {
        let store = default_scene();
        assert_eq!(store.len(), 10);
        assert_eq!(store.bounds().len(), 10);
        assert_eq!(store.instances()[0].position(), Vec3::ZERO);
        assert_eq!(store.instances()[1].position(), Vec3::new(2.0, 0.0, 0.0));
        for inst in &store.instances()[2..] {
            assert!(inst.position().abs().max_element() <= 3.5);
        }
    }

    #[test]
    fn one_second_of_animation_advances_orbiter_by_its_speed() {
        let mut store = default_scene();
        let before = store.instances()[1].angle();
        let origin_bounds = store.bounds()[0];

        for _ in 0..60 {
            store.animate(1.0 / 60.0);
        }

        let orbiter = &store.instances()[1];
        let expected = (before + FRAC_PI_2).rem_euclid(TAU);
        assert!((orbiter.angle() - expected).abs() < 1e-4);

        // bounds follow the new transform: +X rotated a quarter turn lands on -Z
        let b = store.bounds()[1];
        assert_eq!(b, orbiter.world_bounds(&unit_cube()));
        assert!(b.center().abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-3));

        // the stationary cube did not move
        assert_eq!(store.bounds()[0], origin_bounds);
        assert_eq!(store.instances()[0].angle(), 0.0);
    }

    #[test]
    fn count_is_clamped_to_capacity() {
        let mut store = default_scene();
        assert_eq!(store.set_active_count(MAX_INSTANCES + 50), MAX_INSTANCES);
        assert_eq!(store.len(), MAX_INSTANCES);
        assert_eq!(store.bounds().len(), MAX_INSTANCES);
        assert_eq!(store.gpu_instances().len(), MAX_INSTANCES);
        assert!(!store.grow());
        assert!(store.bounds().iter().all(|b| !b.is_empty()));
    }

    #[test]
    fn shrink_then_grow_restores_slot_state() {
        let mut store = default_scene();
        store.animate(0.5);
        let last = store.instances()[9].clone();
        assert!(store.shrink());
        assert_eq!(store.len(), 9);
        assert!(store.grow());
        assert_eq!(store.instances()[9], last);
    }

    #[test]
    fn empty_store() {
        let mut store = InstanceStore::new(InstanceFactory::new(0), unit_cube(), 0);
        assert!(store.is_empty());
        assert!(!store.shrink());
        assert_eq!(store.animate(1.0), 0);
        assert!(store.gpu_instances().is_empty());
    }

    #[test]
    fn modify_refreshes_bounds() {
        let mut store = default_scene();
        assert!(store.modify(0, |inst| inst.set_position(Vec3::new(0.0, 5.0, 0.0))));
        assert!(store.bounds()[0].center().abs_diff_eq(Vec3::new(0.0, 5.0, 0.0), 1e-5));
        assert!(!store.modify(10, |_| {}));
    }
}
