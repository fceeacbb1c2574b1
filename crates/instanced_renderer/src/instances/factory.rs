/// Produces the initial record for a slot of the instance store.
///
/// The first slots come from a fixed script; every later slot gets a random
/// placement inside the scatter cube and a random speed.  Slot specialness
/// lives only here: once created, all instances are animated the same way.
use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::record::{Instance, Material};

/// Half size of the cube random instances are scattered in.
pub const SCATTER_HALF_EXTENT: f32 = 3.5;

pub struct InstanceFactory {
    scripted: Vec<Instance>,
    rng: StdRng,
}

impl InstanceFactory {
    /// Default scene script: a stationary matte cube at the origin and a
    /// shiny cube orbiting at radius 2.
    pub fn new(seed: u64) -> Self {
        Self::with_scripted(seed, Self::default_script())
    }

    pub fn with_scripted(seed: u64, scripted: Vec<Instance>) -> Self {
        Self { scripted, rng: StdRng::seed_from_u64(seed) }
    }

    /// Factory that only ever produces random instances.
    pub fn random_only(seed: u64) -> Self {
        Self::with_scripted(seed, Vec::new())
    }

    pub fn default_script() -> Vec<Instance> {
        vec![
            Instance::new(
                Vec3::ZERO,
                0.0,
                Material { shininess: 0.0, rotation_speed: 0.0, texture: 0, normal_map: true },
            ),
            Instance::new(
                Vec3::new(2.0, 0.0, 0.0),
                0.0,
                Material { shininess: 64.0, rotation_speed: FRAC_PI_2, texture: 0, normal_map: true },
            ),
        ]
    }

    /// Number of leading slots that come from the script.
    pub fn scripted_len(&self) -> usize {
        self.scripted.len()
    }

    /// Record for `slot`.  Random slots consume the RNG, so call order
    /// determines the scene for a given seed.
    pub fn make(&mut self, slot: usize) -> Instance {
        match self.scripted.get(slot) {
            Some(inst) => inst.clone(),
            None => self.random(),
        }
    }

    fn random(&mut self) -> Instance {
        let unit = Vec3::new(self.rng.gen(), self.rng.gen(), self.rng.gen());
        let position = unit * (2.0 * SCATTER_HALF_EXTENT) - Vec3::splat(SCATTER_HALF_EXTENT);
        let shininess = if self.rng.gen::<f32>() > 0.5 { 64.0 } else { 0.0 };
        let rotation_speed = self.rng.gen::<f32>() * TAU;

        Instance::new(
            position,
            0.0,
            Material { shininess, rotation_speed, texture: 0, normal_map: true },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_slots_come_first() {
        let mut f = InstanceFactory::new(7);
        let origin = f.make(0);
        assert_eq!(origin.position(), Vec3::ZERO);
        assert!(!origin.is_animated());

        let orbiter = f.make(1);
        assert_eq!(orbiter.position(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(orbiter.material().rotation_speed, FRAC_PI_2);
        assert_eq!(orbiter.material().shininess, 64.0);
    }

    #[test]
    fn random_slots_stay_in_scatter_cube() {
        let mut f = InstanceFactory::new(42);
        for slot in 2..200 {
            let inst = f.make(slot);
            let p = inst.position();
            assert!(p.abs().max_element() <= SCATTER_HALF_EXTENT);
            let m = inst.material();
            assert!(m.shininess == 0.0 || m.shininess == 64.0);
            assert!(m.rotation_speed >= 0.0 && m.rotation_speed < TAU);
            assert!(m.normal_map);
        }
    }

    #[test]
    fn same_seed_same_scene() {
        let mut a = InstanceFactory::random_only(3);
        let mut b = InstanceFactory::random_only(3);
        for slot in 0..10 {
            assert_eq!(a.make(slot), b.make(slot));
        }
        let mut c = InstanceFactory::random_only(4);
        assert_ne!(InstanceFactory::random_only(3).make(0), c.make(0));
    }
}
