//! Play-space bounds
//!
//! An axis-aligned box from the abyss/left/back corner to the
//! ceiling/right/front corner. Zones split it at the center on X.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::host::BoundsProvider;
use crate::sim::SpawnZone;
use crate::uniform;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl GameBounds {
    /// Corners in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The half of the box belonging to a zone
    pub fn zone(&self, zone: SpawnZone) -> GameBounds {
        let mid = self.center().x;
        match zone {
            SpawnZone::Left => GameBounds {
                min: self.min,
                max: Vec3::new(mid, self.max.y, self.max.z),
            },
            SpawnZone::Right => GameBounds {
                min: Vec3::new(mid, self.min.y, self.min.z),
                max: self.max,
            },
        }
    }

    /// Uniform point on X/Z, in the lower quarter of the height
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let low_ceiling = self.min.y + (self.max.y - self.min.y) / 4.0;
        Vec3::new(
            uniform(rng, self.min.x, self.max.x),
            uniform(rng, self.min.y, low_ceiling),
            uniform(rng, self.min.z, self.max.z),
        )
    }
}

impl BoundsProvider for GameBounds {
    fn check_bounds(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    fn filter_bounds(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field() -> GameBounds {
        GameBounds::new(Vec3::new(100.0, 40.0, 50.0), Vec3::new(-100.0, 0.0, -50.0))
    }

    #[test]
    fn test_new_orders_corners() {
        let b = field();
        assert_eq!(b.min, Vec3::new(-100.0, 0.0, -50.0));
        assert_eq!(b.max, Vec3::new(100.0, 40.0, 50.0));
    }

    #[test]
    fn test_check_and_filter() {
        let b = field();
        assert!(b.check_bounds(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!b.check_bounds(Vec3::new(150.0, 1.0, 0.0)));
        assert_eq!(
            b.filter_bounds(Vec3::new(150.0, -5.0, -80.0)),
            Vec3::new(100.0, 0.0, -50.0)
        );
    }

    #[test]
    fn test_zone_halves() {
        let b = field();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..200 {
            let l = b.zone(SpawnZone::Left).random_point(&mut rng);
            let r = b.zone(SpawnZone::Right).random_point(&mut rng);
            assert!(l.x <= 0.0 && b.check_bounds(l));
            assert!(r.x >= 0.0 && b.check_bounds(r));
            assert!(l.y <= 10.0);
        }
    }
}
