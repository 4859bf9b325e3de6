//! Seeded random stream for parcel demand.
//!
//! A run draws from exactly one generator, seeded with
//! `DeliveryConfig::seed`, and only the parcel generator draws from it.  The
//! kernel resumes processes in a fixed order, so the draws happen in a fixed
//! order too and a seed replays the same run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Point;

pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform point in the disk of `radius` km around the origin, by
    /// rejection from the enclosing square.
    pub fn point_in_disk(&mut self, radius: f64) -> Point {
        loop {
            let x = self.0.gen_range(-1.0..1.0_f64);
            let y = self.0.gen_range(-1.0..1.0_f64);
            if x * x + y * y <= 1.0 {
                return Point::new(x * radius, y * radius);
            }
        }
    }
}
