//! Cosmetic particles
//!
//! Particles never feed back into gameplay: nothing reads them except the
//! renderer, they are advanced in the effects phase after collisions, and
//! they draw from their own RNG so the particle cap cannot shift the
//! gameplay random sequence.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Mixed into the game seed for the effects stream
const EFFECTS_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Longest lifetime a burst can hand out, in ticks
pub const MAX_TTL: u32 = 60;

/// A particle for visual effects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// 0xRRGGBB
    pub tint: u32,
    /// Remaining ticks; removed at zero
    pub ttl: u32,
}

impl Particle {
    /// Fade factor in `[0, 1]`
    pub fn alpha(&self) -> f32 {
        (self.ttl as f32 / MAX_TTL as f32).min(1.0)
    }
}

/// Capped particle pool with a private random stream
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    cap: usize,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(cap: usize, seed: u64) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(512)),
            cap,
            rng: Pcg32::seed_from_u64(seed ^ EFFECTS_SEED_MIX),
        }
    }

    /// Emit `count` particles in random directions from `at`
    ///
    /// Speed is 1..3 px/tick, radius 1..4 px and lifetime 30..60 ticks.
    /// Particles beyond the cap are dropped, so a cap of zero disables
    /// effects entirely.
    pub fn burst(&mut self, at: Vec2, count: usize, tint: u32) {
        let room = self.cap.saturating_sub(self.particles.len());
        let rng = &mut self.rng;
        for _ in 0..count.min(room) {
            let angle = rng.random_range(0.0..TAU);
            let speed = rng.random_range(1.0..3.0);
            self.particles.push(Particle {
                pos: at,
                vel: Vec2::from_angle(angle) * speed,
                radius: rng.random_range(1.0..4.0),
                tint,
                ttl: rng.random_range(30..=MAX_TTL),
            });
        }
    }

    /// Move every particle one tick and drop the expired ones
    pub fn update(&mut self) {
        for p in &mut self.particles {
            p.pos += p.vel;
            p.ttl = p.ttl.saturating_sub(1);
        }
        self.particles.retain(|p| p.ttl > 0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_respects_cap() {
        let mut field = ParticleField::new(12, 7);
        field.burst(Vec2::ZERO, 10, 0xffffff);
        field.burst(Vec2::ZERO, 10, 0xffffff);
        assert_eq!(field.len(), 12);

        let mut off = ParticleField::new(0, 7);
        off.burst(Vec2::ZERO, 10, 0xffffff);
        assert!(off.is_empty());
    }

    #[test]
    fn test_same_seed_same_burst() {
        let mut a = ParticleField::new(64, 3);
        let mut b = ParticleField::new(64, 3);
        a.burst(Vec2::ONE, 5, 0xffffff);
        b.burst(Vec2::ONE, 5, 0xffffff);
        assert!(a.iter().eq(b.iter()));
    }

    #[test]
    fn test_particles_expire() {
        let mut field = ParticleField::new(64, 1);
        field.burst(Vec2::new(100.0, 100.0), 20, 0xfa8282);
        for p in field.iter() {
            assert!((30..=MAX_TTL).contains(&p.ttl));
            assert!((1.0..4.0).contains(&p.radius));
        }
        for _ in 0..MAX_TTL {
            field.update();
        }
        assert!(field.is_empty());
    }
}
