//! Simulation primitives shared by every game
//!
//! Everything here is pure and deterministic:
//! - Fixed timestep only (one call = one tick)
//! - Seeded RNG only, passed in by the caller
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod particles;
pub mod spawn;

pub use body::{Body, Extent, Rect};
pub use collision::{
    CollisionResult, HitAxis, Sides, boost, bounce_off_walls, circle_rect_collision, circle_rect_overlap,
    first_hit, paddle_rebound, reflect_axis,
};
pub use particles::{Particle, ParticleField};
pub use spawn::{GridLayout, IntervalSpawner, pipe_gap_top, place_free_cell, shuffle};
