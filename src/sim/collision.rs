//! Collision detection and response for rectangles and circles
//!
//! Tests run on post-integration positions with no sub-stepping, so a very
//! fast body can tunnel through a thin obstacle. Speeds are capped well below
//! the thinnest obstacle in every game.

use glam::Vec2;

use super::body::{Body, Rect};

/// Which velocity component a contact reflects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitAxis {
    /// Contact on a left/right face: invert `vel.x`
    Horizontal,
    /// Contact on a top/bottom face: invert `vel.y`
    Vertical,
}

/// Result of a circle-vs-rectangle check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the rectangle to the circle center
    pub point: Vec2,
    /// Face of minimum penetration
    pub axis: HitAxis,
    /// Penetration depth along `axis`
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            axis: HitAxis::Vertical,
            penetration: 0.0,
        }
    }
}

/// Per-side wall flags: which walls reflect, or which were hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Sides {
    pub const ALL: Sides = Sides {
        left: true,
        right: true,
        top: true,
        bottom: true,
    };

    /// Left, right and top solid; bottom open (ball lost)
    pub const OPEN_BOTTOM: Sides = Sides {
        left: true,
        right: true,
        top: true,
        bottom: false,
    };

    /// Top and bottom solid; sides open (Pong goals)
    pub const HORIZONTAL_ONLY: Sides = Sides {
        left: false,
        right: false,
        top: true,
        bottom: true,
    };

    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Circle-vs-rectangle overlap using center-to-edge clamping
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = rect.clamp_point(center);
    (center - closest).length_squared() < radius * radius
}

/// Check collision between a circle and a rectangle
///
/// On a hit, the reflecting face is the one with the smallest penetration
/// among the four edges.
pub fn circle_rect_collision(center: Vec2, radius: f32, rect: &Rect) -> CollisionResult {
    if !circle_rect_overlap(center, radius, rect) {
        return CollisionResult::miss();
    }

    let overlap_left = (center.x + radius) - rect.left();
    let overlap_right = rect.right() - (center.x - radius);
    let overlap_top = (center.y + radius) - rect.top();
    let overlap_bottom = rect.bottom() - (center.y - radius);

    let horizontal = overlap_left.min(overlap_right);
    let vertical = overlap_top.min(overlap_bottom);

    let (axis, penetration) = if horizontal < vertical {
        (HitAxis::Horizontal, horizontal)
    } else {
        (HitAxis::Vertical, vertical)
    };

    CollisionResult {
        hit: true,
        point: rect.clamp_point(center),
        axis,
        penetration,
    }
}

/// Invert the velocity component for the given axis
#[inline]
pub fn reflect_axis(vel: Vec2, axis: HitAxis) -> Vec2 {
    match axis {
        HitAxis::Horizontal => Vec2::new(-vel.x, vel.y),
        HitAxis::Vertical => Vec2::new(vel.x, -vel.y),
    }
}

/// Reflect a body off the solid walls of `field`
///
/// Each wall reflects only the component normal to it, so a corner hit
/// reflects both components independently. The velocity is forced to point
/// back into the field, so a body that is still overlapping a wall on the
/// next tick is not flipped back out. Returns the walls that were hit.
pub fn bounce_off_walls(body: &mut Body, field: &Rect, solid: Sides) -> Sides {
    let b = body.bounds();
    let mut hit = Sides::default();

    if solid.left && b.left() < field.left() {
        body.vel.x = body.vel.x.abs();
        hit.left = true;
    }
    if solid.right && b.right() > field.right() {
        body.vel.x = -body.vel.x.abs();
        hit.right = true;
    }
    if solid.top && b.top() < field.top() {
        body.vel.y = body.vel.y.abs();
        hit.top = true;
    }
    if solid.bottom && b.bottom() > field.bottom() {
        body.vel.y = -body.vel.y.abs();
        hit.bottom = true;
    }

    hit
}

/// Outgoing velocity off a paddle
///
/// `offset` is the strike position relative to the paddle center in
/// `[-1, 1]`; it maps linearly into a cone of `±max_angle` around straight
/// up. The incoming speed is preserved.
pub fn paddle_rebound(vel: Vec2, offset: f32, max_angle: f32) -> Vec2 {
    let speed = vel.length();
    let angle = offset.clamp(-1.0, 1.0) * max_angle;
    crate::heading(angle) * speed
}

/// Multiply speed by `factor`, saturating at `max_speed`
///
/// Never lowers the speed: a body already at or above the cap keeps its
/// speed, so repeated boosts are monotonically non-decreasing.
pub fn boost(vel: Vec2, factor: f32, max_speed: f32) -> Vec2 {
    let speed = vel.length();
    if speed <= f32::EPSILON || speed >= max_speed {
        return vel;
    }
    let target = (speed * factor.max(1.0)).min(max_speed).max(speed);
    vel * (target / speed)
}

/// Index of the first live target overlapping `projectile`
///
/// First match wins: the caller kills exactly one target per projectile.
pub fn first_hit<'a, I>(projectile: &Body, targets: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a Body>,
{
    targets
        .into_iter()
        .position(|target| projectile.overlaps(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_circle_rect_bottom_face() {
        // Brick at (30, 60), 70x25; ball just under its bottom edge moving up
        let brick = Rect::new(30.0, 60.0, 70.0, 25.0);
        let result = circle_rect_collision(Vec2::new(65.0, 90.0), 8.0, &brick);
        assert!(result.hit);
        assert_eq!(result.axis, HitAxis::Vertical);
        assert!((result.penetration - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_circle_rect_side_face() {
        let brick = Rect::new(100.0, 100.0, 70.0, 25.0);
        let result = circle_rect_collision(Vec2::new(95.0, 112.0), 8.0, &brick);
        assert!(result.hit);
        assert_eq!(result.axis, HitAxis::Horizontal);
    }

    #[test]
    fn test_circle_rect_corner_miss() {
        // Diagonal from the corner: bounding boxes overlap, circle does not
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!circle_rect_overlap(Vec2::new(16.0, 16.0), 8.0, &rect));
        assert!(!circle_rect_collision(Vec2::new(16.0, 16.0), 8.0, &rect).hit);
    }

    #[test]
    fn test_bounce_off_corner_reflects_both() {
        let field = Rect::new(0.0, 0.0, 800.0, 600.0);
        let mut ball = Body::circle(Vec2::new(3.0, 3.0), 8.0).with_velocity(Vec2::new(-4.0, -5.0));
        let hit = bounce_off_walls(&mut ball, &field, Sides::ALL);
        assert!(hit.left && hit.top);
        assert_eq!(ball.vel, Vec2::new(4.0, 5.0));
    }

    #[test]
    fn test_open_bottom_does_not_reflect() {
        let field = Rect::new(0.0, 0.0, 800.0, 600.0);
        let mut ball = Body::circle(Vec2::new(400.0, 605.0), 8.0).with_velocity(Vec2::new(0.0, 5.0));
        let hit = bounce_off_walls(&mut ball, &field, Sides::OPEN_BOTTOM);
        assert!(!hit.any());
        assert_eq!(ball.vel.y, 5.0);
    }

    #[test]
    fn test_paddle_rebound_preserves_speed() {
        let incoming = Vec2::new(3.0, 4.0);
        for offset in [-1.0, -0.5, 0.0, 0.3, 1.0] {
            let out = paddle_rebound(incoming, offset, PI / 3.0);
            assert!((out.length() - 5.0).abs() < 1e-4);
            assert!(out.y < 0.0, "rebound must head upward");
        }
        // Edge strike lands on the cone boundary
        let edge = paddle_rebound(incoming, 1.0, PI / 3.0);
        assert!((edge.x.atan2(-edge.y) - PI / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_boost_saturates_and_never_slows() {
        let v = Vec2::new(0.0, -10.0);
        let boosted = boost(v, 1.01, 14.0);
        assert!((boosted.length() - 10.1).abs() < 1e-4);

        let near_cap = Vec2::new(0.0, 13.99);
        assert!((boost(near_cap, 1.01, 14.0).length() - 14.0).abs() < 1e-4);

        let above_cap = Vec2::new(0.0, 20.0);
        assert_eq!(boost(above_cap, 1.01, 14.0), above_cap);
    }

    #[test]
    fn test_first_hit_picks_one() {
        let shot = Body::rect(10.0, 10.0, 4.0, 15.0);
        let targets = [
            Body::rect(100.0, 0.0, 35.0, 35.0),
            Body::rect(0.0, 0.0, 35.0, 35.0),
            Body::rect(5.0, 5.0, 35.0, 35.0),
        ];
        assert_eq!(first_hit(&shot, &targets), Some(1));
    }
}
