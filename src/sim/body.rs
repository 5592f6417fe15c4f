//! Bodies and axis-aligned rectangles
//!
//! Every simulated entity is a `Body`: a position, a velocity, an extent and a
//! liveness flag. Rectangular bodies are anchored at their top-left corner,
//! circular bodies at their center.

use glam::Vec2;

/// Axis-aligned rectangle (screen space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Closest point inside the rectangle to `p`
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max())
    }
}

/// Shape of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    /// Width and height, anchored at the top-left corner
    Rect(Vec2),
    /// Radius, anchored at the center
    Circle(f32),
}

/// Minimal physical state shared by all simulated entities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub extent: Extent,
    pub alive: bool,
}

impl Body {
    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            extent: Extent::Rect(Vec2::new(w, h)),
            alive: true,
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            pos: center,
            vel: Vec2::ZERO,
            extent: Extent::Circle(radius),
            alive: true,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    /// Constant-velocity Euler step
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Radius for circles, half the shorter side for rectangles
    pub fn radius(&self) -> f32 {
        match self.extent {
            Extent::Circle(r) => r,
            Extent::Rect(size) => size.min_element() * 0.5,
        }
    }

    pub fn size(&self) -> Vec2 {
        match self.extent {
            Extent::Rect(size) => size,
            Extent::Circle(r) => Vec2::splat(r * 2.0),
        }
    }

    /// Bounding rectangle
    pub fn bounds(&self) -> Rect {
        match self.extent {
            Extent::Rect(size) => Rect { min: self.pos, size },
            Extent::Circle(r) => Rect {
                min: self.pos - Vec2::splat(r),
                size: Vec2::splat(r * 2.0),
            },
        }
    }

    pub fn center(&self) -> Vec2 {
        match self.extent {
            Extent::Rect(size) => self.pos + size * 0.5,
            Extent::Circle(_) => self.pos,
        }
    }

    /// AABB test between two live bodies
    pub fn overlaps(&self, other: &Body) -> bool {
        self.alive && other.alive && self.bounds().overlaps(&other.bounds())
    }

    /// Keep the body horizontally inside `[left, right]`
    pub fn clamp_x(&mut self, left: f32, right: f32) {
        let (lo, hi) = match self.extent {
            Extent::Rect(size) => (left, right - size.x),
            Extent::Circle(r) => (left + r, right - r),
        };
        self.pos.x = self.pos.x.clamp(lo, hi.max(lo));
    }

    /// Keep the body vertically inside `[top, bottom]`
    pub fn clamp_y(&mut self, top: f32, bottom: f32) {
        let (lo, hi) = match self.extent {
            Extent::Rect(size) => (top, bottom - size.y),
            Extent::Circle(r) => (top + r, bottom - r),
        };
        self.pos.y = self.pos.y.clamp(lo, hi.max(lo));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = Rect::new(9.0, 9.0, 10.0, 10.0);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn test_circle_bounds() {
        let ball = Body::circle(Vec2::new(50.0, 40.0), 8.0);
        let b = ball.bounds();
        assert_eq!(b.min, Vec2::new(42.0, 32.0));
        assert_eq!(b.size, Vec2::splat(16.0));
        assert_eq!(ball.center(), Vec2::new(50.0, 40.0));
    }

    #[test]
    fn test_clamp_x_rect() {
        let mut paddle = Body::rect(-30.0, 500.0, 120.0, 15.0);
        paddle.clamp_x(0.0, 800.0);
        assert_eq!(paddle.pos.x, 0.0);
        paddle.pos.x = 790.0;
        paddle.clamp_x(0.0, 800.0);
        assert_eq!(paddle.pos.x, 680.0);
    }

    #[test]
    fn test_dead_bodies_never_overlap() {
        let a = Body::rect(0.0, 0.0, 10.0, 10.0);
        let mut b = Body::rect(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        b.alive = false;
        assert!(!a.overlaps(&b));
    }
}
