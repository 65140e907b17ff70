//! World-space geometry handed to the debug renderer by simulation code.

use core::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 2D vector in world units (Y up) or screen pixels (Y down), depending on use.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, rhs: Vec2) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl From<[f32; 2]> for Vec2 {
    #[inline]
    fn from(v: [f32; 2]) -> Self {
        Vec2::new(v[0], v[1])
    }
}

impl From<Vec2> for [f32; 2] {
    #[inline]
    fn from(v: Vec2) -> Self {
        [v.x, v.y]
    }
}

/// Rotation stored as a sine/cosine pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rot {
    pub s: f32,
    pub c: f32,
}

impl Rot {
    pub const IDENTITY: Rot = Rot { s: 0.0, c: 1.0 };

    #[inline]
    pub fn from_angle(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self { s, c }
    }

    #[inline]
    pub fn angle(self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotated X axis.
    #[inline]
    pub fn x_axis(self) -> Vec2 {
        Vec2::new(self.c, self.s)
    }

    /// Rotated Y axis.
    #[inline]
    pub fn y_axis(self) -> Vec2 {
        Vec2::new(-self.s, self.c)
    }

    /// Rotate a vector.
    #[inline]
    pub fn apply(self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }
}

impl Default for Rot {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rigid transform: translation `p` followed by rotation `q`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub p: Vec2,
    pub q: Rot,
}

impl Transform {
    #[inline]
    pub const fn new(p: Vec2, q: Rot) -> Self {
        Self { p, q }
    }

    /// Map a body-local point into world space.
    #[inline]
    pub fn apply(self, local: Vec2) -> Vec2 {
        self.q.apply(local) + self.p
    }
}

/// Axis-aligned bounding box given by its lower and upper corners.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub lower: Vec2,
    pub upper: Vec2,
}

impl Aabb {
    #[inline]
    pub const fn new(lower: Vec2, upper: Vec2) -> Self {
        Self { lower, upper }
    }

    /// Corners in counter-clockwise order starting at `lower`.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        [
            self.lower,
            Vec2::new(self.upper.x, self.lower.y),
            self.upper,
            Vec2::new(self.lower.x, self.upper.y),
        ]
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        (self.lower + self.upper) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    #[test]
    fn rot_quarter_turn_axes() {
        let q = Rot::from_angle(core::f32::consts::FRAC_PI_2);
        assert!(approx(q.x_axis(), Vec2::new(0.0, 1.0)));
        assert!(approx(q.y_axis(), Vec2::new(-1.0, 0.0)));
    }

    #[test]
    fn rot_angle_round_trips() {
        let q = Rot::from_angle(0.75);
        assert!((q.angle() - 0.75).abs() < EPS);
    }

    #[test]
    fn transform_rotates_then_translates() {
        let xf = Transform::new(Vec2::new(1.0, 2.0), Rot::from_angle(core::f32::consts::PI));
        assert!(approx(xf.apply(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 2.0)));
    }

    #[test]
    fn aabb_corners_are_counter_clockwise() {
        let aabb = Aabb::new(Vec2::new(-1.0, -2.0), Vec2::new(3.0, 4.0));
        let c = aabb.corners();
        assert_eq!(c[0], Vec2::new(-1.0, -2.0));
        assert_eq!(c[1], Vec2::new(3.0, -2.0));
        assert_eq!(c[2], Vec2::new(3.0, 4.0));
        assert_eq!(c[3], Vec2::new(-1.0, 4.0));
        assert_eq!(aabb.center(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn vec2_length_and_scalar_mul() {
        let v = 2.0 * Vec2::new(3.0, 4.0);
        assert!((v.length() - 10.0).abs() < EPS);
        assert_eq!(-v, Vec2::new(-6.0, -8.0));
    }
}
