use std::fmt;
use std::ops::{Neg, Sub};

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Unit-length copy of this vector, or `None` for a zero or non-finite vector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 0.0 {
            Some(Self::new(self.x / len, self.y / len, self.z / len))
        } else {
            None
        }
    }

    /// Unsigned angle to `rhs` in `[0, π]`.
    ///
    /// Computed as `atan2(|a × b|, a · b)`; inputs need not be normalized.
    #[must_use]
    pub fn angle_to(self, rhs: Self) -> f64 {
        let axis = self.cross(rhs);
        axis.length().atan2(self.dot(rhs))
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UvPoint
// ─────────────────────────────────────────────────────────────────────────────

/// A point in UV parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UvPoint {
    /// U parameter value.
    pub u: f64,
    /// V parameter value.
    pub v: f64,
}

impl UvPoint {
    /// Create a new UV point.
    #[must_use]
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

/// Twice the signed area of `(a, b, c)`: positive for counter-clockwise order.
#[must_use]
pub fn orient2d(a: UvPoint, b: UvPoint, c: UvPoint) -> f64 {
    (b.u - a.u) * (c.v - a.v) - (b.v - a.v) * (c.u - a.u)
}

// ─────────────────────────────────────────────────────────────────────────────
// SpacePoint
// ─────────────────────────────────────────────────────────────────────────────

/// A coordinate type the topology types can be built over.
///
/// Implemented for [`Point3`] (mesh space) and [`UvPoint`] (texture space).
/// Missing axes read as zero so a 2D point can share 3D keys.
pub trait SpacePoint: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Number of meaningful axes.
    const DIM: usize;

    /// Coordinate along `axis`, `0.0` for `axis >= DIM`.
    fn axis(&self, axis: usize) -> f64;

    /// Twice the area of `(a, b, c)` from the cross product. Exactly zero for
    /// collinear points whose differences are exact.
    fn twice_area(a: Self, b: Self, c: Self) -> f64;

    fn distance(self, other: Self) -> f64 {
        let mut sum = 0.0;
        for axis in 0..Self::DIM {
            let d = self.axis(axis) - other.axis(axis);
            sum += d * d;
        }
        sum.sqrt()
    }
}

impl SpacePoint for Point3 {
    const DIM: usize = 3;

    fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => 0.0,
        }
    }

    fn twice_area(a: Self, b: Self, c: Self) -> f64 {
        (b - a).cross(c - a).length()
    }
}

impl SpacePoint for UvPoint {
    const DIM: usize = 2;

    fn axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.u,
            1 => self.v,
            _ => 0.0,
        }
    }

    fn twice_area(a: Self, b: Self, c: Self) -> f64 {
        orient2d(a, b, c).abs()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance for the geometric predicates of the engine: orientation signs,
/// degenerate areas and bounding-box slack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default geometric tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MatchPrecision
// ─────────────────────────────────────────────────────────────────────────────

/// Decimal places used when matching vertex positions.
pub const VERTEX_MATCH_DIGITS: u32 = 6;

/// How coordinates are rounded before two vertices are compared.
///
/// Two vertices match when every coordinate rounds to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchPrecision {
    /// Round to `digits` decimal places (scale `10^digits`).
    Decimal(u32),
    /// Scale by `10 XOR digits` before rounding (12 for six digits), matching
    /// assets audited by the legacy validator.
    LegacyBitwise(u32),
}

impl MatchPrecision {
    /// Multiplier applied to a coordinate before rounding.
    #[must_use]
    pub fn scale(self) -> f64 {
        match self {
            Self::Decimal(digits) => 10f64.powi(digits.min(15) as i32),
            Self::LegacyBitwise(digits) => f64::from(10u32 ^ digits),
        }
    }

    /// Integer key of `value` at this precision.
    ///
    /// Keys saturate at the `i64` range, so coordinates whose scaled value
    /// exceeds about `9.2e18` (`9.2e12` at six decimal places) all share the
    /// extreme key and match each other.
    #[must_use]
    pub fn quantize(self, value: f64) -> i64 {
        let q = (value * self.scale()).round();
        q.clamp(i64::MIN as f64, i64::MAX as f64) as i64
    }

    /// Rounded value of `value` at this precision.
    #[must_use]
    pub fn round(self, value: f64) -> f64 {
        let scale = self.scale();
        (value * scale).round() / scale
    }

    /// Key of a whole point, padded with zeros past `P::DIM`.
    #[must_use]
    pub fn key<P: SpacePoint>(self, point: P) -> [i64; 3] {
        [
            self.quantize(point.axis(0)),
            self.quantize(point.axis(1)),
            self.quantize(point.axis(2)),
        ]
    }
}

impl Default for MatchPrecision {
    fn default() -> Self {
        Self::Decimal(VERTEX_MATCH_DIGITS)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
