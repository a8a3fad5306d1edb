//! Triangle geometry in mesh space and UV space.
//!
//! Both variants share [`Triangle`], which holds the three vertex indices, a
//! copy of the corner positions and the Heron area. [`MeshTriangle`] adds the
//! unit normal, [`UvTriangle`] adds winding, bounds and the per-pass flags set
//! by the overlap detector and the island grouper.

use serde::Serialize;

use super::core::{orient2d, Point3, SpacePoint, Tolerance, UvPoint, Vec3};

/// Triangles whose cross-product area is at most this fraction of the longest
/// side squared are collinear within floating-point precision.
const COLLINEAR_RATIO: f64 = 1e-12;

/// Heron's formula over the three side lengths.
///
/// Sides are sorted so the product is evaluated in the numerically stable
/// order; rounding that drives it below zero is clamped, so collinear input
/// yields exactly `0.0`.
#[must_use]
pub fn heron_area(a: f64, b: f64, c: f64) -> f64 {
    let mut sides = [a, b, c];
    sides.sort_by(|x, y| y.total_cmp(x));
    let [a, b, c] = sides;
    let product = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
    if product.is_finite() && product > 0.0 {
        0.25 * product.sqrt()
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle<P> {
    /// Indices into the owning [`VertexStore`](super::VertexStore).
    pub vertices: [usize; 3],
    pub points: [P; 3],
    pub area: f64,
}

impl<P: SpacePoint> Triangle<P> {
    /// Area is `0.0` when the cross product says the corners are collinear;
    /// otherwise it comes from Heron's formula.
    #[must_use]
    pub fn new(vertices: [usize; 3], points: [P; 3]) -> Self {
        let [a, b, c] = points;
        let sides = [a.distance(b), b.distance(c), c.distance(a)];
        let longest = sides[0].max(sides[1]).max(sides[2]);
        let twice_area = P::twice_area(a, b, c);
        let area = if twice_area.is_finite() && twice_area > COLLINEAR_RATIO * longest * longest {
            heron_area(sides[0], sides[1], sides[2])
        } else {
            0.0
        };
        Self {
            vertices,
            points,
            area,
        }
    }

    #[must_use]
    pub fn is_degenerate(&self, tol: Tolerance) -> bool {
        self.area <= tol.eps
    }

    /// The three vertex-index pairs `(a, b)`, `(b, c)`, `(c, a)`.
    #[must_use]
    pub fn edge_pairs(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// Number of vertex indices this triangle has in common with `other`.
    #[must_use]
    pub fn shared_vertex_count(&self, other: &Self) -> usize {
        self.vertices
            .iter()
            .filter(|v| other.vertices.contains(v))
            .count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mesh space
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTriangle {
    pub base: Triangle<Point3>,
    /// `normalize((b - a) × (c - a))`, `None` exactly when the area is zero.
    pub normal: Option<Vec3>,
    /// Paired triangle in the UV triangle list.
    pub uv_triangle: Option<usize>,
}

impl MeshTriangle {
    #[must_use]
    pub fn new(vertices: [usize; 3], points: [Point3; 3]) -> Self {
        let base = Triangle::new(vertices, points);
        let [a, b, c] = points;
        let normal = if base.area > 0.0 {
            (b - a).cross(c - a).normalized()
        } else {
            None
        };
        Self {
            base,
            normal,
            uv_triangle: None,
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.base.area
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// UV space
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned extents in UV space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UvBounds {
    pub min_u: f64,
    pub max_u: f64,
    pub min_v: f64,
    pub max_v: f64,
}

impl UvBounds {
    #[must_use]
    pub const fn new(min_u: f64, max_u: f64, min_v: f64, max_v: f64) -> Self {
        Self {
            min_u,
            max_u,
            min_v,
            max_v,
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.min_u.min(other.min_u),
            self.max_u.max(other.max_u),
            self.min_v.min(other.min_v),
            self.max_v.max(other.max_v),
        )
    }

    /// `false` when one box lies entirely to one side of the other along
    /// either axis. Boxes that only touch within `tol` are disjoint.
    #[must_use]
    pub fn overlaps(&self, other: &Self, tol: Tolerance) -> bool {
        !(self.max_u <= other.min_u + tol.eps
            || other.max_u <= self.min_u + tol.eps
            || self.max_v <= other.min_v + tol.eps
            || other.max_v <= self.min_v + tol.eps)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_u - self.min_u
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_v - self.min_v
    }

    /// Whether the box lies inside the unit UV square `[0, 1] x [0, 1]`.
    #[must_use]
    pub fn is_within_unit_range(&self) -> bool {
        self.min_u >= 0.0 && self.max_u <= 1.0 && self.min_v >= 0.0 && self.max_v <= 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvTriangle {
    pub base: Triangle<UvPoint>,
    /// Signed test of `(b - a) × (c - b)`; negative means mirrored winding.
    pub inverted: bool,
    pub bounds: UvBounds,
    /// Set once by the overlap detector, never cleared within a pass.
    pub overlapping: bool,
    /// Assigned by the island grouper.
    pub island: Option<usize>,
    /// Paired triangle in the mesh triangle list.
    pub mesh_triangle: usize,
}

impl UvTriangle {
    #[must_use]
    pub fn new(vertices: [usize; 3], points: [UvPoint; 3], mesh_triangle: usize) -> Self {
        let base = Triangle::new(vertices, points);
        let [a, b, c] = points;
        let winding = (b.u - a.u) * (c.v - b.v) - (b.v - a.v) * (c.u - b.u);
        let bounds = UvBounds::new(
            a.u.min(b.u).min(c.u),
            a.u.max(b.u).max(c.u),
            a.v.min(b.v).min(c.v),
            a.v.max(b.v).max(c.v),
        );
        Self {
            base,
            inverted: winding < 0.0,
            bounds,
            overlapping: false,
            island: None,
            mesh_triangle,
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.base.area
    }

    #[must_use]
    pub fn centroid(&self) -> UvPoint {
        let [a, b, c] = self.base.points;
        UvPoint::new((a.u + b.u + c.u) / 3.0, (a.v + b.v + c.v) / 3.0)
    }

    /// Whether `p` lies strictly inside the triangle, i.e. on the inner side
    /// of all three edges by more than `tol`. Works for either winding.
    #[must_use]
    pub fn contains_strictly(&self, p: UvPoint, tol: Tolerance) -> bool {
        let [a, b, c] = self.base.points;
        let sign = if orient2d(a, b, c) >= 0.0 { 1.0 } else { -1.0 };
        sign * orient2d(a, b, p) > tol.eps
            && sign * orient2d(b, c, p) > tol.eps
            && sign * orient2d(c, a, p) > tol.eps
    }

    /// The three edges as point pairs.
    #[must_use]
    pub fn segments(&self) -> [(UvPoint, UvPoint); 3] {
        let [a, b, c] = self.base.points;
        [(a, b), (b, c), (c, a)]
    }
}
