//! Fixed-size square cells over UV space.
//!
//! A [`SquareGrid`] tiles the plane with squares of one side length anchored
//! at an origin. The overlap detector uses it as a broadphase; gutter probing
//! uses the cells themselves as probe shapes.

use serde::Serialize;

use super::core::UvPoint;
use super::triangle::UvBounds;

/// Axis-aligned square in UV space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Square {
    pub min_u: f64,
    pub min_v: f64,
    pub size: f64,
    pub overlapping: bool,
}

impl Square {
    #[must_use]
    pub const fn new(min_u: f64, min_v: f64, size: f64) -> Self {
        Self {
            min_u,
            min_v,
            size,
            overlapping: false,
        }
    }

    #[must_use]
    pub fn max_u(&self) -> f64 {
        self.min_u + self.size
    }

    #[must_use]
    pub fn max_v(&self) -> f64 {
        self.min_v + self.size
    }

    /// Corners `a(min, min)`, `b(max, min)`, `c(min, max)`, `d(max, max)`.
    #[must_use]
    pub fn corners(&self) -> [UvPoint; 4] {
        let (max_u, max_v) = (self.max_u(), self.max_v());
        [
            UvPoint::new(self.min_u, self.min_v),
            UvPoint::new(max_u, self.min_v),
            UvPoint::new(self.min_u, max_v),
            UvPoint::new(max_u, max_v),
        ]
    }

    /// The four sides as point pairs, walking the outline.
    #[must_use]
    pub fn segments(&self) -> [(UvPoint, UvPoint); 4] {
        let [a, b, c, d] = self.corners();
        [(a, b), (b, d), (d, c), (c, a)]
    }

    #[must_use]
    pub fn bounds(&self) -> UvBounds {
        UvBounds::new(self.min_u, self.max_u(), self.min_v, self.max_v())
    }

    #[must_use]
    pub fn center(&self) -> UvPoint {
        let half = self.size * 0.5;
        UvPoint::new(self.min_u + half, self.min_v + half)
    }

    /// Whether `p` lies strictly inside by more than `eps`.
    #[must_use]
    pub fn contains_strictly(&self, p: UvPoint, eps: f64) -> bool {
        p.u > self.min_u + eps
            && p.u < self.max_u() - eps
            && p.v > self.min_v + eps
            && p.v < self.max_v() - eps
    }
}

/// Integer coordinates of a grid cell.
pub type Cell = (i64, i64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareGrid {
    origin: UvPoint,
    size: f64,
}

impl SquareGrid {
    /// Grid of `size`-sided squares with a cell corner at `origin`.
    ///
    /// Returns `None` for a non-positive or non-finite size.
    #[must_use]
    pub fn new(origin: UvPoint, size: f64) -> Option<Self> {
        (size.is_finite() && size > 0.0).then_some(Self { origin, size })
    }

    /// Grid sized so that `bounds` spans roughly `cells_per_axis` cells along
    /// its longer side.
    #[must_use]
    pub fn covering(bounds: UvBounds, cells_per_axis: usize) -> Option<Self> {
        let span = bounds.width().max(bounds.height());
        let cells = cells_per_axis.max(1) as f64;
        let size = if span > 0.0 { span / cells } else { 1.0 };
        Self::new(UvPoint::new(bounds.min_u, bounds.min_v), size)
    }

    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn cell_of(&self, p: UvPoint) -> Cell {
        (
            axis_cell(p.u - self.origin.u, self.size),
            axis_cell(p.v - self.origin.v, self.size),
        )
    }

    /// Inclusive cell range `(min, max)` touched by `bounds`.
    #[must_use]
    pub fn cell_range(&self, bounds: &UvBounds) -> (Cell, Cell) {
        (
            self.cell_of(UvPoint::new(bounds.min_u, bounds.min_v)),
            self.cell_of(UvPoint::new(bounds.max_u, bounds.max_v)),
        )
    }

    #[must_use]
    pub fn square(&self, cell: Cell) -> Square {
        Square::new(
            self.origin.u + cell.0 as f64 * self.size,
            self.origin.v + cell.1 as f64 * self.size,
            self.size,
        )
    }
}

fn axis_cell(offset: f64, size: f64) -> i64 {
    let q = (offset / size).floor();
    q.clamp(i64::MIN as f64, i64::MAX as f64) as i64
}
