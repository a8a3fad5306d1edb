//! Density and extent aggregation over a UV triangle set.
//!
//! Per-triangle density is `uv_area / mesh_area` (zero when the mesh area is
//! zero). The model-wide bounds feed texel-density checks; the gutter probe
//! checks that islands keep a minimum pixel distance from each other.

use std::collections::HashMap;

use serde::Serialize;

use super::core::{Tolerance, UvPoint};
use super::grid::{Cell, Square, SquareGrid};
use super::island::UvIsland;
use super::overlap::square_overlaps_triangle;
use super::triangle::{MeshTriangle, UvBounds, UvTriangle};

/// Minimum and maximum `uv_area / mesh_area` across a triangle set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityBounds {
    pub min_density: f64,
    pub max_density: f64,
}

impl DensityBounds {
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_density: self.min_density.min(other.min_density),
            max_density: self.max_density.max(other.max_density),
        }
    }
}

/// Texture-space density of one triangle.
#[must_use]
pub fn triangle_density(uv_area: f64, mesh_area: f64) -> f64 {
    if mesh_area > 0.0 && mesh_area.is_finite() {
        uv_area / mesh_area
    } else {
        0.0
    }
}

/// Density bounds over `uv_triangles`, reading each triangle's 3D area from
/// its paired entry in `mesh_triangles`. `None` for an empty set.
#[must_use]
pub fn density_bounds(
    uv_triangles: &[UvTriangle],
    mesh_triangles: &[MeshTriangle],
) -> Option<DensityBounds> {
    uv_triangles
        .iter()
        .map(|t| {
            let mesh_area = mesh_triangles
                .get(t.mesh_triangle)
                .map_or(0.0, MeshTriangle::area);
            let density = triangle_density(t.area(), mesh_area);
            DensityBounds {
                min_density: density,
                max_density: density,
            }
        })
        .reduce(DensityBounds::union)
}

/// Componentwise min/max of all triangle bounds. `None` for an empty set.
#[must_use]
pub fn uv_extents(uv_triangles: &[UvTriangle]) -> Option<UvBounds> {
    uv_triangles.iter().map(|t| t.bounds).reduce(UvBounds::union)
}

/// Density bounds expressed in texture pixels per mesh unit for a
/// `width` x `height` texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TexelDensity {
    pub min_pixels_per_unit: f64,
    pub max_pixels_per_unit: f64,
}

impl TexelDensity {
    #[must_use]
    pub fn from_density(bounds: DensityBounds, width: u32, height: u32) -> Self {
        let pixels = f64::from(width) * f64::from(height);
        Self {
            min_pixels_per_unit: (bounds.min_density.max(0.0) * pixels).sqrt(),
            max_pixels_per_unit: (bounds.max_density.max(0.0) * pixels).sqrt(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gutter probing
// ─────────────────────────────────────────────────────────────────────────────

/// Upper bound on gutter squares per axis of the unit square. Finer requests
/// fall back to squares of `1 / MAX_GUTTER_CELLS_PER_AXIS`.
pub const MAX_GUTTER_CELLS_PER_AXIS: u32 = 4096;

/// Texture resolution and required gutter between islands, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GutterOptions {
    pub resolution: u32,
    pub gutter_width_px: f64,
}

impl GutterOptions {
    /// Side of one probe square in UV units.
    #[must_use]
    pub fn square_size(&self) -> f64 {
        if self.resolution == 0 {
            return 0.0;
        }
        self.gutter_width_px / f64::from(self.resolution)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GutterReport {
    /// Side of the squares actually tested, after the per-axis cap.
    pub square_size: f64,
    /// Squares touched by at least one triangle.
    pub squares_tested: usize,
    /// Squares touched by two or more islands, flagged `overlapping`.
    pub violations: Vec<Square>,
}

impl GutterReport {
    #[must_use]
    pub fn passes(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Tiles the unit UV square with gutter-sized squares anchored at the origin
/// and flags every square that triangles from more than one island reach into.
///
/// Only `[0, 1] x [0, 1]` is tiled, so the work is bounded by
/// `MAX_GUTTER_CELLS_PER_AXIS` squared whatever the UV span. Triangles must
/// already carry island indices.
#[must_use]
pub fn probe_gutters(
    uv_triangles: &[UvTriangle],
    islands: &[UvIsland],
    options: GutterOptions,
    tol: Tolerance,
) -> GutterReport {
    let requested = options.square_size();
    if !(requested.is_finite() && requested > 0.0) {
        return GutterReport::default();
    }
    let size = requested.max(1.0 / f64::from(MAX_GUTTER_CELLS_PER_AXIS));
    let Some(grid) = SquareGrid::new(UvPoint::new(0.0, 0.0), size) else {
        return GutterReport::default();
    };
    // Cells 0..=last cover the unit square.
    let last = ((1.0 / size).ceil() as i64 - 1).max(0);
    if islands.len() < 2 {
        return GutterReport {
            square_size: size,
            ..GutterReport::default()
        };
    }

    let mut touched: HashMap<Cell, Vec<usize>> = HashMap::new();
    for tri in uv_triangles {
        let Some(island) = tri.island else {
            continue;
        };
        let (lo, hi) = grid.cell_range(&tri.bounds);
        for cu in lo.0.max(0)..=hi.0.min(last) {
            for cv in lo.1.max(0)..=hi.1.min(last) {
                let cell = (cu, cv);
                if square_overlaps_triangle(&grid.square(cell), tri, tol) {
                    let islands_here = touched.entry(cell).or_default();
                    if !islands_here.contains(&island) {
                        islands_here.push(island);
                    }
                }
            }
        }
    }

    let mut violating: Vec<Cell> = touched
        .iter()
        .filter(|(_, here)| here.len() > 1)
        .map(|(cell, _)| *cell)
        .collect();
    violating.sort_unstable();

    let violations = violating
        .into_iter()
        .map(|cell| Square {
            overlapping: true,
            ..grid.square(cell)
        })
        .collect();

    GutterReport {
        square_size: size,
        squares_tested: touched.len(),
        violations,
    }
}
