//! UV overlap detection.
//!
//! Each candidate pair runs through the stages below, cheapest first, and
//! stops at the first stage that decides:
//!
//! 1. bounding-box rejection
//! 2. shared-vertex short-circuits (3 shared: overlap, 2 shared: side test)
//! 3. containment (a vertex, an edge midpoint or the centroid strictly inside
//!    the other shape)
//! 4. proper crossing of any edge pair
//!
//! The test is conservative: shapes that only touch along edges or at
//! vertices never count as overlapping, and degenerate triangles have no
//! interior to overlap with.
//!
//! Flags are written after all pairs are evaluated, by a single writer, so the
//! pair evaluation can fan out under the `parallel` feature.

use std::collections::HashMap;

use serde::Serialize;

use super::core::{orient2d, Tolerance, UvPoint};
use super::grid::{Cell, Square, SquareGrid};
use super::triangle::{UvBounds, UvTriangle};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Upper bound on broadphase cells per axis.
const MAX_GRID_CELLS_PER_AXIS: usize = 1024;

/// Candidate-pair search used before the exact overlap test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Broadphase {
    /// Every pair of triangles is a candidate.
    Pairwise,
    /// Triangles are bucketed into a uniform square grid sized for about
    /// `target_per_cell` triangles per cell; only triangles sharing a cell
    /// become candidates.
    Grid { target_per_cell: usize },
}

impl Default for Broadphase {
    fn default() -> Self {
        Self::Grid { target_per_cell: 8 }
    }
}

/// Outcome of one overlap pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlapReport {
    /// Pairs that reached the exact test.
    pub candidate_pairs: usize,
    /// Overlapping pairs `(i, j)` with `i < j`, sorted.
    pub pairs: Vec<(usize, usize)>,
    /// Triangles flagged as overlapping.
    pub overlapping_triangles: usize,
}

/// Whether the segments `p` and `q` cross at a single interior point.
///
/// Touching at an endpoint or running collinear does not count.
#[must_use]
pub fn segments_cross(p: (UvPoint, UvPoint), q: (UvPoint, UvPoint), tol: Tolerance) -> bool {
    let d1 = orient2d(q.0, q.1, p.0);
    let d2 = orient2d(q.0, q.1, p.1);
    let d3 = orient2d(p.0, p.1, q.0);
    let d4 = orient2d(p.0, p.1, q.1);
    opposite_sides(d1, d2, tol) && opposite_sides(d3, d4, tol)
}

fn opposite_sides(a: f64, b: f64, tol: Tolerance) -> bool {
    (a > tol.eps && b < -tol.eps) || (a < -tol.eps && b > tol.eps)
}

fn same_side(a: f64, b: f64, tol: Tolerance) -> bool {
    (a > tol.eps && b > tol.eps) || (a < -tol.eps && b < -tol.eps)
}

/// Exact-stage overlap test between two UV triangles.
#[must_use]
pub fn triangles_overlap(a: &UvTriangle, b: &UvTriangle, tol: Tolerance) -> bool {
    if a.base.is_degenerate(tol) || b.base.is_degenerate(tol) {
        return false;
    }
    if !a.bounds.overlaps(&b.bounds, tol) {
        return false;
    }

    match a.base.shared_vertex_count(&b.base) {
        3 => return true,
        2 => return shared_edge_same_side(a, b, tol),
        _ => {}
    }

    if a.base.points.iter().any(|&p| b.contains_strictly(p, tol))
        || b.base.points.iter().any(|&p| a.contains_strictly(p, tol))
        || b.contains_strictly(a.centroid(), tol)
        || a.contains_strictly(b.centroid(), tol)
        || edge_midpoints(a).iter().any(|&p| b.contains_strictly(p, tol))
        || edge_midpoints(b).iter().any(|&p| a.contains_strictly(p, tol))
    {
        return true;
    }

    a.segments()
        .iter()
        .any(|&sa| b.segments().iter().any(|&sb| segments_cross(sa, sb, tol)))
}

fn edge_midpoints(tri: &UvTriangle) -> [UvPoint; 3] {
    tri.segments()
        .map(|(p, q)| UvPoint::new((p.u + q.u) * 0.5, (p.v + q.v) * 0.5))
}

/// Two triangles on a common edge overlap exactly when their free vertices
/// fall on the same side of that edge.
fn shared_edge_same_side(a: &UvTriangle, b: &UvTriangle, tol: Tolerance) -> bool {
    let mut shared = [UvPoint::new(0.0, 0.0); 2];
    let mut found = 0;
    let mut free_a = None;
    for (slot, vertex) in a.base.vertices.iter().enumerate() {
        if b.base.vertices.contains(vertex) && found < 2 {
            shared[found] = a.base.points[slot];
            found += 1;
        } else {
            free_a = Some(a.base.points[slot]);
        }
    }
    let free_b = b
        .base
        .vertices
        .iter()
        .position(|v| !a.base.vertices.contains(v))
        .map(|slot| b.base.points[slot]);

    match (free_a, free_b) {
        (Some(fa), Some(fb)) => same_side(
            orient2d(shared[0], shared[1], fa),
            orient2d(shared[0], shared[1], fb),
            tol,
        ),
        _ => false,
    }
}

/// Square-versus-triangle test with the same stages, the square's four sides
/// standing in for a triangle's three edges.
#[must_use]
pub fn square_overlaps_triangle(square: &Square, tri: &UvTriangle, tol: Tolerance) -> bool {
    if tri.base.is_degenerate(tol) {
        return false;
    }
    if !square.bounds().overlaps(&tri.bounds, tol) {
        return false;
    }

    if square.corners().iter().any(|&p| tri.contains_strictly(p, tol))
        || tri.base.points.iter().any(|&p| square.contains_strictly(p, tol.eps))
        || square.contains_strictly(tri.centroid(), tol.eps)
        || tri.contains_strictly(square.center(), tol)
    {
        return true;
    }

    square
        .segments()
        .iter()
        .any(|&s| tri.segments().iter().any(|&t| segments_cross(s, t, tol)))
}

/// Runs the overlap pass over `triangles` and sets their `overlapping` flags.
pub fn detect_overlaps(
    triangles: &mut [UvTriangle],
    broadphase: Broadphase,
    tol: Tolerance,
) -> OverlapReport {
    let candidates = match broadphase {
        Broadphase::Pairwise => pairwise_candidates(triangles, tol),
        Broadphase::Grid { target_per_cell } => grid_candidates(triangles, target_per_cell, tol),
    };
    log::trace!(
        "overlap broadphase {:?}: {} candidate pairs for {} triangles",
        broadphase,
        candidates.len(),
        triangles.len()
    );

    let pairs = evaluate_candidates(triangles, &candidates, tol);
    for &(i, j) in &pairs {
        triangles[i].overlapping = true;
        triangles[j].overlapping = true;
    }

    OverlapReport {
        candidate_pairs: candidates.len(),
        overlapping_triangles: triangles.iter().filter(|t| t.overlapping).count(),
        pairs,
    }
}

fn active_indices(triangles: &[UvTriangle], tol: Tolerance) -> Vec<usize> {
    triangles
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.base.is_degenerate(tol))
        .map(|(i, _)| i)
        .collect()
}

fn pairwise_candidates(triangles: &[UvTriangle], tol: Tolerance) -> Vec<(usize, usize)> {
    let active = active_indices(triangles, tol);
    let mut out = Vec::new();
    for (k, &i) in active.iter().enumerate() {
        for &j in &active[k + 1..] {
            if triangles[i].bounds.overlaps(&triangles[j].bounds, tol) {
                out.push((i, j));
            }
        }
    }
    out
}

fn grid_candidates(
    triangles: &[UvTriangle],
    target_per_cell: usize,
    tol: Tolerance,
) -> Vec<(usize, usize)> {
    let active = active_indices(triangles, tol);
    let Some(bounds) = active
        .iter()
        .map(|&i| triangles[i].bounds)
        .reduce(UvBounds::union)
    else {
        return Vec::new();
    };

    let per_cell = target_per_cell.max(1) as f64;
    let cells_per_axis = ((active.len() as f64 / per_cell).sqrt().ceil() as usize)
        .clamp(1, MAX_GRID_CELLS_PER_AXIS);
    let Some(grid) = SquareGrid::covering(bounds, cells_per_axis) else {
        return pairwise_candidates(triangles, tol);
    };
    log::trace!(
        "overlap grid: {} cells per axis, cell size {}",
        cells_per_axis,
        grid.size()
    );

    let ranges: HashMap<usize, (Cell, Cell)> = active
        .iter()
        .map(|&i| (i, grid.cell_range(&triangles[i].bounds)))
        .collect();

    let mut buckets: HashMap<Cell, Vec<usize>> = HashMap::new();
    for &i in &active {
        let (lo, hi) = ranges[&i];
        for cu in lo.0..=hi.0 {
            for cv in lo.1..=hi.1 {
                buckets.entry((cu, cv)).or_default().push(i);
            }
        }
    }

    let mut out = Vec::new();
    for (cell, members) in &buckets {
        for (k, &i) in members.iter().enumerate() {
            for &j in &members[k + 1..] {
                let (lo_i, _) = ranges[&i];
                let (lo_j, _) = ranges[&j];
                // Each pair is emitted only from the first cell both share.
                let first_shared = (lo_i.0.max(lo_j.0), lo_i.1.max(lo_j.1));
                if first_shared != *cell {
                    continue;
                }
                if triangles[i].bounds.overlaps(&triangles[j].bounds, tol) {
                    out.push((i.min(j), i.max(j)));
                }
            }
        }
    }
    out.sort_unstable();
    out
}

#[cfg(feature = "parallel")]
fn evaluate_candidates(
    triangles: &[UvTriangle],
    candidates: &[(usize, usize)],
    tol: Tolerance,
) -> Vec<(usize, usize)> {
    candidates
        .par_iter()
        .filter(|&&(i, j)| triangles_overlap(&triangles[i], &triangles[j], tol))
        .copied()
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_candidates(
    triangles: &[UvTriangle],
    candidates: &[(usize, usize)],
    tol: Tolerance,
) -> Vec<(usize, usize)> {
    candidates
        .iter()
        .filter(|&&(i, j)| triangles_overlap(&triangles[i], &triangles[j], tol))
        .copied()
        .collect()
}
