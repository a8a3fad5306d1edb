//! Connected components of UV triangles.
//!
//! Two triangles are adjacent when they share a non-degenerate UV edge, i.e.
//! the same two UV vertex indices. Islands are numbered in the order their
//! first triangle appears in the input, and each island lists its triangles
//! in traversal order, so a given input always groups identically.

use serde::Serialize;

use super::edge::EdgeGraph;
use super::triangle::{UvBounds, UvTriangle};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UvIsland {
    pub index: usize,
    pub triangles: Vec<usize>,
    pub bounds: UvBounds,
    pub uv_area: f64,
}

/// Groups `triangles` into islands using the adjacency recorded in
/// `uv_edges`, which must have been built from the same triangle list.
/// Writes each triangle's `island` field.
pub fn group_islands(triangles: &mut [UvTriangle], uv_edges: &EdgeGraph) -> Vec<UvIsland> {
    let mut assigned: Vec<Option<usize>> = vec![None; triangles.len()];
    let mut islands: Vec<UvIsland> = Vec::new();
    let mut stack = Vec::new();

    for seed in 0..triangles.len() {
        if assigned[seed].is_some() {
            continue;
        }
        let index = islands.len();
        assigned[seed] = Some(index);
        stack.push(seed);

        let mut members = Vec::new();
        let mut bounds = triangles[seed].bounds;
        let mut uv_area = 0.0;

        while let Some(t) = stack.pop() {
            members.push(t);
            bounds = bounds.union(triangles[t].bounds);
            uv_area += triangles[t].area();

            for (a, b) in triangles[t].base.edge_pairs() {
                let Some(edge) = uv_edges.find(a, b) else {
                    continue;
                };
                if edge.is_zero_length() {
                    continue;
                }
                for &other in &edge.triangles {
                    if other < assigned.len() && assigned[other].is_none() {
                        assigned[other] = Some(index);
                        stack.push(other);
                    }
                }
            }
        }

        islands.push(UvIsland {
            index,
            triangles: members,
            bounds,
            uv_area,
        });
    }

    for (tri, island) in triangles.iter_mut().zip(assigned) {
        tri.island = island;
    }
    islands
}
