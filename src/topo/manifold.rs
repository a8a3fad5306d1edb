//! Mesh-space edge classification.
//!
//! | incident triangles | classification | face angle |
//! |---|---|---|
//! | 1 | manifold (boundary) | - |
//! | 2 | manifold | angle between the two normals |
//! | 0 or >= 3 | non-manifold | - |

use super::edge::{Edge, EdgeGraph};
use super::triangle::MeshTriangle;

#[derive(Debug, Clone, PartialEq)]
pub struct MeshEdge {
    pub edge: Edge,
    pub non_manifold: bool,
    /// Angle between the normals of the two incident triangles, in `[0, π]`.
    /// `None` unless exactly two triangles share the edge and both have a
    /// defined normal.
    pub face_angle: Option<f64>,
}

impl MeshEdge {
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.edge.triangle_count() == 1
    }
}

/// Classifies a single edge against the triangles it references.
#[must_use]
pub fn classify_edge(edge: &Edge, triangles: &[MeshTriangle]) -> MeshEdge {
    match edge.triangles.as_slice() {
        [_] => MeshEdge {
            edge: edge.clone(),
            non_manifold: false,
            face_angle: None,
        },
        [first, second] => {
            let normals = triangles
                .get(*first)
                .and_then(|t| t.normal)
                .zip(triangles.get(*second).and_then(|t| t.normal));
            MeshEdge {
                edge: edge.clone(),
                non_manifold: false,
                face_angle: normals.map(|(n0, n1)| n0.angle_to(n1)),
            }
        }
        _ => MeshEdge {
            edge: edge.clone(),
            non_manifold: true,
            face_angle: None,
        },
    }
}

/// Classifies every edge of a completed mesh-space graph.
#[must_use]
pub fn classify_edges(graph: &EdgeGraph, triangles: &[MeshTriangle]) -> Vec<MeshEdge> {
    graph
        .edges()
        .iter()
        .map(|edge| classify_edge(edge, triangles))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topo::core::Point3;

    fn tri(vertices: [usize; 3], points: [[f64; 3]; 3]) -> MeshTriangle {
        MeshTriangle::new(vertices, points.map(Point3::from_array))
    }

    #[test]
    fn boundary_edge_is_manifold_without_angle() {
        let triangles = vec![tri([0, 1, 2], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])];
        let graph = EdgeGraph::build(triangles.iter().map(|t| t.base.vertices));
        let edges = classify_edges(&graph, &triangles);
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| !e.non_manifold && e.is_boundary() && e.face_angle.is_none()));
    }

    #[test]
    fn folded_pair_reports_right_angle() {
        let triangles = vec![
            tri([0, 1, 2], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            tri([1, 0, 3], [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]),
        ];
        let graph = EdgeGraph::build(triangles.iter().map(|t| t.base.vertices));
        let shared = graph.find(0, 1).expect("shared edge");
        let classified = classify_edge(shared, &triangles);
        assert!(!classified.non_manifold);
        let angle = classified.face_angle.expect("angle");
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn three_faces_on_one_edge_are_non_manifold() {
        let triangles = vec![
            tri([0, 1, 2], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            tri([1, 0, 3], [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, -1.0, 0.0]]),
            tri([0, 1, 4], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]),
        ];
        let graph = EdgeGraph::build(triangles.iter().map(|t| t.base.vertices));
        let edges = classify_edges(&graph, &triangles);
        let flagged: Vec<_> = edges.iter().filter(|e| e.non_manifold).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].edge.key(), crate::topo::edge::EdgeKey::new(0, 1));
        assert!(flagged[0].face_angle.is_none());
    }

    #[test]
    fn edge_without_triangles_is_non_manifold() {
        let edge = Edge::new(0, 1);
        assert!(classify_edge(&edge, &[]).non_manifold);
    }

    #[test]
    fn degenerate_neighbour_suppresses_angle() {
        let triangles = vec![
            tri([0, 1, 2], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            tri([1, 0, 3], [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]),
        ];
        let graph = EdgeGraph::build(triangles.iter().map(|t| t.base.vertices));
        let shared = classify_edge(graph.find(0, 1).expect("edge"), &triangles);
        assert!(!shared.non_manifold);
        assert!(shared.face_angle.is_none());
    }
}
