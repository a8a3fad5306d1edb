//! Undirected edge graph derived from triangle index triples.
//!
//! The same builder serves mesh space and UV space: it only looks at vertex
//! indices. Edges are keyed by `(min(index), max(index))` so direction never
//! matters, and each edge collects every triangle that uses it.

use std::collections::HashMap;

/// Canonical key of an undirected edge: `(min_vertex, max_vertex)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub usize, pub usize);

impl EdgeKey {
    #[must_use]
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub vertex_a: usize,
    pub vertex_b: usize,
    /// Triangles incident to this edge, in insertion order.
    pub triangles: Vec<usize>,
}

impl Edge {
    #[must_use]
    pub fn new(vertex_a: usize, vertex_b: usize) -> Self {
        Self {
            vertex_a,
            vertex_b,
            triangles: Vec::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.vertex_a, self.vertex_b)
    }

    /// Two edges match when they join the same pair of vertices, in either
    /// direction.
    #[must_use]
    pub fn check_for_match(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// More than one triangle uses this edge.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.triangles.len() > 1
    }

    /// Both endpoints are the same vertex.
    #[must_use]
    pub fn is_zero_length(&self) -> bool {
        self.vertex_a == self.vertex_b
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeGraph {
    edges: Vec<Edge>,
    lookup: HashMap<EdgeKey, usize>,
}

impl EdgeGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from triangle vertex triples; triangle `i` of the
    /// iterator is recorded as triangle index `i`.
    pub fn build(triangles: impl IntoIterator<Item = [usize; 3]>) -> Self {
        let triangles = triangles.into_iter();
        let mut graph = Self::new();
        let (hint, _) = triangles.size_hint();
        graph.edges.reserve(hint.saturating_mul(3) / 2);
        graph.lookup.reserve(hint.saturating_mul(3) / 2);

        for (t, [a, b, c]) in triangles.enumerate() {
            for (from, to) in [(a, b), (b, c), (c, a)] {
                graph.attach(from, to, t);
            }
        }
        graph
    }

    /// Appends `triangle` to the edge `(a, b)`, creating the edge if needed.
    /// Returns the edge index.
    pub fn attach(&mut self, a: usize, b: usize, triangle: usize) -> usize {
        let key = EdgeKey::new(a, b);
        let index = match self.lookup.get(&key) {
            Some(&existing) => existing,
            None => {
                let index = self.edges.len();
                self.edges.push(Edge::new(a, b));
                self.lookup.insert(key, index);
                index
            }
        };
        self.edges[index].triangles.push(triangle);
        index
    }

    #[must_use]
    pub fn find(&self, a: usize, b: usize) -> Option<&Edge> {
        self.lookup
            .get(&EdgeKey::new(a, b))
            .map(|&index| &self.edges[index])
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges used by exactly one triangle.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.triangle_count() == 1).count()
    }

    #[must_use]
    pub fn shared_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_shared()).count()
    }

    #[must_use]
    pub fn zero_length_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_zero_length()).count()
    }
}
