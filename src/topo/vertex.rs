//! Indexed vertex storage with approximate position matching.
//!
//! Triangles never own their corner positions; they refer to vertices in a
//! [`VertexStore`] by index. The store hands out one index per distinct
//! position, where "distinct" means the coordinates differ after rounding at
//! the configured [`MatchPrecision`].

use std::collections::HashMap;

use super::core::{MatchPrecision, SpacePoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex<P> {
    pub index: usize,
    pub position: P,
}

impl<P: SpacePoint> Vertex<P> {
    /// Returns `true` when every coordinate of both vertices rounds to the same
    /// value at `precision`.
    #[must_use]
    pub fn check_for_match(&self, other: &Self, precision: MatchPrecision) -> bool {
        precision.key(self.position) == precision.key(other.position)
    }
}

/// Arena of deduplicated vertices for one coordinate space.
#[derive(Debug, Clone)]
pub struct VertexStore<P> {
    vertices: Vec<Vertex<P>>,
    lookup: HashMap<[i64; 3], usize>,
    precision: MatchPrecision,
}

impl<P: SpacePoint> VertexStore<P> {
    #[must_use]
    pub fn new(precision: MatchPrecision) -> Self {
        Self {
            vertices: Vec::new(),
            lookup: HashMap::new(),
            precision,
        }
    }

    #[must_use]
    pub fn with_capacity(precision: MatchPrecision, capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            lookup: HashMap::with_capacity(capacity),
            precision,
        }
    }

    /// Returns the index of the vertex matching `position`, creating it first
    /// when no stored vertex matches.
    pub fn insert(&mut self, position: P) -> usize {
        let key = self.precision.key(position);
        if let Some(&existing) = self.lookup.get(&key) {
            return existing;
        }
        let index = self.vertices.len();
        self.vertices.push(Vertex { index, position });
        self.lookup.insert(key, index);
        index
    }

    /// Index of the stored vertex matching `position`, if any.
    #[must_use]
    pub fn find(&self, position: P) -> Option<usize> {
        self.lookup.get(&self.precision.key(position)).copied()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Vertex<P>> {
        self.vertices.get(index)
    }

    /// Position of vertex `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not handed out by this store.
    #[must_use]
    pub fn position(&self, index: usize) -> P {
        self.vertices[index].position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[must_use]
    pub fn precision(&self) -> MatchPrecision {
        self.precision
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vertex<P>> {
        self.vertices.iter()
    }
}

impl<P: SpacePoint> Default for VertexStore<P> {
    fn default() -> Self {
        Self::new(MatchPrecision::default())
    }
}
