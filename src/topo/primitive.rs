//! Staged analysis of one drawable primitive, and of a model made of several.
//!
//! Stages run in dependency order: vertices, triangles, edges, manifold
//! classification, then the UV passes (overlap, islands, density, gutters).
//! Malformed buffers are the only failure; everything else, degenerate
//! geometry included, ends up as data in [`TopologyDiagnostics`].

use serde::Serialize;

use super::core::{MatchPrecision, Point3, Tolerance, UvPoint};
use super::density::{
    density_bounds, probe_gutters, uv_extents, GutterOptions, GutterReport, TexelDensity,
};
use super::diagnostics::TopologyDiagnostics;
use super::edge::EdgeGraph;
use super::island::{group_islands, UvIsland};
use super::manifold::{classify_edges, MeshEdge};
use super::metrics::{TimingBucket, TopologyMetrics};
use super::overlap::{detect_overlaps, Broadphase, OverlapReport};
use super::svg::{render_uv_layout_svg, UvSvgParams};
use super::triangle::{MeshTriangle, UvBounds, UvTriangle};
use super::vertex::VertexStore;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Buffers that cannot describe a triangle list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputShapeError {
    #[error("index count {len} is not a multiple of 3")]
    IndexCountNotTriangleList { len: usize },
    #[error("position buffer length {len} is not a multiple of 3")]
    PositionBufferLength { len: usize },
    #[error("uv buffer length {len} is not a multiple of 2")]
    UvBufferLength { len: usize },
    #[error("position buffer holds {positions} vertices but uv buffer holds {uvs}")]
    AttributeCountMismatch { positions: usize, uvs: usize },
    #[error("index {index} at slot {slot} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        slot: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate { vertex: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("primitive {primitive}: {source}")]
    Primitive {
        primitive: usize,
        source: InputShapeError,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Input
// ─────────────────────────────────────────────────────────────────────────────

/// Flat, already-indexed buffers of one primitive.
///
/// `positions` holds `x, y, z` triples and `uvs` holds `u, v` pairs for the
/// same vertices. Coincident positions need not be merged beforehand.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveInput<'a> {
    pub indices: &'a [u32],
    pub positions: &'a [f64],
    pub uvs: Option<&'a [f64]>,
}

impl<'a> PrimitiveInput<'a> {
    #[must_use]
    pub fn new(indices: &'a [u32], positions: &'a [f64]) -> Self {
        Self {
            indices,
            positions,
            uvs: None,
        }
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: &'a [f64]) -> Self {
        self.uvs = Some(uvs);
        self
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks buffer shapes and every referenced vertex.
    pub fn validate(&self) -> Result<(), InputShapeError> {
        if self.indices.len() % 3 != 0 {
            return Err(InputShapeError::IndexCountNotTriangleList {
                len: self.indices.len(),
            });
        }
        if self.positions.len() % 3 != 0 {
            return Err(InputShapeError::PositionBufferLength {
                len: self.positions.len(),
            });
        }
        let vertex_count = self.vertex_count();
        if let Some(uvs) = self.uvs {
            if uvs.len() % 2 != 0 {
                return Err(InputShapeError::UvBufferLength { len: uvs.len() });
            }
            if uvs.len() / 2 != vertex_count {
                return Err(InputShapeError::AttributeCountMismatch {
                    positions: vertex_count,
                    uvs: uvs.len() / 2,
                });
            }
        }

        for (slot, &index) in self.indices.iter().enumerate() {
            let i = index as usize;
            if i >= vertex_count {
                return Err(InputShapeError::IndexOutOfRange {
                    slot,
                    index,
                    vertex_count,
                });
            }
            let position_ok = self.positions[3 * i..3 * i + 3].iter().all(|c| c.is_finite());
            let uv_ok = self
                .uvs
                .is_none_or(|uvs| uvs[2 * i..2 * i + 2].iter().all(|c| c.is_finite()));
            if !position_ok || !uv_ok {
                return Err(InputShapeError::NonFiniteCoordinate { vertex: index });
            }
        }
        Ok(())
    }

    fn position(&self, index: u32) -> Point3 {
        let i = index as usize * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    fn uv(uvs: &[f64], index: u32) -> UvPoint {
        let i = index as usize * 2;
        UvPoint::new(uvs[i], uvs[i + 1])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Options and context
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AnalysisOptions {
    pub tolerance: Tolerance,
    pub precision: MatchPrecision,
    pub broadphase: Broadphase,
    /// Gutter probe run after island grouping; skipped when `None`.
    pub gutter: Option<GutterOptions>,
}

/// Options plus the per-pass timing accumulator.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub options: AnalysisOptions,
    pub metrics: TopologyMetrics,
}

impl AnalysisContext {
    #[must_use]
    pub fn new(options: AnalysisOptions) -> Self {
        Self {
            options,
            metrics: TopologyMetrics::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

/// Everything one pass over a primitive produced.
///
/// Triangle `i` of `mesh_triangles` and of `uv_triangles` come from the same
/// face. Without UVs the UV collections are empty.
#[derive(Debug, Clone)]
pub struct PrimitiveAnalysis {
    pub mesh_vertices: VertexStore<Point3>,
    pub uv_vertices: VertexStore<UvPoint>,
    pub mesh_triangles: Vec<MeshTriangle>,
    pub uv_triangles: Vec<UvTriangle>,
    pub mesh_edges: Vec<MeshEdge>,
    pub uv_edges: EdgeGraph,
    pub islands: Vec<UvIsland>,
    pub overlap: OverlapReport,
    pub gutter: Option<GutterReport>,
    pub diagnostics: TopologyDiagnostics,
}

impl PrimitiveAnalysis {
    #[must_use]
    pub fn has_uvs(&self) -> bool {
        !self.uv_triangles.is_empty()
    }

    pub fn non_manifold_edges(&self) -> impl Iterator<Item = &MeshEdge> {
        self.mesh_edges.iter().filter(|e| e.non_manifold)
    }

    /// Texel density for a `width` x `height` texture, `None` without UVs.
    #[must_use]
    pub fn texel_density(&self, width: u32, height: u32) -> Option<TexelDensity> {
        self.diagnostics
            .density
            .map(|d| TexelDensity::from_density(d, width, height))
    }

    /// Runs a gutter probe with options other than the ones the pass used.
    #[must_use]
    pub fn probe_gutters(&self, options: GutterOptions, tol: Tolerance) -> GutterReport {
        probe_gutters(&self.uv_triangles, &self.islands, options, tol)
    }

    #[must_use]
    pub fn uv_layout_svg(&self, params: &UvSvgParams) -> String {
        render_uv_layout_svg(&self.uv_triangles, params)
    }

    #[must_use]
    pub fn report(&self) -> PrimitiveReport {
        PrimitiveReport {
            diagnostics: self.diagnostics.clone(),
            islands: self.islands.iter().map(IslandSummary::from).collect(),
            overlapping_pairs: self.overlap.pairs.clone(),
            gutter: self.gutter.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandSummary {
    pub index: usize,
    pub triangle_count: usize,
    pub bounds: UvBounds,
    pub uv_area: f64,
}

impl From<&UvIsland> for IslandSummary {
    fn from(island: &UvIsland) -> Self {
        Self {
            index: island.index,
            triangle_count: island.triangles.len(),
            bounds: island.bounds,
            uv_area: island.uv_area,
        }
    }
}

/// Serializable view of a [`PrimitiveAnalysis`] for the reporting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveReport {
    pub diagnostics: TopologyDiagnostics,
    pub islands: Vec<IslandSummary>,
    pub overlapping_pairs: Vec<(usize, usize)>,
    pub gutter: Option<GutterReport>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Primitive pass
// ─────────────────────────────────────────────────────────────────────────────

pub fn analyze_primitive(input: &PrimitiveInput<'_>) -> Result<PrimitiveAnalysis, InputShapeError> {
    let mut ctx = AnalysisContext::default();
    analyze_primitive_with_context(input, &mut ctx)
}

pub fn analyze_primitive_with_options(
    input: &PrimitiveInput<'_>,
    options: AnalysisOptions,
) -> Result<PrimitiveAnalysis, InputShapeError> {
    let mut ctx = AnalysisContext::new(options);
    analyze_primitive_with_context(input, &mut ctx)
}

/// Mesh and UV faces as indices into the deduplicated vertex stores.
struct IndexedFaces {
    mesh_vertices: VertexStore<Point3>,
    uv_vertices: VertexStore<UvPoint>,
    mesh_faces: Vec<[usize; 3]>,
    uv_faces: Vec<[usize; 3]>,
}

fn index_faces(input: &PrimitiveInput<'_>, precision: MatchPrecision) -> IndexedFaces {
    let vertex_count = input.vertex_count();
    let mut mesh_vertices = VertexStore::with_capacity(precision, vertex_count);
    let mut uv_vertices = VertexStore::with_capacity(precision, vertex_count);
    // Buffer index -> store index, filled on first reference.
    let mut mesh_remap: Vec<Option<usize>> = vec![None; vertex_count];
    let mut uv_remap: Vec<Option<usize>> = vec![None; vertex_count];

    let mut mesh_faces = Vec::with_capacity(input.triangle_count());
    let mut uv_faces = Vec::with_capacity(if input.uvs.is_some() {
        input.triangle_count()
    } else {
        0
    });

    for face in input.indices.chunks_exact(3) {
        let corners = [face[0], face[1], face[2]];
        mesh_faces.push(corners.map(|index| {
            *mesh_remap[index as usize]
                .get_or_insert_with(|| mesh_vertices.insert(input.position(index)))
        }));
        if let Some(uvs) = input.uvs {
            uv_faces.push(corners.map(|index| {
                *uv_remap[index as usize]
                    .get_or_insert_with(|| uv_vertices.insert(PrimitiveInput::uv(uvs, index)))
            }));
        }
    }

    IndexedFaces {
        mesh_vertices,
        uv_vertices,
        mesh_faces,
        uv_faces,
    }
}

/// Runs every stage over one primitive.
pub fn analyze_primitive_with_context(
    input: &PrimitiveInput<'_>,
    ctx: &mut AnalysisContext,
) -> Result<PrimitiveAnalysis, InputShapeError> {
    input.validate()?;
    let options = ctx.options;
    let tol = options.tolerance;
    ctx.metrics.begin();

    log::debug!(
        "analyzing primitive: {} triangles over {} buffer vertices, uvs: {}",
        input.triangle_count(),
        input.vertex_count(),
        input.uvs.is_some()
    );

    let IndexedFaces {
        mesh_vertices,
        uv_vertices,
        mesh_faces,
        uv_faces,
    } = ctx
        .metrics
        .time(TimingBucket::Vertices, || index_faces(input, options.precision));

    let (mut mesh_triangles, mut uv_triangles) = ctx.metrics.time(TimingBucket::Triangles, || {
        let mesh: Vec<MeshTriangle> = mesh_faces
            .iter()
            .map(|&face| MeshTriangle::new(face, face.map(|v| mesh_vertices.position(v))))
            .collect();
        let uv: Vec<UvTriangle> = uv_faces
            .iter()
            .enumerate()
            .map(|(t, &face)| UvTriangle::new(face, face.map(|v| uv_vertices.position(v)), t))
            .collect();
        (mesh, uv)
    });
    for (t, tri) in mesh_triangles.iter_mut().enumerate().take(uv_triangles.len()) {
        tri.uv_triangle = Some(t);
    }

    let (mesh_graph, uv_edges) = ctx.metrics.time(TimingBucket::Edges, || {
        (
            EdgeGraph::build(mesh_faces.iter().copied()),
            EdgeGraph::build(uv_faces.iter().copied()),
        )
    });

    let mesh_edges = ctx.metrics.time(TimingBucket::Manifold, || {
        classify_edges(&mesh_graph, &mesh_triangles)
    });

    let overlap = ctx.metrics.time(TimingBucket::Overlap, || {
        detect_overlaps(&mut uv_triangles, options.broadphase, tol)
    });
    log::trace!(
        "overlap: {} candidate pairs, {} overlapping",
        overlap.candidate_pairs,
        overlap.pairs.len()
    );

    let islands = ctx.metrics.time(TimingBucket::Islands, || {
        group_islands(&mut uv_triangles, &uv_edges)
    });

    let (density, extents) = ctx.metrics.time(TimingBucket::Density, || {
        (
            density_bounds(&uv_triangles, &mesh_triangles),
            uv_extents(&uv_triangles),
        )
    });

    let gutter = options.gutter.map(|gutter_options| {
        ctx.metrics.time(TimingBucket::Gutter, || {
            probe_gutters(&uv_triangles, &islands, gutter_options, tol)
        })
    });

    let mut diagnostics = TopologyDiagnostics {
        vertex_count: mesh_vertices.len(),
        uv_vertex_count: uv_vertices.len(),
        triangle_count: mesh_triangles.len(),
        edge_count: mesh_edges.len(),
        open_edge_count: mesh_edges.iter().filter(|e| e.is_boundary()).count(),
        non_manifold_edge_count: mesh_edges.iter().filter(|e| e.non_manifold).count(),
        degenerate_triangle_count: mesh_triangles
            .iter()
            .filter(|t| t.base.is_degenerate(tol))
            .count(),
        inverted_triangle_count: uv_triangles.iter().filter(|t| t.inverted).count(),
        overlapping_triangle_count: overlap.overlapping_triangles,
        island_count: islands.len(),
        shared_uv_edge_count: uv_edges.shared_edge_count(),
        zero_length_uv_edge_count: uv_edges.zero_length_edge_count(),
        mesh_area: mesh_triangles.iter().map(MeshTriangle::area).sum(),
        uv_area: uv_triangles.iter().map(UvTriangle::area).sum(),
        density,
        uv_extents: extents,
        timing: None,
        warnings: Vec::new(),
    };

    if diagnostics.non_manifold_edge_count > 0 {
        log::warn!(
            "primitive has {} non-manifold edges",
            diagnostics.non_manifold_edge_count
        );
        diagnostics.add_warning(format!(
            "mesh has {} non-manifold edges",
            diagnostics.non_manifold_edge_count
        ));
    }
    if diagnostics.overlapping_triangle_count > 0 {
        log::warn!(
            "primitive has {} overlapping UV triangles",
            diagnostics.overlapping_triangle_count
        );
        diagnostics.add_warning(format!(
            "uv layout has {} overlapping triangles",
            diagnostics.overlapping_triangle_count
        ));
    }
    if let Some(report) = gutter.as_ref().filter(|r| !r.passes()) {
        diagnostics.add_warning(format!(
            "{} gutter squares are shared by more than one island",
            report.violations.len()
        ));
    }
    diagnostics.timing = ctx.metrics.end();

    log::debug!("primitive analyzed: {}", diagnostics.summary());

    Ok(PrimitiveAnalysis {
        mesh_vertices,
        uv_vertices,
        mesh_triangles,
        uv_triangles,
        mesh_edges,
        uv_edges,
        islands,
        overlap,
        gutter,
        diagnostics,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Model pass
// ─────────────────────────────────────────────────────────────────────────────

/// Per-primitive analyses plus their merged diagnostics.
#[derive(Debug, Clone)]
pub struct ModelAnalysis {
    pub primitives: Vec<PrimitiveAnalysis>,
    pub diagnostics: TopologyDiagnostics,
}

impl ModelAnalysis {
    /// Model-wide texel density, `None` when no primitive has UVs.
    #[must_use]
    pub fn texel_density(&self, width: u32, height: u32) -> Option<TexelDensity> {
        self.diagnostics
            .density
            .map(|d| TexelDensity::from_density(d, width, height))
    }

    #[must_use]
    pub fn reports(&self) -> Vec<PrimitiveReport> {
        self.primitives.iter().map(PrimitiveAnalysis::report).collect()
    }
}

pub fn analyze_model(inputs: &[PrimitiveInput<'_>]) -> Result<ModelAnalysis, ModelError> {
    analyze_model_with_options(inputs, AnalysisOptions::default())
}

/// Analyzes every primitive independently and merges their diagnostics.
pub fn analyze_model_with_options(
    inputs: &[PrimitiveInput<'_>],
    options: AnalysisOptions,
) -> Result<ModelAnalysis, ModelError> {
    log::debug!("analyzing model with {} primitives", inputs.len());
    let primitives = analyze_all(inputs, options)?;

    let mut diagnostics = TopologyDiagnostics::new();
    for primitive in &primitives {
        diagnostics.merge(&primitive.diagnostics);
    }
    log::debug!("model analyzed: {}", diagnostics.summary());

    Ok(ModelAnalysis {
        primitives,
        diagnostics,
    })
}

fn analyze_one(
    primitive: usize,
    input: &PrimitiveInput<'_>,
    options: AnalysisOptions,
) -> Result<PrimitiveAnalysis, ModelError> {
    let mut ctx = AnalysisContext::new(options);
    analyze_primitive_with_context(input, &mut ctx)
        .map_err(|source| ModelError::Primitive { primitive, source })
}

#[cfg(feature = "parallel")]
fn analyze_all(
    inputs: &[PrimitiveInput<'_>],
    options: AnalysisOptions,
) -> Result<Vec<PrimitiveAnalysis>, ModelError> {
    inputs
        .par_iter()
        .enumerate()
        .map(|(primitive, input)| analyze_one(primitive, input, options))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn analyze_all(
    inputs: &[PrimitiveInput<'_>],
    options: AnalysisOptions,
) -> Result<Vec<PrimitiveAnalysis>, ModelError> {
    inputs
        .iter()
        .enumerate()
        .map(|(primitive, input)| analyze_one(primitive, input, options))
        .collect()
}
