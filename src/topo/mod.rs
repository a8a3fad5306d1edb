mod core;
mod density;
mod diagnostics;
mod edge;
mod grid;
mod island;
mod manifold;
mod metrics;
mod overlap;
mod primitive;
mod svg;
mod triangle;
mod vertex;

pub use self::core::{
    MatchPrecision, Point3, SpacePoint, Tolerance, UvPoint, VERTEX_MATCH_DIGITS, Vec3, orient2d,
};
pub use density::{
    DensityBounds, GutterOptions, GutterReport, MAX_GUTTER_CELLS_PER_AXIS, TexelDensity,
    density_bounds, probe_gutters, triangle_density, uv_extents,
};
pub use diagnostics::TopologyDiagnostics;
pub use edge::{Edge, EdgeGraph, EdgeKey};
pub use grid::{Cell, Square, SquareGrid};
pub use island::{UvIsland, group_islands};
pub use manifold::{MeshEdge, classify_edge, classify_edges};
pub use metrics::{TimingBucket, TopologyMetrics, TopologyTimingReport};
pub use overlap::{
    Broadphase, OverlapReport, detect_overlaps, segments_cross, square_overlaps_triangle,
    triangles_overlap,
};
pub use primitive::{
    AnalysisContext, AnalysisOptions, InputShapeError, IslandSummary, ModelAnalysis, ModelError,
    PrimitiveAnalysis, PrimitiveInput, PrimitiveReport, analyze_model,
    analyze_model_with_options, analyze_primitive, analyze_primitive_with_context,
    analyze_primitive_with_options,
};
pub use svg::{UvSvgParams, render_squares_svg, render_uv_layout_svg, triangle_path};
pub use triangle::{MeshTriangle, Triangle, UvBounds, UvTriangle, heron_area};
pub use vertex::{Vertex, VertexStore};

#[cfg(test)]
mod tests;
