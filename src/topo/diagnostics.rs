//! Aggregated facts about one primitive or a whole model.
//!
//! [`TopologyDiagnostics`] is what the reporting layer tests against its
//! publishing rules: counts of defects, summed areas, density bounds and UV
//! extents. Nothing here judges whether a value passes a rule; the
//! `is_*` helpers only answer structural questions.
//!
//! ```ignore
//! use meshlint_engine::topo::{analyze_primitive, PrimitiveInput};
//!
//! let analysis = analyze_primitive(&input)?;
//! let diag = &analysis.diagnostics;
//! if !diag.is_manifold() {
//!     eprintln!("{} non-manifold edges", diag.non_manifold_edge_count);
//! }
//! ```

use std::fmt;

use serde::Serialize;

use super::density::DensityBounds;
use super::metrics::TopologyTimingReport;
use super::triangle::UvBounds;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TopologyDiagnostics {
    /// Unique mesh-space vertices after approximate matching.
    pub vertex_count: usize,
    /// Unique UV vertices after approximate matching.
    pub uv_vertex_count: usize,
    pub triangle_count: usize,
    /// Mesh-space edges.
    pub edge_count: usize,

    /// Mesh edges with a single incident triangle.
    ///
    /// Valid for open meshes; zero means the surface is closed.
    pub open_edge_count: usize,
    /// Mesh edges with zero or three or more incident triangles.
    pub non_manifold_edge_count: usize,
    /// Mesh triangles whose area is within tolerance of zero.
    pub degenerate_triangle_count: usize,

    /// UV triangles with mirrored winding.
    pub inverted_triangle_count: usize,
    pub overlapping_triangle_count: usize,
    pub island_count: usize,
    /// UV edges used by two or more triangles.
    pub shared_uv_edge_count: usize,
    pub zero_length_uv_edge_count: usize,

    /// Total mesh-space surface area.
    pub mesh_area: f64,
    /// Total UV area.
    pub uv_area: f64,
    /// `None` when the primitive has no UV triangles.
    pub density: Option<DensityBounds>,
    /// `None` when the primitive has no UV triangles.
    pub uv_extents: Option<UvBounds>,

    /// Stage timing; only populated with the `topology_metrics` feature on
    /// native targets.
    pub timing: Option<TopologyTimingReport>,
    pub warnings: Vec<String>,
}

impl TopologyDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// No open edges.
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Any inverted or overlapping UV triangle.
    #[must_use]
    pub fn has_uv_issues(&self) -> bool {
        self.inverted_triangle_count > 0 || self.overlapping_triangle_count > 0
    }

    /// Manifold, no degenerate triangles, no UV issues and no warnings.
    ///
    /// Open edges do not make a primitive unclean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.is_manifold()
            && self.degenerate_triangle_count == 0
            && !self.has_uv_issues()
            && self.warnings.is_empty()
    }

    /// Whether the model's UVs stay inside `[0, 1]`. `true` without UVs.
    #[must_use]
    pub fn uvs_within_unit_range(&self) -> bool {
        self.uv_extents.is_none_or(|b| b.is_within_unit_range())
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Folds `other` into `self`.
    ///
    /// Counts and areas are summed, density and extents are widened, warnings
    /// are appended and timing buckets are added together.
    pub fn merge(&mut self, other: &TopologyDiagnostics) {
        self.vertex_count += other.vertex_count;
        self.uv_vertex_count += other.uv_vertex_count;
        self.triangle_count += other.triangle_count;
        self.edge_count += other.edge_count;
        self.open_edge_count += other.open_edge_count;
        self.non_manifold_edge_count += other.non_manifold_edge_count;
        self.degenerate_triangle_count += other.degenerate_triangle_count;
        self.inverted_triangle_count += other.inverted_triangle_count;
        self.overlapping_triangle_count += other.overlapping_triangle_count;
        self.island_count += other.island_count;
        self.shared_uv_edge_count += other.shared_uv_edge_count;
        self.zero_length_uv_edge_count += other.zero_length_uv_edge_count;
        self.mesh_area += other.mesh_area;
        self.uv_area += other.uv_area;
        self.density = widen(self.density, other.density, DensityBounds::union);
        self.uv_extents = widen(self.uv_extents, other.uv_extents, UvBounds::union);
        if let Some(theirs) = &other.timing {
            self.timing
                .get_or_insert_with(TopologyTimingReport::default)
                .accumulate(theirs);
        }
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// One-line summary for logging.
    ///
    /// Format: `"V:{vertices} T:{triangles} E:{edges} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} T:{} E:{}",
            self.vertex_count, self.triangle_count, self.edge_count
        )];

        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.degenerate_triangle_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_triangle_count));
        }
        if self.inverted_triangle_count > 0 {
            parts.push(format!("inverted:{}", self.inverted_triangle_count));
        }
        if self.overlapping_triangle_count > 0 {
            parts.push(format!("overlapping:{}", self.overlapping_triangle_count));
        }
        if self.island_count > 0 {
            parts.push(format!("islands:{}", self.island_count));
        }

        parts.join(" ")
    }
}

fn widen<T: Copy>(a: Option<T>, b: Option<T>, union: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(union(a, b)),
        (a, b) => a.or(b),
    }
}

impl fmt::Display for TopologyDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Topology Diagnostics:")?;
        writeln!(f, "  Vertices: {} (UV: {})", self.vertex_count, self.uv_vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;
        writeln!(f, "  Surface area: {:.6}", self.mesh_area)?;

        if self.open_edge_count > 0 || self.non_manifold_edge_count > 0 || self.degenerate_triangle_count > 0 {
            writeln!(f, "  Mesh issues:")?;
            if self.open_edge_count > 0 {
                writeln!(f, "    - Open edges: {}", self.open_edge_count)?;
            }
            if self.non_manifold_edge_count > 0 {
                writeln!(f, "    - Non-manifold edges: {}", self.non_manifold_edge_count)?;
            }
            if self.degenerate_triangle_count > 0 {
                writeln!(f, "    - Degenerate triangles: {}", self.degenerate_triangle_count)?;
            }
        }

        writeln!(f, "  UV islands: {}", self.island_count)?;
        writeln!(f, "  UV area: {:.6}", self.uv_area)?;
        if self.has_uv_issues() {
            writeln!(f, "  UV issues:")?;
            if self.inverted_triangle_count > 0 {
                writeln!(f, "    - Inverted triangles: {}", self.inverted_triangle_count)?;
            }
            if self.overlapping_triangle_count > 0 {
                writeln!(f, "    - Overlapping triangles: {}", self.overlapping_triangle_count)?;
            }
        }
        if let Some(density) = self.density {
            writeln!(
                f,
                "  Density: {:.6} .. {:.6}",
                density.min_density, density.max_density
            )?;
        }
        if let Some(b) = self.uv_extents {
            writeln!(
                f,
                "  UV extents: u [{:.4}, {:.4}] v [{:.4}, {:.4}]",
                b.min_u, b.max_u, b.min_v, b.max_v
            )?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {}", warning)?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_clean() {
            "CLEAN"
        } else if self.is_manifold() && self.degenerate_triangle_count == 0 {
            "VALID (UV issues)"
        } else {
            "ISSUES DETECTED"
        };
        writeln!(f, "  Status: {}", status)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clean() {
        let diag = TopologyDiagnostics::default();
        assert!(diag.is_clean());
        assert!(diag.is_watertight());
        assert!(diag.is_manifold());
        assert!(!diag.has_uv_issues());
        assert!(diag.uvs_within_unit_range());
    }

    #[test]
    fn test_open_edges_are_still_clean() {
        let diag = TopologyDiagnostics {
            open_edge_count: 3,
            ..Default::default()
        };
        assert!(!diag.is_watertight());
        assert!(diag.is_clean());
    }

    #[test]
    fn test_uv_issues() {
        let diag = TopologyDiagnostics {
            inverted_triangle_count: 1,
            ..Default::default()
        };
        assert!(diag.has_uv_issues());
        assert!(!diag.is_clean());
        assert!(diag.is_manifold());
    }

    #[test]
    fn test_merge_widens_bounds() {
        let mut a = TopologyDiagnostics {
            vertex_count: 4,
            triangle_count: 2,
            mesh_area: 1.0,
            density: Some(DensityBounds {
                min_density: 0.2,
                max_density: 0.4,
            }),
            uv_extents: Some(UvBounds::new(0.0, 0.5, 0.0, 0.5)),
            warnings: vec!["first".to_string()],
            ..Default::default()
        };
        let b = TopologyDiagnostics {
            vertex_count: 3,
            triangle_count: 1,
            non_manifold_edge_count: 1,
            mesh_area: 0.5,
            density: Some(DensityBounds {
                min_density: 0.1,
                max_density: 0.3,
            }),
            uv_extents: Some(UvBounds::new(0.25, 1.5, 0.1, 0.9)),
            warnings: vec!["second".to_string()],
            ..Default::default()
        };
        a.merge(&b);

        assert_eq!(a.vertex_count, 7);
        assert_eq!(a.triangle_count, 3);
        assert_eq!(a.non_manifold_edge_count, 1);
        assert!((a.mesh_area - 1.5).abs() < 1e-12);
        assert_eq!(
            a.density,
            Some(DensityBounds {
                min_density: 0.1,
                max_density: 0.4
            })
        );
        assert_eq!(a.uv_extents, Some(UvBounds::new(0.0, 1.5, 0.0, 0.9)));
        assert!(!a.uvs_within_unit_range());
        assert_eq!(a.warnings, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_merge_into_empty_takes_other_bounds() {
        let mut a = TopologyDiagnostics::default();
        let b = TopologyDiagnostics {
            uv_extents: Some(UvBounds::new(0.0, 1.0, 0.0, 1.0)),
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.uv_extents, b.uv_extents);
        assert!(a.density.is_none());
    }

    #[test]
    fn test_summary() {
        let diag = TopologyDiagnostics {
            vertex_count: 8,
            triangle_count: 12,
            edge_count: 18,
            overlapping_triangle_count: 2,
            island_count: 6,
            ..Default::default()
        };
        let summary = diag.summary();
        assert!(summary.starts_with("V:8 T:12 E:18"));
        assert!(summary.contains("overlapping:2"));
        assert!(summary.contains("islands:6"));
        assert!(!summary.contains("open:"));
    }

    #[test]
    fn test_display() {
        let diag = TopologyDiagnostics {
            vertex_count: 4,
            triangle_count: 4,
            non_manifold_edge_count: 1,
            warnings: vec!["test warning".to_string()],
            ..Default::default()
        };
        let output = format!("{}", diag);
        assert!(output.contains("Vertices: 4"));
        assert!(output.contains("Non-manifold edges: 1"));
        assert!(output.contains("test warning"));
        assert!(output.contains("ISSUES DETECTED"));
    }
}
