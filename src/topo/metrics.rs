//! Opt-in stage timing for the topology pass.
//!
//! Timing is only collected when the `topology_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). When
//! disabled, [`TopologyMetrics::time`] is a plain call.
//!
//! ```ignore
//! use meshlint_engine::topo::{TopologyMetrics, TimingBucket};
//!
//! let mut metrics = TopologyMetrics::default();
//! metrics.begin();
//! let edges = metrics.time(TimingBucket::Edges, || EdgeGraph::build(faces));
//! if let Some(report) = metrics.end() {
//!     println!("edges: {} ns", report.edges_ns);
//! }
//! ```

use serde::Serialize;

/// Stages of one primitive pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Vertex store construction and dedup lookups.
    Vertices,
    /// Triangle construction (area, normal, winding, bounds).
    Triangles,
    /// Mesh and UV edge graph building.
    Edges,
    Manifold,
    /// Broadphase and exact overlap tests.
    Overlap,
    Islands,
    Density,
    Gutter,
}

/// Cumulative nanoseconds per stage.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TopologyTimingReport {
    pub vertices_ns: u64,
    pub triangles_ns: u64,
    pub edges_ns: u64,
    pub manifold_ns: u64,
    pub overlap_ns: u64,
    pub islands_ns: u64,
    pub density_ns: u64,
    pub gutter_ns: u64,
}

impl TopologyTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.vertices_ns
            .saturating_add(self.triangles_ns)
            .saturating_add(self.edges_ns)
            .saturating_add(self.manifold_ns)
            .saturating_add(self.overlap_ns)
            .saturating_add(self.islands_ns)
            .saturating_add(self.density_ns)
            .saturating_add(self.gutter_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    /// Adds every bucket of `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        self.vertices_ns = self.vertices_ns.saturating_add(other.vertices_ns);
        self.triangles_ns = self.triangles_ns.saturating_add(other.triangles_ns);
        self.edges_ns = self.edges_ns.saturating_add(other.edges_ns);
        self.manifold_ns = self.manifold_ns.saturating_add(other.manifold_ns);
        self.overlap_ns = self.overlap_ns.saturating_add(other.overlap_ns);
        self.islands_ns = self.islands_ns.saturating_add(other.islands_ns);
        self.density_ns = self.density_ns.saturating_add(other.density_ns);
        self.gutter_ns = self.gutter_ns.saturating_add(other.gutter_ns);
    }

    #[cfg_attr(
        not(all(feature = "topology_metrics", not(target_arch = "wasm32"))),
        allow(dead_code)
    )]
    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::Vertices => &mut self.vertices_ns,
            TimingBucket::Triangles => &mut self.triangles_ns,
            TimingBucket::Edges => &mut self.edges_ns,
            TimingBucket::Manifold => &mut self.manifold_ns,
            TimingBucket::Overlap => &mut self.overlap_ns,
            TimingBucket::Islands => &mut self.islands_ns,
            TimingBucket::Density => &mut self.density_ns,
            TimingBucket::Gutter => &mut self.gutter_ns,
        }
    }
}

/// Accumulator for stage timings.
///
/// Call [`begin`](Self::begin) to reset, wrap stages with
/// [`time`](Self::time), then read the report with [`end`](Self::end).
#[derive(Debug, Default, Clone)]
pub struct TopologyMetrics {
    #[cfg(all(feature = "topology_metrics", not(target_arch = "wasm32")))]
    report: TopologyTimingReport,
}

impl TopologyMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "topology_metrics", not(target_arch = "wasm32")))]
        {
            self.report = TopologyTimingReport::default();
        }
    }

    /// The accumulated report, or `None` when timing is compiled out.
    #[must_use]
    pub fn end(&self) -> Option<TopologyTimingReport> {
        #[cfg(all(feature = "topology_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "topology_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "topology_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            // Cap at u64::MAX
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = self.report.bucket_mut(bucket);
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "topology_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
