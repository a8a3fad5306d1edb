use crate::topo::{
    AnalysisOptions, Broadphase, GutterOptions, PrimitiveInput, Tolerance, UvBounds, UvPoint,
    UvSvgParams, UvTriangle, analyze_primitive, analyze_primitive_with_options, render_squares_svg,
    triangles_overlap,
};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Unit cube as six quads, each face in its own cell of a 3 x 2 atlas.
struct CubeAtlas {
    positions: Vec<f64>,
    uvs: Vec<f64>,
    indices: Vec<u32>,
}

const MARGIN: f64 = 0.02;

fn cube_atlas() -> CubeAtlas {
    let faces: [[[f64; 3]; 4]; 6] = [
        [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
        [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
        [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
        [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
        [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
    ];
    let (su, sv) = (1.0 / 3.0 - 2.0 * MARGIN, 0.5 - 2.0 * MARGIN);

    let mut atlas = CubeAtlas {
        positions: Vec::new(),
        uvs: Vec::new(),
        indices: Vec::new(),
    };
    for (f, corners) in faces.iter().enumerate() {
        let u0 = (f % 3) as f64 / 3.0 + MARGIN;
        let v0 = (f / 3) as f64 / 2.0 + MARGIN;
        let base = (f * 4) as u32;
        for (k, corner) in corners.iter().enumerate() {
            atlas.positions.extend_from_slice(corner);
            let (du, dv) = [(0.0, 0.0), (su, 0.0), (su, sv), (0.0, sv)][k];
            atlas.uvs.extend_from_slice(&[u0 + du, v0 + dv]);
        }
        atlas
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    atlas
}

fn uv(vertices: [usize; 3], points: [[f64; 2]; 3]) -> UvTriangle {
    UvTriangle::new(vertices, points.map(|[u, v]| UvPoint::new(u, v)), 0)
}

#[test]
fn single_uv_triangle_attributes() {
    let tri = uv([0, 1, 2], [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    assert!(!tri.inverted);
    assert!(approx_eq(tri.area(), 0.5, 1e-12));
    assert_eq!(tri.bounds, UvBounds::new(0.0, 1.0, 0.0, 1.0));
}

#[test]
fn shared_edge_in_disjoint_half_planes_does_not_overlap() {
    let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0];
    let uvs = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let indices = [0u32, 1, 2, 1, 3, 2];
    let input = PrimitiveInput::new(&indices, &positions).with_uvs(&uvs);
    let analysis = analyze_primitive(&input).expect("valid");
    assert_eq!(analysis.diagnostics.overlapping_triangle_count, 0);
    assert!(analysis.uv_triangles.iter().all(|t| !t.overlapping));
    assert_eq!(analysis.diagnostics.island_count, 1);
}

#[test]
fn containing_triangle_flags_both() {
    let positions = [
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0,
    ];
    let uvs = [
        0.0, 0.0, 0.9, 0.0, 0.0, 0.9, //
        0.1, 0.1, 0.3, 0.1, 0.1, 0.3,
    ];
    let indices = [0u32, 1, 2, 3, 4, 5];
    let input = PrimitiveInput::new(&indices, &positions).with_uvs(&uvs);
    let analysis = analyze_primitive(&input).expect("valid");
    assert_eq!(analysis.overlap.pairs, vec![(0, 1)]);
    assert!(analysis.uv_triangles.iter().all(|t| t.overlapping));
    assert_eq!(analysis.diagnostics.overlapping_triangle_count, 2);
    assert!(analysis.diagnostics.has_uv_issues());
    assert_eq!(analysis.diagnostics.island_count, 2);
}

#[test]
fn mirrored_uvs_are_counted_as_inverted() {
    let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let uvs = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0];
    let indices = [0u32, 1, 2];
    let input = PrimitiveInput::new(&indices, &positions).with_uvs(&uvs);
    let analysis = analyze_primitive(&input).expect("valid");
    assert_eq!(analysis.diagnostics.inverted_triangle_count, 1);
    let svg = analysis.uv_layout_svg(&UvSvgParams::default());
    assert!(svg.contains("#ff0000"));
}

#[test]
fn cube_atlas_has_six_islands_and_uniform_density() {
    let atlas = cube_atlas();
    let input = PrimitiveInput::new(&atlas.indices, &atlas.positions).with_uvs(&atlas.uvs);
    let analysis = analyze_primitive(&input).expect("cube");
    let diag = &analysis.diagnostics;

    assert_eq!(diag.vertex_count, 8);
    assert_eq!(diag.uv_vertex_count, 24);
    assert_eq!(diag.triangle_count, 12);
    assert_eq!(diag.edge_count, 18);
    assert!(diag.is_watertight());
    assert!(diag.is_manifold());
    assert!(approx_eq(diag.mesh_area, 6.0, 1e-12));

    assert_eq!(diag.island_count, 6);
    assert_eq!(diag.overlapping_triangle_count, 0);
    assert_eq!(diag.inverted_triangle_count, 0);
    assert!(diag.is_clean());
    assert!(diag.uvs_within_unit_range());
    for (index, island) in analysis.islands.iter().enumerate() {
        assert_eq!(island.index, index);
        assert_eq!(island.triangles.len(), 2);
    }

    let su = 1.0 / 3.0 - 2.0 * MARGIN;
    let sv = 0.5 - 2.0 * MARGIN;
    let density = diag.density.expect("density");
    assert!(approx_eq(density.min_density, su * sv, 1e-9));
    assert!(approx_eq(density.max_density, su * sv, 1e-9));

    let extents = diag.uv_extents.expect("extents");
    assert!(approx_eq(extents.min_u, MARGIN, 1e-12));
    assert!(approx_eq(extents.max_u, 1.0 - MARGIN, 1e-12));
    assert!(approx_eq(extents.min_v, MARGIN, 1e-12));
    assert!(approx_eq(extents.max_v, 1.0 - MARGIN, 1e-12));

    let texel = analysis.texel_density(1024, 1024).expect("texel density");
    assert!(approx_eq(texel.min_pixels_per_unit, (su * sv).sqrt() * 1024.0, 1e-6));
}

#[test]
fn cube_atlas_gutter_depends_on_resolution() {
    let atlas = cube_atlas();
    let input = PrimitiveInput::new(&atlas.indices, &atlas.positions).with_uvs(&atlas.uvs);
    let analysis = analyze_primitive(&input).expect("cube");

    let fine = analysis.probe_gutters(
        GutterOptions {
            resolution: 1024,
            gutter_width_px: 8.0,
        },
        Tolerance::DEFAULT,
    );
    assert!(fine.passes());
    assert!(fine.squares_tested > 0);

    let coarse = analysis.probe_gutters(
        GutterOptions {
            resolution: 64,
            gutter_width_px: 8.0,
        },
        Tolerance::DEFAULT,
    );
    assert!(!coarse.passes());
    let svg = render_squares_svg(&coarse.violations, &UvSvgParams::default());
    assert_eq!(svg.matches("<path").count(), coarse.violations.len());
}

#[test]
fn stacked_faces_overlap_and_merge_islands() {
    let mut atlas = cube_atlas();
    // Move the second face's UVs onto the first face's cell.
    let (first, rest) = atlas.uvs.split_at_mut(8);
    rest[..8].copy_from_slice(first);

    let input = PrimitiveInput::new(&atlas.indices, &atlas.positions).with_uvs(&atlas.uvs);
    let analysis = analyze_primitive(&input).expect("cube");
    let diag = &analysis.diagnostics;
    assert_eq!(diag.uv_vertex_count, 20);
    assert_eq!(diag.overlapping_triangle_count, 4);
    assert_eq!(diag.island_count, 5);
    assert!(diag.warnings.iter().any(|w| w.contains("overlapping")));
}

#[test]
fn broadphase_choice_does_not_change_results() {
    let atlas = cube_atlas();
    let mut uvs = atlas.uvs.clone();
    // Slide face 4 halfway into face 3.
    for pair in uvs[32..40].chunks_exact_mut(2) {
        pair[0] -= 0.15;
    }
    let input = PrimitiveInput::new(&atlas.indices, &atlas.positions).with_uvs(&uvs);

    let grid = analyze_primitive_with_options(
        &input,
        AnalysisOptions {
            broadphase: Broadphase::Grid { target_per_cell: 1 },
            ..Default::default()
        },
    )
    .expect("grid");
    let pairwise = analyze_primitive_with_options(
        &input,
        AnalysisOptions {
            broadphase: Broadphase::Pairwise,
            ..Default::default()
        },
    )
    .expect("pairwise");

    assert!(!grid.overlap.pairs.is_empty());
    assert_eq!(grid.overlap.pairs, pairwise.overlap.pairs);
    let untimed = |analysis: &crate::topo::PrimitiveAnalysis| {
        let mut diag = analysis.diagnostics.clone();
        diag.timing = None;
        diag
    };
    assert_eq!(untimed(&grid), untimed(&pairwise));
}

#[test]
fn overlap_test_is_order_independent() {
    let a = uv([0, 1, 2], [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]);
    let b = uv([3, 4, 5], [[0.5, 0.2], [1.5, 0.2], [1.0, 1.2]]);
    let c = uv([6, 7, 8], [[1.0, 0.0], [2.0, 0.0], [1.5, 1.0]]);
    assert!(triangles_overlap(&a, &b, Tolerance::DEFAULT));
    assert!(triangles_overlap(&b, &a, Tolerance::DEFAULT));
    assert_eq!(
        triangles_overlap(&a, &c, Tolerance::DEFAULT),
        triangles_overlap(&c, &a, Tolerance::DEFAULT)
    );
}
