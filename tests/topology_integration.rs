use meshlint_engine::topo::{
    AnalysisOptions, Broadphase, GutterOptions, InputShapeError, MatchPrecision, ModelError,
    PrimitiveInput, Tolerance, UvSvgParams, VERTEX_MATCH_DIGITS, analyze_model,
    analyze_model_with_options, analyze_primitive, analyze_primitive_with_options,
};

/// Open box (no lid) made of five quads over one connected UV chart.
fn open_box() -> (Vec<f64>, Vec<f64>, Vec<u32>) {
    // Bottom 0..4, then the top rim 4..8.
    let corners = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let positions: Vec<f64> = corners.iter().flatten().copied().collect();

    // Bottom in the middle, rim corners pushed out diagonally.
    let uvs = vec![
        0.25, 0.25, 0.5, 0.25, 0.5, 0.5, 0.25, 0.5, //
        0.0, 0.0, 0.75, 0.0, 0.75, 0.75, 0.0, 0.75,
    ];

    let indices = vec![
        0, 2, 1, 0, 3, 2, // bottom
        0, 1, 5, 0, 5, 4, // front
        1, 2, 6, 1, 6, 5, // right
        2, 3, 7, 2, 7, 6, // back
        3, 0, 4, 3, 4, 7, // left
    ];
    (positions, uvs, indices)
}

#[test]
fn open_box_reports_rim_as_open_edges() {
    let (positions, uvs, indices) = open_box();
    let input = PrimitiveInput::new(&indices, &positions).with_uvs(&uvs);
    let analysis = analyze_primitive(&input).expect("open box");
    let diag = &analysis.diagnostics;

    assert_eq!(diag.vertex_count, 8);
    assert_eq!(diag.triangle_count, 10);
    assert_eq!(diag.open_edge_count, 4);
    assert!(!diag.is_watertight());
    assert!(diag.is_manifold());
    assert!((diag.mesh_area - 5.0).abs() < 1e-12);
    assert_eq!(diag.island_count, 1);
    assert!(diag.uvs_within_unit_range());
    assert!(diag.summary().contains("open:4"));
}

#[test]
fn legacy_precision_merges_more_aggressively() {
    let positions = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.01, 0.0, 0.0, //
        1.0, 1.0, 0.0,
    ];
    let indices = [0u32, 1, 2, 3, 4, 2];
    let input = PrimitiveInput::new(&indices, &positions);

    let decimal = analyze_primitive(&input).expect("decimal");
    assert_eq!(decimal.diagnostics.vertex_count, 5);

    // Scale 12: 1.0 and 1.01 both round to 12.
    let legacy = analyze_primitive_with_options(
        &input,
        AnalysisOptions {
            precision: MatchPrecision::LegacyBitwise(VERTEX_MATCH_DIGITS),
            ..Default::default()
        },
    )
    .expect("legacy");
    assert_eq!(legacy.diagnostics.vertex_count, 4);
}

#[test]
fn model_analysis_combines_primitives() {
    let (positions, uvs, indices) = open_box();
    let lid_positions = [0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0];
    let lid_uvs = [0.75, 0.75, 1.0, 0.75, 1.0, 1.0, 0.75, 1.0];
    let lid_indices = [0u32, 1, 2, 0, 2, 3];

    let primitives = [
        PrimitiveInput::new(&indices, &positions).with_uvs(&uvs),
        PrimitiveInput::new(&lid_indices, &lid_positions).with_uvs(&lid_uvs),
    ];
    let options = AnalysisOptions {
        tolerance: Tolerance::DEFAULT,
        broadphase: Broadphase::Pairwise,
        gutter: Some(GutterOptions {
            resolution: 512,
            gutter_width_px: 4.0,
        }),
        ..Default::default()
    };
    let model = analyze_model_with_options(&primitives, options).expect("model");

    assert_eq!(model.primitives.len(), 2);
    let diag = &model.diagnostics;
    assert_eq!(diag.triangle_count, 12);
    assert_eq!(diag.island_count, 2);
    assert!((diag.mesh_area - 6.0).abs() < 1e-12);
    let extents = diag.uv_extents.expect("extents");
    assert_eq!((extents.min_u, extents.max_u), (0.0, 1.0));
    assert_eq!((extents.min_v, extents.max_v), (0.0, 1.0));
    assert!(model.primitives.iter().all(|p| p.gutter.is_some()));

    let reports = model.reports();
    assert_eq!(reports[1].islands.len(), 1);
    let lid_density = reports[1].diagnostics.density.expect("density");
    assert!((lid_density.min_density - 0.0625).abs() < 1e-12);
}

#[test]
fn model_error_names_primitive() {
    let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let good = [0u32, 1, 2];
    let bad = [0u32, 1, 7];
    let err = analyze_model(&[
        PrimitiveInput::new(&good, &positions),
        PrimitiveInput::new(&bad, &positions),
    ])
    .expect_err("index out of range");
    match err {
        ModelError::Primitive { primitive, source } => {
            assert_eq!(primitive, 1);
            assert_eq!(
                source,
                InputShapeError::IndexOutOfRange {
                    slot: 2,
                    index: 7,
                    vertex_count: 3
                }
            );
        }
    }
}

#[test]
fn layout_svg_renders_every_triangle() {
    let (positions, uvs, indices) = open_box();
    let input = PrimitiveInput::new(&indices, &positions).with_uvs(&uvs);
    let analysis = analyze_primitive(&input).expect("open box");
    let svg = analysis.uv_layout_svg(&UvSvgParams::default().with_size(256, 8));
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("<path").count(), 10);
}
