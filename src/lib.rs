#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod topo;

use std::fmt;

use topo::{
    AnalysisOptions, Broadphase, GutterOptions, InputShapeError, MatchPrecision, PrimitiveInput,
    PrimitiveReport, Tolerance, UvSvgParams, VERTEX_MATCH_DIGITS, analyze_primitive_with_options,
};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen(js_name = initializeParallel)]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not initialize rayon thread pool: {err}")))
}

/// Configurable entry point for JS consumers.
///
/// Holds the analysis options between calls; each call analyzes one primitive
/// from scratch.
#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    options: AnalysisOptions,
    svg: UvSvgParams,
}

#[wasm_bindgen]
impl Analyzer {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Analyzer {
        Analyzer::default()
    }

    /// Epsilon for orientation tests, degenerate areas and box rejection.
    #[wasm_bindgen(js_name = setTolerance)]
    pub fn set_tolerance(&mut self, eps: f64) -> Result<(), JsValue> {
        if !eps.is_finite() || eps < 0.0 {
            return Err(js_error("tolerance must be a finite, non-negative number"));
        }
        self.options.tolerance = Tolerance::new(eps);
        Ok(())
    }

    /// Switches vertex matching to the legacy validator's scaling.
    #[wasm_bindgen(js_name = useLegacyPrecision)]
    pub fn use_legacy_precision(&mut self, legacy: bool) {
        self.options.precision = if legacy {
            MatchPrecision::LegacyBitwise(VERTEX_MATCH_DIGITS)
        } else {
            MatchPrecision::Decimal(VERTEX_MATCH_DIGITS)
        };
    }

    /// Exhaustive overlap candidates instead of the grid broadphase.
    #[wasm_bindgen(js_name = usePairwiseOverlap)]
    pub fn use_pairwise_overlap(&mut self, pairwise: bool) {
        self.options.broadphase = if pairwise {
            Broadphase::Pairwise
        } else {
            Broadphase::default()
        };
    }

    /// Enables the gutter probe for a texture of `resolution` pixels.
    #[wasm_bindgen(js_name = setGutter)]
    pub fn set_gutter(&mut self, resolution: u32, gutter_width_px: f64) -> Result<(), JsValue> {
        if resolution == 0 || !gutter_width_px.is_finite() || gutter_width_px <= 0.0 {
            return Err(js_error("gutter needs a non-zero resolution and a positive width"));
        }
        self.options.gutter = Some(GutterOptions {
            resolution,
            gutter_width_px,
        });
        Ok(())
    }

    #[wasm_bindgen(js_name = clearGutter)]
    pub fn clear_gutter(&mut self) {
        self.options.gutter = None;
    }

    #[wasm_bindgen(js_name = setSvgSize)]
    pub fn set_svg_size(&mut self, size: u32, padding: u32) {
        self.svg = self.svg.clone().with_size(size, padding);
    }

    #[wasm_bindgen(js_name = analyzePrimitive)]
    pub fn analyze_primitive(
        &self,
        indices: &[u32],
        positions: &[f64],
        uvs: Option<Vec<f64>>,
    ) -> Result<JsValue, JsValue> {
        let report = self
            .report(indices, positions, uvs.as_deref())
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&report).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen(js_name = uvLayoutSvg)]
    pub fn uv_layout_svg(
        &self,
        indices: &[u32],
        positions: &[f64],
        uvs: &[f64],
    ) -> Result<String, JsValue> {
        self.layout_svg(indices, positions, uvs).map_err(to_js_error)
    }
}

impl Analyzer {
    fn report(
        &self,
        indices: &[u32],
        positions: &[f64],
        uvs: Option<&[f64]>,
    ) -> Result<PrimitiveReport, InputShapeError> {
        let input = PrimitiveInput {
            indices,
            positions,
            uvs,
        };
        analyze_primitive_with_options(&input, self.options).map(|analysis| analysis.report())
    }

    fn layout_svg(
        &self,
        indices: &[u32],
        positions: &[f64],
        uvs: &[f64],
    ) -> Result<String, InputShapeError> {
        let input = PrimitiveInput::new(indices, positions).with_uvs(uvs);
        let analysis = analyze_primitive_with_options(&input, self.options)?;
        Ok(analysis.uv_layout_svg(&self.svg))
    }
}

/// Analyzes one primitive with default options and returns its serialized
/// report.
#[wasm_bindgen(js_name = analyzePrimitive)]
pub fn analyze_primitive_js(
    indices: &[u32],
    positions: &[f64],
    uvs: Option<Vec<f64>>,
) -> Result<JsValue, JsValue> {
    Analyzer::new().analyze_primitive(indices, positions, uvs)
}

/// SVG line art of a primitive's UV layout with default options.
#[wasm_bindgen(js_name = uvLayoutSvg)]
pub fn uv_layout_svg_js(indices: &[u32], positions: &[f64], uvs: &[f64]) -> Result<String, JsValue> {
    Analyzer::new().uv_layout_svg(indices, positions, uvs)
}

fn js_error(message: &str) -> JsValue {
    JsError::new(message).into()
}

fn to_js_error(err: impl fmt::Display) -> JsValue {
    js_error(&err.to_string())
}
