//! SVG line art of a UV layout.
//!
//! The unit UV square is mapped onto a `size` x `size` pixel frame inside
//! `padding`, with V pointing up. Coordinates outside `[0, 1]` still render,
//! they just land outside the framed square.

use std::fmt::Write;

use super::core::UvPoint;
use super::grid::Square;
use super::triangle::UvTriangle;

/// Parameters for UV layout export.
#[derive(Debug, Clone)]
pub struct UvSvgParams {
    /// Side of the UV unit square in pixels.
    pub size: u32,
    /// Padding around the unit square in pixels.
    pub padding: u32,
    pub stroke_width: f64,
    pub normal_color: String,
    pub inverted_color: String,
    pub overlapping_color: String,
    pub square_color: String,
    pub background_color: String,
}

impl Default for UvSvgParams {
    fn default() -> Self {
        Self {
            size: 512,
            padding: 16,
            stroke_width: 1.0,
            normal_color: "#000000".to_string(),
            inverted_color: "#ff0000".to_string(),
            overlapping_color: "#ff8c00".to_string(),
            square_color: "#1e90ff".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

impl UvSvgParams {
    #[must_use]
    pub fn with_size(mut self, size: u32, padding: u32) -> Self {
        self.size = size;
        self.padding = padding;
        self
    }

    /// Side of the whole document, saturating at `u32::MAX`.
    fn frame(&self) -> u32 {
        self.size.saturating_add(self.padding.saturating_mul(2))
    }

    fn to_frame(&self, p: UvPoint) -> (f64, f64) {
        let size = f64::from(self.size);
        let pad = f64::from(self.padding);
        (pad + p.u * size, pad + (1.0 - p.v) * size)
    }

    /// Outline color for a triangle's state. Overlap wins over inversion.
    fn triangle_color(&self, tri: &UvTriangle) -> &str {
        if tri.overlapping {
            &self.overlapping_color
        } else if tri.inverted {
            &self.inverted_color
        } else {
            &self.normal_color
        }
    }
}

/// Closed path through the given points in frame coordinates.
fn outline_path(points: &[UvPoint], params: &UvSvgParams) -> String {
    let mut path = String::new();
    for (i, p) in points.iter().enumerate() {
        let (x, y) = params.to_frame(*p);
        if i == 0 {
            let _ = write!(path, "M {x:.3} {y:.3}");
        } else {
            let _ = write!(path, " L {x:.3} {y:.3}");
        }
    }
    path.push_str(" Z");
    path
}

/// Path data (`M x y L x y L x y Z`) of one UV triangle in frame coordinates.
#[must_use]
pub fn triangle_path(tri: &UvTriangle, params: &UvSvgParams) -> String {
    outline_path(&tri.base.points, params)
}

fn open_document(params: &UvSvgParams) -> String {
    let frame = params.frame();
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{frame}" height="{frame}" viewBox="0 0 {frame} {frame}">
  <rect width="100%" height="100%" fill="{}"/>
"#,
        params.background_color
    );
    let _ = writeln!(
        svg,
        r##"  <rect x="{p}" y="{p}" width="{s}" height="{s}" fill="none" stroke="#999999" stroke-dasharray="4 4"/>"##,
        p = params.padding,
        s = params.size
    );
    svg
}

/// Renders every triangle as an outline colored by state.
#[must_use]
pub fn render_uv_layout_svg(triangles: &[UvTriangle], params: &UvSvgParams) -> String {
    let mut svg = open_document(params);
    for tri in triangles {
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="none" stroke="{}" stroke-width="{:.2}"/>"#,
            triangle_path(tri, params),
            params.triangle_color(tri),
            params.stroke_width
        );
    }
    svg.push_str("</svg>");
    svg
}

/// Renders probe squares; overlapping squares are filled.
#[must_use]
pub fn render_squares_svg(squares: &[Square], params: &UvSvgParams) -> String {
    let mut svg = open_document(params);
    for square in squares {
        let [a, b, c, d] = square.corners();
        let fill = if square.overlapping {
            params.overlapping_color.as_str()
        } else {
            "none"
        };
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="{}" stroke="{}" stroke-width="{:.2}"/>"#,
            outline_path(&[a, b, d, c], params),
            fill,
            params.square_color,
            params.stroke_width
        );
    }
    svg.push_str("</svg>");
    svg
}
