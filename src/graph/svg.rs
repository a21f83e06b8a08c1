//! SVG drawing surface, used for the exported pipeline graph.

use std::fmt::Write;

use super::{Anchor, Rgb, Surface};

/// Surface that accumulates SVG elements; [`SvgSurface::finish`] wraps
/// them in an `<svg>` root sized by the last clear.
#[derive(Debug, Default)]
pub struct SvgSurface {
    measured_width: Option<f64>,
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    /// Unmeasured surface; the renderer falls back to its default width.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface with a known width.
    pub fn with_width(width: f64) -> Self {
        Self {
            measured_width: Some(width),
            ..Self::default()
        }
    }

    /// Serialize the drawn content as a standalone SVG document.
    pub fn finish(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">{}</svg>",
            self.width, self.height, self.body
        )
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl Surface for SvgSurface {
    fn measured_width(&self) -> Option<f64> {
        self.measured_width
    }

    fn clear(&mut self, width: f64, height: f64) {
        self.body.clear();
        self.width = width;
        self.height = height;
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Rgb, width: f64) {
        let _ = write!(
            self.body,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            x1,
            y1,
            x2,
            y2,
            stroke.hex(),
            width,
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Rgb, stroke: Rgb) {
        let _ = write!(
            self.body,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            cx,
            cy,
            r,
            fill.hex(),
            stroke.hex(),
        );
    }

    fn text(&mut self, x: f64, y: f64, anchor: Anchor, content: &str) {
        let anchor = match anchor {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
        };
        let _ = write!(
            self.body,
            "<text x=\"{}\" y=\"{}\" text-anchor=\"{}\">{}</text>",
            x,
            y,
            anchor,
            xml_escape(content),
        );
    }
}
