//! Pipeline graph layout and rendering.
//!
//! The processing pipeline is shown as a vertical chain of status-colored
//! nodes. Layout is fixed-row: every render recomputes node positions from
//! the step snapshot and the measured surface width, clears the surface,
//! and redraws everything. Nothing is diffed or persisted between renders.

pub mod svg;

use crate::artifacts::types::{PipelineStep, StepStatus};

/// Width assumed when the surface has not been measured yet.
pub const DEFAULT_WIDTH: f64 = 400.0;
/// Vertical units reserved per step when sizing the surface.
pub const ROW_HEIGHT: f64 = 100.0;
/// Vertical distance between adjacent node centers.
pub const NODE_SPACING: f64 = 80.0;
/// Node circle radius.
pub const NODE_RADIUS: f64 = 25.0;

/// Label x offset from the node center.
const LABEL_OFFSET: f64 = 40.0;
/// Glyph and label y offset, visually centering text on the circle.
const TEXT_OFFSET: f64 = 5.0;
const EDGE_WIDTH: f64 = 2.0;

const EDGE_STROKE: Rgb = Rgb(0x99, 0x99, 0x99);
const NODE_OUTLINE: Rgb = Rgb(0xff, 0xff, 0xff);
const GREEN: Rgb = Rgb(0x4c, 0xaf, 0x50);
const RED: Rgb = Rgb(0xf4, 0x43, 0x36);
const BLUE: Rgb = Rgb(0x21, 0x96, 0xf3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Horizontal text anchoring relative to the given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
}

/// 2D vector surface the renderer draws onto.
pub trait Surface {
    /// Measured width, `None` before the surface has a size.
    fn measured_width(&self) -> Option<f64>;
    /// Drop all previously drawn content and set the viewport.
    fn clear(&mut self, width: f64, height: f64);
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: Rgb, width: f64);
    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Rgb, stroke: Rgb);
    fn text(&mut self, x: f64, y: f64, anchor: Anchor, content: &str);
}

/// Node placed by the layout pass. Recomputed on every render, never kept.
#[derive(Debug)]
pub struct LayoutNode<'a> {
    pub step: &'a PipelineStep,
    pub x: f64,
    pub y: f64,
}

/// Fill color and overlay glyph for a step status. Total: unrecognized
/// statuses render like pending.
pub fn node_style(status: StepStatus) -> (Rgb, &'static str) {
    match status {
        StepStatus::Completed => (GREEN, "✓"),
        StepStatus::Error => (RED, "✗"),
        StepStatus::Pending | StepStatus::Unknown => (BLUE, "⋯"),
    }
}

/// Place every step on the vertical center line, one per row.
pub fn layout(steps: &[PipelineStep], width: f64) -> Vec<LayoutNode<'_>> {
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| LayoutNode {
            step,
            x: width / 2.0,
            y: (i as f64 + 1.0) * NODE_SPACING,
        })
        .collect()
}

/// Surface height for a step snapshot.
pub fn surface_height(step_count: usize) -> f64 {
    step_count as f64 * ROW_HEIGHT
}

/// Clear the surface and draw the full node chain: edges beneath, nodes
/// and text on top.
pub fn layout_and_draw(steps: &[PipelineStep], surface: &mut dyn Surface) {
    let width = surface.measured_width().unwrap_or(DEFAULT_WIDTH);
    surface.clear(width, surface_height(steps.len()));

    let nodes = layout(steps, width);
    for pair in nodes.windows(2) {
        surface.line(
            pair[0].x,
            pair[0].y,
            pair[1].x,
            pair[1].y,
            EDGE_STROKE,
            EDGE_WIDTH,
        );
    }
    for node in &nodes {
        let (fill, glyph) = node_style(node.step.status);
        surface.circle(node.x, node.y, NODE_RADIUS, fill, NODE_OUTLINE);
        surface.text(node.x, node.y + TEXT_OFFSET, Anchor::Middle, glyph);
        surface.text(
            node.x + LABEL_OFFSET,
            node.y + TEXT_OFFSET,
            Anchor::Start,
            &node.step.label,
        );
    }
}
