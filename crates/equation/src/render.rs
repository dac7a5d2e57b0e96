//! Equation Rendering - Convert the laid-out tree to render primitives
//!
//! The renderer walks a body container after layout and produces a flat
//! display list in absolute coordinates. Backends only need to draw text,
//! lines, rectangles and paths; everything about math typesetting has
//! already been decided by the layout pass.

use crate::construct::Construct;
use crate::container::RowContainer;
use crate::format::{Color, FormatTable};
use crate::geometry::{Point, Rect};
use crate::leaf::{Leaf, PathCommand};
use crate::navigation::caret_row;
use crate::row::{Row, RowItem, TextRun};
use text_engine::FontRequest;

// =============================================================================
// Render Primitives
// =============================================================================

/// A render primitive
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPrimitive {
    /// Draw text with its baseline starting at `position`
    Text {
        text: String,
        position: Point,
        font: FontRequest,
        color: Color,
        underline: bool,
    },
    /// Draw a line (fraction bars, overlines, strike-throughs)
    Line {
        start: Point,
        end: Point,
        thickness: f32,
        color: Color,
    },
    /// Draw a rectangle (selection, empty slot placeholders)
    Rectangle {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<(Color, f32)>,
    },
    /// Draw an open path (radical signs, arrow heads, braces)
    Path {
        commands: Vec<PathCommand>,
        thickness: f32,
        color: Color,
    },
    /// Draw a glyph clipped to a rectangle (bracket extension tiles)
    ClippedText {
        text: String,
        position: Point,
        font: FontRequest,
        color: Color,
        clip: Rect,
    },
    /// The text caret
    Caret { rect: Rect, color: Color },
}

// =============================================================================
// Render Output
// =============================================================================

/// The complete render output for an equation
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// All render primitives, back to front
    pub primitives: Vec<RenderPrimitive>,
    /// Total bounding box
    pub bounds: Rect,
    /// Baseline position (y coordinate)
    pub baseline: f32,
}

impl RenderOutput {
    pub fn new(primitives: Vec<RenderPrimitive>, bounds: Rect, baseline: f32) -> Self {
        Self {
            primitives,
            bounds,
            baseline,
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Configuration for the renderer
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub caret_color: Color,
    /// Caret width in points
    pub caret_width: f32,
    pub selection_color: Color,
    /// Outline of empty slots
    pub placeholder_color: Color,
    pub show_caret: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            caret_color: Color::BLACK,
            caret_width: 1.0,
            selection_color: Color::new(51, 153, 255, 96),
            placeholder_color: Color::rgb(128, 128, 128),
            show_caret: true,
        }
    }
}

/// Renderer for converting a laid-out body to render primitives
pub struct Renderer {
    config: RenderConfig,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a new renderer with default config
    pub fn new() -> Self {
        Self {
            config: RenderConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a laid-out body. Selection sits behind the content and the
    /// caret on top of it.
    pub fn render(&self, body: &RowContainer, formats: &FormatTable) -> RenderOutput {
        let mut primitives = Vec::new();
        let active = caret_row(body);

        for rect in active.selection_rects() {
            primitives.push(RenderPrimitive::Rectangle {
                rect,
                fill: Some(self.config.selection_color),
                stroke: None,
            });
        }

        self.render_container(body, formats, false, &mut primitives);

        if self.config.show_caret && active.selection().is_none() {
            let line = active.caret_rect();
            primitives.push(RenderPrimitive::Caret {
                rect: Rect::new(line.x(), line.y(), self.config.caret_width, line.height()),
                color: self.config.caret_color,
            });
        }

        let geometry = body.geometry();
        RenderOutput::new(primitives, geometry.rect(), geometry.baseline())
    }

    fn render_container(
        &self,
        container: &RowContainer,
        formats: &FormatTable,
        in_slot: bool,
        primitives: &mut Vec<RenderPrimitive>,
    ) {
        for line in container.lines() {
            self.render_row(line, formats, in_slot, primitives);
        }
    }

    fn render_row(
        &self,
        row: &Row,
        formats: &FormatTable,
        in_slot: bool,
        primitives: &mut Vec<RenderPrimitive>,
    ) {
        if row.is_empty() {
            // Only slots show a box; an empty body line stays blank
            if in_slot {
                primitives.push(RenderPrimitive::Rectangle {
                    rect: row.geometry().rect(),
                    fill: None,
                    stroke: Some((self.config.placeholder_color, 0.5)),
                });
            }
            return;
        }

        let color = formats.get(row.default_format()).color;
        for item in row.items() {
            match item {
                RowItem::Text(run) => self.render_run(run, formats, primitives),
                RowItem::Construct(construct) => {
                    self.render_construct(construct, formats, color, primitives)
                }
            }
        }
    }

    fn render_run(
        &self,
        run: &TextRun,
        formats: &FormatTable,
        primitives: &mut Vec<RenderPrimitive>,
    ) {
        let baseline = run.geometry().baseline();
        for (id, range) in run.segments() {
            let format = formats.get(id);
            let x = run.caret_x(range.start);
            primitives.push(RenderPrimitive::Text {
                text: run.chars()[range].iter().collect(),
                position: Point::new(x, baseline),
                font: format.font_request(),
                color: format.color,
                underline: format.underline,
            });
        }
    }

    fn render_construct(
        &self,
        construct: &Construct,
        formats: &FormatTable,
        color: Color,
        primitives: &mut Vec<RenderPrimitive>,
    ) {
        for leaf in construct.leaves() {
            primitives.push(leaf_primitive(leaf, color));
        }
        for slot in construct.slots() {
            self.render_container(slot, formats, true, primitives);
        }
    }
}

fn leaf_primitive(leaf: Leaf, color: Color) -> RenderPrimitive {
    match leaf {
        Leaf::Glyph(glyph) => {
            let position = Point::new(glyph.origin.x, glyph.origin.y + glyph.baseline);
            match glyph.clip {
                Some(clip) => RenderPrimitive::ClippedText {
                    text: glyph.text,
                    position,
                    font: glyph.font,
                    color,
                    clip,
                },
                None => RenderPrimitive::Text {
                    text: glyph.text,
                    position,
                    font: glyph.font,
                    color,
                    underline: false,
                },
            }
        }
        Leaf::Line { start, end, thickness } => RenderPrimitive::Line {
            start,
            end,
            thickness,
            color,
        },
        Leaf::Path { commands, thickness } => RenderPrimitive::Path {
            commands,
            thickness,
            color,
        },
    }
}
