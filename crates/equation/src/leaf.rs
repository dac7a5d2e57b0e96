//! Leaf primitives - static glyphs, rules and paths owned by constructs
//!
//! Leaves never take focus. A construct recomputes them on every layout
//! pass and stores them relative to its own top-left corner, so moving the
//! construct moves its leaves with it.

use crate::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use text_engine::{FontRequest, TextMeasurer};

/// Path drawing commands (similar to SVG)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32), // control point, end point
    Close,
}

impl PathCommand {
    fn translated(&self, dx: f32, dy: f32) -> Self {
        match *self {
            PathCommand::MoveTo(x, y) => PathCommand::MoveTo(x + dx, y + dy),
            PathCommand::LineTo(x, y) => PathCommand::LineTo(x + dx, y + dy),
            PathCommand::QuadTo(cx, cy, x, y) => {
                PathCommand::QuadTo(cx + dx, cy + dy, x + dx, y + dy)
            }
            PathCommand::Close => PathCommand::Close,
        }
    }
}

/// A piece of text drawn as a sign (bracket piece, big operator, arrow)
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphLeaf {
    pub text: String,
    pub font: FontRequest,
    /// Top-left of the glyph's ink box
    pub origin: Point,
    /// Advance width and ink height
    pub size: Size,
    /// Distance from `origin.y` down to the glyph baseline
    pub baseline: f32,
    /// Drawing is limited to this rectangle when set
    pub clip: Option<Rect>,
}

impl GlyphLeaf {
    /// Measure `text` and place the top of its ink at `origin`
    pub fn measured(
        text: impl Into<String>,
        font: FontRequest,
        measurer: &dyn TextMeasurer,
        origin: Point,
    ) -> Self {
        let text = text.into();
        let extent = measurer.measure(&text, &font);
        Self {
            text,
            font,
            origin,
            size: Size::new(extent.width, extent.extent),
            baseline: extent.ink_ascent,
            clip: None,
        }
    }

    /// A glyph whose font size is chosen so its ink is `height` tall
    pub fn scaled_to_height(
        text: impl Into<String>,
        font: FontRequest,
        height: f32,
        measurer: &dyn TextMeasurer,
        origin: Point,
    ) -> Self {
        let text = text.into();
        let natural = measurer.measure(&text, &font).extent;
        let scale = if natural > 0.0 { height / natural } else { 1.0 };
        Self::measured(text, font.with_size(font.font_size * scale), measurer, origin)
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }
}

/// A static drawable owned by a construct
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Glyph(GlyphLeaf),
    Line { start: Point, end: Point, thickness: f32 },
    Path { commands: Vec<PathCommand>, thickness: f32 },
}

impl Leaf {
    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32) -> Self {
        Leaf::Line {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
            thickness,
        }
    }

    /// An open polyline through `points`
    pub fn polyline(points: &[Point], thickness: f32) -> Self {
        let commands = points
            .iter()
            .enumerate()
            .map(|(index, p)| {
                if index == 0 {
                    PathCommand::MoveTo(p.x, p.y)
                } else {
                    PathCommand::LineTo(p.x, p.y)
                }
            })
            .collect();
        Leaf::Path { commands, thickness }
    }

    /// The same leaf moved by (dx, dy)
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        match self {
            Leaf::Glyph(glyph) => Leaf::Glyph(GlyphLeaf {
                origin: glyph.origin.offset(dx, dy),
                clip: glyph.clip.map(|clip| clip.translate(dx, dy)),
                ..glyph.clone()
            }),
            Leaf::Line { start, end, thickness } => Leaf::Line {
                start: start.offset(dx, dy),
                end: end.offset(dx, dy),
                thickness: *thickness,
            },
            Leaf::Path { commands, thickness } => Leaf::Path {
                commands: commands.iter().map(|c| c.translated(dx, dy)).collect(),
                thickness: *thickness,
            },
        }
    }
}

// =============================================================================
// Extension tiling
// =============================================================================

/// Start positions of extension tiles covering `[start, end]`.
///
/// Full tiles are laid from `start`. If a remainder is left, one last tile is
/// backed off so it ends exactly at `end`; that tile is the only one that
/// overlaps its neighbour. A span shorter than one tile gets a single tile
/// that the caller clips at `end`.
pub fn tile_extension(start: f32, end: f32, tile_len: f32) -> Vec<f32> {
    assert!(tile_len > 0.0, "extension tiles need a positive length");
    let span = end - start;
    if span <= 0.0 {
        return Vec::new();
    }
    if span <= tile_len {
        return vec![start];
    }

    let full = (span / tile_len).floor() as usize;
    let mut tiles: Vec<f32> = (0..full).map(|i| start + i as f32 * tile_len).collect();
    let covered = start + full as f32 * tile_len;
    if end - covered > tile_len * 1e-4 {
        tiles.push(end - tile_len);
    }
    tiles
}

/// Glyph pieces a tall vertical sign is assembled from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalPieces {
    pub top: Option<char>,
    pub middle: Option<char>,
    pub bottom: Option<char>,
    pub extension: char,
}

impl VerticalPieces {
    /// Height of the fixed pieces; below this the sign cannot be assembled
    pub fn fixed_height(&self, font: &FontRequest, measurer: &dyn TextMeasurer) -> f32 {
        [self.top, self.middle, self.bottom]
            .iter()
            .flatten()
            .map(|ch| measurer.measure(&ch.to_string(), font).extent)
            .sum()
    }

    /// Assemble a sign `height` tall. Returns its width and its leaves.
    pub fn assemble(
        &self,
        height: f32,
        font: FontRequest,
        measurer: &dyn TextMeasurer,
    ) -> (f32, Vec<Leaf>) {
        let piece = |ch: char, y: f32| {
            GlyphLeaf::measured(ch.to_string(), font, measurer, Point::new(0.0, y))
        };

        let mut leaves = Vec::new();
        let mut spans = Vec::new();
        let mut cursor = 0.0;
        let mut width: f32 = 0.0;

        if let Some(top) = self.top {
            let glyph = piece(top, 0.0);
            cursor = glyph.height();
            width = width.max(glyph.width());
            leaves.push(glyph);
        }
        let bottom_top = match self.bottom {
            Some(bottom) => {
                let sample = piece(bottom, 0.0);
                let y = height - sample.height();
                width = width.max(sample.width());
                leaves.push(piece(bottom, y));
                y
            }
            None => height,
        };
        match self.middle {
            Some(middle) => {
                let sample = piece(middle, 0.0);
                let y = (height - sample.height()) / 2.0;
                width = width.max(sample.width());
                spans.push((cursor, y));
                spans.push((y + sample.height(), bottom_top));
                leaves.push(piece(middle, y));
            }
            None => spans.push((cursor, bottom_top)),
        }

        let sample = piece(self.extension, 0.0);
        let tile_len = sample.height().max(f32::EPSILON);
        width = width.max(sample.width());
        for (span_start, span_end) in spans {
            for y in tile_extension(span_start, span_end, tile_len) {
                let mut tile = piece(self.extension, y);
                if y + tile_len > span_end {
                    tile.clip = Some(Rect::new(0.0, y, width, span_end - y));
                }
                leaves.push(tile);
            }
        }

        (width, leaves.into_iter().map(Leaf::Glyph).collect())
    }
}
