//! Horizontal brackets - a brace or square bracket over or under a row,
//! with a script-size label on the far side

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point, Rect};
use crate::leaf::{tile_extension, GlyphLeaf, Leaf, PathCommand};
use crate::navigation::Key;
use std::collections::HashMap;
use text_engine::{FontRequest, TextMeasurer};

/// Horizontal line piece tiled between the hooks of a stretched sign
const EXTENSION: char = '\u{23AF}';

named_enum!(
    HorizontalBracketSign {
        Curly => "Curly",
        Square => "Square",
    }
);

named_enum!(
    HorizontalPosition {
        Top => "Top",
        Bottom => "Bottom",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalBracketType {
    pub sign: HorizontalBracketSign,
    pub position: HorizontalPosition,
}

impl HorizontalBracketType {
    pub const INSIDE: usize = 0;
    pub const LABEL: usize = 1;

    pub fn new(sign: HorizontalBracketSign, position: HorizontalPosition) -> Self {
        Self { sign, position }
    }

    fn glyph(&self) -> char {
        match (self.sign, self.position) {
            (HorizontalBracketSign::Curly, HorizontalPosition::Top) => '\u{23DE}',
            (HorizontalBracketSign::Curly, HorizontalPosition::Bottom) => '\u{23DF}',
            (HorizontalBracketSign::Square, HorizontalPosition::Top) => '\u{23B4}',
            (HorizontalBracketSign::Square, HorizontalPosition::Bottom) => '\u{23B5}',
        }
    }

    pub(super) fn params(&self) -> Params {
        vec![("sign", self.sign.to_string()), ("position", self.position.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Ok(Self::new(
            HorizontalBracketSign::parse(param(params, "sign")?)?,
            HorizontalPosition::parse(param(params, "position")?)?,
        ))
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        vec![SlotScale::Same, SlotScale::Script]
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        let (to_label, to_inside) = match self.position {
            HorizontalPosition::Top => (Key::Up, Key::Down),
            HorizontalPosition::Bottom => (Key::Down, Key::Up),
        };
        match slot {
            Self::INSIDE if key == to_label => Some(Self::LABEL),
            Self::LABEL if key == to_inside => Some(Self::INSIDE),
            _ => None,
        }
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let inside = input.slots[Self::INSIDE];
        let label = input.slots[Self::LABEL];
        let m = &input.metrics;
        let gap = m.decoration_gap;
        let band = m.decoration_height;
        let width = inside.width.max(label.width);
        let center = |w: f32| (width - w) / 2.0;

        let (inside_top, band_top, label_top) = match self.position {
            HorizontalPosition::Top => {
                let band_top = label.height + gap;
                (band_top + band + gap, band_top, 0.0)
            }
            HorizontalPosition::Bottom => {
                let band_top = inside.height + gap;
                (0.0, band_top, band_top + band + gap)
            }
        };
        let height = match self.position {
            HorizontalPosition::Top => inside_top + inside.height,
            HorizontalPosition::Bottom => label_top + label.height,
        };

        let span = inside.width.max(m.placeholder_width);
        let font = input.ctx.sign_font(input.font_size);
        let sign = self
                .sign_leaves(
                    span,
                    band,
                    m.stretch_threshold,
                    m.rule_thickness,
                    font,
                    input.ctx.measurer,
                )
            .into_iter()
            .map(|leaf| leaf.translated(center(span), band_top))
            .collect();

        Arrangement {
            extent: BoxExtent::new(width, height, inside_top + inside.ref_y),
            slot_offsets: vec![
                Point::new(center(inside.width), inside_top),
                Point::new(center(label.width), label_top),
            ],
            leaves: sign,
        }
    }

    /// Sign leaves in a `width` x `band` box at the origin
    fn sign_leaves(
        &self,
        width: f32,
        band: f32,
        threshold: f32,
        rule: f32,
        font: FontRequest,
        measurer: &dyn TextMeasurer,
    ) -> Vec<Leaf> {
        if width <= threshold {
            let text = self.glyph().to_string();
            let glyph = GlyphLeaf::measured(text, font, measurer, Point::origin());
            let dx = (width - glyph.width()) / 2.0;
            let dy = (band - glyph.height()) / 2.0;
            return vec![Leaf::Glyph(glyph).translated(dx, dy)];
        }

        // Drawn for a top bracket, then mirrored for the bottom
        let flip = |y: f32| match self.position {
            HorizontalPosition::Top => y,
            HorizontalPosition::Bottom => band - y,
        };
        let mid = band / 2.0;
        let hook = band / 2.0;
        let mut leaves = Vec::new();
        let mut spans = Vec::new();

        match self.sign {
            HorizontalBracketSign::Square => {
                leaves.push(Leaf::line(rule / 2.0, flip(band), rule / 2.0, flip(mid), rule));
                let right = width - rule / 2.0;
                leaves.push(Leaf::line(right, flip(band), right, flip(mid), rule));
                spans.push((0.0, width));
            }
            HorizontalBracketSign::Curly => {
                let half = width / 2.0;
                let curve = |x0: f32, y0: f32, cx: f32, cy: f32, x1: f32, y1: f32| Leaf::Path {
                    commands: vec![
                        PathCommand::MoveTo(x0, flip(y0)),
                        PathCommand::QuadTo(cx, flip(cy), x1, flip(y1)),
                    ],
                    thickness: rule,
                };
                leaves.push(curve(0.0, band, 0.0, mid, hook, mid));
                leaves.push(curve(half - hook, mid, half, mid, half, 0.0));
                leaves.push(curve(half, 0.0, half, mid, half + hook, mid));
                leaves.push(curve(width - hook, mid, width, mid, width, band));
                spans.push((hook, half - hook));
                spans.push((half + hook, width - hook));
            }
        }

        let template = GlyphLeaf::measured(EXTENSION.to_string(), font, measurer, Point::origin());
        let tile_len = template.width().max(f32::EPSILON);
        let y = flip(mid) - template.baseline + font.font_size * crate::geometry::AXIS_FACTOR;
        for (start, end) in spans {
            for x in tile_extension(start, end, tile_len) {
                let origin = Point::new(x, y);
                let mut tile = GlyphLeaf::measured(EXTENSION.to_string(), font, measurer, origin);
                if x + tile_len > end {
                    tile.clip = Some(Rect::new(x, y, end - x, tile.height()));
                }
                leaves.push(Leaf::Glyph(tile));
            }
        }
        leaves
    }
}
