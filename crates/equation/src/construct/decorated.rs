//! Decorated - a bar, accent, arrow or strike drawn on a row

use super::{arrow_leaves, param, Arrangement, ArrowKind, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::leaf::{GlyphLeaf, Leaf, PathCommand};
use std::collections::HashMap;
use text_engine::{FontRequest, TextMeasurer};

/// Below this width (in ems) accents are single glyphs
const ACCENT_WIDTH_LIMIT: f32 = 1.5;

named_enum!(
    Decoration {
        Bar => "Bar",
        DoubleBar => "DoubleBar",
        Tilde => "Tilde",
        Hat => "Hat",
        Parenthesis => "Parenthesis",
        RightArrow => "RightArrow",
        LeftArrow => "LeftArrow",
        DoubleArrow => "DoubleArrow",
        Cross => "Cross",
        StrikeThrough => "StrikeThrough",
    }
);

impl Decoration {
    /// Drawn over the row rather than in a band beside it
    pub fn is_overlay(&self) -> bool {
        matches!(self, Decoration::Cross | Decoration::StrikeThrough)
    }
}

named_enum!(
    DecorationPosition {
        Top => "Top",
        Bottom => "Bottom",
        Middle => "Middle",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoratedType {
    pub decoration: Decoration,
    pub position: DecorationPosition,
}

impl DecoratedType {
    pub fn new(decoration: Decoration, position: DecorationPosition) -> Self {
        Self { decoration, position }
    }

    /// Position actually used for layout; overlays are always in the middle
    pub fn effective_position(&self) -> DecorationPosition {
        if self.decoration.is_overlay() {
            DecorationPosition::Middle
        } else {
            self.position
        }
    }

    pub(super) fn params(&self) -> Params {
        vec![
            ("decoration", self.decoration.to_string()),
            ("position", self.position.to_string()),
        ]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Ok(Self::new(
            Decoration::parse(param(params, "decoration")?)?,
            DecorationPosition::parse(param(params, "position")?)?,
        ))
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        vec![SlotScale::Same]
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let inside = input.slots[0];
        let m = &input.metrics;
        let band = m.decoration_height;
        let gap = m.decoration_gap;
        let width = inside.width.max(m.placeholder_width);

        let (inside_top, band_top, height) = match self.effective_position() {
            DecorationPosition::Top => (band + gap, 0.0, band + gap + inside.height),
            DecorationPosition::Bottom => (0.0, inside.height + gap, inside.height + gap + band),
            DecorationPosition::Middle => {
                (0.0, inside.ref_y - m.axis_height - band / 2.0, inside.height)
            }
        };

        let leaves = match self.decoration {
            Decoration::Cross => vec![
                Leaf::line(0.0, 0.0, width, inside.height, m.rule_thickness),
                Leaf::line(0.0, inside.height, width, 0.0, m.rule_thickness),
            ],
            _ => {
                let font = input.ctx.sign_font(input.font_size);
                self.band_leaves(width, band, m.rule_thickness, font, input.ctx.measurer)
                    .into_iter()
                    .map(|leaf| leaf.translated(0.0, band_top))
                    .collect()
            }
        };

        Arrangement {
            extent: BoxExtent::new(width, height, inside_top + inside.ref_y),
            slot_offsets: vec![Point::new((width - inside.width) / 2.0, inside_top)],
            leaves,
        }
    }

    /// Decoration leaves in a `width` x `band` box at the origin
    fn band_leaves(
        &self,
        width: f32,
        band: f32,
        rule: f32,
        font: FontRequest,
        measurer: &dyn TextMeasurer,
    ) -> Vec<Leaf> {
        let mid = band / 2.0;
        let bottom_side = self.effective_position() == DecorationPosition::Bottom;
        let accent = |ch: char| {
            let glyph = GlyphLeaf::measured(ch.to_string(), font, measurer, Point::origin());
            let dx = (width - glyph.width()) / 2.0;
            let dy = mid - glyph.height() / 2.0;
            vec![Leaf::Glyph(glyph).translated(dx, dy)]
        };
        let narrow = width < font.font_size * ACCENT_WIDTH_LIMIT;

        match self.decoration {
            Decoration::Bar | Decoration::StrikeThrough => {
                vec![Leaf::line(0.0, mid, width, mid, rule)]
            }
            Decoration::DoubleBar => [band * 0.3, band * 0.7]
                .iter()
                .map(|y| Leaf::line(0.0, *y, width, *y, rule))
                .collect(),
            Decoration::Tilde if narrow => accent('\u{02DC}'),
            Decoration::Tilde => {
                let amp = band * 0.3;
                vec![Leaf::Path {
                    commands: vec![
                        PathCommand::MoveTo(0.0, mid + amp),
                        PathCommand::QuadTo(width * 0.25, mid - 2.0 * amp, width * 0.5, mid),
                        PathCommand::QuadTo(width * 0.75, mid + 2.0 * amp, width, mid - amp),
                    ],
                    thickness: rule,
                }]
            }
            Decoration::Hat if narrow => accent('\u{02C6}'),
            Decoration::Hat => vec![Leaf::polyline(
                &[Point::new(0.0, band), Point::new(width / 2.0, 0.0), Point::new(width, band)],
                rule,
            )],
            Decoration::Parenthesis if narrow => {
                accent(if bottom_side { '\u{23DD}' } else { '\u{23DC}' })
            }
            Decoration::Parenthesis => {
                let (edge, peak) = if bottom_side { (0.0, band * 2.0) } else { (band, -band) };
                vec![Leaf::Path {
                    commands: vec![
                        PathCommand::MoveTo(0.0, edge),
                        PathCommand::QuadTo(width / 2.0, peak, width, edge),
                    ],
                    thickness: rule,
                }]
            }
            Decoration::RightArrow => {
                arrow_leaves(ArrowKind::Right, width, mid, rule, font, measurer)
            }
            Decoration::LeftArrow => {
                arrow_leaves(ArrowKind::Left, width, mid, rule, font, measurer)
            }
            Decoration::DoubleArrow => {
                arrow_leaves(ArrowKind::DoubleHeaded, width, mid, rule, font, measurer)
            }
            Decoration::Cross => Vec::new(),
        }
    }
}
