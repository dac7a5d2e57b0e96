//! Division - numerator over denominator, or inline with a slash

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::leaf::{GlyphLeaf, Leaf};
use crate::navigation::Key;
use std::collections::HashMap;

named_enum!(
    /// How numerator and denominator are separated
    DivisionStyle {
        Regular => "Regular",
        NoBar => "NoBar",
        DoubleBar => "DoubleBar",
        Horizontal => "Horizontal",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionType {
    pub style: DivisionStyle,
    /// Children set at script size
    pub small: bool,
}

impl Default for DivisionType {
    fn default() -> Self {
        Self::new(DivisionStyle::Regular, false)
    }
}

impl DivisionType {
    pub const NUMERATOR: usize = 0;
    pub const DENOMINATOR: usize = 1;

    pub fn new(style: DivisionStyle, small: bool) -> Self {
        Self { style, small }
    }

    pub(super) fn params(&self) -> Params {
        vec![("style", self.style.to_string()), ("small", self.small.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        let style = DivisionStyle::parse(param(params, "style")?)?;
        let small = param(params, "small")? == "true";
        Ok(Self::new(style, small))
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        let scale = if self.small {
            SlotScale::Script
        } else {
            SlotScale::Same
        };
        vec![scale, scale]
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        let (forward, back) = match self.style {
            DivisionStyle::Horizontal => (Key::Right, Key::Left),
            _ => (Key::Down, Key::Up),
        };
        match (slot, key) {
            (Self::NUMERATOR, k) if k == forward => Some(Self::DENOMINATOR),
            (Self::DENOMINATOR, k) if k == back => Some(Self::NUMERATOR),
            _ => None,
        }
    }

    pub(super) fn last_slot(&self) -> usize {
        match self.style {
            DivisionStyle::Horizontal => Self::DENOMINATOR,
            _ => Self::NUMERATOR,
        }
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        match self.style {
            DivisionStyle::Horizontal => self.layout_inline(input),
            _ => self.layout_stacked(input),
        }
    }

    fn layout_stacked(&self, input: &LayoutInput<'_>) -> Arrangement {
        let (num, den) = (input.slots[0], input.slots[1]);
        let m = &input.metrics;
        let rule = m.rule_thickness;
        let half_gap = m.division_gap / 2.0;

        let bar_block = match self.style {
            DivisionStyle::Regular => rule,
            DivisionStyle::DoubleBar => rule * 3.0,
            _ => 0.0,
        };
        let width = num.width.max(den.width) + 2.0 * m.division_padding;
        let bar_top = num.height + half_gap;
        let den_top = bar_top + bar_block + half_gap;

        let mut leaves = Vec::new();
        match self.style {
            DivisionStyle::Regular => {
                let y = bar_top + rule / 2.0;
                leaves.push(Leaf::line(0.0, y, width, y, rule));
            }
            DivisionStyle::DoubleBar => {
                for y in [bar_top + rule / 2.0, bar_top + rule * 2.5] {
                    leaves.push(Leaf::line(0.0, y, width, y, rule));
                }
            }
            _ => {}
        }

        Arrangement {
            extent: BoxExtent::new(
                width,
                den_top + den.height,
                bar_top + bar_block / 2.0 + m.axis_height,
            ),
            slot_offsets: vec![
                Point::new((width - num.width) / 2.0, 0.0),
                Point::new((width - den.width) / 2.0, den_top),
            ],
            leaves,
        }
    }

    fn layout_inline(&self, input: &LayoutInput<'_>) -> Arrangement {
        let (num, den) = (input.slots[0], input.slots[1]);
        let ascent = num.ref_y.max(den.ref_y);
        let height = ascent + num.descent().max(den.descent());

        let slash = GlyphLeaf::scaled_to_height(
            "/",
            input.ctx.sign_font(input.font_size),
            height,
            input.ctx.measurer,
            Point::new(num.width, 0.0),
        );
        let slash_width = slash.width();

        Arrangement {
            extent: BoxExtent::new(num.width + slash_width + den.width, height, ascent),
            slot_offsets: vec![
                Point::new(0.0, ascent - num.ref_y),
                Point::new(num.width + slash_width, ascent - den.ref_y),
            ],
            leaves: vec![Leaf::Glyph(slash)],
        }
    }
}
