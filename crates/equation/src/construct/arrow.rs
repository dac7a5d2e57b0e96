//! Arrows - a horizontal arrow with labels above and/or below it

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::leaf::{GlyphLeaf, Leaf};
use crate::navigation::Key;
use std::collections::HashMap;
use text_engine::{FontRequest, TextMeasurer};

/// Below this width (in ems) an arrow is a single glyph
const GLYPH_WIDTH_LIMIT: f32 = 1.2;
/// Shortest arrow, in ems
const MIN_WIDTH: f32 = 1.5;
/// Room left on both ends of the labels, in ems
const LABEL_PADDING: f32 = 0.3;
/// Height of the arrow band, in ems
const BAND_HEIGHT: f32 = 0.5;

named_enum!(
    ArrowKind {
        Right => "Right",
        Left => "Left",
        DoubleHeaded => "DoubleHeaded",
        RightDouble => "RightDouble",
        LeftDouble => "LeftDouble",
    }
);

impl ArrowKind {
    pub fn glyph(&self) -> char {
        match self {
            ArrowKind::Right => '\u{2192}',
            ArrowKind::Left => '\u{2190}',
            ArrowKind::DoubleHeaded => '\u{2194}',
            ArrowKind::RightDouble => '\u{21D2}',
            ArrowKind::LeftDouble => '\u{21D0}',
        }
    }
}

/// Leaves of an arrow `width` long whose shaft is at `center_y`, starting at x = 0
pub(crate) fn arrow_leaves(
    kind: ArrowKind,
    width: f32,
    center_y: f32,
    rule: f32,
    font: FontRequest,
    measurer: &dyn TextMeasurer,
) -> Vec<Leaf> {
    let em = font.font_size;
    if width < em * GLYPH_WIDTH_LIMIT {
        let glyph = GlyphLeaf::measured(kind.glyph().to_string(), font, measurer, Point::origin());
        let dx = (width - glyph.width()) / 2.0;
        let dy = center_y - glyph.baseline + em * crate::geometry::AXIS_FACTOR;
        return vec![Leaf::Glyph(glyph).translated(dx, dy)];
    }

    let head = em * 0.25;
    let spread = head * 0.6;
    let right_head = |spread: f32| {
        Leaf::polyline(
            &[
                Point::new(width - head, center_y - spread),
                Point::new(width, center_y),
                Point::new(width - head, center_y + spread),
            ],
            rule,
        )
    };
    let left_head = |spread: f32| {
        Leaf::polyline(
            &[
                Point::new(head, center_y - spread),
                Point::new(0.0, center_y),
                Point::new(head, center_y + spread),
            ],
            rule,
        )
    };

    match kind {
        ArrowKind::Right => vec![
            Leaf::line(0.0, center_y, width, center_y, rule),
            right_head(spread),
        ],
        ArrowKind::Left => vec![
            Leaf::line(0.0, center_y, width, center_y, rule),
            left_head(spread),
        ],
        ArrowKind::DoubleHeaded => vec![
            Leaf::line(0.0, center_y, width, center_y, rule),
            left_head(spread),
            right_head(spread),
        ],
        ArrowKind::RightDouble | ArrowKind::LeftDouble => {
            let offset = rule * 1.5;
            let (start, end) = match kind {
                ArrowKind::RightDouble => (0.0, width - rule),
                _ => (rule, width),
            };
            let mut leaves = vec![
                Leaf::line(start, center_y - offset, end, center_y - offset, rule),
                Leaf::line(start, center_y + offset, end, center_y + offset, rule),
            ];
            leaves.push(match kind {
                ArrowKind::RightDouble => right_head(spread * 1.5),
                _ => left_head(spread * 1.5),
            });
            leaves
        }
    }
}

named_enum!(
    ArrowPosition {
        Top => "Top",
        Bottom => "Bottom",
        BottomAndTop => "BottomAndTop",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowType {
    pub arrow: ArrowKind,
    pub position: ArrowPosition,
}

impl ArrowType {
    pub fn new(arrow: ArrowKind, position: ArrowPosition) -> Self {
        Self { arrow, position }
    }

    /// Slot index of the label above the arrow
    pub fn top_slot(&self) -> Option<usize> {
        match self.position {
            ArrowPosition::Top | ArrowPosition::BottomAndTop => Some(0),
            ArrowPosition::Bottom => None,
        }
    }

    /// Slot index of the label below the arrow
    pub fn bottom_slot(&self) -> Option<usize> {
        match self.position {
            ArrowPosition::Bottom => Some(0),
            ArrowPosition::BottomAndTop => Some(1),
            ArrowPosition::Top => None,
        }
    }

    pub(super) fn params(&self) -> Params {
        vec![("arrow", self.arrow.to_string()), ("position", self.position.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Ok(Self::new(
            ArrowKind::parse(param(params, "arrow")?)?,
            ArrowPosition::parse(param(params, "position")?)?,
        ))
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        match self.position {
            ArrowPosition::BottomAndTop => vec![SlotScale::Script, SlotScale::Script],
            _ => vec![SlotScale::Script],
        }
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        match (self.position, slot, key) {
            (ArrowPosition::BottomAndTop, 0, Key::Down) => Some(1),
            (ArrowPosition::BottomAndTop, 1, Key::Up) => Some(0),
            _ => None,
        }
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let m = &input.metrics;
        let em = input.font_size;
        let gap = m.script_gap;
        let top = self.top_slot().map(|i| input.slots[i]);
        let bottom = self.bottom_slot().map(|i| input.slots[i]);

        let labels = [top, bottom].iter().flatten().map(|s| s.width).fold(0.0, f32::max);
        let width = (labels + 2.0 * LABEL_PADDING * em).max(MIN_WIDTH * em);
        let center = |w: f32| (width - w) / 2.0;

        let band_top = top.map_or(0.0, |t| t.height + gap);
        let band = BAND_HEIGHT * em;
        let center_y = band_top + band / 2.0;
        let bottom_top = band_top + band + gap;
        let height = bottom.map_or(band_top + band, |b| bottom_top + b.height);

        let mut slot_offsets = vec![Point::origin(); input.slots.len()];
        if let (Some(index), Some(t)) = (self.top_slot(), top) {
            slot_offsets[index] = Point::new(center(t.width), 0.0);
        }
        if let (Some(index), Some(b)) = (self.bottom_slot(), bottom) {
            slot_offsets[index] = Point::new(center(b.width), bottom_top);
        }

        Arrangement {
            extent: BoxExtent::new(width, height, center_y + m.axis_height),
            slot_offsets,
            leaves: arrow_leaves(
                self.arrow,
                width,
                center_y,
                m.rule_thickness,
                input.ctx.sign_font(em),
                input.ctx.measurer,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::laid_out;
    use super::super::ConstructKind;
    use super::*;
    use text_engine::{ApproxMeasurer, FontType};

    #[test]
    fn test_labels_on_both_sides() {
        let kind = ArrowType::new(ArrowKind::Right, ArrowPosition::BottomAndTop);
        let construct = laid_out(ConstructKind::Arrow(kind), &["f", "g"]);
        let top = construct.slots()[0].geometry();
        let bottom = construct.slots()[1].geometry();
        let baseline = construct.geometry().baseline();
        assert!(top.bottom() < baseline);
        assert!(bottom.top > baseline - 10.0);
        assert!(bottom.top > top.bottom());
    }

    #[test]
    fn test_short_arrow_is_glyph() {
        let measurer = ApproxMeasurer::new();
        let font = FontRequest::new(FontType::StixGeneral, 20.0);
        let leaves = arrow_leaves(ArrowKind::Right, 10.0, 5.0, 1.2, font, &measurer);
        assert!(matches!(leaves.as_slice(), [Leaf::Glyph(_)]));
    }

    #[test]
    fn test_long_arrows_are_drawn() {
        let measurer = ApproxMeasurer::new();
        let font = FontRequest::new(FontType::StixGeneral, 20.0);
        assert_eq!(arrow_leaves(ArrowKind::Right, 80.0, 5.0, 1.2, font, &measurer).len(), 2);
        assert_eq!(arrow_leaves(ArrowKind::DoubleHeaded, 80.0, 5.0, 1.2, font, &measurer).len(), 3);
        assert_eq!(arrow_leaves(ArrowKind::LeftDouble, 80.0, 5.0, 1.2, font, &measurer).len(), 3);
    }

    #[test]
    fn test_navigation_table() {
        let both = ArrowType::new(ArrowKind::Left, ArrowPosition::BottomAndTop);
        assert_eq!(both.navigate(0, Key::Down), Some(1));
        assert_eq!(both.navigate(1, Key::Up), Some(0));
        let top = ArrowType::new(ArrowKind::Left, ArrowPosition::Top);
        assert_eq!(top.navigate(0, Key::Down), None);
    }
}
