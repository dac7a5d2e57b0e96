//! Box - a frame, or two sides of one, around a row

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::leaf::Leaf;
use std::collections::HashMap;

named_enum!(
    BoxType {
        All => "All",
        LeftTop => "LeftTop",
        RightTop => "RightTop",
        LeftBottom => "LeftBottom",
        RightBottom => "RightBottom",
    }
);

impl BoxType {
    pub(super) fn params(&self) -> Params {
        vec![("type", self.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Self::parse(param(params, "type")?)
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        vec![SlotScale::Same]
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let inside = input.slots[0];
        let m = &input.metrics;
        let pad = m.box_padding;
        let rule = m.rule_thickness;
        let width = inside.width + 2.0 * pad;
        let height = inside.height + 2.0 * pad;

        let (l, t) = (rule / 2.0, rule / 2.0);
        let (r, b) = (width - rule / 2.0, height - rule / 2.0);
        let corners = |points: &[(f32, f32)]| {
            let points: Vec<Point> = points.iter().map(|(x, y)| Point::new(*x, *y)).collect();
            Leaf::polyline(&points, rule)
        };
        let frame = match self {
            BoxType::All => corners(&[(l, t), (r, t), (r, b), (l, b), (l, t)]),
            BoxType::LeftTop => corners(&[(l, b), (l, t), (r, t)]),
            BoxType::RightTop => corners(&[(l, t), (r, t), (r, b)]),
            BoxType::LeftBottom => corners(&[(l, t), (l, b), (r, b)]),
            BoxType::RightBottom => corners(&[(r, t), (r, b), (l, b)]),
        };

        Arrangement {
            extent: BoxExtent::new(width, height, inside.ref_y + pad),
            slot_offsets: vec![Point::new(pad, pad)],
            leaves: vec![frame],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::laid_out;
    use super::super::ConstructKind;
    use super::*;
    use crate::leaf::PathCommand;

    #[test]
    fn test_padding_on_every_side() {
        let construct = laid_out(ConstructKind::Box(BoxType::All), &["x"]);
        let g = construct.geometry();
        let inside = construct.slots()[0].geometry();
        let pad = crate::geometry::MathFontMetrics::for_size(20.0).box_padding;
        assert!((inside.left - g.left - pad).abs() < 1e-3);
        assert!((g.bottom() - inside.bottom() - pad).abs() < 1e-3);
        assert!((g.baseline() - inside.baseline()).abs() < 1e-3);
    }

    #[test]
    fn test_partial_frames_have_two_sides() {
        for kind in [
            BoxType::LeftTop,
            BoxType::RightTop,
            BoxType::LeftBottom,
            BoxType::RightBottom,
        ] {
            let construct = laid_out(ConstructKind::Box(kind), &["x"]);
            match &construct.leaves()[0] {
                Leaf::Path { commands, .. } => {
                    assert_eq!(commands.len(), 3);
                    assert!(matches!(commands[0], PathCommand::MoveTo(..)));
                }
                other => panic!("unexpected leaf {:?}", other),
            }
        }
    }
}
