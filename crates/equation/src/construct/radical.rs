//! Radicals - square root and n-th root

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::leaf::Leaf;
use crate::navigation::Key;
use std::collections::HashMap;

/// Sign width as a fraction of the font size
const SIGN_WIDTH_FACTOR: f32 = 0.6;
/// Height of the index's bottom edge above the sign's top, as a fraction of the sign height
const INDEX_DROP: f32 = 0.55;

named_enum!(
    RadicalType {
        SquareRoot => "SquareRoot",
        NRoot => "NRoot",
    }
);

impl RadicalType {
    pub const INSIDE: usize = 0;
    pub const INDEX: usize = 1;

    pub(super) fn params(&self) -> Params {
        vec![("type", self.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Self::parse(param(params, "type")?)
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        match self {
            RadicalType::SquareRoot => vec![SlotScale::Same],
            RadicalType::NRoot => vec![SlotScale::Same, SlotScale::Script],
        }
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        match (self, slot, key) {
            (RadicalType::NRoot, Self::INSIDE, Key::Left | Key::Up) => Some(Self::INDEX),
            (RadicalType::NRoot, Self::INDEX, Key::Right | Key::Down) => Some(Self::INSIDE),
            _ => None,
        }
    }

    pub(super) fn first_slot(&self) -> usize {
        match self {
            RadicalType::SquareRoot => Self::INSIDE,
            RadicalType::NRoot => Self::INDEX,
        }
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let inside = input.slots[Self::INSIDE];
        let m = &input.metrics;
        let rule = m.rule_thickness;
        let extra = m.radical_gap + rule;
        let sign_height = inside.height + extra;
        let sign_width = input.font_size * SIGN_WIDTH_FACTOR;

        let index = input.slots.get(Self::INDEX).copied();
        let index_width = index.map_or(0.0, |i| i.width);
        let shift = index.map_or(0.0, |i| (i.height - sign_height * INDEX_DROP).max(0.0));
        let inside_left = sign_width.max(index_width);
        let width = inside_left + inside.width + m.radical_gap / 2.0;

        let x0 = inside_left - sign_width;
        let top = shift + rule / 2.0;
        let sign = Leaf::polyline(
            &[
                Point::new(x0, shift + sign_height * 0.6),
                Point::new(x0 + sign_width * 0.2, shift + sign_height * 0.55),
                Point::new(x0 + sign_width * 0.45, shift + sign_height),
                Point::new(inside_left, top),
                Point::new(width, top),
            ],
            rule,
        );

        let mut slot_offsets = vec![Point::new(inside_left, shift + extra)];
        if let Some(index) = index {
            let x = (x0 + sign_width * 0.5 - index.width).max(0.0);
            let y = shift + sign_height * INDEX_DROP - index.height;
            slot_offsets.push(Point::new(x, y));
        }

        Arrangement {
            extent: BoxExtent::new(width, sign_height + shift, inside.ref_y + extra + shift),
            slot_offsets,
            leaves: vec![sign],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::laid_out;
    use super::super::ConstructKind;
    use super::*;

    #[test]
    fn test_square_root_adds_constant_height() {
        let construct = laid_out(ConstructKind::Radical(RadicalType::SquareRoot), &["x+1"]);
        let inside = *construct.slots()[0].geometry();
        let g = construct.geometry();
        let metrics = crate::geometry::MathFontMetrics::for_size(20.0);
        let extra = metrics.radical_gap + metrics.rule_thickness;
        assert!((g.height - (inside.height + extra)).abs() < 1e-3);
        assert!((g.ref_y - (inside.ref_y + extra)).abs() < 1e-3);
    }

    #[test]
    fn test_wide_index_pushes_inside_right() {
        let narrow = laid_out(ConstructKind::Radical(RadicalType::NRoot), &["x", "3"]);
        let wide = laid_out(ConstructKind::Radical(RadicalType::NRoot), &["x", "12345"]);
        assert!(wide.slots()[0].geometry().left > narrow.slots()[0].geometry().left);
    }

    #[test]
    fn test_navigation_table() {
        let nroot = RadicalType::NRoot;
        assert_eq!(nroot.navigate(0, Key::Left), Some(1));
        assert_eq!(nroot.navigate(0, Key::Up), Some(1));
        assert_eq!(nroot.navigate(1, Key::Right), Some(0));
        assert_eq!(nroot.navigate(1, Key::Down), Some(0));
        assert_eq!(nroot.navigate(1, Key::Left), None);
        assert_eq!(RadicalType::SquareRoot.navigate(0, Key::Left), None);
        assert_eq!(nroot.first_slot(), 1);
    }
}
