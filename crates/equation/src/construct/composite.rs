//! Composites - a main row with rows stacked below and/or above it

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::navigation::Key;
use std::collections::HashMap;

/// Share of the sub overlap by which a plain composite's rows tuck into the main row
const STACK_OVERLAP: f32 = 0.25;

named_enum!(
    CompositePosition {
        Bottom => "Bottom",
        Top => "Top",
        BottomTop => "BottomTop",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeType {
    pub position: CompositePosition,
    /// Enlarged main row with separated limits
    pub big: bool,
}

impl CompositeType {
    pub const MAIN: usize = 0;

    pub fn new(position: CompositePosition, big: bool) -> Self {
        Self { position, big }
    }

    /// Slot index of the row below the main row
    pub fn bottom_slot(&self) -> Option<usize> {
        match self.position {
            CompositePosition::Bottom | CompositePosition::BottomTop => Some(1),
            CompositePosition::Top => None,
        }
    }

    /// Slot index of the row above the main row
    pub fn top_slot(&self) -> Option<usize> {
        match self.position {
            CompositePosition::Top => Some(1),
            CompositePosition::BottomTop => Some(2),
            CompositePosition::Bottom => None,
        }
    }

    pub(super) fn params(&self) -> Params {
        vec![("position", self.position.to_string()), ("big", self.big.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Ok(Self::new(
            CompositePosition::parse(param(params, "position")?)?,
            param(params, "big")? == "true",
        ))
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        let main = if self.big { SlotScale::Big } else { SlotScale::Same };
        let aux = match self.position {
            CompositePosition::BottomTop => 2,
            _ => 1,
        };
        std::iter::once(main)
            .chain(std::iter::repeat(SlotScale::Script).take(aux))
            .collect()
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        match (key, slot) {
            (Key::Down, Self::MAIN) => self.bottom_slot(),
            (Key::Up, Self::MAIN) => self.top_slot(),
            (Key::Up, s) if Some(s) == self.bottom_slot() => Some(Self::MAIN),
            (Key::Down, s) if Some(s) == self.top_slot() => Some(Self::MAIN),
            _ => None,
        }
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let main = input.slots[Self::MAIN];
        let m = &input.metrics;
        let join = if self.big {
            m.script_gap
        } else {
            -STACK_OVERLAP * m.sub_overlap
        };

        let top = self.top_slot().map(|i| input.slots[i]);
        let bottom = self.bottom_slot().map(|i| input.slots[i]);
        let width = [Some(main), top, bottom]
            .iter()
            .flatten()
            .map(|s| s.width)
            .fold(0.0, f32::max);
        let center = |w: f32| (width - w) / 2.0;

        let main_top = top.map_or(0.0, |t| (t.height + join).max(0.0));
        let bottom_top = main_top + main.height + join;
        let height = match bottom {
            Some(b) => (bottom_top + b.height).max(main_top + main.height),
            None => main_top + main.height,
        };

        let mut slot_offsets = vec![Point::new(center(main.width), main_top); input.slots.len()];
        if let (Some(index), Some(b)) = (self.bottom_slot(), bottom) {
            slot_offsets[index] = Point::new(center(b.width), bottom_top);
        }
        if let (Some(index), Some(t)) = (self.top_slot(), top) {
            slot_offsets[index] = Point::new(center(t.width), main_top - join - t.height);
        }

        Arrangement {
            extent: BoxExtent::new(width, height, main_top + main.ref_y),
            slot_offsets,
            leaves: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::laid_out;
    use super::super::ConstructKind;
    use super::*;

    #[test]
    fn test_bottom_top_order() {
        let kind = CompositeType::new(CompositePosition::BottomTop, false);
        let construct = laid_out(ConstructKind::Composite(kind), &["lim", "x", "y"]);
        let main = construct.slots()[0].geometry();
        let bottom = construct.slots()[1].geometry();
        let top = construct.slots()[2].geometry();
        assert!(top.top < main.top);
        assert!(bottom.top > main.top);
        assert!((construct.geometry().baseline() - main.baseline()).abs() < 1e-3);
    }

    #[test]
    fn test_big_separates_rows() {
        let kind = CompositeType::new(CompositePosition::Bottom, true);
        let construct = laid_out(ConstructKind::Composite(kind), &["M", "x"]);
        let main = construct.slots()[0].geometry();
        let bottom = construct.slots()[1].geometry();
        assert!(bottom.top >= main.bottom());
        assert!((construct.slots()[0].font_size() - 28.0).abs() < 1e-3);
    }

    #[test]
    fn test_navigation_table() {
        let both = CompositeType::new(CompositePosition::BottomTop, false);
        assert_eq!(both.navigate(0, Key::Down), Some(1));
        assert_eq!(both.navigate(0, Key::Up), Some(2));
        assert_eq!(both.navigate(1, Key::Up), Some(0));
        assert_eq!(both.navigate(2, Key::Down), Some(0));
        assert_eq!(both.navigate(1, Key::Down), None);

        let top = CompositeType::new(CompositePosition::Top, false);
        assert_eq!(top.navigate(0, Key::Down), None);
        assert_eq!(top.navigate(1, Key::Down), Some(0));
    }
}
