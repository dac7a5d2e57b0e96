//! Scripts - sub/superscripts attached to the item before them
//!
//! A script sizes itself against its buddy, the box of the preceding item in
//! the row, so that its own baseline lines up with the buddy's.

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::navigation::Key;
use std::collections::HashMap;

named_enum!(
    ScriptType {
        Sub => "Sub",
        Super => "Super",
        SubSuper => "SubSuper",
    }
);

impl ScriptType {
    /// In `SubSuper`, slot 0 is the subscript and slot 1 the superscript
    pub const SUB: usize = 0;
    pub const SUPER: usize = 1;

    pub(super) fn params(&self) -> Params {
        vec![("type", self.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Self::parse(param(params, "type")?)
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        match self {
            ScriptType::SubSuper => vec![SlotScale::Script, SlotScale::Script],
            _ => vec![SlotScale::Script],
        }
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        match (self, slot, key) {
            (ScriptType::SubSuper, Self::SUB, Key::Up) => Some(Self::SUPER),
            (ScriptType::SubSuper, Self::SUPER, Key::Down) => Some(Self::SUB),
            _ => None,
        }
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let m = &input.metrics;
        let buddy = if input.buddy.height > 0.0 {
            input.buddy
        } else {
            BoxExtent::new(0.0, input.font_size, input.font_size * 0.8)
        };
        let gap = m.script_gap;

        match self {
            ScriptType::Super => {
                let sup = input.slots[0];
                let rise = (sup.height - m.super_overlap).max(0.0);
                Arrangement {
                    extent: BoxExtent::new(
                        sup.width + gap,
                        (rise + buddy.height).max(sup.height),
                        rise + buddy.ref_y,
                    ),
                    slot_offsets: vec![Point::new(0.0, 0.0)],
                    leaves: Vec::new(),
                }
            }
            ScriptType::Sub => {
                let sub = input.slots[0];
                let sub_top = (buddy.height - m.sub_overlap).max(0.0);
                Arrangement {
                    extent: BoxExtent::new(
                        sub.width + gap,
                        buddy.height.max(sub_top + sub.height),
                        buddy.ref_y,
                    ),
                    slot_offsets: vec![Point::new(0.0, sub_top)],
                    leaves: Vec::new(),
                }
            }
            ScriptType::SubSuper => {
                let sub = input.slots[Self::SUB];
                let sup = input.slots[Self::SUPER];
                let rise = (sup.height - m.super_overlap).max(0.0);
                let sub_top = rise + (buddy.height - m.sub_overlap).max(0.0);
                let height = (rise + buddy.height).max(sub_top + sub.height).max(sup.height);
                Arrangement {
                    extent: BoxExtent::new(
                        sub.width.max(sup.width) + gap,
                        height,
                        rise + buddy.ref_y,
                    ),
                    slot_offsets: vec![Point::new(0.0, sub_top), Point::new(0.0, 0.0)],
                    leaves: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::laid_out_with_buddy;
    use super::super::ConstructKind;
    use super::*;

    fn buddy() -> BoxExtent {
        BoxExtent::new(10.0, 20.0, 16.0)
    }

    #[test]
    fn test_super_raises_above_buddy() {
        let kind = ConstructKind::Script(ScriptType::Super);
        let construct = laid_out_with_buddy(kind, &["2"], buddy());
        let g = construct.geometry();
        let sup = construct.slots()[0].geometry();
        let metrics = crate::geometry::MathFontMetrics::for_size(20.0);
        assert!((g.ref_y - (sup.height - metrics.super_overlap + 16.0)).abs() < 1e-3);
        assert!(sup.baseline() < g.baseline());
    }

    #[test]
    fn test_sub_keeps_buddy_baseline() {
        let kind = ConstructKind::Script(ScriptType::Sub);
        let construct = laid_out_with_buddy(kind, &["i"], buddy());
        let g = construct.geometry();
        let sub = construct.slots()[0].geometry();
        assert!((g.ref_y - 16.0).abs() < 1e-3);
        assert!(sub.baseline() > g.baseline());
    }

    #[test]
    fn test_sub_super_stack() {
        let kind = ConstructKind::Script(ScriptType::SubSuper);
        let construct = laid_out_with_buddy(kind, &["i", "2"], buddy());
        let sub = construct.slots()[0].geometry();
        let sup = construct.slots()[1].geometry();
        assert!(sup.top < sub.top);
    }

    #[test]
    fn test_navigation_table() {
        assert_eq!(ScriptType::SubSuper.navigate(0, Key::Up), Some(1));
        assert_eq!(ScriptType::SubSuper.navigate(1, Key::Down), Some(0));
        assert_eq!(ScriptType::SubSuper.navigate(0, Key::Down), None);
        assert_eq!(ScriptType::Super.navigate(0, Key::Down), None);
    }
}
