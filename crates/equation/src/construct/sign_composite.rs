//! Big operators - a large sign with optional limits, followed by a main row
//!
//! Stacked signs (sum, product, ...) put their limits above and below the
//! sign; integrals put them to the right of the sign.

use super::{param, settle, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::leaf::{GlyphLeaf, Leaf};
use crate::navigation::Key;
use std::collections::HashMap;

const STACKED_SIGN_FACTOR: f32 = 1.4;
const INTEGRAL_SIGN_FACTOR: f32 = 1.8;

named_enum!(
    SignKind {
        Sum => "Sum",
        Product => "Product",
        Coproduct => "Coproduct",
        Intersection => "Intersection",
        Union => "Union",
        Integral => "Integral",
        DoubleIntegral => "DoubleIntegral",
        TripleIntegral => "TripleIntegral",
        ContourIntegral => "ContourIntegral",
        SurfaceIntegral => "SurfaceIntegral",
        VolumeIntegral => "VolumeIntegral",
    }
);

/// Where a sign's limits go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignCategory {
    /// Above and below the sign
    Stacked,
    /// To the right of the sign
    Side,
}

impl SignKind {
    pub fn symbol(&self) -> char {
        match self {
            SignKind::Sum => '\u{2211}',
            SignKind::Product => '\u{220F}',
            SignKind::Coproduct => '\u{2210}',
            SignKind::Intersection => '\u{22C2}',
            SignKind::Union => '\u{22C3}',
            SignKind::Integral => '\u{222B}',
            SignKind::DoubleIntegral => '\u{222C}',
            SignKind::TripleIntegral => '\u{222D}',
            SignKind::ContourIntegral => '\u{222E}',
            SignKind::SurfaceIntegral => '\u{222F}',
            SignKind::VolumeIntegral => '\u{2230}',
        }
    }

    pub fn category(&self) -> SignCategory {
        match self {
            SignKind::Sum
            | SignKind::Product
            | SignKind::Coproduct
            | SignKind::Intersection
            | SignKind::Union => SignCategory::Stacked,
            _ => SignCategory::Side,
        }
    }
}

named_enum!(
    LimitPlacement {
        None => "None",
        Lower => "Lower",
        LowerUpper => "LowerUpper",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignCompositeType {
    pub sign: SignKind,
    pub limits: LimitPlacement,
}

impl SignCompositeType {
    pub const MAIN: usize = 0;
    pub const LOWER: usize = 1;
    pub const UPPER: usize = 2;

    pub fn new(sign: SignKind, limits: LimitPlacement) -> Self {
        Self { sign, limits }
    }

    fn has_lower(&self) -> bool {
        self.limits != LimitPlacement::None
    }

    fn has_upper(&self) -> bool {
        self.limits == LimitPlacement::LowerUpper
    }

    pub(super) fn params(&self) -> Params {
        vec![("sign", self.sign.to_string()), ("limits", self.limits.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        Ok(Self::new(
            SignKind::parse(param(params, "sign")?)?,
            LimitPlacement::parse(param(params, "limits")?)?,
        ))
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        let limits = match self.limits {
            LimitPlacement::None => 0,
            LimitPlacement::Lower => 1,
            LimitPlacement::LowerUpper => 2,
        };
        std::iter::once(SlotScale::Same)
            .chain(std::iter::repeat(SlotScale::Script).take(limits))
            .collect()
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        match (slot, key) {
            (Self::LOWER | Self::UPPER, Key::Right) => Some(Self::MAIN),
            (Self::MAIN, Key::Left) if self.has_upper() => Some(Self::UPPER),
            (Self::MAIN, Key::Left) if self.has_lower() => Some(Self::LOWER),
            (Self::LOWER, Key::Up) if self.has_upper() => Some(Self::UPPER),
            (Self::UPPER, Key::Down) => Some(Self::LOWER),
            _ => None,
        }
    }

    pub(super) fn first_slot(&self) -> usize {
        if self.has_lower() {
            Self::LOWER
        } else {
            Self::MAIN
        }
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let m = &input.metrics;
        let main = input.slots[Self::MAIN];
        let lower = input.slots.get(Self::LOWER).copied();
        let upper = input.slots.get(Self::UPPER).copied();
        let gap = m.script_gap;

        let factor = match self.sign.category() {
            SignCategory::Stacked => STACKED_SIGN_FACTOR,
            SignCategory::Side => INTEGRAL_SIGN_FACTOR,
        };
        let font = input.ctx.sign_font(input.font_size * factor);
        let symbol = self.sign.symbol().to_string();
        let sign_glyph = GlyphLeaf::measured(symbol, font, input.ctx.measurer, Point::origin());

        // Baseline at y = 0; the sign is centered on the math axis
        let sign_top = -m.axis_height - sign_glyph.height() / 2.0;
        let sign_bottom = sign_top + sign_glyph.height();
        let mut slot_offsets = vec![Point::origin(); input.slots.len()];

        let (column, sign) = match self.sign.category() {
            SignCategory::Stacked => {
                let limit_width = |s: Option<BoxExtent>| s.map(|e| e.width);
                let column = [Some(sign_glyph.width()), limit_width(lower), limit_width(upper)]
                    .iter()
                    .flatten()
                    .fold(0.0, |a: f32, b| a.max(*b));
                let center = |w: f32| (column - w) / 2.0;
                if let Some(l) = lower {
                    slot_offsets[Self::LOWER] = Point::new(center(l.width), sign_bottom + gap);
                }
                if let Some(u) = upper {
                    let top = sign_top - gap - u.height;
                    slot_offsets[Self::UPPER] = Point::new(center(u.width), top);
                }
                let left = center(sign_glyph.width());
                let sign = Leaf::Glyph(sign_glyph.clone()).translated(left, sign_top);
                (column, sign)
            }
            SignCategory::Side => {
                let limit_left = sign_glyph.width() * 0.8;
                if let Some(l) = lower {
                    let top = sign_bottom - l.height * 0.6;
                    slot_offsets[Self::LOWER] = Point::new(limit_left, top);
                }
                if let Some(u) = upper {
                    let top = sign_top - u.height * 0.4;
                    slot_offsets[Self::UPPER] = Point::new(limit_left + gap * 2.0, top);
                }
                let limits = lower
                    .map_or(0.0, |l| l.width)
                    .max(upper.map_or(0.0, |u| u.width + gap * 2.0));
                let right = sign_glyph.width().max(limit_left + limits);
                (right, Leaf::Glyph(sign_glyph.clone()).translated(0.0, sign_top))
            }
        };

        let main_left = column + gap * 2.0;
        slot_offsets[Self::MAIN] = Point::new(main_left, -main.ref_y);

        let mut arrangement = Arrangement {
            extent: BoxExtent::default(),
            slot_offsets,
            leaves: vec![sign],
        };
        let (height, ref_y) =
            settle(&mut arrangement, input.slots, &[sign_top], &[sign_bottom], 0.0);
        arrangement.extent = BoxExtent::new(main_left + main.width, height, ref_y);
        arrangement
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::laid_out;
    use super::super::ConstructKind;
    use super::*;

    #[test]
    fn test_stacked_limits_above_and_below() {
        let kind = SignCompositeType::new(SignKind::Sum, LimitPlacement::LowerUpper);
        let construct = laid_out(ConstructKind::SignComposite(kind), &["i", "k=1", "n"]);
        let main = construct.slots()[0].geometry();
        let lower = construct.slots()[1].geometry();
        let upper = construct.slots()[2].geometry();
        assert!(upper.bottom() < lower.top);
        assert!(lower.right() <= main.left);
        assert!((construct.geometry().baseline() - main.baseline()).abs() < 1e-3);
    }

    #[test]
    fn test_integral_limits_to_the_side() {
        let kind = SignCompositeType::new(SignKind::Integral, LimitPlacement::LowerUpper);
        let construct = laid_out(ConstructKind::SignComposite(kind), &["f", "0", "1"]);
        let leaves = construct.leaves();
        let sign_left = match &leaves[0] {
            Leaf::Glyph(glyph) => glyph.origin.x,
            _ => panic!("expected sign glyph"),
        };
        let lower = construct.slots()[1].geometry();
        assert!(lower.left > sign_left);
        assert_eq!(SignKind::Integral.category(), SignCategory::Side);
        assert_eq!(SignKind::Union.category(), SignCategory::Stacked);
    }

    #[test]
    fn test_navigation_table() {
        let both = SignCompositeType::new(SignKind::Sum, LimitPlacement::LowerUpper);
        assert_eq!(both.navigate(0, Key::Left), Some(2));
        assert_eq!(both.navigate(1, Key::Right), Some(0));
        assert_eq!(both.navigate(2, Key::Right), Some(0));
        assert_eq!(both.navigate(1, Key::Up), Some(2));
        assert_eq!(both.navigate(2, Key::Down), Some(1));
        assert_eq!(both.first_slot(), 1);

        let lower = SignCompositeType::new(SignKind::Sum, LimitPlacement::Lower);
        assert_eq!(lower.navigate(0, Key::Left), Some(1));
        assert_eq!(lower.navigate(1, Key::Up), None);

        let bare = SignCompositeType::new(SignKind::Sum, LimitPlacement::None);
        assert_eq!(bare.navigate(0, Key::Left), None);
        assert_eq!(bare.first_slot(), 0);
    }
}
