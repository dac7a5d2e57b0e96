//! Brackets - an inside row between optional left and right signs
//!
//! Short signs are a single glyph scaled to the sign height. Once the height
//! passes the stretch threshold, signs with piece glyphs are assembled from
//! caps and a tiled extension; the rest switch to drawn line art.

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::EquationResult;
use crate::geometry::{BoxExtent, Point};
use crate::leaf::{GlyphLeaf, Leaf, VerticalPieces};
use std::collections::HashMap;
use text_engine::{FontRequest, TextMeasurer};

named_enum!(
    BracketSign {
        Round => "Round",
        Square => "Square",
        Curly => "Curly",
        Angle => "Angle",
        Bar => "Bar",
        DoubleBar => "DoubleBar",
        Ceiling => "Ceiling",
        Floor => "Floor",
    }
);

/// Which side of the inside a sign is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl BracketSign {
    pub fn glyph(&self, side: Side) -> char {
        let (left, right) = match self {
            BracketSign::Round => ('(', ')'),
            BracketSign::Square => ('[', ']'),
            BracketSign::Curly => ('{', '}'),
            BracketSign::Angle => ('\u{27E8}', '\u{27E9}'),
            BracketSign::Bar => ('|', '|'),
            BracketSign::DoubleBar => ('\u{2016}', '\u{2016}'),
            BracketSign::Ceiling => ('\u{2308}', '\u{2309}'),
            BracketSign::Floor => ('\u{230A}', '\u{230B}'),
        };
        match side {
            Side::Left => left,
            Side::Right => right,
        }
    }

    /// Pieces for the assembled form, for signs that have them
    pub fn pieces(&self, side: Side) -> Option<VerticalPieces> {
        let pieces = |top, extension, bottom| VerticalPieces {
            top,
            middle: None,
            bottom,
            extension,
        };
        let left = side == Side::Left;
        Some(match self {
            BracketSign::Round if left => pieces(Some('\u{239B}'), '\u{239C}', Some('\u{239D}')),
            BracketSign::Round => pieces(Some('\u{239E}'), '\u{239F}', Some('\u{23A0}')),
            BracketSign::Square if left => pieces(Some('\u{23A1}'), '\u{23A2}', Some('\u{23A3}')),
            BracketSign::Square => pieces(Some('\u{23A4}'), '\u{23A5}', Some('\u{23A6}')),
            BracketSign::Curly => VerticalPieces {
                top: Some(if left { '\u{23A7}' } else { '\u{23AB}' }),
                middle: Some(if left { '\u{23A8}' } else { '\u{23AC}' }),
                bottom: Some(if left { '\u{23A9}' } else { '\u{23AD}' }),
                extension: '\u{23AA}',
            },
            BracketSign::Ceiling if left => pieces(Some('\u{23A1}'), '\u{23A2}', None),
            BracketSign::Ceiling => pieces(Some('\u{23A4}'), '\u{23A5}', None),
            BracketSign::Floor if left => pieces(None, '\u{23A2}', Some('\u{23A3}')),
            BracketSign::Floor => pieces(None, '\u{23A5}', Some('\u{23A6}')),
            BracketSign::Angle | BracketSign::Bar | BracketSign::DoubleBar => return None,
        })
    }
}

/// Leaves of one sign `height` tall, starting at x = 0. Returns the sign width too.
pub(crate) fn sign_leaves(
    sign: BracketSign,
    side: Side,
    height: f32,
    threshold: f32,
    rule: f32,
    font: FontRequest,
    measurer: &dyn TextMeasurer,
) -> (f32, Vec<Leaf>) {
    if let Some(pieces) = sign.pieces(side) {
        if height > threshold.max(pieces.fixed_height(&font, measurer)) {
            return pieces.assemble(height, font, measurer);
        }
    } else if height > threshold {
        return line_art(sign, side, height, font.font_size, rule);
    }
    let text = sign.glyph(side).to_string();
    let glyph = GlyphLeaf::scaled_to_height(text, font, height, measurer, Point::origin());
    (glyph.width(), vec![Leaf::Glyph(glyph)])
}

fn line_art(
    sign: BracketSign,
    side: Side,
    height: f32,
    font_size: f32,
    rule: f32,
) -> (f32, Vec<Leaf>) {
    match sign {
        BracketSign::Angle => {
            let width = font_size * 0.35;
            let (tip, open) = match side {
                Side::Left => (rule, width - rule),
                Side::Right => (width - rule, rule),
            };
            let points = [
                Point::new(open, 0.0),
                Point::new(tip, height / 2.0),
                Point::new(open, height),
            ];
            (width, vec![Leaf::polyline(&points, rule)])
        }
        BracketSign::DoubleBar => {
            let width = font_size * 0.4;
            let leaves = [0.3, 0.7]
                .iter()
                .map(|f| Leaf::line(width * f, 0.0, width * f, height, rule))
                .collect();
            (width, leaves)
        }
        _ => {
            let width = font_size * 0.3;
            (width, vec![Leaf::line(width / 2.0, 0.0, width / 2.0, height, rule)])
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketType {
    pub left: Option<BracketSign>,
    pub right: Option<BracketSign>,
}

impl BracketType {
    pub const INSIDE: usize = 0;

    pub fn new(left: Option<BracketSign>, right: Option<BracketSign>) -> Self {
        assert!(left.is_some() || right.is_some(), "a bracket needs at least one sign");
        Self { left, right }
    }

    /// Same sign on both sides
    pub fn both(sign: BracketSign) -> Self {
        Self::new(Some(sign), Some(sign))
    }

    pub(super) fn params(&self) -> Params {
        let name = |sign: Option<BracketSign>| sign.map_or("None", |s| s.as_str()).to_string();
        vec![("left", name(self.left)), ("right", name(self.right))]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        let sign = |key| -> EquationResult<Option<BracketSign>> {
            match param(params, key)? {
                "None" => Ok(None),
                value => BracketSign::parse(value).map(Some),
            }
        };
        let (left, right) = (sign("left")?, sign("right")?);
        if left.is_none() && right.is_none() {
            return Err(crate::error::EquationError::Deserialize(
                "bracket without any sign".to_string(),
            ));
        }
        Ok(Self { left, right })
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        vec![SlotScale::Same]
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let inside = input.slots[Self::INSIDE];
        let m = &input.metrics;
        let height = inside.height + m.bracket_padding;
        let font = input.ctx.sign_font(input.font_size);

        let build = |sign: Option<BracketSign>, side| match sign {
            Some(sign) => sign_leaves(
                sign,
                side,
                height,
                m.stretch_threshold,
                m.rule_thickness,
                font,
                input.ctx.measurer,
            ),
            None => (0.0, Vec::new()),
        };
        let (left_width, left_leaves) = build(self.left, Side::Left);
        let (right_width, right_leaves) = build(self.right, Side::Right);

        let right_x = left_width + inside.width;
        let mut leaves = left_leaves;
        leaves.extend(right_leaves.iter().map(|leaf| leaf.translated(right_x, 0.0)));

        Arrangement {
            extent: BoxExtent::new(
                right_x + right_width,
                height,
                inside.ref_y + m.bracket_padding / 2.0,
            ),
            slot_offsets: vec![Point::new(left_width, m.bracket_padding / 2.0)],
            leaves,
        }
    }
}
