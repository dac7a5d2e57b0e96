//! Constructs - math notation shapes with named child slots
//!
//! A [`Construct`] owns a fixed list of slots (each a [`RowContainer`]) and
//! a [`ConstructKind`] naming its family and discriminating parameters.
//! The family modules are plain functions keyed on the kind:
//!
//! - `slot_scales`: how many slots, and the font scale of each
//! - `layout`: place the slots and produce the static leaves, given the slot sizes
//! - `navigate`: the slot reached from a slot by an arrow key, if any
//!
//! Layouts are pure functions of the slot sizes and the font size. They work
//! in coordinates relative to the construct's top-left corner; the construct
//! turns those into absolute positions when its `left`/`top` change.

use crate::container::RowContainer;
use crate::error::{EquationError, EquationResult};
use crate::format::{FormatId, FormatTable};
use crate::geometry::{script_font_size, BoxExtent, Geometry, MathFontMetrics, Point};
use crate::layout::LayoutContext;
use crate::leaf::Leaf;
use crate::navigation::{Entry, KeyEvent, Outcome};
use std::collections::{BTreeSet, HashMap};

/// A fieldless enum whose variants have stable names in saved documents
macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(value: &str) -> $crate::error::EquationResult<Self> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::error::EquationError::Deserialize(format!(
                        "unknown {} value: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod arrow;
mod boxed;
mod bracket;
mod composite;
mod decorated;
mod division;
mod horizontal_bracket;
mod matrix;
mod radical;
mod script;
mod sign_composite;

pub use arrow::{ArrowKind, ArrowPosition, ArrowType};
pub use boxed::BoxType;
pub use bracket::{BracketSign, BracketType, Side};
pub use composite::{CompositePosition, CompositeType};
pub use decorated::{Decoration, DecoratedType, DecorationPosition};
pub use division::{DivisionStyle, DivisionType};
pub use horizontal_bracket::{HorizontalBracketSign, HorizontalBracketType, HorizontalPosition};
pub use matrix::MatrixType;
pub use radical::RadicalType;
pub use script::ScriptType;
pub use sign_composite::{LimitPlacement, SignCategory, SignCompositeType, SignKind};

pub(crate) use arrow::arrow_leaves;

// =============================================================================
// Shared layout types
// =============================================================================

/// Font scale of a slot relative to its construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotScale {
    Same,
    /// Sub/superscript size, one sub level deeper
    Script,
    /// Enlarged main row of a big composite
    Big,
}

/// Scale of the main row of a big composite
pub const BIG_FACTOR: f32 = 1.4;

impl SlotScale {
    pub fn font_size(&self, font_size: f32, sub_level: u32) -> f32 {
        match self {
            SlotScale::Same => font_size,
            SlotScale::Script => script_font_size(font_size, sub_level),
            SlotScale::Big => font_size * BIG_FACTOR,
        }
    }

    pub fn sub_level(&self, sub_level: u32) -> u32 {
        match self {
            SlotScale::Script => sub_level + 1,
            SlotScale::Same | SlotScale::Big => sub_level,
        }
    }
}

/// What a family layout gets to work with
pub struct LayoutInput<'a> {
    pub ctx: LayoutContext<'a>,
    pub font_size: f32,
    pub metrics: MathFontMetrics,
    /// Sizes of the slots, in slot order
    pub slots: &'a [BoxExtent],
    /// Box of the item this construct attaches to (scripts only)
    pub buddy: BoxExtent,
}

/// Result of a family layout, relative to the construct's top-left corner
#[derive(Debug, Clone, Default)]
pub struct Arrangement {
    pub extent: BoxExtent,
    pub slot_offsets: Vec<Point>,
    pub leaves: Vec<Leaf>,
}

/// Move every slot and leaf so the topmost one starts at y = 0.
///
/// `tops` and `bottoms` are extra vertical bounds (signs, rules) that are not
/// slots. Returns the total height and the shifted baseline.
pub(crate) fn settle(
    arrangement: &mut Arrangement,
    slots: &[BoxExtent],
    tops: &[f32],
    bottoms: &[f32],
    ref_y: f32,
) -> (f32, f32) {
    let slot_tops = arrangement.slot_offsets.iter().map(|p| p.y);
    let min_top = slot_tops.chain(tops.iter().copied()).fold(f32::MAX, f32::min).min(0.0);

    let slot_bottoms = arrangement
        .slot_offsets
        .iter()
        .zip(slots)
        .map(|(p, s)| p.y + s.height);
    let max_bottom = slot_bottoms.chain(bottoms.iter().copied()).fold(0.0, f32::max);

    if min_top < 0.0 {
        let shift = -min_top;
        for offset in &mut arrangement.slot_offsets {
            offset.y += shift;
        }
        arrangement.leaves =
            arrangement.leaves.iter().map(|leaf| leaf.translated(0.0, shift)).collect();
    }
    (max_bottom - min_top, ref_y - min_top)
}

// =============================================================================
// Construct kinds
// =============================================================================

/// Family and parameters of a construct
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstructKind {
    Division(DivisionType),
    Radical(RadicalType),
    Bracket(BracketType),
    HorizontalBracket(HorizontalBracketType),
    Composite(CompositeType),
    SignComposite(SignCompositeType),
    Script(ScriptType),
    Matrix(MatrixType),
    Box(BoxType),
    Decorated(DecoratedType),
    Arrow(ArrowType),
}

/// Attribute name/value pairs of a construct's `parameters` element
pub type Params = Vec<(&'static str, String)>;

/// Look up a required parameter
pub(crate) fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> EquationResult<&'a str> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| EquationError::Deserialize(format!("missing parameter: {}", key)))
}

impl ConstructKind {
    /// Element name in saved documents
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstructKind::Division(_) => "Division",
            ConstructKind::Radical(_) => "Radical",
            ConstructKind::Bracket(_) => "Bracket",
            ConstructKind::HorizontalBracket(_) => "HorizontalBracket",
            ConstructKind::Composite(_) => "Composite",
            ConstructKind::SignComposite(_) => "SignComposite",
            ConstructKind::Script(_) => "Script",
            ConstructKind::Matrix(_) => "Matrix",
            ConstructKind::Box(_) => "Box",
            ConstructKind::Decorated(_) => "Decorated",
            ConstructKind::Arrow(_) => "Arrow",
        }
    }

    /// True for element names that [`ConstructKind::from_params`] accepts
    pub fn is_type_name(name: &str) -> bool {
        matches!(
            name,
            "Division"
                | "Radical"
                | "Bracket"
                | "HorizontalBracket"
                | "Composite"
                | "SignComposite"
                | "Script"
                | "Matrix"
                | "Box"
                | "Decorated"
                | "Arrow"
        )
    }

    pub fn params(&self) -> Params {
        match self {
            ConstructKind::Division(t) => t.params(),
            ConstructKind::Radical(t) => t.params(),
            ConstructKind::Bracket(t) => t.params(),
            ConstructKind::HorizontalBracket(t) => t.params(),
            ConstructKind::Composite(t) => t.params(),
            ConstructKind::SignComposite(t) => t.params(),
            ConstructKind::Script(t) => t.params(),
            ConstructKind::Matrix(t) => t.params(),
            ConstructKind::Box(t) => t.params(),
            ConstructKind::Decorated(t) => t.params(),
            ConstructKind::Arrow(t) => t.params(),
        }
    }

    pub fn from_params(type_name: &str, params: &HashMap<String, String>) -> EquationResult<Self> {
        Ok(match type_name {
            "Division" => ConstructKind::Division(DivisionType::from_params(params)?),
            "Radical" => ConstructKind::Radical(RadicalType::from_params(params)?),
            "Bracket" => ConstructKind::Bracket(BracketType::from_params(params)?),
            "HorizontalBracket" => {
                ConstructKind::HorizontalBracket(HorizontalBracketType::from_params(params)?)
            }
            "Composite" => ConstructKind::Composite(CompositeType::from_params(params)?),
            "SignComposite" => {
                ConstructKind::SignComposite(SignCompositeType::from_params(params)?)
            }
            "Script" => ConstructKind::Script(ScriptType::from_params(params)?),
            "Matrix" => ConstructKind::Matrix(MatrixType::from_params(params)?),
            "Box" => ConstructKind::Box(BoxType::from_params(params)?),
            "Decorated" => ConstructKind::Decorated(DecoratedType::from_params(params)?),
            "Arrow" => ConstructKind::Arrow(ArrowType::from_params(params)?),
            other => return Err(EquationError::UnknownElement(other.to_string())),
        })
    }

    pub fn slot_scales(&self) -> Vec<SlotScale> {
        match self {
            ConstructKind::Division(t) => t.slot_scales(),
            ConstructKind::Radical(t) => t.slot_scales(),
            ConstructKind::Bracket(t) => t.slot_scales(),
            ConstructKind::HorizontalBracket(t) => t.slot_scales(),
            ConstructKind::Composite(t) => t.slot_scales(),
            ConstructKind::SignComposite(t) => t.slot_scales(),
            ConstructKind::Script(t) => t.slot_scales(),
            ConstructKind::Matrix(t) => t.slot_scales(),
            ConstructKind::Box(t) => t.slot_scales(),
            ConstructKind::Decorated(t) => t.slot_scales(),
            ConstructKind::Arrow(t) => t.slot_scales(),
        }
    }

    fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        match self {
            ConstructKind::Division(t) => t.layout(input),
            ConstructKind::Radical(t) => t.layout(input),
            ConstructKind::Bracket(t) => t.layout(input),
            ConstructKind::HorizontalBracket(t) => t.layout(input),
            ConstructKind::Composite(t) => t.layout(input),
            ConstructKind::SignComposite(t) => t.layout(input),
            ConstructKind::Script(t) => t.layout(input),
            ConstructKind::Matrix(t) => t.layout(input),
            ConstructKind::Box(t) => t.layout(input),
            ConstructKind::Decorated(t) => t.layout(input),
            ConstructKind::Arrow(t) => t.layout(input),
        }
    }

    /// Slot reached from `slot` by `key`, or None to bubble
    pub fn navigate(&self, slot: usize, event: KeyEvent) -> Option<usize> {
        let key = event.key;
        match self {
            ConstructKind::Division(t) => t.navigate(slot, key),
            ConstructKind::Radical(t) => t.navigate(slot, key),
            ConstructKind::Bracket(_) | ConstructKind::Box(_) | ConstructKind::Decorated(_) => None,
            ConstructKind::HorizontalBracket(t) => t.navigate(slot, key),
            ConstructKind::Composite(t) => t.navigate(slot, key),
            ConstructKind::SignComposite(t) => t.navigate(slot, key),
            ConstructKind::Script(t) => t.navigate(slot, key),
            ConstructKind::Matrix(t) => t.navigate(slot, key),
            ConstructKind::Arrow(t) => t.navigate(slot, key),
        }
    }

    /// Slot entered when the caret arrives from the left
    pub fn first_slot(&self) -> usize {
        match self {
            ConstructKind::Radical(t) => t.first_slot(),
            ConstructKind::SignComposite(t) => t.first_slot(),
            _ => 0,
        }
    }

    /// Slot entered when the caret arrives from the right
    pub fn last_slot(&self) -> usize {
        match self {
            ConstructKind::Division(t) => t.last_slot(),
            ConstructKind::Matrix(t) => t.last_slot(),
            _ => 0,
        }
    }
}

// =============================================================================
// Construct
// =============================================================================

/// A construct embedded in a row
#[derive(Debug, Clone)]
pub struct Construct {
    kind: ConstructKind,
    font_size: f32,
    sub_level: u32,
    slots: Vec<RowContainer>,
    active_slot: usize,
    geometry: Geometry,
    slot_offsets: Vec<Point>,
    /// Static signs and rules, relative to the top-left corner
    leaves: Vec<Leaf>,
}

impl Construct {
    /// A construct with empty slots
    pub fn new(
        kind: ConstructKind,
        font_size: f32,
        sub_level: u32,
        default_format: FormatId,
        formats: &mut FormatTable,
    ) -> Self {
        let slots = kind
            .slot_scales()
            .into_iter()
            .map(|scale| {
                let size = scale.font_size(font_size, sub_level);
                let format = formats.format_id_for_new_size(default_format, size);
                RowContainer::new(size, scale.sub_level(sub_level), format)
            })
            .collect();
        Self::assemble(kind, font_size, sub_level, slots)
    }

    /// A construct from already built slots, as when loading a document
    pub fn from_slots(
        kind: ConstructKind,
        font_size: f32,
        sub_level: u32,
        slots: Vec<RowContainer>,
    ) -> EquationResult<Self> {
        let expected = kind.slot_scales().len();
        if slots.len() != expected {
            return Err(EquationError::Deserialize(format!(
                "{} expects {} slots, found {}",
                kind.type_name(),
                expected,
                slots.len()
            )));
        }
        Ok(Self::assemble(kind, font_size, sub_level, slots))
    }

    fn assemble(
        kind: ConstructKind,
        font_size: f32,
        sub_level: u32,
        slots: Vec<RowContainer>,
    ) -> Self {
        let active_slot = kind.first_slot();
        Self {
            kind,
            font_size,
            sub_level,
            slots,
            active_slot,
            geometry: Geometry::default(),
            slot_offsets: Vec::new(),
            leaves: Vec::new(),
        }
    }

    pub fn kind(&self) -> &ConstructKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn sub_level(&self) -> u32 {
        self.sub_level
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn slots(&self) -> &[RowContainer] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&RowContainer> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut RowContainer> {
        self.slots.get_mut(index)
    }

    pub fn active_slot_index(&self) -> usize {
        self.active_slot
    }

    pub fn active_slot(&self) -> &RowContainer {
        &self.slots[self.active_slot]
    }

    pub fn active_slot_mut(&mut self) -> &mut RowContainer {
        &mut self.slots[self.active_slot]
    }

    pub fn set_active_slot(&mut self, index: usize) {
        assert!(index < self.slots.len(), "slot {} out of range for {}", index, self.type_name());
        self.active_slot = index;
    }

    /// Leaves in absolute coordinates
    pub fn leaves(&self) -> Vec<Leaf> {
        self.leaves
            .iter()
            .map(|leaf| leaf.translated(self.geometry.left, self.geometry.top))
            .collect()
    }

    pub fn set_font_size(&mut self, font_size: f32, sub_level: u32, formats: &mut FormatTable) {
        self.font_size = font_size;
        self.sub_level = sub_level;
        for (slot, scale) in self.slots.iter_mut().zip(self.kind.slot_scales()) {
            let size = scale.font_size(font_size, sub_level);
            slot.set_font_size(size, scale.sub_level(sub_level), formats);
        }
    }

    pub fn remap_formats(&mut self, map: &mut dyn FnMut(FormatId) -> FormatId) {
        for slot in &mut self.slots {
            slot.remap_formats(map);
        }
    }

    pub fn collect_formats(&self, used: &mut BTreeSet<FormatId>) {
        for slot in &self.slots {
            slot.collect_formats(used);
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn enter(&mut self, entry: Entry) {
        self.active_slot = match entry {
            Entry::End => self.kind.last_slot(),
            Entry::Start | Entry::AtX(..) => self.kind.first_slot(),
        };
        self.slots[self.active_slot].enter(entry);
    }

    /// Handle a key that bubbled out of the active slot
    pub fn handle_key(&mut self, event: KeyEvent, caret_x: f32) -> Outcome {
        match self.kind.navigate(self.active_slot, event) {
            Some(target) => {
                self.active_slot = target;
                self.slots[target].enter(Entry::for_key(event.key, caret_x));
                Outcome::TransferTo(target)
            }
            None => Outcome::Bubble,
        }
    }

    /// Claim a click inside one of the slots
    pub fn consume_mouse_click(&mut self, point: Point) -> bool {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.geometry().contains(point) {
                slot.consume_mouse_click(point);
                self.active_slot = index;
                return true;
            }
        }
        false
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Size the slots, then arrange them. `buddy` is the box of the item
    /// before this construct in its row.
    pub fn calculate_size(&mut self, ctx: &LayoutContext<'_>, buddy: BoxExtent) -> BoxExtent {
        let extents: Vec<BoxExtent> =
            self.slots.iter_mut().map(|slot| slot.calculate_size(ctx)).collect();
        let input = LayoutInput {
            ctx: *ctx,
            font_size: self.font_size,
            metrics: MathFontMetrics::for_size(self.font_size),
            slots: &extents,
            buddy,
        };
        let arrangement = self.kind.layout(&input);
        assert_eq!(
            arrangement.slot_offsets.len(),
            self.slots.len(),
            "{} layout placed the wrong number of slots",
            self.type_name()
        );

        self.geometry.width = arrangement.extent.width;
        self.geometry.height = arrangement.extent.height;
        self.geometry.ref_y = arrangement.extent.ref_y;
        self.slot_offsets = arrangement.slot_offsets;
        self.leaves = arrangement.leaves;
        self.reposition();
        self.geometry.extent()
    }

    pub fn set_left(&mut self, left: f32) {
        self.geometry.left = left;
        self.reposition();
    }

    pub fn set_top(&mut self, top: f32) {
        self.geometry.top = top;
        self.reposition();
    }

    pub fn set_position(&mut self, left: f32, top: f32) {
        self.geometry.left = left;
        self.geometry.top = top;
        self.reposition();
    }

    fn reposition(&mut self) {
        let Geometry { left, top, .. } = self.geometry;
        for (slot, offset) in self.slots.iter_mut().zip(&self.slot_offsets) {
            slot.set_position(left + offset.x, top + offset.y);
        }
    }
}
