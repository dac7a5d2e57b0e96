//! Geometry - coordinates, boxes and font-relative layout constants
//!
//! Every node in the tree carries a [`Geometry`]: an absolute box plus the
//! reference Y (`ref_y`), the distance from the top edge down to the
//! typographic baseline. Siblings in a row are aligned by making their
//! baselines (`top + ref_y`) coincide.

use serde::{Deserialize, Serialize};

// =============================================================================
// Layout Types
// =============================================================================

/// A position in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A size with width and height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A rectangle defined by position and size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x()
            && point.x <= self.right()
            && point.y >= self.y()
            && point.y <= self.bottom()
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            origin: self.origin.offset(dx, dy),
            size: self.size,
        }
    }
}

/// Position, size and baseline of a node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Distance from `top` down to the baseline
    pub ref_y: f32,
}

impl Geometry {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn mid_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    pub fn mid_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// Absolute y of the baseline
    pub fn baseline(&self) -> f32 {
        self.top + self.ref_y
    }

    /// Depth below the baseline
    pub fn descent(&self) -> f32 {
        self.height - self.ref_y
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point)
    }

    /// Size-only view used by the construct layout functions
    pub fn extent(&self) -> BoxExtent {
        BoxExtent {
            width: self.width,
            height: self.height,
            ref_y: self.ref_y,
        }
    }
}

/// Width, height and baseline of a laid-out box, without a position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxExtent {
    pub width: f32,
    pub height: f32,
    pub ref_y: f32,
}

impl BoxExtent {
    pub fn new(width: f32, height: f32, ref_y: f32) -> Self {
        Self {
            width,
            height,
            ref_y,
        }
    }

    pub fn descent(&self) -> f32 {
        self.height - self.ref_y
    }
}

// =============================================================================
// Font-relative constants
// =============================================================================

/// Font scale of a first-level script relative to its parent
pub const SUB_FONT_FACTOR: f32 = 0.6;
/// Font scale of deeper scripts relative to their parent
pub const SUB_SUB_FONT_FACTOR: f32 = 0.7;
/// Rule thickness (fraction bars, radicals, frames)
pub const LINE_FACTOR: f32 = 0.06;
/// How far a superscript sinks into the top of its buddy
pub const SUPER_OVERLAP_FACTOR: f32 = 0.32;
/// How far a subscript rises into the bottom of its buddy
pub const SUB_OVERLAP_FACTOR: f32 = 0.4;
/// Math axis above the baseline
pub const AXIS_FACTOR: f32 = 0.25;
/// Smallest font size a script can shrink to
pub const MIN_FONT_SIZE: f32 = 4.0;

/// Font size of a script slot inside a node at `sub_level`
pub fn script_font_size(font_size: f32, sub_level: u32) -> f32 {
    let factor = if sub_level == 0 {
        SUB_FONT_FACTOR
    } else {
        SUB_SUB_FONT_FACTOR
    };
    (font_size * factor).max(MIN_FONT_SIZE)
}

/// Font-relative distances used by the construct layouts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MathFontMetrics {
    pub font_size: f32,
    /// Math axis above the baseline (fraction bars sit here)
    pub axis_height: f32,
    pub rule_thickness: f32,
    /// Vertical gap between numerator and denominator
    pub division_gap: f32,
    /// Horizontal overhang of a fraction bar past its children
    pub division_padding: f32,
    /// Space between a radical's overbar and its inside
    pub radical_gap: f32,
    /// Extra height a bracket sign takes over its inside
    pub bracket_padding: f32,
    pub script_gap: f32,
    pub super_overlap: f32,
    pub sub_overlap: f32,
    pub matrix_column_gap: f32,
    pub matrix_row_gap: f32,
    /// Gap between the lines of a row container
    pub line_gap: f32,
    pub box_padding: f32,
    pub decoration_gap: f32,
    pub decoration_height: f32,
    /// Sign height above which brackets are assembled from pieces
    pub stretch_threshold: f32,
    /// Width given to an empty row so the caret has somewhere to go
    pub placeholder_width: f32,
}

impl MathFontMetrics {
    /// Create metrics for a given font size
    pub fn for_size(font_size: f32) -> Self {
        let em = font_size;
        Self {
            font_size,
            axis_height: em * AXIS_FACTOR,
            rule_thickness: em * LINE_FACTOR,
            division_gap: em * 0.2,
            division_padding: em * 0.1,
            radical_gap: em * 0.15,
            bracket_padding: em * 0.2,
            script_gap: em * 0.05,
            super_overlap: em * SUPER_OVERLAP_FACTOR,
            sub_overlap: em * SUB_OVERLAP_FACTOR,
            matrix_column_gap: em * 0.4,
            matrix_row_gap: em * 0.2,
            line_gap: em * 0.2,
            box_padding: em * 0.2,
            decoration_gap: em * 0.1,
            decoration_height: em * 0.3,
            stretch_threshold: em * 1.6,
            placeholder_width: em * 0.5,
        }
    }
}

/// A laid-out band in a vertical stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub top: f32,
    pub height: f32,
    pub ref_y: f32,
}

/// Baseline of a vertical stack of bands.
///
/// An odd count aligns on the middle band's own baseline. An even count
/// puts the math axis on the boundary between the two middle bands.
pub fn stacked_ref_y(bands: &[Band], axis_height: f32) -> f32 {
    assert!(!bands.is_empty(), "stacked_ref_y needs at least one band");
    let mid = bands.len() / 2;
    if bands.len() % 2 == 1 {
        bands[mid].top + bands[mid].ref_y
    } else {
        let upper = &bands[mid - 1];
        let lower = &bands[mid];
        let boundary = (upper.top + upper.height + lower.top) / 2.0;
        boundary + axis_height
    }
}
