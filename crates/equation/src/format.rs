//! Text Format Table - deduplicated registry of text formats
//!
//! Text runs never store fonts directly. Each character carries a small
//! [`FormatId`] pointing into the document's [`FormatTable`], which hands out
//! the same id for structurally equal formats. Font sizes are compared at one
//! decimal place so floating point drift does not create near-duplicates.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use text_engine::{FontRequest, FontStyle, FontType, FontWeight};

/// A color in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    /// Format as `#RRGGBBAA`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |index: usize| u8::from_str_radix(hex.get(index..index + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Color::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Index of an entry in a [`FormatTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatId(pub usize);

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Font, style, color and underline of a run of characters
#[derive(Debug, Clone, PartialEq)]
pub struct TextFormat {
    pub font_size: f32,
    pub font_type: FontType,
    pub font_style: FontStyle,
    pub font_weight: FontWeight,
    pub color: Color,
    pub underline: bool,
}

impl TextFormat {
    pub fn new(font_size: f32, font_type: FontType) -> Self {
        Self {
            font_size: round_size(font_size),
            font_type,
            font_style: FontStyle::Normal,
            font_weight: FontWeight::Normal,
            color: Color::BLACK,
            underline: false,
        }
    }

    pub fn with_style(mut self, font_style: FontStyle) -> Self {
        self.font_style = font_style;
        self
    }

    pub fn with_weight(mut self, font_weight: FontWeight) -> Self {
        self.font_weight = font_weight;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    /// The request handed to the measurement service
    pub fn font_request(&self) -> FontRequest {
        FontRequest::new(self.font_type, self.font_size)
            .with_style(self.font_style)
            .with_weight(self.font_weight)
    }

    fn key(&self) -> FormatKey {
        FormatKey {
            size_tenths: (self.font_size * 10.0).round() as i64,
            font_type: self.font_type,
            font_style: self.font_style,
            font_weight: self.font_weight,
            color: self.color,
            underline: self.underline,
        }
    }
}

fn round_size(font_size: f32) -> f32 {
    (font_size * 10.0).round() / 10.0
}

/// Structural equality key for the dedup cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FormatKey {
    size_tenths: i64,
    font_type: FontType,
    font_style: FontStyle,
    font_weight: FontWeight,
    color: Color,
    underline: bool,
}

/// State kept between [`FormatTable::optimize_for_save`] and
/// [`FormatTable::restore_after_save`]
#[derive(Debug)]
pub struct SavedFormats {
    original: Vec<TextFormat>,
    forward: HashMap<FormatId, FormatId>,
}

impl SavedFormats {
    /// Id a format had before compaction mapped to its compacted id
    pub fn forward(&self, id: FormatId) -> FormatId {
        self.forward.get(&id).copied().unwrap_or(id)
    }

    /// Reverse mapping, compacted id back to the in-memory id
    pub fn reverse(&self) -> HashMap<FormatId, FormatId> {
        self.forward.iter().map(|(old, new)| (*new, *old)).collect()
    }
}

/// Deduplicated table of text formats for one document
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    formats: Vec<TextFormat>,
    cache: HashMap<FormatKey, FormatId>,
}

impl FormatTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Look up a format. Panics on an id this table never handed out.
    pub fn get(&self, id: FormatId) -> &TextFormat {
        match self.formats.get(id.0) {
            Some(format) => format,
            None => panic!("format id {} out of range ({} formats)", id, self.formats.len()),
        }
    }

    pub fn formats(&self) -> &[TextFormat] {
        &self.formats
    }

    /// Id of a structurally equal entry, appending one if there is none
    pub fn get_format_id(
        &mut self,
        font_size: f32,
        font_type: FontType,
        font_style: FontStyle,
        font_weight: FontWeight,
        color: Color,
        underline: bool,
    ) -> FormatId {
        let format = TextFormat {
            font_size: round_size(font_size),
            font_type,
            font_style,
            font_weight,
            color,
            underline,
        };
        self.intern(format)
    }

    /// Id for a whole format value, deduplicated the same way
    pub fn intern(&mut self, mut format: TextFormat) -> FormatId {
        format.font_size = round_size(format.font_size);
        let key = format.key();
        if let Some(id) = self.cache.get(&key) {
            return *id;
        }
        let id = FormatId(self.formats.len());
        self.formats.push(format);
        self.cache.insert(key, id);
        id
    }

    pub fn format_id_for_new_size(&mut self, old: FormatId, font_size: f32) -> FormatId {
        let mut format = self.get(old).clone();
        format.font_size = font_size;
        self.intern(format)
    }

    pub fn format_id_for_new_font(&mut self, old: FormatId, font_type: FontType) -> FormatId {
        let mut format = self.get(old).clone();
        format.font_type = font_type;
        self.intern(format)
    }

    pub fn format_id_for_new_style(&mut self, old: FormatId, font_style: FontStyle) -> FormatId {
        let mut format = self.get(old).clone();
        format.font_style = font_style;
        self.intern(format)
    }

    pub fn format_id_for_new_weight(&mut self, old: FormatId, font_weight: FontWeight) -> FormatId {
        let mut format = self.get(old).clone();
        format.font_weight = font_weight;
        self.intern(format)
    }

    pub fn format_id_for_new_color(&mut self, old: FormatId, color: Color) -> FormatId {
        let mut format = self.get(old).clone();
        format.color = color;
        self.intern(format)
    }

    pub fn format_id_for_new_underline(&mut self, old: FormatId, underline: bool) -> FormatId {
        let mut format = self.get(old).clone();
        format.underline = underline;
        self.intern(format)
    }

    /// Shrink the table to the referenced formats, keeping their relative order.
    ///
    /// The caller must remap every stored id with [`SavedFormats::forward`]
    /// and must not touch the tree until [`FormatTable::restore_after_save`].
    pub fn optimize_for_save(&mut self, referenced: &BTreeSet<FormatId>) -> SavedFormats {
        let original = std::mem::take(&mut self.formats);
        self.cache.clear();

        let mut forward = HashMap::new();
        for old in referenced {
            let new = FormatId(self.formats.len());
            self.formats.push(original[old.0].clone());
            self.cache.insert(original[old.0].key(), new);
            forward.insert(*old, new);
        }

        tracing::debug!(
            before = original.len(),
            after = self.formats.len(),
            "compacted format table for save"
        );
        SavedFormats { original, forward }
    }

    /// Put back the table captured by [`FormatTable::optimize_for_save`]
    pub fn restore_after_save(&mut self, saved: SavedFormats) {
        self.formats = saved.original;
        self.rebuild_cache();
    }

    /// Bring formats from another table (a pasted fragment or a loaded
    /// document) into this one.
    ///
    /// Returns, for each incoming index, the id of an equal existing entry
    /// or of a newly appended one.
    pub fn merge_formats(&mut self, incoming: &[TextFormat]) -> Vec<FormatId> {
        let before = self.formats.len();
        let mapping: Vec<FormatId> = incoming
            .iter()
            .map(|format| self.intern(format.clone()))
            .collect();
        tracing::debug!(
            incoming = incoming.len(),
            added = self.formats.len() - before,
            "merged incoming formats"
        );
        mapping
    }

    fn rebuild_cache(&mut self) {
        self.cache.clear();
        for (index, format) in self.formats.iter().enumerate() {
            self.cache.entry(format.key()).or_insert(FormatId(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(table: &mut FormatTable, size: f32) -> FormatId {
        table.get_format_id(
            size,
            FontType::StixGeneral,
            FontStyle::Italic,
            FontWeight::Normal,
            Color::BLACK,
            false,
        )
    }

    #[test]
    fn test_equal_formats_share_id() {
        let mut table = FormatTable::new();
        let a = plain(&mut table, 20.0);
        let b = plain(&mut table, 20.0);
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_size_rounding_collapses_drift() {
        let mut table = FormatTable::new();
        let a = plain(&mut table, 12.0);
        let b = plain(&mut table, 12.000_01);
        let c = plain(&mut table, 12.04);
        let d = plain(&mut table, 12.1);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_new_derivations() {
        let mut table = FormatTable::new();
        let base = plain(&mut table, 20.0);

        let bold = table.format_id_for_new_weight(base, FontWeight::Bold);
        assert_ne!(bold, base);
        assert_eq!(table.get(bold).font_weight, FontWeight::Bold);
        assert_eq!(table.format_id_for_new_weight(bold, FontWeight::Normal), base);

        let red = table.format_id_for_new_color(base, Color::RED);
        assert_eq!(table.get(red).color, Color::RED);

        let small = table.format_id_for_new_size(base, 12.0);
        assert_eq!(table.get(small).font_size, 12.0);
        assert_eq!(table.format_id_for_new_size(small, 20.0), base);

        let arial = table.format_id_for_new_font(base, FontType::Arial);
        let upright = table.format_id_for_new_style(base, FontStyle::Normal);
        let underlined = table.format_id_for_new_underline(base, true);
        assert_eq!(table.len(), 6);
        assert!(table.get(underlined).underline);
        assert_eq!(table.get(arial).font_type, FontType::Arial);
        assert_eq!(table.get(upright).font_style, FontStyle::Normal);
    }

    #[test]
    fn test_optimize_and_restore() {
        let mut table = FormatTable::new();
        let ids: Vec<FormatId> = (0..5).map(|i| plain(&mut table, 10.0 + i as f32)).collect();

        let referenced: BTreeSet<FormatId> = [ids[1], ids[3]].into_iter().collect();
        let saved = table.optimize_for_save(&referenced);
        assert_eq!(table.len(), 2);
        assert_eq!(saved.forward(ids[1]), FormatId(0));
        assert_eq!(saved.forward(ids[3]), FormatId(1));
        assert_eq!(table.get(FormatId(1)).font_size, 13.0);
        assert_eq!(saved.reverse()[&FormatId(1)], ids[3]);

        table.restore_after_save(saved);
        assert_eq!(table.len(), 5);
        assert_eq!(plain(&mut table, 14.0), ids[4]);
    }

    #[test]
    fn test_merge_formats() {
        let mut table = FormatTable::new();
        let a = plain(&mut table, 10.0);
        let b = plain(&mut table, 11.0);

        let incoming = vec![
            table.get(b).clone(),
            TextFormat::new(30.0, FontType::Arial),
            table.get(a).clone(),
        ];
        let mapping = table.merge_formats(&incoming);
        assert_eq!(mapping, vec![b, FormatId(2), a]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::RED.to_hex(), "#FF0000FF");
        assert_eq!(Color::from_hex("#FF0000FF"), Some(Color::RED));
        assert_eq!(Color::from_hex("#0000FF"), Some(Color::BLUE));
        assert_eq!(Color::from_hex("0000FF"), None);
        assert_eq!(Color::from_hex("#00GG00"), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_format() -> impl Strategy<Value = TextFormat> {
            (
                (40u32..400).prop_map(|tenths| tenths as f32 / 10.0),
                0usize..FontType::ALL.len(),
                any::<bool>(),
                any::<bool>(),
                0u8..3,
                any::<bool>(),
            )
                .prop_map(|(size, font, italic, bold, color, underline)| TextFormat {
                    font_size: size,
                    font_type: FontType::ALL[font],
                    font_style: if italic { FontStyle::Italic } else { FontStyle::Normal },
                    font_weight: if bold { FontWeight::Bold } else { FontWeight::Normal },
                    color: [Color::BLACK, Color::RED, Color::BLUE][color as usize],
                    underline,
                })
        }

        proptest! {
            #[test]
            fn equal_arguments_return_equal_ids(formats in proptest::collection::vec(arb_format(), 1..40)) {
                let mut table = FormatTable::new();
                let ids: Vec<FormatId> = formats.iter().map(|f| table.intern(f.clone())).collect();

                for (i, a) in formats.iter().enumerate() {
                    for (j, b) in formats.iter().enumerate() {
                        prop_assert_eq!(a.key() == b.key(), ids[i] == ids[j]);
                    }
                }

                // No two distinct entries are structurally equal
                let entries = table.formats();
                for i in 0..entries.len() {
                    for j in (i + 1)..entries.len() {
                        prop_assert_ne!(entries[i].key(), entries[j].key());
                    }
                }
            }

            #[test]
            fn drifted_sizes_dedup(tenths in 40u32..400, drift in -0.04f32..0.04) {
                let mut table = FormatTable::new();
                let size = tenths as f32 / 10.0;
                let a = plain(&mut table, size);
                let b = plain(&mut table, size + drift);
                prop_assert_eq!(a, b);
            }
        }
    }
}
