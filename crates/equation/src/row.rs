//! Row - a horizontal sequence of text runs and embedded constructs
//!
//! Items always alternate between text and constructs, starting and ending
//! with a (possibly empty) text run:
//!
//! ```text
//! [Text, Construct, Text, Construct, ..., Text]
//! ```
//!
//! That normal form means there are never two adjacent text runs, and the
//! caret always has a text run to sit in on either side of a construct.
//!
//! Positions inside a row are flat offsets: each character counts one and
//! each construct counts one. An offset on the boundary between a text run
//! and a construct belongs to the text run.

use crate::construct::Construct;
use crate::format::{FormatId, FormatTable};
use crate::geometry::{BoxExtent, Geometry, MathFontMetrics, Point, Rect};
use crate::layout::LayoutContext;
use crate::navigation::{Entry, Key, KeyEvent, Outcome};
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

// =============================================================================
// Text Runs
// =============================================================================

/// Characters with one format id each
#[derive(Debug, Clone, Default)]
pub struct TextRun {
    chars: Vec<char>,
    formats: Vec<FormatId>,
    geometry: Geometry,
    /// Caret x positions relative to `left`, one more than there are chars
    caret_xs: Vec<f32>,
}

impl TextRun {
    pub fn new() -> Self {
        Self {
            caret_xs: vec![0.0],
            ..Self::default()
        }
    }

    /// Panics if the two vectors differ in length
    pub fn from_parts(chars: Vec<char>, formats: Vec<FormatId>) -> Self {
        assert_eq!(chars.len(), formats.len(), "one format per character");
        let caret_xs = vec![0.0; chars.len() + 1];
        Self {
            chars,
            formats,
            geometry: Geometry::default(),
            caret_xs,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn formats(&self) -> &[FormatId] {
        &self.formats
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Maximal ranges of characters sharing a format
    pub fn segments(&self) -> Vec<(FormatId, Range<usize>)> {
        let mut segments: Vec<(FormatId, Range<usize>)> = Vec::new();
        for (index, format) in self.formats.iter().enumerate() {
            match segments.last_mut() {
                Some((current, range)) if current == format => range.end = index + 1,
                _ => segments.push((*format, index..index + 1)),
            }
        }
        segments
    }

    /// Absolute x of the caret before character `index`
    pub fn caret_x(&self, index: usize) -> f32 {
        let relative = self
            .caret_xs
            .get(index)
            .or_else(|| self.caret_xs.last())
            .copied()
            .unwrap_or(0.0);
        self.geometry.left + relative
    }

    fn insert(&mut self, index: usize, chars: &[char], formats: &[FormatId]) {
        assert_eq!(chars.len(), formats.len(), "one format per character");
        self.chars.splice(index..index, chars.iter().copied());
        self.formats.splice(index..index, formats.iter().copied());
    }

    fn split_off(&mut self, index: usize) -> TextRun {
        let chars = self.chars.split_off(index);
        let formats = self.formats.split_off(index);
        TextRun::from_parts(chars, formats)
    }

    fn append(&mut self, mut other: TextRun) {
        self.chars.append(&mut other.chars);
        self.formats.append(&mut other.formats);
    }

    fn drain(&mut self, range: Range<usize>) -> TextRun {
        let chars = self.chars.drain(range.clone()).collect();
        let formats = self.formats.drain(range).collect();
        TextRun::from_parts(chars, formats)
    }

    fn map_formats(&mut self, range: Range<usize>, map: &mut dyn FnMut(FormatId) -> FormatId) {
        for format in &mut self.formats[range] {
            *format = map(*format);
        }
    }

    fn calculate_size(&mut self, ctx: &LayoutContext<'_>, default_format: FormatId) -> BoxExtent {
        if self.chars.is_empty() {
            let extent = ctx.measure("", default_format);
            self.caret_xs = vec![0.0];
            self.geometry.width = 0.0;
            self.geometry.height = extent.height;
            self.geometry.ref_y = extent.baseline;
            return self.geometry.extent();
        }

        let mut caret_xs = Vec::with_capacity(self.chars.len() + 1);
        caret_xs.push(0.0);
        let mut x = 0.0;
        let mut ascent: f32 = 0.0;
        let mut descent: f32 = 0.0;

        for (format, range) in self.segments() {
            let mut prefix = String::new();
            let mut whole = None;
            for ch in &self.chars[range] {
                prefix.push(*ch);
                let extent = ctx.measure(&prefix, format);
                caret_xs.push(x + extent.width);
                whole = Some(extent);
            }
            if let Some(extent) = whole {
                x += extent.width;
                ascent = ascent.max(extent.baseline);
                descent = descent.max(extent.descent());
            }
        }

        self.caret_xs = caret_xs;
        self.geometry.width = x;
        self.geometry.height = ascent + descent;
        self.geometry.ref_y = ascent;
        self.geometry.extent()
    }
}

// =============================================================================
// Row Items
// =============================================================================

/// One entry of a row
#[derive(Debug, Clone)]
pub enum RowItem {
    Text(TextRun),
    Construct(Box<Construct>),
}

impl RowItem {
    pub fn geometry(&self) -> &Geometry {
        match self {
            RowItem::Text(run) => run.geometry(),
            RowItem::Construct(construct) => construct.geometry(),
        }
    }

    /// Units this item occupies in flat offsets
    pub fn unit_len(&self) -> usize {
        match self {
            RowItem::Text(run) => run.len(),
            RowItem::Construct(_) => 1,
        }
    }

    fn set_position(&mut self, left: f32, top: f32) {
        match self {
            RowItem::Text(run) => {
                run.geometry.left = left;
                run.geometry.top = top;
            }
            RowItem::Construct(construct) => construct.set_position(left, top),
        }
    }
}

/// What sits between an offset and its neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Character `index` of the text run at item `item`
    Char { item: usize, index: usize },
    /// The construct at item `item`
    Construct(usize),
}

// =============================================================================
// Row
// =============================================================================

/// Horizontal sequence of text and constructs
#[derive(Debug, Clone)]
pub struct Row {
    items: Vec<RowItem>,
    /// Format used for typing where there is no neighbouring character
    default_format: FormatId,
    font_size: f32,
    sub_level: u32,
    caret: usize,
    /// Other end of the selection, if any
    anchor: Option<usize>,
    /// Construct item holding the caret, when the caret is deeper in the tree
    active_item: Option<usize>,
    geometry: Geometry,
    item_offsets: Vec<Point>,
}

impl Row {
    pub fn new(font_size: f32, sub_level: u32, default_format: FormatId) -> Self {
        Self {
            items: vec![RowItem::Text(TextRun::new())],
            default_format,
            font_size,
            sub_level,
            caret: 0,
            anchor: None,
            active_item: None,
            geometry: Geometry::default(),
            item_offsets: Vec::new(),
        }
    }

    /// Build from arbitrary items, restoring the normal form
    pub fn from_items(
        items: Vec<RowItem>,
        font_size: f32,
        sub_level: u32,
        default_format: FormatId,
    ) -> Self {
        let mut row = Self::new(font_size, sub_level, default_format);
        row.items = items;
        row.merge_adjacent_text_runs();
        row
    }

    pub fn items(&self) -> &[RowItem] {
        &self.items
    }

    pub fn default_format(&self) -> FormatId {
        self.default_format
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

    /// Number of flat offset units
    pub fn len(&self) -> usize {
        self.items.iter().map(RowItem::unit_len).sum()
    }

    /// True when the row holds only an empty text run
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenated text of all runs, constructs skipped
    pub fn text(&self) -> String {
        self.items
            .iter()
            .filter_map(|item| match item {
                RowItem::Text(run) => Some(run.text()),
                RowItem::Construct(_) => None,
            })
            .collect()
    }

    pub fn constructs(&self) -> impl Iterator<Item = &Construct> {
        self.items.iter().filter_map(|item| match item {
            RowItem::Construct(construct) => Some(construct.as_ref()),
            RowItem::Text(_) => None,
        })
    }

    pub fn construct(&self, item: usize) -> Option<&Construct> {
        match self.items.get(item) {
            Some(RowItem::Construct(construct)) => Some(construct),
            _ => None,
        }
    }

    pub fn construct_mut(&mut self, item: usize) -> Option<&mut Construct> {
        match self.items.get_mut(item) {
            Some(RowItem::Construct(construct)) => Some(construct),
            _ => None,
        }
    }

    // =========================================================================
    // Offsets
    // =========================================================================

    /// Text run and character index holding `offset`. Panics past the end.
    fn locate(&self, offset: usize) -> (usize, usize) {
        let mut remaining = offset;
        for (index, item) in self.items.iter().enumerate() {
            match item {
                RowItem::Text(run) => {
                    if remaining <= run.len() {
                        return (index, remaining);
                    }
                    remaining -= run.len();
                }
                RowItem::Construct(_) => remaining -= 1,
            }
        }
        panic!("offset {} past end of row of length {}", offset, self.len());
    }

    /// Flat offset where item `index` begins
    pub fn item_offset(&self, index: usize) -> usize {
        self.items[..index].iter().map(RowItem::unit_len).sum()
    }

    pub fn unit_after(&self, offset: usize) -> Option<Unit> {
        let (item, index) = self.locate(offset);
        if index < self.run(item).len() {
            Some(Unit::Char { item, index })
        } else if item + 1 < self.items.len() {
            Some(Unit::Construct(item + 1))
        } else {
            None
        }
    }

    pub fn unit_before(&self, offset: usize) -> Option<Unit> {
        if offset == 0 {
            return None;
        }
        let (item, index) = self.locate(offset);
        if index > 0 {
            Some(Unit::Char { item, index: index - 1 })
        } else {
            Some(Unit::Construct(item - 1))
        }
    }

    fn run(&self, item: usize) -> &TextRun {
        match &self.items[item] {
            RowItem::Text(run) => run,
            RowItem::Construct(_) => unreachable!("item {} is not a text run", item),
        }
    }

    fn run_mut(&mut self, item: usize) -> &mut TextRun {
        match &mut self.items[item] {
            RowItem::Text(run) => run,
            RowItem::Construct(_) => unreachable!("item {} is not a text run", item),
        }
    }

    /// Format for text typed at `offset`
    pub fn format_for_typing(&self, offset: usize) -> FormatId {
        let format_of = |unit| match unit {
            Some(Unit::Char { item, index }) => Some(self.run(item).formats[index]),
            _ => None,
        };
        format_of(self.unit_before(offset))
            .or_else(|| format_of(self.unit_after(offset)))
            .unwrap_or(self.default_format)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    pub fn insert_text(&mut self, offset: usize, text: &str, format: FormatId) {
        let chars: Vec<char> = text.chars().collect();
        let formats = vec![format; chars.len()];
        self.insert_chars(offset, &chars, &formats);
    }

    pub fn insert_chars(&mut self, offset: usize, chars: &[char], formats: &[FormatId]) {
        let (item, index) = self.locate(offset);
        self.run_mut(item).insert(index, chars, formats);
    }

    /// Insert a construct, splitting the text run at `offset`. Returns its item index.
    pub fn insert_construct(&mut self, offset: usize, construct: Construct) -> usize {
        let (item, index) = self.locate(offset);
        let tail = self.run_mut(item).split_off(index);
        self.items.insert(item + 1, RowItem::Construct(Box::new(construct)));
        self.items.insert(item + 2, RowItem::Text(tail));
        item + 1
    }

    /// Insert the items of another row at `offset`
    pub fn insert_fragment(&mut self, offset: usize, mut fragment: Row) {
        fragment.merge_adjacent_text_runs();
        let (item, index) = self.locate(offset);
        let tail = self.run_mut(item).split_off(index);

        let mut items = fragment.items;
        let first = match items.remove(0) {
            RowItem::Text(run) => run,
            RowItem::Construct(_) => unreachable!("fragment starts with a text run"),
        };
        self.run_mut(item).append(first);

        if items.is_empty() {
            self.run_mut(item).append(tail);
        } else {
            match items.last_mut() {
                Some(RowItem::Text(last)) => last.append(tail),
                _ => unreachable!("fragment ends with a text run"),
            }
            self.items.splice(item + 1..item + 1, items);
        }
    }

    /// Remove `count` units starting at `offset` and return them as a row
    pub fn remove_range(&mut self, offset: usize, count: usize) -> Row {
        let end = offset + count;
        assert!(
            end <= self.len(),
            "range {}..{} past end of row of length {}",
            offset,
            end,
            self.len()
        );
        let (first_item, first_index) = self.locate(offset);
        let (last_item, last_index) = self.locate(end);

        let mut removed = Vec::new();
        if first_item == last_item {
            removed.push(RowItem::Text(self.run_mut(first_item).drain(first_index..last_index)));
        } else {
            let head = self.run_mut(first_item).split_off(first_index);
            let mut middle: Vec<RowItem> = self.items.drain(first_item + 1..=last_item).collect();
            let mut last_run = match middle.pop() {
                Some(RowItem::Text(run)) => run,
                _ => unreachable!("range ends in a text run"),
            };
            let rest = last_run.split_off(last_index);
            self.run_mut(first_item).append(rest);

            removed.push(RowItem::Text(head));
            removed.extend(middle);
            removed.push(RowItem::Text(last_run));
        }

        self.active_item = None;
        Row::from_items(removed, self.font_size, self.sub_level, self.default_format)
    }

    /// Cut the row at `offset`, returning everything after it
    pub fn split_at(&mut self, offset: usize) -> Row {
        let count = self.len() - offset;
        self.remove_range(offset, count)
    }

    /// Copy of the `count` units starting at `offset`
    pub fn copy_range(&self, offset: usize, count: usize) -> Row {
        let mut copy = self.clone();
        let mut range = copy.split_at(offset);
        range.split_at(count);
        range
    }

    /// Append another row's items at the end
    pub fn append(&mut self, other: Row) {
        let end = self.len();
        self.insert_fragment(end, other);
    }

    /// Restore the normal form: merge neighbouring text runs and make sure
    /// every construct is flanked by text runs.
    pub fn merge_adjacent_text_runs(&mut self) {
        let items = std::mem::take(&mut self.items);
        let mut merged: Vec<RowItem> = Vec::with_capacity(items.len());
        for item in items {
            match item {
                RowItem::Text(run) => match merged.last_mut() {
                    Some(RowItem::Text(previous)) => previous.append(run),
                    _ => merged.push(RowItem::Text(run)),
                },
                RowItem::Construct(construct) => {
                    if !matches!(merged.last(), Some(RowItem::Text(_))) {
                        merged.push(RowItem::Text(TextRun::new()));
                    }
                    merged.push(RowItem::Construct(construct));
                }
            }
        }
        if !matches!(merged.last(), Some(RowItem::Text(_))) {
            merged.push(RowItem::Text(TextRun::new()));
        }
        self.items = merged;
        self.active_item = None;
        self.caret = self.caret.min(self.len());
        self.anchor = self.anchor.map(|anchor| anchor.min(self.len()));
    }

    /// Rewrite the formats of the characters in `start..end`, descending
    /// into constructs inside the range
    pub fn apply_format(
        &mut self,
        start: usize,
        end: usize,
        map: &mut dyn FnMut(FormatId) -> FormatId,
    ) {
        let mut offset = 0;
        for item in &mut self.items {
            let len = item.unit_len();
            let from = start.max(offset);
            let to = end.min(offset + len);
            if from < to {
                match item {
                    RowItem::Text(run) => run.map_formats(from - offset..to - offset, map),
                    RowItem::Construct(construct) => construct.remap_formats(map),
                }
            }
            offset += len;
        }
    }

    /// Rewrite every stored format id, including nested rows
    pub fn remap_formats(&mut self, map: &mut dyn FnMut(FormatId) -> FormatId) {
        self.default_format = map(self.default_format);
        for item in &mut self.items {
            match item {
                RowItem::Text(run) => {
                    let len = run.len();
                    run.map_formats(0..len, map);
                }
                RowItem::Construct(construct) => construct.remap_formats(map),
            }
        }
    }

    /// Collect every format id referenced by this row and its children
    pub fn collect_formats(&self, used: &mut BTreeSet<FormatId>) {
        used.insert(self.default_format);
        for item in &self.items {
            match item {
                RowItem::Text(run) => used.extend(run.formats.iter().copied()),
                RowItem::Construct(construct) => construct.collect_formats(used),
            }
        }
    }

    /// Resize the row's text, keeping size differences between characters
    pub fn set_font_size(&mut self, font_size: f32, sub_level: u32, formats: &mut FormatTable) {
        let ratio = if self.font_size > 0.0 {
            font_size / self.font_size
        } else {
            1.0
        };
        self.font_size = font_size;
        self.sub_level = sub_level;
        self.default_format = formats.format_id_for_new_size(self.default_format, font_size);

        let mut resized: HashMap<FormatId, FormatId> = HashMap::new();
        for item in &mut self.items {
            match item {
                RowItem::Text(run) => {
                    let len = run.len();
                    run.map_formats(0..len, &mut |id| {
                        *resized.entry(id).or_insert_with(|| {
                            let size = formats.get(id).font_size * ratio;
                            formats.format_id_for_new_size(id, size)
                        })
                    });
                }
                RowItem::Construct(construct) => {
                    construct.set_font_size(font_size, sub_level, formats)
                }
            }
        }
    }

    // =========================================================================
    // Caret and selection
    // =========================================================================

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Move the caret, dropping any selection. Panics past the end.
    pub fn set_caret(&mut self, offset: usize) {
        assert!(offset <= self.len(), "caret {} past end of row", offset);
        self.caret = offset;
        self.anchor = None;
        self.active_item = None;
    }

    /// Select from `anchor` to `caret`
    pub fn select(&mut self, anchor: usize, caret: usize) {
        self.set_caret(caret);
        self.anchor = Some(anchor.min(self.len()));
    }

    pub fn select_all(&mut self) {
        let len = self.len();
        self.select(0, len);
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Ordered selection bounds, if a non-empty selection exists
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.anchor
            .filter(|anchor| *anchor != self.caret)
            .map(|anchor| (anchor.min(self.caret), anchor.max(self.caret)))
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    pub fn active_item(&self) -> Option<usize> {
        self.active_item
    }

    pub fn active_construct(&self) -> Option<&Construct> {
        self.active_item.and_then(|item| self.construct(item))
    }

    pub fn active_construct_mut(&mut self) -> Option<&mut Construct> {
        match self.active_item {
            Some(item) => self.construct_mut(item),
            None => None,
        }
    }

    /// Point the active chain at construct `item`. Panics if it is not a construct.
    pub fn set_active_item(&mut self, item: usize) {
        assert!(self.construct(item).is_some(), "item {} is not a construct", item);
        self.active_item = Some(item);
        self.anchor = None;
    }

    /// Absolute x of an offset
    pub fn offset_x(&self, offset: usize) -> f32 {
        let (item, index) = self.locate(offset);
        self.run(item).caret_x(index)
    }

    /// Caret line: x of the caret and the run box it sits in
    pub fn caret_rect(&self) -> Rect {
        let (item, index) = self.locate(self.caret);
        let run = self.run(item);
        Rect::new(run.caret_x(index), run.geometry.top, 0.0, run.geometry.height)
    }

    pub fn caret_location(&self) -> Point {
        self.caret_rect().origin
    }

    /// Rectangles covering the selected range
    pub fn selection_rects(&self) -> Vec<Rect> {
        let Some((start, end)) = self.selection() else {
            return Vec::new();
        };
        let top = self.geometry.top;
        let height = self.geometry.height;
        let mut rects = Vec::new();
        let mut offset = 0;
        for item in &self.items {
            let len = item.unit_len();
            let from = start.max(offset);
            let to = end.min(offset + len);
            if from < to {
                let (left, right) = match item {
                    RowItem::Text(run) => (run.caret_x(from - offset), run.caret_x(to - offset)),
                    RowItem::Construct(construct) => {
                        let g = construct.geometry();
                        (g.left, g.right())
                    }
                };
                rects.push(Rect::new(left, top, right - left, height));
            }
            offset += len;
        }
        rects
    }

    /// Offset whose caret x is closest to `x`
    pub fn nearest_offset(&self, x: f32) -> usize {
        let mut best = (0, f32::MAX);
        let mut base = 0;
        for item in &self.items {
            if let RowItem::Text(run) = item {
                for index in 0..=run.len() {
                    let distance = (run.caret_x(index) - x).abs();
                    if distance < best.1 {
                        best = (base + index, distance);
                    }
                }
            }
            base += item.unit_len();
        }
        best.0
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Take focus, placing the caret according to `entry`
    pub fn enter(&mut self, entry: Entry) {
        self.active_item = None;
        self.anchor = None;
        self.caret = match entry {
            Entry::Start => 0,
            Entry::End => self.len(),
            Entry::AtX(x, _) => self.nearest_offset(x),
        };
    }

    fn enter_item(&mut self, item: usize, entry: Entry) {
        self.anchor = None;
        self.active_item = Some(item);
        if let Some(construct) = self.construct_mut(item) {
            construct.enter(entry);
        }
    }

    fn leave_item(&mut self, caret: usize) {
        self.active_item = None;
        self.anchor = None;
        self.caret = caret;
    }

    fn extend_selection(&mut self, caret: usize) {
        if self.anchor.is_none() {
            self.anchor = Some(self.caret);
        }
        self.caret = caret;
    }

    /// Handle a key offered to this row.
    ///
    /// `from_child` is set when the event bubbled out of the active construct.
    pub fn handle_key(&mut self, event: KeyEvent, from_child: bool) -> Outcome {
        if from_child {
            let Some(item) = self.active_item else {
                return Outcome::Bubble;
            };
            let before = self.item_offset(item);
            return match event.key {
                Key::Left => {
                    self.leave_item(before);
                    Outcome::Handled
                }
                Key::Right => {
                    self.leave_item(before + 1);
                    Outcome::Handled
                }
                _ => Outcome::Bubble,
            };
        }

        let len = self.len();
        match (event.key, event.shift) {
            (Key::Left, true) => {
                self.extend_selection(self.caret.saturating_sub(1));
                Outcome::Handled
            }
            (Key::Right, true) => {
                self.extend_selection((self.caret + 1).min(len));
                Outcome::Handled
            }
            (Key::Home, true) => {
                self.extend_selection(0);
                Outcome::Handled
            }
            (Key::End, true) => {
                self.extend_selection(len);
                Outcome::Handled
            }
            (Key::Home, false) => {
                self.leave_item(0);
                Outcome::Handled
            }
            (Key::End, false) => {
                self.leave_item(len);
                Outcome::Handled
            }
            (Key::Left, false) => {
                if let Some((start, _)) = self.selection() {
                    self.leave_item(start);
                    return Outcome::Handled;
                }
                match self.unit_before(self.caret) {
                    None => Outcome::Bubble,
                    Some(Unit::Construct(item)) => {
                        self.enter_item(item, Entry::End);
                        Outcome::TransferTo(item)
                    }
                    Some(Unit::Char { .. }) => {
                        self.leave_item(self.caret - 1);
                        Outcome::Handled
                    }
                }
            }
            (Key::Right, false) => {
                if let Some((_, end)) = self.selection() {
                    self.leave_item(end);
                    return Outcome::Handled;
                }
                match self.unit_after(self.caret) {
                    None => Outcome::Bubble,
                    Some(Unit::Construct(item)) => {
                        self.enter_item(item, Entry::Start);
                        Outcome::TransferTo(item)
                    }
                    Some(Unit::Char { .. }) => {
                        self.leave_item(self.caret + 1);
                        Outcome::Handled
                    }
                }
            }
            _ => Outcome::Bubble,
        }
    }

    /// Place the caret at a clicked point, descending into a construct that
    /// contains it
    pub fn consume_mouse_click(&mut self, point: Point) {
        for (index, item) in self.items.iter_mut().enumerate() {
            if let RowItem::Construct(construct) = item {
                if construct.geometry().contains(point) && construct.consume_mouse_click(point) {
                    self.active_item = Some(index);
                    self.anchor = None;
                    return;
                }
            }
        }
        let offset = self.nearest_offset(point.x);
        self.leave_item(offset);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Size the row from its items, aligning every item on a common baseline
    pub fn calculate_size(&mut self, ctx: &LayoutContext<'_>) -> BoxExtent {
        let default_format = self.default_format;
        let metrics = MathFontMetrics::for_size(self.font_size);
        let mut extents: Vec<BoxExtent> = Vec::with_capacity(self.items.len());

        for index in 0..self.items.len() {
            let buddy = Self::buddy_extent(&self.items, &extents, index);
            let extent = match &mut self.items[index] {
                RowItem::Text(run) => run.calculate_size(ctx, default_format),
                RowItem::Construct(construct) => construct.calculate_size(ctx, buddy),
            };
            extents.push(extent);
        }

        let ascent = extents.iter().map(|e| e.ref_y).fold(0.0, f32::max);
        let descent = extents.iter().map(|e| e.descent()).fold(0.0, f32::max);

        self.item_offsets.clear();
        let mut x = 0.0;
        for extent in &extents {
            self.item_offsets.push(Point::new(x, ascent - extent.ref_y));
            x += extent.width;
        }

        self.geometry.width = if self.is_empty() {
            metrics.placeholder_width
        } else {
            x
        };
        self.geometry.height = ascent + descent;
        self.geometry.ref_y = ascent;
        self.reposition();
        self.geometry.extent()
    }

    /// Box a script attaches to: the item before it, looking past an empty run
    fn buddy_extent(items: &[RowItem], extents: &[BoxExtent], index: usize) -> BoxExtent {
        if index == 0 {
            return BoxExtent::default();
        }
        let previous_empty = matches!(&items[index - 1], RowItem::Text(run) if run.is_empty());
        if previous_empty && index >= 2 {
            extents[index - 2]
        } else {
            extents[index - 1]
        }
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
        for (item, offset) in self.items.iter_mut().zip(&self.item_offsets) {
            item.set_position(left + offset.x, top + offset.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{ConstructKind, RadicalType};
    use crate::format::Color;
    use text_engine::{ApproxMeasurer, FontStyle, FontType, FontWeight};

    fn table() -> (FormatTable, FormatId) {
        let mut formats = FormatTable::new();
        let id = formats.get_format_id(
            20.0,
            FontType::StixGeneral,
            FontStyle::Italic,
            FontWeight::Normal,
            Color::BLACK,
            false,
        );
        (formats, id)
    }

    fn sqrt(formats: &mut FormatTable, format: FormatId) -> Construct {
        Construct::new(ConstructKind::Radical(RadicalType::SquareRoot), 20.0, 0, format, formats)
    }

    fn is_normal(row: &Row) -> bool {
        let items = row.items();
        matches!(items.first(), Some(RowItem::Text(_)))
            && matches!(items.last(), Some(RowItem::Text(_)))
            && items.windows(2).all(|pair| {
                matches!(
                    pair,
                    [RowItem::Text(_), RowItem::Construct(_)]
                        | [RowItem::Construct(_), RowItem::Text(_)]
                )
            })
    }

    #[test]
    fn test_new_row_is_empty() {
        let (_, format) = table();
        let row = Row::new(20.0, 0, format);
        assert!(row.is_empty());
        assert_eq!(row.items().len(), 1);
        assert!(is_normal(&row));
    }

    #[test]
    fn test_insert_construct_splits_run() {
        let (mut formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "abcd", format);
        let item = row.insert_construct(2, sqrt(&mut formats, format));

        assert_eq!(item, 1);
        assert_eq!(row.items().len(), 3);
        assert_eq!(row.len(), 5);
        assert_eq!(row.text(), "abcd");
        assert!(is_normal(&row));
        assert_eq!(row.unit_after(2), Some(Unit::Construct(1)));
        assert_eq!(row.unit_before(3), Some(Unit::Construct(1)));
        assert_eq!(row.unit_after(3), Some(Unit::Char { item: 2, index: 0 }));
    }

    #[test]
    fn test_remove_range_across_construct_merges_runs() {
        let (mut formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "abcd", format);
        row.insert_construct(2, sqrt(&mut formats, format));

        let removed = row.remove_range(1, 3);
        assert_eq!(row.text(), "ad");
        assert_eq!(row.items().len(), 1);
        assert!(is_normal(&row));

        assert_eq!(removed.len(), 3);
        assert_eq!(removed.text(), "bc");
        assert_eq!(removed.constructs().count(), 1);
        assert!(is_normal(&removed));

        row.insert_fragment(1, removed);
        assert_eq!(row.len(), 5);
        assert_eq!(row.text(), "abcd");
        assert!(is_normal(&row));
    }

    #[test]
    fn test_remove_within_run() {
        let (_, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "hello", format);
        let removed = row.remove_range(1, 3);
        assert_eq!(row.text(), "ho");
        assert_eq!(removed.text(), "ell");
    }

    #[test]
    fn test_split_and_append() {
        let (mut formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "xy", format);
        row.insert_construct(1, sqrt(&mut formats, format));

        let tail = row.split_at(1);
        assert_eq!(row.text(), "x");
        assert_eq!(tail.len(), 2);
        assert!(is_normal(&tail));

        row.append(tail);
        assert_eq!(row.len(), 3);
        assert!(is_normal(&row));
    }

    #[test]
    fn test_merge_adjacent_text_runs() {
        let (mut formats, format) = table();
        let items = vec![
            RowItem::Text(TextRun::from_parts(vec!['a'], vec![format])),
            RowItem::Text(TextRun::from_parts(vec!['b'], vec![format])),
            RowItem::Construct(Box::new(sqrt(&mut formats, format))),
            RowItem::Construct(Box::new(sqrt(&mut formats, format))),
        ];
        let row = Row::from_items(items, 20.0, 0, format);
        assert!(is_normal(&row));
        assert_eq!(row.items().len(), 5);
        assert_eq!(row.text(), "ab");
    }

    #[test]
    fn test_format_for_typing() {
        let (mut formats, format) = table();
        let bold = formats.format_id_for_new_weight(format, FontWeight::Bold);
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "a", bold);
        assert_eq!(row.format_for_typing(1), bold);
        assert_eq!(row.format_for_typing(0), bold);

        let empty = Row::new(20.0, 0, format);
        assert_eq!(empty.format_for_typing(0), format);
    }

    #[test]
    fn test_segments() {
        let (mut formats, format) = table();
        let bold = formats.format_id_for_new_weight(format, FontWeight::Bold);
        let run = TextRun::from_parts(vec!['a', 'b', 'c'], vec![format, format, bold]);
        assert_eq!(run.segments(), vec![(format, 0..2), (bold, 2..3)]);
    }

    #[test]
    fn test_layout_aligns_baselines() {
        let (mut formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "ab", format);
        let item = row.insert_construct(1, sqrt(&mut formats, format));
        row.construct_mut(item)
            .and_then(|c| c.slot_mut(0))
            .map(|slot| slot.active_row_mut().insert_text(0, "x", format));

        let measurer = ApproxMeasurer::new();
        let ctx = LayoutContext::new(&measurer, &formats);
        row.calculate_size(&ctx);
        row.set_position(10.0, 5.0);

        let baseline = row.geometry().baseline();
        for item in row.items() {
            assert!((item.geometry().baseline() - baseline).abs() < 1e-3);
        }
        assert!(row.geometry().width > 0.0);
    }

    #[test]
    fn test_empty_row_placeholder_width() {
        let (formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        let measurer = ApproxMeasurer::new();
        let ctx = LayoutContext::new(&measurer, &formats);
        let extent = row.calculate_size(&ctx);
        assert!((extent.width - 10.0).abs() < 1e-4);
        assert!(extent.height > 0.0);
    }

    #[test]
    fn test_caret_moves_and_enters_construct() {
        let (mut formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "a", format);
        row.insert_construct(1, sqrt(&mut formats, format));
        row.set_caret(0);

        assert_eq!(row.handle_key(KeyEvent::new(Key::Right), false), Outcome::Handled);
        assert_eq!(row.caret(), 1);
        assert_eq!(row.handle_key(KeyEvent::new(Key::Right), false), Outcome::TransferTo(1));
        assert_eq!(row.active_item(), Some(1));

        // Leaving the construct to the right lands after it
        assert_eq!(row.handle_key(KeyEvent::new(Key::Right), true), Outcome::Handled);
        assert_eq!(row.caret(), 2);
        assert_eq!(row.active_item(), None);
        assert_eq!(row.handle_key(KeyEvent::new(Key::Right), false), Outcome::Bubble);
    }

    #[test]
    fn test_shift_selection_skips_constructs() {
        let (mut formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "ab", format);
        row.insert_construct(1, sqrt(&mut formats, format));
        row.set_caret(0);

        row.handle_key(KeyEvent::shifted(Key::Right), false);
        row.handle_key(KeyEvent::shifted(Key::Right), false);
        assert_eq!(row.selection(), Some((0, 2)));
        assert_eq!(row.active_item(), None);

        // Collapsing to the left goes to the selection start
        row.handle_key(KeyEvent::new(Key::Left), false);
        assert_eq!(row.caret(), 0);
        assert_eq!(row.selection(), None);
    }

    #[test]
    fn test_home_end() {
        let (_, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "abc", format);
        row.set_caret(1);
        row.handle_key(KeyEvent::new(Key::End), false);
        assert_eq!(row.caret(), 3);
        row.handle_key(KeyEvent::shifted(Key::Home), false);
        assert_eq!(row.selection(), Some((0, 3)));
    }

    #[test]
    fn test_apply_format_range() {
        let (mut formats, format) = table();
        let bold = formats.format_id_for_new_weight(format, FontWeight::Bold);
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "abcd", format);
        row.apply_format(1, 3, &mut |_| bold);

        let run = match &row.items()[0] {
            RowItem::Text(run) => run,
            RowItem::Construct(_) => panic!("expected text"),
        };
        assert_eq!(run.formats(), &[format, bold, bold, format]);
    }

    #[test]
    fn test_set_font_size_rescales() {
        let (mut formats, format) = table();
        let mut row = Row::new(20.0, 0, format);
        row.insert_text(0, "a", format);
        row.set_font_size(10.0, 1, &mut formats);

        let mut used = BTreeSet::new();
        row.collect_formats(&mut used);
        assert_eq!(used.len(), 1);
        let id = *used.iter().next().unwrap();
        assert_eq!(formats.get(id).font_size, 10.0);
        assert_eq!(row.sub_level(), 1);
    }
}
