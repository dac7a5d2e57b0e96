//! Row container - a vertical list of rows
//!
//! Every construct slot and the document body is a container. Lines are
//! left-aligned and separated by a font-relative gap; the container's
//! baseline follows the same parity rule as a matrix.

use crate::format::{FormatId, FormatTable};
use crate::geometry::{stacked_ref_y, Band, BoxExtent, Geometry, MathFontMetrics, Point};
use crate::layout::LayoutContext;
use crate::navigation::{Entry, Key, KeyEvent, Outcome, VerticalDirection};
use crate::row::Row;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct RowContainer {
    lines: Vec<Row>,
    active_line: usize,
    font_size: f32,
    sub_level: u32,
    geometry: Geometry,
    line_offsets: Vec<Point>,
}

impl RowContainer {
    pub fn new(font_size: f32, sub_level: u32, default_format: FormatId) -> Self {
        Self::from_lines(vec![Row::new(font_size, sub_level, default_format)], font_size, sub_level)
    }

    /// Panics on an empty line list
    pub fn from_lines(lines: Vec<Row>, font_size: f32, sub_level: u32) -> Self {
        assert!(!lines.is_empty(), "a row container needs at least one line");
        Self {
            lines,
            active_line: 0,
            font_size,
            sub_level,
            geometry: Geometry::default(),
            line_offsets: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[Row] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> &Row {
        &self.lines[index]
    }

    pub fn line_mut(&mut self, index: usize) -> &mut Row {
        &mut self.lines[index]
    }

    pub fn get_line(&self, index: usize) -> Option<&Row> {
        self.lines.get(index)
    }

    pub fn get_line_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.lines.get_mut(index)
    }

    pub fn active_line(&self) -> usize {
        self.active_line
    }

    pub fn set_active_line(&mut self, index: usize) {
        assert!(index < self.lines.len(), "line {} out of range", index);
        self.active_line = index;
    }

    pub fn active_row(&self) -> &Row {
        &self.lines[self.active_line]
    }

    pub fn active_row_mut(&mut self) -> &mut Row {
        &mut self.lines[self.active_line]
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

    /// Single empty line
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Text of every line, newline separated
    pub fn text(&self) -> String {
        self.lines.iter().map(Row::text).collect::<Vec<_>>().join("\n")
    }

    // =========================================================================
    // Line editing
    // =========================================================================

    /// Split `line` at `offset`; the caret moves to the start of the new line
    pub fn split_line(&mut self, line: usize, offset: usize) {
        let tail = self.lines[line].split_at(offset);
        self.lines.insert(line + 1, tail);
        self.active_line = line + 1;
        self.lines[line + 1].set_caret(0);
    }

    /// Join the line after `line` onto it. Returns the join offset.
    pub fn merge_lines(&mut self, line: usize) -> usize {
        assert!(line + 1 < self.lines.len(), "no line after {}", line);
        let next = self.lines.remove(line + 1);
        let join = self.lines[line].len();
        self.lines[line].append(next);
        self.active_line = line;
        self.lines[line].set_caret(join);
        join
    }

    pub fn set_font_size(&mut self, font_size: f32, sub_level: u32, formats: &mut FormatTable) {
        self.font_size = font_size;
        self.sub_level = sub_level;
        for line in &mut self.lines {
            line.set_font_size(font_size, sub_level, formats);
        }
    }

    pub fn remap_formats(&mut self, map: &mut dyn FnMut(FormatId) -> FormatId) {
        for line in &mut self.lines {
            line.remap_formats(map);
        }
    }

    pub fn collect_formats(&self, used: &mut BTreeSet<FormatId>) {
        for line in &self.lines {
            line.collect_formats(used);
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn enter(&mut self, entry: Entry) {
        self.active_line = match entry {
            Entry::Start | Entry::AtX(_, VerticalDirection::Down) => 0,
            Entry::End | Entry::AtX(_, VerticalDirection::Up) => self.lines.len() - 1,
        };
        self.lines[self.active_line].enter(entry);
    }

    /// Handle a key that bubbled out of the active line
    pub fn handle_key(&mut self, event: KeyEvent, caret_x: f32) -> Outcome {
        let last = self.lines.len() - 1;
        let (target, entry) = match event.key {
            Key::Up if self.active_line > 0 => {
                (self.active_line - 1, Entry::AtX(caret_x, VerticalDirection::Up))
            }
            Key::Down if self.active_line < last => {
                (self.active_line + 1, Entry::AtX(caret_x, VerticalDirection::Down))
            }
            Key::Left if !event.shift && self.active_line > 0 => (self.active_line - 1, Entry::End),
            Key::Right if !event.shift && self.active_line < last => {
                (self.active_line + 1, Entry::Start)
            }
            _ => return Outcome::Bubble,
        };
        self.active_line = target;
        self.lines[target].enter(entry);
        Outcome::TransferTo(target)
    }

    /// Send a click to the line closest to it vertically
    pub fn consume_mouse_click(&mut self, point: Point) {
        let distance = |row: &Row| {
            let g = row.geometry();
            if point.y < g.top {
                g.top - point.y
            } else if point.y > g.bottom() {
                point.y - g.bottom()
            } else {
                0.0
            }
        };
        let mut best = 0;
        for (index, line) in self.lines.iter().enumerate() {
            if distance(line) < distance(&self.lines[best]) {
                best = index;
            }
        }
        self.active_line = best;
        self.lines[best].consume_mouse_click(point);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub fn calculate_size(&mut self, ctx: &LayoutContext<'_>) -> BoxExtent {
        let metrics = MathFontMetrics::for_size(self.font_size);
        let mut bands = Vec::with_capacity(self.lines.len());
        let mut y = 0.0;
        let mut width: f32 = 0.0;

        for (index, line) in self.lines.iter_mut().enumerate() {
            if index > 0 {
                y += metrics.line_gap;
            }
            let extent = line.calculate_size(ctx);
            bands.push(Band {
                top: y,
                height: extent.height,
                ref_y: extent.ref_y,
            });
            width = width.max(extent.width);
            y += extent.height;
        }

        self.line_offsets = bands.iter().map(|band| Point::new(0.0, band.top)).collect();
        self.geometry.width = width;
        self.geometry.height = y;
        self.geometry.ref_y = stacked_ref_y(&bands, metrics.axis_height);
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
        for (line, offset) in self.lines.iter_mut().zip(&self.line_offsets) {
            line.set_position(left + offset.x, top + offset.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Color;
    use text_engine::{ApproxMeasurer, FontStyle, FontType, FontWeight};

    fn container() -> (FormatTable, RowContainer) {
        let mut formats = FormatTable::new();
        let id = formats.get_format_id(
            20.0,
            FontType::StixGeneral,
            FontStyle::Italic,
            FontWeight::Normal,
            Color::BLACK,
            false,
        );
        let mut container = RowContainer::new(20.0, 0, id);
        container.active_row_mut().insert_text(0, "abcd", id);
        (formats, container)
    }

    #[test]
    fn test_split_and_merge_lines() {
        let (_, mut container) = container();
        container.split_line(0, 2);
        assert_eq!(container.line_count(), 2);
        assert_eq!(container.text(), "ab\ncd");
        assert_eq!(container.active_line(), 1);
        assert_eq!(container.active_row().caret(), 0);

        let join = container.merge_lines(0);
        assert_eq!(join, 2);
        assert_eq!(container.text(), "abcd");
        assert_eq!(container.active_row().caret(), 2);
    }

    #[test]
    fn test_vertical_movement_between_lines() {
        let (_, mut container) = container();
        container.split_line(0, 2);

        let outcome = container.handle_key(KeyEvent::new(Key::Up), 0.0);
        assert_eq!(outcome, Outcome::TransferTo(0));
        assert_eq!(container.active_line(), 0);

        // Nothing above the first line
        assert_eq!(container.handle_key(KeyEvent::new(Key::Up), 0.0), Outcome::Bubble);

        container.active_row_mut().set_caret(2);
        assert_eq!(container.handle_key(KeyEvent::new(Key::Right), 0.0), Outcome::TransferTo(1));
        assert_eq!(container.active_row().caret(), 0);
        assert_eq!(container.handle_key(KeyEvent::new(Key::Left), 0.0), Outcome::TransferTo(0));
        assert_eq!(container.active_row().caret(), 2);
    }

    #[test]
    fn test_single_line_baseline_matches_row() {
        let (formats, mut container) = container();
        let measurer = ApproxMeasurer::new();
        let ctx = LayoutContext::new(&measurer, &formats);
        let extent = container.calculate_size(&ctx);
        assert!((extent.ref_y - container.line(0).geometry().ref_y).abs() < 1e-4);
    }

    #[test]
    fn test_two_lines_stack() {
        let (formats, mut container) = container();
        container.split_line(0, 2);
        let measurer = ApproxMeasurer::new();
        let ctx = LayoutContext::new(&measurer, &formats);
        container.calculate_size(&ctx);
        container.set_position(0.0, 0.0);

        let first = *container.line(0).geometry();
        let second = *container.line(1).geometry();
        assert!(second.top > first.bottom());
        assert_eq!(first.left, second.left);
    }
}
