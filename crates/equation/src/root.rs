//! Equation Root - the editable document and its command surface
//!
//! [`EquationRoot`] owns one document (body container plus format table),
//! its undo log, the measurement service and the LaTeX writer. Every user
//! command goes through it: the command mutates the caret row, records an
//! [`EquationAction`] and re-runs layout.

use crate::action::{EditKind, EquationAction};
use crate::clipboard::{export_fragment, import_fragment, ClipboardData};
use crate::construct::{Construct, ConstructKind, MatrixType};
use crate::container::RowContainer;
use crate::error::{EquationError, EquationResult};
use crate::format::{Color, FormatId, FormatTable, TextFormat};
use crate::geometry::Point;
use crate::latex::{container_to_latex, DefaultLatexWriter, LatexWriter};
use crate::layout::LayoutContext;
use crate::navigation::{self, caret_row, caret_row_mut, Entry, Key, KeyEvent};
use crate::path::RowPath;
use crate::render::{RenderOutput, Renderer};
use crate::row::Row;
use crate::settings::EditorSettings;
use crate::xml_parser::parse_document;
use crate::xml_writer::to_xml;
use edit_engine::{UndoLog, UndoStateChange};
use std::collections::BTreeSet;
use text_engine::{FontStyle, FontType, FontWeight, TextMeasurer};

// =============================================================================
// Document
// =============================================================================

/// The state undo and redo act on: the body and the formats it references
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) body: RowContainer,
    pub(crate) formats: FormatTable,
}

impl Document {
    /// An empty document typed in `format`
    pub fn new(format: TextFormat) -> Self {
        let font_size = format.font_size;
        let mut formats = FormatTable::new();
        let id = formats.intern(format);
        Self {
            body: RowContainer::new(font_size, 0, id),
            formats,
        }
    }

    pub fn from_parts(body: RowContainer, formats: FormatTable) -> Self {
        Self { body, formats }
    }

    pub fn body(&self) -> &RowContainer {
        &self.body
    }

    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }
}

// =============================================================================
// Equation Root
// =============================================================================

/// An equation being edited
pub struct EquationRoot {
    document: Document,
    undo: UndoLog<EquationAction>,
    measurer: Box<dyn TextMeasurer>,
    latex: Box<dyn LatexWriter>,
    settings: EditorSettings,
}

impl EquationRoot {
    /// Create with default settings
    pub fn new(measurer: Box<dyn TextMeasurer>) -> Self {
        Self::with_settings(EditorSettings::default(), measurer)
    }

    pub fn with_settings(settings: EditorSettings, measurer: Box<dyn TextMeasurer>) -> Self {
        let settings = settings.sanitized();
        let mut root = Self {
            document: Document::new(settings.default_format()),
            undo: UndoLog::with_limit(settings.undo_limit),
            measurer,
            latex: Box::new(DefaultLatexWriter),
            settings,
        };
        root.recalculate();
        root
    }

    /// Replace the LaTeX writer used by [`EquationRoot::to_latex`] and copy
    pub fn with_latex_writer(mut self, latex: Box<dyn LatexWriter>) -> Self {
        self.latex = latex;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn body(&self) -> &RowContainer {
        &self.document.body
    }

    pub fn formats(&self) -> &FormatTable {
        &self.document.formats
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// The row holding the caret
    pub fn caret_row(&self) -> &Row {
        caret_row(&self.document.body)
    }

    // =========================================================================
    // Caret and selection
    // =========================================================================

    /// Offer a key to the document. Editing keys change the tree; the rest
    /// move the caret. Returns false when nothing happened.
    pub fn consume_key(&mut self, event: KeyEvent) -> bool {
        match event.key {
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Enter => self.split_line(),
            _ => navigation::consume_key(&mut self.document.body, event),
        }
    }

    /// Place the caret at a point in document coordinates
    pub fn consume_mouse_click(&mut self, point: Point) -> bool {
        navigation::consume_mouse_click(&mut self.document.body, point)
    }

    /// Move the caret within the caret row
    pub fn set_caret(&mut self, offset: usize) -> EquationResult<()> {
        let row = caret_row_mut(&mut self.document.body);
        check_offset(row, offset)?;
        row.set_caret(offset);
        Ok(())
    }

    /// Select a range of the caret row
    pub fn select(&mut self, anchor: usize, caret: usize) -> EquationResult<()> {
        let row = caret_row_mut(&mut self.document.body);
        check_offset(row, anchor)?;
        check_offset(row, caret)?;
        row.select(anchor, caret);
        Ok(())
    }

    pub fn select_all(&mut self) {
        caret_row_mut(&mut self.document.body).select_all();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Type text at the caret, replacing the selection
    pub fn type_text(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().filter(|c| !c.is_control()).collect();
        if chars.is_empty() {
            return;
        }
        let grouped = self.remove_selection();

        let path = RowPath::of_caret(&self.document.body);
        let row = caret_row_mut(&mut self.document.body);
        let offset = row.caret();
        let format = row.format_for_typing(offset);
        let formats = vec![format; chars.len()];
        row.insert_chars(offset, &chars, &formats);
        row.set_caret(offset + chars.len());

        let action = EquationAction::new(path, offset, EditKind::InsertText { chars, formats });
        self.record(action, grouped);
        self.recalculate();
    }

    /// Insert a construct at the caret and move into its first slot
    pub fn insert_construct(&mut self, kind: ConstructKind) {
        let grouped = self.remove_selection();

        let path = RowPath::of_caret(&self.document.body);
        let row = caret_row_mut(&mut self.document.body);
        let offset = row.caret();
        let format = row.format_for_typing(offset);
        let construct = Construct::new(
            kind,
            row.font_size(),
            row.sub_level(),
            format,
            &mut self.document.formats,
        );

        let mut fragment = Row::new(row.font_size(), row.sub_level(), row.default_format());
        fragment.insert_construct(0, construct.clone());
        let item = row.insert_construct(offset, construct);
        row.set_caret(offset + 1);
        row.set_active_item(item);
        if let Some(inserted) = row.construct_mut(item) {
            inserted.enter(Entry::Start);
        }

        tracing::debug!(construct = kind.type_name(), offset, "inserted construct");
        let action = EquationAction::new(path, offset, EditKind::InsertFragment { fragment });
        self.record(action, grouped);
        self.recalculate();
    }

    /// Insert a matrix with the configured default shape
    pub fn insert_matrix(&mut self) {
        let defaults = self.settings.matrix_defaults;
        let shape = MatrixType::new(defaults.rows, defaults.columns);
        self.insert_construct(ConstructKind::Matrix(shape));
    }

    /// Delete the selection, or the unit before the caret, or join with the
    /// previous line
    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let path = RowPath::of_caret(&self.document.body);
        let row = caret_row_mut(&mut self.document.body);
        let caret = row.caret();

        let action = if caret > 0 {
            let removed = row.remove_range(caret - 1, 1);
            row.set_caret(caret - 1);
            EquationAction::new(path, caret - 1, EditKind::RemoveRange { removed })
                .with_caret_before(caret, None)
        } else if path.line() > 0 {
            let line = path.line() - 1;
            let join = self.document.container_at(&path).merge_lines(line);
            EquationAction::new(path.with_line(line), join, EditKind::MergeLine { backward: true })
                .with_caret_before(0, None)
        } else {
            return false;
        };

        self.record(action, false);
        self.recalculate();
        true
    }

    /// Delete the selection, or the unit after the caret, or pull up the
    /// next line
    pub fn delete(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let path = RowPath::of_caret(&self.document.body);
        let row = caret_row_mut(&mut self.document.body);
        let caret = row.caret();

        let action = if caret < row.len() {
            let removed = row.remove_range(caret, 1);
            row.set_caret(caret);
            EquationAction::new(path, caret, EditKind::RemoveRange { removed })
        } else {
            let container = self.document.container_at(&path);
            if path.line() + 1 >= container.line_count() {
                return false;
            }
            let join = container.merge_lines(path.line());
            EquationAction::new(path, join, EditKind::MergeLine { backward: false })
        };

        self.record(action, false);
        self.recalculate();
        true
    }

    /// Split the caret row into two lines at the caret
    pub fn split_line(&mut self) -> bool {
        let grouped = self.remove_selection();
        let path = RowPath::of_caret(&self.document.body);
        let offset = caret_row(&self.document.body).caret();
        self.document.container_at(&path).split_line(path.line(), offset);

        self.record(EquationAction::new(path, offset, EditKind::SplitLine), grouped);
        self.recalculate();
        true
    }

    /// Remove the selected range. Returns false when nothing was selected.
    pub fn delete_selection(&mut self) -> bool {
        let removed = self.remove_selection();
        if removed {
            self.recalculate();
        }
        removed
    }

    /// Remove and record the selection without re-running layout
    fn remove_selection(&mut self) -> bool {
        let path = RowPath::of_caret(&self.document.body);
        let row = caret_row_mut(&mut self.document.body);
        let Some((start, end)) = row.selection() else {
            return false;
        };
        let caret = row.caret();
        let anchor = row.anchor();
        let removed = row.remove_range(start, end - start);
        row.set_caret(start);

        self.record(
            EquationAction::new(path, start, EditKind::RemoveRange { removed })
                .with_caret_before(caret, anchor),
            false,
        );
        true
    }

    /// Push an action, grouping it with the one below when `grouped`
    fn record(&mut self, action: EquationAction, grouped: bool) {
        self.undo.add(action);
        if grouped {
            self.undo.change_undo_count_of_last_action(1);
        }
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    /// Scale the selected text so the caret row's size becomes `font_size`;
    /// size differences inside the selection are kept
    pub fn set_font_size(&mut self, font_size: f32) -> bool {
        if !(font_size.is_finite() && font_size > 0.0) {
            return false;
        }
        let row_size = caret_row(&self.document.body).font_size();
        let ratio = font_size / row_size;
        self.change_format(&mut |formats, id| {
            let size = formats.get(id).font_size * ratio;
            formats.format_id_for_new_size(id, size)
        })
    }

    pub fn set_font_type(&mut self, font_type: FontType) -> bool {
        self.change_format(&mut |formats, id| formats.format_id_for_new_font(id, font_type))
    }

    pub fn set_font_style(&mut self, font_style: FontStyle) -> bool {
        self.change_format(&mut |formats, id| formats.format_id_for_new_style(id, font_style))
    }

    pub fn set_font_weight(&mut self, font_weight: FontWeight) -> bool {
        self.change_format(&mut |formats, id| formats.format_id_for_new_weight(id, font_weight))
    }

    pub fn set_color(&mut self, color: Color) -> bool {
        self.change_format(&mut |formats, id| formats.format_id_for_new_color(id, color))
    }

    pub fn set_underline(&mut self, underline: bool) -> bool {
        self.change_format(&mut |formats, id| formats.format_id_for_new_underline(id, underline))
    }

    /// Restyle the selection. Returns false when nothing is selected.
    fn change_format(
        &mut self,
        map: &mut dyn FnMut(&mut FormatTable, FormatId) -> FormatId,
    ) -> bool {
        let path = RowPath::of_caret(&self.document.body);
        let formats = &mut self.document.formats;
        let row = caret_row_mut(&mut self.document.body);
        let Some((start, end)) = row.selection() else {
            return false;
        };
        let caret = row.caret();
        let anchor = row.anchor();

        let before = row.copy_range(start, end - start);
        row.apply_format(start, end, &mut |id| map(formats, id));
        let after = row.copy_range(start, end - start);

        self.record(
            EquationAction::new(path, start, EditKind::FormatChange { before, after })
                .with_caret_before(caret, anchor),
            false,
        );
        self.recalculate();
        true
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Serialize the selection. None when nothing is selected.
    pub fn copy(&self) -> EquationResult<Option<ClipboardData>> {
        let row = caret_row(&self.document.body);
        let Some((start, end)) = row.selection() else {
            return Ok(None);
        };
        let fragment = row.copy_range(start, end - start);
        export_fragment(&fragment, &self.document.formats, self.latex.as_ref()).map(Some)
    }

    /// Copy the selection, then delete it
    pub fn cut(&mut self) -> EquationResult<Option<ClipboardData>> {
        let data = self.copy()?;
        if data.is_some() {
            self.delete_selection();
        }
        Ok(data)
    }

    /// Insert clipboard content at the caret, replacing the selection.
    ///
    /// The fragment is parsed and its formats merged before the tree is
    /// touched, so a malformed fragment leaves the document unchanged.
    pub fn paste(&mut self, data: &ClipboardData) -> EquationResult<()> {
        let mut fragment = import_fragment(&data.xml, &mut self.document.formats)?;
        if fragment.is_empty() {
            return Ok(());
        }
        let grouped = self.remove_selection();

        let path = RowPath::of_caret(&self.document.body);
        let row = caret_row_mut(&mut self.document.body);
        let offset = row.caret();
        fragment.set_font_size(row.font_size(), row.sub_level(), &mut self.document.formats);
        let len = fragment.len();
        row.insert_fragment(offset, fragment.clone());
        row.set_caret(offset + len);

        tracing::debug!(offset, units = len, "pasted fragment");
        let action = EquationAction::new(path, offset, EditKind::InsertFragment { fragment });
        self.record(action, grouped);
        self.recalculate();
        Ok(())
    }

    // =========================================================================
    // Undo
    // =========================================================================

    pub fn undo(&mut self) -> bool {
        let done = self.undo.undo(&mut self.document);
        if done {
            self.recalculate();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.undo.redo(&mut self.document);
        if done {
            self.recalculate();
        }
        done
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Register a callback for undo/redo availability changes
    pub fn on_undo_state_change(&mut self, listener: impl FnMut(UndoStateChange) + 'static) {
        self.undo.on_state_change(listener);
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serialize the document with only the formats it references.
    ///
    /// The format table is compacted for the duration of the write and put
    /// back afterwards, whether or not the write succeeded.
    pub fn save_xml(&mut self) -> EquationResult<String> {
        let Document { body, formats } = &mut self.document;
        let mut used = BTreeSet::new();
        body.collect_formats(&mut used);

        let saved = formats.optimize_for_save(&used);
        body.remap_formats(&mut |id| saved.forward(id));
        let result = to_xml(body, formats.formats());

        let reverse = saved.reverse();
        body.remap_formats(&mut |id| reverse.get(&id).copied().unwrap_or(id));
        formats.restore_after_save(saved);
        result
    }

    /// Replace the document with a saved one. On error the current document
    /// is kept.
    pub fn load_xml(&mut self, xml: &str) -> EquationResult<()> {
        let parsed = match parse_document(xml) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Failed to load equation document: {}", e);
                return Err(e);
            }
        };

        // Equal entries in the stored table collapse to one id
        let mut formats = FormatTable::new();
        let mapping = formats.merge_formats(&parsed.formats);
        let mut body = parsed.body;
        body.remap_formats(&mut |id| mapping[id.0]);

        self.undo.set_enabled(false);
        self.document = Document::from_parts(body, formats);
        self.undo.clear();
        self.undo.set_enabled(true);
        self.recalculate();
        Ok(())
    }

    // =========================================================================
    // Output
    // =========================================================================

    pub fn to_latex(&self) -> String {
        container_to_latex(&self.document.body, self.latex.as_ref())
    }

    /// Display list of the current layout
    pub fn render(&self) -> RenderOutput {
        Renderer::new().render(&self.document.body, &self.document.formats)
    }

    pub fn render_with(&self, renderer: &Renderer) -> RenderOutput {
        renderer.render(&self.document.body, &self.document.formats)
    }

    /// Re-run layout over the whole tree, placing the body at the origin
    pub fn recalculate(&mut self) {
        let ctx = LayoutContext::new(self.measurer.as_ref(), &self.document.formats);
        self.document.body.calculate_size(&ctx);
        self.document.body.set_position(0.0, 0.0);
    }
}

fn check_offset(row: &Row, offset: usize) -> EquationResult<()> {
    if offset > row.len() {
        return Err(EquationError::InvalidPosition(format!(
            "offset {} past end of row of length {}",
            offset,
            row.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{RadicalType, ScriptType};
    use crate::settings::MatrixDefaults;
    use std::cell::RefCell;
    use std::rc::Rc;
    use text_engine::ApproxMeasurer;

    fn root() -> EquationRoot {
        EquationRoot::new(Box::new(ApproxMeasurer::new()))
    }

    #[test]
    fn test_type_and_undo() {
        let mut root = root();
        root.type_text("ab");
        root.type_text("c");
        assert_eq!(root.body().text(), "abc");
        assert!(root.undo());
        assert_eq!(root.body().text(), "ab");
        assert!(root.redo());
        assert_eq!(root.body().text(), "abc");
    }

    #[test]
    fn test_control_characters_are_ignored() {
        let mut root = root();
        root.type_text("\n\t");
        assert_eq!(root.body().text(), "");
        assert!(!root.can_undo());
    }

    #[test]
    fn test_typing_replaces_selection_in_one_step() {
        let mut root = root();
        root.type_text("abcd");
        root.select(1, 3).unwrap();
        root.type_text("x");
        assert_eq!(root.body().text(), "axd");

        assert!(root.undo());
        assert_eq!(root.body().text(), "abcd");
        assert_eq!(root.caret_row().selection(), Some((1, 3)));
    }

    #[test]
    fn test_insert_construct_enters_first_slot() {
        let mut root = root();
        root.insert_construct(ConstructKind::Radical(RadicalType::NRoot));
        root.type_text("3");
        let radical = match root.body().line(0).construct(1) {
            Some(construct) => construct,
            None => panic!("radical missing"),
        };
        assert_eq!(radical.slot(RadicalType::INDEX).map(|s| s.text()), Some("3".to_string()));
    }

    #[test]
    fn test_backspace_removes_construct_whole() {
        let mut root = root();
        root.type_text("a");
        root.insert_construct(ConstructKind::Script(ScriptType::Sub));
        root.consume_key(KeyEvent::new(Key::Right));
        assert_eq!(root.caret_row().caret(), 2);
        assert!(root.backspace());
        assert_eq!(root.body().line(0).constructs().count(), 0);
        assert!(root.undo());
        assert_eq!(root.body().line(0).constructs().count(), 1);
    }

    #[test]
    fn test_enter_and_backspace_join_lines() {
        let mut root = root();
        root.type_text("abcd");
        root.set_caret(2).unwrap();
        assert!(root.consume_key(KeyEvent::new(Key::Enter)));
        assert_eq!(root.body().text(), "ab\ncd");
        assert!(root.consume_key(KeyEvent::new(Key::Backspace)));
        assert_eq!(root.body().text(), "abcd");
        assert_eq!(root.caret_row().caret(), 2);
        assert!(root.undo());
        assert_eq!(root.body().line_count(), 2);
    }

    #[test]
    fn test_delete_at_end_pulls_next_line() {
        let mut root = root();
        root.type_text("ab");
        root.split_line();
        root.type_text("cd");
        root.consume_key(KeyEvent::new(Key::Up));
        let line = root.body().active_line();
        assert_eq!(line, 0);
        root.set_caret(2).unwrap();
        assert!(root.delete());
        assert_eq!(root.body().text(), "abcd");
        root.set_caret(4).unwrap();
        assert!(!root.delete());
        assert!(root.undo());
        assert_eq!(root.body().text(), "ab\ncd");
        assert_eq!(root.body().active_line(), 0);
    }

    #[test]
    fn test_format_change_is_undoable() {
        let mut root = root();
        root.type_text("ab");
        root.select(0, 1).unwrap();
        assert!(root.set_font_weight(FontWeight::Bold));
        assert_eq!(root.body().text(), "ab");
        assert_eq!(root.caret_row().selection(), Some((0, 1)));
        assert!(root.save_xml().unwrap().contains("fontWeight=\"Bold\""));

        assert!(root.undo());
        assert!(!root.save_xml().unwrap().contains("fontWeight=\"Bold\""));
        assert_eq!(root.caret_row().selection(), Some((0, 1)));
    }

    #[test]
    fn test_set_font_size_scales_selection() {
        let mut root = root();
        root.type_text("ab");
        root.select_all();
        assert!(root.set_font_size(40.0));
        let xml = root.save_xml().unwrap();
        assert!(xml.contains("fontSize=\"40\""));
        assert!(!root.set_font_size(-1.0));
    }

    #[test]
    fn test_copy_paste() {
        let mut root = root();
        root.type_text("xy");
        assert!(root.copy().unwrap().is_none());
        root.select_all();
        let data = root.copy().unwrap().unwrap();
        assert_eq!(data.latex, "xy");
        root.set_caret(2).unwrap();
        root.paste(&data).unwrap();
        assert_eq!(root.body().text(), "xyxy");
        assert!(root.undo());
        assert_eq!(root.body().text(), "xy");
    }

    #[test]
    fn test_cut() {
        let mut root = root();
        root.type_text("xyz");
        root.select(0, 2).unwrap();
        let data = root.cut().unwrap().unwrap();
        assert_eq!(data.latex, "xy");
        assert_eq!(root.body().text(), "z");
    }

    #[test]
    fn test_bad_paste_leaves_document() {
        let mut root = root();
        root.type_text("q");
        let data = ClipboardData {
            xml: "<EquationFragment version=\"1.0\"><Bogus/>".to_string(),
            latex: String::new(),
        };
        assert!(root.paste(&data).is_err());
        assert_eq!(root.body().text(), "q");
        assert_eq!(root.formats().len(), 1);
    }

    #[test]
    fn test_save_restores_format_table() {
        let mut root = root();
        root.type_text("ab");
        root.select_all();
        root.set_color(Color::RED);
        root.set_color(Color::BLUE);
        let count = root.formats().len();
        let xml = root.save_xml().unwrap();
        assert_eq!(root.formats().len(), count);
        assert_eq!(xml.matches("<Format ").count(), 2);
    }

    #[test]
    fn test_load_replaces_document_and_clears_history() {
        let mut source = root();
        source.type_text("z");
        source.insert_construct(ConstructKind::Script(ScriptType::Super));
        source.type_text("2");
        let xml = source.save_xml().unwrap();

        let mut target = root();
        target.type_text("old");
        target.load_xml(&xml).unwrap();
        assert_eq!(target.to_latex(), source.to_latex());
        assert!(!target.can_undo());

        assert!(target.load_xml("<EquationRoot").is_err());
        assert_eq!(target.to_latex(), source.to_latex());
    }

    #[test]
    fn test_invalid_caret_position() {
        let mut root = root();
        root.type_text("ab");
        assert!(matches!(root.set_caret(5), Err(EquationError::InvalidPosition(_))));
        assert!(root.select(0, 9).is_err());
    }

    #[test]
    fn test_undo_state_notifications() {
        let mut root = root();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        root.on_undo_state_change(move |change| sink.borrow_mut().push(change));
        root.type_text("a");
        root.undo();
        assert!(!seen.borrow().is_empty());
    }

    #[test]
    fn test_settings_drive_defaults() {
        let mut settings = EditorSettings::default();
        settings.font_size = 12.0;
        settings.undo_limit = 2;
        settings.matrix_defaults.rows = 3;
        let mut root = EquationRoot::with_settings(settings, Box::new(ApproxMeasurer::new()));
        assert_eq!(root.body().font_size(), 12.0);

        root.insert_matrix();
        let cells = root.body().line(0).construct(1).map(|m| m.slots().len());
        assert_eq!(cells, Some(6));

        root.undo();
        root.type_text("a");
        root.type_text("b");
        root.type_text("c");
        assert!(root.undo());
        assert!(root.undo());
        assert!(!root.undo());
    }

    #[test]
    fn test_out_of_range_settings_are_replaced() {
        let mut settings = EditorSettings::default();
        settings.font_size = 0.0;
        settings.undo_limit = 0;
        settings.matrix_defaults.rows = 0;
        let mut root = EquationRoot::with_settings(settings, Box::new(ApproxMeasurer::new()));
        assert_eq!(root.settings().matrix_defaults, MatrixDefaults::default());
        assert_eq!(root.body().font_size(), 20.0);

        root.insert_matrix();
        let cells = root.body().line(0).construct(1).map(|m| m.slots().len());
        assert_eq!(cells, Some(4));
        assert!(root.undo());
    }

    #[test]
    fn test_render_after_edit() {
        let mut root = root();
        root.type_text("a");
        let output = root.render();
        assert!(!output.primitives.is_empty());
        assert!(output.bounds.width() > 0.0);
    }
}
