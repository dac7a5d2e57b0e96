//! Equation actions - reversible edit records
//!
//! Every mutation of the node tree made by [`EquationRoot`](crate::EquationRoot)
//! is recorded as an [`EquationAction`]: where it happened (a [`RowPath`] and
//! an offset) and enough of the removed or inserted content to run it in
//! either direction. The [`Document`] is the executor the undo log replays
//! them through.

use crate::container::RowContainer;
use crate::format::FormatId;
use crate::path::RowPath;
use crate::root::Document;
use crate::row::Row;
use edit_engine::{ActionExecutor, UndoAction};

/// What an action did
#[derive(Debug, Clone)]
pub enum EditKind {
    /// Characters typed at the offset
    InsertText { chars: Vec<char>, formats: Vec<FormatId> },
    /// Items inserted at the offset (a construct, or pasted content)
    InsertFragment { fragment: Row },
    /// Items removed from the offset
    RemoveRange { removed: Row },
    /// The range at the offset restyled from `before` to `after`
    FormatChange { before: Row, after: Row },
    /// Line split at the offset
    SplitLine,
    /// The next line joined at the offset. `backward` when the caret started
    /// on the lower line.
    MergeLine { backward: bool },
}

/// A recorded edit
#[derive(Debug, Clone)]
pub struct EquationAction {
    path: RowPath,
    offset: usize,
    edit: EditKind,
    caret_before: usize,
    anchor_before: Option<usize>,
    further_undo_count: usize,
    undo_flag: bool,
}

impl EquationAction {
    pub fn new(path: RowPath, offset: usize, edit: EditKind) -> Self {
        Self {
            path,
            offset,
            edit,
            caret_before: offset,
            anchor_before: None,
            further_undo_count: 0,
            undo_flag: true,
        }
    }

    /// Caret and selection anchor to restore when the action is reversed
    pub fn with_caret_before(mut self, caret: usize, anchor: Option<usize>) -> Self {
        self.caret_before = caret;
        self.anchor_before = anchor;
        self
    }

    pub fn path(&self) -> &RowPath {
        &self.path
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn edit(&self) -> &EditKind {
        &self.edit
    }
}

impl UndoAction for EquationAction {
    fn further_undo_count(&self) -> usize {
        self.further_undo_count
    }

    fn set_further_undo_count(&mut self, count: usize) {
        self.further_undo_count = count;
    }

    fn undo_flag(&self) -> bool {
        self.undo_flag
    }

    fn set_undo_flag(&mut self, flag: bool) {
        self.undo_flag = flag;
    }

    fn name(&self) -> &'static str {
        match self.edit {
            EditKind::InsertText { .. } => "insert text",
            EditKind::InsertFragment { .. } => "insert fragment",
            EditKind::RemoveRange { .. } => "remove range",
            EditKind::FormatChange { .. } => "format change",
            EditKind::SplitLine => "split line",
            EditKind::MergeLine { .. } => "merge line",
        }
    }
}

// =============================================================================
// Replay
// =============================================================================

impl ActionExecutor<EquationAction> for Document {
    fn process_undo(&mut self, action: &EquationAction) {
        tracing::debug!(
            action = action.name(),
            offset = action.offset,
            depth = action.path.depth(),
            reverse = action.undo_flag,
            "processing action"
        );
        if action.undo_flag {
            self.reverse(action);
        } else {
            self.reapply(action);
        }
    }
}

impl Document {
    fn reverse(&mut self, action: &EquationAction) {
        let offset = action.offset;
        match &action.edit {
            EditKind::InsertText { chars, .. } => {
                let row = action.path.focus(&mut self.body);
                row.remove_range(offset, chars.len());
                restore_caret(row, action);
            }
            EditKind::InsertFragment { fragment } => {
                let row = action.path.focus(&mut self.body);
                row.remove_range(offset, fragment.len());
                restore_caret(row, action);
            }
            EditKind::RemoveRange { removed } => {
                let row = action.path.focus(&mut self.body);
                row.insert_fragment(offset, removed.clone());
                restore_caret(row, action);
            }
            EditKind::FormatChange { before, after } => {
                let row = action.path.focus(&mut self.body);
                row.remove_range(offset, after.len());
                row.insert_fragment(offset, before.clone());
                restore_caret(row, action);
            }
            EditKind::SplitLine => {
                action.path.focus(&mut self.body);
                self.container_at(&action.path).merge_lines(action.path.line());
            }
            EditKind::MergeLine { backward } => {
                action.path.focus(&mut self.body);
                let line = action.path.line();
                let container = self.container_at(&action.path);
                container.split_line(line, offset);
                if !backward {
                    container.set_active_line(line);
                    container.line_mut(line).set_caret(offset);
                }
            }
        }
    }

    fn reapply(&mut self, action: &EquationAction) {
        let offset = action.offset;
        match &action.edit {
            EditKind::InsertText { chars, formats } => {
                let row = action.path.focus(&mut self.body);
                row.insert_chars(offset, chars, formats);
                row.set_caret(offset + chars.len());
            }
            EditKind::InsertFragment { fragment } => {
                let row = action.path.focus(&mut self.body);
                row.insert_fragment(offset, fragment.clone());
                row.set_caret(offset + fragment.len());
            }
            EditKind::RemoveRange { removed } => {
                let row = action.path.focus(&mut self.body);
                row.remove_range(offset, removed.len());
                row.set_caret(offset);
            }
            EditKind::FormatChange { before, after } => {
                let row = action.path.focus(&mut self.body);
                row.remove_range(offset, before.len());
                row.insert_fragment(offset, after.clone());
                row.select(offset, offset + after.len());
            }
            EditKind::SplitLine => {
                action.path.focus(&mut self.body);
                self.container_at(&action.path)
                    .split_line(action.path.line(), offset);
            }
            EditKind::MergeLine { .. } => {
                action.path.focus(&mut self.body);
                self.container_at(&action.path)
                    .merge_lines(action.path.line());
            }
        }
    }

    pub(crate) fn container_at(&mut self, path: &RowPath) -> &mut RowContainer {
        match path.container_mut(&mut self.body) {
            Some(container) => container,
            None => panic!("action path {:?} does not address a container", path),
        }
    }
}

fn restore_caret(row: &mut Row, action: &EquationAction) {
    match action.anchor_before {
        Some(anchor) => row.select(anchor, action.caret_before),
        None => row.set_caret(action.caret_before),
    }
}
