//! Row paths - addresses of rows inside the node tree
//!
//! Undo actions outlive the borrow of the tree that created them, so they
//! remember where they happened as a path of indices from the body down.
//! Paths stay valid because replay happens in strict reverse order.

use crate::container::RowContainer;
use crate::row::Row;

/// One descent from a container line into a construct slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowStep {
    /// Line of the container holding the construct
    pub line: usize,
    /// Item index of the construct within that line
    pub item: usize,
    /// Slot entered
    pub slot: usize,
}

/// Address of one row: the slot descents followed by a line index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowPath {
    steps: Vec<RowStep>,
    line: usize,
}

impl RowPath {
    pub fn new(steps: Vec<RowStep>, line: usize) -> Self {
        Self { steps, line }
    }

    /// Path of the row holding the caret
    pub fn of_caret(body: &RowContainer) -> Self {
        let mut steps = Vec::new();
        let mut container = body;
        loop {
            let line = container.active_line();
            let row = container.active_row();
            match (row.active_item(), row.active_construct()) {
                (Some(item), Some(construct)) => {
                    steps.push(RowStep {
                        line,
                        item,
                        slot: construct.active_slot_index(),
                    });
                    container = construct.active_slot();
                }
                _ => return Self { steps, line },
            }
        }
    }

    pub fn steps(&self) -> &[RowStep] {
        &self.steps
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Nesting depth in constructs
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Same container, another line
    pub fn with_line(&self, line: usize) -> Self {
        Self {
            steps: self.steps.clone(),
            line,
        }
    }

    pub fn container<'a>(&self, body: &'a RowContainer) -> Option<&'a RowContainer> {
        let mut container = body;
        for step in &self.steps {
            container = container
                .get_line(step.line)?
                .construct(step.item)?
                .slot(step.slot)?;
        }
        Some(container)
    }

    pub fn container_mut<'a>(&self, body: &'a mut RowContainer) -> Option<&'a mut RowContainer> {
        let mut container = body;
        for step in &self.steps {
            container = container
                .get_line_mut(step.line)?
                .construct_mut(step.item)?
                .slot_mut(step.slot)?;
        }
        Some(container)
    }

    pub fn row<'a>(&self, body: &'a RowContainer) -> Option<&'a Row> {
        self.container(body)?.get_line(self.line)
    }

    pub fn row_mut<'a>(&self, body: &'a mut RowContainer) -> Option<&'a mut Row> {
        self.container_mut(body)?.get_line_mut(self.line)
    }

    /// Point the active chain at this row and return it.
    ///
    /// Panics when the path does not address a row of `body`.
    pub fn focus<'a>(&self, body: &'a mut RowContainer) -> &'a mut Row {
        let mut container = body;
        for step in &self.steps {
            container.set_active_line(step.line);
            let row = container.line_mut(step.line);
            row.set_active_item(step.item);
            let construct = match row.construct_mut(step.item) {
                Some(construct) => construct,
                None => panic!("path step {:?} does not reach a construct", step),
            };
            construct.set_active_slot(step.slot);
            container = construct.active_slot_mut();
        }
        container.set_active_line(self.line);
        let row = container.line_mut(self.line);
        let caret = row.caret().min(row.len());
        row.set_caret(caret);
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::{Construct, ConstructKind, RadicalType};
    use crate::format::{Color, FormatTable};
    use crate::navigation::{caret_row, Entry};
    use text_engine::{FontStyle, FontType, FontWeight};

    fn body_with_radical() -> RowContainer {
        let mut formats = FormatTable::new();
        let id = formats.get_format_id(
            20.0,
            FontType::StixGeneral,
            FontStyle::Italic,
            FontWeight::Normal,
            Color::BLACK,
            false,
        );
        let mut body = RowContainer::new(20.0, 0, id);
        let construct = Construct::new(
            ConstructKind::Radical(RadicalType::NRoot),
            20.0,
            0,
            id,
            &mut formats,
        );
        let row = body.active_row_mut();
        row.insert_text(0, "ab", id);
        let item = row.insert_construct(1, construct);
        row.set_active_item(item);
        if let Some(construct) = row.active_construct_mut() {
            construct.enter(Entry::Start);
        }
        body
    }

    #[test]
    fn test_path_of_body_caret() {
        let mut formats = FormatTable::new();
        let id = formats.intern(crate::format::TextFormat::new(20.0, FontType::StixGeneral));
        let body = RowContainer::new(20.0, 0, id);
        let path = RowPath::of_caret(&body);
        assert_eq!(path.depth(), 0);
        assert_eq!(path.line(), 0);
    }

    #[test]
    fn test_path_into_construct() {
        let body = body_with_radical();
        let path = RowPath::of_caret(&body);
        assert_eq!(path.depth(), 1);
        assert_eq!(path.steps()[0], RowStep { line: 0, item: 1, slot: RadicalType::INDEX });
        let row = path.row(&body).unwrap();
        assert!(std::ptr::eq(row, caret_row(&body)));
    }

    #[test]
    fn test_focus_restores_chain() {
        let mut body = body_with_radical();
        let path = RowPath::of_caret(&body);
        body.active_row_mut().set_caret(0);
        assert_eq!(RowPath::of_caret(&body).depth(), 0);

        path.focus(&mut body);
        assert_eq!(RowPath::of_caret(&body), path);
    }

    #[test]
    fn test_bad_path_resolves_to_none() {
        let mut body = body_with_radical();
        let path = RowPath::new(vec![RowStep { line: 0, item: 0, slot: 0 }], 0);
        assert!(path.row(&body).is_none());
        assert!(path.container_mut(&mut body).is_none());
        assert!(RowPath::new(Vec::new(), 3).row(&body).is_none());
    }
}
