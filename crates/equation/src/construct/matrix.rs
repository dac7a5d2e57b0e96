//! Matrix - a rows x columns grid of cells
//!
//! Cells are stored row-major. Column widths and row ascents/descents are
//! maximized across each column and row; cells are centered horizontally
//! and share a baseline within their row.

use super::{param, Arrangement, LayoutInput, Params, SlotScale};
use crate::error::{EquationError, EquationResult};
use crate::geometry::{stacked_ref_y, Band, BoxExtent, Point};
use crate::navigation::Key;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixType {
    pub rows: usize,
    pub columns: usize,
}

impl MatrixType {
    /// Panics on an empty grid
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(rows > 0 && columns > 0, "matrix needs at least one cell");
        Self { rows, columns }
    }

    pub fn cell(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    pub(super) fn params(&self) -> Params {
        vec![("rows", self.rows.to_string()), ("columns", self.columns.to_string())]
    }

    pub(super) fn from_params(params: &HashMap<String, String>) -> EquationResult<Self> {
        let count = |key| -> EquationResult<usize> {
            let value = param(params, key)?;
            match value.parse::<usize>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(EquationError::Deserialize(format!("invalid matrix {}: {}", key, value))),
            }
        };
        Ok(Self::new(count("rows")?, count("columns")?))
    }

    pub(super) fn slot_scales(&self) -> Vec<SlotScale> {
        vec![SlotScale::Same; self.rows * self.columns]
    }

    pub(super) fn navigate(&self, slot: usize, key: Key) -> Option<usize> {
        let (row, column) = (slot / self.columns, slot % self.columns);
        match key {
            Key::Left if column > 0 => Some(slot - 1),
            Key::Right if column + 1 < self.columns => Some(slot + 1),
            Key::Up if row > 0 => Some(slot - self.columns),
            Key::Down if row + 1 < self.rows => Some(slot + self.columns),
            _ => None,
        }
    }

    /// Entered from the right at the end of the first row
    pub(super) fn last_slot(&self) -> usize {
        self.columns - 1
    }

    pub(super) fn layout(&self, input: &LayoutInput<'_>) -> Arrangement {
        let m = &input.metrics;
        let cells = input.slots;

        let mut widths = vec![0.0f32; self.columns];
        let mut ascents = vec![0.0f32; self.rows];
        let mut descents = vec![0.0f32; self.rows];
        for (index, cell) in cells.iter().enumerate() {
            let (row, column) = (index / self.columns, index % self.columns);
            widths[column] = widths[column].max(cell.width);
            ascents[row] = ascents[row].max(cell.ref_y);
            descents[row] = descents[row].max(cell.descent());
        }

        let mut lefts = Vec::with_capacity(self.columns);
        let mut x = 0.0;
        for width in &widths {
            lefts.push(x);
            x += width + m.matrix_column_gap;
        }
        let width = x - m.matrix_column_gap;

        let mut bands = Vec::with_capacity(self.rows);
        let mut y = 0.0;
        for row in 0..self.rows {
            let height = ascents[row] + descents[row];
            bands.push(Band {
                top: y,
                height,
                ref_y: ascents[row],
            });
            y += height + m.matrix_row_gap;
        }
        let height = y - m.matrix_row_gap;

        let slot_offsets = cells
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let (row, column) = (index / self.columns, index % self.columns);
                Point::new(
                    lefts[column] + (widths[column] - cell.width) / 2.0,
                    bands[row].top + ascents[row] - cell.ref_y,
                )
            })
            .collect();

        Arrangement {
            extent: BoxExtent::new(width, height, stacked_ref_y(&bands, m.axis_height)),
            slot_offsets,
            leaves: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::laid_out;
    use super::super::ConstructKind;
    use super::*;

    #[test]
    fn test_cells_share_row_baseline() {
        let kind = ConstructKind::Matrix(MatrixType::new(2, 2));
        let construct = laid_out(kind, &["a", "bbb", "c", "d"]);
        let cells = construct.slots();
        assert!((cells[0].geometry().baseline() - cells[1].geometry().baseline()).abs() < 1e-3);
        assert!(cells[2].geometry().top > cells[0].geometry().bottom());
        // Column width is the widest cell; the narrow cell below is centered in it
        assert!(cells[3].geometry().left > cells[1].geometry().left);
    }

    #[test]
    fn test_odd_rows_align_on_middle_row() {
        let construct = laid_out(ConstructKind::Matrix(MatrixType::new(3, 1)), &["a", "b", "c"]);
        let middle = construct.slots()[1].geometry();
        assert!((construct.geometry().baseline() - middle.baseline()).abs() < 1e-3);
    }

    #[test]
    fn test_even_rows_align_between_rows() {
        let construct = laid_out(ConstructKind::Matrix(MatrixType::new(2, 1)), &["a", "b"]);
        let first = construct.slots()[0].geometry();
        let second = construct.slots()[1].geometry();
        let baseline = construct.geometry().baseline();
        assert!(baseline > first.bottom());
        assert!(baseline < second.bottom());
    }

    #[test]
    fn test_navigation_grid() {
        let grid = MatrixType::new(2, 3);
        assert_eq!(grid.navigate(0, Key::Right), Some(1));
        assert_eq!(grid.navigate(2, Key::Right), None);
        assert_eq!(grid.navigate(4, Key::Up), Some(1));
        assert_eq!(grid.navigate(1, Key::Down), Some(4));
        assert_eq!(grid.navigate(3, Key::Down), None);
        assert_eq!(grid.navigate(3, Key::Left), None);
        assert_eq!(grid.last_slot(), 2);
    }

    #[test]
    fn test_invalid_dimensions() {
        let params: HashMap<String, String> = [
                ("rows".to_string(), "0".to_string()),
                ("columns".to_string(), "2".to_string()),
            ]
            .into();
        assert!(matches!(MatrixType::from_params(&params), Err(EquationError::Deserialize(_))));
    }
}
