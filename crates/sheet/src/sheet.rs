use crate::cell::CellValue;
use crate::column::{Column, ColumnKind};
use crate::command::Outcome;
use crate::error::{Missing, Rejection, Result, SheetError};
use crate::id::{ColumnId, RowId, SheetId};
use crate::row::Row;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Columns every new blank sheet starts with.
pub const DEFAULT_COLUMNS: [(&str, ColumnKind); 3] = [
    ("Producto", ColumnKind::Text),
    ("Stock Actual", ColumnKind::Number),
    ("Coste Unit.", ColumnKind::Number),
];

/// A named grid of typed columns and ordered rows.
///
/// Every row holds exactly one cell per current column, keyed by column id.
/// All mutating methods keep that true: they either finish the whole change
/// or leave the sheet untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    id: SheetId,
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Sheet {
    /// Create an empty sheet with the default column set
    #[must_use]
    pub fn new(name: &str) -> Self {
        let columns = DEFAULT_COLUMNS
            .iter()
            .map(|(name, kind)| Column::new(name, *kind))
            .collect();
        Self::with_columns(name, columns)
    }

    /// Create an empty sheet with the given columns
    #[must_use]
    pub fn with_columns(name: &str, columns: Vec<Column>) -> Self {
        Sheet {
            id: SheetId::fresh(),
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Assemble a sheet from parts, checking every structural invariant.
    ///
    /// Rows missing a column get an `Absent` cell; cells for unknown columns
    /// are an error, as are duplicate ids or an empty column list.
    pub fn from_parts(name: &str, columns: Vec<Column>, rows: Vec<Row>) -> Result<Self> {
        let mut sheet = Self::with_columns(name, columns);
        sheet.rows = rows;
        for row in &mut sheet.rows {
            for column in &sheet.columns {
                row.cells
                    .entry(column.id.clone())
                    .or_insert(CellValue::Absent);
            }
        }
        sheet.check_invariants()?;
        Ok(sheet)
    }

    // ===== Read Access =====

    /// Get the sheet id
    #[must_use]
    pub fn id(&self) -> &SheetId {
        &self.id
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Columns in display order
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in display order
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of selected rows
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|r| r.selected).count()
    }

    /// Look up a column by id
    #[must_use]
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// First column with the given display name
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a row by id
    #[must_use]
    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Position of a column, if present
    #[must_use]
    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// Position of a row, if present
    #[must_use]
    pub fn row_index(&self, id: &RowId) -> Option<usize> {
        self.rows.iter().position(|r| &r.id == id)
    }

    /// Read one cell
    #[must_use]
    pub fn get(&self, row: &RowId, column: &ColumnId) -> Option<&CellValue> {
        self.row(row)?.cells.get(column)
    }

    // ===== Column Operations =====

    /// Insert a new Text column at the end, or right after `after`.
    ///
    /// An unknown `after` id appends. Every existing row gets an `Absent`
    /// cell for the new column in the same step.
    pub fn add_column(&mut self, after: Option<&ColumnId>) -> ColumnId {
        let name = next_ordinal_name(
            "Column",
            self.columns.iter().map(|c| c.name.as_str()),
            self.columns.len(),
        );
        let column = Column::new(&name, ColumnKind::Text);
        let id = column.id.clone();

        let index = after
            .and_then(|a| self.column_index(a))
            .map_or(self.columns.len(), |i| i + 1);

        for row in &mut self.rows {
            row.cells.insert(id.clone(), CellValue::Absent);
        }
        self.columns.insert(index, column);
        id
    }

    /// Remove a column and its cell from every row.
    ///
    /// The only column of a sheet cannot be removed.
    pub fn delete_column(&mut self, id: &ColumnId) -> Outcome {
        let Some(index) = self.column_index(id) else {
            return Missing::Column(id.clone()).into();
        };
        if self.columns.len() == 1 {
            debug!(sheet = %self.id, column = %id, "refusing to delete last column");
            return Rejection::LastColumn.into();
        }

        self.columns.remove(index);
        for row in &mut self.rows {
            row.cells.shift_remove(id);
        }
        Outcome::Applied
    }

    /// Change a column's display name. Blank names are refused.
    pub fn rename_column(&mut self, id: &ColumnId, name: &str) -> Outcome {
        let trimmed = name.trim();
        let Some(column) = self.columns.iter_mut().find(|c| &c.id == id) else {
            return Missing::Column(id.clone()).into();
        };
        if trimmed.is_empty() {
            return Rejection::BlankName.into();
        }
        column.name = trimmed.to_string();
        Outcome::Applied
    }

    /// Toggle a column between Text and Number.
    ///
    /// Stored values are left as they are.
    pub fn retype_column(&mut self, id: &ColumnId) -> Outcome {
        match self.columns.iter_mut().find(|c| &c.id == id) {
            Some(column) => {
                column.kind = column.kind.toggled();
                Outcome::Applied
            }
            None => Missing::Column(id.clone()).into(),
        }
    }

    /// Set a column's kind directly. Stored values are left as they are.
    pub fn set_column_kind(&mut self, id: &ColumnId, kind: ColumnKind) -> Outcome {
        match self.columns.iter_mut().find(|c| &c.id == id) {
            Some(column) => {
                column.kind = kind;
                Outcome::Applied
            }
            None => Missing::Column(id.clone()).into(),
        }
    }

    // ===== Row Operations =====

    /// Insert a blank row at the end, or right after `after` (unknown id appends).
    pub fn add_row(&mut self, after: Option<&RowId>) -> RowId {
        let row = Row::blank(&self.columns);
        let id = row.id.clone();
        let index = after
            .and_then(|a| self.row_index(a))
            .map_or(self.rows.len(), |i| i + 1);
        self.rows.insert(index, row);
        id
    }

    /// Remove a row. A sheet may end up with zero rows.
    pub fn delete_row(&mut self, id: &RowId) -> Outcome {
        match self.row_index(id) {
            Some(index) => {
                self.rows.remove(index);
                Outcome::Applied
            }
            None => Missing::Row(id.clone()).into(),
        }
    }

    /// Flip one row's selection flag
    pub fn toggle_row_selected(&mut self, id: &RowId) -> Outcome {
        match self.rows.iter_mut().find(|r| &r.id == id) {
            Some(row) => {
                row.selected = !row.selected;
                Outcome::Applied
            }
            None => Missing::Row(id.clone()).into(),
        }
    }

    /// Set every row's selection flag
    pub fn select_all(&mut self, selected: bool) {
        for row in &mut self.rows {
            row.selected = selected;
        }
    }

    // ===== Cell Access =====

    /// Write raw user input into a cell, coercing by the column's kind.
    ///
    /// Number columns store `Absent` for input that does not parse.
    pub fn write_cell(&mut self, row: &RowId, column: &ColumnId, raw: &str) -> Outcome {
        let Some(kind) = self.column(column).map(|c| c.kind) else {
            return Missing::Column(column.clone()).into();
        };
        self.store(row, column, kind.coerce(raw))
    }

    /// Write a typed value into a cell.
    ///
    /// Text written to a Number column is coerced like [`Sheet::write_cell`],
    /// and a non-finite number becomes `Absent`.
    pub fn set_cell(&mut self, row: &RowId, column: &ColumnId, value: CellValue) -> Outcome {
        let Some(kind) = self.column(column).map(|c| c.kind) else {
            return Missing::Column(column.clone()).into();
        };
        let value = match (kind, value) {
            (ColumnKind::Number, CellValue::Text(s)) => CellValue::number_from_input(&s),
            (ColumnKind::Number, CellValue::Number(n)) if !n.is_finite() => CellValue::Absent,
            (_, v) => v,
        };
        self.store(row, column, value)
    }

    fn store(&mut self, row: &RowId, column: &ColumnId, value: CellValue) -> Outcome {
        match self.rows.iter_mut().find(|r| &r.id == row) {
            Some(r) => {
                r.cells.insert(column.clone(), value);
                Outcome::Applied
            }
            None => Missing::Row(row.clone()).into(),
        }
    }

    // ===== Invariants =====

    /// Verify the structural invariants of the sheet.
    ///
    /// Holds after every operation; exposed for hosts that assemble sheets
    /// by hand and for tests.
    pub fn check_invariants(&self) -> Result<()> {
        let fail = |reason: String| SheetError::Inconsistent {
            sheet: self.name.clone(),
            reason,
        };

        if self.columns.is_empty() {
            return Err(fail("sheet has no columns".to_string()));
        }

        let mut column_ids = HashSet::new();
        for column in &self.columns {
            if !column_ids.insert(&column.id) {
                return Err(fail(format!("duplicate column id {}", column.id)));
            }
        }

        let mut row_ids = HashSet::new();
        for row in &self.rows {
            if !row_ids.insert(&row.id) {
                return Err(fail(format!("duplicate row id {}", row.id)));
            }
            if let Some(key) = row.cells.keys().find(|k| !column_ids.contains(k)) {
                return Err(fail(format!("row {} has cell for unknown column {key}", row.id)));
            }
            if row.cells.len() != self.columns.len() {
                return Err(fail(format!("row {} is missing cells", row.id)));
            }
        }

        Ok(())
    }

    /// Append an already-built row. Used by import.
    pub(crate) fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}

/// Next "`prefix` N" name: one past the highest N already used, and never
/// below `count + 1`.
///
/// A name already numbered `usize::MAX` has no successor and is skipped.
pub(crate) fn next_ordinal_name<'a>(
    prefix: &str,
    existing: impl Iterator<Item = &'a str>,
    count: usize,
) -> String {
    let highest = existing
        .filter_map(|name| name.strip_prefix(prefix)?.trim().parse::<usize>().ok())
        .filter(|n| *n < usize::MAX)
        .max()
        .unwrap_or(0);
    format!("{prefix} {}", highest.max(count).saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with_rows(n: usize) -> Sheet {
        let mut sheet = Sheet::new("Inventario");
        for _ in 0..n {
            sheet.add_row(None);
        }
        sheet
    }

    #[test]
    fn test_new_sheet_has_default_columns() {
        let sheet = Sheet::new("Sheet 1");
        assert_eq!(sheet.name(), "Sheet 1");
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(sheet.columns()[1].name, "Stock Actual");
        assert_eq!(sheet.columns()[1].kind, ColumnKind::Number);
        sheet.check_invariants().unwrap();
    }

    #[test]
    fn test_add_column_reaches_every_row() {
        let mut sheet = sheet_with_rows(3);
        let id = sheet.add_column(None);

        assert_eq!(sheet.col_count(), 4);
        assert_eq!(sheet.columns()[3].id, id);
        assert_eq!(sheet.columns()[3].name, "Column 4");
        assert_eq!(sheet.columns()[3].kind, ColumnKind::Text);
        for row in sheet.rows() {
            assert_eq!(row.cells.get(&id), Some(&CellValue::Absent));
        }
        sheet.check_invariants().unwrap();
    }

    #[test]
    fn test_add_column_after() {
        let mut sheet = sheet_with_rows(1);
        let first = sheet.columns()[0].id.clone();
        let id = sheet.add_column(Some(&first));
        assert_eq!(sheet.column_index(&id), Some(1));
    }

    #[test]
    fn test_add_column_after_unknown_appends() {
        let mut sheet = sheet_with_rows(1);
        let id = sheet.add_column(Some(&ColumnId::from("nope")));
        assert_eq!(sheet.column_index(&id), Some(3));
    }

    #[test]
    fn test_delete_column_prunes_rows() {
        let mut sheet = sheet_with_rows(2);
        let id = sheet.columns()[1].id.clone();

        assert!(sheet.delete_column(&id).is_applied());
        assert_eq!(sheet.col_count(), 2);
        for row in sheet.rows() {
            assert!(!row.cells.contains_key(&id));
        }
        sheet.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_last_column_rejected() {
        let mut sheet = sheet_with_rows(1);
        let ids: Vec<_> = sheet.columns().iter().map(|c| c.id.clone()).collect();
        sheet.delete_column(&ids[0]);
        sheet.delete_column(&ids[1]);
        let before = sheet.clone();

        assert_eq!(
            sheet.delete_column(&ids[2]),
            Outcome::Rejected(Rejection::LastColumn)
        );
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_rename_column() {
        let mut sheet = sheet_with_rows(0);
        let id = sheet.columns()[0].id.clone();

        assert!(sheet.rename_column(&id, "  Nombre ").is_applied());
        assert_eq!(sheet.columns()[0].name, "Nombre");
        assert_eq!(
            sheet.rename_column(&id, "   "),
            Outcome::Rejected(Rejection::BlankName)
        );
        assert_eq!(sheet.columns()[0].name, "Nombre");
    }

    #[test]
    fn test_retype_keeps_values() {
        let mut sheet = sheet_with_rows(1);
        let row = sheet.rows()[0].id.clone();
        let col = sheet.columns()[0].id.clone();
        sheet.write_cell(&row, &col, "abc");

        sheet.retype_column(&col);
        assert_eq!(sheet.columns()[0].kind, ColumnKind::Number);
        assert_eq!(sheet.get(&row, &col), Some(&CellValue::from("abc")));

        sheet.retype_column(&col);
        assert_eq!(sheet.columns()[0].kind, ColumnKind::Text);
    }

    #[test]
    fn test_add_row_after() {
        let mut sheet = sheet_with_rows(2);
        let first = sheet.rows()[0].id.clone();
        let id = sheet.add_row(Some(&first));
        assert_eq!(sheet.row_index(&id), Some(1));
        assert_eq!(sheet.rows()[1].cells.len(), 3);
        assert!(!sheet.rows()[1].selected);
    }

    #[test]
    fn test_delete_row_to_zero() {
        let mut sheet = sheet_with_rows(1);
        let id = sheet.rows()[0].id.clone();
        assert!(sheet.delete_row(&id).is_applied());
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(
            sheet.delete_row(&id),
            Outcome::NotFound(Missing::Row(id))
        );
    }

    #[test]
    fn test_write_cell_number_coercion() {
        let mut sheet = sheet_with_rows(1);
        let row = sheet.rows()[0].id.clone();
        let stock = sheet.columns()[1].id.clone();

        sheet.write_cell(&row, &stock, " 42 ");
        assert_eq!(sheet.get(&row, &stock), Some(&CellValue::Number(42.0)));

        sheet.write_cell(&row, &stock, "lots");
        assert_eq!(sheet.get(&row, &stock), Some(&CellValue::Absent));
    }

    #[test]
    fn test_write_cell_text_keeps_empty_string() {
        let mut sheet = sheet_with_rows(1);
        let row = sheet.rows()[0].id.clone();
        let name = sheet.columns()[0].id.clone();

        sheet.write_cell(&row, &name, "");
        assert_eq!(sheet.get(&row, &name), Some(&CellValue::Text(String::new())));
    }

    #[test]
    fn test_set_cell_coerces_text_into_number_column() {
        let mut sheet = sheet_with_rows(1);
        let row = sheet.rows()[0].id.clone();
        let stock = sheet.columns()[1].id.clone();

        sheet.set_cell(&row, &stock, CellValue::from("x"));
        assert_eq!(sheet.get(&row, &stock), Some(&CellValue::Absent));
        sheet.set_cell(&row, &stock, CellValue::Number(3.0));
        assert_eq!(sheet.get(&row, &stock), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_set_cell_non_finite_number_is_absent() {
        let mut sheet = sheet_with_rows(1);
        let row = sheet.rows()[0].id.clone();
        let stock = sheet.columns()[1].id.clone();

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            sheet.set_cell(&row, &stock, CellValue::Number(7.0));
            let outcome = sheet.set_cell(&row, &stock, CellValue::Number(value));
            assert!(outcome.is_applied());
            assert_eq!(sheet.get(&row, &stock), Some(&CellValue::Absent));
        }
    }

    #[test]
    fn test_set_column_kind() {
        let mut sheet = sheet_with_rows(1);
        let row = sheet.rows()[0].id.clone();
        let name = sheet.columns()[0].id.clone();
        sheet.write_cell(&row, &name, "12");

        assert!(sheet.set_column_kind(&name, ColumnKind::Number).is_applied());
        assert_eq!(sheet.columns()[0].kind, ColumnKind::Number);
        // Setting the same kind again is not a toggle
        sheet.set_column_kind(&name, ColumnKind::Number);
        assert_eq!(sheet.columns()[0].kind, ColumnKind::Number);
        assert_eq!(sheet.get(&row, &name), Some(&CellValue::Text("12".into())));

        let outcome = sheet.set_column_kind(&ColumnId::from("ghost"), ColumnKind::Text);
        assert!(matches!(outcome, Outcome::NotFound(Missing::Column(_))));
    }

    #[test]
    fn test_write_cell_unknown_ids() {
        let mut sheet = sheet_with_rows(1);
        let row = sheet.rows()[0].id.clone();
        let before = sheet.clone();

        let outcome = sheet.write_cell(&row, &ColumnId::from("ghost"), "1");
        assert!(matches!(outcome, Outcome::NotFound(Missing::Column(_))));
        let col = sheet.columns()[0].id.clone();
        let outcome = sheet.write_cell(&RowId::from("ghost"), &col, "1");
        assert!(matches!(outcome, Outcome::NotFound(Missing::Row(_))));
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_selection() {
        let mut sheet = sheet_with_rows(3);
        let id = sheet.rows()[1].id.clone();

        sheet.toggle_row_selected(&id);
        assert_eq!(sheet.selected_count(), 1);
        sheet.toggle_row_selected(&id);
        assert_eq!(sheet.selected_count(), 0);

        sheet.select_all(true);
        assert_eq!(sheet.selected_count(), 3);
        sheet.select_all(false);
        assert_eq!(sheet.selected_count(), 0);
    }

    #[test]
    fn test_from_parts_fills_missing_cells() {
        let columns = vec![Column::new("A", ColumnKind::Text)];
        let row = Row {
            id: RowId::fresh(),
            cells: indexmap::IndexMap::new(),
            selected: false,
        };
        let sheet = Sheet::from_parts("S", columns, vec![row]).unwrap();
        assert_eq!(sheet.rows()[0].cells.len(), 1);
    }

    #[test]
    fn test_from_parts_rejects_unknown_cell_key() {
        let columns = vec![Column::new("A", ColumnKind::Text)];
        let mut cells = indexmap::IndexMap::new();
        cells.insert(ColumnId::from("stray"), CellValue::Absent);
        let row = Row {
            id: RowId::fresh(),
            cells,
            selected: false,
        };
        let result = Sheet::from_parts("S", columns, vec![row]);
        assert!(matches!(result, Err(SheetError::Inconsistent { .. })));
    }

    #[test]
    fn test_next_ordinal_name() {
        let names = ["Sheet 1", "Sheet 4", "Other"];
        assert_eq!(next_ordinal_name("Sheet", names.into_iter(), 3), "Sheet 5");
        assert_eq!(next_ordinal_name("Column", std::iter::empty(), 2), "Column 3");
    }

    #[test]
    fn test_add_column_after_max_ordinal_name() {
        let mut sheet = sheet_with_rows(2);
        let first = sheet.columns()[0].id.clone();
        let huge = format!("Column {}", usize::MAX);
        assert!(sheet.rename_column(&first, &huge).is_applied());

        let id = sheet.add_column(None);
        let added = sheet.column(&id).unwrap();
        assert_eq!(added.name, "Column 4");
        assert_eq!(sheet.col_count(), 4);
        sheet.check_invariants().unwrap();

        let names = [huge.as_str(), "Column 9"];
        assert_eq!(next_ordinal_name("Column", names.into_iter(), 1), "Column 10");
    }
}
