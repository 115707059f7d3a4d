use crate::cell::CellValue;
use crate::column::ColumnKind;
use crate::command::{Command, Outcome};
use crate::error::{Missing, Rejection, Result, SheetError};
use crate::id::{ColumnId, RowId, SheetId};
use crate::sheet::{next_ordinal_name, Sheet};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// The full editor state: an ordered, never-empty list of sheets plus the
/// id of the active one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    active: SheetId,
}

impl Workbook {
    /// Create a workbook with one blank default sheet
    #[must_use]
    pub fn new() -> Self {
        let sheet = Sheet::new("Sheet 1");
        Workbook {
            active: sheet.id().clone(),
            sheets: vec![sheet],
        }
    }

    /// Create a workbook from already-built sheets (e.g. an import result).
    ///
    /// The first sheet becomes active.
    pub fn from_sheets(sheets: Vec<Sheet>) -> Result<Self> {
        Self::validate_incoming(&sheets, &HashSet::new())?;
        let active = sheets[0].id().clone();
        Ok(Workbook { sheets, active })
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Sheets in order
    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    /// Look up a sheet by id
    #[must_use]
    pub fn sheet(&self, id: &SheetId) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id() == id)
    }

    /// First sheet with the given display name
    pub fn sheet_by_name(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    fn sheet_mut(&mut self, id: &SheetId) -> std::result::Result<&mut Sheet, Missing> {
        self.sheets
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or_else(|| Missing::Sheet(id.clone()))
    }

    /// Id of the active sheet
    #[must_use]
    pub fn active_sheet_id(&self) -> &SheetId {
        &self.active
    }

    /// Get the active sheet
    #[must_use]
    pub fn active_sheet(&self) -> &Sheet {
        // `active` always names a live sheet
        self.sheet(&self.active).unwrap_or(&self.sheets[0])
    }

    /// Make another sheet active
    pub fn set_active_sheet(&mut self, id: &SheetId) -> Outcome {
        if self.sheet(id).is_none() {
            return Missing::Sheet(id.clone()).into();
        }
        self.active = id.clone();
        Outcome::Applied
    }

    // ===== Sheet Management =====

    /// Append a blank "Sheet N" with the default columns
    pub fn add_sheet(&mut self) -> SheetId {
        let name = next_ordinal_name(
            "Sheet",
            self.sheets.iter().map(Sheet::name),
            self.sheets.len(),
        );
        let sheet = Sheet::new(&name);
        let id = sheet.id().clone();
        self.sheets.push(sheet);
        id
    }

    /// Remove a sheet. The last remaining sheet cannot be removed.
    ///
    /// Removing the active sheet activates the first remaining one.
    pub fn delete_sheet(&mut self, id: &SheetId) -> Outcome {
        let Some(index) = self.sheets.iter().position(|s| s.id() == id) else {
            return Missing::Sheet(id.clone()).into();
        };
        if self.sheets.len() == 1 {
            debug!(sheet = %id, "refusing to delete last sheet");
            return Rejection::LastSheet.into();
        }

        self.sheets.remove(index);
        if &self.active == id {
            self.active = self.sheets[0].id().clone();
        }
        Outcome::Applied
    }

    /// Rename a sheet. Blank names are refused; duplicates are allowed.
    pub fn rename_sheet(&mut self, id: &SheetId, name: &str) -> Outcome {
        let trimmed = name.trim();
        match self.sheet_mut(id) {
            Ok(_) if trimmed.is_empty() => Rejection::BlankName.into(),
            Ok(sheet) => {
                sheet.set_name(trimmed);
                Outcome::Applied
            }
            Err(missing) => missing.into(),
        }
    }

    // ===== Sheet-scoped edits =====

    /// See [`Sheet::add_column`]
    pub fn add_column(
        &mut self,
        sheet: &SheetId,
        after: Option<&ColumnId>,
    ) -> std::result::Result<ColumnId, Missing> {
        Ok(self.sheet_mut(sheet)?.add_column(after))
    }

    /// See [`Sheet::delete_column`]
    pub fn delete_column(&mut self, sheet: &SheetId, column: &ColumnId) -> Outcome {
        self.with_sheet(sheet, |s| s.delete_column(column))
    }

    /// See [`Sheet::rename_column`]
    pub fn rename_column(&mut self, sheet: &SheetId, column: &ColumnId, name: &str) -> Outcome {
        self.with_sheet(sheet, |s| s.rename_column(column, name))
    }

    /// See [`Sheet::retype_column`]
    pub fn retype_column(&mut self, sheet: &SheetId, column: &ColumnId) -> Outcome {
        self.with_sheet(sheet, |s| s.retype_column(column))
    }

    /// See [`Sheet::set_column_kind`]
    pub fn set_column_kind(
        &mut self,
        sheet: &SheetId,
        column: &ColumnId,
        kind: ColumnKind,
    ) -> Outcome {
        self.with_sheet(sheet, |s| s.set_column_kind(column, kind))
    }

    /// See [`Sheet::add_row`]
    pub fn add_row(
        &mut self,
        sheet: &SheetId,
        after: Option<&RowId>,
    ) -> std::result::Result<RowId, Missing> {
        Ok(self.sheet_mut(sheet)?.add_row(after))
    }

    /// See [`Sheet::delete_row`]
    pub fn delete_row(&mut self, sheet: &SheetId, row: &RowId) -> Outcome {
        self.with_sheet(sheet, |s| s.delete_row(row))
    }

    /// See [`Sheet::write_cell`]
    pub fn write_cell(
        &mut self,
        sheet: &SheetId,
        row: &RowId,
        column: &ColumnId,
        raw: &str,
    ) -> Outcome {
        self.with_sheet(sheet, |s| s.write_cell(row, column, raw))
    }

    /// See [`Sheet::set_cell`]
    pub fn set_cell(
        &mut self,
        sheet: &SheetId,
        row: &RowId,
        column: &ColumnId,
        value: CellValue,
    ) -> Outcome {
        self.with_sheet(sheet, |s| s.set_cell(row, column, value))
    }

    /// See [`Sheet::toggle_row_selected`]
    pub fn toggle_row_selected(&mut self, sheet: &SheetId, row: &RowId) -> Outcome {
        self.with_sheet(sheet, |s| s.toggle_row_selected(row))
    }

    /// See [`Sheet::select_all`]
    pub fn select_all(&mut self, sheet: &SheetId, selected: bool) -> Outcome {
        self.with_sheet(sheet, |s| {
            s.select_all(selected);
            Outcome::Applied
        })
    }

    fn with_sheet<F>(&mut self, sheet: &SheetId, f: F) -> Outcome
    where
        F: FnOnce(&mut Sheet) -> Outcome,
    {
        match self.sheet_mut(sheet) {
            Ok(s) => f(s),
            Err(missing) => missing.into(),
        }
    }

    // ===== Transitions =====

    /// Apply a command in place.
    pub fn execute(&mut self, command: &Command) -> Outcome {
        match command {
            Command::AddSheet => {
                self.add_sheet();
                Outcome::Applied
            }
            Command::DeleteSheet { sheet } => self.delete_sheet(sheet),
            Command::RenameSheet { sheet, name } => self.rename_sheet(sheet, name),
            Command::SetActiveSheet { sheet } => self.set_active_sheet(sheet),
            Command::AddColumn { sheet, after } => self.add_column(sheet, after.as_ref()).into(),
            Command::DeleteColumn { sheet, column } => self.delete_column(sheet, column),
            Command::RenameColumn {
                sheet,
                column,
                name,
            } => self.rename_column(sheet, column, name),
            Command::RetypeColumn { sheet, column } => self.retype_column(sheet, column),
            Command::SetColumnKind {
                sheet,
                column,
                kind,
            } => self.set_column_kind(sheet, column, *kind),
            Command::AddRow { sheet, after } => self.add_row(sheet, after.as_ref()).into(),
            Command::DeleteRow { sheet, row } => self.delete_row(sheet, row),
            Command::WriteCell {
                sheet,
                row,
                column,
                value,
            } => self.write_cell(sheet, row, column, value),
            Command::ToggleRowSelected { sheet, row } => self.toggle_row_selected(sheet, row),
            Command::SelectAll { sheet, selected } => self.select_all(sheet, *selected),
        }
    }

    /// Pure transition: return the state after `command`, leaving `self`
    /// untouched. A refused command returns an equal copy.
    #[must_use]
    pub fn apply(&self, command: &Command) -> (Workbook, Outcome) {
        let mut next = self.clone();
        let outcome = next.execute(command);
        (next, outcome)
    }

    // ===== Import =====

    /// Replace every sheet with an import result in one step.
    ///
    /// An empty result is an error and leaves the workbook unchanged.
    pub fn replace_with_import(&mut self, sheets: Vec<Sheet>) -> Result<()> {
        *self = Self::from_sheets(sheets)?;
        Ok(())
    }

    /// Append imported sheets after the existing ones in one step.
    ///
    /// The active sheet does not change. Fails without changes if the
    /// result is empty or reuses a sheet id already in the workbook.
    pub fn append_import(&mut self, sheets: Vec<Sheet>) -> Result<()> {
        let existing: HashSet<SheetId> = self.sheets.iter().map(|s| s.id().clone()).collect();
        Self::validate_incoming(&sheets, &existing)?;
        self.sheets.extend(sheets);
        Ok(())
    }

    fn validate_incoming(sheets: &[Sheet], existing: &HashSet<SheetId>) -> Result<()> {
        if sheets.is_empty() {
            return Err(SheetError::EmptyImport);
        }
        let mut seen = HashSet::new();
        for sheet in sheets {
            sheet.check_invariants()?;
            if existing.contains(sheet.id()) || !seen.insert(sheet.id()) {
                return Err(SheetError::Inconsistent {
                    sheet: sheet.name().to_string(),
                    reason: format!("duplicate sheet id {}", sheet.id()),
                });
            }
        }
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
