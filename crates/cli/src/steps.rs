//! Edit scripts for the `edit` subcommand.
//!
//! Ids are generated fresh on every import, so scripts name sheets and
//! columns by their display name and rows by 0-based position. Each step is
//! resolved against the current workbook just before it runs; a reference
//! that does not resolve becomes an id no workbook contains, and the edit
//! reports it as not found.

use serde::Deserialize;
use stockgrid_sheet::{ColumnId, ColumnKind, Command, RowId, SheetId, Workbook};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddSheet,
    DeleteSheet {
        sheet: String,
    },
    RenameSheet {
        sheet: String,
        name: String,
    },
    SetActiveSheet {
        sheet: String,
    },
    AddColumn {
        #[serde(default)]
        sheet: Option<String>,
        #[serde(default)]
        after: Option<String>,
    },
    DeleteColumn {
        #[serde(default)]
        sheet: Option<String>,
        column: String,
    },
    RenameColumn {
        #[serde(default)]
        sheet: Option<String>,
        column: String,
        name: String,
    },
    RetypeColumn {
        #[serde(default)]
        sheet: Option<String>,
        column: String,
    },
    SetColumnKind {
        #[serde(default)]
        sheet: Option<String>,
        column: String,
        kind: ColumnKind,
    },
    AddRow {
        #[serde(default)]
        sheet: Option<String>,
        #[serde(default)]
        after: Option<usize>,
    },
    DeleteRow {
        #[serde(default)]
        sheet: Option<String>,
        row: usize,
    },
    WriteCell {
        #[serde(default)]
        sheet: Option<String>,
        row: usize,
        column: String,
        value: String,
    },
    ToggleRowSelected {
        #[serde(default)]
        sheet: Option<String>,
        row: usize,
    },
    SelectAll {
        #[serde(default)]
        sheet: Option<String>,
        #[serde(default = "default_true")]
        selected: bool,
    },
}

fn default_true() -> bool {
    true
}

/// Parse a script: a JSON array of steps.
pub fn parse_steps(json: &str) -> serde_json::Result<Vec<Step>> {
    serde_json::from_str(json)
}

impl Step {
    /// Short name of the operation, for progress output
    pub fn op(&self) -> &'static str {
        match self {
            Step::AddSheet => "add_sheet",
            Step::DeleteSheet { .. } => "delete_sheet",
            Step::RenameSheet { .. } => "rename_sheet",
            Step::SetActiveSheet { .. } => "set_active_sheet",
            Step::AddColumn { .. } => "add_column",
            Step::DeleteColumn { .. } => "delete_column",
            Step::RenameColumn { .. } => "rename_column",
            Step::RetypeColumn { .. } => "retype_column",
            Step::SetColumnKind { .. } => "set_column_kind",
            Step::AddRow { .. } => "add_row",
            Step::DeleteRow { .. } => "delete_row",
            Step::WriteCell { .. } => "write_cell",
            Step::ToggleRowSelected { .. } => "toggle_row_selected",
            Step::SelectAll { .. } => "select_all",
        }
    }

    /// Turn names and positions into the ids of `book`.
    pub fn resolve(&self, book: &Workbook) -> Command {
        match self {
            Step::AddSheet => Command::AddSheet,
            Step::DeleteSheet { sheet } => Command::DeleteSheet {
                sheet: sheet_id(book, Some(sheet)),
            },
            Step::RenameSheet { sheet, name } => Command::RenameSheet {
                sheet: sheet_id(book, Some(sheet)),
                name: name.clone(),
            },
            Step::SetActiveSheet { sheet } => Command::SetActiveSheet {
                sheet: sheet_id(book, Some(sheet)),
            },
            Step::AddColumn { sheet, after } => {
                let sheet = sheet_id(book, sheet.as_ref());
                let after = after.as_ref().map(|c| column_id(book, &sheet, c));
                Command::AddColumn { sheet, after }
            }
            Step::DeleteColumn { sheet, column } => {
                let sheet = sheet_id(book, sheet.as_ref());
                Command::DeleteColumn {
                    column: column_id(book, &sheet, column),
                    sheet,
                }
            }
            Step::RenameColumn {
                sheet,
                column,
                name,
            } => {
                let sheet = sheet_id(book, sheet.as_ref());
                Command::RenameColumn {
                    column: column_id(book, &sheet, column),
                    sheet,
                    name: name.clone(),
                }
            }
            Step::RetypeColumn { sheet, column } => {
                let sheet = sheet_id(book, sheet.as_ref());
                Command::RetypeColumn {
                    column: column_id(book, &sheet, column),
                    sheet,
                }
            }
            Step::SetColumnKind {
                sheet,
                column,
                kind,
            } => {
                let sheet = sheet_id(book, sheet.as_ref());
                Command::SetColumnKind {
                    column: column_id(book, &sheet, column),
                    sheet,
                    kind: *kind,
                }
            }
            Step::AddRow { sheet, after } => {
                let sheet = sheet_id(book, sheet.as_ref());
                let after = after.map(|r| row_id(book, &sheet, r));
                Command::AddRow { sheet, after }
            }
            Step::DeleteRow { sheet, row } => {
                let sheet = sheet_id(book, sheet.as_ref());
                Command::DeleteRow {
                    row: row_id(book, &sheet, *row),
                    sheet,
                }
            }
            Step::WriteCell {
                sheet,
                row,
                column,
                value,
            } => {
                let sheet = sheet_id(book, sheet.as_ref());
                Command::WriteCell {
                    row: row_id(book, &sheet, *row),
                    column: column_id(book, &sheet, column),
                    sheet,
                    value: value.clone(),
                }
            }
            Step::ToggleRowSelected { sheet, row } => {
                let sheet = sheet_id(book, sheet.as_ref());
                Command::ToggleRowSelected {
                    row: row_id(book, &sheet, *row),
                    sheet,
                }
            }
            Step::SelectAll { sheet, selected } => Command::SelectAll {
                sheet: sheet_id(book, sheet.as_ref()),
                selected: *selected,
            },
        }
    }
}

/// Sheet by name, defaulting to the active sheet.
fn sheet_id(book: &Workbook, name: Option<&String>) -> SheetId {
    match name {
        None => book.active_sheet_id().clone(),
        Some(name) => book
            .sheet_by_name(name)
            .map(|s| s.id().clone())
            .unwrap_or_else(|_| SheetId::from(name.as_str())),
    }
}

fn column_id(book: &Workbook, sheet: &SheetId, name: &str) -> ColumnId {
    book.sheet(sheet)
        .and_then(|s| s.column_by_name(name))
        .map(|c| c.id.clone())
        .unwrap_or_else(|| ColumnId::from(name))
}

fn row_id(book: &Workbook, sheet: &SheetId, position: usize) -> RowId {
    book.sheet(sheet)
        .and_then(|s| s.rows().get(position))
        .map(|r| r.id.clone())
        .unwrap_or_else(|| RowId::from(format!("#{position}")))
}
