use crate::id::{ColumnId, RowId, SheetId};
use thiserror::Error;

/// Errors that can occur while importing or exporting sheets.
///
/// Structural edits never produce these; they report an [`crate::Outcome`].
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Import error: {0}")]
    Import(String),

    #[error("Import produced no sheets: every source table was empty")]
    EmptyImport,

    #[error("Inconsistent sheet '{sheet}': {reason}")]
    Inconsistent { sheet: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Why an edit was refused without touching the workbook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("cannot delete the last sheet")]
    LastSheet,

    #[error("cannot delete the last column")]
    LastColumn,

    #[error("name must not be blank")]
    BlankName,
}

/// A stale or unknown id passed to an edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    #[error("sheet {0} not found")]
    Sheet(SheetId),

    #[error("column {0} not found")]
    Column(ColumnId),

    #[error("row {0} not found")]
    Row(RowId),
}
