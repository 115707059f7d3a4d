//! Serializable edit commands and their outcomes.

use crate::column::ColumnKind;
use crate::error::{Missing, Rejection};
use crate::id::{ColumnId, RowId, SheetId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One structural or cell edit, as a value.
///
/// Hosts can queue, log or replay these; [`crate::Workbook::apply`] turns one
/// into a new workbook state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddSheet,
    DeleteSheet {
        sheet: SheetId,
    },
    RenameSheet {
        sheet: SheetId,
        name: String,
    },
    SetActiveSheet {
        sheet: SheetId,
    },
    AddColumn {
        sheet: SheetId,
        #[serde(default)]
        after: Option<ColumnId>,
    },
    DeleteColumn {
        sheet: SheetId,
        column: ColumnId,
    },
    RenameColumn {
        sheet: SheetId,
        column: ColumnId,
        name: String,
    },
    RetypeColumn {
        sheet: SheetId,
        column: ColumnId,
    },
    SetColumnKind {
        sheet: SheetId,
        column: ColumnId,
        kind: ColumnKind,
    },
    AddRow {
        sheet: SheetId,
        #[serde(default)]
        after: Option<RowId>,
    },
    DeleteRow {
        sheet: SheetId,
        row: RowId,
    },
    WriteCell {
        sheet: SheetId,
        row: RowId,
        column: ColumnId,
        value: String,
    },
    ToggleRowSelected {
        sheet: SheetId,
        row: RowId,
    },
    SelectAll {
        sheet: SheetId,
        selected: bool,
    },
}

/// Result of an edit. Anything but `Applied` means nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected(Rejection),
    NotFound(Missing),
}

impl Outcome {
    /// Whether the edit changed the workbook
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

impl From<Missing> for Outcome {
    fn from(missing: Missing) -> Self {
        Outcome::NotFound(missing)
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Outcome::Rejected(rejection)
    }
}

impl<T> From<std::result::Result<T, Missing>> for Outcome {
    fn from(result: std::result::Result<T, Missing>) -> Self {
        match result {
            Ok(_) => Outcome::Applied,
            Err(missing) => Outcome::NotFound(missing),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied => write!(f, "applied"),
            Outcome::Rejected(r) => write!(f, "rejected: {r}"),
            Outcome::NotFound(m) => write!(f, "not found: {m}"),
        }
    }
}
