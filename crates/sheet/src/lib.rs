//! Workbook model for stockgrid
//!
//! An in-memory spreadsheet engine for inventory data: a workbook of named
//! sheets, each a grid of typed columns and ordered rows, edited through
//! stable ids. Every edit either fully applies or reports why it did not.
//!
//! # Examples
//!
//! ## Editing a sheet
//!
//! ```
//! use stockgrid_sheet::{CellValue, Selection, Workbook};
//!
//! let mut book = Workbook::new();
//! let sheet = book.active_sheet_id().clone();
//! let stock = book.active_sheet().columns()[1].id.clone();
//!
//! let row = book.add_row(&sheet, None).unwrap();
//! assert!(book.write_cell(&sheet, &row, &stock, "42").is_applied());
//!
//! let records = book.active_sheet().export(Selection::All);
//! assert_eq!(records[0]["Stock Actual"], CellValue::Number(42.0));
//! ```
//!
//! ## Commands as values
//!
//! ```
//! use stockgrid_sheet::{Command, Outcome, Rejection, Workbook};
//!
//! let book = Workbook::new();
//! let delete = Command::DeleteSheet {
//!     sheet: book.active_sheet_id().clone(),
//! };
//!
//! let (next, outcome) = book.apply(&delete);
//! assert_eq!(outcome, Outcome::Rejected(Rejection::LastSheet));
//! assert_eq!(next, book);
//! ```
//!
//! ## Importing CSV
//!
//! ```
//! use stockgrid_sheet::{import_csv, ColumnKind, CsvOptions, Workbook};
//!
//! let data = "Producto,Stock\nTornillo,50\nTuerca,7\n";
//! let sheets = import_csv(data.as_bytes(), "inventario", &CsvOptions::default()).unwrap();
//! assert_eq!(sheets[0].columns()[1].kind, ColumnKind::Number);
//!
//! let mut book = Workbook::new();
//! book.replace_with_import(sheets).unwrap();
//! assert_eq!(book.sheet_names(), vec!["inventario"]);
//! ```

mod cell;
mod column;
mod command;
mod csv;
mod error;
mod export;
mod id;
mod import;
mod json;
mod row;
mod sheet;
mod workbook;
#[cfg(not(target_arch = "wasm32"))]
mod xlsx;

pub use cell::{format_number, parse_number, CellValue};
pub use column::{Column, ColumnKind};
pub use command::{Command, Outcome};
pub use csv::{import_csv, CsvOptions};
pub use error::{Missing, Rejection, Result, SheetError};
pub use export::{FlaggedRecord, Record, Selection};
pub use id::{ColumnId, RowId, SheetId};
pub use import::{import_path, infer_kind, tables_to_sheets, RawTable, INFERENCE_SAMPLE_ROWS};
pub use json::import_json;
pub use row::Row;
pub use sheet::{Sheet, DEFAULT_COLUMNS};
pub use workbook::Workbook;
#[cfg(not(target_arch = "wasm32"))]
pub use xlsx::import_spreadsheet;
