//! Turning raw source tables into typed sheets.
//!
//! Every reader (spreadsheet, CSV, JSON) first produces [`RawTable`]s of
//! loosely typed values; [`tables_to_sheets`] then infers column kinds and
//! builds the sheets. Readers never touch a workbook: callers apply the
//! finished `Vec<Sheet>` in one step, so a failed import changes nothing.

use crate::cell::{format_number, parse_number, CellValue};
use crate::column::{Column, ColumnKind};
use crate::error::{Result, SheetError};
use crate::row::Row;
use crate::sheet::Sheet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Number of data rows inspected when inferring a column's kind.
pub const INFERENCE_SAMPLE_ROWS: usize = 10;

/// One source table: a name and its rows, header first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Create a table from rows (header first)
    #[must_use]
    pub fn new(name: &str, rows: Vec<Vec<CellValue>>) -> Self {
        RawTable {
            name: name.to_string(),
            rows,
        }
    }

    /// Build a sheet from this table, or `None` if the table has no rows at all.
    #[must_use]
    pub fn into_sheet(self) -> Option<Sheet> {
        let (header, data) = self.rows.split_first()?;
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);

        let columns: Vec<Column> = (0..width)
            .map(|i| {
                let name = header_name(header.get(i), i);
                let kind = infer_kind(data, i);
                debug!(table = %self.name, column = %name, %kind, "inferred column kind");
                Column::new(&name, kind)
            })
            .collect();

        if columns.is_empty() {
            return None;
        }

        let mut sheet = Sheet::with_columns(&self.name, columns);
        for source in data {
            let mut row = Row::blank(sheet.columns());
            for (i, column) in sheet.columns().iter().enumerate() {
                let value = source.get(i).cloned().unwrap_or_default();
                row.cells.insert(column.id.clone(), stored_value(value, column.kind));
            }
            sheet.push_row(row);
        }
        Some(sheet)
    }
}

/// Convert source tables to sheets, skipping tables with no rows.
///
/// Fails with [`SheetError::EmptyImport`] when nothing is left.
pub fn tables_to_sheets(tables: Vec<RawTable>) -> Result<Vec<Sheet>> {
    let mut sheets = Vec::with_capacity(tables.len());
    for table in tables {
        let name = table.name.clone();
        match table.into_sheet() {
            Some(sheet) => sheets.push(sheet),
            None => warn!(table = %name, "skipping empty table"),
        }
    }
    if sheets.is_empty() {
        return Err(SheetError::EmptyImport);
    }
    info!(sheets = sheets.len(), "import finished");
    Ok(sheets)
}

/// Infer the kind of column `index` from the first data rows.
///
/// `Number` only if at least one sampled cell has a value and every sampled
/// value is numeric; an all-empty sample is `Text`. Blank text counts as empty.
#[must_use]
pub fn infer_kind(data: &[Vec<CellValue>], index: usize) -> ColumnKind {
    let mut seen_value = false;
    for row in data.iter().take(INFERENCE_SAMPLE_ROWS) {
        match row.get(index) {
            None | Some(CellValue::Absent) => {}
            Some(CellValue::Text(s)) if s.trim().is_empty() => {}
            Some(value) if value.as_number().is_some() => seen_value = true,
            Some(_) => return ColumnKind::Text,
        }
    }
    if seen_value {
        ColumnKind::Number
    } else {
        ColumnKind::Text
    }
}

/// Value stored for a source cell in a column of the given kind.
///
/// Values past the sample window may not fit the inferred kind; those are
/// kept as text instead of being forced.
fn stored_value(value: CellValue, kind: ColumnKind) -> CellValue {
    match (kind, value) {
        (_, CellValue::Absent) => CellValue::Absent,
        (ColumnKind::Number, CellValue::Text(s)) => match parse_number(&s) {
            Some(n) => CellValue::Number(n),
            None if s.trim().is_empty() => CellValue::Absent,
            None => CellValue::Text(s),
        },
        (ColumnKind::Number, CellValue::Number(n)) if !n.is_finite() => CellValue::Absent,
        (ColumnKind::Number, number) => number,
        (ColumnKind::Text, CellValue::Number(n)) => CellValue::Text(format_number(n)),
        (ColumnKind::Text, text) => text,
    }
}

fn header_name(cell: Option<&CellValue>, index: usize) -> String {
    match cell.map(|c| c.to_string()) {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => format!("Column {}", index + 1),
    }
}

/// Map a raw text field to a cell: empty fields are absent.
pub(crate) fn text_field(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Absent
    } else {
        CellValue::Text(field.to_string())
    }
}

/// Import a file, choosing the reader by extension.
///
/// Supports: csv, tsv, json, xlsx, xlsm, xlsb, xls, ods. CSV, TSV and JSON
/// sources produce one sheet named after the file stem.
pub fn import_path<P: AsRef<Path>>(path: P) -> Result<Vec<Sheet>> {
    use crate::csv::CsvOptions;

    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SheetError::Import(format!("Invalid filename: {}", path.display())))?
        .to_string();

    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "read import source");

    match ext.as_str() {
        "csv" => crate::csv::import_csv(&bytes, &stem, &CsvOptions::default()),
        "tsv" => crate::csv::import_csv(&bytes, &stem, &CsvOptions::tsv()),
        "json" => crate::json::import_json(&bytes, &stem),
        #[cfg(not(target_arch = "wasm32"))]
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => crate::xlsx::import_spreadsheet(bytes),
        _ => Err(SheetError::Import(format!(
            "Unsupported file format: '{ext}'. Supported: csv, tsv, json, xlsx, xlsm, xlsb, xls, ods"
        ))),
    }
}
