use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::import::{tables_to_sheets, RawTable};
use crate::sheet::Sheet;
use crate::workbook::Workbook;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Workbook as XlsxWorkbook, Worksheet, XlsxError};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Longest worksheet name Excel accepts.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Absent,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Absent,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => {
            // Excel stores dates as days since 1899-12-30
            CellValue::Number(dt.as_f64())
        }
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#ERROR: {e:?}")),
    }
}

/// Import every worksheet of a spreadsheet file (xlsx, xlsm, xlsb, xls, ods).
///
/// One sheet per non-empty worksheet, named after it. Any read error fails
/// the whole import.
pub fn import_spreadsheet(bytes: Vec<u8>) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SheetError::Import(e.to_string()))?;

    let mut tables = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SheetError::Import(format!("worksheet '{sheet_name}': {e}")))?;

        let rows: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(data_to_cell_value).collect())
            .collect();
        debug!(worksheet = %sheet_name, rows = rows.len(), "read worksheet");
        tables.push(RawTable::new(&sheet_name, rows));
    }

    tables_to_sheets(tables)
}

fn xlsx_error(e: XlsxError) -> SheetError {
    SheetError::Serialize(format!("XLSX write error: {e}"))
}

impl Sheet {
    /// Write the full grid to a worksheet: a header row of column names,
    /// then every row. `Absent` cells are left empty.
    fn write_to_worksheet(&self, worksheet: &mut Worksheet) -> Result<()> {
        for (col_idx, column) in self.columns().iter().enumerate() {
            let col_num = u16::try_from(col_idx)
                .map_err(|_| SheetError::Serialize("Column index overflow".to_string()))?;
            worksheet
                .write_string(0, col_num, &column.name)
                .map_err(xlsx_error)?;
        }

        for (row_idx, row) in self.rows().iter().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| SheetError::Serialize("Row index overflow".to_string()))?;
            for (col_idx, column) in self.columns().iter().enumerate() {
                let col_num = u16::try_from(col_idx)
                    .map_err(|_| SheetError::Serialize("Column index overflow".to_string()))?;

                match row.get(&column.id) {
                    CellValue::Absent => {} // Leave empty
                    CellValue::Number(n) => {
                        worksheet
                            .write_number(row_num, col_num, *n)
                            .map_err(xlsx_error)?;
                    }
                    CellValue::Text(s) => {
                        worksheet
                            .write_string(row_num, col_num, s)
                            .map_err(xlsx_error)?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Workbook {
    /// Serialize every sheet to xlsx bytes, one worksheet per sheet.
    ///
    /// Worksheet names are sanitized and made unique, since sheet names in
    /// the workbook are free-form.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = XlsxWorkbook::new();
        let mut used = HashSet::new();

        for sheet in self.sheets() {
            let name = worksheet_name(sheet.name(), &mut used);
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&name).map_err(xlsx_error)?;
            sheet.write_to_worksheet(worksheet)?;
        }

        workbook.save_to_buffer().map_err(xlsx_error)
    }

    /// Save the workbook to an xlsx file
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_xlsx_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Make `name` a legal, unused worksheet name.
///
/// Strips characters Excel forbids, truncates to 31 characters, and
/// appends `_1`, `_2`, ... on a case-insensitive clash.
fn worksheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned.chars().take(MAX_SHEET_NAME_LEN).collect()
    };

    let mut candidate = base.clone();
    let mut suffix = 1;
    while used.contains(&candidate.to_lowercase()) {
        let tail = format!("_{suffix}");
        let keep = MAX_SHEET_NAME_LEN - tail.chars().count();
        candidate = format!("{}{tail}", base.chars().take(keep).collect::<String>());
        suffix += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}
