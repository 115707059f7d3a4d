use crate::cell::CellValue;
use crate::error::Result;
use crate::export::Selection;
use crate::import::{tables_to_sheets, text_field, RawTable};
use crate::sheet::Sheet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// CSV reader/writer options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvOptions {
    /// Create options for TSV (tab-separated values)
    #[must_use]
    pub fn tsv() -> Self {
        CsvOptions {
            delimiter: b'\t',
            ..Default::default()
        }
    }
}

/// Import CSV bytes as a single table named `name`.
///
/// The first record is the header. Empty fields become `Absent`; column
/// kinds are inferred like any other import.
pub fn import_csv(bytes: &[u8], name: &str, options: &CsvOptions) -> Result<Vec<Sheet>> {
    let table = read_table(bytes, name, options)?;
    tables_to_sheets(vec![table])
}

fn read_table<R: Read>(reader: R, name: &str, options: &CsvOptions) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .quote(options.quote)
        .has_headers(false) // We handle headers ourselves
        .flexible(true)
        .from_reader(reader);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        rows.push(record.iter().map(text_field).collect());
    }

    Ok(RawTable::new(name, rows))
}

impl Sheet {
    /// Write the export projection as CSV: a header of column names, then
    /// one line per exported row. `Absent` is an empty field.
    pub fn write_csv<W: Write>(
        &self,
        writer: W,
        selection: Selection,
        options: &CsvOptions,
    ) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .from_writer(writer);

        let names = self.export_names();
        csv_writer.write_record(&names)?;

        for record in self.export(selection) {
            let line: Vec<String> = names
                .iter()
                .map(|n| record.get(*n).map(CellValue::as_str).unwrap_or_default())
                .collect();
            csv_writer.write_record(&line)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Save the export projection to a CSV file
    pub fn save_as_csv<P: AsRef<Path>>(&self, path: P, selection: Selection) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_csv(writer, selection, &CsvOptions::default())
    }

    /// Convert the export projection to a CSV string
    pub fn to_csv_string(&self, selection: Selection) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer, selection, &CsvOptions::default())?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
