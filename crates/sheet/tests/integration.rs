use stockgrid_sheet::{
    import_csv, import_path, CellValue, ColumnKind, Command, CsvOptions, Missing, Outcome,
    Rejection, Selection, SheetError, SheetId, Workbook,
};
use tempfile::tempdir;

/// Small deterministic generator so edit sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn assert_complete(book: &Workbook) {
    for sheet in book.sheets() {
        sheet.check_invariants().unwrap();
        for row in sheet.rows() {
            assert_eq!(row.cells.len(), sheet.col_count());
        }
    }
}

// ===== Structural Completeness =====

#[test]
fn test_random_edit_sequences_keep_rows_complete() {
    for seed in 0..20 {
        let mut rng = Lcg(seed);
        let mut book = Workbook::new();

        for _ in 0..200 {
            let sheet = book.sheets()[rng.next(book.sheet_count())].clone();
            let sid = sheet.id().clone();
            let col = sheet.columns()[rng.next(sheet.col_count())].id.clone();
            let row = (sheet.row_count() > 0)
                .then(|| sheet.rows()[rng.next(sheet.row_count())].id.clone());

            let command = match (rng.next(10), row) {
                (0, _) => Command::AddSheet,
                (1, _) => Command::DeleteSheet { sheet: sid },
                (2, _) => Command::AddColumn {
                    sheet: sid,
                    after: Some(col),
                },
                (3, _) => Command::DeleteColumn {
                    sheet: sid,
                    column: col,
                },
                (4, _) => Command::RetypeColumn {
                    sheet: sid,
                    column: col,
                },
                (5, Some(row)) => Command::WriteCell {
                    sheet: sid,
                    row,
                    column: col,
                    value: format!("{}", rng.next(100)),
                },
                (6, Some(row)) => Command::DeleteRow { sheet: sid, row },
                (7, Some(row)) => Command::ToggleRowSelected { sheet: sid, row },
                _ => Command::AddRow {
                    sheet: sid,
                    after: None,
                },
            };
            let _ = book.execute(&command);

            assert!(book.sheet_count() >= 1);
            assert!(book.sheet(book.active_sheet_id()).is_some());
        }

        assert_complete(&book);
    }
}

#[test]
fn test_last_sheet_and_last_column_protected() {
    let mut book = Workbook::new();
    let sid = book.active_sheet_id().clone();
    let columns: Vec<_> = book
        .active_sheet()
        .columns()
        .iter()
        .map(|c| c.id.clone())
        .collect();

    assert!(book.delete_column(&sid, &columns[0]).is_applied());
    assert!(book.delete_column(&sid, &columns[1]).is_applied());
    assert_eq!(
        book.delete_column(&sid, &columns[2]),
        Outcome::Rejected(Rejection::LastColumn)
    );
    assert_eq!(book.active_sheet().col_count(), 1);

    assert_eq!(
        book.delete_sheet(&sid),
        Outcome::Rejected(Rejection::LastSheet)
    );
    assert_eq!(book.sheet_count(), 1);
}

#[test]
fn test_stale_ids_report_not_found() {
    let mut book = Workbook::new();
    let ghost = SheetId::from("ghost");

    assert_eq!(
        book.add_row(&ghost, None),
        Err(Missing::Sheet(ghost.clone()))
    );
    let (next, outcome) = book.apply(&Command::RenameSheet {
        sheet: ghost.clone(),
        name: "x".to_string(),
    });
    assert_eq!(outcome, Outcome::NotFound(Missing::Sheet(ghost)));
    assert_eq!(next, book);
}

// ===== Cell Coercion =====

#[test]
fn test_number_column_coercion() {
    let mut book = Workbook::new();
    let sid = book.active_sheet_id().clone();
    let stock = book.active_sheet().columns()[1].id.clone();
    let row = book.add_row(&sid, None).unwrap();

    for (raw, expected) in [
        ("12.5", CellValue::Number(12.5)),
        ("", CellValue::Absent),
        ("abc", CellValue::Absent),
        ("  7 ", CellValue::Number(7.0)),
    ] {
        assert!(book.write_cell(&sid, &row, &stock, raw).is_applied());
        assert_eq!(book.active_sheet().get(&row, &stock), Some(&expected));
    }
}

#[test]
fn test_retype_keeps_values() {
    let mut book = Workbook::new();
    let sid = book.active_sheet_id().clone();
    let name = book.active_sheet().columns()[0].id.clone();
    let row = book.add_row(&sid, None).unwrap();
    book.write_cell(&sid, &row, &name, "Arandela");

    assert!(book.retype_column(&sid, &name).is_applied());
    let sheet = book.active_sheet();
    assert_eq!(sheet.column(&name).unwrap().kind, ColumnKind::Number);
    assert_eq!(sheet.get(&row, &name), Some(&CellValue::from("Arandela")));
    assert_eq!(sheet.get(&row, &name).unwrap().as_number(), None);
}

// ===== Export =====

#[test]
fn test_selected_only_export_falls_back() {
    let data = "Producto,Stock\nA,1\nB,2\nC,3\n";
    let mut book = Workbook::new();
    book.replace_with_import(import_csv(data.as_bytes(), "inv", &CsvOptions::default()).unwrap())
        .unwrap();
    let sid = book.active_sheet_id().clone();

    assert_eq!(book.active_sheet().export(Selection::SelectedOnly).len(), 3);

    let second = book.active_sheet().rows()[1].id.clone();
    book.toggle_row_selected(&sid, &second);
    let records = book.active_sheet().export(Selection::SelectedOnly);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["Producto"], CellValue::from("B"));

    book.select_all(&sid, true);
    assert_eq!(book.active_sheet().selected_count(), 3);
    book.select_all(&sid, false);
    assert_eq!(book.active_sheet().selected_count(), 0);
}

// ===== Import =====

#[test]
fn test_import_csv_then_append() {
    let mut book = Workbook::new();
    let original_active = book.active_sheet_id().clone();

    let sheets = import_csv(b"a\n1\n", "extra", &CsvOptions::default()).unwrap();
    book.append_import(sheets).unwrap();

    assert_eq!(book.sheet_names(), vec!["Sheet 1", "extra"]);
    assert_eq!(book.active_sheet_id(), &original_active);
    assert_complete(&book);
}

#[test]
fn test_failed_import_leaves_workbook_unchanged() {
    let mut book = Workbook::new();
    let before = book.clone();

    let result = import_csv(b"", "empty", &CsvOptions::default());
    assert!(matches!(result, Err(SheetError::EmptyImport)));
    assert!(book.replace_with_import(Vec::new()).is_err());
    assert_eq!(book, before);
}

#[test]
fn test_xlsx_file_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("inventario.xlsx");

    let mut book = Workbook::new();
    let sid = book.active_sheet_id().clone();
    book.rename_sheet(&sid, "Almacén");
    let columns: Vec<_> = book
        .active_sheet()
        .columns()
        .iter()
        .map(|c| c.id.clone())
        .collect();
    for (name, stock, cost) in [("Tornillo", "5", "0.1"), ("Tuerca", "80", "0.05")] {
        let row = book.add_row(&sid, None).unwrap();
        book.write_cell(&sid, &row, &columns[0], name);
        book.write_cell(&sid, &row, &columns[1], stock);
        book.write_cell(&sid, &row, &columns[2], cost);
    }
    book.save_as_xlsx(&path).unwrap();

    let sheets = import_path(&path).unwrap();
    let mut reloaded = Workbook::new();
    reloaded.replace_with_import(sheets).unwrap();

    let sheet = reloaded.sheet_by_name("Almacén").unwrap();
    let kinds: Vec<_> = sheet.columns().iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![ColumnKind::Text, ColumnKind::Number, ColumnKind::Number]
    );
    assert_eq!(
        sheet.export(Selection::All),
        book.active_sheet().export(Selection::All)
    );
}

#[test]
fn test_import_path_csv_uses_file_stem() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pedidos.csv");
    std::fs::write(&path, "Producto,Stock\nA,3\n").unwrap();

    let sheets = import_path(&path).unwrap();
    assert_eq!(sheets[0].name(), "pedidos");
    assert_eq!(sheets[0].row_count(), 1);
}

// ===== Commands =====

#[test]
fn test_command_script_from_json() {
    let book = Workbook::new();
    let sid = book.active_sheet_id().clone();

    let script = format!(
        r#"[
            {{"op": "rename_sheet", "sheet": "{sid}", "name": "Inventario"}},
            {{"op": "add_sheet"}},
            {{"op": "add_column", "sheet": "{sid}"}}
        ]"#
    );
    let commands: Vec<Command> = serde_json::from_str(&script).unwrap();

    let mut state = book.clone();
    for command in &commands {
        let (next, outcome) = state.apply(command);
        assert!(outcome.is_applied(), "{command:?} -> {outcome}");
        state = next;
    }

    assert_eq!(state.sheet_names(), vec!["Inventario", "Sheet 2"]);
    let names: Vec<_> = state
        .active_sheet()
        .columns()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["Producto", "Stock Actual", "Coste Unit.", "Column 4"]
    );
    // The original value is untouched
    assert_eq!(book.sheet_names(), vec!["Sheet 1"]);
}
