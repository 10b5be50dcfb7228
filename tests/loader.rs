use std::collections::HashMap;

use fleet_intake::data::{Cell, Value, normalize_label};
use fleet_intake::error::IntakeError;
use fleet_intake::loader::{SourceFile, load};
use proptest::prelude::*;

fn csv_file(name: &str, content: &str) -> SourceFile {
    SourceFile::new(name, content.as_bytes().to_vec())
}

/// Collects a record set into a multiset of (label, cell) rows so tests can
/// compare content independent of row order.
fn row_multiset(records: &fleet_intake::data::RecordSet) -> HashMap<Vec<(String, Cell)>, usize> {
    let mut multiset = HashMap::new();
    for row in records.rows() {
        let mut keyed: Vec<(String, Cell)> = records
            .columns()
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        *multiset.entry(keyed).or_insert(0) += 1;
    }
    multiset
}

#[test]
fn differently_cased_labels_merge_into_one_column() {
    let records = load(&[
        csv_file("a.csv", "poc,id_motorista\n1,ana\n"),
        csv_file("b.csv", "ID_MOTORISTA,carro\nbia,v9\n"),
    ])
    .unwrap();
    assert_eq!(records.columns(), ["poc", "id_motorista", "carro"]);
    assert_eq!(records.row_count(), 2);
}

#[test]
fn load_order_changes_row_order_but_not_content() {
    let a = csv_file("a.csv", "poc,motorista\n1,ana\n2,bia\n");
    let b = csv_file("b.csv", "motorista,carro\ncai,v1\n");

    let forward = load(&[a.clone(), b.clone()]).unwrap();
    let backward = load(&[b, a]).unwrap();

    assert_ne!(forward.columns(), backward.columns());
    assert_eq!(row_multiset(&forward), row_multiset(&backward));
}

#[test]
fn per_file_row_order_is_preserved() {
    let records = load(&[csv_file("a.csv", "poc\n3\n1\n2\n")]).unwrap();
    let values: Vec<String> = records
        .rows()
        .iter()
        .map(|row| row[0].as_ref().unwrap().as_display())
        .collect();
    assert_eq!(values, ["3", "1", "2"]);
}

#[test]
fn semicolon_retry_happens_per_file() {
    let records = load(&[
        csv_file("comma.csv", "carro,placa\nv1,abc\n"),
        csv_file("semicolon.csv", "carro;placa\nv2;def\n"),
    ])
    .unwrap();
    assert_eq!(records.columns(), ["carro", "placa"]);
    assert_eq!(records.row_count(), 2);
}

/// Authors a one-sheet workbook in memory: a header row with mixed casing
/// and padding, then rows covering numeric, text, boolean, empty, and
/// error cells.
fn minimal_xlsx() -> Vec<u8> {
    use std::io::Write as _;
    use zip::write::{ExtendedFileOptions, FileOptions};

    const PARTS: &[(&str, &str)] = &[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Plan1" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
        ),
        (
            "xl/worksheets/sheet1.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t xml:space="preserve"> POC </t></is></c><c r="B1" t="inlineStr"><is><t>Motorista</t></is></c><c r="C1" t="inlineStr"><is><t>Ativo</t></is></c></row>
<row r="2"><c r="A2"><v>101</v></c><c r="B2" t="inlineStr"><is><t>ana</t></is></c><c r="C2" t="b"><v>1</v></c></row>
<row r="3"><c r="A3"><v>102.5</v></c><c r="C3" t="b"><v>0</v></c></row>
<row r="4"><c r="A4" t="e"><v>#DIV/0!</v></c><c r="B4" t="inlineStr"><is><t>bia</t></is></c></row>
</sheetData></worksheet>"#,
        ),
    ];

    let mut buffer = Vec::new();
    {
        let mut archive = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
        for (name, content) in PARTS {
            let options = FileOptions::<ExtendedFileOptions>::default();
            archive.start_file(*name, options).expect("start entry");
            archive
                .write_all(content.as_bytes())
                .expect("write entry");
        }
        archive.finish().expect("finish workbook");
    }
    buffer
}

#[test]
fn spreadsheet_first_sheet_loads_with_typed_cells() {
    let records = load(&[SourceFile::new("export.xlsx", minimal_xlsx())]).unwrap();

    assert_eq!(records.columns(), ["poc", "motorista", "ativo"]);
    assert_eq!(records.row_count(), 3);
    assert_eq!(
        records.rows()[0],
        vec![
            Some(Value::Number(101.0)),
            Some(Value::Text("ana".into())),
            Some(Value::Text("true".into())),
        ]
    );
    // Absent cells inside the sheet's extent come through as null.
    assert_eq!(
        records.rows()[1],
        vec![
            Some(Value::Number(102.5)),
            None,
            Some(Value::Text("false".into())),
        ]
    );
    // Error cells are null; the rest of the row survives.
    assert_eq!(
        records.rows()[2],
        vec![None, Some(Value::Text("bia".into())), None]
    );
}

#[test]
fn spreadsheet_and_csv_uploads_merge_into_one_record_set() {
    let records = load(&[
        SourceFile::new("export.xlsx", minimal_xlsx()),
        csv_file("extra.csv", "poc,placa\n103,abc1234\n"),
    ])
    .unwrap();

    assert_eq!(records.columns(), ["poc", "motorista", "ativo", "placa"]);
    assert_eq!(records.row_count(), 4);
    assert_eq!(records.rows()[3][0], Some(Value::Number(103.0)));
    assert_eq!(records.rows()[3][3], Some(Value::Text("abc1234".into())));
}

#[test]
fn corrupt_spreadsheet_fails_with_its_file_name() {
    let err = load(&[SourceFile::new("junk.xlsx", vec![0u8; 16])]).unwrap_err();
    match err {
        IntakeError::Format { file, .. } => assert_eq!(file, "junk.xlsx"),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn one_bad_file_aborts_the_whole_load() {
    let err = load(&[
        csv_file("good.csv", "poc\n1\n"),
        csv_file("bad.csv", "a,b\n1,2,3\n"),
    ])
    .unwrap_err();
    match err {
        IntakeError::Format { file, .. } => assert_eq!(file, "bad.csv"),
        other => panic!("expected format error, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn normalize_label_is_idempotent(label in ".{0,40}") {
        let once = normalize_label(&label);
        prop_assert_eq!(normalize_label(&once), once.clone());
    }

    #[test]
    fn normalized_labels_have_no_edge_whitespace(label in ".{0,40}") {
        let normalized = normalize_label(&label);
        prop_assert_eq!(normalized.trim(), normalized.as_str());
    }
}
