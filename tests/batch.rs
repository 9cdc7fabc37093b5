use std::io::{Cursor, Read};

use gaspar_remap::loader::{first_sheet, load_mapping};
use gaspar_remap::{MappingTable, NOT_FOUND, RemapError, Table, process_batch};
use rust_xlsxwriter::{Workbook, Worksheet};
use zip::ZipArchive;

enum Value<'a> {
    Text(&'a str),
    Number(f64),
}

use Value::{Number, Text};

// Build an xlsx workbook in memory, one (name, header, rows) per sheet
fn workbook(sheets: &[(&str, &[&str], &[&[Value]])]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (name, header, rows) in sheets {
        let mut worksheet = Worksheet::new();
        worksheet.set_name(*name).unwrap();
        for (c, title) in header.iter().enumerate() {
            worksheet.write_string(0, c as u16, *title).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = ((r + 1) as u32, c as u16);
                match value {
                    Text(text) => worksheet.write_string(r, c, *text).unwrap(),
                    Number(n) => worksheet.write_number(r, c, *n).unwrap(),
                };
            }
        }
        workbook.push_worksheet(worksheet);
    }
    workbook.save_to_buffer().unwrap()
}

fn mapping_workbook() -> Vec<u8> {
    workbook(&[(
        "Mapping",
        &["ViddlerMediaId", "GasparMediaId"],
        &[
            &[Text("v1"), Text("g1")],
            &[Text("v2"), Text("g2")],
            &[Text("abc123"), Text("xyz789")],
        ],
    )])
}

fn read_entry(archive: &[u8], name: &str) -> Table {
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut data = Vec::new();
    zip.by_name(name).unwrap().read_to_end(&mut data).unwrap();
    first_sheet(&data).unwrap()
}

fn column<'a>(table: &'a Table, name: &str) -> Vec<&'a str> {
    table
        .column(name)
        .unwrap_or_else(|| panic!("missing column {}", name))
        .collect()
}

#[test]
fn end_to_end_viddler_column() {
    let mapping = load_mapping(&mapping_workbook()).unwrap();
    let batch = workbook(&[(
        "Sheet1",
        &["Title", "Viddler ID", "Notes"],
        &[
            &[Text("first"), Text("v1"), Text("a")],
            &[Text("second"), Text("v3"), Text("b")],
        ],
    )]);

    let report = process_batch([("batch.xlsx", batch.as_slice())], &mapping).unwrap();
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.processed, vec!["batch.xlsx_updated.xlsx"]);

    let output = read_entry(&report.archive, "batch.xlsx_updated.xlsx");
    assert_eq!(output.columns, vec!["Title", "Viddler ID", "Gaspar ID", "Notes"]);
    assert_eq!(column(&output, "Gaspar ID"), vec!["g1", NOT_FOUND]);
    assert_eq!(column(&output, "Notes"), vec!["a", "b"]);
}

#[test]
fn media_id_and_embed_columns() {
    let mapping = load_mapping(&mapping_workbook()).unwrap();
    let batch = workbook(&[(
        "Sheet1",
        &["id", "EMBED", "Media ID"],
        &[
            &[Text("v2"), Text("<old>"), Text("lesson_viddler_abc123_part1")],
            &[Text("v9"), Text("<old>"), Text("lesson_part2")],
        ],
    )]);

    let report = process_batch([("course.xlsx", batch.as_slice())], &mapping).unwrap();
    let output = read_entry(&report.archive, "course.xlsx_updated.xlsx");

    assert_eq!(
        output.columns,
        vec!["id", "Gaspar ID", "EMBED", "EMBED Updated", "Media ID", "Media ID Updated"]
    );
    assert_eq!(column(&output, "Gaspar ID"), vec!["g2", NOT_FOUND]);

    let embeds = column(&output, "EMBED Updated");
    assert!(embeds[0].contains("play.html?id=g2'"), "bad embed: {}", embeds[0]);
    assert_eq!(embeds[1], NOT_FOUND);

    assert_eq!(
        column(&output, "Media ID Updated"),
        vec!["lesson_gaspar_xyz789_part1", NOT_FOUND]
    );
}

#[test]
fn malformed_file_is_reported_and_skipped() {
    let mapping = load_mapping(&mapping_workbook()).unwrap();
    let good = workbook(&[("Sheet1", &["Viddler"], &[&[Text("v1")]])]);
    let other = workbook(&[("Sheet1", &["Media ID"], &[&[Text("x_viddler_abc123_")]])]);
    let broken = b"this is not a workbook".to_vec();

    let files = [
        ("good.xlsx", good.as_slice()),
        ("broken.xlsx", broken.as_slice()),
        ("notes.txt", good.as_slice()),
        ("other.xlsx", other.as_slice()),
    ];
    let report = process_batch(files, &mapping).unwrap();

    assert_eq!(
        report.processed,
        vec!["good.xlsx_updated.xlsx", "other.xlsx_updated.xlsx"]
    );
    let failed: Vec<&str> = report.errors.iter().map(|e| e.file.as_str()).collect();
    assert_eq!(failed, vec!["broken.xlsx", "notes.txt"]);

    let zip = ZipArchive::new(Cursor::new(report.archive.as_slice())).unwrap();
    assert_eq!(zip.len(), 2);
}

#[test]
fn numeric_ids_match_as_text() {
    let mapping = load_mapping(&workbook(&[(
        "Sheet1",
        &["ViddlerMediaId", "GasparMediaId"],
        &[&[Number(123.0), Text("g123")]],
    )]))
    .unwrap();
    assert_eq!(mapping.resolve("123"), "g123");

    let batch = workbook(&[("Sheet1", &["ID"], &[&[Number(123.0)], &[Text("0123")]])]);
    let report = process_batch([("nums.xlsx", batch.as_slice())], &mapping).unwrap();
    let output = read_entry(&report.archive, "nums.xlsx_updated.xlsx");

    assert_eq!(column(&output, "Gaspar ID"), vec!["g123", NOT_FOUND]);
}

#[test]
fn mapping_from_several_sheets_last_wins() {
    let data = workbook(&[
        ("Notes", &["Anything"], &[&[Text("ignored")]]),
        (
            "First",
            &["ViddlerMediaId", "GasparMediaId"],
            &[&[Text("v1"), Text("old")], &[Text("v2"), Text("g2")]],
        ),
        (
            "Second",
            &["GasparMediaId", "ViddlerMediaId"],
            &[&[Text("new"), Text("v1")]],
        ),
    ]);

    let mapping = load_mapping(&data).unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.resolve("v1"), "new");
    assert_eq!(mapping.resolve("v2"), "g2");
}

#[test]
fn mapping_without_required_columns_is_incomplete() {
    let data = workbook(&[("Sheet1", &["Viddler", "Gaspar"], &[&[Text("v1"), Text("g1")]])]);
    assert!(matches!(load_mapping(&data), Err(RemapError::MappingIncomplete)));

    assert!(matches!(
        load_mapping(b"garbage"),
        Err(RemapError::Workbook(_))
    ));
}

#[test]
fn empty_mapping_resolves_everything_to_sentinel() {
    let mapping = MappingTable::new();
    let batch = workbook(&[("Sheet1", &["viddler"], &[&[Text("v1")]])]);
    let report = process_batch([("b.xlsx", batch.as_slice())], &mapping).unwrap();
    let output = read_entry(&report.archive, "b.xlsx_updated.xlsx");

    assert_eq!(column(&output, "Gaspar ID"), vec![NOT_FOUND]);
}
