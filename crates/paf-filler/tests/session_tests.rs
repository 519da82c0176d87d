use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use paf_core::{CellValue, CenterId, Column, Dataset, FormFiller, TemplateDocument};
use paf_filler::{DocumentViewer, OutputLocator, ProfileDirLocator, Session, SessionSummary};
use pretty_assertions::assert_eq;
use rstest::*;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn template() -> TemplateDocument {
    let xml = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="{}"><w:body><w:tbl><w:tr>"#,
            r#"<w:tc><w:p><w:r><w:t>{{FULL_NAME}}</w:t></w:r></w:p></w:tc>"#,
            r#"<w:tc><w:p><w:r><w:t>{{</w:t></w:r>"#,
            r#"<w:r><w:t>CURRENT_DATE}}</w:t></w:r></w:p></w:tc>"#,
            r#"</w:tr></w:tbl><w:sectPr/></w:body></w:document>"#,
        ),
        W_NS
    );
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    TemplateDocument::from_bytes(writer.finish().unwrap().into_inner()).unwrap()
}

fn dataset() -> Dataset {
    let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
    let mut row = vec![CellValue::Empty; 16];
    row[0] = CellValue::Float(1042.0);
    row[1] = CellValue::Text("Mei".to_string());
    row[2] = CellValue::Text("Chan".to_string());
    Dataset::from_table(&headers, &[row]).unwrap()
}

#[fixture]
fn filler() -> FormFiller {
    let mut filler = FormFiller::new(dataset());
    filler.set_template(template());
    filler
}

#[derive(Default)]
struct RecordingViewer {
    opened: RefCell<Vec<PathBuf>>,
}

impl DocumentViewer for RecordingViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        self.opened.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

struct BrokenViewer;

impl DocumentViewer for BrokenViewer {
    fn open(&self, _path: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no opener"))
    }
}

fn run(session: &Session, script: &str) -> (SessionSummary, String) {
    let mut out = Vec::new();
    let summary = session.run(Cursor::new(script.as_bytes()), &mut out).unwrap();
    (summary, String::from_utf8(out).unwrap())
}

#[rstest]
fn test_interactive_fill_saves_and_opens(filler: FormFiller) {
    let dir = TempDir::new().unwrap();
    let locator = ProfileDirLocator::new(dir.path());
    let viewer = RecordingViewer::default();
    let session = Session::new(&filler, &locator).with_viewer(&viewer);

    let (summary, out) = run(&session, "1042\n01/02/2025\nexit\n");

    let expected = dir.path().join("1042").join("PAF-01-02-2025.docx");
    assert_eq!(summary, SessionSummary { written: 1, failed: 0 });
    assert!(out.contains("Enter Center id: Enter date string: "));
    assert!(out.contains(&format!("Document saved to: {}", expected.display())));
    assert!(out.ends_with("exiting program\n"));
    assert_eq!(viewer.opened.borrow().as_slice(), &[expected.clone()]);

    let saved = TemplateDocument::open(&expected).unwrap();
    assert_eq!(saved.cell_text(0, 0, 0).as_deref(), Some("Mei Chan"));
    assert_eq!(saved.cell_text(0, 0, 1).as_deref(), Some("01/02/2025"));
}

#[rstest]
fn test_bad_input_is_reported_and_skipped(filler: FormFiller) {
    let dir = TempDir::new().unwrap();
    let locator = ProfileDirLocator::new(dir.path());
    let session = Session::new(&filler, &locator);

    let script = "\nabc\n1042\n2025-01-02\n999\n01/02/2025\n1042\n1-2-2025\nq\n";
    let (summary, out) = run(&session, script);

    assert_eq!(summary, SessionSummary { written: 1, failed: 1 });
    assert!(out.contains("error: invalid digit found in string"));
    assert!(out.contains("Please enter a valid date. 2025-01-02 is invalid"));
    assert!(out.contains("No data found for Center_ID: 999"));
    assert!(dir.path().join("1042").join("PAF-1-2-2025.docx").exists());
    assert!(!dir.path().join("999").exists());
}

#[rstest]
fn test_end_of_input_ends_session(filler: FormFiller) {
    let dir = TempDir::new().unwrap();
    let locator = ProfileDirLocator::new(dir.path());
    let session = Session::new(&filler, &locator);

    let (summary, _) = run(&session, "1042\n");
    assert_eq!(summary, SessionSummary::default());
}

#[rstest]
fn test_viewer_failure_does_not_fail_fill(filler: FormFiller) {
    let dir = TempDir::new().unwrap();
    let locator = ProfileDirLocator::new(dir.path());
    let viewer = BrokenViewer;
    let session = Session::new(&filler, &locator).with_viewer(&viewer);

    let path = session.fill_one(CenterId(1042), "01-02-2025", &mut io::sink()).unwrap();
    assert_eq!(path, locator.locate(CenterId(1042), "01-02-2025"));
    assert!(path.exists());
}

#[rstest]
fn test_field_dump_prints_json(filler: FormFiller) {
    let dir = TempDir::new().unwrap();
    let locator = ProfileDirLocator::new(dir.path());
    let session = Session::new(&filler, &locator).with_field_dump(true);

    let mut out = Vec::new();
    session.fill_one(CenterId(1042), "01/02/2025", &mut out).unwrap();

    let dumped: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(dumped["{FULL_NAME}"], "Mei Chan");
    assert_eq!(dumped["{CURRENT_DATE}"], "01/02/2025");
    assert_eq!(dumped.as_object().unwrap().len(), 15);
}

#[rstest]
fn test_refilling_same_day_overwrites(filler: FormFiller) {
    let dir = TempDir::new().unwrap();
    let locator = ProfileDirLocator::new(dir.path());
    let session = Session::new(&filler, &locator);

    let (summary, _) = run(&session, "1042\n01/02/2025\n1042\n01/02/2025\nexit\n");
    assert_eq!(summary.written, 2);
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("1042")).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
