//! DOCX templates: the zip package plus an editable view of the tables in
//! `word/document.xml`.

mod model;
mod xml;

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub use model::{Cell, CellId, Layout, Paragraph, ParagraphId, Row, Run, Table};
pub(crate) use model::TextSlot;

use crate::error::{FillError, Result};

/// Main document part inside the package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Read one part out of a DOCX package.
fn read_part(package: &[u8], part_name: &str) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(package))?;
    let mut entry = archive.by_name(part_name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => FillError::MissingPart(part_name.to_string()),
        other => FillError::Package(other),
    })?;
    let mut raw = Vec::new();
    entry.read_to_end(&mut raw)?;
    Ok(raw)
}

/// A loaded DOCX template.
///
/// Cloning is the supported way to fill the same template several times:
/// the package bytes and table layout are shared, the paragraph text is
/// copied, so edits to one clone never leak into another.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    package: Arc<[u8]>,
    source_xml: Arc<str>,
    layout: Arc<Layout>,
    paragraphs: Vec<Paragraph>,
}

impl TemplateDocument {
    /// Parse a DOCX package held in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes: Vec<u8> = bytes.into();
        let raw = read_part(&bytes, DOCUMENT_PART)?;
        let source_xml =
            String::from_utf8(raw).map_err(|_| FillError::Encoding(DOCUMENT_PART.to_string()))?;

        let (layout, paragraphs) = xml::parse_document(&source_xml)?;
        debug!(
            "Parsed template: {} tables, {} cell paragraphs",
            layout.tables().len(),
            paragraphs.len()
        );

        Ok(Self {
            package: Arc::from(bytes),
            source_xml: Arc::from(source_xml),
            layout: Arc::new(layout),
            paragraphs,
        })
    }

    /// Read and parse a DOCX file.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let template = Self::from_bytes(bytes)?;
        info!("Template loaded from {:?}", path);
        Ok(template)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn tables(&self) -> &[Table] {
        self.layout.tables()
    }

    pub fn paragraph(&self, id: ParagraphId) -> &Paragraph {
        &self.paragraphs[id]
    }

    /// Table structure alongside mutable paragraphs, for passes that walk the
    /// tables while rewriting text.
    pub fn parts_mut(&mut self) -> (&Layout, &mut [Paragraph]) {
        (self.layout.as_ref(), self.paragraphs.as_mut_slice())
    }

    /// Text of the cell at a grid position, paragraphs joined by newlines.
    pub fn cell_text(&self, table: usize, row: usize, col: usize) -> Option<String> {
        let id = *self.tables().get(table)?.rows.get(row)?.cells.get(col)?;
        let paragraphs = &self.layout.cell(id).paragraphs;
        let texts: Vec<String> = paragraphs.iter().map(|&p| self.paragraphs[p].text()).collect();
        Some(texts.join("\n"))
    }

    pub fn is_modified(&self) -> bool {
        self.paragraphs.iter().any(Paragraph::is_modified)
    }

    /// Current `word/document.xml` with all edits applied.
    pub fn document_xml(&self) -> String {
        xml::render_document(&self.source_xml, &self.paragraphs)
    }

    /// Write the package to `sink`.
    ///
    /// Parts other than the main document are copied without recompression,
    /// and so is the main document itself when nothing was edited.
    pub fn write_to<W: Write + Seek>(&self, sink: W) -> Result<W> {
        let mut archive = ZipArchive::new(Cursor::new(&self.package[..]))?;
        let mut writer = ZipWriter::new(sink);
        let rewrite = self.is_modified();

        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            if rewrite && entry.name() == DOCUMENT_PART {
                let name = entry.name().to_string();
                drop(entry);
                let options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                writer.start_file(name, options)?;
                writer.write_all(self.document_xml().as_bytes())?;
            } else {
                writer.raw_copy_file(entry)?;
            }
        }

        Ok(writer.finish()?)
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.write_to(file)?;
        info!("Document saved to: {:?}", path);
        Ok(())
    }
}
