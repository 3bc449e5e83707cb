// 📄 Page Reader - document bytes → lazy sequence of per-page payloads
//
// One trait, three decoders:
// - PDF (lopdf): text per page, no table detection
// - Page dump (JSON): text + tables produced by an external table detector
// - Plain text: form-feed separated pages, `|` / TAB delimited lines become table rows

use crate::error::{ExtractionError, PageReadError};
use lopdf::Document;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// One table cell; empty cells are `None`
pub type Cell = Option<String>;
pub type TableRow = Vec<Cell>;
pub type Table = Vec<TableRow>;

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    PageDump,
    PlainText,
}

impl DocumentFormat {
    pub fn name(&self) -> &str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::PageDump => "Page dump",
            DocumentFormat::PlainText => "Plain text",
        }
    }
}

/// Identity of the document a run was made from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentId {
    /// File name as given by the caller
    pub name: String,

    /// SHA-256 of the document bytes, hex encoded
    pub sha256: String,

    pub format: DocumentFormat,
}

impl DocumentId {
    pub fn for_bytes(name: &str, bytes: &[u8], format: DocumentFormat) -> Self {
        let digest = Sha256::digest(bytes);
        DocumentId {
            name: name.to_string(),
            sha256: digest.iter().map(|b| format!("{:02x}", b)).collect(),
            format,
        }
    }
}

/// Content of one page: trimmed non-empty lines plus detected tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePayload {
    pub page_index: usize,
    pub text_lines: Vec<String>,
    pub tables: Vec<Table>,

    /// For each table, the number of text lines that precede it in reading order.
    /// Tables without a position follow all text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_positions: Vec<usize>,
}

impl PagePayload {
    /// Build a payload from raw page text and raw tables, applying the trimming rules
    pub fn from_text(page_index: usize, text: &str, tables: Vec<Table>) -> Self {
        PagePayload {
            page_index,
            text_lines: text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            tables: tables.into_iter().map(normalize_table).collect(),
            table_positions: Vec::new(),
        }
    }

    pub fn with_table_positions(mut self, positions: Vec<usize>) -> Self {
        self.table_positions = positions;
        self
    }

    /// Text lines preceding table `table_index`, clamped to the page's lines
    pub fn table_position(&self, table_index: usize) -> usize {
        let len = self.text_lines.len();
        self.table_positions.get(table_index).map_or(len, |&p| p.min(len))
    }

    pub fn from_lines(page_index: usize, lines: &[&str]) -> Self {
        Self::from_text(page_index, &lines.join("\n"), Vec::new())
    }

    /// Placeholder for a page that failed to read
    pub fn empty(page_index: usize) -> Self {
        PagePayload {
            page_index,
            ..Default::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.tables.iter().map(Vec::len).sum()
    }
}

fn normalize_table(table: Table) -> Table {
    table
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()))
                .collect()
        })
        .collect()
}

// ============================================================================
// READER TRAIT
// ============================================================================

/// A decoded document that can produce pages one at a time
pub trait DocumentReader {
    fn format(&self) -> DocumentFormat;

    fn page_count(&self) -> usize;

    /// Read a single page. A failure here is confined to that page.
    fn read_page(&self, page_index: usize) -> Result<PagePayload, PageReadError>;
}

/// Lazy, forward-only page sequence. Abandoning it early costs nothing.
pub struct Pages<'a> {
    reader: &'a dyn DocumentReader,
    next: usize,
    count: usize,
}

impl<'a> Iterator for Pages<'a> {
    type Item = Result<PagePayload, PageReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let page = self.reader.read_page(self.next);
        self.next += 1;
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

/// An opened document: its identity plus the decoder holding its content.
/// The source file is read fully at open, so no handle outlives `open_path`.
pub struct LoadedDocument {
    id: DocumentId,
    reader: Box<dyn DocumentReader>,
}

impl LoadedDocument {
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn format(&self) -> DocumentFormat {
        self.reader.format()
    }

    pub fn page_count(&self) -> usize {
        self.reader.page_count()
    }

    pub fn pages(&self) -> Pages<'_> {
        Pages {
            reader: self.reader.as_ref(),
            next: 0,
            count: self.reader.page_count(),
        }
    }
}

// ============================================================================
// FACTORY FUNCTIONS
// ============================================================================

/// Open a document from disk
pub fn open_path(path: &Path) -> Result<LoadedDocument, ExtractionError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let bytes = fs::read(path).map_err(|e| ExtractionError::unreadable(path.display().to_string(), e))?;
    open_bytes(&name, bytes)
}

/// Open a document from an in-memory byte stream
pub fn open_bytes(name: &str, bytes: Vec<u8>) -> Result<LoadedDocument, ExtractionError> {
    let format = detect_format(name, &bytes);
    let id = DocumentId::for_bytes(name, &bytes, format);

    let reader: Box<dyn DocumentReader> = match format {
        DocumentFormat::Pdf => Box::new(PdfReader::from_bytes(name, &bytes)?),
        DocumentFormat::PageDump => Box::new(PageDumpReader::from_bytes(name, &bytes)?),
        DocumentFormat::PlainText => Box::new(TextReader::from_bytes(name, bytes)?),
    };

    Ok(LoadedDocument { id, reader })
}

/// Content sniffing first (`%PDF` magic), then the file extension
pub fn detect_format(name: &str, bytes: &[u8]) -> DocumentFormat {
    if bytes.starts_with(b"%PDF") {
        return DocumentFormat::Pdf;
    }

    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("pdf") => DocumentFormat::Pdf,
        Some("json") => DocumentFormat::PageDump,
        _ => DocumentFormat::PlainText,
    }
}

// ============================================================================
// PDF
// ============================================================================

pub struct PdfReader {
    document: Document,
    page_numbers: Vec<u32>,
}

impl PdfReader {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, ExtractionError> {
        let document = Document::load_mem(bytes).map_err(|e| ExtractionError::unreadable(name, e))?;
        let page_numbers = document.get_pages().keys().copied().collect();
        Ok(PdfReader {
            document,
            page_numbers,
        })
    }
}

impl DocumentReader for PdfReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn read_page(&self, page_index: usize) -> Result<PagePayload, PageReadError> {
        let page_number = *self
            .page_numbers
            .get(page_index)
            .ok_or_else(|| PageReadError::new(page_index, "page out of range"))?;

        let text = self
            .document
            .extract_text(&[page_number])
            .map_err(|e| PageReadError::new(page_index, e))?;

        Ok(PagePayload::from_text(page_index, &text, Vec::new()))
    }
}

// ============================================================================
// PAGE DUMP (JSON)
// ============================================================================

#[derive(Deserialize)]
struct PageDump {
    pages: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct DumpedPage {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tables: Vec<Table>,
}

/// `{"pages": [{"text": "...", "tables": [[["cell", null]]]}]}`
///
/// Pages are kept as raw JSON and decoded on demand, so one malformed page
/// does not poison the rest of the document.
pub struct PageDumpReader {
    pages: Vec<serde_json::Value>,
}

impl PageDumpReader {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, ExtractionError> {
        let dump: PageDump =
            serde_json::from_slice(bytes).map_err(|e| ExtractionError::unreadable(name, e))?;
        Ok(PageDumpReader { pages: dump.pages })
    }
}

impl DocumentReader for PageDumpReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::PageDump
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn read_page(&self, page_index: usize) -> Result<PagePayload, PageReadError> {
        let value = self
            .pages
            .get(page_index)
            .ok_or_else(|| PageReadError::new(page_index, "page out of range"))?;

        let page: DumpedPage =
            serde_json::from_value(value.clone()).map_err(|e| PageReadError::new(page_index, e))?;

        Ok(PagePayload::from_text(page_index, &page.text, page.tables))
    }
}

// ============================================================================
// PLAIN TEXT
// ============================================================================

pub struct TextReader {
    pages: Vec<String>,
}

impl TextReader {
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Self, ExtractionError> {
        let text = String::from_utf8(bytes).map_err(|e| ExtractionError::unreadable(name, e))?;
        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return TextReader { pages: Vec::new() };
        }

        TextReader {
            pages: text.split('\x0C').map(str::to_string).collect(),
        }
    }
}

impl DocumentReader for TextReader {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn read_page(&self, page_index: usize) -> Result<PagePayload, PageReadError> {
        let page = self
            .pages
            .get(page_index)
            .ok_or_else(|| PageReadError::new(page_index, "page out of range"))?;

        let mut text = Vec::new();
        let mut tables: Vec<Table> = Vec::new();
        let mut positions = Vec::new();
        let mut lines_before = 0;
        let mut in_table = false;

        for line in page.lines() {
            if line.contains('|') || line.contains('\t') {
                let row: TableRow = line
                    .split(|c| c == '|' || c == '\t')
                    .map(|cell| Some(cell.to_string()))
                    .collect();
                if !in_table {
                    tables.push(Vec::new());
                    positions.push(lines_before);
                    in_table = true;
                }
                if let Some(table) = tables.last_mut() {
                    table.push(row);
                }
            } else {
                if !line.trim().is_empty() {
                    lines_before += 1;
                }
                text.push(line);
                in_table = false;
            }
        }

        Ok(PagePayload::from_text(page_index, &text.join("\n"), tables).with_table_positions(positions))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_payload_trims_lines_and_cells() {
        let page = PagePayload::from_text(
            0,
            "  LAGOS STATE  \n\n   \nLGA Ikeja 001\n",
            vec![vec![vec![Some(" Fagge ".to_string()), Some("   ".to_string()), None]]],
        );

        assert_eq!(page.text_lines, vec!["LAGOS STATE", "LGA Ikeja 001"]);
        assert_eq!(page.tables[0][0], vec![Some("Fagge".to_string()), None, None]);
        assert_eq!(page.row_count(), 1);
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("register.PDF", b""), DocumentFormat::Pdf);
        assert_eq!(detect_format("anything.bin", b"%PDF-1.5"), DocumentFormat::Pdf);
        assert_eq!(detect_format("pages.json", b"{}"), DocumentFormat::PageDump);
        assert_eq!(detect_format("register.txt", b"LAGOS"), DocumentFormat::PlainText);
    }

    #[test]
    fn test_document_id_fingerprint() {
        let id = DocumentId::for_bytes("a.txt", b"abc", DocumentFormat::PlainText);
        assert_eq!(
            id.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(id.name, "a.txt");
    }

    #[test]
    fn test_text_reader_pages_and_tables() {
        let text = "LAGOS STATE\nLGA Ikeja 001\x0COGUN STATE\nFagge | | 012\nDala\t099\nWard Adakawa 01";
        let doc = open_bytes("register.txt", text.as_bytes().to_vec()).unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.id().format, DocumentFormat::PlainText);

        let pages: Vec<_> = doc.pages().collect::<Result<_, _>>().unwrap();
        assert_eq!(pages[0].text_lines, vec!["LAGOS STATE", "LGA Ikeja 001"]);
        assert!(pages[0].tables.is_empty());

        assert_eq!(pages[1].page_index, 1);
        assert_eq!(pages[1].text_lines, vec!["OGUN STATE", "Ward Adakawa 01"]);
        assert_eq!(pages[1].tables.len(), 1);
        assert_eq!(
            pages[1].tables[0][0],
            vec![Some("Fagge".to_string()), None, Some("012".to_string())]
        );
        assert_eq!(pages[1].tables[0][1], vec![Some("Dala".to_string()), Some("099".to_string())]);
        // The table sits between "OGUN STATE" and "Ward Adakawa 01"
        assert_eq!(pages[1].table_positions, vec![1]);
        assert_eq!(pages[1].table_position(0), 1);
    }

    #[test]
    fn test_text_reader_empty_document_has_no_pages() {
        let doc = open_bytes("empty.txt", b"  \n ".to_vec()).unwrap();
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.pages().count(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let result = open_bytes("broken.txt", vec![0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(ExtractionError::DocumentUnreadable { .. })));
    }

    #[test]
    fn test_page_dump_malformed_page_is_isolated() {
        let json = r#"{"pages": [
            {"text": "KANO STATE", "tables": [[["Fagge", null, "012"]]]},
            {"text": 17},
            {"text": "LGA Dala 099"}
        ]}"#;
        let doc = open_bytes("pages.json", json.as_bytes().to_vec()).unwrap();
        let pages: Vec<_> = doc.pages().collect();

        assert_eq!(pages.len(), 3);
        let first = pages[0].as_ref().unwrap();
        assert_eq!(first.text_lines, vec!["KANO STATE"]);
        assert_eq!(first.tables[0][0][2].as_deref(), Some("012"));

        let err = pages[1].as_ref().unwrap_err();
        assert_eq!(err.page_index, 1);

        assert_eq!(pages[2].as_ref().unwrap().text_lines, vec!["LGA Dala 099"]);
    }

    #[test]
    fn test_page_dump_not_json_is_unreadable() {
        let result = open_bytes("pages.json", b"not json".to_vec());
        assert!(matches!(result, Err(ExtractionError::DocumentUnreadable { .. })));
    }

    #[test]
    fn test_corrupt_pdf_is_unreadable() {
        let result = open_bytes("register.pdf", b"%PDF-1.4 garbage".to_vec());
        assert!(matches!(result, Err(ExtractionError::DocumentUnreadable { .. })));
    }

    #[test]
    fn test_open_path_missing_file() {
        let result = open_path(Path::new("/no/such/register.pdf"));
        assert!(matches!(result, Err(ExtractionError::DocumentUnreadable { .. })));
    }

    #[test]
    fn test_open_path_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "KANO STATE\nLGA Dala").unwrap();

        let doc = open_path(file.path()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.id().name.ends_with(".txt"));
    }

    #[test]
    fn test_pages_iterator_is_lazy_and_sized() {
        let doc = open_bytes("r.txt", b"A\x0CB\x0CC".to_vec()).unwrap();
        let mut pages = doc.pages();
        assert_eq!(pages.size_hint(), (3, Some(3)));
        pages.next();
        assert_eq!(pages.size_hint(), (2, Some(2)));
    }
}
