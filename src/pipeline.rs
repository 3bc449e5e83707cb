// 🚀 Extraction Pipeline - read → classify → assemble → summarize
//
// Pages are processed strictly in order. A page that fails to read becomes a
// warning; only a document that cannot be opened at all fails the run.

use crate::assembler::Assembler;
use crate::classifier::{classify_line, ClassifiedEvent};
use crate::config::{ClassifierConfig, ExtractorConfig};
use crate::entities::Hierarchy;
use crate::error::{ExtractionError, PageReadError};
use crate::export;
use crate::reader::{self, DocumentId, LoadedDocument, PagePayload};
use crate::summary::{ExtractionSummary, ExtractionWarning};
use crate::table::classify_table;
use chrono::Utc;
use std::path::Path;
use tracing::info;

/// Result of one run: the tree plus everything known about how it was built
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub hierarchy: Hierarchy,
    pub summary: ExtractionSummary,
}

impl Extraction {
    pub fn write_json(&self, path: &Path) -> Result<(), ExtractionError> {
        export::write_json(&self.hierarchy, path)
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ExtractionError> {
        export::write_csv(&self.hierarchy, path)
    }
}

pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Extractor { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract_file(&self, path: &Path) -> Result<Extraction, ExtractionError> {
        let document = reader::open_path(path)?;
        Ok(self.extract_document(&document))
    }

    pub fn extract_bytes(&self, name: &str, bytes: Vec<u8>) -> Result<Extraction, ExtractionError> {
        let document = reader::open_bytes(name, bytes)?;
        Ok(self.extract_document(&document))
    }

    pub fn extract_document(&self, document: &LoadedDocument) -> Extraction {
        info!(
            "Extracting {} ({}, {} pages)",
            document.id().name,
            document.format().name(),
            document.page_count()
        );
        self.extract_pages(document.id().clone(), document.pages())
    }

    /// Fold an ordered page sequence into a hierarchy
    pub fn extract_pages<I>(&self, document: DocumentId, pages: I) -> Extraction
    where
        I: IntoIterator<Item = Result<PagePayload, PageReadError>>,
    {
        let mut summary = ExtractionSummary::new(document, Utc::now());
        let mut assembler = if self.config.infers_states() {
            Assembler::with_roster(&self.config.state_roster)
        } else {
            Assembler::new()
        };

        let pages = pages.into_iter();
        let total = pages.size_hint().1.map_or_else(|| "?".to_string(), |n| n.to_string());

        for (position, page) in pages.enumerate() {
            info!("Processing page {}/{}", position + 1, total);
            summary.pages_read += 1;

            let payload = match page {
                Ok(payload) => payload,
                Err(e) => {
                    assembler.record_warning(ExtractionWarning::page_read(&e));
                    continue;
                }
            };

            summary.lines_seen += payload.text_lines.len();
            summary.rows_seen += payload.row_count();

            for event in classify_page(&payload, &self.config.classifier) {
                if event.is_classified() {
                    summary.events_classified += 1;
                }
                assembler.apply(payload.page_index, event);
            }
        }

        let assembly = assembler.finish();
        summary.finished_at = Utc::now();
        summary.duplicates_discarded = assembly.tally.duplicates_discarded;
        summary.codes_merged = assembly.tally.codes_merged;
        summary.stats = assembly.hierarchy.stats();
        summary.warnings = assembly.warnings;

        info!("✓ {}", summary.summary());

        Extraction {
            hierarchy: assembly.hierarchy,
            summary,
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

/// Events for one page in reading order. Each table is placed after the text
/// lines that precede it; tables without a known position follow all text.
pub fn classify_page(page: &PagePayload, config: &ClassifierConfig) -> Vec<ClassifiedEvent> {
    let mut events = Vec::new();
    let mut next_line = 0;

    for (index, table) in page.tables.iter().enumerate() {
        let position = page.table_position(index).max(next_line);
        events.extend(
            page.text_lines[next_line..position]
                .iter()
                .map(|line| classify_line(line, config)),
        );
        next_line = position;
        events.extend(classify_table(table, config));
    }

    events.extend(
        page.text_lines[next_line..]
            .iter()
            .map(|line| classify_line(line, config)),
    );
    events
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::EntityKind;
    use crate::reader::DocumentFormat;
    use crate::summary::WarningKind;

    fn create_test_id() -> DocumentId {
        DocumentId::for_bytes("test.txt", b"", DocumentFormat::PlainText)
    }

    fn extract_lines(lines: &[&str]) -> Extraction {
        let page = PagePayload::from_lines(0, lines);
        Extractor::default().extract_pages(create_test_id(), vec![Ok(page)])
    }

    fn create_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_lagos_page() {
        let extraction = extract_lines(&["LAGOS STATE", "LGA Ikeja 001", "Ward Oke-Ira 01", "Ward Oke-Ira 01"]);
        let summary = &extraction.summary;

        assert_eq!(summary.stats.total_states, 1);
        assert_eq!(summary.stats.total_lgas, 1);
        assert_eq!(summary.stats.total_wards, 1);
        assert_eq!(summary.duplicates_discarded, 1);
        assert_eq!(summary.events_classified, 4);
        assert!(summary.warnings.is_empty());
        assert_eq!(extraction.hierarchy.states[0].lgas[0].wards[0].name, "Oke-Ira");
    }

    #[test]
    fn test_orphan_ward_page() {
        let extraction = extract_lines(&["Ward Orphan 01", "OGUN STATE"]);

        assert_eq!(extraction.summary.stats.total_wards, 0);
        assert_eq!(extraction.summary.stats.total_states, 1);
        assert_eq!(extraction.summary.count_warnings(WarningKind::OrphanRecord), 1);
        assert!(extraction.summary.stats.populated_states.is_empty());
    }

    #[test]
    fn test_code_merge_page() {
        let extraction = extract_lines(&["KANO STATE", "LGA Dala", "LGA Dala 099"]);
        let dala = &extraction.hierarchy.states[0].lgas[0];

        assert_eq!(dala.code.as_deref(), Some("099"));
        assert_eq!(extraction.summary.codes_merged, 1);
    }

    #[test]
    fn test_table_row_attaches_lga_to_text_state() {
        let mut page = PagePayload::from_lines(0, &["KANO STATE"]);
        page.tables.push(vec![vec![Some("Fagge".to_string()), None, Some("012".to_string())]]);

        let extraction = Extractor::default().extract_pages(create_test_id(), vec![Ok(page)]);
        let kano = extraction.hierarchy.find_state("Kano State").unwrap();

        assert_eq!(kano.lgas.len(), 1);
        assert_eq!(kano.lgas[0].name, "Fagge");
        assert_eq!(kano.lgas[0].code.as_deref(), Some("012"));
        assert_eq!(extraction.summary.rows_seen, 1);
    }

    #[test]
    fn test_empty_document_is_not_an_error() {
        let extraction = Extractor::default().extract_bytes("empty.txt", Vec::new()).unwrap();

        assert!(extraction.hierarchy.is_empty());
        assert_eq!(extraction.summary.pages_read, 0);
        assert_eq!(extraction.summary.stats.total_states, 0);
        assert!(extraction.summary.warnings.is_empty());
    }

    #[test]
    fn test_blank_pages_are_read_but_empty() {
        let pages = vec![Ok(PagePayload::empty(0)), Ok(PagePayload::empty(1))];
        let extraction = Extractor::default().extract_pages(create_test_id(), pages);

        assert_eq!(extraction.summary.pages_read, 2);
        assert!(extraction.hierarchy.is_empty());
        assert!(extraction.summary.warnings.is_empty());
    }

    #[test]
    fn test_unreadable_page_is_a_warning() {
        let pages = vec![
            Ok(PagePayload::from_lines(0, &["KANO STATE", "LGA Dala 099"])),
            Err(PageReadError::new(1, "bad content stream")),
            Ok(PagePayload::from_lines(2, &["Ward Adakawa 01"])),
        ];
        let extraction = Extractor::default().extract_pages(create_test_id(), pages);

        assert_eq!(extraction.summary.pages_read, 3);
        assert_eq!(extraction.summary.count_warnings(WarningKind::PageRead), 1);
        assert_eq!(extraction.summary.warnings[0].page_index, Some(1));
        // The cursor carries across the failed page
        assert_eq!(extraction.hierarchy.ward_count(), 1);
    }

    #[test]
    fn test_cursor_carries_across_pages() {
        let text = "KANO STATE\nLGA Dala 099\x0CWard Adakawa 01\nWard Dala 02";
        let extraction = Extractor::default()
            .extract_bytes("register.txt", text.as_bytes().to_vec())
            .unwrap();

        assert_eq!(extraction.summary.pages_read, 2);
        assert_eq!(extraction.hierarchy.states[0].lgas[0].wards.len(), 2);
    }

    #[test]
    fn test_page_dump_with_malformed_page() {
        let json = r#"{"pages": [
            {"text": "KANO STATE", "tables": [[["S/N", "LGA NAME", "LGA CODE"], ["1", "Fagge", "012"]]]},
            {"tables": "broken"},
            {"text": "LGA Dala 099\nWard Adakawa 01"}
        ]}"#;
        let extraction = Extractor::default()
            .extract_bytes("register.json", json.as_bytes().to_vec())
            .unwrap();
        let kano = &extraction.hierarchy.states[0];

        assert_eq!(extraction.summary.document.format, DocumentFormat::PageDump);
        assert_eq!(extraction.summary.count_warnings(WarningKind::PageRead), 1);
        assert_eq!(kano.lgas.len(), 2);
        assert_eq!(kano.lgas[0].name, "Fagge");
        assert_eq!(kano.lgas[1].wards[0].name, "Adakawa");
    }

    #[test]
    fn test_unreadable_document_is_fatal() {
        let result = Extractor::default().extract_bytes("register.pdf", b"%PDF-1.7 truncated".to_vec());
        assert!(matches!(result, Err(ExtractionError::DocumentUnreadable { .. })));
    }

    #[test]
    fn test_pdf_document() {
        let bytes = create_test_pdf("LAGOS STATE");
        let extraction = Extractor::default().extract_bytes("register.pdf", bytes).unwrap();

        assert_eq!(extraction.summary.document.format, DocumentFormat::Pdf);
        assert_eq!(extraction.summary.pages_read, 1);
    }

    #[test]
    fn test_roster_inference_from_config() {
        let config = ExtractorConfig::default().with_nigerian_roster();
        let page = PagePayload::from_lines(0, &["Aba North 01", "Aba South 02", "Demsa 01"]);
        let extraction = Extractor::new(config).extract_pages(create_test_id(), vec![Ok(page)]);

        assert_eq!(extraction.summary.stats.populated_states, vec!["Abia", "Adamawa"]);
        assert!(extraction.summary.warnings.is_empty());
    }

    #[test]
    fn test_extract_file_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("register.txt");
        std::fs::write(&input, "LAGOS STATE\nLGA Ikeja 001\nWard Oke-Ira 01").unwrap();

        let extraction = Extractor::default().extract_file(&input).unwrap();
        let json_path = dir.path().join("out.json");
        let csv_path = dir.path().join("out.csv");
        extraction.write_json(&json_path).unwrap();
        extraction.write_csv(&csv_path).unwrap();

        assert_eq!(export::read_json(&json_path).unwrap(), extraction.hierarchy);
        assert!(std::fs::read_to_string(&csv_path).unwrap().contains("Lagos State,,Ikeja,001,Oke-Ira,01"));
    }

    #[test]
    fn test_delimited_rows_stay_under_their_state() {
        let text = "KANO STATE\nFagge\t012\nOGUN STATE\nAbeokuta North\t001";
        let extraction = Extractor::default()
            .extract_bytes("register.txt", text.as_bytes().to_vec())
            .unwrap();
        let h = &extraction.hierarchy;

        assert_eq!(h.states.len(), 2);
        assert_eq!(h.states[0].name, "Kano State");
        assert_eq!(h.states[0].lgas.len(), 1);
        assert_eq!(h.states[0].lgas[0].name, "Fagge");
        assert_eq!(h.states[1].lgas.len(), 1);
        assert_eq!(h.states[1].lgas[0].name, "Abeokuta North");
    }

    #[test]
    fn test_classify_page_places_positioned_tables() {
        let mut page = PagePayload::from_lines(0, &["KANO STATE", "OGUN STATE"]).with_table_positions(vec![1]);
        page.tables.push(vec![vec![Some("Fagge".to_string()), Some("012".to_string())]]);

        let events = classify_page(&page, &ClassifierConfig::default());
        let kinds: Vec<_> = events.iter().filter_map(ClassifiedEvent::kind).collect();
        assert_eq!(kinds, vec![EntityKind::State, EntityKind::Lga, EntityKind::State]);
    }

    #[test]
    fn test_classify_page_orders_text_before_tables() {
        let mut page = PagePayload::from_lines(0, &["KANO STATE"]);
        page.tables.push(vec![vec![Some("Fagge".to_string()), Some("012".to_string())]]);

        let events = classify_page(&page, &ClassifierConfig::default());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ClassifiedEvent::StateHeader(_)));
        assert!(matches!(events[1], ClassifiedEvent::LgaLine(_)));
    }
}
