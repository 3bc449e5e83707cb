// Xtractor - Electoral Hierarchy Extraction Engine
// Turns INEC register documents into a deduplicated State → LGA → Ward tree

pub mod error;
pub mod config;
pub mod entities;
pub mod reader;     // Page Reader: PDF / page dump / plain text
pub mod classifier; // Line Classifier
pub mod table;      // Table Classifier
pub mod assembler;  // Hierarchy Assembler (explicit fold state)
pub mod summary;
pub mod pipeline;
pub mod export;
pub mod sink;

// Re-export commonly used types
pub use error::{ExtractionError, PageReadError};
pub use config::{ClassifierConfig, ExtractorConfig, NIGERIAN_STATES};
pub use entities::{
    normalize_name, title_case,
    Hierarchy, HierarchyStats, StateRecord, LgaRecord, WardRecord,
};
pub use reader::{
    DocumentFormat, DocumentId, DocumentReader, LoadedDocument, PagePayload,
    open_bytes, open_path,
};
pub use classifier::{classify_line, ClassifiedEvent, Detection, EntityKind};
pub use table::{classify_row, classify_table, TableContext};
pub use assembler::{Assembler, Assembly, Cursor, SourcedEvent};
pub use summary::{ExtractionSummary, ExtractionWarning, WarningKind};
pub use pipeline::{classify_page, Extraction, Extractor};
pub use export::{read_json, write_csv, write_json, ExportDocument};
pub use sink::{publish, HierarchySink, MemorySink, PublishReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
