// 📊 Extraction Summary - counts, warnings and provenance for one run

use crate::entities::HierarchyStats;
use crate::error::PageReadError;
use crate::reader::DocumentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// WARNINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A page yielded nothing; the run continued
    PageRead,

    /// An LGA or ward arrived with no parent to attach to; it was discarded
    OrphanRecord,

    /// Roster inference wanted a state past the end of the roster
    StateInference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    pub page_index: Option<usize>,
    pub message: String,

    /// Offending source text, when there is any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl ExtractionWarning {
    pub fn page_read(error: &PageReadError) -> Self {
        ExtractionWarning {
            kind: WarningKind::PageRead,
            page_index: Some(error.page_index),
            message: error.to_string(),
            raw_text: None,
        }
    }

    pub fn orphan(page_index: usize, message: &str, raw_text: &str) -> Self {
        ExtractionWarning {
            kind: WarningKind::OrphanRecord,
            page_index: Some(page_index),
            message: message.to_string(),
            raw_text: Some(raw_text.to_string()),
        }
    }

    pub fn state_inference(page_index: usize, message: String, raw_text: &str) -> Self {
        ExtractionWarning {
            kind: WarningKind::StateInference,
            page_index: Some(page_index),
            message,
            raw_text: Some(raw_text.to_string()),
        }
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    /// Unique id of this run
    pub run_id: String,

    pub document: DocumentId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    pub pages_read: usize,
    pub lines_seen: usize,
    pub rows_seen: usize,
    pub events_classified: usize,

    /// Repeat sightings that changed nothing
    pub duplicates_discarded: usize,

    /// Repeat sightings that filled in a missing code
    pub codes_merged: usize,

    #[serde(flatten)]
    pub stats: HierarchyStats,

    pub warnings: Vec<ExtractionWarning>,
}

impl ExtractionSummary {
    pub fn new(document: DocumentId, started_at: DateTime<Utc>) -> Self {
        ExtractionSummary {
            run_id: uuid::Uuid::new_v4().to_string(),
            document,
            started_at,
            finished_at: started_at,
            pages_read: 0,
            lines_seen: 0,
            rows_seen: 0,
            events_classified: 0,
            duplicates_discarded: 0,
            codes_merged: 0,
            stats: HierarchyStats::default(),
            warnings: Vec::new(),
        }
    }

    pub fn count_warnings(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    pub fn summary(&self) -> String {
        format!(
            "States: {}, LGAs: {}, Wards: {} from {} pages ({} warnings, {} duplicates, {} codes merged)",
            self.stats.total_states,
            self.stats.total_lgas,
            self.stats.total_wards,
            self.pages_read,
            self.warnings.len(),
            self.duplicates_discarded,
            self.codes_merged
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DocumentFormat;

    fn create_test_summary() -> ExtractionSummary {
        let id = DocumentId::for_bytes("register.pdf", b"", DocumentFormat::Pdf);
        ExtractionSummary::new(id, Utc::now())
    }

    #[test]
    fn test_new_summary_is_empty() {
        let summary = create_test_summary();
        assert_eq!(summary.stats.total_states, 0);
        assert!(summary.warnings.is_empty());
        assert_eq!(summary.duration_ms(), 0);
        assert_eq!(summary.run_id.len(), 36);
    }

    #[test]
    fn test_count_warnings_by_kind() {
        let mut summary = create_test_summary();
        summary.warnings.push(ExtractionWarning::orphan(0, "ward encountered before any LGA", "Ward X 01"));
        summary.warnings.push(ExtractionWarning::page_read(&PageReadError::new(2, "bad stream")));

        assert_eq!(summary.count_warnings(WarningKind::OrphanRecord), 1);
        assert_eq!(summary.count_warnings(WarningKind::PageRead), 1);
        assert_eq!(summary.count_warnings(WarningKind::StateInference), 0);
    }

    #[test]
    fn test_summary_serializes_flat_counts() {
        let mut summary = create_test_summary();
        summary.stats.total_wards = 7;
        summary.warnings.push(ExtractionWarning::orphan(1, "LGA encountered before any state header", "LGA Dala"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_wards"], 7);
        assert_eq!(json["document"]["format"], "pdf");
        assert_eq!(json["warnings"][0]["kind"], "orphan_record");
        assert_eq!(json["warnings"][0]["raw_text"], "LGA Dala");
    }

    #[test]
    fn test_summary_line() {
        let summary = create_test_summary();
        assert!(summary.summary().starts_with("States: 0, LGAs: 0, Wards: 0"));
    }
}
