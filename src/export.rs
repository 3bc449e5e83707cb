// 📤 Export - JSON document and flat CSV for an assembled hierarchy

use crate::entities::{Hierarchy, StateRecord};
use crate::error::ExtractionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// On-disk JSON shape: `{"export_time": ..., "states": [...]}` in discovery order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub export_time: DateTime<Utc>,
    pub states: Vec<StateRecord>,
}

impl ExportDocument {
    pub fn from_hierarchy(hierarchy: &Hierarchy) -> Self {
        ExportDocument {
            export_time: Utc::now(),
            states: hierarchy.states.clone(),
        }
    }

    /// Rebuild the tree; parent references are restored from nesting
    pub fn into_hierarchy(self) -> Hierarchy {
        let mut hierarchy = Hierarchy { states: self.states };
        hierarchy.relink();
        hierarchy
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Write the JSON export. A failure leaves the in-memory hierarchy untouched.
pub fn write_json(hierarchy: &Hierarchy, path: &Path) -> Result<(), ExtractionError> {
    let json = ExportDocument::from_hierarchy(hierarchy)
        .to_json()
        .map_err(|e| ExtractionError::write_failed(path, e))?;

    fs::write(path, json).map_err(|e| ExtractionError::write_failed(path, e))
}

/// Read a JSON export back into a hierarchy
pub fn read_json(path: &Path) -> Result<Hierarchy, ExtractionError> {
    let content = fs::read_to_string(path).map_err(|e| ExtractionError::read_failed(path, e))?;
    let document: ExportDocument =
        serde_json::from_str(&content).map_err(|e| ExtractionError::read_failed(path, e))?;

    Ok(document.into_hierarchy())
}

// ============================================================================
// CSV
// ============================================================================

/// One flattened row: a ward with its parents, or an LGA with no wards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    pub state: String,
    pub state_code: Option<String>,
    pub lga: String,
    pub lga_code: Option<String>,
    pub ward: Option<String>,
    pub ward_code: Option<String>,
}

/// Flatten the hierarchy. States without LGAs produce no rows.
pub fn csv_rows(hierarchy: &Hierarchy) -> Vec<CsvRow> {
    let mut rows = Vec::new();

    for state in &hierarchy.states {
        for lga in &state.lgas {
            let row = |ward: Option<String>, ward_code: Option<String>| CsvRow {
                state: state.name.clone(),
                state_code: state.code.clone(),
                lga: lga.name.clone(),
                lga_code: lga.code.clone(),
                ward,
                ward_code,
            };

            if lga.wards.is_empty() {
                rows.push(row(None, None));
            }
            for ward in &lga.wards {
                rows.push(row(Some(ward.name.clone()), ward.code.clone()));
            }
        }
    }

    rows
}

pub fn write_csv_to<W: Write>(hierarchy: &Hierarchy, writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in csv_rows(hierarchy) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(hierarchy: &Hierarchy, path: &Path) -> Result<(), ExtractionError> {
    let file = File::create(path).map_err(|e| ExtractionError::write_failed(path, e))?;
    write_csv_to(hierarchy, file).map_err(|e| ExtractionError::write_failed(path, e))
}
