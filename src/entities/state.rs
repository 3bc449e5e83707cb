// 🗺️ State Entity - top of the hierarchy, owns its LGAs

use super::{merge_code, normalize_name, LgaRecord};
use serde::{Deserialize, Serialize};

/// First-level division. Unique by normalized name across the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Display-cased name
    pub name: String,

    /// Short identifier, absent unless the document provided one
    pub code: Option<String>,

    /// Owned LGAs in first-discovery order
    #[serde(default)]
    pub lgas: Vec<LgaRecord>,
}

impl StateRecord {
    pub fn new(name: &str, code: Option<&str>) -> Self {
        StateRecord {
            name: name.to_string(),
            code: code.map(|c| c.to_string()),
            lgas: Vec::new(),
        }
    }

    /// Deduplication key
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn merge_code(&mut self, code: Option<&str>) -> bool {
        merge_code(&mut self.code, code)
    }

    pub fn find_lga(&self, name: &str) -> Option<&LgaRecord> {
        let key = normalize_name(name);
        self.lgas.iter().find(|l| l.key() == key)
    }

    pub fn ward_count(&self) -> usize {
        self.lgas.iter().map(|l| l.wards.len()).sum()
    }

    pub(crate) fn relink(&mut self) {
        let key = self.key();
        for lga in &mut self.lgas {
            lga.relink(&key);
        }
    }
}
