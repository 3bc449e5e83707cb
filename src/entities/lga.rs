// 🏛️ LGA Entity - Local Government Area, owned by a state, owns its wards

use super::{merge_code, normalize_name, WardRecord};
use serde::{Deserialize, Serialize};

/// Second-level division. Unique by normalized name within its state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LgaRecord {
    pub name: String,
    pub code: Option<String>,

    /// Owning state's normalized key. Assigned at creation, never reassigned.
    #[serde(skip)]
    pub state_key: String,

    /// Owned wards in first-discovery order
    #[serde(default)]
    pub wards: Vec<WardRecord>,
}

impl LgaRecord {
    pub fn new(name: &str, code: Option<&str>, state_key: &str) -> Self {
        LgaRecord {
            name: name.to_string(),
            code: code.map(|c| c.to_string()),
            state_key: state_key.to_string(),
            wards: Vec::new(),
        }
    }

    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn merge_code(&mut self, code: Option<&str>) -> bool {
        merge_code(&mut self.code, code)
    }

    pub fn find_ward(&self, name: &str) -> Option<&WardRecord> {
        let key = normalize_name(name);
        self.wards.iter().find(|w| w.key() == key)
    }

    pub(crate) fn relink(&mut self, state_key: &str) {
        self.state_key = state_key.to_string();
        let key = self.key();
        for ward in &mut self.wards {
            ward.state_key = state_key.to_string();
            ward.lga_key = key.clone();
        }
    }
}
