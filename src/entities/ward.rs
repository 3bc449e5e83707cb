// 🏘️ Ward Entity - lowest division, owned by an LGA

use super::{merge_code, normalize_name};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardRecord {
    pub name: String,
    pub code: Option<String>,

    /// Owning scope: (state key, LGA key)
    #[serde(skip)]
    pub state_key: String,
    #[serde(skip)]
    pub lga_key: String,
}

impl WardRecord {
    pub fn new(name: &str, code: Option<&str>, state_key: &str, lga_key: &str) -> Self {
        WardRecord {
            name: name.to_string(),
            code: code.map(|c| c.to_string()),
            state_key: state_key.to_string(),
            lga_key: lga_key.to_string(),
        }
    }

    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn merge_code(&mut self, code: Option<&str>) -> bool {
        merge_code(&mut self.code, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ward_code_never_cleared() {
        let mut ward = WardRecord::new("Oke-Ira", Some("01"), "lagos state", "ikeja");
        assert!(!ward.merge_code(None));
        assert_eq!(ward.code.as_deref(), Some("01"));
    }

    #[test]
    fn test_ward_deserializes_without_scope() {
        let ward: WardRecord = serde_json::from_str(r#"{"name":"Oke-Ira","code":null}"#).unwrap();
        assert_eq!(ward.code, None);
        assert!(ward.lga_key.is_empty());
    }
}
