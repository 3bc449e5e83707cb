// ⚙️ Extractor Configuration - Rules as Data
// Classifier thresholds, noise phrases and the optional state roster, loadable from JSON

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// All 37 Nigerian states (36 states + FCT) in the order INEC registers list them.
pub const NIGERIAN_STATES: [&str; 37] = [
    "ABIA", "ADAMAWA", "AKWA IBOM", "ANAMBRA", "BAUCHI", "BAYELSA",
    "BENUE", "BORNO", "CROSS RIVER", "DELTA", "EBONYI", "EDO",
    "EKITI", "ENUGU", "FCT", "GOMBE", "IMO", "JIGAWA",
    "KADUNA", "KANO", "KATSINA", "KEBBI", "KOGI", "KWARA",
    "LAGOS", "NASARAWA", "NIGER", "OGUN", "ONDO", "OSUN",
    "OYO", "PLATEAU", "RIVERS", "SOKOTO", "TARABA", "YOBE",
    "ZAMFARA",
];

// ============================================================================
// CLASSIFIER CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum number of letters for an all-caps line to count as a state header
    pub min_header_letters: usize,

    /// Longest alphanumeric token still treated as a code (pure digit runs are always codes)
    pub max_code_len: usize,

    /// Phrases marking table headers and page furniture; lines containing one are skipped
    pub noise_phrases: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            min_header_letters: 3,
            max_code_len: 6,
            noise_phrases: ["LGA NAME", "LGA CODE", "WARD NAME", "WARD CODE", "S/N", "PAGE"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

// ============================================================================
// EXTRACTOR CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub classifier: ClassifierConfig,

    /// Ordered state names used to infer state changes from LGA code resets.
    /// Empty disables inference: LGAs before any state header are orphans.
    pub state_roster: Vec<String>,
}

impl ExtractorConfig {
    /// Load configuration from a JSON file; missing fields fall back to defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse extractor config JSON")
    }

    /// Enable roster inference over the 37 Nigerian states
    pub fn with_nigerian_roster(mut self) -> Self {
        self.state_roster = NIGERIAN_STATES.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn infers_states(&self) -> bool {
        !self.state_roster.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.classifier.min_header_letters, 3);
        assert_eq!(config.classifier.max_code_len, 6);
        assert!(config.classifier.noise_phrases.contains(&"WARD CODE".to_string()));
        assert!(!config.infers_states());
    }

    #[test]
    fn test_nigerian_roster() {
        let config = ExtractorConfig::default().with_nigerian_roster();
        assert_eq!(config.state_roster.len(), 37);
        assert_eq!(config.state_roster[0], "ABIA");
        assert_eq!(config.state_roster[36], "ZAMFARA");
        assert!(config.infers_states());
    }

    #[test]
    fn test_from_file_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "classifier": {{ "max_code_len": 4 }}, "state_roster": ["KANO", "LAGOS"] }}"#).unwrap();

        let config = ExtractorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.classifier.max_code_len, 4);
        assert_eq!(config.classifier.min_header_letters, 3);
        assert_eq!(config.state_roster, vec!["KANO".to_string(), "LAGOS".to_string()]);
    }

    #[test]
    fn test_from_file_missing() {
        let result = ExtractorConfig::from_file("/definitely/not/here.json");
        assert!(result.is_err());
    }
}
