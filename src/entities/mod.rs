// Entity Models - State → LGA → Ward
//
// Each entity has:
// - A display name (title-cased) and an optional code
// - A normalized key (lower-case, collapsed whitespace) used for deduplication
// - A back-reference to its parent scope (keys only, never ownership)

pub mod state;
pub mod lga;
pub mod ward;

pub use state::StateRecord;
pub use lga::LgaRecord;
pub use ward::WardRecord;

use serde::{Deserialize, Serialize};

/// Normalized form of a name: lower-cased, whitespace collapsed to single spaces
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display form of a name: every letter that follows a non-letter is uppercased,
/// the rest lower-cased ("OKE-IRA  north" → "Oke-Ira North")
pub fn title_case(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = String::with_capacity(collapsed.len());
    let mut prev_is_letter = false;

    for c in collapsed.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}

/// Record a code on an entity only if it has none yet. Returns true if the code was set.
pub(crate) fn merge_code(slot: &mut Option<String>, code: Option<&str>) -> bool {
    match (slot.as_ref(), code) {
        (None, Some(c)) if !c.is_empty() => {
            *slot = Some(c.to_string());
            true
        }
        _ => false,
    }
}

// ============================================================================
// HIERARCHY
// ============================================================================

/// The complete three-level tree produced by one run, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub states: Vec<StateRecord>,
}

/// Distinct entity counts for a hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyStats {
    pub total_states: usize,
    pub total_lgas: usize,
    pub total_wards: usize,

    /// States that received at least one LGA, in discovery order
    pub populated_states: Vec<String>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Hierarchy { states: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn find_state(&self, name: &str) -> Option<&StateRecord> {
        let key = normalize_name(name);
        self.states.iter().find(|s| s.key() == key)
    }

    pub fn lga_count(&self) -> usize {
        self.states.iter().map(|s| s.lgas.len()).sum()
    }

    pub fn ward_count(&self) -> usize {
        self.states.iter().map(StateRecord::ward_count).sum()
    }

    pub fn stats(&self) -> HierarchyStats {
        HierarchyStats {
            total_states: self.states.len(),
            total_lgas: self.lga_count(),
            total_wards: self.ward_count(),
            populated_states: self
                .states
                .iter()
                .filter(|s| !s.lgas.is_empty())
                .map(|s| s.name.clone())
                .collect(),
        }
    }

    /// Rebuild back-references after deserialization (they are not part of the export)
    pub fn relink(&mut self) {
        for state in &mut self.states {
            state.relink();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Oke-Ira   NORTH "), "oke-ira north");
        assert_eq!(normalize_name("LAGOS\tSTATE"), "lagos state");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("LAGOS STATE"), "Lagos State");
        assert_eq!(title_case("oke-ira"), "Oke-Ira");
        assert_eq!(title_case("AKWA  IBOM"), "Akwa Ibom");
        assert_eq!(title_case("ward 2b"), "Ward 2B");
    }

    #[test]
    fn test_merge_code_only_fills_empty_slot() {
        let mut slot = None;
        assert!(!merge_code(&mut slot, None));
        assert!(merge_code(&mut slot, Some("099")));
        assert_eq!(slot.as_deref(), Some("099"));

        // A later code never overwrites, a later absence never clears
        assert!(!merge_code(&mut slot, Some("100")));
        assert!(!merge_code(&mut slot, None));
        assert_eq!(slot.as_deref(), Some("099"));
    }

    #[test]
    fn test_hierarchy_stats() {
        let mut kano = StateRecord::new("Kano State", None);
        let mut dala = LgaRecord::new("Dala", Some("099"), &kano.key());
        dala.wards.push(WardRecord::new("Adakawa", Some("01"), &kano.key(), &dala.key()));
        kano.lgas.push(dala);
        let ogun = StateRecord::new("Ogun State", None);

        let hierarchy = Hierarchy { states: vec![kano, ogun] };
        let stats = hierarchy.stats();

        assert_eq!(stats.total_states, 2);
        assert_eq!(stats.total_lgas, 1);
        assert_eq!(stats.total_wards, 1);
        assert_eq!(stats.populated_states, vec!["Kano State".to_string()]);
        assert!(hierarchy.find_state("KANO   state").is_some());
    }
}
