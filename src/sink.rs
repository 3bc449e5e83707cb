// 💾 Hierarchy Sink - hand an assembled tree to a persistent store
//
// Upserts are idempotent and keyed by parent scope + normalized name, so
// publishing the same hierarchy twice (or two runs over overlapping documents)
// never creates duplicates. Parents are always published before children.

use crate::entities::{merge_code, Hierarchy, LgaRecord, StateRecord, WardRecord};
use anyhow::{bail, Result};
use std::collections::HashMap;
use tracing::info;

/// Storage collaborator. Implementations decide what "upsert" means for their backend.
pub trait HierarchySink {
    fn upsert_state(&mut self, state: &StateRecord) -> Result<()>;

    fn upsert_lga(&mut self, lga: &LgaRecord) -> Result<()>;

    fn upsert_ward(&mut self, ward: &WardRecord) -> Result<()>;
}

/// Counts of records handed to a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub states: usize,
    pub lgas: usize,
    pub wards: usize,
}

/// Walk the tree parent-first and upsert every record
pub fn publish(hierarchy: &Hierarchy, sink: &mut dyn HierarchySink) -> Result<PublishReport> {
    let mut report = PublishReport::default();

    for state in &hierarchy.states {
        sink.upsert_state(state)?;
        report.states += 1;

        for lga in &state.lgas {
            sink.upsert_lga(lga)?;
            report.lgas += 1;

            for ward in &lga.wards {
                sink.upsert_ward(ward)?;
                report.wards += 1;
            }
        }
    }

    info!(
        "Published {} states, {} LGAs, {} wards",
        report.states, report.lgas, report.wards
    );
    Ok(report)
}

// ============================================================================
// IN-MEMORY SINK
// ============================================================================

/// Stored row: display name and code, no children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntity {
    pub name: String,
    pub code: Option<String>,
}

/// Reference store used by tests and hosts that merge runs in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub states: HashMap<String, StoredEntity>,
    pub lgas: HashMap<(String, String), StoredEntity>,
    pub wards: HashMap<(String, String, String), StoredEntity>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert<K: std::hash::Hash + Eq>(
        table: &mut HashMap<K, StoredEntity>,
        key: K,
        name: &str,
        code: Option<&str>,
    ) {
        let entry = table.entry(key).or_insert_with(|| StoredEntity {
            name: name.to_string(),
            code: None,
        });
        merge_code(&mut entry.code, code);
    }
}

impl HierarchySink for MemorySink {
    fn upsert_state(&mut self, state: &StateRecord) -> Result<()> {
        Self::upsert(&mut self.states, state.key(), &state.name, state.code.as_deref());
        Ok(())
    }

    fn upsert_lga(&mut self, lga: &LgaRecord) -> Result<()> {
        if !self.states.contains_key(&lga.state_key) {
            bail!("LGA {} references unknown state '{}'", lga.name, lga.state_key);
        }
        let key = (lga.state_key.clone(), lga.key());
        Self::upsert(&mut self.lgas, key, &lga.name, lga.code.as_deref());
        Ok(())
    }

    fn upsert_ward(&mut self, ward: &WardRecord) -> Result<()> {
        let parent = (ward.state_key.clone(), ward.lga_key.clone());
        if !self.lgas.contains_key(&parent) {
            bail!(
                "Ward {} references unknown LGA '{}' in '{}'",
                ward.name,
                ward.lga_key,
                ward.state_key
            );
        }
        let key = (ward.state_key.clone(), ward.lga_key.clone(), ward.key());
        Self::upsert(&mut self.wards, key, &ward.name, ward.code.as_deref());
        Ok(())
    }
}
