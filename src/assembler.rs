// 🌳 Hierarchy Assembler - fold classified events into a State → LGA → Ward tree
//
// All run state lives in the Assembler value: the cursor, the get-or-create
// indexes and the warnings. Nothing is shared between runs.
//
// Cursor transitions:
//   NoState        --StateHeader-->  InState
//   InState        --LgaLine------>  InStateAndLga
//   InStateAndLga  --StateHeader-->  InState        (LGA scope invalidated)
//   InStateAndLga  --LgaLine------>  InStateAndLga  (new current LGA)

use crate::classifier::{ClassifiedEvent, Detection};
use crate::entities::{normalize_name, title_case, Hierarchy, LgaRecord, StateRecord, WardRecord};
use crate::summary::ExtractionWarning;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const LGA_BEFORE_STATE: &str = "LGA encountered before any state header";
pub const WARD_BEFORE_LGA: &str = "ward encountered before any LGA";

// ============================================================================
// CURSOR
// ============================================================================

/// Position in the hierarchy as indexes into `Hierarchy::states` / `StateRecord::lgas`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    NoState,
    InState { state: usize },
    InStateAndLga { state: usize, lga: usize },
}

impl Cursor {
    pub fn state(&self) -> Option<usize> {
        match self {
            Cursor::NoState => None,
            Cursor::InState { state } | Cursor::InStateAndLga { state, .. } => Some(*state),
        }
    }
}

/// A classified event tagged with the page it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcedEvent {
    pub page_index: usize,
    pub event: ClassifiedEvent,
}

/// Bookkeeping counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyTally {
    pub events_applied: usize,
    pub duplicates_discarded: usize,
    pub codes_merged: usize,
}

/// Output of a finished fold
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub hierarchy: Hierarchy,
    pub warnings: Vec<ExtractionWarning>,
    pub tally: AssemblyTally,
}

// ============================================================================
// ASSEMBLER
// ============================================================================

pub struct Assembler {
    hierarchy: Hierarchy,
    cursor: Cursor,

    /// Get-or-create indexes keyed by (parent indexes, normalized name)
    state_index: HashMap<String, usize>,
    lga_index: HashMap<(usize, String), usize>,
    ward_index: HashMap<(usize, usize, String), usize>,

    warnings: Vec<ExtractionWarning>,
    tally: AssemblyTally,

    /// Normalized roster names; empty disables state inference
    roster: Vec<String>,
    roster_pos: Option<usize>,
    previous_lga_code: Option<u32>,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler {
            hierarchy: Hierarchy::new(),
            cursor: Cursor::NoState,
            state_index: HashMap::new(),
            lga_index: HashMap::new(),
            ward_index: HashMap::new(),
            warnings: Vec::new(),
            tally: AssemblyTally::default(),
            roster: Vec::new(),
            roster_pos: None,
            previous_lga_code: None,
        }
    }

    /// Assembler that infers state changes from LGA code resets over `roster`
    pub fn with_roster(roster: &[String]) -> Self {
        let mut assembler = Self::new();
        assembler.roster = roster
            .iter()
            .map(|s| state_scope_key(&normalize_name(s)))
            .collect();
        assembler
    }

    /// Fold a whole event sequence. Pure: the result depends only on the events.
    pub fn assemble<I>(events: I) -> Assembly
    where
        I: IntoIterator<Item = SourcedEvent>,
    {
        Self::new().fold(events)
    }

    pub fn fold<I>(mut self, events: I) -> Assembly
    where
        I: IntoIterator<Item = SourcedEvent>,
    {
        for sourced in events {
            self.apply(sourced.page_index, sourced.event);
        }
        self.finish()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Record a warning raised outside the assembler (page read failures)
    pub fn record_warning(&mut self, warning: ExtractionWarning) {
        warn!(kind = ?warning.kind, page = ?warning.page_index, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Apply one classified event
    pub fn apply(&mut self, page_index: usize, event: ClassifiedEvent) {
        match event {
            ClassifiedEvent::StateHeader(d) => {
                self.tally.events_applied += 1;
                self.enter_state(&d);
            }
            ClassifiedEvent::LgaLine(d) => {
                self.tally.events_applied += 1;
                if !self.roster.is_empty() {
                    self.infer_state(page_index, &d);
                }
                match self.cursor.state() {
                    Some(state) => {
                        let lga = self.get_or_create_lga(state, &d);
                        self.cursor = Cursor::InStateAndLga { state, lga };
                    }
                    None => self.record_warning(ExtractionWarning::orphan(page_index, LGA_BEFORE_STATE, &d.raw)),
                }
            }
            ClassifiedEvent::WardLine(d) => {
                self.tally.events_applied += 1;
                match self.cursor {
                    Cursor::InStateAndLga { state, lga } => self.get_or_create_ward(state, lga, &d),
                    _ => self.record_warning(ExtractionWarning::orphan(page_index, WARD_BEFORE_LGA, &d.raw)),
                }
            }
            ClassifiedEvent::Unclassified => {}
        }
    }

    pub fn finish(self) -> Assembly {
        Assembly {
            hierarchy: self.hierarchy,
            warnings: self.warnings,
            tally: self.tally,
        }
    }

    // ========================================================================
    // GET-OR-CREATE
    // ========================================================================

    fn enter_state(&mut self, d: &Detection) {
        let state = self.get_or_create_state(d);
        self.cursor = Cursor::InState { state };
        self.previous_lga_code = None;

        if !self.roster.is_empty() {
            let key = state_scope_key(&d.key());
            if let Some(pos) = self.roster.iter().position(|r| *r == key) {
                self.roster_pos = Some(pos);
            }
        }
    }

    fn get_or_create_state(&mut self, d: &Detection) -> usize {
        let key = state_scope_key(&d.key());
        if let Some(&index) = self.state_index.get(&key) {
            let state = &mut self.hierarchy.states[index];
            if state.merge_code(d.code.as_deref()) {
                self.tally.codes_merged += 1;
                debug!("Merged code {:?} into state {}", d.code, state.name);
            } else {
                self.tally.duplicates_discarded += 1;
            }
            return index;
        }

        let index = self.hierarchy.states.len();
        self.hierarchy.states.push(StateRecord::new(&d.name, d.code.as_deref()));
        self.state_index.insert(key, index);
        debug!("Added state: {} ({:?})", d.name, d.code);
        index
    }

    fn get_or_create_lga(&mut self, state: usize, d: &Detection) -> usize {
        let key = (state, d.key());
        let parent = &mut self.hierarchy.states[state];

        if let Some(&index) = self.lga_index.get(&key) {
            let lga = &mut parent.lgas[index];
            if lga.merge_code(d.code.as_deref()) {
                self.tally.codes_merged += 1;
                debug!("Merged code {:?} into LGA {}", d.code, lga.name);
            } else {
                self.tally.duplicates_discarded += 1;
            }
            return index;
        }

        let index = parent.lgas.len();
        let state_key = parent.key();
        parent.lgas.push(LgaRecord::new(&d.name, d.code.as_deref(), &state_key));
        debug!("Added LGA: {} ({:?}) to {}", d.name, d.code, parent.name);
        self.lga_index.insert(key, index);
        index
    }

    fn get_or_create_ward(&mut self, state: usize, lga: usize, d: &Detection) {
        let key = (state, lga, d.key());
        let state_record = &mut self.hierarchy.states[state];
        let state_key = state_record.key();
        let parent = &mut state_record.lgas[lga];

        if let Some(&index) = self.ward_index.get(&key) {
            let ward = &mut parent.wards[index];
            if ward.merge_code(d.code.as_deref()) {
                self.tally.codes_merged += 1;
                debug!("Merged code {:?} into ward {}", d.code, ward.name);
            } else {
                self.tally.duplicates_discarded += 1;
            }
            return;
        }

        let index = parent.wards.len();
        let lga_key = parent.key();
        parent.wards.push(WardRecord::new(&d.name, d.code.as_deref(), &state_key, &lga_key));
        debug!("Added ward: {} ({:?}) to {}", d.name, d.code, parent.name);
        self.ward_index.insert(key, index);
    }

    // ========================================================================
    // ROSTER INFERENCE
    // ========================================================================

    /// LGA numbering restarts with each state: a code lower than the previous one
    /// means the document moved on to the next roster state.
    fn infer_state(&mut self, page_index: usize, d: &Detection) {
        let Some(code) = d.code.as_deref().and_then(|c| c.parse::<u32>().ok()) else {
            return;
        };

        let next_pos = match (self.cursor.state(), self.previous_lga_code) {
            (None, _) => Some(self.roster_pos.unwrap_or(0)),
            (Some(_), Some(previous)) if code < previous => Some(self.roster_pos.map_or(0, |p| p + 1)),
            _ => None,
        };

        if let Some(pos) = next_pos {
            match self.roster.get(pos) {
                Some(name) => {
                    let detection = Detection::new(title_case(name), None, &d.raw);
                    debug!("State change inferred from LGA code reset: {}", detection.name);
                    self.enter_state(&detection);
                }
                None => {
                    let message = format!("LGA code reset past the end of the {}-state roster", self.roster.len());
                    self.record_warning(ExtractionWarning::state_inference(page_index, message, &d.raw));
                }
            }
        }

        self.previous_lga_code = Some(code);
    }
}

/// "Abia State", "State: Abia" and an inferred "Abia" name the same state
fn state_scope_key(key: &str) -> String {
    key.strip_suffix(" state").unwrap_or(key).to_string()
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
