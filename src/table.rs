// 📋 Table Classifier - same four-way classification, sourced from cell boundaries
//
// Three ways a row gets read:
// - Header rows (a noise phrase in any cell) set the table's context and emit nothing
// - Tables with named columns (LGA NAME / LGA CODE / WARD NAME / WARD CODE) are read
//   by column role; one row may carry an LGA and one of its wards
// - Otherwise: first non-empty cell is the name, last later code-like cell is the code

use crate::classifier::{
    as_code, classify_line, clean_name, contains_phrase, is_noise, is_state_label, ClassifiedEvent,
    Detection, EntityKind,
};
use crate::config::ClassifierConfig;
use crate::reader::{Table, TableRow};
use regex::Regex;
use std::sync::LazyLock;

static ORDINAL_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,4}[.)]?$").unwrap());

// ============================================================================
// TABLE CONTEXT
// ============================================================================

/// Column positions announced by a header row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnRoles {
    pub lga_name: Option<usize>,
    pub lga_code: Option<usize>,
    pub ward_name: Option<usize>,
    pub ward_code: Option<usize>,
}

/// What earlier header rows of the same table said about the rows below them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableContext {
    roles: Option<ColumnRoles>,
    default_kind: Option<EntityKind>,
}

impl TableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roles(&self) -> Option<ColumnRoles> {
        self.roles
    }

    pub fn default_kind(&self) -> Option<EntityKind> {
        self.default_kind
    }

    fn absorb_header(&mut self, row: &[Option<String>]) {
        let mut roles = ColumnRoles::default();
        let mut mentions_lga = false;
        let mut mentions_ward = false;

        for (i, cell) in row.iter().enumerate() {
            let Some(text) = cell_text(cell) else { continue };
            let upper = text.to_uppercase();
            let lga = contains_phrase(&upper, "LGA");
            let ward = contains_phrase(&upper, "WARD");
            let name = contains_phrase(&upper, "NAME");
            let code = contains_phrase(&upper, "CODE");
            mentions_lga |= lga;
            mentions_ward |= ward;

            match (lga, ward, name, code) {
                (true, false, true, _) => roles.lga_name = Some(i),
                (true, false, false, true) => roles.lga_code = Some(i),
                (false, true, true, _) => roles.ward_name = Some(i),
                (false, true, false, true) => roles.ward_code = Some(i),
                _ => {}
            }
        }

        if roles.lga_name.is_some() || roles.ward_name.is_some() {
            self.roles = Some(roles);
        } else if mentions_ward {
            self.default_kind = Some(EntityKind::Ward);
        } else if mentions_lga {
            self.default_kind = Some(EntityKind::Lga);
        }
    }
}

// ============================================================================
// ROW CLASSIFICATION
// ============================================================================

/// Classify every row of one table, in order, with a fresh context
pub fn classify_table(table: &Table, config: &ClassifierConfig) -> Vec<ClassifiedEvent> {
    let mut context = TableContext::new();
    table
        .iter()
        .flat_map(|row| classify_row(row, &mut context, config))
        .collect()
}

/// Classify one row. Returns zero, one, or (for role tables) two events.
pub fn classify_row(
    row: &TableRow,
    context: &mut TableContext,
    config: &ClassifierConfig,
) -> Vec<ClassifiedEvent> {
    let cells: Vec<(usize, &str)> = row
        .iter()
        .enumerate()
        .filter_map(|(i, c)| cell_text(c).map(|t| (i, t)))
        .collect();

    if cells.is_empty() {
        return Vec::new();
    }

    if cells.iter().any(|(_, text)| is_noise(text, config)) {
        context.absorb_header(row);
        return Vec::new();
    }

    let raw = cells.iter().map(|(_, t)| *t).collect::<Vec<_>>().join(" | ");

    if let Some(roles) = context.roles {
        let events = classify_by_roles(row, &roles, &raw, config);
        if !events.is_empty() || cells.len() > 1 {
            return events;
        }
    }

    if cells.len() == 1 {
        let event = classify_line(cells[0].1, config);
        return if event.is_classified() { vec![event] } else { Vec::new() };
    }

    classify_cells(&cells, context, &raw, config)
        .into_iter()
        .collect()
}

/// Name/code heuristic for rows of two or more non-empty cells
fn classify_cells(
    cells: &[(usize, &str)],
    context: &TableContext,
    raw: &str,
    config: &ClassifierConfig,
) -> Option<ClassifiedEvent> {
    let mut rest = cells;
    let ordinal = ORDINAL_CELL_RE.is_match(rest[0].1);
    if ordinal {
        rest = &rest[1..];
    }

    let ((_, name), later) = rest.split_first()?;
    let code = later
        .iter()
        .rev()
        .find_map(|(_, text)| as_code(text, config.max_code_len));
    let has_row_shape = code.is_some() || ordinal || context.default_kind.is_some();

    let event = match classify_line(name, config) {
        // Capitalised names inside data rows are entries, not section headers
        ClassifiedEvent::StateHeader(_) if has_row_shape && !is_state_label(name) => {
            ClassifiedEvent::Unclassified
        }
        other => other,
    };

    let event = match event {
        ClassifiedEvent::Unclassified => {
            if !has_row_shape {
                return None;
            }
            let kind = if ordinal {
                EntityKind::Ward
            } else {
                context.default_kind.unwrap_or(EntityKind::Lga)
            };
            ClassifiedEvent::from_kind(kind, Detection::new(clean_name(name)?, code, raw))
        }
        classified => {
            let kind = classified.kind()?;
            let detection = classified.detection()?;
            let code = detection.code.clone().or(code);
            ClassifiedEvent::from_kind(kind, Detection::new(detection.name.clone(), code, raw))
        }
    };

    Some(event)
}

fn classify_by_roles(
    row: &TableRow,
    roles: &ColumnRoles,
    raw: &str,
    config: &ClassifierConfig,
) -> Vec<ClassifiedEvent> {
    let cell = |index: Option<usize>| index.and_then(|i| row.get(i)).and_then(cell_text);
    let code = |index: Option<usize>| cell(index).and_then(|c| as_code(c, config.max_code_len));

    let mut events = Vec::new();

    if let Some(text) = cell(roles.lga_name) {
        // Merged section rows put the state name in the first column
        if is_state_label(text) {
            if let ClassifiedEvent::StateHeader(d) = classify_line(text, config) {
                events.push(ClassifiedEvent::StateHeader(Detection::new(d.name, d.code, raw)));
            }
        } else if let Some(name) = clean_name(text) {
            // With an LGA CODE column, a name without a code is a wrapped continuation line
            let lga_code = code(roles.lga_code);
            if lga_code.is_some() || roles.lga_code.is_none() {
                events.push(ClassifiedEvent::LgaLine(Detection::new(name, lga_code, raw)));
            }
        }
    }

    if let Some(name) = cell(roles.ward_name).and_then(clean_name) {
        events.push(ClassifiedEvent::WardLine(Detection::new(name, code(roles.ward_code), raw)));
    }

    events
}

fn cell_text(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

// ============================================================================
// TESTS
// ============================================================================
