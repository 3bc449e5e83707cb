// 🏷️ Line Classifier - state header / LGA / ward / noise
// Rules are an ordered list of pure functions; the first rule that matches wins.

use crate::config::ClassifierConfig;
use crate::entities::{normalize_name, title_case};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STATE_COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:STATE|State)\s*:\s*(.+)$").unwrap());
static LGA_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bLGA\b").unwrap());
static WARD_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^ward[\s:.,\-]+(.+)$").unwrap());
static ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,4}\s*[.)]\s*(.+)$").unwrap());
static STATE_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bSTATE\b").unwrap());

// ============================================================================
// CLASSIFIED EVENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    State,
    Lga,
    Ward,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::State => "State",
            EntityKind::Lga => "LGA",
            EntityKind::Ward => "Ward",
        }
    }
}

/// Name and optional code pulled out of one line or row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Display-cased name
    pub name: String,

    /// Trailing code token, only when distinguishable from the name
    pub code: Option<String>,

    /// Source text the detection came from (line, or cells joined with " | ")
    pub raw: String,
}

impl Detection {
    pub fn new(name: String, code: Option<String>, raw: &str) -> Self {
        Detection {
            name,
            code,
            raw: raw.to_string(),
        }
    }

    /// Deduplication key
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifiedEvent {
    StateHeader(Detection),
    LgaLine(Detection),
    WardLine(Detection),
    Unclassified,
}

impl ClassifiedEvent {
    pub fn from_kind(kind: EntityKind, detection: Detection) -> Self {
        match kind {
            EntityKind::State => ClassifiedEvent::StateHeader(detection),
            EntityKind::Lga => ClassifiedEvent::LgaLine(detection),
            EntityKind::Ward => ClassifiedEvent::WardLine(detection),
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            ClassifiedEvent::StateHeader(_) => Some(EntityKind::State),
            ClassifiedEvent::LgaLine(_) => Some(EntityKind::Lga),
            ClassifiedEvent::WardLine(_) => Some(EntityKind::Ward),
            ClassifiedEvent::Unclassified => None,
        }
    }

    pub fn detection(&self) -> Option<&Detection> {
        match self {
            ClassifiedEvent::StateHeader(d)
            | ClassifiedEvent::LgaLine(d)
            | ClassifiedEvent::WardLine(d) => Some(d),
            ClassifiedEvent::Unclassified => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, ClassifiedEvent::Unclassified)
    }
}

// ============================================================================
// RULES
// ============================================================================

type LineRule = fn(&str, &ClassifierConfig) -> Option<ClassifiedEvent>;

/// Precedence order. A rule returning `None` did not match and the next one is tried.
pub const LINE_RULES: [(&str, LineRule); 4] = [
    ("noise", noise_rule),
    ("state_header", state_header_rule),
    ("lga", lga_rule),
    ("ward", ward_rule),
];

/// Classify one line of page text
pub fn classify_line(line: &str, config: &ClassifierConfig) -> ClassifiedEvent {
    let line = line.trim();
    if line.is_empty() {
        return ClassifiedEvent::Unclassified;
    }

    LINE_RULES
        .iter()
        .find_map(|(_, rule)| rule(line, config))
        .unwrap_or(ClassifiedEvent::Unclassified)
}

/// Name of the first rule matching `line`, for diagnostics
pub fn matching_rule(line: &str, config: &ClassifierConfig) -> Option<&'static str> {
    let line = line.trim();
    LINE_RULES
        .iter()
        .find(|(_, rule)| rule(line, config).is_some())
        .map(|(name, _)| *name)
}

/// Rule 0: table headers and page furniture
fn noise_rule(line: &str, config: &ClassifierConfig) -> Option<ClassifiedEvent> {
    is_noise(line, config).then_some(ClassifiedEvent::Unclassified)
}

/// Rule 1: "LAGOS STATE" (all capitals) or "State: Lagos"
fn state_header_rule(line: &str, config: &ClassifierConfig) -> Option<ClassifiedEvent> {
    if let Some(caps) = STATE_COLON_RE.captures(line) {
        let (name, code) = split_name_code(&caps[1], config)?;
        return Some(ClassifiedEvent::StateHeader(Detection::new(name, code, line)));
    }

    // Keyword and ordinal lines belong to the LGA and ward rules even when shouted
    if LGA_TOKEN_RE.is_match(line) || WARD_PREFIX_RE.is_match(line) || ORDINAL_RE.is_match(line) {
        return None;
    }

    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < config.min_header_letters || letters.iter().any(|c| !c.is_uppercase()) {
        return None;
    }

    let name = line.trim_matches(|c: char| !c.is_alphabetic());
    Some(ClassifiedEvent::StateHeader(Detection::new(title_case(name), None, line)))
}

/// Rule 2: "LGA Ikeja 001", "Ikeja LGA", or "<name> <code>"
fn lga_rule(line: &str, config: &ClassifierConfig) -> Option<ClassifiedEvent> {
    if LGA_TOKEN_RE.is_match(line) {
        let rest = LGA_TOKEN_RE.replace_all(line, " ");
        let (name, code) = split_name_code(&rest, config)?;
        return Some(ClassifiedEvent::LgaLine(Detection::new(name, code, line)));
    }

    if WARD_PREFIX_RE.is_match(line) || ORDINAL_RE.is_match(line) {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (last, init) = tokens.split_last()?;
    if init.is_empty() {
        return None;
    }
    let code = as_code(last, config.max_code_len).filter(|c| c.len() <= config.max_code_len)?;
    let name = clean_name(&init.join(" "))?;
    Some(ClassifiedEvent::LgaLine(Detection::new(name, Some(code), line)))
}

/// Rule 3: "Ward Oke-Ira 01", "12) Oke-Ira 01"
fn ward_rule(line: &str, config: &ClassifierConfig) -> Option<ClassifiedEvent> {
    let mut labelled = WARD_PREFIX_RE.is_match(line);
    let caps = WARD_PREFIX_RE
        .captures(line)
        .or_else(|| ORDINAL_RE.captures(line))?;
    let mut rest = caps.get(1)?.as_str();

    // "3. Ward Oke-Ira" carries both markers
    if let Some(inner) = WARD_PREFIX_RE.captures(rest).and_then(|c| c.get(1)) {
        rest = inner.as_str();
        labelled = true;
    }

    let (name, code) = match split_name_code(rest, config) {
        Some(split) => split,
        // "Ward 05": the label is the only name the line carries
        None if labelled => {
            let code = as_code(rest.trim(), config.max_code_len)?;
            (format!("Ward {}", code), Some(code))
        }
        None => return None,
    };
    Some(ClassifiedEvent::WardLine(Detection::new(name, code, line)))
}

// ============================================================================
// TOKEN HELPERS
// ============================================================================

/// True if `text` contains one of the configured noise phrases as whole words
pub fn is_noise(text: &str, config: &ClassifierConfig) -> bool {
    let upper = text.to_uppercase();
    config
        .noise_phrases
        .iter()
        .any(|phrase| contains_phrase(&upper, &phrase.to_uppercase()))
}

/// True for "State: X" labels and anything carrying the word STATE
pub fn is_state_label(text: &str) -> bool {
    STATE_COLON_RE.is_match(text.trim()) || STATE_WORD_RE.is_match(text)
}

/// Whole-word substring search; both sides are expected in the same case
pub(crate) fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }

    haystack.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// A code is all digits, or a short alphanumeric token with at least one digit.
/// Surrounding brackets and punctuation are ignored.
pub fn as_code(token: &str, max_len: usize) -> Option<String> {
    let t = token.trim_matches(|c: char| matches!(c, '(' | ')' | '[' | ']' | ',' | ';' | ':' | '.'));
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    if t.chars().all(|c| c.is_ascii_digit()) {
        return Some(t.to_string());
    }

    if t.len() <= max_len && t.chars().any(|c| c.is_ascii_digit()) {
        return Some(t.to_uppercase());
    }

    None
}

/// Trim separators from a name candidate and title-case it. Names need a letter.
pub fn clean_name(candidate: &str) -> Option<String> {
    let trimmed = candidate
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '.' | ',' | ';' | '|'));
    if !trimmed.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    Some(title_case(trimmed))
}

/// Split "<name tokens> [code]" into a display name and optional code
fn split_name_code(rest: &str, config: &ClassifierConfig) -> Option<(String, Option<String>)> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    let (name_tokens, code) = match tokens.split_last() {
        Some((last, init)) if !init.is_empty() => match as_code(last, config.max_code_len) {
            Some(code) => (init, Some(code)),
            None => (&tokens[..], None),
        },
        _ => (&tokens[..], None),
    };

    let name = clean_name(&name_tokens.join(" "))?;
    Some((name, code))
}

// ============================================================================
// TESTS
// ============================================================================
