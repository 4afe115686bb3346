//! Substitution batches and pre-launch validation.
//!
//! A batch is a sequence of entries, each either a bare string (sugar for
//! a length-1 record) or a complete record with one value per template
//! slot. Validation normalizes the batch into records and is exhaustive
//! and synchronous: it completes before any child process is spawned, so
//! a malformed batch never has OS side effects.

use crate::error::{FanoutError, Result};
use crate::template::Template;
use serde::Deserialize;
use std::path::Path;

/// One fixed-length set of values filling every slot of a template, in the
/// same left-to-right order as the slots appear.
pub type SubstitutionRecord = Vec<String>;

/// One entry of a substitution batch as supplied by the caller.
///
/// Batch files deserialize into this shape directly: a YAML or JSON
/// sequence whose items are either strings or sequences of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SubEntry {
    /// A bare string, sugar for a length-1 record.
    Value(String),
    /// A complete record, one value per slot.
    Record(SubstitutionRecord),
}

impl From<&str> for SubEntry {
    fn from(value: &str) -> Self {
        SubEntry::Value(value.to_string())
    }
}

impl From<String> for SubEntry {
    fn from(value: String) -> Self {
        SubEntry::Value(value)
    }
}

impl From<Vec<String>> for SubEntry {
    fn from(record: Vec<String>) -> Self {
        SubEntry::Record(record)
    }
}

/// Load batch entries from a YAML or JSON file.
///
/// The format is chosen by file extension: `.json` parses as JSON,
/// anything else as YAML.
pub fn load_entries(path: &Path) -> Result<Vec<SubEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        FanoutError::UserError(format!(
            "failed to read substitutions file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| {
            FanoutError::UserError(format!(
                "failed to parse substitutions file '{}': {}",
                path.display(),
                e
            ))
        })
    } else {
        serde_yaml::from_str(&content).map_err(|e| {
            FanoutError::UserError(format!(
                "failed to parse substitutions file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

/// Validate a batch against a template and normalize it into records.
///
/// Checks, in order:
///
/// 1. the batch is all bare strings or all records (`HeterogeneousBatch`);
/// 2. every record has the same length (`ArityMismatch`);
/// 3. that length equals the template's slot count
///    (`PlaceholderCountMismatch`).
///
/// An empty batch validates to zero records, whatever the template.
pub fn validate(template: &Template, entries: &[SubEntry]) -> Result<Vec<SubstitutionRecord>> {
    let all_values = entries.iter().all(|e| matches!(e, SubEntry::Value(_)));
    let all_records = entries.iter().all(|e| matches!(e, SubEntry::Record(_)));
    if !all_values && !all_records {
        return Err(FanoutError::HeterogeneousBatch);
    }

    let records: Vec<SubstitutionRecord> = entries
        .iter()
        .map(|entry| match entry {
            SubEntry::Value(value) => vec![value.clone()],
            SubEntry::Record(record) => record.clone(),
        })
        .collect();

    if let Some(first) = records.first() {
        let arity = first.len();
        for (index, record) in records.iter().enumerate() {
            if record.len() != arity {
                return Err(FanoutError::ArityMismatch {
                    expected: arity,
                    found: record.len(),
                    index,
                });
            }
        }

        let slots = template.slot_count();
        if arity != slots {
            return Err(FanoutError::PlaceholderCountMismatch { slots, arity });
        }
    }

    Ok(records)
}
