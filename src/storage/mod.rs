// src/storage/mod.rs
//! Flattening of extracted section trees into storage-ready records.
//!
//! Writing the records anywhere is the caller's job; this module only shapes
//! and serializes them.

pub mod sequence;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extractors::section::SectionNode;
use crate::taxonomy::parent_code;
use crate::utils::config::ExtractorConfig;
use crate::utils::error::StorageError;

pub use sequence::SectionSequence;

static RCEPT_NO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{14}$").expect("Failed to compile RCEPT_NO_RE"));
static RCEPT_DT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("Failed to compile RCEPT_DT_RE"));
static CORP_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("Failed to compile CORP_CODE_RE"));
static STOCK_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}$").expect("Failed to compile STOCK_CODE_RE"));

/// Report-level metadata shared by every record of one filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub rcept_no: String,
    /// Publication date, `YYYYMMDD`.
    pub rcept_dt: String,
    pub corp_code: String,
    pub corp_name: String,
    pub stock_code: String,
    pub report_type: String,
    pub report_name: String,
}

impl ReportMeta {
    pub fn validate(&self) -> Result<(), StorageError> {
        check(&RCEPT_NO_RE, "rcept_no", &self.rcept_no, "14 digits")?;
        check(&RCEPT_DT_RE, "rcept_dt", &self.rcept_dt, "YYYYMMDD")?;
        check(&CORP_CODE_RE, "corp_code", &self.corp_code, "8 digits")?;
        check(&STOCK_CODE_RE, "stock_code", &self.stock_code, "6 digits")?;
        Ok(())
    }

    /// Four-digit year of the publication date.
    pub fn year(&self) -> &str {
        self.rcept_dt.get(..4).unwrap_or(&self.rcept_dt)
    }
}

fn check(re: &Regex, field: &'static str, value: &str, expected: &'static str) -> Result<(), StorageError> {
    if re.is_match(value) {
        Ok(())
    } else {
        Err(StorageError::InvalidMetadata { field, value: value.to_string(), expected })
    }
}

/// One section of one report, with its own text only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// `{rcept_no}_{section_code}`
    pub document_id: String,
    #[serde(flatten)]
    pub report: ReportMeta,
    pub year: String,
    pub section_code: String,
    pub section_title: String,
    pub level: u8,
    /// Codes from the flattened root down to this section.
    pub section_path: Vec<String>,
    pub parent_section_code: Option<String>,
    pub text: String,
    /// Length of the text before any truncation.
    pub char_count: usize,
    pub word_count: usize,
    pub parsed_at: DateTime<Utc>,
    pub parser_version: String,
}

pub fn document_id(rcept_no: &str, section_code: &str) -> String {
    format!("{}_{}", rcept_no, section_code)
}

/// Flattens `node` and its subsections in pre-order, stamping the current time.
pub fn flatten(
    node: &SectionNode,
    meta: &ReportMeta,
    config: &ExtractorConfig,
) -> Result<Vec<SectionRecord>, StorageError> {
    flatten_at(node, meta, config, Utc::now())
}

/// Like [`flatten`] with a fixed parse timestamp.
///
/// Sections without a code, or whose own text is empty, produce no record;
/// their subsections are still visited.
pub fn flatten_at(
    node: &SectionNode,
    meta: &ReportMeta,
    config: &ExtractorConfig,
    parsed_at: DateTime<Utc>,
) -> Result<Vec<SectionRecord>, StorageError> {
    meta.validate()?;

    let mut flattener = Flattener { meta, config, parsed_at, path: Vec::new(), records: Vec::new() };
    flattener.visit(node);

    tracing::info!(
        "Flattened section '{}' of {} into {} records",
        node.title,
        meta.rcept_no,
        flattener.records.len()
    );
    Ok(flattener.records)
}

struct Flattener<'c> {
    meta: &'c ReportMeta,
    config: &'c ExtractorConfig,
    parsed_at: DateTime<Utc>,
    path: Vec<String>,
    records: Vec<SectionRecord>,
}

impl Flattener<'_> {
    fn visit(&mut self, node: &SectionNode) {
        let coded = match node.code.as_deref() {
            Some(code) => {
                self.path.push(code.to_string());
                let text = node.text();
                if text.is_empty() {
                    tracing::debug!("No record for {} '{}': empty text", code, node.title);
                } else {
                    let record = self.record(node, code, text);
                    self.records.push(record);
                }
                true
            }
            None => {
                tracing::debug!("No record for unmatched section '{}'", node.title);
                false
            }
        };

        for child in &node.children {
            self.visit(child);
        }

        if coded {
            self.path.pop();
        }
    }

    fn record(&self, node: &SectionNode, code: &str, text: String) -> SectionRecord {
        // Inside the flattened tree the parent is the nearest coded ancestor;
        // the root falls back to the code hierarchy.
        let parent_section_code = match self.path.len() {
            0 | 1 => parent_code(code),
            n => Some(self.path[n - 2].clone()),
        };
        let char_count = text.chars().count();
        let word_count = text.split_whitespace().count();

        SectionRecord {
            document_id: document_id(&self.meta.rcept_no, code),
            report: self.meta.clone(),
            year: self.meta.year().to_string(),
            section_code: code.to_string(),
            section_title: node.title.clone(),
            level: node.level,
            section_path: self.path.clone(),
            parent_section_code,
            text: truncate_text(text, self.config.max_text_chars),
            char_count,
            word_count,
            parsed_at: self.parsed_at,
            parser_version: self.config.parser_version.clone(),
        }
    }
}

/// Cuts `text` to `max_chars` characters and appends a note with the original length.
pub fn truncate_text(text: String, max_chars: usize) -> String {
    let original = text.chars().count();
    if original <= max_chars {
        return text;
    }

    tracing::warn!("Text truncated from {} to {} chars", original, max_chars);
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(&format!("\n\n[... TRUNCATED - Original length: {} chars]", original));
    truncated
}

/// One JSON object per line.
pub fn to_json_lines(records: &[SectionRecord]) -> Result<String, StorageError> {
    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

pub fn to_json_pretty(records: &[SectionRecord]) -> Result<String, StorageError> {
    serde_json::to_string_pretty(records).map_err(|e| StorageError::SerializationError(e.to_string()))
}
