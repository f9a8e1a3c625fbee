// src/storage/sequence.rs
use serde::Serialize;

use crate::storage::{ReportMeta, SectionRecord};
use crate::utils::error::StorageError;

const DEFAULT_SEPARATOR: &str = "\n\n";

/// Ordered records of a single report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSequence {
    report: ReportMeta,
    sections: Vec<SectionRecord>,
}

impl SectionSequence {
    /// Fails on an empty list or on records whose report metadata differs.
    pub fn new(sections: Vec<SectionRecord>) -> Result<Self, StorageError> {
        let first = sections.first().ok_or(StorageError::EmptySequence)?;
        let report = first.report.clone();

        if let Some(other) = sections.iter().find(|s| s.report != report) {
            return Err(StorageError::MixedReports(report.rcept_no, other.report.rcept_no.clone()));
        }

        Ok(Self { report, sections })
    }

    pub fn report(&self) -> &ReportMeta {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectionRecord> {
        self.sections.iter()
    }

    pub fn get(&self, section_code: &str) -> Option<&SectionRecord> {
        self.sections.iter().find(|s| s.section_code == section_code)
    }

    pub fn contains(&self, section_code: &str) -> bool {
        self.get(section_code).is_some()
    }

    pub fn section_codes(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.section_code.as_str()).collect()
    }

    pub fn section_titles(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.section_title.as_str()).collect()
    }

    /// All section texts separated by blank lines.
    pub fn text(&self) -> String {
        self.text_with(DEFAULT_SEPARATOR)
    }

    pub fn text_with(&self, separator: &str) -> String {
        self.sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn total_char_count(&self) -> usize {
        self.sections.iter().map(|s| s.char_count).sum()
    }

    pub fn total_word_count(&self) -> usize {
        self.sections.iter().map(|s| s.word_count).sum()
    }

    pub fn into_records(self) -> Vec<SectionRecord> {
        self.sections
    }
}

impl<'s> IntoIterator for &'s SectionSequence {
    type Item = &'s SectionRecord;
    type IntoIter = std::slice::Iter<'s, SectionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
