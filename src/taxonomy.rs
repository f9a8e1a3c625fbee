// src/taxonomy.rs
//! Canonical section titles and their hierarchical codes.
//!
//! A [`Taxonomy`] is built once by the caller (usually from the TOC
//! configuration file) and passed by reference into every indexing call.
//! Iteration order is declaration order, which makes fuzzy tie-breaking
//! reproducible.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::utils::error::TaxonomyError;

/// One canonical title and its code, e.g. `"II. Business Overview"` → `"020000"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub title: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
    by_title: HashMap<String, usize>,
}

// Shape of one node in the TOC configuration file.
#[derive(Debug, Deserialize)]
struct TocNode {
    section_code: String,
    section_name: String,
    #[serde(default)]
    children: Vec<TocNode>,
}

type TocConfig = BTreeMap<String, Vec<TocNode>>;

impl Taxonomy {
    /// Builds a taxonomy from `(title, code)` pairs in declaration order.
    ///
    /// A repeated title keeps its first position and takes the later code.
    pub fn new<I, T, C>(pairs: I) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = (T, C)>,
        T: Into<String>,
        C: Into<String>,
    {
        let mut taxonomy = Self::default();
        for (title, code) in pairs {
            taxonomy.insert(title.into(), code.into())?;
        }
        Ok(taxonomy)
    }

    /// Loads the flattened taxonomy for `report_type` from a TOC YAML document.
    pub fn from_toc_yaml(yaml: &str, report_type: &str) -> Result<Self, TaxonomyError> {
        let config: TocConfig = serde_yaml::from_str(yaml)?;
        Self::from_toc_config(config, report_type)
    }

    /// Same as [`Taxonomy::from_toc_yaml`] for the JSON rendition of the TOC.
    pub fn from_toc_json(json: &str, report_type: &str) -> Result<Self, TaxonomyError> {
        let config: TocConfig = serde_json::from_str(json)?;
        Self::from_toc_config(config, report_type)
    }

    fn from_toc_config(mut config: TocConfig, report_type: &str) -> Result<Self, TaxonomyError> {
        let roots = config
            .remove(report_type)
            .ok_or_else(|| TaxonomyError::UnknownReportType {
                requested: report_type.to_string(),
                available: config.keys().cloned().collect(),
            })?;

        let mut taxonomy = Self::default();
        taxonomy.flatten_nodes(roots)?;
        tracing::debug!("Loaded {} taxonomy entries for report type {}", taxonomy.len(), report_type);
        Ok(taxonomy)
    }

    // Depth-first pre-order, so parents precede their children.
    fn flatten_nodes(&mut self, nodes: Vec<TocNode>) -> Result<(), TaxonomyError> {
        for node in nodes {
            self.insert(node.section_name, node.section_code)?;
            self.flatten_nodes(node.children)?;
        }
        Ok(())
    }

    fn insert(&mut self, title: String, code: String) -> Result<(), TaxonomyError> {
        if title.trim().is_empty() {
            return Err(TaxonomyError::BlankField("title"));
        }
        if code.trim().is_empty() {
            return Err(TaxonomyError::BlankField("code"));
        }

        match self.by_title.get(&title) {
            Some(&idx) => {
                tracing::debug!("Duplicate taxonomy title '{}': code {} replaces {}", title, code, self.entries[idx].code);
                self.entries[idx].code = code;
            }
            None => {
                self.by_title.insert(title.clone(), self.entries.len());
                self.entries.push(TaxonomyEntry { title, code });
            }
        }
        Ok(())
    }

    /// Verbatim title lookup.
    pub fn code_for(&self, title: &str) -> Option<&str> {
        self.by_title
            .get(title)
            .map(|&idx| self.entries[idx].code.as_str())
    }

    /// First title declared for `code`.
    pub fn title_for(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.title.as_str())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.entries.iter().any(|entry| entry.code == code)
    }

    /// All codes in declaration order (duplicates possible if two titles share a code).
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxonomyEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parent of a hierarchical code, derived from its two-digit groups:
/// `020110` → `020100`, `020100` → `020000`, `020000` → none.
pub fn parent_code(code: &str) -> Option<String> {
    if code.is_empty() || code.len() % 2 != 0 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let groups: Vec<&str> = (0..code.len()).step_by(2).map(|i| &code[i..i + 2]).collect();
    let last_significant = groups.iter().rposition(|group| *group != "00")?;
    if last_significant == 0 {
        return None;
    }

    let mut parent = String::with_capacity(code.len());
    for (i, group) in groups.iter().enumerate() {
        parent.push_str(if i == last_significant { "00" } else { group });
    }
    Some(parent)
}
