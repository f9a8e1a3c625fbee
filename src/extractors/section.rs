// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::document::{Document, DocumentLoader};
use crate::extractors::hierarchy::children_of;
use crate::extractors::index::{build_index_with, marker_level, IndexEntry, OrderingKey, SectionIndex};
use crate::extractors::matcher::{cascade_with_threshold, default_matcher, SectionMatcher};
use crate::extractors::table::{parse_table, Table};
use crate::taxonomy::Taxonomy;
use crate::utils::config::ExtractorConfig;
use crate::utils::error::{ConfigError, DocumentParseError};

// --- CSS Selectors (Lazy Static) ---
// Only NORMAL tables carry data; EXTRACTION and other classes are layout.
static NORMAL_TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"table[aclass="NORMAL"]"#).expect("Failed to compile NORMAL_TABLE_SELECTOR")
});

const PARAGRAPH_TAG: &str = "p";

// --- Data Structures ---
/// Extracted content of one section and its subsections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionNode {
    pub code: Option<String>,
    pub title: String,
    pub level: u8,
    pub key: OrderingKey,
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
    pub children: Vec<SectionNode>,
}

/// Recursive element totals for a section subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ElementCounts {
    pub paragraphs: usize,
    pub tables: usize,
    pub subsections: usize,
}

impl SectionNode {
    /// Paragraphs of this section followed by those of each subsection, depth first.
    pub fn all_paragraphs(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.paragraphs.iter().map(String::as_str).collect();
        for child in &self.children {
            out.extend(child.all_paragraphs());
        }
        out
    }

    pub fn all_tables(&self) -> Vec<&Table> {
        let mut out: Vec<&Table> = self.tables.iter().collect();
        for child in &self.children {
            out.extend(child.all_tables());
        }
        out
    }

    pub fn counts(&self) -> ElementCounts {
        self.children.iter().fold(
            ElementCounts {
                paragraphs: self.paragraphs.len(),
                tables: self.tables.len(),
                subsections: self.children.len(),
            },
            |acc, child| {
                let sub = child.counts();
                ElementCounts {
                    paragraphs: acc.paragraphs + sub.paragraphs,
                    tables: acc.tables + sub.tables,
                    subsections: acc.subsections + sub.subsections,
                }
            },
        )
    }

    /// This section's own content as plain text: paragraphs, then tables,
    /// separated by blank lines. Subsections are not included.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .cloned()
            .chain(self.tables.iter().map(Table::to_text).filter(|t| !t.is_empty()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Depth-first search for the first node with `code`, including `self`.
    pub fn find(&self, code: &str) -> Option<&SectionNode> {
        if self.code.as_deref() == Some(code) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(code))
    }
}

// --- Content Extraction ---
/// Builds the [`SectionNode`] for `entry`, recursing into the subsections
/// [`children_of`] finds for it.
pub fn extract(entry: &IndexEntry<'_>, index: &SectionIndex<'_>) -> SectionNode {
    let mut paragraphs = Vec::new();
    let mut tables = Vec::new();
    collect_content(entry.element(), &mut paragraphs, &mut tables);

    let children: Vec<SectionNode> = children_of(entry, index)
        .into_iter()
        .map(|child| extract(child, index))
        .collect();

    tracing::debug!(
        "Extracted [{}] '{}': {} paragraphs, {} tables, {} subsections",
        entry.key(),
        entry.title(),
        paragraphs.len(),
        tables.len(),
        children.len()
    );

    SectionNode {
        code: entry.code().map(str::to_string),
        title: entry.title().to_string(),
        level: entry.level(),
        key: entry.key(),
        paragraphs,
        tables,
        children,
    }
}

/// Extracts the first section matched to `code`; `None` when the document has no such section.
pub fn extract_by_code(index: &SectionIndex<'_>, code: &str) -> Option<SectionNode> {
    match index.find_by_code(code) {
        Some(entry) => Some(extract(entry, index)),
        None => {
            tracing::debug!("Section {} not present in document", code);
            None
        }
    }
}

// Walks the marker's subtree in document order. A section marker nested
// inside another (the tree builder does this when a closing tag is lost)
// owns its own content, so the walk does not enter it.
fn collect_content(marker: ElementRef<'_>, paragraphs: &mut Vec<String>, tables: &mut Vec<Table>) {
    for child in marker.children().filter_map(ElementRef::wrap) {
        if marker_level(child).is_some() {
            continue;
        }

        if child.value().name() == PARAGRAPH_TAG {
            let mut text = String::new();
            paragraph_text(child, &mut text);
            let text = text.trim();
            if !text.is_empty() {
                paragraphs.push(text.to_string());
            }
        } else if NORMAL_TABLE_SELECTOR.matches(&child) {
            tables.push(parse_table(child));
        }
        // Paragraphs may wrap data tables.
        collect_content(child, paragraphs, tables);
    }
}

// Text of a paragraph without the cells of any data table it wraps.
fn paragraph_text(element: ElementRef<'_>, out: &mut String) {
    for node in element.children() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(node) {
            if !NORMAL_TABLE_SELECTOR.matches(&child) && marker_level(child).is_none() {
                paragraph_text(child, out);
            }
        }
    }
}

// --- Main Extractor Structure ---
/// Loader plus matcher: the pieces a caller needs to go from bytes to sections.
#[derive(Debug)]
pub struct SectionExtractor {
    loader: DocumentLoader,
    matcher: Box<dyn SectionMatcher>,
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionExtractor {
    /// UTF-8 then EUC-KR decoding, `Exact → Fuzzy(0.90)` matching.
    pub fn new() -> Self {
        Self {
            loader: DocumentLoader::default(),
            matcher: Box::new(default_matcher()),
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            loader: DocumentLoader::from_config(config)?,
            matcher: Box::new(cascade_with_threshold(config.fuzzy_threshold)?),
        })
    }

    /// Replaces the matching strategy.
    pub fn with_matcher<M: SectionMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_loader(mut self, loader: DocumentLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn loader(&self) -> &DocumentLoader {
        &self.loader
    }

    pub fn matcher(&self) -> &dyn SectionMatcher {
        self.matcher.as_ref()
    }

    pub fn load(&self, bytes: &[u8]) -> Result<Document, DocumentParseError> {
        self.loader.load(bytes)
    }

    pub fn build_index<'a>(&self, document: &'a Document, taxonomy: &Taxonomy) -> SectionIndex<'a> {
        build_index_with(document, taxonomy, self.matcher.as_ref())
    }

    pub fn extract(&self, entry: &IndexEntry<'_>, index: &SectionIndex<'_>) -> SectionNode {
        extract(entry, index)
    }

    pub fn extract_by_code(&self, index: &SectionIndex<'_>, code: &str) -> Option<SectionNode> {
        extract_by_code(index, code)
    }
}
