// src/extractors/index.rs

// --- Imports ---
use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::extractors::matcher::{default_matcher, SectionMatcher};
use crate::taxonomy::Taxonomy;

// --- CSS Selectors (Lazy Static) ---
// Section markers are siblings in document order regardless of their level number.
static SECTION_MARKER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("section-1, section-2, section-3, section-4")
        .expect("Failed to compile SECTION_MARKER_SELECTOR")
});

const MARKER_TAG_PREFIX: &str = "section-";
const TITLE_TAG: &str = "title";
// The ordering id lives on the TITLE child, not on the SECTION-N marker itself.
const ORDERING_ID_ATTR: &str = "atocid";
const CLASS_ATTR: &str = "aclass";

/// Position of a section in document order.
///
/// Newer reports carry a per-document ATOCID on every title. Older revisions
/// (and occasional individual markers) lack it; those get a synthetic key
/// anchored to the last ATOCID seen before them, so mixed documents still
/// sort into document order. `after` is `None` before the first ATOCID and
/// sorts ahead of every assigned id, 0 included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingKey {
    Assigned(u64),
    Synthetic { after: Option<u64>, position: usize },
}

impl OrderingKey {
    /// The ATOCID, or the 1-based scan position for synthetic keys.
    pub fn value(&self) -> u64 {
        match *self {
            OrderingKey::Assigned(id) => id,
            OrderingKey::Synthetic { position, .. } => position as u64,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, OrderingKey::Synthetic { .. })
    }

    fn sort_tuple(&self) -> (Option<u64>, u64, u8) {
        match *self {
            OrderingKey::Assigned(id) => (Some(id), 0, 0),
            OrderingKey::Synthetic { after, position } => (after, position as u64, 1),
        }
    }
}

impl Ord for OrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_tuple().cmp(&other.sort_tuple())
    }
}

impl PartialOrd for OrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OrderingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingKey::Assigned(id) => write!(f, "{}", id),
            OrderingKey::Synthetic { after: Some(after), position } => write!(f, "{}+#{}", after, position),
            OrderingKey::Synthetic { after: None, position } => write!(f, "#{}", position),
        }
    }
}

/// One titled section marker, resolved once at index-build time.
#[derive(Debug, Clone)]
pub struct IndexEntry<'a> {
    key: OrderingKey,
    position: usize,
    level: u8,
    title: String,
    code: Option<String>,
    aclass: Option<String>,
    element: ElementRef<'a>,
}

impl<'a> IndexEntry<'a> {
    pub fn key(&self) -> OrderingKey {
        self.key
    }

    /// 1-based position among all section markers in scan order.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Nominal nesting level, 1 through 4.
    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Matched taxonomy code; `None` for table-of-contents entries and boilerplate.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn aclass(&self) -> Option<&str> {
        self.aclass.as_deref()
    }

    /// The SECTION-N marker element in the loaded document.
    pub fn element(&self) -> ElementRef<'a> {
        self.element
    }

    fn sort_key(&self) -> (OrderingKey, usize) {
        (self.key, self.position)
    }
}

/// Serializable summary of an entry: `(key, level, title, code)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRow {
    pub key: OrderingKey,
    pub level: u8,
    pub title: String,
    pub code: Option<String>,
}

/// Section entries sorted by ordering key.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex<'a> {
    entries: Vec<IndexEntry<'a>>,
}

impl<'a> SectionIndex<'a> {
    fn from_entries(mut entries: Vec<IndexEntry<'a>>) -> Self {
        entries.sort_by_key(IndexEntry::sort_key);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexEntry<'a>> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[IndexEntry<'a>] {
        &self.entries
    }

    /// First entry with `key`.
    pub fn get(&self, key: OrderingKey) -> Option<&IndexEntry<'a>> {
        let idx = self.entries.partition_point(|entry| entry.key < key);
        self.entries.get(idx).filter(|entry| entry.key == key)
    }

    /// First entry, in key order, matched to `code`.
    pub fn find_by_code(&self, code: &str) -> Option<&IndexEntry<'a>> {
        self.entries.iter().find(|entry| entry.code() == Some(code))
    }

    /// Index of `entry` within the sorted arena.
    pub fn position_of(&self, entry: &IndexEntry<'_>) -> Option<usize> {
        let target = entry.sort_key();
        self.entries
            .binary_search_by(|candidate| candidate.sort_key().cmp(&target))
            .ok()
    }

    /// Entries strictly after `entry`, in key order.
    pub fn entries_after(&self, entry: &IndexEntry<'_>) -> &[IndexEntry<'a>] {
        match self.position_of(entry) {
            Some(idx) => &self.entries[idx + 1..],
            None => &[],
        }
    }

    /// Entries strictly before `entry`, in key order.
    pub fn entries_before(&self, entry: &IndexEntry<'_>) -> &[IndexEntry<'a>] {
        match self.position_of(entry) {
            Some(idx) => &self.entries[..idx],
            None => &[],
        }
    }

    pub fn matched(&self) -> impl Iterator<Item = &IndexEntry<'a>> {
        self.entries.iter().filter(|entry| entry.code.is_some())
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &IndexEntry<'a>> {
        self.entries.iter().filter(|entry| entry.code.is_none())
    }

    /// Share of indexed titles that resolved to a code (0 for an empty index).
    pub fn match_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.matched().count() as f64 / self.entries.len() as f64
    }

    pub fn rows(&self) -> Vec<IndexRow> {
        self.entries
            .iter()
            .map(|entry| IndexRow {
                key: entry.key,
                level: entry.level,
                title: entry.title.clone(),
                code: entry.code.clone(),
            })
            .collect()
    }
}

impl<'i, 'a> IntoIterator for &'i SectionIndex<'a> {
    type Item = &'i IndexEntry<'a>;
    type IntoIter = std::slice::Iter<'i, IndexEntry<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds the index with the default `Exact → Fuzzy(0.90)` cascade.
pub fn build_index<'a>(document: &'a Document, taxonomy: &Taxonomy) -> SectionIndex<'a> {
    build_index_with(document, taxonomy, &default_matcher())
}

/// Scans every SECTION-1..4 marker, resolves its title and ordering key, and
/// matches the title against `taxonomy`. Markers without a (non-blank) TITLE
/// child are skipped.
pub fn build_index_with<'a>(
    document: &'a Document,
    taxonomy: &Taxonomy,
    matcher: &dyn SectionMatcher,
) -> SectionIndex<'a> {
    let mut entries = Vec::new();
    let mut last_assigned: Option<u64> = None;
    let mut skipped = 0usize;

    for (scan_idx, marker) in document.select(&SECTION_MARKER_SELECTOR).enumerate() {
        let position = scan_idx + 1;

        let Some(level) = marker_level(marker) else {
            continue;
        };

        let Some(title_element) = title_child(marker) else {
            tracing::debug!("Skipping SECTION-{} marker #{}: no TITLE element", level, position);
            skipped += 1;
            continue;
        };

        let title = title_element.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            tracing::debug!("Skipping SECTION-{} marker #{}: blank TITLE", level, position);
            skipped += 1;
            continue;
        }

        let key = match title_element.value().attr(ORDERING_ID_ATTR).map(str::trim) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(id) => {
                    last_assigned = Some(id);
                    OrderingKey::Assigned(id)
                }
                Err(_) => {
                    tracing::debug!("Non-numeric ATOCID '{}' on '{}', using synthetic key", raw, title);
                    OrderingKey::Synthetic { after: last_assigned, position }
                }
            },
            None => OrderingKey::Synthetic { after: last_assigned, position },
        };

        let code = matcher.match_title(&title, taxonomy).map(str::to_string);
        match &code {
            Some(code) => tracing::debug!("Indexed [{}] L{} '{}' -> {}", key, level, title, code),
            None => tracing::debug!("Indexed [{}] L{} '{}' (unmatched)", key, level, title),
        }

        entries.push(IndexEntry {
            key,
            position,
            level,
            title,
            code,
            aclass: marker.value().attr(CLASS_ATTR).map(str::to_string),
            element: marker,
        });
    }

    let index = SectionIndex::from_entries(entries);
    tracing::info!(
        "Built section index: {} entries ({} matched, {} unmatched), {} markers skipped",
        index.len(),
        index.matched().count(),
        index.unmatched().count(),
        skipped
    );
    index
}

pub(crate) fn marker_level(marker: ElementRef<'_>) -> Option<u8> {
    marker
        .value()
        .name()
        .strip_prefix(MARKER_TAG_PREFIX)
        .and_then(|level| level.parse::<u8>().ok())
        .filter(|level| (1..=4).contains(level))
}

fn title_child(marker: ElementRef<'_>) -> Option<ElementRef<'_>> {
    marker
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == TITLE_TAG)
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::load;
    use crate::extractors::fixtures::{annual_report, taxonomy};
    use crate::extractors::matcher::ExactMatcher;

    #[test]
    fn indexes_titled_markers_in_document_order() {
        let doc = annual_report();
        let index = build_index(&doc, &taxonomy());

        let titles: Vec<&str> = index.iter().map(IndexEntry::title).collect();
        assert_eq!(
            titles,
            vec![
                "Table of Contents",
                "I. Company Overview",
                "1. Company Overview",
                "2. Company History",
                "II. Business Overview",
                "1.  Business   Overview",
                "2. Main Products and Usages",
                "(1) Memory",
                "3. Raw Materials and Production Facilities",
                "Orphan detail",
                "4. Sales and Purchase Orders",
                "III. Financial Matters",
            ]
        );
        assert!(index.iter().all(|entry| !entry.title().is_empty()));
        let levels: Vec<u8> = index.iter().map(IndexEntry::level).collect();
        assert_eq!(levels, vec![1, 1, 2, 2, 1, 2, 2, 3, 2, 4, 2, 1]);
    }

    #[test]
    fn resolves_codes_and_keeps_unmatched_entries() {
        let doc = annual_report();
        let index = build_index(&doc, &taxonomy());

        let codes: Vec<Option<&str>> = index.iter().map(IndexEntry::code).collect();
        assert_eq!(
            codes,
            vec![
                None,
                Some("010000"),
                Some("010100"),
                Some("010200"),
                Some("020000"),
                Some("020100"),
                Some("020200"),
                None,
                Some("020300"),
                None,
                Some("020400"),
                Some("030000"),
            ]
        );
        assert_eq!(index.unmatched().count(), 3);
        assert!((index.match_rate() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn exact_only_matcher_leaves_near_misses_unmatched() {
        let doc = annual_report();
        let index = build_index_with(&doc, &taxonomy(), &ExactMatcher);
        assert!(index.find_by_code("020100").is_some());
        assert!(index.find_by_code("020200").is_none());
    }

    #[test]
    fn missing_atocid_gets_synthetic_key_in_document_order() {
        let doc = annual_report();
        let index = build_index(&doc, &taxonomy());

        let raw_materials = index.find_by_code("020300").unwrap();
        assert_eq!(raw_materials.key(), OrderingKey::Synthetic { after: Some(8), position: 9 });
        assert!(raw_materials.key() > OrderingKey::Assigned(8));
        assert!(raw_materials.key() < OrderingKey::Assigned(10));

        let keys: Vec<OrderingKey> = index.iter().map(IndexEntry::key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn old_revision_without_atocids_uses_scan_positions() {
        let doc = load(
            br#"<DOCUMENT>
            <SECTION-1><TITLE>I. Company Overview</TITLE></SECTION-1>
            <SECTION-2><TITLE>1. Company Overview</TITLE></SECTION-2>
            <SECTION-2><P>untitled</P></SECTION-2>
            <SECTION-1><TITLE ATOCID="x7">II. Business Overview</TITLE></SECTION-1>
            </DOCUMENT>"#,
        )
        .unwrap();
        let index = build_index(&doc, &taxonomy());

        let keys: Vec<String> = index.iter().map(|entry| entry.key().to_string()).collect();
        assert_eq!(keys, vec!["#1", "#2", "#4"]);
        assert!(index.iter().all(|entry| entry.key().is_synthetic()));
        assert_eq!(index.iter().map(|e| e.key().value()).collect::<Vec<_>>(), vec![1, 2, 4]);
    }

    #[test]
    fn leading_synthetic_key_sorts_before_atocid_zero() {
        let doc = load(
            br#"<DOCUMENT>
            <SECTION-1><TITLE>I. Company Overview</TITLE></SECTION-1>
            <SECTION-1><TITLE ATOCID="0">II. Business Overview</TITLE></SECTION-1>
            <SECTION-2><TITLE>1. Business Overview</TITLE></SECTION-2>
            <SECTION-1><TITLE ATOCID="1">III. Financial Matters</TITLE></SECTION-1>
            </DOCUMENT>"#,
        )
        .unwrap();
        let index = build_index(&doc, &taxonomy());

        let codes: Vec<Option<&str>> = index.iter().map(IndexEntry::code).collect();
        assert_eq!(codes, vec![Some("010000"), Some("020000"), Some("020100"), Some("030000")]);
        let keys: Vec<String> = index.iter().map(|entry| entry.key().to_string()).collect();
        assert_eq!(keys, vec!["#1", "0", "0+#3", "1"]);
        assert!(OrderingKey::Synthetic { after: None, position: 5 } < OrderingKey::Assigned(0));
    }

    #[test]
    fn title_with_inline_markup_matches() {
        let doc = load(
            br#"<DOCUMENT><SECTION-1><TITLE ATOCID="1">I. <SPAN USERMARK="B">Company</SPAN> Overview</TITLE></SECTION-1></DOCUMENT>"#,
        )
        .unwrap();
        let index = build_index(&doc, &taxonomy());
        let entry = index.iter().next().unwrap();
        assert_eq!(entry.title(), "I. Company Overview");
        assert_eq!(entry.code(), Some("010000"));
    }

    #[test]
    fn keys_compare_numerically_not_lexicographically() {
        let doc = load(
            br#"<DOCUMENT>
            <SECTION-1><TITLE ATOCID="9">I. Company Overview</TITLE></SECTION-1>
            <SECTION-1><TITLE ATOCID="10">II. Business Overview</TITLE></SECTION-1>
            <SECTION-1><TITLE ATOCID="100">III. Financial Matters</TITLE></SECTION-1>
            </DOCUMENT>"#,
        )
        .unwrap();
        let index = build_index(&doc, &taxonomy());
        let codes: Vec<&str> = index.iter().filter_map(IndexEntry::code).collect();
        assert_eq!(codes, vec!["010000", "020000", "030000"]);
    }

    #[test]
    fn lookup_by_key_and_aclass() {
        let doc = annual_report();
        let index = build_index(&doc, &taxonomy());

        let entry = index.get(OrderingKey::Assigned(3)).unwrap();
        assert_eq!(entry.title(), "1. Company Overview");
        assert_eq!(entry.aclass(), Some("MANDATORY"));
        assert_eq!(entry.element().value().name(), "section-2");
        assert!(index.get(OrderingKey::Assigned(9)).is_none());
        assert_eq!(index.get(OrderingKey::Assigned(4)).unwrap().aclass(), None);
    }

    #[test]
    fn rows_serialize_as_flat_tuples() {
        let doc = annual_report();
        let index = build_index(&doc, &taxonomy());
        let rows = index.rows();
        assert_eq!(rows.len(), index.len());

        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": {"assigned": 2},
                "level": 1,
                "title": "I. Company Overview",
                "code": "010000"
            })
        );
    }

    #[test]
    fn empty_document_yields_empty_index() {
        let doc = load(b"").unwrap();
        let index = build_index(&doc, &taxonomy());
        assert!(index.is_empty());
        assert_eq!(index.match_rate(), 0.0);
    }
}
