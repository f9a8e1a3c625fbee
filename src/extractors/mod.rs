// src/extractors/mod.rs
pub mod coverage;
pub mod hierarchy;
pub mod index;
pub mod matcher;
pub mod section;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export key extraction types for convenience
pub use coverage::{coverage, CoverageReport};
pub use hierarchy::{ancestors_of, children_of, parent_of};
pub use index::{build_index, build_index_with, IndexEntry, IndexRow, OrderingKey, SectionIndex};
pub use matcher::{
    cascade_with_threshold, default_matcher, CascadeMatcher, ExactMatcher, FuzzyMatcher, MatchResult,
    SectionMatcher,
};
pub use section::{extract, extract_by_code, ElementCounts, SectionExtractor, SectionNode};
pub use table::{parse_table, Table};
