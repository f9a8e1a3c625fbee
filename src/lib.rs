// src/lib.rs
//! Section extraction for DART disclosure documents.
//!
//! Reports arrive as one flat markup stream in which every `SECTION-N` marker
//! is a sibling of every other. The pipeline decodes and parses the bytes
//! ([`document`]), indexes the titled markers and matches their titles against
//! a caller-supplied [`Taxonomy`] ([`extractors::index`], [`extractors::matcher`]),
//! rebuilds the nesting from levels ([`extractors::hierarchy`]), and gathers
//! paragraphs and tables per section ([`extractors::section`]).
//!
//! ```no_run
//! use dart_extractor::{SectionExtractor, Taxonomy};
//!
//! # fn run(bytes: &[u8], toc_yaml: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let taxonomy = Taxonomy::from_toc_yaml(toc_yaml, "A001")?;
//! let extractor = SectionExtractor::new();
//! let document = extractor.load(bytes)?;
//! let index = extractor.build_index(&document, &taxonomy);
//! if let Some(section) = extractor.extract_by_code(&index, "020000") {
//!     println!("{}: {} paragraphs", section.title, section.counts().paragraphs);
//! }
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod extractors;
pub mod storage;
pub mod taxonomy;
pub mod utils;

pub use document::{load, Document, DocumentLoader};
pub use extractors::{
    build_index, children_of, coverage, extract, extract_by_code, CoverageReport, IndexEntry, OrderingKey,
    SectionExtractor, SectionIndex, SectionMatcher, SectionNode, Table,
};
pub use storage::{flatten, ReportMeta, SectionRecord, SectionSequence};
pub use taxonomy::Taxonomy;
pub use utils::error::{ConfigError, DocumentParseError, MatcherError, StorageError, TaxonomyError};
pub use utils::ExtractorConfig;
