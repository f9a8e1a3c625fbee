// src/document/mod.rs
pub mod loader;
mod markup;

use encoding_rs::Encoding;
use scraper::{html::Select, ElementRef, Html, Selector};

pub use loader::{load, DocumentLoader};

/// A parsed report: the repaired markup tree plus how it was decoded.
///
/// Index entries and extracted content borrow element views from this tree,
/// so it must outlive any [`crate::extractors::SectionIndex`] built from it.
#[derive(Debug)]
pub struct Document {
    html: Html,
    encoding: &'static Encoding,
    used_fallback: bool,
}

impl Document {
    pub(crate) fn new(html: Html, encoding: &'static Encoding, used_fallback: bool) -> Self {
        Self { html, encoding, used_fallback }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All elements matching `selector`, in document order.
    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// The encoding that decoded successfully.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Number of markup problems the tree builder repaired.
    pub fn recovered_errors(&self) -> usize {
        self.html.errors.len()
    }
}
