// src/extractors/coverage.rs
use std::collections::BTreeSet;

use serde::Serialize;

use crate::extractors::index::SectionIndex;
use crate::taxonomy::Taxonomy;

/// Expected-versus-found comparison of taxonomy codes for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    /// Distinct codes in the taxonomy.
    pub total_expected: usize,
    /// Distinct codes matched somewhere in the document.
    pub total_extracted: usize,
    /// Indexed section markers, matched or not.
    pub total_in_document: usize,
    pub unmapped_count: usize,
    pub missing_sections: Vec<String>,
    pub extra_sections: Vec<String>,
    pub coverage_rate: f64,
}

pub fn coverage(index: &SectionIndex<'_>, taxonomy: &Taxonomy) -> CoverageReport {
    let expected: BTreeSet<&str> = taxonomy.codes().collect();
    let extracted: BTreeSet<&str> = index.matched().filter_map(|entry| entry.code()).collect();

    let missing_sections: Vec<String> = expected.difference(&extracted).map(|c| c.to_string()).collect();
    let extra_sections: Vec<String> = extracted.difference(&expected).map(|c| c.to_string()).collect();

    let coverage_rate = if expected.is_empty() {
        0.0
    } else {
        extracted.len() as f64 / expected.len() as f64
    };

    let report = CoverageReport {
        total_expected: expected.len(),
        total_extracted: extracted.len(),
        total_in_document: index.len(),
        unmapped_count: index.unmatched().count(),
        missing_sections,
        extra_sections,
        coverage_rate,
    };

    tracing::info!(
        "Section coverage: {}/{} codes ({:.1}%), {} unmapped titles, {} missing",
        report.total_extracted,
        report.total_expected,
        report.coverage_rate * 100.0,
        report.unmapped_count,
        report.missing_sections.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::fixtures::{annual_report, taxonomy};
    use crate::extractors::index::{build_index, build_index_with};
    use crate::extractors::matcher::{MatchResult, SectionMatcher};
    use pretty_assertions::assert_eq;

    #[test]
    fn reports_missing_codes_for_fixture() {
        let doc = annual_report();
        let toc = taxonomy();
        let index = build_index(&doc, &toc);

        let report = coverage(&index, &toc);
        assert_eq!(report.total_expected, 13);
        assert_eq!(report.total_extracted, 9);
        assert_eq!(report.total_in_document, 12);
        assert_eq!(report.unmapped_count, 3);
        assert_eq!(report.missing_sections, vec!["020500", "020600", "020700", "030100"]);
        assert!(report.extra_sections.is_empty());
        assert!((report.coverage_rate - 9.0 / 13.0).abs() < 1e-9);
    }

    #[derive(Debug)]
    struct LegacyCodes;

    impl SectionMatcher for LegacyCodes {
        fn match_title<'t>(&self, title: &str, _taxonomy: &'t Taxonomy) -> MatchResult<'t> {
            (title == "Table of Contents").then_some("000000")
        }
    }

    #[test]
    fn codes_outside_taxonomy_are_extra() {
        let doc = annual_report();
        let toc = taxonomy();
        let index = build_index_with(&doc, &toc, &LegacyCodes);

        let report = coverage(&index, &toc);
        assert_eq!(report.extra_sections, vec!["000000"]);
        assert_eq!(report.total_extracted, 1);
        assert_eq!(report.missing_sections.len(), 13);
        // Found codes count toward the rate whether or not the taxonomy knows them.
        assert!((report.coverage_rate - 1.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn empty_taxonomy_has_zero_rate() {
        let doc = annual_report();
        let toc = Taxonomy::default();
        let index = build_index(&doc, &toc);

        let report = coverage(&index, &toc);
        assert_eq!(report.total_expected, 0);
        assert_eq!(report.coverage_rate, 0.0);
        assert_eq!(report.unmapped_count, 12);
    }
}
