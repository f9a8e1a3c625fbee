// src/extractors/table.rs

// --- Imports ---
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const HEADER_GROUP_TAG: &str = "thead";
const BODY_GROUP_TAG: &str = "tbody";
const ROW_TAG: &str = "tr";
const HEADER_CELL_TAG: &str = "th";
const BODY_CELL_TAG: &str = "td";

/// Header cells plus body rows. Rows may be shorter or longer than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// One JSON object per row, keyed by header.
    ///
    /// Missing trailing cells become `""` and cells beyond the header are
    /// dropped. A table without headers has no records.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        if self.headers.is_empty() {
            return Vec::new();
        }

        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .enumerate()
                    .map(|(i, header)| {
                        let cell = row.get(i).cloned().unwrap_or_default();
                        (header.clone(), Value::String(cell))
                    })
                    .collect()
            })
            .collect()
    }

    /// Plain-text rendering: the header line, then each row, cells joined by ` | `.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        if !self.headers.is_empty() {
            lines.push(self.headers.join(" | "));
        }
        lines.extend(self.rows.iter().map(|row| row.join(" | ")));
        lines.join("\n")
    }
}

/// Reads header cells from the table's header row group and cell rows from its
/// body row group. Body rows without any cell are dropped.
pub fn parse_table(table: ElementRef<'_>) -> Table {
    let headers = child_element(table, HEADER_GROUP_TAG)
        .map(|thead| {
            thead
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == HEADER_CELL_TAG)
                .map(cell_text)
                .collect()
        })
        .unwrap_or_default();

    let rows = child_element(table, BODY_GROUP_TAG)
        .map(|tbody| {
            child_elements(tbody, ROW_TAG)
                .map(|tr| child_elements(tr, BODY_CELL_TAG).map(cell_text).collect::<Vec<_>>())
                .filter(|row| !row.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let parsed = Table { headers, rows };
    tracing::trace!("Parsed table: {} headers, {} rows", parsed.headers.len(), parsed.rows.len());
    parsed
}

fn child_elements<'a, 'n>(parent: ElementRef<'a>, name: &'n str) -> impl Iterator<Item = ElementRef<'a>> + 'n
where
    'a: 'n,
{
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

fn child_element<'a>(parent: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    child_elements(parent, name).next()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};
    use serde_json::json;

    fn first_table(markup: &str) -> Table {
        let html = Html::parse_document(markup);
        let selector = Selector::parse("table").unwrap();
        let table = html.select(&selector).next().expect("fixture has a table");
        parse_table(table)
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parses_headers_and_rows() {
        let table = first_table(
            r#"<TABLE ACLASS="NORMAL">
                <THEAD><TR><TH> Product </TH><TH>Sales <SPAN>(KRW)</SPAN></TH></TR></THEAD>
                <TBODY>
                  <TR><TD>DRAM</TD><TD>1,200</TD></TR>
                  <TR><TD>NAND</TD></TR>
                  <TR></TR>
                </TBODY>
            </TABLE>"#,
        );

        assert_eq!(
            table,
            Table {
                headers: strings(&["Product", "Sales (KRW)"]),
                rows: vec![strings(&["DRAM", "1,200"]), strings(&["NAND"])],
            }
        );
    }

    #[test]
    fn table_without_header_group_has_no_headers() {
        let table = first_table("<TABLE><TR><TD>a</TD><TD>b</TD></TR></TABLE>");
        // The tree builder wraps bare rows in an implied body group.
        assert!(table.headers.is_empty());
        assert_eq!(table.rows, vec![strings(&["a", "b"])]);
        assert!(table.to_records().is_empty());
    }

    #[test]
    fn empty_table_parses_to_empty() {
        let table = first_table("<TABLE></TABLE>");
        assert!(table.is_empty());
        assert_eq!(table.to_text(), "");
    }

    #[test]
    fn ragged_rows_pad_to_records() {
        let table = Table {
            headers: strings(&["A", "B"]),
            rows: vec![strings(&["1", "2"]), strings(&["3"])],
        };
        let records: Vec<Value> = table.to_records().into_iter().map(Value::Object).collect();
        assert_eq!(records, vec![json!({"A": "1", "B": "2"}), json!({"A": "3", "B": ""})]);
    }

    #[test]
    fn surplus_cells_are_ignored_and_header_order_is_kept() {
        let table = Table {
            headers: strings(&["Z", "A"]),
            rows: vec![strings(&["1", "2", "extra"])],
        };
        let records = table.to_records();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["Z", "A"]);
        assert_eq!(records[0].len(), 2);
    }

    #[test]
    fn renders_pipe_separated_text() {
        let table = Table {
            headers: strings(&["Product", "Share"]),
            rows: vec![strings(&["DRAM", "60%"]), strings(&["NAND"])],
        };
        assert_eq!(table.to_text(), "Product | Share\nDRAM | 60%\nNAND");
    }
}
