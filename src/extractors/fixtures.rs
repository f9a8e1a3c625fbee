// src/extractors/fixtures.rs
// Shared test inputs: an annual-report taxonomy and a small report in the flat
// SECTION-N layout, with mixed ATOCID presence and nested formatting wrappers.

use crate::document::{load, Document};
use crate::taxonomy::Taxonomy;

pub const TAXONOMY: &[(&str, &str)] = &[
    ("I. Company Overview", "010000"),
    ("1. Company Overview", "010100"),
    ("2. Company History", "010200"),
    ("II. Business Overview", "020000"),
    ("1. Business Overview", "020100"),
    ("2. Main Products and Services", "020200"),
    ("3. Raw Materials and Production Facilities", "020300"),
    ("4. Sales and Purchase Orders", "020400"),
    ("5. Risk Management and Derivatives", "020500"),
    ("6. Major Contracts and R&D Activities", "020600"),
    ("7. Other Reference Information", "020700"),
    ("III. Financial Matters", "030000"),
    ("1. Summary Financial Information", "030100"),
];

pub const ANNUAL_REPORT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<DOCUMENT>
<DOCUMENT-NAME ACODE="11011">Annual Report</DOCUMENT-NAME>
<BODY>
<LIBRARY>
<SECTION-1 ACLASS="MANDATORY"><TITLE ATOC="Y" ATOCID="1">Table of Contents</TITLE>
<P>I. Company Overview ..... 3</P>
</SECTION-1>
<SECTION-1 ACLASS="MANDATORY"><TITLE ATOC="Y" ATOCID="2">I. Company Overview</TITLE>
<P>Company introduction.</P>
</SECTION-1>
<SECTION-2 ACLASS="MANDATORY"><TITLE ATOC="Y" ATOCID="3">1. Company Overview</TITLE>
<P>The company was founded in <SPAN USERMARK="B">1969</SPAN> in Suwon.</P>
<P>   </P>
</SECTION-2>
<SECTION-2><TITLE ATOC="Y" ATOCID="4">2. Company History</TITLE>
<P>Listed in 1975.</P>
</SECTION-2>
<SECTION-1><TITLE ATOC="Y" ATOCID="5">II. Business Overview</TITLE>
</SECTION-1>
<SECTION-2><TITLE ATOC="Y" ATOCID="6">1.  Business   Overview</TITLE>
<P>We make semiconductors.</P>
<P>We also make displays.</P>
</SECTION-2>
<SECTION-2><TITLE ATOC="Y" ATOCID="7">2. Main Products and Usages</TITLE>
<TABLE ACLASS="NORMAL"><THEAD><TR><TH>Product</TH><TH>Share</TH></TR></THEAD>
<TBODY><TR><TD>DRAM</TD><TD>60%</TD></TR><TR><TD>NAND</TD></TR><TR></TR></TBODY></TABLE>
<TABLE ACLASS="EXTRACTION"><TBODY><TR><TD>decorative</TD></TR></TBODY></TABLE>
</SECTION-2>
<SECTION-3><TITLE ATOC="Y" ATOCID="8">(1) Memory</TITLE><P>Memory detail.</P></SECTION-3>
<SECTION-2><TITLE ATOC="N">3. Raw Materials and Production Facilities</TITLE>
<DIV><P>Wrapped <B>deep</B> paragraph.</P></DIV>
</SECTION-2>
<SECTION-4><TITLE ATOC="Y" ATOCID="10">Orphan detail</TITLE><P>orphan</P></SECTION-4>
<SECTION-2><TITLE ATOC="Y" ATOCID="11">4. Sales and Purchase Orders</TITLE><P>Orders.</P></SECTION-2>
<SECTION-2><P>No title here</P></SECTION-2>
<SECTION-1><TITLE ATOC="Y" ATOCID="12">III. Financial Matters</TITLE><P>Financials.</P></SECTION-1>
</LIBRARY>
</BODY>
</DOCUMENT>
"#;

pub fn taxonomy() -> Taxonomy {
    Taxonomy::new(TAXONOMY.iter().copied()).expect("fixture taxonomy is valid")
}

pub fn annual_report() -> Document {
    load(ANNUAL_REPORT.as_bytes()).expect("fixture report parses")
}
