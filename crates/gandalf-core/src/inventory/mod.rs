//! Inventory parsing and validation
//!
//! Turns the CSV host inventory into validated [`HostRecord`]s.
//!
//! ## Processing
//!
//! 1. Lines whose first non-blank, non-quote character is `#` are dropped,
//!    as are blank lines
//! 2. Header cells are normalized (`"Entity Type"` -> `entity_type`)
//! 3. Rows with a non-blank value in the ignore column are dropped
//! 4. Every cell with a declared validator is checked, then typed
//!
//! Validation is all-or-nothing: the first bad field aborts the whole parse
//! with [`Error::Integrity`], and no partial record set is ever returned.
//!
//! ## Example
//!
//! ```rust
//! use gandalf_core::inventory::{parse_str, InventoryOptions};
//!
//! let csv = "Hostname,Domain,IP,Mask\nfoo,bar.com,10.0.0.5,24\n";
//! let hosts = parse_str(csv, &InventoryOptions::default()).unwrap();
//! assert_eq!(hosts[0].fqdn(), "foo.bar.com");
//! ```

pub mod fields;
pub mod record;

pub use record::{EntityType, HostRecord, HostRecordBuilder};

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Columns every inventory must carry
pub const REQUIRED_COLUMNS: [&str; 3] = ["hostname", "domain", "ip"];

/// Default name of the column marking rows to skip
pub const DEFAULT_IGNORE_COLUMN: &str = "gandalf_ignore";

/// Inventory parser options
#[derive(Debug, Clone)]
pub struct InventoryOptions {
    /// Column whose non-blank value drops the row; normalized before use
    pub ignore_column: String,
}

impl InventoryOptions {
    /// Set the ignore column
    pub fn with_ignore_column(mut self, column: impl Into<String>) -> Self {
        self.ignore_column = column.into();
        self
    }
}

impl Default for InventoryOptions {
    fn default() -> Self {
        Self {
            ignore_column: DEFAULT_IGNORE_COLUMN.to_string(),
        }
    }
}

/// Read and parse an inventory file
pub fn parse_file(path: impl AsRef<Path>, options: &InventoryOptions) -> Result<Vec<HostRecord>> {
    let text = std::fs::read_to_string(path)?;
    parse_str(&text, options)
}

/// Parse inventory text
pub fn parse_str(text: &str, options: &InventoryOptions) -> Result<Vec<HostRecord>> {
    let source = strip_comments(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source.as_bytes());

    let layout = ColumnLayout::new(reader.headers()?.iter());
    for required in REQUIRED_COLUMNS {
        if layout.slot(required).is_none() {
            return Err(Error::MissingColumn(required.to_string()));
        }
    }
    let ignore_slot = layout.slot(&fields::normalize_column(&options.ignore_column));

    let mut hosts = Vec::new();
    let mut ignored = 0usize;

    for (index, row) in reader.records().enumerate() {
        let row_number = index + 2;
        let row = row?;
        let values = layout.values(&row);

        if ignore_slot.is_some_and(|slot| !values[slot].is_empty()) {
            ignored += 1;
            continue;
        }

        for (column, value) in layout.names.iter().zip(&values) {
            if !fields::validate(column, value) {
                return Err(Error::integrity(row_number, column.as_str(), value.as_str()));
            }
        }

        hosts.push(build_record(&layout, values));
    }

    debug!("Parsed inventory: {} host(s), {} ignored", hosts.len(), ignored);
    Ok(hosts)
}

/// Drop comment lines and blank lines before CSV parsing
///
/// Lines continuing a quoted multi-line cell are kept verbatim.
fn strip_comments(text: &str) -> String {
    let mut kept = Vec::new();
    let mut in_quotes = false;

    for line in text.lines() {
        if !in_quotes {
            let head =
                line.trim_start_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'');
            if head.is_empty() || head.starts_with('#') {
                continue;
            }
        }
        // A doubled quote inside a cell flips twice, so parity tracks the state
        if line.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
        kept.push(line);
    }

    kept.join("\n")
}

/// Normalized column names and the slot each raw column writes into
///
/// Two raw headers normalizing to the same name share one slot; the later
/// column's value wins, the slot keeps the first column's position.
struct ColumnLayout {
    names: Vec<String>,
    targets: Vec<usize>,
}

impl ColumnLayout {
    fn new<'a>(headers: impl Iterator<Item = &'a str>) -> Self {
        let mut names: Vec<String> = Vec::new();
        let mut targets = Vec::new();

        for header in headers {
            let name = fields::normalize_column(header);
            let slot = match names.iter().position(|n| *n == name) {
                Some(slot) => slot,
                None => {
                    names.push(name);
                    names.len() - 1
                }
            };
            targets.push(slot);
        }

        Self { names, targets }
    }

    fn slot(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn values(&self, row: &csv::StringRecord) -> Vec<String> {
        let mut values = vec![String::new(); self.names.len()];
        for (cell, slot) in row.iter().zip(&self.targets) {
            values[*slot] = cell.trim().to_string();
        }
        values
    }
}

/// Type an already validated row
fn build_record(layout: &ColumnLayout, values: Vec<String>) -> HostRecord {
    let mut hostname = String::new();
    let mut domain = String::new();
    let mut ip = None;
    let mut mac = String::new();
    let mut vlan = None;
    let mut mask = None;
    let mut entity_type = None;
    let mut resides_on = String::new();
    let mut extra = BTreeMap::new();

    for (column, value) in layout.names.iter().zip(values) {
        match column.as_str() {
            "hostname" => hostname = value,
            "domain" => domain = value,
            "ip" => ip = fields::parse_ipv4(&value),
            "mac" => mac = value,
            "vlan" => vlan = fields::parse_vlan(&value),
            "mask" => mask = fields::parse_mask(&value),
            "entity_type" => entity_type = value.parse().ok(),
            "resides_on" => resides_on = value,
            _ => {
                extra.insert(column.clone(), value);
            }
        }
    }

    HostRecord {
        hostname,
        domain,
        // The ip column is required and validated before typing
        ip: ip.unwrap_or(std::net::Ipv4Addr::UNSPECIFIED),
        mac,
        vlan,
        mask,
        entity_type,
        resides_on,
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn parse(text: &str) -> Result<Vec<HostRecord>> {
        parse_str(text, &InventoryOptions::default())
    }

    #[test]
    fn test_parse_typed_fields() {
        let hosts = parse(
            "Hostname, Domain ,IP,MAC,VLAN,Mask,Entity Type,Resides On,Rack\n\
             foo , bar.com,10.12.13.14,00:11:22:33:44:55,12,24,comp,,r1\n\
             www,bar.com,10.12.13.14,,,24,alias,foo,\n",
        )
        .unwrap();

        assert_eq!(hosts.len(), 2);
        let foo = &hosts[0];
        assert_eq!(foo.hostname(), "foo");
        assert_eq!(foo.domain(), "bar.com");
        assert_eq!(foo.ip(), Ipv4Addr::new(10, 12, 13, 14));
        assert_eq!(foo.mac(), "00:11:22:33:44:55");
        assert_eq!(foo.vlan(), Some(12));
        assert_eq!(foo.mask(), Some(24));
        assert_eq!(foo.entity_type(), Some(EntityType::Comp));
        assert_eq!(foo.extra().get("rack").map(String::as_str), Some("r1"));

        let www = &hosts[1];
        assert_eq!(www.vlan(), None);
        assert_eq!(www.mac(), "");
        assert_eq!(www.resides_on(), "foo");
    }

    #[test]
    fn test_comment_and_blank_lines_are_skipped() {
        let hosts = parse(
            "# generated inventory\n\
             hostname,domain,ip\n\
             \n\
             \"# commented, row\",x,1.1.1.1\n\
             \t# also a comment\n\
             foo,bar.com,10.0.0.1\n",
        )
        .unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].hostname(), "foo");
    }

    #[test]
    fn test_quoted_cell_keeps_blank_and_comment_lines() {
        let hosts = parse(
            "hostname,domain,ip,notes\n\
             foo,bar.com,10.0.0.1,\"rack A\n\
             \n\
             # slot 3\n\
             \x20  \n\
             end\"\n\
             \n\
             mew,bar.com,10.0.0.2,\n",
        )
        .unwrap();

        assert_eq!(hosts.len(), 2);
        assert_eq!(
            hosts[0].field("notes").as_deref(),
            Some("rack A\n\n# slot 3\n   \nend")
        );
        assert_eq!(hosts[1].hostname(), "mew");
    }

    #[test]
    fn test_integrity_error_reports_first_bad_field() {
        let err = parse(
            "hostname,domain,ip,vlan\n\
             foo,bar.com,10.0.0.1,10\n\
             baz,bar.com,10.0.0.256,5000\n",
        )
        .unwrap_err();

        match err {
            Error::Integrity { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "ip");
                assert_eq!(value, "10.0.0.256");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ignored_rows_are_never_validated() {
        let hosts = parse(
            "hostname,domain,ip,Gandalf Ignore\n\
             foo,bar.com,10.0.0.1,\n\
             broken,,not-an-ip,yes\n\
             mew,bar.com,10.0.0.2,  \n",
        )
        .unwrap();
        let names: Vec<_> = hosts.iter().map(HostRecord::hostname).collect();
        assert_eq!(names, vec!["foo", "mew"]);
    }

    #[test]
    fn test_custom_ignore_column() {
        let options = InventoryOptions::default().with_ignore_column("Skip Me");
        let hosts = parse_str(
            "hostname,domain,ip,skip_me\nfoo,bar.com,10.0.0.1,x\nmew,bar.com,10.0.0.2,\n",
            &options,
        )
        .unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].hostname(), "mew");
    }

    #[test]
    fn test_duplicate_headers_last_value_wins() {
        let hosts = parse("hostname,domain,ip,IP \nfoo,bar.com,10.0.0.1,10.0.0.9\n").unwrap();
        assert_eq!(hosts[0].ip(), Ipv4Addr::new(10, 0, 0, 9));
    }

    #[test]
    fn test_missing_required_column() {
        let err = parse("hostname,ip\nfoo,10.0.0.1\n").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "domain"));
    }

    #[test]
    fn test_unequal_row_is_structural_error() {
        let err = parse("hostname,domain,ip\nfoo,bar.com\n").unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_blank_hostname_is_rejected() {
        let err = parse("hostname,domain,ip\n   ,bar.com,10.0.0.1\n").unwrap_err();
        assert!(matches!(err, Error::Integrity { row: 2, ref column, .. } if column == "hostname"));
    }
}
