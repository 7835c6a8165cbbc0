//! Firmware version skew check.
//!
//! Controllers and switches prefix their version strings differently
//! (`4.2(5n)` vs `n9000-14.2(5n)`), so only the trailing seven characters
//! are compared across the fabric.

use std::collections::BTreeSet;

use crate::error::{ParseError, ParseResult};
use crate::report::{CheckOutput, Finding, Service, Severity};
use crate::section::Section;

const SECTION: &str = "aci_version";

/// Length of the comparable version suffix.
const VERSION_SUFFIX_LEN: usize = 7;

/// One node's reported firmware version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub node: String,
    pub version: String,
}

impl VersionRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() != 2 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 2,
                got: row.len(),
                line: row.join(" "),
            });
        }
        Ok(Self {
            node: row[0].clone(),
            version: row[1].clone(),
        })
    }

    fn comparable_suffix(&self) -> &str {
        // Trailing characters, not bytes; version strings are not
        // guaranteed ASCII.
        let start = self
            .version
            .char_indices()
            .rev()
            .nth(VERSION_SUFFIX_LEN - 1)
            .map(|(index, _)| index)
            .unwrap_or(0);
        &self.version[start..]
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<VersionRecord>> {
    section.data_rows().map(VersionRecord::from_row).collect()
}

pub fn discover(_records: &[VersionRecord]) -> Vec<Service> {
    vec![Service::unnamed()]
}

pub fn check(records: &[VersionRecord]) -> CheckOutput {
    let versions: BTreeSet<&str> = records.iter().map(|r| r.comparable_suffix()).collect();

    let mut out = CheckOutput::new();
    let finding = match versions.len() {
        0 => Finding::new(Severity::Unknown, crate::report::ITEM_NOT_FOUND),
        1 => Finding::ok(format!(
            "Everyone seems to be running {}",
            versions.iter().next().unwrap()
        )),
        _ => Finding::new(
            Severity::Warn,
            format!(
                "Multiple Versions detected: {}",
                versions.into_iter().collect::<Vec<_>>().join(", ")
            ),
        ),
    };
    out.add_finding(finding);
    out
}
