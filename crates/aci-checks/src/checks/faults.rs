//! Fabric fault instance check.
//!
//! Every critical unacknowledged fault gets its own CRIT result; the
//! remaining faults are tallied into a single summary line.

use crate::error::{ParseError, ParseResult};
use crate::report::{CheckOutput, Finding, Service, Severity};
use crate::section::Section;

const SECTION: &str = "aci_fault_inst";

/// One fault instance row.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultRecord {
    pub severity: String,
    pub code: String,
    pub descr: String,
    pub dn: String,
    pub ack: String,
}

impl FaultRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() != 5 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 5,
                got: row.len(),
                line: row.join("|"),
            });
        }
        Ok(Self {
            severity: row[0].clone(),
            code: row[1].clone(),
            descr: row[2].clone(),
            dn: row[3].clone(),
            ack: row[4].clone(),
        })
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<FaultRecord>> {
    section
        .data_rows()
        // Some agent versions emit a bare column-name header line.
        .filter(|row| row[0] != "severity")
        .map(FaultRecord::from_row)
        .collect()
}

pub fn discover(_records: &[FaultRecord]) -> Vec<Service> {
    vec![Service::unnamed()]
}

pub fn check(records: &[FaultRecord]) -> CheckOutput {
    let mut out = CheckOutput::new();
    let mut major = 0u64;
    let mut minor = 0u64;
    let mut cleared = 0u64;

    for fault in records {
        if fault.severity == "critical" && fault.ack == "no" {
            out.add_finding(Finding::new(
                Severity::Crit,
                format!("Critical unacknowledged error: {}", fault.descr),
            ));
        } else {
            match fault.severity.as_str() {
                "major" => major += 1,
                "minor" => minor += 1,
                "cleared" => cleared += 1,
                _ => {}
            }
        }
    }

    out.add_finding(Finding::ok(format!(
        "{} major alarms, {} minor alarms, {} cleared alarms",
        major, minor, cleared
    )));
    out
}
