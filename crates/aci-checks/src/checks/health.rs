//! Fabric-wide health score check.
//!
//! The section is exactly one line carrying the fabric health score and
//! the four fabric-wide fault tallies. The score runs against lower-bound
//! levels; the tallies are reported informationally.

use serde::Deserialize;

use crate::error::{ParseError, ParseResult};
use crate::report::{check_levels, render_plain, CheckOutput, Finding, Levels, Metric, Service};
use crate::section::Section;

const SECTION: &str = "aci_health";

/// Lower-bound levels for the fabric health score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HealthParams {
    pub health_levels: Levels,
}

impl Default for HealthParams {
    fn default() -> Self {
        Self {
            health_levels: Levels::new(95.0, 85.0),
        }
    }
}

/// The single record of the health section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthRecord {
    pub health: i64,
    pub fault_crit: i64,
    pub fault_warn: i64,
    pub fault_maj: i64,
    pub fault_minor: i64,
}

impl HealthRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() != 6 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 6,
                got: row.len(),
                line: row.join(" "),
            });
        }
        let int = |index: usize, field: &'static str| {
            row[index].parse::<i64>().map_err(|_| ParseError::Field {
                section: SECTION,
                field,
                value: row[index].clone(),
            })
        };
        // row[0] is the "health" discriminator.
        Ok(Self {
            health: int(1, "health")?,
            fault_crit: int(2, "fcrit")?,
            fault_warn: int(3, "fwarn")?,
            fault_maj: int(4, "fmaj")?,
            fault_minor: int(5, "fmin")?,
        })
    }
}

pub fn parse(section: &Section) -> ParseResult<HealthRecord> {
    let rows: Vec<&[String]> = section.data_rows().collect();
    if rows.len() != 1 {
        return Err(ParseError::SingleLine {
            section: SECTION,
            got: rows.len(),
        });
    }
    HealthRecord::from_row(rows[0])
}

pub fn discover(_record: &HealthRecord) -> Vec<Service> {
    vec![Service::unnamed()]
}

pub fn check(params: &HealthParams, record: &HealthRecord) -> CheckOutput {
    let mut out = CheckOutput::new();

    let (finding, metric) = check_levels(
        record.health as f64,
        None,
        Some(params.health_levels),
        "health",
        "Fabric Health Score",
        (Some(0.0), Some(100.0)),
        render_plain,
    );
    out.add_finding(finding);
    out.add_metric(metric);

    out.add_finding(Finding::ok(format!(
        "Fabric-wide Faults (crit/warn/maj/min): {}/{}/{}/{}",
        record.fault_crit, record.fault_warn, record.fault_maj, record.fault_minor
    )));
    out.add_metric(Metric::new("fcrit", record.fault_crit as f64));
    out.add_metric(Metric::new("fwarn", record.fault_warn as f64));
    out.add_metric(Metric::new("fmaj", record.fault_maj as f64));
    out.add_metric(Metric::new("fmin", record.fault_minor as f64));
    out
}
