//! Spine and leaf switch node checks.
//!
//! Both sections share one schema; the role field is dropped after
//! dispatch and any description tokens after the model are ignored.

use serde::Deserialize;

use crate::error::{ParseError, ParseResult};
use crate::report::{CheckOutput, Finding, Levels, Metric, Service, Severity};
use crate::section::Section;

const SECTION: &str = "aci_node";

/// Lower-bound levels for the per-node health score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeParams {
    pub health_levels: Levels,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self {
            health_levels: Levels::new(95.0, 85.0),
        }
    }
}

/// One switch node. The id stays a string to avoid needless casting.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub health: i64,
    pub serial: String,
    pub model: String,
}

impl NodeRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() < 7 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 7,
                got: row.len(),
                line: row.join(" "),
            });
        }
        let health = row[4].parse::<i64>().map_err(|_| ParseError::Field {
            section: SECTION,
            field: "health",
            value: row[4].clone(),
        })?;
        // row[0] is the role discriminator, row[7..] free-form description.
        Ok(Self {
            id: row[1].clone(),
            name: row[2].clone(),
            status: row[3].clone(),
            health,
            serial: row[5].clone(),
            model: row[6].clone(),
        })
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<NodeRecord>> {
    section.data_rows().map(NodeRecord::from_row).collect()
}

pub fn discover(records: &[NodeRecord]) -> Vec<Service> {
    records.iter().map(|r| Service::new(&r.id)).collect()
}

pub fn check(item: &str, params: &NodeParams, records: &[NodeRecord]) -> CheckOutput {
    let node = match records.iter().find(|r| r.id == item) {
        Some(node) => node,
        None => return CheckOutput::item_not_found(),
    };

    let severity = if (node.health as f64) < params.health_levels.crit {
        Severity::Crit
    } else if (node.health as f64) < params.health_levels.warn {
        Severity::Warn
    } else {
        Severity::Ok
    };

    let mut out = CheckOutput::new();
    out.add_finding(Finding::new(
        severity,
        format!(
            "{} is {}, Health:{}, Model: {}, Serial {}",
            node.name, node.status, node.health, node.model, node.serial
        ),
    ));
    out.add_metric(
        Metric::new("health", node.health as f64)
            .with_levels(params.health_levels.as_tuple())
            .with_boundaries(Some(0.0), Some(100.0)),
    );
    out
}
