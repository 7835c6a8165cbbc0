//! Tenant health check.
//!
//! The section is pipe-separated so tenant descriptions may contain
//! spaces; an empty description suppresses the description result.

use serde::Deserialize;

use crate::error::{ParseError, ParseResult};
use crate::report::{check_levels, render_plain, CheckOutput, Finding, Levels, Service};
use crate::section::Section;

const SECTION: &str = "aci_tenants";

/// Lower-bound levels for the tenant health score.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TenantParams {
    pub health_levels: Levels,
}

impl Default for TenantParams {
    fn default() -> Self {
        Self {
            health_levels: Levels::new(95.0, 85.0),
        }
    }
}

/// One tenant row.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantRecord {
    pub name: String,
    pub descr: String,
    pub dn: String,
    pub health_score: i64,
}

impl TenantRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() != 4 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 4,
                got: row.len(),
                line: row.join("|"),
            });
        }
        let health_score = row[3].parse::<i64>().map_err(|_| ParseError::Field {
            section: SECTION,
            field: "health_score",
            value: row[3].clone(),
        })?;
        Ok(Self {
            name: row[0].clone(),
            descr: row[1].clone(),
            dn: row[2].clone(),
            health_score,
        })
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<TenantRecord>> {
    section.data_rows().map(TenantRecord::from_row).collect()
}

pub fn discover(records: &[TenantRecord]) -> Vec<Service> {
    records.iter().map(|r| Service::new(&r.name)).collect()
}

pub fn check(item: &str, params: &TenantParams, records: &[TenantRecord]) -> CheckOutput {
    let tenant = match records.iter().find(|r| r.name == item) {
        Some(tenant) => tenant,
        None => return CheckOutput::item_not_found(),
    };

    let mut out = CheckOutput::new();
    let (finding, metric) = check_levels(
        tenant.health_score as f64,
        None,
        Some(params.health_levels),
        "health",
        "Health Score",
        (Some(0.0), Some(100.0)),
        render_plain,
    );
    out.add_finding(finding);
    out.add_metric(metric);

    if !tenant.descr.is_empty() {
        out.add_finding(Finding::ok(format!("Description: {}", tenant.descr)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Severity;
    use crate::section::AgentOutput;

    const SECTION_TEXT: &str = r#"<<<aci_tenants:sep(124)>>>
#name|descr|dn|health_score
infra||uni/tn-infra|100
LAB|Management Tenant|uni/tn-LAB|91
"#;

    fn records() -> Vec<TenantRecord> {
        let output = AgentOutput::parse(SECTION_TEXT).unwrap();
        parse(output.get("aci_tenants").unwrap()).unwrap()
    }

    #[test]
    fn test_parse_allows_empty_description() {
        let records = records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "infra");
        assert_eq!(records[0].descr, "");
        assert_eq!(records[0].dn, "uni/tn-infra");
        assert_eq!(records[1].descr, "Management Tenant");
        assert_eq!(records[1].health_score, 91);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let output = AgentOutput::parse("<<<aci_tenants:sep(124)>>>\ninfra|uni/tn-infra|100\n").unwrap();
        assert!(matches!(
            parse(output.get("aci_tenants").unwrap()),
            Err(ParseError::FieldCount { expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn test_discover_yields_one_service_per_tenant() {
        let services = discover(&records());
        let items: Vec<&str> = services.iter().filter_map(|s| s.item.as_deref()).collect();
        assert_eq!(items, vec!["infra", "LAB"]);
    }

    #[test]
    fn test_healthy_tenant_without_description() {
        let out = check("infra", &TenantParams::default(), &records());
        assert_eq!(out.worst_severity(), Severity::Ok);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].summary, "Health Score: 100");
        assert_eq!(out.metrics[0].name, "health");
        assert_eq!(out.metrics[0].max_boundary, Some(100.0));
    }

    #[test]
    fn test_degraded_tenant_reports_description() {
        let out = check("LAB", &TenantParams::default(), &records());
        assert_eq!(out.worst_severity(), Severity::Warn);
        assert_eq!(
            out.findings[0].summary,
            "Health Score: 91 (warn/crit below 95/85)"
        );
        assert_eq!(out.findings[1].summary, "Description: Management Tenant");
    }

    #[test]
    fn test_missing_tenant_is_unknown() {
        let out = check("missing", &TenantParams::default(), &records());
        assert_eq!(out.worst_severity(), Severity::Unknown);
    }
}
