//! L1 physical interface check.
//!
//! Converts lifetime CRC/FCS error counters into per-minute rates, derives
//! the stomped-CRC rate (CRC minus FCS), and classifies the worst breach
//! across all three against a per-metric (warn, crit) ladder. An admin-up
//! port that is operationally down is WARN even with clean counters.

use serde::Deserialize;

use crate::checks::{counter_or_zero, float_text};
use crate::discovery::{self, DiscoveryParams};
use crate::error::{ParseError, ParseResult};
use crate::naming;
use crate::rate;
use crate::report::{CheckOutput, Finding, Levels, Metric, Service, Severity};
use crate::section::Section;
use crate::store::ValueStore;

const SECTION: &str = "aci_l1_phys_if";

/// Per-minute error-rate thresholds. Key names follow the rule format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InterfaceErrorLevels {
    #[serde(rename = "level_fcs_errors")]
    pub fcs: Levels,
    #[serde(rename = "level_crc_errors")]
    pub crc: Levels,
    #[serde(rename = "level_stomped_crc_errors")]
    pub stomped_crc: Levels,
}

impl Default for InterfaceErrorLevels {
    fn default() -> Self {
        Self {
            fcs: Levels::new(0.01, 1.0),
            crc: Levels::new(1.0, 12.0),
            stomped_crc: Levels::new(1.0, 12.0),
        }
    }
}

fn admin_state_code(state: &str) -> Option<&'static str> {
    match state {
        "up" => Some("1"),
        "down" => Some("2"),
        _ => None,
    }
}

fn oper_state_code(state: &str) -> Option<&'static str> {
    match state {
        "unknown" => Some("0"),
        "down" => Some("1"),
        "up" => Some("2"),
        "link-up" => Some("3"),
        "channel-admin-down" => Some("4"),
        _ => None,
    }
}

/// One row of the interface section.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceRecord {
    pub dn: String,
    pub id: String,
    pub admin_state: String,
    pub layer: String,
    pub crc_errors: u64,
    pub fcs_errors: u64,
    pub op_state: String,
    pub op_speed: String,
}

impl InterfaceRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() != 8 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 8,
                got: row.len(),
                line: row.join(" "),
            });
        }
        Ok(Self {
            dn: row[0].clone(),
            id: row[1].clone(),
            admin_state: row[2].clone(),
            layer: row[3].clone(),
            crc_errors: counter_or_zero(&row[4]),
            fcs_errors: counter_or_zero(&row[5]),
            op_state: row[6].clone(),
            op_speed: row[7].clone(),
        })
    }

    fn admin_code(&self) -> Option<&'static str> {
        admin_state_code(&self.admin_state)
    }

    fn oper_code(&self) -> Option<&'static str> {
        oper_state_code(&self.op_state)
    }

    fn layer_short(&self) -> String {
        self.layer.to_lowercase().replace("layer", "")
    }

    /// Lifetime stomped count; transiently negative when the upstream
    /// counters were sampled non-atomically.
    fn stomped_total(&self) -> i64 {
        self.crc_errors as i64 - self.fcs_errors as i64
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<InterfaceRecord>> {
    section.data_rows().map(InterfaceRecord::from_row).collect()
}

pub fn discover(params: &DiscoveryParams, records: &[InterfaceRecord]) -> Vec<Service> {
    let width = naming::max_padding_width(records.iter().map(|r| r.id.as_str()));
    records
        .iter()
        .filter(|record| {
            discovery::matches_port_states(
                &params.matching_conditions,
                record.admin_code(),
                record.oper_code(),
            )
        })
        .filter_map(|record| discovery::discovery_service(params, &record.id, width))
        .collect()
}

pub fn check(
    item: &str,
    params: &InterfaceErrorLevels,
    records: &[InterfaceRecord],
    store: &mut dyn ValueStore,
    now: f64,
) -> CheckOutput {
    let raw_id = naming::original_interface_id(item);
    let record = match records.iter().find(|r| r.id == raw_id) {
        Some(record) => record,
        None => return CheckOutput::item_not_found(),
    };

    // Rates are tracked per DN, which stays unique fabric-wide even when
    // two nodes reuse the same port id.
    let crc_rate = rate::rate_per_minute(
        store,
        &rate::counter_key(&record.dn, "crc"),
        now,
        record.crc_errors as f64,
    );
    let fcs_rate = rate::rate_per_minute(
        store,
        &rate::counter_key(&record.dn, "fcs"),
        now,
        record.fcs_errors as f64,
    );
    let stomped_rate = crc_rate - fcs_rate;

    let severity = classify(params, record, fcs_rate, crc_rate, stomped_rate);

    let summary = format!(
        "state: {}/{} (admin/op) layer: {} op_speed: {} | errors: \
         FCS={}/min ({} total) CRC={}/min ({} total) stomped_CRC={}/min ({} total)",
        record.admin_state,
        record.op_state,
        record.layer_short(),
        record.op_speed,
        float_text(round2(fcs_rate)),
        record.fcs_errors,
        float_text(round2(crc_rate)),
        record.crc_errors,
        float_text(round2(stomped_rate)),
        record.stomped_total(),
    );
    let details = format!(
        "Admin state: {}\nOperational state: {}\nLayer: {}\nOperational speed: {}\n\n\
         FCS errors: {}/min ({} errors in total)\n\
         CRC errors: {}/min ({} errors in total)\n\
         Stomped CRC errors: {}/min ({} errors in total)",
        record.admin_state,
        record.op_state,
        record.layer,
        record.op_speed,
        float_text(round2(fcs_rate)),
        record.fcs_errors,
        float_text(round2(crc_rate)),
        record.crc_errors,
        float_text(round2(stomped_rate)),
        record.stomped_total(),
    );

    let mut out = CheckOutput::new();
    out.add_finding(Finding::new(severity, summary).with_details(details));
    out.add_metric(Metric::new("fcs_errors", round2(fcs_rate)).with_levels(params.fcs.as_tuple()));
    out.add_metric(Metric::new("crc_errors", round2(crc_rate)).with_levels(params.crc.as_tuple()));
    out.add_metric(
        Metric::new("stomped_crc_errors", round2(stomped_rate))
            .with_levels(params.stomped_crc.as_tuple()),
    );
    out
}

/// Severity ladder over the unrounded rates; rounding is display-only.
fn classify(
    params: &InterfaceErrorLevels,
    record: &InterfaceRecord,
    fcs_rate: f64,
    crc_rate: f64,
    stomped_rate: f64,
) -> Severity {
    if fcs_rate >= params.fcs.crit
        || crc_rate >= params.crc.crit
        || stomped_rate >= params.stomped_crc.crit
    {
        return Severity::Crit;
    }
    if fcs_rate >= params.fcs.warn
        || crc_rate >= params.crc.warn
        || stomped_rate >= params.stomped_crc.warn
    {
        return Severity::Warn;
    }
    if record.admin_state == "up" && record.op_state == "down" {
        return Severity::Warn;
    }
    Severity::Ok
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::AgentOutput;
    use crate::store::{CounterState, MemoryValueStore};

    const SECTION_TEXT: &str = r#"<<<aci_l1_phys_if>>>
#dn id admin_state layer crc_errors fcs_errors op_state op_speed
topology/pod-1/node-101/sys/phys-[eth1/33] eth1/33 up Layer3 0 0 down 10G
topology/pod-1/node-101/sys/phys-[eth1/34] eth1/34 down Layer2 na 0 down inherit
topology/pod-1/node-101/sys/phys-[eth1/1] eth1/1 up Layer2 0 0 up 40G
"#;

    fn records() -> Vec<InterfaceRecord> {
        let output = AgentOutput::parse(SECTION_TEXT).unwrap();
        parse(output.get("aci_l1_phys_if").unwrap()).unwrap()
    }

    #[test]
    fn test_parse_maps_fields_and_skips_header() {
        let records = records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].dn, "topology/pod-1/node-101/sys/phys-[eth1/33]");
        assert_eq!(records[0].id, "eth1/33");
        assert_eq!(records[0].admin_state, "up");
        assert_eq!(records[0].layer, "Layer3");
        assert_eq!(records[0].op_state, "down");
        assert_eq!(records[0].op_speed, "10G");
    }

    #[test]
    fn test_parse_reads_non_numeric_counters_as_zero() {
        let records = records();
        assert_eq!(records[1].crc_errors, 0);
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let output = AgentOutput::parse("<<<aci_l1_phys_if>>>\ndn eth1/1 up Layer2\n").unwrap();
        match parse(output.get("aci_l1_phys_if").unwrap()) {
            Err(ParseError::FieldCount { expected, got, .. }) => {
                assert_eq!(expected, 8);
                assert_eq!(got, 4);
            }
            other => panic!("expected field-count error, got {:?}", other),
        }
    }

    #[test]
    fn test_admin_up_oper_down_is_warn_on_first_poll() {
        let mut store = MemoryValueStore::new();
        let out = check(
            "Ethernet1/33",
            &InterfaceErrorLevels::default(),
            &records(),
            &mut store,
            1000.0,
        );
        assert_eq!(out.worst_severity(), Severity::Warn);
        assert_eq!(
            out.findings[0].summary,
            "state: up/down (admin/op) layer: 3 op_speed: 10G | errors: \
             FCS=0.0/min (0 total) CRC=0.0/min (0 total) stomped_CRC=0.0/min (0 total)"
        );
    }

    #[test]
    fn test_healthy_interface_is_ok() {
        let mut store = MemoryValueStore::new();
        let out = check(
            "Ethernet1/1",
            &InterfaceErrorLevels::default(),
            &records(),
            &mut store,
            1000.0,
        );
        assert_eq!(out.worst_severity(), Severity::Ok);
    }

    #[test]
    fn test_crc_rate_at_crit_escalates() {
        let mut store = MemoryValueStore::new();
        store.set(
            "cisco_aci.topology/pod-1/node-101/sys/phys-[eth1/1].crc",
            CounterState {
                timestamp: 940.0,
                value: 0.0,
            },
        );

        let mut records = records();
        records[2].crc_errors = 12;
        let out = check(
            "Ethernet1/1",
            &InterfaceErrorLevels::default(),
            &records,
            &mut store,
            1000.0,
        );
        // 12 errors in 60s = 12.0/min, right at the default crit level.
        assert_eq!(out.worst_severity(), Severity::Crit);
    }

    #[test]
    fn test_warn_tier_between_levels() {
        let mut store = MemoryValueStore::new();
        store.set(
            "cisco_aci.topology/pod-1/node-101/sys/phys-[eth1/1].crc",
            CounterState {
                timestamp: 940.0,
                value: 0.0,
            },
        );
        store.set(
            "cisco_aci.topology/pod-1/node-101/sys/phys-[eth1/1].fcs",
            CounterState {
                timestamp: 940.0,
                value: 0.0,
            },
        );

        let mut records = records();
        records[2].crc_errors = 2;
        let out = check(
            "Ethernet1/1",
            &InterfaceErrorLevels::default(),
            &records,
            &mut store,
            1000.0,
        );
        assert_eq!(out.worst_severity(), Severity::Warn);
    }

    #[test]
    fn test_metrics_are_rounded_and_levelled() {
        let mut store = MemoryValueStore::new();
        store.set(
            "cisco_aci.topology/pod-1/node-101/sys/phys-[eth1/1].crc",
            CounterState {
                timestamp: 910.0,
                value: 0.0,
            },
        );
        store.set(
            "cisco_aci.topology/pod-1/node-101/sys/phys-[eth1/1].fcs",
            CounterState {
                timestamp: 910.0,
                value: 0.0,
            },
        );

        let mut records = records();
        records[2].crc_errors = 1;
        let out = check(
            "Ethernet1/1",
            &InterfaceErrorLevels::default(),
            &records,
            &mut store,
            1000.0,
        );
        // 1 error in 90s = 0.666../min, rounded to 0.67 for display.
        let crc = out.metrics.iter().find(|m| m.name == "crc_errors").unwrap();
        assert_eq!(crc.value, 0.67);
        assert_eq!(crc.levels, Some((1.0, 12.0)));
        assert!(out.findings[0].summary.contains("CRC=0.67/min (1 total)"));
    }

    #[test]
    fn test_missing_item_is_unknown() {
        let mut store = MemoryValueStore::new();
        let out = check(
            "Ethernet9/99",
            &InterfaceErrorLevels::default(),
            &records(),
            &mut store,
            1000.0,
        );
        assert_eq!(out.worst_severity(), Severity::Unknown);
    }

    #[test]
    fn test_discover_filters_on_admin_state() {
        let params = DiscoveryParams {
            matching_conditions: crate::discovery::MatchingConditions {
                match_all: false,
                port_admin_states: Some(std::collections::BTreeSet::from(["2".to_string()])),
                port_oper_states: None,
            },
            ..DiscoveryParams::default()
        };
        let services = discover(&params, &records());
        let items: Vec<&str> = services.iter().filter_map(|s| s.item.as_deref()).collect();
        assert_eq!(items, vec!["Ethernet1/34"]);
    }
}
