//! DOM optical power check.
//!
//! Each transceiver reports one RX and one TX septet: an alert flag, a
//! status word, four device-supplied alarm/warn thresholds and the
//! measured power. The device's own thresholds drive the levels, both
//! upper and lower; a non-`none` alert flag additionally warns.

use regex::Regex;

use crate::discovery::{self, DiscoveryParams};
use crate::error::{ParseError, ParseResult};
use crate::naming;
use crate::report::{check_levels, render_plain, CheckOutput, Finding, Levels, Service, Severity};
use crate::section::Section;

const SECTION: &str = "aci_dom_pwr_stats";

/// Direction of one power stat septet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerDirection {
    Rx,
    Tx,
}

impl PowerDirection {
    fn label(&self) -> &'static str {
        match self {
            PowerDirection::Rx => "RX",
            PowerDirection::Tx => "TX",
        }
    }

    fn metric_name(&self) -> &'static str {
        match self {
            PowerDirection::Rx => "dom_rx_power",
            PowerDirection::Tx => "dom_tx_power",
        }
    }
}

/// One direction's alert flag, status and device-supplied thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerStat {
    pub direction: PowerDirection,
    pub alert: String,
    pub status: String,
    pub hi_alarm: f64,
    pub hi_warn: f64,
    pub lo_alarm: f64,
    pub lo_warn: f64,
    pub value: f64,
}

impl PowerStat {
    fn from_fields(direction: PowerDirection, fields: &[String]) -> ParseResult<Self> {
        let float = |index: usize, field: &'static str| {
            fields[index].parse::<f64>().map_err(|_| ParseError::Field {
                section: SECTION,
                field,
                value: fields[index].clone(),
            })
        };
        Ok(Self {
            direction,
            alert: fields[0].clone(),
            status: fields[1].clone(),
            hi_alarm: float(2, "hi_alarm")?,
            hi_warn: float(3, "hi_warn")?,
            lo_alarm: float(4, "lo_alarm")?,
            lo_warn: float(5, "lo_warn")?,
            value: float(6, "value")?,
        })
    }

    fn summary(&self) -> String {
        let label = self.direction.label();
        format!(
            "{} alert: {}, {} status: {}",
            label, self.alert, label, self.status
        )
    }

    fn details(&self) -> String {
        let label = self.direction.label();
        [
            format!("alert: {}", self.alert),
            format!("status: {}", self.status),
            format!("hi_alarm: {}", self.hi_alarm),
            format!("hi_warn: {}", self.hi_warn),
            format!("lo_alarm: {}", self.lo_alarm),
            format!("lo_warn: {}", self.lo_warn),
            format!("value: {} (precise)", self.value),
        ]
        .map(|line| format!("{} {}", label, line))
        .join("\n")
    }

    fn alert_severity(&self) -> Severity {
        if self.alert == "none" {
            Severity::Ok
        } else {
            Severity::Warn
        }
    }
}

/// One transceiver row: the port DN plus its RX and TX stats.
#[derive(Debug, Clone, PartialEq)]
pub struct DomPowerRecord {
    pub dn: String,
    pub interface: String,
    pub rx: PowerStat,
    pub tx: PowerStat,
}

impl DomPowerRecord {
    fn from_row(row: &[String], iface_regex: &Regex) -> ParseResult<Self> {
        if row.len() != 15 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 15,
                got: row.len(),
                line: row.join(" "),
            });
        }
        let interface = iface_regex
            .captures(&row[0])
            .and_then(|caps| caps.name("iface"))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ParseError::Field {
                section: SECTION,
                field: "dn",
                value: row[0].clone(),
            })?;
        Ok(Self {
            dn: row[0].clone(),
            interface,
            rx: PowerStat::from_fields(PowerDirection::Rx, &row[1..8])?,
            tx: PowerStat::from_fields(PowerDirection::Tx, &row[8..15])?,
        })
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<DomPowerRecord>> {
    // Unwrap is fine, the pattern is a constant.
    let iface_regex = Regex::new(r"\[(?P<iface>eth\d+(/\d+){1,2})\]").unwrap();
    section
        .data_rows()
        .map(|row| DomPowerRecord::from_row(row, &iface_regex))
        .collect()
}

/// DOM services share the interface naming pipeline but never filter on
/// port state, which transceiver rows do not carry.
pub fn discover(params: &DiscoveryParams, records: &[DomPowerRecord]) -> Vec<Service> {
    let width = naming::max_padding_width(records.iter().map(|r| r.interface.as_str()));
    records
        .iter()
        .filter_map(|record| discovery::discovery_service(params, &record.interface, width))
        .collect()
}

pub fn check(item: &str, records: &[DomPowerRecord]) -> CheckOutput {
    let raw_id = naming::original_interface_id(item);
    let record = match records.iter().find(|r| r.interface == raw_id) {
        Some(record) => record,
        None => return CheckOutput::item_not_found(),
    };

    let mut out = CheckOutput::new();
    for stat in [&record.rx, &record.tx] {
        out.add_finding(Finding::notice(stat.alert_severity(), stat.summary()).with_details(stat.details()));

        let (finding, metric) = check_levels(
            stat.value,
            Some(Levels::new(stat.hi_warn, stat.hi_alarm)),
            Some(Levels::new(stat.lo_warn, stat.lo_alarm)),
            stat.direction.metric_name(),
            &format!("{} value", stat.direction.label()),
            (None, None),
            render_plain,
        );
        out.add_finding(finding);
        out.add_metric(metric);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SingleDiscovery;

    const SECTION_TEXT: &str = r#"<<<aci_dom_pwr_stats>>>
#iface_dn rx_alert rx_status rx_hi_alarm rx_hi_warn rx_lo_alarm rx_lo_warn rx_value tx_alert tx_status tx_hi_alarm tx_hi_warn tx_lo_alarm tx_lo_warn tx_value
topology/pod-1/node-112/sys/phys-[eth1/1]/phys none none 0.999912 0.000000 -13.098040 -12.097149 -2.599533 none none 0.999912 0.000000 -9.299622 -8.300319 -2.731099
topology/pod-1/node-112/sys/phys-[eth1/11]/phys low-alarm warn 0.999912 0.000000 -13.098040 -12.097149 -13.500000 none none 0.999912 0.000000 -9.299622 -8.300319 -2.668027
"#;

    fn records() -> Vec<DomPowerRecord> {
        let output = crate::section::AgentOutput::parse(SECTION_TEXT).unwrap();
        parse(output.get("aci_dom_pwr_stats").unwrap()).unwrap()
    }

    #[test]
    fn test_parse_extracts_interface_from_dn() {
        let records = records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].interface, "eth1/1");
        assert_eq!(records[1].interface, "eth1/11");
        assert_eq!(records[0].rx.hi_alarm, 0.999912);
        assert_eq!(records[0].tx.lo_warn, -8.300319);
    }

    #[test]
    fn test_parse_rejects_dn_without_interface() {
        let output = crate::section::AgentOutput::parse(
            "<<<aci_dom_pwr_stats>>>\nuni/tn-infra none none 0 0 0 0 0 none none 0 0 0 0 0\n",
        )
        .unwrap();
        assert!(matches!(
            parse(output.get("aci_dom_pwr_stats").unwrap()),
            Err(ParseError::Field { field: "dn", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let output = crate::section::AgentOutput::parse(
            "<<<aci_dom_pwr_stats>>>\ntopology/pod-1/node-112/sys/phys-[eth1/1]/phys none none\n",
        )
        .unwrap();
        assert!(matches!(
            parse(output.get("aci_dom_pwr_stats").unwrap()),
            Err(ParseError::FieldCount { expected: 15, got: 3, .. })
        ));
    }

    #[test]
    fn test_discover_uses_naming_pipeline_without_state_filter() {
        let params = DiscoveryParams {
            discovery_single: SingleDiscovery {
                pad_portnumbers: true,
                ..SingleDiscovery::default()
            },
            ..DiscoveryParams::default()
        };
        let services = discover(&params, &records());
        let items: Vec<&str> = services.iter().filter_map(|s| s.item.as_deref()).collect();
        assert_eq!(items, vec!["Ethernet1/01", "Ethernet1/11"]);
    }

    #[test]
    fn test_clean_transceiver_is_ok() {
        let out = check("Ethernet1/1", &records());
        assert_eq!(out.worst_severity(), Severity::Ok);
        // Alert notices stay in the details at OK.
        assert!(out.findings[0].summary.is_empty());
        let details = out.findings[0].details.as_deref().unwrap();
        assert!(details.contains("RX alert: none"));
        assert!(details.contains("RX value: -2.599533 (precise)"));
        assert_eq!(out.findings[1].summary, "RX value: -2.599533");
        assert_eq!(out.metrics[0].name, "dom_rx_power");
        assert_eq!(out.metrics[1].name, "dom_tx_power");
    }

    #[test]
    fn test_low_alarm_breaches_device_levels() {
        let out = check("Ethernet1/11", &records());
        assert_eq!(out.worst_severity(), Severity::Crit);
        // The alert flag itself only warns.
        assert_eq!(out.findings[0].severity, Severity::Warn);
        assert_eq!(out.findings[0].summary, "RX alert: low-alarm, RX status: warn");
        // The measured -13.5 is below the device's -13.098040 alarm.
        assert_eq!(out.findings[1].severity, Severity::Crit);
        assert_eq!(out.metrics[0].levels, Some((0.0, 0.999912)));
    }

    #[test]
    fn test_missing_interface_is_unknown() {
        let out = check("Ethernet9/99", &records());
        assert_eq!(out.worst_severity(), Severity::Unknown);
    }
}
