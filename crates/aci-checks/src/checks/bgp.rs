//! BGP peer entry check.
//!
//! Tracks per-minute rates for connection attempts, drops and
//! establishments per peer, each against optional upper-bound levels, and
//! reports the peer's operational state as an independent signal.

use serde::Deserialize;

use crate::checks::{counter_or_zero, float_text};
use crate::error::{ParseError, ParseResult};
use crate::rate;
use crate::report::{
    check_levels, render_per_minute, CheckOutput, Finding, Levels, Service, Severity,
};
use crate::section::Section;
use crate::store::ValueStore;

const SECTION: &str = "aci_bgp_peer_entry";

/// Upper-bound rate levels per connection counter. By default only
/// connection drops alert.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BgpRateLevels {
    #[serde(rename = "level_bgp_attempts")]
    pub attempts: Option<Levels>,
    #[serde(rename = "level_bgp_drop")]
    pub drop: Option<Levels>,
    #[serde(rename = "level_bgp_est")]
    pub est: Option<Levels>,
}

impl Default for BgpRateLevels {
    fn default() -> Self {
        Self {
            attempts: None,
            drop: Some(Levels::new(1.0, 6.0)),
            est: None,
        }
    }
}

/// One row of the BGP peer section. Counters keep their raw wire text:
/// `na` is legitimate for unsupported counters and shows up verbatim in
/// the details.
#[derive(Debug, Clone, PartialEq)]
pub struct BgpPeerRecord {
    pub addr: String,
    pub conn_attempts: String,
    pub conn_drop: String,
    pub conn_est: String,
    pub local_ip: String,
    pub local_port: String,
    pub oper_state: String,
    pub remote_port: String,
    pub peer_type: String,
}

impl BgpPeerRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() != 9 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 9,
                got: row.len(),
                line: row.join(" "),
            });
        }
        Ok(Self {
            addr: row[0].clone(),
            conn_attempts: row[1].clone(),
            conn_drop: row[2].clone(),
            conn_est: row[3].clone(),
            local_ip: row[4].clone(),
            local_port: row[5].clone(),
            oper_state: row[6].clone(),
            remote_port: row[7].clone(),
            peer_type: row[8].clone(),
        })
    }

    fn oper_severity(&self) -> Severity {
        match self.oper_state.as_str() {
            "established" => Severity::Ok,
            "idle" => Severity::Warn,
            _ => Severity::Crit,
        }
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<BgpPeerRecord>> {
    section.data_rows().map(BgpPeerRecord::from_row).collect()
}

pub fn discover(records: &[BgpPeerRecord]) -> Vec<Service> {
    records.iter().map(|r| Service::new(&r.addr)).collect()
}

pub fn check(
    item: &str,
    params: &BgpRateLevels,
    records: &[BgpPeerRecord],
    store: &mut dyn ValueStore,
    now: f64,
) -> CheckOutput {
    let record = match records.iter().find(|r| r.addr == item) {
        Some(record) => record,
        None => return CheckOutput::item_not_found(),
    };

    let attempts_rate = connection_rate(store, record, "conn_attempts", &record.conn_attempts, now);
    let drop_rate = connection_rate(store, record, "conn_drop", &record.conn_drop, now);
    let est_rate = connection_rate(store, record, "conn_est", &record.conn_est, now);

    let mut out = CheckOutput::new();
    out.add_finding(Finding::new(
        record.oper_severity(),
        format!("state: {}", record.oper_state),
    ));

    let summary = format!(
        "type: {}, remote: {}:{}, local: {}:{}",
        record.peer_type, record.addr, record.remote_port, record.local_ip, record.local_port
    );
    let details = format!(
        "type: {}\nremote: {}:{}\nlocal: {}:{}\n\
         connAttempts: {}/min (Total: {})\n\
         connDrop: {}/min (Total: {})\n\
         connEst: {}/min (Total: {})",
        record.peer_type,
        record.addr,
        record.remote_port,
        record.local_ip,
        record.local_port,
        float_text(attempts_rate),
        record.conn_attempts,
        float_text(drop_rate),
        record.conn_drop,
        float_text(est_rate),
        record.conn_est,
    );
    out.add_finding(Finding::ok(summary).with_details(details));

    let levelled = [
        (attempts_rate, params.attempts, "attempts"),
        (drop_rate, params.drop, "drop"),
        (est_rate, params.est, "est"),
    ];
    for (rate_value, levels, kind) in levelled {
        let (finding, metric) = check_levels(
            rate_value,
            levels,
            None,
            &format!("bgp_conn_{}", kind),
            &format!("BGP connection {} value", kind),
            (Some(0.0), None),
            render_per_minute,
        );
        out.add_finding(Finding::notice(finding.severity, finding.summary));
        out.add_metric(metric);
    }
    out
}

fn connection_rate(
    store: &mut dyn ValueStore,
    record: &BgpPeerRecord,
    metric: &str,
    raw_value: &str,
    now: f64,
) -> f64 {
    let key = rate::counter_key(&record.addr, &format!("bgp.{}", metric));
    rate::rate_per_minute(store, &key, now, counter_or_zero(raw_value) as f64)
}
