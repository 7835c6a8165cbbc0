//! APIC controller check.
//!
//! Classifies each controller from its service status and its four
//! unacknowledged fault tallies. The fabric reports faults minus
//! acknowledged faults, so a tally can legitimately go negative when
//! stale faults linger in the API after vanishing from the GUI.

use crate::error::{ParseError, ParseResult};
use crate::report::{CheckOutput, Finding, Service, Severity};
use crate::section::Section;

const SECTION: &str = "aci_controller";

const HEALTHY_STATUS: &str = "in-service";

/// One controller row. The id stays a string to avoid needless casting.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub serial: String,
    pub model: String,
    pub fault_crit: i64,
    pub fault_maj: i64,
    pub fault_minor: i64,
    pub fault_warn: i64,
    pub descr: String,
}

impl ControllerRecord {
    fn from_row(row: &[String]) -> ParseResult<Self> {
        if row.len() != 11 {
            return Err(ParseError::FieldCount {
                section: SECTION,
                expected: 11,
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
        // row[0] is the "controller" discriminator.
        Ok(Self {
            id: row[1].clone(),
            name: row[2].clone(),
            status: row[3].clone(),
            serial: row[4].clone(),
            model: row[5].clone(),
            fault_crit: int(6, "fault_crit")?,
            fault_maj: int(7, "fault_maj")?,
            fault_minor: int(8, "fault_minor")?,
            fault_warn: int(9, "fault_warn")?,
            descr: row[10].clone(),
        })
    }

    fn fault_details(&self) -> String {
        format!(
            "Unacknowledged APIC Faults:\n- Crit: {}\n- Maj: {}\n- Minor: {}\n- Warning: {}",
            self.fault_crit, self.fault_maj, self.fault_minor, self.fault_warn
        )
    }

    fn has_negative_fault_count(&self) -> bool {
        self.fault_crit < 0 || self.fault_maj < 0 || self.fault_minor < 0 || self.fault_warn < 0
    }
}

pub fn parse(section: &Section) -> ParseResult<Vec<ControllerRecord>> {
    section.data_rows().map(ControllerRecord::from_row).collect()
}

pub fn discover(records: &[ControllerRecord]) -> Vec<Service> {
    records.iter().map(|r| Service::new(&r.id)).collect()
}

pub fn check(item: &str, records: &[ControllerRecord]) -> CheckOutput {
    let ctrl = match records.iter().find(|r| r.id == item) {
        Some(ctrl) => ctrl,
        None => return CheckOutput::item_not_found(),
    };

    let summary = |faults: &str| {
        format!(
            "{} is {}, Unacknowledged Faults: {}, Model: {}, Serial: {}",
            ctrl.name, ctrl.status, faults, ctrl.model, ctrl.serial
        )
    };

    let mut out = CheckOutput::new();
    let finding = if ctrl.fault_crit > 0 || ctrl.fault_maj > 0 || ctrl.status != HEALTHY_STATUS {
        let faults = ctrl.fault_maj + ctrl.fault_crit;
        Finding::new(Severity::Crit, summary(&faults.to_string())).with_details(ctrl.fault_details())
    } else if ctrl.fault_minor > 0 || ctrl.fault_warn > 0 {
        let faults = ctrl.fault_minor + ctrl.fault_warn;
        Finding::new(Severity::Warn, summary(&faults.to_string())).with_details(ctrl.fault_details())
    } else if ctrl.has_negative_fault_count() {
        Finding::new(Severity::Warn, summary("got negative number")).with_details(format!(
            "{}\nThe difference between \"faults - faultsAcknowledged\" results in a \
             negative number for one of the error categories crit/maj/minor/warn.\n\
             This means that there are probably \"stale faults\" on the APIC, which are \
             output via the API but are not visible in the GUI.\n\
             Please investigate and correct the errors.",
            ctrl.fault_details()
        ))
    } else {
        let faults = ctrl.fault_maj + ctrl.fault_crit + ctrl.fault_minor + ctrl.fault_warn;
        Finding::ok(summary(&faults.to_string()))
    };
    out.add_finding(finding);
    out
}
