//! Poll orchestration: parse agent output, run discovery, run checks.
//!
//! One run handles one poll. Section parse failures are collected per
//! section and never stop the remaining sections from being evaluated.

use aci_checks::checks::{
    bgp, controllers, dom, faults, health, interfaces, nodes, tenants, versions, CheckKind,
    RuleSet,
};
use aci_checks::report::{CheckOutput, Service, Severity};
use aci_checks::section::AgentOutput;
use aci_checks::store::ValueStore;
use aci_checks::ParseError;
use serde::Serialize;

/// A discovered service, tagged with the plugin that owns it.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredService {
    pub check: CheckKind,
    #[serde(flatten)]
    pub service: Service,
}

impl DiscoveredService {
    pub fn name(&self) -> String {
        self.check.service_name(self.service.item.as_deref())
    }
}

/// One service's check outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResult {
    pub check: CheckKind,
    pub item: Option<String>,
    #[serde(flatten)]
    pub output: CheckOutput,
}

impl ServiceResult {
    pub fn name(&self) -> String {
        self.check.service_name(self.item.as_deref())
    }
}

/// A section whose rows failed validation. The section is skipped; its
/// siblings still run.
#[derive(Debug)]
pub struct SectionFailure {
    pub section: &'static str,
    pub error: ParseError,
}

/// Everything one poll produced.
#[derive(Debug, Default)]
pub struct PollOutcome {
    pub results: Vec<ServiceResult>,
    pub failures: Vec<SectionFailure>,
}

impl PollOutcome {
    /// Worst severity across all results; parse failures count as
    /// UNKNOWN so a broken section is never silently green.
    pub fn worst_severity(&self) -> Severity {
        self.results
            .iter()
            .map(|r| r.output.worst_severity())
            .chain(self.failures.iter().map(|_| Severity::Unknown))
            .max()
            .unwrap_or(Severity::Ok)
    }
}

/// Runs every discovery function over the parsed agent output.
pub fn discover_all(
    output: &AgentOutput,
    rules: &RuleSet,
) -> (Vec<DiscoveredService>, Vec<SectionFailure>) {
    let mut services = Vec::new();
    let mut failures = Vec::new();

    for kind in CheckKind::ALL {
        let section = match output.get(kind.section_name()) {
            Some(section) => section,
            None => continue,
        };
        match discover_kind(kind, section, rules) {
            Ok(found) => services.extend(
                found
                    .into_iter()
                    .map(|service| DiscoveredService { check: kind, service }),
            ),
            Err(error) => {
                tracing::warn!(section = kind.section_name(), %error, "section parse failed");
                failures.push(SectionFailure {
                    section: kind.section_name(),
                    error,
                });
            }
        }
    }

    (services, failures)
}

/// Runs discovery and then every check against its discovered services.
pub fn check_all(
    output: &AgentOutput,
    rules: &RuleSet,
    store: &mut dyn ValueStore,
    now: f64,
) -> PollOutcome {
    let mut outcome = PollOutcome::default();

    for kind in CheckKind::ALL {
        let section = match output.get(kind.section_name()) {
            Some(section) => section,
            None => continue,
        };
        match check_kind(kind, section, rules, store, now) {
            Ok(results) => outcome.results.extend(results),
            Err(error) => {
                tracing::warn!(section = kind.section_name(), %error, "section parse failed");
                outcome.failures.push(SectionFailure {
                    section: kind.section_name(),
                    error,
                });
            }
        }
    }

    outcome
}

fn discover_kind(
    kind: CheckKind,
    section: &aci_checks::section::Section,
    rules: &RuleSet,
) -> Result<Vec<Service>, ParseError> {
    Ok(match kind {
        CheckKind::Health => health::discover(&health::parse(section)?),
        CheckKind::Versions => versions::discover(&versions::parse(section)?),
        CheckKind::Faults => faults::discover(&faults::parse(section)?),
        CheckKind::Controllers => controllers::discover(&controllers::parse(section)?),
        CheckKind::Spines | CheckKind::Leaves => nodes::discover(&nodes::parse(section)?),
        CheckKind::Tenants => tenants::discover(&tenants::parse(section)?),
        CheckKind::Interfaces => {
            interfaces::discover(&rules.interface_discovery, &interfaces::parse(section)?)
        }
        CheckKind::BgpPeers => bgp::discover(&bgp::parse(section)?),
        CheckKind::DomPower => dom::discover(&rules.interface_discovery, &dom::parse(section)?),
    })
}

fn check_kind(
    kind: CheckKind,
    section: &aci_checks::section::Section,
    rules: &RuleSet,
    store: &mut dyn ValueStore,
    now: f64,
) -> Result<Vec<ServiceResult>, ParseError> {
    fn per_item(
        kind: CheckKind,
        services: Vec<Service>,
        mut check: impl FnMut(&str) -> CheckOutput,
    ) -> Vec<ServiceResult> {
        services
            .into_iter()
            .map(|service| {
                let item = service.item;
                let output = check(item.as_deref().unwrap_or_default());
                ServiceResult { check: kind, item, output }
            })
            .collect()
    }

    fn fabric_wide(kind: CheckKind, output: CheckOutput) -> Vec<ServiceResult> {
        vec![ServiceResult {
            check: kind,
            item: None,
            output,
        }]
    }

    Ok(match kind {
        CheckKind::Health => {
            let record = health::parse(section)?;
            fabric_wide(kind, health::check(&rules.health, &record))
        }
        CheckKind::Versions => {
            let records = versions::parse(section)?;
            fabric_wide(kind, versions::check(&records))
        }
        CheckKind::Faults => {
            let records = faults::parse(section)?;
            fabric_wide(kind, faults::check(&records))
        }
        CheckKind::Controllers => {
            let records = controllers::parse(section)?;
            let services = controllers::discover(&records);
            per_item(kind, services, |item| controllers::check(item, &records))
        }
        CheckKind::Spines | CheckKind::Leaves => {
            let records = nodes::parse(section)?;
            let services = nodes::discover(&records);
            per_item(kind, services, |item| {
                nodes::check(item, &rules.nodes, &records)
            })
        }
        CheckKind::Tenants => {
            let records = tenants::parse(section)?;
            let services = tenants::discover(&records);
            per_item(kind, services, |item| {
                tenants::check(item, &rules.tenants, &records)
            })
        }
        CheckKind::Interfaces => {
            let records = interfaces::parse(section)?;
            let services = interfaces::discover(&rules.interface_discovery, &records);
            per_item(kind, services, |item| {
                interfaces::check(item, &rules.interface_levels, &records, store, now)
            })
        }
        CheckKind::BgpPeers => {
            let records = bgp::parse(section)?;
            let services = bgp::discover(&records);
            per_item(kind, services, |item| {
                bgp::check(item, &rules.bgp_levels, &records, store, now)
            })
        }
        CheckKind::DomPower => {
            let records = dom::parse(section)?;
            let services = dom::discover(&rules.interface_discovery, &records);
            per_item(kind, services, |item| dom::check(item, &records))
        }
    })
}
