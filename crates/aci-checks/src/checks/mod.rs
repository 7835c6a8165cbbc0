//! Check plugins, one module per agent section.
//!
//! Every plugin follows the same contract: a parse function that validates
//! raw section rows into typed records, a discovery function that yields
//! the monitorable services, and a check function that maps one service to
//! findings and metrics. Missing items answer UNKNOWN with a fixed
//! message; malformed records abort their section's parse.

pub mod bgp;
pub mod controllers;
pub mod dom;
pub mod faults;
pub mod health;
pub mod interfaces;
pub mod nodes;
pub mod tenants;
pub mod versions;


use std::fmt;

use serde::{Deserialize, Serialize};

use crate::discovery::DiscoveryParams;

pub use bgp::BgpRateLevels;
pub use health::HealthParams;
pub use interfaces::InterfaceErrorLevels;
pub use nodes::NodeParams;
pub use tenants::TenantParams;

/// All rule-driven check parameters. Serde defaults match the plugin
/// defaults, so an empty rules file configures the stock behavior.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub interface_discovery: DiscoveryParams,
    pub interface_levels: InterfaceErrorLevels,
    pub bgp_levels: BgpRateLevels,
    pub health: HealthParams,
    pub nodes: NodeParams,
    pub tenants: TenantParams,
}

/// The check plugins in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Health,
    Versions,
    Faults,
    Controllers,
    Spines,
    Leaves,
    Tenants,
    Interfaces,
    BgpPeers,
    DomPower,
}

impl CheckKind {
    pub const ALL: [CheckKind; 10] = [
        CheckKind::Health,
        CheckKind::Versions,
        CheckKind::Faults,
        CheckKind::Controllers,
        CheckKind::Spines,
        CheckKind::Leaves,
        CheckKind::Tenants,
        CheckKind::Interfaces,
        CheckKind::BgpPeers,
        CheckKind::DomPower,
    ];

    /// The agent section this plugin consumes.
    pub fn section_name(&self) -> &'static str {
        match self {
            CheckKind::Health => "aci_health",
            CheckKind::Versions => "aci_version",
            CheckKind::Faults => "aci_fault_inst",
            CheckKind::Controllers => "aci_controller",
            CheckKind::Spines => "aci_spine",
            CheckKind::Leaves => "aci_leaf",
            CheckKind::Tenants => "aci_tenants",
            CheckKind::Interfaces => "aci_l1_phys_if",
            CheckKind::BgpPeers => "aci_bgp_peer_entry",
            CheckKind::DomPower => "aci_dom_pwr_stats",
        }
    }

    /// Display name of a service, with the item spliced in where the
    /// plugin names services per item.
    pub fn service_name(&self, item: Option<&str>) -> String {
        let item = item.unwrap_or_default();
        match self {
            CheckKind::Health => "Fabric Health Score".to_string(),
            CheckKind::Versions => "Fabric Versions".to_string(),
            CheckKind::Faults => "Fabric Faults".to_string(),
            CheckKind::Controllers => format!("APIC {}", item),
            CheckKind::Spines => format!("Spine {}", item),
            CheckKind::Leaves => format!("Leaf {}", item),
            CheckKind::Tenants => format!("Tenant {}", item),
            CheckKind::Interfaces => format!("Interface {} L1 phys", item),
            CheckKind::BgpPeers => format!("BGP peer entry {}", item),
            CheckKind::DomPower => format!("Interface {} DOM Power", item),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.section_name())
    }
}

/// Lenient counter parsing: fabrics report `na` or empty strings for
/// counters a platform does not support, which count as zero. Anything
/// else that fails to parse, including an overflowing digit string, also
/// reads as zero but leaves a trace.
pub(crate) fn counter_or_zero(field: &str) -> u64 {
    match field.parse() {
        Ok(value) => value,
        Err(_) => {
            if !field.is_empty() && field != "na" {
                tracing::debug!(field, "unparsable counter field read as zero");
            }
            0
        }
    }
}

/// Formats a float the way check summaries render rates: integral values
/// keep one decimal ("0.0", "36.0"), everything else prints exactly.
pub(crate) fn float_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_counter_or_zero_tolerates_placeholder_and_overflow() {
        assert_eq!(counter_or_zero("131"), 131);
        assert_eq!(counter_or_zero("na"), 0);
        assert_eq!(counter_or_zero(""), 0);
        // One digit past u64::MAX.
        assert_eq!(counter_or_zero("18446744073709551616"), 0);
        assert_eq!(counter_or_zero("-4"), 0);
    }

    #[test]
    fn test_float_text_keeps_one_decimal_on_integral_values() {
        assert_eq!(float_text(0.0), "0.0");
        assert_eq!(float_text(36.0), "36.0");
        assert_eq!(float_text(65.5), "65.5");
    }
}
