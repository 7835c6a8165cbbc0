//! Discovery configuration and the shared item-naming pipeline.
//!
//! The interface and DOM power checks discover one service per physical
//! port. A discovery ruleset controls whether single-port services exist
//! at all, how their names are transformed, which labels they carry, and
//! (for the interface check) which admin/oper states are eligible.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::naming;
use crate::report::{Service, ServiceLabel};

/// Naming options for single-port services.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SingleDiscovery {
    pub enabled: bool,
    pub pad_portnumbers: bool,
    pub long_if_name: bool,
    pub labels: BTreeMap<String, String>,
}

impl Default for SingleDiscovery {
    fn default() -> Self {
        Self {
            enabled: true,
            pad_portnumbers: false,
            long_if_name: true,
            labels: BTreeMap::new(),
        }
    }
}

/// Port-state predicate evaluated against the raw record, before any
/// naming transform. `match_all` disables the predicate entirely; a
/// dimension left unconfigured admits every known state code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatchingConditions {
    pub match_all: bool,
    pub port_admin_states: Option<BTreeSet<String>>,
    pub port_oper_states: Option<BTreeSet<String>>,
}

impl Default for MatchingConditions {
    fn default() -> Self {
        Self {
            match_all: true,
            port_admin_states: None,
            port_oper_states: None,
        }
    }
}

/// The discovery ruleset shared by the interface and DOM power checks.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiscoveryParams {
    pub discovery_single: SingleDiscovery,
    pub matching_conditions: MatchingConditions,
}

/// Builds the service for one raw port id, or `None` when single-port
/// discovery is disabled. `pad_width` is the set-wide width from
/// [`naming::max_padding_width`] so sibling items pad uniformly.
pub fn discovery_service(params: &DiscoveryParams, raw_id: &str, pad_width: usize) -> Option<Service> {
    let single = &params.discovery_single;
    if !single.enabled {
        return None;
    }

    let mut item = raw_id.to_string();
    if single.pad_portnumbers {
        item = naming::pad_interface_id(&item, pad_width);
    }
    if single.long_if_name {
        item = naming::long_interface_id(&item);
    }

    let labels: Vec<ServiceLabel> = single
        .labels
        .iter()
        .map(|(key, value)| ServiceLabel::new(key, value))
        .collect();
    Some(Service::new(item).with_labels(labels))
}

/// Inclusion predicate over resolved admin/oper state codes. `None` codes
/// (states outside the known maps) never match an active predicate.
pub fn matches_port_states(
    conditions: &MatchingConditions,
    admin_code: Option<&str>,
    oper_code: Option<&str>,
) -> bool {
    if conditions.match_all {
        return true;
    }

    let admin_ok = match &conditions.port_admin_states {
        Some(allowed) => admin_code.map_or(false, |code| allowed.contains(code)),
        None => admin_code.is_some(),
    };
    let oper_ok = match &conditions.port_oper_states {
        Some(allowed) => oper_code.map_or(false, |code| allowed.contains(code)),
        None => oper_code.is_some(),
    };
    admin_ok && oper_ok
}
