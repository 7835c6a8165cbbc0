//! Monotonic counter to per-minute rate conversion.

use crate::store::{CounterState, ValueStore};

/// Factor from per-second to per-minute rates.
const PER_MINUTE: f64 = 60.0;

/// Namespace prefix shared by all persisted counter keys.
const KEY_NAMESPACE: &str = "cisco_aci";

/// Builds the store key for one entity's counter,
/// e.g. `cisco_aci.topology/pod-1/node-101/sys/phys-[eth1/33].crc`.
pub fn counter_key(entity: &str, metric: &str) -> String {
    format!("{}.{}.{}", KEY_NAMESPACE, entity, metric)
}

/// Per-minute rate of a monotonic counter, measured against the previous
/// observation stored under `key`.
///
/// The first observation for a key returns 0 and records state. A
/// non-positive time delta yields 0. A negative value delta (counter
/// reset) is passed through unclamped, since derived metrics rely on
/// signed differences between correlated counters. The stored state is
/// always replaced with `(now, current_value)`, so call exactly once per
/// key and poll.
pub fn rate_per_minute(
    store: &mut dyn ValueStore,
    key: &str,
    now: f64,
    current_value: f64,
) -> f64 {
    let previous = store.get(key);
    store.set(
        key,
        CounterState {
            timestamp: now,
            value: current_value,
        },
    );

    let prev = match previous {
        Some(prev) => prev,
        None => {
            tracing::debug!(key, "first observation, rate starts at zero");
            return 0.0;
        }
    };

    let delta_time = now - prev.timestamp;
    if delta_time <= 0.0 {
        return 0.0;
    }
    (current_value - prev.value) / delta_time * PER_MINUTE
}
