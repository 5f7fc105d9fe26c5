//! Rule-based flag pass (always available, no statistics required).
//!
//! Operational checks on raw records that hold regardless of batch size:
//! an expired license, a mostly-disabled interface inventory, or memory
//! pressure each flag a device on their own. The detection pipeline runs
//! this tier when the ensemble yields nothing. Never consults the
//! feature matrix.

use fleetscan_core::{DetectionConfig, DeviceRecord};

use super::types::{Detection, Flagged};

/// Fields the rule pass consults, advertised as its feature list.
pub const RULE_PASS_FEATURES: [&str; 3] =
    ["license_expired", "iface_enabled_ratio", "mem_used_pct"];

/// Flag records breaching any fixed operational rule.
pub fn detect(records: &[DeviceRecord], config: &DetectionConfig) -> Detection {
    let flagged = records
        .iter()
        .enumerate()
        .filter(|(_, r)| breaches_any_rule(r, config))
        .map(|(index, r)| Flagged {
            index,
            host: r.host.clone(),
            score: None,
        })
        .collect();

    Detection {
        flagged,
        feature_names: RULE_PASS_FEATURES.iter().map(|s| s.to_string()).collect(),
    }
}

fn breaches_any_rule(record: &DeviceRecord, config: &DetectionConfig) -> bool {
    let license_bad = record.flag("license_expired");

    let many_disabled = record.numeric("iface_total").is_some_and(|total| total > 0.0)
        && record
            .numeric("iface_enabled_ratio")
            .is_some_and(|ratio| ratio < config.effective_iface_enabled_floor());

    let memory_high = record
        .number("mem_used_pct")
        .is_some_and(|pct| pct >= config.effective_memory_pressure_pct());

    license_bad || many_disabled || memory_high
}
