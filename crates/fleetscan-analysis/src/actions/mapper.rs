//! Per-host remediation suggestions from anomalous records.
//!
//! Pure translation: each rule is evaluated independently, consults only
//! fields that are actually present, and is skipped silently when its
//! inputs are absent or of the wrong type. Rule order is fixed and
//! determines message order only.

use std::collections::BTreeMap;

use fleetscan_core::DeviceRecord;

/// Host → ordered remediation suggestions. Deterministic iteration
/// order, and never an empty list per host.
pub type ActionMap = BTreeMap<String, Vec<String>>;

/// Fan status strings that do not warrant a hint.
const FAN_OK_STATUSES: [&str; 4] = ["ok", "pass", "supported", "notsupported"];

/// Produce per-host suggestions for a set of (anomalous) records.
///
/// An empty input yields an empty map; a record no rule matches gets a
/// single monitor-baseline message.
pub fn suggest_actions<'a>(records: impl IntoIterator<Item = &'a DeviceRecord>) -> ActionMap {
    let mut actions = ActionMap::new();
    for record in records {
        actions.insert(record.host.clone(), suggestions_for(record));
    }
    actions
}

fn suggestions_for(r: &DeviceRecord) -> Vec<String> {
    let mut sug: Vec<String> = Vec::new();

    // License: only meaningful when the device reports a license status.
    if r.get("license_status").is_some() && r.flag("license_expired") {
        sug.push("License expired/invalid: renew or correct device licensing.".to_string());
    }

    // Memory pressure from inventory.
    if r.number("mem_used_pct").is_some_and(|m| m >= 85.0) {
        sug.push(
            "High memory usage (>=85%): review processes, collect tech-support, \
             consider a maintenance window."
                .to_string(),
        );
    }

    // Interface enablement ratio.
    if let (Some(total), Some(enabled), Some(ratio)) = (
        r.number("iface_total"),
        r.number("iface_enabled"),
        r.number("iface_enabled_ratio"),
    ) {
        if total > 0.0 && ratio < 0.5 {
            let disabled = (total - enabled) as i64;
            sug.push(format!(
                "Low interface enablement: {disabled}/{} interfaces disabled. \
                 Audit unused/err-disabled ports.",
                total as i64
            ));
        }
    }

    // BGP presence and timer sanity, only when BGP exists at all.
    if let Some(peers) = r.number("bgp_peers") {
        if peers == 0.0 {
            sug.push(
                "BGP configured but 0 neighbors up: verify neighbor config/reachability."
                    .to_string(),
            );
        }
        // hold >= 3 * keepalive is an operational rule of thumb, not a
        // protocol requirement.
        if let (Some(keepalive), Some(hold)) = (r.number("bgp_keepalive"), r.number("bgp_hold")) {
            if hold < 3.0 * keepalive {
                sug.push(format!(
                    "BGP timers unusual (hold={hold}, keepalive={keepalive}): confirm with policy."
                ));
            }
        }
    }

    // Coarse uptime from inventory.
    if r.number("uptime_days").is_some_and(|d| d < 1.0) {
        sug.push(
            "Device recently rebooted (<1 day): review change history/maintenance.".to_string(),
        );
    }

    // Health-check CPU thresholds.
    if let (Some(cpu), Some(threshold)) = (r.number("hc_cpu_1min"), r.number("hc_cpu_threshold")) {
        if cpu >= threshold {
            sug.push(format!(
                "CPU at/over threshold ({cpu} >= {threshold}). Investigate busy processes \
                 and control-plane load."
            ));
        } else if cpu >= 0.9 * threshold {
            sug.push(format!(
                "CPU nearing threshold ({cpu}/{threshold}). Monitor and plan capacity."
            ));
        }
    }

    // Health-check memory utilization.
    if let (Some(util), Some(threshold)) = (r.number("hc_mem_util"), r.number("hc_mem_threshold")) {
        if util >= threshold {
            sug.push(format!(
                "Memory utilization high ({util}% >= {threshold}%). Investigate \
                 processes/leaks and traffic patterns."
            ));
        }
    }

    // Uptime minutes against the health-check minimum.
    if let (Some(minutes), Some(minimum)) = (
        r.number("hc_uptime_min"),
        r.number("hc_uptime_min_threshold"),
    ) {
        if minutes < minimum {
            sug.push(format!(
                "Uptime below SLO ({} < {} minutes). Review reboot cause and stability.",
                minutes as i64, minimum as i64
            ));
        }
    }

    // Environment temperature overage.
    if r.number("hc_env_over").is_some_and(|over| over > 0.0) {
        match (r.number("hc_env_temp"), r.number("hc_env_temp_threshold")) {
            (Some(current), Some(threshold)) => sug.push(format!(
                "Environment temperature high ({current} > {threshold}). Check airflow, \
                 fans, room cooling, and dust filters."
            )),
            _ => sug.push(
                "Environment temperature high. Check airflow, fans, room cooling, \
                 and dust filters."
                    .to_string(),
            ),
        }
    }

    // Power and fans.
    if r.number("hc_power_ok").is_some_and(|ok| ok == 0.0) {
        sug.push("Power health not OK: check PSUs and power feeds.".to_string());
    }
    // Any non-null status is stringified for the ok-set check, so a
    // numeric status code still yields a hint.
    if let Some(status) = r.get("hc_fans_status").filter(|v| !v.is_null()) {
        let status = status.to_string().to_lowercase();
        if !status.is_empty() && !FAN_OK_STATUSES.contains(&status.as_str()) {
            sug.push(format!(
                "Fans report '{status}': verify fan modules and speeds."
            ));
        }
    }

    // Roll-up result: generic hint only when nothing specific fired.
    if sug.is_empty() && r.text("hc_result").is_some_and(|s| s.eq_ignore_ascii_case("FAIL")) {
        sug.push(
            "Health check failure detected. Review CPU/memory/uptime/environment details."
                .to_string(),
        );
    }

    if sug.is_empty() {
        sug.push("No immediate action; monitor and learn baseline.".to_string());
    }
    sug
}
