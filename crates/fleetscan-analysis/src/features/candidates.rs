//! Canonical feature-field catalogs.
//!
//! `CANDIDATE_FEATURES` is the fixed, ordered set of fields considered
//! for the feature matrix. It is defined once, never derived from data,
//! so column order is reproducible across batches.

/// Fields considered for numeric feature extraction, in matrix column
/// order. Inventory facts first, then `hc_*` health-check metrics.
pub const CANDIDATE_FEATURES: [&str; 18] = [
    // Inventory
    "mem_used_pct",
    "license_expired", // boolean flag, coerced to 0/1
    "iface_total",
    "iface_enabled",
    "iface_enabled_ratio",
    "bgp_peers",
    "v4nets",
    "v6nets",
    "uptime_days",
    // Health checks (when present)
    "hc_cpu_1min",
    "hc_cpu_5min",
    "hc_cpu_threshold",
    "hc_mem_util",
    "hc_mem_threshold",
    "hc_env_temp",
    "hc_env_temp_threshold",
    "hc_uptime_min",
    "hc_uptime_min_threshold",
];

/// Identifier, raw, and descriptive fields the IQR detector never treats
/// as measurement columns.
pub const IQR_EXCLUDED_FIELDS: [&str; 12] = [
    "host",
    "source",
    "raw",
    "os_type",
    "image",
    "model",
    "serial",
    "license_status",
    "version",
    "version_major",
    "version_minor",
    "version_patch",
];

/// Whether a field is eligible for IQR column selection by name.
pub fn iqr_eligible(field: &str) -> bool {
    !IQR_EXCLUDED_FIELDS.contains(&field)
}
