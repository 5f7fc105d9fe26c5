//! Remediation-hint mapping for flagged records.

pub mod mapper;

pub use mapper::{suggest_actions, ActionMap};
