//! Jurisdictional call suppression.
//!
//! Only call exports are filtered. States compare case-insensitively after
//! trimming, and a lead with no state is never suppressed.
use crate::models::{Lead, UseCase};
use serde::{Deserialize, Serialize};

/// States suppressed for call exports when nothing is configured.
pub const DEFAULT_CALL_SUPPRESSED_STATES: &[&str] = &["FL"];

/// Output of the compliance pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceResult {
    pub filtered_leads: Vec<Lead>,
    pub suppressed_count: usize,
    /// States that actually triggered a suppression, in first-hit order.
    pub suppressed_states: Vec<String>,
}

/// Counts-only view for the diagnostics bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub suppressed_count: usize,
    pub suppressed_states: Vec<String>,
}

impl ComplianceResult {
    pub fn summary(&self) -> ComplianceSummary {
        ComplianceSummary {
            suppressed_count: self.suppressed_count,
            suppressed_states: self.suppressed_states.clone(),
        }
    }
}

fn normalize_state(state: &str) -> String {
    state.trim().to_ascii_uppercase()
}

/// Effective suppression list. `None` means the defaults; an empty slice
/// disables suppression.
pub fn resolve_suppressed_states(configured: Option<&[String]>) -> Vec<String> {
    let states: Vec<String> = match configured {
        Some(list) => list.iter().map(|s| normalize_state(s)).collect(),
        None => DEFAULT_CALL_SUPPRESSED_STATES
            .iter()
            .map(|s| normalize_state(s))
            .collect(),
    };
    let mut unique: Vec<String> = Vec::with_capacity(states.len());
    for state in states {
        if !state.is_empty() && !unique.contains(&state) {
            unique.push(state);
        }
    }
    unique
}

/// `true` if `state` is non-empty and in the (already normalized) list.
pub fn is_state_suppressed(state: &str, suppressed: &[String]) -> bool {
    let state = normalize_state(state);
    !state.is_empty() && suppressed.iter().any(|s| *s == state)
}

pub fn filter_leads_by_state_compliance(
    leads: Vec<Lead>,
    use_case: UseCase,
    suppress_states: Option<&[String]>,
) -> ComplianceResult {
    if use_case != UseCase::Call {
        return ComplianceResult {
            filtered_leads: leads,
            ..ComplianceResult::default()
        };
    }

    let suppressed = resolve_suppressed_states(suppress_states);
    if suppressed.is_empty() {
        return ComplianceResult {
            filtered_leads: leads,
            ..ComplianceResult::default()
        };
    }

    let mut result = ComplianceResult::default();
    for lead in leads {
        if is_state_suppressed(&lead.state, &suppressed) {
            let state = normalize_state(&lead.state);
            if !result.suppressed_states.contains(&state) {
                result.suppressed_states.push(state);
            }
            result.suppressed_count += 1;
        } else {
            result.filtered_leads.push(lead);
        }
    }

    if result.suppressed_count > 0 {
        tracing::info!(
            "Call compliance suppressed {} lead(s) across {} state(s)",
            result.suppressed_count,
            result.suppressed_states.len()
        );
    }

    result
}
