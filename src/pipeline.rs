//! End-to-end lead pipeline over one provider batch.
//!
//! 1. Coverage of the fetched contacts
//! 2. Recipe accept/reject per contact
//! 3. Coverage of the kept leads
//! 4. Quality scoring (with suppression penalty for mixed campaigns)
//! 5. State compliance suppression (call campaigns)
//! 6. Quality gate and report
//!
//! Synchronous and free of shared state; independent requests can run
//! concurrently.
use crate::compliance::{
    filter_leads_by_state_compliance, is_state_suppressed, resolve_suppressed_states,
    ComplianceSummary,
};
use crate::coverage::{compute_contacts_coverage, compute_leads_coverage, FieldCoverage};
use crate::models::{Diagnostics, Lead, QualityTier, RawContact, ScopeContext, UseCase};
use crate::quality::{process_leads_with_suppression, QualityStats};
use crate::quality_gate::{apply_quality_gate, generate_quality_report, QualityReport};
use crate::recipe::map_contact_to_lead;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Explicit per-run settings. The pipeline never reads the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Provider identifier written to `Lead.source`.
    pub source: String,
    pub quality_tier: QualityTier,
    /// `None` uses the default suppression list, an empty list disables it.
    pub suppress_states: Option<Vec<String>>,
    /// Reference instant for the email freshness window.
    pub as_of: DateTime<Utc>,
}

impl PipelineConfig {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            quality_tier: QualityTier::default(),
            suppress_states: None,
            as_of: Utc::now(),
        }
    }

    pub fn with_quality_tier(mut self, tier: QualityTier) -> Self {
        self.quality_tier = tier;
        self
    }

    pub fn with_suppress_states(mut self, states: Option<Vec<String>>) -> Self {
        self.suppress_states = states;
        self
    }

    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }
}

/// Final leads plus the counts-only diagnostics bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub leads: Vec<Lead>,
    pub diagnostics: Diagnostics,
    pub field_coverage: FieldCoverage,
    pub quality_stats: QualityStats,
    pub quality_report: QualityReport,
    pub compliance: ComplianceSummary,
    pub warning: Option<String>,
}

/// Call-oriented campaigns need a dialable number; `both` includes calling.
pub fn is_call_campaign(use_case: UseCase) -> bool {
    matches!(use_case, UseCase::Call | UseCase::Both)
}

pub fn run_pipeline(
    contacts: &[RawContact],
    context: &ScopeContext,
    config: &PipelineConfig,
) -> PipelineOutput {
    tracing::info!(
        "Running lead pipeline: {} contact(s), scope={}, use_case={}, tier={}, requested={}",
        contacts.len(),
        context.scope,
        context.use_case,
        config.quality_tier,
        context.requested_count
    );

    let mut diagnostics = Diagnostics {
        total_fetched: contacts.len(),
        ..Diagnostics::default()
    };
    let coverage_fetched = compute_contacts_coverage(contacts, context.scope);

    let mut leads: Vec<Lead> = Vec::new();
    for (index, contact) in contacts.iter().enumerate() {
        let mapping = map_contact_to_lead(contact, context, index, &config.source, config.as_of);
        diagnostics.record_tier(mapping.tier);
        diagnostics.record_match_score(mapping.match_score);

        if let Some(reason) = mapping.excluded_reason() {
            tracing::debug!("Contact #{} excluded: {}", index, reason);
            diagnostics.record_exclusion(reason);
            continue;
        }

        if mapping.missing_name_or_address {
            diagnostics.missing_name_or_address_count += 1;
        }
        if let Some(lead) = mapping.into_lead() {
            diagnostics.kept += 1;
            leads.push(lead);
        }
    }

    tracing::info!(
        "Recipe kept {} of {} contact(s) ({} excluded)",
        diagnostics.kept,
        diagnostics.total_fetched,
        diagnostics.total_excluded()
    );

    let field_coverage = FieldCoverage {
        coverage_fetched,
        coverage_kept: compute_leads_coverage(&leads),
    };

    // Mixed campaigns keep suppressed-state leads for email but score them down.
    let suppressed = resolve_suppressed_states(config.suppress_states.as_deref());
    let penalize = context.use_case == UseCase::Both;
    let quality_stats = process_leads_with_suppression(&mut leads, config.quality_tier, |lead| {
        penalize && is_state_suppressed(&lead.state, &suppressed)
    });

    let compliance = filter_leads_by_state_compliance(
        leads,
        context.use_case,
        config.suppress_states.as_deref(),
    );
    let compliance_summary = compliance.summary();

    let gate = apply_quality_gate(
        compliance.filtered_leads,
        config.quality_tier,
        context.requested_count,
        is_call_campaign(context.use_case),
    );
    let quality_report = generate_quality_report(&gate, context.requested_count);
    let warning = gate.warning.clone();

    let mut delivered = gate.passed_leads;
    delivered.truncate(gate.delivered_count);

    tracing::info!(
        "Pipeline complete: {} lead(s) delivered, {} suppressed, {} below tier",
        delivered.len(),
        compliance_summary.suppressed_count,
        quality_report.rejected_by_quality_count
    );

    PipelineOutput {
        leads: delivered,
        diagnostics,
        field_coverage,
        quality_stats,
        quality_report,
        compliance: compliance_summary,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scope;
    use serde_json::json;

    #[test]
    fn test_call_campaign_flag() {
        assert!(is_call_campaign(UseCase::Call));
        assert!(is_call_campaign(UseCase::Both));
        assert!(!is_call_campaign(UseCase::Email));
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::new("audiencelab");
        assert_eq!(config.quality_tier, QualityTier::Balanced);
        assert_eq!(config.suppress_states, None);
    }

    #[test]
    fn test_output_serializes_camel_case() {
        let contacts = vec![RawContact::from(json!({
            "MATCH_BY": "ADDRESS,EMAIL",
            "PHONE": "4045550100"
        }))];
        let context = ScopeContext::new("hvac", Scope::Residential, UseCase::Call)
            .with_requested_count(1);
        let output = run_pipeline(&contacts, &context, &PipelineConfig::new("audiencelab"));

        assert_eq!(output.leads.len(), 1);
        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("fieldCoverage").is_some());
        assert!(value.get("qualityReport").is_some());
        assert_eq!(value["diagnostics"]["kept"], 1);
    }
}
