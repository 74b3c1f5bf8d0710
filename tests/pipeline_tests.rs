/// End-to-end tests for the lead pipeline
/// Covers recipe decisions, scoring, compliance and the quality gate together
use chrono::{DateTime, TimeZone, Utc};
use lead_recipe_engine::compliance::filter_leads_by_state_compliance;
use lead_recipe_engine::models::{
    ExcludedReason, Lead, QualityTier, RawContact, Scope, ScopeContext, UseCase,
};
use lead_recipe_engine::pipeline::{run_pipeline, PipelineConfig};
use lead_recipe_engine::quality::calculate_p90_quality_score;
use lead_recipe_engine::recipe::map_contact_to_lead;
use serde_json::json;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

fn contact(value: serde_json::Value) -> RawContact {
    RawContact::from(value)
}

fn pipeline_config(tier: QualityTier) -> PipelineConfig {
    PipelineConfig::new("audiencelab")
        .with_quality_tier(tier)
        .with_as_of(as_of())
}

fn full_contact(first_name: &str, state: &str, wireless: &str) -> RawContact {
    contact(json!({
        "SKIPTRACE_MATCH_BY": "ADDRESS,EMAIL",
        "FIRST_NAME": first_name,
        "LAST_NAME": "Lopez",
        "SKIPTRACE_ADDRESS": "100 Main Street",
        "SKIPTRACE_CITY": "Atlanta",
        "SKIPTRACE_STATE": state,
        "SKIPTRACE_ZIP": "30301",
        "SKIPTRACE_WIRELESS_NUMBERS": wireless,
        "PERSONAL_EMAIL": format!("{}@example.com", first_name.to_lowercase()),
        "PERSONAL_EMAIL_VALIDATION_STATUS": "Valid (Esp)"
    }))
}

#[cfg(test)]
mod recipe_scenario_tests {
    use super::*;

    #[test]
    fn test_phone_only_contact_rejected_for_low_match_score() {
        let ctx = ScopeContext::new("roofing", Scope::Residential, UseCase::Call);
        let mapping = map_contact_to_lead(
            &contact(json!({"phone": "3055551234"})),
            &ctx,
            0,
            "audiencelab",
            as_of(),
        );

        assert_eq!(mapping.excluded_reason(), Some(ExcludedReason::LowMatchScore));
        assert_eq!(mapping.match_score, 1);
        assert!(mapping.lead().is_none());
    }

    #[test]
    fn test_override_zero_accepts_phone_only_contact() {
        let ctx = ScopeContext::new("roofing", Scope::Residential, UseCase::Call)
            .with_min_match_score_override(Some(0));
        let mapping = map_contact_to_lead(
            &contact(json!({"phone": "3055551234"})),
            &ctx,
            0,
            "audiencelab",
            as_of(),
        );

        assert!(mapping.excluded_reason().is_none());
        let lead = mapping.lead().expect("accepted");
        assert_eq!(lead.phone, "+13055551234");
        assert_eq!(lead.match_score, 1);
        assert_eq!(lead.tags, "roofing");
    }

    #[test]
    fn test_esp_email_without_last_seen_is_fresh() {
        let ctx = ScopeContext::new("newsletter", Scope::Residential, UseCase::Email);
        let mapping = map_contact_to_lead(
            &contact(json!({
                "PERSONAL_EMAIL": "a@b.com",
                "PERSONAL_EMAIL_VALIDATION_STATUS": "Valid (Esp)"
            })),
            &ctx,
            0,
            "audiencelab",
            as_of(),
        );

        let lead = mapping.lead().expect("accepted");
        assert_eq!(lead.email, "a@b.com");
        assert_eq!(lead.email_validation_status, "Valid (Esp)");
    }

    #[test]
    fn test_stale_email_rejected() {
        let ctx = ScopeContext::new("newsletter", Scope::Residential, UseCase::Email);
        let mapping = map_contact_to_lead(
            &contact(json!({
                "PERSONAL_EMAIL": "a@b.com",
                "PERSONAL_EMAIL_VALIDATION_STATUS": "Valid (Esp)",
                "PERSONAL_EMAIL_LAST_SEEN": "2026-01-01"
            })),
            &ctx,
            0,
            "audiencelab",
            as_of(),
        );

        assert_eq!(mapping.excluded_reason(), Some(ExcludedReason::EmailTooOld));
    }

    #[test]
    fn test_p90_of_ten_scores() {
        let leads: Vec<Lead> = (1..=10)
            .map(|i| Lead {
                quality_score: i * 10,
                ..Lead::default()
            })
            .collect();
        assert_eq!(calculate_p90_quality_score(&leads), 100);
    }

    #[test]
    fn test_email_compliance_never_removes() {
        let leads: Vec<Lead> = ["FL", "TX", "CA"]
            .iter()
            .map(|s| Lead {
                state: s.to_string(),
                ..Lead::default()
            })
            .collect();
        let configured = vec!["FL".to_string(), "TX".to_string(), "CA".to_string()];

        let result = filter_leads_by_state_compliance(
            leads.clone(),
            UseCase::Email,
            Some(configured.as_slice()),
        );
        assert_eq!(result.filtered_leads, leads);
        assert_eq!(result.suppressed_count, 0);
    }
}

#[cfg(test)]
mod pipeline_flow_tests {
    use super::*;

    fn call_batch() -> Vec<RawContact> {
        vec![
            full_contact("Ana", "GA", "(404) 555-0101"),
            full_contact("Ben", "FL", "(404) 555-0106"),
            contact(json!({"MATCH_BY": "NAME,ADDRESS", "PHONE": "4045550102"})),
            contact(json!({
                "MATCH_BY": "address email",
                "SKIPTRACE_DNC": "Y",
                "PHONE": "4045550103"
            })),
            contact(json!({"MATCH_BY": "ADDRESS,EMAIL", "FIRST_NAME": "Cal"})),
            contact(json!({
                "MATCH_BY": "ADDRESS,EMAIL",
                "LANDLINE_PHONES": "404-555-0105",
                "CITY": "Atlanta",
                "STATE": "GA"
            })),
        ]
    }

    #[test]
    fn test_residential_call_batch() {
        let ctx = ScopeContext::new("roofing", Scope::Residential, UseCase::Call)
            .with_zips(["30301"])
            .with_requested_count(2);
        let output = run_pipeline(&call_batch(), &ctx, &pipeline_config(QualityTier::Balanced));

        let d = &output.diagnostics;
        assert_eq!(d.total_fetched, 6);
        assert_eq!(d.kept, 3);
        assert_eq!(d.filtered_low_match_score, 1);
        assert_eq!(d.filtered_dnc, 1);
        assert_eq!(d.filtered_missing_phone, 1);
        assert_eq!(d.total_excluded() + d.kept, d.total_fetched);
        assert_eq!(d.missing_name_or_address_count, 1);
        assert_eq!(d.match_by_tier.high, 5);
        assert_eq!(d.match_by_tier.medium, 1);

        assert_eq!(output.compliance.suppressed_count, 1);
        assert_eq!(output.compliance.suppressed_states, vec!["FL"]);

        assert_eq!(output.leads.len(), 2);
        assert_eq!(output.leads[0].first_name, "Ana");
        assert_eq!(output.leads[0].quality_score, 100);
        assert_eq!(output.leads[0].phone, "+14045550101");
        assert_eq!(output.leads[0].lead_type, "residential");
        assert_eq!(output.leads[0].source, "audiencelab");
        assert_eq!(output.leads[0].quality_tier, "balanced");
        assert_eq!(output.leads[1].landline_phones, "+14045550105");
        assert_eq!(output.leads[1].quality_score, 75);

        assert_eq!(output.quality_stats.avg_quality_score, 91.7);
        assert_eq!(output.quality_report.delivered_count, 2);
        assert_eq!(output.quality_report.avg_quality_score, 87.5);
        assert_eq!(output.quality_report.p90_quality_score, 100);
        assert_eq!(output.quality_report.pct_with_wireless, 50);
        assert_eq!(output.quality_report.pct_complete_address, 50);
        assert!(output.warning.is_none());

        assert_eq!(output.field_coverage.coverage_fetched.total, 6);
        assert_eq!(output.field_coverage.coverage_kept.total, 3);
    }

    #[test]
    fn test_shortfall_is_reported_not_padded() {
        let ctx = ScopeContext::new("roofing", Scope::Residential, UseCase::Call)
            .with_requested_count(10);
        let output = run_pipeline(&call_batch(), &ctx, &pipeline_config(QualityTier::Balanced));

        assert_eq!(output.leads.len(), 2);
        assert_eq!(output.quality_report.requested_count, 10);
        assert!(output.warning.is_some());
        assert_eq!(output.warning, output.quality_report.warning);
    }

    #[test]
    fn test_disabled_suppression_keeps_florida() {
        let ctx = ScopeContext::new("roofing", Scope::Residential, UseCase::Call)
            .with_requested_count(5);
        let config = pipeline_config(QualityTier::Balanced).with_suppress_states(Some(vec![]));
        let output = run_pipeline(&call_batch(), &ctx, &config);

        assert_eq!(output.compliance.suppressed_count, 0);
        assert!(output.leads.iter().any(|l| l.state == "FL"));
    }

    #[test]
    fn test_both_use_case_penalizes_instead_of_removing() {
        let contacts = vec![
            full_contact("Fay", "FL", "4045550201"),
            full_contact("Gus", "GA", "4045550202"),
        ];
        let ctx = ScopeContext::new("solar", Scope::Residential, UseCase::Both)
            .with_requested_count(2);
        let output = run_pipeline(&contacts, &ctx, &pipeline_config(QualityTier::Balanced));

        assert_eq!(output.compliance.suppressed_count, 0);
        assert_eq!(output.leads.len(), 2);
        assert_eq!(output.leads[0].first_name, "Gus");
        assert_eq!(output.leads[0].quality_score, 100);
        assert_eq!(output.leads[1].first_name, "Fay");
        assert_eq!(output.leads[1].quality_score, 75);
    }

    #[test]
    fn test_both_scope_alternates_lead_type() {
        let email_only = || {
            contact(json!({
                "MATCH_BY": "ADDRESS,EMAIL",
                "EMAIL": "x@example.com",
                "EMAIL_VALIDATION_STATUS": "Valid (Esp)"
            }))
        };
        let ctx = ScopeContext::new("payroll", Scope::Both, UseCase::Email).with_requested_count(2);
        let output = run_pipeline(
            &[email_only(), email_only()],
            &ctx,
            &pipeline_config(QualityTier::Scale),
        );

        let mut types: Vec<&str> = output.leads.iter().map(|l| l.lead_type.as_str()).collect();
        types.sort_unstable();
        assert_eq!(types, vec!["commercial", "residential"]);
    }

    #[test]
    fn test_empty_batch() {
        let ctx = ScopeContext::new("roofing", Scope::Residential, UseCase::Call)
            .with_requested_count(3);
        let output = run_pipeline(&[], &ctx, &pipeline_config(QualityTier::Scale));

        assert!(output.leads.is_empty());
        assert_eq!(output.diagnostics.total_fetched, 0);
        assert_eq!(output.quality_report.avg_quality_score, 0.0);
        assert_eq!(output.field_coverage.coverage_fetched.pct.phone, 0);
        assert!(output.warning.is_some());
    }

    #[test]
    fn test_output_bundle_is_counts_only() {
        let ctx = ScopeContext::new("roofing", Scope::Residential, UseCase::Call)
            .with_requested_count(2);
        let output = run_pipeline(&call_batch(), &ctx, &pipeline_config(QualityTier::Balanced));

        let bundle = json!({
            "diagnostics": output.diagnostics,
            "fieldCoverage": output.field_coverage,
            "qualityStats": output.quality_stats,
            "qualityReport": output.quality_report,
            "compliance": output.compliance,
        })
        .to_string();
        for secret in ["Ana", "4045550101", "ana@example.com", "100 Main Street"] {
            assert!(!bundle.contains(secret), "bundle leaked {}", secret);
        }
    }
}
