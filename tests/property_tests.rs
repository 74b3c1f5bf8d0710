/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use chrono::{TimeZone, Utc};
use lead_recipe_engine::coverage::compute_contacts_coverage;
use lead_recipe_engine::match_accuracy::classify_descriptor;
use lead_recipe_engine::models::{
    Lead, MatchTier, QualityTier, RawContact, Scope, ScopeContext, UseCase,
};
use lead_recipe_engine::phones::normalize_phone;
use lead_recipe_engine::quality::{calculate_quality_score, calculate_quality_score_breakdown};
use lead_recipe_engine::quality_gate::apply_quality_gate;
use lead_recipe_engine::recipe::{map_contact_to_lead, ContactOutcome};
use proptest::prelude::*;
use serde_json::json;

fn arb_scope() -> impl Strategy<Value = Scope> {
    prop_oneof![
        Just(Scope::Residential),
        Just(Scope::Commercial),
        Just(Scope::Both)
    ]
}

fn arb_use_case() -> impl Strategy<Value = UseCase> {
    prop_oneof![Just(UseCase::Call), Just(UseCase::Email), Just(UseCase::Both)]
}

fn arb_tier() -> impl Strategy<Value = QualityTier> {
    prop_oneof![
        Just(QualityTier::Hot),
        Just(QualityTier::Balanced),
        Just(QualityTier::Scale)
    ]
}

prop_compose! {
    fn arb_lead()(
        quality_score in 0u8..=100,
        match_score in 0u8..=8,
        wireless in proptest::bool::ANY,
        best_phone in proptest::bool::ANY,
        address in "[0-9A-Za-z ]{0,20}",
        zip in "[0-9]{0,6}",
        state in "[A-Z]{0,2}",
        email in "[a-z@.]{0,12}",
        status in prop_oneof![Just(""), Just("Valid"), Just("Valid (Esp)"), Just("Invalid")],
    ) -> Lead {
        Lead {
            quality_score,
            match_score,
            wireless_phones: if wireless { "+14045550100".to_string() } else { String::new() },
            best_phone: if best_phone { "+14045550100".to_string() } else { String::new() },
            address,
            zip,
            state,
            city: "Atlanta".to_string(),
            email,
            email_validation_status: status.to_string(),
            ..Lead::default()
        }
    }
}

prop_compose! {
    fn arb_contact()(
        match_by in prop_oneof![Just(""), Just("ADDRESS,EMAIL"), Just("NAME,ADDRESS"), Just("PHONE")],
        phone in prop_oneof![Just(""), Just("4045550100"), Just("555")],
        email in prop_oneof![Just(""), Just("a@b.com")],
        status in prop_oneof![Just(""), Just("Valid (Esp)"), Just("Valid"), Just("Invalid")],
        last_seen in prop_oneof![Just(""), Just("2026-05-30"), Just("2020-01-01"), Just("garbage")],
        dnc in prop_oneof![Just(""), Just("Y"), Just("N")],
    ) -> RawContact {
        RawContact::from(json!({
            "MATCH_BY": match_by,
            "PHONE": phone,
            "EMAIL": email,
            "EMAIL_VALIDATION_STATUS": status,
            "LAST_SEEN": last_seen,
            "DNC": dnc,
        }))
    }
}

// Property: Phone normalization is idempotent
proptest! {
    #[test]
    fn normalize_phone_is_idempotent(raw in "[0-9()+ .-]{10,24}") {
        let once = normalize_phone(&raw);
        prop_assert_eq!(normalize_phone(&once), once.clone());
    }

    #[test]
    fn normalize_phone_never_panics(raw in "\\PC*") {
        let normalized = normalize_phone(&raw);
        prop_assert!(normalized.is_empty() || normalized.starts_with('+'));
    }
}

// Property: ADDRESS+EMAIL descriptors are always high
proptest! {
    #[test]
    fn address_and_email_always_high(
        prefix in "[a-z_,+ ]{0,8}",
        upper_first in proptest::bool::ANY,
        email_first in proptest::bool::ANY,
    ) {
        let (address, email) = if upper_first {
            ("ADDRESS", "email")
        } else {
            ("address", "EMAIL")
        };
        let descriptor = if email_first {
            format!("{}{},{}", prefix, email, address)
        } else {
            format!("{}{}+{}", prefix, address, email)
        };
        prop_assert_eq!(classify_descriptor(&descriptor), MatchTier::High);
    }
}

// Property: Every contact gets exactly one outcome
proptest! {
    #[test]
    fn accepted_or_single_reason(
        contact in arb_contact(),
        scope in arb_scope(),
        use_case in arb_use_case(),
        index in 0usize..4,
        min_override in proptest::option::of(0u8..=3),
    ) {
        let ctx = ScopeContext::new("intent", scope, use_case)
            .with_min_match_score_override(min_override);
        let as_of = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let mapping = map_contact_to_lead(&contact, &ctx, index, "audiencelab", as_of);

        match &mapping.outcome {
            ContactOutcome::Accepted(_) => {
                prop_assert!(mapping.excluded_reason().is_none());
                prop_assert!(mapping.lead().is_some());
            }
            ContactOutcome::Excluded(_) => {
                prop_assert!(mapping.lead().is_none());
                prop_assert!(!mapping.missing_name_or_address);
            }
        }
    }
}

// Property: The gate never pads
proptest! {
    #[test]
    fn gate_never_pads(
        leads in proptest::collection::vec(arb_lead(), 0..30),
        tier in arb_tier(),
        requested in 0usize..40,
        is_call in proptest::bool::ANY,
    ) {
        let gate = apply_quality_gate(leads, tier, requested, is_call);
        let threshold = tier.threshold();

        prop_assert!(gate.delivered_count <= gate.passed_leads.len());
        if requested > 0 {
            prop_assert!(gate.delivered_count <= requested);
        }
        for lead in &gate.passed_leads {
            prop_assert!(lead.quality_score >= threshold.min_quality_score);
            prop_assert!(lead.match_score >= threshold.min_match_score);
        }
        for pair in gate.passed_leads.windows(2) {
            prop_assert!(pair[0].quality_score >= pair[1].quality_score);
        }
    }
}

// Property: Coverage never carries field values
proptest! {
    #[test]
    fn coverage_never_leaks_values(
        field in prop_oneof![
            Just("FIRST_NAME"),
            Just("PERSONAL_ADDRESS"),
            Just("CITY"),
            Just("PERSONAL_EMAIL"),
            Just("PHONE"),
        ],
        nested in proptest::bool::ANY,
        scope in arb_scope(),
    ) {
        let value = json!({ field: "SECRET_XYZ 4045550199" });
        let contact = if nested {
            RawContact::from(json!({ "data": value }))
        } else {
            RawContact::from(value)
        };
        let report = compute_contacts_coverage(&[contact], scope);
        let serialized = serde_json::to_string(&report).unwrap();
        prop_assert!(!serialized.contains("SECRET_XYZ"));
    }
}

// Property: Scores stay within 0..=100
proptest! {
    #[test]
    fn quality_score_bounded(lead in arb_lead(), suppressed in proptest::bool::ANY) {
        let breakdown = calculate_quality_score_breakdown(&lead, suppressed);
        prop_assert!(breakdown.total <= 100);
        prop_assert!(calculate_quality_score(&lead) <= 100);
        if suppressed {
            prop_assert!(breakdown.total <= calculate_quality_score(&lead));
        }
    }
}
