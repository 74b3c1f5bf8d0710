//! Match accuracy classification from the provider's match-method descriptor.
//!
//! The descriptor lists which identity fields the provider matched on, e.g.
//! `"ADDRESS,EMAIL"` or `"name+company_address"`. Tokens are tested by
//! case-insensitive substring membership.
use crate::field_access::get_first_field;
use crate::models::{MatchTier, RawContact, Scope};

const B2C_MATCH_BY_FIELDS: &[&str] = &["SKIPTRACE_MATCH_BY", "MATCH_BY", "match_by"];
const B2B_MATCH_BY_FIELDS: &[&str] = &[
    "SKIPTRACE_B2B_MATCH_BY",
    "B2B_MATCH_BY",
    "MATCH_BY",
    "match_by",
];

/// Classify a descriptor. First matching row wins:
/// ADDRESS+EMAIL is high, NAME+ADDRESS is medium, everything else is low.
pub fn classify_descriptor(descriptor: &str) -> MatchTier {
    let upper = descriptor.to_uppercase();
    // COMPANY_ADDRESS contains ADDRESS, so one test covers both spellings.
    let has_address = upper.contains("ADDRESS");
    let has_email = upper.contains("EMAIL");
    let has_name = upper.contains("NAME");

    if has_address && has_email {
        MatchTier::High
    } else if has_name && has_address {
        MatchTier::Medium
    } else {
        MatchTier::Low
    }
}

/// Read the scope's descriptor field and classify it. Absent descriptors are low.
pub fn evaluate_match_by_tier(contact: &RawContact, scope: Scope) -> MatchTier {
    let fields = match scope {
        Scope::Commercial => B2B_MATCH_BY_FIELDS,
        Scope::Residential | Scope::Both => B2C_MATCH_BY_FIELDS,
    };

    match get_first_field(contact, fields) {
        Some(descriptor) => classify_descriptor(&descriptor),
        None => MatchTier::Low,
    }
}

/// high=3, medium=2, low=1, absent=0.
pub fn tier_to_numeric_score(tier: Option<MatchTier>) -> u8 {
    match tier {
        Some(MatchTier::High) => 3,
        Some(MatchTier::Medium) => 2,
        Some(MatchTier::Low) => 1,
        None => 0,
    }
}
