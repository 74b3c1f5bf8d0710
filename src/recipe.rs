//! Recipe Engine: per-(scope, use case) filtering policy and the
//! accept/reject decision for each provider contact.
//!
//! Checks run in a fixed order and the first failure wins, so every rejected
//! contact carries exactly one reason:
//!
//! 1. match score below the recipe minimum
//! 2. DNC flag (residential call campaigns only)
//! 3. email validity / ESP status / freshness
//! 4. phone presence
//! 5. combined phone-or-email presence (`both` campaigns)
use crate::field_access::get_first_field;
use crate::identity::{resolve_best_email, resolve_identity, ResolvedEmail};
use crate::lead_mapper::{build_lead, AcceptedContact};
use crate::match_accuracy::{evaluate_match_by_tier, tier_to_numeric_score};
use crate::models::{
    ExcludedReason, Lead, MatchTier, RawContact, RecipeConfig, Scope, ScopeContext, UseCase,
};
use crate::phones::parse_all_phones;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

const DNC_FIELDS: &[&str] = &["SKIPTRACE_DNC", "DNC", "dnc"];

/// Freshness window applied to email campaigns.
pub const EMAIL_FRESHNESS_DAYS: u32 = 30;
/// Default minimum match score for call campaigns.
pub const CALL_MIN_MATCH_SCORE: u8 = 3;

/// Scope used for the contact at `index`.
///
/// `both` alternates residential (even index) and commercial (odd index).
pub fn effective_scope(scope: Scope, index: usize) -> Scope {
    match scope {
        Scope::Both if index % 2 == 0 => Scope::Residential,
        Scope::Both => Scope::Commercial,
        other => other,
    }
}

/// Derive the filtering policy. An explicit override always replaces the
/// default minimum match score.
pub fn build_recipe(
    scope: Scope,
    use_case: UseCase,
    min_match_score_override: Option<u8>,
) -> RecipeConfig {
    let (require_phone, require_email_valid_esp, freshness_days, default_min_match) =
        match use_case {
            UseCase::Call => (true, false, 0, CALL_MIN_MATCH_SCORE),
            UseCase::Email => (false, true, EMAIL_FRESHNESS_DAYS, 0),
            UseCase::Both => (false, false, 0, 0),
        };

    let exclude_dnc =
        scope == Scope::Residential && matches!(use_case, UseCase::Call | UseCase::Both);

    RecipeConfig {
        require_email_valid_esp,
        require_phone,
        exclude_dnc,
        freshness_days,
        min_match_score: min_match_score_override.unwrap_or(default_min_match),
    }
}

/// Accept/reject decision for one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Accepted(Box<Lead>),
    Excluded(ExcludedReason),
}

/// Result of running the recipe on one contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMapping {
    pub outcome: ContactOutcome,
    /// Only ever set for accepted contacts; rejected ones are never resolved.
    pub missing_name_or_address: bool,
    pub tier: MatchTier,
    pub match_score: u8,
    pub effective_scope: Scope,
}

impl ContactMapping {
    pub fn lead(&self) -> Option<&Lead> {
        match &self.outcome {
            ContactOutcome::Accepted(lead) => Some(lead),
            ContactOutcome::Excluded(_) => None,
        }
    }

    pub fn into_lead(self) -> Option<Lead> {
        match self.outcome {
            ContactOutcome::Accepted(lead) => Some(*lead),
            ContactOutcome::Excluded(_) => None,
        }
    }

    pub fn excluded_reason(&self) -> Option<ExcludedReason> {
        match self.outcome {
            ContactOutcome::Accepted(_) => None,
            ContactOutcome::Excluded(reason) => Some(reason),
        }
    }
}

/// Parse a provider timestamp. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]`
/// and bare dates; anything else is `None`.
pub fn parse_last_seen(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
                .map(|ndt| ndt.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc())
        })
}

/// Absent or unparseable timestamps count as fresh.
pub fn is_fresh(last_seen: Option<&str>, freshness_days: u32, as_of: DateTime<Utc>) -> bool {
    if freshness_days == 0 {
        return true;
    }
    match last_seen.and_then(parse_last_seen) {
        Some(seen) => {
            as_of.signed_duration_since(seen) <= Duration::days(i64::from(freshness_days))
        }
        None => true,
    }
}

fn check_email(
    email: &ResolvedEmail,
    recipe: &RecipeConfig,
    as_of: DateTime<Utc>,
) -> Option<ExcludedReason> {
    if recipe.require_email_valid_esp {
        if !email.is_present() {
            return Some(ExcludedReason::InvalidEmail);
        }
        if !email.is_valid_esp() {
            return Some(ExcludedReason::InvalidEmailEsp);
        }
        if !is_fresh(email.last_seen.as_deref(), recipe.freshness_days, as_of) {
            return Some(ExcludedReason::EmailTooOld);
        }
        None
    } else if email.is_present() && email.has_explicit_invalid_status() {
        Some(ExcludedReason::InvalidEmail)
    } else {
        None
    }
}

fn is_dnc(contact: &RawContact) -> bool {
    get_first_field(contact, DNC_FIELDS)
        .map(|flag| flag.eq_ignore_ascii_case("Y"))
        .unwrap_or(false)
}

/// Run the recipe on the contact at `index`.
///
/// `source` is the provider identifier written to accepted leads and `as_of`
/// is the reference instant for the freshness window.
pub fn map_contact_to_lead(
    contact: &RawContact,
    context: &ScopeContext,
    index: usize,
    source: &str,
    as_of: DateTime<Utc>,
) -> ContactMapping {
    let scope = effective_scope(context.scope, index);
    let tier = evaluate_match_by_tier(contact, scope);
    let match_score = tier_to_numeric_score(Some(tier));
    let recipe = build_recipe(scope, context.use_case, context.min_match_score_override);

    let excluded = |reason: ExcludedReason| ContactMapping {
        outcome: ContactOutcome::Excluded(reason),
        missing_name_or_address: false,
        tier,
        match_score,
        effective_scope: scope,
    };

    if recipe.min_match_score > 0 && match_score < recipe.min_match_score {
        return excluded(ExcludedReason::LowMatchScore);
    }

    if recipe.exclude_dnc && is_dnc(contact) {
        return excluded(ExcludedReason::Dnc);
    }

    let email = resolve_best_email(contact, scope);
    if let Some(reason) = check_email(&email, &recipe, as_of) {
        return excluded(reason);
    }

    let phones = parse_all_phones(contact, scope);
    if recipe.require_phone && phones.is_empty() {
        return excluded(ExcludedReason::MissingPhone);
    }

    if context.use_case == UseCase::Both && phones.is_empty() && !email.is_present() {
        return excluded(ExcludedReason::MissingContact);
    }

    let identity = resolve_identity(contact, scope);
    let missing_name_or_address = identity.missing_name_or_address;
    let accepted = AcceptedContact {
        identity,
        phones,
        email,
        effective_scope: scope,
        match_score,
        dnc_status: get_first_field(contact, DNC_FIELDS).unwrap_or_default(),
    };

    ContactMapping {
        outcome: ContactOutcome::Accepted(Box::new(build_lead(
            &accepted,
            &context.lead_request,
            source,
        ))),
        missing_name_or_address,
        tier,
        match_score,
        effective_scope: scope,
    }
}
