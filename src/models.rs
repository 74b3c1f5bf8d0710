use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ============ Provider Input ============

/// A contact record exactly as the audience provider returned it.
///
/// Field names and nesting vary per response, so the record is kept as a raw
/// JSON object and only ever read through [`crate::field_access`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawContact(Map<String, Value>);

impl RawContact {
    /// Wraps an already-parsed JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Borrow the underlying key/value map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for RawContact {
    /// Non-object values become an empty record; every field then reads as absent.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

// ============ Targeting ============

/// Audience scope of a targeting request (B2C, B2B or both).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[serde(alias = "b2c")]
    Residential,
    #[serde(alias = "b2b")]
    Commercial,
    Both,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Residential => "residential",
            Scope::Commercial => "commercial",
            Scope::Both => "both",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the exported leads will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCase {
    Call,
    Email,
    Both,
}

impl UseCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCase::Call => "call",
            UseCase::Email => "email",
            UseCase::Both => "both",
        }
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable input to the whole pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeContext {
    /// Free-text intent; copied to every lead's `tags`.
    pub lead_request: String,
    /// 5-digit ZIP codes, order preserved, no duplicates.
    pub zips: Vec<String>,
    pub scope: Scope,
    pub use_case: UseCase,
    pub requested_count: usize,
    #[serde(default)]
    pub min_match_score_override: Option<u8>,
}

impl ScopeContext {
    pub fn new(lead_request: impl Into<String>, scope: Scope, use_case: UseCase) -> Self {
        Self {
            lead_request: lead_request.into(),
            zips: Vec::new(),
            scope,
            use_case,
            requested_count: 0,
            min_match_score_override: None,
        }
    }

    pub fn with_zips<I, S>(mut self, zips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.zips.clear();
        for zip in zips {
            let zip = zip.into();
            if !self.zips.contains(&zip) {
                self.zips.push(zip);
            }
        }
        self
    }

    pub fn with_requested_count(mut self, requested_count: usize) -> Self {
        self.requested_count = requested_count;
        self
    }

    pub fn with_min_match_score_override(mut self, min_match_score: Option<u8>) -> Self {
        self.min_match_score_override = min_match_score;
        self
    }
}

// ============ API Request Models ============

/// Body of `POST /api/v1/leads/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetingRequest {
    pub lead_request: String,
    #[serde(default)]
    pub zips: Vec<String>,
    pub scope: Scope,
    pub use_case: UseCase,
    pub requested_count: usize,
    #[serde(default)]
    pub min_match_score_override: Option<u8>,
    /// Overrides the configured default tier for this request.
    #[serde(default)]
    pub quality_tier: Option<QualityTier>,
}

/// Body of `POST /api/v1/leads/score`: targeting plus caller-supplied contacts.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreContactsRequest {
    #[serde(flatten)]
    pub targeting: TargetingRequest,
    #[serde(default)]
    pub contacts: Vec<RawContact>,
}

// ============ Recipe ============

/// Filtering policy derived from (effective scope, use case, override). Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecipeConfig {
    pub require_email_valid_esp: bool,
    pub require_phone: bool,
    pub exclude_dnc: bool,
    /// Maximum age of the email last-seen signal; 0 disables the check.
    pub freshness_days: u32,
    pub min_match_score: u8,
}

/// Closed set of reasons a contact is dropped by the recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcludedReason {
    Dnc,
    InvalidEmail,
    InvalidEmailEsp,
    EmailTooOld,
    MissingPhone,
    MissingContact,
    LowMatchScore,
}

impl ExcludedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcludedReason::Dnc => "dnc",
            ExcludedReason::InvalidEmail => "invalid_email",
            ExcludedReason::InvalidEmailEsp => "invalid_email_esp",
            ExcludedReason::EmailTooOld => "email_too_old",
            ExcludedReason::MissingPhone => "missing_phone",
            ExcludedReason::MissingContact => "missing_contact",
            ExcludedReason::LowMatchScore => "low_match_score",
        }
    }
}

impl fmt::Display for ExcludedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Classification ============

/// Confidence of the provider's identity match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    High,
    Medium,
    Low,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::High => "high",
            MatchTier::Medium => "medium",
            MatchTier::Low => "low",
        }
    }
}

/// Phones resolved from a contact, all in E.164.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedPhones {
    /// Wireless, then landline, then other; deduplicated by normalized value.
    pub all: Vec<String>,
    pub wireless: Vec<String>,
    pub landline: Vec<String>,
    /// First wireless, else first landline, else first other, else empty.
    pub best: String,
}

impl ParsedPhones {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

// ============ Quality Tiers ============

/// Hard thresholds applied by the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityGateThreshold {
    pub min_quality_score: u8,
    pub min_match_score: u8,
    pub require_wireless_phone: bool,
}

/// Delivery tier selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Hot,
    #[default]
    Balanced,
    Scale,
}

impl QualityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Hot => "hot",
            QualityTier::Balanced => "balanced",
            QualityTier::Scale => "scale",
        }
    }

    /// Fixed per-tier policy table.
    pub fn threshold(&self) -> QualityGateThreshold {
        match self {
            QualityTier::Hot => QualityGateThreshold {
                min_quality_score: 70,
                min_match_score: 5,
                require_wireless_phone: true,
            },
            QualityTier::Balanced => QualityGateThreshold {
                min_quality_score: 50,
                min_match_score: 3,
                require_wireless_phone: false,
            },
            QualityTier::Scale => QualityGateThreshold {
                min_quality_score: 30,
                min_match_score: 3,
                require_wireless_phone: false,
            },
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(QualityTier::Hot),
            "balanced" => Ok(QualityTier::Balanced),
            "scale" => Ok(QualityTier::Scale),
            other => Err(format!("unknown quality tier '{}'", other)),
        }
    }
}

// ============ Output ============

/// Canonical exported lead record.
///
/// Every field is always populated (empty string when unknown) so the export
/// writer never has to special-case missing keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
    pub best_phone: String,
    /// Pipe-joined E.164 numbers.
    pub phones_all: String,
    pub wireless_phones: String,
    pub landline_phones: String,
    pub lead_type: String,
    pub tags: String,
    pub source: String,
    pub match_score: u8,
    pub quality_score: u8,
    pub quality_tier: String,
    pub dnc_status: String,
    pub email_validation_status: String,
}

impl Lead {
    pub fn has_wireless_phone(&self) -> bool {
        !self.wireless_phones.trim().is_empty()
    }

    pub fn has_complete_address(&self) -> bool {
        [&self.address, &self.city, &self.state, &self.zip]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

// ============ Diagnostics ============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScoreDistribution {
    pub score0: usize,
    pub score1: usize,
    pub score2: usize,
    pub score3: usize,
}

/// Batch-level counters. Holds counts only, never field values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub total_fetched: usize,
    pub kept: usize,
    pub filtered_missing_phone: usize,
    pub filtered_invalid_email: usize,
    pub filtered_invalid_email_esp: usize,
    pub filtered_email_too_old: usize,
    pub filtered_dnc: usize,
    pub filtered_low_match_score: usize,
    pub filtered_missing_contact: usize,
    pub missing_name_or_address_count: usize,
    pub match_by_tier: MatchTierCounts,
    pub match_score_distribution: MatchScoreDistribution,
}

impl Diagnostics {
    pub fn record_exclusion(&mut self, reason: ExcludedReason) {
        let counter = match reason {
            ExcludedReason::Dnc => &mut self.filtered_dnc,
            ExcludedReason::InvalidEmail => &mut self.filtered_invalid_email,
            ExcludedReason::InvalidEmailEsp => &mut self.filtered_invalid_email_esp,
            ExcludedReason::EmailTooOld => &mut self.filtered_email_too_old,
            ExcludedReason::MissingPhone => &mut self.filtered_missing_phone,
            ExcludedReason::MissingContact => &mut self.filtered_missing_contact,
            ExcludedReason::LowMatchScore => &mut self.filtered_low_match_score,
        };
        *counter += 1;
    }

    pub fn record_tier(&mut self, tier: MatchTier) {
        match tier {
            MatchTier::High => self.match_by_tier.high += 1,
            MatchTier::Medium => self.match_by_tier.medium += 1,
            MatchTier::Low => self.match_by_tier.low += 1,
        }
    }

    pub fn record_match_score(&mut self, score: u8) {
        match score {
            0 => self.match_score_distribution.score0 += 1,
            1 => self.match_score_distribution.score1 += 1,
            2 => self.match_score_distribution.score2 += 1,
            _ => self.match_score_distribution.score3 += 1,
        }
    }

    /// Sum of every exclusion counter.
    pub fn total_excluded(&self) -> usize {
        self.filtered_missing_phone
            + self.filtered_invalid_email
            + self.filtered_invalid_email_esp
            + self.filtered_email_too_old
            + self.filtered_dnc
            + self.filtered_low_match_score
            + self.filtered_missing_contact
    }
}
