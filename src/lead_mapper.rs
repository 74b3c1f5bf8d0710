//! Assembles the exported [`Lead`] from an accepted contact.
//!
//! Purely structural. Every field ends up populated, empty string at worst.
use crate::identity::{ResolvedEmail, ResolvedIdentity};
use crate::models::{Lead, ParsedPhones, QualityTier, Scope};

/// Separator for multi-value phone columns.
pub const PHONE_SEPARATOR: &str = "|";

/// Everything the recipe resolved for a contact it accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedContact {
    pub identity: ResolvedIdentity,
    pub phones: ParsedPhones,
    pub email: ResolvedEmail,
    pub effective_scope: Scope,
    pub match_score: u8,
    pub dnc_status: String,
}

pub fn join_phones(phones: &[String]) -> String {
    phones.join(PHONE_SEPARATOR)
}

/// Build the lead record. Quality fields start at zero/empty until scored.
pub fn build_lead(accepted: &AcceptedContact, lead_request: &str, source: &str) -> Lead {
    let name = &accepted.identity.name;
    let address = &accepted.identity.address;
    let phones = &accepted.phones;

    Lead {
        first_name: name.first_name.clone(),
        last_name: name.last_name.clone(),
        address: address.address.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.zip.clone(),
        phone: phones.best.clone(),
        email: accepted.email.email.clone(),
        best_phone: phones.best.clone(),
        phones_all: join_phones(&phones.all),
        wireless_phones: join_phones(&phones.wireless),
        landline_phones: join_phones(&phones.landline),
        lead_type: accepted.effective_scope.as_str().to_string(),
        tags: lead_request.to_string(),
        source: source.to_string(),
        match_score: accepted.match_score,
        quality_score: 0,
        quality_tier: String::new(),
        dnc_status: accepted.dnc_status.clone(),
        email_validation_status: accepted.email.validation_status.clone(),
    }
}

/// Write scorer output onto a lead.
pub fn annotate_quality(lead: &mut Lead, quality_score: u8, tier: QualityTier) {
    lead.quality_score = quality_score;
    lead.quality_tier = tier.as_str().to_string();
}
