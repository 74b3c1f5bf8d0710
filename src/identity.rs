//! Identity, location and email resolution.
//!
//! Each value is read through a priority cascade: verified offline
//! (skiptrace) fields first, then alternate spellings, then self-reported
//! online fields. Commercial contacts also consider the company address
//! family before the online one.
use crate::field_access::{get_first_field, get_field_or_empty};
use crate::models::{RawContact, Scope};

const FULL_NAME_FIELDS: &[&str] = &["FULL_NAME", "full_name"];
const FIRST_NAME_FIELDS: &[&str] = &["SKIPTRACE_FIRST_NAME", "first_name", "FIRST_NAME"];
const LAST_NAME_FIELDS: &[&str] = &["SKIPTRACE_LAST_NAME", "last_name", "LAST_NAME"];

/// One location attribute and the fields that can carry it, per family.
struct LocationFields {
    verified: &'static [&'static str],
    company: &'static [&'static str],
    online: &'static [&'static str],
}

const ADDRESS: LocationFields = LocationFields {
    verified: &["SKIPTRACE_ADDRESS"],
    company: &["COMPANY_ADDRESS"],
    online: &["PERSONAL_ADDRESS", "ADDRESS", "address"],
};
const CITY: LocationFields = LocationFields {
    verified: &["SKIPTRACE_CITY"],
    company: &["COMPANY_CITY"],
    online: &["PERSONAL_CITY", "CITY", "city"],
};
const STATE: LocationFields = LocationFields {
    verified: &["SKIPTRACE_STATE"],
    company: &["COMPANY_STATE"],
    online: &["PERSONAL_STATE", "STATE", "state"],
};
const ZIP: LocationFields = LocationFields {
    verified: &["SKIPTRACE_ZIP"],
    company: &["COMPANY_ZIP"],
    online: &["PERSONAL_ZIP", "ZIP", "zip"],
};

/// Email field family: address, validation status, last-seen timestamp.
struct EmailFields {
    email: &'static str,
    status: &'static str,
    last_seen: &'static str,
}

const PERSONAL_EMAIL: EmailFields = EmailFields {
    email: "PERSONAL_EMAIL",
    status: "PERSONAL_EMAIL_VALIDATION_STATUS",
    last_seen: "PERSONAL_EMAIL_LAST_SEEN",
};
const BUSINESS_EMAIL: EmailFields = EmailFields {
    email: "BUSINESS_EMAIL",
    status: "BUSINESS_EMAIL_VALIDATION_STATUS",
    last_seen: "BUSINESS_EMAIL_LAST_SEEN",
};
const GENERIC_EMAIL_UPPER: EmailFields = EmailFields {
    email: "EMAIL",
    status: "EMAIL_VALIDATION_STATUS",
    last_seen: "LAST_SEEN",
};
const GENERIC_EMAIL_LOWER: EmailFields = EmailFields {
    email: "email",
    status: "email_validation_status",
    last_seen: "last_seen",
};
const FALLBACK_LAST_SEEN_FIELDS: &[&str] = &["LAST_SEEN", "last_seen"];

/// Highest-confidence validation status the provider reports.
pub const VALID_ESP_STATUS: &str = "Valid (Esp)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub name: ResolvedName,
    pub address: ResolvedAddress,
    /// Both name tokens empty, or no street address. Tracked, never rejected on.
    pub missing_name_or_address: bool,
}

/// The email chosen for a contact plus the signals the recipe checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEmail {
    pub email: String,
    pub validation_status: String,
    pub last_seen: Option<String>,
}

impl ResolvedEmail {
    pub fn is_present(&self) -> bool {
        !self.email.is_empty()
    }

    pub fn is_valid_esp(&self) -> bool {
        self.validation_status
            .trim()
            .eq_ignore_ascii_case(VALID_ESP_STATUS)
    }

    pub fn has_valid_status(&self) -> bool {
        status_is_valid(&self.validation_status)
    }

    /// A status is present and it is not a "valid" one.
    pub fn has_explicit_invalid_status(&self) -> bool {
        !self.validation_status.trim().is_empty() && !self.has_valid_status()
    }
}

/// `true` for any "valid" flavour ("Valid", "Valid (Esp)", ...) but not "Invalid".
pub fn status_is_valid(status: &str) -> bool {
    let lower = status.trim().to_ascii_lowercase();
    lower.contains("valid") && !lower.contains("invalid")
}

/// Split a full name: last token is the last name, the rest is the first name.
pub fn split_full_name(full_name: &str) -> ResolvedName {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, rest)) => ResolvedName {
            first_name: rest.join(" "),
            last_name: (*last).to_string(),
        },
        None => ResolvedName::default(),
    }
}

pub fn resolve_name(contact: &RawContact) -> ResolvedName {
    if let Some(full_name) = get_first_field(contact, FULL_NAME_FIELDS) {
        return split_full_name(&full_name);
    }

    ResolvedName {
        first_name: get_field_or_empty(contact, FIRST_NAME_FIELDS),
        last_name: get_field_or_empty(contact, LAST_NAME_FIELDS),
    }
}

fn resolve_location_field(contact: &RawContact, fields: &LocationFields, scope: Scope) -> String {
    get_first_field(contact, fields.verified)
        .or_else(|| {
            if scope == Scope::Commercial {
                get_first_field(contact, fields.company)
            } else {
                None
            }
        })
        .or_else(|| get_first_field(contact, fields.online))
        .unwrap_or_default()
}

pub fn resolve_address(contact: &RawContact, scope: Scope) -> ResolvedAddress {
    ResolvedAddress {
        address: resolve_location_field(contact, &ADDRESS, scope),
        city: resolve_location_field(contact, &CITY, scope),
        state: resolve_location_field(contact, &STATE, scope),
        zip: resolve_location_field(contact, &ZIP, scope),
    }
}

pub fn resolve_identity(contact: &RawContact, scope: Scope) -> ResolvedIdentity {
    let name = resolve_name(contact);
    let address = resolve_address(contact, scope);
    let missing_name_or_address =
        (name.first_name.is_empty() && name.last_name.is_empty()) || address.address.is_empty();

    ResolvedIdentity {
        name,
        address,
        missing_name_or_address,
    }
}

fn email_families(scope: Scope) -> [&'static EmailFields; 4] {
    match scope {
        Scope::Commercial => [
            &BUSINESS_EMAIL,
            &PERSONAL_EMAIL,
            &GENERIC_EMAIL_UPPER,
            &GENERIC_EMAIL_LOWER,
        ],
        Scope::Residential | Scope::Both => [
            &PERSONAL_EMAIL,
            &BUSINESS_EMAIL,
            &GENERIC_EMAIL_UPPER,
            &GENERIC_EMAIL_LOWER,
        ],
    }
}

fn read_email_candidate(contact: &RawContact, fields: &EmailFields) -> Option<ResolvedEmail> {
    let raw = get_first_field(contact, &[fields.email])?;
    let email = raw
        .split([',', '|', ';'])
        .map(str::trim)
        .find(|s| !s.is_empty())?
        .to_string();

    let last_seen = get_first_field(contact, &[fields.last_seen])
        .or_else(|| get_first_field(contact, FALLBACK_LAST_SEEN_FIELDS));

    Some(ResolvedEmail {
        email,
        validation_status: get_field_or_empty(contact, &[fields.status]),
        last_seen,
    })
}

/// Best email for the scope's field family.
///
/// Candidates are read in family order (business first for commercial,
/// personal first otherwise). An ESP-validated candidate wins, then any
/// validated one, then the first present one.
pub fn resolve_best_email(contact: &RawContact, scope: Scope) -> ResolvedEmail {
    let candidates: Vec<ResolvedEmail> = email_families(scope)
        .iter()
        .filter_map(|fields| read_email_candidate(contact, fields))
        .collect();

    let esp = candidates.iter().position(ResolvedEmail::is_valid_esp);
    let valid = candidates.iter().position(ResolvedEmail::has_valid_status);

    match esp.or(valid) {
        Some(idx) => candidates[idx].clone(),
        None => candidates.into_iter().next().unwrap_or_default(),
    }
}
