//! Phone parsing and E.164 normalization.
//!
//! Numbers are classified by the field family they came from, not by the
//! number itself: skiptrace wireless fields and the generic mobile field are
//! wireless, landline fields are landline and the generic phone field is
//! "other".
use crate::field_access::get_field;
use crate::models::{ParsedPhones, RawContact, Scope};
use std::collections::HashSet;

const B2C_WIRELESS_FIELDS: &[&str] = &[
    "SKIPTRACE_WIRELESS_NUMBERS",
    "WIRELESS_PHONES",
    "wireless_phones",
];
const B2C_LANDLINE_FIELDS: &[&str] = &[
    "SKIPTRACE_LANDLINE_NUMBERS",
    "LANDLINE_PHONES",
    "landline_phones",
];
const B2B_WIRELESS_FIELDS: &[&str] = &[
    "SKIPTRACE_B2B_WIRELESS",
    "SKIPTRACE_B2B_WIRELESS_NUMBERS",
    "B2B_WIRELESS_PHONES",
];
const B2B_LANDLINE_FIELDS: &[&str] = &[
    "SKIPTRACE_B2B_LANDLINE",
    "SKIPTRACE_B2B_LANDLINE_NUMBERS",
    "B2B_LANDLINE_PHONES",
];
const MOBILE_FIELDS: &[&str] = &["MOBILE_PHONE", "mobile"];
const GENERIC_PHONE_FIELDS: &[&str] = &["PHONE", "phone"];

/// Line type of a resolved number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneKind {
    Wireless,
    Landline,
    Other,
}

/// Normalize a raw phone string to E.164.
///
/// Returns an empty string when fewer than 10 digits remain. Ten digits are
/// treated as a North American number; anything longer is prefixed with `+`
/// as-is (country code assumed present).
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        0..=9 => String::new(),
        10 => format!("+1{}", digits),
        _ => format!("+{}", digits),
    }
}

/// Split a field value that may hold several numbers separated by `,`, `|` or `;`.
pub fn split_phone_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', '|', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn source_fields(scope: Scope) -> Vec<(&'static [&'static str], PhoneKind)> {
    let mut sources = Vec::with_capacity(6);
    if matches!(scope, Scope::Commercial | Scope::Both) {
        sources.push((B2B_WIRELESS_FIELDS, PhoneKind::Wireless));
        sources.push((B2B_LANDLINE_FIELDS, PhoneKind::Landline));
    }
    if matches!(scope, Scope::Residential | Scope::Both) {
        sources.push((B2C_WIRELESS_FIELDS, PhoneKind::Wireless));
        sources.push((B2C_LANDLINE_FIELDS, PhoneKind::Landline));
    }
    sources.push((MOBILE_FIELDS, PhoneKind::Wireless));
    sources.push((GENERIC_PHONE_FIELDS, PhoneKind::Other));
    sources
}

/// Collect, normalize, deduplicate and classify every phone on a contact.
pub fn parse_all_phones(contact: &RawContact, scope: Scope) -> ParsedPhones {
    let mut seen: HashSet<String> = HashSet::new();
    let mut wireless = Vec::new();
    let mut landline = Vec::new();
    let mut other = Vec::new();

    for (fields, kind) in source_fields(scope) {
        for field in fields {
            let Some(raw) = get_field(contact, field) else {
                continue;
            };
            for candidate in split_phone_list(&raw) {
                let normalized = normalize_phone(candidate);
                if normalized.is_empty() || !seen.insert(normalized.clone()) {
                    continue;
                }
                match kind {
                    PhoneKind::Wireless => wireless.push(normalized),
                    PhoneKind::Landline => landline.push(normalized),
                    PhoneKind::Other => other.push(normalized),
                }
            }
        }
    }

    let best = wireless
        .first()
        .or_else(|| landline.first())
        .or_else(|| other.first())
        .cloned()
        .unwrap_or_default();

    let mut all = Vec::with_capacity(wireless.len() + landline.len() + other.len());
    all.extend(wireless.iter().cloned());
    all.extend(landline.iter().cloned());
    all.extend(other);

    ParsedPhones {
        all,
        wireless,
        landline,
        best,
    }
}
