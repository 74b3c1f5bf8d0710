//! Field-presence statistics over a batch.
//!
//! Output types hold integers only, so no field value can leak into a
//! coverage report.
use crate::identity::{resolve_best_email, resolve_identity};
use crate::models::{Lead, RawContact, Scope};
use crate::phones::parse_all_phones;
use crate::recipe::effective_scope;
use serde::{Deserialize, Serialize};

/// One integer per tracked field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCounts {
    pub first_name: usize,
    pub last_name: usize,
    pub address: usize,
    pub city: usize,
    pub state: usize,
    pub zip: usize,
    pub phone: usize,
    pub email: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total: usize,
    pub present: FieldCounts,
    /// Percentages rounded to the nearest integer; 0 when `total` is 0.
    pub pct: FieldCounts,
}

/// Coverage before and after recipe filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCoverage {
    pub coverage_fetched: CoverageReport,
    pub coverage_kept: CoverageReport,
}

#[derive(Debug, Clone, Copy, Default)]
struct Presence {
    first_name: bool,
    last_name: bool,
    address: bool,
    city: bool,
    state: bool,
    zip: bool,
    phone: bool,
    email: bool,
}

impl FieldCounts {
    fn add(&mut self, presence: &Presence) {
        self.first_name += usize::from(presence.first_name);
        self.last_name += usize::from(presence.last_name);
        self.address += usize::from(presence.address);
        self.city += usize::from(presence.city);
        self.state += usize::from(presence.state);
        self.zip += usize::from(presence.zip);
        self.phone += usize::from(presence.phone);
        self.email += usize::from(presence.email);
    }

    fn percentages(&self, total: usize) -> FieldCounts {
        FieldCounts {
            first_name: percent(self.first_name, total),
            last_name: percent(self.last_name, total),
            address: percent(self.address, total),
            city: percent(self.city, total),
            state: percent(self.state, total),
            zip: percent(self.zip, total),
            phone: percent(self.phone, total),
            email: percent(self.email, total),
        }
    }
}

/// `count / total` as a rounded percentage, 0 for an empty batch.
pub fn percent(count: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as usize
}

fn build_report(presences: impl Iterator<Item = Presence>) -> CoverageReport {
    let mut total = 0;
    let mut present = FieldCounts::default();
    for presence in presences {
        total += 1;
        present.add(&presence);
    }

    CoverageReport {
        total,
        pct: present.percentages(total),
        present,
    }
}

/// Coverage of raw provider contacts, using the same resolution cascade the
/// recipe uses. Reflects what could be extracted, not what was kept.
pub fn compute_contacts_coverage(contacts: &[RawContact], scope: Scope) -> CoverageReport {
    build_report(contacts.iter().enumerate().map(|(index, contact)| {
        let scope = effective_scope(scope, index);
        let identity = resolve_identity(contact, scope);
        Presence {
            first_name: !identity.name.first_name.is_empty(),
            last_name: !identity.name.last_name.is_empty(),
            address: !identity.address.address.is_empty(),
            city: !identity.address.city.is_empty(),
            state: !identity.address.state.is_empty(),
            zip: !identity.address.zip.is_empty(),
            phone: !parse_all_phones(contact, scope).is_empty(),
            email: resolve_best_email(contact, scope).is_present(),
        }
    }))
}

/// Coverage of mapped leads by plain presence checks.
pub fn compute_leads_coverage(leads: &[Lead]) -> CoverageReport {
    let filled = |value: &str| !value.trim().is_empty();
    build_report(leads.iter().map(|lead| Presence {
        first_name: filled(&lead.first_name),
        last_name: filled(&lead.last_name),
        address: filled(&lead.address),
        city: filled(&lead.city),
        state: filled(&lead.state),
        zip: filled(&lead.zip),
        phone: filled(&lead.phone),
        email: filled(&lead.email),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_batch_is_zero() {
        let report = compute_contacts_coverage(&[], Scope::Residential);
        assert_eq!(report.total, 0);
        assert_eq!(report.pct, FieldCounts::default());
        assert_eq!(compute_leads_coverage(&[]).pct.phone, 0);
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn test_contacts_coverage_uses_cascade() {
        let contacts = vec![
            RawContact::from(json!({
                "fields": {"FULL_NAME": "Ana Lima"},
                "SKIPTRACE_WIRELESS_NUMBERS": "3055550001",
                "PERSONAL_ZIP": "33139",
            })),
            RawContact::from(json!({
                "phone": "123",
                "data": {"EMAIL": "x@example.com"},
            })),
            RawContact::from(json!({})),
        ];
        let report = compute_contacts_coverage(&contacts, Scope::Residential);

        assert_eq!(report.total, 3);
        assert_eq!(report.present.first_name, 1);
        assert_eq!(report.present.last_name, 1);
        assert_eq!(report.present.zip, 1);
        assert_eq!(report.present.phone, 1);
        assert_eq!(report.present.email, 1);
        assert_eq!(report.present.address, 0);
        assert_eq!(report.pct.phone, 33);
    }

    #[test]
    fn test_leads_coverage() {
        let leads = vec![
            Lead {
                first_name: "Ana".to_string(),
                phone: "+13055550001".to_string(),
                ..Lead::default()
            },
            Lead {
                email: "a@b.com".to_string(),
                phone: "+13055550002".to_string(),
                ..Lead::default()
            },
        ];
        let report = compute_leads_coverage(&leads);
        assert_eq!(report.present.phone, 2);
        assert_eq!(report.pct.phone, 100);
        assert_eq!(report.pct.first_name, 50);
        assert_eq!(report.pct.email, 50);
        assert_eq!(report.pct.city, 0);
    }

    #[test]
    fn test_report_never_contains_values() {
        let contacts = vec![RawContact::from(json!({
            "FIRST_NAME": "SECRET_XYZ",
            "PERSONAL_EMAIL": "SECRET_XYZ@example.com",
            "profile": {"CITY": "SECRET_XYZ"},
        }))];
        let serialized =
            serde_json::to_string(&compute_contacts_coverage(&contacts, Scope::Both)).unwrap();
        assert!(!serialized.contains("SECRET_XYZ"));
    }
}
