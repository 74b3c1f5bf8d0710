//! Field lookup across the provider's inconsistent record shapes.
//!
//! A field may sit at the root of a contact or inside one of the nested
//! `fields`, `data` or `profile` objects. Lookups walk [`LOOKUP_ORDER`] and
//! return the first present value. `null`, empty and whitespace-only values
//! are absent everywhere, so downstream presence checks only test `Option`.
use crate::models::RawContact;
use serde_json::{Map, Value};

/// Where a field can live inside a contact record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldContainer {
    Root,
    Fields,
    Data,
    Profile,
}

/// Fixed precedence: root beats every nested container.
pub const LOOKUP_ORDER: [FieldContainer; 4] = [
    FieldContainer::Root,
    FieldContainer::Fields,
    FieldContainer::Data,
    FieldContainer::Profile,
];

impl FieldContainer {
    /// Key of the nested object, `None` for the root.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            FieldContainer::Root => None,
            FieldContainer::Fields => Some("fields"),
            FieldContainer::Data => Some("data"),
            FieldContainer::Profile => Some("profile"),
        }
    }

    fn resolve<'a>(&self, contact: &'a RawContact) -> Option<&'a Map<String, Value>> {
        match self.key() {
            None => Some(contact.as_map()),
            Some(key) => contact.as_map().get(key).and_then(Value::as_object),
        }
    }
}

/// Read a field as a trimmed string, or `None` when absent.
pub fn get_field(contact: &RawContact, name: &str) -> Option<String> {
    LOOKUP_ORDER.iter().find_map(|container| {
        container
            .resolve(contact)
            .and_then(|map| map.get(name))
            .and_then(value_to_string)
    })
}

/// First present field among `names`, tried in order.
pub fn get_first_field(contact: &RawContact, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| get_field(contact, name))
}

/// Like [`get_first_field`] but defaults to an empty string.
pub fn get_field_or_empty(contact: &RawContact, names: &[&str]) -> String {
    get_first_field(contact, names).unwrap_or_default()
}

pub fn has_field(contact: &RawContact, name: &str) -> bool {
    get_field(contact, name).is_some()
}

fn value_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null | Value::Object(_) => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Lists of scalars are flattened into a comma-separated string.
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
