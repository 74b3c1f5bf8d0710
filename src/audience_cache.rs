use crate::errors::AppError;
use crate::models::{RawContact, ScopeContext};
use crate::provider_client::AudienceProviderClient;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Provider pulls keyed by targeting fingerprint; values are serialized
/// [`ValidatedAudienceEntry`] JSON.
pub type AudienceCache = Cache<String, String>;

pub fn build_audience_cache(ttl: Duration, max_capacity: u64) -> AudienceCache {
    Cache::builder()
        .time_to_live(ttl)
        .max_capacity(max_capacity)
        .build()
}

fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cache key for a provider pull.
///
/// Only the inputs sent to the provider take part; use case, requested count
/// and match override act on the pulled batch and must share an entry.
/// The intent is compared case-insensitively after trimming.
pub fn audience_cache_key(context: &ScopeContext) -> String {
    let fingerprint = format!(
        "{}|{}|{}",
        context.lead_request.trim().to_lowercase(),
        context.zips.join(","),
        context.scope
    );
    format!("audience:{}", sha256_hex(&fingerprint))
}

/// A cached provider pull with its SHA-256 checksum.
///
/// Entries whose checksum no longer matches are discarded and refetched.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidatedAudienceEntry {
    /// Contacts as a JSON array string.
    pub contacts: String,
    /// Hex-encoded SHA-256 of `contacts`.
    pub checksum: String,
}

impl ValidatedAudienceEntry {
    pub fn new(contacts: &[RawContact]) -> Result<Self, AppError> {
        let contacts = serde_json::to_string(contacts)?;
        let checksum = sha256_hex(&contacts);
        Ok(Self { contacts, checksum })
    }

    pub fn is_valid(&self) -> bool {
        sha256_hex(&self.contacts) == self.checksum
    }

    pub fn serialize(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns the contacts only if the entry parses and its checksum matches.
    pub fn deserialize_and_validate(serialized: &str) -> Option<Vec<RawContact>> {
        let entry: ValidatedAudienceEntry = serde_json::from_str(serialized).ok()?;

        if !entry.is_valid() {
            tracing::warn!(
                "Audience cache validation failed: checksum mismatch ({} bytes)",
                entry.contacts.len()
            );
            return None;
        }

        serde_json::from_str(&entry.contacts).ok()
    }
}

/// Serve a provider pull from cache, falling back to the provider.
///
/// Corrupt entries are evicted. Empty pulls are not cached.
pub async fn fetch_with_cache(
    cache: &AudienceCache,
    client: &AudienceProviderClient,
    context: &ScopeContext,
) -> Result<Vec<RawContact>, AppError> {
    let key = audience_cache_key(context);

    if let Some(cached) = cache.get(&key).await {
        match ValidatedAudienceEntry::deserialize_and_validate(&cached) {
            Some(contacts) => {
                tracing::info!("Audience cache HIT ({} contact(s))", contacts.len());
                return Ok(contacts);
            }
            None => {
                tracing::warn!("Discarding invalid audience cache entry");
                cache.invalidate(&key).await;
            }
        }
    }

    tracing::debug!("Audience cache MISS");
    let contacts = client.fetch_contacts(context).await?;

    if !contacts.is_empty() {
        let entry = ValidatedAudienceEntry::new(&contacts)?;
        cache.insert(key, entry.serialize()?).await;
    }

    Ok(contacts)
}
