use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{RawContact, Scope, ScopeContext};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search endpoint path, relative to the provider base URL.
pub const AUDIENCE_SEARCH_PATH: &str = "/v1/audiences/search";

/// Body of one audience search page request.
#[derive(Debug, Clone, Serialize)]
pub struct AudienceSearchRequest<'a> {
    pub intent: &'a str,
    pub zips: &'a [String],
    pub b2c: bool,
    pub b2b: bool,
    pub page: usize,
    pub page_size: usize,
}

impl<'a> AudienceSearchRequest<'a> {
    pub fn for_context(context: &'a ScopeContext, page: usize, page_size: usize) -> Self {
        Self {
            intent: &context.lead_request,
            zips: &context.zips,
            b2c: matches!(context.scope, Scope::Residential | Scope::Both),
            b2b: matches!(context.scope, Scope::Commercial | Scope::Both),
            page,
            page_size,
        }
    }
}

/// One page of provider results.
///
/// Providers disagree on the list key, so `contacts` and `results` are
/// accepted as aliases of `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudiencePage {
    #[serde(default, alias = "contacts", alias = "results")]
    pub data: Vec<RawContact>,
    #[serde(default)]
    pub total_pages: Option<usize>,
}

/// Client for the audience/identity-resolution provider.
///
/// Pages are fetched one after another; there is no retry, a failed page
/// fails the whole pull.
#[derive(Clone)]
pub struct AudienceProviderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: usize,
    max_pages: usize,
}

impl AudienceProviderClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        page_size: usize,
        max_pages: usize,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create audience client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            page_size: page_size.max(1),
            max_pages: max_pages.max(1),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.audience_api_base_url.clone(),
            config.audience_api_key.clone(),
            config.audience_page_size,
            config.audience_max_pages,
        )
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Fetches a single page (1-based).
    pub async fn fetch_page(
        &self,
        context: &ScopeContext,
        page: usize,
    ) -> Result<AudiencePage, AppError> {
        let url = format!("{}{}", self.base_url, AUDIENCE_SEARCH_PATH);
        let body = AudienceSearchRequest::for_context(context, page, self.page_size);
        tracing::debug!(
            "Requesting audience page {} ({} zip(s), scope={})",
            page,
            context.zips.len(),
            context.scope
        );

        let response = self
            .client
            .post(&url)
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Audience request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Audience provider returned {}: {}",
                status, error_text
            )));
        }

        response.json::<AudiencePage>().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse audience response: {}", e))
        })
    }

    /// Pulls every contact for `context`.
    ///
    /// Stops at the first empty page, a short page, the provider's reported
    /// last page, or the configured page cap, whichever comes first.
    pub async fn fetch_contacts(&self, context: &ScopeContext) -> Result<Vec<RawContact>, AppError> {
        let mut contacts: Vec<RawContact> = Vec::new();

        for page in 1..=self.max_pages {
            let result = self
                .fetch_page(context, page)
                .await
                .with_context(|| format!("Fetching audience page {}", page))?;

            let received = result.data.len();
            contacts.extend(result.data);

            if received == 0 || received < self.page_size {
                break;
            }
            if let Some(total) = result.total_pages {
                if page >= total {
                    break;
                }
            }
            if page == self.max_pages {
                tracing::warn!(
                    "Audience pull stopped at page cap ({}); more results may exist",
                    self.max_pages
                );
            }
        }

        tracing::info!(
            "Fetched {} contact(s) from audience provider for {} zip(s)",
            contacts.len(),
            context.zips.len()
        );

        Ok(contacts)
    }
}
