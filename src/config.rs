use crate::models::QualityTier;
use crate::pipeline::PipelineConfig;
use serde::Deserialize;

/// Values of `CALL_SUPPRESS_STATES` that turn call suppression off entirely.
const DISABLED_SUPPRESSION_VALUES: &[&str] = &["none", "off", "disabled"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub audience_api_base_url: String,
    pub audience_api_key: String,
    /// Written to `Lead.source` on every exported lead.
    pub audience_provider_name: String,
    pub audience_page_size: usize,
    pub audience_max_pages: usize,
    pub audience_cache_ttl_secs: u64,
    pub quality_tier: QualityTier,
    /// `None` keeps the built-in default list; `Some(vec![])` disables suppression.
    pub call_suppress_states: Option<Vec<String>>,
}

/// Parse a `CALL_SUPPRESS_STATES` value.
///
/// Unset or blank keeps the default list. `none`, `off` or `disabled` yield an
/// empty list. Anything else is a comma-separated list of state codes.
pub fn parse_suppress_states(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if DISABLED_SUPPRESSION_VALUES
        .iter()
        .any(|v| raw.eq_ignore_ascii_case(v))
    {
        return Some(Vec::new());
    }
    Some(
        raw.split(',')
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn parse_positive(name: &str, raw: Option<String>, default: u64) -> anyhow::Result<u64> {
    let value = match raw.filter(|s| !s.trim().is_empty()) {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{} must be a positive integer", name))?,
        None => default,
    };
    if value == 0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            audience_api_base_url: std::env::var("AUDIENCE_API_BASE_URL")
                .map_err(|_| anyhow::anyhow!("AUDIENCE_API_BASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("AUDIENCE_API_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("AUDIENCE_API_BASE_URL must start with http:// or https://");
                    }
                    url::Url::parse(&url).map_err(|e| {
                        anyhow::anyhow!("AUDIENCE_API_BASE_URL is not a valid URL: {}", e)
                    })?;
                    Ok(url.trim_end_matches('/').to_string())
                })?,
            audience_api_key: std::env::var("AUDIENCE_API_KEY")
                .map_err(|_| anyhow::anyhow!("AUDIENCE_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("AUDIENCE_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            audience_provider_name: std::env::var("AUDIENCE_PROVIDER_NAME")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "audiencelab".to_string()),
            audience_page_size: parse_positive(
                "AUDIENCE_PAGE_SIZE",
                std::env::var("AUDIENCE_PAGE_SIZE").ok(),
                500,
            )? as usize,
            audience_max_pages: parse_positive(
                "AUDIENCE_MAX_PAGES",
                std::env::var("AUDIENCE_MAX_PAGES").ok(),
                20,
            )? as usize,
            audience_cache_ttl_secs: parse_positive(
                "AUDIENCE_CACHE_TTL_SECS",
                std::env::var("AUDIENCE_CACHE_TTL_SECS").ok(),
                3600,
            )?,
            quality_tier: match std::env::var("QUALITY_TIER") {
                Ok(raw) if !raw.trim().is_empty() => raw
                    .parse::<QualityTier>()
                    .map_err(|e| anyhow::anyhow!("QUALITY_TIER: {}", e))?,
                _ => QualityTier::default(),
            },
            call_suppress_states: parse_suppress_states(
                std::env::var("CALL_SUPPRESS_STATES").ok().as_deref(),
            ),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Audience API Base URL: {}", config.audience_api_base_url);
        tracing::debug!(
            "Audience paging: {} per page, max {} pages, cache TTL {}s",
            config.audience_page_size,
            config.audience_max_pages,
            config.audience_cache_ttl_secs
        );
        tracing::debug!("Default quality tier: {}", config.quality_tier);
        match &config.call_suppress_states {
            Some(states) if states.is_empty() => {
                tracing::warn!("Call state suppression disabled by configuration")
            }
            Some(states) => tracing::info!("Call suppression states: {}", states.join(",")),
            None => tracing::debug!("Call suppression states: default"),
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Per-request pipeline settings; a request-level tier wins over the default.
    pub fn pipeline_config(&self, quality_tier: Option<QualityTier>) -> PipelineConfig {
        PipelineConfig::new(self.audience_provider_name.clone())
            .with_quality_tier(quality_tier.unwrap_or(self.quality_tier))
            .with_suppress_states(self.call_suppress_states.clone())
    }
}
