use crate::audience_cache::{fetch_with_cache, AudienceCache};
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{ScopeContext, ScoreContactsRequest, TargetingRequest};
use crate::pipeline::{run_pipeline, PipelineOutput};
use crate::provider_client::AudienceProviderClient;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Highest accepted `min_match_score_override`; the classifier emits 0..=3.
pub const MAX_MATCH_SCORE_OVERRIDE: u8 = 3;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the audience provider.
    pub provider_client: AudienceProviderClient,
    /// Provider pull cache, keyed by targeting fingerprint.
    pub audience_cache: AudienceCache,
}

/// Pipeline output tagged with a per-request id for log correlation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadGenerationResponse {
    pub request_id: String,
    #[serde(flatten)]
    pub output: PipelineOutput,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lead-recipe-engine",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

fn is_five_digit_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}

/// Validates a targeting request and turns it into a pipeline context.
///
/// `require_zips` is set for provider pulls, which cannot run without a
/// geography.
pub fn validate_targeting(
    request: &TargetingRequest,
    require_zips: bool,
) -> Result<ScopeContext, AppError> {
    if request.requested_count == 0 {
        return Err(AppError::BadRequest(
            "requested_count must be greater than zero".to_string(),
        ));
    }

    if let Some(score) = request.min_match_score_override {
        if score > MAX_MATCH_SCORE_OVERRIDE {
            return Err(AppError::BadRequest(format!(
                "min_match_score_override must be between 0 and {}",
                MAX_MATCH_SCORE_OVERRIDE
            )));
        }
    }

    let zips: Vec<String> = request.zips.iter().map(|z| z.trim().to_string()).collect();
    if let Some(bad) = zips.iter().find(|z| !is_five_digit_zip(z)) {
        return Err(AppError::BadRequest(format!(
            "Invalid ZIP code '{}': expected 5 digits",
            bad
        )));
    }
    if require_zips && zips.is_empty() {
        return Err(AppError::BadRequest(
            "At least one ZIP code is required".to_string(),
        ));
    }

    Ok(
        ScopeContext::new(request.lead_request.trim(), request.scope, request.use_case)
            .with_zips(zips)
            .with_requested_count(request.requested_count)
            .with_min_match_score_override(request.min_match_score_override),
    )
}

/// POST /api/v1/leads/generate
///
/// Pulls an audience from the provider (through the cache) and runs the
/// lead pipeline over it.
pub async fn generate_leads(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TargetingRequest>,
) -> Result<Json<LeadGenerationResponse>, AppError> {
    let request_id = Uuid::new_v4().to_string();
    let context = validate_targeting(&request, true)?;

    tracing::info!(
        "[{}] POST /leads/generate - scope={}, use_case={}, {} zip(s), requested={}",
        request_id,
        context.scope,
        context.use_case,
        context.zips.len(),
        context.requested_count
    );

    let contacts = fetch_with_cache(&state.audience_cache, &state.provider_client, &context)
        .await
        .with_context(|| format!("[{}] Audience pull failed", request_id))?;

    let pipeline_config = state.config.pipeline_config(request.quality_tier);
    let output = run_pipeline(&contacts, &context, &pipeline_config);

    tracing::info!(
        "[{}] Delivered {} lead(s) from {} fetched contact(s)",
        request_id,
        output.leads.len(),
        output.diagnostics.total_fetched
    );

    Ok(Json(LeadGenerationResponse { request_id, output }))
}

/// POST /api/v1/leads/score
///
/// Runs the lead pipeline over contacts supplied by the caller; no provider
/// call is made.
pub async fn score_contacts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreContactsRequest>,
) -> Result<Json<LeadGenerationResponse>, AppError> {
    let request_id = Uuid::new_v4().to_string();
    let context = validate_targeting(&request.targeting, false)?;

    tracing::info!(
        "[{}] POST /leads/score - {} contact(s), scope={}, use_case={}, requested={}",
        request_id,
        request.contacts.len(),
        context.scope,
        context.use_case,
        context.requested_count
    );

    let pipeline_config = state.config.pipeline_config(request.targeting.quality_tier);
    let output = run_pipeline(&request.contacts, &context, &pipeline_config);

    Ok(Json(LeadGenerationResponse { request_id, output }))
}

/// Lead routes, without `/health` and without the middleware stack.
pub fn lead_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/leads/generate", post(generate_leads))
        .route("/api/v1/leads/score", post(score_contacts))
}

/// Full route table bound to `state`, for callers that add their own layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(lead_routes())
        .with_state(state)
}
