// Axum API Server Module
//
// Purpose: REST API over the soil suitability engine
// Endpoints: health check, single analysis, batch analysis (Rayon fan-out)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::SoilAnalyzer;
use crate::config::ServerConfig;
use crate::sample::RawSoilInput;
use crate::thresholds::Thresholds;
use crate::validation::{validate, InputError};

/// Upper bound on samples per batch request
pub const MAX_BATCH_SIZE: usize = 1000;

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<SoilAnalyzer>,
    /// Serialized results keyed by the canonical JSON of the parsed sample
    pub cache: Cache<String, serde_json::Value>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(thresholds: Thresholds) -> Self {
        Self::with_cache(
            thresholds,
            crate::config::DEFAULT_CACHE_CAPACITY,
            Duration::from_secs(crate::config::DEFAULT_CACHE_TTL_SECS),
        )
    }

    pub fn with_cache(thresholds: Thresholds, capacity: u64, ttl: Duration) -> Self {
        tracing::info!("Initializing Moka cache ({} entries, {:?} TTL)...", capacity, ttl);
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self {
            analyzer: Arc::new(SoilAnalyzer::new(thresholds)),
            cache,
            allowed_origins: Arc::new(Vec::new()),
        }
    }

    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let thresholds = config.load_thresholds()?;
        let mut state = Self::with_cache(thresholds, config.cache_capacity, config.cache_ttl);
        state.allowed_origins = Arc::new(config.allowed_origins.clone());
        Ok(state)
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/analyze-suitability", post(analyze_suitability))
        .route("/api/analyze-suitability/batch", post(analyze_suitability_batch))
        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(cors)
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

/// Permissive CORS when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Soil suitability analysis API is running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Analyze one sample
///
/// POST /api/analyze-suitability
/// Body: { "soil_data": { "LL": 45, "PL": 22, "F": 60, ... } }
async fn analyze_suitability(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;

    // Validation is cheap; run it inline so the cache key is the parsed sample
    let validated = validate(&req.soil_data, state.analyzer.thresholds())?;
    let cache_key = format!(
        "analysis:{}",
        serde_json::to_string(validated.sample()).map_err(|e| AppError::Internal(e.to_string()))?
    );

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Cache hit: {}", cache_key);
        return Ok(Json(cached));
    }

    let analyzer = Arc::clone(&state.analyzer);
    let result = tokio::task::spawn_blocking(move || analyzer.analyze_validated(&validated))
        .await
        .map_err(|e| AppError::Internal(format!("Analysis task failed: {}", e)))?;

    tracing::info!(
        "Analysis complete: {} / {}",
        result.classification.symbol(),
        result.suitability
    );

    let value = serde_json::to_value(&result).map_err(|e| AppError::Internal(e.to_string()))?;
    state.cache.insert(cache_key, value.clone()).await;

    Ok(Json(value))
}

/// Analyze many samples
///
/// POST /api/analyze-suitability/batch
/// Body: { "samples": [ { "LL": 45, ... }, ... ] }
///
/// One entry per sample in input order; a rejected sample does not fail the batch.
/// RAYON: CPU parallelism via par_iter on the blocking pool
async fn analyze_suitability_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(req) = payload?;
    let samples = req.samples;

    if samples.len() > MAX_BATCH_SIZE {
        return Err(AppError::BadRequest(format!(
            "batch of {} samples exceeds limit of {}",
            samples.len(),
            MAX_BATCH_SIZE
        )));
    }

    let start = std::time::Instant::now();
    tracing::info!("Batch analysis for {} samples", samples.len());

    let analyzer = Arc::clone(&state.analyzer);
    let outcomes = tokio::task::spawn_blocking(move || analyzer.analyze_batch(&samples))
        .await
        .map_err(|e| AppError::Internal(format!("Batch task failed: {}", e)))?;

    let mut analyzed = 0usize;
    let mut results = Vec::with_capacity(outcomes.len());
    for (index, outcome) in outcomes.into_iter().enumerate() {
        let entry = match outcome {
            Ok(result) => {
                analyzed += 1;
                serde_json::json!({
                    "index": index,
                    "ok": true,
                    "result": result,
                })
            }
            Err(e) => {
                let mut body = input_error_body(&e);
                body["index"] = serde_json::json!(index);
                body["ok"] = serde_json::json!(false);
                body
            }
        };
        results.push(entry);
    }

    tracing::info!(
        "Batch complete in {:?}: {} analyzed, {} rejected",
        start.elapsed(),
        analyzed,
        results.len() - analyzed
    );

    Ok(Json(serde_json::json!({
        "results": results,
        "summary": {
            "total": results.len(),
            "analyzed": analyzed,
            "rejected": results.len() - analyzed,
        }
    })))
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(serde::Deserialize, Debug)]
struct AnalyzeRequest {
    /// Missing object is treated as "no parameters supplied"
    #[serde(default)]
    soil_data: RawSoilInput,
}

#[derive(serde::Deserialize, Debug)]
struct BatchAnalyzeRequest {
    #[serde(default)]
    samples: Vec<RawSoilInput>,
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Input(InputError),
    Payload(JsonRejection),
    BadRequest(String),
    Internal(String),
}

impl From<InputError> for AppError {
    fn from(e: InputError) -> Self {
        AppError::Input(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Payload(e)
    }
}

/// `{"error", "kind", "fields"}` body for an input error
fn input_error_body(e: &InputError) -> serde_json::Value {
    let mut body = serde_json::json!({
        "error": e.to_string(),
        "kind": e.kind(),
    });
    if let InputError::InvalidValues(violations) = e {
        body["fields"] = serde_json::json!(violations);
    }
    body
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            AppError::Input(e) => {
                let status = match e {
                    InputError::NoParameters => StatusCode::BAD_REQUEST,
                    InputError::InvalidValues(_) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, input_error_body(&e))
            }
            AppError::Payload(rejection) => (
                rejection.status(),
                serde_json::json!({ "error": rejection.body_text(), "kind": "malformed_request" }),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": msg, "kind": "bad_request" }),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": msg, "kind": "internal" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
