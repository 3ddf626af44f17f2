//! JSON routes served by `agroprice-server`.
//!
//! - `GET  /`                 service index
//! - `GET  /health`           readiness check
//! - `GET  /predict`          usage information for the prediction endpoint
//! - `POST /predict`          price forecast for one market/commodity/date
//! - `POST /recommendations`  sell/hold advice from a predicted and previous price
//! - `POST /micro-market`     localized estimates across nearby markets
//! - `POST /format`           render a prediction for SMS, WhatsApp or a bulletin
//! - `POST /explainability`   factor attribution for a prediction
//! - `POST /feedback`         record user feedback
//! - `GET  /impact-stats`     aggregate usage figures

use agroprice_core::{
    explain, forecast, ActionType, ApplicationError, Commodity, ConfidenceLevel, Explanation,
    ExplanationRequest, FeedbackReceipt, FeedbackSubmission, Forecast, ForecastRequest,
    FormattedMessage, ImpactStats, MicroMarketInput, MicroMarketResult, PredictionRecord,
    RecommendationInput,
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::bootstrap::AppState;
use crate::error::{ApiError, ApiJson, CorrelationId};
use crate::health;

pub fn router(state: AppState, cors_allow_any_origin: bool) -> Router {
    let router = Router::new()
        .route("/", get(index))
        .route("/health", get(health::health))
        .route("/predict", get(predict_usage).post(predict))
        .route("/recommendations", post(recommend))
        .route("/micro-market", post(micro_market))
        .route("/format", post(format_message))
        .route("/explainability", post(explainability))
        .route("/feedback", post(feedback))
        .route("/impact-stats", get(impact_stats))
        .with_state(state);

    if cors_allow_any_origin {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub commodity: String,
    pub market: String,
    pub admin1: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub predicted_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub previous_price: Decimal,
    pub pricetype: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub commodity: String,
    pub market: String,
    pub recommendations: Vec<String>,
    pub action_type: ActionType,
    pub confidence: ConfidenceLevel,
    pub rationale: String,
}

#[derive(Debug, Deserialize)]
pub struct MicroMarketRequest {
    pub commodity: String,
    pub region: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub radius_km: Option<Decimal>,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct MicroMarketResponse {
    pub commodity: String,
    pub region: String,
    #[serde(flatten)]
    pub result: MicroMarketResult,
}

#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    pub prediction_data: PredictionRecord,
    pub format_type: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "english".to_string()
}

fn example_prediction_request() -> Value {
    json!({
        "date": "2025-12-05",
        "admin1": "Nairobi",
        "market": "Wakulima (Nairobi)",
        "commodity": "cabbage",
        "pricetype": "retail",
        "previous_month_price": 100.0
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Kenyan Agro Market Price Prediction API",
        "endpoints": {
            "/predict": "POST - Make price predictions",
            "/recommendations": "POST - Get actionable recommendations based on predictions",
            "/micro-market": "POST - Get localized/micro-market forecasting",
            "/format": "POST - Format predictions for SMS, WhatsApp or bulletin boards",
            "/explainability": "POST - Explain which factors drove a prediction",
            "/feedback": "POST - Submit user feedback on predictions",
            "/impact-stats": "GET - View aggregated impact statistics",
            "/health": "GET - Service readiness"
        },
        "example_request": example_prediction_request(),
        "supported_commodities": Commodity::allowed_names(),
    }))
}

async fn predict_usage() -> Json<Value> {
    Json(json!({
        "error": "Method Not Allowed",
        "message": "This endpoint only accepts POST requests",
        "usage": {
            "method": "POST",
            "url": "/predict",
            "content_type": "application/json",
            "example_request": example_prediction_request(),
        },
        "supported_commodities": Commodity::allowed_names(),
    }))
}

async fn predict(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<ForecastRequest>,
) -> Result<Json<Forecast>, ApiError> {
    let prediction = forecast(state.model.as_ref(), state.thresholds, &request).map_err(|error| {
        ApiError::from_application("api.predict.failed", &correlation_id, error.into())
    })?;

    info!(
        event_name = "api.predict.completed",
        correlation_id = correlation_id.as_str(),
        commodity = %prediction.commodity,
        market = %prediction.market,
        unreasonable = prediction.unreasonable,
        "prediction served"
    );
    Ok(Json(prediction))
}

async fn recommend(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let input = RecommendationInput {
        commodity: &request.commodity,
        predicted_price: request.predicted_price,
        previous_price: request.previous_price,
        price_type: &request.pricetype,
    };
    let result = state.recommender.recommend(&input).map_err(|error| {
        ApiError::from_application("api.recommend.failed", &correlation_id, error.into())
    })?;

    info!(
        event_name = "api.recommend.completed",
        correlation_id = correlation_id.as_str(),
        commodity = %request.commodity,
        region = %request.admin1,
        action_type = ?result.action_type,
        price_change_pct = %result.price_change_pct,
        "recommendation served"
    );
    Ok(Json(RecommendationResponse {
        commodity: request.commodity,
        market: request.market,
        recommendations: result.recommendations,
        action_type: result.action_type,
        confidence: result.confidence,
        rationale: result.rationale,
    }))
}

async fn micro_market(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<MicroMarketRequest>,
) -> Result<Json<MicroMarketResponse>, ApiError> {
    let input = MicroMarketInput {
        commodity: &request.commodity,
        region: &request.region,
        radius_km: request.radius_km,
        date: &request.date,
    };
    let result = state.micro_markets.estimate(&input).map_err(|error| {
        ApiError::from_application("api.micro_market.failed", &correlation_id, error.into())
    })?;

    info!(
        event_name = "api.micro_market.completed",
        correlation_id = correlation_id.as_str(),
        commodity = %request.commodity,
        region = %request.region,
        recommended_market = %result.recommended_market,
        "micro-market estimate served"
    );
    Ok(Json(MicroMarketResponse {
        commodity: request.commodity,
        region: request.region,
        result,
    }))
}

async fn format_message(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<FormatRequest>,
) -> Result<Json<FormattedMessage>, ApiError> {
    let message =
        state.formatter.format(&request.prediction_data, &request.format_type).map_err(|error| {
            ApiError::from_application("api.format.failed", &correlation_id, error.into())
        })?;

    info!(
        event_name = "api.format.completed",
        correlation_id = correlation_id.as_str(),
        format_type = %message.format_type,
        language = %request.language,
        character_count = message.character_count,
        "prediction formatted"
    );
    Ok(Json(message))
}

async fn explainability(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<ExplanationRequest>,
) -> Result<Json<Explanation>, ApiError> {
    let explanation = explain(state.attribution.as_ref(), &request).map_err(|error| {
        ApiError::from_application("api.explainability.failed", &correlation_id, error.into())
    })?;

    info!(
        event_name = "api.explainability.completed",
        correlation_id = correlation_id.as_str(),
        commodity = %explanation.commodity,
        factors = explanation.top_influencing_factors.len(),
        "explanation served"
    );
    Ok(Json(explanation))
}

async fn feedback(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(submission): ApiJson<FeedbackSubmission>,
) -> Result<Json<FeedbackReceipt>, ApiError> {
    let record = submission.validate(Utc::now()).map_err(|error| {
        ApiError::from_application("api.feedback.rejected", &correlation_id, error.into())
    })?;
    let timestamp = record.timestamp.clone();

    let feedback_id = state.feedback.store(record).await.map_err(|error| {
        ApiError::from_application(
            "api.feedback.sink_failed",
            &correlation_id,
            ApplicationError::Collaborator(error.to_string()),
        )
    })?;

    info!(
        event_name = "api.feedback.stored",
        correlation_id = correlation_id.as_str(),
        feedback_id = %feedback_id,
        "feedback recorded"
    );
    Ok(Json(FeedbackReceipt::accepted(feedback_id, timestamp)))
}

async fn impact_stats(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
) -> Result<Json<ImpactStats>, ApiError> {
    let stats = state.stats.snapshot().await.map_err(|error| {
        ApiError::from_application(
            "api.impact_stats.failed",
            &correlation_id,
            ApplicationError::Collaborator(error.to_string()),
        )
    })?;

    info!(
        event_name = "api.impact_stats.completed",
        correlation_id = correlation_id.as_str(),
        "impact statistics served"
    );
    Ok(Json(stats))
}
