use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::bootstrap::AppState;

pub const SERVICE_NAME: &str = "agroprice-server";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub thresholds: HealthCheck,
    pub model: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let thresholds = if state.thresholds.is_empty() {
        HealthCheck { status: "degraded", detail: "threshold table is empty".to_string() }
    } else {
        HealthCheck {
            status: "ready",
            detail: format!("{} commodity ceilings loaded", state.thresholds.len()),
        }
    };
    let model = HealthCheck {
        status: "ready",
        detail: format!("price model `{}` loaded", state.model.name()),
    };
    let ready = thresholds.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: format!("{SERVICE_NAME} runtime initialized"),
        },
        thresholds,
        model,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}
