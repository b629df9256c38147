use axum::Json;
use chrono::Utc;

use super::QUERY_RANGE_PATH;
use crate::models::HealthResponse;

pub const SERVICE_NAME: &str = "metering-prometheus-mock";

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "success".to_string(),
        service: SERVICE_NAME.to_string(),
        message: "Server is healthy and running".to_string(),
        endpoint: QUERY_RANGE_PATH.to_string(),
        timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    })
}
