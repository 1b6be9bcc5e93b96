use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::features::health::dtos::HealthResponseDto;
use crate::features::health::services::HealthService;
use crate::shared::types::ApiResponse;

/// Health check
///
/// Reports database connectivity and upload directory accessibility.
/// Responds 503 when either is down.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service healthy", body = ApiResponse<HealthResponseDto>),
        (status = 503, description = "A dependency is down", body = ApiResponse<HealthResponseDto>)
    )
)]
pub async fn health_check(
    State(service): State<Arc<HealthService>>,
) -> (StatusCode, Json<ApiResponse<HealthResponseDto>>) {
    let health = service.check().await;

    if health.is_healthy() {
        (
            StatusCode::OK,
            Json(ApiResponse::success(Some(health), None, None)),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                success: false,
                data: Some(health),
                message: Some("Service is degraded".to_string()),
                meta: None,
                errors: None,
            }),
        )
    }
}
