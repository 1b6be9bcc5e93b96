use utoipa::{Modify, OpenApi};

use crate::features::claims::{dtos as claims_dtos, handlers as claims_handlers, models};
use crate::features::health::{dtos as health_dtos, handlers as health_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health_handlers::health_check,
        // Claims
        claims_handlers::submit_claim,
        claims_handlers::list_claims,
        claims_handlers::get_claim,
        claims_handlers::list_claims_by_employee,
        claims_handlers::update_claim_status,
    ),
    components(
        schemas(
            Meta,
            models::ClaimStatus,
            claims_dtos::SubmitClaimFormDto,
            claims_dtos::AttachmentResponseDto,
            claims_dtos::ClaimResponseDto,
            claims_dtos::UpdateClaimStatusDto,
            health_dtos::ComponentStatus,
            health_dtos::HealthResponseDto,
            ApiResponse<claims_dtos::ClaimResponseDto>,
            ApiResponse<Vec<claims_dtos::ClaimResponseDto>>,
            ApiResponse<health_dtos::HealthResponseDto>,
        )
    ),
    tags(
        (name = "claims", description = "Expense claim submission and review"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "Claims Portal API",
        version = "0.1.0",
        description = "Expense claim submission and review API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
