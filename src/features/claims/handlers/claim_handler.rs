use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::claims::dtos::{
    ClaimResponseDto, SubmitClaimDto, SubmitClaimFormDto, UpdateClaimStatusDto,
};
use crate::features::claims::services::{ClaimService, UploadedFile};
use crate::shared::types::{ApiResponse, PaginationQuery};

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body is too large".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    }
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(multipart_error)
}

/// Submit a claim
///
/// Accepts multipart/form-data with the claim's text fields and up to five
/// files under `attachments`. Field names may be camelCase or snake_case.
/// The claim is dated with the current day; one claim per employee per day.
#[utoipa::path(
    post,
    path = "/api/claims",
    tag = "claims",
    request_body(
        content = SubmitClaimFormDto,
        content_type = "multipart/form-data",
        description = "Claim fields plus optional attachments",
    ),
    responses(
        (status = 201, description = "Claim submitted", body = ApiResponse<ClaimResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "A claim was already submitted today"),
        (status = 413, description = "Request too large")
    )
)]
pub async fn submit_claim(
    State(service): State<Arc<ClaimService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ClaimResponseDto>>), AppError> {
    let max_files = service.limits().max_files;
    let mut payload = SubmitClaimDto::default();
    let mut uploads: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "attachments" | "attachments[]" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;

                // Forms send an empty part when no file was picked
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                if uploads.len() >= max_files {
                    return Err(AppError::validation(format!(
                        "Too many attachments: at most {} files are allowed",
                        max_files
                    )));
                }

                uploads.push(UploadedFile {
                    file_name: if file_name.is_empty() {
                        "unnamed".to_string()
                    } else {
                        file_name
                    },
                    content_type,
                    data,
                });
            }
            "employeeId" | "employee_id" => payload.employee_id = read_text(field).await?,
            "employeeName" | "employee_name" => payload.employee_name = read_text(field).await?,
            "title" => payload.title = read_text(field).await?,
            "amount" => payload.amount = read_text(field).await?,
            "category" => payload.category = read_text(field).await?,
            "description" => payload.description = read_text(field).await?,
            _ => {
                // Includes a client-sent `date`, which the server assigns
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let staged = service.stage_uploads(uploads).await?;
    let claim = service.submit_claim(payload, staged).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(claim),
            Some("Claim submitted successfully".to_string()),
            None,
        )),
    ))
}

/// List claims
///
/// Newest first, paginated.
#[utoipa::path(
    get,
    path = "/api/claims",
    tag = "claims",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of claims", body = ApiResponse<Vec<ClaimResponseDto>>)
    )
)]
pub async fn list_claims(
    State(service): State<Arc<ClaimService>>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ClaimResponseDto>>>, AppError> {
    let (claims, meta) = service.list_claims(&query).await?;
    Ok(Json(ApiResponse::success(Some(claims), None, Some(meta))))
}

/// Get a claim by id
#[utoipa::path(
    get,
    path = "/api/claims/{id}",
    tag = "claims",
    params(
        ("id" = i32, Path, description = "Claim id")
    ),
    responses(
        (status = 200, description = "Claim found", body = ApiResponse<ClaimResponseDto>),
        (status = 404, description = "Claim not found")
    )
)]
pub async fn get_claim(
    State(service): State<Arc<ClaimService>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<ClaimResponseDto>>, AppError> {
    let claim = service.get_claim(id).await?;
    Ok(Json(ApiResponse::success(Some(claim), None, None)))
}

/// List an employee's claims
///
/// Most recent claim date first.
#[utoipa::path(
    get,
    path = "/api/claims/employee/{employee_id}",
    tag = "claims",
    params(
        ("employee_id" = String, Path, description = "Employee id, e.g. ATS0123")
    ),
    responses(
        (status = 200, description = "Claims of the employee", body = ApiResponse<Vec<ClaimResponseDto>>),
        (status = 400, description = "Invalid employee id")
    )
)]
pub async fn list_claims_by_employee(
    State(service): State<Arc<ClaimService>>,
    AppPath(employee_id): AppPath<String>,
) -> Result<Json<ApiResponse<Vec<ClaimResponseDto>>>, AppError> {
    let claims = service.list_claims_by_employee(&employee_id).await?;
    Ok(Json(ApiResponse::success(Some(claims), None, None)))
}

/// Review a claim
///
/// Sets the status and the reviewer's response (empty when omitted).
#[utoipa::path(
    put,
    path = "/api/claims/{id}",
    tag = "claims",
    params(
        ("id" = i32, Path, description = "Claim id")
    ),
    request_body = UpdateClaimStatusDto,
    responses(
        (status = 200, description = "Claim updated", body = ApiResponse<ClaimResponseDto>),
        (status = 400, description = "Invalid status"),
        (status = 404, description = "Claim not found")
    )
)]
pub async fn update_claim_status(
    State(service): State<Arc<ClaimService>>,
    AppPath(id): AppPath<i32>,
    AppJson(dto): AppJson<UpdateClaimStatusDto>,
) -> Result<Json<ApiResponse<ClaimResponseDto>>, AppError> {
    let claim = service.update_status(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(claim),
        Some("Claim updated successfully".to_string()),
        None,
    )))
}
