use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::claims::handlers;
use crate::features::claims::services::ClaimService;

/// Create routes for the claims feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(service: Arc<ClaimService>) -> Router {
    let body_limit = service.limits().max_request_body_size();

    Router::new()
        .route(
            "/api/claims",
            post(handlers::submit_claim)
                .layer(DefaultBodyLimit::max(body_limit))
                .get(handlers::list_claims),
        )
        .route(
            "/api/claims/{id}",
            get(handlers::get_claim).put(handlers::update_claim_status),
        )
        .route(
            "/api/claims/employee/{employee_id}",
            get(handlers::list_claims_by_employee),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::claims::repositories::memory::MemoryClaimRepository;
    use crate::features::claims::validation::AttachmentLimits;
    use crate::shared::test_helpers::{TempUploadDir, TEST_BASE_URL};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use fake::{faker::name::en::Name, Fake};
    use serde_json::{json, Value};

    fn server(repo: &MemoryClaimRepository, tmp: &TempUploadDir) -> TestServer {
        server_with_limits(repo, tmp, AttachmentLimits::default())
    }

    fn server_with_limits(
        repo: &MemoryClaimRepository,
        tmp: &TempUploadDir,
        limits: AttachmentLimits,
    ) -> TestServer {
        let service = ClaimService::new(Arc::new(repo.clone()), Arc::new(tmp.storage()), limits);
        TestServer::new(routes(Arc::new(service))).unwrap()
    }

    fn claim_form(employee_id: &str) -> MultipartForm {
        MultipartForm::new()
            .add_text("employeeId", employee_id.to_string())
            .add_text("employeeName", Name().fake::<String>())
            .add_text("title", "Travel Expense Reimbursement")
            .add_text("amount", "37500.50")
            .add_text("category", "Travel")
            .add_text("description", "Flight and hotel for the Mumbai client visit")
    }

    fn pdf(name: &str, size: usize) -> Part {
        Part::bytes(vec![b'%'; size])
            .file_name(name.to_string())
            .mime_type("application/pdf")
    }

    #[tokio::test]
    async fn test_submit_claim_with_attachment() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        let response = server
            .post("/api/claims")
            .multipart(claim_form("ATS0123").add_part("attachments", pdf("hotel.pdf", 12000)))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(true));
        let claim = &body["data"];
        assert_eq!(claim["employee_id"], json!("ATS0123"));
        assert_eq!(claim["status"], json!("pending"));
        assert_eq!(claim["response"], json!(""));
        assert_eq!(claim["category"], json!("Travel"));
        assert_eq!(claim["attachments"][0]["name"], json!("hotel.pdf"));
        assert_eq!(claim["attachments"][0]["size"], json!(12000));
        let url = claim["attachments"][0]["url"].as_str().unwrap();
        assert!(url.starts_with(&format!("{}/uploads/", TEST_BASE_URL)));
        assert!(url.ends_with(".pdf"));
        assert_eq!(tmp.file_count().await, 1);
    }

    #[tokio::test]
    async fn test_snake_case_fields_are_accepted() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        let form = MultipartForm::new()
            .add_text("employee_id", "ATS0456")
            .add_text("employee_name", "Raghava")
            .add_text("title", "Office Supplies Purchase")
            .add_text("amount", "10450.30")
            .add_text("category", "Office Supplies")
            .add_text("description", "Notebooks and printer paper")
            .add_text("date", "1999-01-01");

        let response = server.post("/api/claims").multipart(form).await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["employee_name"], json!("Raghava"));
        assert_ne!(body["data"]["date"], json!("1999-01-01"));
    }

    #[tokio::test]
    async fn test_duplicate_submission_conflicts() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        server
            .post("/api/claims")
            .multipart(claim_form("ATS0123"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/claims")
            .multipart(claim_form("ATS0123").add_part("attachments", pdf("again.pdf", 10)))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert_eq!(repo.claims().len(), 1);
        assert_eq!(tmp.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_submission_reports_errors() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        let form = MultipartForm::new()
            .add_text("employeeId", "ATS0000")
            .add_text("amount", "-3")
            .add_part("attachments", pdf("receipt.pdf", 10));
        let response = server.post("/api/claims").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        let errors = body["errors"].as_array().unwrap();
        assert!(errors.len() >= 5);
        assert!(repo.claims().is_empty());
        assert_eq!(tmp.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_attachment_limits_enforced() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        let mut form = claim_form("ATS0123");
        for i in 0..6 {
            form = form.add_part("attachments", pdf(&format!("{}.pdf", i), 10));
        }
        server
            .post("/api/claims")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let text_file = Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain");
        server
            .post("/api/claims")
            .multipart(claim_form("ATS0123").add_part("attachments", text_file))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert!(repo.claims().is_empty());
        assert_eq!(tmp.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let limits = AttachmentLimits {
            max_file_size: 10,
            max_files: 1,
            ..AttachmentLimits::default()
        };
        let server = server_with_limits(&repo, &tmp, limits);

        let response = server
            .post("/api/claims")
            .multipart(
                claim_form("ATS0123").add_part("attachments", pdf("huge.pdf", 2 * 1024 * 1024)),
            )
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = response.json();
        assert_eq!(body["success"], json!(false));
        assert!(repo.claims().is_empty());
        assert_eq!(tmp.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_list_claims_far_past_last_page() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        server
            .post("/api/claims")
            .multipart(claim_form("ATS0101"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(&format!("/api/claims?page={}", i64::MAX))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["data"].as_array().unwrap().is_empty());
        assert_eq!(body["meta"]["total"], json!(1));
    }

    #[tokio::test]
    async fn test_list_claims_with_limit_alias() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        for id in ["ATS0101", "ATS0102"] {
            server
                .post("/api/claims")
                .multipart(claim_form(id))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get("/api/claims?page=1&limit=1").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["meta"]["total"], json!(2));
        assert_eq!(body["meta"]["page_size"], json!(1));
        assert_eq!(body["meta"]["total_pages"], json!(2));
    }

    #[tokio::test]
    async fn test_get_claim_paths() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        let created: Value = server
            .post("/api/claims")
            .multipart(claim_form("ATS0789"))
            .await
            .json();
        let id = created["data"]["id"].as_i64().unwrap();

        let response = server.get(&format!("/api/claims/{}", id)).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["employee_id"], json!("ATS0789"));

        server
            .get("/api/claims/9999")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/api/claims/not-a-number")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_claims_by_employee() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        server
            .post("/api/claims")
            .multipart(claim_form("ATS0345"))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get("/api/claims/employee/ATS0345").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        server
            .get("/api/claims/employee/ATS0000")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_claim_status() {
        let repo = MemoryClaimRepository::new();
        let tmp = TempUploadDir::new();
        let server = server(&repo, &tmp);

        let created: Value = server
            .post("/api/claims")
            .multipart(claim_form("ATS0124"))
            .await
            .json();
        let path = format!("/api/claims/{}", created["data"]["id"]);

        let response = server
            .put(&path)
            .json(&json!({ "status": "rejected", "response": "Not pre-approved" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], json!("rejected"));
        assert_eq!(body["data"]["response"], json!("Not pre-approved"));

        server
            .put(&path)
            .json(&json!({ "status": "paid" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .put("/api/claims/9999")
            .json(&json!({ "status": "approved" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
