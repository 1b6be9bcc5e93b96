mod claim_service;
mod sample_data;

pub use claim_service::{ClaimService, SubmitClaimError, UploadedFile};
