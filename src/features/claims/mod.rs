pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;

pub use repositories::PgClaimRepository;
pub use routes::routes;
pub use services::ClaimService;
pub use validation::AttachmentLimits;
