mod attachment;
mod claim;

pub use attachment::ClaimAttachment;
pub use claim::{Claim, ClaimStatus, NewClaim};
