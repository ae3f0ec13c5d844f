//! Shared request and response types.

mod pagination;
mod response;

pub use pagination::PageParams;
pub use response::{DataEnvelope, DistributedPage, PetOwnerPage, SuccessResponse};
