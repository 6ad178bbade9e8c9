use crate::api::types::ListingQuery;
use crate::error::ApiError;
use crate::models::{Listing, SubmissionPayload};
use async_trait::async_trait;

/// Listing endpoint as seen by the submission workflow and the listing views.
/// Implemented over HTTP in production and by in-memory fakes in tests.
#[async_trait]
pub trait ListingApi: Send + Sync {
    /// Create a listing from the full submission record
    async fn create(&self, payload: &SubmissionPayload) -> Result<Listing, ApiError>;

    /// Fetch the listing index
    async fn list(&self, query: &ListingQuery) -> Result<Vec<Listing>, ApiError>;

    /// Name of the backend, for logging
    fn endpoint_name(&self) -> &str;
}
