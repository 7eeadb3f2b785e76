//! Batch lifecycle controller
//!
//! Drives a batch through open -> in_transit -> delivered -> reconciled
//! -> closed. Every mutation is verify-then-act: current state is
//! re-fetched from the server and checked before the transition request
//! is issued, and a transition whose network outcome is unknown is never
//! resubmitted blindly.

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use shared::{validate_qr_code, Batch, BatchStatus, PaginatedResponse, ReconciliationStats};

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

/// Batch lifecycle service
#[derive(Clone)]
pub struct BatchService {
    api: ApiClient,
}

/// Input for creating a batch
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewBatch {
    pub from_location: String,
    #[validate(length(min = 1, message = "Destination is required"))]
    pub to_location: String,
    #[validate(length(min = 1, message = "Responsible party is required"))]
    pub responsible_party: String,
}

/// Query filters for listing batches
#[derive(Debug, Clone, Default)]
pub struct BatchFilter {
    pub status: Option<BatchStatus>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
struct AddCrateRequest<'a> {
    qr_code: &'a str,
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create a batch in the `open` state
    pub async fn create(&self, input: NewBatch) -> ApiResult<Batch> {
        input.validate()?;
        let batch: Batch = self.api.post("/api/batches/", &input).await?;
        tracing::info!(batch_code = %batch.batch_code, "batch created");
        Ok(batch)
    }

    /// Fetch the authoritative current state of a batch
    pub async fn get(&self, batch_id: Uuid) -> ApiResult<Batch> {
        self.api.get(&format!("/api/batches/{}", batch_id)).await
    }

    /// List batches matching the given filters
    pub async fn list(&self, filter: BatchFilter) -> ApiResult<PaginatedResponse<Batch>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(from) = filter.from_location {
            query.push(("from_location", from));
        }
        if let Some(to) = filter.to_location {
            query.push(("to_location", to));
        }
        if let Some(page) = filter.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = filter.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        self.api.get_with_query("/api/batches", &query).await
    }

    /// Assign a crate to an open batch by QR code
    ///
    /// Valid only while the batch is `open`. The QR code must resolve to
    /// an existing crate not already assigned to a batch.
    pub async fn add_crate(&self, batch_id: Uuid, qr_code: &str) -> ApiResult<Batch> {
        if let Err(message) = validate_qr_code(qr_code) {
            return Err(ApiError::Validation {
                errors: vec![crate::error::FieldError {
                    field: "qr_code".to_string(),
                    message: message.to_string(),
                }],
            });
        }

        let current = self.get(batch_id).await?;
        if current.status != BatchStatus::Open {
            return Err(ApiError::invalid_state("add crate", current.status));
        }

        self.api
            .post(
                &format!("/api/batches/{}/crates", batch_id),
                &AddCrateRequest { qr_code },
            )
            .await
    }

    /// Dispatch an open batch, transitioning it to `in_transit`
    pub async fn dispatch(&self, batch_id: Uuid) -> ApiResult<Batch> {
        self.transition(batch_id, BatchStatus::InTransit, "depart", "dispatch")
            .await
    }

    /// Mark an in-transit batch as arrived, transitioning it to `delivered`
    pub async fn arrive(&self, batch_id: Uuid) -> ApiResult<Batch> {
        self.transition(batch_id, BatchStatus::Delivered, "arrive", "arrive")
            .await
    }

    /// Close a fully reconciled batch
    ///
    /// Fails closed: the reconciliation gate is checked against freshly
    /// fetched state before the request, and a `PreconditionFailed` from
    /// the server is authoritative even if the local view said complete
    /// (a concurrent reconcile/close race resolves server-side).
    pub async fn close(&self, batch_id: Uuid) -> ApiResult<Batch> {
        let current = self.get(batch_id).await?;

        if current.status == BatchStatus::Closed {
            return Err(ApiError::invalid_state("close", current.status));
        }
        if !current.status.has_reached(BatchStatus::Delivered) {
            return Err(ApiError::invalid_state("close", current.status));
        }

        let stats = ReconciliationStats::from_crates(&current.crates);
        if !stats.is_reconciliation_complete {
            return Err(ApiError::PreconditionFailed(format!(
                "Batch {} has {} of {} crates reconciled",
                current.batch_code, stats.reconciled_crates, stats.total_crates
            )));
        }

        let batch: Batch = self
            .api
            .post_empty(&format!("/api/batches/{}/close", batch_id))
            .await?;
        tracing::info!(batch_code = %batch.batch_code, "batch closed");
        Ok(batch)
    }

    /// Re-fetch state, gate on the transition order, then issue the PATCH
    ///
    /// A network failure here leaves the outcome unknown; callers must
    /// `get` the batch again before retrying rather than resubmit.
    async fn transition(
        &self,
        batch_id: Uuid,
        target: BatchStatus,
        verb: &str,
        operation: &str,
    ) -> ApiResult<Batch> {
        let current = self.get(batch_id).await?;
        if !current.status.can_transition_to(target) {
            return Err(ApiError::invalid_state(operation, current.status));
        }

        let batch: Batch = self
            .api
            .patch(&format!("/api/batches/{}/{}", batch_id, verb))
            .await?;
        tracing::info!(batch_code = %batch.batch_code, status = %batch.status, "batch transitioned");
        Ok(batch)
    }
}
