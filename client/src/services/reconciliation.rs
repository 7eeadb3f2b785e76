//! Reconciliation engine for arrived batches
//!
//! Matches physically scanned and re-weighed crates against a batch's
//! expected manifest and accounts for weight differentials. All gates
//! are checked against freshly fetched batch state before the mutation
//! is sent; stats are recomputed on demand and never cached.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use shared::{
    validate_qr_code, validate_weight, BatchStatus, Crate, ReconciliationStats,
};

use crate::error::{ApiError, ApiResult, FieldError};
use crate::http::ApiClient;

/// Reconciliation service
#[derive(Clone)]
pub struct ReconciliationService {
    api: ApiClient,
}

#[derive(Debug, Serialize)]
struct ReconcileRequest<'a> {
    qr_code: &'a str,
    weight: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
}

impl ReconciliationService {
    /// Create a new ReconciliationService instance
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Record the measured arrival weight for a scanned crate
    ///
    /// Preconditions, checked in order against fresh batch state:
    /// - measured weight is strictly positive
    /// - the QR code is well-formed
    /// - the batch is in the `delivered` state
    /// - the crate has not been reconciled already (re-scans are
    ///   rejected; the first recorded weight is never overwritten)
    ///
    /// Manifest membership is checked server-side so the not-found
    /// error can distinguish an unknown crate from one that belongs to
    /// a different batch.
    pub async fn reconcile_crate(
        &self,
        batch_id: Uuid,
        qr_code: &str,
        measured_weight_kg: Decimal,
        photo_url: Option<&str>,
    ) -> ApiResult<Crate> {
        if validate_weight(measured_weight_kg).is_err() {
            return Err(ApiError::InvalidWeight(measured_weight_kg));
        }
        if let Err(message) = validate_qr_code(qr_code) {
            return Err(ApiError::Validation {
                errors: vec![FieldError {
                    field: "qr_code".to_string(),
                    message: message.to_string(),
                }],
            });
        }

        let batch: shared::Batch = self.api.get(&format!("/api/batches/{}", batch_id)).await?;
        if batch.status != BatchStatus::Delivered {
            return Err(ApiError::invalid_state("reconcile crate", batch.status));
        }

        // A QR outside the local manifest is still sent to the server,
        // whose not-found response distinguishes an unknown crate from
        // one assigned to a different batch.
        if let Some(existing) = batch.find_crate(qr_code) {
            if existing.reconciled {
                return Err(ApiError::AlreadyReconciled {
                    qr_code: qr_code.to_string(),
                });
            }
        }

        let request = ReconcileRequest {
            qr_code,
            weight: measured_weight_kg,
            photo_url,
        };
        let reconciled: Crate = self
            .api
            .post(&format!("/api/batches/{}/reconcile", batch_id), &request)
            .await?;

        tracing::info!(
            qr_code,
            batch_code = %batch.batch_code,
            differential_kg = %reconciled.weight_differential_kg().unwrap_or_default(),
            "crate reconciled"
        );
        Ok(reconciled)
    }

    /// Fetch reconciliation statistics for a batch
    ///
    /// Always queried fresh from the server; a successful reconcile call
    /// invalidates any previously observed stats, so callers must not
    /// hold on to old results across reconcile calls.
    pub async fn stats(&self, batch_id: Uuid) -> ApiResult<ReconciliationStats> {
        self.api
            .get(&format!("/api/batches/{}/reconciliation-stats", batch_id))
            .await
    }
}
