//! Batch and shipment lifecycle models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Crate;

/// A shipment of crates moving from an origin to a destination location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    /// Unique human-readable code (e.g., "PT-240815-DOI-0001")
    pub batch_code: String,
    pub status: BatchStatus,
    pub from_location: String,
    pub to_location: String,
    pub responsible_party: String,
    pub total_crates: u32,
    /// Sum of original crate weights in kilograms
    pub total_weight_kg: Decimal,
    pub crates: Vec<Crate>,
    pub created_at: DateTime<Utc>,
    pub departed_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Status of a batch in its lifecycle
///
/// Transitions follow a single linear path with no backward moves:
/// open -> in_transit -> delivered -> reconciled -> closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Open,
    InTransit,
    Delivered,
    Reconciled,
    Closed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Open => "open",
            BatchStatus::InTransit => "in_transit",
            BatchStatus::Delivered => "delivered",
            BatchStatus::Reconciled => "reconciled",
            BatchStatus::Closed => "closed",
        }
    }

    /// The status that follows this one, if any
    pub fn next(&self) -> Option<BatchStatus> {
        match self {
            BatchStatus::Open => Some(BatchStatus::InTransit),
            BatchStatus::InTransit => Some(BatchStatus::Delivered),
            BatchStatus::Delivered => Some(BatchStatus::Reconciled),
            BatchStatus::Reconciled => Some(BatchStatus::Closed),
            BatchStatus::Closed => None,
        }
    }

    /// Whether a direct transition to `target` is allowed
    pub fn can_transition_to(&self, target: BatchStatus) -> bool {
        self.next() == Some(target)
    }

    /// Whether the batch is past the given status in lifecycle order
    pub fn has_reached(&self, other: BatchStatus) -> bool {
        self.ordinal() >= other.ordinal()
    }

    fn ordinal(&self) -> u8 {
        match self {
            BatchStatus::Open => 0,
            BatchStatus::InTransit => 1,
            BatchStatus::Delivered => 2,
            BatchStatus::Reconciled => 3,
            BatchStatus::Closed => 4,
        }
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Batch {
    /// Look up a crate in this batch's manifest by QR code
    pub fn find_crate(&self, qr_code: &str) -> Option<&Crate> {
        self.crates.iter().find(|c| c.qr_code == qr_code)
    }

    /// Check lifecycle timestamps are consistent with the current status
    ///
    /// A timestamp is non-null iff the batch has passed through the
    /// corresponding status at least once.
    pub fn timestamps_consistent(&self) -> bool {
        let checks = [
            (BatchStatus::InTransit, self.departed_at),
            (BatchStatus::Delivered, self.arrived_at),
            (BatchStatus::Reconciled, self.reconciled_at),
            (BatchStatus::Closed, self.closed_at),
        ];
        checks
            .iter()
            .all(|(status, ts)| self.status.has_reached(*status) == ts.is_some())
    }
}

/// Generate a batch code from origin code, date and sequence number
pub fn generate_batch_code(origin_code: &str, date: NaiveDate, sequence: u32) -> String {
    format!("PT-{}-{}-{:04}", date.format("%y%m%d"), origin_code, sequence)
}
