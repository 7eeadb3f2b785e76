//! Crate and quality grading models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::GpsLocation;

/// A unit of produce tracked by QR code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crate {
    pub id: Uuid,
    /// Unique scan identifier in the format "CR-MMDDYY-XXX"
    pub qr_code: String,
    pub variety_id: Uuid,
    /// Original recorded weight in kilograms, always positive
    pub weight_kg: Decimal,
    pub quality_grade: QualityGrade,
    pub gps_location: Option<GpsLocation>,
    pub photo_url: Option<String>,
    /// Batch this crate is currently assigned to, if any
    pub batch_id: Option<Uuid>,
    pub reconciled: bool,
    /// Weight measured on arrival; set at most once per batch cycle
    pub reconciled_weight_kg: Option<Decimal>,
    pub reconciled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Quality grade assigned at the packhouse
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    A,
    B,
    C,
    Reject,
}

impl std::fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityGrade::A => write!(f, "A"),
            QualityGrade::B => write!(f, "B"),
            QualityGrade::C => write!(f, "C"),
            QualityGrade::Reject => write!(f, "Reject"),
        }
    }
}

impl Crate {
    /// Weight differential in kilograms: original minus reconciled
    ///
    /// Positive means loss in transit, negative means gain. None until
    /// the crate has been reconciled.
    pub fn weight_differential_kg(&self) -> Option<Decimal> {
        self.reconciled_weight_kg.map(|w| self.weight_kg - w)
    }
}
