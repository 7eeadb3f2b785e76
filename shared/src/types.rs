//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS fix recorded when a crate is scanned in the field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsLocation {
    pub latitude: Decimal,
    pub longitude: Decimal,
    /// Horizontal accuracy of the fix in meters
    pub accuracy_meters: Decimal,
}

impl GpsLocation {
    pub fn new(latitude: Decimal, longitude: Decimal, accuracy_meters: Decimal) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}
