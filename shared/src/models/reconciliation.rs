//! Reconciliation statistics and weight accounting

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Crate;

/// Aggregate reconciliation state for a batch, derived from its crate set
///
/// Never persisted or cached client-side; recompute after every
/// successful reconcile call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationStats {
    pub total_crates: u32,
    pub reconciled_crates: u32,
    pub missing_crates: u32,
    pub is_reconciliation_complete: bool,
    /// Sum of original weights of all crates in the batch
    pub expected_weight_kg: Decimal,
    /// Sum of measured weights of reconciled crates
    pub reconciled_weight_kg: Decimal,
    /// Expected minus reconciled, over reconciled crates only
    pub weight_differential_kg: Decimal,
    /// Differential as a percentage of the reconciled crates' expected weight
    pub loss_percent: Decimal,
}

impl ReconciliationStats {
    /// Compute stats from a batch's crate manifest
    ///
    /// An empty manifest is reconciliation-complete vacuously (0/0),
    /// so an empty batch may close without any reconcile call.
    pub fn from_crates(crates: &[Crate]) -> Self {
        let total_crates = crates.len() as u32;
        let reconciled: Vec<&Crate> = crates.iter().filter(|c| c.reconciled).collect();
        let reconciled_crates = reconciled.len() as u32;

        let expected_weight_kg: Decimal = crates.iter().map(|c| c.weight_kg).sum();
        let reconciled_expected: Decimal = reconciled.iter().map(|c| c.weight_kg).sum();
        let reconciled_weight_kg: Decimal = reconciled
            .iter()
            .filter_map(|c| c.reconciled_weight_kg)
            .sum();
        let weight_differential_kg = reconciled_expected - reconciled_weight_kg;

        let loss_percent = if reconciled_expected.is_zero() {
            Decimal::ZERO
        } else {
            (weight_differential_kg / reconciled_expected) * Decimal::from(100)
        };

        Self {
            total_crates,
            reconciled_crates,
            missing_crates: total_crates - reconciled_crates,
            is_reconciliation_complete: reconciled_crates == total_crates,
            expected_weight_kg,
            reconciled_weight_kg,
            weight_differential_kg,
            loss_percent,
        }
    }

    /// Classify the aggregate differential for display
    pub fn weight_change(&self) -> WeightChange {
        WeightChange::from_differential(self.weight_differential_kg)
    }
}

/// Direction of a weight differential
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightChange {
    Loss,
    Gain,
    Unchanged,
}

impl WeightChange {
    /// Sign convention: differential = original - reconciled, positive is loss
    pub fn from_differential(differential_kg: Decimal) -> Self {
        if differential_kg > Decimal::ZERO {
            WeightChange::Loss
        } else if differential_kg < Decimal::ZERO {
            WeightChange::Gain
        } else {
            WeightChange::Unchanged
        }
    }
}

impl std::fmt::Display for WeightChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightChange::Loss => write!(f, "loss"),
            WeightChange::Gain => write!(f, "gain"),
            WeightChange::Unchanged => write!(f, "unchanged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QualityGrade;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_crate(seq: u32, weight: &str, reconciled: Option<&str>) -> Crate {
        Crate {
            id: Uuid::new_v4(),
            qr_code: format!("CR-081524-{:03}", seq),
            variety_id: Uuid::new_v4(),
            weight_kg: dec(weight),
            quality_grade: QualityGrade::A,
            gps_location: None,
            photo_url: None,
            batch_id: None,
            reconciled: reconciled.is_some(),
            reconciled_weight_kg: reconciled.map(dec),
            reconciled_at: reconciled.map(|_| Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_batch_is_vacuously_complete() {
        let stats = ReconciliationStats::from_crates(&[]);
        assert_eq!(stats.total_crates, 0);
        assert_eq!(stats.reconciled_crates, 0);
        assert!(stats.is_reconciliation_complete);
        assert_eq!(stats.loss_percent, Decimal::ZERO);
    }

    #[test]
    fn test_partial_reconciliation() {
        let crates = vec![
            make_crate(1, "10.0", Some("9.5")),
            make_crate(2, "12.0", None),
        ];
        let stats = ReconciliationStats::from_crates(&crates);
        assert_eq!(stats.total_crates, 2);
        assert_eq!(stats.reconciled_crates, 1);
        assert_eq!(stats.missing_crates, 1);
        assert!(!stats.is_reconciliation_complete);
        assert_eq!(stats.expected_weight_kg, dec("22.0"));
        assert_eq!(stats.weight_differential_kg, dec("0.5"));
        assert_eq!(stats.weight_change(), WeightChange::Loss);
    }

    #[test]
    fn test_complete_reconciliation_with_gain() {
        let crates = vec![
            make_crate(1, "10.0", Some("10.5")),
            make_crate(2, "12.0", Some("12.0")),
        ];
        let stats = ReconciliationStats::from_crates(&crates);
        assert!(stats.is_reconciliation_complete);
        assert_eq!(stats.weight_differential_kg, dec("-0.5"));
        assert_eq!(stats.weight_change(), WeightChange::Gain);
    }

    #[test]
    fn test_loss_percent() {
        let crates = vec![make_crate(1, "10.0", Some("9.0"))];
        let stats = ReconciliationStats::from_crates(&crates);
        assert_eq!(stats.loss_percent, dec("10"));
    }

    #[test]
    fn test_stats_idempotent() {
        let crates = vec![
            make_crate(1, "10.0", Some("9.5")),
            make_crate(2, "12.0", Some("11.8")),
        ];
        let first = ReconciliationStats::from_crates(&crates);
        let second = ReconciliationStats::from_crates(&crates);
        assert_eq!(first, second);
    }

    #[test]
    fn test_gain_renders_as_gain() {
        assert_eq!(WeightChange::from_differential(dec("-0.1")).to_string(), "gain");
        assert_eq!(WeightChange::from_differential(dec("0.1")).to_string(), "loss");
        assert_eq!(WeightChange::from_differential(dec("0")).to_string(), "unchanged");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            /// Crate counts always add up and completeness tracks them
            #[test]
            fn counts_are_consistent(
                reconciled in 0u32..50,
                missing in 0u32..50,
            ) {
                let mut crates = Vec::new();
                for i in 0..reconciled {
                    crates.push(make_crate(i, "10.0", Some("9.5")));
                }
                for i in 0..missing {
                    crates.push(make_crate(reconciled + i, "10.0", None));
                }

                let stats = ReconciliationStats::from_crates(&crates);
                prop_assert_eq!(stats.total_crates, reconciled + missing);
                prop_assert_eq!(stats.reconciled_crates, reconciled);
                prop_assert_eq!(stats.missing_crates, missing);
                prop_assert_eq!(stats.is_reconciliation_complete, missing == 0);
            }

            /// Sign convention: reconciled heavier than expected is a gain
            #[test]
            fn differential_sign_matches_classification(
                original_g in 1u32..100_000,
                reconciled_g in 1u32..100_000,
            ) {
                let original = Decimal::from(original_g) / Decimal::from(1000);
                let measured = Decimal::from(reconciled_g) / Decimal::from(1000);
                let c = make_crate(1, &original.to_string(), Some(&measured.to_string()));

                let stats = ReconciliationStats::from_crates(&[c]);
                let expected = if original_g > reconciled_g {
                    WeightChange::Loss
                } else if original_g < reconciled_g {
                    WeightChange::Gain
                } else {
                    WeightChange::Unchanged
                };
                prop_assert_eq!(stats.weight_change(), expected);
            }
        }
    }
}
