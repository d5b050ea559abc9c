// Copyright 2025 Stakeview Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Structural validation of the playground's editable fields.
//!
//! Violations are collected per field and returned together so a form can
//! show every error at once; nothing here touches the network.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::{self, BASE_UNITS_PER_DISPLAY};

/// Parts-per-million in a whole fraction, the stored resolution of
/// percentage fields.
pub const FRACTION_PPM: u32 = 1_000_000;

/// Largest accepted amount, base units (10^24 display units).
///
/// Orders of magnitude above any token supply, and keeps the saturation
/// arithmetic downstream within `u128`: `100 * 2 * MAX_AMOUNT_BASE * 1000`
/// is still two hundred times below `u128::MAX`.
pub const MAX_AMOUNT_BASE: u128 = 10u128.pow(30);

/// The raw string fields of the estimation form, exactly as edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStakeInputs {
    pub profit_margin: String,
    pub uptime: String,
    pub bond: String,
    pub delegations: String,
    pub operator_cost: String,
}

/// An editable field of [`RawStakeInputs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    ProfitMargin,
    Uptime,
    Bond,
    Delegations,
    OperatorCost,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::ProfitMargin => "profit margin",
            Field::Uptime => "uptime",
            Field::Bond => "bond",
            Field::Delegations => "delegations",
            Field::OperatorCost => "operator cost",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldViolation {
    #[error("field is required")]
    Missing,

    #[error("not a non-negative decimal")]
    Malformed,

    #[error("percentage must be between 0 and 100")]
    OutOfRange,

    #[error("amount exceeds the supported maximum")]
    TooLarge,
}

/// Every violation found in a submission, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub BTreeMap<Field, FieldViolation>);

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, violation) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {violation}")?;
            first = false;
        }
        Ok(())
    }
}

/// Validated, unit-normalized estimation inputs.
///
/// Amounts are base units; percentages are stored as parts-per-million
/// fractions, already clamped to [0, 1] by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInputs {
    /// Hypothetical operator bond, base units.
    pub bond_base: u128,
    /// Hypothetical total delegation, base units.
    pub delegation_base: u128,
    /// Node uptime as a fraction in ppm (0..=1_000_000).
    pub uptime_ppm: u32,
    /// Operator profit margin as a fraction in ppm (0..=1_000_000).
    pub profit_margin_ppm: u32,
    /// Declared operating cost, base units. Carried for display and
    /// estimation requests; the projector does not consume it.
    pub operator_cost_base: u128,
}

fn check_amount(field: Field, raw: &str, errors: &mut BTreeMap<Field, FieldViolation>) -> u128 {
    if raw.trim().is_empty() {
        errors.insert(field, FieldViolation::Missing);
        return 0;
    }
    match units::parse_display_amount(raw) {
        Ok(base) if base <= MAX_AMOUNT_BASE => base,
        Ok(_) => {
            errors.insert(field, FieldViolation::TooLarge);
            0
        }
        Err(_) => {
            errors.insert(field, FieldViolation::Malformed);
            0
        }
    }
}

fn check_percentage(field: Field, raw: &str, errors: &mut BTreeMap<Field, FieldViolation>) -> u32 {
    if raw.trim().is_empty() {
        errors.insert(field, FieldViolation::Missing);
        return 0;
    }
    match units::parse_display_amount(raw) {
        // micro-percent -> fraction ppm; 100% == 100 * BASE_UNITS_PER_DISPLAY
        Ok(micro_percent) if micro_percent <= 100 * BASE_UNITS_PER_DISPLAY => {
            (micro_percent / 100) as u32
        }
        Ok(_) => {
            errors.insert(field, FieldViolation::OutOfRange);
            0
        }
        Err(_) => {
            errors.insert(field, FieldViolation::Malformed);
            0
        }
    }
}

/// Validate a raw submission into [`StakeInputs`], collecting all
/// violations rather than failing on the first.
pub fn validate(raw: &RawStakeInputs) -> Result<StakeInputs, ValidationErrors> {
    let mut errors = BTreeMap::new();

    let profit_margin_ppm = check_percentage(Field::ProfitMargin, &raw.profit_margin, &mut errors);
    let uptime_ppm = check_percentage(Field::Uptime, &raw.uptime, &mut errors);
    let bond_base = check_amount(Field::Bond, &raw.bond, &mut errors);
    let delegation_base = check_amount(Field::Delegations, &raw.delegations, &mut errors);
    let operator_cost_base = check_amount(Field::OperatorCost, &raw.operator_cost, &mut errors);

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(StakeInputs {
        bond_base,
        delegation_base,
        uptime_ppm,
        profit_margin_ppm,
        operator_cost_base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> RawStakeInputs {
        RawStakeInputs {
            profit_margin: "10".into(),
            uptime: "100".into(),
            bond: "1000".into(),
            delegations: "2500.5".into(),
            operator_cost: "40".into(),
        }
    }

    #[test]
    fn test_valid_submission() {
        let inputs = validate(&valid_raw()).unwrap();
        assert_eq!(inputs.bond_base, 1_000_000_000);
        assert_eq!(inputs.delegation_base, 2_500_500_000);
        assert_eq!(inputs.uptime_ppm, FRACTION_PPM);
        assert_eq!(inputs.profit_margin_ppm, 100_000);
        assert_eq!(inputs.operator_cost_base, 40_000_000);
    }

    #[test]
    fn test_uptime_out_of_range() {
        let raw = RawStakeInputs { uptime: "150".into(), ..valid_raw() };
        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.0.get(&Field::Uptime), Some(&FieldViolation::OutOfRange));
        assert_eq!(errors.0.len(), 1);
    }

    #[test]
    fn test_uptime_boundaries_accepted() {
        for value in ["0", "100", "99.99"] {
            let raw = RawStakeInputs { uptime: value.into(), ..valid_raw() };
            assert!(validate(&raw).is_ok(), "rejected uptime {value:?}");
        }
    }

    #[test]
    fn test_fractional_percentage_stored_as_ppm() {
        let raw = RawStakeInputs { uptime: "99.5".into(), ..valid_raw() };
        let inputs = validate(&raw).unwrap();
        assert_eq!(inputs.uptime_ppm, 995_000);
    }

    #[test]
    fn test_missing_distinct_from_malformed() {
        let raw = RawStakeInputs { bond: "".into(), delegations: "12x".into(), ..valid_raw() };
        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.0.get(&Field::Bond), Some(&FieldViolation::Missing));
        assert_eq!(errors.0.get(&Field::Delegations), Some(&FieldViolation::Malformed));
    }

    #[test]
    fn test_all_violations_collected() {
        let raw = RawStakeInputs {
            profit_margin: "101".into(),
            uptime: "".into(),
            bond: "-5".into(),
            delegations: "".into(),
            operator_cost: "abc".into(),
        };
        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.0.len(), 5);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let raw = RawStakeInputs { bond: "-1".into(), ..valid_raw() };
        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.0.get(&Field::Bond), Some(&FieldViolation::Malformed));
    }

    #[test]
    fn test_amounts_capped_at_maximum() {
        // 10^24 display units is the largest accepted amount
        let max = format!("1{}", "0".repeat(24));
        let raw = RawStakeInputs { bond: max.clone(), ..valid_raw() };
        let inputs = validate(&raw).unwrap();
        assert_eq!(inputs.bond_base, MAX_AMOUNT_BASE);

        // one base unit past the cap is rejected, not wrapped into range
        let raw = RawStakeInputs { bond: format!("{max}.000001"), ..valid_raw() };
        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.0.get(&Field::Bond), Some(&FieldViolation::TooLarge));
    }

    #[test]
    fn test_zero_amounts_are_valid() {
        let raw =
            RawStakeInputs { bond: "0".into(), delegations: "0".into(), ..valid_raw() };
        let inputs = validate(&raw).unwrap();
        assert_eq!(inputs.bond_base, 0);
        assert_eq!(inputs.delegation_base, 0);
    }
}
