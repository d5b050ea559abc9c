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

//! Period projection: per-epoch reward split to daily/monthly/yearly income
//! rates, normalized per [`REFERENCE_STAKE_UNITS`] display units of stake.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::units::checked_to_milli_rounded;
use crate::validate::StakeInputs;

/// Rates are expressed per this many display units of stake.
pub const REFERENCE_STAKE_UNITS: u128 = 1000;

/// Calendar approximation used by the playground; projections scale
/// linearly and deliberately do not model compounding.
const DAYS_PER_MONTH: u128 = 30;
const DAYS_PER_YEAR: u128 = 365;

/// A node's estimated reward for one epoch, split between the operator and
/// its delegators. Base units throughout; produced by the chain-query
/// service and immutable once received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSplit {
    /// Operator share of the epoch reward.
    pub operator_reward: u128,
    /// Combined delegator share of the epoch reward.
    pub delegator_reward: u128,
    /// Operating cost deducted before distribution.
    pub operating_cost: u128,
}

/// A projected income rate in milli display units, or the sentinel for a
/// zero-stake denominator.
///
/// Zero stake is a valid playground state (the user has not entered an
/// amount yet), so the undefined case is a value, not an error. The same
/// sentinel covers rationals whose scaled numerator or denominator exceeds
/// `u128` (astronomical service rewards or stakes); arithmetic never wraps
/// or panics. It renders as an em dash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {
    Defined(u128),
    Undefined,
}

impl Rate {
    pub fn is_defined(&self) -> bool {
        matches!(self, Rate::Defined(_))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Defined(milli) => f.write_str(&crate::units::format_milli(*milli)),
            Rate::Undefined => f.write_str("—"),
        }
    }
}

// Presentation-facing: rates serialize as their display string.
impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Daily, monthly and yearly rates for one share of the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodRates {
    pub daily: Rate,
    pub monthly: Rate,
    pub yearly: Rate,
}

/// The full projection table: total, operator and delegator rows.
///
/// Recomputed on every input change, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodProjection {
    pub total: PeriodRates,
    pub operator: PeriodRates,
    pub delegator: PeriodRates,
}

fn rate(num: u128, days: u128, den: u128) -> Rate {
    match num.checked_mul(days).and_then(|n| checked_to_milli_rounded(n, den)) {
        Some(milli) => Rate::Defined(milli),
        None => Rate::Undefined,
    }
}

// Each period cell is rounded exactly once from the rational
// num/den = REFERENCE_STAKE_UNITS * daily_reward_micro / stake_micro, so
// monthly and yearly never accumulate the daily cell's rounding error.
fn period_rates(num: u128, den: u128) -> PeriodRates {
    PeriodRates {
        daily: rate(num, 1, den),
        monthly: rate(num, DAYS_PER_MONTH, den),
        yearly: rate(num, DAYS_PER_YEAR, den),
    }
}

const UNDEFINED_RATES: PeriodRates =
    PeriodRates { daily: Rate::Undefined, monthly: Rate::Undefined, yearly: Rate::Undefined };

/// Project a per-epoch reward split across display periods.
///
/// `epochs_per_day` is the chain's epoch cadence (see
/// [`crate::DEFAULT_EPOCHS_PER_DAY`]). Inputs are unsigned by construction;
/// the validator has already rejected anything malformed. Every
/// multiplication is checked, so rationals outside `u128` degrade to
/// [`Rate::Undefined`] cells instead of wrapping.
pub fn project(split: &RewardSplit, inputs: &StakeInputs, epochs_per_day: u32) -> PeriodProjection {
    let epochs = u128::from(epochs_per_day);
    let operator_num = REFERENCE_STAKE_UNITS
        .checked_mul(split.operator_reward)
        .and_then(|n| n.checked_mul(epochs));
    let delegator_num = REFERENCE_STAKE_UNITS
        .checked_mul(split.delegator_reward)
        .and_then(|n| n.checked_mul(epochs));

    let operator = match (operator_num, inputs.bond_base) {
        (None, _) | (_, 0) => UNDEFINED_RATES,
        (Some(num), bond) => period_rates(num, bond),
    };
    let delegator = match (delegator_num, inputs.delegation_base) {
        (None, _) | (_, 0) => UNDEFINED_RATES,
        (Some(num), delegation) => period_rates(num, delegation),
    };

    // The total row sums the exact rationals over a common denominator
    // before its single rounding; it is undefined whenever either side is,
    // or when the common denominator leaves u128.
    let total = match (operator_num, delegator_num, inputs.bond_base, inputs.delegation_base) {
        (Some(op_num), Some(del_num), bond, delegation) if bond > 0 && delegation > 0 => {
            let num = op_num
                .checked_mul(delegation)
                .zip(del_num.checked_mul(bond))
                .and_then(|(a, b)| a.checked_add(b));
            match (num, bond.checked_mul(delegation)) {
                (Some(num), Some(den)) => period_rates(num, den),
                _ => UNDEFINED_RATES,
            }
        }
        _ => UNDEFINED_RATES,
    };

    PeriodProjection { total, operator, delegator }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate, RawStakeInputs};

    fn inputs(bond: &str, delegations: &str) -> StakeInputs {
        validate(&RawStakeInputs {
            profit_margin: "10".into(),
            uptime: "100".into(),
            bond: bond.into(),
            delegations: delegations.into(),
            operator_cost: "40".into(),
        })
        .unwrap()
    }

    fn split(operator: u128, delegator: u128) -> RewardSplit {
        RewardSplit { operator_reward: operator, delegator_reward: delegator, operating_cost: 0 }
    }

    #[test]
    fn test_reference_scenario() {
        // 1 display unit per epoch, hourly epochs, 1000 bonded:
        // daily = 24, rate = 1000 * 24 / 1000 = 24.000
        let projection = project(&split(1_000_000, 0), &inputs("1000", "500"), 24);
        assert_eq!(projection.operator.daily.to_string(), "24.000");
        assert_eq!(projection.operator.monthly.to_string(), "720.000");
        assert_eq!(projection.operator.yearly.to_string(), "8760.000");
    }

    #[test]
    fn test_total_is_sum_of_shares() {
        let projection =
            project(&split(1_000_000, 2_000_000), &inputs("1000", "1000"), 24);
        assert_eq!(projection.operator.daily, Rate::Defined(24_000));
        assert_eq!(projection.delegator.daily, Rate::Defined(48_000));
        assert_eq!(projection.total.daily, Rate::Defined(72_000));
    }

    #[test]
    fn test_zero_bond_yields_sentinel() {
        let projection = project(&split(1_000_000, 1_000_000), &inputs("0", "500"), 24);
        assert_eq!(projection.operator.daily, Rate::Undefined);
        assert_eq!(projection.operator.daily.to_string(), "—");
        // delegator side is independent of the bond
        assert!(projection.delegator.daily.is_defined());
        // total needs both denominators
        assert_eq!(projection.total.yearly, Rate::Undefined);
    }

    #[test]
    fn test_operator_rate_strictly_decreasing_in_bond() {
        let reward = split(5_000_000, 0);
        let mut last = u128::MAX;
        for bond in ["100", "1000", "2500", "40000"] {
            let projection = project(&reward, &inputs(bond, "1"), 24);
            let Rate::Defined(daily) = projection.operator.daily else {
                panic!("expected a defined rate");
            };
            assert!(daily < last, "rate did not decrease at bond {bond}");
            last = daily;
        }
    }

    #[test]
    fn test_every_cell_has_three_fraction_digits() {
        let projection = project(&split(123_456, 654_321), &inputs("777", "333.25"), 24);
        for rates in [projection.total, projection.operator, projection.delegator] {
            for cell in [rates.daily, rates.monthly, rates.yearly] {
                let rendered = cell.to_string();
                let (_, frac) = rendered.split_once('.').expect("missing fraction");
                assert_eq!(frac.len(), 3, "bad cell {rendered}");
            }
        }
    }

    #[test]
    fn test_periods_round_from_exact_rational() {
        // daily rate is 0.000168, which rounds to 0.000; the yearly cell
        // must still come out as 0.061, not 365 * round(daily) = 0.
        let projection = project(&split(7, 0), &inputs("1000", "1"), 24);
        assert_eq!(projection.operator.daily, Rate::Defined(0));
        assert_eq!(projection.operator.yearly, Rate::Defined(61));
    }

    #[test]
    fn test_huge_validated_stake_does_not_wrap() {
        // 10^20 display units passes validation; the total row's common
        // denominator leaves u128 and must degrade to the sentinel rather
        // than panic or wrap
        let huge = format!("1{}", "0".repeat(20));
        let projection =
            project(&split(1_000_000, 1_000_000), &inputs(&huge, &huge), 24);
        assert!(projection.operator.daily.is_defined());
        assert!(projection.delegator.yearly.is_defined());
        assert_eq!(projection.total.daily, Rate::Undefined);
    }

    #[test]
    fn test_astronomical_reward_degrades_to_sentinel() {
        let projection = project(&split(u128::MAX, 1_000_000), &inputs("1000", "500"), 24);
        assert_eq!(projection.operator.daily, Rate::Undefined);
        assert_eq!(projection.operator.yearly, Rate::Undefined);
        assert_eq!(projection.total.monthly, Rate::Undefined);
        // the well-behaved share is unaffected
        assert_eq!(projection.delegator.daily.to_string(), "48.000");
    }

    #[test]
    fn test_rate_serializes_as_display_string() {
        let projection = project(&split(1_000_000, 0), &inputs("1000", "0"), 24);
        let json = serde_json::to_value(projection.operator).unwrap();
        assert_eq!(json["daily"], "24.000");
        let json = serde_json::to_value(projection.delegator).unwrap();
        assert_eq!(json["daily"], "—");
    }
}
