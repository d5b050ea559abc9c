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

//! Stake saturation from hypothetical bond and delegation totals.

use std::fmt;
use std::num::NonZeroU128;

use serde::{Serialize, Serializer};

use crate::units::{format_milli, to_milli_rounded};
use crate::validate::StakeInputs;

/// A stake saturation percentage in milli-percent. Unbounded above 100%
/// (over-saturated nodes are representable), never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SaturationPercent(pub u128);

impl fmt::Display for SaturationPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_milli(self.0))
    }
}

impl Serialize for SaturationPercent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Recompute stake saturation against the network's saturation point.
///
/// Both sides stay in base units so no precision is lost to unit
/// conversion; the one rounding happens at the displayed third digit. A
/// non-positive saturation point is a configuration error and is
/// unrepresentable here. The scaled numerator stays within `u128` for any
/// validated inputs: both amounts are capped at
/// [`crate::validate::MAX_AMOUNT_BASE`].
pub fn stake_saturation(inputs: &StakeInputs, point: NonZeroU128) -> SaturationPercent {
    let staked = inputs.bond_base + inputs.delegation_base;
    SaturationPercent(to_milli_rounded(100 * staked, point.get()))
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
            operator_cost: "0".into(),
        })
        .unwrap()
    }

    fn point(v: u128) -> NonZeroU128 {
        NonZeroU128::new(v).unwrap()
    }

    #[test]
    fn test_zero_stake_is_zero_percent() {
        let saturation = stake_saturation(&inputs("0", "0"), point(1_000_000_000_000));
        assert_eq!(saturation, SaturationPercent(0));
        assert_eq!(saturation.to_string(), "0.000");
    }

    #[test]
    fn test_scales_linearly_with_total_stake() {
        let p = point(1_000_000_000_000); // 1M display units
        let one = stake_saturation(&inputs("100000", "150000"), p);
        let two = stake_saturation(&inputs("200000", "300000"), p);
        assert_eq!(two.0, 2 * one.0);
        assert_eq!(one.to_string(), "25.000");
    }

    #[test]
    fn test_bond_and_delegation_are_interchangeable() {
        let p = point(2_000_000_000_000);
        assert_eq!(
            stake_saturation(&inputs("500000", "0"), p),
            stake_saturation(&inputs("0", "500000"), p),
        );
    }

    #[test]
    fn test_over_saturation_exceeds_100() {
        let saturation = stake_saturation(&inputs("900000", "600000"), point(1_000_000_000_000));
        assert_eq!(saturation.to_string(), "150.000");
    }

    #[test]
    fn test_maximum_validated_amounts_stay_in_range() {
        // both fields at the validator's amount cap against the smallest
        // saturation point; the computation must not wrap
        let max = format!("1{}", "0".repeat(24));
        let saturation = stake_saturation(&inputs(&max, &max), point(1));
        // 100 * (2 * cap) percent, in milli-percent
        assert_eq!(saturation.0, 200_000 * crate::validate::MAX_AMOUNT_BASE);
    }

    #[test]
    fn test_rounds_at_third_digit() {
        // 1 / 3000 of the point = 0.03333...%
        let saturation = stake_saturation(&inputs("1", "0"), point(3_000_000_000));
        assert_eq!(saturation.to_string(), "0.033");
    }
}
