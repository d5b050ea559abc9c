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

//! Conversion between base (micro) units and the display denomination.
//!
//! Every displayed decimal in the playground goes through this module so
//! that a single rounding policy (3 fractional digits, half away from zero)
//! applies everywhere instead of ad hoc per-call formatting.

use thiserror::Error;

/// Base units per display unit. On-chain amounts are micro-units.
pub const BASE_UNITS_PER_DISPLAY: u128 = 1_000_000;

/// Milli-units per display unit, the resolution of displayed values.
pub const MILLI_PER_DISPLAY: u128 = 1_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount: {0:?} is not a non-negative decimal")]
    InvalidAmount(String),
}

/// Parse a non-negative decimal string into base units.
///
/// Fractional digits past the sixth are discarded (truncation toward zero),
/// matching the precision of on-chain amounts. Signs, exponents and
/// grouping separators are rejected.
pub fn parse_display_amount(input: &str) -> Result<u128, AmountError> {
    let s = input.trim();
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::InvalidAmount(input.to_string()));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(AmountError::InvalidAmount(input.to_string()));
    }

    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| AmountError::InvalidAmount(input.to_string()))?
    };

    let mut frac: u128 = 0;
    let kept = frac_part.len().min(6);
    for b in frac_part.bytes().take(6) {
        frac = frac * 10 + u128::from(b - b'0');
    }
    frac *= 10u128.pow(6 - kept as u32);

    whole
        .checked_mul(BASE_UNITS_PER_DISPLAY)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| AmountError::InvalidAmount(input.to_string()))
}

/// Render base units as a display-denomination decimal string.
///
/// Trailing fractional zeros are trimmed, so the result round-trips through
/// [`parse_display_amount`] without loss.
pub fn display_from_base(base: u128) -> String {
    let whole = base / BASE_UNITS_PER_DISPLAY;
    let frac = base % BASE_UNITS_PER_DISPLAY;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:06}");
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Divide with rounding half away from zero (all inputs are unsigned, so
/// this is half-up). `den` must be non-zero.
pub fn div_round(num: u128, den: u128) -> u128 {
    let q = num / den;
    let r = num % den;
    // r >= den - r avoids doubling r, which could overflow for huge den
    if r >= den - r {
        q + 1
    } else {
        q
    }
}

/// Rounded division scaled to milli-unit resolution: `num / den` as a count
/// of thousandths.
pub fn to_milli_rounded(num: u128, den: u128) -> u128 {
    div_round(num * MILLI_PER_DISPLAY, den)
}

/// [`to_milli_rounded`] without the precondition that the scaled numerator
/// fits `u128`; `None` on overflow.
pub fn checked_to_milli_rounded(num: u128, den: u128) -> Option<u128> {
    num.checked_mul(MILLI_PER_DISPLAY).map(|n| div_round(n, den))
}

/// Format a milli-unit count with exactly 3 fractional digits.
pub fn format_milli(milli: u128) -> String {
    format!("{}.{:03}", milli / MILLI_PER_DISPLAY, milli % MILLI_PER_DISPLAY)
}

/// Base units rendered with the displayed 3-digit precision, e.g. for
/// seeding an editable amount field from an on-chain value.
pub fn display_3_from_base(base: u128) -> String {
    // micro to milli is a plain rounded division, total for any u128
    format_milli(div_round(base, BASE_UNITS_PER_DISPLAY / MILLI_PER_DISPLAY))
}
