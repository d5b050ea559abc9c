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

//! Pure computation core of the Stakeview APY playground: unit conversion,
//! input validation, period projection and stake saturation.
//!
//! Everything here is synchronous and side-effect-free; the authoritative
//! reward formula lives in the chain-query service, and this crate only
//! re-projects an already-computed epoch reward into other time windows.

// Declare modules
pub mod project;
pub mod saturation;
pub mod units;
pub mod validate;

// Re-export commonly used types
pub use project::{project, PeriodProjection, PeriodRates, Rate, RewardSplit};

pub use saturation::{stake_saturation, SaturationPercent};

pub use units::{
    display_from_base, format_milli, parse_display_amount, AmountError, BASE_UNITS_PER_DISPLAY,
};

pub use validate::{validate, Field, FieldViolation, RawStakeInputs, StakeInputs, ValidationErrors};

/// Reward epochs per day for an hourly epoch cadence. The session config
/// overrides this when the chain runs a different interval.
pub const DEFAULT_EPOCHS_PER_DAY: u32 = 24;
