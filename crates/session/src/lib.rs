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

//! Estimation sessions for the Stakeview APY playground.
//!
//! One session per selected node: it holds the hypothetical inputs, caches
//! the last fetched reward split and saturation point, and recomputes the
//! projection (via `stakeview-rewards`) on every edit. The chain-query
//! service is consumed behind the [`ChainQuery`] trait.

pub mod client;
pub mod session;

pub use client::{
    ChainQuery, CurrencyAmount, DelegationSummary, NodeId, RewardEstimate, RewardEstimateRequest,
    RewardEstimateResponse, RewardingParameters,
};

pub use session::{
    EstimationSession, EstimationView, InputEdit, NodeSnapshot, Outcome, RefreshPolicy,
    SessionConfig, SessionError,
};
