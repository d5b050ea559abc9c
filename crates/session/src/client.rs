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

//! The chain-query service boundary.
//!
//! The session consumes the remote estimation service as a black box: the
//! response shapes below are a stable contract, the reads are idempotent
//! and side-effect-free, and retry/deadline policy belongs to the caller
//! implementing [`ChainQuery`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stakeview_rewards::RewardSplit;

/// Identifier of a bonded node in the mix network.
pub type NodeId = u32;

/// Parameters for one reward estimation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEstimateRequest {
    pub node_id: NodeId,
    /// Node performance as a decimal fraction string, e.g. `"0.95"`.
    pub performance: String,
    /// Hypothetical operator pledge, base units (floor-truncated).
    pub pledge_amount: u128,
    /// Hypothetical total delegation, base units (floor-truncated).
    pub total_delegation: u128,
}

/// The service's reward estimate for a single epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEstimate {
    /// Operator share, base units per epoch.
    pub operator: u128,
    /// Combined delegator share, base units per epoch.
    pub delegates: u128,
    /// Operating cost, base units.
    pub operating_cost: u128,
}

impl From<RewardEstimate> for RewardSplit {
    fn from(estimate: RewardEstimate) -> Self {
        RewardSplit {
            operator_reward: estimate.operator,
            delegator_reward: estimate.delegates,
            operating_cost: estimate.operating_cost,
        }
    }
}

/// Full estimation response. Set sizes and the timestamp are carried for
/// display; the projection arithmetic does not consume them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEstimateResponse {
    pub estimation: RewardEstimate,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub as_at: DateTime<Utc>,
    pub rewarded_set_size: u32,
    pub active_set_size: u32,
}

/// Network-wide rewarding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardingParameters {
    /// Total stake above which additional stake on a node yields no
    /// additional reward share, base units.
    pub stake_saturation_point: u128,
}

/// A display-denomination amount as the service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    pub amount: String,
    pub denom: String,
}

/// The wallet account's delegations toward the selected node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationSummary {
    pub total_delegations: CurrencyAmount,
}

/// Black-box reads against the remote estimation service.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn estimate_reward(
        &self,
        request: RewardEstimateRequest,
    ) -> anyhow::Result<RewardEstimateResponse>;

    async fn rewarding_parameters(&self) -> anyhow::Result<RewardingParameters>;

    async fn delegation_summary(&self) -> anyhow::Result<DelegationSummary>;
}
