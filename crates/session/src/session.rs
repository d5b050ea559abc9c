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

//! The estimation session state machine.
//!
//! A session is Idle until a node is selected, then Active with a cached
//! reward split, saturation point and the latest computed projection.
//! Mutation is serialized through the inner lock; fetches are awaited with
//! the lock released and commit only if no newer select/refresh/reset has
//! bumped the sequence number in the meantime, so out-of-order responses
//! never overwrite newer state.

use std::num::NonZeroU128;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stakeview_rewards::{
    project, stake_saturation, units, validate, PeriodProjection, RawStakeInputs, RewardSplit,
    SaturationPercent, StakeInputs, ValidationErrors, DEFAULT_EPOCHS_PER_DAY,
};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::client::{
    ChainQuery, NodeId, RewardEstimateRequest, RewardEstimateResponse, RewardingParameters,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// The chain's epoch cadence, epochs per 24 hours.
    pub epochs_per_day: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { epochs_per_day: DEFAULT_EPOCHS_PER_DAY }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("chain query failed: {0}")]
    UpstreamFetchFailed(anyhow::Error),

    #[error("invalid inputs: {0}")]
    InvalidInputs(ValidationErrors),

    #[error("no node selected")]
    NoActiveNode,

    #[error("rewarding parameters report a non-positive stake saturation point")]
    InvalidSaturationPoint,
}

/// The selected node's current on-chain values, used to seed the editable
/// inputs. Amounts in display units, percentages in [0, 100].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub node_id: NodeId,
    pub bond: String,
    pub uptime: String,
    pub profit_margin: String,
}

/// A partial edit of the playground form; `None` fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEdit {
    pub profit_margin: Option<String>,
    pub uptime: Option<String>,
    pub bond: Option<String>,
    pub delegations: Option<String>,
    pub operator_cost: Option<String>,
}

impl InputEdit {
    fn apply(&self, raw: &RawStakeInputs) -> RawStakeInputs {
        RawStakeInputs {
            profit_margin: self.profit_margin.clone().unwrap_or_else(|| raw.profit_margin.clone()),
            uptime: self.uptime.clone().unwrap_or_else(|| raw.uptime.clone()),
            bond: self.bond.clone().unwrap_or_else(|| raw.bond.clone()),
            delegations: self.delegations.clone().unwrap_or_else(|| raw.delegations.clone()),
            operator_cost: self.operator_cost.clone().unwrap_or_else(|| raw.operator_cost.clone()),
        }
    }
}

/// Whether an input edit recomputes from the cached reward split or issues
/// a fresh estimation request for the edited stake hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    UseCached,
    RefetchEstimate,
}

/// The presentation-facing view of an Active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimationView {
    pub node_id: NodeId,
    pub inputs: RawStakeInputs,
    pub projection: PeriodProjection,
    pub saturation: SaturationPercent,
    /// When the underlying estimate was computed, per the service.
    pub as_at: DateTime<Utc>,
}

/// Result of an operation that may have been overtaken by a newer one.
///
/// `Superseded` is internal bookkeeping, not a failure: the response that
/// lost the race is discarded and the state already reflects the winner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(EstimationView),
    Superseded,
}

struct Active {
    node_id: NodeId,
    raw: RawStakeInputs,
    split: RewardSplit,
    saturation_point: NonZeroU128,
    projection: PeriodProjection,
    saturation: SaturationPercent,
    as_at: DateTime<Utc>,
}

impl Active {
    fn view(&self) -> EstimationView {
        EstimationView {
            node_id: self.node_id,
            inputs: self.raw.clone(),
            projection: self.projection,
            saturation: self.saturation,
            as_at: self.as_at,
        }
    }
}

enum State {
    Idle,
    Active(Active),
}

struct Inner {
    /// Bumped by every select, refresh, reset and commit; a fetch commits
    /// only if the number it captured is still current.
    seq: u64,
    state: State,
}

/// One estimation session per selected node.
pub struct EstimationSession<C> {
    client: Arc<C>,
    config: SessionConfig,
    inner: Arc<Mutex<Inner>>,
}

impl<C> Clone for EstimationSession<C> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), config: self.config, inner: self.inner.clone() }
    }
}

impl<C: ChainQuery> EstimationSession<C> {
    pub fn new(client: Arc<C>, config: SessionConfig) -> Self {
        Self { client, config, inner: Arc::new(Mutex::new(Inner { seq: 0, state: State::Idle })) }
    }

    /// The latest committed view, if a node is selected.
    pub async fn current(&self) -> Option<EstimationView> {
        match &self.inner.lock().await.state {
            State::Idle => None,
            State::Active(active) => Some(active.view()),
        }
    }

    /// Select a node: seed the editable inputs from its on-chain values and
    /// the account's delegation summary, fetch the initial estimate and
    /// rewarding parameters, and compute the first projection.
    ///
    /// A failed fetch leaves the session in its previous state.
    pub async fn select_node(&self, node: &NodeSnapshot) -> Result<Outcome, SessionError> {
        let seq = self.begin().await;

        let summary = self
            .client
            .delegation_summary()
            .await
            .map_err(SessionError::UpstreamFetchFailed)?;

        let mut raw = RawStakeInputs {
            profit_margin: node.profit_margin.clone(),
            uptime: node.uptime.clone(),
            bond: node.bond.clone(),
            delegations: summary.total_delegations.amount.clone(),
            // placeholder until the estimate reports the actual cost
            operator_cost: "0".to_string(),
        };
        let inputs = validate(&raw).map_err(SessionError::InvalidInputs)?;

        let estimate = self.fetch_estimate(node.node_id, &inputs).await?;
        let saturation_point = self.fetch_saturation_point().await?;

        // Seed the editable operator cost from the estimate, with the
        // shared display precision.
        raw.operator_cost = units::display_3_from_base(estimate.estimation.operating_cost);
        let inputs = validate(&raw).map_err(SessionError::InvalidInputs)?;

        let mut inner = self.inner.lock().await;
        if inner.seq != seq {
            tracing::debug!(
                node_id = node.node_id,
                seq,
                current = inner.seq,
                "discarding stale select_node response"
            );
            return Ok(Outcome::Superseded);
        }
        let active = self.recompute(
            node.node_id,
            raw,
            &inputs,
            estimate.estimation.into(),
            saturation_point,
            estimate.as_at,
        );
        let view = active.view();
        inner.state = State::Active(active);
        Ok(Outcome::Applied(view))
    }

    /// Merge a partial edit into the inputs, revalidate, and recompute.
    ///
    /// With [`RefreshPolicy::UseCached`] the projection is recomputed
    /// synchronously from the cached reward split and saturation point (no
    /// network round-trip); with [`RefreshPolicy::RefetchEstimate`] a new
    /// estimation request carrying the edited bond/delegation/uptime is
    /// issued first.
    pub async fn update_inputs(
        &self,
        edit: &InputEdit,
        refresh: RefreshPolicy,
    ) -> Result<Outcome, SessionError> {
        let mut inner = self.inner.lock().await;
        let active = match &inner.state {
            State::Idle => return Err(SessionError::NoActiveNode),
            State::Active(active) => active,
        };

        let raw = edit.apply(&active.raw);
        let inputs = validate(&raw).map_err(SessionError::InvalidInputs)?;
        let node_id = active.node_id;
        let (split, saturation_point, as_at) =
            (active.split, active.saturation_point, active.as_at);

        match refresh {
            RefreshPolicy::UseCached => {
                // a commit invalidates any fetch still in flight
                inner.seq += 1;
                let updated = self.recompute(
                    node_id,
                    raw,
                    &inputs,
                    split,
                    saturation_point,
                    as_at,
                );
                let view = updated.view();
                inner.state = State::Active(updated);
                Ok(Outcome::Applied(view))
            }
            RefreshPolicy::RefetchEstimate => {
                inner.seq += 1;
                let seq = inner.seq;
                drop(inner);

                let estimate = self.fetch_estimate(node_id, &inputs).await?;
                let saturation_point = self.fetch_saturation_point().await?;

                let mut inner = self.inner.lock().await;
                if inner.seq != seq {
                    tracing::debug!(
                        node_id,
                        seq,
                        current = inner.seq,
                        "discarding stale refresh response"
                    );
                    return Ok(Outcome::Superseded);
                }
                let updated = self.recompute(
                    node_id,
                    raw,
                    &inputs,
                    estimate.estimation.into(),
                    saturation_point,
                    estimate.as_at,
                );
                let view = updated.view();
                inner.state = State::Active(updated);
                Ok(Outcome::Applied(view))
            }
        }
    }

    /// Drop back to Idle. Outstanding fetches are invalidated and will be
    /// discarded when they arrive.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.seq += 1;
        inner.state = State::Idle;
    }

    async fn begin(&self) -> u64 {
        let mut inner = self.inner.lock().await;
        inner.seq += 1;
        inner.seq
    }

    async fn fetch_estimate(
        &self,
        node_id: NodeId,
        inputs: &StakeInputs,
    ) -> Result<RewardEstimateResponse, SessionError> {
        let request = RewardEstimateRequest {
            node_id,
            // uptime ppm is at micro scale, so this renders the fraction
            performance: units::display_from_base(u128::from(inputs.uptime_ppm)),
            pledge_amount: inputs.bond_base,
            total_delegation: inputs.delegation_base,
        };
        self.client.estimate_reward(request).await.map_err(|e| {
            tracing::warn!(node_id, "reward estimation failed: {e:#}");
            SessionError::UpstreamFetchFailed(e)
        })
    }

    async fn fetch_saturation_point(&self) -> Result<NonZeroU128, SessionError> {
        let RewardingParameters { stake_saturation_point } = self
            .client
            .rewarding_parameters()
            .await
            .map_err(SessionError::UpstreamFetchFailed)?;
        NonZeroU128::new(stake_saturation_point).ok_or(SessionError::InvalidSaturationPoint)
    }

    fn recompute(
        &self,
        node_id: NodeId,
        raw: RawStakeInputs,
        inputs: &StakeInputs,
        split: RewardSplit,
        saturation_point: NonZeroU128,
        as_at: DateTime<Utc>,
    ) -> Active {
        let projection = project(&split, inputs, self.config.epochs_per_day);
        let saturation = stake_saturation(inputs, saturation_point);
        tracing::debug!(node_id, %saturation, "recomputed estimation");
        Active { node_id, raw, split, saturation_point, projection, saturation, as_at }
    }
}
