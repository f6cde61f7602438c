// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Production stages and the ordered stage catalog.
//!
//! Stage identifiers form a closed set. Which of them an order passes
//! through, and in what sequence, is decided by the [`StageCatalog`],
//! which is loaded once at startup and validated against duplicate
//! identifiers and duplicate order ranks.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// A production stage identifier.
///
/// The derived ordering only exists so stages can key ordered maps.
/// Progression order always comes from the [`StageCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    SalesBooked,
    PoPlaced,
    ConfirmationReceived,
    ProofReceived,
    ProofApproved,
    OrderPlaced,
    OrderShipped,
    OrderDelivered,
    Invoiced,
}

impl StageId {
    /// Every stage identifier, in the standard catalog sequence.
    pub const ALL: [Self; 9] = [
        Self::SalesBooked,
        Self::PoPlaced,
        Self::ConfirmationReceived,
        Self::ProofReceived,
        Self::ProofApproved,
        Self::OrderPlaced,
        Self::OrderShipped,
        Self::OrderDelivered,
        Self::Invoiced,
    ];

    /// Returns the wire representation of the stage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SalesBooked => "sales-booked",
            Self::PoPlaced => "po-placed",
            Self::ConfirmationReceived => "confirmation-received",
            Self::ProofReceived => "proof-received",
            Self::ProofApproved => "proof-approved",
            Self::OrderPlaced => "order-placed",
            Self::OrderShipped => "order-shipped",
            Self::OrderDelivered => "order-delivered",
            Self::Invoiced => "invoiced",
        }
    }

    const fn default_name(self) -> &'static str {
        match self {
            Self::SalesBooked => "Sales Booked",
            Self::PoPlaced => "PO Placed",
            Self::ConfirmationReceived => "Confirmation Received",
            Self::ProofReceived => "Proof Received",
            Self::ProofApproved => "Proof Approved",
            Self::OrderPlaced => "Order Placed",
            Self::OrderShipped => "Order Shipped",
            Self::OrderDelivered => "Order Delivered",
            Self::Invoiced => "Invoiced",
        }
    }

    const fn default_color(self) -> &'static str {
        match self {
            Self::SalesBooked => "slate",
            Self::PoPlaced => "blue",
            Self::ConfirmationReceived => "indigo",
            Self::ProofReceived => "amber",
            Self::ProofApproved => "lime",
            Self::OrderPlaced => "teal",
            Self::OrderShipped => "cyan",
            Self::OrderDelivered => "green",
            Self::Invoiced => "violet",
        }
    }
}

impl FromStr for StageId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| DomainError::UnknownStage(s.to_string()))
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the stage catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDefinition {
    pub id: StageId,
    pub name: String,
    pub order: i32,
    pub color_tag: String,
}

/// The ordered sequence of production stages an order passes through.
///
/// Entries are held sorted by their `order` rank; no two entries share
/// an identifier or a rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
}

impl StageCatalog {
    /// Builds a catalog from externally supplied definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, or if two entries share
    /// an identifier or an order rank.
    pub fn new(mut definitions: Vec<StageDefinition>) -> Result<Self, DomainError> {
        if definitions.is_empty() {
            return Err(DomainError::EmptyStageCatalog);
        }

        let mut seen: BTreeSet<StageId> = BTreeSet::new();
        for definition in &definitions {
            if !seen.insert(definition.id) {
                return Err(DomainError::DuplicateStageId(definition.id));
            }
        }

        definitions.sort_by_key(|definition| definition.order);
        for pair in definitions.windows(2) {
            if pair[0].order == pair[1].order {
                return Err(DomainError::DuplicateStageOrder {
                    order: pair[0].order,
                    first: pair[0].id,
                    second: pair[1].id,
                });
            }
        }

        Ok(Self {
            stages: definitions,
        })
    }

    /// The built-in catalog covering every stage in its usual sequence.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            stages: Self::standard_definitions(),
        }
    }

    /// The definitions backing [`StageCatalog::standard`].
    #[must_use]
    pub fn standard_definitions() -> Vec<StageDefinition> {
        StageId::ALL
            .into_iter()
            .zip(1..)
            .map(|(id, order)| StageDefinition {
                id,
                name: id.default_name().to_string(),
                order,
                color_tag: id.default_color().to_string(),
            })
            .collect()
    }

    /// The catalog entries in progression order.
    #[must_use]
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Number of stages in the catalog.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false; an empty catalog cannot be constructed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The stage a freshly created order starts in.
    #[must_use]
    pub fn first(&self) -> StageId {
        self.stages
            .first()
            .map_or(StageId::SalesBooked, |definition| definition.id)
    }

    #[must_use]
    pub fn contains(&self, stage: StageId) -> bool {
        self.position(stage).is_some()
    }

    /// Zero-based position of a stage in progression order.
    #[must_use]
    pub fn position(&self, stage: StageId) -> Option<usize> {
        self.stages
            .iter()
            .position(|definition| definition.id == stage)
    }

    /// Looks up the definition of a stage.
    #[must_use]
    pub fn get(&self, stage: StageId) -> Option<&StageDefinition> {
        self.stages.iter().find(|definition| definition.id == stage)
    }

    /// Validates that a stage belongs to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StageNotInCatalog` otherwise.
    pub fn require(&self, stage: StageId) -> Result<usize, DomainError> {
        self.position(stage)
            .ok_or(DomainError::StageNotInCatalog(stage))
    }

    /// The stage following `stage`, or `None` if it is the last one.
    #[must_use]
    pub fn next_after(&self, stage: StageId) -> Option<StageId> {
        let position = self.position(stage)?;
        self.stages.get(position + 1).map(|definition| definition.id)
    }

    /// Returns true if `stage` comes strictly after `reference`.
    ///
    /// Stages outside the catalog are never considered "after" anything.
    #[must_use]
    pub fn is_after(&self, stage: StageId, reference: StageId) -> bool {
        match (self.position(stage), self.position(reference)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        }
    }

    /// Returns the given stages sorted into progression order.
    ///
    /// Stages outside the catalog are placed last, in identifier order.
    #[must_use]
    pub fn sorted<'a>(&self, stages: impl IntoIterator<Item = &'a StageId>) -> Vec<StageId> {
        let mut sorted: Vec<StageId> = stages.into_iter().copied().collect();
        sorted.sort_by_key(|stage| (self.position(*stage).unwrap_or(usize::MAX), *stage));
        sorted.dedup();
        sorted
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
