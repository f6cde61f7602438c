// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::order_status::OrderStatus;
use crate::stage::{StageCatalog, StageId};
use crate::stage_data::{StageData, validate_stage_data};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use time::Date;
use time::macros::format_description;

/// Maximum accepted length of an order number.
const MAX_ORDER_NUMBER_LEN: usize = 32;

/// A human-facing order number.
///
/// Order numbers are unique and immutable once assigned. They are
/// normalized to uppercase and may only contain ASCII letters, digits,
/// and dashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Creates a validated order number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is empty, too long, or contains
    /// characters other than letters, digits, and dashes.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidOrderNumber(String::from(
                "order number cannot be empty",
            )));
        }
        if trimmed.len() > MAX_ORDER_NUMBER_LEN {
            return Err(DomainError::InvalidOrderNumber(format!(
                "order number cannot exceed {MAX_ORDER_NUMBER_LEN} characters"
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(DomainError::InvalidOrderNumber(format!(
                "'{trimmed}' may only contain letters, digits, and dashes"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The production progress of an order as last read from the store.
///
/// This pair is what conditional production updates are keyed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionState {
    pub current_stage: StageId,
    pub stages_completed: BTreeSet<StageId>,
}

/// The order aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// The canonical identifier assigned by the store.
    /// `None` indicates the order has not been persisted yet.
    pub order_id: Option<i64>,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub current_stage: StageId,
    pub stages_completed: BTreeSet<StageId>,
    pub stage_data: BTreeMap<StageId, StageData>,
    pub next_action_date: Option<Date>,
    pub next_action_notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub production_manager_id: Option<i64>,
    pub csr_user_id: Option<i64>,
}

impl Order {
    /// Creates a new quote positioned at the first catalog stage.
    #[must_use]
    pub fn new(order_number: OrderNumber, catalog: &StageCatalog) -> Self {
        Self {
            order_id: None,
            order_number,
            status: OrderStatus::Quote,
            current_stage: catalog.first(),
            stages_completed: BTreeSet::new(),
            stage_data: BTreeMap::new(),
            next_action_date: None,
            next_action_notes: None,
            assigned_user_id: None,
            production_manager_id: None,
            csr_user_id: None,
        }
    }

    /// Returns the production pair used for optimistic concurrency.
    #[must_use]
    pub fn production_state(&self) -> ProductionState {
        ProductionState {
            current_stage: self.current_stage,
            stages_completed: self.stages_completed.clone(),
        }
    }

    /// Records stage metadata, replacing any previous payload for the stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage is not part of the catalog.
    pub fn set_stage_data(
        &mut self,
        catalog: &StageCatalog,
        data: StageData,
    ) -> Result<(), DomainError> {
        let stage: StageId = data.stage();
        catalog.require(stage)?;
        self.stage_data.insert(stage, data);
        validate_stage_data(&self.stage_data)
    }

    /// Checks the aggregate against the catalog.
    ///
    /// The current stage must be a catalog entry and no completed stage
    /// may come after it.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate_against(&self, catalog: &StageCatalog) -> Result<(), DomainError> {
        catalog.require(self.current_stage)?;
        for stage in &self.stages_completed {
            catalog.require(*stage)?;
            if catalog.is_after(*stage, self.current_stage) {
                return Err(DomainError::StageBeyondCurrent {
                    stage: *stage,
                    current: self.current_stage,
                });
            }
        }
        validate_stage_data(&self.stage_data)
    }
}

/// A priced line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub line_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub description: String,
    pub quantity: Option<i64>,
    /// List price charged to the client.
    pub unit_price: Option<Decimal>,
    /// Vendor cost paid by the distributor.
    pub unit_cost: Option<Decimal>,
}

/// Parses an ISO 8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::DateParseError {
            date_string: value.to_string(),
            error: e.to_string(),
        }
    })
}

/// Parses a non-negative decimal amount.
///
/// # Errors
///
/// Returns `DomainError::InvalidAmount` if the value does not parse or is negative.
pub fn parse_amount(field: &str, value: &str) -> Result<Decimal, DomainError> {
    let amount: Decimal = value
        .trim()
        .parse::<Decimal>()
        .map_err(|_| DomainError::InvalidAmount {
            field: field.to_string(),
            value: value.to_string(),
        })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DomainError::InvalidAmount {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(amount)
}
