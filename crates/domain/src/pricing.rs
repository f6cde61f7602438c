// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Price and quantity resolution for document snapshots.
//!
//! Resolution order for a line's unit price:
//!
//! 1. The edited value supplied with the request, if any.
//! 2. For a purchase order, the vendor cost, falling back to the list price.
//! 3. For a quote, the list price.
//!
//! Quantity resolves to the edited value, then the persisted value, then a
//! per-document default (1 for quotes, 0 for purchase orders). A line with
//! nothing resolvable contributes zero rather than failing the document.

use crate::document::DocumentType;
use crate::error::DomainError;
use crate::types::OrderLine;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Decimal places kept on money values.
const MONEY_SCALE: u32 = 2;

/// An in-request override for a single order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEdit {
    pub line_id: i64,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<i64>,
}

/// One line of a price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub line_id: Option<i64>,
    pub vendor_id: Option<i64>,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub line_total: Decimal,
}

/// The priced content of a quote or purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolves the unit price of a line for the given document type.
#[must_use]
pub fn resolve_unit_price(
    document_type: DocumentType,
    line: &OrderLine,
    edit: Option<&LineEdit>,
) -> Decimal {
    if let Some(price) = edit.and_then(|e| e.unit_price) {
        return price;
    }
    let persisted: Option<Decimal> = match document_type {
        DocumentType::PurchaseOrder => line.unit_cost.or(line.unit_price),
        DocumentType::Quote => line.unit_price,
    };
    persisted.unwrap_or(Decimal::ZERO)
}

/// Resolves the quantity of a line for the given document type.
#[must_use]
pub fn resolve_quantity(
    document_type: DocumentType,
    line: &OrderLine,
    edit: Option<&LineEdit>,
) -> i64 {
    let default: i64 = match document_type {
        DocumentType::Quote => 1,
        DocumentType::PurchaseOrder => 0,
    };
    edit.and_then(|e| e.quantity)
        .or(line.quantity)
        .unwrap_or(default)
}

fn check_amount(field: &str, value: Decimal) -> Result<(), DomainError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::InvalidAmount {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn overflow(field: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::InvalidAmount {
        field: field.to_string(),
        value: format!("{value} is out of range"),
    }
}

fn check_quantity(line_id: Option<i64>, value: Option<i64>) -> Result<(), DomainError> {
    match value {
        Some(q) if q < 0 => Err(DomainError::InvalidQuantity { line_id, value: q }),
        _ => Ok(()),
    }
}

/// Builds the price snapshot for a document.
///
/// Purchase orders include only the lines of `vendor_id`; quotes include
/// every line.
///
/// # Errors
///
/// Returns an error if an edit references a line that is not part of the
/// order, if any quantity, price, discount, or tax is negative, or if a
/// line total or the document total is too large to represent.
pub fn price_lines(
    document_type: DocumentType,
    vendor_id: Option<i64>,
    lines: &[OrderLine],
    edits: &[LineEdit],
    discount: Decimal,
    tax: Decimal,
) -> Result<PriceSnapshot, DomainError> {
    check_amount("discount", discount)?;
    check_amount("tax", tax)?;

    let known: BTreeSet<i64> = lines.iter().filter_map(|l| l.line_id).collect();
    for edit in edits {
        if !known.contains(&edit.line_id) {
            return Err(DomainError::UnknownLine(edit.line_id));
        }
        check_quantity(Some(edit.line_id), edit.quantity)?;
        if let Some(price) = edit.unit_price {
            check_amount("unitPrice", price)?;
        }
    }

    let mut priced: Vec<PricedLine> = Vec::new();
    for line in lines {
        if document_type == DocumentType::PurchaseOrder && line.vendor_id != vendor_id {
            continue;
        }
        check_quantity(line.line_id, line.quantity)?;

        let edit: Option<&LineEdit> = line
            .line_id
            .and_then(|id| edits.iter().rev().find(|e| e.line_id == id));
        let unit_price: Decimal = resolve_unit_price(document_type, line, edit);
        let quantity: i64 = resolve_quantity(document_type, line, edit);
        let line_total: Decimal = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| overflow("lineTotal", format!("{unit_price} x {quantity}")))?;

        priced.push(PricedLine {
            line_id: line.line_id,
            vendor_id: line.vendor_id,
            description: line.description.clone(),
            unit_price,
            quantity,
            line_total: round_money(line_total),
        });
    }

    let subtotal: Decimal = priced
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.line_total))
        .map(round_money)
        .ok_or_else(|| overflow("subtotal", "sum of line totals"))?;
    let total: Decimal = subtotal
        .checked_sub(discount)
        .and_then(|t| t.checked_add(tax))
        .map(round_money)
        .ok_or_else(|| overflow("total", subtotal))?;

    Ok(PriceSnapshot {
        lines: priced,
        subtotal,
        discount: round_money(discount),
        tax: round_money(tax),
        total,
    })
}
