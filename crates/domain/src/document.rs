// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::pricing::PriceSnapshot;
use crate::types::OrderNumber;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Quote,
    PurchaseOrder,
}

impl DocumentType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::PurchaseOrder => "purchase_order",
        }
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quote" => Ok(Self::Quote),
            "purchase_order" => Ok(Self::PurchaseOrder),
            _ => Err(DomainError::InvalidDocumentType(s.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commercial status of a generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Sent,
    Approved,
    Paid,
    Cancelled,
}

impl DocumentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        let valid = match self {
            Self::Draft => matches!(new_status, Self::Sent | Self::Cancelled),
            Self::Sent => matches!(new_status, Self::Approved | Self::Cancelled),
            Self::Approved => matches!(new_status, Self::Paid | Self::Cancelled),
            Self::Paid | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            let reason: &str = if self.is_terminal() {
                "cannot transition from terminal state"
            } else {
                "transition not permitted by document lifecycle rules"
            };
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: reason.to_string(),
            })
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "approved" => Ok(Self::Approved),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidDocumentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the single document slot of an order.
///
/// There is at most one generated document per key. Quotes carry no
/// vendor; purchase orders always carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub order_id: i64,
    pub document_type: DocumentType,
    pub vendor_id: Option<i64>,
}

impl DocumentKey {
    /// Validates the vendor rules for the document type.
    ///
    /// # Errors
    ///
    /// Returns an error if a purchase order lacks a vendor, a quote has
    /// one, or the vendor id is not positive.
    pub fn new(
        order_id: i64,
        document_type: DocumentType,
        vendor_id: Option<i64>,
    ) -> Result<Self, DomainError> {
        match (document_type, vendor_id) {
            (DocumentType::Quote, Some(_)) => return Err(DomainError::VendorNotAllowed),
            (DocumentType::PurchaseOrder, None) => return Err(DomainError::VendorRequired),
            (_, Some(id)) if id <= 0 => return Err(DomainError::InvalidVendorId(id)),
            _ => {}
        }
        Ok(Self {
            order_id,
            document_type,
            vendor_id,
        })
    }

    /// The non-null column value standing in for the vendor in the
    /// uniqueness constraint. Vendor ids are positive, so `0` means none.
    #[must_use]
    pub fn vendor_key(&self) -> i64 {
        self.vendor_id.unwrap_or(0)
    }

    /// The human-facing number printed on the document.
    #[must_use]
    pub fn document_number(&self, order_number: &OrderNumber) -> String {
        match (self.document_type, self.vendor_id) {
            (DocumentType::PurchaseOrder, Some(vendor)) => {
                format!("PO-{order_number}-{vendor}")
            }
            _ => format!("Q-{order_number}"),
        }
    }
}

/// Metadata stored alongside a generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub item_count: usize,
    /// RFC 3339 timestamp of generation.
    pub generated_at: String,
    /// Discount override used for this snapshot; reused on regeneration.
    pub discount: Decimal,
    /// Tax override used for this snapshot; reused on regeneration.
    pub tax: Decimal,
    pub snapshot: PriceSnapshot,
}

/// A materialized quote or purchase order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub document_id: Option<i64>,
    pub key: DocumentKey,
    pub document_number: String,
    pub status: DocumentStatus,
    /// Blob store reference of the rendered artifact.
    pub file_ref: String,
    pub metadata: DocumentMetadata,
    pub created_at: String,
}
