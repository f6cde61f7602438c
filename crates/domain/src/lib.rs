// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod approval;
mod document;
mod error;
mod notification;
mod order_status;
mod pricing;
mod stage;
mod stage_data;
mod types;

#[cfg(test)]
mod tests;

pub use approval::{
    Approval, ApprovalDecision, ApprovalStatus, ApprovalSubject, ApprovalToken, SubjectType,
    TOKEN_LEN, validate_client_name, validate_email,
};
pub use document::{DocumentKey, DocumentMetadata, DocumentStatus, DocumentType, GeneratedDocument};
pub use error::DomainError;
pub use notification::{
    Notification, NotificationType, is_next_action_due, next_action_message,
    next_action_recipients,
};
pub use order_status::OrderStatus;
pub use pricing::{
    LineEdit, PriceSnapshot, PricedLine, price_lines, resolve_quantity, resolve_unit_price,
};
pub use stage::{StageCatalog, StageDefinition, StageId};
pub use stage_data::{StageData, validate_stage_data};
pub use types::{Order, OrderLine, OrderNumber, ProductionState, parse_amount, parse_date};
