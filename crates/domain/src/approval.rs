// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Token-based approval requests.
//!
//! An approval asks an external party to accept or decline a subject
//! (a quote, an artwork proof, or a vendor exception). Each request is
//! identified by an unguessable token and is terminal once decided.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of hex characters in an approval token (256 bits).
pub const TOKEN_LEN: usize = 64;

/// Maximum accepted length of a subject identifier.
const MAX_SUBJECT_ID_LEN: usize = 128;

/// The kind of entity an approval is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    /// A quote sent to the client
    Quote,
    /// An artwork proof for an order item
    Artwork,
    /// A vendor exception on an order
    Vendor,
}

impl SubjectType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Artwork => "artwork",
            Self::Vendor => "vendor",
        }
    }
}

impl FromStr for SubjectType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quote" => Ok(Self::Quote),
            "artwork" => Ok(Self::Artwork),
            "vendor" => Ok(Self::Vendor),
            _ => Err(DomainError::InvalidSubjectType(s.to_string())),
        }
    }
}

impl std::fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Declined,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }

    /// Returns true once a decision has been recorded.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for ApprovalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            _ => Err(DomainError::InvalidApprovalStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The decision an external party can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Declined,
}

impl ApprovalDecision {
    /// The status an approval takes on after this decision.
    #[must_use]
    pub const fn resulting_status(&self) -> ApprovalStatus {
        match self {
            Self::Approved => ApprovalStatus::Approved,
            Self::Declined => ApprovalStatus::Declined,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.resulting_status().as_str()
    }
}

impl FromStr for ApprovalDecision {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "declined" => Ok(Self::Declined),
            _ => Err(DomainError::InvalidDecision(s.to_string())),
        }
    }
}

/// The entity an approval is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApprovalSubject {
    subject_type: SubjectType,
    subject_id: String,
}

impl ApprovalSubject {
    /// Creates a validated subject reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty, too long, or contains
    /// the `:` separator used in pending keys.
    pub fn new(subject_type: SubjectType, subject_id: &str) -> Result<Self, DomainError> {
        let trimmed: &str = subject_id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidSubjectId(String::from(
                "subject id cannot be empty",
            )));
        }
        if trimmed.len() > MAX_SUBJECT_ID_LEN {
            return Err(DomainError::InvalidSubjectId(format!(
                "subject id cannot exceed {MAX_SUBJECT_ID_LEN} characters"
            )));
        }
        if trimmed.contains(':') {
            return Err(DomainError::InvalidSubjectId(format!(
                "'{trimmed}' may not contain ':'"
            )));
        }
        Ok(Self {
            subject_type,
            subject_id: trimmed.to_string(),
        })
    }

    #[must_use]
    pub const fn subject_type(&self) -> SubjectType {
        self.subject_type
    }

    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// The key that is unique among pending approvals.
    #[must_use]
    pub fn pending_key(&self) -> String {
        format!("{}:{}", self.subject_type.as_str(), self.subject_id)
    }
}

/// An opaque, URL-safe approval token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApprovalToken(String);

impl ApprovalToken {
    /// Builds a token from 256 bits of caller-supplied randomness.
    #[must_use]
    pub fn from_entropy(high: u128, low: u128) -> Self {
        Self(format!("{high:032x}{low:032x}"))
    }

    /// Parses a token received from a client.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidToken` unless the value is exactly
    /// 64 lowercase hex characters.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let well_formed: bool = value.len() == TOKEN_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if well_formed {
            Ok(Self(value.to_string()))
        } else {
            Err(DomainError::InvalidToken)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ApprovalToken {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ApprovalToken> for String {
    fn from(token: ApprovalToken) -> Self {
        token.0
    }
}

impl std::fmt::Display for ApprovalToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted approval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub approval_id: Option<i64>,
    pub subject: ApprovalSubject,
    pub token: ApprovalToken,
    pub status: ApprovalStatus,
    pub client_email: String,
    pub client_name: String,
    /// RFC 3339 timestamp of issuance.
    pub sent_at: String,
    /// RFC 3339 timestamp of the decision, once decided.
    pub decided_at: Option<String>,
    pub decision_notes: Option<String>,
}

/// Validates a client email address.
///
/// Only the shape is checked: a non-empty local part, a single `@`, and a
/// dotted domain without whitespace.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the shape is wrong.
pub fn validate_email(value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    let invalid = || DomainError::InvalidEmail(value.to_string());

    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels_ok: bool = domain.split('.').count() >= 2 && domain.split('.').all(|l| !l.is_empty());
    if !labels_ok {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

/// Validates a client display name.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the name is blank.
pub fn validate_client_name(value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "client name cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}
