// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The token-based approval workflow shared by quotes, artwork proofs
//! and vendor exceptions.

use promo_ops_domain::{
    Approval, ApprovalDecision, ApprovalStatus, ApprovalSubject, ApprovalToken, SubjectType,
    validate_client_name, validate_email,
};
use promo_ops_persistence::PendingInsert;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::collaborators::{EmailGateway, EmailMessage};
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    ApprovalInfo, DecideApprovalRequest, IssueApprovalRequest, IssueApprovalResponse,
};
use crate::{SharedPersistence, rfc3339};

/// Generates a fresh token from the thread CSPRNG.
fn generate_token() -> ApprovalToken {
    ApprovalToken::from_entropy(rand::random::<u128>(), rand::random::<u128>())
}

fn parse_subject(subject_type: &str, subject_id: &str) -> Result<ApprovalSubject, ApiError> {
    let subject_type: SubjectType = subject_type.parse().map_err(translate_domain_error)?;
    ApprovalSubject::new(subject_type, subject_id).map_err(translate_domain_error)
}

/// A malformed token is indistinguishable from an unknown one.
fn parse_token(token: &str) -> Result<ApprovalToken, ApiError> {
    ApprovalToken::parse(token)
        .map_err(|_| ApiError::not_found("Approval", String::from("No approval for this token")))
}

/// Issues and decides approvals.
pub struct ApprovalWorkflow {
    persistence: SharedPersistence,
    email: Arc<dyn EmailGateway>,
    public_base_url: String,
}

impl ApprovalWorkflow {
    #[must_use]
    pub fn new(
        persistence: SharedPersistence,
        email: Arc<dyn EmailGateway>,
        public_base_url: &str,
    ) -> Self {
        Self {
            persistence,
            email,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The public decision page for a token.
    #[must_use]
    pub fn approval_link(&self, token: &ApprovalToken) -> String {
        format!("{}/approval/{token}", self.public_base_url)
    }

    /// Issues an approval request for a subject.
    ///
    /// If the subject already has a pending approval it is returned
    /// unchanged and no email is sent. Otherwise a new pending approval is
    /// stored and the client is emailed a link to it; a failed email is
    /// reported as `email_warning` and does not undo the approval.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed input, or an error if the store
    /// fails.
    pub async fn issue(
        &self,
        request: &IssueApprovalRequest,
    ) -> Result<IssueApprovalResponse, ApiError> {
        let subject: ApprovalSubject = parse_subject(&request.subject_type, &request.subject_id)?;
        let client_email: String =
            validate_email(&request.client_email).map_err(translate_domain_error)?;
        let client_name: String =
            validate_client_name(&request.client_name).map_err(translate_domain_error)?;

        let candidate: Approval = Approval {
            approval_id: None,
            subject,
            token: generate_token(),
            status: ApprovalStatus::Pending,
            client_email,
            client_name,
            sent_at: rfc3339(OffsetDateTime::now_utc())?,
            decided_at: None,
            decision_notes: None,
        };

        let inserted: PendingInsert = self
            .persistence
            .lock()
            .await
            .insert_pending_approval(&candidate)?;

        let (approval, created): (Approval, bool) = match inserted {
            PendingInsert::Created(approval) => (approval, true),
            PendingInsert::Existing(approval) => (approval, false),
        };

        let email_warning: Option<String> = if created {
            info!(
                subject = %approval.subject.pending_key(),
                "Issued approval request"
            );
            self.send_request_email(&approval).await
        } else {
            None
        };

        Ok(IssueApprovalResponse {
            token: approval.token.as_str().to_string(),
            status: approval.status,
            created,
            approval: ApprovalInfo::from(approval),
            email_warning,
        })
    }

    async fn send_request_email(&self, approval: &Approval) -> Option<String> {
        let subject_line: String = match approval.subject.subject_type() {
            SubjectType::Quote => String::from("Please review your quote"),
            SubjectType::Artwork => String::from("Please review your artwork proof"),
            SubjectType::Vendor => String::from("Approval requested"),
        };
        let message: EmailMessage = EmailMessage {
            to: approval.client_email.clone(),
            subject: subject_line,
            body: format!(
                "Hello {},\n\nPlease review and approve or decline here:\n{}\n",
                approval.client_name,
                self.approval_link(&approval.token)
            ),
        };

        match self.email.send(&message).await {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    subject = %approval.subject.pending_key(),
                    error = %e,
                    "Approval email failed; the approval link remains valid"
                );
                Some(format!("Approval email could not be sent: {e}"))
            }
        }
    }

    /// Reads an approval by token.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no approval has this token.
    pub async fn get(&self, token: &str) -> Result<ApprovalInfo, ApiError> {
        let token: ApprovalToken = parse_token(token)?;
        self.persistence
            .lock()
            .await
            .get_approval_by_token(&token)?
            .map(ApprovalInfo::from)
            .ok_or_else(|| {
                ApiError::not_found("Approval", String::from("No approval for this token"))
            })
    }

    /// Records the client's decision.
    ///
    /// The write is conditional on the approval still being pending, so of
    /// two simultaneous decisions exactly one succeeds and the other gets
    /// `AlreadyDecided`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown decision, `ResourceNotFound`
    /// for an unknown token, or `AlreadyDecided`.
    pub async fn decide(
        &self,
        token: &str,
        request: &DecideApprovalRequest,
    ) -> Result<ApprovalInfo, ApiError> {
        let decision: ApprovalDecision =
            request.decision.parse().map_err(translate_domain_error)?;
        let token: ApprovalToken = parse_token(token)?;
        let decided_at: String = rfc3339(OffsetDateTime::now_utc())?;
        let notes: Option<&str> = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let mut persistence = self.persistence.lock().await;
        let won: bool = persistence.decide_approval(&token, decision, &decided_at, notes)?;
        let approval: Approval = persistence.get_approval_by_token(&token)?.ok_or_else(|| {
            ApiError::not_found("Approval", String::from("No approval for this token"))
        })?;
        drop(persistence);

        if !won {
            return Err(ApiError::AlreadyDecided {
                status: approval.status,
                decided_at: approval.decided_at,
            });
        }

        info!(
            subject = %approval.subject.pending_key(),
            status = %approval.status,
            "Approval decided"
        );
        Ok(ApprovalInfo::from(approval))
    }

    /// Lists every approval issued for a subject, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a malformed subject.
    pub async fn history(
        &self,
        subject_type: &str,
        subject_id: &str,
    ) -> Result<Vec<ApprovalInfo>, ApiError> {
        let subject: ApprovalSubject = parse_subject(subject_type, subject_id)?;
        Ok(self
            .persistence
            .lock()
            .await
            .list_approvals_for_subject(&subject)?
            .into_iter()
            .map(ApprovalInfo::from)
            .collect())
    }
}
